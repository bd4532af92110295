// Integration tests for the Ember front end

use emberc::analysis::Analyzer;
use emberc::parser::ast::{BinOp, BlockLine, Expr, Literal, TypeNode};
use emberc::parser::lexer::{Lexer, TokenKind};
use emberc::parser::parse::{ParseOutcome, Parser};

fn parse(source: &str) -> ParseOutcome {
    Parser::new(source).parse()
}

fn num(text: &str) -> Expr {
    Expr::Literal(Literal::Number(text.to_string()))
}

fn ident(name: &str) -> Expr {
    Expr::Literal(Literal::Ident(name.to_string()))
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Parse a file that must be clean and return the expression on the first
/// line of the first function's body.
fn main_expression(source: &str) -> Expr {
    let outcome = parse(source);
    assert!(
        outcome.success,
        "unexpected diagnostics: {:?}",
        outcome.diagnostics
    );
    match &outcome.tree.functions[0].body.lines[0] {
        BlockLine::Expr(expr) => expr.clone(),
        other => panic!("expected an expression line, got {other:?}"),
    }
}

// === SCANNER ===

#[test]
fn test_compound_operators_scan_as_single_tokens() {
    let mut lexer = Lexer::new("%%= += -> %% <= a+=1");
    let kinds = [
        TokenKind::PercentPercentEq,
        TokenKind::PlusEq,
        TokenKind::Arrow,
        TokenKind::PercentPercent,
        TokenKind::Le,
        TokenKind::Ident,
        TokenKind::PlusEq,
        TokenKind::Number,
        TokenKind::Eof,
    ];
    for kind in kinds {
        assert_eq!(lexer.consume().kind, kind);
    }
}

#[test]
fn test_end_of_input_is_idempotent() {
    let mut lexer = Lexer::new("x");
    lexer.consume();

    let first = lexer.consume();
    let second = lexer.consume();
    assert_eq!(first.kind, TokenKind::Eof);
    assert_eq!(second.kind, TokenKind::Eof);
    assert_eq!(first.position, second.position);
}

// === EXPRESSIONS ===

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let expr = main_expression("fn main() { 1 + 2 * 3 }");
    assert_eq!(
        expr,
        binary(BinOp::Add, num("1"), binary(BinOp::Mul, num("2"), num("3")))
    );
}

#[test]
fn test_equal_precedence_associates_left() {
    let expr = main_expression("fn main() { 1 - 2 - 3 }");
    assert_eq!(
        expr,
        binary(BinOp::Sub, binary(BinOp::Sub, num("1"), num("2")), num("3"))
    );
}

#[test]
fn test_comparisons_bind_loosest() {
    let expr = main_expression("fn main() { a + b < c * d }");
    assert_eq!(
        expr,
        binary(
            BinOp::Lt,
            binary(BinOp::Add, ident("a"), ident("b")),
            binary(BinOp::Mul, ident("c"), ident("d"))
        )
    );
}

#[test]
fn test_accessor_chain_nests_outward() {
    let expr = main_expression("fn main() { a.b[0](x) }");
    let member = Expr::Member {
        base: Box::new(ident("a")),
        name: "b".to_string(),
    };
    let index = Expr::Index {
        base: Box::new(member),
        index: Box::new(num("0")),
    };
    assert_eq!(
        expr,
        Expr::Call {
            base: Box::new(index),
            args: vec![ident("x")],
        }
    );
}

// === BLOCKS ===

#[test]
fn test_block_without_trailing_semicolon_returns_last() {
    let outcome = parse("fn main() { let int x = 1; x }");
    assert!(outcome.success);
    assert!(outcome.tree.functions[0].body.returns_last);
}

#[test]
fn test_trailing_semicolon_suppresses_block_return() {
    let outcome = parse("fn main() { let int x = 1; x; }");
    assert!(outcome.success);
    assert!(!outcome.tree.functions[0].body.returns_last);
}

// === RECOVERY ===

#[test]
fn test_missing_function_name_does_not_cascade() {
    let outcome = parse("fn (int) {}");
    assert_eq!(outcome.diagnostics.len(), 1);

    let function = &outcome.tree.functions[0];
    assert_eq!(function.name, None);
    assert_eq!(function.params.len(), 1);
    assert_eq!(function.params[0].name.as_deref(), Some("int"));
}

#[test]
fn test_statement_recovery_respects_nested_blocks() {
    let outcome = parse("fn f() { let = { } ; g(); }");
    assert_eq!(outcome.diagnostics.len(), 1);

    let body = &outcome.tree.functions[0].body;
    assert_eq!(body.lines.len(), 2);
    assert!(matches!(&body.lines[1], BlockLine::Expr(Expr::Call { .. })));
}

#[test]
fn test_unclosed_body_reports_the_opening_brace() {
    let outcome = parse("fn f() {");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0].message.contains("unclosed '{'"));
    assert_eq!(outcome.diagnostics[0].position.line, 1);
    assert_eq!(outcome.diagnostics[0].position.column, 8);
}

// === ANALYSIS PIPELINE ===

#[test]
fn test_full_pipeline_on_a_clean_program() {
    let source = r#"
        type Point {
            int x;
            int y;
        }

        let int origin_count = 0;

        fn manhattan(Point p) -> int {
            p.x + p.y
        }

        fn main() {
            let Point p = make();
            let d = manhattan(p);
            mut d += 1;
            d
        }
    "#;

    let outcome = parse(source);
    assert!(
        outcome.success,
        "unexpected diagnostics: {:?}",
        outcome.diagnostics
    );
    assert_eq!(outcome.tree.functions.len(), 2);
    assert_eq!(outcome.tree.types.len(), 1);
    assert_eq!(outcome.tree.globals.len(), 1);

    let mut diagnostics = outcome.diagnostics;
    let table = Analyzer::new(&outcome.tree).analyze(&mut diagnostics);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(table.get("Point").map(|info| info.size), Some(16));
}

#[test]
fn test_pipeline_reports_analysis_findings() {
    let source = "fn f() {}\nfn f() {}\nlet g = 1;";
    let outcome = parse(source);
    assert!(outcome.success);

    let mut diagnostics = outcome.diagnostics;
    Analyzer::new(&outcome.tree).analyze(&mut diagnostics);
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics[0].message.contains("already exists"));
    assert!(diagnostics[1].message.contains("explicitly specified"));
}

#[test]
fn test_degraded_parse_keeps_type_names_out_of_duplicates() {
    let outcome = parse("type {} type {}");
    assert_eq!(outcome.diagnostics.len(), 2);

    let mut diagnostics = Vec::new();
    Analyzer::new(&outcome.tree).analyze(&mut diagnostics);
    assert!(diagnostics.is_empty());
}

// === RENDERING ===

#[test]
fn test_tree_renders_as_indented_outline() {
    let outcome = parse("fn main() { let int x = 1; x }");
    assert!(outcome.success);

    let rendered = outcome.tree.to_string();
    let expected = "\
Program
    Function main
        -> none
        Block (returns last)
            Let x : int
                1
            x";
    assert_eq!(rendered, expected);
}

#[test]
fn test_degraded_nodes_render_as_unnamed() {
    let outcome = parse("fn () {}");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.tree.to_string().contains("Function <unnamed>"));
}

#[test]
fn test_wrapped_types_render_with_suffixes() {
    let outcome = parse("fn f(int*@ a) {}");
    assert!(outcome.success);
    assert_eq!(
        outcome.tree.functions[0].params[0].ty,
        TypeNode::Pointer(Box::new(TypeNode::Array(Box::new(TypeNode::Named(
            "int".to_string()
        )))))
    );
    assert!(outcome.tree.to_string().contains("a : int*@"));
}
