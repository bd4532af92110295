// AST definitions for the Ember front end

use std::fmt;

/// Source position for error reporting, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Binary operators, ordered here by precedence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Additive
    Add,
    Sub,
    // Modulo (`%%` wraps negative operands)
    Mod,
    ModFloor,
    // Multiplicative
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mod => "%",
            BinOp::ModFloor => "%%",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };
        write!(f, "{symbol}")
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg, // -x
    Not, // !x
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "!"),
        }
    }
}

/// Operators accepted by a `mut` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    ModFloorAssign,
}

impl fmt::Display for MutOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            MutOp::Assign => "=",
            MutOp::AddAssign => "+=",
            MutOp::SubAssign => "-=",
            MutOp::MulAssign => "*=",
            MutOp::DivAssign => "/=",
            MutOp::ModAssign => "%=",
            MutOp::ModFloorAssign => "%%=",
        };
        write!(f, "{symbol}")
    }
}

/// A type annotation. `Named` is wrapped outward by the postfix markers, so
/// `int*@` reads as pointer-to-array-of-int.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeNode {
    /// No annotation was written (and none is implied).
    #[default]
    None,
    /// No annotation was written; the type is to be inferred.
    Auto,
    Named(String),
    /// Postfix `*`.
    Array(Box<TypeNode>),
    /// Postfix `@`.
    Pointer(Box<TypeNode>),
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::None => write!(f, "none"),
            TypeNode::Auto => write!(f, "auto"),
            TypeNode::Named(name) => write!(f, "{name}"),
            TypeNode::Array(base) => write!(f, "{base}*"),
            TypeNode::Pointer(base) => write!(f, "{base}@"),
        }
    }
}

/// Literal leaves. Number literals keep their raw text; validating the digits
/// against the radix markers is a later stage's concern.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(String),
    Str(String),
    Bool(bool),
    Ident(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(value) => write!(f, "{value}"),
            Literal::Str(value) => write!(f, "\"{value}\""),
            Literal::Bool(value) => write!(f, "{value}"),
            Literal::Ident(name) => write!(f, "{name}"),
        }
    }
}

/// Expression nodes. Postfix accessors wrap their base, so `a.b[0](x)` is
/// `Call(Index(Member(a, "b"), 0), [x])`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    /// A `{ ... }` block in expression position.
    Block(Block),
    /// Postfix `@`.
    Deref {
        base: Box<Expr>,
    },
    Member {
        base: Box<Expr>,
        name: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        base: Box<Expr>,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// The degraded stand-in produced after an unrecoverable expression error.
    pub fn empty_block() -> Self {
        Expr::Block(Block::default())
    }
}

/// One line of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockLine {
    Let(LetStmt),
    Mutate(MutateStmt),
    If(IfStmt),
    ElseIf(IfStmt),
    Else(ElseStmt),
    While(WhileStmt),
    Expr(Expr),
}

/// A `{ ... }` block. `returns_last` is set when the final line carries no
/// terminator, making its value the value of the block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub lines: Vec<BlockLine>,
    pub returns_last: bool,
}

/// `let [type] name = expr`. Fields degrade to `None` when recovery gave up
/// before they were parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub position: Position,
    pub ty: TypeNode,
    pub name: Option<String>,
    pub init: Option<Expr>,
}

/// `mut name op expr`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutateStmt {
    pub name: Option<String>,
    pub op: Option<MutOp>,
    pub expr: Option<Expr>,
}

/// `if cond { ... }`; also the payload of an `else if` line.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseStmt {
    pub block: Block,
}

/// `while cond { ... }` or `do while cond { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub block: Block,
    pub is_do_while: bool,
}

/// A `type name` pair as it appears in parameter lists and type members.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variable {
    pub ty: TypeNode,
    pub name: Option<String>,
}

/// `fn name(params) [-> type] { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub position: Position,
    pub name: Option<String>,
    pub params: Vec<Variable>,
    pub return_type: TypeNode,
    pub body: Block,
}

impl FunctionDef {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            name: None,
            params: Vec::new(),
            return_type: TypeNode::None,
            body: Block::default(),
        }
    }
}

/// `type Name { member_type member_name; ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub position: Position,
    pub name: Option<String>,
    pub members: Vec<Variable>,
}

impl TypeDef {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            name: None,
            members: Vec::new(),
        }
    }
}

/// Top-level program structure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<FunctionDef>,
    pub types: Vec<TypeDef>,
    pub globals: Vec<LetStmt>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}

// ===== Tree rendering =====
//
// Every node renders as an indented outline; composite nodes indent their
// children by four spaces.

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Program")?;
        for function in &self.functions {
            write!(f, "\n{}", indent(&function.to_string()))?;
        }
        for type_def in &self.types {
            write!(f, "\n{}", indent(&type_def.to_string()))?;
        }
        for global in &self.globals {
            write!(f, "\n{}", indent(&global.to_string()))?;
        }
        Ok(())
    }
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function {}", self.name.as_deref().unwrap_or("<unnamed>"))?;
        for param in &self.params {
            write!(f, "\n{}", indent(&param.to_string()))?;
        }
        write!(f, "\n{}", indent(&format!("-> {}", self.return_type)))?;
        write!(f, "\n{}", indent(&self.body.to_string()))
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type {}", self.name.as_deref().unwrap_or("<unnamed>"))?;
        for member in &self.members {
            write!(f, "\n{}", indent(&member.to_string()))?;
        }
        Ok(())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name.as_deref().unwrap_or("<unnamed>"), self.ty)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block")?;
        if self.returns_last {
            write!(f, " (returns last)")?;
        }
        for line in &self.lines {
            write!(f, "\n{}", indent(&line.to_string()))?;
        }
        Ok(())
    }
}

impl fmt::Display for BlockLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockLine::Let(stmt) => write!(f, "{stmt}"),
            BlockLine::Mutate(stmt) => write!(f, "{stmt}"),
            BlockLine::If(stmt) => write!(f, "{stmt}"),
            BlockLine::ElseIf(stmt) => write!(f, "ElseIf\n{}", indent(&stmt.to_string())),
            BlockLine::Else(stmt) => write!(f, "{stmt}"),
            BlockLine::While(stmt) => write!(f, "{stmt}"),
            BlockLine::Expr(expr) => write!(f, "{expr}"),
        }
    }
}

impl fmt::Display for LetStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Let {} : {}",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.ty
        )?;
        if let Some(init) = &self.init {
            write!(f, "\n{}", indent(&init.to_string()))?;
        }
        Ok(())
    }
}

impl fmt::Display for MutateStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mut {}", self.name.as_deref().unwrap_or("<unnamed>"))?;
        if let Some(op) = self.op {
            write!(f, " {op}")?;
        }
        if let Some(expr) = &self.expr {
            write!(f, "\n{}", indent(&expr.to_string()))?;
        }
        Ok(())
    }
}

impl fmt::Display for IfStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "If\n{}\n{}",
            indent(&self.condition.to_string()),
            indent(&self.block.to_string())
        )
    }
}

impl fmt::Display for ElseStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Else\n{}", indent(&self.block.to_string()))
    }
}

impl fmt::Display for WhileStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_do_while { "DoWhile" } else { "While" };
        write!(
            f,
            "{keyword}\n{}\n{}",
            indent(&self.condition.to_string()),
            indent(&self.block.to_string())
        )
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => write!(f, "{literal}"),
            Expr::Binary { op, left, right } => write!(
                f,
                "{op}\n{}\n{}",
                indent(&left.to_string()),
                indent(&right.to_string())
            ),
            Expr::Unary { op, operand } => {
                write!(f, "{op}\n{}", indent(&operand.to_string()))
            }
            Expr::Block(block) => write!(f, "{block}"),
            Expr::Deref { base } => write!(f, "Deref\n{}", indent(&base.to_string())),
            Expr::Member { base, name } => {
                write!(f, "Member .{name}\n{}", indent(&base.to_string()))
            }
            Expr::Index { base, index } => write!(
                f,
                "Index\n{}\n{}",
                indent(&base.to_string()),
                indent(&index.to_string())
            ),
            Expr::Call { base, args } => {
                write!(f, "Call\n{}", indent(&base.to_string()))?;
                for arg in args {
                    write!(f, "\n{}", indent(&arg.to_string()))?;
                }
                Ok(())
            }
        }
    }
}
