// emberc: parser and static analyzer for the Ember language

mod analysis;
mod parser;

use std::fs;
use std::path::Path;

use crossterm::style::Stylize;

use analysis::Analyzer;
use parser::lexer::{Lexer, TokenKind};
use parser::parse::Parser;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        let program_name = args.first().map(|s| s.as_str()).unwrap_or("emberc");
        eprintln!("Error: No input file provided");
        eprintln!();
        eprintln!("Usage: {} <file.em> [--tokens]", program_name);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --tokens    Dump the token stream before parsing");
        std::process::exit(1);
    }

    let source_file = &args[1];
    let dump_tokens = args.iter().skip(2).any(|arg| arg == "--tokens");

    if !Path::new(source_file).exists() {
        eprintln!("Error: File '{}' not found", source_file);
        std::process::exit(1);
    }

    let source = match fs::read_to_string(source_file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error: Could not read '{}': {}", source_file, error);
            std::process::exit(1);
        }
    };

    if dump_tokens {
        let mut lexer = Lexer::new(&source);
        loop {
            let token = lexer.consume();
            println!("{} at {}", token, token.position);
            if token.kind == TokenKind::Eof {
                break;
            }
        }
    }

    let outcome = Parser::new(&source).parse();
    let mut diagnostics = outcome.diagnostics;

    if outcome.success {
        Analyzer::new(&outcome.tree).analyze(&mut diagnostics);
    }

    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic.to_string().red());
    }

    println!("{}", outcome.tree);

    if !diagnostics.is_empty() {
        std::process::exit(1);
    }
}
