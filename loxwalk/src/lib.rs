mod callable;
pub mod diagnostics;
mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use std::io::Write;

pub use crate::{
    diagnostics::Diagnostics,
    error::{Error, Result},
    interpreter::Interpreter,
    value::Value,
};

use crate::{
    parser::Parser,
    scanner::Scanner,
    token::Token,
};

/// Scans `source`, reporting lexical errors and keeping every token that
/// scanned cleanly (always ending with `EndOfFile`).
pub fn scan(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut tokens = Vec::new();
    for result in Scanner::new(source).scan_tokens() {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => diagnostics.report(e),
        }
    }
    tokens
}

/// Runs one piece of source (a script or a single REPL line) through the
/// whole pipeline. Nothing is executed if scanning or parsing failed.
pub fn run<W: Write>(source: &str, interpreter: &mut Interpreter<W>, diagnostics: &mut Diagnostics) {
    let tokens = scan(source, diagnostics);
    let statements = Parser::new(tokens.into_iter()).parse(diagnostics);
    if diagnostics.had_error() {
        return
    }
    interpreter.interpret(&statements, diagnostics);
}
