#![allow(dead_code)]

use loxwalk::{Diagnostics, Interpreter};
use std::io::Cursor;

pub struct Run {
    pub stdout: String,
    pub errors: Vec<String>,
    pub had_error: bool,
    pub had_runtime_error: bool,
}

pub fn run(source: &str) -> Run {
    run_with_input(source, "")
}

pub fn run_with_input(source: &str, input: &'static str) -> Run {
    let mut interpreter = Interpreter::new(Vec::new()).with_input(Cursor::new(input));
    let mut diagnostics = Diagnostics::new();
    loxwalk::run(source, &mut interpreter, &mut diagnostics);

    Run {
        stdout: String::from_utf8(interpreter.into_writer()).expect("program output is utf-8"),
        errors: diagnostics.errors().map(|e| e.to_string()).collect(),
        had_error: diagnostics.had_error(),
        had_runtime_error: diagnostics.had_runtime_error(),
    }
}

/// Runs a program that should finish cleanly and returns what it printed.
pub fn output(source: &str) -> String {
    let run = run(source);
    assert!(run.errors.is_empty(), "unexpected errors: {:?}", run.errors);
    run.stdout
}

/// Runs a program that should fail at runtime and returns the rendered error.
pub fn runtime_error(source: &str) -> String {
    let run = run(source);
    assert!(!run.had_error, "unexpected syntax errors: {:?}", run.errors);
    assert!(run.had_runtime_error, "expected a runtime error");
    assert_eq!(1, run.errors.len());
    run.errors[0].clone()
}
