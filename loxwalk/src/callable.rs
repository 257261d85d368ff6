use std::{
    cell::RefCell,
    io::{self, BufRead, Write},
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    environment::Environment,
    error::{Error, Result},
    interpreter::{Interpreter, Outcome},
    token::Token,
    value::{Function, NativeFn, Value},
};

pub(crate) trait Callable<W: Write> {
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &mut Interpreter<W>, paren: &Token, args: Vec<Value>) -> Result<Value>;
}

impl Value {
    pub(crate) fn callable<W: Write>(&self) -> Option<&dyn Callable<W>> {
        match self {
            Value::Function(f) => Some(&**f),
            Value::NativeFn(n) => Some(n),
            _ => None,
        }
    }
}

impl <W: Write> Callable<W> for Function {
    fn arity(&self) -> usize {
        self.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter<W>, _paren: &Token, args: Vec<Value>) -> Result<Value> {
        tracing::trace!(name = %self.name.lexeme, arity = self.params.len(), "calling function");

        // Chained to the closure, not the caller: that is what lets a
        // function see the scope it was declared in.
        let mut environment = Environment::from(&self.closure);
        for (param, arg) in self.params.iter().zip(args) {
            environment.define(param.lexeme.clone(), arg);
        }

        match interpreter.execute_block(&self.body, Rc::new(RefCell::new(environment)))? {
            Outcome::Returned { value, .. } => Ok(value),
            Outcome::Completed | Outcome::Broke { .. } => Ok(Value::Nil),
        }
    }
}

impl <W: Write> Callable<W> for NativeFn {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, interpreter: &mut Interpreter<W>, paren: &Token, args: Vec<Value>) -> Result<Value> {
        tracing::trace!(name = self.name, "calling native function");
        (self.body)(interpreter.input(), &args)
            .map_err(|message| Error::runtime(paren.clone(), message))
    }
}

/// Where `input()` takes its lines from. Stdin is locked per line rather
/// than buffered here, so the prompt and the program can share it.
pub(crate) enum LineInput {
    Stdin,
    Reader(Box<dyn BufRead>),
}

impl LineInput {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        match self {
            LineInput::Stdin => io::stdin().read_line(buf),
            LineInput::Reader(reader) => reader.read_line(buf),
        }
    }
}

/// The primitives every interpreter starts with in its global scope.
pub(crate) fn natives() -> [NativeFn; 3] {
    [
        NativeFn { name: "clock", arity: 0, body: clock },
        NativeFn { name: "input", arity: 0, body: input },
        NativeFn { name: "number", arity: 1, body: number },
    ]
}

fn clock(_input: &mut LineInput, _args: &[Value]) -> std::result::Result<Value, String> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|time| Value::Number(time.as_secs_f64()))
        .map_err(|e| format!("System clock is before the Unix epoch: {}.", e))
}

fn input(input: &mut LineInput, _args: &[Value]) -> std::result::Result<Value, String> {
    let mut line = String::new();
    let num_bytes = input.read_line(&mut line)
        .map_err(|e| format!("Could not read input: {}.", e))?;
    if num_bytes == 0 {
        return Ok(Value::Nil)
    }

    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(Value::from(trimmed))
}

fn number(_input: &mut LineInput, args: &[Value]) -> std::result::Result<Value, String> {
    match args.first() {
        Some(Value::Number(n)) => Ok(Value::Number(*n)),
        Some(Value::String(s)) => s.trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| format!("Can't convert '{}' to a number.", s)),
        Some(other) => Err(format!("Can't convert '{}' to a number.", other)),
        None => Err("Can't convert nothing to a number.".to_string()),
    }
}
