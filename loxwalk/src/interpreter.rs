use std::{
    cell::RefCell,
    io::{BufRead, Write},
    rc::Rc,
};

use crate::{
    callable::{self, LineInput},
    diagnostics::Diagnostics,
    environment::Environment,
    error::{Error, Result},
    expr::{self, Expr},
    stmt::Stmt,
    token::{Token, TokenKind},
    value::Value,
};

/// Deepest nesting of calls a program may reach before it is stopped with a
/// runtime error.
pub const MAX_CALL_DEPTH: usize = 1024;

// Remaining native stack below which a call switches to a freshly grown
// segment, and the size of each new segment.
const RED_ZONE: usize = 100 * 1024;
const STACK_PER_CALL: usize = 1024 * 1024;

/// How a statement finished. `Broke` unwinds to the nearest enclosing loop
/// and `Returned` to the nearest function call; runtime errors travel
/// separately as the `Err` side of `Result<Outcome>`.
#[derive(Debug, PartialEq)]
pub(crate) enum Outcome {
    Completed,
    Broke { keyword: Token },
    Returned { keyword: Token, value: Value },
}

pub struct Interpreter<W> {
    environment: Rc<RefCell<Environment>>,
    writer: W,
    input: LineInput,
    call_depth: usize,
}

impl <W: Write> Interpreter<W> {
    pub fn new(writer: W) -> Self {
        let mut globals = Environment::new();
        for native in callable::natives().iter() {
            globals.define(native.name, Value::NativeFn(*native));
        }
        Interpreter {
            environment: Rc::new(RefCell::new(globals)),
            writer,
            input: LineInput::Stdin,
            call_depth: 0,
        }
    }

    /// Replaces the source `input()` reads lines from.
    pub fn with_input<R: BufRead + 'static>(mut self, input: R) -> Self {
        self.input = LineInput::Reader(Box::new(input));
        self
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    pub(crate) fn input(&mut self) -> &mut LineInput {
        &mut self.input
    }

    /// Runs a program against the global scope, which persists between
    /// calls. The first runtime error is reported and stops the run.
    pub fn interpret(&mut self, statements: &[Stmt], diagnostics: &mut Diagnostics) {
        tracing::debug!(statements = statements.len(), "interpreting program");
        if let Err(error) = self.run(statements) {
            diagnostics.report(error);
        }
    }

    fn run(&mut self, statements: &[Stmt]) -> Result<()> {
        for statement in statements {
            match self.execute(statement)? {
                Outcome::Completed => {},
                Outcome::Broke { keyword } => {
                    return Err(Error::runtime(keyword, "Can't use 'break' outside of a loop."))
                },
                Outcome::Returned { keyword, .. } => {
                    return Err(Error::runtime(keyword, "Can't return from top-level code."))
                },
            }
        }
        Ok(())
    }

    fn execute(&mut self, s: &Stmt) -> Result<Outcome> {
        match s {
            Stmt::Block(b) => {
                let environment = Environment::from(&self.environment);
                self.execute_block(&b.statements, Rc::new(RefCell::new(environment)))
            },
            Stmt::Break(b) => Ok(Outcome::Broke { keyword: b.keyword.clone() }),
            Stmt::Expression(e) => {
                self.evaluate(&e.expression)?;
                Ok(Outcome::Completed)
            },
            Stmt::Function(f) => {
                let function = Value::new_function(f, Rc::clone(&self.environment));
                self.environment.borrow_mut().define(f.name.lexeme.clone(), function);
                Ok(Outcome::Completed)
            },
            Stmt::If(i) => {
                if self.evaluate(&i.condition)?.is_truthy() {
                    self.execute(&i.then_branch)
                } else if let Some(else_branch) = &i.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Outcome::Completed)
                }
            },
            Stmt::Print(p) => {
                let value = self.evaluate(&p.expression)?;
                writeln!(self.writer, "{}", value)?;
                Ok(Outcome::Completed)
            },
            Stmt::Return(r) => {
                let value = match &r.value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                Ok(Outcome::Returned { keyword: r.keyword.clone(), value })
            },
            Stmt::Var(v) => {
                let value = match &v.initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(v.name.lexeme.clone(), value);
                Ok(Outcome::Completed)
            },
            Stmt::While(w) => {
                while self.evaluate(&w.condition)?.is_truthy() {
                    match self.execute(&w.body)? {
                        Outcome::Completed => {},
                        Outcome::Broke { .. } => break,
                        returned @ Outcome::Returned { .. } => return Ok(returned),
                    }
                }
                Ok(Outcome::Completed)
            },
        }
    }

    /// Executes `statements` with `environment` as the current scope. The
    /// previous scope is restored however the block finishes.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Outcome> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let outcome = self.execute_all(statements);
        self.environment = previous;
        outcome
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Outcome> {
        for statement in statements {
            match self.execute(statement)? {
                Outcome::Completed => {},
                interrupted => return Ok(interrupted),
            }
        }
        Ok(Outcome::Completed)
    }

    fn evaluate(&mut self, e: &Expr) -> Result<Value> {
        match e {
            Expr::Assign(a) => {
                let value = self.evaluate(&a.value)?;
                self.environment.borrow_mut().assign(&a.name, value.clone())?;
                Ok(value)
            },
            Expr::Binary(b) => self.evaluate_binary(b),
            Expr::Call(c) => self.evaluate_call(c),
            Expr::Grouping(g) => self.evaluate(&g.expression),
            Expr::Literal(l) => Ok(l.value.clone()),
            Expr::Logical(l) => {
                let left = self.evaluate(&l.left)?;

                use TokenKind::*;
                Ok(match (&l.op.kind, left.is_truthy()) {
                    (Or, true) | (And, false) => left,
                    (Or, false) | (And, true) => self.evaluate(&l.right)?,
                    _ => unreachable!("Logical expression must be either And or Or.")
                })
            },
            Expr::Unary(u) => {
                let right = self.evaluate(&u.right)?;

                use Value::*;
                match (&u.op.kind, right) {
                    (TokenKind::Minus, Number(right)) => Ok(Number(-right)),
                    (TokenKind::Minus, _) => Err(Error::runtime(u.op.clone(), "Operand must be a number.")),
                    (TokenKind::Bang, right) => Ok(Bool(!right.is_truthy())),
                    _ => unreachable!("Unary expression must be either Minus or Bang."),
                }
            },
            Expr::Variable(v) => self.environment.borrow().get(&v.name),
        }
    }

    fn evaluate_binary(&mut self, e: &expr::Binary) -> Result<Value> {
        let left = self.evaluate(&e.left)?;
        let right = self.evaluate(&e.right)?;

        use Value::{Bool, Number, String};
        match e.op.kind {
            TokenKind::Minus => compute_if_numbers(&e.op, left, right, |l, r| l - r),
            TokenKind::Plus => match (left, right) {
                (Number(left), Number(right)) => Ok(Number(left + right)),
                (String(mut left), String(right)) => {
                    left.push_str(&right);
                    Ok(String(left))
                },
                _ => Err(Error::runtime(e.op.clone(), "Operands must be two numbers or strings.")),
            },
            TokenKind::Slash => match (left, right) {
                (Number(_), Number(right)) if right == 0.0 => {
                    Err(Error::runtime(e.op.clone(), "Can't divide by 0."))
                },
                (left, right) => compute_if_numbers(&e.op, left, right, |l, r| l / r),
            },
            TokenKind::Star => compute_if_numbers(&e.op, left, right, |l, r| l * r),
            TokenKind::Greater => compute_if_numbers(&e.op, left, right, |l, r| l > r),
            TokenKind::GreaterEqual => compute_if_numbers(&e.op, left, right, |l, r| l >= r),
            TokenKind::Less => compute_if_numbers(&e.op, left, right, |l, r| l < r),
            TokenKind::LessEqual => compute_if_numbers(&e.op, left, right, |l, r| l <= r),
            TokenKind::EqualEqual => Ok(Bool(left.is_equal(&right))),
            TokenKind::BangEqual => Ok(Bool(!left.is_equal(&right))),
            _ => unreachable!("Binary expression has a non-binary operator."),
        }
    }

    fn evaluate_call(&mut self, c: &expr::Call) -> Result<Value> {
        let callee = self.evaluate(&c.callee)?;
        let callable = callee.callable::<W>()
            .ok_or_else(|| Error::runtime(c.paren.clone(), "Can only call functions."))?;

        let args: Vec<Value> = c.arguments.iter()
            .map(|a| self.evaluate(a))
            .collect::<Result<_>>()?;

        if args.len() != callable.arity() {
            return Err(Error::runtime(
                c.paren.clone(),
                format!("Expected {} arguments but got {}.", callable.arity(), args.len())
            ))
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(Error::runtime(c.paren.clone(), "Stack overflow."))
        }

        self.call_depth += 1;
        let result = stacker::maybe_grow(RED_ZONE, STACK_PER_CALL, || {
            callable.call(self, &c.paren, args)
        });
        self.call_depth -= 1;
        result
    }
}

fn compute_if_numbers<T: Into<Value>>(
    op: &Token,
    left: Value,
    right: Value,
    f: impl Fn(f64, f64) -> T
) -> Result<Value> {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => Ok(f(left, right).into()),
        _ => Err(Error::runtime(op.clone(), "Operands must be numbers.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::Parser, scanner::Scanner};
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> (String, Diagnostics) {
        let tokens: Vec<Token> = Scanner::new(source)
            .scan_tokens()
            .into_iter()
            .map(|t| t.expect("test source should scan"))
            .collect();
        let mut diagnostics = Diagnostics::new();
        let statements = Parser::new(tokens.into_iter()).parse(&mut diagnostics);
        assert!(!diagnostics.had_error(), "test source should parse");

        let mut interpreter = Interpreter::new(Vec::new());
        interpreter.interpret(&statements, &mut diagnostics);
        let out = String::from_utf8(interpreter.into_writer()).expect("output is utf-8");
        (out, diagnostics)
    }

    fn runtime_error(source: &str) -> String {
        let (_, diagnostics) = run(source);
        diagnostics.errors()
            .find(|e| e.is_runtime_error())
            .map(|e| e.message())
            .expect("expected a runtime error")
    }

    #[test]
    fn precedence() {
        assert_eq!("7\n", run("print 1 + 2 * 3;").0);
    }

    #[test]
    fn string_concatenation_requires_two_strings() {
        assert_eq!("ab\n", run("print \"a\" + \"b\";").0);
        assert_eq!("Operands must be two numbers or strings.", runtime_error("print \"a\" + 1;"));
    }

    #[test]
    fn division() {
        assert_eq!("5\n", run("print 10 / 2;").0);
        assert_eq!("Can't divide by 0.", runtime_error("print 10 / 0;"));
        assert_eq!("Operands must be numbers.", runtime_error("print \"10\" / 0;"));
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!("nil\nyes\n1\nfalse\n", run(r#"
            print nil and 1;
            print nil or "yes";
            print 1 or undefined;
            print false and undefined;
        "#).0);
    }

    #[test]
    fn unary_minus_requires_a_number() {
        assert_eq!("-3\ntrue\n", run("print -3; print !nil;").0);
        assert_eq!("Operand must be a number.", runtime_error("print -\"3\";"));
    }

    #[test]
    fn blocks_restore_scope_after_a_runtime_error() {
        let mut diagnostics = Diagnostics::new();
        let mut interpreter = Interpreter::new(Vec::new());
        let tokens: Vec<Token> = Scanner::new("var a = 1; { var a = 2; a + nil; }")
            .scan_tokens().into_iter().map(|t| t.expect("scans")).collect();
        let statements = Parser::new(tokens.into_iter()).parse(&mut diagnostics);
        interpreter.interpret(&statements, &mut diagnostics);
        assert!(diagnostics.had_runtime_error());

        let a = Token::new(TokenKind::Identifier, "a", 1);
        assert_eq!(Value::Number(1.0), interpreter.environment.borrow().get(&a).expect("a is global"));
    }

    #[test]
    fn runtime_error_stops_later_statements() {
        let (out, diagnostics) = run("print 1; print x; print 2;");
        assert_eq!("1\n", out);
        assert_eq!(1, diagnostics.len());
    }

    #[test]
    fn top_level_control_signals_are_errors() {
        let keyword = Token::new(TokenKind::Break, "break", 4);
        let mut interpreter = Interpreter::new(Vec::new());
        let mut diagnostics = Diagnostics::new();
        interpreter.interpret(&[Stmt::new_break(keyword)], &mut diagnostics);
        assert_eq!(
            vec!["Can't use 'break' outside of a loop.\n[line 4]".to_string()],
            diagnostics.errors().map(|e| e.to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn call_depth_unwinds_after_a_stack_overflow() {
        let (out, diagnostics) = run(r#"
            fun dive(n) { return dive(n + 1); }
            dive(0);
        "#);
        assert_eq!("", out);
        assert_eq!(
            vec!["Stack overflow.\n[line 2]".to_string()],
            diagnostics.errors().map(|e| e.to_string()).collect::<Vec<_>>()
        );

        let mut interpreter = Interpreter::new(Vec::new());
        let mut diagnostics = Diagnostics::new();
        let tokens: Vec<Token> = Scanner::new("fun f() { return f(); } f();")
            .scan_tokens().into_iter().map(|t| t.expect("scans")).collect();
        let statements = Parser::new(tokens.into_iter()).parse(&mut diagnostics);
        interpreter.interpret(&statements, &mut diagnostics);
        assert!(diagnostics.had_runtime_error());
        assert_eq!(0, interpreter.call_depth);
    }

    #[test]
    fn natives_are_defined_globally() {
        assert_eq!("<native fn>\n", run("print clock;").0);
        let mut interpreter = Interpreter::new(Vec::new()).with_input(std::io::Cursor::new("12\n"));
        let mut diagnostics = Diagnostics::new();
        let tokens: Vec<Token> = Scanner::new("print number(input()) + 1;")
            .scan_tokens().into_iter().map(|t| t.expect("scans")).collect();
        let statements = Parser::new(tokens.into_iter()).parse(&mut diagnostics);
        interpreter.interpret(&statements, &mut diagnostics);
        assert!(diagnostics.is_empty());
        assert_eq!(b"13\n".to_vec(), *interpreter.writer());
    }
}
