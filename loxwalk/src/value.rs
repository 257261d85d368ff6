use std::{
    cell::RefCell,
    fmt::{self, Debug, Display},
    rc::Rc,
};

use crate::{
    callable::LineInput,
    environment::Environment,
    stmt,
    token::Token,
};

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Bool(bool),
    Function(Rc<Function>),
    NativeFn(NativeFn),
    Nil,
    Number(f64),
    String(String),
}

impl Value {
    pub(crate) fn new_function(
        declaration: &stmt::Function,
        closure: Rc<RefCell<Environment>>,
    ) -> Self {
        Value::Function(Rc::new(Function {
            name: declaration.name.clone(),
            params: declaration.params.clone(),
            body: Rc::clone(&declaration.body),
            closure,
        }))
    }

    /// Kind-aware equality: values of different kinds are never equal and
    /// callables are equal only to themselves.
    pub fn is_equal(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(s), Bool(o)) => s == o,
            (Number(s), Number(o)) => {
                // Lox follows Java's Double convention in that NaN == NaN
                // is true whereas f64 follows IEEE 754.
                if s.is_nan() && o.is_nan() {
                    true
                } else {
                    s == o
                }
            },
            (String(s), String(o)) => s == o,
            (Function(s), Function(o)) => Rc::ptr_eq(s, o),
            (NativeFn(s), NativeFn(o)) => s == o,
            _ => false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        use Value::*;
        !matches!(self, Bool(false) | Nil)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Value::*;
        match self {
            Bool(b) => write!(f, "{}", b),
            Function(fnc) => write!(f, "{}", fnc),
            NativeFn(_) => write!(f, "<native fn>"),
            Nil => write!(f, "nil"),
            // f64's Display already drops the fractional part of integral
            // values, so 7.0 renders as "7".
            Number(n) => write!(f, "{}", n),
            String(s) => write!(f, "{}", s),
        }
    }
}

pub(crate) type NativeBody = fn(&mut LineInput, &[Value]) -> Result<Value, String>;

/// A host-provided primitive. It has a fixed arity and no AST body.
#[derive(Clone, Copy)]
pub struct NativeFn {
    pub(crate) name: &'static str,
    pub(crate) arity: usize,
    pub(crate) body: NativeBody,
}

impl Debug for NativeFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl PartialEq for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity
    }
}

/// A user-defined function paired with the environment it was declared in.
pub struct Function {
    pub(crate) name: Token,
    pub(crate) params: Vec<Token>,
    pub(crate) body: Rc<[stmt::Stmt]>,
    pub(crate) closure: Rc<RefCell<Environment>>,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body) && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

// The closure may (indirectly) contain this function, so it is left out.
impl Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name.lexeme)
            .field("arity", &self.params.len())
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name.lexeme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_nil_and_false_are_falsy() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::from("").is_truthy());
    }

    #[test]
    fn equality_never_crosses_kinds() {
        assert!(!Value::Number(1.0).is_equal(&Value::from("1")));
        assert!(!Value::Nil.is_equal(&Value::Bool(false)));
        assert!(Value::Nil.is_equal(&Value::Nil));
        assert!(Value::from("a").is_equal(&Value::from("a")));
        assert!(Value::Number(f64::NAN).is_equal(&Value::Number(f64::NAN)));
    }

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!("7", Value::Number(7.0).to_string());
        assert_eq!("2.5", Value::Number(2.5).to_string());
        assert_eq!("-3", Value::Number(-3.0).to_string());
        assert_eq!("nil", Value::Nil.to_string());
        assert_eq!("false", Value::Bool(false).to_string());
    }
}
