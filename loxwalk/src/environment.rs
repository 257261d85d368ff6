use std::{
    collections::HashMap,
    rc::Rc,
    cell::RefCell
};
use crate::{
    error::{Error, Result},
    token::Token,
    value::Value,
};

/// One lexical scope. Scopes are shared through `Rc<RefCell<_>>` so that a
/// closure can keep its declaring scope alive after the block or call that
/// created it has finished.
#[derive(Debug, Default)]
pub(crate) struct Environment {
    enclosing: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, Value>,
}

impl Environment {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from(e: &Rc<RefCell<Environment>>) -> Self {
        Self { enclosing: Some(Rc::clone(e)), values: HashMap::new() }
    }

    pub(crate) fn get(&self, name: &Token) -> Result<Value> {
        self.values.get(&name.lexeme)
            .map(|v| Ok(v.clone()))
            .unwrap_or_else(|| {
                self.enclosing.as_ref()
                    .map(|e| e.borrow().get(name))
                    .unwrap_or_else(|| Err(undefined_var_error(name)))
            })
    }

    /// Rebinds an existing name in the nearest scope that declares it.
    /// Never creates a binding.
    pub(crate) fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        match self.values.get_mut(&name.lexeme) {
            Some(v) => {
                *v = value;
                Ok(())
            },
            None => self.enclosing.as_ref()
                .map(|e| e.borrow_mut().assign(name, value))
                .unwrap_or_else(|| Err(undefined_var_error(name))),
        }
    }

    pub(crate) fn define<S: Into<String>>(&mut self, name: S, value: Value) {
        self.values.insert(name.into(), value);
    }
}

fn undefined_var_error(name: &Token) -> Error {
    Error::runtime(
        name.clone(),
        format!("Undefined variable '{}'.", name.lexeme)
    )
}
