use crate::error::{LucaError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope.  Closures and call frames hold these.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One runtime scope: its own bindings plus a link to the enclosing scope
/// (`None` only for the globals).
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap into a shareable handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Bind `name` in this scope, replacing any previous binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up along the whole chain.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite the nearest existing binding of `name`.  Never declares.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from exactly `distance` links up from `env`.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        let scope = Self::ancestor(env, distance, name)?;
        let value = scope.borrow().values.get(&name.lexeme).cloned();

        debug!("get_at '{}' distance {}", name.lexeme, distance);

        value.ok_or_else(|| undefined(name))
    }

    /// Write `name` in the scope exactly `distance` links up from `env`.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        let scope = Self::ancestor(env, distance, name)?;
        let mut scope = scope.borrow_mut();

        debug!("assign_at '{}' distance {}", name.lexeme, distance);

        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }

    fn ancestor(env: &EnvRef, distance: usize, name: &Token) -> Result<EnvRef> {
        let mut scope = Rc::clone(env);

        for _ in 0..distance {
            let parent = scope.borrow().enclosing.clone();
            scope = parent.ok_or_else(|| undefined(name))?;
        }

        Ok(scope)
    }
}

fn undefined(name: &Token) -> LucaError {
    LucaError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, None, 1)
    }

    #[test]
    fn assign_writes_to_the_declaring_scope() {
        let globals = Environment::new().into_ref();
        globals.borrow_mut().define("a", Value::Number(1.0));

        let inner = Environment::with_enclosing(Rc::clone(&globals)).into_ref();
        inner
            .borrow_mut()
            .assign(&ident("a"), Value::Number(2.0))
            .unwrap();

        assert_eq!(globals.borrow().get(&ident("a")).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn scopes_do_not_share_bindings() {
        let outer = Environment::new().into_ref();
        let inner = Environment::with_enclosing(Rc::clone(&outer)).into_ref();
        inner.borrow_mut().define("x", Value::Bool(true));

        assert!(outer.borrow().get(&ident("x")).is_err());
    }

    #[test]
    fn assign_to_unknown_name_fails() {
        let globals = Environment::new().into_ref();
        let err = globals
            .borrow_mut()
            .assign(&ident("ghost"), Value::Nil)
            .unwrap_err();

        assert_eq!(err.to_string(), "Undefined variable 'ghost'.\n[line 1]");
        assert!(globals.borrow().get(&ident("ghost")).is_err());
    }

    #[test]
    fn get_at_walks_exact_distance() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define("v", Value::Number(1.0));
        let middle = Environment::with_enclosing(Rc::clone(&outer)).into_ref();
        middle.borrow_mut().define("v", Value::Number(2.0));
        let inner = Environment::with_enclosing(Rc::clone(&middle)).into_ref();

        assert_eq!(
            Environment::get_at(&inner, 2, &ident("v")).unwrap(),
            Value::Number(1.0)
        );
        Environment::assign_at(&inner, 1, &ident("v"), Value::Number(5.0)).unwrap();
        assert_eq!(
            middle.borrow().get(&ident("v")).unwrap(),
            Value::Number(5.0)
        );
    }
}
