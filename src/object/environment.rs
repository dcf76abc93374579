use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::Object;

/// Shared handle to an environment, so closures and enclosed scopes can
/// point at the same frame.
pub type Env = Rc<RefCell<Environment>>;

/// A lexical scope: name bindings plus a pointer to the enclosing scope.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn new_enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    /// Look a name up, walking outwards through the scope chain.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .outer
                .as_ref()
                .and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Bind a name in the current scope, shadowing any outer binding.
    pub fn set(&mut self, name: &str, value: Object) {
        self.store.insert(name.to_owned(), value);
    }

    /// Rebind a name at the nearest scope that defines it. Returns `false`
    /// when no scope does.
    pub fn reassign(&mut self, name: &str, value: Object) -> bool {
        if self.store.contains_key(name) {
            self.store.insert(name.to_owned(), value);
            return true;
        }
        match &self.outer {
            Some(outer) => outer.borrow_mut().reassign(name, value),
            None => false,
        }
    }
}
