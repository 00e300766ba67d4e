use std::collections::BTreeMap;

use crate::lang::error::{Error, Result};
use crate::lang::functions::{Function, FUNCTIONS};

/// Name→value store for one interpreter session
///
/// Flat and unscoped: every assignment is visible to every later lookup in
/// the same session. There is no deletion. Builtin functions are seeded as
/// ordinary bindings so application resolves them the same way it resolves
/// variables.
pub struct Namespace<T> {
    inner: BTreeMap<String, T>,
}

impl<T: Clone> Namespace<T> {
    pub fn new(function_constructor: fn(Function) -> T) -> Self {
        let mut map = BTreeMap::default();

        for func in &*FUNCTIONS {
            map.insert(func.to_string(), function_constructor(*func));
        }

        Namespace { inner: map }
    }

    pub fn get(&self, name: &str) -> Result<&T> {
        self.inner.get(name).ok_or_else(|| Error::unbound(name))
    }

    /// Bind `name` to `val`, overwriting any previous binding, and return
    /// the assigned value
    pub fn set(&mut self, name: String, val: T) -> T {
        self.inner.insert(name, val.clone());
        val
    }
}

#[cfg(test)]
fn test_namespace() -> Namespace<i64> {
    Namespace::new(|_| 0)
}

#[test]
fn test_set_then_get() {
    let mut ns = test_namespace();

    assert_eq!(ns.set("x".to_string(), 5), 5);
    assert_eq!(*ns.get("x").unwrap(), 5);
}

#[test]
fn test_set_overwrites() {
    let mut ns = test_namespace();

    ns.set("x".to_string(), 1);
    ns.set("x".to_string(), 2);
    assert_eq!(*ns.get("x").unwrap(), 2);
}

#[test]
fn test_get_unbound() {
    let ns = test_namespace();

    let err = ns.get("y").unwrap_err();
    assert!(matches!(err, Error::Unbound { name } if name == "y"));
}

#[test]
fn test_builtins_are_seeded() {
    let ns = test_namespace();

    for func in &*FUNCTIONS {
        assert!(ns.get(&func.to_string()).is_ok());
    }
}
