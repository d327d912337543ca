//! Environment for variable scoping in the interpreter.
//!
//! Scopes form a parent-linked chain. Blocks and loops push a child of the
//! current scope; function calls switch to a child of the function's
//! captured scope and switch back when the call returns.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::Value;

/// A single-threaded wrapper for reference-counted interior mutability.
///
/// Wraps `Rc<RefCell<T>>` so that every shared, mutable allocation in the
/// evaluator (scopes and tables) goes through one factory method.
///
/// `LocalScope<T>` is NOT thread-safe. The interpreter runs single-threaded.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    /// Create a new `LocalScope` wrapping the given value.
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Borrow the inner value immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the inner value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether both handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Error returned by `Scope::assign` when no scope binds the name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unbound;

/// A single scope containing variable bindings.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<String, Value>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    /// Create a new empty scope with no parent.
    pub fn new() -> Self {
        Scope::default()
    }

    /// Create a new scope with a parent.
    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Define a variable in this scope, replacing any binding of the same name.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a variable, walking parent scopes.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref()?.borrow().lookup(name)
    }

    /// Innermost binding of `name` that satisfies `accept`, skipping
    /// bindings that shadow it without matching.
    pub fn find(&self, name: &str, accept: fn(&Value) -> bool) -> Option<Value> {
        match self.bindings.get(name) {
            Some(value) if accept(value) => Some(value.clone()),
            _ => self.parent.as_ref()?.borrow().find(name, accept),
        }
    }

    /// Whether this scope itself binds `name`.
    pub fn binds(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Update the innermost binding of `name`.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), Unbound> {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(Unbound),
        }
    }

    pub fn parent(&self) -> Option<&LocalScope<Scope>> {
        self.parent.as_ref()
    }

    /// Drop every binding. Breaks reference cycles between functions and
    /// the scopes that captured them.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

/// Environment for variable lookup.
pub struct Environment {
    current: LocalScope<Scope>,
    global: LocalScope<Scope>,
}

impl Environment {
    /// Create a new environment with a global scope.
    pub fn new() -> Self {
        let global = LocalScope::new(Scope::new());
        Environment {
            current: global.clone(),
            global,
        }
    }

    /// Push a new child scope.
    pub fn push_scope(&mut self) {
        let child = LocalScope::new(Scope::with_parent(self.current.clone()));
        self.current = child;
    }

    /// Pop back to the parent scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        let parent = self.current.borrow().parent().cloned();
        if let Some(parent) = parent {
            self.current = parent;
        }
    }

    /// Make `scope` current and return the scope that was current before.
    pub fn enter(&mut self, scope: LocalScope<Scope>) -> LocalScope<Scope> {
        std::mem::replace(&mut self.current, scope)
    }

    /// Restore a scope previously returned by [`Environment::enter`].
    pub fn restore(&mut self, scope: LocalScope<Scope>) {
        self.current = scope;
    }

    /// The innermost scope, for closures to capture.
    pub fn current_scope(&self) -> LocalScope<Scope> {
        self.current.clone()
    }

    /// Define a variable in the current scope.
    #[inline]
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.current.borrow_mut().define(name, value);
    }

    /// Define a variable in the global scope.
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.global.borrow_mut().define(name, value);
    }

    /// Look up a variable.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.current.borrow().lookup(name)
    }

    /// Look up a table or query result. Row aliases share the table's name
    /// inside its own row scope, so those bindings are skipped.
    pub fn lookup_relation(&self, name: &str) -> Option<Value> {
        self.current
            .borrow()
            .find(name, |value| matches!(value, Value::Table(_) | Value::SqlResult(_)))
    }

    /// Assign to the innermost binding of `name`; bind it in the current
    /// scope if no scope does.
    pub fn assign(&mut self, name: &str, value: Value) {
        let unbound = self.current.borrow_mut().assign(name, value.clone());
        if unbound.is_err() {
            self.define(name, value);
        }
    }

    /// Drop every global binding.
    pub fn clear_global(&mut self) {
        self.global.borrow_mut().clear();
    }

    /// Whether the environment is at the global scope.
    pub fn is_global(&self) -> bool {
        self.current.ptr_eq(&self.global)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
