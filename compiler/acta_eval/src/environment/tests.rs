use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_scope_define_lookup() {
    let mut scope = Scope::new();
    scope.define("x", Value::Int(42));
    assert_eq!(scope.lookup("x"), Some(Value::Int(42)));
    assert_eq!(scope.lookup("y"), None);
}

#[test]
fn test_scope_shadowing() {
    let parent = LocalScope::new(Scope::new());
    parent.borrow_mut().define("x", Value::Int(1));

    let mut child = Scope::with_parent(parent.clone());
    child.define("x", Value::Int(2));

    assert_eq!(child.lookup("x"), Some(Value::Int(2)));
    assert_eq!(parent.borrow().lookup("x"), Some(Value::Int(1)));
}

#[test]
fn test_scope_assign_unbound() {
    let mut scope = Scope::new();
    assert_eq!(scope.assign("missing", Value::Null), Err(Unbound));
}

#[test]
fn test_environment_push_pop() {
    let mut env = Environment::new();
    env.define("x", Value::Int(1));

    env.push_scope();
    env.define("x", Value::Int(2));
    assert_eq!(env.lookup("x"), Some(Value::Int(2)));

    env.pop_scope();
    assert_eq!(env.lookup("x"), Some(Value::Int(1)));
    assert!(env.is_global());
}

#[test]
fn test_pop_global_is_noop() {
    let mut env = Environment::new();
    env.define("x", Value::Int(1));
    env.pop_scope();
    assert_eq!(env.lookup("x"), Some(Value::Int(1)));
}

#[test]
fn test_assign_updates_binding_scope() {
    let mut env = Environment::new();
    env.define("total", Value::Int(0));

    env.push_scope();
    env.assign("total", Value::Int(5));
    env.pop_scope();

    assert_eq!(env.lookup("total"), Some(Value::Int(5)));
}

#[test]
fn test_assign_unbound_defines_locally() {
    let mut env = Environment::new();
    env.push_scope();
    env.assign("fresh", Value::Bool(true));
    assert_eq!(env.lookup("fresh"), Some(Value::Bool(true)));

    env.pop_scope();
    assert_eq!(env.lookup("fresh"), None);
}

#[test]
fn test_enter_and_restore() {
    let mut env = Environment::new();
    env.define("outer", Value::Int(1));

    let captured = LocalScope::new(Scope::new());
    captured.borrow_mut().define("inner", Value::Int(2));

    let previous = env.enter(LocalScope::new(Scope::with_parent(captured)));
    assert_eq!(env.lookup("inner"), Some(Value::Int(2)));
    assert_eq!(env.lookup("outer"), None);

    env.restore(previous);
    assert_eq!(env.lookup("outer"), Some(Value::Int(1)));
    assert_eq!(env.lookup("inner"), None);
}

#[test]
fn test_define_global_from_nested_scope() {
    let mut env = Environment::new();
    env.push_scope();
    env.define_global("limit", Value::Int(10));
    env.pop_scope();
    assert_eq!(env.lookup("limit"), Some(Value::Int(10)));
}
