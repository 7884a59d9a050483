use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::evaluator::Value;
use crate::natives::NativeOperator;
use crate::types::Type;

fn num(name: &str, n: f64) -> Declaration {
    Declaration::value(name, Type::num(), Value::Number(n))
}

fn string(name: &str, s: &str) -> Declaration {
    Declaration::value(name, Type::string(), Value::from(s))
}

fn negate() -> NativeOperator {
    NativeOperator::new("neg", vec![Type::num()], Type::num(), |stack, _| {
        let n = stack.pop_number()?;
        stack.push(-n);
        Ok(())
    })
}

fn value_of(declaration: &Declaration) -> Option<Value> {
    match &declaration.binding {
        Binding::Value(v) => Some(v.clone()),
        _ => None,
    }
}

// ============================================================================
// Namespace
// ============================================================================

#[test]
fn test_declare_overloads() {
    let ns = Namespace::new("root");
    ns.declare(num("x", 1.0)).unwrap();
    ns.declare(string("x", "one")).unwrap();
    assert_eq!(ns.lookup("x").len(), 2);
    assert_eq!(ns.len(), 2);
    assert_eq!(ns.names(), vec!["x"]);
}

#[test]
fn test_declare_rejects_compatible_duplicate() {
    let ns = Namespace::new("root");
    ns.declare(num("x", 1.0)).unwrap();
    let error = ns.declare(num("x", 2.0)).unwrap_err();
    assert_eq!(
        error,
        DeclarationError::Duplicate {
            name: "x".to_string(),
            ty: Type::num(),
        }
    );

    // A type variable is compatible with everything.
    let t = Type::fresh_var();
    ns.declare(Declaration::value("id", Type::map(vec![t.clone()], t), Value::Help))
        .unwrap();
    assert!(ns
        .declare(Declaration::value(
            "id",
            Type::map(vec![Type::num()], Type::num()),
            Value::Help
        ))
        .is_err());
}

#[test]
fn test_replace_rebinds_compatible() {
    let ns = Namespace::new("root");
    ns.declare(num("x", 1.0)).unwrap();
    ns.declare(string("x", "one")).unwrap();
    let declared = ns.replace(vec![num("x", 2.0)]);
    assert_eq!(declared.len(), 1);

    let overloads = ns.lookup("x");
    assert_eq!(overloads.len(), 2);
    let number = ns.resolve("x", &Type::num()).unwrap();
    assert_eq!(value_of(&number), Some(Value::Number(2.0)));
}

#[test]
fn test_resolve_by_type() {
    let ns = Namespace::new("root");
    ns.declare(num("x", 1.0)).unwrap();
    ns.declare(string("x", "one")).unwrap();
    let found = ns.resolve("x", &Type::string()).unwrap();
    assert_eq!(value_of(&found), Some(Value::from("one")));
    assert!(ns.resolve("x", &Type::bool()).is_none());
    assert!(ns.resolve("y", &Type::num()).is_none());
}

#[test]
fn test_remove_keeps_natives() {
    let registry = NamespaceRegistry::new();
    registry.register(negate()).unwrap();
    let natives = registry.natives();
    natives.replace(vec![Declaration::value(
        "neg",
        Type::string(),
        Value::from("shadow"),
    )]);
    assert_eq!(natives.lookup("neg").len(), 2);
    assert_eq!(natives.remove("neg"), 1);
    assert_eq!(natives.lookup("neg").len(), 1);
    assert!(natives.lookup("neg")[0].is_native());
}

#[test]
fn test_remove_counts_and_forgets() {
    let ns = Namespace::new("me");
    ns.declare(num("x", 1.0)).unwrap();
    ns.declare(string("x", "one")).unwrap();
    assert_eq!(ns.remove("x"), 2);
    assert!(!ns.contains("x"));
    assert!(ns.is_empty());
    assert_eq!(ns.remove("x"), 0);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_get_and_create() {
    let registry = NamespaceRegistry::new();
    assert!(registry.get("me").is_none());
    let me = registry.namespace("me");
    let again = registry.namespace("me");
    assert!(Arc::ptr_eq(&me, &again));
    assert!(registry.get("me").is_some());
    assert_eq!(registry.names(), vec![NATIVES.to_string(), "me".to_string()]);
}

#[test]
fn test_register_in_named_namespace() {
    let registry = NamespaceRegistry::new();
    registry.register_in("math", negate()).unwrap();
    assert!(registry.natives().is_empty());
    assert!(registry.get("math").unwrap().contains("neg"));
}

// ============================================================================
// Stack
// ============================================================================

#[test]
fn test_for_evaluation_frames() {
    let registry = NamespaceRegistry::new();
    let root = registry.namespace("root");
    let me = registry.namespace("me");
    assert_eq!(
        NamespaceStack::for_evaluation(&registry, root.clone(), me).depth(),
        3
    );
    assert_eq!(
        NamespaceStack::for_evaluation(&registry, root.clone(), root).depth(),
        2
    );
}

#[test]
fn test_inner_frames_shadow_per_overload() {
    let registry = NamespaceRegistry::new();
    let root = registry.namespace("root");
    root.declare(num("x", 1.0)).unwrap();
    root.declare(string("x", "one")).unwrap();
    let mut stack = NamespaceStack::for_evaluation(&registry, root.clone(), root);
    let local = stack.push_local();
    local.declare(num("x", 2.0).as_local()).unwrap();

    let visible = stack.lookup_all("x");
    assert_eq!(visible.len(), 2);
    let number = stack.resolve_var("x", &Type::num()).unwrap();
    assert_eq!(value_of(&number), Some(Value::Number(2.0)));
    let text = stack.resolve_var("x", &Type::string()).unwrap();
    assert_eq!(value_of(&text), Some(Value::from("one")));

    stack.pop();
    let number = stack.resolve_var("x", &Type::num()).unwrap();
    assert_eq!(value_of(&number), Some(Value::Number(1.0)));
}

#[test]
fn test_lookup_fresh_renames_globals_only() {
    let registry = NamespaceRegistry::new();
    let root = registry.namespace("root");
    let t = Type::fresh_var();
    root.declare(Declaration::value("id", Type::map(vec![t.clone()], t), Value::Help))
        .unwrap();
    let mut stack = NamespaceStack::for_evaluation(&registry, root.clone(), root);

    let first = stack.lookup_fresh("id");
    let second = stack.lookup_fresh("id");
    assert_eq!(first.len(), 1);
    assert!(first[0].has_vars());
    assert!(first[0] != second[0]);

    let p = Type::fresh_var();
    stack
        .push_local()
        .declare(Declaration::parameter("p", p.clone()))
        .unwrap();
    assert_eq!(stack.lookup_fresh("p"), vec![p.clone()]);
    assert_eq!(stack.lookup_fresh("p"), vec![p]);
}

#[test]
fn test_resolve_var_unresolved() {
    let registry = NamespaceRegistry::new();
    let root = registry.namespace("root");
    root.declare(num("x", 1.0)).unwrap();
    let stack = NamespaceStack::for_evaluation(&registry, root.clone(), root);
    assert_eq!(
        stack.resolve_var("x", &Type::string()).unwrap_err(),
        DeclarationError::Unresolved {
            name: "x".to_string(),
            expected: Type::string(),
        }
    );
}
