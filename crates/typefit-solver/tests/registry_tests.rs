//! Name-scoped registry tests.

use std::sync::Arc;
use typefit_solver::{TypeRegistry, TypeStore};

#[test]
fn test_builtin_registry_resolves_classic_names() {
    let store = TypeStore::new();
    let registry = store.builtin_registry();
    assert_eq!(registry.get("string"), Some(store.builtins().string));
    assert_eq!(registry.get("integer"), Some(store.builtins().integer));
    assert_eq!(registry.get("object"), Some(store.builtins().object));
    assert_eq!(registry.get("no-such-type"), None);
}

#[test]
fn test_child_scope_shadows_parent() {
    let mut store = TypeStore::new();
    let parent_registry = Arc::clone(store.builtin_registry());
    let object = store.builtins().object;
    let my_string = store.inherit(object, "string");

    let mut scope = TypeRegistry::with_parent(parent_registry);
    scope.add_type(&store, my_string);

    assert_eq!(scope.get("string"), Some(my_string));
    assert_eq!(scope.get("integer"), Some(store.builtins().integer));
}

#[test]
fn test_reregistering_a_name_shadows_the_earlier_entry() {
    let mut store = TypeStore::new();
    let object = store.builtins().object;
    let first = store.inherit(object, "T");
    let second = store.inherit(object, "T");

    let mut registry = TypeRegistry::new();
    registry.add_type(&store, first);
    registry.add_type(&store, second);

    assert_eq!(registry.get("T"), Some(second));
    assert_eq!(registry.types().count(), 1);
}

#[test]
fn test_anonymous_types_are_not_registered() {
    let mut store = TypeStore::new();
    let object = store.builtins().object;
    let anon = store.inherit(object, "");

    let mut registry = TypeRegistry::new();
    registry.add_type(&store, anon);
    assert_eq!(registry.types().count(), 0);
}

#[test]
fn test_put_registers_under_alias() {
    let mut store = TypeStore::new();
    let object = store.builtins().object;
    let t = store.inherit(object, "LongName");

    let mut registry = TypeRegistry::new();
    registry.put("short", t);
    assert_eq!(registry.get("short"), Some(t));
    assert_eq!(registry.get("LongName"), None);
}
