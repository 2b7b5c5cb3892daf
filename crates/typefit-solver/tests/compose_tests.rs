//! Constraint composition and contradiction tests.

use typefit_solver::{Composer, Composition, FacetData, TypeStore, ValueKind, restrictions_conflict};

#[test]
fn test_equal_type_of_composes_to_itself() {
    let mut store = TypeStore::new();
    let mut composer = Composer::new(&mut store);
    let left = FacetData::TypeOf(ValueKind::String);
    let right = FacetData::TypeOf(ValueKind::String);
    match composer.try_compose(&left, &right) {
        Composition::Composed(FacetData::TypeOf(ValueKind::String)) => {}
        other => panic!("expected composed type-of, got {other:?}"),
    }
}

#[test]
fn test_conflicting_type_of_is_a_contradiction() {
    let mut store = TypeStore::new();
    let mut composer = Composer::new(&mut store);
    let left = FacetData::TypeOf(ValueKind::String);
    let right = FacetData::TypeOf(ValueKind::Number);
    match composer.try_compose(&left, &right) {
        Composition::Contradiction(FacetData::NothingWithLocation { chain, .. }) => {
            // the left operand is on the stack when the conflict is found
            assert_eq!(chain.len(), 1);
        }
        other => panic!("expected contradiction, got {other:?}"),
    }
}

#[test]
fn test_same_property_ranges_are_intersected() {
    let mut store = TypeStore::new();
    let object = store.builtins().object;
    let a = store.inherit(object, "A");
    let b = store.inherit(object, "B");
    let mut composer = Composer::new(&mut store);
    let left = FacetData::PropertyIs {
        name: "x".to_string(),
        range: a,
    };
    let right = FacetData::PropertyIs {
        name: "x".to_string(),
        range: b,
    };
    let Composition::Composed(FacetData::PropertyIs { name, range }) =
        composer.try_compose(&left, &right)
    else {
        panic!("expected composed property restriction");
    };
    assert_eq!(name, "x");
    assert!(composer.store().is_intersection(range));
    let options = composer.store().all_options(range);
    assert_eq!(options, vec![a, b]);
}

#[test]
fn test_component_types_are_intersected() {
    let mut store = TypeStore::new();
    let object = store.builtins().object;
    let a = store.inherit(object, "A");
    let b = store.inherit(object, "B");
    let mut composer = Composer::new(&mut store);
    let Composition::Composed(FacetData::ComponentType(ct)) = composer.try_compose(
        &FacetData::ComponentType(a),
        &FacetData::ComponentType(b),
    ) else {
        panic!("expected composed component type");
    };
    assert!(composer.store().is_intersection(ct));
}

#[test]
fn test_intersect_is_memoized_per_unordered_pair() {
    let mut store = TypeStore::new();
    let object = store.builtins().object;
    let a = store.inherit(object, "A");
    let b = store.inherit(object, "B");

    let first = store.intersect(a, b);
    let second = store.intersect(b, a);
    assert_eq!(first, second);
}

#[test]
fn test_unrelated_constraints_do_not_compose() {
    let mut store = TypeStore::new();
    let mut composer = Composer::new(&mut store);
    let left = FacetData::HasProperty("x".to_string());
    let right = FacetData::HasProperty("y".to_string());
    assert!(matches!(
        composer.try_compose(&left, &right),
        Composition::Unknown
    ));
}

#[test]
fn test_conjunction_collapses_on_contradiction() {
    let mut store = TypeStore::new();
    let mut composer = Composer::new(&mut store);
    let constraints = vec![
        FacetData::HasProperty("x".to_string()),
        FacetData::TypeOf(ValueKind::String),
        FacetData::TypeOf(ValueKind::Object),
    ];
    let out = composer.optimize_conjunction(&constraints);
    assert_eq!(out.len(), 1);
    assert!(matches!(out[0], FacetData::NothingWithLocation { .. }));
}

#[test]
fn test_conjunction_merges_duplicates() {
    let mut store = TypeStore::new();
    let mut composer = Composer::new(&mut store);
    let constraints = vec![
        FacetData::TypeOf(ValueKind::Object),
        FacetData::KnownProperties,
        FacetData::TypeOf(ValueKind::Object),
        FacetData::KnownProperties,
    ];
    let out = composer.optimize_conjunction(&constraints);
    assert_eq!(out.len(), 2);
}

#[test]
fn test_restrictions_conflict_carries_the_composition_stack() {
    let mut store = TypeStore::new();
    let owner = store.builtins().object;
    let mut composer = Composer::new(&mut store);
    let Composition::Contradiction(nothing) = composer.try_compose(
        &FacetData::TypeOf(ValueKind::String),
        &FacetData::TypeOf(ValueKind::Number),
    ) else {
        panic!("expected contradiction");
    };
    let status = restrictions_conflict(&nothing, owner);
    assert!(status.is_error());
    assert_eq!(status.code(), "RESTRICTIONS_CONFLICT");
    let stack = status.get_extra("restrictionStack").unwrap();
    assert_eq!(stack.as_array().unwrap().len(), 1);
}
