//! Automatic classification tests.

use serde_json::json;
use typefit_checker::{DiscriminatorVerdict, ac, can_do_ac, check_discriminator};
use typefit_common::TypeId;
use typefit_common::status::GLOBAL_EXTRA;
use typefit_solver::{FacetData, ModifierKind, TypeStore};

/// Polymorphic Animal root with a `kind` discriminator and optional
/// member-specific properties.
fn animal_family(store: &mut TypeStore) -> (TypeId, TypeId, TypeId) {
    let string = store.builtins().string;
    let animal = store.derive_object_type("Animal");
    store.declare_property(animal, "kind", Some(string), false);
    store.add_meta(animal, FacetData::Discriminator("kind".to_string()));
    store.add_meta(animal, FacetData::Modifier(ModifierKind::Polymorphic));
    store.add_meta(animal, FacetData::Modifier(ModifierKind::Abstract));
    store.put_extra(animal, GLOBAL_EXTRA, json!(true));

    let dog = store.inherit(animal, "Dog");
    store.declare_property(dog, "bark", Some(string), true);
    store.put_extra(dog, GLOBAL_EXTRA, json!(true));

    let cat = store.inherit(animal, "Cat");
    store.declare_property(cat, "meow", Some(string), true);
    store.put_extra(cat, GLOBAL_EXTRA, json!(true));

    (animal, dog, cat)
}

#[test]
fn test_non_polymorphic_type_classifies_to_itself() {
    let mut store = TypeStore::new();
    let string = store.builtins().string;
    let person = store.derive_object_type("Person");
    store.declare_property(person, "name", Some(string), false);

    assert_eq!(ac(&store, person, &json!({"anything": 1})), person);
}

#[test]
fn test_discriminator_picks_the_family_member() {
    let mut store = TypeStore::new();
    let (animal, dog, cat) = animal_family(&mut store);

    assert_eq!(ac(&store, animal, &json!({"kind": "Dog"})), dog);
    assert_eq!(ac(&store, animal, &json!({"kind": "Cat"})), cat);
}

#[test]
fn test_unmatched_instance_classifies_to_nothing() {
    let mut store = TypeStore::new();
    let (animal, _dog, _cat) = animal_family(&mut store);
    let nothing = store.builtins().nothing;

    // no member validates a scalar instance
    assert_eq!(ac(&store, animal, &json!("not an animal")), nothing);
    // both members validate, but no discriminator value matches
    assert_eq!(ac(&store, animal, &json!({"kind": "Fish"})), nothing);
}

#[test]
fn test_singleton_family_needs_no_discrimination() {
    let mut store = TypeStore::new();
    let string = store.builtins().string;
    let shape = store.derive_object_type("Shape");
    store.add_meta(shape, FacetData::Modifier(ModifierKind::Polymorphic));
    store.add_meta(shape, FacetData::Modifier(ModifierKind::Abstract));
    let circle = store.inherit(shape, "Circle");
    store.declare_property(circle, "radius", Some(string), true);

    assert_eq!(ac(&store, shape, &json!({})), circle);
}

#[test]
fn test_scalar_union_prefers_the_runtime_kind() {
    let mut store = TypeStore::new();
    let b = *store.builtins();
    let u = store.union("", &[b.string, b.number]);

    assert_eq!(ac(&store, u, &json!("text")), b.string);
    // number and integer both accept 5; the scalar supertype wins
    assert_eq!(ac(&store, u, &json!(5)), b.number);
}

#[test]
fn test_polymorphic_scalar_checks_the_runtime_kind() {
    let mut store = TypeStore::new();
    let number = store.builtins().number;
    let nothing = store.builtins().nothing;
    let amount = store.inherit(number, "Amount");
    store.add_meta(amount, FacetData::Modifier(ModifierKind::Polymorphic));

    assert_eq!(ac(&store, amount, &json!(12)), amount);
    assert_eq!(ac(&store, amount, &json!("12")), nothing);
}

#[test]
fn test_can_do_ac_accepts_discriminated_family() {
    let mut store = TypeStore::new();
    let (animal, _dog, _cat) = animal_family(&mut store);
    assert!(can_do_ac(&store, animal).is_ok());
}

#[test]
fn test_can_do_ac_flags_missing_discriminator() {
    let mut store = TypeStore::new();
    let shape = store.derive_object_type("Shape");
    store.add_meta(shape, FacetData::Modifier(ModifierKind::Abstract));
    store.inherit(shape, "Circle");
    store.inherit(shape, "Square");

    let result = can_do_ac(&store, shape);
    assert!(result.is_error());
    assert_eq!(result.get_errors()[0].code(), "DISCRIMINATOR_NEEDED");
}

#[test]
fn test_can_do_ac_flags_shared_discriminator_value() {
    let mut store = TypeStore::new();
    let (animal, dog, cat) = animal_family(&mut store);
    store.add_meta(
        dog,
        FacetData::DiscriminatorValue {
            value: json!("pet"),
            strict: true,
        },
    );
    store.add_meta(
        cat,
        FacetData::DiscriminatorValue {
            value: json!("pet"),
            strict: true,
        },
    );

    let result = can_do_ac(&store, animal);
    assert!(result.is_error());
    assert_eq!(result.get_errors()[0].code(), "SAME_DISCRIMINATOR_VALUE");
}

#[test]
fn test_can_do_ac_accepts_scalar_pairs() {
    let mut store = TypeStore::new();
    let b = *store.builtins();
    let u = store.union("", &[b.string, b.number]);
    assert!(can_do_ac(&store, u).is_ok());
}

#[test]
fn test_discriminator_verdicts() {
    let mut store = TypeStore::new();
    let (_animal, dog, _cat) = animal_family(&mut store);

    assert!(check_discriminator(&store, dog, &json!({"kind": "Dog"}), None).is_ok());

    match check_discriminator(&store, dog, &json!({}), None) {
        DiscriminatorVerdict::Failed(status) => {
            assert!(status.is_error());
            assert_eq!(status.code(), "MISSING_DISCRIMINATOR");
        }
        other => panic!("expected a failed verdict, got {other:?}"),
    }

    match check_discriminator(&store, dog, &json!({"kind": "Hamster"}), None) {
        DiscriminatorVerdict::Failed(status) => {
            assert!(status.is_warning());
            assert_eq!(status.code(), "INCORRECT_DISCRIMINATOR");
            assert_eq!(status.path_string(), "kind");
        }
        other => panic!("expected a failed verdict, got {other:?}"),
    }
}

#[test]
fn test_discriminator_not_applicable_without_declaration() {
    let store = TypeStore::new();
    let object = store.builtins().object;
    assert!(matches!(
        check_discriminator(&store, object, &json!({}), None),
        DiscriminatorVerdict::NotApplicable
    ));
}

#[test]
fn test_explicit_discriminator_value_overrides_the_name() {
    let mut store = TypeStore::new();
    let (animal, dog, _cat) = animal_family(&mut store);
    store.add_meta(
        dog,
        FacetData::DiscriminatorValue {
            value: json!("doggo"),
            strict: true,
        },
    );

    assert_eq!(ac(&store, animal, &json!({"kind": "doggo"})), dog);
    assert!(check_discriminator(&store, dog, &json!({"kind": "doggo"}), None).is_ok());
}
