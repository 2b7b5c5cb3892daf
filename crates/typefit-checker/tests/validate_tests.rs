//! Validation engine tests.

use serde_json::{Value, json};
use typefit_checker::{Severity, validate, validate_with};
use typefit_common::TypeId;
use typefit_common::status::GLOBAL_EXTRA;
use typefit_solver::{FacetData, TypeStore};

#[test]
fn test_scalar_kind_checks() {
    let store = TypeStore::new();
    let b = *store.builtins();

    assert!(validate(&store, b.string, &json!("hello")).is_ok());
    assert!(validate(&store, b.string, &json!(42)).is_error());
    assert!(validate(&store, b.number, &json!(3.5)).is_ok());
    assert!(validate(&store, b.boolean, &json!(true)).is_ok());
    assert!(validate(&store, b.integer, &json!(7)).is_ok());
    assert!(validate(&store, b.integer, &json!(7.5)).is_error());
    assert!(validate(&store, b.object, &json!({})).is_ok());
    assert!(validate(&store, b.object, &json!("nope")).is_error());
}

#[test]
fn test_null_rejected_unless_nullable() {
    let mut store = TypeStore::new();
    let b = *store.builtins();

    let strict = validate_with(&store, b.string, &Value::Null, false, false);
    assert!(strict.is_error());
    assert_eq!(strict.code(), "NULL_NOT_ALLOWED");

    let maybe = store.derive("MaybeString", &[b.string, b.nil]);
    assert!(validate_with(&store, maybe, &Value::Null, false, false).is_ok());
    assert!(validate_with(&store, maybe, &json!("text"), false, false).is_ok());
}

#[test]
fn test_required_property_missing() {
    let mut store = TypeStore::new();
    let string = store.builtins().string;
    let person = store.derive_object_type("Person");
    store.declare_property(person, "name", Some(string), false);

    assert!(validate(&store, person, &json!({"name": "Ada"})).is_ok());

    let result = validate(&store, person, &json!({}));
    assert!(result.is_error());
    let errors = result.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), "REQUIRED_PROPERTY_MISSING");
}

#[test]
fn test_property_errors_carry_the_property_path() {
    let mut store = TypeStore::new();
    let string = store.builtins().string;
    let person = store.derive_object_type("Person");
    store.declare_property(person, "name", Some(string), false);

    let result = validate(&store, person, &json!({"name": 42}));
    assert!(result.is_error());
    let errors = result.get_errors();
    assert_eq!(errors[0].path_string(), "name");
}

#[test]
fn test_nested_property_paths_chain_root_to_leaf() {
    let mut store = TypeStore::new();
    let string = store.builtins().string;
    let address = store.derive_object_type("Address");
    store.declare_property(address, "zip", Some(string), false);
    let person = store.derive_object_type("Person");
    store.declare_property(person, "address", Some(address), false);

    let result = validate(&store, person, &json!({"address": {"zip": 12345}}));
    assert!(result.is_error());
    let errors = result.get_errors();
    assert_eq!(errors[0].path_string(), "address/zip");
}

#[test]
fn test_closed_object_rejects_unknown_properties() {
    let mut store = TypeStore::new();
    let string = store.builtins().string;
    let person = store.derive_object_type("Person");
    store.declare_property(person, "name", Some(string), false);
    store.close_unknown_properties(person);

    let result = validate(&store, person, &json!({"name": "Ada", "age": 36}));
    assert!(result.is_error());
    let errors = result.get_errors();
    assert_eq!(errors[0].code(), "UNKNOWN_PROPERTY");
    assert_eq!(errors[0].path_string(), "age");
}

#[test]
fn test_auto_close_demotes_unknown_properties_to_warnings() {
    let mut store = TypeStore::new();
    let string = store.builtins().string;
    let person = store.derive_object_type("Person");
    store.declare_property(person, "name", Some(string), false);

    // open object: fine without auto-close
    let open = validate(&store, person, &json!({"name": "Ada", "age": 36}));
    assert!(open.is_ok());

    let closed = validate_with(&store, person, &json!({"name": "Ada", "age": 36}), true, true);
    assert_eq!(closed.severity(), Severity::Warning);
    let warnings = closed.get_errors();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code(), "UNKNOWN_PROPERTY");
    assert!(warnings[0].is_warning());
}

#[test]
fn test_pattern_properties_open_matching_keys() {
    let mut store = TypeStore::new();
    let b = *store.builtins();
    let config = store.derive_object_type("Config");
    store.declare_map_property(config, "x-*", b.string);
    store.close_unknown_properties(config);

    assert!(validate(&store, config, &json!({"x-trace": "on"})).is_ok());
    let bad_value = validate(&store, config, &json!({"x-trace": 1}));
    assert!(bad_value.is_error());
    let unknown = validate(&store, config, &json!({"trace": "on"}));
    assert!(unknown.is_error());
}

#[test]
fn test_array_component_errors_use_index_segments() {
    let mut store = TypeStore::new();
    let b = *store.builtins();
    let names = store.inherit(b.array, "Names");
    store.add_meta(names, FacetData::ComponentType(b.string));

    assert!(validate(&store, names, &json!(["a", "b"])).is_ok());

    let result = validate(&store, names, &json!(["a", 1, "c"]));
    assert!(result.is_error());
    let errors = result.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path_string(), "1");
}

#[test]
fn test_union_accepts_any_matching_option() {
    let mut store = TypeStore::new();
    let b = *store.builtins();
    let u = store.union("", &[b.string, b.number]);

    assert!(validate(&store, u, &json!("text")).is_ok());
    assert!(validate(&store, u, &json!(4)).is_ok());
}

#[test]
fn test_union_failure_reports_labelled_option_details() {
    let mut store = TypeStore::new();
    let b = *store.builtins();
    let u = store.union("", &[b.string, b.number]);

    let result = validate(&store, u, &json!(true));
    assert!(result.is_error());
    assert_eq!(result.sub_statuses()[0].code(), "UNION_TYPE_FAILURE");
    let details = result.get_errors();
    assert_eq!(details.len(), 2);
    assert!(details[0].message().contains("string: "));
    assert!(details[1].message().contains("number: "));
}

#[test]
fn test_validate_prefers_discriminated_subtype() {
    let mut store = TypeStore::new();
    let (animal, _dog, _cat) = animal_family(&mut store);

    // discriminator resolves to Dog, whose required property is missing
    let result = validate(&store, animal, &json!({"kind": "Dog"}));
    assert!(result.is_error());
    let errors = result.get_errors();
    assert_eq!(errors[0].code(), "REQUIRED_PROPERTY_MISSING");

    let good = validate(&store, animal, &json!({"kind": "Dog", "bark": "woof"}));
    assert!(good.is_ok());
}

#[test]
fn test_unrecognized_discriminator_value_is_a_warning() {
    let mut store = TypeStore::new();
    let (animal, _dog, _cat) = animal_family(&mut store);

    let result = validate(&store, animal, &json!({"kind": "Fish"}));
    assert_eq!(result.severity(), Severity::Warning);
    assert_eq!(result.code(), "INCORRECT_DISCRIMINATOR");
}

#[test]
fn test_missing_discriminator_property_is_an_error() {
    let mut store = TypeStore::new();
    let (animal, _dog, _cat) = animal_family(&mut store);

    let result = validate(&store, animal, &json!({}));
    assert!(result.is_error());
    assert_eq!(result.code(), "MISSING_DISCRIMINATOR");
}

#[test]
fn test_validation_does_not_mutate_results_across_calls() {
    let mut store = TypeStore::new();
    let string = store.builtins().string;
    let person = store.derive_object_type("Person");
    store.declare_property(person, "name", Some(string), false);
    let instance = json!({"name": "Ada"});

    let first = validate(&store, person, &instance);
    let second = validate(&store, person, &instance);
    assert_eq!(first, second);
    assert!(second.is_ok());
}

/// Animal with a `kind` discriminator; Dog requires `bark`, Cat requires
/// `meow`.
fn animal_family(store: &mut TypeStore) -> (TypeId, TypeId, TypeId) {
    let string = store.builtins().string;
    let animal = store.derive_object_type("Animal");
    store.declare_property(animal, "kind", Some(string), false);
    store.add_meta(animal, FacetData::Discriminator("kind".to_string()));
    store.put_extra(animal, GLOBAL_EXTRA, json!(true));

    let dog = store.inherit(animal, "Dog");
    store.declare_property(dog, "bark", Some(string), false);
    store.put_extra(dog, GLOBAL_EXTRA, json!(true));

    let cat = store.inherit(animal, "Cat");
    store.declare_property(cat, "meow", Some(string), false);
    store.put_extra(cat, GLOBAL_EXTRA, json!(true));

    (animal, dog, cat)
}
