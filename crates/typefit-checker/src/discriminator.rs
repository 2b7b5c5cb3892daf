//! Discriminator checks for the subtype scan.
//!
//! A discriminator declaration names a property whose value tells family
//! members apart. The expected value for a member defaults to the name of
//! the nearest ancestor marked as a global declaration, overridden by an
//! explicit discriminator-value facet on the member itself.

use serde_json::Value;
use typefit_common::status::GLOBAL_EXTRA;
use typefit_common::{
    Severity, Status, StatusSource, TypeId, ValidationPath, messages,
};
use typefit_solver::TypeStore;

/// Outcome of a discriminator check against one candidate type.
#[derive(Clone, Debug)]
pub enum DiscriminatorVerdict {
    /// The candidate declares no discriminator, has no global ancestor to
    /// derive an expected value from, or the expected value is empty.
    NotApplicable,
    /// The instance carries the expected discriminator value.
    Ok,
    /// The instance is missing the discriminator property (an error) or
    /// carries a different value (a warning).
    Failed(Status),
}

impl DiscriminatorVerdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, DiscriminatorVerdict::Ok)
    }
}

pub fn check_discriminator(
    store: &TypeStore,
    t: TypeId,
    instance: &Value,
    path: Option<&ValidationPath>,
) -> DiscriminatorVerdict {
    let Some(prop) = store.discriminator(t) else {
        return DiscriminatorVerdict::NotApplicable;
    };
    let mut lineage = vec![t];
    lineage.extend(store.all_super_types(t));
    let Some(owner) = lineage
        .into_iter()
        .find(|&x| store.def(x).get_extra(GLOBAL_EXTRA).is_some())
    else {
        return DiscriminatorVerdict::NotApplicable;
    };
    let expected = match store.discriminator_value(t) {
        Some(value) => value,
        None => Value::String(store.name(owner).to_string()),
    };
    if expected.is_null() || expected.as_str().is_some_and(str::is_empty) {
        return DiscriminatorVerdict::NotApplicable;
    }
    if instance.is_null() {
        return DiscriminatorVerdict::NotApplicable;
    }
    match instance.get(&prop) {
        None => {
            let mut err = Status::error(
                &messages::MISSING_DISCRIMINATOR,
                StatusSource::Type(t),
                &[("rootType", store.name(owner)), ("propName", &prop)],
            );
            if let Some(p) = path {
                err.prefix_path(p);
            }
            DiscriminatorVerdict::Failed(err)
        }
        Some(actual) if discriminator_matches(actual, &expected) => DiscriminatorVerdict::Ok,
        Some(actual) => {
            let rendered = render(actual);
            let mut wrng = Status::from_entry(
                &messages::INCORRECT_DISCRIMINATOR,
                StatusSource::Type(t),
                &[
                    ("rootType", store.name(owner)),
                    ("value", &rendered),
                    ("propName", &prop),
                ],
                Severity::Warning,
            );
            wrng.prefix_path(&ValidationPath::single(&prop));
            if let Some(p) = path {
                wrng.prefix_path(p);
            }
            DiscriminatorVerdict::Failed(wrng)
        }
    }
}

/// Value comparison for discriminators; string and non-string renderings
/// of the same scalar compare equal.
fn discriminator_matches(actual: &Value, expected: &Value) -> bool {
    actual == expected || render(actual) == render(expected)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
