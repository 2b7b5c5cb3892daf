//! Facet-level constraint checks.
//!
//! `check_restriction` interprets a type's effective restriction list:
//! plain facets check directly, `AllOf` folds every part into one
//! aggregate, and `AnyOf` (union options) succeeds when at least one
//! option's conjunction passes; otherwise every failing option's leaf
//! diagnostics are reported, each prefixed with the option's label, under
//! a single union-failure summary.

use crate::validate::Validator;
use globset::{Glob, GlobMatcher};
use serde_json::Value;
use tracing::warn;
use typefit_common::messages::{self, message_text};
use typefit_common::status::ok;
use typefit_common::{Severity, Status, StatusSource, TypeId, ValidationPath};
use typefit_solver::{Facet, FacetData, Restriction, ValueKind};

impl Validator<'_> {
    pub(crate) fn check_restriction(&mut self, restriction: &Restriction, instance: &Value) -> Status {
        match restriction {
            Restriction::Facet(facet) => self.check_facet(facet, instance),
            Restriction::AllOf(parts) => {
                let mut result = ok();
                for part in parts {
                    result.add_sub_status(self.check_restriction(part, instance), None);
                }
                result
            }
            Restriction::AnyOf { owner, options } => self.check_any_of(*owner, options, instance),
        }
    }

    fn check_any_of(
        &mut self,
        owner: TypeId,
        options: &[(TypeId, Vec<Restriction>)],
        instance: &Value,
    ) -> Status {
        if options.is_empty() {
            return ok();
        }
        let mut failures: Vec<(TypeId, Status)> = Vec::new();
        for (option, restrictions) in options {
            let mut st = Status::ok_for(StatusSource::Type(*option));
            for r in restrictions {
                st.add_sub_status(self.check_restriction(r, instance), None);
            }
            if st.is_ok() {
                return ok();
            }
            failures.push((*option, st));
        }
        let mut overall = Status::ok_for(StatusSource::Type(owner));
        for (option, st) in failures {
            let label = self.store().label(option);
            for leaf in st.get_errors() {
                let msg = format!("{}: {}", label, leaf.message());
                let mut detail = Status::new(
                    leaf.severity(),
                    messages::UNION_TYPE_FAILURE_DETAILS.code,
                    message_text(&messages::UNION_TYPE_FAILURE_DETAILS, &[("msg", &msg)]),
                    StatusSource::Type(option),
                );
                if let Some(path) = leaf.validation_path() {
                    detail.prefix_path(path);
                }
                overall.add_sub_status(detail, None);
            }
        }
        overall.set_code(messages::UNION_TYPE_FAILURE.code);
        overall.set_message(message_text(&messages::UNION_TYPE_FAILURE, &[]));
        overall
    }

    pub(crate) fn check_facet(&mut self, facet: &Facet, instance: &Value) -> Status {
        let source = StatusSource::Facet {
            owner: facet.owner(),
            facet: facet.facet_name(),
        };
        match facet.data() {
            // Metadata facets never reject anything on their own.
            FacetData::Modifier(_)
            | FacetData::Discriminator(_)
            | FacetData::DiscriminatorValue { .. }
            | FacetData::HasPropertiesFacet => ok(),

            FacetData::TypeOf(expected) => {
                if instance.is_null() {
                    return ok();
                }
                match ValueKind::of(instance) {
                    Some(actual) if actual == *expected => ok(),
                    _ => Status::error(
                        &messages::TYPE_EXPECTED,
                        source,
                        &[("typeName", expected.name())],
                    ),
                }
            }
            FacetData::IntegerKind => match instance {
                Value::Null => ok(),
                Value::Number(n)
                    if n.is_i64()
                        || n.is_u64()
                        || n.as_f64().is_some_and(|f| f.fract() == 0.0) =>
                {
                    ok()
                }
                _ => Status::error(&messages::INTEGER_EXPECTED, source, &[]),
            },
            FacetData::NullKind => match instance {
                Value::Null => ok(),
                Value::String(s) if s == "null" => ok(),
                _ => Status::error(&messages::NULL_EXPECTED, source, &[]),
            },
            FacetData::ScalarKind => match instance {
                Value::Null | Value::Number(_) | Value::String(_) | Value::Bool(_) => ok(),
                _ => Status::error(&messages::SCALAR_EXPECTED, source, &[]),
            },

            FacetData::Nothing => {
                if instance.is_null() {
                    ok()
                } else {
                    Status::error(&messages::NOTHING, source, &[])
                }
            }
            FacetData::NothingWithLocation { message, .. } => {
                if instance.is_null() {
                    ok()
                } else {
                    Status::new(Severity::Error, messages::NOTHING.code, message.as_str(), source)
                }
            }

            FacetData::KnownProperties => self.check_known_properties(facet.owner(), instance),
            FacetData::HasProperty(name) => match instance {
                Value::Object(map) if !map.contains_key(name) => Status::error(
                    &messages::REQUIRED_PROPERTY_MISSING,
                    source,
                    &[("propName", name)],
                ),
                _ => ok(),
            },
            FacetData::PropertyIs { name, range } => {
                let Value::Object(map) = instance else {
                    return ok();
                };
                let Some(value) = map.get(name) else {
                    return ok();
                };
                let mut result = Status::ok_for(source);
                let st = self.validate_direct(*range, value, false, false);
                result.add_sub_status(st, Some(name));
                result
            }
            FacetData::MapPropertyIs { pattern, range } => {
                let Value::Object(map) = instance else {
                    return ok();
                };
                let Some(matcher) = compile_pattern(pattern) else {
                    return ok();
                };
                let mut result = Status::ok_for(source);
                for (key, value) in map {
                    if matcher.is_match(key) {
                        let st = self.validate_direct(*range, value, false, false);
                        result.add_sub_status(st, Some(key));
                    }
                }
                result
            }
            FacetData::AdditionalPropertyIs { range } => {
                let Value::Object(map) = instance else {
                    return ok();
                };
                let explicit: Vec<String> = self
                    .store()
                    .properties(facet.owner())
                    .into_iter()
                    .filter(|p| !p.is_pattern && !p.is_additional)
                    .map(|p| p.name)
                    .collect();
                let patterns: Vec<GlobMatcher> = self
                    .store()
                    .properties(facet.owner())
                    .into_iter()
                    .filter(|p| p.is_pattern)
                    .filter_map(|p| compile_pattern(&p.name))
                    .collect();
                let mut result = Status::ok_for(source);
                for (key, value) in map {
                    if explicit.iter().any(|n| n == key)
                        || patterns.iter().any(|m| m.is_match(key))
                    {
                        continue;
                    }
                    let st = self.validate_direct(*range, value, false, false);
                    result.add_sub_status(st, Some(key));
                }
                result
            }
            FacetData::ComponentType(component) => {
                let Value::Array(items) = instance else {
                    return ok();
                };
                let mut result = Status::ok_for(source);
                for (index, item) in items.iter().enumerate() {
                    let st = self.validate_direct(*component, item, false, false);
                    let segment = index.to_string();
                    result.add_sub_status(st, Some(segment.as_str()));
                }
                result
            }

            FacetData::Custom(constraint) => constraint.check(instance, None),
        }
    }

    /// The closed-object check: reject object keys matched by no declared
    /// property facet. An additional-properties facet opens the object
    /// entirely.
    pub(crate) fn check_known_properties(&mut self, t: TypeId, instance: &Value) -> Status {
        let Value::Object(map) = instance else {
            return ok();
        };
        let mut names: Vec<String> = Vec::new();
        let mut patterns: Vec<GlobMatcher> = Vec::new();
        for facet in self.store().known_properties(t) {
            match facet.data() {
                FacetData::PropertyIs { name, .. } => names.push(name.clone()),
                FacetData::MapPropertyIs { pattern, .. } => {
                    if let Some(matcher) = compile_pattern(pattern) {
                        patterns.push(matcher);
                    }
                }
                FacetData::AdditionalPropertyIs { .. } => return ok(),
                _ => {}
            }
        }
        let mut result = Status::ok_for(StatusSource::Type(t));
        for key in map.keys() {
            if names.iter().any(|n| n == key) || patterns.iter().any(|m| m.is_match(key)) {
                continue;
            }
            let mut unknown = Status::error(
                &messages::UNKNOWN_PROPERTY,
                StatusSource::Type(t),
                &[("propName", key)],
            );
            unknown.prefix_path(&ValidationPath::single(key));
            result.add_sub_status(unknown, None);
        }
        result
    }
}

fn compile_pattern(pattern: &str) -> Option<GlobMatcher> {
    match Glob::new(pattern) {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(error) => {
            warn!(pattern, %error, "unparseable property pattern, treating as non-matching");
            None
        }
    }
}
