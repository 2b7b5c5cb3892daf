//! The validation engine.
//!
//! `validate_direct` checks an instance against one type without any
//! subtype scanning: the null gate, the type's effective restriction list,
//! and (under auto-close) a synthesized closed-object check whose
//! violations are demoted to warnings.
//!
//! `validate` is the top-level entry: it scans [every direct subtype,
//! then self], computing a discriminator verdict and a direct-validation
//! verdict per candidate. A passing discriminator short-circuits to that
//! candidate's result; with no discriminator verdict, the first OK direct
//! validation wins; otherwise the last candidate's result is the fallback.
//! When discriminator checks failed along the way, the last recorded
//! failure is returned instead; earlier failures are discarded.

use crate::discriminator::{DiscriminatorVerdict, check_discriminator};
use serde_json::Value;
use tracing::{debug, trace};
use typefit_common::status::ok;
use typefit_common::{Severity, Status, StatusSource, TypeId, messages};
use typefit_solver::{TypeKind, TypeStore};

/// Call-scoped validation state: the auto-close flag and the marker naming
/// the type currently being validated. Both follow a save/restore
/// discipline on every entry and exit path of `validate_direct`, so a
/// finished call never leaks state into the next one.
pub struct Validator<'a> {
    store: &'a TypeStore,
    auto_close: bool,
    validated_type: Option<TypeId>,
}

impl<'a> Validator<'a> {
    pub fn new(store: &'a TypeStore) -> Self {
        Self {
            store,
            auto_close: false,
            validated_type: None,
        }
    }

    pub fn store(&self) -> &TypeStore {
        self.store
    }

    /// Whether the surrounding call tree requested closed-object
    /// enforcement.
    pub fn auto_close_active(&self) -> bool {
        self.auto_close
    }

    /// The top-level type of the validation currently in flight, visible
    /// to nested constraint checks.
    pub fn validated_type(&self) -> Option<TypeId> {
        self.validated_type
    }

    /// Validate `instance` against `t` without performing any subtype
    /// scan or classification.
    pub fn validate_direct(
        &mut self,
        t: TypeId,
        instance: &Value,
        auto_close: bool,
        null_allowed: bool,
    ) -> Status {
        let saved_auto_close = self.auto_close;
        let saved_validated = self.validated_type;
        if auto_close {
            self.auto_close = true;
        }
        self.validated_type = Some(t);
        let result = self.validate_direct_inner(t, instance, auto_close, null_allowed);
        self.auto_close = saved_auto_close;
        self.validated_type = saved_validated;
        result
    }

    fn validate_direct_inner(
        &mut self,
        t: TypeId,
        instance: &Value,
        auto_close: bool,
        null_allowed: bool,
    ) -> Status {
        trace!(t = t.0, label = %self.store.label(t), "validate_direct");
        if !null_allowed && instance.is_null() && !self.store.def(t).is_nullable() {
            return Status::error(&messages::OBJECT_EXPECTED, StatusSource::Type(t), &[]);
        }
        let mut result = Status::ok_for(StatusSource::Type(t));
        for restriction in self.store.restrictions(t, true) {
            let st = self.check_restriction(&restriction, instance);
            result.add_sub_status(st, None);
        }
        if (auto_close || self.auto_close)
            && self.store.is_object(t)
            && !self.store.has_known_properties_restriction(t)
        {
            // Implicitly synthesized closed-object enforcement: any
            // violation surfaces as a WARNING, never an ERROR.
            let closed = self.check_known_properties(t, instance);
            for violation in closed.get_errors() {
                let mut warning = Status::new(
                    Severity::Warning,
                    violation.code(),
                    violation.message(),
                    StatusSource::Type(t),
                );
                if let Some(path) = violation.validation_path() {
                    warning.prefix_path(path);
                }
                result.add_sub_status(warning, None);
            }
        }
        result
    }

    /// Top-level validation with the subtype scan and discriminator
    /// handling. Union types validate directly: OR over the options, no
    /// scan.
    pub fn validate(
        &mut self,
        t: TypeId,
        instance: &Value,
        auto_close: bool,
        null_allowed: bool,
    ) -> Status {
        if matches!(self.store.def(t).kind(), TypeKind::Union { .. }) {
            return self.validate_direct(t, instance, auto_close, null_allowed);
        }
        if !null_allowed && instance.is_null() && !self.store.def(t).is_nullable() {
            return Status::error(&messages::NULL_NOT_ALLOWED, StatusSource::Type(t), &[]);
        }
        let saved_auto_close = self.auto_close;
        if auto_close {
            self.auto_close = true;
        }

        let mut queue: Vec<TypeId> = self.store.sub_types(t).to_vec();
        queue.push(t);
        debug!(t = t.0, candidates = queue.len(), "validate: scanning candidates");

        let mut discriminator_failures: Vec<Status> = Vec::new();
        let mut fallback: Option<Status> = None;
        for candidate in queue {
            let verdict = check_discriminator(self.store, candidate, instance, None);
            let direct = self.validate_direct(candidate, instance, self.auto_close, true);
            match verdict {
                DiscriminatorVerdict::Ok => {
                    self.auto_close = saved_auto_close;
                    return direct;
                }
                DiscriminatorVerdict::Failed(status) => {
                    discriminator_failures.push(status);
                }
                DiscriminatorVerdict::NotApplicable => {
                    if direct.is_ok() {
                        self.auto_close = saved_auto_close;
                        return direct;
                    }
                }
            }
            fallback = Some(direct);
        }
        self.auto_close = saved_auto_close;

        // Only the last recorded discriminator failure is reported;
        // earlier failures are discarded.
        match discriminator_failures.pop() {
            Some(failure) => failure,
            None => fallback.unwrap_or_else(ok),
        }
    }
}

/// Validate with default options (no auto-close, null allowed only for
/// nullable types at the top level).
pub fn validate(store: &TypeStore, t: TypeId, instance: &Value) -> Status {
    Validator::new(store).validate(t, instance, false, true)
}

/// Validate with explicit auto-close / null-allowed options.
pub fn validate_with(
    store: &TypeStore,
    t: TypeId,
    instance: &Value,
    auto_close: bool,
    null_allowed: bool,
) -> Status {
    Validator::new(store).validate(t, instance, auto_close, null_allowed)
}

/// Validate against one type only, skipping the subtype scan.
pub fn validate_direct(store: &TypeStore, t: TypeId, instance: &Value) -> Status {
    Validator::new(store).validate_direct(t, instance, false, true)
}
