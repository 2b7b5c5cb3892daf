//! Automatic classification of instances against polymorphic families.
//!
//! `ac` maps an instance to the single family member it belongs to:
//! identity short-circuits for non-polymorphic and builtin types, a
//! runtime-kind check for scalars, then direct validation of every family
//! member followed by pairwise discriminator elimination. `can_do_ac`
//! reports up front whether a family is distinguishable at all.

use crate::validate::Validator;
use serde_json::Value;
use tracing::debug;
use typefit_common::status::ok;
use typefit_common::{Status, StatusSource, TypeId, messages};
use typefit_solver::TypeStore;

/// Classify `instance` to one member of `t`'s type family, or the
/// builtin `nothing` when no member (or more than one, unresolvable by
/// discriminators) fits.
pub fn ac(store: &TypeStore, t: TypeId, instance: &Value) -> TypeId {
    if !store.is_polymorphic(t) && !store.is_union(t) {
        return t;
    }
    if store.is_builtin(t) {
        return t;
    }
    let family = store.type_family(t);
    if family.is_empty() {
        return store.builtins().nothing;
    }
    if store.is_scalar(t) {
        let nothing = store.builtins().nothing;
        if store.is_number(t) {
            return if instance.is_number() { t } else { nothing };
        }
        if store.is_string(t) {
            return if instance.is_string() { t } else { nothing };
        }
        if store.is_boolean(t) {
            return if instance.is_boolean() { t } else { nothing };
        }
        return t;
    }
    if let [only] = family.as_slice() {
        return *only;
    }
    let mut validator = Validator::new(store);
    let options: Vec<TypeId> = family
        .into_iter()
        .filter(|&member| {
            validator
                .validate_direct(member, instance, true, true)
                .is_ok()
        })
        .collect();
    debug!(t = t.0, candidates = options.len(), "classification candidates");
    match discriminate(store, instance, &options) {
        Some(winner) => winner,
        None => store.builtins().nothing,
    }
}

/// Narrow a candidate set down to one member by repeated pairwise
/// selection. A pair neither member of which wins drops both candidates.
fn discriminate(store: &TypeStore, instance: &Value, options: &[TypeId]) -> Option<TypeId> {
    let mut opts: Vec<TypeId> = options.to_vec();
    while opts.len() > 1 {
        let mut pair = None;
        'scan: for i in 0..opts.len() {
            for j in 0..opts.len() {
                if opts[i] != opts[j] {
                    pair = Some((opts[i], opts[j]));
                    break 'scan;
                }
            }
        }
        let Some((t0, t1)) = pair else {
            break;
        };
        match select(store, instance, t0, t1) {
            Some(winner) if winner == t0 => opts.retain(|&x| x != t1),
            Some(_) => opts.retain(|&x| x != t0),
            None => opts.retain(|&x| x != t0 && x != t1),
        }
    }
    match opts.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Pick the better of two classification candidates, or neither.
///
/// Scalar pairs prefer the subtype. Otherwise a shared discriminator
/// property with distinct member values decides by the instance's value.
fn select(store: &TypeStore, instance: &Value, t0: TypeId, t1: TypeId) -> Option<TypeId> {
    if store.is_scalar(t0) && store.is_scalar(t1) {
        if store.all_sub_types(t0).contains(&t1) {
            return Some(t0);
        }
        if store.all_sub_types(t1).contains(&t0) {
            return Some(t1);
        }
    }
    let d0 = store.discriminator(t0)?;
    let d1 = store.discriminator(t1)?;
    if d0 != d1 {
        return None;
    }
    let v0 = store.desc_value(t0);
    let v1 = store.desc_value(t1);
    if v0 == v1 {
        return None;
    }
    match instance.get(&d0) {
        Some(actual) if *actual == v0 => Some(t0),
        Some(actual) if *actual == v1 => Some(t1),
        _ => None,
    }
}

/// Whether every pair of family members is distinguishable, either as
/// scalars or via discriminators. The result aggregates one diagnostic
/// per indistinguishable ordered pair.
pub fn can_do_ac(store: &TypeStore, t: TypeId) -> Status {
    let family = store.type_family(t);
    let mut result = Status::ok_for(StatusSource::Type(t));
    for (i, &t0) in family.iter().enumerate() {
        for (j, &t1) in family.iter().enumerate() {
            if i != j {
                result.add_sub_status(distinguishable(store, t, t0, t1), None);
            }
        }
    }
    result
}

fn distinguishable(store: &TypeStore, owner: TypeId, t0: TypeId, t1: TypeId) -> Status {
    if t0 == t1 {
        return ok();
    }
    if store.is_scalar(t0) && store.is_scalar(t1) {
        return ok();
    }
    discriminator_conflict(store, owner, t0, t1)
}

/// A pair of object members needs a shared discriminator property with
/// distinct values; anything else is a conflict.
fn discriminator_conflict(store: &TypeStore, owner: TypeId, t0: TypeId, t1: TypeId) -> Status {
    let params = [("name1", store.name(t0)), ("name2", store.name(t1))];
    let (Some(d0), Some(d1)) = (store.discriminator(t0), store.discriminator(t1)) else {
        return Status::error(
            &messages::DISCRIMINATOR_NEEDED,
            StatusSource::Type(owner),
            &params,
        );
    };
    if d0 == d1 {
        if store.desc_value(t0) != store.desc_value(t1) {
            return ok();
        }
        return Status::error(
            &messages::SAME_DISCRIMINATOR_VALUE,
            StatusSource::Type(owner),
            &params,
        );
    }
    Status::error(
        &messages::DISCRIMINATOR_NEEDED,
        StatusSource::Type(owner),
        &params,
    )
}
