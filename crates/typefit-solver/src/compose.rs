//! Pairwise constraint composition and optimization.
//!
//! `compose_with` knows three outcomes: no simplification (the caller must
//! AND the two constraints), an exact composed conjunction, or a proven
//! contradiction. Contradictions become `NothingWithLocation` facets that
//! carry the chain of constraints being composed when the conflict was
//! found, for schema-authoring-time diagnostics.
//!
//! The composition stack is an explicit, call-scoped value owned by the
//! `Composer`; one composer serves one compose/optimize call tree.

use crate::facets::FacetData;
use crate::store::TypeStore;
use serde_json::Value;
use tracing::trace;
use typefit_common::messages;
use typefit_common::{Severity, Status, StatusSource, TypeId};

/// Outcome of composing two constraints.
#[derive(Clone, Debug)]
pub enum Composition {
    /// No simplification known; keep both constraints ANDed.
    Unknown,
    /// A single constraint equivalent to the exact conjunction.
    Composed(FacetData),
    /// The two constraints can never be jointly satisfied. The payload is
    /// a `NothingWithLocation` facet carrying the provenance.
    Contradiction(FacetData),
}

/// Drives composition and optimization over a store, tracking the chain of
/// constraints currently being combined. Not reentrant: nested composers
/// would lose each other's provenance.
pub struct Composer<'a> {
    store: &'a mut TypeStore,
    stack: Vec<String>,
}

impl<'a> Composer<'a> {
    pub fn new(store: &'a mut TypeStore) -> Self {
        Self {
            store,
            stack: Vec::new(),
        }
    }

    /// Attempt to compute the composed restriction of `left` and `right`,
    /// with `left` pushed on the composition stack for the duration.
    pub fn try_compose(&mut self, left: &FacetData, right: &FacetData) -> Composition {
        self.stack.push(left.describe());
        let result = self.compose_with(left, right);
        self.stack.pop();
        result
    }

    fn compose_with(&mut self, left: &FacetData, right: &FacetData) -> Composition {
        match (left, right) {
            (FacetData::TypeOf(a), FacetData::TypeOf(b)) => {
                if a == b {
                    Composition::Composed(left.clone())
                } else {
                    trace!(left = a.name(), right = b.name(), "type-of contradiction");
                    Composition::Contradiction(self.nothing(right, None))
                }
            }
            (
                FacetData::PropertyIs { name: n0, range: r0 },
                FacetData::PropertyIs { name: n1, range: r1 },
            ) if n0 == n1 => {
                if r0 == r1 {
                    Composition::Composed(left.clone())
                } else {
                    let range = self.store.intersect(*r0, *r1);
                    Composition::Composed(FacetData::PropertyIs {
                        name: n0.clone(),
                        range,
                    })
                }
            }
            (
                FacetData::ComponentType(c0),
                FacetData::ComponentType(c1),
            ) => {
                if c0 == c1 {
                    Composition::Composed(left.clone())
                } else {
                    let ct = self.store.intersect(*c0, *c1);
                    Composition::Composed(FacetData::ComponentType(ct))
                }
            }
            (FacetData::KnownProperties, FacetData::KnownProperties) => {
                Composition::Composed(FacetData::KnownProperties)
            }
            (FacetData::HasProperty(a), FacetData::HasProperty(b)) if a == b => {
                Composition::Composed(left.clone())
            }
            _ => Composition::Unknown,
        }
    }

    /// Optimize a constraint, with it pushed on the stack for the
    /// duration. Plain constraints are already minimal; this exists so
    /// custom composition layers share the push/guaranteed-pop discipline.
    pub fn preoptimize(&mut self, constraint: &FacetData) -> FacetData {
        self.stack.push(constraint.describe());
        let result = self.inner_optimize(constraint);
        self.stack.pop();
        result
    }

    fn inner_optimize(&mut self, constraint: &FacetData) -> FacetData {
        constraint.clone()
    }

    /// Flatten a conjunction: repeatedly try to compose pairs until a
    /// fixpoint. A contradiction collapses the whole list to the
    /// impossible constraint.
    pub fn optimize_conjunction(&mut self, constraints: &[FacetData]) -> Vec<FacetData> {
        let mut out: Vec<FacetData> = constraints.iter().map(|c| self.preoptimize(c)).collect();
        loop {
            let mut composed_any = false;
            'scan: for i in 0..out.len() {
                for j in 0..out.len() {
                    if i == j {
                        continue;
                    }
                    match self.try_compose(&out[i], &out[j]) {
                        Composition::Unknown => {}
                        Composition::Composed(c) => {
                            let (first, second) = if i < j { (i, j) } else { (j, i) };
                            out.remove(second);
                            out.remove(first);
                            out.push(c);
                            composed_any = true;
                            break 'scan;
                        }
                        Composition::Contradiction(nothing) => {
                            return vec![nothing];
                        }
                    }
                }
            }
            if !composed_any {
                return out;
            }
        }
    }

    /// The impossible constraint, annotated with the current composition
    /// chain and the offending partner.
    pub fn nothing(&self, other: &FacetData, message: Option<&str>) -> FacetData {
        FacetData::NothingWithLocation {
            message: message.unwrap_or("Conflicting restrictions").to_string(),
            chain: self.stack.clone(),
            other: Box::new(other.clone()),
        }
    }

    pub fn store(&mut self) -> &mut TypeStore {
        self.store
    }
}

/// Render a contradiction facet as a schema-authoring diagnostic: an ERROR
/// status carrying the composition-stack provenance in its extras.
pub fn restrictions_conflict(nothing: &FacetData, owner: TypeId) -> Status {
    let (message, chain, other) = match nothing {
        FacetData::NothingWithLocation {
            message,
            chain,
            other,
        } => (message.as_str(), chain.clone(), other.describe()),
        _ => ("Conflicting restrictions", Vec::new(), String::new()),
    };
    let description = if other.is_empty() {
        message.to_string()
    } else {
        format!("{message} ({other})")
    };
    let mut status = Status::from_entry(
        &messages::RESTRICTIONS_CONFLICT,
        StatusSource::Type(owner),
        &[("conflictDescription", &description)],
        Severity::Error,
    );
    status.put_extra(
        "restrictionStack",
        Value::Array(chain.into_iter().map(Value::String).collect()),
    );
    status
}
