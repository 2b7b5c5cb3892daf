//! Type lattice and constraint algebra for the typefit engine.
//!
//! This crate owns the type graph and everything derivable from it:
//!
//! - **Arena storage**: types live in a `TypeStore` and reference each other
//!   by `TypeId` index, so the sub/super-type graph carries no ownership
//!   cycles.
//! - **Type algebra**: inheritance, union and intersection nodes plus the
//!   predicates and closure queries over them (subtyping, kind tests,
//!   type families, effective facet lists, property resolution).
//! - **Facet model**: a closed tagged enum of modifiers, metadata and
//!   checkable constraints, with a `CustomConstraint` escape hatch for leaf
//!   restriction kinds supplied by collaborators.
//! - **Composition engine**: pairwise constraint composition and
//!   optimization with contradiction detection, plus the memoized pairwise
//!   type-intersection cache.
//!
//! Validation and classification over this graph live in `typefit-checker`.

pub mod types;
pub use types::{BuiltIns, ContextMeta, TypeDef, TypeFlags, TypeKind};

pub mod facets;
pub use facets::{
    Annotation, CustomConstraint, Facet, FacetData, ModifierKind, PropertyInfo, ValueKind,
};

pub mod store;
pub use store::TypeStore;

pub mod queries;
pub use queries::Restriction;

pub mod compose;
pub use compose::{Composer, Composition, restrictions_conflict};

pub mod registry;
pub use registry::TypeRegistry;

pub use typefit_common::TypeId;
