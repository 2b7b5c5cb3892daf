//! Arena node representation of types.
//!
//! Every type is a `TypeDef` stored in a `TypeStore` and addressed by
//! `TypeId`. The variant (`TypeKind`) decides where a node's "parents" come
//! from: inherited types list supertypes, union/intersection types list
//! options, root types have neither.

use crate::facets::Facet;
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use serde_json::Value;
use smallvec::SmallVec;
use typefit_common::TypeId;

bitflags! {
    /// Per-type state bits.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct TypeFlags: u8 {
        /// Instances of this type may be null.
        const NULLABLE = 1 << 0;
        /// No further automatic subtype edges may be recorded on this type.
        const LOCKED = 1 << 1;
    }
}

/// Structural variant of a type node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// No supertypes. Used for `any` and `nothing`.
    Root,
    /// Explicit supertype list; facets are inherited along these edges.
    Inherited {
        supers: SmallVec<[TypeId; 2]>,
    },
    /// Logical OR over the option types.
    Union {
        options: SmallVec<[TypeId; 2]>,
    },
    /// Logical AND over the option types.
    Intersection {
        options: SmallVec<[TypeId; 2]>,
    },
}

impl TypeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeKind::Root => "root",
            TypeKind::Inherited { .. } => "inherited",
            TypeKind::Union { .. } => "union",
            TypeKind::Intersection { .. } => "intersection",
        }
    }
}

/// Declaration context of an anonymous nested type: the property facet it
/// was declared under. Lets `type_path` render a human-readable location
/// for types that have no name of their own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextMeta {
    /// Type that declared the property this anonymous type is the range of.
    pub owner: TypeId,
    /// The property (or pattern) name segment.
    pub path_name: String,
}

/// One node of the type graph.
#[derive(Clone, Debug)]
pub struct TypeDef {
    pub(crate) name: Option<String>,
    pub(crate) kind: TypeKind,
    /// Ordered facet list; insertion order is significant for property and
    /// required-flag resolution.
    pub(crate) facets: Vec<Facet>,
    /// Directly known subtypes (reverse edges of `addSuper`).
    pub(crate) sub_types: SmallVec<[TypeId; 4]>,
    pub(crate) flags: TypeFlags,
    /// Open string-keyed side channel. A few well-known keys
    /// (`GLOBAL_EXTRA` et al.) are given meaning by specific components;
    /// the storage itself is unopinionated.
    pub(crate) extras: FxHashMap<String, Value>,
    pub(crate) context: Option<ContextMeta>,
}

impl TypeDef {
    pub(crate) fn new(name: Option<String>, kind: TypeKind) -> Self {
        Self {
            name,
            kind,
            facets: Vec::new(),
            sub_types: SmallVec::new(),
            flags: TypeFlags::empty(),
            extras: FxHashMap::default(),
            context: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// True for inplace types with no name.
    pub fn is_anonymous(&self) -> bool {
        self.name.as_deref().is_none_or(str::is_empty)
    }

    pub fn is_nullable(&self) -> bool {
        self.flags.contains(TypeFlags::NULLABLE)
    }

    pub fn is_locked(&self) -> bool {
        self.flags.contains(TypeFlags::LOCKED)
    }

    /// Facets declared directly on this type, in declaration order.
    pub fn declared_facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn context(&self) -> Option<&ContextMeta> {
        self.context.as_ref()
    }

    pub fn get_extra(&self, name: &str) -> Option<&Value> {
        self.extras.get(name)
    }
}

/// Ids of the fixed built-in lattice, seeded by `TypeStore::new`.
///
/// Built-ins are singletons per store, pre-registered in the builtin
/// registry and locked immediately after population.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuiltIns {
    pub any: TypeId,
    pub scalar: TypeId,
    pub object: TypeId,
    pub array: TypeId,
    pub external: TypeId,
    pub number: TypeId,
    pub integer: TypeId,
    pub boolean: TypeId,
    pub string: TypeId,
    pub nil: TypeId,
    pub date_only: TypeId,
    pub time_only: TypeId,
    pub datetime_only: TypeId,
    pub datetime: TypeId,
    pub file: TypeId,
    pub nothing: TypeId,
    pub union: TypeId,
    pub unknown: TypeId,
    pub reference: TypeId,
    pub recurrent: TypeId,
}
