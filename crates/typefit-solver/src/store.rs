//! The type arena: construction, mutation and the intersection cache.
//!
//! A `TypeStore` owns every type node of one schema session. Types are
//! created during graph build-out (`derive`/`union`/`intersect`/raw
//! construction), mutated by `add_meta`/`add_super` during that phase, and
//! then live for the whole session; the store is discarded as a unit.
//!
//! `TypeStore::new` seeds the fixed built-in lattice, registers it in the
//! builtin registry and locks it, mirroring the singleton pre-registration
//! of the schema language this engine serves.

use crate::facets::{Facet, FacetData, ModifierKind, ValueKind};
use crate::registry::TypeRegistry;
use crate::types::{BuiltIns, ContextMeta, TypeDef, TypeFlags, TypeKind};
use rustc_hash::FxHashMap;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;
use typefit_common::TypeId;

pub struct TypeStore {
    defs: Vec<TypeDef>,
    builtins: BuiltIns,
    builtin_registry: Arc<TypeRegistry>,
    /// Pairwise intersection cache, keyed by the unordered pair of type
    /// ids. Entries touching a type are released the moment that type's
    /// facet list changes; stale entries would corrupt later composition
    /// queries.
    intersections: FxHashMap<(TypeId, TypeId), TypeId>,
}

impl TypeStore {
    /// Create a store with the built-in lattice seeded, registered and
    /// locked.
    pub fn new() -> Self {
        let mut store = Self {
            defs: Vec::new(),
            builtins: BuiltIns {
                any: TypeId::INVALID,
                scalar: TypeId::INVALID,
                object: TypeId::INVALID,
                array: TypeId::INVALID,
                external: TypeId::INVALID,
                number: TypeId::INVALID,
                integer: TypeId::INVALID,
                boolean: TypeId::INVALID,
                string: TypeId::INVALID,
                nil: TypeId::INVALID,
                date_only: TypeId::INVALID,
                time_only: TypeId::INVALID,
                datetime_only: TypeId::INVALID,
                datetime: TypeId::INVALID,
                file: TypeId::INVALID,
                nothing: TypeId::INVALID,
                union: TypeId::INVALID,
                unknown: TypeId::INVALID,
                reference: TypeId::INVALID,
                recurrent: TypeId::INVALID,
            },
            builtin_registry: Arc::new(TypeRegistry::new()),
            intersections: FxHashMap::default(),
        };
        store.seed_builtins();
        store
    }

    fn seed_builtins(&mut self) {
        let any = self.new_root("any");
        let scalar = self.inherit(any, "scalar");
        let object = self.inherit(any, "object");
        let array = self.inherit(any, "array");
        let external = self.inherit(any, "external");
        let number = self.inherit(scalar, "number");
        let integer = self.inherit(number, "integer");
        let boolean = self.inherit(scalar, "boolean");
        let string = self.inherit(scalar, "string");
        let nil = self.inherit(scalar, "nil");
        let date_only = self.inherit(scalar, "date-only");
        let time_only = self.inherit(scalar, "time-only");
        let datetime_only = self.inherit(scalar, "datetime-only");
        let datetime = self.inherit(scalar, "datetime");
        let file = self.inherit(scalar, "file");
        let nothing = self.new_root("nothing");
        let union = self.inherit(any, "union");
        let unknown = self.inherit(nothing, "unknown");
        let reference = self.inherit(nothing, "reference");
        let recurrent = self.inherit(nothing, "recurrent");

        // `nothing` and `reference` carry no builtin tag, matching the
        // historic lattice.
        for t in [
            any, scalar, object, array, external, number, integer, boolean, string, nil,
            date_only, time_only, datetime_only, datetime, file, union, unknown, recurrent,
        ] {
            self.add_meta(t, FacetData::Modifier(ModifierKind::BuiltIn));
        }

        self.add_meta(nothing, FacetData::Nothing);
        self.add_meta(number, FacetData::TypeOf(ValueKind::Number));
        self.add_meta(boolean, FacetData::TypeOf(ValueKind::Boolean));
        self.add_meta(object, FacetData::TypeOf(ValueKind::Object));
        self.add_meta(array, FacetData::TypeOf(ValueKind::Array));
        self.add_meta(string, FacetData::TypeOf(ValueKind::String));
        self.add_meta(integer, FacetData::IntegerKind);
        self.add_meta(nil, FacetData::NullKind);
        self.add_meta(scalar, FacetData::ScalarKind);
        self.add_meta(file, FacetData::TypeOf(ValueKind::String));
        // Date/time formats are leaf concerns; structurally they are
        // strings.
        for t in [date_only, time_only, datetime_only, datetime] {
            self.add_meta(t, FacetData::TypeOf(ValueKind::String));
        }
        self.def_mut(nil).flags.insert(TypeFlags::NULLABLE);

        let mut registry = TypeRegistry::new();
        for t in [
            any, scalar, object, array, number, integer, boolean, nil, string, date_only,
            time_only, datetime_only, datetime, file,
        ] {
            registry.add_type(self, t);
            self.lock(t);
        }
        for t in [unknown, recurrent, external, union, reference] {
            self.lock(t);
        }
        self.builtin_registry = Arc::new(registry);

        self.builtins = BuiltIns {
            any,
            scalar,
            object,
            array,
            external,
            number,
            integer,
            boolean,
            string,
            nil,
            date_only,
            time_only,
            datetime_only,
            datetime,
            file,
            nothing,
            union,
            unknown,
            reference,
            recurrent,
        };
    }

    pub fn builtins(&self) -> &BuiltIns {
        &self.builtins
    }

    /// The locked registry of built-in types; typically the parent scope of
    /// every user registry.
    pub fn builtin_registry(&self) -> &Arc<TypeRegistry> {
        &self.builtin_registry
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn def(&self, t: TypeId) -> &TypeDef {
        &self.defs[t.index()]
    }

    pub(crate) fn def_mut(&mut self, t: TypeId) -> &mut TypeDef {
        &mut self.defs[t.index()]
    }

    // -- construction -----------------------------------------------------

    fn alloc(&mut self, name: Option<String>, kind: TypeKind) -> TypeId {
        let id = TypeId(self.defs.len() as u32);
        trace!(id = id.0, name = name.as_deref().unwrap_or(""), kind = kind.kind_name(), "alloc type");
        self.defs.push(TypeDef::new(name, kind));
        id
    }

    fn opt_name(name: &str) -> Option<String> {
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// A fresh root type (no supertypes).
    pub fn new_root(&mut self, name: &str) -> TypeId {
        self.alloc(Self::opt_name(name), TypeKind::Root)
    }

    /// A fresh inherited type with no supertypes yet.
    pub fn new_inherited(&mut self, name: &str) -> TypeId {
        self.alloc(
            Self::opt_name(name),
            TypeKind::Inherited {
                supers: SmallVec::new(),
            },
        )
    }

    /// Derive a subtype of `base` with a fresh inherited node.
    pub fn inherit(&mut self, base: TypeId, name: &str) -> TypeId {
        let t = self.new_inherited(name);
        self.add_super(t, base);
        t
    }

    /// Extend a new type from several supertypes at once. The result is
    /// nullable when it ends up a subtype of `nil`.
    pub fn derive(&mut self, name: &str, supers: &[TypeId]) -> TypeId {
        let t = self.new_inherited(name);
        for &s in supers {
            self.add_super(t, s);
        }
        if self.is_sub_type_of(t, self.builtins.nil) {
            self.def_mut(t).flags.insert(TypeFlags::NULLABLE);
        }
        t
    }

    /// Quickly derive a new type from `object`.
    pub fn derive_object_type(&mut self, name: &str) -> TypeId {
        let object = self.builtins.object;
        self.derive(name, &[object])
    }

    /// A union over the given options; nullable if any option is nullable.
    pub fn union(&mut self, name: &str, options: &[TypeId]) -> TypeId {
        let t = self.alloc(
            Self::opt_name(name),
            TypeKind::Union {
                options: options.iter().copied().collect(),
            },
        );
        if options.iter().any(|&o| self.def(o).is_nullable()) {
            self.def_mut(t).flags.insert(TypeFlags::NULLABLE);
        }
        t
    }

    /// An intersection over the given options.
    pub fn intersection(&mut self, name: &str, options: &[TypeId]) -> TypeId {
        self.alloc(
            Self::opt_name(name),
            TypeKind::Intersection {
                options: options.iter().copied().collect(),
            },
        )
    }

    // -- mutation (graph build phase) -------------------------------------

    /// Add a supertype edge. The reverse subtype edge is recorded unless
    /// the supertype is locked; nullability propagates down.
    pub fn add_super(&mut self, t: TypeId, sup: TypeId) {
        match &mut self.def_mut(t).kind {
            TypeKind::Inherited { supers } => supers.push(sup),
            other => {
                debug_assert!(false, "add_super on {} type", other.kind_name());
                return;
            }
        }
        if !self.def(sup).is_locked() {
            self.def_mut(sup).sub_types.push(t);
        }
        if self.def(sup).is_nullable() {
            self.def_mut(t).flags.insert(TypeFlags::NULLABLE);
        }
    }

    /// Attach a facet with the kind's default inheritability.
    ///
    /// Mutating a type's facet list releases its intersection-cache
    /// entries; that invalidation is a correctness contract, not an
    /// optimization detail.
    pub fn add_meta(&mut self, t: TypeId, data: FacetData) {
        self.attach(t, Facet::new(data));
    }

    /// Attach a pre-built facet (custom inheritability, source ref or
    /// annotations).
    pub fn attach(&mut self, t: TypeId, mut facet: Facet) {
        facet.owner = t;
        self.release(t);
        self.def_mut(t).facets.push(facet);
    }

    /// Declare a property: `HasProperty` unless optional, plus a
    /// `PropertyIs` when a range type is given. Anonymous range types
    /// record their declaration context for `type_path`.
    pub fn declare_property(
        &mut self,
        t: TypeId,
        name: &str,
        range: Option<TypeId>,
        optional: bool,
    ) -> TypeId {
        if !optional {
            self.add_meta(t, FacetData::HasProperty(name.to_string()));
        }
        if let Some(range) = range {
            self.add_meta(
                t,
                FacetData::PropertyIs {
                    name: name.to_string(),
                    range,
                },
            );
            if self.def(range).is_anonymous() && self.def(range).context.is_none() {
                self.def_mut(range).context = Some(ContextMeta {
                    owner: t,
                    path_name: name.to_string(),
                });
            }
        }
        t
    }

    /// Declare a pattern property; keys matching `pattern` must validate
    /// against `range`.
    pub fn declare_map_property(&mut self, t: TypeId, pattern: &str, range: TypeId) {
        self.add_meta(
            t,
            FacetData::MapPropertyIs {
                pattern: pattern.to_string(),
                range,
            },
        );
    }

    /// Make this a closed type: no unknown properties any more.
    pub fn close_unknown_properties(&mut self, t: TypeId) {
        self.add_meta(t, FacetData::KnownProperties);
    }

    /// Prevent further automatic subtype attachment.
    pub fn lock(&mut self, t: TypeId) {
        self.def_mut(t).flags.insert(TypeFlags::LOCKED);
    }

    pub fn patch_name(&mut self, t: TypeId, name: &str) {
        self.def_mut(t).name = Self::opt_name(name);
    }

    pub fn put_extra(&mut self, t: TypeId, name: &str, value: Value) {
        self.def_mut(t).extras.insert(name.to_string(), value);
    }

    pub fn set_context(&mut self, t: TypeId, owner: TypeId, path_name: &str) {
        self.def_mut(t).context = Some(ContextMeta {
            owner,
            path_name: path_name.to_string(),
        });
    }

    // -- intersection cache -----------------------------------------------

    fn pair_key(t0: TypeId, t1: TypeId) -> (TypeId, TypeId) {
        if t0 <= t1 { (t0, t1) } else { (t1, t0) }
    }

    /// Pairwise type intersection, memoized by the unordered id pair.
    pub fn intersect(&mut self, t0: TypeId, t1: TypeId) -> TypeId {
        let key = Self::pair_key(t0, t1);
        if let Some(&cached) = self.intersections.get(&key) {
            return cached;
        }
        let result = self.intersection("", &[t0, t1]);
        trace!(t0 = t0.0, t1 = t1.0, result = result.0, "intersect");
        self.intersections.insert(key, result);
        result
    }

    /// Drop every cached intersection touching `t`. Must run before any
    /// further intersection query involving `t` once its facets changed.
    pub fn release(&mut self, t: TypeId) {
        self.intersections.retain(|&(a, b), _| a != t && b != t);
    }

    #[cfg(test)]
    pub(crate) fn cached_intersection(&self, t0: TypeId, t1: TypeId) -> Option<TypeId> {
        self.intersections.get(&Self::pair_key(t0, t1)).copied()
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_cache_hits_either_order() {
        let mut store = TypeStore::new();
        let object = store.builtins.object;
        let a = store.inherit(object, "A");
        let b = store.inherit(object, "B");

        let t = store.intersect(a, b);
        assert_eq!(store.cached_intersection(a, b), Some(t));
        assert_eq!(store.cached_intersection(b, a), Some(t));
        assert_eq!(store.intersect(b, a), t);
    }

    #[test]
    fn test_adding_a_facet_releases_cached_intersections() {
        let mut store = TypeStore::new();
        let object = store.builtins.object;
        let a = store.inherit(object, "A");
        let b = store.inherit(object, "B");
        let c = store.inherit(object, "C");

        let ab = store.intersect(a, b);
        let bc = store.intersect(b, c);
        store.add_meta(a, FacetData::HasProperty("x".to_string()));

        assert_eq!(store.cached_intersection(a, b), None);
        assert_eq!(store.cached_intersection(b, c), Some(bc));
        assert_ne!(store.intersect(a, b), ab);
    }
}
