//! Queries over the type lattice.
//!
//! Everything here is derived from supertype-closure traversal and is not
//! memoized; callers that need repeated queries cache externally. Closure
//! traversals carry a visited set, so a (malformed) cyclic hierarchy
//! terminates instead of recursing unboundedly.

use crate::facets::{Facet, FacetData, ModifierKind, PropertyInfo};
use crate::store::TypeStore;
use crate::types::TypeKind;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde_json::Value;
use typefit_common::TypeId;

/// One element of a type's effective restriction list.
///
/// `Facet` is a plain checkable constraint; `AllOf` succeeds when every
/// part does (first failure reported); `AnyOf` succeeds when at least one
/// option's conjunction does.
#[derive(Clone, Debug)]
pub enum Restriction {
    Facet(Facet),
    AllOf(Vec<Restriction>),
    AnyOf {
        /// The union type these options belong to.
        owner: TypeId,
        options: Vec<(TypeId, Vec<Restriction>)>,
    },
}

impl TypeStore {
    // -- edges ------------------------------------------------------------

    /// Directly known supertypes. Options of union/intersection nodes are
    /// not supertype edges.
    pub fn super_types(&self, t: TypeId) -> &[TypeId] {
        match &self.def(t).kind {
            TypeKind::Inherited { supers } => supers,
            _ => &[],
        }
    }

    /// Directly known subtypes.
    pub fn sub_types(&self, t: TypeId) -> &[TypeId] {
        &self.def(t).sub_types
    }

    /// Transitive supertype closure, discovery order, self excluded.
    pub fn all_super_types(&self, t: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        self.fill_super_types(t, &mut out, &mut seen);
        out
    }

    fn fill_super_types(&self, t: TypeId, out: &mut Vec<TypeId>, seen: &mut FxHashSet<TypeId>) {
        for &s in self.super_types(t) {
            if seen.insert(s) {
                out.push(s);
                self.fill_super_types(s, out, seen);
            }
        }
    }

    /// Transitive subtype closure, discovery order, self excluded.
    pub fn all_sub_types(&self, t: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        self.fill_sub_types(t, &mut out, &mut seen);
        out
    }

    fn fill_sub_types(&self, t: TypeId, out: &mut Vec<TypeId>, seen: &mut FxHashSet<TypeId>) {
        for &s in self.sub_types(t) {
            if seen.insert(s) {
                out.push(s);
                self.fill_sub_types(s, out, seen);
            }
        }
    }

    // -- subtyping --------------------------------------------------------

    /// Reflexive, transitive subtype predicate. `any` is a universal
    /// supertype; a union is a subtype of `of` when every option is.
    pub fn is_sub_type_of(&self, t: TypeId, of: TypeId) -> bool {
        if of == self.builtins().any {
            return true;
        }
        let mut seen = FxHashSet::default();
        self.is_sub_type_inner(t, of, &mut seen)
    }

    fn is_sub_type_inner(&self, t: TypeId, of: TypeId, seen: &mut FxHashSet<TypeId>) -> bool {
        if t == of {
            return true;
        }
        if !seen.insert(t) {
            return false;
        }
        match &self.def(t).kind {
            TypeKind::Union { .. } => self
                .all_options(t)
                .iter()
                .all(|&o| self.is_sub_type_inner(o, of, seen)),
            _ => self
                .super_types(t)
                .iter()
                .any(|&s| self.is_sub_type_inner(s, of, seen)),
        }
    }

    pub fn is_super_type_of(&self, t: TypeId, of: TypeId) -> bool {
        t == of || self.all_sub_types(t).contains(&of)
    }

    // -- kind predicates --------------------------------------------------

    fn closure_contains(&self, t: TypeId, builtin: TypeId) -> bool {
        t == builtin || self.all_super_types(t).contains(&builtin)
    }

    pub fn is_string(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().string)
    }

    pub fn is_number(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().number)
    }

    pub fn is_integer(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().integer)
    }

    pub fn is_boolean(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().boolean)
    }

    pub fn is_object(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().object)
    }

    pub fn is_array(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().array)
    }

    pub fn is_scalar(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().scalar)
    }

    pub fn is_external(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().external)
    }

    pub fn is_file(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().file)
    }

    pub fn is_date_time(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().datetime)
    }

    pub fn is_date_only(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().date_only)
    }

    pub fn is_time_only(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().time_only)
    }

    pub fn is_date_time_only(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().datetime_only)
    }

    pub fn is_unknown(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().unknown)
    }

    pub fn is_recurrent(&self, t: TypeId) -> bool {
        self.closure_contains(t, self.builtins().recurrent)
    }

    /// True only for the types tagged at construction.
    pub fn is_builtin(&self, t: TypeId) -> bool {
        self.def(t)
            .facets
            .iter()
            .any(|f| matches!(f.data, FacetData::Modifier(ModifierKind::BuiltIn)))
    }

    /// Polymorphic is inheritable, so the effective facet list decides.
    pub fn is_polymorphic(&self, t: TypeId) -> bool {
        self.meta(t)
            .iter()
            .any(|f| matches!(f.data, FacetData::Modifier(ModifierKind::Polymorphic)))
    }

    /// Abstract/Internal are declaration-local modifiers; such types are
    /// excluded from type families.
    pub fn is_abstract_or_internal(&self, t: TypeId) -> bool {
        self.def(t).facets.iter().any(|f| {
            matches!(
                f.data,
                FacetData::Modifier(ModifierKind::Abstract)
                    | FacetData::Modifier(ModifierKind::Internal)
            )
        })
    }

    /// A type is a union when it is a union node or its supertype closure
    /// contains one. Built-ins are never unions.
    pub fn is_union(&self, t: TypeId) -> bool {
        if self.is_builtin(t) {
            return false;
        }
        matches!(self.def(t).kind, TypeKind::Union { .. })
            || self
                .all_super_types(t)
                .iter()
                .any(|&s| matches!(self.def(s).kind, TypeKind::Union { .. }))
    }

    pub fn is_intersection(&self, t: TypeId) -> bool {
        if self.is_builtin(t) {
            return false;
        }
        matches!(self.def(t).kind, TypeKind::Intersection { .. })
            || self
                .all_super_types(t)
                .iter()
                .any(|&s| matches!(self.def(s).kind, TypeKind::Intersection { .. }))
    }

    /// True when the type carries no meaningful declared facets.
    pub fn is_empty_type(&self, t: TypeId) -> bool {
        self.def(t)
            .facets
            .iter()
            .filter(|f| match &f.data {
                FacetData::DiscriminatorValue { strict, .. } => *strict,
                _ => true,
            })
            .count()
            == 0
    }

    // -- options ----------------------------------------------------------

    /// Direct options of a union/intersection node; a union-through-
    /// inheritance collects the options of every union in its closure.
    pub fn options(&self, t: TypeId) -> Vec<TypeId> {
        match &self.def(t).kind {
            TypeKind::Union { options } | TypeKind::Intersection { options } => {
                options.iter().copied().collect()
            }
            _ if self.is_union(t) => {
                let mut out = Vec::new();
                for s in self.all_super_types(t) {
                    if let TypeKind::Union { options } = &self.def(s).kind {
                        for &o in options {
                            if !out.contains(&o) {
                                out.push(o);
                            }
                        }
                    }
                }
                out
            }
            _ => vec![t],
        }
    }

    /// Options with nested same-kind composites flattened.
    pub fn all_options(&self, t: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        match &self.def(t).kind {
            TypeKind::Union { .. } | TypeKind::Intersection { .. } => {
                self.fill_options(t, &mut out);
            }
            _ if self.is_union(t) => {
                for s in self.all_super_types(t) {
                    if matches!(self.def(s).kind, TypeKind::Union { .. }) {
                        self.fill_options(s, &mut out);
                    }
                }
            }
            _ => out.push(t),
        }
        out
    }

    /// Flatten nested options of the same composite kind; options of any
    /// other kind are kept as-is.
    fn fill_options(&self, t: TypeId, out: &mut Vec<TypeId>) {
        let kind_name = self.def(t).kind.kind_name();
        if let TypeKind::Union { options } | TypeKind::Intersection { options } =
            &self.def(t).kind
        {
            for &o in options.iter() {
                if self.def(o).kind.kind_name() == kind_name {
                    self.fill_options(o, out);
                } else if !out.contains(&o) {
                    out.push(o);
                }
            }
        }
    }

    // -- effective facet list ---------------------------------------------

    /// All type information associated with a type: its own declared
    /// facets plus every inheritable facet of its supertypes. If any
    /// supertype carries a known-properties (closed-object) restriction,
    /// exactly one synthesized copy is inherited regardless of how many
    /// supertypes declare it.
    pub fn meta(&self, t: TypeId) -> Vec<Facet> {
        let mut active = FxHashSet::default();
        active.insert(t);
        self.meta_guarded(t, &mut active)
    }

    fn meta_guarded(&self, t: TypeId, active: &mut FxHashSet<TypeId>) -> Vec<Facet> {
        let mut out: Vec<Facet> = self.def(t).facets.clone();
        if let TypeKind::Inherited { supers } = &self.def(t).kind {
            let mut has_known_properties = false;
            for &s in supers {
                // A supertype already on the traversal path closes a cycle;
                // treat it as terminal.
                if !active.insert(s) {
                    continue;
                }
                let inherited = self.meta_guarded(s, active);
                active.remove(&s);
                for m in inherited {
                    if matches!(m.data, FacetData::KnownProperties) {
                        if has_known_properties {
                            continue;
                        }
                        has_known_properties = true;
                        let mut synthesized = Facet::new(FacetData::KnownProperties);
                        synthesized.owner = t;
                        out.push(synthesized);
                        continue;
                    }
                    if m.is_inheritable() {
                        out.push(m);
                    }
                }
            }
        }
        out
    }

    /// First facet in the effective list matched by `pick`.
    pub fn one_meta<T>(&self, t: TypeId, pick: impl Fn(&Facet) -> Option<T>) -> Option<T> {
        self.meta(t).iter().find_map(|f| pick(f))
    }

    /// The discriminator property declared on (or inherited by) a type.
    pub fn discriminator(&self, t: TypeId) -> Option<String> {
        self.one_meta(t, |f| match &f.data {
            FacetData::Discriminator(name) => Some(name.clone()),
            _ => None,
        })
    }

    /// Explicit discriminator value, if declared.
    pub fn discriminator_value(&self, t: TypeId) -> Option<Value> {
        self.one_meta(t, |f| match &f.data {
            FacetData::DiscriminatorValue { value, .. } => Some(value.clone()),
            _ => None,
        })
    }

    /// The value distinguishing this family member: the explicit
    /// discriminator value, defaulting to the type's name.
    pub fn desc_value(&self, t: TypeId) -> Value {
        self.discriminator_value(t).unwrap_or_else(|| {
            self.def(t)
                .name()
                .map(|n| Value::String(n.to_string()))
                .unwrap_or(Value::Null)
        })
    }

    pub fn component_type(&self, t: TypeId) -> Option<TypeId> {
        self.one_meta(t, |f| match f.data {
            FacetData::ComponentType(ct) => Some(ct),
            _ => None,
        })
    }

    pub fn has_properties_facet(&self, t: TypeId) -> bool {
        self.def(t)
            .facets
            .iter()
            .any(|f| matches!(f.data, FacetData::HasPropertiesFacet))
    }

    // -- restrictions -----------------------------------------------------

    /// The effective restriction list of a type.
    ///
    /// For union kinds this is the OR over (AND of each option's own
    /// restrictions); a union-through-inheritance adds its own constraints
    /// after its supertypes'. Intersections flatten into a single AND. For
    /// plain types, with `for_validation` set, at most one generic-kind
    /// constraint contributes even if several are declared.
    pub fn restrictions(&self, t: TypeId, for_validation: bool) -> Vec<Restriction> {
        let mut active = FxHashSet::default();
        active.insert(t);
        self.restrictions_guarded(t, for_validation, &mut active)
    }

    fn restrictions_guarded(
        &self,
        t: TypeId,
        for_validation: bool,
        active: &mut FxHashSet<TypeId>,
    ) -> Vec<Restriction> {
        match &self.def(t).kind {
            TypeKind::Union { .. } => {
                let mut options = Vec::new();
                for o in self.all_options(t) {
                    if !active.insert(o) {
                        continue;
                    }
                    options.push((o, self.restrictions_guarded(o, false, active)));
                    active.remove(&o);
                }
                vec![Restriction::AnyOf { owner: t, options }]
            }
            TypeKind::Intersection { .. } => {
                let mut parts = Vec::new();
                for o in self.all_options(t) {
                    if !active.insert(o) {
                        continue;
                    }
                    parts.extend(self.restrictions_guarded(o, false, active));
                    active.remove(&o);
                }
                vec![Restriction::AllOf(parts)]
            }
            _ if self.is_union(t) => {
                let mut out = Vec::new();
                for &s in self.super_types(t).to_vec().iter() {
                    if !active.insert(s) {
                        continue;
                    }
                    out.extend(self.restrictions_guarded(s, false, active));
                    active.remove(&s);
                }
                for f in self.meta(t) {
                    if f.data.is_constraint() {
                        out.push(Restriction::Facet(f));
                    }
                }
                out
            }
            _ => {
                let mut out = Vec::new();
                let mut seen_generic = false;
                for f in self.meta(t) {
                    if !f.data.is_constraint() {
                        continue;
                    }
                    if for_validation && f.data.is_generic_kind() {
                        if seen_generic {
                            continue;
                        }
                        seen_generic = true;
                    }
                    out.push(Restriction::Facet(f));
                }
                out
            }
        }
    }

    /// Whether the declared facet list carries an explicit closed-object
    /// restriction (inherited copies included).
    pub fn has_known_properties_restriction(&self, t: TypeId) -> bool {
        self.meta(t)
            .iter()
            .any(|f| matches!(f.data, FacetData::KnownProperties))
    }

    /// Every "matches property" facet relevant to this type: its own, plus
    /// its supertypes' (inherited types) or its options' (unions).
    pub fn known_properties(&self, t: TypeId) -> Vec<Facet> {
        let mut active = FxHashSet::default();
        active.insert(t);
        self.known_properties_guarded(t, &mut active)
    }

    fn known_properties_guarded(&self, t: TypeId, active: &mut FxHashSet<TypeId>) -> Vec<Facet> {
        let mut out: Vec<Facet> = self
            .def(t)
            .facets
            .iter()
            .filter(|f| f.data.is_matches_property())
            .cloned()
            .collect();
        match &self.def(t).kind {
            TypeKind::Inherited { supers } => {
                for &s in supers {
                    if !active.insert(s) {
                        continue;
                    }
                    out.extend(self.known_properties_guarded(s, active));
                    active.remove(&s);
                }
            }
            TypeKind::Union { options } => {
                for &o in options {
                    if !active.insert(o) {
                        continue;
                    }
                    out.extend(self.known_properties_guarded(o, active));
                    active.remove(&o);
                }
            }
            _ => {}
        }
        out
    }

    /// Distinct property names constrained by `PropertyIs` facets.
    pub fn property_set(&self, t: TypeId) -> Vec<String> {
        let mut out = Vec::new();
        for f in self.meta(t) {
            if let FacetData::PropertyIs { name, .. } = &f.data {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
        }
        out
    }

    /// Resolve the declared properties of a type by a two-pass scan of its
    /// effective facet list: a reverse pass collects one entry per
    /// distinct property name from "matches property" facets (so the
    /// newest declaration wins the required flag slot while the oldest
    /// establishes the range), then a second reverse pass marks entries
    /// named by a `HasProperty` facet as required.
    pub fn properties(&self, t: TypeId) -> Vec<PropertyInfo> {
        let meta = self.meta(t);
        let mut map: IndexMap<String, PropertyInfo> = IndexMap::new();
        for f in meta.iter().rev() {
            let info = match &f.data {
                FacetData::PropertyIs { name, range } => PropertyInfo {
                    name: name.clone(),
                    range: *range,
                    required: false,
                    is_pattern: false,
                    is_additional: false,
                    declared_at: f.owner,
                },
                FacetData::MapPropertyIs { pattern, range } => PropertyInfo {
                    name: pattern.clone(),
                    range: *range,
                    required: false,
                    is_pattern: true,
                    is_additional: false,
                    declared_at: f.owner,
                },
                FacetData::AdditionalPropertyIs { range } => PropertyInfo {
                    name: "*".to_string(),
                    range: *range,
                    required: false,
                    is_pattern: false,
                    is_additional: true,
                    declared_at: f.owner,
                },
                _ => continue,
            };
            map.insert(info.name.clone(), info);
        }
        for f in meta.iter().rev() {
            if let FacetData::HasProperty(name) = &f.data {
                if let Some(info) = map.get_mut(name) {
                    info.required = true;
                }
            }
        }
        map.into_values().collect()
    }

    pub fn property(&self, t: TypeId, name: &str) -> Option<PropertyInfo> {
        self.properties(t).into_iter().find(|p| p.name == name)
    }

    /// Properties introduced by this type's own facet list.
    pub fn declared_properties(&self, t: TypeId) -> Vec<PropertyInfo> {
        self.properties(t)
            .into_iter()
            .filter(|p| p.declared_at == t)
            .collect()
    }

    // -- families ---------------------------------------------------------

    /// The deduplicated set of concrete classification targets reachable
    /// from a type: for unions the union of every option's family,
    /// otherwise {self} ∪ transitive subtypes, abstract/internal members
    /// excluded.
    pub fn type_family(&self, t: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        if self.is_union(t) {
            for o in self.all_options(t) {
                for m in self.type_family(o) {
                    if !out.contains(&m) {
                        out.push(m);
                    }
                }
            }
            return out;
        }
        if !self.is_abstract_or_internal(t) {
            out.push(t);
        }
        for s in self.all_sub_types(t) {
            if !self.is_abstract_or_internal(s) && !out.contains(&s) {
                out.push(s);
            }
        }
        out
    }

    // -- rendering --------------------------------------------------------

    pub fn name(&self, t: TypeId) -> &str {
        self.def(t).name().unwrap_or("")
    }

    /// Human-readable label: unions render `A|B`, intersections `A&B`,
    /// array-component types `T[]`.
    pub fn label(&self, t: TypeId) -> String {
        match &self.def(t).kind {
            TypeKind::Union { options } => options
                .iter()
                .map(|&o| self.label(o))
                .collect::<Vec<_>>()
                .join("|"),
            TypeKind::Intersection { options } => options
                .iter()
                .map(|&o| self.label(o))
                .collect::<Vec<_>>()
                .join("&"),
            _ => {
                if let Some(ct) = self.declared_component_type(t) {
                    return format!("{}[]", self.label(ct));
                }
                self.name(t).to_string()
            }
        }
    }

    fn declared_component_type(&self, t: TypeId) -> Option<TypeId> {
        self.def(t).facets.iter().find_map(|f| match f.data {
            FacetData::ComponentType(ct) => Some(ct),
            _ => None,
        })
    }

    /// Ordered name segments from the nearest named ancestor down to an
    /// anonymous nested type, for rendering human-readable locations.
    pub fn type_path(&self, t: TypeId) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = t;
        let mut seen = FxHashSet::default();
        loop {
            if !seen.insert(current) {
                break;
            }
            match self.def(current).name() {
                Some(name) => {
                    segments.push(name.to_string());
                    break;
                }
                None => match self.def(current).context() {
                    Some(ctx) => {
                        segments.push(ctx.path_name.clone());
                        current = ctx.owner;
                    }
                    None => break,
                },
            }
        }
        segments.reverse();
        segments
    }
}
