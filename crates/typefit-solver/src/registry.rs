//! Name-scoped type registries.
//!
//! A registry maps names to types and may chain to a parent scope; lookup
//! checks the local map first, then delegates, so child scopes shadow the
//! parent, lexical-scoping style. The builtin registry seeded by
//! `TypeStore::new` is the usual root of the chain.

use crate::store::TypeStore;
use indexmap::IndexMap;
use std::sync::Arc;
use typefit_common::TypeId;

#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeId>,
    parent: Option<Arc<TypeRegistry>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Arc<TypeRegistry>) -> Self {
        Self {
            types: IndexMap::new(),
            parent: Some(parent),
        }
    }

    /// Register a type under an explicit alias.
    pub fn put(&mut self, alias: &str, t: TypeId) {
        self.types.insert(alias.to_string(), t);
    }

    /// Register a type under its own name. A no-op for anonymous types;
    /// re-registering a name shadows the earlier entry.
    pub fn add_type(&mut self, store: &TypeStore, t: TypeId) {
        let Some(name) = store.def(t).name() else {
            return;
        };
        if name.is_empty() {
            return;
        }
        self.types.insert(name.to_string(), t);
    }

    /// Resolve a name, local scope first, then the parent chain.
    pub fn get(&self, name: &str) -> Option<TypeId> {
        if let Some(&t) = self.types.get(name) {
            return Some(t);
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Locally registered types, in registration order.
    pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types.values().copied()
    }

    pub fn type_map(&self) -> &IndexMap<String, TypeId> {
        &self.types
    }

    pub fn parent(&self) -> Option<&Arc<TypeRegistry>> {
        self.parent.as_ref()
    }
}
