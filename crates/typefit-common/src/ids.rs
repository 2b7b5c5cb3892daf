//! Stable identifiers shared across the typefit crates.

use serde::{Deserialize, Serialize};

/// Arena index of a type definition inside a `TypeStore`.
///
/// Types reference each other exclusively through `TypeId`, which keeps the
/// sub/super-type graph free of ownership cycles: edges are plain index
/// lists and the store owns every node. Ids are assigned sequentially at
/// construction and are unique per store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Sentinel for "no type". Never handed out by a store.
    pub const INVALID: Self = Self(u32::MAX);

    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_validity() {
        assert!(!TypeId::INVALID.is_valid());
        assert!(TypeId(0).is_valid());
        assert!(TypeId(42).is_valid());
    }
}
