//! Opaque source references attached to facets and types.
//!
//! The engine never interprets these; they are surfaced verbatim in
//! diagnostics so that schema-authoring tooling can map a `Status` back to
//! the schema text that produced it.

use serde::{Deserialize, Serialize};

/// Half-open byte range inside a source file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u32,
    pub end: u32,
}

impl ByteRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Reference to the schema-source location a facet or type was declared at.
///
/// Supplied by the schema-loading collaborator; carried through unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub file: String,
    pub range: Option<ByteRange>,
}

impl SourceRef {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            range: None,
        }
    }

    pub fn with_range(file: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            file: file.into(),
            range: Some(ByteRange::new(start, end)),
        }
    }
}
