//! Validation paths: where inside a nested instance a diagnostic applies.
//!
//! A path is an ordered chain of segment names, root-to-leaf. Paths are
//! never overwritten once attached to a status, only extended at the front:
//! as a validation unwinds, each enclosing property/index prepends its own
//! segment so every leaf diagnostic ends up carrying the full path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered segment chain, root first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPath {
    segments: Vec<String>,
}

impl ValidationPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-segment path.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append `child` after this path's segments: `self/child`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Graft `tail` onto the end of this chain, consuming both.
    ///
    /// This is the primitive behind prepend-style path propagation: the new
    /// (outer) chain is walked to its end and the existing (inner) chain is
    /// attached there.
    pub fn join(mut self, tail: &ValidationPath) -> Self {
        self.segments.extend(tail.segments.iter().cloned());
        self
    }
}

impl fmt::Display for ValidationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_root_to_leaf() {
        let p = ValidationPath::from_segments(["a", "b", "c"]);
        assert_eq!(p.to_string(), "a/b/c");
    }

    #[test]
    fn test_join_grafts_tail_at_end() {
        let outer = ValidationPath::single("outer");
        let inner = ValidationPath::from_segments(["x", "y"]);
        assert_eq!(outer.join(&inner).to_string(), "outer/x/y");
    }

    #[test]
    fn test_empty_renders_empty() {
        assert_eq!(ValidationPath::new().to_string(), "");
    }
}
