//! Hierarchical, severity-ranked validation results.
//!
//! A `Status` is a tree: every constraint check and every nested validation
//! contributes a node. Aggregation follows two rules:
//!
//! - the severity of an aggregate is the max of its own initial severity and
//!   all (transitively) added children's severities;
//! - the displayed message is adopted from the first child that *strictly*
//!   raises the running severity. Later children of equal or lower severity
//!   never overwrite it.

use crate::messages::{MessageEntry, message_text};
use crate::path::ValidationPath;
use crate::source::ByteRange;
use crate::{SourceRef, TypeId};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fmt;

/// Well-known extras key: the schema source node a diagnostic originated at.
pub const SOURCE_EXTRA: &str = "source";
/// Well-known extras key: marks a type as a global (named, top-of-scope)
/// declaration. Discriminator defaulting looks for the nearest ancestor
/// carrying this marker.
pub const GLOBAL_EXTRA: &str = "global";
/// Well-known extras key: marks a top-level type of a schema document.
pub const TOP_LEVEL_EXTRA: &str = "topLevel";
/// Well-known extras key: set on types that are both a schema and a type.
pub const SCHEMA_AND_TYPE_EXTRA: &str = "schemaAndType";

/// Diagnostic severity, totally ordered: OK < INFO < WARNING < ERROR.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    #[default]
    Ok,
    Info,
    Warning,
    Error,
}

/// What produced a status: a type, or a facet declared by a type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StatusSource {
    #[default]
    None,
    Type(TypeId),
    Facet {
        owner: TypeId,
        facet: &'static str,
    },
}

impl StatusSource {
    pub fn owner(&self) -> Option<TypeId> {
        match self {
            StatusSource::None => None,
            StatusSource::Type(t) => Some(*t),
            StatusSource::Facet { owner, .. } => Some(*owner),
        }
    }
}

/// One node of a diagnostic tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Status {
    severity: Severity,
    code: String,
    message: String,
    source: StatusSource,
    sub_status: Vec<Status>,
    path: Option<ValidationPath>,
    file_path: Option<String>,
    range: Option<ByteRange>,
    extras: FxHashMap<String, Value>,
}

/// The all-clear status.
pub fn ok() -> Status {
    Status::default()
}

impl Status {
    pub fn new(
        severity: Severity,
        code: impl Into<String>,
        message: impl Into<String>,
        source: StatusSource,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            source,
            ..Self::default()
        }
    }

    /// An OK aggregate attributed to `source`, ready to fold children into.
    pub fn ok_for(source: StatusSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Build a status from a message-catalog entry, substituting
    /// `{{param}}` tokens. Panics if the template references a parameter
    /// that is not supplied (a hard configuration error, per the catalog
    /// contract).
    pub fn from_entry(
        entry: &MessageEntry,
        source: StatusSource,
        params: &[(&str, &str)],
        severity: Severity,
    ) -> Self {
        Self::new(severity, entry.code, message_text(entry, params), source)
    }

    /// Shorthand for an ERROR built from a catalog entry.
    pub fn error(entry: &MessageEntry, source: StatusSource, params: &[(&str, &str)]) -> Self {
        Self::from_entry(entry, source, params, Severity::Error)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_ok(&self) -> bool {
        self.severity == Severity::Ok
    }

    pub fn is_info(&self) -> bool {
        self.severity == Severity::Info
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn source(&self) -> &StatusSource {
        &self.source
    }

    pub fn set_source(&mut self, source: StatusSource) {
        self.source = source;
    }

    pub fn sub_statuses(&self) -> &[Status] {
        &self.sub_status
    }

    /// Fold a child status into this aggregate.
    ///
    /// If `path_segment` is given, the child's path (and transitively its
    /// children's paths) is prefixed with that segment first. The child then
    /// raises this status's severity to `max(own, child)`; on a strict raise
    /// the child's message becomes the aggregate's summary message.
    pub fn add_sub_status(&mut self, mut child: Status, path_segment: Option<&str>) {
        if let Some(name) = path_segment {
            child.prefix_path(&ValidationPath::single(name));
        }
        if self.severity < child.severity {
            self.severity = child.severity;
            self.message = child.message.clone();
        }
        self.sub_status.push(child);
    }

    /// Prefix this status's validation path with `path`, then recurse into
    /// every substatus so that each leaf carries the full root-to-leaf
    /// chain. Existing paths are extended at the front, never overwritten.
    pub fn prefix_path(&mut self, path: &ValidationPath) {
        self.path = Some(match self.path.take() {
            Some(existing) => path.clone().join(&existing),
            None => path.clone(),
        });
        for sub in &mut self.sub_status {
            sub.prefix_path(path);
        }
    }

    pub fn validation_path(&self) -> Option<&ValidationPath> {
        self.path.as_ref()
    }

    pub fn path_string(&self) -> String {
        self.path.as_ref().map(|p| p.to_string()).unwrap_or_default()
    }

    /// Flatten this tree into its terminal non-OK diagnostics.
    ///
    /// OK and INFO statuses contribute nothing. A childless ERROR/WARNING
    /// status returns itself; an aggregate returns only its non-OK leaves.
    /// Intermediate container statuses never appear in the result.
    pub fn get_errors(&self) -> Vec<&Status> {
        if self.is_error() || self.is_warning() {
            if self.sub_status.is_empty() {
                return vec![self];
            }
            return self
                .sub_status
                .iter()
                .flat_map(|s| s.get_errors())
                .collect();
        }
        Vec::new()
    }

    pub fn get_extra(&self, name: &str) -> Option<&Value> {
        self.extras.get(name)
    }

    pub fn put_extra(&mut self, name: impl Into<String>, value: Value) {
        self.extras.insert(name.into(), value);
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn range(&self) -> Option<ByteRange> {
        self.range
    }

    /// Attach an opaque source location, surfaced verbatim in tooling.
    pub fn set_source_ref(&mut self, source: &SourceRef) {
        self.file_path = Some(source.file.clone());
        self.range = source.range;
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            write!(f, "OK")
        } else {
            write!(f, "{}", self.message)
        }
    }
}
