//! Common types and utilities for the typefit type engine.
//!
//! This crate provides the foundational types used across all typefit crates:
//! - Arena type identifiers (`TypeId`)
//! - The hierarchical diagnostics model (`Status`, `Severity`)
//! - Validation paths (`ValidationPath`)
//! - The message catalog and `{{param}}` templating
//! - Opaque source references (`SourceRef`, `ByteRange`)

pub mod ids;
pub use ids::TypeId;

pub mod source;
pub use source::{ByteRange, SourceRef};

pub mod path;
pub use path::ValidationPath;

pub mod status;
pub use status::{
    GLOBAL_EXTRA, SCHEMA_AND_TYPE_EXTRA, SOURCE_EXTRA, Severity, Status, StatusSource,
    TOP_LEVEL_EXTRA,
};

pub mod messages;
pub use messages::{MessageEntry, message_text};
