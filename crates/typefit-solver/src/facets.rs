//! Facet model: metadata and constraints attached to types.
//!
//! A facet is named metadata on a type: a modifier (`abstract`,
//! `polymorphic`, ...), plain metadata (discriminator declarations), or a
//! constraint, which is a facet that can check an instance and optionally
//! compose with another constraint.
//!
//! Facet kinds form a closed tagged enum so that consumers dispatch with
//! exhaustive matches. Leaf restriction kinds the engine does not own
//! (string length, numeric ranges, patterns, enumerations, date formats)
//! plug in through the `CustomConstraint` trait object variant.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use typefit_common::{SourceRef, Status, TypeId, ValidationPath};

/// Runtime kind of an instance value, as seen by `type-of` restrictions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    String,
    Boolean,
    Object,
    Array,
}

impl ValueKind {
    /// Classify an instance value. Null has no kind.
    pub fn of(value: &Value) -> Option<ValueKind> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Boolean),
            Value::Number(_) => Some(ValueKind::Number),
            Value::String(_) => Some(ValueKind::String),
            Value::Array(_) => Some(ValueKind::Array),
            Value::Object(_) => Some(ValueKind::Object),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        }
    }
}

/// Type modifiers. Declared as facets, never checked against instances.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModifierKind {
    /// Member of a polymorphic family; enables automatic classification.
    Polymorphic,
    /// Excluded from type families (never a classification target).
    Abstract,
    /// Engine-internal type, likewise excluded from families.
    Internal,
    /// Tagged at construction for the fixed built-in singletons.
    BuiltIn,
}

/// Contract for leaf restriction kinds supplied by collaborators.
///
/// The engine treats these opaquely: it runs `check` during validation and
/// folds the returned status into the aggregate. Custom constraints do not
/// participate in pairwise composition.
pub trait CustomConstraint: fmt::Debug + Send + Sync {
    fn facet_name(&self) -> &str;

    /// The facet value, serialized.
    fn value(&self) -> Value;

    fn check(&self, instance: &Value, path: Option<&ValidationPath>) -> Status;
}

/// Closed set of facet kinds.
#[derive(Clone, Debug)]
pub enum FacetData {
    Modifier(ModifierKind),

    // -- metadata ---------------------------------------------------------
    /// Declares the property name used to tell family members apart.
    Discriminator(String),
    /// Overrides the discriminator value for this member (default: the
    /// declaring type's name). `strict` values count towards `is_empty`.
    DiscriminatorValue { value: Value, strict: bool },
    /// Marks a type whose source declared a `properties` block, even an
    /// empty one.
    HasPropertiesFacet,

    // -- generic-kind constraints -----------------------------------------
    /// Instance must have the given runtime kind (null passes).
    TypeOf(ValueKind),
    /// Instance must be an integral number.
    IntegerKind,
    /// Instance must be null.
    NullKind,
    /// Instance must be a scalar (number, string or boolean).
    ScalarKind,

    // -- structural constraints -------------------------------------------
    /// The impossible constraint: only null satisfies it.
    Nothing,
    /// `Nothing` produced by a contradiction during composition; carries
    /// the composition-stack provenance and the offending partner.
    NothingWithLocation {
        message: String,
        /// Descriptions of the constraint chain being composed, innermost
        /// last.
        chain: Vec<String>,
        other: Box<FacetData>,
    },
    /// Closed-object restriction: properties not matched by any declared
    /// property facet are rejected.
    KnownProperties,
    /// The named property must be present.
    HasProperty(String),
    /// A present property must validate against `range`.
    PropertyIs { name: String, range: TypeId },
    /// Properties whose name matches the pattern must validate against
    /// `range`.
    MapPropertyIs { pattern: String, range: TypeId },
    /// Properties not matched by an explicit property facet must validate
    /// against `range`.
    AdditionalPropertyIs { range: TypeId },
    /// Array components must validate against the given type.
    ComponentType(TypeId),

    /// Collaborator-supplied leaf restriction.
    Custom(Arc<dyn CustomConstraint>),
}

impl FacetData {
    pub fn facet_name(&self) -> &'static str {
        match self {
            FacetData::Modifier(ModifierKind::Polymorphic) => "polymorphic",
            FacetData::Modifier(ModifierKind::Abstract) => "abstract",
            FacetData::Modifier(ModifierKind::Internal) => "internal",
            FacetData::Modifier(ModifierKind::BuiltIn) => "builtIn",
            FacetData::Discriminator(_) => "discriminator",
            FacetData::DiscriminatorValue { .. } => "discriminatorValue",
            FacetData::HasPropertiesFacet => "properties",
            FacetData::TypeOf(_) => "typeOf",
            FacetData::IntegerKind => "shouldBeInteger",
            FacetData::NullKind => "shouldBeNull",
            FacetData::ScalarKind => "shouldBeScalar",
            FacetData::Nothing | FacetData::NothingWithLocation { .. } => "nothing",
            FacetData::KnownProperties => "closed",
            FacetData::HasProperty(_) => "hasProperty",
            FacetData::PropertyIs { .. } => "propertyIs",
            FacetData::MapPropertyIs { .. } => "mapPropertyIs",
            FacetData::AdditionalPropertyIs { .. } => "additionalProperties",
            FacetData::ComponentType(_) => "items",
            FacetData::Custom(_) => "custom",
        }
    }

    /// True for facets that are checkable against instances.
    pub fn is_constraint(&self) -> bool {
        !matches!(
            self,
            FacetData::Modifier(_)
                | FacetData::Discriminator(_)
                | FacetData::DiscriminatorValue { .. }
                | FacetData::HasPropertiesFacet
        )
    }

    /// True for the generic runtime-kind constraints. At most one of these
    /// contributes to validation per non-union type.
    pub fn is_generic_kind(&self) -> bool {
        matches!(
            self,
            FacetData::TypeOf(_)
                | FacetData::IntegerKind
                | FacetData::NullKind
                | FacetData::ScalarKind
        )
    }

    /// True for facets that declare a property match ("matches property").
    pub fn is_matches_property(&self) -> bool {
        matches!(
            self,
            FacetData::PropertyIs { .. }
                | FacetData::MapPropertyIs { .. }
                | FacetData::AdditionalPropertyIs { .. }
        )
    }

    /// Default inheritability of this facet kind along supertype edges.
    pub fn default_inheritable(&self) -> bool {
        match self {
            FacetData::Modifier(ModifierKind::Polymorphic) => true,
            FacetData::Modifier(_) => false,
            // Each family member declares its own value.
            FacetData::DiscriminatorValue { .. } => false,
            FacetData::HasPropertiesFacet => false,
            _ => true,
        }
    }

    /// The facet value, serialized for display and tooling.
    pub fn value(&self) -> Value {
        match self {
            FacetData::Modifier(_) | FacetData::HasPropertiesFacet => Value::Bool(true),
            FacetData::Discriminator(name) => Value::String(name.clone()),
            FacetData::DiscriminatorValue { value, .. } => value.clone(),
            FacetData::TypeOf(kind) => Value::String(kind.name().to_string()),
            FacetData::IntegerKind | FacetData::NullKind | FacetData::ScalarKind => {
                Value::Bool(true)
            }
            FacetData::Nothing | FacetData::NothingWithLocation { .. } => {
                Value::String("!!!".to_string())
            }
            FacetData::KnownProperties => Value::Bool(false),
            FacetData::HasProperty(name) => Value::String(name.clone()),
            FacetData::PropertyIs { name, .. } => Value::String(name.clone()),
            FacetData::MapPropertyIs { pattern, .. } => Value::String(pattern.clone()),
            FacetData::AdditionalPropertyIs { .. } => Value::Null,
            FacetData::ComponentType(_) => Value::Null,
            FacetData::Custom(c) => c.value(),
        }
    }

    /// Short human-readable description, used for composition-stack
    /// provenance.
    pub fn describe(&self) -> String {
        match self {
            FacetData::TypeOf(kind) => format!("should be of type {}", kind.name()),
            FacetData::IntegerKind => "should be integer".to_string(),
            FacetData::NullKind => "should be null".to_string(),
            FacetData::ScalarKind => "should be scalar".to_string(),
            FacetData::Nothing | FacetData::NothingWithLocation { .. } => {
                "unsatisfiable".to_string()
            }
            FacetData::HasProperty(name) => format!("should have property {name}"),
            FacetData::PropertyIs { name, .. } => format!("property {name} restriction"),
            other => other.facet_name().to_string(),
        }
    }
}

/// Facet-level annotation, surfaced to tooling and never interpreted here.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub value: Value,
}

/// A facet attached to a type: the data plus its declaration context.
#[derive(Clone, Debug)]
pub struct Facet {
    /// The type that declared this facet. A back-reference, not an
    /// ownership relation.
    pub(crate) owner: TypeId,
    pub(crate) inheritable: bool,
    pub(crate) source: Option<SourceRef>,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) data: FacetData,
}

impl Facet {
    /// Build a facet with the kind's default inheritability. The owner is
    /// assigned when the facet is attached to a type.
    pub fn new(data: FacetData) -> Self {
        Self {
            owner: TypeId::INVALID,
            inheritable: data.default_inheritable(),
            source: None,
            annotations: Vec::new(),
            data,
        }
    }

    /// A facet synthesized on behalf of `owner` (never declared in any
    /// schema source), e.g. the closed-object restriction injected by
    /// auto-close validation.
    pub fn synthetic(owner: TypeId, data: FacetData) -> Self {
        let mut facet = Self::new(data);
        facet.owner = owner;
        facet
    }

    pub fn inheritable(mut self, inheritable: bool) -> Self {
        self.inheritable = inheritable;
        self
    }

    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn is_inheritable(&self) -> bool {
        self.inheritable
    }

    pub fn source(&self) -> Option<&SourceRef> {
        self.source.as_ref()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn data(&self) -> &FacetData {
        &self.data
    }

    pub fn facet_name(&self) -> &'static str {
        self.data.facet_name()
    }
}

/// Resolved view of one declared property, built by the two-pass facet scan
/// in `TypeStore::properties`.
#[derive(Clone, Debug)]
pub struct PropertyInfo {
    pub name: String,
    /// Declared type of the property value.
    pub range: TypeId,
    pub required: bool,
    /// Declared through a pattern ("map") property facet.
    pub is_pattern: bool,
    /// Declared through an additional-properties facet.
    pub is_additional: bool,
    /// The type whose facet list introduced this property.
    pub declared_at: TypeId,
}
