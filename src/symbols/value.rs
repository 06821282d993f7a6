//! Symbolic value representation for path analysis.

use crate::{graph::VertexId, symbols::ValueId};

/// Possibly-unknown schema-object type carried by schema values.
///
/// A tag, never an `Option`: an unknown schema type is distinguishable from a known
/// one by variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaType {
    /// The declared schema-object type name.
    Known(String),
    /// Schema-object type could not be determined syntactically.
    Unknown,
}

/// Possibly-unknown field name carried by field values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// The field name, syntactically determined.
    Known(String),
    /// Field name is indeterminate; the analysis never fabricates a concrete name.
    Indeterminate,
}

/// Tagged variant of a symbolic value.
///
/// A closed sum: method-resolution dispatch matches on it exhaustively. New value
/// shapes are added by extending this tag set and its resolution table, never by
/// open-ended subtyping. A value's variant never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// An instance of a standard-library type.
    StandardObject {
        /// Standard-library type name.
        type_name: String,
    },

    /// A string value.
    ///
    /// `literal` is populated only when the content is syntactically determinable
    /// (a literal in the source); the engine never executes code to learn it.
    Str {
        /// Literal content, when syntactically determinable.
        literal: Option<String>,
    },

    /// A single schema field.
    Field {
        /// Schema-object type the field belongs to.
        schema_type: SchemaType,
        /// Field name tag; indeterminate fields are distinguishable by tag, never by null.
        name: FieldName,
    },

    /// A field set over a possibly-unknown schema-object type.
    FieldSet {
        /// Schema-object type the set was declared on.
        schema_type: SchemaType,
    },

    /// A member of a field set. Owned by exactly one field set; the owning edge is
    /// followed by deep cloning.
    FieldSetMember {
        /// The owning field set value.
        field_set: ValueId,
    },

    /// An instance of a user-defined type.
    UserObject {
        /// User-defined type name.
        type_name: String,
    },

    /// A value about which nothing is known beyond an optional declared type.
    Indeterminate {
        /// Declared type name from the method signature, when available.
        declared_type: Option<String>,
    },
}

impl ValueKind {
    /// Short label naming the variant, used in diagnostics and provenance output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ValueKind::StandardObject { .. } => "StandardObject",
            ValueKind::Str { .. } => "Str",
            ValueKind::Field { .. } => "Field",
            ValueKind::FieldSet { .. } => "FieldSet",
            ValueKind::FieldSetMember { .. } => "FieldSetMember",
            ValueKind::UserObject { .. } => "UserObject",
            ValueKind::Indeterminate { .. } => "Indeterminate",
        }
    }
}

/// A symbolic value: variant plus provenance.
///
/// Provenance records which value and which invocation produced this value. Both
/// links are non-owning ids into the arena/graph, recorded on construction and
/// never mutated afterwards; they exist purely for explaining results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicValue {
    /// Tagged variant.
    pub kind: ValueKind,
    /// The value whose method resolution produced this value, when any.
    pub returned_from: Option<ValueId>,
    /// The invocation vertex that produced this value, when any.
    pub invocation: Option<VertexId>,
}

impl SymbolicValue {
    /// Creates a value with no provenance (e.g. a literal or a fresh binding).
    #[must_use]
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            returned_from: None,
            invocation: None,
        }
    }

    /// Returns `true` if this value is fully indeterminate.
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        matches!(self.kind, ValueKind::Indeterminate { .. })
    }

    /// Returns `true` if this value carries a syntactically determined string literal.
    #[must_use]
    pub fn is_determinate_string(&self) -> bool {
        matches!(self.kind, ValueKind::Str { literal: Some(_) })
    }

    /// Attempts to extract the string literal content.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::Str { literal } => literal.as_deref(),
            _ => None,
        }
    }
}
