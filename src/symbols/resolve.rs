//! Variant-specific method resolution for symbolic values.
//!
//! Given a receiver value and an attempted method invocation, resolution either
//! produces a new value derived via the receiver variant's rule table, or signals
//! "no rule matched" (`None`), in which case the caller synthesizes a placeholder
//! from the invoked method's *declared* return type. Resolution is case-insensitive
//! on the method name and dispatches on the receiver's static variant, never on
//! argument values. Every produced value records, on construction, which value and
//! invocation returned it.

use crate::{
    graph::VertexId,
    symbols::{FieldName, SchemaType, ValueArena, ValueId, ValueKind},
};

/// Field-accessor method recognized on field-set members.
pub const METHOD_GET_SOBJECT_FIELD: &str = "getSObjectField";

/// Attempts to resolve a method invocation on `receiver`.
///
/// Returns the produced value, or `None` when no rule matched for the receiver's
/// variant — an expected outcome, not a failure.
pub fn resolve_method(
    arena: &mut ValueArena,
    receiver: ValueId,
    method_name: &str,
    invocation: VertexId,
) -> Option<ValueId> {
    let kind = arena.get(receiver)?.kind.clone();
    let produced = match kind {
        ValueKind::FieldSetMember { field_set } => {
            resolve_on_field_set_member(arena, field_set, method_name)?
        }
        ValueKind::FieldSet { schema_type } => {
            resolve_on_field_set(arena, receiver, &schema_type, method_name)?
        }
        ValueKind::Str { literal } => resolve_on_string(&literal, method_name)?,
        ValueKind::StandardObject { .. } => resolve_on_standard_object(method_name)?,
        ValueKind::Field { .. } | ValueKind::UserObject { .. } | ValueKind::Indeterminate { .. } => {
            return None
        }
    };
    Some(arena.alloc_returned(produced, Some(receiver), Some(invocation)))
}

/// A field-set member resolves the field accessor to a new indeterminate field
/// scoped to the owning set's declared schema type. It never fabricates a concrete
/// field name.
fn resolve_on_field_set_member(
    arena: &ValueArena,
    field_set: ValueId,
    method_name: &str,
) -> Option<ValueKind> {
    if !method_name.eq_ignore_ascii_case(METHOD_GET_SOBJECT_FIELD) {
        return None;
    }
    let schema_type = match arena.get(field_set).map(|v| &v.kind) {
        Some(ValueKind::FieldSet { schema_type }) => schema_type.clone(),
        _ => SchemaType::Unknown,
    };
    Some(ValueKind::Field {
        schema_type,
        name: FieldName::Indeterminate,
    })
}

fn resolve_on_field_set(
    _arena: &ValueArena,
    receiver: ValueId,
    _schema_type: &SchemaType,
    method_name: &str,
) -> Option<ValueKind> {
    if method_name.eq_ignore_ascii_case("getFields") {
        return Some(ValueKind::FieldSetMember {
            field_set: receiver,
        });
    }
    if method_name.eq_ignore_ascii_case("getName") {
        return Some(ValueKind::Str { literal: None });
    }
    None
}

/// String rules propagate the literal only when the content is syntactically
/// determinable; otherwise the result is an indeterminate string.
fn resolve_on_string(literal: &Option<String>, method_name: &str) -> Option<ValueKind> {
    let transformed = if method_name.eq_ignore_ascii_case("toLowerCase") {
        literal.as_ref().map(|s| s.to_lowercase())
    } else if method_name.eq_ignore_ascii_case("toUpperCase") {
        literal.as_ref().map(|s| s.to_uppercase())
    } else if method_name.eq_ignore_ascii_case("trim") {
        literal.as_ref().map(|s| s.trim().to_string())
    } else {
        return None;
    };
    Some(ValueKind::Str {
        literal: transformed,
    })
}

fn resolve_on_standard_object(method_name: &str) -> Option<ValueKind> {
    if method_name.eq_ignore_ascii_case("getName") {
        return Some(ValueKind::Str { literal: None });
    }
    None
}

/// Synthesizes a placeholder value from a method's *declared* return type.
///
/// Used when no resolution rule matched; the placeholder carries no runtime
/// information, since none exists. String returns yield an indeterminate string so
/// string rules remain applicable downstream; everything else is indeterminate with
/// the declared type attached.
pub fn synthesize_return(
    arena: &mut ValueArena,
    declared_return: Option<&str>,
    returned_from: Option<ValueId>,
    invocation: VertexId,
) -> ValueId {
    let kind = match declared_return {
        Some(name) if name.eq_ignore_ascii_case("string") => ValueKind::Str { literal: None },
        other => ValueKind::Indeterminate {
            declared_type: other.map(ToString::to_string),
        },
    };
    arena.alloc_returned(kind, returned_from, Some(invocation))
}
