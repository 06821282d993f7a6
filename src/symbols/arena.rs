//! Arena storage for symbolic values.
//!
//! Values are arena-allocated and referenced by [`ValueId`]. Provenance links are
//! ids into the arena rather than shared pointers, so sibling path branches stay
//! disentangled after cloning: a deep clone produces fresh instances while the
//! recorded provenance keeps pointing at the values that actually produced them.

use std::fmt;

use crate::{
    graph::VertexId,
    symbols::{SymbolicValue, ValueKind},
};

/// Identifier for a value in a [`ValueArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "val{}", self.0)
    }
}

/// Owning arena of symbolic values for one path walk.
///
/// One arena per run; it is never shared across runs. Values are immutable once
/// allocated — new facts become new values with provenance, never in-place edits.
#[derive(Debug, Default)]
pub struct ValueArena {
    values: Vec<SymbolicValue>,
}

impl ValueArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a value with no provenance.
    ///
    /// # Panics
    ///
    /// Panics once the arena exhausts the 32-bit id space.
    pub fn alloc(&mut self, kind: ValueKind) -> ValueId {
        self.alloc_value(SymbolicValue::new(kind))
    }

    /// Allocates a value recording, on construction, which value and invocation
    /// produced it.
    ///
    /// # Panics
    ///
    /// Panics once the arena exhausts the 32-bit id space.
    pub fn alloc_returned(
        &mut self,
        kind: ValueKind,
        returned_from: Option<ValueId>,
        invocation: Option<VertexId>,
    ) -> ValueId {
        self.alloc_value(SymbolicValue {
            kind,
            returned_from,
            invocation,
        })
    }

    fn alloc_value(&mut self, value: SymbolicValue) -> ValueId {
        let id = ValueId(Self::next_id(self.values.len()));
        self.values.push(value);
        id
    }

    /// Converts the next slot index into an id, panicking rather than aliasing
    /// ids once the 32-bit id space is exhausted.
    fn next_id(slot: usize) -> u32 {
        match u32::try_from(slot) {
            Ok(id) => id,
            Err(_) => panic!("value arena exhausted the 32-bit id space"),
        }
    }

    /// Returns a value by id.
    #[must_use]
    pub fn get(&self, id: ValueId) -> Option<&SymbolicValue> {
        self.values.get(id.0 as usize)
    }

    /// Number of allocated values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no values have been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deep-clones a value into a distinct instance.
    ///
    /// The clone preserves variant and provenance ids but occupies a fresh arena
    /// slot; owned members (a field-set member's field set) are cloned transitively,
    /// so nothing reached through the clone is shared with the original. Required
    /// whenever a value propagates into more than one successor path.
    pub fn deep_clone(&mut self, id: ValueId) -> ValueId {
        let Some(original) = self.get(id).cloned() else {
            return id;
        };
        let kind = match original.kind {
            ValueKind::FieldSetMember { field_set } => ValueKind::FieldSetMember {
                field_set: self.deep_clone(field_set),
            },
            other => other,
        };
        self.alloc_value(SymbolicValue {
            kind,
            returned_from: original.returned_from,
            invocation: original.invocation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SchemaType;

    #[test]
    fn test_next_id_tracks_slot_index() {
        assert_eq!(ValueArena::next_id(0), 0);
        assert_eq!(ValueArena::next_id(41), 41);
    }

    #[test]
    #[should_panic(expected = "32-bit id space")]
    fn test_exhausted_id_space_panics_instead_of_aliasing() {
        let _ = ValueArena::next_id(usize::MAX);
    }

    #[test]
    fn test_deep_clone_is_distinct_and_preserves_provenance() {
        let mut arena = ValueArena::new();
        let producer = arena.alloc(ValueKind::UserObject {
            type_name: "Widget".to_string(),
        });
        let value = arena.alloc_returned(
            ValueKind::Str { literal: None },
            Some(producer),
            Some(VertexId(42)),
        );

        let clone = arena.deep_clone(value);
        assert_ne!(clone, value);

        let cloned = arena.get(clone).unwrap();
        assert_eq!(cloned.returned_from, Some(producer));
        assert_eq!(cloned.invocation, Some(VertexId(42)));
        assert_eq!(cloned.kind, arena.get(value).unwrap().kind);
    }

    #[test]
    fn test_deep_clone_follows_owning_edges() {
        let mut arena = ValueArena::new();
        let field_set = arena.alloc(ValueKind::FieldSet {
            schema_type: SchemaType::Known("Account".to_string()),
        });
        let member = arena.alloc(ValueKind::FieldSetMember { field_set });

        let clone = arena.deep_clone(member);
        let ValueKind::FieldSetMember { field_set: cloned_set } =
            arena.get(clone).unwrap().kind.clone()
        else {
            panic!("clone changed variant");
        };
        assert_ne!(cloned_set, field_set);
        assert_eq!(
            arena.get(cloned_set).unwrap().kind,
            arena.get(field_set).unwrap().kind
        );
    }
}
