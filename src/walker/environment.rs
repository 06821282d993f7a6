//! Variable-binding environment carried along a walked path.

use std::collections::HashMap;

use crate::symbols::{ValueArena, ValueId};

/// Name-to-value bindings for one path.
///
/// Names are case-insensitive, matching the source language's identifier rules.
/// Forking an environment at a branch point deep-clones every bound value, so
/// provenance recorded on one sibling path never appears on the other.
#[derive(Debug, Clone, Default)]
pub struct PathEnvironment {
    bindings: HashMap<String, ValueId>,
}

impl PathEnvironment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to a value, replacing any previous binding.
    pub fn bind(&mut self, name: &str, value: ValueId) {
        self.bindings.insert(name.to_ascii_lowercase(), value);
    }

    /// Looks up a binding, case-insensitively.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ValueId> {
        self.bindings.get(&name.to_ascii_lowercase()).copied()
    }

    /// Number of live bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates bindings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ValueId)> {
        self.bindings.iter().map(|(name, &value)| (name.as_str(), value))
    }

    /// Forks this environment for a sibling path, deep-cloning every bound value.
    #[must_use]
    pub fn fork(&self, arena: &mut ValueArena) -> Self {
        let bindings = self
            .bindings
            .iter()
            .map(|(name, &value)| (name.clone(), arena.deep_clone(value)))
            .collect();
        Self { bindings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::ValueKind;

    #[test]
    fn test_binding_is_case_insensitive() {
        let mut arena = ValueArena::new();
        let value = arena.alloc(ValueKind::Str { literal: None });
        let mut env = PathEnvironment::new();
        env.bind("MyVar", value);
        assert_eq!(env.lookup("myvar"), Some(value));
        assert_eq!(env.lookup("MYVAR"), Some(value));
        assert_eq!(env.lookup("other"), None);
    }

    #[test]
    fn test_fork_clones_every_binding() {
        let mut arena = ValueArena::new();
        let value = arena.alloc(ValueKind::UserObject {
            type_name: "Widget".to_string(),
        });
        let mut env = PathEnvironment::new();
        env.bind("w", value);

        let forked = env.fork(&mut arena);
        let forked_value = forked.lookup("w").unwrap();
        assert_ne!(forked_value, value);
        assert_eq!(
            arena.get(forked_value).unwrap().kind,
            arena.get(value).unwrap().kind
        );
        // Original binding untouched.
        assert_eq!(env.lookup("w"), Some(value));
    }
}
