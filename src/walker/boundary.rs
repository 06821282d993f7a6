//! Scope boundaries encountered during a path walk.
//!
//! A boundary marks a scope delimiter — a loop or a call-stack frame — pushed on
//! entry and popped on exit. Detectors consume boundary-stack snapshots to tell
//! "same static occurrence" from "reachable via a different path". Each path branch
//! owns its own snapshot; stacks are never shared across sibling branches.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::graph::VertexId;

/// A scope delimiter encountered during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Entered a loop body; wraps the loop vertex.
    Loop(VertexId),
    /// Entered a callee body; wraps the call-site vertex.
    CallStack(VertexId),
}

impl Boundary {
    /// The vertex delimiting this scope.
    #[must_use]
    pub fn vertex(&self) -> VertexId {
        match self {
            Boundary::Loop(v) | Boundary::CallStack(v) => *v,
        }
    }

    /// Returns `true` for loop boundaries.
    #[must_use]
    pub fn is_loop(&self) -> bool {
        matches!(self, Boundary::Loop(_))
    }
}

/// Per-path stack of boundaries.
///
/// Cloned wholesale at branch points so sibling paths evolve independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryStack {
    entries: Vec<Boundary>,
}

impl BoundaryStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a boundary on scope entry.
    pub fn push(&mut self, boundary: Boundary) {
        self.entries.push(boundary);
    }

    /// Pops the innermost boundary on scope exit.
    pub fn pop(&mut self) -> Option<Boundary> {
        self.entries.pop()
    }

    /// Iterates boundaries from outermost to innermost.
    pub fn iter(&self) -> impl Iterator<Item = &Boundary> {
        self.entries.iter()
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no boundary is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The innermost loop boundary's vertex, when the walk is inside a loop.
    #[must_use]
    pub fn innermost_loop(&self) -> Option<VertexId> {
        self.entries
            .iter()
            .rev()
            .find(|b| b.is_loop())
            .map(Boundary::vertex)
    }

    /// Number of call-stack frames currently active.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.entries.iter().filter(|b| !b.is_loop()).count()
    }

    /// Stable fingerprint of the full boundary chain.
    ///
    /// Two occurrences of the same static vertex are distinguishable exactly when
    /// their fingerprints differ.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.entries.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut stack = BoundaryStack::new();
        stack.push(Boundary::CallStack(VertexId(1)));
        stack.push(Boundary::Loop(VertexId(2)));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop(), Some(Boundary::Loop(VertexId(2))));
        assert_eq!(stack.pop(), Some(Boundary::CallStack(VertexId(1))));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_innermost_loop_skips_call_frames() {
        let mut stack = BoundaryStack::new();
        stack.push(Boundary::Loop(VertexId(7)));
        stack.push(Boundary::CallStack(VertexId(8)));
        assert_eq!(stack.innermost_loop(), Some(VertexId(7)));
        assert_eq!(stack.call_depth(), 1);
    }

    #[test]
    fn test_fingerprint_distinguishes_chains() {
        let mut a = BoundaryStack::new();
        a.push(Boundary::CallStack(VertexId(1)));

        let mut b = BoundaryStack::new();
        b.push(Boundary::CallStack(VertexId(2)));

        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
    }
}
