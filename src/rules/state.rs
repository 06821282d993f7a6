//! Run-scoped mutable state shared by a detection run.
//!
//! A [`RuleStateTracker`] is created per run and dropped with it. It accumulates the
//! run's candidate and result sets behind concurrent collections, so candidate
//! probes may execute in parallel without locking the tracker, and it owns the
//! lazily built invocation index the usage search consults.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use dashmap::DashSet;

use crate::graph::{ProgramGraph, VertexId};

/// Per-run detection state: candidates, verdicts, caches, and counters.
///
/// All mutation goes through interior-mutable collections; the tracker is shared by
/// `&` reference across worker threads. Nothing in it outlives the run.
#[derive(Debug)]
pub struct RuleStateTracker<'g> {
    graph: &'g ProgramGraph,
    eligible: DashSet<VertexId>,
    unused: DashSet<VertexId>,
    invocation_index: OnceLock<HashMap<String, Vec<VertexId>>>,
    probes: AtomicUsize,
}

impl<'g> RuleStateTracker<'g> {
    /// Creates an empty tracker over `graph`.
    #[must_use]
    pub fn new(graph: &'g ProgramGraph) -> Self {
        Self {
            graph,
            eligible: DashSet::new(),
            unused: DashSet::new(),
            invocation_index: OnceLock::new(),
            probes: AtomicUsize::new(0),
        }
    }

    /// The graph this run analyzes.
    #[must_use]
    pub fn graph(&self) -> &'g ProgramGraph {
        self.graph
    }

    /// Records a method as an eligible candidate for this run.
    pub fn track_eligible(&self, method: VertexId) {
        self.eligible.insert(method);
    }

    /// Returns `true` if `method` was recorded as eligible.
    #[must_use]
    pub fn is_eligible(&self, method: VertexId) -> bool {
        self.eligible.contains(&method)
    }

    /// Records a candidate for which no usage was found.
    pub fn track_unused(&self, method: VertexId) {
        self.unused.insert(method);
    }

    /// Eligible candidates, sorted by vertex id for deterministic output.
    #[must_use]
    pub fn eligible_candidates(&self) -> Vec<VertexId> {
        let mut candidates: Vec<_> = self.eligible.iter().map(|entry| *entry).collect();
        candidates.sort_unstable();
        candidates
    }

    /// Candidates with no discovered usage, sorted by vertex id.
    #[must_use]
    pub fn unused_candidates(&self) -> Vec<VertexId> {
        let mut candidates: Vec<_> = self.unused.iter().map(|entry| *entry).collect();
        candidates.sort_unstable();
        candidates
    }

    /// Invocation sites grouped by lowercased invoked name, built on first use.
    pub fn invocation_index(&self) -> &HashMap<String, Vec<VertexId>> {
        self.invocation_index.get_or_init(|| {
            let mut index: HashMap<String, Vec<VertexId>> = HashMap::new();
            for vertex in self.graph.invocations() {
                if let Some(data) = vertex.as_invocation() {
                    index
                        .entry(data.target_name.to_ascii_lowercase())
                        .or_default()
                        .push(vertex.id);
                }
            }
            index
        })
    }

    /// Counts one examined invocation site.
    pub fn record_probe(&self) {
        self.probes.fetch_add(1, Ordering::Relaxed);
    }

    /// Total invocation sites examined so far.
    #[must_use]
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ArgShape, GraphBuilder, InvocationForm, MethodKind, MethodModifiers, Receiver};

    #[test]
    fn test_candidate_sets_are_sorted_and_deduplicated() {
        let mut builder = GraphBuilder::new();
        let class = builder.class("Util");
        let a = builder.method(class, "a", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let b = builder.method(class, "b", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let graph = builder.build().unwrap();

        let tracker = RuleStateTracker::new(&graph);
        tracker.track_eligible(b);
        tracker.track_eligible(a);
        tracker.track_eligible(a);
        tracker.track_unused(b);

        assert_eq!(tracker.eligible_candidates(), vec![a, b]);
        assert_eq!(tracker.unused_candidates(), vec![b]);
        assert!(tracker.is_eligible(a));
    }

    #[test]
    fn test_invocation_index_groups_by_lowercased_name() {
        let mut builder = GraphBuilder::new();
        let class = builder.class("Util");
        let caller = builder.method(class, "main", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let first = builder.invocation(
            InvocationForm::MethodCall,
            "Helper",
            Receiver::None,
            vec![ArgShape::Literal],
        );
        let second = builder.invocation(
            InvocationForm::MethodCall,
            "helper",
            Receiver::None,
            Vec::new(),
        );
        builder.set_body(caller, vec![first, second]);
        let graph = builder.build().unwrap();

        let tracker = RuleStateTracker::new(&graph);
        let index = tracker.invocation_index();
        assert_eq!(index.get("helper"), Some(&vec![first, second]));
        assert!(index.get("Helper").is_none());
    }

    #[test]
    fn test_probe_counter() {
        let mut builder = GraphBuilder::new();
        builder.class("Empty");
        let graph = builder.build().unwrap();

        let tracker = RuleStateTracker::new(&graph);
        assert_eq!(tracker.probes(), 0);
        tracker.record_probe();
        tracker.record_probe();
        assert_eq!(tracker.probes(), 2);
    }
}
