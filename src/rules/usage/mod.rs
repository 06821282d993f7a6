//! Existential usage search over the whole graph.
//!
//! The search answers one question per candidate method: is there at least one
//! invocation site that reaches it? Candidates are filtered by declaration-level
//! eligibility, probed in parallel, and the survivors with no confirmed usage are
//! reported through the run's [`RuleStateTracker`].

mod validator;

pub use validator::MethodCallValidator;

use rayon::prelude::*;

use crate::{
    graph::ProgramGraph,
    rules::{EligibilityPolicy, RuleStateTracker},
};

/// Driver for one unused-method detection run.
#[derive(Debug)]
pub struct UsageAnalysis;

impl UsageAnalysis {
    /// Runs the search over `graph` and returns the run's final state.
    ///
    /// Ineligible methods are skipped before any search work and never reported.
    /// A defect while probing one candidate abandons that candidate only; the
    /// remaining candidates still complete.
    #[must_use]
    pub fn run<'g>(
        graph: &'g ProgramGraph,
        eligibility: &impl EligibilityPolicy,
    ) -> RuleStateTracker<'g> {
        let tracker = RuleStateTracker::new(graph);

        let mut candidates = Vec::new();
        for vertex in graph.methods() {
            let Some(method) = vertex.as_method() else {
                continue;
            };
            match eligibility.ineligibility_reason(method) {
                Some(reason) => {
                    tracing::debug!(
                        method = %graph.method_display(vertex.id),
                        %reason,
                        "skipping ineligible method"
                    );
                }
                None => {
                    tracker.track_eligible(vertex.id);
                    candidates.push(vertex.id);
                }
            }
        }
        // Force the shared index before the parallel probes contend for it.
        let _ = tracker.invocation_index();

        candidates.par_iter().for_each(|&candidate| {
            let validator = MethodCallValidator::new(&tracker);
            match validator.is_used(candidate) {
                Ok(true) => {}
                Ok(false) => tracker.track_unused(candidate),
                Err(error) => {
                    tracing::warn!(
                        method = %graph.method_display(candidate),
                        %error,
                        "abandoning candidate after graph defect"
                    );
                }
            }
        });

        tracker
    }
}
