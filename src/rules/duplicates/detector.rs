//! Boundary-scoped duplicate-invocation detection.
//!
//! The detector rides a [`PathWalker`] over one entry point and accumulates
//! invocation occurrences by normalized call signature. Occurrence identity is the
//! pair of static vertex and boundary-chain fingerprint, so a statement
//! re-enumerated through shared path suffixes counts once, while the same statement
//! reached through a different loop or call chain counts again. A signature with
//! two or more occurrences becomes a finding; a single occurrence never does, even
//! inside a loop.

use std::collections::{HashMap, HashSet};

use crate::{
    graph::{ArgShape, InvocationData, ProgramGraph, Vertex, VertexId, VertexKind},
    rules::duplicates::{RepetitionKind, ViolationEvidence},
    walker::{CancelToken, PathContext, PathVisitor, PathWalker, VisitFlow},
    Error, Result,
};

/// One counted occurrence of a call signature.
#[derive(Debug, Clone, Copy)]
struct Occurrence {
    vertex: VertexId,
    innermost_loop: Option<VertexId>,
}

/// Duplicate-invocation detector for one entry point.
///
/// `sink` selects the invocations worth counting (e.g. expensive schema
/// lookups); `ignore` exempts individual sites the caller considers free.
/// Invocations outside the sink predicate never contribute occurrences.
pub struct DuplicateInvocationDetector<'g, S, F> {
    graph: &'g ProgramGraph,
    entry: VertexId,
    sink: S,
    ignore: F,
    cancel: CancelToken,
    seen: HashSet<(VertexId, u64)>,
    occurrences: HashMap<String, Vec<Occurrence>>,
}

impl<'g, S, F> DuplicateInvocationDetector<'g, S, F>
where
    S: Fn(&InvocationData) -> bool,
    F: Fn(&InvocationData) -> bool,
{
    /// Creates a detector for paths starting at the method vertex `entry`.
    pub fn new(graph: &'g ProgramGraph, entry: VertexId, sink: S, ignore: F) -> Self {
        Self {
            graph,
            entry,
            sink,
            ignore,
            cancel: CancelToken::new(),
            seen: HashSet::new(),
            occurrences: HashMap::new(),
        }
    }

    /// Attaches a cancellation token. A cancelled run reports nothing.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walks the entry point and returns its findings, deterministically ordered.
    ///
    /// Cancellation yields an empty result: partial evidence is never reported.
    ///
    /// # Errors
    ///
    /// Graph defects surfaced during the walk or during evidence re-validation
    /// abandon this entry point.
    pub fn collect_violations(mut self) -> Result<Vec<ViolationEvidence>> {
        let graph = self.graph;
        let entry = self.entry;
        let mut walker = PathWalker::new(graph).with_cancel(self.cancel.clone());
        match walker.walk(entry, &mut self) {
            Ok(()) => {}
            Err(Error::Cancelled) => {
                tracing::debug!(
                    entry = %graph.method_display(entry),
                    "cancelled mid-walk, discarding partial evidence"
                );
                return Ok(Vec::new());
            }
            Err(error) => return Err(error),
        }
        self.into_violations()
    }

    /// Normalized call signature: the resolved target when static resolution
    /// succeeded, otherwise the lowercased name with argument-shape tags.
    fn signature(data: &InvocationData) -> String {
        match data.resolved_target {
            Some(target) => format!("#{target}"),
            None => {
                let tags: String = data.args.iter().map(ArgShape::tag).collect();
                format!("{}({tags})", data.target_name.to_ascii_lowercase())
            }
        }
    }

    fn into_violations(self) -> Result<Vec<ViolationEvidence>> {
        let mut signatures: Vec<_> = self.occurrences.into_iter().collect();
        signatures.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut violations = Vec::new();
        for (signature, occurrences) in signatures {
            if occurrences.len() < 2 {
                tracing::trace!(%signature, "single occurrence, no finding");
                continue;
            }
            // Occurrences were recorded from live vertices; a shape change here
            // means the graph was corrupted out from under the run.
            for occurrence in &occurrences {
                self.graph
                    .expect_vertex(occurrence.vertex)?
                    .expect_invocation()?;
            }

            let shared_loop = occurrences[0].innermost_loop.filter(|_| {
                occurrences
                    .iter()
                    .all(|o| o.innermost_loop == occurrences[0].innermost_loop)
            });
            let repetition = if shared_loop.is_some() {
                RepetitionKind::Loop
            } else {
                RepetitionKind::CallStack
            };

            let sink = occurrences
                .last()
                .map(|o| o.vertex)
                .unwrap_or(self.entry);
            let triggers = occurrences.iter().map(|o| o.vertex).collect();
            violations.push(ViolationEvidence::new(self.entry, sink, repetition, triggers));
        }

        violations.sort_by(|a, b| a.sink.cmp(&b.sink).then_with(|| a.triggers.cmp(&b.triggers)));
        violations.dedup();
        Ok(violations)
    }
}

impl<'g, S, F> PathVisitor for DuplicateInvocationDetector<'g, S, F>
where
    S: Fn(&InvocationData) -> bool,
    F: Fn(&InvocationData) -> bool,
{
    fn visit(&mut self, ctx: PathContext<'_>, vertex: &Vertex) -> Result<VisitFlow> {
        let VertexKind::Invocation(data) = &vertex.kind else {
            return Ok(VisitFlow::Continue);
        };
        if !(self.sink)(data) || (self.ignore)(data) {
            return Ok(VisitFlow::Continue);
        }
        let fingerprint = ctx.boundaries.fingerprint();
        if !self.seen.insert((vertex.id, fingerprint)) {
            // Re-enumerated shared suffix after an unrelated fork.
            return Ok(VisitFlow::Continue);
        }
        self.occurrences
            .entry(Self::signature(data))
            .or_default()
            .push(Occurrence {
                vertex: vertex.id,
                innermost_loop: ctx.boundaries.innermost_loop(),
            });
        Ok(VisitFlow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        GraphBuilder, InvocationForm, MethodKind, MethodModifiers, Receiver,
    };

    fn expensive_call(builder: &mut GraphBuilder) -> VertexId {
        builder.invocation(
            InvocationForm::MethodCall,
            "describeAll",
            Receiver::TypeName("Schema".to_string()),
            Vec::new(),
        )
    }

    #[test]
    fn test_two_straight_line_calls_are_one_finding() {
        let mut builder = GraphBuilder::new();
        let class = builder.class("Job");
        let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let first = expensive_call(&mut builder);
        let second = expensive_call(&mut builder);
        builder.set_body(entry, vec![first, second]);
        let graph = builder.build().unwrap();

        let detector = DuplicateInvocationDetector::new(&graph, entry, |_| true, |_| false);
        let violations = detector.collect_violations().unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].source, entry);
        assert_eq!(violations[0].sink, second);
        assert_eq!(violations[0].triggers, vec![first, second]);
        assert_eq!(violations[0].repetition, RepetitionKind::CallStack);
    }

    #[test]
    fn test_single_call_in_loop_is_not_a_finding() {
        let mut builder = GraphBuilder::new();
        let class = builder.class("Job");
        let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let call = expensive_call(&mut builder);
        let looped = builder.loop_of(vec![call]);
        builder.set_body(entry, vec![looped]);
        let graph = builder.build().unwrap();

        let detector = DuplicateInvocationDetector::new(&graph, entry, |_| true, |_| false);
        assert!(detector.collect_violations().unwrap().is_empty());
    }

    #[test]
    fn test_two_calls_in_same_loop_are_a_loop_finding() {
        let mut builder = GraphBuilder::new();
        let class = builder.class("Job");
        let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let first = expensive_call(&mut builder);
        let second = expensive_call(&mut builder);
        let looped = builder.loop_of(vec![first, second]);
        builder.set_body(entry, vec![looped]);
        let graph = builder.build().unwrap();

        let detector = DuplicateInvocationDetector::new(&graph, entry, |_| true, |_| false);
        let violations = detector.collect_violations().unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].repetition, RepetitionKind::Loop);
    }

    #[test]
    fn test_ignore_predicate_suppresses_occurrences() {
        let mut builder = GraphBuilder::new();
        let class = builder.class("Job");
        let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let first = expensive_call(&mut builder);
        let second = expensive_call(&mut builder);
        builder.set_body(entry, vec![first, second]);
        let graph = builder.build().unwrap();

        let detector =
            DuplicateInvocationDetector::new(&graph, entry, |_| true, |data: &InvocationData| {
                data.target_name.eq_ignore_ascii_case("describeAll")
            });
        assert!(detector.collect_violations().unwrap().is_empty());
    }

    #[test]
    fn test_pre_cancelled_run_reports_nothing() {
        let mut builder = GraphBuilder::new();
        let class = builder.class("Job");
        let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let first = expensive_call(&mut builder);
        let second = expensive_call(&mut builder);
        builder.set_body(entry, vec![first, second]);
        let graph = builder.build().unwrap();

        let token = CancelToken::new();
        token.cancel();
        let detector =
            DuplicateInvocationDetector::new(&graph, entry, |_| true, |_| false).with_cancel(token);
        assert!(detector.collect_violations().unwrap().is_empty());
    }
}
