//! Evidence records produced by the duplicate-invocation detector.

use crate::graph::VertexId;

/// How the duplicated invocation repeats at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum RepetitionKind {
    /// The same call signature occurs on more than one call-chain or path context.
    CallStack,
    /// Every occurrence sits inside the same loop body.
    Loop,
}

/// One reported duplicate-invocation finding.
///
/// Evidence is value-comparable so identical findings collapse under
/// deduplication regardless of discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViolationEvidence {
    /// Entry-point method the offending paths start from.
    pub source: VertexId,
    /// Invocation vertex the finding is reported at.
    pub sink: VertexId,
    /// Repetition shape of the finding.
    pub repetition: RepetitionKind,
    /// Every invocation occurrence contributing to the finding, sorted and
    /// deduplicated.
    pub triggers: Vec<VertexId>,
}

impl ViolationEvidence {
    /// Creates evidence with normalized triggers.
    #[must_use]
    pub fn new(
        source: VertexId,
        sink: VertexId,
        repetition: RepetitionKind,
        mut triggers: Vec<VertexId>,
    ) -> Self {
        triggers.sort_unstable();
        triggers.dedup();
        Self {
            source,
            sink,
            repetition,
            triggers,
        }
    }
}
