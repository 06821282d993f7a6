//! Detection rules built on the graph queries and the path walker.
//!
//! Two detections ship here: the existential unused-method search
//! ([`usage::UsageAnalysis`]) and the boundary-scoped duplicate-invocation
//! detector ([`duplicates::DuplicateInvocationDetector`]). Both keep their
//! run-scoped state in a [`RuleStateTracker`] or on the stack; nothing survives a
//! run.

pub mod duplicates;
pub mod usage;

mod eligibility;
mod state;

pub use duplicates::{DuplicateInvocationDetector, RepetitionKind, ViolationEvidence};
pub use eligibility::{
    EligibilityPolicy, IneligibilityReason, StandardEligibility, DEFAULT_PROPERTY_PREFIX,
};
pub use state::RuleStateTracker;
pub use usage::{MethodCallValidator, UsageAnalysis};
