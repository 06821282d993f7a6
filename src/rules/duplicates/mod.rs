//! Duplicate-invocation detection over walked paths.

mod detector;
mod evidence;

pub use detector::DuplicateInvocationDetector;
pub use evidence::{RepetitionKind, ViolationEvidence};
