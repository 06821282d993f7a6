//! Path walker: boundary tracking, per-path environments, and traversal.
//!
//! The walker enumerates paths through method bodies on the static program graph.
//! Detectors plug in through the [`PathVisitor`] trait and read the per-path
//! [`BoundaryStack`] and [`PathEnvironment`] snapshots the walker maintains.

mod boundary;
mod environment;
mod walk;

pub use boundary::{Boundary, BoundaryStack};
pub use environment::PathEnvironment;
pub use walk::{
    CancelToken, PathContext, PathVisitor, PathWalker, VisitFlow, DEFAULT_MAX_CALL_DEPTH,
};
