//! # pathscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! traits from the pathscope library. Import this module to get quick access to the
//! essential types for program-graph detection runs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all pathscope operations
pub use crate::Error;

/// The result type used throughout pathscope
pub use crate::Result;

// ================================================================================================
// Program Graph
// ================================================================================================

/// Graph construction entry point
pub use crate::graph::GraphBuilder;

/// Immutable program graph and vertex identity
pub use crate::graph::{ProgramGraph, Vertex, VertexId, VertexKind};

/// Method and invocation metadata
pub use crate::graph::{
    ArgShape, InvocationData, InvocationForm, MethodData, MethodKind, MethodModifiers, Receiver,
};

// ================================================================================================
// Path Walking
// ================================================================================================

/// Traversal driver and visitor seam
pub use crate::walker::{PathContext, PathVisitor, PathWalker, VisitFlow};

/// Per-path state snapshots
pub use crate::walker::{Boundary, BoundaryStack, PathEnvironment};

/// Cooperative cancellation
pub use crate::walker::CancelToken;

// ================================================================================================
// Symbolic Values
// ================================================================================================

/// Arena-allocated symbolic values with provenance
pub use crate::symbols::{SymbolicValue, ValueArena, ValueId, ValueKind};

// ================================================================================================
// Detections
// ================================================================================================

/// Unused-method search
pub use crate::rules::{
    EligibilityPolicy, MethodCallValidator, StandardEligibility, UsageAnalysis,
};

/// Duplicate-invocation detection
pub use crate::rules::{DuplicateInvocationDetector, RepetitionKind, ViolationEvidence};

/// Run-scoped detection state
pub use crate::rules::RuleStateTracker;
