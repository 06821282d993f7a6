use thiserror::Error;

use crate::graph::VertexId;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into two classes. *Defect signals* indicate an internal-consistency failure,
/// such as a vertex of unexpected shape being handed to a component that required a different
/// one. They abort the current unit of work (one candidate's search, one entry point's
/// traversal) and must be surfaced to the caller rather than swallowed, but they never
/// invalidate other units of work against the same graph.
///
/// Expected negative outcomes — "no usage found", "no violations found", "no resolution rule
/// matched" — are ordinary return values, never errors.
///
/// # Examples
///
/// ```rust
/// use pathscope::{Error, graph::VertexId};
///
/// let err = Error::UnexpectedVertex {
///     expected: "Invocation",
///     actual: "Class".to_string(),
///     vertex: VertexId(7),
/// };
/// assert!(err.to_string().contains("Invocation"));
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A component received a vertex whose kind does not match the shape it required.
    ///
    /// This is a programming defect, not a user-facing finding. It aborts only the
    /// current candidate's search or the current entry point's traversal.
    #[error("Unexpected vertex shape at {vertex}: expected {expected}, found {actual}")]
    UnexpectedVertex {
        /// The vertex kind the component required.
        expected: &'static str,
        /// The vertex kind actually found.
        actual: String,
        /// The offending vertex.
        vertex: VertexId,
    },

    /// A vertex id did not resolve to any vertex in the program graph.
    ///
    /// Since the program graph is immutable and ids are produced by its builder,
    /// a dangling id indicates a defect in graph construction or in the caller.
    #[error("Vertex not found in program graph - {0}")]
    VertexNotFound(VertexId),

    /// Recursion limit reached.
    ///
    /// Traversal depth over the call graph is bounded to guarantee termination on
    /// cyclic or adversarial inputs. The associated value is the limit that was hit.
    #[error("Reached the maximum traversal depth allowed - {0}")]
    RecursionLimit(usize),

    /// The caller signalled cooperative cancellation.
    ///
    /// A cancelled walk is abandoned between vertices; the abandoned entry point
    /// reports nothing rather than partial results.
    #[error("Traversal cancelled by caller")]
    Cancelled,

    /// The program graph could not be assembled from the supplied vertices.
    ///
    /// Raised by the builder when structural links are inconsistent, e.g. a method
    /// body referencing a vertex that was never created.
    #[error("{0}")]
    GraphError(String),
}
