//! Program graph: typed vertices, structural queries, and the builder.
//!
//! The graph is the external collaborator the analysis core reads from. Vertices
//! are polymorphic over classes, methods, invocations, loops, branches, assignments
//! and fields; structural edges cover control flow (ordered bodies), containment
//! (parent links) and inheritance (superclass/interface links). The core only ever
//! consumes the query interface on [`ProgramGraph`]; all mutation happens in
//! [`GraphBuilder`] before the graph is frozen.

mod builder;
mod program;
mod vertex;

pub use builder::GraphBuilder;
pub use program::ProgramGraph;
pub use vertex::{
    ArgShape, AssignData, BranchData, ClassData, Expr, FieldData, InvocationData, InvocationForm,
    LoopData, MethodData, MethodKind, MethodModifiers, Receiver, SourceLocation, Vertex, VertexId,
    VertexKind,
};
