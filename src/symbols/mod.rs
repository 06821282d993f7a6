//! Symbolic value model.
//!
//! Represents unknown or partially-known runtime state during path walking. Values
//! are a closed set of tagged variants with a per-variant method-resolution table
//! and id-based provenance links; they are arena-allocated per run and deep-cloned
//! whenever they cross a branch point, so provenance recorded on one path never
//! leaks into a sibling path. The engine never executes code: a value carries a
//! concrete content only when it is syntactically determinable.

mod arena;
mod resolve;
mod value;

pub use arena::{ValueArena, ValueId};
pub use resolve::{resolve_method, synthesize_return, METHOD_GET_SOBJECT_FIELD};
pub use value::{FieldName, SchemaType, SymbolicValue, ValueKind};
