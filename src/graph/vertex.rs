//! Typed program-graph vertices and their kind-specific metadata.
//!
//! Vertices are owned by the [`ProgramGraph`](crate::graph::ProgramGraph) and are
//! immutable once built. The analysis core references them by [`VertexId`] and never
//! mutates them.

use std::fmt;

use bitflags::bitflags;

use crate::{Error, Result};

/// Identifier for a vertex in the program graph.
///
/// Ids are dense indices assigned by the [`GraphBuilder`](crate::graph::GraphBuilder)
/// and are only meaningful within the graph that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Source position a vertex was annotated with, for human-readable reporting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Source file name, when known.
    pub file: Option<String>,
    /// 1-based begin line, or 0 when synthesized.
    pub line: u32,
}

bitflags! {
    /// Modifiers and semantic annotations recorded on a method vertex.
    ///
    /// `TEST` and `ENTRY_POINT` are semantic annotations supplied by the external
    /// graph builder, not source-level keywords.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodModifiers: u16 {
        /// Static method.
        const STATIC = 1 << 0;
        /// Private visibility.
        const PRIVATE = 1 << 1;
        /// Protected visibility.
        const PROTECTED = 1 << 2;
        /// Public visibility.
        const PUBLIC = 1 << 3;
        /// Abstract method without a body.
        const ABSTRACT = 1 << 4;
        /// Test method, per the source language's test annotation.
        const TEST = 1 << 5;
        /// Publicly reachable path entry point.
        const ENTRY_POINT = 1 << 6;
    }
}

/// Kind of method a method vertex declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum MethodKind {
    /// Static method, invoked through its defining type.
    Static,
    /// Constructor, invoked through construction sites and constructor chaining.
    Constructor,
    /// Instance method, subject to dispatch polymorphism.
    Instance,
}

/// Syntactic form of an invocation vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum InvocationForm {
    /// Plain method call, `receiver.name(args)` or unqualified `name(args)`.
    MethodCall,
    /// Construction site, `new Type(args)`.
    New,
    /// Explicit superclass constructor chain, `super(args)`.
    SuperCall,
    /// Explicit same-class constructor chain, `this(args)`.
    ThisCall,
}

/// Receiver expression of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// Call through a local variable.
    Variable(String),
    /// Qualified call through a type name (static call form).
    TypeName(String),
    /// Call on the enclosing instance (`this.name(...)`).
    SelfRef,
    /// Unqualified call with no explicit receiver.
    None,
}

/// Structural shape of one invocation argument.
///
/// The core dispatches on argument *shape*, never on argument values: no runtime
/// information exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgShape {
    /// A syntactic literal.
    Literal,
    /// A reference to a named local variable.
    Variable(String),
    /// Anything else.
    Unknown,
}

impl ArgShape {
    /// Single-character tag used when normalizing call signatures.
    #[must_use]
    pub fn tag(&self) -> char {
        match self {
            ArgShape::Literal => 'l',
            ArgShape::Variable(_) => 'v',
            ArgShape::Unknown => '?',
        }
    }
}

/// Metadata of a class or interface vertex.
#[derive(Debug, Clone)]
pub struct ClassData {
    /// Declared type name.
    pub name: String,
    /// `true` for interface vertices.
    pub is_interface: bool,
    /// Direct superclass, when one is declared.
    pub superclass: Option<VertexId>,
    /// Implemented interfaces.
    pub interfaces: Vec<VertexId>,
    /// Declared method vertices, in declaration order.
    pub methods: Vec<VertexId>,
}

/// Metadata of a method vertex.
#[derive(Debug, Clone)]
pub struct MethodData {
    /// Method name. Constructors carry their defining type's name.
    pub name: String,
    /// Defining class vertex.
    pub class: VertexId,
    /// Static, constructor, or instance.
    pub kind: MethodKind,
    /// Modifiers and semantic annotations.
    pub modifiers: MethodModifiers,
    /// Parameter names, in declaration order.
    pub params: Vec<String>,
    /// Declared return type name, when one exists.
    pub return_type: Option<String>,
    /// Engine directives attached to the method (e.g. rule suppressions).
    pub directives: Vec<String>,
    /// Ordered statement vertices forming the method body. Empty for abstract methods.
    pub body: Vec<VertexId>,
}

impl MethodData {
    /// Number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if the method carries the given modifier.
    #[must_use]
    pub fn has_modifier(&self, modifier: MethodModifiers) -> bool {
        self.modifiers.contains(modifier)
    }
}

/// Metadata of an invocation vertex.
#[derive(Debug, Clone)]
pub struct InvocationData {
    /// Syntactic call form.
    pub form: InvocationForm,
    /// Invoked name: a method name, or the constructed type name for [`InvocationForm::New`].
    pub target_name: String,
    /// Receiver expression.
    pub receiver: Receiver,
    /// Static type of the receiver, as annotated by the external semantic pass.
    pub receiver_static_type: Option<String>,
    /// Structural argument shapes.
    pub args: Vec<ArgShape>,
    /// Statically resolved target method, when resolution succeeded at build time.
    pub resolved_target: Option<VertexId>,
}

impl InvocationData {
    /// Number of supplied arguments.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` for construction sites.
    #[must_use]
    pub fn is_construction(&self) -> bool {
        matches!(self.form, InvocationForm::New)
    }

    /// Returns `true` for explicit constructor chains (`super(...)` / `this(...)`).
    #[must_use]
    pub fn is_constructor_chain(&self) -> bool {
        matches!(self.form, InvocationForm::SuperCall | InvocationForm::ThisCall)
    }
}

/// Body of a loop vertex. The walker traverses the body once per static walk.
#[derive(Debug, Clone)]
pub struct LoopData {
    /// Ordered statement vertices of the loop body.
    pub body: Vec<VertexId>,
}

/// Arms of a branch vertex. Each arm is an independently walked sibling path.
#[derive(Debug, Clone)]
pub struct BranchData {
    /// Ordered statement vertices per arm.
    pub arms: Vec<Vec<VertexId>>,
}

/// Right-hand side of an assignment statement.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A string literal, the only syntactically determinable concrete value.
    StringLiteral(String),
    /// An invocation whose result is bound; references an invocation vertex.
    Call(VertexId),
    /// A reference to another local variable.
    Variable(String),
}

/// Metadata of an assignment vertex.
#[derive(Debug, Clone)]
pub struct AssignData {
    /// Variable being bound.
    pub variable: String,
    /// Bound expression.
    pub expr: Expr,
}

/// Metadata of a field vertex.
#[derive(Debug, Clone)]
pub struct FieldData {
    /// Field name.
    pub name: String,
    /// Defining class vertex.
    pub class: VertexId,
}

/// Kind-specific payload of a vertex.
///
/// A closed sum: detection algorithms dispatch on it with exhaustive matching.
#[derive(Debug, Clone)]
pub enum VertexKind {
    /// Class or interface declaration.
    Class(ClassData),
    /// Method declaration.
    Method(MethodData),
    /// Invocation site.
    Invocation(InvocationData),
    /// Loop statement.
    Loop(LoopData),
    /// Conditional branch statement.
    Branch(BranchData),
    /// Assignment statement.
    Assign(AssignData),
    /// Field declaration.
    Field(FieldData),
}

impl VertexKind {
    /// Short label naming the vertex kind, used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            VertexKind::Class(_) => "Class",
            VertexKind::Method(_) => "Method",
            VertexKind::Invocation(_) => "Invocation",
            VertexKind::Loop(_) => "Loop",
            VertexKind::Branch(_) => "Branch",
            VertexKind::Assign(_) => "Assign",
            VertexKind::Field(_) => "Field",
        }
    }
}

/// A single vertex in the program graph: identity, location, containment parent,
/// and kind-specific metadata.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Unique id within the owning graph.
    pub id: VertexId,
    /// Source position for reporting.
    pub location: SourceLocation,
    /// Containment parent (statement to method, method to class), when attached.
    pub parent: Option<VertexId>,
    /// Kind-specific payload.
    pub kind: VertexKind,
}

impl Vertex {
    /// Returns the method payload, if this is a method vertex.
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodData> {
        match &self.kind {
            VertexKind::Method(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the invocation payload, if this is an invocation vertex.
    #[must_use]
    pub fn as_invocation(&self) -> Option<&InvocationData> {
        match &self.kind {
            VertexKind::Invocation(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the class payload, if this is a class vertex.
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassData> {
        match &self.kind {
            VertexKind::Class(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the method payload, or a defect error if the vertex has another shape.
    ///
    /// # Errors
    ///
    /// [`Error::UnexpectedVertex`] when this is not a method vertex.
    pub fn expect_method(&self) -> Result<&MethodData> {
        self.as_method().ok_or_else(|| Error::UnexpectedVertex {
            expected: "Method",
            actual: self.kind.label().to_string(),
            vertex: self.id,
        })
    }

    /// Returns the invocation payload, or a defect error if the vertex has another shape.
    ///
    /// # Errors
    ///
    /// [`Error::UnexpectedVertex`] when this is not an invocation vertex.
    pub fn expect_invocation(&self) -> Result<&InvocationData> {
        self.as_invocation().ok_or_else(|| Error::UnexpectedVertex {
            expected: "Invocation",
            actual: self.kind.label().to_string(),
            vertex: self.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_flags() {
        let modifiers = MethodModifiers::STATIC | MethodModifiers::PRIVATE;
        assert!(modifiers.contains(MethodModifiers::STATIC));
        assert!(!modifiers.contains(MethodModifiers::TEST));
    }

    #[test]
    fn test_arg_shape_tags() {
        assert_eq!(ArgShape::Literal.tag(), 'l');
        assert_eq!(ArgShape::Variable("x".to_string()).tag(), 'v');
        assert_eq!(ArgShape::Unknown.tag(), '?');
    }

    #[test]
    fn test_expect_method_rejects_other_shapes() {
        let vertex = Vertex {
            id: VertexId(3),
            location: SourceLocation::default(),
            parent: None,
            kind: VertexKind::Loop(LoopData { body: Vec::new() }),
        };
        let err = vertex.expect_method().unwrap_err();
        assert!(err.to_string().contains("expected Method"));
        assert!(err.to_string().contains("Loop"));
    }
}
