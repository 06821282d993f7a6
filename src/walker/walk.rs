//! Depth-first path enumeration over method bodies.
//!
//! The walker drives traversal from a chosen entry point, maintaining the
//! variable-binding environment and boundary stack for the current path and
//! invoking a caller-supplied visitor at each vertex. Path sensitivity is over the
//! static graph: branch arms fork independent continuations (environment and
//! boundary stack are cloned per arm), loop bodies are walked once per static
//! walk, and internal callees are entered under a call-stack boundary with a
//! recursion guard. Forks extend through the remainder of the sequence the
//! branch occurs in; statements past the enclosing loop or callee body run once
//! with the pre-fork state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{
    graph::{ArgShape, Expr, ProgramGraph, Receiver, Vertex, VertexId, VertexKind},
    symbols::{resolve_method, synthesize_return, ValueArena, ValueId, ValueKind},
    walker::{Boundary, BoundaryStack, PathEnvironment},
    Error, Result,
};

/// Default bound on the call-stack depth of a walk.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

/// Hard bound on boundary nesting, as a safety net against degenerate graphs.
const MAX_BOUNDARY_DEPTH: usize = 512;

/// Visitor verdict for the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitFlow {
    /// Keep walking the current path.
    Continue,
    /// Terminate the current path early; sibling paths are unaffected.
    StopPath,
}

/// Read-only view of the walk state handed to visitors.
pub struct PathContext<'a> {
    /// Variable bindings of the current path.
    pub environment: &'a PathEnvironment,
    /// Boundary stack of the current path, outermost first.
    pub boundaries: &'a BoundaryStack,
    /// Arena holding every value allocated by this walk.
    pub arena: &'a ValueArena,
}

/// Callback invoked at every vertex the walker encounters.
pub trait PathVisitor {
    /// Visits a vertex with the current path context.
    ///
    /// # Errors
    ///
    /// Implementations may signal a defect, which aborts the current entry
    /// point's traversal.
    fn visit(&mut self, ctx: PathContext<'_>, vertex: &Vertex) -> Result<VisitFlow>;
}

/// Cooperative cancellation handle shared between a walk and its caller.
///
/// The walker checks the token between vertices; a cancelled walk surfaces
/// [`Error::Cancelled`] and the abandoned entry point reports nothing.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of any walk observing this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Internal flow signal: whether the current path continues past this point.
enum Flow {
    Continue,
    Stop,
}

/// Per-path mutable state. Forked wholesale at branch points.
struct WalkState {
    env: PathEnvironment,
    boundaries: BoundaryStack,
    call_stack: Vec<VertexId>,
}

impl WalkState {
    fn fork(&self, arena: &mut ValueArena) -> Self {
        Self {
            env: self.env.fork(arena),
            boundaries: self.boundaries.clone(),
            call_stack: self.call_stack.clone(),
        }
    }
}

/// Traversal driver over a read-only program graph.
///
/// One walker per run. The walker owns the run's [`ValueArena`]; all other mutable
/// state lives on the stack per path, so independent walks never interfere.
pub struct PathWalker<'g> {
    graph: &'g ProgramGraph,
    arena: ValueArena,
    cancel: CancelToken,
    max_call_depth: usize,
}

impl<'g> PathWalker<'g> {
    /// Creates a walker over `graph`.
    #[must_use]
    pub fn new(graph: &'g ProgramGraph) -> Self {
        Self {
            graph,
            arena: ValueArena::new(),
            cancel: CancelToken::new(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Attaches a cancellation token observed between vertices.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Overrides the call-depth bound.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// The arena holding every value allocated so far.
    #[must_use]
    pub fn arena(&self) -> &ValueArena {
        &self.arena
    }

    /// Walks every path reachable from `entry`, invoking `visitor` at each vertex.
    ///
    /// Entry-method parameters are bound to indeterminate values before the walk.
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedVertex`] if `entry` is not a method vertex (defect).
    /// - [`Error::Cancelled`] if the attached token was triggered mid-walk.
    /// - Any defect surfaced by the graph or the visitor.
    pub fn walk(&mut self, entry: VertexId, visitor: &mut dyn PathVisitor) -> Result<()> {
        let graph = self.graph;
        let method = graph.expect_vertex(entry)?.expect_method()?;

        let mut state = WalkState {
            env: PathEnvironment::new(),
            boundaries: BoundaryStack::new(),
            call_stack: vec![entry],
        };
        for param in &method.params {
            let value = self.arena.alloc(ValueKind::Indeterminate {
                declared_type: None,
            });
            state.env.bind(param, value);
        }

        self.walk_sequence(&method.body, &mut state, visitor)?;
        Ok(())
    }

    /// Walks an ordered statement sequence, forking at branches.
    ///
    /// A fork covers the remainder of the sequence it occurs in; enclosing
    /// sequences resume once with the pre-fork state, so per-arm bindings are
    /// not visible past the enclosing loop or callee body.
    fn walk_sequence(
        &mut self,
        stmts: &[VertexId],
        state: &mut WalkState,
        visitor: &mut dyn PathVisitor,
    ) -> Result<Flow> {
        let graph = self.graph;
        if state.boundaries.depth() > MAX_BOUNDARY_DEPTH {
            return Err(Error::RecursionLimit(MAX_BOUNDARY_DEPTH));
        }

        for (index, &stmt) in stmts.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let vertex = graph.expect_vertex(stmt)?;
            if self.visit(visitor, state, vertex)? == VisitFlow::StopPath {
                return Ok(Flow::Stop);
            }

            match &vertex.kind {
                VertexKind::Branch(data) => {
                    if data.arms.is_empty() {
                        continue;
                    }
                    // Each arm owns a forked continuation through the remainder of
                    // this sequence.
                    let rest = &stmts[index + 1..];
                    for arm in &data.arms {
                        let mut forked = state.fork(&mut self.arena);
                        if matches!(self.walk_sequence(arm, &mut forked, visitor)?, Flow::Stop) {
                            continue;
                        }
                        self.walk_sequence(rest, &mut forked, visitor)?;
                    }
                    return Ok(Flow::Continue);
                }
                VertexKind::Loop(data) => {
                    state.boundaries.push(Boundary::Loop(stmt));
                    let flow = self.walk_sequence(&data.body, state, visitor);
                    state.boundaries.pop();
                    if matches!(flow?, Flow::Stop) {
                        return Ok(Flow::Stop);
                    }
                }
                VertexKind::Invocation(_) => {
                    let (_, flow) = self.eval_invocation(stmt, state, visitor)?;
                    if matches!(flow, Flow::Stop) {
                        return Ok(Flow::Stop);
                    }
                }
                VertexKind::Assign(data) => {
                    let (value, flow) = self.eval_expr(&data.expr, state, visitor)?;
                    state.env.bind(&data.variable, value);
                    if matches!(flow, Flow::Stop) {
                        return Ok(Flow::Stop);
                    }
                }
                other => {
                    return Err(Error::UnexpectedVertex {
                        expected: "statement",
                        actual: other.label().to_string(),
                        vertex: stmt,
                    });
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn visit(
        &self,
        visitor: &mut dyn PathVisitor,
        state: &WalkState,
        vertex: &Vertex,
    ) -> Result<VisitFlow> {
        visitor.visit(
            PathContext {
                environment: &state.env,
                boundaries: &state.boundaries,
                arena: &self.arena,
            },
            vertex,
        )
    }

    /// Evaluates an already-visited invocation: variant resolution on the receiver
    /// value first, then descent into an internal callee under a call-stack
    /// boundary, then declared-return-type synthesis.
    fn eval_invocation(
        &mut self,
        site: VertexId,
        state: &mut WalkState,
        visitor: &mut dyn PathVisitor,
    ) -> Result<(ValueId, Flow)> {
        let graph = self.graph;
        let data = graph.expect_vertex(site)?.expect_invocation()?;

        let receiver_value = match &data.receiver {
            Receiver::Variable(name) => state.env.lookup(name),
            _ => None,
        };
        if let Some(receiver) = receiver_value {
            if let Some(produced) =
                resolve_method(&mut self.arena, receiver, &data.target_name, site)
            {
                return Ok((produced, Flow::Continue));
            }
        }

        let mut flow = Flow::Continue;
        if let Some(target) = data.resolved_target {
            let method = graph.expect_vertex(target)?.expect_method()?;
            let descend = !method.body.is_empty()
                && !state.call_stack.contains(&target)
                && state.call_stack.len() < self.max_call_depth;
            if descend {
                let mut callee_env = PathEnvironment::new();
                for (param, arg) in method.params.iter().zip(&data.args) {
                    let value = match arg {
                        ArgShape::Variable(name) => match state.env.lookup(name) {
                            Some(bound) => self.arena.deep_clone(bound),
                            None => self.arena.alloc(ValueKind::Indeterminate {
                                declared_type: None,
                            }),
                        },
                        ArgShape::Literal => self.arena.alloc(ValueKind::Str { literal: None }),
                        ArgShape::Unknown => self.arena.alloc(ValueKind::Indeterminate {
                            declared_type: None,
                        }),
                    };
                    callee_env.bind(param, value);
                }

                state.boundaries.push(Boundary::CallStack(site));
                state.call_stack.push(target);
                let caller_env = std::mem::replace(&mut state.env, callee_env);
                let result = self.walk_sequence(&method.body, state, visitor);
                state.env = caller_env;
                state.call_stack.pop();
                state.boundaries.pop();
                flow = result?;
            }
        }

        let declared = data
            .resolved_target
            .and_then(|t| graph.vertex(t))
            .and_then(Vertex::as_method)
            .and_then(|m| m.return_type.as_deref());
        let produced = synthesize_return(&mut self.arena, declared, receiver_value, site);
        Ok((produced, flow))
    }

    fn eval_expr(
        &mut self,
        expr: &Expr,
        state: &mut WalkState,
        visitor: &mut dyn PathVisitor,
    ) -> Result<(ValueId, Flow)> {
        match expr {
            Expr::StringLiteral(content) => Ok((
                self.arena.alloc(ValueKind::Str {
                    literal: Some(content.clone()),
                }),
                Flow::Continue,
            )),
            Expr::Variable(name) => {
                let value = match state.env.lookup(name) {
                    Some(bound) => bound,
                    None => self.arena.alloc(ValueKind::Indeterminate {
                        declared_type: None,
                    }),
                };
                Ok((value, Flow::Continue))
            }
            Expr::Call(site) => {
                let vertex = self.graph.expect_vertex(*site)?;
                if self.visit(visitor, state, vertex)? == VisitFlow::StopPath {
                    let placeholder = self.arena.alloc(ValueKind::Indeterminate {
                        declared_type: None,
                    });
                    return Ok((placeholder, Flow::Stop));
                }
                self.eval_invocation(*site, state, visitor)
            }
        }
    }
}
