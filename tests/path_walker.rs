//! Integration tests for path enumeration: branch forking, environment isolation,
//! and boundary tracking observed through a recording visitor.

use pathscope::graph::{
    ArgShape, Expr, GraphBuilder, InvocationForm, MethodKind, MethodModifiers, Receiver, Vertex,
    VertexId, VertexKind,
};
use pathscope::walker::{PathContext, PathVisitor, PathWalker, VisitFlow};
use pathscope::Result;

/// Records, at every invocation of a chosen marker method, the literal content of
/// one observed variable plus the boundary snapshot.
struct Recorder {
    marker: String,
    observed_variable: String,
    literals: Vec<Option<String>>,
    innermost_loops: Vec<Option<VertexId>>,
    call_depths: Vec<usize>,
}

impl Recorder {
    fn new(marker: &str, observed_variable: &str) -> Self {
        Self {
            marker: marker.to_string(),
            observed_variable: observed_variable.to_string(),
            literals: Vec::new(),
            innermost_loops: Vec::new(),
            call_depths: Vec::new(),
        }
    }
}

impl PathVisitor for Recorder {
    fn visit(&mut self, ctx: PathContext<'_>, vertex: &Vertex) -> Result<VisitFlow> {
        if let VertexKind::Invocation(data) = &vertex.kind {
            if data.target_name.eq_ignore_ascii_case(&self.marker) {
                let literal = ctx
                    .environment
                    .lookup(&self.observed_variable)
                    .and_then(|value| ctx.arena.get(value))
                    .and_then(|value| value.as_literal().map(ToString::to_string));
                self.literals.push(literal);
                self.innermost_loops.push(ctx.boundaries.innermost_loop());
                self.call_depths.push(ctx.boundaries.call_depth());
            }
        }
        Ok(VisitFlow::Continue)
    }
}

fn marker(builder: &mut GraphBuilder) -> VertexId {
    builder.invocation(InvocationForm::MethodCall, "observe", Receiver::None, Vec::new())
}

#[test]
fn test_branch_arms_see_independent_environments() {
    let mut builder = GraphBuilder::new();
    let class = builder.class("Job");
    let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);

    let bind_source = builder.assign("s", Expr::StringLiteral("Hello World".to_string()));
    let lower_call = builder.invocation(
        InvocationForm::MethodCall,
        "toLowerCase",
        Receiver::Variable("s".to_string()),
        Vec::new(),
    );
    let upper_call = builder.invocation(
        InvocationForm::MethodCall,
        "toUpperCase",
        Receiver::Variable("s".to_string()),
        Vec::new(),
    );
    let arm_lower = builder.assign("t", Expr::Call(lower_call));
    let arm_upper = builder.assign("t", Expr::Call(upper_call));
    let fork = builder.branch(vec![vec![arm_lower], vec![arm_upper]]);
    let observe = marker(&mut builder);
    builder.set_body(entry, vec![bind_source, fork, observe]);
    let graph = builder.build().unwrap();

    let mut recorder = Recorder::new("observe", "t");
    let mut walker = PathWalker::new(&graph);
    walker.walk(entry, &mut recorder).unwrap();

    // One observation per arm, each with the transformation applied on its own
    // path and nothing leaking across the fork.
    let mut seen = recorder.literals.clone();
    seen.sort();
    assert_eq!(
        seen,
        vec![
            Some("HELLO WORLD".to_string()),
            Some("hello world".to_string()),
        ]
    );
}

#[test]
fn test_rebinding_after_fork_does_not_affect_sibling() {
    let mut builder = GraphBuilder::new();
    let class = builder.class("Job");
    let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);

    let bind = builder.assign("t", Expr::StringLiteral("original".to_string()));
    let rebind = builder.assign("t", Expr::StringLiteral("rebound".to_string()));
    // One arm rebinds, the other is empty; both fall through to the marker.
    let fork = builder.branch(vec![vec![rebind], vec![]]);
    let observe = marker(&mut builder);
    builder.set_body(entry, vec![bind, fork, observe]);
    let graph = builder.build().unwrap();

    let mut recorder = Recorder::new("observe", "t");
    let mut walker = PathWalker::new(&graph);
    walker.walk(entry, &mut recorder).unwrap();

    let mut seen = recorder.literals.clone();
    seen.sort();
    assert_eq!(
        seen,
        vec![Some("original".to_string()), Some("rebound".to_string())]
    );
}

#[test]
fn test_fork_scope_ends_at_enclosing_sequence() {
    let mut builder = GraphBuilder::new();
    let class = builder.class("Job");
    let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);

    let bind = builder.assign("t", Expr::StringLiteral("before".to_string()));
    let rebind = builder.assign("t", Expr::StringLiteral("inside".to_string()));
    let fork = builder.branch(vec![vec![rebind], vec![]]);
    let in_loop = marker(&mut builder);
    let looped = builder.loop_of(vec![fork, in_loop]);
    let after_loop = marker(&mut builder);
    builder.set_body(entry, vec![bind, looped, after_loop]);
    let graph = builder.build().unwrap();

    let mut recorder = Recorder::new("observe", "t");
    let mut walker = PathWalker::new(&graph);
    walker.walk(entry, &mut recorder).unwrap();

    // Each arm carries its binding through the rest of the loop body, while the
    // statement after the loop runs once with the pre-fork binding.
    assert_eq!(
        recorder.literals,
        vec![
            Some("inside".to_string()),
            Some("before".to_string()),
            Some("before".to_string()),
        ]
    );
    assert_eq!(
        recorder.innermost_loops,
        vec![Some(looped), Some(looped), None]
    );
}

#[test]
fn test_loop_body_walked_once_with_loop_boundary() {
    let mut builder = GraphBuilder::new();
    let class = builder.class("Job");
    let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);

    let inside = marker(&mut builder);
    let looped = builder.loop_of(vec![inside]);
    let outside = marker(&mut builder);
    builder.set_body(entry, vec![looped, outside]);
    let graph = builder.build().unwrap();

    let mut recorder = Recorder::new("observe", "t");
    let mut walker = PathWalker::new(&graph);
    walker.walk(entry, &mut recorder).unwrap();

    assert_eq!(recorder.innermost_loops, vec![Some(looped), None]);
}

#[test]
fn test_callee_walk_under_call_stack_boundary() {
    let mut builder = GraphBuilder::new();
    let class = builder.class("Job");
    let helper = builder.method(
        class,
        "helper",
        MethodKind::Static,
        MethodModifiers::STATIC | MethodModifiers::PRIVATE,
        &["input"],
    );
    let inner = marker(&mut builder);
    builder.set_body(helper, vec![inner]);

    let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);
    let bind = builder.assign("input", Expr::StringLiteral("payload".to_string()));
    let call = builder.invocation(
        InvocationForm::MethodCall,
        "helper",
        Receiver::TypeName("Job".to_string()),
        vec![ArgShape::Variable("input".to_string())],
    );
    builder.set_body(entry, vec![bind, call]);
    let graph = builder.build().unwrap();

    let mut recorder = Recorder::new("observe", "input");
    let mut walker = PathWalker::new(&graph);
    walker.walk(entry, &mut recorder).unwrap();

    // The marker ran inside the callee with the argument bound to the parameter.
    assert_eq!(recorder.call_depths, vec![1]);
    assert_eq!(recorder.literals, vec![Some("payload".to_string())]);
}

#[test]
fn test_recursive_callee_is_entered_once() {
    let mut builder = GraphBuilder::new();
    let class = builder.class("Job");
    let recursive = builder.method(
        class,
        "again",
        MethodKind::Static,
        MethodModifiers::STATIC | MethodModifiers::PRIVATE,
        &[],
    );
    let inner_marker = marker(&mut builder);
    let self_call = builder.invocation(
        InvocationForm::MethodCall,
        "again",
        Receiver::TypeName("Job".to_string()),
        Vec::new(),
    );
    builder.set_body(recursive, vec![inner_marker, self_call]);

    let entry = builder.method(class, "run", MethodKind::Static, MethodModifiers::STATIC, &[]);
    let call = builder.invocation(
        InvocationForm::MethodCall,
        "again",
        Receiver::TypeName("Job".to_string()),
        Vec::new(),
    );
    builder.set_body(entry, vec![call]);
    let graph = builder.build().unwrap();

    let mut recorder = Recorder::new("observe", "x");
    let mut walker = PathWalker::new(&graph);
    walker.walk(entry, &mut recorder).unwrap();

    // The self-call did not descend a second time.
    assert_eq!(recorder.call_depths, vec![1]);
}
