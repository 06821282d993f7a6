//! Construction of immutable program graphs.
//!
//! [`GraphBuilder`] is the only mutation surface for the graph. The surrounding tool
//! (parser, semantic annotator) creates vertices, composes method bodies, and then
//! calls [`GraphBuilder::build`], which links the derived indexes and statically
//! resolves invocation targets. After `build` the graph is frozen; the analysis core
//! never mutates it.

use std::collections::HashMap;

use crate::{
    graph::{
        ArgShape, AssignData, BranchData, ClassData, Expr, FieldData, InvocationData,
        InvocationForm, LoopData, MethodData, MethodKind, MethodModifiers, ProgramGraph, Receiver,
        SourceLocation, Vertex, VertexId, VertexKind,
    },
    Error, Result,
};

/// Incrementally assembles a [`ProgramGraph`].
///
/// Statement vertices are created free-floating and attached by composing them into
/// loop/branch bodies and finally a method body; composition records the containment
/// parent links the queries rely on.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    vertices: Vec<Vertex>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: VertexKind) -> VertexId {
        // Saturates once the id space is exhausted; `build` rejects such a
        // builder outright, so a saturated id never reaches a frozen graph.
        let id = VertexId(u32::try_from(self.vertices.len()).unwrap_or(u32::MAX));
        self.vertices.push(Vertex {
            id,
            location: SourceLocation::default(),
            parent: None,
            kind,
        });
        id
    }

    /// Adds a class vertex with no superclass.
    pub fn class(&mut self, name: &str) -> VertexId {
        self.push(VertexKind::Class(ClassData {
            name: name.to_string(),
            is_interface: false,
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }))
    }

    /// Adds a class vertex extending `superclass`.
    pub fn subclass(&mut self, name: &str, superclass: VertexId) -> VertexId {
        self.push(VertexKind::Class(ClassData {
            name: name.to_string(),
            is_interface: false,
            superclass: Some(superclass),
            interfaces: Vec::new(),
            methods: Vec::new(),
        }))
    }

    /// Adds an interface vertex.
    pub fn interface(&mut self, name: &str) -> VertexId {
        self.push(VertexKind::Class(ClassData {
            name: name.to_string(),
            is_interface: true,
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }))
    }

    /// Records that `class` implements `interface`.
    pub fn implements(&mut self, class: VertexId, interface: VertexId) {
        if let Some(VertexKind::Class(data)) =
            self.vertices.get_mut(class.0 as usize).map(|v| &mut v.kind)
        {
            data.interfaces.push(interface);
        }
    }

    /// Adds a method vertex declared on `class`.
    ///
    /// For constructors, pass the class name as `name` and
    /// [`MethodKind::Constructor`] as `kind`.
    pub fn method(
        &mut self,
        class: VertexId,
        name: &str,
        kind: MethodKind,
        modifiers: MethodModifiers,
        params: &[&str],
    ) -> VertexId {
        let id = self.push(VertexKind::Method(MethodData {
            name: name.to_string(),
            class,
            kind,
            modifiers,
            params: params.iter().map(ToString::to_string).collect(),
            return_type: None,
            directives: Vec::new(),
            body: Vec::new(),
        }));
        if let Some(vertex) = self.vertices.get_mut(id.0 as usize) {
            vertex.parent = Some(class);
        }
        if let Some(VertexKind::Class(data)) =
            self.vertices.get_mut(class.0 as usize).map(|v| &mut v.kind)
        {
            data.methods.push(id);
        }
        id
    }

    /// Sets the declared return type of a method.
    pub fn set_return_type(&mut self, method: VertexId, return_type: &str) {
        if let Some(VertexKind::Method(data)) =
            self.vertices.get_mut(method.0 as usize).map(|v| &mut v.kind)
        {
            data.return_type = Some(return_type.to_string());
        }
    }

    /// Attaches an engine directive (e.g. a rule suppression) to a method.
    pub fn add_directive(&mut self, method: VertexId, directive: &str) {
        if let Some(VertexKind::Method(data)) =
            self.vertices.get_mut(method.0 as usize).map(|v| &mut v.kind)
        {
            data.directives.push(directive.to_string());
        }
    }

    /// Annotates a vertex with a source location.
    pub fn set_location(&mut self, vertex: VertexId, file: Option<&str>, line: u32) {
        if let Some(v) = self.vertices.get_mut(vertex.0 as usize) {
            v.location = SourceLocation {
                file: file.map(ToString::to_string),
                line,
            };
        }
    }

    /// Adds a free-floating invocation vertex.
    pub fn invocation(
        &mut self,
        form: InvocationForm,
        target_name: &str,
        receiver: Receiver,
        args: Vec<ArgShape>,
    ) -> VertexId {
        self.push(VertexKind::Invocation(InvocationData {
            form,
            target_name: target_name.to_string(),
            receiver,
            receiver_static_type: None,
            args,
            resolved_target: None,
        }))
    }

    /// Annotates an invocation with its receiver's static type, as determined by
    /// the external semantic pass.
    pub fn set_receiver_type(&mut self, invocation: VertexId, static_type: &str) {
        if let Some(VertexKind::Invocation(data)) = self
            .vertices
            .get_mut(invocation.0 as usize)
            .map(|v| &mut v.kind)
        {
            data.receiver_static_type = Some(static_type.to_string());
        }
    }

    /// Adds a free-floating assignment vertex.
    pub fn assign(&mut self, variable: &str, expr: Expr) -> VertexId {
        let child = match &expr {
            Expr::Call(invocation) => Some(*invocation),
            _ => None,
        };
        let id = self.push(VertexKind::Assign(AssignData {
            variable: variable.to_string(),
            expr,
        }));
        if let Some(child_id) = child {
            self.set_parent(child_id, id);
        }
        id
    }

    /// Adds a loop vertex owning the given body statements.
    pub fn loop_of(&mut self, body: Vec<VertexId>) -> VertexId {
        let id = self.push(VertexKind::Loop(LoopData { body: body.clone() }));
        for stmt in body {
            self.set_parent(stmt, id);
        }
        id
    }

    /// Adds a branch vertex owning the given arms.
    pub fn branch(&mut self, arms: Vec<Vec<VertexId>>) -> VertexId {
        let id = self.push(VertexKind::Branch(BranchData { arms: arms.clone() }));
        for arm in arms {
            for stmt in arm {
                self.set_parent(stmt, id);
            }
        }
        id
    }

    /// Adds a field vertex declared on `class`.
    pub fn field(&mut self, class: VertexId, name: &str) -> VertexId {
        let id = self.push(VertexKind::Field(FieldData {
            name: name.to_string(),
            class,
        }));
        self.set_parent(id, class);
        id
    }

    /// Composes the ordered statement list forming a method body.
    pub fn set_body(&mut self, method: VertexId, body: Vec<VertexId>) {
        for &stmt in &body {
            self.set_parent(stmt, method);
        }
        if let Some(VertexKind::Method(data)) =
            self.vertices.get_mut(method.0 as usize).map(|v| &mut v.kind)
        {
            data.body = body;
        }
    }

    /// Whether `vertex_count` vertices no longer fit the 32-bit id space.
    fn id_space_exhausted(vertex_count: usize) -> bool {
        u32::try_from(vertex_count).is_err()
    }

    fn set_parent(&mut self, child: VertexId, parent: VertexId) {
        if let Some(vertex) = self.vertices.get_mut(child.0 as usize) {
            vertex.parent = Some(parent);
        }
    }

    /// Freezes the builder into an immutable [`ProgramGraph`].
    ///
    /// Links the class-name and subtype indexes and statically resolves invocation
    /// targets where the receiver's static type is known. Unresolvable targets
    /// (standard-library calls, unknown types) are left unresolved; that is an
    /// expected outcome, not an error.
    ///
    /// # Errors
    ///
    /// [`Error::GraphError`] when structural links are inconsistent, e.g. a body
    /// references a vertex id that was never created, or when the vertex count
    /// exceeds the 32-bit id space.
    pub fn build(self) -> Result<ProgramGraph> {
        if Self::id_space_exhausted(self.vertices.len()) {
            return Err(Error::GraphError(format!(
                "vertex count {} exceeds the 32-bit id space",
                self.vertices.len()
            )));
        }
        let mut graph = ProgramGraph {
            vertices: self.vertices,
            classes_by_name: HashMap::new(),
            subtypes: HashMap::new(),
        };

        let vertex_count = graph.vertices.len();
        for vertex in &graph.vertices {
            let check = |id: VertexId| -> Result<()> {
                if (id.0 as usize) < vertex_count {
                    Ok(())
                } else {
                    Err(Error::GraphError(format!(
                        "vertex {} references nonexistent vertex {id}",
                        vertex.id
                    )))
                }
            };
            match &vertex.kind {
                VertexKind::Method(data) => data.body.iter().copied().try_for_each(check)?,
                VertexKind::Loop(data) => data.body.iter().copied().try_for_each(check)?,
                VertexKind::Branch(data) => data
                    .arms
                    .iter()
                    .flatten()
                    .copied()
                    .try_for_each(check)?,
                _ => {}
            }
        }

        for vertex in &graph.vertices {
            if let VertexKind::Class(data) = &vertex.kind {
                graph
                    .classes_by_name
                    .insert(data.name.to_ascii_lowercase(), vertex.id);
                if let Some(superclass) = data.superclass {
                    graph.subtypes.entry(superclass).or_default().push(vertex.id);
                }
                for &interface in &data.interfaces {
                    graph.subtypes.entry(interface).or_default().push(vertex.id);
                }
            }
        }

        let resolutions = Self::resolve_targets(&graph);
        for (invocation, target) in resolutions {
            if let Some(VertexKind::Invocation(data)) = graph
                .vertices
                .get_mut(invocation.0 as usize)
                .map(|v| &mut v.kind)
            {
                data.resolved_target = Some(target);
            }
        }

        Ok(graph)
    }

    /// Statically resolves invocation targets against the assembled hierarchy.
    fn resolve_targets(graph: &ProgramGraph) -> Vec<(VertexId, VertexId)> {
        let mut resolutions = Vec::new();

        for vertex in graph.invocations() {
            let Some(data) = vertex.as_invocation() else {
                continue;
            };
            let resolved = match data.form {
                InvocationForm::New => graph
                    .class_by_name(&data.target_name)
                    .and_then(|class| graph.find_constructor(class, data.arity())),
                InvocationForm::SuperCall => graph
                    .containing_class(vertex.id)
                    .and_then(|class| graph.vertex(class))
                    .and_then(Vertex::as_class)
                    .and_then(|class_data| class_data.superclass)
                    .and_then(|superclass| graph.find_constructor(superclass, data.arity())),
                InvocationForm::ThisCall => graph
                    .containing_class(vertex.id)
                    .and_then(|class| graph.find_constructor(class, data.arity())),
                InvocationForm::MethodCall => match &data.receiver {
                    Receiver::TypeName(type_name) => graph
                        .class_by_name(type_name)
                        .and_then(|class| graph.find_method(class, &data.target_name, data.arity())),
                    Receiver::Variable(_) => data
                        .receiver_static_type
                        .as_deref()
                        .and_then(|type_name| graph.class_by_name(type_name))
                        .and_then(|class| {
                            graph.resolve_instance_target(class, &data.target_name, data.arity())
                        }),
                    Receiver::SelfRef | Receiver::None => graph
                        .containing_class(vertex.id)
                        .and_then(|class| {
                            graph
                                .find_method(class, &data.target_name, data.arity())
                                .or_else(|| {
                                    graph.resolve_instance_target(
                                        class,
                                        &data.target_name,
                                        data.arity(),
                                    )
                                })
                        }),
                },
            };
            if let Some(target) = resolved {
                resolutions.push((vertex.id, target));
            }
        }

        resolutions
    }
}
