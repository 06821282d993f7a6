//! Read-only program graph and its query interface.
//!
//! The [`ProgramGraph`] is the only cross-run shared resource in the engine. It is
//! produced once by the [`GraphBuilder`](crate::graph::GraphBuilder) and accessed
//! read-only by every analysis, so independent runs may share it freely across
//! threads. Hierarchy queries (subtype closures, dispatch resolution) are
//! visited-set guarded so malformed cyclic hierarchies cannot cause
//! non-termination.

use std::collections::{HashMap, HashSet};

use crate::{
    graph::{MethodKind, Vertex, VertexId, VertexKind},
    Error, Result,
};

/// Immutable program graph: typed vertices plus structural indexes.
///
/// Structural edges (containment, inheritance, control flow) are stored inside the
/// vertices themselves; the graph adds the derived indexes the detection algorithms
/// need, such as the class-name map and the direct-subtype relation.
#[derive(Debug)]
pub struct ProgramGraph {
    pub(crate) vertices: Vec<Vertex>,
    /// Lowercased class name to class vertex.
    pub(crate) classes_by_name: HashMap<String, VertexId>,
    /// Direct subtype relation: superclass or interface to direct subtypes/implementors.
    pub(crate) subtypes: HashMap<VertexId, Vec<VertexId>>,
}

impl ProgramGraph {
    /// Returns a vertex by id.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0 as usize)
    }

    /// Returns a vertex by id, or a defect error for a dangling id.
    ///
    /// # Errors
    ///
    /// [`Error::VertexNotFound`] when the id does not resolve.
    pub fn expect_vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertex(id).ok_or(Error::VertexNotFound(id))
    }

    /// Number of vertices in the graph.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Iterates over all method vertices.
    pub fn methods(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices
            .iter()
            .filter(|v| matches!(v.kind, VertexKind::Method(_)))
    }

    /// Iterates over all invocation vertices.
    pub fn invocations(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices
            .iter()
            .filter(|v| matches!(v.kind, VertexKind::Invocation(_)))
    }

    /// Looks up a class vertex by name, case-insensitively.
    #[must_use]
    pub fn class_by_name(&self, name: &str) -> Option<VertexId> {
        self.classes_by_name.get(&name.to_ascii_lowercase()).copied()
    }

    /// Finds a method declared directly on `class` by case-insensitive name and exact arity.
    #[must_use]
    pub fn find_method(&self, class: VertexId, name: &str, arity: usize) -> Option<VertexId> {
        let class_data = self.vertex(class)?.as_class()?;
        for &method_id in &class_data.methods {
            if let Some(method) = self.vertex(method_id).and_then(Vertex::as_method) {
                if method.name.eq_ignore_ascii_case(name) && method.arity() == arity {
                    return Some(method_id);
                }
            }
        }
        None
    }

    /// Finds a constructor declared directly on `class` with exact arity.
    #[must_use]
    pub fn find_constructor(&self, class: VertexId, arity: usize) -> Option<VertexId> {
        let class_data = self.vertex(class)?.as_class()?;
        for &method_id in &class_data.methods {
            if let Some(method) = self.vertex(method_id).and_then(Vertex::as_method) {
                if method.kind == MethodKind::Constructor && method.arity() == arity {
                    return Some(method_id);
                }
            }
        }
        None
    }

    /// Returns `true` if `class` declares any constructor at all.
    #[must_use]
    pub fn has_declared_constructor(&self, class: VertexId) -> bool {
        self.vertex(class)
            .and_then(Vertex::as_class)
            .is_some_and(|data| {
                data.methods.iter().any(|&m| {
                    self.vertex(m)
                        .and_then(Vertex::as_method)
                        .is_some_and(|method| method.kind == MethodKind::Constructor)
                })
            })
    }

    /// Direct subtypes (and interface implementors) of a type.
    #[must_use]
    pub fn subtypes(&self, class: VertexId) -> &[VertexId] {
        self.subtypes.get(&class).map_or(&[], Vec::as_slice)
    }

    /// All types in the subtype hierarchy below `class` (transitive closure).
    ///
    /// The walk is visited-set guarded, so a malformed cyclic hierarchy terminates.
    #[must_use]
    pub fn all_subtypes(&self, class: VertexId) -> Vec<VertexId> {
        let mut result = Vec::new();
        let mut worklist = vec![class];
        let mut visited = HashSet::new();

        while let Some(current) = worklist.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(subtypes) = self.subtypes.get(&current) {
                for &subtype in subtypes {
                    result.push(subtype);
                    worklist.push(subtype);
                }
            }
        }

        result
    }

    /// Resolves the dispatch target for an instance call on static type `class`:
    /// the nearest definition of `name`/`arity` at or above `class` in the
    /// superclass chain.
    #[must_use]
    pub fn resolve_instance_target(
        &self,
        class: VertexId,
        name: &str,
        arity: usize,
    ) -> Option<VertexId> {
        let mut current = Some(class);
        let mut visited = HashSet::new();

        while let Some(class_id) = current {
            if !visited.insert(class_id) {
                return None;
            }
            if let Some(found) = self.find_method(class_id, name, arity) {
                if let Some(method) = self.vertex(found).and_then(Vertex::as_method) {
                    if method.kind == MethodKind::Instance {
                        return Some(found);
                    }
                }
            }
            current = self
                .vertex(class_id)
                .and_then(Vertex::as_class)
                .and_then(|data| data.superclass);
        }
        None
    }

    /// Returns `true` if any strict subtype of `class` declares an instance method
    /// matching `name`/`arity`, i.e. the definition visible at `class` is shadowed
    /// somewhere below it.
    #[must_use]
    pub fn overridden_below(&self, class: VertexId, name: &str, arity: usize) -> bool {
        self.all_subtypes(class).iter().any(|&subtype| {
            self.find_method(subtype, name, arity)
                .and_then(|m| self.vertex(m))
                .and_then(Vertex::as_method)
                .is_some_and(|method| method.kind == MethodKind::Instance)
        })
    }

    /// Walks containment parents up to the enclosing method vertex.
    #[must_use]
    pub fn containing_method(&self, vertex: VertexId) -> Option<VertexId> {
        let mut current = Some(vertex);
        let mut visited = HashSet::new();

        while let Some(id) = current {
            if !visited.insert(id) {
                return None;
            }
            let v = self.vertex(id)?;
            if matches!(v.kind, VertexKind::Method(_)) {
                return Some(id);
            }
            current = v.parent;
        }
        None
    }

    /// Walks containment parents up to the enclosing class vertex.
    #[must_use]
    pub fn containing_class(&self, vertex: VertexId) -> Option<VertexId> {
        let method = if matches!(self.vertex(vertex)?.kind, VertexKind::Class(_)) {
            return Some(vertex);
        } else {
            self.containing_method(vertex)?
        };
        self.vertex(method).and_then(Vertex::as_method).map(|m| m.class)
    }

    /// Human-readable `Type.name` label for a method vertex, for reporting.
    #[must_use]
    pub fn method_display(&self, method: VertexId) -> String {
        let Some(data) = self.vertex(method).and_then(Vertex::as_method) else {
            return method.to_string();
        };
        let class_name = self
            .vertex(data.class)
            .and_then(Vertex::as_class)
            .map_or_else(|| data.class.to_string(), |c| c.name.clone());
        format!("{}.{}", class_name, data.name)
    }
}
