//! Kind-specific usage probes for one candidate method.
//!
//! A probe answers an existential question: does at least one invocation site in
//! the graph actually reach the candidate? Each method kind has its own reach
//! criterion, and every probe short-circuits on the first confirming site. Probes
//! never mutate the graph, so candidates may be probed in parallel.

use crate::{
    graph::{
        InvocationForm, MethodData, MethodKind, ProgramGraph, Receiver, Vertex, VertexId,
        VertexKind,
    },
    rules::RuleStateTracker,
    Result,
};

/// Invoked-name index key of explicit superclass constructor chains.
const SUPER_CHAIN: &str = "super";

/// Invoked-name index key of explicit same-class constructor chains.
const THIS_CHAIN: &str = "this";

/// Usage probe over one run's graph and state.
#[derive(Debug, Clone, Copy)]
pub struct MethodCallValidator<'r, 'g> {
    graph: &'g ProgramGraph,
    tracker: &'r RuleStateTracker<'g>,
}

impl<'r, 'g> MethodCallValidator<'r, 'g> {
    /// Creates a probe bound to the run's tracker.
    #[must_use]
    pub fn new(tracker: &'r RuleStateTracker<'g>) -> Self {
        Self {
            graph: tracker.graph(),
            tracker,
        }
    }

    /// Returns `true` as soon as any invocation site is confirmed to reach
    /// `candidate`; `false` only after every potential site was examined.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnexpectedVertex`] when `candidate` is not a method vertex,
    /// or [`crate::Error::VertexNotFound`] on a dangling id. Either is a defect in
    /// the built graph.
    pub fn is_used(&self, candidate: VertexId) -> Result<bool> {
        let method = self.graph.expect_vertex(candidate)?.expect_method()?;
        let used = match method.kind {
            MethodKind::Static => self.static_usage(candidate, method),
            MethodKind::Constructor => self.constructor_usage(candidate, method),
            MethodKind::Instance => self.instance_usage(candidate, method),
        };
        Ok(used)
    }

    /// A static method is used when any site statically resolved to it.
    fn static_usage(&self, candidate: VertexId, method: &MethodData) -> bool {
        self.sites_named(&method.name)
            .any(|site| self.resolves_to(site, candidate))
    }

    /// A constructor is used through construction sites, explicit chains, or the
    /// implicit zero-argument chain from a subclass constructor that opens with no
    /// explicit `super(...)`/`this(...)`.
    fn constructor_usage(&self, candidate: VertexId, method: &MethodData) -> bool {
        let explicit = self
            .sites_named(&method.name)
            .chain(self.sites_named(SUPER_CHAIN))
            .chain(self.sites_named(THIS_CHAIN))
            .any(|site| self.resolves_to(site, candidate));
        if explicit {
            return true;
        }
        if method.arity() == 0 {
            return self.implicitly_chained(method.class);
        }
        false
    }

    /// An instance method is used when some call site's receiver static type
    /// dispatches to it under hierarchy resolution.
    fn instance_usage(&self, candidate: VertexId, method: &MethodData) -> bool {
        let arity = method.arity();
        for site in self.sites_named(&method.name) {
            self.tracker.record_probe();
            let Some(data) = self.graph.vertex(site).and_then(Vertex::as_invocation) else {
                continue;
            };
            if data.form != InvocationForm::MethodCall || data.arity() != arity {
                continue;
            }
            let static_type = match &data.receiver {
                Receiver::Variable(_) => data
                    .receiver_static_type
                    .as_deref()
                    .and_then(|name| self.graph.class_by_name(name)),
                Receiver::SelfRef | Receiver::None => self.graph.containing_class(site),
                Receiver::TypeName(_) => None,
            };
            if let Some(receiver_type) = static_type {
                if self.dispatch_reaches(receiver_type, candidate, method) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether a call on static type `receiver_type` can dispatch to `candidate`.
    ///
    /// Two cases confirm the candidate: the candidate's class sits at or below the
    /// receiver type and nothing below the candidate's class shadows the method, or
    /// the candidate is the nearest inherited definition for the receiver type and
    /// nothing below the receiver type shadows it.
    fn dispatch_reaches(
        &self,
        receiver_type: VertexId,
        candidate: VertexId,
        method: &MethodData,
    ) -> bool {
        let arity = method.arity();
        if method.class == receiver_type
            || self.graph.all_subtypes(receiver_type).contains(&method.class)
        {
            return !self.graph.overridden_below(method.class, &method.name, arity);
        }
        self.graph
            .resolve_instance_target(receiver_type, &method.name, arity)
            == Some(candidate)
            && !self.graph.overridden_below(receiver_type, &method.name, arity)
    }

    /// Whether any direct subclass chains to `class`'s zero-argument constructor
    /// implicitly: a declared constructor that opens with no explicit chain
    /// statement, or a subclass declaring no constructor at all, whose implicit
    /// default constructor always chains.
    fn implicitly_chained(&self, class: VertexId) -> bool {
        for &subtype in self.graph.subtypes(class) {
            let Some(class_data) = self.graph.vertex(subtype).and_then(Vertex::as_class) else {
                continue;
            };
            self.tracker.record_probe();
            if !self.graph.has_declared_constructor(subtype) {
                return true;
            }
            for &member in &class_data.methods {
                let Some(ctor) = self.graph.vertex(member).and_then(Vertex::as_method) else {
                    continue;
                };
                if ctor.kind != MethodKind::Constructor {
                    continue;
                }
                self.tracker.record_probe();
                let opens_with_chain = ctor.body.first().is_some_and(|&stmt| {
                    matches!(
                        self.graph.vertex(stmt).map(|v| &v.kind),
                        Some(VertexKind::Invocation(data)) if data.is_constructor_chain()
                    )
                });
                if !opens_with_chain {
                    return true;
                }
            }
        }
        false
    }

    /// Invocation sites indexed under `name`, probes recorded lazily as the caller
    /// consumes them.
    fn sites_named(&self, name: &str) -> impl Iterator<Item = VertexId> + '_ {
        self.tracker
            .invocation_index()
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    fn resolves_to(&self, site: VertexId, candidate: VertexId) -> bool {
        self.tracker.record_probe();
        self.graph
            .vertex(site)
            .and_then(Vertex::as_invocation)
            .is_some_and(|data| data.resolved_target == Some(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ArgShape, GraphBuilder, MethodModifiers};

    #[test]
    fn test_static_probe_short_circuits() {
        let mut builder = GraphBuilder::new();
        let class = builder.class("Util");
        let helper = builder.method(
            class,
            "helper",
            MethodKind::Static,
            MethodModifiers::STATIC | MethodModifiers::PRIVATE,
            &[],
        );
        let caller = builder.method(class, "main", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let first = builder.invocation(
            InvocationForm::MethodCall,
            "helper",
            Receiver::TypeName("Util".to_string()),
            Vec::new(),
        );
        let second = builder.invocation(
            InvocationForm::MethodCall,
            "helper",
            Receiver::TypeName("Util".to_string()),
            Vec::new(),
        );
        builder.set_body(caller, vec![first, second]);
        let graph = builder.build().unwrap();

        let tracker = RuleStateTracker::new(&graph);
        let validator = MethodCallValidator::new(&tracker);
        assert!(validator.is_used(helper).unwrap());
        // The second site was never examined.
        assert_eq!(tracker.probes(), 1);
    }

    #[test]
    fn test_instance_call_does_not_count_for_shadowed_parent() {
        let mut builder = GraphBuilder::new();
        let base = builder.class("Base");
        let derived = builder.subclass("Derived", base);
        let base_run = builder.method(base, "run", MethodKind::Instance, MethodModifiers::PRIVATE, &[]);
        let derived_run =
            builder.method(derived, "run", MethodKind::Instance, MethodModifiers::PRIVATE, &[]);
        let caller_class = builder.class("Caller");
        let caller =
            builder.method(caller_class, "go", MethodKind::Static, MethodModifiers::STATIC, &[]);
        let call = builder.invocation(
            InvocationForm::MethodCall,
            "run",
            Receiver::Variable("b".to_string()),
            Vec::new(),
        );
        builder.set_receiver_type(call, "Base");
        builder.set_body(caller, vec![call]);
        let graph = builder.build().unwrap();

        let tracker = RuleStateTracker::new(&graph);
        let validator = MethodCallValidator::new(&tracker);
        // The call on the Base-typed receiver is claimed by the override.
        assert!(!validator.is_used(base_run).unwrap());
        assert!(validator.is_used(derived_run).unwrap());
    }

    #[test]
    fn test_implicit_constructor_chain_counts() {
        let mut builder = GraphBuilder::new();
        let base = builder.class("Base");
        let base_ctor = builder.method(
            base,
            "Base",
            MethodKind::Constructor,
            MethodModifiers::PROTECTED,
            &[],
        );
        let derived = builder.subclass("Derived", base);
        let derived_ctor = builder.method(
            derived,
            "Derived",
            MethodKind::Constructor,
            MethodModifiers::PROTECTED,
            &["size"],
        );
        // Derived(size) has a body with no explicit super(...) chain.
        let stmt = builder.invocation(
            InvocationForm::MethodCall,
            "init",
            Receiver::SelfRef,
            vec![ArgShape::Variable("size".to_string())],
        );
        builder.set_body(derived_ctor, vec![stmt]);
        let graph = builder.build().unwrap();

        let tracker = RuleStateTracker::new(&graph);
        let validator = MethodCallValidator::new(&tracker);
        assert!(validator.is_used(base_ctor).unwrap());
    }

    #[test]
    fn test_subclass_without_declared_constructor_counts_as_chain() {
        let mut builder = GraphBuilder::new();
        let base = builder.class("Base");
        let base_ctor = builder.method(
            base,
            "Base",
            MethodKind::Constructor,
            MethodModifiers::PROTECTED,
            &[],
        );
        // Derived declares no constructor; its implicit default constructor
        // chains to Base().
        builder.subclass("Derived", base);
        let graph = builder.build().unwrap();

        let tracker = RuleStateTracker::new(&graph);
        let validator = MethodCallValidator::new(&tracker);
        assert!(validator.is_used(base_ctor).unwrap());
    }

    #[test]
    fn test_unreferenced_method_is_unused() {
        let mut builder = GraphBuilder::new();
        let class = builder.class("Util");
        let orphan = builder.method(
            class,
            "orphan",
            MethodKind::Static,
            MethodModifiers::STATIC | MethodModifiers::PRIVATE,
            &[],
        );
        let graph = builder.build().unwrap();

        let tracker = RuleStateTracker::new(&graph);
        let validator = MethodCallValidator::new(&tracker);
        assert!(!validator.is_used(orphan).unwrap());
    }
}
