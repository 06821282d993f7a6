//! Candidate eligibility for the unused-method search.
//!
//! Eligibility is decided per method from its own declaration only, before any
//! search work happens. Every exclusion carries a named reason so a skipped method
//! can be explained in logs.

use crate::graph::{MethodData, MethodKind, MethodModifiers};

/// Name of compiler-synthesized static initializers. Always excluded.
const SYNTHETIC_INITIALIZER: &str = "<clinit>";

/// Directive value suppressing every rule at once.
const SUPPRESS_ALL: &str = "all";

/// Default prefix of compiler-synthesized property accessors.
pub const DEFAULT_PROPERTY_PREFIX: &str = "__prop_";

/// Why a method was excluded from the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum IneligibilityReason {
    /// Not one of the shapes the search can decide: static methods, private
    /// instance methods, and private or protected constructors.
    UnsupportedShape,
    /// Carries the test annotation.
    TestMethod,
    /// Compiler-synthesized static initializer.
    SyntheticInitializer,
    /// An engine directive suppresses this rule on the method.
    Suppressed,
    /// Abstract declaration with no body of its own.
    AbstractMethod,
    /// Private zero-argument constructor, the idiom for blocking instantiation.
    InstantiationBlocker,
    /// Compiler-synthesized property accessor.
    PropertyAccessor,
    /// Annotated as a publicly reachable entry point.
    EntryPoint,
}

/// Seam for callers supplying their own eligibility policy.
///
/// The search consults the policy once per method, before any probe work.
pub trait EligibilityPolicy {
    /// Returns the first reason the method is excluded, or `None` when eligible.
    fn ineligibility_reason(&self, method: &MethodData) -> Option<IneligibilityReason>;
}

/// Declaration-level eligibility filter for one named rule.
#[derive(Debug, Clone)]
pub struct StandardEligibility {
    rule_name: String,
    property_prefix: String,
}

impl StandardEligibility {
    /// Creates a filter for the rule named `rule_name` (matched against method
    /// directives case-insensitively).
    #[must_use]
    pub fn new(rule_name: &str) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            property_prefix: DEFAULT_PROPERTY_PREFIX.to_string(),
        }
    }

    /// Overrides the synthesized-accessor name prefix.
    #[must_use]
    pub fn with_property_prefix(mut self, prefix: &str) -> Self {
        self.property_prefix = prefix.to_string();
        self
    }

    /// Returns the first reason this method is excluded, or `None` when eligible.
    ///
    /// Checks are ordered cheapest first; the first match wins.
    #[must_use]
    pub fn ineligibility_reason(&self, method: &MethodData) -> Option<IneligibilityReason> {
        if !self.has_supported_shape(method) {
            return Some(IneligibilityReason::UnsupportedShape);
        }
        if method.has_modifier(MethodModifiers::TEST) {
            return Some(IneligibilityReason::TestMethod);
        }
        if method.name.eq_ignore_ascii_case(SYNTHETIC_INITIALIZER) {
            return Some(IneligibilityReason::SyntheticInitializer);
        }
        if self.is_suppressed(method) {
            return Some(IneligibilityReason::Suppressed);
        }
        if method.has_modifier(MethodModifiers::ABSTRACT) {
            return Some(IneligibilityReason::AbstractMethod);
        }
        if method.kind == MethodKind::Constructor
            && method.has_modifier(MethodModifiers::PRIVATE)
            && method.arity() == 0
        {
            return Some(IneligibilityReason::InstantiationBlocker);
        }
        if method
            .name
            .to_ascii_lowercase()
            .starts_with(&self.property_prefix.to_ascii_lowercase())
        {
            return Some(IneligibilityReason::PropertyAccessor);
        }
        if method.has_modifier(MethodModifiers::ENTRY_POINT) {
            return Some(IneligibilityReason::EntryPoint);
        }
        None
    }

    /// Returns `true` when the method passes every exclusion.
    #[must_use]
    pub fn is_eligible(&self, method: &MethodData) -> bool {
        self.ineligibility_reason(method).is_none()
    }

    fn has_supported_shape(&self, method: &MethodData) -> bool {
        match method.kind {
            MethodKind::Static => true,
            MethodKind::Instance => method.has_modifier(MethodModifiers::PRIVATE),
            MethodKind::Constructor => {
                method.has_modifier(MethodModifiers::PRIVATE)
                    || method.has_modifier(MethodModifiers::PROTECTED)
            }
        }
    }

    fn is_suppressed(&self, method: &MethodData) -> bool {
        method.directives.iter().any(|directive| {
            directive.eq_ignore_ascii_case(&self.rule_name)
                || directive.eq_ignore_ascii_case(SUPPRESS_ALL)
        })
    }
}

impl EligibilityPolicy for StandardEligibility {
    fn ineligibility_reason(&self, method: &MethodData) -> Option<IneligibilityReason> {
        StandardEligibility::ineligibility_reason(self, method)
    }
}
