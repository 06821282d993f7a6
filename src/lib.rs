// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # pathscope
//!
//! A path-sensitive static detection engine over externally built program graphs.
//! `pathscope` consumes an immutable, typed graph of a codebase — classes, methods,
//! statements, invocation sites — and runs detections against it without ever
//! executing the analyzed code.
//!
//! ## Features
//!
//! - **Immutable program graph** - Typed vertices with hierarchy, containment, and
//!   static call-target resolution, built once and shared read-only across runs
//! - **Path walking** - Depth-first path enumeration with per-path variable
//!   environments, loop and call-stack boundary tracking, and cooperative
//!   cancellation
//! - **Symbolic values** - A closed set of tagged value variants with per-variant
//!   method resolution and id-based provenance, deep-cloned across branch forks
//! - **Unused-method search** - Existential usage probes per method kind (static,
//!   constructor, instance) with declaration-level eligibility filtering and
//!   parallel candidate processing
//! - **Duplicate-invocation detection** - Boundary-scoped occurrence counting that
//!   distinguishes re-enumerated path suffixes from genuinely repeated calls
//!
//! ## Quick Start
//!
//! ```rust
//! use pathscope::graph::{GraphBuilder, MethodKind, MethodModifiers};
//! use pathscope::rules::{StandardEligibility, UsageAnalysis};
//!
//! let mut builder = GraphBuilder::new();
//! let class = builder.class("Util");
//! let orphan = builder.method(
//!     class,
//!     "orphan",
//!     MethodKind::Static,
//!     MethodModifiers::STATIC | MethodModifiers::PRIVATE,
//!     &[],
//! );
//! let graph = builder.build().unwrap();
//!
//! let tracker = UsageAnalysis::run(&graph, &StandardEligibility::new("unused-method"));
//! assert_eq!(tracker.unused_candidates(), vec![orphan]);
//! ```
//!
//! ## Architecture
//!
//! The crate is layered bottom-up: [`graph`] holds the immutable program graph and
//! its queries, [`symbols`] the symbolic value model, [`walker`] the path
//! enumeration machinery, and [`rules`] the detections built on top. The graph is
//! the only resource shared across runs; every run keeps its findings and caches in
//! run-scoped state that is dropped with the run, so repeated runs over the same
//! graph are independent and idempotent.

pub mod prelude;

pub mod graph;
pub mod rules;
pub mod symbols;
pub mod walker;

mod error;

pub use error::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
