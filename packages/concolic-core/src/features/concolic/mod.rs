//! Concolic search
//!
//! Alternates concrete runs with solver-guided input mutation until a
//! method's body is covered, its candidates are exhausted, or its time
//! budget runs out.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{ConcolicChecker, QueryPreparer};
pub use domain::{BasicBlock, MethodReport, PhiNode, SearchOutcome, SearchState, Terminator, Trace, TraceEvent};
pub use infrastructure::{
    CancellationToken, CollectingSink, CoverageTraceManager, ExploredPaths, TraceStateBuilder,
};
