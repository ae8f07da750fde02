//! Concolic domain models

pub mod block;
pub mod report;
pub mod trace;

pub use block::{BasicBlock, PhiNode, Terminator};
pub use report::{MethodReport, SearchOutcome, SearchState};
pub use trace::{Trace, TraceEvent};
