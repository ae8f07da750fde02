//! Search loop states and per-method reports

use crate::shared::models::MethodRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Where one search iteration currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchState {
    NoTraceYet,
    HaveCandidateTrace,
    BuiltSymbolicState,
    MutatedPath,
    Solved,
    NewTraceCollected,
    Done,
}

/// How a method's search loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Every block of the body is covered
    Covered,
    /// No candidate trace could produce a new path
    Exhausted,
    /// Wall-clock budget or iteration cap reached
    TimedOut,
    /// No seed trace could be obtained, or a method-level error occurred
    Abandoned,
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchOutcome::Covered => "covered",
            SearchOutcome::Exhausted => "exhausted",
            SearchOutcome::TimedOut => "timed_out",
            SearchOutcome::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReport {
    pub method: MethodRef,
    pub iterations: usize,
    /// Mutated paths confirmed by a replayed trace
    pub accepted_paths: usize,
    /// Attempts that produced no new trace
    pub discarded_attempts: usize,
    pub tests_generated: usize,
    pub outcome: SearchOutcome,
    pub elapsed: Duration,
}

impl MethodReport {
    pub fn new(method: MethodRef) -> Self {
        Self {
            method,
            iterations: 0,
            accepted_paths: 0,
            discarded_attempts: 0,
            tests_generated: 0,
            outcome: SearchOutcome::Abandoned,
            elapsed: Duration::ZERO,
        }
    }
}
