//! Feature modules
//!
//! Each feature is a vertical slice with its own domain and, where it talks
//! to collaborators, an infrastructure layer:
//! - state       : terms, predicates, predicate states
//! - transformer : rewrite engine and the pre-solve passes
//! - descriptor  : concrete test inputs
//! - concolic    : trace-driven search loop

pub mod concolic;
pub mod descriptor;
pub mod state;
pub mod transformer;
