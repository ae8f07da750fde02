//! Common test utilities for concolic-core
//!
//! In-memory collaborators (program model, scripted runner and solver)
//! plus fixtures for the small programs the integration tests analyze.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
