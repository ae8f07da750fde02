//! Descriptors: concrete object-graph values of test inputs
//!
//! A solver model is reanimated into an arena of descriptors, concretized
//! against the program's class hierarchy, reduced, and then handed to the
//! concrete executor and to code generation.

pub mod domain;
pub mod infrastructure;

pub use domain::{DescriptorArena, DescriptorId, DescriptorKind, DescriptorNode, FieldKey, Parameters};
pub use infrastructure::{Concretizer, HeapModel, Reanimator};
