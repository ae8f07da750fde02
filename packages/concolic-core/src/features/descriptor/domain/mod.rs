//! Descriptor domain models

pub mod arena;
pub mod descriptor;
pub mod parameters;

pub use arena::DescriptorArena;
pub use descriptor::{
    default_literal, is_default_literal, DescriptorId, DescriptorKind, DescriptorNode, FieldKey,
};
pub use parameters::Parameters;
