//! Descriptor infrastructure: model reanimation and type concretization

pub mod concretizer;
pub mod heap_model;
pub mod reanimator;

pub use concretizer::Concretizer;
pub use heap_model::HeapModel;
pub use reanimator::Reanimator;
