//! Transformer engine
//!
//! Generic rewrites over predicate states plus the concrete passes the
//! search loop runs before solving: constant propagation, renaming, term
//! collection, memory spacing and inlining.

pub mod domain;
pub mod infrastructure;

pub use domain::{BuilderStack, Transformer};
pub use infrastructure::{
    collect_terms, ConstantPropagator, MemorySpacer, MemorySpaces, MethodInliner,
    RecursiveInliner, SizeBoundedInlinePolicy, TermRenamer,
};
