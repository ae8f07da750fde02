//! Concrete transformer passes

pub mod constant_propagator;
pub mod inliner;
pub mod memory_spacer;
pub mod term_collector;
pub mod term_renamer;
pub mod union_find;

pub use constant_propagator::{literal_equals, ConstantPropagator, EPSILON};
pub use inliner::{InlineScope, MethodInliner, RecursiveInliner, SizeBoundedInlinePolicy};
pub use memory_spacer::{MemorySpacer, MemorySpaces, NULL_SPACE};
pub use term_collector::{collect_terms, TermCollector};
pub use term_renamer::TermRenamer;
pub use union_find::{TermUnionFind, UnionFind};
