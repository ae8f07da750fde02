//! Transformer domain: the visitor trait and its builder stack

pub mod builder_stack;
pub mod transformer;

pub use builder_stack::BuilderStack;
pub use transformer::{
    dispatch_predicate, dispatch_term, walk_basic, walk_chain, walk_choice, walk_nested_state,
    walk_predicate, walk_state, walk_term, Transformer,
};
