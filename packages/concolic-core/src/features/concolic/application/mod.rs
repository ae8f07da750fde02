//! Concolic application layer: the search loop and query preparation

pub mod checker;
pub mod prepare;

pub use checker::ConcolicChecker;
pub use prepare::QueryPreparer;
