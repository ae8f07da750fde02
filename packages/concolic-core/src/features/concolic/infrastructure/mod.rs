//! Concolic infrastructure: trace replay, mutation, coverage, cancellation

pub mod cancellation;
pub mod path_mutator;
pub mod sink;
pub mod state_builder;
pub mod trace_manager;

pub use cancellation::CancellationToken;
pub use path_mutator::ExploredPaths;
pub use sink::CollectingSink;
pub use state_builder::TraceStateBuilder;
pub use trace_manager::CoverageTraceManager;
