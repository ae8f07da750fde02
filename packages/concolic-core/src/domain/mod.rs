//! Domain layer: ports to the engine's external collaborators

pub mod ports;

pub use ports::{
    ExecutionFailure, ExecutionRunner, InlinePolicy, Model, ModelValue, ProgramModel, Solver,
    SolverQuery, SolverResult, TestCase, TestCaseSink, TraceManager, TypeHierarchy,
};
