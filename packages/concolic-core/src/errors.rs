//! Error types for concolic-core
//!
//! Every failure the search loop can observe maps onto one variant here, and
//! every variant reports how far it reaches: a single attempt, the current
//! target method, or the whole run.

use crate::config::ConfigError;
use thiserror::Error;

/// How far an error propagates through the search loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Discard the current mutation attempt and continue
    Attempt,
    /// Abandon the current target method, keep analyzing the others
    Method,
    /// Abort the whole run
    Run,
}

/// Main error type for concolic-core operations
#[derive(Debug, Error)]
pub enum ConcolicError {
    /// Operand types cannot be unified
    #[error("Type merge error: cannot merge [{}]", types.join(", "))]
    TypeMerge { types: Vec<String> },

    /// Declared type has no instantiable subtype
    #[error("No concrete instance for class {class}")]
    NoConcreteInstance { class: String },

    /// Constant folding proved two literals can never be (un)equal
    #[error("Obvious contradiction detected: {0}")]
    Contradiction(String),

    /// Native arithmetic fault while folding constants
    #[error("Arithmetic fault: {0}")]
    Arithmetic(String),

    /// Solver model could not be turned into descriptors
    #[error("Reanimation error: {0}")]
    Reanimation(String),

    /// Concrete execution or trace collection failed
    #[error("Execution error: {0}")]
    Execution(String),

    /// Program model collaborator returned inconsistent data
    #[error("Program model error: {0}")]
    ProgramModel(String),

    /// Wall-clock budget exhausted or cancellation requested
    #[error("Cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ConcolicError {
    /// Create a type merge error from the offending types
    pub fn type_merge<T: ToString>(types: &[T]) -> Self {
        ConcolicError::TypeMerge {
            types: types.iter().map(ToString::to_string).collect(),
        }
    }

    /// Create a no-concrete-instance error
    pub fn no_concrete_instance(class: impl Into<String>) -> Self {
        ConcolicError::NoConcreteInstance {
            class: class.into(),
        }
    }

    /// Create a contradiction error
    pub fn contradiction(msg: impl Into<String>) -> Self {
        ConcolicError::Contradiction(msg.into())
    }

    /// Create a program model error
    pub fn program_model(msg: impl Into<String>) -> Self {
        ConcolicError::ProgramModel(msg.into())
    }

    /// Create a reanimation error
    pub fn reanimation(msg: impl Into<String>) -> Self {
        ConcolicError::Reanimation(msg.into())
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConcolicError::Contradiction(_) => ErrorSeverity::Run,
            ConcolicError::TypeMerge { .. }
            | ConcolicError::ProgramModel(_)
            | ConcolicError::Config(_) => ErrorSeverity::Method,
            ConcolicError::NoConcreteInstance { .. }
            | ConcolicError::Arithmetic(_)
            | ConcolicError::Reanimation(_)
            | ConcolicError::Execution(_)
            | ConcolicError::Cancelled => ErrorSeverity::Attempt,
        }
    }
}

/// Result type alias for concolic operations
pub type Result<T> = std::result::Result<T, ConcolicError>;
