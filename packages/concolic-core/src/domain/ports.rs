/*
 * Domain Ports - Interfaces for external collaborators
 *
 * HEXAGONAL ARCHITECTURE:
 * - The engine defines these interfaces
 * - Frontends, runtimes and solver backends implement them
 * - Every port is Send + Sync so methods can be analyzed in parallel
 */

use crate::errors::Result;
use crate::features::concolic::domain::{BasicBlock, Trace};
use crate::features::descriptor::domain::{DescriptorArena, DescriptorId, Parameters};
use crate::features::state::domain::{PredicateState, Term};
use crate::features::transformer::infrastructure::MemorySpaces;
use crate::shared::models::{BlockId, ClassInfo, FieldInfo, IrType, MethodInfo, MethodRef};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Program model
// ═══════════════════════════════════════════════════════════════════════════

/// Subtype queries over class names
pub trait TypeHierarchy {
    /// Reflexive: every class is its own ancestor
    fn is_ancestor_of(&self, ancestor: &str, descendant: &str) -> bool;
}

/// Port: program model (driven port)
///
/// Supplied by the bytecode frontend. Methods and blocks are already
/// translated into predicates over terms built with `TermFactory`; by
/// convention `this` is `TermFactory::this(owner)`, parameters are
/// `TermFactory::argument(ty, i)` and the result is
/// `TermFactory::return_value(ty, method)`.
pub trait ProgramModel: TypeHierarchy + Send + Sync {
    fn method(&self, method: &MethodRef) -> Option<MethodInfo>;

    /// Blocks of the method body in layout order
    fn blocks(&self, method: &MethodRef) -> Vec<BlockId>;

    fn block(&self, method: &MethodRef, block: BlockId) -> Result<Option<BasicBlock>>;

    /// Whole-body state used when inlining a call
    fn method_state(&self, method: &MethodRef) -> Result<Option<PredicateState>>;

    fn class(&self, name: &str) -> Option<ClassInfo>;

    fn field(&self, class: &str, name: &str) -> Option<FieldInfo>;

    /// An instantiable subtype of `class` (possibly `class` itself)
    fn concrete_subtype(&self, class: &str) -> Option<String>;
}

/// Port: decides which callees may be inlined
pub trait InlinePolicy: Send + Sync {
    fn is_inlinable(&self, program: &dyn ProgramModel, method: &MethodInfo) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════════
// Execution
// ═══════════════════════════════════════════════════════════════════════════

/// Concrete run or trace collection failed
#[derive(Debug, Clone, Error)]
#[error("execution failed: {0}")]
pub struct ExecutionFailure(pub String);

/// Port: instrumented concrete execution
pub trait ExecutionRunner: Send + Sync {
    /// Run with the instance/arguments/statics described by `parameters`
    fn run_concrete(
        &self,
        method: &MethodRef,
        arena: &DescriptorArena,
        parameters: &Parameters<DescriptorId>,
    ) -> std::result::Result<Trace, ExecutionFailure>;

    /// Run with random arguments to obtain a seed trace
    fn run_random(&self, method: &MethodRef) -> std::result::Result<Trace, ExecutionFailure>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Solver
// ═══════════════════════════════════════════════════════════════════════════

/// Concrete value assigned by a model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Heap address of an object or array
    Ref(u64),
}

impl fmt::Display for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelValue::Null => write!(f, "null"),
            ModelValue::Bool(v) => write!(f, "{}", v),
            ModelValue::Int(v) => write!(f, "{}", v),
            ModelValue::Float(v) => write!(f, "{}", v),
            ModelValue::Ref(addr) => write!(f, "@{:#x}", addr),
        }
    }
}

/// A satisfying assignment, including the heap it implies
pub trait Model: fmt::Debug + Send + Sync {
    /// Value of a term that appears in the solved state
    fn evaluate(&self, term: &Term) -> Option<ModelValue>;

    /// Dynamic type of the object at `address`
    fn object_type(&self, address: u64) -> Option<IrType>;

    /// Field values of the object at `address` as (name, declared type, value)
    fn fields(&self, address: u64) -> Vec<(String, IrType, ModelValue)>;

    fn array_length(&self, address: u64) -> Option<i32>;

    /// Known elements of the array at `address`
    fn elements(&self, address: u64) -> Vec<(i32, ModelValue)>;
}

/// A prepared state plus the path query to check against it
#[derive(Debug, Clone)]
pub struct SolverQuery {
    pub state: PredicateState,
    pub query: PredicateState,
    pub memory: MemorySpaces,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum SolverResult {
    Sat(Arc<dyn Model>),
    Unsat,
    /// Timeout, resource limit or unsupported theory
    Unknown(String),
}

/// Port: constraint solver backend
///
/// A backend timeout must surface as `Unknown`, never as a panic.
pub trait Solver: Send + Sync {
    fn check(&self, query: &SolverQuery) -> SolverResult;
}

// ═══════════════════════════════════════════════════════════════════════════
// Coverage and output
// ═══════════════════════════════════════════════════════════════════════════

/// Port: coverage tracking shared by every method run
///
/// Implementations must tolerate concurrent reads and appends per method.
pub trait TraceManager: Send + Sync {
    fn is_body_covered(&self, method: &MethodRef) -> bool;

    fn record(&self, method: &MethodRef, trace: &Trace);
}

/// A finished, reified test input ready for code generation
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub method: MethodRef,
    pub arena: DescriptorArena,
    pub parameters: Parameters<DescriptorId>,
    pub text: String,
}

/// Port: code generation
pub trait TestCaseSink: Send + Sync {
    fn accept(&self, case: TestCase);

    /// Called once a method's search loop has finished
    fn emit(&self, _method: &MethodRef) {}
}
