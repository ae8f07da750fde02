//! State domain models

pub mod builder;
pub mod opcodes;
pub mod predicate;
pub mod predicate_state;
pub mod term;
pub mod term_factory;

pub use builder::StateBuilder;
pub use opcodes::{BinaryOpcode, CmpOpcode};
pub use predicate::{Location, Predicate, PredicateKind, PredicateType};
pub use predicate_state::{PredicateState, StateItem};
pub use term::{Literal, Term, TermKind};
pub use term_factory::TermFactory;
