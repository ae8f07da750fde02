//! Symbolic program state: terms, predicates and predicate states

pub mod domain;

pub use domain::{
    BinaryOpcode, CmpOpcode, Literal, Location, Predicate, PredicateKind, PredicateState,
    PredicateType, StateBuilder, StateItem, Term, TermFactory, TermKind,
};
