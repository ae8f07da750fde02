//! Basic blocks as the program model hands them to the trace builder

use crate::features::state::domain::{Predicate, Term};
use crate::shared::models::BlockId;

/// `lhv = phi(pred -> value, ...)`, resolved against the previous block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhiNode {
    pub lhv: Term,
    pub incomings: Vec<(BlockId, Term)>,
}

impl PhiNode {
    pub fn incoming(&self, predecessor: BlockId) -> Option<&Term> {
        self.incomings
            .iter()
            .find(|(block, _)| *block == predecessor)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    Jump(BlockId),
    /// `if (cond) true_successor else false_successor`
    Branch {
        cond: Term,
        true_successor: BlockId,
        false_successor: BlockId,
    },
    Switch {
        key: Term,
        branches: Vec<(Term, BlockId)>,
        default: BlockId,
    },
    Return(Option<Term>),
    Throw(Term),
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub id: BlockId,
    pub phis: Vec<PhiNode>,
    /// Predicates of the straight-line instructions, in order
    pub body: Vec<Predicate>,
    pub terminator: Terminator,
}

impl BasicBlock {
    pub fn new(id: BlockId, body: Vec<Predicate>, terminator: Terminator) -> Self {
        Self {
            id,
            phis: Vec::new(),
            body,
            terminator,
        }
    }

    pub fn with_phi(mut self, phi: PhiNode) -> Self {
        self.phis.push(phi);
        self
    }

    pub fn successors(&self) -> Vec<BlockId> {
        match &self.terminator {
            Terminator::Jump(target) => vec![*target],
            Terminator::Branch {
                true_successor,
                false_successor,
                ..
            } => vec![*true_successor, *false_successor],
            Terminator::Switch {
                branches, default, ..
            } => branches
                .iter()
                .map(|(_, target)| *target)
                .chain(std::iter::once(*default))
                .collect(),
            Terminator::Return(_) | Terminator::Throw(_) | Terminator::Unreachable => Vec::new(),
        }
    }
}
