//! Memory spacing
//!
//! Partitions pointer-typed terms into disjoint memory spaces: two pointers
//! that may alias through the state (assignment, store then load, cast,
//! conditional) end up in the same space. The solver models each space as a
//! separate heap region. `null` belongs to every region and gets the
//! reserved space 0; real spaces are numbered from 1 in order of first
//! appearance.

use super::union_find::TermUnionFind;
use crate::features::state::domain::{
    Predicate, PredicateKind, PredicateState, Term, TermFactory, TermKind,
};
use crate::features::transformer::domain::{
    dispatch_predicate, dispatch_term, walk_predicate, walk_term, Transformer,
};
use rustc_hash::FxHashMap;

/// Space reserved for the null literal
pub const NULL_SPACE: u32 = 0;

/// Memory space of every pointer-typed term of a state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySpaces {
    spaces: FxHashMap<Term, u32>,
}

impl MemorySpaces {
    pub fn space_of(&self, term: &Term) -> Option<u32> {
        if term.is_null() {
            return Some(NULL_SPACE);
        }
        self.spaces.get(term).copied()
    }

    /// Number of non-null spaces
    pub fn space_count(&self) -> usize {
        let mut distinct: Vec<u32> = self.spaces.values().copied().filter(|&s| s != NULL_SPACE).collect();
        distinct.sort_unstable();
        distinct.dedup();
        distinct.len()
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &u32)> {
        self.spaces.iter()
    }
}

#[derive(Debug, Default)]
pub struct MemorySpacer {
    sets: TermUnionFind,
}

impl MemorySpacer {
    /// Compute the spaces of every pointer-typed term of `ps`
    pub fn analyze(ps: &PredicateState) -> MemorySpaces {
        let mut spacer = MemorySpacer::default();
        spacer.transform_state(ps);
        spacer.into_spaces()
    }

    fn link(&mut self, a: &Term, b: &Term) {
        if a.is_null() || b.is_null() {
            return;
        }
        if a.ty().is_pointer() && b.ty().is_pointer() {
            self.sets.union(a, b);
        }
    }

    fn into_spaces(mut self) -> MemorySpaces {
        let mut numbering: FxHashMap<u32, u32> = FxHashMap::default();
        let mut spaces = FxHashMap::default();
        let terms = self.sets.terms().to_vec();
        for term in terms {
            if term.is_null() {
                spaces.insert(term, NULL_SPACE);
                continue;
            }
            let Some(root) = self.sets.root_of(&term) else {
                continue;
            };
            let next = numbering.len() as u32 + 1;
            let space = *numbering.entry(root).or_insert(next);
            spaces.insert(term, space);
        }
        tracing::trace!(
            terms = spaces.len(),
            spaces = numbering.len(),
            "Memory spaces computed"
        );
        MemorySpaces { spaces }
    }
}

impl Transformer for MemorySpacer {
    fn transform_predicate(&mut self, predicate: &Predicate) -> Option<Predicate> {
        match predicate.kind() {
            PredicateKind::Equality { lhv, rhv } => self.link(lhv, rhv),
            PredicateKind::FieldStore { field, value } => {
                self.link(&TermFactory::field_load(field.clone()), value)
            }
            PredicateKind::ArrayStore { array_ref, value } => {
                self.link(&TermFactory::array_load(array_ref.clone()), value)
            }
            _ => {}
        }
        let rebuilt = walk_predicate(self, predicate);
        dispatch_predicate(self, rebuilt)
    }

    fn transform_term(&mut self, term: &Term) -> Term {
        if term.ty().is_pointer() {
            self.sets.insert(term);
        }
        match term.kind() {
            TermKind::Cast { operand } => self.link(term, operand),
            TermKind::Ite {
                true_value,
                false_value,
                ..
            } => {
                self.link(term, true_value);
                self.link(term, false_value);
            }
            _ => {}
        }
        let rebuilt = walk_term(self, term);
        dispatch_term(self, rebuilt)
    }
}
