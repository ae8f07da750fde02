//! Mutable accumulator sealed into an immutable `PredicateState`

use super::predicate::{Predicate, PredicateKind};
use super::predicate_state::PredicateState;
use std::ops::AddAssign;

#[derive(Debug, Clone, Default)]
pub struct StateBuilder {
    sealed: PredicateState,
    pending: Vec<Predicate>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: PredicateState) -> Self {
        Self {
            sealed: state,
            pending: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.sealed.is_empty()
    }

    pub fn push(&mut self, predicate: Predicate) -> &mut Self {
        self.pending.push(predicate);
        self
    }

    pub fn append(&mut self, state: &PredicateState) -> &mut Self {
        self.flush();
        self.sealed = self.sealed.concat(state);
        self
    }

    /// Append a branching point with one continuation per alternative
    pub fn add_choice(&mut self, alternatives: Vec<PredicateState>) -> &mut Self {
        self.flush();
        self.sealed = self.sealed.concat(&PredicateState::choice(alternatives));
        self
    }

    pub fn state(&mut self, kind: PredicateKind) -> &mut Self {
        self.push(Predicate::state(kind))
    }

    pub fn path(&mut self, kind: PredicateKind) -> &mut Self {
        self.push(Predicate::path(kind))
    }

    pub fn assume(&mut self, kind: PredicateKind) -> &mut Self {
        self.push(Predicate::assume(kind))
    }

    pub fn axiom(&mut self, kind: PredicateKind) -> &mut Self {
        self.push(Predicate::axiom(kind))
    }

    pub fn require(&mut self, kind: PredicateKind) -> &mut Self {
        self.push(Predicate::require(kind))
    }

    /// Seal everything accumulated so far
    pub fn apply(&self) -> PredicateState {
        if self.pending.is_empty() {
            return self.sealed.clone();
        }
        self.sealed
            .concat(&PredicateState::basic(self.pending.clone()))
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.sealed = self.sealed.concat(&PredicateState::basic(pending));
        }
    }
}

impl AddAssign<Predicate> for StateBuilder {
    fn add_assign(&mut self, predicate: Predicate) {
        self.push(predicate);
    }
}

impl AddAssign<&PredicateState> for StateBuilder {
    fn add_assign(&mut self, state: &PredicateState) {
        self.append(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::state::domain::term_factory::TermFactory;
    use crate::shared::models::IrType;

    #[test]
    fn test_apply_preserves_order() {
        let x = TermFactory::value(IrType::Int, "x");
        let mut builder = StateBuilder::new();
        builder.state(PredicateKind::equality(x.clone(), TermFactory::int(1)));
        builder += &PredicateState::basic(vec![Predicate::path(PredicateKind::equality(
            x.clone(),
            TermFactory::int(2),
        ))]);
        builder.require(PredicateKind::inequality(x.clone(), TermFactory::int(3)));

        let state = builder.apply();
        let rendered: Vec<String> = state.predicates().iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["@S x = 1", "@P x = 2", "@R x != 3"]);
    }

    #[test]
    fn test_choice_seals_pending() {
        let c = TermFactory::value(IrType::Bool, "c");
        let mut builder = StateBuilder::new();
        builder.state(PredicateKind::equality(c.clone(), TermFactory::bool(true)));
        builder.add_choice(vec![
            PredicateState::basic(vec![Predicate::path(PredicateKind::equality(
                c.clone(),
                TermFactory::bool(true),
            ))]),
            PredicateState::basic(vec![Predicate::path(PredicateKind::equality(
                c,
                TermFactory::bool(false),
            ))]),
        ]);
        assert_eq!(builder.apply().items().len(), 2);
        assert!(!builder.is_empty());
    }
}
