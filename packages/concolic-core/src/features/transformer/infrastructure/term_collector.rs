//! Term collection

use crate::features::state::domain::{PredicateState, Term};
use crate::features::transformer::domain::{dispatch_term, walk_term, Transformer};
use rustc_hash::FxHashSet;

/// Gathers every distinct term accepted by `filter`, parents before children
pub struct TermCollector<'a> {
    filter: &'a dyn Fn(&Term) -> bool,
    seen: FxHashSet<Term>,
    terms: Vec<Term>,
}

impl<'a> TermCollector<'a> {
    pub fn new(filter: &'a dyn Fn(&Term) -> bool) -> Self {
        Self {
            filter,
            seen: FxHashSet::default(),
            terms: Vec::new(),
        }
    }

    pub fn into_terms(self) -> Vec<Term> {
        self.terms
    }
}

impl Transformer for TermCollector<'_> {
    fn transform_term(&mut self, term: &Term) -> Term {
        if (self.filter)(term) && self.seen.insert(term.clone()) {
            self.terms.push(term.clone());
        }
        let rebuilt = walk_term(self, term);
        dispatch_term(self, rebuilt)
    }
}

/// Every distinct term of `ps` (lambda bodies included) matching `filter`
pub fn collect_terms(ps: &PredicateState, filter: impl Fn(&Term) -> bool) -> Vec<Term> {
    let mut collector = TermCollector::new(&filter);
    collector.transform_state(ps);
    collector.into_terms()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::state::domain::{BinaryOpcode, Predicate, PredicateKind, TermFactory};
    use crate::shared::models::IrType;

    #[test]
    fn test_collects_distinct_terms_in_order() {
        let a = TermFactory::argument(IrType::Int, 0);
        let state = PredicateState::basic(vec![
            Predicate::state(PredicateKind::equality(
                TermFactory::value(IrType::Int, "x"),
                TermFactory::binary(IrType::Int, BinaryOpcode::Add, a.clone(), a.clone()),
            )),
            Predicate::path(PredicateKind::equality(a.clone(), TermFactory::int(0))),
        ]);

        let named = collect_terms(&state, |t| t.is_named());
        let names: Vec<&str> = named.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["x", "arg$0"]);

        let all = collect_terms(&state, |_| true);
        assert_eq!(all.len(), 4);
        assert_eq!(all[1].name(), "(arg$0 + arg$0)");
    }

    #[test]
    fn test_collects_inside_lambda_bodies() {
        let body = PredicateState::basic(vec![Predicate::state(PredicateKind::equality(
            TermFactory::value(IrType::Int, "inner"),
            TermFactory::int(1),
        ))]);
        let state = PredicateState::basic(vec![Predicate::state(PredicateKind::equality(
            TermFactory::value(IrType::Bool, "f"),
            TermFactory::lambda(IrType::Bool, vec![], body),
        ))]);
        let named = collect_terms(&state, |t| t.is_named());
        assert!(named.iter().any(|t| t.name() == "inner"));
    }
}
