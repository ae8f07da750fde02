//! Predicate states
//!
//! A state is a sequence of items, each either a predicate or a choice
//! between alternative continuations. Three shapes build it up: `Basic`
//! (a linear run of predicates), `Chain` (concatenation) and `Choice`.
//! Equality and hashing look at the flattened item sequence, so two states
//! chained differently but holding the same items are the same key.

use super::predicate::{Predicate, PredicateType};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum PredicateState {
    Basic(Arc<[Predicate]>),
    Chain(Arc<PredicateState>, Arc<PredicateState>),
    Choice(Arc<[PredicateState]>),
}

/// One element of a flattened state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateItem<'a> {
    Predicate(&'a Predicate),
    Choice(&'a [PredicateState]),
}

impl Default for PredicateState {
    fn default() -> Self {
        Self::empty()
    }
}

impl PredicateState {
    pub fn empty() -> Self {
        PredicateState::Basic(Arc::from(Vec::new()))
    }

    pub fn basic(predicates: Vec<Predicate>) -> Self {
        PredicateState::Basic(Arc::from(predicates))
    }

    pub fn choice(alternatives: Vec<PredicateState>) -> Self {
        PredicateState::Choice(Arc::from(alternatives))
    }

    pub fn chain(base: PredicateState, curr: PredicateState) -> Self {
        PredicateState::Chain(Arc::new(base), Arc::new(curr))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PredicateState::Basic(predicates) => predicates.is_empty(),
            PredicateState::Chain(base, curr) => base.is_empty() && curr.is_empty(),
            PredicateState::Choice(alternatives) => alternatives.iter().all(|a| a.is_empty()),
        }
    }

    /// Number of predicates, counting every alternative of every choice
    pub fn size(&self) -> usize {
        match self {
            PredicateState::Basic(predicates) => predicates.len(),
            PredicateState::Chain(base, curr) => base.size() + curr.size(),
            PredicateState::Choice(alternatives) => alternatives.iter().map(|a| a.size()).sum(),
        }
    }

    /// Flattened item sequence in execution order
    pub fn items(&self) -> Vec<StateItem<'_>> {
        let mut items = Vec::new();
        self.collect_items(&mut items);
        items
    }

    fn collect_items<'a>(&'a self, out: &mut Vec<StateItem<'a>>) {
        match self {
            PredicateState::Basic(predicates) => {
                out.extend(predicates.iter().map(StateItem::Predicate))
            }
            PredicateState::Chain(base, curr) => {
                base.collect_items(out);
                curr.collect_items(out);
            }
            PredicateState::Choice(alternatives) => {
                if !self.is_empty() {
                    out.push(StateItem::Choice(&alternatives[..]))
                }
            }
        }
    }

    /// Top-level predicates in order, skipping choices
    pub fn predicates(&self) -> Vec<&Predicate> {
        self.items()
            .into_iter()
            .filter_map(|item| match item {
                StateItem::Predicate(p) => Some(p),
                StateItem::Choice(_) => None,
            })
            .collect()
    }

    /// Concatenation; merges adjacent basic runs and drops empty sides
    pub fn concat(&self, other: &PredicateState) -> PredicateState {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        match (self, other) {
            (PredicateState::Basic(lhs), PredicateState::Basic(rhs)) => {
                PredicateState::basic(lhs.iter().chain(rhs.iter()).cloned().collect())
            }
            _ => PredicateState::chain(self.clone(), other.clone()),
        }
    }

    pub fn add_predicate(&self, predicate: Predicate) -> PredicateState {
        self.concat(&PredicateState::basic(vec![predicate]))
    }

    /// Keep predicates matching `keep`, preserving structure
    pub fn filter(&self, keep: &dyn Fn(&Predicate) -> bool) -> PredicateState {
        match self {
            PredicateState::Basic(predicates) => {
                if predicates.iter().all(keep) {
                    self.clone()
                } else {
                    PredicateState::basic(predicates.iter().filter(|p| keep(p)).cloned().collect())
                }
            }
            PredicateState::Chain(base, curr) => base.filter(keep).concat(&curr.filter(keep)),
            PredicateState::Choice(alternatives) => {
                PredicateState::choice(alternatives.iter().map(|a| a.filter(keep)).collect())
            }
        }
        .simplify()
    }

    pub fn filter_by_type(&self, ptype: PredicateType) -> PredicateState {
        self.filter(&|p| p.ptype() == ptype)
    }

    /// The path condition: Path predicates in order
    pub fn path(&self) -> PredicateState {
        self.filter_by_type(PredicateType::Path)
    }

    /// Whether `prefix`'s items open this state's item sequence
    pub fn starts_with(&self, prefix: &PredicateState) -> bool {
        let ours = self.items();
        let theirs = prefix.items();
        theirs.len() <= ours.len() && ours.iter().zip(theirs.iter()).all(|(a, b)| a == b)
    }

    /// Normalize shape: flatten chains, merge runs, collapse trivial choices
    pub fn simplify(&self) -> PredicateState {
        match self {
            PredicateState::Basic(_) => self.clone(),
            PredicateState::Chain(base, curr) => base.simplify().concat(&curr.simplify()),
            PredicateState::Choice(alternatives) => {
                let simplified: Vec<PredicateState> =
                    alternatives.iter().map(|a| a.simplify()).collect();
                match simplified.as_slice() {
                    [] => PredicateState::empty(),
                    [only] => only.clone(),
                    [first, rest @ ..] if rest.iter().all(|a| a == first) => first.clone(),
                    _ => PredicateState::choice(simplified),
                }
            }
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        for item in self.items() {
            match item {
                StateItem::Predicate(p) => writeln!(f, "{}{}", pad, p)?,
                StateItem::Choice(alternatives) => {
                    writeln!(f, "{}BEGIN_OR", pad)?;
                    for (i, alternative) in alternatives.iter().enumerate() {
                        if i > 0 {
                            writeln!(f, "{}OR", pad)?;
                        }
                        alternative.write_indented(f, depth + 1)?;
                    }
                    writeln!(f, "{}END_OR", pad)?;
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for PredicateState {
    fn eq(&self, other: &Self) -> bool {
        self.items() == other.items()
    }
}

impl Eq for PredicateState {}

impl Hash for PredicateState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let items = self.items();
        items.len().hash(state);
        for item in items {
            item.hash(state);
        }
    }
}

impl fmt::Display for PredicateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(BEGIN")?;
        self.write_indented(f, 1)?;
        write!(f, "END)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::state::domain::predicate::PredicateKind;
    use crate::features::state::domain::term_factory::TermFactory;
    use crate::shared::models::IrType;

    fn assign(name: &str, value: i32) -> Predicate {
        Predicate::state(PredicateKind::equality(
            TermFactory::value(IrType::Int, name),
            TermFactory::int(value),
        ))
    }

    fn branch(name: &str, taken: bool) -> Predicate {
        Predicate::path(PredicateKind::equality(
            TermFactory::value(IrType::Bool, name),
            TermFactory::bool(taken),
        ))
    }

    #[test]
    fn test_equality_ignores_chaining_shape() {
        let flat = PredicateState::basic(vec![assign("a", 1), assign("b", 2)]);
        let chained = PredicateState::chain(
            PredicateState::basic(vec![assign("a", 1)]),
            PredicateState::basic(vec![assign("b", 2)]),
        );
        assert_eq!(flat, chained);

        let mut set = rustc_hash::FxHashSet::default();
        set.insert(flat);
        assert!(set.contains(&chained));
    }

    #[test]
    fn test_path_keeps_only_path_predicates() {
        let state =
            PredicateState::basic(vec![assign("a", 1), branch("c1", true), assign("b", 2)])
                .add_predicate(branch("c2", false));
        let path = state.path();
        assert_eq!(path.size(), 2);
        assert_eq!(
            path,
            PredicateState::basic(vec![branch("c1", true), branch("c2", false)])
        );
    }

    #[test]
    fn test_starts_with() {
        let full = PredicateState::basic(vec![branch("c1", true), branch("c2", false)]);
        let prefix = PredicateState::basic(vec![branch("c1", true)]);
        let other = PredicateState::basic(vec![branch("c1", false)]);
        assert!(full.starts_with(&prefix));
        assert!(full.starts_with(&full));
        assert!(full.starts_with(&PredicateState::empty()));
        assert!(!full.starts_with(&other));
        assert!(!prefix.starts_with(&full));
    }

    #[test]
    fn test_simplify_collapses_choices() {
        let alt = PredicateState::basic(vec![assign("a", 1)]);
        let choice = PredicateState::choice(vec![alt.clone(), alt.clone()]);
        assert!(matches!(choice.simplify(), PredicateState::Basic(_)));

        let empty_chain = PredicateState::chain(PredicateState::empty(), alt.clone());
        assert!(matches!(empty_chain.simplify(), PredicateState::Basic(_)));
        assert_eq!(empty_chain.simplify(), alt);
    }

    #[test]
    fn test_choice_is_one_item() {
        let state = PredicateState::basic(vec![assign("a", 1)]).concat(&PredicateState::choice(
            vec![
                PredicateState::basic(vec![branch("c", true)]),
                PredicateState::basic(vec![branch("c", false)]),
            ],
        ));
        assert_eq!(state.items().len(), 2);
        assert_eq!(state.size(), 3);
        assert_eq!(state.predicates().len(), 1);
    }

    #[test]
    fn test_choice_of_empty_alternatives_is_no_item() {
        let base = PredicateState::basic(vec![assign("a", 1)]);
        let hollow = PredicateState::choice(vec![PredicateState::empty(), PredicateState::empty()]);
        assert!(hollow.is_empty());

        let chained = PredicateState::chain(base.clone(), hollow.clone());
        assert_eq!(chained, base);
        assert_eq!(chained, base.concat(&hollow));

        let mut set = rustc_hash::FxHashSet::default();
        set.insert(base);
        assert!(set.contains(&chained));
    }
}
