//! Assertion helpers over rendered predicates

use concolic_core::features::state::PredicateState;

/// Predicates of `state` rendered one per entry
pub fn rendered(state: &PredicateState) -> Vec<String> {
    state.predicates().iter().map(|p| p.to_string()).collect()
}

pub fn assert_predicates(state: &PredicateState, expected: &[&str]) {
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    pretty_assertions::assert_eq!(rendered(state), expected);
}
