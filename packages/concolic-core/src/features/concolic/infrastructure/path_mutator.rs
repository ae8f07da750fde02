//! Path bookkeeping and frontier-seeking mutation
//!
//! Tracks the path conditions already confirmed by a replayed trace and
//! picks, left to right, the first branch whose negation leads somewhere
//! new. A frontier that keeps failing the replay check is blocked after a
//! configured number of attempts so the search moves to the next branch.

use crate::features::state::domain::{PredicateState, StateBuilder};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ExploredPaths {
    paths: FxHashSet<PredicateState>,
    blocked: FxHashSet<PredicateState>,
    failures: FxHashMap<PredicateState, usize>,
    max_retries: usize,
}

impl ExploredPaths {
    /// `max_retries == 0` never blocks a frontier
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Exact match against an explored or blocked path
    pub fn contains(&self, path: &PredicateState) -> bool {
        self.paths.contains(path) || self.blocked.contains(path)
    }

    pub fn is_blocked(&self, path: &PredicateState) -> bool {
        self.blocked.contains(path)
    }

    /// Some known path starts with `candidate`
    pub fn is_covered(&self, candidate: &PredicateState) -> bool {
        self.paths
            .iter()
            .chain(self.blocked.iter())
            .any(|path| path.starts_with(candidate))
    }

    /// Record a path confirmed by a replayed trace
    pub fn record(&mut self, path: PredicateState) -> bool {
        self.failures.remove(&path);
        self.paths.insert(path)
    }

    /// Count a failed replay of `path`; returns true once it is blocked
    pub fn record_failure(&mut self, path: &PredicateState) -> bool {
        if self.max_retries == 0 {
            return false;
        }
        let count = self.failures.entry(path.clone()).or_insert(0);
        *count += 1;
        if *count >= self.max_retries {
            debug!(retries = *count, "Blocking frontier after repeated replay failures");
            self.failures.remove(path);
            self.blocked.insert(path.clone());
            return true;
        }
        false
    }

    /// Block a frontier the solver proved infeasible
    pub fn block(&mut self, path: PredicateState) {
        self.failures.remove(&path);
        self.blocked.insert(path);
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.blocked.clear();
        self.failures.clear();
    }

    /// Flip the first Path predicate whose negation is not yet covered
    ///
    /// Everything after the flipped predicate is dropped. When every
    /// negation is covered the state comes back unmutated.
    pub fn mutate(&self, ps: &PredicateState) -> PredicateState {
        let mut current_path = StateBuilder::new();
        let mut current_state = StateBuilder::new();
        for predicate in ps.predicates() {
            if !predicate.is_path() {
                current_state.push(predicate.clone());
                continue;
            }
            let inverse = predicate.inverse();
            let mut candidate = current_path.clone();
            candidate.push(inverse.clone());
            if self.is_covered(&candidate.apply()) {
                current_path.push(predicate.clone());
                current_state.push(predicate.clone());
            } else {
                current_state.push(inverse);
                return current_state.apply();
            }
        }
        current_state.apply()
    }
}
