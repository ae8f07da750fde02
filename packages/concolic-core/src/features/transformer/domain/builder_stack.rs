//! Builder stack for recollecting transformers
//!
//! The top builder receives every predicate the walk keeps. Entering a
//! choice alternative (or a lambda body) pushes a fresh builder; leaving it
//! pops and seals that builder into one finished state.

use crate::features::state::domain::{PredicateState, StateBuilder};

#[derive(Debug, Clone)]
pub struct BuilderStack {
    builders: Vec<StateBuilder>,
}

impl Default for BuilderStack {
    fn default() -> Self {
        Self {
            builders: vec![StateBuilder::new()],
        }
    }
}

impl BuilderStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything and start over with a single empty builder
    pub fn reset(&mut self) {
        self.builders.clear();
        self.builders.push(StateBuilder::new());
    }

    pub fn current(&mut self) -> &mut StateBuilder {
        if self.builders.is_empty() {
            self.builders.push(StateBuilder::new());
        }
        let top = self.builders.len() - 1;
        &mut self.builders[top]
    }

    pub fn push_fresh(&mut self) {
        self.builders.push(StateBuilder::new());
    }

    /// Seal and remove the top builder
    pub fn pop(&mut self) -> PredicateState {
        self.builders
            .pop()
            .map(|builder| builder.apply())
            .unwrap_or_default()
    }

    pub fn current_state(&self) -> PredicateState {
        self.builders
            .last()
            .map(|builder| builder.apply())
            .unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.builders.len()
    }
}
