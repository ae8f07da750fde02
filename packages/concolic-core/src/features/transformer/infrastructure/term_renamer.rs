//! Renaming of named leaves
//!
//! Gives every argument, value and return value a fresh name by appending a
//! suffix, except for terms with an explicit mapping. Used when a callee
//! body is spliced into a caller and when a traced frame is nested inside
//! another.

use crate::features::state::domain::{Term, TermFactory};
use crate::features::transformer::domain::{dispatch_term, walk_term, Transformer};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct TermRenamer {
    suffix: String,
    mappings: FxHashMap<Term, Term>,
}

impl TermRenamer {
    pub fn new(suffix: impl Into<String>, mappings: FxHashMap<Term, Term>) -> Self {
        Self {
            suffix: suffix.into(),
            mappings,
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    fn rename(&self, term: Term) -> Term {
        if let Some(mapped) = self.mappings.get(&term) {
            return mapped.clone();
        }
        TermFactory::value(term.ty().clone(), format!("{}.{}", term.name(), self.suffix))
    }
}

impl Transformer for TermRenamer {
    fn transform_term(&mut self, term: &Term) -> Term {
        if let Some(mapped) = self.mappings.get(term) {
            return mapped.clone();
        }
        let rebuilt = walk_term(self, term);
        dispatch_term(self, rebuilt)
    }

    fn transform_argument_term(&mut self, term: Term) -> Term {
        self.rename(term)
    }

    fn transform_value_term(&mut self, term: Term) -> Term {
        self.rename(term)
    }

    fn transform_return_value_term(&mut self, term: Term) -> Term {
        self.rename(term)
    }
}
