//! Solver query preparation
//!
//! inline → constant-propagate → simplify → memory-space

use crate::config::{InlinerConfig, SmtConfig};
use crate::domain::ports::{InlinePolicy, ProgramModel, SolverQuery};
use crate::errors::Result;
use crate::features::state::domain::PredicateState;
use crate::features::transformer::infrastructure::{ConstantPropagator, MemorySpacer, RecursiveInliner};
use tracing::debug;

pub struct QueryPreparer<'a> {
    program: &'a dyn ProgramModel,
    policy: &'a dyn InlinePolicy,
    inliner: &'a InlinerConfig,
    smt: &'a SmtConfig,
}

impl<'a> QueryPreparer<'a> {
    pub fn new(
        program: &'a dyn ProgramModel,
        policy: &'a dyn InlinePolicy,
        inliner: &'a InlinerConfig,
        smt: &'a SmtConfig,
    ) -> Self {
        Self {
            program,
            policy,
            inliner,
            smt,
        }
    }

    /// Prepared state plus its path condition as the query
    ///
    /// A contradiction found while folding constants comes back as an error
    /// and must abort the run.
    pub fn prepare(&self, state: &PredicateState) -> Result<SolverQuery> {
        let mut prepared = if self.inliner.enabled {
            RecursiveInliner::new(self.program, self.policy, self.inliner.depth).run(state)?
        } else {
            state.clone()
        };
        prepared = ConstantPropagator::new().run(&prepared)?;
        if self.smt.simplify_formulae {
            prepared = prepared.simplify();
        }
        let memory = MemorySpacer::analyze(&prepared);
        if self.smt.log_query {
            debug!(spaces = memory.space_count(), "Solver query:\n{}", prepared);
        }
        Ok(SolverQuery {
            query: prepared.path(),
            state: prepared,
            memory,
            timeout: self.smt.timeout(),
        })
    }
}
