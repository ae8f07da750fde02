//! Concolic checker: the per-method search loop
//!
//! ```text
//! NoTraceYet → HaveCandidateTrace → BuiltSymbolicState → MutatedPath
//!   → Solved → NewTraceCollected → (loop | Done)
//! ```
//!
//! Each method owns its explored-path set and its cancellation token, so
//! methods are analyzed independently (and in parallel by `visit_all`).
//! The only shared mutable collaborator is the trace manager.

use super::prepare::QueryPreparer;
use crate::config::ValidatedConfig;
use crate::domain::ports::{
    ExecutionRunner, InlinePolicy, Model, ProgramModel, Solver, SolverResult, TestCase, TestCaseSink,
    TraceManager,
};
use crate::errors::{ConcolicError, ErrorSeverity, Result};
use crate::features::concolic::domain::{MethodReport, SearchOutcome, SearchState, Trace};
use crate::features::concolic::infrastructure::{CancellationToken, ExploredPaths, TraceStateBuilder};
use crate::features::descriptor::domain::{DescriptorArena, DescriptorId, Parameters};
use crate::features::descriptor::infrastructure::{Concretizer, Reanimator};
use crate::features::state::domain::PredicateState;
use crate::features::transformer::infrastructure::SizeBoundedInlinePolicy;
use crate::shared::models::{MethodInfo, MethodRef};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of one mutate → solve → reify → execute round
enum Attempt {
    /// Replay confirmed the mutated path; the trace is a new candidate
    Accepted(Trace),
    /// Mutation produced nothing new from this candidate
    Duplicate,
    /// Solver, reification, execution or replay did not pan out
    Discarded,
}

pub struct ConcolicChecker {
    config: ValidatedConfig,
    program: Arc<dyn ProgramModel>,
    runner: Arc<dyn ExecutionRunner>,
    solver: Arc<dyn Solver>,
    traces: Arc<dyn TraceManager>,
    sink: Arc<dyn TestCaseSink>,
    policy: Arc<dyn InlinePolicy>,
    cancellation: CancellationToken,
}

impl ConcolicChecker {
    pub fn new(
        config: ValidatedConfig,
        program: Arc<dyn ProgramModel>,
        runner: Arc<dyn ExecutionRunner>,
        solver: Arc<dyn Solver>,
        traces: Arc<dyn TraceManager>,
        sink: Arc<dyn TestCaseSink>,
    ) -> Self {
        let policy = Arc::new(SizeBoundedInlinePolicy::new(config.inliner().max_body_size));
        Self {
            config,
            program,
            runner,
            solver,
            traces,
            sink,
            policy,
            cancellation: CancellationToken::new(),
        }
    }

    /// Replace the default size-bounded inline policy
    pub fn with_inline_policy(mut self, policy: Arc<dyn InlinePolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Run-wide token; every method's token is a child of it
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Static initializers, bodiless methods and (with `main_only`)
    /// everything but `main` are skipped
    pub fn should_visit(&self, info: &MethodInfo) -> bool {
        if info.method.is_static_initializer() || !info.has_body() {
            return false;
        }
        !self.config.concolic().main_only || info.method.name == "main"
    }

    /// Analyze one method
    ///
    /// `Ok(None)` when the method is unknown or skipped. Only a run-level
    /// error (an obvious contradiction) is returned as `Err`; everything
    /// else ends the method with an outcome.
    pub fn visit_method(&self, method: &MethodRef) -> Result<Option<MethodReport>> {
        let Some(info) = self.program.method(method) else {
            warn!(method = %method, "Method unknown to the program model, skipping");
            return Ok(None);
        };
        if !self.should_visit(&info) {
            debug!(method = %method, "Skipping method");
            return Ok(None);
        }

        info!(method = %method, "Starting concolic search");
        let start = Instant::now();
        let token = self.cancellation.child(self.config.concolic().time_limit());
        let mut search = MethodSearch::new(self, &info, token);
        let outcome = match search.run() {
            Ok(outcome) => outcome,
            Err(e) if e.severity() == ErrorSeverity::Run => {
                error!(method = %method, error = %e, "Aborting run");
                return Err(e);
            }
            Err(e) => {
                warn!(method = %method, error = %e, "Abandoning method");
                SearchOutcome::Abandoned
            }
        };

        let mut report = search.report;
        report.outcome = outcome;
        report.elapsed = start.elapsed();
        self.sink.emit(method);
        info!(
            method = %method,
            outcome = %report.outcome,
            iterations = report.iterations,
            accepted = report.accepted_paths,
            tests = report.tests_generated,
            "Finished concolic search"
        );
        Ok(Some(report))
    }

    /// Analyze methods, in parallel on the rayon pool by default
    ///
    /// A run-level error cancels the remaining methods and is returned.
    pub fn visit_all(&self, methods: &[MethodRef]) -> Result<Vec<MethodReport>> {
        let visit = |method: &MethodRef| {
            let result = self.visit_method(method);
            if result.is_err() {
                self.cancellation.cancel();
            }
            result
        };
        #[cfg(feature = "parallel")]
        let results: Vec<Result<Option<MethodReport>>> = methods.par_iter().map(visit).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<Result<Option<MethodReport>>> = methods.iter().map(visit).collect();

        let mut reports = Vec::with_capacity(results.len());
        for result in results {
            if let Some(report) = result? {
                reports.push(report);
            }
        }
        Ok(reports)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Per-method search
// ═══════════════════════════════════════════════════════════════════════════

struct MethodSearch<'a> {
    checker: &'a ConcolicChecker,
    info: &'a MethodInfo,
    token: CancellationToken,
    explored: ExploredPaths,
    seed_paths: FxHashSet<PredicateState>,
    candidates: VecDeque<Trace>,
    state: SearchState,
    report: MethodReport,
}

impl<'a> MethodSearch<'a> {
    fn new(checker: &'a ConcolicChecker, info: &'a MethodInfo, token: CancellationToken) -> Self {
        Self {
            checker,
            info,
            token,
            explored: ExploredPaths::new(checker.config.concolic().max_frontier_retries),
            seed_paths: FxHashSet::default(),
            candidates: VecDeque::new(),
            state: SearchState::NoTraceYet,
            report: MethodReport::new(info.method.clone()),
        }
    }

    fn method(&self) -> &'a MethodRef {
        &self.info.method
    }

    fn builder(&self) -> TraceStateBuilder<'a> {
        TraceStateBuilder::new(self.checker.program.as_ref())
    }

    fn run(&mut self) -> Result<SearchOutcome> {
        let max_iterations = self.checker.config.concolic().max_iterations;
        loop {
            if self.checker.traces.is_body_covered(self.method()) {
                self.state = SearchState::Done;
                return Ok(SearchOutcome::Covered);
            }
            if max_iterations > 0 && self.report.iterations >= max_iterations {
                debug!(method = %self.method(), "Iteration cap reached");
                return Ok(SearchOutcome::TimedOut);
            }
            if self.token.is_cancelled() {
                debug!(method = %self.method(), "Time limit reached");
                return Ok(SearchOutcome::TimedOut);
            }

            let candidate = match self.candidates.front() {
                Some(trace) => trace.clone(),
                None => match self.seed()? {
                    Some(trace) => trace,
                    None if self.state == SearchState::NoTraceYet => {
                        return Ok(SearchOutcome::Abandoned)
                    }
                    None => return Ok(SearchOutcome::Exhausted),
                },
            };
            self.state = SearchState::HaveCandidateTrace;
            if self.token.is_cancelled() {
                return Ok(SearchOutcome::TimedOut);
            }

            self.report.iterations += 1;
            match self.attempt(&candidate) {
                Ok(Attempt::Accepted(trace)) => {
                    self.report.accepted_paths += 1;
                    self.candidates.push_back(trace);
                }
                Ok(Attempt::Duplicate) => {
                    self.report.discarded_attempts += 1;
                    self.candidates.pop_front();
                }
                Ok(Attempt::Discarded) => self.report.discarded_attempts += 1,
                Err(ConcolicError::Cancelled) => return Ok(SearchOutcome::TimedOut),
                Err(e) if e.severity() == ErrorSeverity::Attempt => {
                    debug!(method = %self.method(), error = %e, "Dropping unreplayable candidate");
                    self.report.discarded_attempts += 1;
                    self.candidates.pop_front();
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// A random-argument trace, pushed as the next candidate
    ///
    /// After the first seed, a new one only counts if it takes a path not
    /// seen before.
    fn seed(&mut self) -> Result<Option<Trace>> {
        let trace = match self.checker.runner.run_random(self.method()) {
            Ok(trace) => trace,
            Err(failure) => {
                debug!(method = %self.method(), error = %failure, "Random run failed");
                return Ok(None);
            }
        };
        self.checker.traces.record(self.method(), &trace);

        let path = self.builder().build(self.method(), &trace)?.path();
        let first = self.state == SearchState::NoTraceYet;
        if !first && (self.explored.contains(&path) || self.seed_paths.contains(&path)) {
            return Ok(None);
        }
        self.seed_paths.insert(path);
        self.candidates.push_back(trace.clone());
        self.state = SearchState::HaveCandidateTrace;
        Ok(Some(trace))
    }

    fn attempt(&mut self, candidate: &Trace) -> Result<Attempt> {
        let method = self.method();
        let state = self.builder().build(method, candidate)?;
        self.state = SearchState::BuiltSymbolicState;

        let mutated = self.explored.mutate(&state);
        let path = mutated.path();
        self.state = SearchState::MutatedPath;
        if mutated == state || self.explored.contains(&path) {
            debug!(method = %method, "Could not generate new trace");
            return Ok(Attempt::Duplicate);
        }
        debug!(method = %method, "Collected state:\n{}", state);
        debug!(method = %method, "Mutated state:\n{}", mutated);

        match self.explore(&mutated, &path) {
            Err(e) if e.severity() == ErrorSeverity::Attempt && !matches!(e, ConcolicError::Cancelled) => {
                debug!(method = %method, error = %e, "Attempt discarded");
                self.explored.record_failure(&path);
                Ok(Attempt::Discarded)
            }
            other => other,
        }
    }

    /// Solve the mutated state, run the model's inputs and check the replay
    fn explore(&mut self, mutated: &PredicateState, path: &PredicateState) -> Result<Attempt> {
        let method = self.method();
        let query = QueryPreparer::new(
            self.checker.program.as_ref(),
            self.checker.policy.as_ref(),
            self.checker.config.inliner(),
            self.checker.config.smt(),
        )
        .prepare(mutated)?;
        let result = self.checker.solver.check(&query);
        self.state = SearchState::Solved;
        self.token.checkpoint()?;

        let model = match result {
            SolverResult::Sat(model) => model,
            SolverResult::Unsat => {
                debug!(method = %method, "Mutated path is infeasible");
                self.explored.block(path.clone());
                return Ok(Attempt::Discarded);
            }
            SolverResult::Unknown(reason) => {
                debug!(method = %method, reason = %reason, "Solver gave up");
                self.explored.record_failure(path);
                return Ok(Attempt::Discarded);
            }
        };

        let (arena, parameters) = self.reify(model.as_ref(), &query.state)?;
        self.token.checkpoint()?;

        let trace = self
            .checker
            .runner
            .run_concrete(method, &arena, &parameters)
            .map_err(|failure| ConcolicError::Execution(failure.0))?;
        self.state = SearchState::NewTraceCollected;
        self.checker.traces.record(method, &trace);

        let replayed = self.builder().build(method, &trace)?.path();
        if !replayed.starts_with(path) {
            debug!(method = %method, "Replayed trace diverged from the mutated path");
            self.explored.record_failure(path);
            return Ok(Attempt::Discarded);
        }

        self.explored.record(path.clone());
        self.emit_test(arena, parameters);
        Ok(Attempt::Accepted(trace))
    }

    fn reify(
        &self,
        model: &dyn Model,
        state: &PredicateState,
    ) -> Result<(DescriptorArena, Parameters<DescriptorId>)> {
        let (mut arena, parameters) = Reanimator::new(model).parameters(self.info, state)?;
        let descriptor = self.checker.config.descriptor();
        Concretizer::new(self.checker.program.as_ref(), descriptor.visibility).concrete_parameters(
            &mut arena,
            &parameters,
            descriptor,
        )?;
        Ok((arena, parameters))
    }

    fn emit_test(&mut self, arena: DescriptorArena, parameters: Parameters<DescriptorId>) {
        self.report.tests_generated += 1;
        let name = format!("test{}", self.report.tests_generated);
        let text = render_test(&name, self.method(), &arena, &parameters);
        self.checker.sink.accept(TestCase {
            name,
            method: self.method().clone(),
            arena,
            parameters,
            text,
        });
    }
}

/// Readable form of a test's inputs
fn render_test(
    name: &str,
    method: &MethodRef,
    arena: &DescriptorArena,
    parameters: &Parameters<DescriptorId>,
) -> String {
    let mut text = format!("{} for {}\n", name, method);
    if let Some(instance) = parameters.instance {
        let _ = writeln!(text, "instance: {}", arena.print(instance));
    }
    for (index, &argument) in parameters.arguments.iter().enumerate() {
        let _ = writeln!(text, "arg{}: {}", index, arena.print(argument));
    }
    for &statics in &parameters.statics {
        let _ = writeln!(text, "static: {}", arena.print(statics));
    }
    text
}
