//! Method inlining
//!
//! Replaces call predicates with the callee's body state. The callee's
//! `this`, arguments and return value are bound to the caller's terms; every
//! other callee-local name gets a fresh `inlined{N}` suffix so two inlined
//! bodies never share a local. A `null` actual argument is replaced by a
//! fresh value constrained to `null`, which keeps the parameter a value the
//! solver can reason about.
//!
//! Inlining happens in rounds: each round inlines the calls visible in the
//! current state, so calls inside freshly inlined bodies are handled by the
//! next round. Rounds stop at a fixed point or after `max_depth` rounds.

use super::term_renamer::TermRenamer;
use crate::domain::ports::{InlinePolicy, ProgramModel};
use crate::errors::{ConcolicError, Result};
use crate::features::state::domain::{
    Predicate, PredicateKind, PredicateState, Term, TermFactory, TermKind,
};
use crate::features::transformer::domain::{BuilderStack, Transformer};
use crate::shared::models::{IrType, MethodInfo};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Which calls a pass may inline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineScope {
    All,
    Constructors,
}

/// Inlines callees accepted by a policy whose body size stays within bounds
#[derive(Debug, Clone, Copy)]
pub struct SizeBoundedInlinePolicy {
    pub max_body_size: usize,
}

impl SizeBoundedInlinePolicy {
    pub fn new(max_body_size: usize) -> Self {
        Self { max_body_size }
    }
}

impl InlinePolicy for SizeBoundedInlinePolicy {
    fn is_inlinable(&self, program: &dyn ProgramModel, method: &MethodInfo) -> bool {
        if !method.has_body() || method.method.is_static_initializer() {
            return false;
        }
        matches!(
            program.method_state(&method.method),
            Ok(Some(body)) if body.size() <= self.max_body_size
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Single round
// ═══════════════════════════════════════════════════════════════════════════

pub struct MethodInliner<'a> {
    program: &'a dyn ProgramModel,
    policy: &'a dyn InlinePolicy,
    scope: InlineScope,
    builders: BuilderStack,
    next_index: usize,
    inlined: usize,
    error: Option<ConcolicError>,
}

impl<'a> MethodInliner<'a> {
    pub fn new(program: &'a dyn ProgramModel, policy: &'a dyn InlinePolicy, scope: InlineScope) -> Self {
        Self {
            program,
            policy,
            scope,
            builders: BuilderStack::new(),
            next_index: 0,
            inlined: 0,
            error: None,
        }
    }

    /// Continue suffix numbering from an earlier round
    pub fn starting_at(mut self, index: usize) -> Self {
        self.next_index = index;
        self
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Number of calls inlined by the last run
    pub fn inlined(&self) -> usize {
        self.inlined
    }

    pub fn run(&mut self, ps: &PredicateState) -> Result<PredicateState> {
        self.inlined = 0;
        self.error = None;
        let result = self.apply(ps);
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(result),
        }
    }

    fn body_of(&mut self, info: &MethodInfo) -> Option<PredicateState> {
        match self.program.method_state(&info.method) {
            Ok(Some(body)) if !body.is_empty() => Some(body),
            Ok(_) => None,
            Err(error) => {
                if self.error.is_none() {
                    self.error = Some(error);
                }
                None
            }
        }
    }

    /// Bind `actual` to a callee-side term of type `declared`
    ///
    /// Returns the term to substitute plus any predicate that defines it.
    fn bind(actual: &Term, declared: &IrType) -> (Term, Option<Predicate>) {
        if actual.is_null() {
            let fresh = TermFactory::generate(declared.clone());
            let binding = Predicate::state(PredicateKind::equality(fresh.clone(), TermFactory::null()));
            return (fresh, Some(binding));
        }
        if actual.ty().is_pointer() && declared.is_pointer() && actual.ty() != declared {
            let casted = TermFactory::generate(declared.clone());
            let binding = Predicate::state(PredicateKind::equality(
                casted.clone(),
                TermFactory::cast(declared.clone(), actual.clone()),
            ));
            return (casted, Some(binding));
        }
        (actual.clone(), None)
    }
}

impl Transformer for MethodInliner<'_> {
    fn builders(&mut self) -> Option<&mut BuilderStack> {
        Some(&mut self.builders)
    }

    fn transform_call_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        let PredicateKind::Call { lhv, call } = predicate.kind() else {
            return Some(predicate);
        };
        let TermKind::Call {
            owner,
            method,
            arguments,
        } = call.kind()
        else {
            return Some(predicate);
        };

        let Some(info) = self.program.method(method) else {
            return Some(predicate);
        };
        if self.scope == InlineScope::Constructors && !info.is_constructor() {
            return Some(predicate);
        }
        if !self.policy.is_inlinable(self.program, &info) {
            return Some(predicate);
        }
        let Some(body) = self.body_of(&info) else {
            return Some(predicate);
        };

        let mut mappings = FxHashMap::default();
        let mut bindings = Vec::new();

        if !info.is_static {
            let (this, binding) = Self::bind(owner, &info.owner_type());
            mappings.insert(TermFactory::this(info.owner_type()), this);
            bindings.extend(binding);
        }
        for (index, (actual, declared)) in arguments.iter().zip(&info.arg_types).enumerate() {
            let (bound, binding) = Self::bind(actual, declared);
            mappings.insert(TermFactory::argument(declared.clone(), index), bound);
            bindings.extend(binding);
        }
        if let Some(lhv) = lhv {
            mappings.insert(
                TermFactory::return_value(info.return_type.clone(), method.clone()),
                lhv.clone(),
            );
        }

        let suffix = format!("inlined{}", self.next_index);
        self.next_index += 1;
        let inlined = TermRenamer::new(suffix, mappings).apply(&body);
        trace!(method = %method, size = inlined.size(), "Inlining call");

        let builder = self.builders.current();
        for binding in bindings {
            builder.push(binding);
        }
        builder.append(&inlined);
        self.inlined += 1;
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Rounds
// ═══════════════════════════════════════════════════════════════════════════

pub struct RecursiveInliner<'a> {
    program: &'a dyn ProgramModel,
    policy: &'a dyn InlinePolicy,
    scope: InlineScope,
    max_depth: usize,
}

impl<'a> RecursiveInliner<'a> {
    pub fn new(program: &'a dyn ProgramModel, policy: &'a dyn InlinePolicy, max_depth: usize) -> Self {
        Self {
            program,
            policy,
            scope: InlineScope::All,
            max_depth,
        }
    }

    /// Variant that only inlines constructors
    pub fn constructors_only(
        program: &'a dyn ProgramModel,
        policy: &'a dyn InlinePolicy,
        max_depth: usize,
    ) -> Self {
        Self {
            scope: InlineScope::Constructors,
            ..Self::new(program, policy, max_depth)
        }
    }

    pub fn run(&self, ps: &PredicateState) -> Result<PredicateState> {
        let mut current = ps.clone();
        let mut index = 0;
        for depth in 0..self.max_depth {
            let mut inliner =
                MethodInliner::new(self.program, self.policy, self.scope).starting_at(index);
            let next = inliner.run(&current)?;
            index = inliner.next_index();
            if inliner.inlined() == 0 {
                debug!(depth, "Inlining reached a fixed point");
                return Ok(next);
            }
            current = next;
        }
        Ok(current)
    }
}
