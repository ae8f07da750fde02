//! Generic state/predicate/term visitor
//!
//! Every node is visited children first; the per-variant hook then sees the
//! rebuilt node. Rebuilding only allocates when a child actually changed, so
//! an identity pass returns the same `Arc`s it was given.
//!
//! Two disciplines share this trait:
//! - pure rewrites return new states and never touch a builder stack
//! - recollecting transformers return `Some` from [`Transformer::builders`];
//!   every kept predicate is then appended to the builder on top of the
//!   stack, and each choice alternative is rebuilt in its own builder, so a
//!   hook may splice whole states into the current builder and elide the
//!   predicate it was given.

use super::builder_stack::BuilderStack;
use crate::features::state::domain::{Predicate, PredicateKind, PredicateState, Term, TermKind};
use std::sync::Arc;

pub trait Transformer {
    /// Builder stack of a recollecting transformer; `None` for pure rewrites
    fn builders(&mut self) -> Option<&mut BuilderStack> {
        None
    }

    /// Transform a whole state and simplify the result
    fn apply(&mut self, ps: &PredicateState) -> PredicateState {
        let recollecting = match self.builders() {
            Some(stack) => {
                stack.reset();
                true
            }
            None => false,
        };
        let transformed = self.transform_state(ps);
        if recollecting {
            self.builders()
                .map(|stack| stack.current_state())
                .unwrap_or_default()
                .simplify()
        } else {
            transformed.simplify()
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // States
    // ─────────────────────────────────────────────────────────────────────

    fn transform_state(&mut self, ps: &PredicateState) -> PredicateState {
        walk_state(self, ps)
    }

    fn transform_basic(&mut self, ps: &PredicateState, predicates: &Arc<[Predicate]>) -> PredicateState {
        walk_basic(self, ps, predicates)
    }

    fn transform_chain(
        &mut self,
        ps: &PredicateState,
        base: &PredicateState,
        curr: &PredicateState,
    ) -> PredicateState {
        walk_chain(self, ps, base, curr)
    }

    fn transform_choice(
        &mut self,
        ps: &PredicateState,
        alternatives: &Arc<[PredicateState]>,
    ) -> PredicateState {
        walk_choice(self, ps, alternatives)
    }

    /// States nested inside terms (lambda bodies)
    fn transform_nested_state(&mut self, ps: &PredicateState) -> PredicateState {
        walk_nested_state(self, ps)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Predicates
    // ─────────────────────────────────────────────────────────────────────

    /// `None` elides the predicate
    fn transform_predicate(&mut self, predicate: &Predicate) -> Option<Predicate> {
        let rebuilt = walk_predicate(self, predicate);
        dispatch_predicate(self, rebuilt)
    }

    fn transform_equality_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }
    fn transform_inequality_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }
    fn transform_call_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }
    fn transform_array_store_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }
    fn transform_field_store_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }
    fn transform_new_object_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }
    fn transform_new_array_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }
    fn transform_generate_array_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }
    fn transform_throw_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }
    fn transform_catch_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        Some(predicate)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Terms
    // ─────────────────────────────────────────────────────────────────────

    fn transform_term(&mut self, term: &Term) -> Term {
        let rebuilt = walk_term(self, term);
        dispatch_term(self, rebuilt)
    }

    fn transform_argument_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_value_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_return_value_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_undef_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_const_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_static_class_ref_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_binary_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_cmp_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_neg_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_array_length_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_array_index_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_array_load_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_array_contains_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_field_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_field_load_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_cast_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_instance_of_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_call_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_equals_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_concat_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_char_at_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_string_length_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_string_contains_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_index_of_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_substring_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_to_string_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_string_parse_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_ite_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_lambda_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_forall_term(&mut self, term: Term) -> Term {
        term
    }
    fn transform_exists_term(&mut self, term: Term) -> Term {
        term
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Default walks
// ═══════════════════════════════════════════════════════════════════════════

pub fn walk_state<T: Transformer + ?Sized>(t: &mut T, ps: &PredicateState) -> PredicateState {
    match ps {
        PredicateState::Basic(predicates) => t.transform_basic(ps, predicates),
        PredicateState::Chain(base, curr) => t.transform_chain(ps, base, curr),
        PredicateState::Choice(alternatives) => t.transform_choice(ps, alternatives),
    }
}

pub fn walk_basic<T: Transformer + ?Sized>(
    t: &mut T,
    ps: &PredicateState,
    predicates: &Arc<[Predicate]>,
) -> PredicateState {
    let mut changed = false;
    let mut kept = Vec::with_capacity(predicates.len());
    for predicate in predicates.iter() {
        match t.transform_predicate(predicate) {
            Some(result) => {
                if result != *predicate {
                    changed = true;
                }
                if let Some(stack) = t.builders() {
                    stack.current().push(result.clone());
                }
                kept.push(result);
            }
            None => changed = true,
        }
    }
    if changed {
        PredicateState::basic(kept)
    } else {
        ps.clone()
    }
}

pub fn walk_chain<T: Transformer + ?Sized>(
    t: &mut T,
    ps: &PredicateState,
    base: &PredicateState,
    curr: &PredicateState,
) -> PredicateState {
    let new_base = t.transform_state(base);
    let new_curr = t.transform_state(curr);
    if new_base == *base && new_curr == *curr {
        ps.clone()
    } else {
        PredicateState::chain(new_base, new_curr)
    }
}

pub fn walk_choice<T: Transformer + ?Sized>(
    t: &mut T,
    ps: &PredicateState,
    alternatives: &Arc<[PredicateState]>,
) -> PredicateState {
    if t.builders().is_some() {
        let mut finished = Vec::with_capacity(alternatives.len());
        for alternative in alternatives.iter() {
            if let Some(stack) = t.builders() {
                stack.push_fresh();
            }
            t.transform_state(alternative);
            finished.push(t.builders().map(|stack| stack.pop()).unwrap_or_default());
        }
        if let Some(stack) = t.builders() {
            stack.current().add_choice(finished.clone());
        }
        return PredicateState::choice(finished);
    }

    let mut changed = false;
    let rebuilt: Vec<PredicateState> = alternatives
        .iter()
        .map(|alternative| {
            let result = t.transform_state(alternative);
            if result != *alternative {
                changed = true;
            }
            result
        })
        .collect();
    if changed {
        PredicateState::choice(rebuilt)
    } else {
        ps.clone()
    }
}

pub fn walk_nested_state<T: Transformer + ?Sized>(t: &mut T, ps: &PredicateState) -> PredicateState {
    let recollecting = match t.builders() {
        Some(stack) => {
            stack.push_fresh();
            true
        }
        None => false,
    };
    let transformed = t.transform_state(ps);
    if recollecting {
        t.builders().map(|stack| stack.pop()).unwrap_or_default()
    } else {
        transformed
    }
}

pub fn walk_predicate<T: Transformer + ?Sized>(t: &mut T, predicate: &Predicate) -> Predicate {
    predicate.map_operands(|term| t.transform_term(term))
}

pub fn dispatch_predicate<T: Transformer + ?Sized>(
    t: &mut T,
    predicate: Predicate,
) -> Option<Predicate> {
    match predicate.kind() {
        PredicateKind::Equality { .. } => t.transform_equality_predicate(predicate),
        PredicateKind::Inequality { .. } => t.transform_inequality_predicate(predicate),
        PredicateKind::Call { .. } => t.transform_call_predicate(predicate),
        PredicateKind::ArrayStore { .. } => t.transform_array_store_predicate(predicate),
        PredicateKind::FieldStore { .. } => t.transform_field_store_predicate(predicate),
        PredicateKind::NewObject { .. } => t.transform_new_object_predicate(predicate),
        PredicateKind::NewArray { .. } => t.transform_new_array_predicate(predicate),
        PredicateKind::GenerateArray { .. } => t.transform_generate_array_predicate(predicate),
        PredicateKind::Throw { .. } => t.transform_throw_predicate(predicate),
        PredicateKind::Catch { .. } => t.transform_catch_predicate(predicate),
    }
}

pub fn walk_term<T: Transformer + ?Sized>(t: &mut T, term: &Term) -> Term {
    let rebuilt = term.map_subterms(|sub| t.transform_term(sub));
    match rebuilt.kind() {
        TermKind::Lambda { body, .. } => {
            let new_body = t.transform_nested_state(body);
            rebuilt.with_lambda_body(new_body)
        }
        _ => rebuilt,
    }
}

pub fn dispatch_term<T: Transformer + ?Sized>(t: &mut T, term: Term) -> Term {
    match term.kind() {
        TermKind::Argument { .. } => t.transform_argument_term(term),
        TermKind::Value { .. } => t.transform_value_term(term),
        TermKind::ReturnValue { .. } => t.transform_return_value_term(term),
        TermKind::Undef => t.transform_undef_term(term),
        TermKind::Const(_) => t.transform_const_term(term),
        TermKind::StaticClassRef => t.transform_static_class_ref_term(term),
        TermKind::Binary { .. } => t.transform_binary_term(term),
        TermKind::Cmp { .. } => t.transform_cmp_term(term),
        TermKind::Neg { .. } => t.transform_neg_term(term),
        TermKind::ArrayLength { .. } => t.transform_array_length_term(term),
        TermKind::ArrayIndex { .. } => t.transform_array_index_term(term),
        TermKind::ArrayLoad { .. } => t.transform_array_load_term(term),
        TermKind::ArrayContains { .. } => t.transform_array_contains_term(term),
        TermKind::Field { .. } => t.transform_field_term(term),
        TermKind::FieldLoad { .. } => t.transform_field_load_term(term),
        TermKind::Cast { .. } => t.transform_cast_term(term),
        TermKind::InstanceOf { .. } => t.transform_instance_of_term(term),
        TermKind::Call { .. } => t.transform_call_term(term),
        TermKind::Equals { .. } => t.transform_equals_term(term),
        TermKind::Concat { .. } => t.transform_concat_term(term),
        TermKind::CharAt { .. } => t.transform_char_at_term(term),
        TermKind::StringLength { .. } => t.transform_string_length_term(term),
        TermKind::StringContains { .. } => t.transform_string_contains_term(term),
        TermKind::IndexOf { .. } => t.transform_index_of_term(term),
        TermKind::Substring { .. } => t.transform_substring_term(term),
        TermKind::ToString { .. } => t.transform_to_string_term(term),
        TermKind::StringParse { .. } => t.transform_string_parse_term(term),
        TermKind::Ite { .. } => t.transform_ite_term(term),
        TermKind::Lambda { .. } => t.transform_lambda_term(term),
        TermKind::ForAll { .. } => t.transform_forall_term(term),
        TermKind::Exists { .. } => t.transform_exists_term(term),
    }
}
