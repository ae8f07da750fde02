//! Inlining through the query preparation pipeline

mod common;

use common::*;
use concolic_core::domain::{InlinePolicy, ProgramModel};
use concolic_core::features::concolic::QueryPreparer;
use concolic_core::features::state::{
    CmpOpcode, Predicate, PredicateKind, PredicateState, Term, TermFactory, TermKind,
};
use concolic_core::features::transformer::{RecursiveInliner, SizeBoundedInlinePolicy};
use concolic_core::shared::models::{IrType, MethodInfo};
use pretty_assertions::assert_eq;

/// `r = Util.isNull(arg)` followed by the branch on `r`
fn caller_state(callee: &MethodInfo, arg: Term) -> PredicateState {
    let r = TermFactory::value(IrType::Bool, "r");
    let call = TermFactory::call(
        IrType::Bool,
        TermFactory::static_class_ref(IrType::class("Util")),
        callee.method.clone(),
        vec![arg],
    );
    PredicateState::basic(vec![
        Predicate::state(PredicateKind::call(Some(r.clone()), call)),
        Predicate::path(PredicateKind::equality(r, TermFactory::bool(true))),
    ])
}

fn null_bindings(state: &PredicateState) -> Vec<Term> {
    state
        .predicates()
        .iter()
        .filter_map(|p| match p.kind() {
            PredicateKind::Equality { lhv, rhv } if rhv.is_null() && !p.is_path() => Some(lhv.clone()),
            _ => None,
        })
        .collect()
}

struct NeverInline;

impl InlinePolicy for NeverInline {
    fn is_inlinable(&self, _program: &dyn ProgramModel, _method: &MethodInfo) -> bool {
        false
    }
}

#[test]
fn test_null_argument_binds_exactly_one_fresh_value() {
    let (program, is_null) = fixture_is_null(InMemoryProgram::new());
    let policy = SizeBoundedInlinePolicy::new(100);
    let state = caller_state(&is_null, TermFactory::null());

    let inlined = RecursiveInliner::new(&program, &policy, 5).run(&state).unwrap();

    let fresh = null_bindings(&inlined);
    assert_eq!(fresh.len(), 1);
    assert!(matches!(fresh[0].kind(), TermKind::Value { .. }));
    assert!(fresh[0].name().starts_with("term"));
    assert_eq!(fresh[0].ty(), &IrType::class("Node"));

    // The callee's comparison now reads the fresh value
    let r = TermFactory::value(IrType::Bool, "r");
    let compared = TermFactory::cmp(CmpOpcode::Eq, fresh[0].clone(), TermFactory::null());
    let expected = PredicateKind::equality(r, compared);
    assert!(inlined.predicates().iter().any(|p| p.kind() == &expected));
    assert!(inlined
        .predicates()
        .iter()
        .all(|p| !matches!(p.kind(), PredicateKind::Call { .. })));
}

#[test]
fn test_non_null_argument_is_substituted_directly() {
    let (program, is_null) = fixture_is_null(InMemoryProgram::new());
    let policy = SizeBoundedInlinePolicy::new(100);
    let n = TermFactory::value(IrType::class("Node"), "n");

    let inlined = RecursiveInliner::new(&program, &policy, 5)
        .run(&caller_state(&is_null, n))
        .unwrap();
    assert_predicates(&inlined, &["@S r = (n == null)", "@P r = true"]);
}

#[test]
fn test_preparer_inlines_before_querying() {
    let (program, is_null) = fixture_is_null(InMemoryProgram::new());
    let config = fixture_config();
    let policy = SizeBoundedInlinePolicy::new(config.inliner().max_body_size);
    let state = caller_state(&is_null, TermFactory::null());

    let query = QueryPreparer::new(&program, &policy, config.inliner(), config.smt())
        .prepare(&state)
        .unwrap();

    assert_eq!(null_bindings(&query.state).len(), 1);
    assert_predicates(&query.query, &["@P r = true"]);
    assert_eq!(query.timeout, config.smt().timeout());
}

#[test]
fn test_policy_can_refuse_inlining() {
    let (program, is_null) = fixture_is_null(InMemoryProgram::new());
    let config = fixture_config();
    let state = caller_state(&is_null, TermFactory::null());

    let query = QueryPreparer::new(&program, &NeverInline, config.inliner(), config.smt())
        .prepare(&state)
        .unwrap();
    assert!(query
        .state
        .predicates()
        .iter()
        .any(|p| matches!(p.kind(), PredicateKind::Call { .. })));
    assert!(null_bindings(&query.state).is_empty());
}
