//! Property-based tests for folding, path bookkeeping and descriptor graphs

use concolic_core::features::concolic::ExploredPaths;
use concolic_core::features::descriptor::{DescriptorArena, DescriptorId};
use concolic_core::features::state::{
    BinaryOpcode, CmpOpcode, Literal, Predicate, PredicateKind, PredicateState, Term, TermFactory,
};
use concolic_core::features::transformer::ConstantPropagator;
use concolic_core::shared::models::IrType;
use proptest::prelude::*;
use quickcheck_macros::quickcheck;

fn folded_rhs(op: BinaryOpcode, a: Term, b: Term, ty: IrType) -> Option<Literal> {
    let x = TermFactory::value(ty.clone(), "x");
    let state = PredicateState::basic(vec![Predicate::state(PredicateKind::equality(
        x,
        TermFactory::binary(ty, op, a, b),
    ))]);
    let folded = ConstantPropagator::new().run(&state).ok()?;
    let predicates = folded.predicates();
    match predicates.first()?.kind() {
        PredicateKind::Equality { rhv, .. } => rhv.as_literal().cloned(),
        _ => None,
    }
}

fn branch(name: &str, taken: bool) -> Predicate {
    Predicate::path(PredicateKind::equality(
        TermFactory::value(IrType::Bool, name),
        TermFactory::bool(taken),
    ))
}

/// One branch per bit, on flags `b0`, `b1`, ...
fn to_path(bits: &[bool]) -> PredicateState {
    PredicateState::basic(
        bits.iter()
            .enumerate()
            .map(|(index, &bit)| branch(&format!("b{}", index), bit))
            .collect(),
    )
}

// ============================================================================
// QuickCheck Tests
// ============================================================================

#[quickcheck]
fn qc_int_arithmetic_wraps_like_jvm(a: i32, b: i32) -> bool {
    let cases = [
        (BinaryOpcode::Add, a.wrapping_add(b)),
        (BinaryOpcode::Sub, a.wrapping_sub(b)),
        (BinaryOpcode::Mul, a.wrapping_mul(b)),
    ];
    cases.iter().all(|&(op, expected)| {
        folded_rhs(op, TermFactory::int(a), TermFactory::int(b), IrType::Int)
            == Some(Literal::Int(expected))
    })
}

#[quickcheck]
fn qc_long_arithmetic_wraps_like_jvm(a: i64, b: i64) -> bool {
    let cases = [
        (BinaryOpcode::Add, a.wrapping_add(b)),
        (BinaryOpcode::Sub, a.wrapping_sub(b)),
        (BinaryOpcode::Mul, a.wrapping_mul(b)),
    ];
    cases.iter().all(|&(op, expected)| {
        folded_rhs(op, TermFactory::long(a), TermFactory::long(b), IrType::Long)
            == Some(Literal::Long(expected))
    })
}

#[quickcheck]
fn qc_int_promotes_to_long(a: i32, b: i64) -> bool {
    folded_rhs(BinaryOpcode::Add, TermFactory::int(a), TermFactory::long(b), IrType::Long)
        == Some(Literal::Long(i64::from(a).wrapping_add(b)))
}

#[quickcheck]
fn qc_comparison_folds_to_bool(a: i32, b: i32) -> bool {
    let x = TermFactory::value(IrType::Bool, "x");
    let state = PredicateState::basic(vec![Predicate::state(PredicateKind::equality(
        x,
        TermFactory::cmp(CmpOpcode::Lt, TermFactory::int(a), TermFactory::int(b)),
    ))]);
    let Ok(folded) = ConstantPropagator::new().run(&state) else {
        return false;
    };
    let predicates = folded.predicates();
    matches!(
        predicates[0].kind(),
        PredicateKind::Equality { rhv, .. } if rhv.as_literal() == Some(&Literal::Bool(a < b))
    )
}

#[quickcheck]
fn qc_distinct_literals_contradict(a: i32, b: i32) -> bool {
    let state = PredicateState::basic(vec![Predicate::path(PredicateKind::equality(
        TermFactory::int(a),
        TermFactory::int(b),
    ))]);
    ConstantPropagator::new().run(&state).is_err() == (a != b)
}

// ============================================================================
// Proptest Tests
// ============================================================================

/// Object graph over `Node { next: Node, value: int }` with arbitrary links
fn build_graph(links: &[(usize, usize)], values: &[i32]) -> (DescriptorArena, Vec<DescriptorId>) {
    let node = IrType::class("Node");
    let mut arena = DescriptorArena::new();
    let nodes: Vec<DescriptorId> = values.iter().map(|_| arena.object("Node")).collect();
    for (&id, &value) in nodes.iter().zip(values) {
        let v = arena.int(value);
        arena.set_field(id, "value", IrType::Int, v);
    }
    for &(from, to) in links {
        arena.set_field(nodes[from % nodes.len()], "next", node.clone(), nodes[to % nodes.len()]);
    }
    (arena, nodes)
}

proptest! {
    #[test]
    fn prop_reduce_is_idempotent(
        values in prop::collection::vec(-2i32..3, 1..8),
        links in prop::collection::vec((0usize..8, 0usize..8), 0..12),
    ) {
        let (mut arena, nodes) = build_graph(&links, &values);
        arena.reduce(nodes[0]);
        let once = arena.print(nodes[0]);
        arena.reduce(nodes[0]);
        prop_assert_eq!(arena.print(nodes[0]), once);
    }

    #[test]
    fn prop_deep_copy_is_structurally_equal(
        values in prop::collection::vec(any::<i32>(), 1..8),
        links in prop::collection::vec((0usize..8, 0usize..8), 0..12),
    ) {
        let (mut arena, nodes) = build_graph(&links, &values);
        let copy = arena.deep_copy(nodes[0]);
        prop_assert!(arena.structural_eq(nodes[0], copy));
        prop_assert!(arena.structural_eq(copy, nodes[0]));
        prop_assert_eq!(arena.depth(nodes[0]), arena.depth(copy));
    }

    #[test]
    fn prop_mutation_never_repeats_explored_path(
        taken in prop::collection::vec(any::<bool>(), 1..6),
        explored in prop::collection::vec(prop::collection::vec(any::<bool>(), 1..6), 0..6),
    ) {
        let mut paths = ExploredPaths::new(3);
        for bits in &explored {
            paths.record(to_path(bits));
        }
        let state = to_path(&taken);
        let mutated = paths.mutate(&state);
        if mutated != state {
            prop_assert!(!paths.contains(&mutated.path()));
            prop_assert!(mutated.size() <= state.size());
        }
    }
}
