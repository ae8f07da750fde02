//! Small programs the integration tests analyze

use super::builders::{InMemoryProgram, ScriptedRunner, ScriptedSolver};
use concolic_core::domain::{ModelValue, SolverResult};
use concolic_core::features::concolic::{BasicBlock, Terminator, Trace, TraceEvent};
use concolic_core::features::descriptor::HeapModel;
use concolic_core::features::state::{
    CmpOpcode, Literal, Predicate, PredicateKind, PredicateState, TermFactory,
};
use concolic_core::shared::models::{BlockId, IrType, MethodInfo, MethodRef};
use concolic_core::{EngineConfig, Preset, ValidatedConfig};
use std::sync::Arc;

pub fn fixture_config() -> ValidatedConfig {
    EngineConfig::preset(Preset::Balanced)
        .build()
        .expect("balanced preset is valid")
}

pub fn fixture_static_method(class: &str, name: &str, arg_types: Vec<IrType>, return_type: IrType) -> MethodInfo {
    MethodInfo {
        method: MethodRef::new(class, name, "(II)I"),
        arg_types,
        return_type,
        is_static: true,
        is_abstract: false,
        is_native: false,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// max(a, b)
// ═══════════════════════════════════════════════════════════════════════════

pub fn fixture_max_method() -> MethodInfo {
    fixture_static_method("Calc", "max", vec![IrType::Int, IrType::Int], IrType::Int)
}

/// `if (a > b) return a; else return b;`
pub fn fixture_max_program() -> InMemoryProgram {
    let a = TermFactory::argument(IrType::Int, 0);
    let b = TermFactory::argument(IrType::Int, 1);
    InMemoryProgram::new().with_method(
        fixture_max_method(),
        vec![
            BasicBlock::new(
                BlockId(0),
                Vec::new(),
                Terminator::Branch {
                    cond: TermFactory::cmp(CmpOpcode::Gt, a.clone(), b.clone()),
                    true_successor: BlockId(1),
                    false_successor: BlockId(2),
                },
            ),
            BasicBlock::new(BlockId(1), Vec::new(), Terminator::Return(Some(a))),
            BasicBlock::new(BlockId(2), Vec::new(), Terminator::Return(Some(b))),
        ],
    )
}

/// Trace a real run of `max` on `args` would record
pub fn fixture_max_trace(args: &[Literal]) -> Option<Trace> {
    let (Literal::Int(a), Literal::Int(b)) = (args.first()?, args.get(1)?) else {
        return None;
    };
    let method = fixture_max_method().method;
    let exit = if a > b { BlockId(1) } else { BlockId(2) };
    Some(Trace::new(vec![
        TraceEvent::MethodEntry {
            method: method.clone(),
        },
        TraceEvent::BlockBranch {
            method: method.clone(),
            block: BlockId(0),
        },
        TraceEvent::MethodReturn { method, block: exit },
    ]))
}

pub fn fixture_max_runner(seeds: Vec<Vec<Literal>>) -> Arc<ScriptedRunner> {
    Arc::new(ScriptedRunner::new(
        fixture_max_method().method,
        seeds,
        fixture_max_trace,
    ))
}

/// Solves `(a > b) = v`: `a=1, b=0` when taken, `a=0, b=1` otherwise
pub fn fixture_max_solver() -> Arc<ScriptedSolver> {
    Arc::new(ScriptedSolver::new(|query| {
        let taken = query.query.predicates().iter().find_map(|p| match p.kind() {
            PredicateKind::Equality { rhv, .. } => match rhv.as_literal() {
                Some(Literal::Bool(v)) => Some(*v),
                _ => None,
            },
            _ => None,
        });
        let Some(taken) = taken else {
            return SolverResult::Unknown("no branch condition in query".into());
        };
        let (a, b) = if taken { (1, 0) } else { (0, 1) };
        let model = HeapModel::new()
            .with_value(TermFactory::argument(IrType::Int, 0), ModelValue::Int(a))
            .with_value(TermFactory::argument(IrType::Int, 1), ModelValue::Int(b));
        SolverResult::Sat(Arc::new(model))
    }))
}

// ═══════════════════════════════════════════════════════════════════════════
// Inlining
// ═══════════════════════════════════════════════════════════════════════════

/// `static boolean isNull(Node n) { return n == null; }` as a whole-body state
pub fn fixture_is_null(program: InMemoryProgram) -> (InMemoryProgram, MethodInfo) {
    let node = IrType::class("Node");
    let info = MethodInfo {
        method: MethodRef::new("Util", "isNull", "(LNode;)Z"),
        arg_types: vec![node.clone()],
        return_type: IrType::Bool,
        is_static: true,
        is_abstract: false,
        is_native: false,
    };
    let n = TermFactory::argument(node, 0);
    let retval = TermFactory::return_value(IrType::Bool, info.method.clone());
    let body = PredicateState::basic(vec![Predicate::state(PredicateKind::equality(
        retval,
        TermFactory::cmp(CmpOpcode::Eq, n, TermFactory::null()),
    ))]);
    let program = program
        .with_method(info.clone(), Vec::new())
        .with_method_state(&info.method, body);
    (program, info)
}
