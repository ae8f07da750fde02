//! Model → descriptor pipeline: reanimation, concretization and reduction

mod common;

use common::*;
use concolic_core::config::DescriptorConfig;
use concolic_core::domain::ModelValue;
use concolic_core::features::descriptor::{Concretizer, DescriptorKind, HeapModel, Reanimator};
use concolic_core::features::state::{Literal, PredicateState, PredicateType, TermFactory};
use concolic_core::shared::models::{IrType, MethodInfo, MethodRef, Visibility};
use concolic_core::ConcolicError;
use pretty_assertions::assert_eq;

fn node() -> IrType {
    IrType::class("Node")
}

fn list() -> IrType {
    IrType::class("List")
}

/// `void Node.link(List other)`
fn link_method() -> MethodInfo {
    MethodInfo {
        method: MethodRef::new("Node", "link", "(LList;)V"),
        arg_types: vec![list()],
        return_type: IrType::Void,
        is_static: false,
        is_abstract: false,
        is_native: false,
    }
}

fn program() -> InMemoryProgram {
    InMemoryProgram::new()
        .with_class("Node", false, Visibility::Public)
        .with_class("List", true, Visibility::Public)
        .with_class("ArrayList", false, Visibility::Public)
        .with_subtype("List", "ArrayList")
}

/// `this = Node { next = this, value = 0, count = 4 }`, `other = List { size = 0 }`
fn model() -> HeapModel {
    HeapModel::new()
        .with_value(TermFactory::this(node()), ModelValue::Ref(1))
        .with_value(TermFactory::argument(list(), 0), ModelValue::Ref(2))
        .with_object(
            1,
            "Node",
            vec![
                ("next".into(), node(), ModelValue::Ref(1)),
                ("value".into(), IrType::Int, ModelValue::Int(0)),
                ("count".into(), IrType::Int, ModelValue::Int(4)),
            ],
        )
        .with_object(2, "List", vec![("size".into(), IrType::Int, ModelValue::Int(0))])
}

#[test]
fn test_reanimate_concretize_reduce() {
    let program = program();
    let model = model();
    let (mut arena, params) = Reanimator::new(&model)
        .parameters(&link_method(), &PredicateState::empty())
        .unwrap();

    Concretizer::new(&program, Visibility::Public)
        .concrete_parameters(&mut arena, &params, &DescriptorConfig::default())
        .unwrap();

    let this = params.instance.unwrap();
    let other = params.arguments[0];
    assert_eq!(arena.ty(this), &node());
    assert_eq!(arena.ty(other), &IrType::class("ArrayList"));

    // Cycle survives, default-valued fields are pruned
    assert_eq!(arena.field(this, "next", &node()), Some(this));
    assert_eq!(arena.field(this, "value", &IrType::Int), None);
    let count = arena.field(this, "count", &IrType::Int).unwrap();
    assert_eq!(arena.get(count).literal(), Some(&Literal::Int(4)));
    assert_eq!(arena.field(other, "size", &IrType::Int), None);

    let name = arena.term(this).name().to_string();
    assert_eq!(
        arena.print(this),
        format!("{name} = Node {{\n    count: int = 4\n    next: Node = {name}\n}}")
    );
}

#[test]
fn test_reduce_can_be_disabled() {
    let program = program();
    let model = model();
    let (mut arena, params) = Reanimator::new(&model)
        .parameters(&link_method(), &PredicateState::empty())
        .unwrap();
    let config = DescriptorConfig {
        reduce: false,
        ..DescriptorConfig::default()
    };
    Concretizer::new(&program, Visibility::Public)
        .concrete_parameters(&mut arena, &params, &config)
        .unwrap();

    let this = params.instance.unwrap();
    assert!(arena.field(this, "value", &IrType::Int).is_some());
    assert!(arena.field(params.arguments[0], "size", &IrType::Int).is_some());
}

#[test]
fn test_unconstrained_argument_is_null() {
    let model = HeapModel::new().with_value(TermFactory::this(node()), ModelValue::Ref(1));
    let (arena, params) = Reanimator::new(&model)
        .parameters(&link_method(), &PredicateState::empty())
        .unwrap();

    assert_eq!(arena.get(params.arguments[0]).literal(), Some(&Literal::Null));
    let this = params.instance.unwrap();
    assert!(matches!(&arena.get(this).kind, DescriptorKind::Object { fields } if fields.is_empty()));
}

#[test]
fn test_abstract_without_subtype_fails() {
    let program = InMemoryProgram::new()
        .with_class("Node", false, Visibility::Public)
        .with_class("List", true, Visibility::Public);
    let model = model();
    let (mut arena, params) = Reanimator::new(&model)
        .parameters(&link_method(), &PredicateState::empty())
        .unwrap();

    let result = Concretizer::new(&program, Visibility::Public).concrete_parameters(
        &mut arena,
        &params,
        &DescriptorConfig::default(),
    );
    assert!(matches!(result, Err(ConcolicError::NoConcreteInstance { .. })));
}

#[test]
fn test_copy_is_structurally_equal_and_queryable() {
    let model = model();
    let (mut arena, params) = Reanimator::new(&model)
        .parameters(&link_method(), &PredicateState::empty())
        .unwrap();
    let this = params.instance.unwrap();

    let copy = arena.deep_copy(this);
    assert!(arena.structural_eq(this, copy));
    assert_eq!(arena.field(copy, "next", &node()), Some(copy));
    assert_eq!(arena.depth(this), arena.depth(copy));

    // Non-null axiom plus one requirement per field
    let query = arena.collect_query(copy);
    let kinds: Vec<PredicateType> = query.predicates().iter().map(|p| p.ptype()).collect();
    assert_eq!(
        kinds,
        vec![
            PredicateType::Axiom,
            PredicateType::Require,
            PredicateType::Require,
            PredicateType::Require,
        ]
    );
}
