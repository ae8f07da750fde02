//! Trace replay
//!
//! Turns a recorded trace into the predicate state of the path it took by
//! simulating the call stack:
//! - every traced frame except the target's own is renamed with a
//!   `frame{n}` suffix, its formals bound to the caller's actuals
//! - each block contributes its phi bindings (against the previous block),
//!   its body, and a Path predicate for the successor actually taken
//! - a call whose callee was traced is replaced by the callee's replayed
//!   body, the return value bound to the caller's result term
//!
//! A call event pairs with the next nested method entry. The entered method
//! may be an override of the one named at the call site, so traced bodies
//! are keyed by the call site and matched against call predicates in call
//! order. Traced bodies no call predicate of the block claims are dropped
//! once the block is replayed.

use crate::domain::ports::ProgramModel;
use crate::errors::{ConcolicError, Result};
use crate::features::concolic::domain::{BasicBlock, Terminator, Trace, TraceEvent};
use crate::features::state::domain::{
    Predicate, PredicateKind, PredicateState, StateBuilder, Term, TermFactory, TermKind,
};
use crate::features::transformer::domain::Transformer;
use crate::features::transformer::infrastructure::TermRenamer;
use crate::shared::models::{BlockId, IrType, MethodRef};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::trace;

/// Call observed in the caller, terms already in the caller's names
#[derive(Debug, Clone)]
struct PendingCall {
    method: MethodRef,
    instance: Option<Term>,
    args: Vec<Term>,
    return_value: Option<Term>,
}

#[derive(Debug, Clone)]
struct TracedCall {
    /// Method named at the call site, or the entered method when the entry
    /// had no matching call event
    call_site: MethodRef,
    state: PredicateState,
}

/// Whether a call naming `call_site` can enter `entered` at run time
fn dispatches_to(program: &dyn ProgramModel, call_site: &MethodRef, entered: &MethodRef) -> bool {
    call_site == entered
        || (call_site.name == entered.name
            && (call_site.descriptor == entered.descriptor
                || program.is_ancestor_of(&call_site.class, &entered.class)))
}

struct Frame {
    method: MethodRef,
    /// `None` for the target method, whose terms keep their names
    renamer: Option<TermRenamer>,
    builder: StateBuilder,
    prev: Option<BlockId>,
    /// Caller-side term receiving this frame's return value
    result: Option<Term>,
    /// Method named by the caller's matching call event
    call_site: Option<MethodRef>,
    pending_call: Option<PendingCall>,
    traced_calls: VecDeque<TracedCall>,
}

impl Frame {
    fn new(method: MethodRef, renamer: Option<TermRenamer>, result: Option<Term>) -> Self {
        Self {
            method,
            renamer,
            builder: StateBuilder::new(),
            prev: None,
            result,
            call_site: None,
            pending_call: None,
            traced_calls: VecDeque::new(),
        }
    }

    fn rename(&mut self, term: &Term) -> Term {
        match &mut self.renamer {
            Some(renamer) => renamer.transform_term(term),
            None => term.clone(),
        }
    }

    fn rename_predicate(&mut self, predicate: &Predicate) -> Predicate {
        match &mut self.renamer {
            Some(renamer) => predicate.map_operands(|term| renamer.transform_term(term)),
            None => predicate.clone(),
        }
    }

    /// Traced body for a call predicate, skipping traced calls the block
    /// never names
    fn take_traced_call(&mut self, program: &dyn ProgramModel, predicate: &Predicate) -> Option<PredicateState> {
        let PredicateKind::Call { call, .. } = predicate.kind() else {
            return None;
        };
        let TermKind::Call { method, .. } = call.kind() else {
            return None;
        };
        let position = self
            .traced_calls
            .iter()
            .position(|traced| dispatches_to(program, method, &traced.call_site))?;
        for skipped in self.traced_calls.drain(..position) {
            trace!(call = %skipped.call_site, "Dropping unmatched traced call");
        }
        self.traced_calls.pop_front().map(|traced| traced.state)
    }

    fn flush_traced_calls(&mut self) {
        for skipped in self.traced_calls.drain(..) {
            trace!(call = %skipped.call_site, "Dropping unmatched traced call");
        }
    }
}

pub struct TraceStateBuilder<'a> {
    program: &'a dyn ProgramModel,
}

impl<'a> TraceStateBuilder<'a> {
    pub fn new(program: &'a dyn ProgramModel) -> Self {
        Self { program }
    }

    /// Symbolic state of the path `trace` took through `target`
    pub fn build(&self, target: &MethodRef, trace: &Trace) -> Result<PredicateState> {
        let events = Self::relevant_events(target, trace);
        let mut frames: Vec<Frame> = Vec::new();
        let mut frame_counter = 0usize;

        for (index, event) in events.iter().enumerate() {
            match event {
                TraceEvent::MethodEntry { method } => {
                    let frame = match frames.last_mut() {
                        None => Frame::new(method.clone(), None, None),
                        Some(parent) => {
                            let call = parent
                                .pending_call
                                .take()
                                .filter(|c| dispatches_to(self.program, &c.method, method));
                            frame_counter += 1;
                            self.nested_frame(method, call, frame_counter)
                        }
                    };
                    frames.push(frame);
                }
                TraceEvent::MethodCall {
                    method,
                    instance,
                    args,
                    return_value,
                } => {
                    if let Some(frame) = frames.last_mut() {
                        let call = PendingCall {
                            method: method.clone(),
                            instance: instance.as_ref().map(|t| frame.rename(t)),
                            args: args.iter().map(|t| frame.rename(t)).collect(),
                            return_value: return_value.as_ref().map(|t| frame.rename(t)),
                        };
                        frame.pending_call = Some(call);
                    }
                }
                TraceEvent::BlockJump { method, block }
                | TraceEvent::BlockBranch { method, block }
                | TraceEvent::BlockSwitch { method, block } => {
                    let Some(frame) = frames.last_mut() else {
                        continue;
                    };
                    let next = Self::next_block_in_frame(&events, index);
                    self.replay_block(frame, method, *block, next)?;
                    frame.prev = Some(*block);
                }
                TraceEvent::MethodReturn { method, block } | TraceEvent::MethodThrow { method, block, .. } => {
                    let Some(mut frame) = frames.pop() else {
                        continue;
                    };
                    let returned = self.replay_block(&mut frame, method, *block, None)?;
                    if matches!(event, TraceEvent::MethodReturn { .. }) {
                        if let Some(value) = returned {
                            self.bind_return(&mut frame, frames.is_empty(), value);
                        }
                    }
                    let state = frame.builder.apply();
                    match frames.last_mut() {
                        Some(parent) => parent.traced_calls.push_back(TracedCall {
                            call_site: frame.call_site.unwrap_or(frame.method),
                            state,
                        }),
                        None => return Ok(state.simplify()),
                    }
                }
                TraceEvent::StaticInitEntry { .. } | TraceEvent::StaticInitExit { .. } => {}
            }
        }

        // Truncated trace: fold unfinished frames into their callers
        let mut state = PredicateState::empty();
        while let Some(frame) = frames.pop() {
            state = frame.builder.apply().concat(&state);
        }
        Ok(state.simplify())
    }

    /// Drops static-initializer activity and everything before the
    /// target's first entry
    fn relevant_events(target: &MethodRef, trace: &Trace) -> Vec<TraceEvent> {
        let mut static_level = 0usize;
        trace
            .events
            .iter()
            .filter(|event| match event {
                TraceEvent::StaticInitEntry { .. } => {
                    static_level += 1;
                    false
                }
                TraceEvent::StaticInitExit { .. } => {
                    static_level = static_level.saturating_sub(1);
                    false
                }
                _ => static_level == 0,
            })
            .skip_while(|event| !matches!(event, TraceEvent::MethodEntry { method } if method == target))
            .cloned()
            .collect()
    }

    /// Block the current frame leaves next, skipping nested calls
    fn next_block_in_frame(events: &[TraceEvent], index: usize) -> Option<BlockId> {
        let mut depth = 0usize;
        for event in &events[index + 1..] {
            match event {
                TraceEvent::MethodEntry { .. } => depth += 1,
                TraceEvent::MethodReturn { .. } | TraceEvent::MethodThrow { .. } if depth > 0 => {
                    depth -= 1
                }
                _ if depth == 0 => {
                    if let Some(block) = event.block() {
                        return Some(block);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn nested_frame(&self, method: &MethodRef, call: Option<PendingCall>, counter: usize) -> Frame {
        let mut mappings = FxHashMap::default();
        let mut result = None;
        let mut call_site = None;
        if let Some(call) = call {
            let declared = self.program.method(method).map(|info| info.arg_types);
            if let Some(instance) = call.instance {
                mappings.insert(TermFactory::this(IrType::class(method.class.clone())), instance);
            }
            for (index, actual) in call.args.into_iter().enumerate() {
                let ty = declared
                    .as_ref()
                    .and_then(|types| types.get(index).cloned())
                    .unwrap_or_else(|| actual.ty().clone());
                mappings.insert(TermFactory::argument(ty, index), actual);
            }
            result = call.return_value;
            call_site = Some(call.method);
        }
        let renamer = TermRenamer::new(format!("frame{}", counter), mappings);
        let mut frame = Frame::new(method.clone(), Some(renamer), result);
        frame.call_site = call_site;
        frame
    }

    /// Replays one block into `frame`, returning the (renamed) value of a
    /// `return` terminator
    fn replay_block(
        &self,
        frame: &mut Frame,
        method: &MethodRef,
        id: BlockId,
        next: Option<BlockId>,
    ) -> Result<Option<Term>> {
        if &frame.method != method {
            return Err(ConcolicError::Execution(format!(
                "trace leaves {} of {} inside a frame of {}",
                id, method, frame.method
            )));
        }
        let block = self
            .program
            .block(method, id)?
            .ok_or_else(|| ConcolicError::program_model(format!("unknown block {} of {}", id, method)))?;
        trace!(method = %method, block = %id, next = ?next, "Replaying block");

        if let Some(prev) = frame.prev {
            for phi in &block.phis {
                if let Some(value) = phi.incoming(prev) {
                    let lhv = frame.rename(&phi.lhv);
                    let rhv = frame.rename(value);
                    frame.builder.state(PredicateKind::equality(lhv, rhv));
                }
            }
        }

        for predicate in &block.body {
            match frame.take_traced_call(self.program, predicate) {
                Some(body) => {
                    frame.builder.append(&body);
                }
                None => {
                    let renamed = frame.rename_predicate(predicate);
                    frame.builder.push(renamed);
                }
            }
        }
        frame.flush_traced_calls();

        self.replay_terminator(frame, &block, next)
    }

    fn replay_terminator(
        &self,
        frame: &mut Frame,
        block: &BasicBlock,
        next: Option<BlockId>,
    ) -> Result<Option<Term>> {
        match &block.terminator {
            Terminator::Branch {
                cond,
                true_successor,
                false_successor,
            } if true_successor != false_successor => {
                let taken = match next {
                    Some(n) if n == *true_successor => Some(true),
                    Some(n) if n == *false_successor => Some(false),
                    _ => None,
                };
                if let Some(taken) = taken {
                    let cond = frame.rename(cond);
                    frame
                        .builder
                        .path(PredicateKind::equality(cond, TermFactory::bool(taken)));
                }
                Ok(None)
            }
            Terminator::Switch {
                key,
                branches,
                default,
            } => {
                let Some(next) = next else {
                    return Ok(None);
                };
                let key = frame.rename(key);
                if let Some((value, _)) = branches.iter().find(|(_, target)| *target == next) {
                    frame
                        .builder
                        .path(PredicateKind::equality(key, value.clone()));
                } else if next == *default {
                    for (value, _) in branches {
                        frame
                            .builder
                            .path(PredicateKind::inequality(key.clone(), value.clone()));
                    }
                }
                Ok(None)
            }
            Terminator::Return(Some(value)) => Ok(Some(frame.rename(value))),
            _ => Ok(None),
        }
    }

    fn bind_return(&self, frame: &mut Frame, is_target: bool, value: Term) {
        let lhv = if is_target {
            let ty = self
                .program
                .method(&frame.method)
                .map(|info| info.return_type)
                .unwrap_or_else(|| value.ty().clone());
            Some(TermFactory::return_value(ty, frame.method.clone()))
        } else {
            frame.result.clone()
        };
        if let Some(lhv) = lhv {
            frame.builder.state(PredicateKind::equality(lhv, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::TypeHierarchy;
    use crate::features::state::domain::{BinaryOpcode, CmpOpcode, PredicateType};
    use crate::shared::models::{ClassInfo, FieldInfo, MethodInfo};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Blocks {
        methods: FxHashMap<MethodRef, MethodInfo>,
        blocks: FxHashMap<(MethodRef, BlockId), BasicBlock>,
    }

    impl Blocks {
        fn method(mut self, info: MethodInfo, blocks: Vec<BasicBlock>) -> Self {
            for block in blocks {
                self.blocks.insert((info.method.clone(), block.id), block);
            }
            self.methods.insert(info.method.clone(), info);
            self
        }
    }

    impl TypeHierarchy for Blocks {
        fn is_ancestor_of(&self, ancestor: &str, descendant: &str) -> bool {
            ancestor == descendant
        }
    }

    impl ProgramModel for Blocks {
        fn method(&self, method: &MethodRef) -> Option<MethodInfo> {
            self.methods.get(method).cloned()
        }
        fn blocks(&self, method: &MethodRef) -> Vec<BlockId> {
            let mut ids: Vec<_> = self
                .blocks
                .keys()
                .filter(|(m, _)| m == method)
                .map(|(_, id)| *id)
                .collect();
            ids.sort();
            ids
        }
        fn block(&self, method: &MethodRef, block: BlockId) -> Result<Option<BasicBlock>> {
            Ok(self.blocks.get(&(method.clone(), block)).cloned())
        }
        fn method_state(&self, _method: &MethodRef) -> Result<Option<PredicateState>> {
            Ok(None)
        }
        fn class(&self, _name: &str) -> Option<ClassInfo> {
            None
        }
        fn field(&self, _class: &str, _name: &str) -> Option<FieldInfo> {
            None
        }
        fn concrete_subtype(&self, _class: &str) -> Option<String> {
            None
        }
    }

    fn static_method(name: &str, arg_types: Vec<IrType>) -> MethodInfo {
        MethodInfo {
            method: MethodRef::new("Calc", name, "(II)I"),
            arg_types,
            return_type: IrType::Int,
            is_static: true,
            is_abstract: false,
            is_native: false,
        }
    }

    fn max_program() -> (Blocks, MethodRef) {
        let info = static_method("max", vec![IrType::Int, IrType::Int]);
        let a = TermFactory::argument(IrType::Int, 0);
        let b = TermFactory::argument(IrType::Int, 1);
        let method = info.method.clone();
        let program = Blocks::default().method(
            info,
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
        );
        (program, method)
    }

    #[test]
    fn test_branch_direction_comes_from_next_block() {
        let (program, max) = max_program();
        let trace = Trace::new(vec![
            TraceEvent::MethodEntry { method: max.clone() },
            TraceEvent::BlockBranch {
                method: max.clone(),
                block: BlockId(0),
            },
            TraceEvent::MethodReturn {
                method: max.clone(),
                block: BlockId(2),
            },
        ]);
        let state = TraceStateBuilder::new(&program).build(&max, &trace).unwrap();
        let rendered: Vec<String> = state.predicates().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "@P (arg$0 > arg$1) = false".to_string(),
                "@S <retval>@Calc.max(II)I = arg$1".to_string(),
            ]
        );
    }

    #[test]
    fn test_static_init_and_prefix_are_dropped() {
        let (program, max) = max_program();
        let trace = Trace::new(vec![
            TraceEvent::BlockJump {
                method: MethodRef::new("Main", "main", "()V"),
                block: BlockId(9),
            },
            TraceEvent::MethodEntry { method: max.clone() },
            TraceEvent::StaticInitEntry { class: "Calc".into() },
            TraceEvent::BlockJump {
                method: MethodRef::new("Calc", "<clinit>", "()V"),
                block: BlockId(0),
            },
            TraceEvent::StaticInitExit { class: "Calc".into() },
            TraceEvent::BlockBranch {
                method: max.clone(),
                block: BlockId(0),
            },
            TraceEvent::MethodReturn {
                method: max.clone(),
                block: BlockId(1),
            },
        ]);
        let state = TraceStateBuilder::new(&program).build(&max, &trace).unwrap();
        let path = state.path();
        assert_eq!(path.size(), 1);
        assert_eq!(path.predicates()[0].to_string(), "@P (arg$0 > arg$1) = true");
    }

    #[test]
    fn test_traced_callee_replaces_call_predicate() {
        let inc = static_method("inc", vec![IrType::Int]);
        let f = static_method("f", vec![IrType::Int]);
        let x = TermFactory::argument(IrType::Int, 0);
        let r = TermFactory::value(IrType::Int, "r");
        let call = TermFactory::call(
            IrType::Int,
            TermFactory::static_class_ref(IrType::class("Calc")),
            inc.method.clone(),
            vec![x.clone()],
        );
        let program = Blocks::default()
            .method(
                inc.clone(),
                vec![BasicBlock::new(
                    BlockId(0),
                    Vec::new(),
                    Terminator::Return(Some(TermFactory::binary(
                        IrType::Int,
                        BinaryOpcode::Add,
                        x.clone(),
                        TermFactory::int(1),
                    ))),
                )],
            )
            .method(
                f.clone(),
                vec![BasicBlock::new(
                    BlockId(0),
                    vec![Predicate::state(PredicateKind::call(Some(r.clone()), call))],
                    Terminator::Return(Some(r.clone())),
                )],
            );

        let trace = Trace::new(vec![
            TraceEvent::MethodEntry {
                method: f.method.clone(),
            },
            TraceEvent::MethodCall {
                method: inc.method.clone(),
                instance: None,
                args: vec![x.clone()],
                return_value: Some(r.clone()),
            },
            TraceEvent::MethodEntry {
                method: inc.method.clone(),
            },
            TraceEvent::MethodReturn {
                method: inc.method.clone(),
                block: BlockId(0),
            },
            TraceEvent::MethodReturn {
                method: f.method.clone(),
                block: BlockId(0),
            },
        ]);
        let state = TraceStateBuilder::new(&program).build(&f.method, &trace).unwrap();
        let rendered: Vec<String> = state.predicates().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "@S r = (arg$0 + 1)".to_string(),
                "@S <retval>@Calc.f(II)I = r".to_string(),
            ]
        );
    }

    /// `Calc.inc`: `arg$0 > 0 ? arg$0 + 1 : 0`
    fn branching_inc() -> (MethodInfo, Vec<BasicBlock>) {
        let x = TermFactory::argument(IrType::Int, 0);
        let blocks = vec![
            BasicBlock::new(
                BlockId(0),
                Vec::new(),
                Terminator::Branch {
                    cond: TermFactory::cmp(CmpOpcode::Gt, x.clone(), TermFactory::int(0)),
                    true_successor: BlockId(1),
                    false_successor: BlockId(2),
                },
            ),
            BasicBlock::new(
                BlockId(1),
                Vec::new(),
                Terminator::Return(Some(TermFactory::binary(
                    IrType::Int,
                    BinaryOpcode::Add,
                    x,
                    TermFactory::int(1),
                ))),
            ),
            BasicBlock::new(BlockId(2), Vec::new(), Terminator::Return(Some(TermFactory::int(0)))),
        ];
        (static_method("inc", vec![IrType::Int]), blocks)
    }

    fn static_call(method: &MethodRef, arg: Term) -> Term {
        TermFactory::call(
            IrType::Int,
            TermFactory::static_class_ref(IrType::class("Calc")),
            method.clone(),
            vec![arg],
        )
    }

    fn traced_inc(inc: &MethodRef, arg: Term, result: Term) -> Vec<TraceEvent> {
        vec![
            TraceEvent::MethodCall {
                method: inc.clone(),
                instance: None,
                args: vec![arg],
                return_value: Some(result),
            },
            TraceEvent::MethodEntry { method: inc.clone() },
            TraceEvent::BlockBranch {
                method: inc.clone(),
                block: BlockId(0),
            },
            TraceEvent::MethodReturn {
                method: inc.clone(),
                block: BlockId(1),
            },
        ]
    }

    fn rendered(state: &PredicateState) -> Vec<String> {
        state.predicates().iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_overriding_callee_binds_and_keeps_later_paths() {
        let (inc, inc_blocks) = branching_inc();
        let f = static_method("f", vec![IrType::Int]);
        let base_get = MethodRef::new("Base", "get", "(I)I");
        let impl_get = MethodInfo {
            method: MethodRef::new("Impl", "get", "(I)I"),
            arg_types: vec![IrType::Int],
            return_type: IrType::Int,
            is_static: false,
            is_abstract: false,
            is_native: false,
        };
        let x = TermFactory::argument(IrType::Int, 0);
        let receiver = TermFactory::value(IrType::class("Base"), "o");
        let got = TermFactory::value(IrType::Int, "g");
        let r = TermFactory::value(IrType::Int, "r");
        let program = Blocks::default()
            .method(
                impl_get.clone(),
                vec![BasicBlock::new(
                    BlockId(0),
                    Vec::new(),
                    Terminator::Return(Some(x.clone())),
                )],
            )
            .method(inc.clone(), inc_blocks)
            .method(
                f.clone(),
                vec![BasicBlock::new(
                    BlockId(0),
                    vec![
                        Predicate::state(PredicateKind::call(
                            Some(got.clone()),
                            TermFactory::call(IrType::Int, receiver.clone(), base_get.clone(), vec![x.clone()]),
                        )),
                        Predicate::state(PredicateKind::call(Some(r.clone()), static_call(&inc.method, x.clone()))),
                    ],
                    Terminator::Return(Some(r.clone())),
                )],
            );

        let mut events = vec![
            TraceEvent::MethodEntry {
                method: f.method.clone(),
            },
            TraceEvent::MethodCall {
                method: base_get,
                instance: Some(receiver),
                args: vec![x.clone()],
                return_value: Some(got),
            },
            TraceEvent::MethodEntry {
                method: impl_get.method.clone(),
            },
            TraceEvent::MethodReturn {
                method: impl_get.method.clone(),
                block: BlockId(0),
            },
        ];
        events.extend(traced_inc(&inc.method, x, r));
        events.push(TraceEvent::MethodReturn {
            method: f.method.clone(),
            block: BlockId(0),
        });

        let state = TraceStateBuilder::new(&program)
            .build(&f.method, &Trace::new(events))
            .unwrap();
        assert_eq!(state.path().size(), 1);
        assert_eq!(
            rendered(&state),
            vec![
                "@S g = arg$0".to_string(),
                "@P (arg$0 > 0) = true".to_string(),
                "@S r = (arg$0 + 1)".to_string(),
                "@S <retval>@Calc.f(II)I = r".to_string(),
            ]
        );
    }

    #[test]
    fn test_unclaimed_traced_callee_does_not_block_later_calls() {
        let (inc, inc_blocks) = branching_inc();
        let hook = static_method("hook", Vec::new());
        let f = static_method("f", vec![IrType::Int]);
        let x = TermFactory::argument(IrType::Int, 0);
        let first = TermFactory::value(IrType::Int, "a");
        let second = TermFactory::value(IrType::Int, "b");
        let program = Blocks::default()
            .method(
                hook.clone(),
                vec![BasicBlock::new(BlockId(0), Vec::new(), Terminator::Return(None))],
            )
            .method(inc.clone(), inc_blocks)
            .method(
                f.clone(),
                vec![BasicBlock::new(
                    BlockId(0),
                    vec![
                        Predicate::state(PredicateKind::call(
                            Some(first.clone()),
                            static_call(&inc.method, x.clone()),
                        )),
                        Predicate::state(PredicateKind::call(
                            Some(second.clone()),
                            static_call(&inc.method, first.clone()),
                        )),
                    ],
                    Terminator::Return(Some(second.clone())),
                )],
            );

        let mut events = vec![
            TraceEvent::MethodEntry {
                method: f.method.clone(),
            },
            TraceEvent::MethodEntry {
                method: hook.method.clone(),
            },
            TraceEvent::MethodReturn {
                method: hook.method.clone(),
                block: BlockId(0),
            },
        ];
        events.extend(traced_inc(&inc.method, x, first.clone()));
        events.extend(traced_inc(&inc.method, first, second));
        events.push(TraceEvent::MethodReturn {
            method: f.method.clone(),
            block: BlockId(0),
        });

        let state = TraceStateBuilder::new(&program)
            .build(&f.method, &Trace::new(events))
            .unwrap();
        assert_eq!(state.path().size(), 2);
        assert_eq!(
            rendered(&state),
            vec![
                "@P (arg$0 > 0) = true".to_string(),
                "@S a = (arg$0 + 1)".to_string(),
                "@P (a > 0) = true".to_string(),
                "@S b = (a + 1)".to_string(),
                "@S <retval>@Calc.f(II)I = b".to_string(),
            ]
        );
    }

    #[test]
    fn test_phi_resolves_against_previous_block() {
        let info = static_method("pick", vec![IrType::Bool]);
        let method = info.method.clone();
        let flag = TermFactory::argument(IrType::Bool, 0);
        let v = TermFactory::value(IrType::Int, "v");
        let program = Blocks::default().method(
            info,
            vec![
                BasicBlock::new(
                    BlockId(0),
                    Vec::new(),
                    Terminator::Branch {
                        cond: flag,
                        true_successor: BlockId(1),
                        false_successor: BlockId(2),
                    },
                ),
                BasicBlock::new(BlockId(1), Vec::new(), Terminator::Jump(BlockId(3))),
                BasicBlock::new(BlockId(2), Vec::new(), Terminator::Jump(BlockId(3))),
                BasicBlock::new(BlockId(3), Vec::new(), Terminator::Return(Some(v.clone()))).with_phi(
                    crate::features::concolic::domain::PhiNode {
                        lhv: v,
                        incomings: vec![(BlockId(1), TermFactory::int(10)), (BlockId(2), TermFactory::int(20))],
                    },
                ),
            ],
        );
        let trace = Trace::new(vec![
            TraceEvent::MethodEntry { method: method.clone() },
            TraceEvent::BlockBranch {
                method: method.clone(),
                block: BlockId(0),
            },
            TraceEvent::BlockJump {
                method: method.clone(),
                block: BlockId(2),
            },
            TraceEvent::MethodReturn {
                method: method.clone(),
                block: BlockId(3),
            },
        ]);
        let state = TraceStateBuilder::new(&program).build(&method, &trace).unwrap();
        let states: Vec<String> = state
            .filter_by_type(PredicateType::State)
            .predicates()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(states[0], "@S v = 20");
    }

    #[test]
    fn test_unknown_block_is_program_model_error() {
        let (program, max) = max_program();
        let trace = Trace::new(vec![
            TraceEvent::MethodEntry { method: max.clone() },
            TraceEvent::BlockJump {
                method: max.clone(),
                block: BlockId(42),
            },
        ]);
        let result = TraceStateBuilder::new(&program).build(&max, &trace);
        assert!(matches!(result, Err(ConcolicError::ProgramModel(_))));
    }
}
