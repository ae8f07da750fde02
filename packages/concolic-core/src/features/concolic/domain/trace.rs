//! Execution traces recorded by the instrumented runner

use crate::features::state::domain::Term;
use crate::shared::models::{BlockId, MethodRef};
use rustc_hash::FxHashSet;

/// One recorded action
///
/// Block events are emitted when control leaves the block, so the block's
/// own instructions (including calls) have already run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    MethodEntry {
        method: MethodRef,
    },
    MethodReturn {
        method: MethodRef,
        block: BlockId,
    },
    MethodThrow {
        method: MethodRef,
        block: BlockId,
        throwable: Term,
    },
    /// Emitted in the caller right before the callee runs; terms are
    /// caller-side values
    MethodCall {
        method: MethodRef,
        instance: Option<Term>,
        args: Vec<Term>,
        return_value: Option<Term>,
    },
    BlockJump {
        method: MethodRef,
        block: BlockId,
    },
    BlockBranch {
        method: MethodRef,
        block: BlockId,
    },
    BlockSwitch {
        method: MethodRef,
        block: BlockId,
    },
    StaticInitEntry {
        class: String,
    },
    StaticInitExit {
        class: String,
    },
}

impl TraceEvent {
    /// Block left by this event, if it is a block or exit event
    pub fn block(&self) -> Option<BlockId> {
        match self {
            TraceEvent::MethodReturn { block, .. }
            | TraceEvent::MethodThrow { block, .. }
            | TraceEvent::BlockJump { block, .. }
            | TraceEvent::BlockBranch { block, .. }
            | TraceEvent::BlockSwitch { block, .. } => Some(*block),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&MethodRef> {
        match self {
            TraceEvent::MethodEntry { method }
            | TraceEvent::MethodReturn { method, .. }
            | TraceEvent::MethodThrow { method, .. }
            | TraceEvent::MethodCall { method, .. }
            | TraceEvent::BlockJump { method, .. }
            | TraceEvent::BlockBranch { method, .. }
            | TraceEvent::BlockSwitch { method, .. } => Some(method),
            TraceEvent::StaticInitEntry { .. } | TraceEvent::StaticInitExit { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    pub events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new(events: Vec<TraceEvent>) -> Self {
        Self { events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Blocks of `method` this trace passed through
    pub fn visited_blocks(&self, method: &MethodRef) -> FxHashSet<BlockId> {
        self.events
            .iter()
            .filter(|event| event.method() == Some(method))
            .filter_map(TraceEvent::block)
            .collect()
    }
}
