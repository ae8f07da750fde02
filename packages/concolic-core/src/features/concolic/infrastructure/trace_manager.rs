//! Block coverage shared across concurrently analyzed methods

use crate::domain::ports::{ProgramModel, TraceManager};
use crate::features::concolic::domain::Trace;
use crate::shared::models::{BlockId, MethodRef};
use dashmap::DashMap;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::trace;

/// A body is covered once every block the program model lists for the
/// method has been seen in some recorded trace
pub struct CoverageTraceManager {
    program: Arc<dyn ProgramModel>,
    covered: DashMap<MethodRef, FxHashSet<BlockId>>,
    traces: DashMap<MethodRef, usize>,
}

impl CoverageTraceManager {
    pub fn new(program: Arc<dyn ProgramModel>) -> Self {
        Self {
            program,
            covered: DashMap::new(),
            traces: DashMap::new(),
        }
    }

    pub fn covered_blocks(&self, method: &MethodRef) -> FxHashSet<BlockId> {
        self.covered
            .get(method)
            .map(|blocks| blocks.clone())
            .unwrap_or_default()
    }

    pub fn trace_count(&self, method: &MethodRef) -> usize {
        self.traces.get(method).map(|count| *count).unwrap_or(0)
    }

    /// Fraction of the method's blocks covered so far
    pub fn coverage(&self, method: &MethodRef) -> f64 {
        let blocks = self.program.blocks(method);
        if blocks.is_empty() {
            return 0.0;
        }
        let covered = self.covered_blocks(method);
        let hit = blocks.iter().filter(|block| covered.contains(block)).count();
        hit as f64 / blocks.len() as f64
    }
}

impl TraceManager for CoverageTraceManager {
    fn is_body_covered(&self, method: &MethodRef) -> bool {
        let blocks = self.program.blocks(method);
        if blocks.is_empty() {
            return false;
        }
        match self.covered.get(method) {
            Some(covered) => blocks.iter().all(|block| covered.contains(block)),
            None => false,
        }
    }

    fn record(&self, method: &MethodRef, trace: &Trace) {
        // Callees traced along the way count towards their own coverage
        let mut methods: FxHashSet<&MethodRef> = trace.events.iter().filter_map(|e| e.method()).collect();
        methods.insert(method);
        for traced in methods {
            let blocks = trace.visited_blocks(traced);
            if blocks.is_empty() {
                continue;
            }
            self.covered.entry(traced.clone()).or_default().extend(blocks);
        }
        *self.traces.entry(method.clone()).or_insert(0) += 1;
        trace!(method = %method, events = trace.len(), "Recorded trace");
    }
}
