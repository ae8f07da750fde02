//! Test case collection

use crate::domain::ports::{TestCase, TestCaseSink};
use crate::shared::models::MethodRef;
use parking_lot::Mutex;
use tracing::info;

/// Keeps every accepted test case in memory
#[derive(Default)]
pub struct CollectingSink {
    cases: Mutex<Vec<TestCase>>,
    emitted: Mutex<Vec<MethodRef>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cases.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.lock().is_empty()
    }

    /// Test cases generated for `method`
    pub fn cases_for(&self, method: &MethodRef) -> Vec<TestCase> {
        self.cases
            .lock()
            .iter()
            .filter(|case| &case.method == method)
            .cloned()
            .collect()
    }

    pub fn take(&self) -> Vec<TestCase> {
        std::mem::take(&mut *self.cases.lock())
    }

    /// Methods whose search has finished, in completion order
    pub fn emitted(&self) -> Vec<MethodRef> {
        self.emitted.lock().clone()
    }
}

impl TestCaseSink for CollectingSink {
    fn accept(&self, case: TestCase) {
        self.cases.lock().push(case);
    }

    fn emit(&self, method: &MethodRef) {
        let count = self.cases_for(method).len();
        info!(method = %method, tests = count, "Emitting test cases");
        self.emitted.lock().push(method.clone());
    }
}
