//! In-memory collaborators

use concolic_core::domain::{
    ExecutionFailure, ExecutionRunner, ProgramModel, Solver, SolverQuery, SolverResult, TypeHierarchy,
};
use concolic_core::features::concolic::{BasicBlock, Trace};
use concolic_core::features::descriptor::{DescriptorArena, DescriptorId, Parameters};
use concolic_core::features::state::{Literal, PredicateState};
use concolic_core::shared::models::{BlockId, ClassInfo, FieldInfo, MethodInfo, MethodRef, Visibility};
use concolic_core::Result;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Program model backed by plain maps
#[derive(Debug, Default, Clone)]
pub struct InMemoryProgram {
    methods: HashMap<MethodRef, MethodInfo>,
    blocks: HashMap<MethodRef, Vec<BasicBlock>>,
    states: HashMap<MethodRef, PredicateState>,
    classes: HashMap<String, ClassInfo>,
    fields: HashMap<(String, String), FieldInfo>,
    subtypes: HashMap<String, String>,
}

impl InMemoryProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, info: MethodInfo, blocks: Vec<BasicBlock>) -> Self {
        self.blocks.insert(info.method.clone(), blocks);
        self.methods.insert(info.method.clone(), info);
        self
    }

    /// Whole-body state handed to the inliner
    pub fn with_method_state(mut self, method: &MethodRef, state: PredicateState) -> Self {
        self.states.insert(method.clone(), state);
        self
    }

    pub fn with_class(mut self, name: &str, is_abstract: bool, visibility: Visibility) -> Self {
        self.classes.insert(
            name.to_string(),
            ClassInfo {
                name: name.to_string(),
                super_class: None,
                is_abstract,
                is_interface: false,
                visibility,
            },
        );
        self
    }

    pub fn with_subtype(mut self, class: &str, subtype: &str) -> Self {
        self.subtypes.insert(class.to_string(), subtype.to_string());
        self
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields
            .insert((field.class.clone(), field.name.clone()), field);
        self
    }
}

impl TypeHierarchy for InMemoryProgram {
    fn is_ancestor_of(&self, ancestor: &str, descendant: &str) -> bool {
        ancestor == descendant || self.subtypes.get(ancestor).map(String::as_str) == Some(descendant)
    }
}

impl ProgramModel for InMemoryProgram {
    fn method(&self, method: &MethodRef) -> Option<MethodInfo> {
        self.methods.get(method).cloned()
    }

    fn blocks(&self, method: &MethodRef) -> Vec<BlockId> {
        self.blocks
            .get(method)
            .map(|blocks| blocks.iter().map(|b| b.id).collect())
            .unwrap_or_default()
    }

    fn block(&self, method: &MethodRef, block: BlockId) -> Result<Option<BasicBlock>> {
        Ok(self
            .blocks
            .get(method)
            .and_then(|blocks| blocks.iter().find(|b| b.id == block).cloned()))
    }

    fn method_state(&self, method: &MethodRef) -> Result<Option<PredicateState>> {
        Ok(self.states.get(method).cloned())
    }

    fn class(&self, name: &str) -> Option<ClassInfo> {
        self.classes.get(name).cloned()
    }

    fn field(&self, class: &str, name: &str) -> Option<FieldInfo> {
        self.fields
            .get(&(class.to_string(), name.to_string()))
            .cloned()
    }

    fn concrete_subtype(&self, class: &str) -> Option<String> {
        self.subtypes.get(class).cloned()
    }
}

type Interpreter = dyn Fn(&[Literal]) -> Option<Trace> + Send + Sync;

/// Runner that "executes" a method by calling an interpreter closure on
/// the literal argument values
pub struct ScriptedRunner {
    method: MethodRef,
    seeds: Mutex<VecDeque<Vec<Literal>>>,
    interpret: Box<Interpreter>,
    concrete_runs: AtomicUsize,
    observed: Mutex<Vec<Vec<Literal>>>,
}

impl ScriptedRunner {
    pub fn new(
        method: MethodRef,
        seeds: Vec<Vec<Literal>>,
        interpret: impl Fn(&[Literal]) -> Option<Trace> + Send + Sync + 'static,
    ) -> Self {
        Self {
            method,
            seeds: Mutex::new(seeds.into()),
            interpret: Box::new(interpret),
            concrete_runs: AtomicUsize::new(0),
            observed: Mutex::new(Vec::new()),
        }
    }

    pub fn concrete_runs(&self) -> usize {
        self.concrete_runs.load(Ordering::SeqCst)
    }

    /// Argument values of every concrete run, in order
    pub fn observed_arguments(&self) -> Vec<Vec<Literal>> {
        self.observed.lock().clone()
    }

    fn run(&self, method: &MethodRef, args: &[Literal]) -> std::result::Result<Trace, ExecutionFailure> {
        if method != &self.method {
            return Err(ExecutionFailure(format!("no interpreter for {}", method)));
        }
        (self.interpret)(args).ok_or_else(|| ExecutionFailure("interpreter crashed".into()))
    }
}

impl ExecutionRunner for ScriptedRunner {
    fn run_concrete(
        &self,
        method: &MethodRef,
        arena: &DescriptorArena,
        parameters: &Parameters<DescriptorId>,
    ) -> std::result::Result<Trace, ExecutionFailure> {
        self.concrete_runs.fetch_add(1, Ordering::SeqCst);
        let args = parameters
            .arguments
            .iter()
            .map(|&id| {
                arena
                    .get(id)
                    .literal()
                    .cloned()
                    .ok_or_else(|| ExecutionFailure(format!("{} is not a constant", id)))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.observed.lock().push(args.clone());
        self.run(method, &args)
    }

    fn run_random(&self, method: &MethodRef) -> std::result::Result<Trace, ExecutionFailure> {
        let args = self
            .seeds
            .lock()
            .pop_front()
            .ok_or_else(|| ExecutionFailure("out of random seeds".into()))?;
        self.run(method, &args)
    }
}

type Script = dyn Fn(&SolverQuery) -> SolverResult + Send + Sync;

/// Solver answering from a closure over the query
pub struct ScriptedSolver {
    script: Box<Script>,
    queries: Mutex<Vec<SolverQuery>>,
}

impl ScriptedSolver {
    pub fn new(script: impl Fn(&SolverQuery) -> SolverResult + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<SolverQuery> {
        self.queries.lock().clone()
    }
}

impl Solver for ScriptedSolver {
    fn check(&self, query: &SolverQuery) -> SolverResult {
        self.queries.lock().push(query.clone());
        (self.script)(query)
    }
}
