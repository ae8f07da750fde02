//! Type concretization
//!
//! Replaces abstract, interface or visibility-restricted object types with
//! an instantiable subtype so code generation can construct every object.

use crate::config::DescriptorConfig;
use crate::domain::ports::ProgramModel;
use crate::errors::{ConcolicError, Result};
use crate::features::descriptor::domain::{DescriptorArena, DescriptorId, DescriptorKind, Parameters};
use crate::shared::models::{IrType, Visibility};
use rustc_hash::FxHashSet;
use tracing::debug;

pub struct Concretizer<'a> {
    program: &'a dyn ProgramModel,
    visibility: Visibility,
}

impl<'a> Concretizer<'a> {
    pub fn new(program: &'a dyn ProgramModel, visibility: Visibility) -> Self {
        Self {
            program,
            visibility,
        }
    }

    fn is_instantiable(&self, class: &str) -> bool {
        self.program
            .class(class)
            .map(|info| info.is_instantiable(self.visibility))
            .unwrap_or(false)
    }

    /// Instantiable type for `class`, which may be `class` itself
    ///
    /// Classes the program model does not know are left alone.
    fn concrete_class(&self, class: &str) -> Result<Option<String>> {
        if self.program.class(class).is_none() || self.is_instantiable(class) {
            return Ok(None);
        }
        match self.program.concrete_subtype(class) {
            Some(sub) if sub != class && self.is_instantiable(&sub) => Ok(Some(sub)),
            _ => Err(ConcolicError::no_concrete_instance(class)),
        }
    }

    /// Concretize every object reachable from `id`
    pub fn concretize(&self, arena: &mut DescriptorArena, id: DescriptorId) -> Result<()> {
        let mut visited = FxHashSet::default();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let node = arena.get(current);
            let class = match (&node.kind, node.ty.class_name()) {
                (DescriptorKind::Object { .. }, Some(class)) => Some(class.to_string()),
                _ => None,
            };
            if let Some(class) = class {
                if let Some(sub) = self.concrete_class(&class)? {
                    debug!(from = %class, to = %sub, "Concretized descriptor type");
                    arena.retype(current, IrType::class(sub));
                }
            }
            stack.extend(arena.get(current).children());
        }
        Ok(())
    }

    /// Drop static fields the generated test cannot assign
    pub fn filter_final_fields(&self, arena: &mut DescriptorArena, class_descriptor: DescriptorId) {
        let node = arena.get(class_descriptor);
        let (DescriptorKind::Class { fields }, Some(class)) = (&node.kind, node.ty.class_name()) else {
            return;
        };
        let finals: Vec<_> = fields
            .keys()
            .filter(|key| {
                self.program
                    .field(class, &key.name)
                    .map(|info| info.is_final)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        for key in finals {
            arena.remove_field(class_descriptor, &key);
        }
    }

    /// Concretize (and optionally reduce) every parameter of a test
    pub fn concrete_parameters(
        &self,
        arena: &mut DescriptorArena,
        parameters: &Parameters<DescriptorId>,
        config: &DescriptorConfig,
    ) -> Result<()> {
        for &id in parameters.all() {
            self.concretize(arena, id)?;
        }
        for &id in &parameters.statics {
            self.filter_final_fields(arena, id);
        }
        if config.reduce {
            for &id in parameters.all() {
                arena.reduce(id);
            }
        }
        Ok(())
    }
}
