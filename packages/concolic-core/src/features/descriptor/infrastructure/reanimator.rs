//! Model reanimation
//!
//! Rebuilds concrete descriptors from a solver model. Heap objects are
//! memoized by address, so aliasing and cycles in the model survive as
//! shared handles in the arena.

use crate::domain::ports::{Model, ModelValue};
use crate::errors::{ConcolicError, Result};
use crate::features::descriptor::domain::{DescriptorArena, DescriptorId, Parameters};
use crate::features::state::domain::{Literal, PredicateState, Term, TermFactory, TermKind};
use crate::features::transformer::infrastructure::collect_terms;
use crate::shared::models::{IrType, MethodInfo};
use rustc_hash::FxHashMap;
use tracing::trace;

pub struct Reanimator<'a> {
    model: &'a dyn Model,
    arena: DescriptorArena,
    memo: FxHashMap<u64, DescriptorId>,
}

impl<'a> Reanimator<'a> {
    pub fn new(model: &'a dyn Model) -> Self {
        Self {
            model,
            arena: DescriptorArena::new(),
            memo: FxHashMap::default(),
        }
    }

    pub fn arena(&self) -> &DescriptorArena {
        &self.arena
    }

    pub fn finish(self) -> DescriptorArena {
        self.arena
    }

    /// Descriptor of the value the model assigns to `term`
    ///
    /// Terms the model leaves unconstrained get their type's default.
    pub fn term(&mut self, term: &Term) -> Result<DescriptorId> {
        match self.model.evaluate(term) {
            Some(value) => self.value(value, term.ty()),
            None => Ok(self.arena.default_descriptor(term.ty(), true)),
        }
    }

    /// Descriptor of a model value stored in a slot of type `ty`
    pub fn value(&mut self, value: ModelValue, ty: &IrType) -> Result<DescriptorId> {
        if let ModelValue::Ref(address) = value {
            return self.heap(address, ty);
        }
        let literal = Self::literal(value, ty).ok_or_else(|| {
            ConcolicError::reanimation(format!("cannot read {} as {}", value, ty))
        })?;
        Ok(self.arena.constant(literal))
    }

    fn literal(value: ModelValue, ty: &IrType) -> Option<Literal> {
        let integral = match value {
            ModelValue::Bool(v) => Some(i64::from(v)),
            ModelValue::Int(v) => Some(v),
            ModelValue::Float(v) => Some(v as i64),
            ModelValue::Null | ModelValue::Ref(_) => None,
        };
        let real = match value {
            ModelValue::Bool(v) => Some(f64::from(u8::from(v))),
            ModelValue::Int(v) => Some(v as f64),
            ModelValue::Float(v) => Some(v),
            ModelValue::Null | ModelValue::Ref(_) => None,
        };
        Some(match ty {
            IrType::Bool => Literal::Bool(integral? != 0),
            IrType::Byte => Literal::Byte(integral? as i8),
            IrType::Char => Literal::Char(integral? as u16),
            IrType::Short => Literal::Short(integral? as i16),
            IrType::Int => Literal::Int(integral? as i32),
            IrType::Long => Literal::Long(integral?),
            IrType::Float => Literal::Float(real? as f32),
            IrType::Double => Literal::Double(real?),
            ty if ty.is_pointer() && value == ModelValue::Null => Literal::Null,
            _ => return None,
        })
    }

    fn heap(&mut self, address: u64, declared: &IrType) -> Result<DescriptorId> {
        if let Some(&id) = self.memo.get(&address) {
            return Ok(id);
        }
        let dynamic = self.model.object_type(address).unwrap_or_else(|| declared.clone());
        trace!(address, ty = %dynamic, "Reanimating heap value");
        match dynamic {
            IrType::Array(element) => {
                let length = self.model.array_length(address).unwrap_or(0);
                let id = self.arena.array((*element).clone(), length);
                self.memo.insert(address, id);
                for (index, value) in self.model.elements(address) {
                    let child = self.value(value, &element)?;
                    self.arena.set_element(id, index, child);
                }
                Ok(id)
            }
            IrType::Class(name) => {
                let id = self.arena.object(name);
                self.memo.insert(address, id);
                for (field, ty, value) in self.model.fields(address) {
                    let child = self.value(value, &ty)?;
                    self.arena.set_field(id, field, ty, child);
                }
                Ok(id)
            }
            other => Err(ConcolicError::reanimation(format!(
                "address {:#x} holds a non-reference type {}",
                address, other
            ))),
        }
    }

    /// Instance, arguments and static state of `method` under the model
    ///
    /// Statics are every static field loaded somewhere in `state`, grouped
    /// into one class descriptor per owner class.
    pub fn parameters(
        mut self,
        method: &MethodInfo,
        state: &PredicateState,
    ) -> Result<(DescriptorArena, Parameters<DescriptorId>)> {
        let instance = if method.is_static {
            None
        } else {
            Some(self.term(&TermFactory::this(method.owner_type()))?)
        };

        let mut arguments = Vec::with_capacity(method.arg_types.len());
        for (index, ty) in method.arg_types.iter().enumerate() {
            arguments.push(self.term(&TermFactory::argument(ty.clone(), index))?);
        }

        let mut classes: Vec<(String, DescriptorId)> = Vec::new();
        for load in collect_terms(state, is_static_load) {
            let TermKind::FieldLoad { field } = load.kind() else {
                continue;
            };
            let TermKind::Field { owner, field: name } = field.kind() else {
                continue;
            };
            let Some(class) = owner.ty().class_name() else {
                continue;
            };
            let Some(value) = self.model.evaluate(&load) else {
                continue;
            };
            let holder = match classes.iter().find(|(c, _)| c == class) {
                Some(&(_, id)) => id,
                None => {
                    let id = self.arena.static_class(class);
                    classes.push((class.to_string(), id));
                    id
                }
            };
            let child = self.value(value, load.ty())?;
            self.arena.set_field(holder, name.clone(), load.ty().clone(), child);
        }

        let statics = classes.into_iter().map(|(_, id)| id).collect();
        Ok((self.arena, Parameters::new(instance, arguments, statics)))
    }
}

fn is_static_load(term: &Term) -> bool {
    match term.kind() {
        TermKind::FieldLoad { field } => matches!(
            field.kind(),
            TermKind::Field { owner, .. } if matches!(owner.kind(), TermKind::StaticClassRef)
        ),
        _ => false,
    }
}
