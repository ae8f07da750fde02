//! Descriptor nodes
//!
//! A descriptor is a concrete value: a scalar constant, an object with
//! instance fields, a class with static fields, or an array. Containers
//! refer to their children by `DescriptorId`, a handle into the owning
//! `DescriptorArena`, so graphs may be cyclic without shared ownership.

use crate::features::state::domain::{Literal, Term};
use crate::shared::models::IrType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle of a node in a `DescriptorArena`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DescriptorId(pub(crate) usize);

impl DescriptorId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Field identity: name plus declared type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldKey {
    pub name: String,
    pub ty: IrType,
}

impl FieldKey {
    pub fn new(name: impl Into<String>, ty: IrType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorKind {
    Constant(Literal),
    Object {
        fields: BTreeMap<FieldKey, DescriptorId>,
    },
    /// Static fields of a class
    Class {
        fields: BTreeMap<FieldKey, DescriptorId>,
    },
    Array {
        length: i32,
        elements: BTreeMap<i32, DescriptorId>,
    },
}

#[derive(Debug, Clone)]
pub struct DescriptorNode {
    /// Symbolic name of the value
    pub term: Term,
    pub ty: IrType,
    pub kind: DescriptorKind,
}

impl DescriptorNode {
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, DescriptorKind::Constant(_))
    }

    pub fn literal(&self) -> Option<&Literal> {
        match &self.kind {
            DescriptorKind::Constant(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&BTreeMap<FieldKey, DescriptorId>> {
        match &self.kind {
            DescriptorKind::Object { fields } | DescriptorKind::Class { fields } => Some(fields),
            _ => None,
        }
    }

    /// Element type of an array descriptor
    pub fn element_type(&self) -> Option<&IrType> {
        match self.kind {
            DescriptorKind::Array { .. } => self.ty.element_type(),
            _ => None,
        }
    }

    /// Direct children in key order
    pub fn children(&self) -> Vec<DescriptorId> {
        match &self.kind {
            DescriptorKind::Constant(_) => Vec::new(),
            DescriptorKind::Object { fields } | DescriptorKind::Class { fields } => {
                fields.values().copied().collect()
            }
            DescriptorKind::Array { elements, .. } => elements.values().copied().collect(),
        }
    }
}

/// Whether `literal` is the default value of a slot of type `ty`
pub fn is_default_literal(literal: &Literal, ty: &IrType) -> bool {
    match literal {
        Literal::Null => ty.is_pointer(),
        Literal::Bool(v) => !v,
        Literal::Byte(v) => *v == 0,
        Literal::Char(v) => *v == 0,
        Literal::Short(v) => *v == 0,
        Literal::Int(v) => *v == 0,
        Literal::Long(v) => *v == 0,
        Literal::Float(v) => *v == 0.0,
        Literal::Double(v) => *v == 0.0,
        Literal::String(_) | Literal::Class(_) => false,
    }
}

/// Default literal of a slot of type `ty`
pub fn default_literal(ty: &IrType) -> Literal {
    match ty {
        IrType::Bool => Literal::Bool(false),
        IrType::Byte => Literal::Byte(0),
        IrType::Char => Literal::Char(0),
        IrType::Short => Literal::Short(0),
        IrType::Int => Literal::Int(0),
        IrType::Long => Literal::Long(0),
        IrType::Float => Literal::Float(0.0),
        IrType::Double => Literal::Double(0.0),
        _ => Literal::Null,
    }
}
