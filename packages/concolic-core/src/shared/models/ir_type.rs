//! Closed type universe of the symbolic IR
//!
//! Pointer types are `Class`, `Array` and `Null`. `Reference` is the type of
//! a location (a field or an array slot) and is dereferenced by loads.

use crate::domain::ports::TypeHierarchy;
use crate::errors::{ConcolicError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const OBJECT_CLASS: &str = "java/lang/Object";
pub const STRING_CLASS: &str = "java/lang/String";
pub const CLASS_CLASS: &str = "java/lang/Class";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IrType {
    Void,
    Bool,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Null,
    Class(String),
    Array(Box<IrType>),
    Reference(Box<IrType>),
}

impl IrType {
    pub fn class(name: impl Into<String>) -> Self {
        IrType::Class(name.into())
    }

    pub fn object() -> Self {
        IrType::Class(OBJECT_CLASS.to_string())
    }

    pub fn string() -> Self {
        IrType::Class(STRING_CLASS.to_string())
    }

    pub fn array(element: IrType) -> Self {
        IrType::Array(Box::new(element))
    }

    pub fn reference(target: IrType) -> Self {
        IrType::Reference(Box::new(target))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, IrType::Class(_) | IrType::Array(_) | IrType::Null)
    }

    pub fn is_integral(&self) -> bool {
        self.integral_bit_size().is_some()
    }

    pub fn is_real(&self) -> bool {
        matches!(self, IrType::Float | IrType::Double)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integral() || self.is_real()
    }

    /// Width used when widening integral operands
    pub fn integral_bit_size(&self) -> Option<u32> {
        match self {
            IrType::Bool => Some(1),
            IrType::Byte => Some(8),
            IrType::Char | IrType::Short => Some(16),
            IrType::Int => Some(32),
            IrType::Long => Some(64),
            _ => None,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            IrType::Class(name) => Some(name),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&IrType> {
        match self {
            IrType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Target of a location type; non-references dereference to themselves
    pub fn dereference(&self) -> &IrType {
        match self {
            IrType::Reference(target) => target,
            other => other,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::Bool => write!(f, "bool"),
            IrType::Byte => write!(f, "byte"),
            IrType::Char => write!(f, "char"),
            IrType::Short => write!(f, "short"),
            IrType::Int => write!(f, "int"),
            IrType::Long => write!(f, "long"),
            IrType::Float => write!(f, "float"),
            IrType::Double => write!(f, "double"),
            IrType::Null => write!(f, "null"),
            IrType::Class(name) => write!(f, "{}", name),
            IrType::Array(element) => write!(f, "{}[]", element),
            IrType::Reference(target) => write!(f, "&{}", target),
        }
    }
}

/// Merge operand types into one
///
/// - a single distinct type is returned as is
/// - reference types widen to the first operand class that is an ancestor
///   of all the others, or `Object` when there is none
/// - integral types widen to the largest bit size
/// - floating types widen to `Double` unless all are `Float`
///
/// `Null` operands are ignored. Anything else is a type merge error.
pub fn merge_types(hierarchy: &dyn TypeHierarchy, types: &[IrType]) -> Result<IrType> {
    let mut unique: Vec<&IrType> = Vec::new();
    for ty in types.iter().filter(|ty| **ty != IrType::Null) {
        if !unique.contains(&ty) {
            unique.push(ty);
        }
    }

    match unique.as_slice() {
        [] => {
            if types.is_empty() {
                Err(ConcolicError::type_merge::<IrType>(&[]))
            } else {
                Ok(IrType::Null)
            }
        }
        [single] => Ok((*single).clone()),
        _ if unique.iter().all(|ty| ty.is_pointer()) => {
            let classes: Vec<&str> = unique.iter().filter_map(|ty| ty.class_name()).collect();
            if classes.len() != unique.len() {
                return Ok(IrType::object());
            }
            let ancestor = classes.iter().find(|candidate| {
                classes
                    .iter()
                    .all(|other| **candidate == *other || hierarchy.is_ancestor_of(candidate, other))
            });
            Ok(ancestor.map(|name| IrType::class(*name)).unwrap_or_else(IrType::object))
        }
        _ if unique.iter().all(|ty| ty.is_integral()) => Ok(unique
            .iter()
            .max_by_key(|ty| ty.integral_bit_size().unwrap_or(0))
            .map(|ty| (*ty).clone())
            .unwrap_or(IrType::Int)),
        _ if unique.iter().all(|ty| ty.is_real()) => Ok(IrType::Double),
        _ => Err(ConcolicError::type_merge(types)),
    }
}
