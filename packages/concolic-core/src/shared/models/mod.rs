//! Shared models

pub mod ir_type;
pub mod program;

pub use ir_type::{merge_types, IrType, CLASS_CLASS, OBJECT_CLASS, STRING_CLASS};
pub use program::{BlockId, ClassInfo, FieldInfo, MethodInfo, MethodRef, Visibility};
