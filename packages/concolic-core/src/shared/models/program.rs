//! Program model vocabulary
//!
//! Plain data the program-model collaborator hands to the engine: method
//! identities and signatures, class and field facts.

use super::ir_type::IrType;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CONSTRUCTOR_NAME: &str = "<init>";
pub const STATIC_INIT_NAME: &str = "<clinit>";

/// Class and member visibility, ordered from most to least restricted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

/// Identity of a method: owner class, name and signature descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodRef {
    pub class: String,
    pub name: String,
    pub descriptor: String,
}

impl MethodRef {
    pub fn new(
        class: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == STATIC_INIT_NAME
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.name, self.descriptor)
    }
}

/// Basic block index within one method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Method signature and modifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub method: MethodRef,
    pub arg_types: Vec<IrType>,
    pub return_type: IrType,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_native: bool,
}

impl MethodInfo {
    pub fn owner_type(&self) -> IrType {
        IrType::class(self.method.class.clone())
    }

    pub fn is_constructor(&self) -> bool {
        self.method.is_constructor()
    }

    pub fn has_body(&self) -> bool {
        !self.is_abstract && !self.is_native
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub super_class: Option<String>,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub visibility: Visibility,
}

impl ClassInfo {
    /// Whether instances may be created directly at the given visibility level
    pub fn is_instantiable(&self, min_visibility: Visibility) -> bool {
        !self.is_abstract && !self.is_interface && self.visibility >= min_visibility
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub class: String,
    pub name: String,
    pub ty: IrType,
    pub is_static: bool,
    pub is_final: bool,
}
