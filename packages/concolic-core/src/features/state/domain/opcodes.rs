//! Arithmetic and comparison opcodes

use crate::shared::models::IrType;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Ushr,
    And,
    Or,
    Xor,
}

impl BinaryOpcode {
    pub fn is_shift(&self) -> bool {
        matches!(self, BinaryOpcode::Shl | BinaryOpcode::Shr | BinaryOpcode::Ushr)
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(self, BinaryOpcode::And | BinaryOpcode::Or | BinaryOpcode::Xor)
    }
}

impl fmt::Display for BinaryOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOpcode::Add => "+",
            BinaryOpcode::Sub => "-",
            BinaryOpcode::Mul => "*",
            BinaryOpcode::Div => "/",
            BinaryOpcode::Rem => "%",
            BinaryOpcode::Shl => "<<",
            BinaryOpcode::Shr => ">>",
            BinaryOpcode::Ushr => ">>>",
            BinaryOpcode::And => "&",
            BinaryOpcode::Or => "|",
            BinaryOpcode::Xor => "^",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOpcode {
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
    /// Three-way compare of integral values
    Cmp,
    /// Three-way compare of reals, NaN compares greater
    Cmpg,
    /// Three-way compare of reals, NaN compares less
    Cmpl,
}

impl CmpOpcode {
    /// Three-way compares produce an int, everything else a bool
    pub fn result_type(&self) -> IrType {
        match self {
            CmpOpcode::Cmp | CmpOpcode::Cmpg | CmpOpcode::Cmpl => IrType::Int,
            _ => IrType::Bool,
        }
    }

    /// Logical negation of a boolean comparison
    pub fn negate(&self) -> Option<CmpOpcode> {
        match self {
            CmpOpcode::Eq => Some(CmpOpcode::Neq),
            CmpOpcode::Neq => Some(CmpOpcode::Eq),
            CmpOpcode::Lt => Some(CmpOpcode::Ge),
            CmpOpcode::Ge => Some(CmpOpcode::Lt),
            CmpOpcode::Gt => Some(CmpOpcode::Le),
            CmpOpcode::Le => Some(CmpOpcode::Gt),
            CmpOpcode::Cmp | CmpOpcode::Cmpg | CmpOpcode::Cmpl => None,
        }
    }
}

impl fmt::Display for CmpOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CmpOpcode::Eq => "==",
            CmpOpcode::Neq => "!=",
            CmpOpcode::Lt => "<",
            CmpOpcode::Gt => ">",
            CmpOpcode::Le => "<=",
            CmpOpcode::Ge => ">=",
            CmpOpcode::Cmp => "cmp",
            CmpOpcode::Cmpg => "cmpg",
            CmpOpcode::Cmpl => "cmpl",
        };
        f.write_str(symbol)
    }
}
