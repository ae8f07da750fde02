//! Term construction
//!
//! The factory is the only way the engine builds terms. It derives result
//! types (comparison results from the opcode, location types for fields and
//! array slots, loads from their location) so call sites never spell them.

use super::opcodes::{BinaryOpcode, CmpOpcode};
use super::predicate_state::PredicateState;
use super::term::{Literal, Term, TermKind};
use crate::domain::ports::TypeHierarchy;
use crate::errors::Result;
use crate::shared::models::{merge_types, IrType, MethodRef};
use std::sync::atomic::{AtomicUsize, Ordering};

static FRESH_TERMS: AtomicUsize = AtomicUsize::new(0);

pub struct TermFactory;

impl TermFactory {
    // ───────────────────────────────────────────────────────────────────
    // Values
    // ───────────────────────────────────────────────────────────────────

    pub fn argument(ty: IrType, index: usize) -> Term {
        Term::new(ty, TermKind::Argument { index })
    }

    pub fn value(ty: IrType, name: impl Into<String>) -> Term {
        Term::new(ty, TermKind::Value { name: name.into() })
    }

    pub fn this(ty: IrType) -> Term {
        Self::value(ty, "this")
    }

    pub fn return_value(ty: IrType, method: MethodRef) -> Term {
        Term::new(ty, TermKind::ReturnValue { method })
    }

    pub fn undef(ty: IrType) -> Term {
        Term::new(ty, TermKind::Undef)
    }

    /// Fresh symbolic value, unique for the lifetime of the process
    pub fn generate(ty: IrType) -> Term {
        let id = FRESH_TERMS.fetch_add(1, Ordering::Relaxed);
        Self::value(ty, format!("term{}", id))
    }

    // ───────────────────────────────────────────────────────────────────
    // Constants
    // ───────────────────────────────────────────────────────────────────

    pub fn literal(literal: Literal) -> Term {
        Term::new(literal.ty(), TermKind::Const(literal))
    }

    pub fn null() -> Term {
        Self::literal(Literal::Null)
    }

    pub fn bool(value: bool) -> Term {
        Self::literal(Literal::Bool(value))
    }

    pub fn byte(value: i8) -> Term {
        Self::literal(Literal::Byte(value))
    }

    pub fn char(value: u16) -> Term {
        Self::literal(Literal::Char(value))
    }

    pub fn short(value: i16) -> Term {
        Self::literal(Literal::Short(value))
    }

    pub fn int(value: i32) -> Term {
        Self::literal(Literal::Int(value))
    }

    pub fn long(value: i64) -> Term {
        Self::literal(Literal::Long(value))
    }

    pub fn float(value: f32) -> Term {
        Self::literal(Literal::Float(value))
    }

    pub fn double(value: f64) -> Term {
        Self::literal(Literal::Double(value))
    }

    pub fn string(value: impl Into<String>) -> Term {
        Self::literal(Literal::String(value.into()))
    }

    pub fn class_literal(ty: IrType) -> Term {
        Self::literal(Literal::Class(ty))
    }

    /// Receiver of static field accesses on `class`
    pub fn static_class_ref(class: IrType) -> Term {
        Term::new(class, TermKind::StaticClassRef)
    }

    // ───────────────────────────────────────────────────────────────────
    // Arithmetic and comparison
    // ───────────────────────────────────────────────────────────────────

    pub fn binary(ty: IrType, op: BinaryOpcode, lhv: Term, rhv: Term) -> Term {
        Term::new(ty, TermKind::Binary { op, lhv, rhv })
    }

    /// Binary term whose type is the merge of its operand types
    pub fn binary_merged(
        hierarchy: &dyn TypeHierarchy,
        op: BinaryOpcode,
        lhv: Term,
        rhv: Term,
    ) -> Result<Term> {
        let ty = merge_types(hierarchy, &[lhv.ty().clone(), rhv.ty().clone()])?;
        Ok(Self::binary(ty, op, lhv, rhv))
    }

    pub fn cmp(op: CmpOpcode, lhv: Term, rhv: Term) -> Term {
        Term::new(op.result_type(), TermKind::Cmp { op, lhv, rhv })
    }

    pub fn neg(operand: Term) -> Term {
        Term::new(operand.ty().clone(), TermKind::Neg { operand })
    }

    // ───────────────────────────────────────────────────────────────────
    // Heap access
    // ───────────────────────────────────────────────────────────────────

    pub fn array_length(array: Term) -> Term {
        Term::new(IrType::Int, TermKind::ArrayLength { array })
    }

    /// Location of `array[index]`
    pub fn array_index(array: Term, index: Term) -> Term {
        let element = array
            .ty()
            .element_type()
            .cloned()
            .unwrap_or_else(IrType::object);
        Term::new(IrType::reference(element), TermKind::ArrayIndex { array, index })
    }

    pub fn array_load(index_ref: Term) -> Term {
        let ty = index_ref.ty().dereference().clone();
        Term::new(ty, TermKind::ArrayLoad { index_ref })
    }

    pub fn array_contains(array: Term, value: Term) -> Term {
        Term::new(IrType::Bool, TermKind::ArrayContains { array, value })
    }

    /// Location of `owner.name`, where the field holds values of type `ty`
    pub fn field(owner: Term, ty: IrType, name: impl Into<String>) -> Term {
        Term::new(
            IrType::reference(ty),
            TermKind::Field {
                owner,
                field: name.into(),
            },
        )
    }

    pub fn field_load(field: Term) -> Term {
        let ty = field.ty().dereference().clone();
        Term::new(ty, TermKind::FieldLoad { field })
    }

    // ───────────────────────────────────────────────────────────────────
    // Types
    // ───────────────────────────────────────────────────────────────────

    pub fn cast(ty: IrType, operand: Term) -> Term {
        Term::new(ty, TermKind::Cast { operand })
    }

    pub fn instance_of(checked: IrType, operand: Term) -> Term {
        Term::new(IrType::Bool, TermKind::InstanceOf { checked, operand })
    }

    // ───────────────────────────────────────────────────────────────────
    // Calls and builtins
    // ───────────────────────────────────────────────────────────────────

    pub fn call(return_type: IrType, owner: Term, method: MethodRef, arguments: Vec<Term>) -> Term {
        Term::new(
            return_type,
            TermKind::Call {
                owner,
                method,
                arguments,
            },
        )
    }

    pub fn equals(lhv: Term, rhv: Term) -> Term {
        Term::new(IrType::Bool, TermKind::Equals { lhv, rhv })
    }

    pub fn concat(lhv: Term, rhv: Term) -> Term {
        Term::new(IrType::string(), TermKind::Concat { lhv, rhv })
    }

    pub fn char_at(string: Term, index: Term) -> Term {
        Term::new(IrType::Char, TermKind::CharAt { string, index })
    }

    pub fn string_length(string: Term) -> Term {
        Term::new(IrType::Int, TermKind::StringLength { string })
    }

    pub fn string_contains(string: Term, substring: Term) -> Term {
        Term::new(IrType::Bool, TermKind::StringContains { string, substring })
    }

    pub fn index_of(string: Term, substring: Term, offset: Term) -> Term {
        Term::new(
            IrType::Int,
            TermKind::IndexOf {
                string,
                substring,
                offset,
            },
        )
    }

    pub fn substring(string: Term, offset: Term, length: Term) -> Term {
        Term::new(
            IrType::string(),
            TermKind::Substring {
                string,
                offset,
                length,
            },
        )
    }

    pub fn to_string(value: Term) -> Term {
        Term::new(IrType::string(), TermKind::ToString { value })
    }

    /// Parse `string` as a value of the primitive type `ty`
    pub fn string_parse(ty: IrType, string: Term) -> Term {
        Term::new(ty, TermKind::StringParse { string })
    }

    // ───────────────────────────────────────────────────────────────────
    // Higher-order
    // ───────────────────────────────────────────────────────────────────

    pub fn ite(ty: IrType, cond: Term, true_value: Term, false_value: Term) -> Term {
        Term::new(
            ty,
            TermKind::Ite {
                cond,
                true_value,
                false_value,
            },
        )
    }

    pub fn lambda(ty: IrType, params: Vec<Term>, body: PredicateState) -> Term {
        Term::new(ty, TermKind::Lambda { params, body })
    }

    pub fn forall(start: Term, end: Term, body: Term) -> Term {
        Term::new(IrType::Bool, TermKind::ForAll { start, end, body })
    }

    pub fn exists(start: Term, end: Term, body: Term) -> Term {
        Term::new(IrType::Bool, TermKind::Exists { start, end, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_result_type() {
        let a = TermFactory::argument(IrType::Long, 0);
        let b = TermFactory::argument(IrType::Long, 1);
        assert_eq!(
            TermFactory::cmp(CmpOpcode::Cmp, a.clone(), b.clone()).ty(),
            &IrType::Int
        );
        assert_eq!(TermFactory::cmp(CmpOpcode::Le, a, b).ty(), &IrType::Bool);
    }

    #[test]
    fn test_generate_is_fresh() {
        let a = TermFactory::generate(IrType::Int);
        let b = TermFactory::generate(IrType::Int);
        assert_ne!(a, b);
        assert!(a.name().starts_with("term"));
    }

    #[test]
    fn test_array_index_types() {
        let array = TermFactory::argument(IrType::array(IrType::Char), 0);
        let slot = TermFactory::array_index(array, TermFactory::int(2));
        assert_eq!(slot.ty(), &IrType::reference(IrType::Char));
        assert_eq!(TermFactory::array_load(slot).ty(), &IrType::Char);
    }
}
