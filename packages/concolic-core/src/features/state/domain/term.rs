//! Symbolic terms
//!
//! A `Term` is an immutable, reference-counted expression node. Identity is
//! structural: two terms are equal when their variant, rendered name, type
//! and subterms coincide, so independently built terms describing the same
//! value are the same key in any term-keyed map. The hash is computed once
//! at construction.

use super::opcodes::{BinaryOpcode, CmpOpcode};
use super::predicate_state::PredicateState;
use crate::shared::models::{IrType, MethodRef, CLASS_CLASS};
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════
// Literals
// ═══════════════════════════════════════════════════════════════════════════

/// Constant payload. Floating values compare by bit pattern.
#[derive(Debug, Clone)]
pub enum Literal {
    Null,
    Bool(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Class(IrType),
}

impl Literal {
    pub fn ty(&self) -> IrType {
        match self {
            Literal::Null => IrType::Null,
            Literal::Bool(_) => IrType::Bool,
            Literal::Byte(_) => IrType::Byte,
            Literal::Char(_) => IrType::Char,
            Literal::Short(_) => IrType::Short,
            Literal::Int(_) => IrType::Int,
            Literal::Long(_) => IrType::Long,
            Literal::Float(_) => IrType::Float,
            Literal::Double(_) => IrType::Double,
            Literal::String(_) => IrType::string(),
            Literal::Class(_) => IrType::class(CLASS_CLASS),
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Null, Literal::Null) => true,
            (Literal::Bool(a), Literal::Bool(b)) => a == b,
            (Literal::Byte(a), Literal::Byte(b)) => a == b,
            (Literal::Char(a), Literal::Char(b)) => a == b,
            (Literal::Short(a), Literal::Short(b)) => a == b,
            (Literal::Int(a), Literal::Int(b)) => a == b,
            (Literal::Long(a), Literal::Long(b)) => a == b,
            (Literal::Float(a), Literal::Float(b)) => a.to_bits() == b.to_bits(),
            (Literal::Double(a), Literal::Double(b)) => a.to_bits() == b.to_bits(),
            (Literal::String(a), Literal::String(b)) => a == b,
            (Literal::Class(a), Literal::Class(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Literal::Null => {}
            Literal::Bool(v) => v.hash(state),
            Literal::Byte(v) => v.hash(state),
            Literal::Char(v) => v.hash(state),
            Literal::Short(v) => v.hash(state),
            Literal::Int(v) => v.hash(state),
            Literal::Long(v) => v.hash(state),
            Literal::Float(v) => v.to_bits().hash(state),
            Literal::Double(v) => v.to_bits().hash(state),
            Literal::String(v) => v.hash(state),
            Literal::Class(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::Byte(v) => write!(f, "{}b", v),
            Literal::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "{:?}", c),
                None => write!(f, "\\u{:04x}", v),
            },
            Literal::Short(v) => write!(f, "{}s", v),
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Long(v) => write!(f, "{}L", v),
            Literal::Float(v) => write!(f, "{}f", v),
            Literal::Double(v) => write!(f, "{}d", v),
            Literal::String(v) => write!(f, "{:?}", v),
            Literal::Class(ty) => write!(f, "{}.class", ty),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Term variants
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum TermKind {
    // Values
    Argument { index: usize },
    /// Locals, `this` and generated symbols
    Value { name: String },
    ReturnValue { method: MethodRef },
    Undef,

    // Constants
    Const(Literal),
    StaticClassRef,

    // Arithmetic and comparison
    Binary { op: BinaryOpcode, lhv: Term, rhv: Term },
    Cmp { op: CmpOpcode, lhv: Term, rhv: Term },
    Neg { operand: Term },

    // Heap access
    ArrayLength { array: Term },
    ArrayIndex { array: Term, index: Term },
    ArrayLoad { index_ref: Term },
    ArrayContains { array: Term, value: Term },
    Field { owner: Term, field: String },
    FieldLoad { field: Term },

    // Types
    Cast { operand: Term },
    InstanceOf { checked: IrType, operand: Term },

    // Calls and builtins
    Call { owner: Term, method: MethodRef, arguments: Vec<Term> },
    Equals { lhv: Term, rhv: Term },
    Concat { lhv: Term, rhv: Term },
    CharAt { string: Term, index: Term },
    StringLength { string: Term },
    StringContains { string: Term, substring: Term },
    IndexOf { string: Term, substring: Term, offset: Term },
    Substring { string: Term, offset: Term, length: Term },
    ToString { value: Term },
    StringParse { string: Term },

    // Higher-order
    Ite { cond: Term, true_value: Term, false_value: Term },
    Lambda { params: Vec<Term>, body: PredicateState },
    ForAll { start: Term, end: Term, body: Term },
    Exists { start: Term, end: Term, body: Term },
}

impl TermKind {
    /// Operands in canonical order. Lambda bodies are not subterms.
    fn subterms(&self) -> Vec<&Term> {
        match self {
            TermKind::Argument { .. }
            | TermKind::Value { .. }
            | TermKind::ReturnValue { .. }
            | TermKind::Undef
            | TermKind::Const(_)
            | TermKind::StaticClassRef => Vec::new(),
            TermKind::Binary { lhv, rhv, .. }
            | TermKind::Cmp { lhv, rhv, .. }
            | TermKind::Equals { lhv, rhv }
            | TermKind::Concat { lhv, rhv } => vec![lhv, rhv],
            TermKind::Neg { operand } | TermKind::Cast { operand } => vec![operand],
            TermKind::InstanceOf { operand, .. } => vec![operand],
            TermKind::ArrayLength { array } => vec![array],
            TermKind::ArrayIndex { array, index } => vec![array, index],
            TermKind::ArrayLoad { index_ref } => vec![index_ref],
            TermKind::ArrayContains { array, value } => vec![array, value],
            TermKind::Field { owner, .. } => vec![owner],
            TermKind::FieldLoad { field } => vec![field],
            TermKind::Call {
                owner, arguments, ..
            } => std::iter::once(owner).chain(arguments.iter()).collect(),
            TermKind::CharAt { string, index } => vec![string, index],
            TermKind::StringLength { string } | TermKind::StringParse { string } => vec![string],
            TermKind::StringContains { string, substring } => vec![string, substring],
            TermKind::IndexOf {
                string,
                substring,
                offset,
            } => vec![string, substring, offset],
            TermKind::Substring {
                string,
                offset,
                length,
            } => vec![string, offset, length],
            TermKind::ToString { value } => vec![value],
            TermKind::Ite {
                cond,
                true_value,
                false_value,
            } => vec![cond, true_value, false_value],
            TermKind::Lambda { params, .. } => params.iter().collect(),
            TermKind::ForAll { start, end, body } | TermKind::Exists { start, end, body } => {
                vec![start, end, body]
            }
        }
    }

    fn tag(&self) -> u8 {
        match self {
            TermKind::Argument { .. } => 0,
            TermKind::Value { .. } => 1,
            TermKind::ReturnValue { .. } => 2,
            TermKind::Undef => 3,
            TermKind::Const(_) => 4,
            TermKind::StaticClassRef => 5,
            TermKind::Binary { .. } => 6,
            TermKind::Cmp { .. } => 7,
            TermKind::Neg { .. } => 8,
            TermKind::ArrayLength { .. } => 9,
            TermKind::ArrayIndex { .. } => 10,
            TermKind::ArrayLoad { .. } => 11,
            TermKind::ArrayContains { .. } => 12,
            TermKind::Field { .. } => 13,
            TermKind::FieldLoad { .. } => 14,
            TermKind::Cast { .. } => 15,
            TermKind::InstanceOf { .. } => 16,
            TermKind::Call { .. } => 17,
            TermKind::Equals { .. } => 18,
            TermKind::Concat { .. } => 19,
            TermKind::CharAt { .. } => 20,
            TermKind::StringLength { .. } => 21,
            TermKind::StringContains { .. } => 22,
            TermKind::IndexOf { .. } => 23,
            TermKind::Substring { .. } => 24,
            TermKind::ToString { .. } => 25,
            TermKind::StringParse { .. } => 26,
            TermKind::Ite { .. } => 27,
            TermKind::Lambda { .. } => 28,
            TermKind::ForAll { .. } => 29,
            TermKind::Exists { .. } => 30,
        }
    }
}

fn join(terms: &[Term]) -> String {
    terms
        .iter()
        .map(|t| t.name().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_name(ty: &IrType, kind: &TermKind) -> String {
    match kind {
        TermKind::Argument { index } => format!("arg${}", index),
        TermKind::Value { name } => name.clone(),
        TermKind::ReturnValue { method } => format!("<retval>@{}", method),
        TermKind::Undef => "<undef>".to_string(),
        TermKind::Const(literal) => literal.to_string(),
        TermKind::StaticClassRef => format!("static {}", ty),
        TermKind::Binary { op, lhv, rhv } => format!("({} {} {})", lhv, op, rhv),
        TermKind::Cmp { op, lhv, rhv } => format!("({} {} {})", lhv, op, rhv),
        TermKind::Neg { operand } => format!("-{}", operand),
        TermKind::ArrayLength { array } => format!("{}.length", array),
        TermKind::ArrayIndex { array, index } => format!("{}[{}]", array, index),
        TermKind::ArrayLoad { index_ref } => format!("*({})", index_ref),
        TermKind::ArrayContains { array, value } => format!("{} in {}", value, array),
        TermKind::Field { owner, field } => format!("{}.{}", owner, field),
        TermKind::FieldLoad { field } => format!("*({})", field),
        TermKind::Cast { operand } => format!("({}) {}", ty, operand),
        TermKind::InstanceOf { checked, operand } => format!("{} instanceof {}", operand, checked),
        TermKind::Call {
            owner,
            method,
            arguments,
        } => format!("{}.{}({})", owner, method.name, join(arguments)),
        TermKind::Equals { lhv, rhv } => format!("{}.equals({})", lhv, rhv),
        TermKind::Concat { lhv, rhv } => format!("{} ++ {}", lhv, rhv),
        TermKind::CharAt { string, index } => format!("{}.charAt({})", string, index),
        TermKind::StringLength { string } => format!("{}.length()", string),
        TermKind::StringContains { string, substring } => {
            format!("{}.contains({})", string, substring)
        }
        TermKind::IndexOf {
            string,
            substring,
            offset,
        } => format!("{}.indexOf({}, {})", string, substring, offset),
        TermKind::Substring {
            string,
            offset,
            length,
        } => format!("{}.substring({}, {})", string, offset, length),
        TermKind::ToString { value } => format!("{}.toString()", value),
        TermKind::StringParse { string } => format!("parse<{}>({})", ty, string),
        TermKind::Ite {
            cond,
            true_value,
            false_value,
        } => format!("({} ? {} : {})", cond, true_value, false_value),
        TermKind::Lambda { params, body } => format!("\\({}) -> {{ {} }}", join(params), body),
        TermKind::ForAll { start, end, body } => format!("forall({}, {}, {})", start, end, body),
        TermKind::Exists { start, end, body } => format!("exists({}, {}, {})", start, end, body),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Term
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct TermData {
    name: String,
    ty: IrType,
    kind: TermKind,
    hash: u64,
}

/// Immutable symbolic expression node
#[derive(Clone)]
pub struct Term(Arc<TermData>);

impl Term {
    pub fn new(ty: IrType, kind: TermKind) -> Self {
        let name = render_name(&ty, &kind);
        let mut hasher = FxHasher::default();
        kind.tag().hash(&mut hasher);
        name.hash(&mut hasher);
        ty.hash(&mut hasher);
        for sub in kind.subterms() {
            hasher.write_u64(sub.0.hash);
        }
        let hash = hasher.finish();
        Term(Arc::new(TermData {
            name,
            ty,
            kind,
            hash,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn ty(&self) -> &IrType {
        &self.0.ty
    }

    pub fn kind(&self) -> &TermKind {
        &self.0.kind
    }

    pub fn subterms(&self) -> Vec<Term> {
        self.0.kind.subterms().into_iter().cloned().collect()
    }

    pub fn ptr_eq(&self, other: &Term) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_const(&self) -> bool {
        matches!(self.0.kind, TermKind::Const(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.0.kind {
            TermKind::Const(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.0.kind, TermKind::Const(Literal::Null))
    }

    /// Leaves that name a storage location: arguments, values, return values
    pub fn is_named(&self) -> bool {
        matches!(
            self.0.kind,
            TermKind::Argument { .. } | TermKind::Value { .. } | TermKind::ReturnValue { .. }
        )
    }

    /// Rebuild with every direct operand passed through `f`
    ///
    /// Returns `self` (same allocation) when no operand changed. Lambda
    /// bodies are left untouched; see `with_lambda_body`.
    pub fn map_subterms(&self, mut f: impl FnMut(&Term) -> Term) -> Term {
        let mut changed = false;
        let mut g = |t: &Term| {
            let mapped = f(t);
            if !mapped.ptr_eq(t) && mapped != *t {
                changed = true;
            }
            mapped
        };
        let kind = match &self.0.kind {
            TermKind::Argument { .. }
            | TermKind::Value { .. }
            | TermKind::ReturnValue { .. }
            | TermKind::Undef
            | TermKind::Const(_)
            | TermKind::StaticClassRef => return self.clone(),
            TermKind::Binary { op, lhv, rhv } => TermKind::Binary {
                op: *op,
                lhv: g(lhv),
                rhv: g(rhv),
            },
            TermKind::Cmp { op, lhv, rhv } => TermKind::Cmp {
                op: *op,
                lhv: g(lhv),
                rhv: g(rhv),
            },
            TermKind::Neg { operand } => TermKind::Neg {
                operand: g(operand),
            },
            TermKind::ArrayLength { array } => TermKind::ArrayLength { array: g(array) },
            TermKind::ArrayIndex { array, index } => TermKind::ArrayIndex {
                array: g(array),
                index: g(index),
            },
            TermKind::ArrayLoad { index_ref } => TermKind::ArrayLoad {
                index_ref: g(index_ref),
            },
            TermKind::ArrayContains { array, value } => TermKind::ArrayContains {
                array: g(array),
                value: g(value),
            },
            TermKind::Field { owner, field } => TermKind::Field {
                owner: g(owner),
                field: field.clone(),
            },
            TermKind::FieldLoad { field } => TermKind::FieldLoad { field: g(field) },
            TermKind::Cast { operand } => TermKind::Cast {
                operand: g(operand),
            },
            TermKind::InstanceOf { checked, operand } => TermKind::InstanceOf {
                checked: checked.clone(),
                operand: g(operand),
            },
            TermKind::Call {
                owner,
                method,
                arguments,
            } => TermKind::Call {
                owner: g(owner),
                method: method.clone(),
                arguments: arguments.iter().map(&mut g).collect(),
            },
            TermKind::Equals { lhv, rhv } => TermKind::Equals {
                lhv: g(lhv),
                rhv: g(rhv),
            },
            TermKind::Concat { lhv, rhv } => TermKind::Concat {
                lhv: g(lhv),
                rhv: g(rhv),
            },
            TermKind::CharAt { string, index } => TermKind::CharAt {
                string: g(string),
                index: g(index),
            },
            TermKind::StringLength { string } => TermKind::StringLength { string: g(string) },
            TermKind::StringContains { string, substring } => TermKind::StringContains {
                string: g(string),
                substring: g(substring),
            },
            TermKind::IndexOf {
                string,
                substring,
                offset,
            } => TermKind::IndexOf {
                string: g(string),
                substring: g(substring),
                offset: g(offset),
            },
            TermKind::Substring {
                string,
                offset,
                length,
            } => TermKind::Substring {
                string: g(string),
                offset: g(offset),
                length: g(length),
            },
            TermKind::ToString { value } => TermKind::ToString { value: g(value) },
            TermKind::StringParse { string } => TermKind::StringParse { string: g(string) },
            TermKind::Ite {
                cond,
                true_value,
                false_value,
            } => TermKind::Ite {
                cond: g(cond),
                true_value: g(true_value),
                false_value: g(false_value),
            },
            TermKind::Lambda { params, body } => TermKind::Lambda {
                params: params.iter().map(&mut g).collect(),
                body: body.clone(),
            },
            TermKind::ForAll { start, end, body } => TermKind::ForAll {
                start: g(start),
                end: g(end),
                body: g(body),
            },
            TermKind::Exists { start, end, body } => TermKind::Exists {
                start: g(start),
                end: g(end),
                body: g(body),
            },
        };
        if changed {
            Term::new(self.0.ty.clone(), kind)
        } else {
            self.clone()
        }
    }

    /// Replace the body of a lambda term; other terms are returned as is
    pub fn with_lambda_body(&self, new_body: PredicateState) -> Term {
        match &self.0.kind {
            TermKind::Lambda { params, body } if *body != new_body => Term::new(
                self.0.ty.clone(),
                TermKind::Lambda {
                    params: params.clone(),
                    body: new_body,
                },
            ),
            _ => self.clone(),
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.0.hash == other.0.hash
            && self.0.kind.tag() == other.0.kind.tag()
            && self.0.name == other.0.name
            && self.0.ty == other.0.ty
            && self.0.kind.subterms() == other.0.kind.subterms()
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0.name, self.0.ty)
    }
}
