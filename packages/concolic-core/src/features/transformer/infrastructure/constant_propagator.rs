//! Constant folding
//!
//! Folds operators and builtins whose operands are all literals, following
//! JVM numeric semantics: operands promote to the widest of int, long,
//! float and double; integer arithmetic wraps; shift distances are masked
//! to the operand width. Real equality is approximate (`|a - b| < 1e-5`).
//!
//! An equality between literals that can never hold, or an inequality
//! between equal literals, is an obvious contradiction and is reported
//! as an error. Integer division by zero is reported as an arithmetic
//! fault. Trivially true predicates are kept.

use crate::errors::{ConcolicError, Result};
use crate::features::state::domain::{
    BinaryOpcode, CmpOpcode, Literal, Predicate, PredicateKind, PredicateState, Term, TermFactory,
    TermKind,
};
use crate::features::transformer::domain::Transformer;
use crate::shared::models::IrType;
use std::cmp::Ordering;

/// Tolerance for equality between real values
pub const EPSILON: f64 = 1e-5;

// ═══════════════════════════════════════════════════════════════════════════
// Numeric promotion
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Number {
    fn from_literal(literal: &Literal) -> Option<Self> {
        match *literal {
            Literal::Bool(v) => Some(Number::Int(i32::from(v))),
            Literal::Byte(v) => Some(Number::Int(i32::from(v))),
            Literal::Char(v) => Some(Number::Int(i32::from(v))),
            Literal::Short(v) => Some(Number::Int(i32::from(v))),
            Literal::Int(v) => Some(Number::Int(v)),
            Literal::Long(v) => Some(Number::Long(v)),
            Literal::Float(v) => Some(Number::Float(v)),
            Literal::Double(v) => Some(Number::Double(v)),
            _ => None,
        }
    }

    fn rank(self) -> u8 {
        match self {
            Number::Int(_) => 0,
            Number::Long(_) => 1,
            Number::Float(_) => 2,
            Number::Double(_) => 3,
        }
    }

    fn is_real(self) -> bool {
        self.rank() >= 2
    }

    fn to_i32(self) -> i32 {
        match self {
            Number::Int(v) => v,
            Number::Long(v) => v as i32,
            Number::Float(v) => v as i32,
            Number::Double(v) => v as i32,
        }
    }

    fn to_i64(self) -> i64 {
        match self {
            Number::Int(v) => i64::from(v),
            Number::Long(v) => v,
            Number::Float(v) => v as i64,
            Number::Double(v) => v as i64,
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Number::Int(v) => f64::from(v),
            Number::Long(v) => v as f64,
            Number::Float(v) => f64::from(v),
            Number::Double(v) => v,
        }
    }

    fn to_f32(self) -> f32 {
        match self {
            Number::Int(v) => v as f32,
            Number::Long(v) => v as f32,
            Number::Float(v) => v,
            Number::Double(v) => v as f32,
        }
    }

    fn promote(self, rank: u8) -> Number {
        match rank {
            0 => Number::Int(self.to_i32()),
            1 => Number::Long(self.to_i64()),
            2 => Number::Float(self.to_f32()),
            _ => Number::Double(self.to_f64()),
        }
    }

    /// Narrow or widen into a literal of `ty`
    fn into_literal(self, ty: &IrType) -> Option<Literal> {
        let literal = match ty {
            IrType::Bool => Literal::Bool(self.to_i64() != 0),
            IrType::Byte => Literal::Byte(self.to_i32() as i8),
            IrType::Char => Literal::Char(self.to_i32() as u16),
            IrType::Short => Literal::Short(self.to_i32() as i16),
            IrType::Int => Literal::Int(self.to_i32()),
            IrType::Long => Literal::Long(self.to_i64()),
            IrType::Float => Literal::Float(self.to_f32()),
            IrType::Double => Literal::Double(self.to_f64()),
            _ => return None,
        };
        Some(literal)
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Whether two literals denote the same value; `None` when incomparable
pub fn literal_equals(lhv: &Literal, rhv: &Literal) -> Option<bool> {
    if let (Some(a), Some(b)) = (Number::from_literal(lhv), Number::from_literal(rhv)) {
        return Some(if a.is_real() || b.is_real() {
            approx_eq(a.to_f64(), b.to_f64())
        } else {
            a.to_i64() == b.to_i64()
        });
    }
    match (lhv, rhv) {
        (Literal::Null, Literal::Null) => Some(true),
        (Literal::String(a), Literal::String(b)) => Some(a == b),
        (Literal::Class(a), Literal::Class(b)) => Some(a == b),
        (Literal::Null, Literal::String(_) | Literal::Class(_))
        | (Literal::String(_) | Literal::Class(_), Literal::Null) => Some(false),
        _ => None,
    }
}

fn fold_arithmetic(op: BinaryOpcode, lhv: Number, rhv: Number) -> Result<Option<Number>> {
    if op.is_shift() {
        let distance = rhv.to_i64() as u32;
        return Ok(match lhv {
            Number::Int(a) => Some(Number::Int(match op {
                BinaryOpcode::Shl => a.wrapping_shl(distance),
                BinaryOpcode::Shr => a.wrapping_shr(distance),
                _ => (a as u32).wrapping_shr(distance) as i32,
            })),
            Number::Long(a) => Some(Number::Long(match op {
                BinaryOpcode::Shl => a.wrapping_shl(distance),
                BinaryOpcode::Shr => a.wrapping_shr(distance),
                _ => (a as u64).wrapping_shr(distance) as i64,
            })),
            _ => None,
        });
    }

    let rank = lhv.rank().max(rhv.rank());
    if op.is_bitwise() && rank >= 2 {
        return Ok(None);
    }
    let zero_divisor = || ConcolicError::Arithmetic(format!("{} by zero", op));

    let folded = match (lhv.promote(rank), rhv.promote(rank)) {
        (Number::Int(a), Number::Int(b)) => Number::Int(match op {
            BinaryOpcode::Add => a.wrapping_add(b),
            BinaryOpcode::Sub => a.wrapping_sub(b),
            BinaryOpcode::Mul => a.wrapping_mul(b),
            BinaryOpcode::Div if b == 0 => return Err(zero_divisor()),
            BinaryOpcode::Div => a.wrapping_div(b),
            BinaryOpcode::Rem if b == 0 => return Err(zero_divisor()),
            BinaryOpcode::Rem => a.wrapping_rem(b),
            BinaryOpcode::And => a & b,
            BinaryOpcode::Or => a | b,
            BinaryOpcode::Xor => a ^ b,
            _ => return Ok(None),
        }),
        (Number::Long(a), Number::Long(b)) => Number::Long(match op {
            BinaryOpcode::Add => a.wrapping_add(b),
            BinaryOpcode::Sub => a.wrapping_sub(b),
            BinaryOpcode::Mul => a.wrapping_mul(b),
            BinaryOpcode::Div if b == 0 => return Err(zero_divisor()),
            BinaryOpcode::Div => a.wrapping_div(b),
            BinaryOpcode::Rem if b == 0 => return Err(zero_divisor()),
            BinaryOpcode::Rem => a.wrapping_rem(b),
            BinaryOpcode::And => a & b,
            BinaryOpcode::Or => a | b,
            BinaryOpcode::Xor => a ^ b,
            _ => return Ok(None),
        }),
        (Number::Float(a), Number::Float(b)) => Number::Float(match op {
            BinaryOpcode::Add => a + b,
            BinaryOpcode::Sub => a - b,
            BinaryOpcode::Mul => a * b,
            BinaryOpcode::Div => a / b,
            BinaryOpcode::Rem => a % b,
            _ => return Ok(None),
        }),
        (Number::Double(a), Number::Double(b)) => Number::Double(match op {
            BinaryOpcode::Add => a + b,
            BinaryOpcode::Sub => a - b,
            BinaryOpcode::Mul => a * b,
            BinaryOpcode::Div => a / b,
            BinaryOpcode::Rem => a % b,
            _ => return Ok(None),
        }),
        _ => return Ok(None),
    };
    Ok(Some(folded))
}

fn fold_comparison(op: CmpOpcode, lhv: &Literal, rhv: &Literal) -> Option<Literal> {
    let (a, b) = match (Number::from_literal(lhv), Number::from_literal(rhv)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return match op {
                CmpOpcode::Eq => literal_equals(lhv, rhv).map(Literal::Bool),
                CmpOpcode::Neq => literal_equals(lhv, rhv).map(|eq| Literal::Bool(!eq)),
                _ => None,
            }
        }
    };

    let ordering = if a.is_real() || b.is_real() {
        a.to_f64().partial_cmp(&b.to_f64())
    } else {
        Some(a.to_i64().cmp(&b.to_i64()))
    };
    let equal = literal_equals(lhv, rhv).unwrap_or(false);

    Some(match op {
        CmpOpcode::Eq => Literal::Bool(equal),
        CmpOpcode::Neq => Literal::Bool(!equal),
        CmpOpcode::Lt => Literal::Bool(ordering == Some(Ordering::Less)),
        CmpOpcode::Gt => Literal::Bool(ordering == Some(Ordering::Greater)),
        CmpOpcode::Le => Literal::Bool(matches!(
            ordering,
            Some(Ordering::Less | Ordering::Equal)
        )),
        CmpOpcode::Ge => Literal::Bool(matches!(
            ordering,
            Some(Ordering::Greater | Ordering::Equal)
        )),
        CmpOpcode::Cmp | CmpOpcode::Cmpl => {
            Literal::Int(ordering.map(|o| o as i32).unwrap_or(-1))
        }
        CmpOpcode::Cmpg => Literal::Int(ordering.map(|o| o as i32).unwrap_or(1)),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// String builtins (UTF-16 code units)
// ═══════════════════════════════════════════════════════════════════════════

fn string_of(term: &Term) -> Option<&str> {
    match term.as_literal() {
        Some(Literal::String(s)) => Some(s),
        _ => None,
    }
}

fn int_of(term: &Term) -> Option<i64> {
    term.as_literal()
        .and_then(Number::from_literal)
        .filter(|n| !n.is_real())
        .map(Number::to_i64)
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Null => "null".to_string(),
        Literal::Bool(v) => v.to_string(),
        Literal::Byte(v) => v.to_string(),
        Literal::Short(v) => v.to_string(),
        Literal::Int(v) => v.to_string(),
        Literal::Long(v) => v.to_string(),
        Literal::Char(v) => String::from_utf16_lossy(&[*v]),
        Literal::Float(v) => render_real(f64::from(*v)),
        Literal::Double(v) => render_real(*v),
        Literal::String(v) => v.clone(),
        Literal::Class(ty) => format!("class {}", ty),
    }
}

fn render_real(value: f64) -> String {
    match value {
        v if v == f64::INFINITY => "Infinity".to_string(),
        v if v == f64::NEG_INFINITY => "-Infinity".to_string(),
        v => format!("{:?}", v),
    }
}

fn parse_literal(ty: &IrType, text: &str) -> Option<Literal> {
    Some(match ty {
        IrType::Bool => Literal::Bool(text.eq_ignore_ascii_case("true")),
        IrType::Byte => Literal::Byte(text.parse().ok()?),
        IrType::Short => Literal::Short(text.parse().ok()?),
        IrType::Int => Literal::Int(text.parse().ok()?),
        IrType::Long => Literal::Long(text.parse().ok()?),
        IrType::Float => Literal::Float(text.trim().parse().ok()?),
        IrType::Double => Literal::Double(text.trim().parse().ok()?),
        _ => return None,
    })
}

fn index_of(haystack: &[u16], needle: &[u16], from: usize) -> i32 {
    if needle.is_empty() {
        return from.min(haystack.len()) as i32;
    }
    if from >= haystack.len() {
        return -1;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| (pos + from) as i32)
        .unwrap_or(-1)
}

// ═══════════════════════════════════════════════════════════════════════════
// Transformer
// ═══════════════════════════════════════════════════════════════════════════

/// Folds literal-only subterms; remembers the first fault it hits
#[derive(Debug, Default)]
pub struct ConstantPropagator {
    error: Option<ConcolicError>,
}

impl ConstantPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `ps`, failing with the first contradiction or arithmetic fault
    pub fn run(&mut self, ps: &PredicateState) -> Result<PredicateState> {
        self.error = None;
        let folded = self.apply(ps);
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(folded),
        }
    }

    fn fail(&mut self, error: ConcolicError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn check_literals(&mut self, predicate: &Predicate, expect_equal: bool) {
        let (lhv, rhv) = match predicate.kind() {
            PredicateKind::Equality { lhv, rhv } | PredicateKind::Inequality { lhv, rhv } => {
                (lhv, rhv)
            }
            _ => return,
        };
        let (Some(a), Some(b)) = (lhv.as_literal(), rhv.as_literal()) else {
            return;
        };
        if literal_equals(a, b) == Some(!expect_equal) {
            tracing::error!("Obvious contradiction: {}", predicate);
            self.fail(ConcolicError::contradiction(predicate.to_string()));
        }
    }
}

impl Transformer for ConstantPropagator {
    fn transform_equality_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        self.check_literals(&predicate, true);
        Some(predicate)
    }

    fn transform_inequality_predicate(&mut self, predicate: Predicate) -> Option<Predicate> {
        self.check_literals(&predicate, false);
        Some(predicate)
    }

    fn transform_binary_term(&mut self, term: Term) -> Term {
        let TermKind::Binary { op, lhv, rhv } = term.kind() else {
            return term;
        };
        let (Some(a), Some(b)) = (
            lhv.as_literal().and_then(Number::from_literal),
            rhv.as_literal().and_then(Number::from_literal),
        ) else {
            return term;
        };
        match fold_arithmetic(*op, a, b) {
            Ok(Some(n)) => match n.into_literal(term.ty()) {
                Some(literal) => TermFactory::literal(literal),
                None => term,
            },
            Ok(None) => term,
            Err(error) => {
                tracing::debug!("Arithmetic fault folding {}: {}", term, error);
                self.fail(error);
                term
            }
        }
    }

    fn transform_cmp_term(&mut self, term: Term) -> Term {
        let TermKind::Cmp { op, lhv, rhv } = term.kind() else {
            return term;
        };
        match (lhv.as_literal(), rhv.as_literal()) {
            (Some(a), Some(b)) => fold_comparison(*op, a, b)
                .map(TermFactory::literal)
                .unwrap_or(term),
            _ => term,
        }
    }

    fn transform_neg_term(&mut self, term: Term) -> Term {
        let TermKind::Neg { operand } = term.kind() else {
            return term;
        };
        let negated = match operand.as_literal().and_then(Number::from_literal) {
            Some(Number::Int(v)) => Number::Int(v.wrapping_neg()),
            Some(Number::Long(v)) => Number::Long(v.wrapping_neg()),
            Some(Number::Float(v)) => Number::Float(-v),
            Some(Number::Double(v)) => Number::Double(-v),
            None => return term,
        };
        negated.into_literal(term.ty()).map(TermFactory::literal).unwrap_or(term)
    }

    fn transform_cast_term(&mut self, term: Term) -> Term {
        let TermKind::Cast { operand } = term.kind() else {
            return term;
        };
        match operand.as_literal() {
            Some(Literal::Null) => operand.clone(),
            Some(literal) => Number::from_literal(literal)
                .and_then(|n| n.into_literal(term.ty()))
                .map(TermFactory::literal)
                .unwrap_or(term),
            None => term,
        }
    }

    fn transform_ite_term(&mut self, term: Term) -> Term {
        let TermKind::Ite {
            cond,
            true_value,
            false_value,
        } = term.kind()
        else {
            return term;
        };
        match cond.as_literal() {
            Some(Literal::Bool(true)) => true_value.clone(),
            Some(Literal::Bool(false)) => false_value.clone(),
            _ => term,
        }
    }

    fn transform_equals_term(&mut self, term: Term) -> Term {
        let TermKind::Equals { lhv, rhv } = term.kind() else {
            return term;
        };
        match (lhv.as_literal(), rhv.as_literal()) {
            (Some(a), Some(b)) => literal_equals(a, b)
                .map(TermFactory::bool)
                .unwrap_or(term),
            _ => term,
        }
    }

    fn transform_concat_term(&mut self, term: Term) -> Term {
        let TermKind::Concat { lhv, rhv } = term.kind() else {
            return term;
        };
        match (string_of(lhv), string_of(rhv)) {
            (Some(a), Some(b)) => TermFactory::string(format!("{}{}", a, b)),
            _ => term,
        }
    }

    fn transform_char_at_term(&mut self, term: Term) -> Term {
        let TermKind::CharAt { string, index } = term.kind() else {
            return term;
        };
        let (Some(s), Some(i)) = (string_of(string), int_of(index)) else {
            return term;
        };
        let units: Vec<u16> = s.encode_utf16().collect();
        usize::try_from(i)
            .ok()
            .and_then(|i| units.get(i).copied())
            .map(TermFactory::char)
            .unwrap_or(term)
    }

    fn transform_string_length_term(&mut self, term: Term) -> Term {
        let TermKind::StringLength { string } = term.kind() else {
            return term;
        };
        match string_of(string) {
            Some(s) => TermFactory::int(s.encode_utf16().count() as i32),
            None => term,
        }
    }

    fn transform_string_contains_term(&mut self, term: Term) -> Term {
        let TermKind::StringContains { string, substring } = term.kind() else {
            return term;
        };
        match (string_of(string), string_of(substring)) {
            (Some(s), Some(sub)) => TermFactory::bool(s.contains(sub)),
            _ => term,
        }
    }

    fn transform_index_of_term(&mut self, term: Term) -> Term {
        let TermKind::IndexOf {
            string,
            substring,
            offset,
        } = term.kind()
        else {
            return term;
        };
        let (Some(s), Some(sub), Some(offset)) =
            (string_of(string), string_of(substring), int_of(offset))
        else {
            return term;
        };
        let haystack: Vec<u16> = s.encode_utf16().collect();
        let needle: Vec<u16> = sub.encode_utf16().collect();
        TermFactory::int(index_of(&haystack, &needle, offset.max(0) as usize))
    }

    fn transform_substring_term(&mut self, term: Term) -> Term {
        let TermKind::Substring {
            string,
            offset,
            length,
        } = term.kind()
        else {
            return term;
        };
        let (Some(s), Some(offset), Some(length)) =
            (string_of(string), int_of(offset), int_of(length))
        else {
            return term;
        };
        let units: Vec<u16> = s.encode_utf16().collect();
        let (Ok(start), Ok(count)) = (usize::try_from(offset), usize::try_from(length)) else {
            return term;
        };
        match units.get(start..start.saturating_add(count)) {
            Some(slice) => TermFactory::string(String::from_utf16_lossy(slice)),
            None => term,
        }
    }

    fn transform_to_string_term(&mut self, term: Term) -> Term {
        let TermKind::ToString { value } = term.kind() else {
            return term;
        };
        match value.as_literal() {
            Some(literal) => TermFactory::string(render_literal(literal)),
            None => term,
        }
    }

    fn transform_string_parse_term(&mut self, term: Term) -> Term {
        let TermKind::StringParse { string } = term.kind() else {
            return term;
        };
        string_of(string)
            .and_then(|s| parse_literal(term.ty(), s))
            .map(TermFactory::literal)
            .unwrap_or(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fold(term: &Term) -> Term {
        ConstantPropagator::new().transform_term(term)
    }

    fn int_binary(op: BinaryOpcode, a: i32, b: i32) -> Term {
        TermFactory::binary(IrType::Int, op, TermFactory::int(a), TermFactory::int(b))
    }

    #[test]
    fn test_int_arithmetic_wraps() {
        assert_eq!(fold(&int_binary(BinaryOpcode::Add, i32::MAX, 1)), TermFactory::int(i32::MIN));
        assert_eq!(fold(&int_binary(BinaryOpcode::Mul, 6, 7)), TermFactory::int(42));
        assert_eq!(fold(&int_binary(BinaryOpcode::Div, -7, 2)), TermFactory::int(-3));
        assert_eq!(fold(&int_binary(BinaryOpcode::Rem, -7, 2)), TermFactory::int(-1));
    }

    #[test]
    fn test_shift_distance_is_masked() {
        assert_eq!(fold(&int_binary(BinaryOpcode::Shl, 1, 33)), TermFactory::int(2));
        assert_eq!(fold(&int_binary(BinaryOpcode::Ushr, -1, 28)), TermFactory::int(15));
        assert_eq!(fold(&int_binary(BinaryOpcode::Shr, -16, 2)), TermFactory::int(-4));
    }

    #[test]
    fn test_promotion_to_double() {
        let term = TermFactory::binary(
            IrType::Double,
            BinaryOpcode::Add,
            TermFactory::int(1),
            TermFactory::double(0.5),
        );
        assert_eq!(fold(&term), TermFactory::double(1.5));
    }

    #[test]
    fn test_nested_terms_fold_bottom_up() {
        let inner = int_binary(BinaryOpcode::Sub, 10, 4);
        let outer = TermFactory::binary(IrType::Int, BinaryOpcode::Mul, inner, TermFactory::int(2));
        assert_eq!(fold(&outer), TermFactory::int(12));
    }

    #[test]
    fn test_symbolic_operand_is_left_alone() {
        let term = TermFactory::binary(
            IrType::Int,
            BinaryOpcode::Add,
            TermFactory::argument(IrType::Int, 0),
            TermFactory::int(1),
        );
        assert!(fold(&term).ptr_eq(&term));
    }

    #[test]
    fn test_real_equality_uses_epsilon() {
        let close = TermFactory::cmp(
            CmpOpcode::Eq,
            TermFactory::double(0.1 + 0.2),
            TermFactory::double(0.3),
        );
        assert_eq!(fold(&close), TermFactory::bool(true));

        let far = TermFactory::cmp(CmpOpcode::Eq, TermFactory::double(1.0), TermFactory::double(1.001));
        assert_eq!(fold(&far), TermFactory::bool(false));
    }

    #[test]
    fn test_three_way_compare_with_nan() {
        let nan = || TermFactory::double(f64::NAN);
        let one = || TermFactory::double(1.0);
        assert_eq!(fold(&TermFactory::cmp(CmpOpcode::Cmpg, nan(), one())), TermFactory::int(1));
        assert_eq!(fold(&TermFactory::cmp(CmpOpcode::Cmpl, nan(), one())), TermFactory::int(-1));
        assert_eq!(fold(&TermFactory::cmp(CmpOpcode::Lt, nan(), one())), TermFactory::bool(false));
        assert_eq!(
            fold(&TermFactory::cmp(CmpOpcode::Cmp, TermFactory::long(3), TermFactory::long(9))),
            TermFactory::int(-1)
        );
    }

    #[test]
    fn test_division_by_zero_is_arithmetic_fault() {
        let state = PredicateState::basic(vec![Predicate::state(PredicateKind::equality(
            TermFactory::value(IrType::Int, "x"),
            int_binary(BinaryOpcode::Div, 1, 0),
        ))]);
        let result = ConstantPropagator::new().run(&state);
        assert!(matches!(result, Err(ConcolicError::Arithmetic(_))));
    }

    #[test]
    fn test_obvious_contradiction() {
        let state = PredicateState::basic(vec![Predicate::path(PredicateKind::equality(
            int_binary(BinaryOpcode::Add, 1, 1),
            TermFactory::int(3),
        ))]);
        let result = ConstantPropagator::new().run(&state);
        assert!(matches!(result, Err(ConcolicError::Contradiction(_))));
    }

    #[test]
    fn test_trivially_true_predicate_is_kept() {
        let state = PredicateState::basic(vec![Predicate::path(PredicateKind::inequality(
            TermFactory::int(1),
            TermFactory::int(2),
        ))]);
        let result = ConstantPropagator::new().run(&state).unwrap();
        assert_eq!(result.size(), 1);
    }

    #[test]
    fn test_string_builtins() {
        let s = || TermFactory::string("hello");
        assert_eq!(fold(&TermFactory::string_length(s())), TermFactory::int(5));
        assert_eq!(fold(&TermFactory::char_at(s(), TermFactory::int(1))), TermFactory::char(u16::from(b'e')));
        assert_eq!(
            fold(&TermFactory::index_of(s(), TermFactory::string("l"), TermFactory::int(3))),
            TermFactory::int(3)
        );
        assert_eq!(
            fold(&TermFactory::substring(s(), TermFactory::int(1), TermFactory::int(3))),
            TermFactory::string("ell")
        );
        assert_eq!(
            fold(&TermFactory::concat(s(), TermFactory::string("!"))),
            TermFactory::string("hello!")
        );
        assert_eq!(
            fold(&TermFactory::string_parse(IrType::Int, TermFactory::string("42"))),
            TermFactory::int(42)
        );
        assert_eq!(fold(&TermFactory::to_string(TermFactory::double(1.0))), TermFactory::string("1.0"));
    }

    #[test]
    fn test_out_of_range_builtins_stay_symbolic() {
        let term = TermFactory::char_at(TermFactory::string("ab"), TermFactory::int(5));
        assert!(fold(&term).ptr_eq(&term));
        let parse = TermFactory::string_parse(IrType::Int, TermFactory::string("4x"));
        assert!(fold(&parse).ptr_eq(&parse));
    }

    #[test]
    fn test_ite_and_cast() {
        let ite = TermFactory::ite(
            IrType::Int,
            TermFactory::bool(false),
            TermFactory::int(1),
            TermFactory::int(2),
        );
        assert_eq!(fold(&ite), TermFactory::int(2));
        let cast = TermFactory::cast(IrType::Byte, TermFactory::int(300));
        assert_eq!(fold(&cast), TermFactory::byte(44));
    }
}
