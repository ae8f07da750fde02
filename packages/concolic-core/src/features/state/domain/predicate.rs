//! Predicates: single symbolic facts over terms

use super::term::{Literal, Term};
use super::term_factory::TermFactory;
use std::fmt;

/// Role of a predicate within a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PredicateType {
    /// Plain assignment
    State,
    /// Branch condition actually taken
    Path,
    /// Unchecked assumption
    Assume,
    /// Solver-level fact
    Axiom,
    /// Precondition
    Require,
}

impl fmt::Display for PredicateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            PredicateType::State => "@S",
            PredicateType::Path => "@P",
            PredicateType::Assume => "@A",
            PredicateType::Axiom => "@AX",
            PredicateType::Require => "@R",
        };
        f.write_str(tag)
    }
}

/// Source position of the instruction a predicate came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub source: Option<String>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    Equality { lhv: Term, rhv: Term },
    Inequality { lhv: Term, rhv: Term },
    Call { lhv: Option<Term>, call: Term },
    ArrayStore { array_ref: Term, value: Term },
    FieldStore { field: Term, value: Term },
    NewObject { lhv: Term },
    NewArray { lhv: Term, dimensions: Vec<Term> },
    GenerateArray { lhv: Term, length: Term, generator: Term },
    Throw { throwable: Term },
    Catch { throwable: Term },
}

impl PredicateKind {
    pub fn equality(lhv: Term, rhv: Term) -> Self {
        PredicateKind::Equality { lhv, rhv }
    }

    pub fn inequality(lhv: Term, rhv: Term) -> Self {
        PredicateKind::Inequality { lhv, rhv }
    }

    pub fn call(lhv: Option<Term>, call: Term) -> Self {
        PredicateKind::Call { lhv, call }
    }
}

/// A single logical fact
///
/// Equality ignores the source location.
#[derive(Debug, Clone)]
pub struct Predicate {
    kind: PredicateKind,
    ptype: PredicateType,
    location: Location,
}

impl Predicate {
    pub fn new(kind: PredicateKind, ptype: PredicateType) -> Self {
        Self {
            kind,
            ptype,
            location: Location::default(),
        }
    }

    pub fn state(kind: PredicateKind) -> Self {
        Self::new(kind, PredicateType::State)
    }

    pub fn path(kind: PredicateKind) -> Self {
        Self::new(kind, PredicateType::Path)
    }

    pub fn assume(kind: PredicateKind) -> Self {
        Self::new(kind, PredicateType::Assume)
    }

    pub fn axiom(kind: PredicateKind) -> Self {
        Self::new(kind, PredicateType::Axiom)
    }

    pub fn require(kind: PredicateKind) -> Self {
        Self::new(kind, PredicateType::Require)
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_type(&self, ptype: PredicateType) -> Self {
        Self {
            kind: self.kind.clone(),
            ptype,
            location: self.location.clone(),
        }
    }

    pub fn kind(&self) -> &PredicateKind {
        &self.kind
    }

    pub fn ptype(&self) -> PredicateType {
        self.ptype
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn is_path(&self) -> bool {
        self.ptype == PredicateType::Path
    }

    pub fn operands(&self) -> Vec<&Term> {
        match &self.kind {
            PredicateKind::Equality { lhv, rhv } | PredicateKind::Inequality { lhv, rhv } => {
                vec![lhv, rhv]
            }
            PredicateKind::Call { lhv, call } => lhv.iter().chain(std::iter::once(call)).collect(),
            PredicateKind::ArrayStore { array_ref, value } => vec![array_ref, value],
            PredicateKind::FieldStore { field, value } => vec![field, value],
            PredicateKind::NewObject { lhv } => vec![lhv],
            PredicateKind::NewArray { lhv, dimensions } => {
                std::iter::once(lhv).chain(dimensions.iter()).collect()
            }
            PredicateKind::GenerateArray {
                lhv,
                length,
                generator,
            } => vec![lhv, length, generator],
            PredicateKind::Throw { throwable } | PredicateKind::Catch { throwable } => {
                vec![throwable]
            }
        }
    }

    /// Rebuild with every operand passed through `f`; `self` when nothing changed
    pub fn map_operands(&self, mut f: impl FnMut(&Term) -> Term) -> Predicate {
        let mut changed = false;
        let mut g = |t: &Term| {
            let mapped = f(t);
            if !mapped.ptr_eq(t) && mapped != *t {
                changed = true;
            }
            mapped
        };
        let kind = match &self.kind {
            PredicateKind::Equality { lhv, rhv } => PredicateKind::Equality {
                lhv: g(lhv),
                rhv: g(rhv),
            },
            PredicateKind::Inequality { lhv, rhv } => PredicateKind::Inequality {
                lhv: g(lhv),
                rhv: g(rhv),
            },
            PredicateKind::Call { lhv, call } => PredicateKind::Call {
                lhv: lhv.as_ref().map(&mut g),
                call: g(call),
            },
            PredicateKind::ArrayStore { array_ref, value } => PredicateKind::ArrayStore {
                array_ref: g(array_ref),
                value: g(value),
            },
            PredicateKind::FieldStore { field, value } => PredicateKind::FieldStore {
                field: g(field),
                value: g(value),
            },
            PredicateKind::NewObject { lhv } => PredicateKind::NewObject { lhv: g(lhv) },
            PredicateKind::NewArray { lhv, dimensions } => PredicateKind::NewArray {
                lhv: g(lhv),
                dimensions: dimensions.iter().map(&mut g).collect(),
            },
            PredicateKind::GenerateArray {
                lhv,
                length,
                generator,
            } => PredicateKind::GenerateArray {
                lhv: g(lhv),
                length: g(length),
                generator: g(generator),
            },
            PredicateKind::Throw { throwable } => PredicateKind::Throw {
                throwable: g(throwable),
            },
            PredicateKind::Catch { throwable } => PredicateKind::Catch {
                throwable: g(throwable),
            },
        };
        if changed {
            Predicate {
                kind,
                ptype: self.ptype,
                location: self.location.clone(),
            }
        } else {
            self.clone()
        }
    }

    /// Logical negation, keeping type and location
    ///
    /// `x == true` becomes `x == false` (and vice versa); any other equality
    /// becomes an inequality and an inequality becomes an equality. Other
    /// predicate kinds have no inverse and are returned unchanged.
    pub fn inverse(&self) -> Predicate {
        let kind = match &self.kind {
            PredicateKind::Equality { lhv, rhv } => match rhv.as_literal() {
                Some(Literal::Bool(value)) => PredicateKind::Equality {
                    lhv: lhv.clone(),
                    rhv: TermFactory::bool(!value),
                },
                _ => PredicateKind::Inequality {
                    lhv: lhv.clone(),
                    rhv: rhv.clone(),
                },
            },
            PredicateKind::Inequality { lhv, rhv } => PredicateKind::Equality {
                lhv: lhv.clone(),
                rhv: rhv.clone(),
            },
            _ => return self.clone(),
        };
        Predicate {
            kind,
            ptype: self.ptype,
            location: self.location.clone(),
        }
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.ptype == other.ptype && self.kind == other.kind
    }
}

impl Eq for Predicate {}

impl std::hash::Hash for Predicate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ptype.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateKind::Equality { lhv, rhv } => write!(f, "{} = {}", lhv, rhv),
            PredicateKind::Inequality { lhv, rhv } => write!(f, "{} != {}", lhv, rhv),
            PredicateKind::Call { lhv: Some(lhv), call } => write!(f, "{} = {}", lhv, call),
            PredicateKind::Call { lhv: None, call } => write!(f, "{}", call),
            PredicateKind::ArrayStore { array_ref, value } => {
                write!(f, "*({}) = {}", array_ref, value)
            }
            PredicateKind::FieldStore { field, value } => write!(f, "*({}) = {}", field, value),
            PredicateKind::NewObject { lhv } => write!(f, "{} = new {}", lhv, lhv.ty()),
            PredicateKind::NewArray { lhv, dimensions } => {
                write!(f, "{} = new {}", lhv, lhv.ty().element_type().unwrap_or(lhv.ty()))?;
                for dimension in dimensions {
                    write!(f, "[{}]", dimension)?;
                }
                Ok(())
            }
            PredicateKind::GenerateArray {
                lhv,
                length,
                generator,
            } => write!(f, "{} = generate<{}>({}) {{ {} }}", lhv, lhv.ty(), length, generator),
            PredicateKind::Throw { throwable } => write!(f, "throw {}", throwable),
            PredicateKind::Catch { throwable } => write!(f, "catch {}", throwable),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ptype, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::IrType;

    fn cond() -> Term {
        TermFactory::value(IrType::Bool, "%cond")
    }

    #[test]
    fn test_inverse_flips_bool_literal() {
        let taken = Predicate::path(PredicateKind::equality(cond(), TermFactory::bool(true)));
        let flipped = taken.inverse();
        assert_eq!(
            flipped,
            Predicate::path(PredicateKind::equality(cond(), TermFactory::bool(false)))
        );
        assert_eq!(flipped.inverse(), taken);
    }

    #[test]
    fn test_inverse_swaps_equality_and_inequality() {
        let key = TermFactory::value(IrType::Int, "%key");
        let case = Predicate::path(PredicateKind::equality(key.clone(), TermFactory::int(3)));
        assert_eq!(
            case.inverse(),
            Predicate::path(PredicateKind::inequality(key, TermFactory::int(3)))
        );
        assert_eq!(case.inverse().inverse(), case);
    }

    #[test]
    fn test_location_is_not_identity() {
        let plain = Predicate::state(PredicateKind::equality(cond(), TermFactory::bool(true)));
        let located = plain.clone().with_location(Location {
            source: Some("Calc.java".into()),
            line: Some(4),
        });
        assert_eq!(plain, located);
    }

    #[test]
    fn test_display() {
        let p = Predicate::path(PredicateKind::equality(cond(), TermFactory::bool(true)));
        assert_eq!(p.to_string(), "@P %cond = true");
    }
}
