//! In-memory solver model
//!
//! Plain data a solver backend (or a test) fills in: term values plus the
//! objects and arrays living at heap addresses.

use crate::domain::ports::{Model, ModelValue};
use crate::features::state::domain::{Literal, Term};
use crate::shared::models::IrType;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
struct HeapObject {
    ty: IrType,
    fields: Vec<(String, IrType, ModelValue)>,
}

#[derive(Debug, Clone)]
struct HeapArray {
    ty: IrType,
    length: i32,
    elements: Vec<(i32, ModelValue)>,
}

#[derive(Debug, Clone, Default)]
pub struct HeapModel {
    values: FxHashMap<Term, ModelValue>,
    objects: FxHashMap<u64, HeapObject>,
    arrays: FxHashMap<u64, HeapArray>,
}

impl HeapModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, term: Term, value: ModelValue) -> Self {
        self.values.insert(term, value);
        self
    }

    pub fn with_object(
        mut self,
        address: u64,
        class: impl Into<String>,
        fields: Vec<(String, IrType, ModelValue)>,
    ) -> Self {
        self.objects.insert(
            address,
            HeapObject {
                ty: IrType::class(class),
                fields,
            },
        );
        self
    }

    pub fn with_array(
        mut self,
        address: u64,
        element_type: IrType,
        length: i32,
        elements: Vec<(i32, ModelValue)>,
    ) -> Self {
        self.arrays.insert(
            address,
            HeapArray {
                ty: IrType::array(element_type),
                length,
                elements,
            },
        );
        self
    }
}

impl Model for HeapModel {
    fn evaluate(&self, term: &Term) -> Option<ModelValue> {
        if let Some(literal) = term.as_literal() {
            return match literal {
                Literal::Null => Some(ModelValue::Null),
                Literal::Bool(v) => Some(ModelValue::Bool(*v)),
                Literal::Byte(v) => Some(ModelValue::Int(i64::from(*v))),
                Literal::Char(v) => Some(ModelValue::Int(i64::from(*v))),
                Literal::Short(v) => Some(ModelValue::Int(i64::from(*v))),
                Literal::Int(v) => Some(ModelValue::Int(i64::from(*v))),
                Literal::Long(v) => Some(ModelValue::Int(*v)),
                Literal::Float(v) => Some(ModelValue::Float(f64::from(*v))),
                Literal::Double(v) => Some(ModelValue::Float(*v)),
                Literal::String(_) | Literal::Class(_) => None,
            };
        }
        self.values.get(term).copied()
    }

    fn object_type(&self, address: u64) -> Option<IrType> {
        self.objects
            .get(&address)
            .map(|object| object.ty.clone())
            .or_else(|| self.arrays.get(&address).map(|array| array.ty.clone()))
    }

    fn fields(&self, address: u64) -> Vec<(String, IrType, ModelValue)> {
        self.objects
            .get(&address)
            .map(|object| object.fields.clone())
            .unwrap_or_default()
    }

    fn array_length(&self, address: u64) -> Option<i32> {
        self.arrays.get(&address).map(|array| array.length)
    }

    fn elements(&self, address: u64) -> Vec<(i32, ModelValue)> {
        self.arrays
            .get(&address)
            .map(|array| array.elements.clone())
            .unwrap_or_default()
    }
}
