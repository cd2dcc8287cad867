//! Purpose: Classify an untyped wire value into one of three container shapes.
//! Exports: `Data`, `Shape`.
//! Role: Entry point for every decode; wraps the root payload and nested members.
//! Invariants: Classification is total; non-container inputs become `Data::Empty`.
//! Invariants: A `Data` is never mutated after construction.
use serde_json::{Map, Value};

use crate::core::error::DecodeError;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Data {
    #[default]
    Empty,
    Dictionary(Map<String, Value>),
    Array(Vec<Value>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Shape {
    Empty,
    Dictionary,
    Array,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Empty => "empty",
            Shape::Dictionary => "dictionary",
            Shape::Array => "array",
        }
    }
}

impl Data {
    pub fn new(raw: impl Into<Option<Value>>) -> Self {
        match raw.into() {
            Some(Value::Object(map)) => Data::Dictionary(map),
            Some(Value::Array(items)) => Data::Array(items),
            Some(_) | None => Data::Empty,
        }
    }

    /// Classify a borrowed value, cloning only container contents.
    pub fn classify(raw: &Value) -> Self {
        match raw {
            Value::Object(map) => Data::Dictionary(map.clone()),
            Value::Array(items) => Data::Array(items.clone()),
            _ => Data::Empty,
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Data::Empty => Shape::Empty,
            Data::Dictionary(_) => Shape::Dictionary,
            Data::Array(_) => Shape::Array,
        }
    }

    pub fn is_empty_shape(&self) -> bool {
        matches!(self, Data::Empty)
    }

    pub fn as_dictionary(&self) -> Option<&Map<String, Value>> {
        match self {
            Data::Dictionary(map) => Some(map),
            Data::Empty | Data::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Data::Array(items) => Some(items.as_slice()),
            Data::Empty | Data::Dictionary(_) => None,
        }
    }

    /// Entry count for containers, zero for `Empty`.
    pub fn len(&self) -> usize {
        match self {
            Data::Empty => 0,
            Data::Dictionary(map) => map.len(),
            Data::Array(items) => items.len(),
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        match self {
            Data::Dictionary(map) => map.keys().map(String::as_str).collect(),
            Data::Empty | Data::Array(_) => Vec::new(),
        }
    }

    /// Raw member lookup; `None` for missing keys and non-dictionary receivers.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        match self {
            Data::Dictionary(map) => map.get(key),
            Data::Empty | Data::Array(_) => None,
        }
    }

    pub fn element(&self, index: usize) -> Result<Data, DecodeError> {
        match self {
            Data::Array(items) => items
                .get(index)
                .map(Data::classify)
                .ok_or(DecodeError::OutOfBounds {
                    index,
                    len: items.len(),
                }),
            Data::Empty | Data::Dictionary(_) => Err(DecodeError::OutOfBounds { index, len: 0 }),
        }
    }

    pub fn elements(&self) -> Vec<Data> {
        match self {
            Data::Array(items) => items.iter().map(Data::classify).collect(),
            Data::Empty | Data::Dictionary(_) => Vec::new(),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Data::Empty => Value::Null,
            Data::Dictionary(map) => Value::Object(map),
            Data::Array(items) => Value::Array(items),
        }
    }
}

impl From<Value> for Data {
    fn from(raw: Value) -> Self {
        Data::new(raw)
    }
}

impl From<Option<Value>> for Data {
    fn from(raw: Option<Value>) -> Self {
        Data::new(raw)
    }
}

impl From<()> for Data {
    fn from(_: ()) -> Self {
        Data::Empty
    }
}

impl From<Map<String, Value>> for Data {
    fn from(map: Map<String, Value>) -> Self {
        Data::Dictionary(map)
    }
}

impl From<Vec<Value>> for Data {
    fn from(items: Vec<Value>) -> Self {
        Data::Array(items)
    }
}
