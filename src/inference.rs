//! Type inference for a single JSON sample.
//!
//! Every value maps to one [`InferredType`]. Arrays are typed from their first
//! element only; objects become references to child classes whose names come
//! from the pass's [`NameRegistry`].
//!
//! The key partition ([`field_iteration_order`]) and the date predicate
//! ([`str::classify_string`]) are shared with the fixture builder so both walk
//! and classify a sample identically.
pub mod str;
pub mod num;

use serde_json::{Map, Value};

use crate::case;
use crate::error::Result;
use crate::ir::InferredType;
use crate::naming::{NameRegistry, NameRequest};

pub use num::classify_number;
pub use str::classify_string;

// ------------------------------ Key partition ----------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Object,
    ObjectList,
    Scalar,
}

/// Follow first elements down nested arrays until something that is not an array.
pub fn first_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => items.first().and_then(|first| match first {
            Value::Array(_) | Value::Object(_) => first_object(first),
            _ => None,
        }),
        _ => None,
    }
}

pub fn key_kind(value: &Value) -> KeyKind {
    match value {
        Value::Object(_) => KeyKind::Object,
        Value::Array(_) if first_object(value).is_some() => KeyKind::ObjectList,
        _ => KeyKind::Scalar,
    }
}

/// Keys in declaration order for nested classes: objects, then lists of
/// objects, then everything else. Input key order is kept within each group.
pub fn field_iteration_order(map: &Map<String, Value>) -> Vec<(&str, KeyKind)> {
    let mut ordered = Vec::with_capacity(map.len());
    for wanted in [KeyKind::Object, KeyKind::ObjectList, KeyKind::Scalar] {
        for (key, value) in map {
            let kind = key_kind(value);
            if kind == wanted {
                ordered.push((key.as_str(), kind));
            }
        }
    }
    ordered
}

// ------------------------------ Resolver ---------------------------------- //

/// Infers field types, requesting child class names as references.
pub struct TypeResolver<'a> {
    registry: &'a mut NameRegistry,
    suffix: &'a str,
}

impl<'a> TypeResolver<'a> {
    pub fn new(registry: &'a mut NameRegistry, suffix: &'a str) -> Self {
        Self { registry, suffix }
    }

    pub fn resolve(
        &mut self,
        key: &str,
        value: &Value,
        current_class: &str,
        list_context: Option<&str>,
    ) -> Result<InferredType> {
        Ok(match value {
            Value::Bool(_) => InferredType::Bool,
            Value::Number(n) => classify_number(n),
            Value::String(s) => classify_string(s),
            Value::Null => InferredType::Dynamic,
            Value::Object(_) => InferredType::ObjectRef(self.reference(key, current_class, list_context)?),
            Value::Array(items) => match items.first() {
                None => InferredType::ListOf(Box::new(InferredType::Dynamic)),
                Some(first) => InferredType::ListOf(Box::new(self.resolve(key, first, current_class, list_context)?)),
            },
        })
    }

    fn reference(&mut self, key: &str, parent: &str, list_context: Option<&str>) -> Result<String> {
        let base = case::type_ident(key);
        self.registry.class_name(NameRequest {
            suffix: self.suffix,
            base: &base,
            is_root: false,
            is_definition: false,
            parent,
            list_context,
        })
    }
}
