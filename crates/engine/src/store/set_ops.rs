//! Set algebra over JSON documents stored in `Value`
//!
//! The stored `Value` holds a JSON object whose named fields are arrays.
//! `union` appends to those arrays, `difference` removes matching elements.
//! Both run as remove, transform, put under the partition lock.

use super::KeyedStore;
use crate::error::{Result, StoreError};
use keyedstore_core::{Item, ScalarValue, Scalars, VALUE_ATTRIBUTE};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Set operation applied to array fields of a stored document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// Append every input element
    Union,
    /// Drop every element equal to an input element
    Difference,
}

impl SetOp {
    /// Lowercase operation name
    pub fn name(&self) -> &'static str {
        match self {
            SetOp::Union => "union",
            SetOp::Difference => "difference",
        }
    }

    /// Apply the operation to each named field of `document`.
    ///
    /// `union` creates a missing field; `difference` leaves it absent.
    ///
    /// # Errors
    ///
    /// `WrongType` if `document` is not an object or a named field is not an
    /// array.
    pub fn apply(&self, document: &mut Value, attributes: &[(String, Scalars)]) -> Result<()> {
        let kind = json_kind(document);
        let fields = document
            .as_object_mut()
            .ok_or_else(|| StoreError::wrong_type(VALUE_ATTRIBUTE, "JSON object", kind))?;
        for (name, values) in attributes {
            self.apply_field(fields, name, values)?;
        }
        Ok(())
    }

    fn apply_field(&self, fields: &mut Map<String, Value>, name: &str, values: &Scalars) -> Result<()> {
        let input: Vec<Value> = values.as_slice().iter().map(ScalarValue::to_json).collect();
        if !fields.contains_key(name) {
            if *self == SetOp::Union {
                fields.insert(name.to_string(), Value::Array(input));
            }
            return Ok(());
        }
        let current = match fields.get_mut(name) {
            Some(Value::Array(current)) => current,
            Some(other) => return Err(StoreError::wrong_type(name, "array", json_kind(other))),
            None => return Ok(()),
        };

        match self {
            SetOp::Union => current.extend(input),
            SetOp::Difference => {
                current.retain(|element| !input.iter().any(|removed| same_element(element, removed)))
            }
        }
        Ok(())
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JSON equality, except numbers compare by value so `1.0` matches `1`
fn same_element(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl KeyedStore {
    /// Append `attributes` to the array fields of the stored document and
    /// return the new document.
    pub async fn union(
        &self,
        partition: impl Into<ScalarValue>,
        sort: Option<ScalarValue>,
        attributes: Vec<(String, Scalars)>,
    ) -> Result<Value> {
        self.set_op(SetOp::Union, partition.into(), sort, &attributes)
            .await
    }

    /// Remove every element equal to one in `attributes` from the array
    /// fields of the stored document and return the new document.
    pub async fn difference(
        &self,
        partition: impl Into<ScalarValue>,
        sort: Option<ScalarValue>,
        attributes: Vec<(String, Scalars)>,
    ) -> Result<Value> {
        self.set_op(SetOp::Difference, partition.into(), sort, &attributes)
            .await
    }

    async fn set_op(
        &self,
        op: SetOp,
        partition: ScalarValue,
        sort: Option<ScalarValue>,
        attributes: &[(String, Scalars)],
    ) -> Result<Value> {
        self.ensure_initialized()?;
        self.schema.check_write_key(op.name(), &partition, sort.as_ref())?;

        let _partition = self.locks.lock(&partition.cache_repr()).await;
        self.invalidate(&partition, sort.as_ref());
        let previous = self.delete(&partition, sort.as_ref()).await?;

        let document = match Self::transform(op, &previous, attributes) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    "{} on {} failed, restoring previous item: {}",
                    op,
                    Self::describe_key(&partition, sort.as_ref()),
                    e
                );
                self.write(previous).await?;
                return Err(e);
            }
        };

        let mut item = self.schema.key_item(&partition, sort.as_ref());
        item.insert(
            VALUE_ATTRIBUTE.to_string(),
            ScalarValue::String(serde_json::to_string(&document)?),
        );
        self.write(item).await?;
        debug!(op = op.name(), "stored document");
        Ok(document)
    }

    fn transform(op: SetOp, previous: &Item, attributes: &[(String, Scalars)]) -> Result<Value> {
        let encoded = match previous.get(VALUE_ATTRIBUTE) {
            Some(ScalarValue::String(encoded)) => encoded,
            Some(ScalarValue::Number(_)) => {
                return Err(StoreError::wrong_type(VALUE_ATTRIBUTE, "JSON string", "number"));
            }
            None => return Err(StoreError::wrong_type(VALUE_ATTRIBUTE, "JSON string", "missing")),
        };
        let mut document: Value = serde_json::from_str(encoded)?;
        op.apply(&mut document, attributes)?;
        Ok(document)
    }
}
