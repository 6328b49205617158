//! Scalar values for keyedstore
//!
//! The remote table only understands two scalar kinds: strings and numbers.
//! Every key and attribute exchanged with it is a [`ScalarValue`].
//!
//! ## Equality Rules
//!
//! - Different kinds are NEVER equal (`String("1") != Number(1.0)`)
//! - Numbers compare by value, with `-0.0 == 0.0`
//! - NaN is equal to itself so values can be used as keys
//!
//! Ordering is total: all strings sort after all numbers, numbers use
//! `f64::total_cmp` after zero normalization.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The two scalar kinds the backend supports natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// UTF-8 string (`S`)
    #[serde(alias = "S", alias = "string")]
    String,
    /// Decimal number (`N`)
    #[serde(alias = "N", alias = "number")]
    Number,
}

impl ScalarType {
    /// Wire tag used by the remote service
    pub fn tag(&self) -> &'static str {
        match self {
            ScalarType::String => "S",
            ScalarType::Number => "N",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::String => write!(f, "String"),
            ScalarType::Number => write!(f, "Number"),
        }
    }
}

/// A typed scalar exchanged with the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// UTF-8 string
    String(String),
    /// 64-bit IEEE-754 number
    Number(f64),
}

impl ScalarValue {
    /// Kind of this value
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::String(_) => ScalarType::String,
            ScalarValue::Number(_) => ScalarType::Number,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s),
            ScalarValue::Number(_) => None,
        }
    }

    /// Try to get as f64
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(n) => Some(*n),
            ScalarValue::String(_) => None,
        }
    }

    /// Rendering used for cache keys and partition locks.
    ///
    /// Values that compare equal render identically, so `-0.0` renders as
    /// `0` like `0.0` does.
    pub fn cache_repr(&self) -> String {
        match self {
            ScalarValue::String(s) => s.clone(),
            ScalarValue::Number(n) if *n == 0.0 => "0".to_string(),
            ScalarValue::Number(n) => n.to_string(),
        }
    }

    /// Convert to a JSON value.
    ///
    /// Integral numbers become JSON integers. Non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ScalarValue::String(s) => serde_json::Value::String(s.clone()),
            ScalarValue::Number(n) => {
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
        }
    }

    fn normalized_bits(n: f64) -> u64 {
        if n == 0.0 {
            0.0f64.to_bits()
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarValue::String(a), ScalarValue::String(b)) => a == b,
            (ScalarValue::Number(a), ScalarValue::Number(b)) => {
                Self::normalized_bits(*a) == Self::normalized_bits(*b)
            }
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ScalarValue::String(s) => s.hash(state),
            ScalarValue::Number(n) => Self::normalized_bits(*n).hash(state),
        }
    }
}

impl Ord for ScalarValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ScalarValue::Number(a), ScalarValue::Number(b)) => {
                let a = if *a == 0.0 { 0.0 } else { *a };
                let b = if *b == 0.0 { 0.0 } else { *b };
                a.total_cmp(&b)
            }
            (ScalarValue::String(a), ScalarValue::String(b)) => a.cmp(b),
            (ScalarValue::Number(_), ScalarValue::String(_)) => Ordering::Less,
            (ScalarValue::String(_), ScalarValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(s) => f.write_str(s),
            ScalarValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::String(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::String(s)
    }
}

impl From<&String> for ScalarValue {
    fn from(s: &String) -> Self {
        ScalarValue::String(s.clone())
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Number(n)
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Number(n as f64)
    }
}

impl From<i32> for ScalarValue {
    fn from(n: i32) -> Self {
        ScalarValue::Number(n as f64)
    }
}

impl From<u32> for ScalarValue {
    fn from(n: u32) -> Self {
        ScalarValue::Number(n as f64)
    }
}
