//! TableLens Column Implementation
//!
//! A Column is an immutable-once-built, array-like container of typed values
//! indexed by row. Each Column carries a storage type ([`ColumnType`]) and the
//! capability tag derived from it ([`DType`]), which the engines dispatch on
//! instead of inspecting individual values.
//!
//! Every column accepts missing values. A `Float64(NaN)` is stored as
//! [`ColumnValue::Null`] so that "missing" has a single representation.

use crate::error::{LensError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::{self, Debug};

/// Column storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Int32,
    Int64,
    Float64,
    String,
    Bool,
}

impl ColumnType {
    /// Capability tag used by sort, aggregate and summary dispatch.
    pub fn dtype(self) -> DType {
        match self {
            ColumnType::Int32 | ColumnType::Int64 | ColumnType::Float64 => DType::Numeric,
            ColumnType::String => DType::Text,
            ColumnType::Bool => DType::Boolean,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Int32 => "int32",
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::String => "string",
            ColumnType::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Behavioural class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Numeric,
    Text,
    Boolean,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Numeric)
    }
}

/// Column value enum to support multiple types
///
/// Serializes untagged, so a value maps directly onto the matching JSON
/// scalar (`Null` becomes `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Bool(bool),
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ColumnValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int32(v) => Some(i64::from(*v)),
            ColumnValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value. `None` for text, booleans and nulls.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Int32(n) => Some(f64::from(*n)),
            ColumnValue::Int64(n) => Some(*n as f64),
            ColumnValue::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Int32(_) => "int32",
            ColumnValue::Int64(_) => "int64",
            ColumnValue::Float64(_) => "float64",
            ColumnValue::String(_) => "string",
            ColumnValue::Bool(_) => "bool",
            ColumnValue::Null => "null",
        }
    }

    /// Display label; missing values read as `"missing"`.
    pub fn label(&self) -> String {
        match self {
            ColumnValue::Null => "missing".to_string(),
            other => other.to_string(),
        }
    }

    /// The same number stored as `column_type` when the conversion is
    /// lossless. Anything else comes back unchanged.
    pub fn coerce_to(self, column_type: ColumnType) -> ColumnValue {
        match (self, column_type) {
            (ColumnValue::Int32(n), ColumnType::Int64) => ColumnValue::Int64(i64::from(n)),
            (ColumnValue::Int32(n), ColumnType::Float64) => ColumnValue::Float64(f64::from(n)),
            (ColumnValue::Int64(n), ColumnType::Int32) => {
                i32::try_from(n).map_or(ColumnValue::Int64(n), ColumnValue::Int32)
            }
            (ColumnValue::Int64(n), ColumnType::Float64) => ColumnValue::Float64(n as f64),
            (ColumnValue::Float64(f), ColumnType::Int32)
                if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) =>
            {
                ColumnValue::Int32(f as i32)
            }
            (ColumnValue::Float64(f), ColumnType::Int64)
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
            {
                ColumnValue::Int64(f as i64)
            }
            (value, _) => value,
        }
    }

    /// Natural ordering of two non-null values.
    ///
    /// Integers compare exactly, integer/float pairs compare numerically,
    /// strings lexicographically and booleans as `false < true`. Values of
    /// unrelated kinds fall back to a fixed kind rank so the result is total.
    pub fn natural_cmp(&self, other: &ColumnValue) -> Ordering {
        match (self, other) {
            (ColumnValue::String(a), ColumnValue::String(b)) => a.cmp(b),
            (ColumnValue::Bool(a), ColumnValue::Bool(b)) => a.cmp(b),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => match (a.to_f64(), b.to_f64()) {
                    (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                    _ => a.kind_rank().cmp(&b.kind_rank()),
                },
            },
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            ColumnValue::Bool(_) => 0,
            ColumnValue::Int32(_) | ColumnValue::Int64(_) | ColumnValue::Float64(_) => 1,
            ColumnValue::String(_) => 2,
            ColumnValue::Null => 3,
        }
    }

    /// Hashable identity used for grouping and distinct counts.
    pub(crate) fn key(&self) -> ValueKey {
        match self {
            ColumnValue::Int32(n) => ValueKey::Int(i64::from(*n)),
            ColumnValue::Int64(n) => ValueKey::Int(*n),
            ColumnValue::Float64(f) => {
                // -0.0 and 0.0 are the same group
                let f = if *f == 0.0 { 0.0 } else { *f };
                ValueKey::Float(f.to_bits())
            }
            ColumnValue::String(s) => ValueKey::Text(s.clone()),
            ColumnValue::Bool(b) => ValueKey::Bool(*b),
            ColumnValue::Null => ValueKey::Missing,
        }
    }

    /// Convert to a JSON scalar. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ColumnValue::Int32(n) => serde_json::Value::Number((*n).into()),
            ColumnValue::Int64(n) => serde_json::Value::Number((*n).into()),
            ColumnValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ColumnValue::String(s) => serde_json::Value::String(s.clone()),
            ColumnValue::Bool(b) => serde_json::Value::Bool(*b),
            ColumnValue::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Int32(n) => write!(f, "{}", n),
            ColumnValue::Int64(n) => write!(f, "{}", n),
            ColumnValue::Float64(v) => write!(f, "{}", v),
            ColumnValue::String(s) => f.write_str(s),
            ColumnValue::Bool(b) => write!(f, "{}", b),
            ColumnValue::Null => f.write_str("null"),
        }
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Int32(v)
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Int64(v)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Float64(v)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::String(v.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::String(v)
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Bool(v)
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ColumnValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Int(i64),
    Float(u64),
    Text(String),
    Bool(bool),
    Missing,
}

/// A named, typed sequence of values.
#[derive(Clone, PartialEq)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    values: Vec<ColumnValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Column {
            name: name.into(),
            column_type,
            values: Vec::new(),
        }
    }

    /// Build a column from values, validating each one against `column_type`.
    pub fn from_values(
        name: impl Into<String>,
        column_type: ColumnType,
        values: impl IntoIterator<Item = ColumnValue>,
    ) -> Result<Self> {
        let mut column = Column::new(name, column_type);
        for value in values {
            column.append(value)?;
        }
        Ok(column)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn dtype(&self) -> DType {
        self.column_type.dtype()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[ColumnValue] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&ColumnValue> {
        self.values.get(index)
    }

    /// Validate and convert value to the column's storage type
    fn validate_value(&self, value: ColumnValue) -> Result<ColumnValue> {
        match (value, self.column_type) {
            (ColumnValue::Null, _) => Ok(ColumnValue::Null),
            (ColumnValue::Float64(f), _) if f.is_nan() => Ok(ColumnValue::Null),
            (v @ ColumnValue::Int32(_), ColumnType::Int32) => Ok(v),
            (ColumnValue::Int32(n), ColumnType::Int64) => Ok(ColumnValue::Int64(i64::from(n))),
            (v @ ColumnValue::Int64(_), ColumnType::Int64) => Ok(v),
            (ColumnValue::Int32(n), ColumnType::Float64) => Ok(ColumnValue::Float64(f64::from(n))),
            (ColumnValue::Int64(n), ColumnType::Float64) => Ok(ColumnValue::Float64(n as f64)),
            (v @ ColumnValue::Float64(_), ColumnType::Float64) => Ok(v),
            (v @ ColumnValue::String(_), ColumnType::String) => Ok(v),
            (v @ ColumnValue::Bool(_), ColumnType::Bool) => Ok(v),
            (v, expected) => Err(LensError::TypeMismatch {
                column: self.name.clone(),
                expected: expected.to_string(),
                found: v.type_name().to_string(),
            }),
        }
    }

    /// Append a value while building the column.
    pub fn append(&mut self, value: ColumnValue) -> Result<()> {
        let value = self.validate_value(value)?;
        self.values.push(value);
        Ok(())
    }

    /// Fast numeric access. `None` for nulls, non-numeric values and
    /// out-of-range indices.
    #[inline]
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(ColumnValue::to_f64)
    }

    #[inline]
    pub fn is_null_at(&self, index: usize) -> bool {
        self.values.get(index).map_or(false, ColumnValue::is_null)
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Number of distinct non-missing values.
    pub fn unique_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .map(ColumnValue::key)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Non-missing numeric values in row order. Empty for non-numeric columns.
    pub fn numeric_values(&self) -> Vec<f64> {
        if !self.dtype().is_numeric() {
            return Vec::new();
        }
        self.values.iter().filter_map(ColumnValue::to_f64).collect()
    }

    /// Gather the rows at `indices`, in that order.
    pub(crate) fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            column_type: self.column_type,
            values: indices
                .iter()
                .map(|&i| self.values.get(i).cloned().unwrap_or(ColumnValue::Null))
                .collect(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnValue> {
        self.values.iter()
    }
}

impl Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column {{ name: '{}', type: {:?}, len: {} }}",
            self.name,
            self.column_type,
            self.len()
        )
    }
}
