/// cdset Column Implementation
///
/// A Column is a named, append-only sequence of values indexed by row position.
/// Every column holds values of a single logical kind; the kind is fixed by the
/// first non-null value appended. Null can be stored in any column and is the
/// fill value for rows that predate the column.

use crate::error::{DatasetError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The closed set of value kinds a column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// No non-null value seen yet.
    Null,
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Null => "null",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
        }
    }
}

/// A single cell value.
///
/// Values carry a total order so they can key ordered maps and sets: within a
/// kind the natural order applies (floats use IEEE total ordering), and across
/// kinds `Null < Integer < Float < Text`. Cross-kind ordering only exists to keep
/// the order total; columns never mix kinds.
///
/// ```
/// use cdset::Value;
///
/// assert!(Value::Integer(1) < Value::Integer(2));
/// assert!(Value::Null < Value::Integer(i64::MIN));
/// assert_eq!(Value::from("a"), Value::Text("a".to_string()));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Value::Integer(_) => ColumnKind::Integer,
            Value::Float(_) => ColumnKind::Float,
            Value::Text(_) => ColumnKind::Text,
            Value::Null => ColumnKind::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) => 1,
            Value::Float(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Null, Value::Null) => Ordering::Equal,
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind_rank().hash(state);
        match self {
            Value::Integer(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// A named column of values owned by a `Dataset`.
#[derive(Clone)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: String) -> Self {
        Column {
            name,
            kind: ColumnKind::Null,
            values: Vec::new(),
        }
    }

    /// Create a column pre-filled with `len` nulls.
    ///
    /// Used when a row introduces a field after rows already exist: the column
    /// is allocated at the current dataset size before the row's value lands.
    pub fn with_nulls(name: String, len: usize) -> Self {
        Column {
            name,
            kind: ColumnKind::Null,
            values: vec![Value::Null; len],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    /// Check that `value` may be appended without mixing kinds.
    pub fn accepts(&self, value: &Value) -> Result<()> {
        match (self.kind, value.kind()) {
            (_, ColumnKind::Null) | (ColumnKind::Null, _) => Ok(()),
            (expected, found) if expected == found => Ok(()),
            (expected, found) => Err(DatasetError::TypeMismatch {
                column: self.name.clone(),
                expected: expected.name(),
                found: found.name(),
            }),
        }
    }

    pub fn append(&mut self, value: Value) -> Result<()> {
        self.accepts(&value)?;
        if self.kind == ColumnKind::Null {
            self.kind = value.kind();
        }
        self.values.push(value);
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column {{ name: '{}', kind: {:?}, len: {} }}",
            self.name,
            self.kind,
            self.len()
        )
    }
}
