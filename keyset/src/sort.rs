use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Id, Result};

/// Sort direction for paginated listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    /// Ascending order (smallest to largest)
    Ascending,
    /// Descending order (largest to smallest)
    #[default]
    Descending,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        matches!(self, SortDirection::Ascending)
    }

    /// Applies this direction to an ordering computed in ascending terms.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Declared type of a sortable attribute.
///
/// The kind owns the string codec used inside cursors: for every value `v` of
/// this kind, `kind.decode(&v.encode()) == v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Timestamp,
    Integer,
    Float,
    Bool,
    /// Free text, and enums carried by their variant name.
    Text,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Timestamp => "timestamp",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Text => "text",
        }
    }

    /// Parses a value previously produced by [`SortValue::encode`].
    pub fn decode(self, raw: &str) -> Result<SortValue> {
        let invalid = |detail: String| {
            Error::invalid_cursor(format!("bad {} value {:?}: {}", self.name(), raw, detail))
        };

        match self {
            ValueKind::Timestamp => {
                let (secs, nanos) = raw
                    .split_once('.')
                    .ok_or_else(|| invalid("expected <seconds>.<nanoseconds>".to_string()))?;
                let secs = secs.parse::<i64>().map_err(|e| invalid(e.to_string()))?;
                let nanos = nanos.parse::<u32>().map_err(|e| invalid(e.to_string()))?;
                DateTime::from_timestamp(secs, nanos)
                    .map(SortValue::Timestamp)
                    .ok_or_else(|| invalid("out of range".to_string()))
            }
            ValueKind::Integer => raw
                .parse::<i64>()
                .map(SortValue::Integer)
                .map_err(|e| invalid(e.to_string())),
            ValueKind::Float => raw
                .parse::<f64>()
                .map(SortValue::Float)
                .map_err(|e| invalid(e.to_string())),
            ValueKind::Bool => raw
                .parse::<bool>()
                .map(SortValue::Bool)
                .map_err(|e| invalid(e.to_string())),
            ValueKind::Text => Ok(SortValue::Text(raw.to_string())),
        }
    }
}

/// Value of a sortable attribute extracted from a row.
#[derive(Debug, Clone)]
pub enum SortValue {
    Timestamp(DateTime<Utc>),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl SortValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            SortValue::Timestamp(_) => ValueKind::Timestamp,
            SortValue::Integer(_) => ValueKind::Integer,
            SortValue::Float(_) => ValueKind::Float,
            SortValue::Bool(_) => ValueKind::Bool,
            SortValue::Text(_) => ValueKind::Text,
        }
    }

    /// Lossless string form, the inverse of [`ValueKind::decode`].
    pub fn encode(&self) -> String {
        match self {
            // `<epoch seconds>.<nanoseconds>`; holds any `DateTime<Utc>`, including years past 9999.
            SortValue::Timestamp(ts) => format!("{}.{:09}", ts.timestamp(), ts.timestamp_subsec_nanos()),
            SortValue::Integer(v) => v.to_string(),
            // `Display` for f64 prints the shortest string that parses back to the same bits.
            SortValue::Float(v) => v.to_string(),
            SortValue::Bool(v) => v.to_string(),
            SortValue::Text(v) => v.clone(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Timestamp(_) => 0,
            SortValue::Integer(_) => 1,
            SortValue::Float(_) => 2,
            SortValue::Bool(_) => 3,
            SortValue::Text(_) => 4,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Timestamp(a), SortValue::Timestamp(b)) => a.cmp(b),
            (SortValue::Integer(a), SortValue::Integer(b)) => a.cmp(b),
            (SortValue::Float(a), SortValue::Float(b)) => a.total_cmp(b),
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

impl fmt::Display for SortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(value: DateTime<Utc>) -> Self {
        SortValue::Timestamp(value)
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Integer(value)
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        SortValue::Float(value)
    }
}

impl From<bool> for SortValue {
    fn from(value: bool) -> Self {
        SortValue::Bool(value)
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        SortValue::Text(value)
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

/// Position of a row in the `(value, id)` total order of one sort field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    /// The sort field's value at this position
    pub value: SortValue,
    /// Unique row id, breaks ties between equal values
    pub id: Id,
}

impl SortKey {
    pub fn new(value: impl Into<SortValue>, id: Id) -> Self {
        Self {
            value: value.into(),
            id,
        }
    }

    /// Compares two keys in page order for the given direction.
    pub fn cmp_directed(&self, other: &SortKey, direction: SortDirection) -> Ordering {
        direction.apply(self.cmp(other))
    }
}
