//! SQL values and parameter handling.
//!
//! Values never appear in generated SQL text: they are carried next to it and
//! bound by the driver.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A literal value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// A sequence, bound to `IN` / `NOT IN`.
    List(Vec<SqlValue>),
    /// Binary blob value.
    Blob(Vec<u8>),
}

/// The temporal shape of a text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    /// `YYYY-MM-DD`
    Date,
    /// `YYYY-MM-DD HH:MM:SS`
    Timestamp,
}

impl SqlValue {
    /// Builds a list value from any sequence of convertible items.
    #[must_use]
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        Self::List(items.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// Returns true for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the elements if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the value's shape, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Blob(_) => "blob",
        }
    }

    /// Detects text that is a calendar date or a timestamp.
    #[must_use]
    pub fn temporal(&self) -> Option<Temporal> {
        let Self::Text(text) = self else {
            return None;
        };
        if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() {
            Some(Temporal::Date)
        } else if NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").is_ok() {
            Some(Temporal::Timestamp)
        } else {
            None
        }
    }

    /// Converts a JSON value bound to `parameter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for JSON objects, which have no SQL
    /// counterpart.
    pub fn from_json(parameter: &str, value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(|item| Self::from_json(parameter, item))
                    .collect::<Result<_>>()?,
            ),
            Value::Object(_) => {
                return Err(Error::TypeMismatch {
                    parameter: parameter.to_string(),
                    expected: String::from("a scalar or a list"),
                    found: String::from("object"),
                });
            }
        })
    }
}

impl TryFrom<serde_json::Value> for SqlValue {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        Self::from_json("value", value)
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl<T: ToSqlValue, const N: usize> ToSqlValue for [T; N] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::list(self)
    }
}

impl ToSqlValue for Vec<i64> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::list(self)
    }
}

impl ToSqlValue for Vec<String> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::list(self)
    }
}

impl ToSqlValue for Vec<&str> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::list(self)
    }
}
