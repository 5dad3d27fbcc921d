//! Scalar cell values and their CSV field rendering.

use std::borrow::Cow;

/// A single cell in a result row.
///
/// Source drivers surface every fetched cell as one of these variants;
/// anything without a numeric shape (dates, decimals rendered exactly,
/// UUIDs, …) travels as [`Value::Text`] and relies on the warehouse file
/// format's `AUTO` date/timestamp parsing on the way back in.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Render the value as a CSV field.
    ///
    /// `Null` becomes the empty string so the warehouse file format's
    /// `NULL_IF ('')` maps it back to NULL. Numeric variants render bare and
    /// stay unquoted under [`csv::QuoteStyle::NonNumeric`]; everything else
    /// gets enclosed in double quotes by the writer.
    pub fn to_field(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Bool(b) => Cow::Owned(b.to_string()),
            Value::Int(n) => Cow::Owned(n.to_string()),
            Value::Float(f) => Cow::Owned(f.to_string()),
            Value::Text(s) => Cow::Borrowed(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
