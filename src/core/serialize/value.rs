//! Typed view of a field value for CSV cells

use serde_json::Value;
use std::borrow::Cow;

/// A field value classified by how it is rendered in a CSV cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Field absent or `null`
    Null,
    /// Boolean, rendered as `true` / `false`
    Boolean(bool),
    /// Number, rendered verbatim
    Number(&'a serde_json::Number),
    /// Text, rendered verbatim (the CSV writer quotes it as needed)
    Text(&'a str),
    /// Array or object, rendered as its JSON text
    Structured(&'a Value),
}

impl<'a> FieldValue<'a> {
    /// Classify an optional value; a missing field is [`FieldValue::Null`]
    pub fn classify(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => FieldValue::Null,
            Some(Value::Bool(b)) => FieldValue::Boolean(*b),
            Some(Value::Number(n)) => FieldValue::Number(n),
            Some(Value::String(s)) => FieldValue::Text(s),
            Some(other) => FieldValue::Structured(other),
        }
    }

    /// The cell text
    pub fn render(&self) -> Cow<'a, str> {
        match *self {
            FieldValue::Null => Cow::Borrowed(""),
            FieldValue::Boolean(true) => Cow::Borrowed("true"),
            FieldValue::Boolean(false) => Cow::Borrowed("false"),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Structured(v) => Cow::Owned(v.to_string()),
        }
    }
}
