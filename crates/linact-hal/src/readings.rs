//! Sensor reading sets and typed field access

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

/// Named-field reading set returned by a sensor
pub type Readings = HashMap<String, Value>;

/// Failure to extract a scalar from a reading set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field is absent from the reading set
    #[error("position sensor field {field} not found")]
    Missing {
        /// Expected field name
        field: String,
    },

    /// The field exists but does not hold a number
    #[error("position sensor field {field} is not a number (got {observed})")]
    NotNumeric {
        /// Expected field name
        field: String,
        /// Shape of the value that was found
        observed: &'static str,
    },
}

/// Name the JSON shape of a reading value
#[must_use]
pub fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Look up `field` and return it as an `f64`
///
/// Integer and floating point numbers are accepted. Anything else is
/// rejected, never coerced.
///
/// # Errors
/// Returns `FieldError::Missing` when the field is absent and
/// `FieldError::NotNumeric` when it holds a non-numeric value
pub fn scalar_field(readings: &Readings, field: &str) -> Result<f64, FieldError> {
    let value = readings.get(field).ok_or_else(|| FieldError::Missing {
        field: field.to_string(),
    })?;

    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| FieldError::NotNumeric {
            field: field.to_string(),
            observed: "number",
        }),
        other => Err(FieldError::NotNumeric {
            field: field.to_string(),
            observed: value_shape(other),
        }),
    }
}
