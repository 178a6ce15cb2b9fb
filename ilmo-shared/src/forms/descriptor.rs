/// Field descriptors and the field-specification validator
///
/// A field specification is a JSON array of descriptor objects:
///
/// ```json
/// [
///   {"type": "text", "name": "name", "label": "Full name", "required": true},
///   {"type": "integer", "name": "age", "min_value": 0, "max_value": 120},
///   {"type": "select", "name": "diet", "options": ["none", "vegan"]}
/// ]
/// ```
///
/// Numeric settings are accepted as JSON integers, whole-valued floats or
/// numeric strings, and `required` follows JSON truthiness.

use super::FieldSpecError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a field specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field type name (`text`, `email`, `textarea`, `integer`, `select`,
    /// `radioselect`, `checkbox`)
    #[serde(rename = "type")]
    pub field_type: String,

    /// Form field name; also the key under which the answer is stored
    pub name: String,

    /// Label shown next to the input, defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Value>,

    /// Choices for `select` and `radioselect`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl FieldDescriptor {
    /// Creates a descriptor with only the two mandatory keys set
    pub fn new(field_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            name: name.into(),
            label: None,
            required: None,
            max_length: None,
            max_value: None,
            min_value: None,
            options: None,
        }
    }

    /// Label to display, falling back to the field name
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Whether the `required` setting is truthy
    pub fn is_required(&self) -> bool {
        self.required.as_ref().map_or(false, is_truthy)
    }

    /// Reads an integer setting, using `default` when the key is absent or null
    pub fn int_setting(
        &self,
        key: &'static str,
        value: Option<&Value>,
        default: i64,
    ) -> Result<i64, FieldSpecError> {
        let invalid = || FieldSpecError::InvalidNumber {
            name: self.name.clone(),
            key,
        };

        match value {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Number(n)) => n.as_i64().or_else(|| whole_number(n)).ok_or_else(invalid),
            Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }

    /// Reads the `options` array as display strings
    pub fn choices(&self) -> Result<Vec<String>, FieldSpecError> {
        match &self.options {
            Some(Value::Array(items)) => Ok(items.iter().map(choice_text).collect()),
            Some(_) => Err(FieldSpecError::InvalidOptions {
                name: self.name.clone(),
            }),
            None => Err(FieldSpecError::MissingOptions {
                name: self.name.clone(),
            }),
        }
    }
}

/// `12.0` reads as 12; fractional and out-of-range floats do not
fn whole_number(n: &serde_json::Number) -> Option<i64> {
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn choice_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON truthiness; any non-empty string is true, including "0" and "false"
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Parses and checks an uploaded field specification
///
/// Every entry must be an object carrying both `type` and `name`; `type` is
/// checked first. Field types are not resolved here, see
/// [`generate_form`](super::generate_form).
///
/// # Errors
///
/// - `InvalidJson` if the payload is not a JSON array
/// - `NotAnObject` if an entry is not an object
/// - `MissingKey` naming the first absent key and the entry index
/// - `InvalidDescriptor` if a present key has the wrong JSON type
///
/// # Example
///
/// ```
/// use ilmo_shared::forms::{validate_field_spec, FieldSpecError};
///
/// let ok = validate_field_spec(br#"[{"type": "text", "name": "city"}]"#).unwrap();
/// assert_eq!(ok[0].name, "city");
///
/// let err = validate_field_spec(br#"[{"type": "text"}]"#).unwrap_err();
/// assert!(matches!(err, FieldSpecError::MissingKey { key: "name", index: 0 }));
/// ```
pub fn validate_field_spec(payload: &[u8]) -> Result<Vec<FieldDescriptor>, FieldSpecError> {
    let entries: Vec<Value> = serde_json::from_slice(payload)?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            {
                let object = entry
                    .as_object()
                    .ok_or(FieldSpecError::NotAnObject { index })?;

                for key in ["type", "name"] {
                    if !object.contains_key(key) {
                        return Err(FieldSpecError::MissingKey { key, index });
                    }
                }
            }

            serde_json::from_value(entry).map_err(|e| FieldSpecError::InvalidDescriptor {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}
