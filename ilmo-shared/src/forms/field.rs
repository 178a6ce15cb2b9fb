/// Concrete form fields and per-field cleaning
///
/// Cleaning turns the raw submitted string for one field into a typed JSON
/// value, or a single user-facing error message.

use serde::Serialize;
use serde_json::Value;
use validator::ValidateEmail;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Field type with its type-specific constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text { max_length: usize },
    Email,
    Textarea { max_length: usize },
    Integer { min_value: i64, max_value: i64 },
    Select { choices: Vec<String> },
    RadioSelect { choices: Vec<String> },
    Checkbox,
}

impl FieldKind {
    /// Name used in field specifications
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "text",
            FieldKind::Email => "email",
            FieldKind::Textarea { .. } => "textarea",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Select { .. } => "select",
            FieldKind::RadioSelect { .. } => "radioselect",
            FieldKind::Checkbox => "checkbox",
        }
    }

    /// Choices for select-like fields, empty otherwise
    pub fn choices(&self) -> &[String] {
        match self {
            FieldKind::Select { choices } | FieldKind::RadioSelect { choices } => choices,
            _ => &[],
        }
    }
}

/// A generated form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FormField {
    /// Cleans the raw submitted value (`None` when the key was not submitted)
    ///
    /// # Example
    ///
    /// ```
    /// use ilmo_shared::forms::{FieldKind, FormField};
    /// use serde_json::json;
    ///
    /// let age = FormField {
    ///     name: "age".to_string(),
    ///     label: "Age".to_string(),
    ///     required: true,
    ///     kind: FieldKind::Integer { min_value: 0, max_value: 120 },
    /// };
    ///
    /// assert_eq!(age.clean(Some(" 42 ")), Ok(json!(42)));
    /// assert!(age.clean(Some("121")).is_err());
    /// ```
    pub fn clean(&self, raw: Option<&str>) -> Result<Value, String> {
        match &self.kind {
            FieldKind::Text { max_length } | FieldKind::Textarea { max_length } => {
                self.clean_text(raw, Some(*max_length))
            }
            FieldKind::Email => {
                let value = self.clean_text(raw, None)?;
                match &value {
                    Value::String(address) if !address.is_empty() && !address.validate_email() => {
                        Err("Enter a valid email address.".to_string())
                    }
                    _ => Ok(value),
                }
            }
            FieldKind::Integer {
                min_value,
                max_value,
            } => self.clean_integer(raw, *min_value, *max_value),
            FieldKind::Select { choices } | FieldKind::RadioSelect { choices } => {
                let value = raw.map(str::trim).unwrap_or_default();
                if value.is_empty() {
                    return self.empty_string();
                }
                if choices.iter().any(|choice| choice == value) {
                    Ok(Value::String(value.to_string()))
                } else {
                    Err(format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        value
                    ))
                }
            }
            FieldKind::Checkbox => {
                let checked = match raw.map(str::trim) {
                    None => false,
                    Some(value) => !matches!(
                        value.to_ascii_lowercase().as_str(),
                        "" | "false" | "0" | "off"
                    ),
                };
                if self.required && !checked {
                    return Err(REQUIRED_MESSAGE.to_string());
                }
                Ok(Value::Bool(checked))
            }
        }
    }

    fn empty_string(&self) -> Result<Value, String> {
        if self.required {
            Err(REQUIRED_MESSAGE.to_string())
        } else {
            Ok(Value::String(String::new()))
        }
    }

    fn clean_text(&self, raw: Option<&str>, max_length: Option<usize>) -> Result<Value, String> {
        let value = raw.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return self.empty_string();
        }

        let length = value.chars().count();
        if let Some(max) = max_length {
            if length > max {
                return Err(format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, length
                ));
            }
        }

        Ok(Value::String(value.to_string()))
    }

    fn clean_integer(&self, raw: Option<&str>, min: i64, max: i64) -> Result<Value, String> {
        let value = raw.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return if self.required {
                Err(REQUIRED_MESSAGE.to_string())
            } else {
                Ok(Value::Null)
            };
        }

        let number: i64 = value
            .parse()
            .map_err(|_| "Enter a whole number.".to_string())?;

        if number > max {
            return Err(format!(
                "Ensure this value is less than or equal to {}.",
                max
            ));
        }
        if number < min {
            return Err(format!(
                "Ensure this value is greater than or equal to {}.",
                min
            ));
        }

        Ok(Value::from(number))
    }
}
