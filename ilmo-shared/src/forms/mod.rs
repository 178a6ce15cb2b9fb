/// Dynamic registration forms
///
/// Each event stores a field specification (a JSON array of
/// [`FieldDescriptor`]s). [`validate_field_spec`] checks an uploaded
/// specification, [`generate_form`] turns descriptors into a [`DynamicForm`],
/// and [`DynamicForm::clean`] validates a submission against it.
///
/// # Example
///
/// ```
/// use ilmo_shared::forms::{generate_form, validate_field_spec};
/// use std::collections::HashMap;
///
/// let spec = validate_field_spec(br#"[
///     {"type": "text", "name": "name", "label": "Name", "required": true},
///     {"type": "checkbox", "name": "sauna", "label": "Sauna"}
/// ]"#).unwrap();
/// let form = generate_form(&spec).unwrap();
///
/// let mut data = HashMap::new();
/// data.insert("name".to_string(), "Jane Doe".to_string());
/// let cleaned = form.clean(&data).unwrap();
/// assert_eq!(cleaned["sauna"], false);
/// ```

pub mod descriptor;
pub mod field;
pub mod generator;

pub use descriptor::{validate_field_spec, FieldDescriptor};
pub use field::{FieldKind, FormField};
pub use generator::{build_field, generate_form, DynamicForm, FieldError};

/// Errors raised while validating or generating a field specification
#[derive(Debug, thiserror::Error)]
pub enum FieldSpecError {
    /// Payload is not a JSON array
    #[error("Field specification is not a valid JSON array: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Field #{index} is not a JSON object")]
    NotAnObject { index: usize },

    /// A mandatory descriptor key is absent
    #[error("Field #{index} is missing required key '{key}'")]
    MissingKey { key: &'static str, index: usize },

    #[error("Field #{index} is malformed: {message}")]
    InvalidDescriptor { index: usize, message: String },

    /// `type` names no known field builder
    #[error("Field '{name}' has unknown type '{field_type}'")]
    UnknownFieldType { name: String, field_type: String },

    #[error("Field '{name}' has a non-integer '{key}'")]
    InvalidNumber { name: String, key: &'static str },

    #[error("Field '{name}' needs an 'options' list")]
    MissingOptions { name: String },

    #[error("Field '{name}' has 'options' that is not a list")]
    InvalidOptions { name: String },
}

impl FieldSpecError {
    /// Whether the error comes from descriptor contents rather than structure
    ///
    /// Structural errors (bad JSON, missing `type`/`name`) are rejected before
    /// any field is built.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            FieldSpecError::InvalidJson(_)
                | FieldSpecError::NotAnObject { .. }
                | FieldSpecError::MissingKey { .. }
                | FieldSpecError::InvalidDescriptor { .. }
        )
    }
}
