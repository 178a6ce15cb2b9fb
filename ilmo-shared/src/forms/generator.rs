/// Field generator: descriptors in, a per-call form out
///
/// Each field type name maps to one builder function in [`FIELD_BUILDERS`].

use super::{FieldDescriptor, FieldKind, FieldSpecError, FormField};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const DEFAULT_TEXT_MAX_LENGTH: i64 = 500;
pub const DEFAULT_TEXTAREA_MAX_LENGTH: i64 = 9999;
pub const DEFAULT_INTEGER_MAX: i64 = 999_999_999;
pub const DEFAULT_INTEGER_MIN: i64 = -999_999_999;

pub type FieldBuilder = fn(&FieldDescriptor) -> Result<FieldKind, FieldSpecError>;

/// Type name to builder
pub const FIELD_BUILDERS: &[(&str, FieldBuilder)] = &[
    ("text", build_text),
    ("email", build_email),
    ("textarea", build_textarea),
    ("integer", build_integer),
    ("select", build_select),
    ("radioselect", build_radioselect),
    ("checkbox", build_checkbox),
];

fn length_limit(
    descriptor: &FieldDescriptor,
    key: &'static str,
    value: Option<&Value>,
    default: i64,
) -> Result<usize, FieldSpecError> {
    let length = descriptor.int_setting(key, value, default)?;
    usize::try_from(length).map_err(|_| FieldSpecError::InvalidNumber {
        name: descriptor.name.clone(),
        key,
    })
}

fn build_text(descriptor: &FieldDescriptor) -> Result<FieldKind, FieldSpecError> {
    Ok(FieldKind::Text {
        max_length: length_limit(
            descriptor,
            "max_length",
            descriptor.max_length.as_ref(),
            DEFAULT_TEXT_MAX_LENGTH,
        )?,
    })
}

fn build_email(_descriptor: &FieldDescriptor) -> Result<FieldKind, FieldSpecError> {
    Ok(FieldKind::Email)
}

fn build_textarea(descriptor: &FieldDescriptor) -> Result<FieldKind, FieldSpecError> {
    // textarea limits live under max_value; max_length is ignored here
    Ok(FieldKind::Textarea {
        max_length: length_limit(
            descriptor,
            "max_value",
            descriptor.max_value.as_ref(),
            DEFAULT_TEXTAREA_MAX_LENGTH,
        )?,
    })
}

fn build_integer(descriptor: &FieldDescriptor) -> Result<FieldKind, FieldSpecError> {
    Ok(FieldKind::Integer {
        max_value: descriptor.int_setting(
            "max_value",
            descriptor.max_value.as_ref(),
            DEFAULT_INTEGER_MAX,
        )?,
        min_value: descriptor.int_setting(
            "min_value",
            descriptor.min_value.as_ref(),
            DEFAULT_INTEGER_MIN,
        )?,
    })
}

fn build_select(descriptor: &FieldDescriptor) -> Result<FieldKind, FieldSpecError> {
    Ok(FieldKind::Select {
        choices: descriptor.choices()?,
    })
}

fn build_radioselect(descriptor: &FieldDescriptor) -> Result<FieldKind, FieldSpecError> {
    Ok(FieldKind::RadioSelect {
        choices: descriptor.choices()?,
    })
}

fn build_checkbox(_descriptor: &FieldDescriptor) -> Result<FieldKind, FieldSpecError> {
    Ok(FieldKind::Checkbox)
}

/// Looks up the builder registered for a type name
pub fn builder_for(field_type: &str) -> Option<FieldBuilder> {
    FIELD_BUILDERS
        .iter()
        .find(|(name, _)| *name == field_type)
        .map(|(_, builder)| *builder)
}

/// Builds one form field from its descriptor
pub fn build_field(descriptor: &FieldDescriptor) -> Result<FormField, FieldSpecError> {
    let builder =
        builder_for(&descriptor.field_type).ok_or_else(|| FieldSpecError::UnknownFieldType {
            name: descriptor.name.clone(),
            field_type: descriptor.field_type.clone(),
        })?;

    Ok(FormField {
        name: descriptor.name.clone(),
        label: descriptor.label().to_string(),
        required: descriptor.is_required(),
        kind: builder(descriptor)?,
    })
}

/// Generates the form for a field specification
///
/// A later descriptor reusing a name replaces the earlier field in place.
///
/// # Errors
///
/// Fails on the first descriptor with an unknown type or invalid settings.
pub fn generate_form(descriptors: &[FieldDescriptor]) -> Result<DynamicForm, FieldSpecError> {
    let mut form = DynamicForm::default();
    for descriptor in descriptors {
        form.insert(build_field(descriptor)?);
    }
    Ok(form)
}

/// One field's validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered set of generated fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DynamicForm {
    fields: Vec<FormField>,
}

impl DynamicForm {
    fn insert(&mut self, field: FormField) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates submitted values
    ///
    /// Returns the cleaned values in field order, or every field error.
    /// Submitted keys that are not form fields are ignored.
    pub fn clean(
        &self,
        data: &HashMap<String, String>,
    ) -> Result<Map<String, Value>, Vec<FieldError>> {
        let mut cleaned = Map::new();
        let mut errors = Vec::new();

        for field in &self.fields {
            match field.clean(data.get(&field.name).map(String::as_str)) {
                Ok(value) => {
                    cleaned.insert(field.name.clone(), value);
                }
                Err(message) => errors.push(FieldError {
                    field: field.name.clone(),
                    message,
                }),
            }
        }

        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }
}
