use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Longest accepted todo content, in characters.
pub const CONTENT_MAX_CHARS: u64 = 60;

/// Untyped, string-keyed input as it arrives from a form or JSON body.
pub type FieldBag = Map<String, Value>;

// Validated request body for creating a new Todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateTodoSchema {
    #[validate(length(min = 1, message = "Content is required"))]
    #[validate(custom(function = "validate_max_chars", message = "Start small, 60 chars max"))]
    pub content: String,
}

fn validate_max_chars(content: &str) -> Result<(), validator::ValidationError> {
    if content.chars().count() as u64 > CONTENT_MAX_CHARS {
        return Err(validator::ValidationError::new("max_chars"));
    }
    Ok(())
}

// Request body for setting the completion flag of a Todo
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToggleTodoSchema {
    pub completed: bool,
}

/// Field name mapped to every message raised against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid input")?;
        for (field, messages) in &self.0 {
            write!(f, "; {field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, errors) in errors.field_errors() {
            for error in errors {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                fields.add(field.to_string(), message);
            }
        }
        fields
    }
}

/// Checks a raw field bag against the create schema without side effects.
pub fn validate_create(fields: &FieldBag) -> Result<CreateTodoSchema, FieldErrors> {
    let mut errors = FieldErrors::default();

    let content = match fields.get("content") {
        None | Some(Value::Null) => {
            errors.add("content", "Required");
            return Err(errors);
        }
        Some(Value::String(content)) => content.clone(),
        Some(other) => {
            errors.add(
                "content",
                format!("Expected string, received {}", value_kind(other)),
            );
            return Err(errors);
        }
    };

    let schema = CreateTodoSchema { content };
    schema.validate()?;
    Ok(schema)
}

/// Lifts url-encoded form fields into a field bag.
pub fn form_fields(form: HashMap<String, String>) -> FieldBag {
    form.into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn bag(value: Value) -> FieldBag {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test bags are objects"),
        }
    }

    #[test]
    fn accepts_content_within_bounds() {
        for len in [1, 2, 30, 59, 60] {
            let content = "x".repeat(len);
            let schema = validate_create(&bag(json!({ "content": content }))).unwrap();
            assert_eq!(schema.content, content);
        }
    }

    #[test]
    fn counts_characters_not_bytes() {
        let content = "é".repeat(60);
        assert!(validate_create(&bag(json!({ "content": content }))).is_ok());
    }

    #[test]
    fn rejects_empty_content() {
        let errors = validate_create(&bag(json!({ "content": "" }))).unwrap_err();
        assert_eq!(errors.get("content").unwrap(), ["Content is required"]);
    }

    #[test]
    fn rejects_content_over_sixty_chars() {
        let errors =
            validate_create(&bag(json!({ "content": "x".repeat(61) }))).unwrap_err();
        assert_eq!(errors.get("content").unwrap(), ["Start small, 60 chars max"]);
    }

    #[test]
    fn does_not_trim() {
        assert!(validate_create(&bag(json!({ "content": " " }))).is_ok());
        let padded = format!(" {} ", "x".repeat(59));
        assert!(validate_create(&bag(json!({ "content": padded }))).is_err());
    }

    #[test]
    fn missing_content_is_required() {
        let errors = validate_create(&FieldBag::new()).unwrap_err();
        assert_eq!(errors.get("content").unwrap(), ["Required"]);

        let errors = validate_create(&bag(json!({ "content": null }))).unwrap_err();
        assert_eq!(errors.get("content").unwrap(), ["Required"]);
    }

    #[test]
    fn non_string_content_is_rejected() {
        let errors = validate_create(&bag(json!({ "content": 42 }))).unwrap_err();
        assert_eq!(
            errors.get("content").unwrap(),
            ["Expected string, received number"]
        );
    }

    #[test]
    fn field_errors_serialize_as_plain_map() {
        let errors = validate_create(&FieldBag::new()).unwrap_err();
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({ "content": ["Required"] })
        );
    }

    #[test]
    fn form_fields_become_strings() {
        let mut form = HashMap::new();
        form.insert("content".to_string(), "Buy milk".to_string());
        let fields = form_fields(form);
        assert_eq!(fields["content"], json!("Buy milk"));
        assert!(validate_create(&fields).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        #[test]
        fn accepts_exactly_one_to_sixty_chars(
            content in prop::collection::vec(any::<char>(), 0..=80)
                .prop_map(|chars| chars.into_iter().collect::<String>())
        ) {
            let chars = content.chars().count();
            let result = validate_create(&bag(json!({ "content": &content })));
            if (1..=60).contains(&chars) {
                prop_assert_eq!(result.map(|schema| schema.content), Ok(content));
            } else {
                let errors = result.unwrap_err();
                prop_assert_eq!(errors.get("content").map(<[String]>::len), Some(1));
            }
        }
    }
}
