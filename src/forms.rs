//! Validation of submitted to-do forms.
//!
//! Each form operation has one `clean_*` function that turns raw
//! `application/x-www-form-urlencoded` input into a validated payload, or into
//! [`FieldErrors`] keyed by field name. Rendering is left to the views.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::models::{NewTodoItem, TITLE_MAX_LENGTH, UpdateTodoItem};

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Raw form body. Every field is optional so that a missing title surfaces as
/// a field error instead of a rejected request.
#[derive(Debug, Clone, Default)]
pub struct TodoFormInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<String>,
}

impl TodoFormInput {
    /// Decodes an urlencoded body. When a field repeats, the last value wins;
    /// unknown fields are ignored and an undecodable body yields empty input.
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).unwrap_or_default();

        let mut input = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "title" => input.title = Some(value),
                "description" => input.description = Some(value),
                "completed" => input.completed = Some(value),
                _ => {}
            }
        }
        input
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
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
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Trims the title and checks it is present and short enough.
pub fn validate_title(raw: Option<&str>) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();
    let title = raw.map(str::trim).unwrap_or_default();
    let length = title.chars().count();

    if title.is_empty() {
        errors.add("title", REQUIRED_MESSAGE);
    } else if length > TITLE_MAX_LENGTH {
        errors.add(
            "title",
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                TITLE_MAX_LENGTH, length
            ),
        );
    }

    if errors.is_empty() {
        Ok(title.to_string())
    } else {
        Err(errors)
    }
}

fn clean_description(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}

/// Browsers omit unchecked checkboxes; `"false"` is accepted for scripted clients.
pub fn parse_checkbox(raw: Option<&str>) -> bool {
    match raw {
        None => false,
        Some(value) => !(value.is_empty() || value.eq_ignore_ascii_case("false")),
    }
}

pub fn clean_create(input: &TodoFormInput) -> Result<NewTodoItem, FieldErrors> {
    let title = validate_title(input.title.as_deref())?;
    Ok(NewTodoItem {
        title,
        description: Some(clean_description(input.description.as_deref())),
    })
}

pub fn clean_update(input: &TodoFormInput) -> Result<UpdateTodoItem, FieldErrors> {
    let title = validate_title(input.title.as_deref())?;
    Ok(UpdateTodoItem {
        title,
        description: clean_description(input.description.as_deref()),
        completed: parse_checkbox(input.completed.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(
        title: Option<&str>,
        description: Option<&str>,
        completed: Option<&str>,
    ) -> TodoFormInput {
        TodoFormInput {
            title: title.map(String::from),
            description: description.map(String::from),
            completed: completed.map(String::from),
        }
    }

    #[test]
    fn test_missing_title_is_required() {
        let errors = clean_create(&input(None, Some("Description only"), None)).unwrap_err();
        assert_eq!(errors.get("title"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
    }

    #[test]
    fn test_blank_title_is_required() {
        let errors = clean_create(&input(Some("   "), None, None)).unwrap_err();
        assert!(errors.get("title").is_some());
    }

    #[test]
    fn test_title_too_long() {
        let long = "x".repeat(TITLE_MAX_LENGTH + 1);
        let errors = clean_create(&input(Some(&long), None, None)).unwrap_err();
        let messages = errors.get("title").unwrap();
        assert!(messages[0].contains("at most 200 characters (it has 201)"));
    }

    #[test]
    fn test_create_defaults_description_to_empty() {
        let new = clean_create(&input(Some("  Buy milk "), None, None)).unwrap();
        assert_eq!(new.title, "Buy milk");
        assert_eq!(new.description.as_deref(), Some(""));
    }

    #[test]
    fn test_update_reads_checkbox() {
        let checked = clean_update(&input(Some("a"), Some("b"), Some("on"))).unwrap();
        assert!(checked.completed);
        let python_style = clean_update(&input(Some("a"), None, Some("True"))).unwrap();
        assert!(python_style.completed);
        let unchecked = clean_update(&input(Some("a"), None, None)).unwrap();
        assert!(!unchecked.completed);
        let explicit_false = clean_update(&input(Some("a"), None, Some("FALSE"))).unwrap();
        assert!(!explicit_false.completed);
    }

    #[test]
    fn test_from_urlencoded_decodes_fields() {
        let input = TodoFormInput::from_urlencoded(b"title=Buy+milk&description=2%25+fat&extra=1");
        assert_eq!(input.title.as_deref(), Some("Buy milk"));
        assert_eq!(input.description.as_deref(), Some("2% fat"));
        assert!(input.completed.is_none());
    }

    #[test]
    fn test_from_urlencoded_last_value_wins() {
        let input = TodoFormInput::from_urlencoded(b"title=a&completed=false&completed=on");
        assert_eq!(input.completed.as_deref(), Some("on"));
        assert!(clean_update(&input).unwrap().completed);

        let input = TodoFormInput::from_urlencoded(b"title=first&title=second");
        assert_eq!(input.title.as_deref(), Some("second"));
    }

    #[test]
    fn test_from_urlencoded_empty_body() {
        let input = TodoFormInput::from_urlencoded(b"");
        assert!(input.title.is_none());
        let errors = clean_create(&input).unwrap_err();
        assert_eq!(errors.get("title"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.add("title", REQUIRED_MESSAGE);
        assert_eq!(errors.to_string(), "title: This field is required.");
    }
}
