//! Browser form payloads and their field-level validation.
//!
//! Every field carries `#[serde(default)]` so that a missing field is a
//! validation error rendered next to the input, never a rejected request.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// Key under which errors not tied to one field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

const DATETIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Field name -> messages, ready for a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Run the derived validation rules, collecting failures.
    pub fn check<T: Validate>(form: &T) -> Self {
        match form.validate() {
            Ok(()) => Self::new(),
            Err(errors) => errors.into(),
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, failures) in errors.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                out.add(&field, message);
            }
        }
        out
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "This field is required."));
    }
    Ok(())
}

fn valid_pub_date(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    parse_datetime(value)
        .map(|_| ())
        .ok_or_else(|| error("invalid_datetime", "Enter a valid date/time."))
}

fn optional_uuid(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || Uuid::parse_str(value.trim()).is_ok() {
        return Ok(());
    }
    Err(error(
        "invalid_choice",
        "Select a valid choice. That choice is not one of the available choices.",
    ))
}

fn valid_username(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-');
    if value.trim().chars().all(allowed) {
        return Ok(());
    }
    Err(error(
        "invalid_username",
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
    ))
}

fn optional_email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_email() {
        return Ok(());
    }
    Err(error("invalid_email", "Enter a valid email address."))
}

/// Parse a `datetime-local` style value as UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Render a timestamp the way a `datetime-local` input expects it.
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M").to_string()
}

/// An optional foreign-key choice; the empty string means "none".
pub fn parse_optional_uuid(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}

/// Create/edit form for a post. The author is never part of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 256, message = "Ensure this value has at most 256 characters.")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub text: String,

    #[serde(default)]
    #[validate(custom(function = "valid_pub_date"))]
    pub pub_date: String,

    #[serde(default)]
    pub is_published: bool,

    #[serde(default)]
    #[validate(custom(function = "optional_uuid"))]
    pub location: String,

    #[serde(default)]
    #[validate(custom(function = "optional_uuid"))]
    pub category: String,
}

impl PostForm {
    /// Parsed `pub_date`; only meaningful once validation passed.
    pub fn pub_date(&self) -> Option<DateTime<Utc>> {
        parse_datetime(&self.pub_date)
    }

    pub fn category_id(&self) -> Option<Uuid> {
        parse_optional_uuid(&self.category)
    }

    pub fn location_id(&self) -> Option<Uuid> {
        parse_optional_uuid(&self.location)
    }
}

/// A comment on a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

/// The editable part of the current user's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(
        length(max = 150, message = "Ensure this value has at most 150 characters."),
        custom(function = "valid_username")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "optional_email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
}

/// Sign-in form. `next` is where to go afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub username: String,

    #[serde(default, skip_serializing)]
    #[validate(custom(function = "not_blank"))]
    pub password: String,

    #[serde(default)]
    pub next: String,
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegistrationForm {
    #[serde(default)]
    #[validate(
        length(max = 150, message = "Ensure this value has at most 150 characters."),
        custom(function = "valid_username")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "optional_email"))]
    pub email: String,

    #[serde(default, skip_serializing)]
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password1: String,

    #[serde(default, skip_serializing)]
    #[validate(must_match(other = "password1", message = "The two password fields didn't match."))]
    pub password2: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn post_form() -> PostForm {
        PostForm {
            title: "Hello".into(),
            text: "World".into(),
            pub_date: "2026-10-15T09:30".into(),
            is_published: true,
            location: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn test_valid_post_form() {
        let form = post_form();

        assert!(FormErrors::check(&form).is_empty());
        let date = form.pub_date().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2026, 10, 15));
        assert_eq!((date.hour(), date.minute()), (9, 30));
        assert_eq!(form.category_id(), None);
    }

    #[test]
    fn test_blank_fields_are_reported_per_field() {
        let form = PostForm {
            title: "   ".into(),
            text: String::new(),
            pub_date: "yesterday".into(),
            category: "not-a-uuid".into(),
            ..post_form()
        };

        let errors = FormErrors::check(&form);

        assert_eq!(errors.get("title"), Some(&["This field is required.".to_string()][..]));
        assert!(errors.get("text").is_some());
        assert_eq!(errors.get("pub_date"), Some(&["Enter a valid date/time.".to_string()][..]));
        assert!(errors.get("category").is_some());
        assert!(errors.get("location").is_none());
    }

    #[test]
    fn test_title_length_limit() {
        let form = PostForm {
            title: "x".repeat(257),
            ..post_form()
        };

        assert!(FormErrors::check(&form).get("title").is_some());
    }

    #[test]
    fn test_datetime_formats() {
        assert!(parse_datetime("2026-01-02 03:04:05").is_some());
        assert!(parse_datetime("2026-01-02T03:04:05").is_some());
        assert!(parse_datetime("02.01.2026").is_none());

        let date = parse_datetime("2026-01-02T03:04").unwrap();
        assert_eq!(format_datetime(date), "2026-01-02T03:04");
    }

    #[test]
    fn test_profile_form_rules() {
        let ok = ProfileForm {
            username: "anna.k+1".into(),
            email: String::new(),
            first_name: "Anna".into(),
            last_name: "Karenina".into(),
        };
        assert!(FormErrors::check(&ok).is_empty());

        let bad = ProfileForm {
            username: "anna k".into(),
            email: "not-an-email".into(),
            ..ok
        };
        let errors = FormErrors::check(&bad);
        assert!(errors.get("username").is_some());
        assert!(errors.get("email").is_some());
    }

    #[test]
    fn test_registration_passwords_must_match() {
        let form = RegistrationForm {
            username: "oblomov".into(),
            email: "oblomov@example.com".into(),
            password1: "sofa-forever".into(),
            password2: "sofa-forevr".into(),
        };

        let errors = FormErrors::check(&form);
        assert_eq!(
            errors.get("password2"),
            Some(&["The two password fields didn't match.".to_string()][..])
        );
        assert!(errors.get("password1").is_none());
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let form: CommentForm = serde_json::from_str("{}").unwrap();

        assert!(FormErrors::check(&form).get("text").is_some());
    }

    #[test]
    fn test_non_field_errors_and_serialization() {
        let mut errors = FormErrors::new();
        errors.add_non_field("Please enter a correct username and password.");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json[NON_FIELD_ERRORS][0],
            "Please enter a correct username and password."
        );
    }
}
