use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::domain::ContactForm;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@<>]+@[^\s@<>]+\.[^\s@<>]+$").expect("valid email regex"));

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup tag regex"));

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Valid email is required";
pub const MESSAGE_REQUIRED: &str = "Message is required";

/// Outcome of checking a contact form. Every field is checked; violations are not short-circuited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Field-attributed validation failures keyed by form field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(pub BTreeMap<String, String>);

/// Strips `<...>` tags, then escapes the `&` and `>` characters left behind.
pub fn sanitize(input: &str) -> String {
    let stripped = MARKUP_TAG.replace_all(input, "");
    stripped.replace('&', "&amp;").replace('>', "&gt;")
}

/// Checks the form and rewrites the fields that pass with their trimmed, sanitized values.
pub fn validate_form(form: &mut ContactForm) -> ValidationReport {
    let mut errors = BTreeMap::new();

    match cleaned_text(form.name.as_deref()) {
        Some(name) => form.name = Some(name),
        None => {
            errors.insert("name".to_string(), NAME_REQUIRED.to_string());
        }
    }

    let email = form.email.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() || !EMAIL_SHAPE.is_match(email) {
        errors.insert("email".to_string(), EMAIL_REQUIRED.to_string());
    } else {
        form.email = Some(email.to_string());
    }

    match cleaned_text(form.message.as_deref()) {
        Some(message) => form.message = Some(message),
        None => {
            errors.insert("message".to_string(), MESSAGE_REQUIRED.to_string());
        }
    }

    // Optional fields are never rejected.
    form.phone = form.phone.as_deref().map(clean);
    form.company = form.company.as_deref().map(clean);

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Trims, sanitizes, then trims again so markup around whitespace collapses to nothing.
fn clean(raw: &str) -> String {
    sanitize(raw.trim()).trim().to_string()
}

fn cleaned_text(raw: Option<&str>) -> Option<String> {
    let sanitized = clean(raw.unwrap_or_default());
    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    }
}
