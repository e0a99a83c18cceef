//! Client-side checks run before a write is sent.
//!
//! Failures here never reach the network; callers report them next to the
//! offending field.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} invalid field(s): {}", .errors.len(), summarize(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for a single field, if it failed.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub(crate) fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn require_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    message: &str,
) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

pub(crate) fn require_email(errors: &mut ValidationErrors, field: &'static str, value: Option<&str>) {
    match value.map(str::trim) {
        None | Some("") => errors.push(field, "Email is required"),
        Some(email) if !looks_like_email(email) => errors.push(field, "Invalid email address"),
        Some(_) => {}
    }
}

/// Loose `local@domain.tld` shape check, with an alphabetic TLD of two or
/// more characters.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && !host.starts_with('.')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("a@b.io"));
        assert!(looks_like_email("first.last+tag@mail.example.com"));

        assert!(!looks_like_email("plain"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("a@example"));
        assert!(!looks_like_email("a@example.c"));
        assert!(!looks_like_email("a@.com"));
        assert!(!looks_like_email("a@@example.com"));
        assert!(!looks_like_email("a b@example.com"));
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::default();
        errors.push("name", "Name is required");
        errors.push("email", "Invalid email address");
        assert_eq!(
            errors.to_string(),
            "2 invalid field(s): name: Name is required; email: Invalid email address"
        );
        assert_eq!(errors.for_field("email"), Some("Invalid email address"));
        assert_eq!(errors.for_field("phone"), None);
    }
}
