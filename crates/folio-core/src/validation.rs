//! Contact form validation.
//!
//! Checks run in a fixed order and the first failure wins, so the user
//! always sees one actionable message. Accepted input is trimmed and its
//! free-text fields are HTML-escaped before it is stored.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::NewContactMessage;
use crate::utils::sanitize_html;

pub const NAME_LEN: (usize, usize) = (2, 100);
pub const EMAIL_MAX_LEN: usize = 255;
pub const SUBJECT_LEN: (usize, usize) = (3, 200);
pub const MESSAGE_LEN: (usize, usize) = (10, 2000);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,

    #[error("Please enter your email")]
    MissingEmail,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a subject")]
    MissingSubject,

    #[error("Please enter your message")]
    MissingMessage,

    #[error("Message must be at least {0} characters long")]
    MessageTooShort(usize),

    #[error("{field} must be between {min} and {max} characters")]
    OutOfBounds {
        field: &'static str,
        min: usize,
        max: usize,
    },
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

fn check_len(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::OutOfBounds { field, min, max });
    }
    Ok(())
}

/// Validate a contact submission, returning the trimmed and escaped message
/// ready to store.
pub fn validate_contact(input: &NewContactMessage) -> Result<NewContactMessage, ValidationError> {
    let name = input.name.trim();
    let email = input.email.trim();
    let subject = input.subject.trim();
    let message = input.message.trim();

    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    // The pattern sees the raw input, so surrounding whitespace is rejected
    if !is_valid_email(&input.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if subject.is_empty() {
        return Err(ValidationError::MissingSubject);
    }
    if message.is_empty() {
        return Err(ValidationError::MissingMessage);
    }
    if message.chars().count() < MESSAGE_LEN.0 {
        return Err(ValidationError::MessageTooShort(MESSAGE_LEN.0));
    }

    check_len("Name", name, NAME_LEN.0, NAME_LEN.1)?;
    check_len("Email", email, 0, EMAIL_MAX_LEN)?;
    check_len("Subject", subject, SUBJECT_LEN.0, SUBJECT_LEN.1)?;
    check_len("Message", message, MESSAGE_LEN.0, MESSAGE_LEN.1)?;

    Ok(NewContactMessage {
        name: sanitize_html(name),
        email: email.to_string(),
        subject: sanitize_html(subject),
        message: sanitize_html(message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewContactMessage {
        NewContactMessage::new("Ada", "ada@example.com", "Hello there", "I would like to talk.")
    }

    #[test]
    fn test_valid_message_is_trimmed() {
        let mut input = valid();
        input.name = "  Ada  ".into();
        let out = validate_contact(&input).unwrap();
        assert_eq!(out.name, "Ada");
        assert_eq!(out.email, "ada@example.com");
    }

    #[test]
    fn test_first_failure_wins() {
        let empty = NewContactMessage::default();
        assert_eq!(validate_contact(&empty), Err(ValidationError::MissingName));

        let mut input = valid();
        input.email = "not-an-email".into();
        input.message = "short".into();
        assert_eq!(validate_contact(&input), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_message_minimum_length() {
        let mut input = valid();
        input.message = "  too short ".into();
        assert_eq!(
            validate_contact(&input).unwrap_err().to_string(),
            "Message must be at least 10 characters long"
        );
    }

    #[test]
    fn test_bounds() {
        let mut input = valid();
        input.name = "A".into();
        assert_eq!(
            validate_contact(&input),
            Err(ValidationError::OutOfBounds { field: "Name", min: 2, max: 100 })
        );

        let mut input = valid();
        input.subject = "Hi".into();
        assert!(matches!(
            validate_contact(&input),
            Err(ValidationError::OutOfBounds { field: "Subject", .. })
        ));

        let mut input = valid();
        input.message = "x".repeat(2001);
        assert!(validate_contact(&input).is_err());
    }

    #[test]
    fn test_free_text_is_escaped() {
        let mut input = valid();
        input.message = "<script>alert('hi')</script>".into();
        let out = validate_contact(&input).unwrap();
        assert_eq!(
            out.message,
            "&lt;script&gt;alert(&#x27;hi&#x27;)&lt;&#x2F;script&gt;"
        );
    }

    #[test]
    fn test_email_with_surrounding_whitespace_is_rejected() {
        let mut input = valid();
        input.email = " ada@example.com".into();
        assert_eq!(validate_contact(&input), Err(ValidationError::InvalidEmail));

        input.email = "   ".into();
        assert_eq!(validate_contact(&input), Err(ValidationError::MissingEmail));
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
    }
}
