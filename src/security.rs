use crate::errors::{ApiError, FieldErrors};
use derive_more::Display;
use serde::Serialize;

/// Minimum length the backend accepts for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Input validation utilities
pub mod validation {
    use regex::Regex;
    use std::sync::OnceLock;

    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

    /// Validate URL format and scheme
    pub fn validate_url(url: &str) -> Result<(), String> {
        if url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }

        if url.len() > 2048 {
            return Err("URL too long (max 2048 characters)".to_string());
        }

        let url_regex = URL_REGEX.get_or_init(|| {
            Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("URL pattern is valid")
        });

        if !url_regex.is_match(url) {
            return Err("Invalid URL format. Must be HTTP or HTTPS".to_string());
        }

        Ok(())
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<(), String> {
        if email.is_empty() {
            return Err("Email cannot be empty".to_string());
        }

        if email.len() > 254 {
            return Err("Email too long (max 254 characters)".to_string());
        }

        let email_regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
                .expect("email pattern is valid")
        });

        if !email_regex.is_match(email) {
            return Err("Invalid email format".to_string());
        }

        Ok(())
    }

    /// Validate a field that must contain something other than whitespace
    pub fn validate_required(value: &str, message: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err(message.to_string());
        }
        Ok(())
    }
}

/// Collects per-field messages from local form checks.
#[derive(Debug, Default)]
pub struct FormErrors {
    fields: FieldErrors,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record the message of a failed check under `field`.
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok` when nothing was recorded, otherwise a validation error carrying
    /// every message.
    pub fn finish(self) -> Result<(), ApiError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.fields))
        }
    }
}

/// Client-side password strength, shown while the user types.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PasswordStrength {
    #[display(fmt = "")]
    None,
    #[display(fmt = "Weak")]
    Weak,
    #[display(fmt = "Fair")]
    Fair,
    #[display(fmt = "Good")]
    Good,
    #[display(fmt = "Strong")]
    Strong,
}

impl PasswordStrength {
    /// One point each for: at least 8 characters, at least 12 characters, an
    /// uppercase letter together with a digit, a character that is neither a
    /// letter nor a digit.
    pub fn of(password: &str) -> Self {
        let length = password.chars().count();
        let mut score = 0;

        if length >= MIN_PASSWORD_LENGTH {
            score += 1;
        }
        if length >= 12 {
            score += 1;
        }
        if password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_digit())
        {
            score += 1;
        }
        if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
            score += 1;
        }

        Self::from_score(score)
    }

    pub fn from_score(score: u8) -> Self {
        match score {
            0 => PasswordStrength::None,
            1 => PasswordStrength::Weak,
            2 => PasswordStrength::Fair,
            3 => PasswordStrength::Good,
            _ => PasswordStrength::Strong,
        }
    }

    pub fn score(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("guest@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("guest@").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(250))).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://images.example.com/villa.jpg").is_ok());
        assert!(validate_url("ftp://example.com/file").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Lisbon", "City is required").is_ok());
        assert_eq!(
            validate_required("   ", "City is required"),
            Err("City is required".to_string())
        );
    }

    #[test]
    fn test_form_errors_finish() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());
        errors.check("city", validate_required("", "City is required"));
        errors.add("city", "Second message");

        let err = errors.finish().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.field("city").map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_empty_form_errors_is_ok() {
        assert!(FormErrors::new().finish().is_ok());
    }

    #[test]
    fn test_password_strength_examples() {
        assert_eq!(PasswordStrength::of(""), PasswordStrength::None);
        assert_eq!(PasswordStrength::of("password"), PasswordStrength::Weak);
        assert_eq!(PasswordStrength::of("passwordpassword"), PasswordStrength::Fair);
        assert_eq!(PasswordStrength::of("Password1234"), PasswordStrength::Good);
        assert_eq!(PasswordStrength::of("Password1234!"), PasswordStrength::Strong);
    }

    #[test]
    fn test_symbol_counts_even_when_short() {
        assert_eq!(PasswordStrength::of("a!").score(), 1);
        assert_eq!(PasswordStrength::of("A1").score(), 1);
    }

    #[test]
    fn test_strength_labels() {
        assert_eq!(PasswordStrength::None.label(), "");
        assert_eq!(PasswordStrength::Fair.label(), "Fair");
        assert_eq!(PasswordStrength::from_score(9), PasswordStrength::Strong);
    }
}
