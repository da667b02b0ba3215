//! Account input validation
//!
//! Rules shared by registration, self-service updates and admin updates:
//! - Password: at least 8 characters, a digit, a letter, a special symbol, both cases
//! - Email: `^\S+@\S+\.\S+$`

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Special symbols accepted by the password policy
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").ok());

fn rule_violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Check a password against the account password policy.
pub fn check_password_policy(value: &str) -> Result<(), &'static str> {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 8 characters long");
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number");
    }
    if !value.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain at least one letter");
    }
    if !value.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Err("Password must contain at least one special symbol");
    }
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return Err("Password must contain both lowercase and uppercase letters");
    }
    Ok(())
}

pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    check_password_policy(value).map_err(|message| rule_violation("password_policy", message))
}

/// Same policy as [`validate_password`], but a blank value means "unchanged".
pub fn validate_optional_password(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_password(value)
}

pub fn is_valid_email(value: &str) -> bool {
    match EMAIL_PATTERN.as_ref() {
        Some(pattern) => pattern.is_match(value),
        None => false,
    }
}

pub fn validate_email_format(value: &str) -> Result<(), ValidationError> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(rule_violation("email", "Invalid email address format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy() {
        assert!(check_password_policy("P@ssword12345!").is_ok());
        assert_eq!(
            check_password_policy("Ab1!"),
            Err("Password must be at least 8 characters long")
        );
        assert_eq!(
            check_password_policy("Password!"),
            Err("Password must contain at least one number")
        );
        assert_eq!(
            check_password_policy("12345678!"),
            Err("Password must contain at least one letter")
        );
        assert_eq!(
            check_password_policy("Password1"),
            Err("Password must contain at least one special symbol")
        );
        assert_eq!(
            check_password_policy("password1!"),
            Err("Password must contain both lowercase and uppercase letters")
        );
    }

    #[test]
    fn test_optional_password_blank_is_ok() {
        assert!(validate_optional_password("").is_ok());
        assert!(validate_optional_password("   ").is_ok());
        assert!(validate_optional_password("weak").is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("john.doe@example.com"));
        assert!(!is_valid_email("john.doe@example"));
        assert!(!is_valid_email("john doe@example.com"));
        assert!(validate_email_format("nope").is_err());
    }
}
