//! Local form validation.
//!
//! These rules run client-side before any request is issued; the identity
//! service never sees a submission that fails them.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Standard `local@domain.tld` shape.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("valid email regex")
});

/// Validates an email field, returning the inline error message if invalid.
pub fn email_error(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        return Some("Email is required");
    }
    if !EMAIL_RE.is_match(email) {
        return Some("Invalid email format");
    }
    None
}

/// Validates a password field, returning the inline error message if invalid.
pub fn password_error(password: &str) -> Option<&'static str> {
    if password.is_empty() {
        return Some("Password is required");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some("Password must be at least 6 characters");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_emails() {
        for email in ["user@example.com", "a.b+c@mail-host.co.uk", "x_1@d.io"] {
            assert_eq!(email_error(email), None, "{email}");
        }
    }

    #[test]
    fn rejects_malformed_emails() {
        assert_eq!(email_error(""), Some("Email is required"));
        for email in ["plain", "no@tld", "@example.com", "a b@example.com"] {
            assert_eq!(email_error(email), Some("Invalid email format"), "{email}");
        }
    }

    #[test]
    fn password_rules() {
        assert_eq!(password_error(""), Some("Password is required"));
        assert_eq!(
            password_error("12345"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(password_error("secret1"), None);
    }
}
