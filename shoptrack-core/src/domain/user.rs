//! User, session and credential models

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::serde_util::deserialize_id;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const MIN_PASSWORD_LEN: usize = 6;

/// Represents an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            email: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or("User")
    }
}

/// Payload of a successful login or register call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    #[serde(rename = "session_id")]
    pub token: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
}

/// Payload of `GET /auth/validate`
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatedSession {
    pub user: User,
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Username is trimmed; the password is kept verbatim
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let errors = credential_errors(&self.username, &self.password);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Register request body
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = credential_errors(&self.username, &self.password);
        if !is_valid_email(&self.email) {
            errors.push("Valid email is required".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

fn credential_errors(username: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if username.trim().is_empty() {
        errors.push("Username is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    errors
}

static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(EMAIL_PATTERN).ok());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_login_payload() {
        let session: Session =
            serde_json::from_str(r#"{"session_id": "tok1", "user_id": 7}"#).unwrap();
        assert_eq!(session.token, "tok1");
        assert_eq!(session.user_id, "7");
    }

    #[test]
    fn test_user_display_name() {
        let mut user = User::new("7");
        assert_eq!(user.display_name(), "User");
        user.username = Some("alice".to_string());
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("a", "abcdef").validate().is_ok());

        let err = Credentials::new("  ", "abc").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Username is required, Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_registration_requires_email() {
        assert!(Registration::new("a", "a@b.co", "abcdef").validate().is_ok());
        assert!(Registration::new("a", "not-an-email", "abcdef").validate().is_err());
        assert!(Registration::new("a", "a b@c.d", "abcdef").validate().is_err());
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("@example.com"));
    }
}
