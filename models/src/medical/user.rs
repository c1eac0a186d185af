// models/src/medical/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::medical::required_text;

/// A stored account. Holds the password hash, never the plaintext, and is
/// never serialized to the wire directly; see [`AccountInfo`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// The public projection returned by the auth endpoints.
    pub fn account_info(&self) -> AccountInfo {
        AccountInfo {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public account fields safe to return to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Raw registration body. Everything is optional so missing fields surface
/// as field-level messages rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Validated registration input. Carries the plaintext password briefly,
/// until the gate hashes it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
}

impl RegisterPayload {
    pub fn validate(self) -> ValidationResult<NewUser> {
        let mut report = ValidationError::new();

        let username = required_text(&mut report, "username", self.username);
        if let Some(ref u) = username {
            if u.contains(char::is_whitespace) {
                report.add("username", "may not contain whitespace");
            }
        }

        let email = required_text(&mut report, "email", self.email);
        if let Some(ref e) = email {
            if !looks_like_email(e) {
                report.add("email", "enter a valid email address");
            }
        }

        let password = required_text(&mut report, "password", self.password);

        let first_name = self.name.unwrap_or_default();

        report.into_result()?;
        Ok(NewUser {
            // Unwraps cannot fail once the report is empty.
            username: username.unwrap(),
            email: email.unwrap(),
            password: password.unwrap(),
            first_name,
        })
    }
}

/// Login attempt body. Missing fields fall back to empty strings and fail
/// credential verification like any other mismatch.
#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::RegisterPayload;

    fn full_payload() -> RegisterPayload {
        RegisterPayload {
            username: Some("alice".to_string()),
            email: Some("alice@example.com".to_string()),
            password: Some("supersecret".to_string()),
            name: Some("Alice".to_string()),
        }
    }

    #[test]
    fn valid_registration_passes() {
        let new_user = full_payload().validate().unwrap();
        assert_eq!(new_user.username, "alice");
        assert_eq!(new_user.first_name, "Alice");
    }

    #[test]
    fn name_is_optional() {
        let payload = RegisterPayload {
            name: None,
            ..full_payload()
        };
        let new_user = payload.validate().unwrap();
        assert_eq!(new_user.first_name, "");
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let err = RegisterPayload::default().validate().unwrap_err();
        assert!(err.errors.contains_key("username"));
        assert!(err.errors.contains_key("email"));
        assert!(err.errors.contains_key("password"));
    }

    #[test]
    fn blank_password_is_rejected() {
        let payload = RegisterPayload {
            password: Some("  ".to_string()),
            ..full_payload()
        };
        let err = payload.validate().unwrap_err();
        assert!(err.errors.contains_key("password"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        for bad in ["no-at-sign", "x@", "@y.com", "x@nodot"] {
            let payload = RegisterPayload {
                email: Some(bad.to_string()),
                ..full_payload()
            };
            assert!(payload.validate().is_err(), "accepted {bad}");
        }
    }
}
