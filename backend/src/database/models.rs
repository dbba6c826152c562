//! Rust structs that represent database table mappings.
//!
//! `User` is both the row stored in the `users` table and the record returned
//! to API callers. The plaintext password only lives on it between the request
//! payload and `prepare_for_storage`, and is never written to the database or
//! serialized once cleared.

use serde::Serialize;
use sqlx::FromRow;
use std::borrow::Cow;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// bcrypt cost used for stored password hashes.
///
/// This is the minimum cost bcrypt accepts. It keeps registration cheap but is
/// far below what a production deployment should use.
pub const PASSWORD_HASH_COST: u32 = 4;

const PASSWORD_MIN_LENGTH: usize = 6;
const PASSWORD_MAX_LENGTH: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub id_telegram: Option<i64>,
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    #[sqlx(skip)]
    pub password: String,
    #[serde(skip)]
    pub encrypted_password: Option<String>,
}

impl User {
    /// Builds a user registering with email and password.
    pub fn with_email(email: impl Into<String>, password: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            email: (!email.is_empty()).then_some(email),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Builds a user identified only by their Telegram id.
    pub fn with_telegram(id_telegram: i64) -> Self {
        Self {
            id_telegram: Some(id_telegram),
            ..Default::default()
        }
    }

    /// Hashes the plaintext password, if any, into `encrypted_password`.
    pub fn prepare_for_storage(&mut self) -> Result<(), bcrypt::BcryptError> {
        if !self.password.is_empty() {
            self.encrypted_password = Some(bcrypt::hash(&self.password, PASSWORD_HASH_COST)?);
        }
        Ok(())
    }

    /// Drops the plaintext password before the user leaves the server.
    pub fn sanitize(&mut self) {
        self.password.clear();
    }

    /// Checks a candidate password against the stored hash.
    ///
    /// A missing or corrupt hash is reported as a mismatch.
    pub fn compare_password(&self, candidate: &str) -> bool {
        self.encrypted_password
            .as_deref()
            .map(|hash| bcrypt::verify(candidate, hash).unwrap_or(false))
            .unwrap_or(false)
    }
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.email.is_none() {
            match self.id_telegram {
                None | Some(0) => {
                    errors.add("id_telegram", rule_error("required", "cannot be blank"))
                }
                Some(id) if id < 0 => errors.add(
                    "id_telegram",
                    rule_error("range", "must be no less than 0"),
                ),
                Some(_) => {}
            }
        }

        if self.id_telegram.is_none() {
            match &self.email {
                None => errors.add("email", rule_error("required", "cannot be blank")),
                Some(email) if !email.validate_email() => errors.add(
                    "email",
                    rule_error("email", "must be a valid email address"),
                ),
                Some(_) => {}
            }
        }

        let has_hash = self
            .encrypted_password
            .as_deref()
            .is_some_and(|hash| !hash.is_empty());
        if self.password.is_empty() {
            if !has_hash && self.email.is_some() {
                errors.add("password", rule_error("required", "cannot be blank"));
            }
        } else {
            let length = self.password.chars().count();
            if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
                errors.add(
                    "password",
                    rule_error("length", "the length must be between 6 and 30"),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Flattens validation errors into `field: message` pairs, ordered by field.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error.message.as_ref().unwrap_or(&"Invalid value".into())
                )
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

/// Reports whether a password is hard enough to guess.
///
/// The password must be at least six bytes long, must change under at least
/// one of the two case round trips (so it mixes cases), and must contain a
/// digit.
///
/// Case mapping is per character and one-to-one, so letters whose full
/// mapping expands (`ß` uppercases to `SS`) compare as if simply mapped.
pub fn check_password_strength(password: &str) -> bool {
    if password.len() < PASSWORD_MIN_LENGTH {
        return false;
    }
    let round_trip = |first: fn(char) -> char, second: fn(char) -> char| {
        password.chars().map(first).map(second).eq(password.chars())
    };
    if round_trip(simple_lowercase, simple_uppercase)
        || round_trip(simple_uppercase, simple_lowercase)
    {
        return false;
    }
    password.chars().any(|c| c.is_ascii_digit())
}

// Single-char case mapping; a char whose full mapping expands maps to itself.
fn simple_lowercase(c: char) -> char {
    let mut mapped = c.to_lowercase();
    match (mapped.next(), mapped.next()) {
        (Some(lower), None) => lower,
        _ => c,
    }
}

fn simple_uppercase(c: char) -> char {
    let mut mapped = c.to_uppercase();
    match (mapped.next(), mapped.next()) {
        (Some(upper), None) => upper,
        _ => c,
    }
}

#[cfg(test)]
pub fn test_user() -> User {
    User::with_email("user@example.org", "password")
}

#[cfg(test)]
pub fn test_user_with_telegram() -> User {
    User {
        password: "password".to_string(),
        ..User::with_telegram(12345678)
    }
}
