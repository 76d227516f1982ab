//! Credential validation for the login and registration forms.
//!
//! DESIGN
//! ======
//! Validation is pure and runs before any dispatch. The only way to reach the
//! gateway-facing flows is through [`ValidLogin`] / [`ValidRegistration`],
//! which can only be built by the validators here, so an invalid form never
//! produces a network call.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub const MIN_PASSWORD_CHARS: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("email pattern compiles")
});

/// Form field a violation is reported against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Fullname,
    Email,
    Password,
}

impl Field {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fullname => "fullname",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

/// Field-level violations. Holds at most one message per field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, &'static str>);

impl FieldErrors {
    /// Record a violation unless the field already has one; the first failed rule wins.
    fn insert(&mut self, field: Field, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    fn into_result<T>(self, valid: T) -> Result<T, Self> {
        if self.is_empty() { Ok(valid) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {message}", field.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Raw login form input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Raw registration form input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub fullname: String,
    pub email: String,
    pub password: String,
}

/// Login credentials that passed validation.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidLogin {
    email: String,
    password: String,
}

impl ValidLogin {
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for ValidLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidLogin").field("email", &self.email).finish_non_exhaustive()
    }
}

/// Registration details that passed validation.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    fullname: String,
    email: String,
    password: String,
}

impl ValidRegistration {
    #[must_use]
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for ValidRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidRegistration")
            .field("fullname", &self.fullname)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Validate the login form.
///
/// # Errors
///
/// Returns every field that violates a rule, one message per field.
pub fn validate_login(form: &LoginForm) -> Result<ValidLogin, FieldErrors> {
    let mut errors = FieldErrors::default();
    check_email(&form.email, &mut errors);
    if form.password.is_empty() {
        errors.insert(Field::Password, "Password is required");
    }
    if char_len(&form.password) < MIN_PASSWORD_CHARS {
        errors.insert(Field::Password, "Password must be at least 8 characters");
    }
    errors.into_result(ValidLogin { email: form.email.clone(), password: form.password.clone() })
}

/// Validate the registration form.
///
/// # Errors
///
/// Returns every field that violates a rule, one message per field.
pub fn validate_registration(form: &RegisterForm) -> Result<ValidRegistration, FieldErrors> {
    let mut errors = FieldErrors::default();
    if form.fullname.is_empty() {
        errors.insert(Field::Fullname, "Fullname is required");
    }
    check_email(&form.email, &mut errors);
    if char_len(&form.password) < MIN_PASSWORD_CHARS {
        errors.insert(Field::Password, "Password need to have at least 8 characters");
    }
    errors.into_result(ValidRegistration {
        fullname: form.fullname.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
    })
}

/// Whether `email` has a standard address shape.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if email.is_empty() {
        errors.insert(Field::Email, "Email is required");
    } else if !is_valid_email(email) {
        errors.insert(Field::Email, "Invalid email format");
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}
