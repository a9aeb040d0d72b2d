//! Client-side form validation.
//!
//! Every form is validated before anything is sent; a `ValidationErrors`
//! never reaches the network or the session resolver.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-']+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

const INVALID_EMAIL: &str = "Please enter a valid email address";
const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
const PASSWORD_TOO_WEAK: &str = "Password must contain at least one letter and one number";
const PASSWORDS_DIFFER: &str = "Passwords do not match";
const MISSING_RESET_TOKEN: &str = "Reset link is invalid or missing a token";

/// Per-field validation messages, in field order. Only the first problem
/// found for a field is kept.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(&'static str, &'static str)>,
}

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: &'static str) {
        if self.get(field).is_none() {
            self.fields.push((field, message));
        }
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| *m)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.fields.iter().copied()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.fields.iter().map(|(_, m)| *m).collect();
        write!(f, "{}", messages.join("; "))
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if !EMAIL_RE.is_match(email.trim()) {
        errors.add("email", INVALID_EMAIL);
    }
}

fn check_password(errors: &mut ValidationErrors, field: &'static str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(field, PASSWORD_TOO_SHORT);
    }
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        errors.add(field, PASSWORD_TOO_WEAK);
    }
}

fn check_confirmation(errors: &mut ValidationErrors, password: &str, confirm: &str) {
    if confirm.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add("confirm_password", PASSWORD_TOO_SHORT);
    } else if password != confirm {
        errors.add("confirm_password", PASSWORDS_DIFFER);
    }
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, "password", &self.password);
        check_confirmation(&mut errors, &self.password, &self.confirm_password);
        errors.into_result()
    }
}

#[derive(Debug, Clone)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_email(&mut errors, &self.email);
        errors.into_result()
    }
}

/// New-password form reached from the emailed reset link.
#[derive(Debug, Clone)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.token.trim().is_empty() {
            errors.add("token", MISSING_RESET_TOKEN);
        }
        check_password(&mut errors, "password", &self.password);
        check_confirmation(&mut errors, &self.password, &self.confirm_password);
        errors.into_result()
    }
}
