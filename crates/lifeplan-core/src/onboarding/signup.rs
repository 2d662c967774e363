//! AI assistant signup form shown in the modal chain.
//!
//! The form is validated locally and never sent anywhere; completing it and
//! skipping it lead to the same place.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupField {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Inline errors from the last validation, in field order.
    #[serde(skip)]
    errors: Vec<(SignupField, ValidationError)>,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[(SignupField, ValidationError)] {
        &self.errors
    }

    pub fn error_for(&self, field: SignupField) -> Option<&ValidationError> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, e)| e)
    }

    /// Validate every field and store the inline errors. Returns whether the
    /// form is valid.
    pub fn validate(&mut self) -> bool {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push((SignupField::Name, ValidationError::empty("Name")));
        }
        if self.email.trim().is_empty() {
            errors.push((SignupField::Email, ValidationError::empty("Email")));
        } else if !is_valid_email(self.email.trim()) {
            errors.push((SignupField::Email, ValidationError::InvalidEmail));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push((
                SignupField::Password,
                ValidationError::PasswordTooShort {
                    min: MIN_PASSWORD_LEN,
                },
            ));
        }
        if self.confirm_password != self.password {
            errors.push((SignupField::ConfirmPassword, ValidationError::PasswordMismatch));
        }

        self.errors = errors;
        self.errors.is_empty()
    }
}

/// `local@domain.tld`: one `@`, non-empty local part, a dot inside the domain,
/// no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
