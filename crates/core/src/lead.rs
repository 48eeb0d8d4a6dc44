//! Lead submissions and their validation rules.
//!
//! A lead enters the system as raw [`LeadFields`] (every field optional, as a
//! form or JSON body may omit any of them). The validator for the operation
//! decides what is required:
//! - [`validate_new_lead`] for submissions: `name`, `email` and `message` are required.
//! - [`validate_lead_changes`] for partial updates: only supplied fields are
//!   checked, and a supplied required field must stay non-empty.
//!
//! Text is trimmed before validation. An optional field supplied as an empty
//! string means "no value".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::ValidateEmail;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_PHONE_LEN: usize = 50;
pub const MAX_BUSINESS_NAME_LEN: usize = 255;
pub const MAX_MESSAGE_LEN: usize = 5000;

/// Raw lead fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub message: Option<String>,
}

impl LeadFields {
    /// True when no field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.business_name.is_none()
            && self.message.is_none()
    }
}

/// A validated submission, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub message: String,
}

/// A validated partial update.
///
/// `None` leaves a column untouched. For the nullable columns the inner
/// option is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub business_name: Option<Option<String>>,
    pub message: Option<String>,
}

impl LeadChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.business_name.is_none()
            && self.message.is_none()
    }
}

/// Per-field validation failures, keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("invalid fields: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Fold another set of failures into this one.
    pub fn extend(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Combine these failures with the outcome of another validator.
    pub fn merge<T>(mut self, result: Result<T, ValidationErrors>) -> Result<T, ValidationErrors> {
        match result {
            Ok(value) if self.is_empty() => Ok(value),
            Ok(_) => Err(self),
            Err(other) => {
                self.extend(other);
                Err(self)
            }
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Validate a new submission.
pub fn validate_new_lead(fields: LeadFields) -> Result<NewLead, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required(&mut errors, "name", fields.name, MAX_NAME_LEN);
    let email = required(&mut errors, "email", fields.email, MAX_EMAIL_LEN);
    if let Some(email) = &email {
        check_email(&mut errors, email);
    }
    let phone = optional(&mut errors, "phone", fields.phone, MAX_PHONE_LEN);
    let business_name = optional(
        &mut errors,
        "business_name",
        fields.business_name,
        MAX_BUSINESS_NAME_LEN,
    );
    let message = required(&mut errors, "message", fields.message, MAX_MESSAGE_LEN);

    let lead = NewLead {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        phone,
        business_name,
        message: message.unwrap_or_default(),
    };
    errors.into_result(lead)
}

/// Validate a partial update. Fields that were not supplied are not checked.
pub fn validate_lead_changes(fields: LeadFields) -> Result<LeadChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = fields
        .name
        .map(|value| required(&mut errors, "name", Some(value), MAX_NAME_LEN));
    let email = fields
        .email
        .map(|value| required(&mut errors, "email", Some(value), MAX_EMAIL_LEN));
    if let Some(Some(email)) = &email {
        check_email(&mut errors, email);
    }
    let phone = fields
        .phone
        .map(|value| optional(&mut errors, "phone", Some(value), MAX_PHONE_LEN));
    let business_name = fields.business_name.map(|value| {
        optional(
            &mut errors,
            "business_name",
            Some(value),
            MAX_BUSINESS_NAME_LEN,
        )
    });
    let message = fields
        .message
        .map(|value| required(&mut errors, "message", Some(value), MAX_MESSAGE_LEN));

    let changes = LeadChanges {
        name: name.flatten(),
        email: email.flatten(),
        phone,
        business_name,
        message: message.flatten(),
    };
    errors.into_result(changes)
}

/// Validate an attachment's size against the configured limit.
pub fn validate_attachment_size(size: u64, max_bytes: u64) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if size > max_bytes {
        errors.add(
            "file",
            format!(
                "The file field must not be greater than {} kilobytes.",
                max_bytes / 1024
            ),
        );
    }
    errors.into_result(())
}

/// Trim a raw value; blank input counts as absent.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn check_length(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!(
                "The {} field must not be greater than {max} characters.",
                label(field)
            ),
        );
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if !email.validate_email() {
        errors.add("email", "The email field must be a valid email address.");
    }
}

fn required(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    match normalize(value) {
        Some(value) => {
            check_length(errors, field, &value, max);
            Some(value)
        }
        None => {
            errors.add(field, format!("The {} field is required.", label(field)));
            None
        }
    }
}

fn optional(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    let value = normalize(value)?;
    check_length(errors, field, &value, max);
    Some(value)
}
