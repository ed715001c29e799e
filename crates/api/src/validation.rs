//! Field and domain validation for inbound representations.
//!
//! Validators never stop at the first problem: every failure is recorded in a
//! [`ValidationErrors`] list keyed by the JSON member name, and the caller
//! turns a non-empty list into a single 422 response.

use std::fmt;

use contacts_types::{ContactForCreation, ContactForUpdate, ContactWithPhonesForCreation, PhoneForCreation};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const NAME_MAX_LENGTH: usize = 50;
pub const EMAIL_MAX_LENGTH: usize = 100;
pub const PHONE_NUMBER_MAX_LENGTH: usize = 50;
pub const PHONE_DESCRIPTION_MAX_LENGTH: usize = 200;

/// Key under which the first-name/last-name rule is reported.
pub const DOMAIN_NAME_RULE_KEY: &str = "wrongName";
const DOMAIN_NAME_RULE_MESSAGE: &str = "First name and last name cannot be the same.";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email regex should compile"));

/// Accumulated validation failures, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Messages recorded for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// `Ok` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}

/// Validate a plain creation body.
pub fn validate_creation(creation: &ContactForCreation) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    validate_contact_fields(&creation.first_name, &creation.last_name, creation.email.as_deref(), &mut errors);
    errors
}

/// Validate a creation body carrying phones.
pub fn validate_creation_with_phones(creation: &ContactWithPhonesForCreation) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    validate_contact_fields(&creation.first_name, &creation.last_name, creation.email.as_deref(), &mut errors);
    match &creation.phones {
        None => errors.add("phones", "The Phones field is required."),
        Some(phones) => {
            for (index, phone) in phones.iter().enumerate() {
                validate_phone(index, phone, &mut errors);
            }
        }
    }
    errors
}

/// Validate a full-replace body or a patched document.
pub fn validate_update(update: &ContactForUpdate) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    validate_contact_fields(&update.first_name, &update.last_name, update.email.as_deref(), &mut errors);
    errors
}

fn validate_contact_fields(first_name: &str, last_name: &str, email: Option<&str>, errors: &mut ValidationErrors) {
    validate_required_text("firstName", "FirstName", first_name, NAME_MAX_LENGTH, errors);
    validate_required_text("lastName", "LastName", last_name, NAME_MAX_LENGTH, errors);

    if let Some(email) = email {
        if email.chars().count() > EMAIL_MAX_LENGTH {
            errors.add("email", max_length_message("Email", EMAIL_MAX_LENGTH));
        }
        if !EMAIL_REGEX.is_match(email) {
            errors.add("email", "The Email field is not a valid e-mail address.");
        }
    }

    if !first_name.trim().is_empty() && first_name == last_name {
        errors.add(DOMAIN_NAME_RULE_KEY, DOMAIN_NAME_RULE_MESSAGE);
    }
}

fn validate_phone(index: usize, phone: &PhoneForCreation, errors: &mut ValidationErrors) {
    validate_required_text(&format!("phones[{index}].number"), "Number", &phone.number, PHONE_NUMBER_MAX_LENGTH, errors);
    if let Some(description) = &phone.description
        && description.chars().count() > PHONE_DESCRIPTION_MAX_LENGTH
    {
        errors.add(
            format!("phones[{index}].description"),
            max_length_message("Description", PHONE_DESCRIPTION_MAX_LENGTH),
        );
    }
}

fn validate_required_text(field: &str, display_name: &str, value: &str, max_length: usize, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(field, format!("The {display_name} field is required."));
    } else if value.chars().count() > max_length {
        errors.add(field, max_length_message(display_name, max_length));
    }
}

fn max_length_message(display_name: &str, max_length: usize) -> String {
    format!("The field {display_name} must be a string with a maximum length of {max_length}.")
}
