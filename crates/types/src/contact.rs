//! Persisted contact aggregate.

use serde::{Deserialize, Serialize};

/// Identifier assigned to a contact by the store on creation.
pub type ContactId = i32;

/// Identifier assigned to a phone by the store on creation.
pub type PhoneId = i32;

/// A contact record together with its phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Store-assigned identifier; zero until the contact has been created.
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    /// Phones in insertion order.
    pub phones: Vec<Phone>,
}

impl Contact {
    /// Create an unsaved contact without phones.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email,
            phones: Vec::new(),
        }
    }

    /// Attach an unsaved phone to this contact.
    pub fn with_phone(mut self, number: impl Into<String>, description: Option<String>) -> Self {
        self.phones.push(Phone {
            id: 0,
            contact_id: self.id,
            number: number.into(),
            description,
        });
        self
    }

    /// Display name used by list views.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Look up one of this contact's phones.
    pub fn phone(&self, phone_id: PhoneId) -> Option<&Phone> {
        self.phones.iter().find(|phone| phone.id == phone_id)
    }
}

/// A phone number owned by exactly one contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    pub id: PhoneId,
    /// Owning contact; never changed after creation.
    pub contact_id: ContactId,
    pub number: String,
    pub description: Option<String>,
}
