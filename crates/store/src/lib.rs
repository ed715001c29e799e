//! Contact record storage.
//!
//! [`ContactStore`] is the contract the API layer consumes. The store owns the
//! canonical contact/phone graph; callers only ever receive owned copies.

mod memory;
mod seed;

pub use memory::InMemoryContactStore;
pub use seed::seed_contacts;

use contacts_types::{Contact, ContactId};
use thiserror::Error;

/// Errors surfaced by store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store cannot hand out another identifier.
    #[error("identifier space exhausted for {entity}")]
    IdentifiersExhausted { entity: &'static str },

    /// The backing storage could not be reached.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    /// Create an identifiers exhausted error.
    pub fn identifiers_exhausted(entity: &'static str) -> Self {
        Self::IdentifiersExhausted { entity }
    }

    /// Create a store unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }
}

/// CRUD operations over the contact aggregate.
///
/// Each call is a single unit of work: it either completes and becomes visible
/// to later calls, or it has no effect.
#[async_trait::async_trait]
pub trait ContactStore: Send + Sync {
    /// List contacts, optionally filtered by a case-insensitive substring of the last name.
    async fn list(&self, search: Option<&str>) -> Result<Vec<Contact>, StoreError>;

    /// Fetch one contact with its phones.
    async fn get(&self, id: ContactId) -> Result<Option<Contact>, StoreError>;

    /// Persist a new contact and its phones, returning it with assigned identifiers.
    async fn create(&self, contact: Contact) -> Result<Contact, StoreError>;

    /// Overwrite the scalar fields of an existing contact. Returns `false` when the id is unknown.
    async fn update(&self, contact: Contact) -> Result<bool, StoreError>;

    /// Remove a contact and its phones. Returns `false` when the id is unknown.
    async fn delete(&self, id: ContactId) -> Result<bool, StoreError>;
}
