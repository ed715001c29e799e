//! In-memory contact store.

use std::collections::BTreeMap;
use std::sync::Arc;

use contacts_types::{Contact, ContactId, PhoneId};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{ContactStore, StoreError};

#[derive(Debug, Default)]
struct StoreState {
    contacts: BTreeMap<ContactId, Contact>,
    last_contact_id: ContactId,
    last_phone_id: PhoneId,
}

impl StoreState {
    fn next_contact_id(&mut self) -> Result<ContactId, StoreError> {
        self.last_contact_id = self
            .last_contact_id
            .checked_add(1)
            .ok_or_else(|| StoreError::identifiers_exhausted("contact"))?;
        Ok(self.last_contact_id)
    }

    fn reserve_phone_ids(&mut self, count: usize) -> Result<PhoneId, StoreError> {
        let count = PhoneId::try_from(count).map_err(|_| StoreError::identifiers_exhausted("phone"))?;
        let first = self.last_phone_id.checked_add(1).ok_or_else(|| StoreError::identifiers_exhausted("phone"))?;
        self.last_phone_id = self
            .last_phone_id
            .checked_add(count)
            .ok_or_else(|| StoreError::identifiers_exhausted("phone"))?;
        Ok(first)
    }
}

/// Contact store backed by an ordered map.
///
/// Every mutation runs inside one write-lock section with no await point after
/// the lock is acquired, so a cancelled caller never leaves a partial write.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContactStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryContactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store populated with the given unsaved contacts.
    pub fn with_contacts(contacts: impl IntoIterator<Item = Contact>) -> Result<Self, StoreError> {
        let mut state = StoreState::default();
        for contact in contacts {
            insert_new(&mut state, contact)?;
        }
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Number of stored contacts.
    pub async fn len(&self) -> usize {
        self.state.read().await.contacts.len()
    }

    /// Whether the store holds no contacts.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.contacts.is_empty()
    }
}

fn insert_new(state: &mut StoreState, mut contact: Contact) -> Result<Contact, StoreError> {
    let contact_id = state.next_contact_id()?;
    let first_phone_id = state.reserve_phone_ids(contact.phones.len())?;
    contact.id = contact_id;
    for (phone_id, phone) in (first_phone_id..).zip(contact.phones.iter_mut()) {
        phone.id = phone_id;
        phone.contact_id = contact_id;
    }
    state.contacts.insert(contact_id, contact.clone());
    Ok(contact)
}

#[async_trait::async_trait]
impl ContactStore for InMemoryContactStore {
    async fn list(&self, search: Option<&str>) -> Result<Vec<Contact>, StoreError> {
        let needle = search.map(str::trim).filter(|search| !search.is_empty()).map(str::to_lowercase);
        let state = self.state.read().await;
        let contacts = state
            .contacts
            .values()
            .filter(|contact| match &needle {
                Some(needle) => contact.last_name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        Ok(contacts)
    }

    async fn get(&self, id: ContactId) -> Result<Option<Contact>, StoreError> {
        Ok(self.state.read().await.contacts.get(&id).cloned())
    }

    async fn create(&self, contact: Contact) -> Result<Contact, StoreError> {
        let mut state = self.state.write().await;
        let created = insert_new(&mut state, contact)?;
        debug!(contact_id = created.id, phones = created.phones.len(), "created contact");
        Ok(created)
    }

    async fn update(&self, contact: Contact) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.contacts.get_mut(&contact.id) else {
            return Ok(false);
        };
        stored.first_name = contact.first_name;
        stored.last_name = contact.last_name;
        stored.email = contact.email;
        debug!(contact_id = contact.id, "updated contact");
        Ok(true)
    }

    async fn delete(&self, id: ContactId) -> Result<bool, StoreError> {
        let removed = self.state.write().await.contacts.remove(&id).is_some();
        if removed {
            debug!(contact_id = id, "deleted contact");
        }
        Ok(removed)
    }
}
