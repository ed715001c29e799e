//! Conversions between the stored aggregate and its wire representations.

use contacts_types::{
    Contact, ContactDetails, ContactForCreation, ContactForUpdate, ContactId, ContactSummary, ContactWithPhonesForCreation, Phone,
    PhoneDetails,
};

pub fn summarize(contact: &Contact) -> ContactSummary {
    ContactSummary {
        id: contact.id,
        full_name: contact.full_name(),
    }
}

pub fn describe(contact: &Contact) -> ContactDetails {
    ContactDetails {
        id: contact.id,
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        email: contact.email.clone(),
        phones: contact.phones.iter().map(describe_phone).collect(),
    }
}

pub fn describe_phone(phone: &Phone) -> PhoneDetails {
    PhoneDetails {
        id: phone.id,
        number: phone.number.clone(),
        description: phone.description.clone(),
    }
}

/// Unsaved contact built from a plain creation body.
pub fn contact_from_creation(creation: ContactForCreation) -> Contact {
    Contact::new(creation.first_name, creation.last_name, creation.email)
}

/// Unsaved contact, with unsaved phones, built from a vendor creation body.
pub fn contact_from_creation_with_phones(creation: ContactWithPhonesForCreation) -> Contact {
    let phones = creation.phones.unwrap_or_default();
    let contact = Contact::new(creation.first_name, creation.last_name, creation.email);
    phones
        .into_iter()
        .fold(contact, |contact, phone| contact.with_phone(phone.number, phone.description))
}

/// Contact carrying the route identifier and the replacement fields.
pub fn contact_from_update(id: ContactId, update: ContactForUpdate) -> Contact {
    Contact {
        id,
        ..Contact::new(update.first_name, update.last_name, update.email)
    }
}

/// The patchable view of a stored contact.
pub fn update_form(contact: &Contact) -> ContactForUpdate {
    ContactForUpdate {
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        email: contact.email.clone(),
    }
}

/// Copy patched fields onto the aggregate; identifier and phones are left untouched.
pub fn merge_update(contact: &mut Contact, update: ContactForUpdate) {
    contact.first_name = update.first_name;
    contact.last_name = update.last_name;
    contact.email = update.email;
}
