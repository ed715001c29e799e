//! Body serialization for the negotiated format.

use axum::body::Bytes;
use contacts_types::{ContactDetails, ContactId, ContactSummary, PhoneDetails};
use serde::Serialize;

use crate::error::ApiError;
use crate::negotiation::Format;

#[derive(Serialize)]
struct ContactList<'a> {
    contact: &'a [ContactSummary],
}

#[derive(Serialize)]
struct PhoneList<'a> {
    phone: &'a [PhoneDetails],
}

/// XML view of [`ContactDetails`] whose phones nest like the phone list.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactDetailsXml<'a> {
    id: ContactId,
    first_name: &'a str,
    last_name: &'a str,
    email: Option<&'a str>,
    phones: PhoneList<'a>,
}

/// Serialize a single representation; `root` names the XML document element.
pub fn render<T: Serialize>(format: Format, root: &str, value: &T) -> Result<Bytes, ApiError> {
    match format {
        Format::Json => serde_json::to_vec(value).map(Bytes::from).map_err(|error| ApiError::serialization(error.to_string())),
        Format::Xml => quick_xml::se::to_string_with_root(root, value)
            .map(Bytes::from)
            .map_err(|error| ApiError::serialization(error.to_string())),
    }
}

/// Serialize the detailed contact, with phones as `<phones><phone>..</phone></phones>` in XML.
pub fn render_details(format: Format, details: &ContactDetails) -> Result<Bytes, ApiError> {
    match format {
        Format::Json => render(format, "contact", details),
        Format::Xml => render(
            format,
            "contact",
            &ContactDetailsXml {
                id: details.id,
                first_name: &details.first_name,
                last_name: &details.last_name,
                email: details.email.as_deref(),
                phones: PhoneList { phone: &details.phones },
            },
        ),
    }
}

/// Serialize a contact list: a JSON array, or `<contacts><contact>..</contact></contacts>`.
pub fn render_contacts(format: Format, contacts: &[ContactSummary]) -> Result<Bytes, ApiError> {
    match format {
        Format::Json => render(format, "contacts", &contacts),
        Format::Xml => render(format, "contacts", &ContactList { contact: contacts }),
    }
}

/// Serialize a phone list: a JSON array, or `<phones><phone>..</phone></phones>`.
pub fn render_phones(format: Format, phones: &[PhoneDetails]) -> Result<Bytes, ApiError> {
    match format {
        Format::Json => render(format, "phones", &phones),
        Format::Xml => render(format, "phones", &PhoneList { phone: phones }),
    }
}
