//! Wire representations of the contact aggregate.
//!
//! Output shapes ([`ContactSummary`], [`ContactDetails`], [`PhoneDetails`])
//! are only ever serialized. Input shapes default every missing member so that
//! absent fields reach validation and are reported per field instead of
//! failing deserialization as a whole. Required text members read `null` as
//! empty for the same reason.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{ContactId, PhoneId};

/// Minimal list-view shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSummary {
    pub id: ContactId,
    pub full_name: String,
}

/// Single-resource shape including nested phones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phones: Vec<PhoneDetails>,
}

/// Phone as exposed to clients; the owning contact is implied by the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneDetails {
    pub id: PhoneId,
    pub number: String,
    pub description: Option<String>,
}

/// Body of a plain JSON creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForCreation {
    #[serde(deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub last_name: String,
    pub email: Option<String>,
}

/// Body of a vendor creation request that also carries phones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactWithPhonesForCreation {
    #[serde(deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub last_name: String,
    pub email: Option<String>,
    /// Required by validation; `None` when the member was omitted.
    pub phones: Option<Vec<PhoneForCreation>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneForCreation {
    #[serde(deserialize_with = "null_as_empty")]
    pub number: String,
    pub description: Option<String>,
}

/// Full-replace body and the document a patch is applied to.
///
/// The identifier is never part of this shape; it always comes from the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForUpdate {
    #[serde(deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub last_name: String,
    pub email: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
