//! Shared type definitions for the contacts API.
//!
//! The aggregate types ([`Contact`], [`Phone`]) are owned by the store; every
//! other type in this crate is a wire representation derived from them and
//! lives only for the duration of a request.

mod contact;
mod representation;

pub use contact::{Contact, ContactId, Phone, PhoneId};
pub use representation::{
    ContactDetails, ContactForCreation, ContactForUpdate, ContactSummary, ContactWithPhonesForCreation, PhoneDetails, PhoneForCreation,
};
