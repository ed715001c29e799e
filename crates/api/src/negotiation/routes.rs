//! Per-version operation tables.
//!
//! Each version owns an ordered list of operations, and each operation owns
//! ordered media-type predicates for the bodies it consumes and produces. The
//! first predicate that accepts the request header wins, which is how one
//! method and path dispatch to different representations.

use crate::negotiation::ApiVersion;
use crate::negotiation::media::{
    APPLICATION_JSON, APPLICATION_XML, Format, JSON_PATCH, VENDOR_CONTACT_JSON, VENDOR_CONTACT_WITH_PHONES_JSON,
};

/// Logical operations exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListContacts,
    GetContact,
    CreateContact,
    UpdateContact,
    PatchContact,
    DeleteContact,
    ListPhones,
    GetPhone,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::ListContacts => "ListContacts",
            Self::GetContact => "GetContact",
            Self::CreateContact => "CreateContact",
            Self::UpdateContact => "UpdateContact",
            Self::PatchContact => "PatchContact",
            Self::DeleteContact => "DeleteContact",
            Self::ListPhones => "ListPhones",
            Self::GetPhone => "GetPhone",
        }
    }
}

/// Shape of a request or response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    Summary,
    Details,
    Phone,
    Creation,
    CreationWithPhones,
    Update,
    PatchDocument,
}

impl Representation {
    /// Shape returned after creating a contact from this input shape.
    pub fn created_response(self) -> Representation {
        match self {
            Self::CreationWithPhones => Self::Details,
            _ => Self::Summary,
        }
    }
}

/// A registered media type and the representation it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaRoute {
    pub media_type: &'static str,
    pub format: Format,
    pub representation: Representation,
}

impl MediaRoute {
    const fn new(media_type: &'static str, format: Format, representation: Representation) -> Self {
        Self {
            media_type,
            format,
            representation,
        }
    }
}

/// Negotiation rules for one operation within one version.
#[derive(Debug, Clone, Copy)]
pub struct OperationRoute {
    pub operation: Operation,
    /// Matched against `Content-Type`; empty when the operation takes no body.
    pub consumes: &'static [MediaRoute],
    /// Matched against `Accept`; empty when the operation returns no body.
    pub produces: &'static [MediaRoute],
    pub requires_authentication: bool,
    /// Successful responses may be served from the response cache.
    pub cacheable: bool,
}

const SUMMARY_LIST: &[MediaRoute] = &[
    MediaRoute::new(APPLICATION_JSON, Format::Json, Representation::Summary),
    MediaRoute::new(APPLICATION_XML, Format::Xml, Representation::Summary),
];

const CONTACT_READ: &[MediaRoute] = &[
    MediaRoute::new(APPLICATION_JSON, Format::Json, Representation::Details),
    MediaRoute::new(APPLICATION_XML, Format::Xml, Representation::Details),
    MediaRoute::new(VENDOR_CONTACT_JSON, Format::Json, Representation::Summary),
];

const CONTACT_CREATE: &[MediaRoute] = &[
    MediaRoute::new(APPLICATION_JSON, Format::Json, Representation::Creation),
    MediaRoute::new(VENDOR_CONTACT_WITH_PHONES_JSON, Format::Json, Representation::CreationWithPhones),
];

/// The created representation is chosen by the consumed media type; `Accept` only picks the format.
const CREATED: &[MediaRoute] = &[
    MediaRoute::new(APPLICATION_JSON, Format::Json, Representation::Summary),
    MediaRoute::new(APPLICATION_XML, Format::Xml, Representation::Summary),
];

const CONTACT_UPDATE: &[MediaRoute] = &[MediaRoute::new(APPLICATION_JSON, Format::Json, Representation::Update)];

const CONTACT_PATCH: &[MediaRoute] = &[MediaRoute::new(JSON_PATCH, Format::Json, Representation::PatchDocument)];

const PHONE_READ: &[MediaRoute] = &[
    MediaRoute::new(APPLICATION_JSON, Format::Json, Representation::Phone),
    MediaRoute::new(APPLICATION_XML, Format::Xml, Representation::Phone),
];

const fn route(operation: Operation, consumes: &'static [MediaRoute], produces: &'static [MediaRoute]) -> OperationRoute {
    OperationRoute {
        operation,
        consumes,
        produces,
        requires_authentication: false,
        cacheable: false,
    }
}

const V1_ROUTES: &[OperationRoute] = &[
    route(Operation::ListContacts, &[], SUMMARY_LIST),
    OperationRoute {
        cacheable: true,
        ..route(Operation::GetContact, &[], CONTACT_READ)
    },
    route(Operation::CreateContact, CONTACT_CREATE, CREATED),
    route(Operation::UpdateContact, CONTACT_UPDATE, &[]),
    route(Operation::PatchContact, CONTACT_PATCH, &[]),
    route(Operation::DeleteContact, &[], &[]),
    route(Operation::ListPhones, &[], PHONE_READ),
    route(Operation::GetPhone, &[], PHONE_READ),
];

const V2_ROUTES: &[OperationRoute] = &[OperationRoute {
    requires_authentication: true,
    ..route(Operation::ListContacts, &[], SUMMARY_LIST)
}];

/// Operation table for a version, if that version exists.
pub fn routing_table(version: ApiVersion) -> Option<&'static [OperationRoute]> {
    match version.major() {
        1 => Some(V1_ROUTES),
        2 => Some(V2_ROUTES),
        _ => None,
    }
}

/// Find the rules for `operation` within `version`.
pub fn find_route(version: ApiVersion, operation: Operation) -> Option<&'static OperationRoute> {
    routing_table(version)?.iter().find(|route| route.operation == operation)
}
