//! Per-operation orchestration of negotiation, cache, store and mapping.
//!
//! Each public method is one short-lived request: negotiate, consult the
//! cache where the route allows it, call the store, map, and describe the
//! response. Nothing here suspends except the store calls.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use contacts_store::ContactStore;
use contacts_types::{Contact, ContactForCreation, ContactForUpdate, ContactId, ContactWithPhonesForCreation, PhoneId};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::auth::authorize;
use crate::cache::{CacheKey, ResponseCache};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::mapper::{
    contact_from_creation, contact_from_creation_with_phones, contact_from_update, describe, describe_phone, merge_update, summarize,
    update_form,
};
use crate::negotiation::{ContentNegotiator, Format, Negotiation, Operation, Representation};
use crate::patch::{PatchOperation, apply_patch};
use crate::render::{render, render_contacts, render_details, render_phones};
use crate::validation::{validate_creation, validate_creation_with_phones, validate_update};

/// Collection path; single contacts live at `/contacts/{id}`.
pub const CONTACTS_PATH: &str = "/contacts";

/// Transport-neutral description of a successful outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResponse {
    status: StatusCode,
    body: Option<(&'static str, Bytes)>,
    location: Option<String>,
    max_age: Option<Duration>,
}

impl EndpointResponse {
    pub fn ok(media_type: &'static str, body: Bytes) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some((media_type, body)),
            location: None,
            max_age: None,
        }
    }

    pub fn created(location: String, media_type: &'static str, body: Bytes) -> Self {
        Self {
            status: StatusCode::CREATED,
            location: Some(location),
            ..Self::ok(media_type, body)
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
            location: None,
            max_age: None,
        }
    }

    /// Mark the response as publicly cacheable for `max_age`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> Option<&'static str> {
        self.body.as_ref().map(|(media_type, _)| *media_type)
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref().map(|(_, body)| body)
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl IntoResponse for EndpointResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some((media_type, body)) => {
                let mut response = (self.status, body).into_response();
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(media_type));
                response
            }
            None => self.status.into_response(),
        };

        let headers = response.headers_mut();
        if let Some(location) = self.location.and_then(|location| HeaderValue::from_str(&location).ok()) {
            headers.insert(header::LOCATION, location);
        }
        if let Some(max_age) = self.max_age
            && let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", max_age.as_secs()))
        {
            headers.insert(header::CACHE_CONTROL, value);
        }
        response
    }
}

/// The contacts resource: the only component exposed to transport.
#[derive(Clone)]
pub struct ContactsEndpoint {
    config: Arc<ApiConfig>,
    negotiator: ContentNegotiator,
    cache: ResponseCache,
    store: Arc<dyn ContactStore>,
}

impl ContactsEndpoint {
    pub fn new(config: Arc<ApiConfig>, store: Arc<dyn ContactStore>) -> Self {
        let negotiator = ContentNegotiator::new(config.versioning.clone());
        let cache = ResponseCache::new(config.cache.time_to_live());
        Self {
            config,
            negotiator,
            cache,
            store,
        }
    }

    pub fn config(&self) -> &Arc<ApiConfig> {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// `GET /contacts?search=`
    pub async fn list_contacts(&self, headers: &HeaderMap, search: Option<&str>) -> Result<EndpointResponse, ApiError> {
        let negotiation = self.negotiate(Operation::ListContacts, headers)?;
        let output = negotiation.output()?;

        let contacts = self.store.list(search).await?;
        let summaries: Vec<_> = contacts.iter().map(summarize).collect();
        debug!(count = summaries.len(), search = search.unwrap_or_default(), "listed contacts");

        let body = render_contacts(output.format, &summaries)?;
        Ok(EndpointResponse::ok(output.media_type, body))
    }

    /// `GET /contacts/{id}`, served from the response cache while the entry is fresh.
    pub async fn get_contact(&self, headers: &HeaderMap, id: ContactId) -> Result<EndpointResponse, ApiError> {
        let negotiation = self.negotiate(Operation::GetContact, headers)?;
        let output = negotiation.output()?;
        let cacheable = negotiation.route.cacheable;
        let key = CacheKey {
            operation: Operation::GetContact,
            resource_id: id,
            representation: output.representation,
            media_type: output.media_type,
        };

        if cacheable && let Some(body) = self.cache.get(&key) {
            debug!(contact_id = id, media_type = output.media_type, "cache hit");
            return Ok(EndpointResponse::ok(output.media_type, body).with_max_age(self.cache.time_to_live()));
        }

        let contact = self.store.get(id).await?.ok_or_else(|| ApiError::contact_not_found(id))?;
        let body = render_contact(output.representation, output.format, &contact)?;

        let response = EndpointResponse::ok(output.media_type, body.clone());
        if !cacheable {
            return Ok(response);
        }
        debug!(contact_id = id, media_type = output.media_type, "cache miss");
        self.cache.put(key, body);
        Ok(response.with_max_age(self.cache.time_to_live()))
    }

    /// `POST /contacts`; the consumed media type picks both the input and the created representation.
    pub async fn create_contact(&self, headers: &HeaderMap, body: &[u8]) -> Result<EndpointResponse, ApiError> {
        let negotiation = self.negotiate(Operation::CreateContact, headers)?;
        let input = negotiation.input()?;
        let output = negotiation.output()?;

        let contact = match input.representation {
            Representation::Creation => {
                let creation: ContactForCreation = parse_body(body)?;
                validate_creation(&creation).into_result().map_err(ApiError::ValidationFailed)?;
                contact_from_creation(creation)
            }
            Representation::CreationWithPhones => {
                let creation: ContactWithPhonesForCreation = parse_body(body)?;
                validate_creation_with_phones(&creation)
                    .into_result()
                    .map_err(ApiError::ValidationFailed)?;
                contact_from_creation_with_phones(creation)
            }
            other => return Err(unexpected_representation(other)),
        };

        let created = self.store.create(contact).await?;
        info!(contact_id = created.id, phones = created.phones.len(), "created contact");

        let body = render_contact(input.representation.created_response(), output.format, &created)?;
        Ok(EndpointResponse::created(contact_location(created.id), output.media_type, body))
    }

    /// `PUT /contacts/{id}`: full replacement of the editable fields.
    pub async fn update_contact(&self, headers: &HeaderMap, id: ContactId, body: &[u8]) -> Result<EndpointResponse, ApiError> {
        self.negotiate(Operation::UpdateContact, headers)?.input()?;

        let update: ContactForUpdate = parse_body(body)?;
        validate_update(&update).into_result().map_err(ApiError::ValidationFailed)?;

        if !self.store.update(contact_from_update(id, update)).await? {
            return Err(ApiError::contact_not_found(id));
        }
        info!(contact_id = id, "replaced contact");
        Ok(EndpointResponse::no_content())
    }

    /// `PATCH /contacts/{id}` with a patch document.
    pub async fn patch_contact(&self, headers: &HeaderMap, id: ContactId, body: &[u8]) -> Result<EndpointResponse, ApiError> {
        self.negotiate(Operation::PatchContact, headers)?.input()?;

        let operations: Vec<PatchOperation> = parse_body(body)?;
        let mut contact = self.store.get(id).await?.ok_or_else(|| ApiError::contact_not_found(id))?;
        let patched = apply_patch(&update_form(&contact), &operations)?;
        merge_update(&mut contact, patched);

        // The contact may have been deleted between the read and this write.
        if !self.store.update(contact).await? {
            return Err(ApiError::contact_not_found(id));
        }
        info!(contact_id = id, operations = operations.len(), "patched contact");
        Ok(EndpointResponse::no_content())
    }

    /// `DELETE /contacts/{id}`
    pub async fn delete_contact(&self, headers: &HeaderMap, id: ContactId) -> Result<EndpointResponse, ApiError> {
        self.negotiate(Operation::DeleteContact, headers)?;

        if !self.store.delete(id).await? {
            return Err(ApiError::contact_not_found(id));
        }
        info!(contact_id = id, "deleted contact");
        Ok(EndpointResponse::no_content())
    }

    /// `GET /contacts/{id}/phones`
    pub async fn list_phones(&self, headers: &HeaderMap, contact_id: ContactId) -> Result<EndpointResponse, ApiError> {
        let negotiation = self.negotiate(Operation::ListPhones, headers)?;
        let output = negotiation.output()?;

        let contact = self
            .store
            .get(contact_id)
            .await?
            .ok_or_else(|| ApiError::contact_not_found(contact_id))?;
        let phones: Vec<_> = contact.phones.iter().map(describe_phone).collect();

        let body = render_phones(output.format, &phones)?;
        Ok(EndpointResponse::ok(output.media_type, body))
    }

    /// `GET /contacts/{id}/phones/{phoneId}`; a phone owned by another contact is not found.
    pub async fn get_phone(&self, headers: &HeaderMap, contact_id: ContactId, phone_id: PhoneId) -> Result<EndpointResponse, ApiError> {
        let negotiation = self.negotiate(Operation::GetPhone, headers)?;
        let output = negotiation.output()?;

        let contact = self
            .store
            .get(contact_id)
            .await?
            .ok_or_else(|| ApiError::contact_not_found(contact_id))?;
        let phone = contact.phone(phone_id).ok_or_else(|| ApiError::phone_not_found(phone_id))?;

        let body = render(output.format, "phone", &describe_phone(phone))?;
        Ok(EndpointResponse::ok(output.media_type, body))
    }

    fn negotiate(&self, operation: Operation, headers: &HeaderMap) -> Result<Negotiation, ApiError> {
        let negotiation = self.negotiator.negotiate(operation, headers)?;
        if negotiation.route.requires_authentication {
            authorize(&self.config, headers)?;
        }
        Ok(negotiation)
    }
}

/// Location of a single contact.
pub fn contact_location(id: ContactId) -> String {
    format!("{CONTACTS_PATH}/{id}")
}

fn render_contact(representation: Representation, format: Format, contact: &Contact) -> Result<Bytes, ApiError> {
    match representation {
        Representation::Summary => render(format, "contact", &summarize(contact)),
        Representation::Details => render_details(format, &describe(contact)),
        other => Err(unexpected_representation(other)),
    }
}

fn unexpected_representation(representation: Representation) -> ApiError {
    ApiError::serialization(format!("{representation:?} cannot be used here"))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::malformed_body("request body is empty"));
    }
    serde_json::from_slice(body).map_err(|error| ApiError::malformed_body(error.to_string()))
}
