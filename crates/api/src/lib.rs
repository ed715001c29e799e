//! Content-negotiated, versioned and cached HTTP API over contact records.
//!
//! Requests flow from the axum [`http::router`] into the
//! [`endpoint::ContactsEndpoint`], which negotiates a version and a
//! representation, consults the [`cache::ResponseCache`] for reads, calls the
//! [`contacts_store::ContactStore`] and maps the result onto the wire.

pub mod auth;
pub mod cache;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod mapper;
pub mod middleware;
pub mod negotiation;
pub mod patch;
pub mod render;
pub mod validation;

pub use cache::{CacheKey, ResponseCache};
pub use config::{ApiConfig, ConfigError};
pub use endpoint::{ContactsEndpoint, EndpointResponse};
pub use error::ApiError;
pub use http::{ContactsHttpServer, RunningContactsHttpServer, router};
pub use negotiation::{ApiVersion, ContentNegotiator, Negotiation};
pub use patch::{PatchError, PatchOperation, apply_patch};
