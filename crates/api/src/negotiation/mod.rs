//! Header-driven selection of API version, representation and format.
//!
//! Resolution order is fixed: the version header picks an operation table,
//! then `Content-Type` and `Accept` pick representations within that table.

mod media;
mod routes;
mod version;

pub use media::{
    APPLICATION_JSON, APPLICATION_XML, Format, JSON_PATCH, MediaRange, PROBLEM_JSON, VENDOR_CONTACT_JSON, VENDOR_CONTACT_WITH_PHONES_JSON,
    essence, parse_accept,
};
pub use routes::{MediaRoute, Operation, OperationRoute, Representation, find_route, routing_table};
pub use version::ApiVersion;

use axum::http::{HeaderMap, header};
use tracing::debug;

use crate::config::VersioningConfig;
use crate::error::ApiError;

/// Outcome of negotiating one request.
#[derive(Debug, Clone, Copy)]
pub struct Negotiation {
    pub version: ApiVersion,
    pub route: &'static OperationRoute,
    /// Selected request body shape, for operations that consume one.
    pub input: Option<MediaRoute>,
    /// Selected response body shape, for operations that produce one.
    pub output: Option<MediaRoute>,
}

impl Negotiation {
    /// Response media route for operations that produce a body.
    pub fn output(&self) -> Result<MediaRoute, ApiError> {
        self.output
            .ok_or_else(|| ApiError::serialization(format!("{} produces no body", self.route.operation.name())))
    }

    /// Request media route for operations that consume a body.
    pub fn input(&self) -> Result<MediaRoute, ApiError> {
        self.input
            .ok_or_else(|| ApiError::malformed_body(format!("{} takes no body", self.route.operation.name())))
    }
}

/// Resolves the version/representation/format triple for a request.
#[derive(Debug, Clone)]
pub struct ContentNegotiator {
    versioning: VersioningConfig,
}

impl ContentNegotiator {
    pub fn new(versioning: VersioningConfig) -> Self {
        Self { versioning }
    }

    /// Read the version header, defaulting to the lowest supported version.
    pub fn resolve_version(&self, headers: &HeaderMap) -> Result<ApiVersion, ApiError> {
        let Some(value) = headers.get(self.versioning.header.as_str()) else {
            return self
                .versioning
                .default_version()
                .map(ApiVersion::new)
                .ok_or_else(|| ApiError::unsupported_version("<none>"));
        };
        let requested = value.to_str().map_err(|_| ApiError::unsupported_version("<invalid>"))?;
        match ApiVersion::parse(requested) {
            Some(version) if self.versioning.supports(version.major()) => Ok(version),
            _ => Err(ApiError::unsupported_version(requested.trim())),
        }
    }

    /// Negotiate `operation` for a request carrying `headers`.
    pub fn negotiate(&self, operation: Operation, headers: &HeaderMap) -> Result<Negotiation, ApiError> {
        let version = self.resolve_version(headers)?;
        let route = find_route(version, operation).ok_or_else(|| ApiError::unsupported_version(version.to_string()))?;

        let input = if route.consumes.is_empty() {
            None
        } else {
            Some(select_consumed(route, headers)?)
        };
        let output = if route.produces.is_empty() {
            None
        } else {
            Some(select_produced(route, headers)?)
        };

        debug!(
            operation = operation.name(),
            version = %version,
            input = input.map(|media| media.media_type),
            output = output.map(|media| media.media_type),
            "negotiated request"
        );
        Ok(Negotiation {
            version,
            route,
            input,
            output,
        })
    }
}

fn select_consumed(route: &OperationRoute, headers: &HeaderMap) -> Result<MediaRoute, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let requested = essence(content_type);
    route
        .consumes
        .iter()
        .find(|media| media.media_type == requested)
        .copied()
        .ok_or_else(|| ApiError::UnsupportedMediaType {
            content_type: if requested.is_empty() { "<none>".to_string() } else { requested },
        })
}

fn select_produced(route: &OperationRoute, headers: &HeaderMap) -> Result<MediaRoute, ApiError> {
    let accept = headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");
    if accept.trim().is_empty() {
        return Ok(route.produces[0]);
    }

    parse_accept(&accept)
        .iter()
        .find_map(|range| route.produces.iter().find(|media| range.matches(media.media_type)))
        .copied()
        .ok_or(ApiError::NotAcceptable { accept })
}
