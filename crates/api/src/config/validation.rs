//! Startup validation for API configuration.

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;
use crate::negotiation::ApiVersion;

/// Validate the entire API configuration.
pub fn validate_config(config: &ApiConfig) -> Result<(), ConfigError> {
    config
        .bind_address
        .parse::<SocketAddr>()
        .map_err(|error| ConfigError::InvalidBindAddress {
            address: config.bind_address.clone(),
            reason: error.to_string(),
        })?;

    if config.allowed_origins.is_empty() {
        return Err(ConfigError::NoAllowedOrigins);
    }
    for origin in &config.allowed_origins {
        validate_origin(origin)?;
    }

    if config.cache.ttl_seconds == 0 {
        return Err(ConfigError::InvalidTtl);
    }

    if HeaderName::from_bytes(config.versioning.header.as_bytes()).is_err() {
        return Err(ConfigError::InvalidHeaderName {
            name: config.versioning.header.clone(),
        });
    }
    if config.versioning.supported.is_empty() {
        return Err(ConfigError::NoSupportedVersions);
    }
    for &major in &config.versioning.supported {
        if !ApiVersion::new(major).has_routes() {
            return Err(ConfigError::UnknownVersion { version: major });
        }
    }

    Ok(())
}

/// An origin is a bare scheme://host[:port] with no path, query or fragment.
fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidOrigin {
        origin: origin.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(origin).map_err(|error| invalid(&error.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("host is required"));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() || origin.ends_with('/') {
        return Err(invalid("origin must not contain a path, query or fragment"));
    }
    Ok(())
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid bind address '{address}': {reason}")]
    InvalidBindAddress { address: String, reason: String },

    #[error("At least one allowed origin must be configured")]
    NoAllowedOrigins,

    #[error("Invalid allowed origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("Cache TTL must be greater than zero seconds")]
    InvalidTtl,

    #[error("Invalid version header name '{name}'")]
    InvalidHeaderName { name: String },

    #[error("At least one API version must be supported")]
    NoSupportedVersions,

    #[error("API version {version} has no operations")]
    UnknownVersion { version: u32 },
}
