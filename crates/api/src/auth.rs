//! Basic authentication for operations that require an authenticated caller.

use axum::http::{HeaderMap, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Credentials carried by an `Authorization: Basic ...` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthorization {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthorization")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BasicAuthorization {
    /// Decode the header value; `None` when it is not well-formed Basic credentials.
    pub fn parse(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = BASE64.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Require the request to carry credentials the configuration accepts.
pub fn authorize(config: &ApiConfig, headers: &HeaderMap) -> Result<(), ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BasicAuthorization::parse)
        .ok_or(ApiError::Unauthorized)?;

    if config.accepts_credentials(&authorization.username, &authorization.password) {
        Ok(())
    } else {
        debug!(username = %authorization.username, "rejected credentials");
        Err(ApiError::Unauthorized)
    }
}
