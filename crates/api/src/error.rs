//! Request-scoped error taxonomy and its problem-details rendering.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use contacts_store::StoreError;
use contacts_types::{ContactId, PhoneId};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::negotiation::PROBLEM_JSON;
use crate::patch::{PatchError, PatchRejection};
use crate::validation::ValidationErrors;

/// Errors detected at the endpoint boundary.
///
/// Every variant is scoped to the request that produced it and maps to exactly
/// one HTTP status; none of them are retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{resource} {id} was not found")]
    NotFound { resource: &'static str, id: i32 },

    #[error("one or more validation errors occurred: {0}")]
    ValidationFailed(ValidationErrors),

    #[error("patch rejected ({reason}): {message}")]
    PatchRejected {
        reason: PatchRejection,
        message: String,
        errors: ValidationErrors,
    },

    #[error("API version '{requested}' is not supported for this request")]
    UnsupportedVersion { requested: String },

    #[error("none of the accepted media types ({accept}) can be produced")]
    NotAcceptable { accept: String },

    #[error("content type '{content_type}' is not supported")]
    UnsupportedMediaType { content_type: String },

    #[error("authentication is required")]
    Unauthorized,

    #[error("request body could not be read: {message}")]
    MalformedBody { message: String },

    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("response could not be serialized: {message}")]
    Serialization { message: String },
}

impl ApiError {
    /// Create a contact not found error.
    pub fn contact_not_found(id: ContactId) -> Self {
        Self::NotFound { resource: "contact", id }
    }

    /// Create a phone not found error.
    pub fn phone_not_found(id: PhoneId) -> Self {
        Self::NotFound { resource: "phone", id }
    }

    /// Create an unsupported version error.
    pub fn unsupported_version(requested: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            requested: requested.into(),
        }
    }

    /// Create a malformed body error.
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::MalformedBody { message: message.into() }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into() }
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PatchRejected { reason, .. } => match reason {
                PatchRejection::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::UnsupportedVersion { .. } | Self::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            Self::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Store(_) | Self::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn problem(&self) -> ProblemDetails {
        let status = self.status();
        let (reason, errors) = match self {
            Self::ValidationFailed(errors) => (None, Some(errors.clone())),
            Self::PatchRejected { reason, errors, .. } => (Some(reason.code()), Some(errors.clone()).filter(|errors| !errors.is_empty())),
            _ => (None, None),
        };
        ProblemDetails {
            problem_type: format!("https://www.rfc-editor.org/rfc/rfc9110#status.{}", status.as_u16()),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status: status.as_u16(),
            detail: self.to_string(),
            reason,
            errors,
        }
    }
}

impl From<PatchError> for ApiError {
    fn from(error: PatchError) -> Self {
        let reason = error.rejection();
        match error {
            PatchError::Validation(errors) => Self::PatchRejected {
                reason,
                message: "the patched contact is not valid".to_string(),
                errors,
            },
            other => Self::PatchRejected {
                reason,
                message: other.to_string(),
                errors: ValidationErrors::new(),
            },
        }
    }
}

/// RFC 7807 problem body.
#[derive(Debug, Serialize)]
struct ProblemDetails {
    #[serde(rename = "type")]
    problem_type: String,
    title: String,
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<ValidationErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let mut response = (status, Json(self.problem())).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        if matches!(self, Self::Unauthorized) {
            headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(r#"Basic realm="contacts""#));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(ApiError::contact_not_found(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::ValidationFailed(ValidationErrors::new()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::unsupported_version("3").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NotAcceptable {
                accept: "text/html".into()
            }
            .status(),
            StatusCode::NOT_ACCEPTABLE
        );
        assert_eq!(
            ApiError::UnsupportedMediaType {
                content_type: "text/plain".into()
            }
            .status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(StoreError::unavailable("down")).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn patch_rejections_split_structural_and_validation_failures() {
        let structural = ApiError::from(PatchError::UnresolvedPath {
            index: 0,
            path: "/nickname".into(),
        });
        assert_eq!(structural.status(), StatusCode::BAD_REQUEST);

        let mut errors = ValidationErrors::new();
        errors.add("wrongName", "same");
        let invalid = ApiError::from(PatchError::Validation(errors));
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn problem_body_carries_field_errors() {
        let mut errors = ValidationErrors::new();
        errors.add("firstName", "The FirstName field is required.");
        let problem = serde_json::to_value(ApiError::ValidationFailed(errors).problem()).unwrap();

        assert_eq!(problem["status"], 422);
        assert_eq!(problem["title"], "Unprocessable Entity");
        assert_eq!(problem["errors"]["firstName"][0], "The FirstName field is required.");
        assert!(problem.get("reason").is_none());
    }

    #[test]
    fn unauthorized_response_challenges_for_basic_credentials() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], r#"Basic realm="contacts""#);
        assert_eq!(response.headers()[header::CONTENT_TYPE], PROBLEM_JSON);
    }
}
