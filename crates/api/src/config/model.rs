//! Data models for API configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Process-wide settings for the contacts API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Socket address the HTTP server binds to.
    pub bind_address: String,
    /// Browser origins allowed to call the API cross-origin.
    pub allowed_origins: Vec<String>,
    /// Response cache settings.
    pub cache: CacheConfig,
    /// Version header and the set of versions served.
    pub versioning: VersioningConfig,
    /// Credentials accepted by operations that require an authenticated caller.
    pub credentials: Vec<BasicCredential>,
    /// Populate the in-memory store with demo contacts on startup.
    pub seed_data: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            cache: CacheConfig::default(),
            versioning: VersioningConfig::default(),
            credentials: Vec::new(),
            seed_data: true,
        }
    }
}

impl ApiConfig {
    /// Whether `origin` is one of the configured allowed origins.
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed.eq_ignore_ascii_case(origin))
    }

    /// Whether the username/password pair matches a configured credential.
    pub fn accepts_credentials(&self, username: &str, password: &str) -> bool {
        self.credentials
            .iter()
            .any(|credential| credential.username == username && credential.password == password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Seconds a cached read stays eligible to be served.
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 60 }
    }
}

impl CacheConfig {
    pub fn time_to_live(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct VersioningConfig {
    /// Request header carrying the requested major version.
    pub header: String,
    /// Major versions served; the lowest one is used when the header is absent.
    pub supported: Vec<u32>,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            header: "X-API-Version".to_string(),
            supported: vec![1, 2],
        }
    }
}

impl VersioningConfig {
    /// Lowest supported major version.
    pub fn default_version(&self) -> Option<u32> {
        self.supported.iter().copied().min()
    }

    pub fn supports(&self, major: u32) -> bool {
        self.supported.contains(&major)
    }

    /// Value reported in the `api-supported-versions` response header.
    pub fn supported_header_value(&self) -> String {
        let mut versions = self.supported.clone();
        versions.sort_unstable();
        versions.dedup();
        versions.iter().map(|major| format!("{major}.0")).collect::<Vec<_>>().join(", ")
    }
}

/// Username/password pair for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasicCredential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
