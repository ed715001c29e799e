use std::fmt;

use crate::negotiation::routes::routing_table;

/// A major API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion(u32);

impl ApiVersion {
    pub const V1: ApiVersion = ApiVersion(1);
    pub const V2: ApiVersion = ApiVersion(2);

    pub const fn new(major: u32) -> Self {
        Self(major)
    }

    pub fn major(self) -> u32 {
        self.0
    }

    /// Parse a version header value: `2`, `2.0` or `v2`. Minor versions other than zero are not served.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let value = value.strip_prefix(['v', 'V']).unwrap_or(value);
        let (major, minor) = match value.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (value, None),
        };
        if let Some(minor) = minor
            && minor.parse::<u32>().ok() != Some(0)
        {
            return None;
        }
        major.parse::<u32>().ok().map(Self)
    }

    /// Whether an operation table exists for this version.
    pub fn has_routes(self) -> bool {
        routing_table(self).is_some()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.0", self.0)
    }
}
