//! API configuration.
//! Loaded once at startup from `~/.config/contacts/api.json` (or the path in
//! `CONTACTS_CONFIG_PATH`) and shared read-only afterwards.

mod io;
mod model;
mod validation;

pub use io::{CONFIG_PATH_ENV, default_config_path, load_config, load_config_from_path};
pub use model::{ApiConfig, BasicCredential, CacheConfig, VersioningConfig};
pub use validation::{ConfigError, validate_config};
