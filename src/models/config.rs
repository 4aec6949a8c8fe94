use serde::Deserialize;

use crate::domain::featured::DEFAULT_FEATURED_COUNT;
use crate::domain::festival::DEFAULT_UPCOMING_FESTIVALS;

/// Configuration options for the temple directory server.
///
/// Loaded from `config/default.yaml`, an optional `config/{APP_ENV}.yaml`
/// and `APP_*` environment variables, in that order.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Cookie signing key material; at least 32 bytes.
    pub secret: String,
    /// Where users sign in. Also the "home" link of the navbar.
    pub auth_service_url: String,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    #[serde(default = "default_featured_count")]
    pub featured_count: usize,
    #[serde(default = "default_upcoming_festivals")]
    pub upcoming_festivals: usize,
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_featured_count() -> usize {
    DEFAULT_FEATURED_COUNT
}

fn default_upcoming_festivals() -> usize {
    DEFAULT_UPCOMING_FESTIVALS
}
