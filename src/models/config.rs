//! Configuration model loaded from external sources.

use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Sign-in page unauthenticated visitors are sent to when none is configured.
pub const DEFAULT_SIGNIN_URL: &str = "/auth/signin";

fn default_signin_url() -> String {
    DEFAULT_SIGNIN_URL.to_string()
}

#[derive(Clone, Debug, Deserialize)]
/// Settings shared by the web server and the import tool.
pub struct ServerConfig {
    /// Cookie domain shared with the identity provider.
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Signs session cookies and identity tokens. At least 64 bytes.
    pub secret: String,
    #[serde(default = "default_signin_url")]
    pub signin_url: String,
}

impl ServerConfig {
    /// Reads `config/default.yaml`, then `config/<APP_ENV>.yaml` (`local` when
    /// unset), then `APP__*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
