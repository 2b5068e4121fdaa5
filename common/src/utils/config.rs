use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub surrealdb_address: String,
    pub surrealdb_access_key: String,
    #[serde(default = "default_namespace")]
    pub surrealdb_namespace: String,
    #[serde(default = "default_database")]
    pub surrealdb_database: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

fn default_namespace() -> String {
    "feedback".to_string()
}

fn default_database() -> String {
    "board".to_string()
}

fn default_http_port() -> u16 {
    3001
}

/// Reads `config.*` from the working directory if present, then overlays the
/// process environment. Fails when the database address or access key is absent.
pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
