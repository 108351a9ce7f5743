use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub tickets: TicketsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub menu_ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TicketsConfig {
    pub service_url: String,
    #[serde(default = "default_ticket_timeout")]
    pub request_timeout_seconds: u64,
    pub output_dir: String,
}

fn default_ticket_timeout() -> u64 {
    10
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Base configuration, always present
            .add_source(config::File::with_name("config/default"))
            // Environment-specific layer, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `BRIGADE__SERVER__PORT=4000` overrides `server.port`
            .add_source(config::Environment::with_prefix("BRIGADE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
