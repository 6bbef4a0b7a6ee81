use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Outbound mail settings. When `enabled` is false, review notifications
/// are logged and dropped instead of delivered.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MailConfig {
    pub enabled: bool,
    /// HTTP endpoint of the mail delivery API.
    pub api_url: String,
    pub api_token: String,
    pub from_address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("mail.enabled", false)?
            .set_default("mail.api_url", "")?
            .set_default("mail.api_token", "")?
            .set_default("mail.from_address", "no-reply@skillsphere.local")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SKILLSPHERE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("SKILLSPHERE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
