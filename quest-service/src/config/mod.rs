use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct QuestConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    /// OTLP collector endpoint; local logging only when unset.
    pub otlp_endpoint: Option<String>,
    pub invitations: InvitationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitationConfig {
    /// Public origin used to render shareable invite links.
    pub public_base_url: String,
    /// Default lifetime applied when the issuer picks no expiration.
    pub default_expiry_days: i64,
}

impl QuestConfig {
    pub fn load() -> Result<Self, AppError> {
        // Loads .env and the APP__ prefixed environment.
        let common = core_config::Config::load()?;

        Ok(QuestConfig {
            common,
            service_name: get_env("SERVICE_NAME", Some("quest-service"))?,
            log_level: get_env("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            invitations: InvitationConfig {
                public_base_url: get_env("PUBLIC_BASE_URL", Some("http://localhost:8080"))?,
                default_expiry_days: get_env("INVITE_DEFAULT_EXPIRY_DAYS", Some("7"))?
                    .parse()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!(
                            "INVITE_DEFAULT_EXPIRY_DAYS must be an integer: {}",
                            e
                        ))
                    })?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => default.map(|d| d.to_string()).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key))
        }),
    }
}
