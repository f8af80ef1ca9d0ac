//! Configuration surface (§6): NATS, S3, Postgres, Redis, HTTP, and the target list.
//!
//! Loaded from a TOML file the way the original Python services loaded `pydantic-settings`
//! TOML configuration; unknown top-level keys are ignored rather than rejected.

use std::path::Path;

use serde::Deserialize;

use crate::error::{DebiasError, Result};
use crate::types::Target;

#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    #[serde(default = "default_nats_dsn")]
    pub dsn: String,
}

fn default_nats_dsn() -> String {
    "nats://localhost:4222".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    "debias-scraper".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub bucket_name: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub connection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyValueConfig {
    pub dsn: String,
}

/// Configuration for the headless-render collaborator (C8's external dependency). Not part
/// of the original enumerated configuration surface, but every render worker needs a base
/// URL for the render capability to call — other TOML keys being ignored is exactly what
/// makes adding this one safe.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_browserless_url")]
    pub browserless_url: String,
    #[serde(default)]
    pub browserless_token: Option<String>,
}

fn default_browserless_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            browserless_url: default_browserless_url(),
            browserless_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// Top-level configuration surface. Other TOML keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub render: RenderConfig,
    pub s3: S3Config,
    pub pg: PostgresConfig,
    pub keyvalue: KeyValueConfig,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            dsn: default_nats_dsn(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, validating target render policies and rejecting
    /// duplicate target ids.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DebiasError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| DebiasError::Config(format!("failed to parse config file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for target in &self.app.targets {
            if target.id.is_empty() {
                return Err(DebiasError::Config("target id must not be empty".into()));
            }
            if !seen.insert(target.id.clone()) {
                return Err(DebiasError::Config(format!(
                    "duplicate target id: {}",
                    target.id
                )));
            }
        }
        Ok(())
    }

    /// Log the presence (never the value) of each secret-bearing field.
    pub fn log_redacted(&self) {
        tracing::info!(
            nats_dsn_set = !self.nats.dsn.is_empty(),
            s3_bucket = %self.s3.bucket_name,
            s3_region = %self.s3.region,
            pg_connection_set = !self.pg.connection.is_empty(),
            keyvalue_dsn_set = !self.keyvalue.dsn.is_empty(),
            targets = self.app.targets.len(),
            "loaded configuration"
        );
    }
}
