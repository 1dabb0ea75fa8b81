// src/config.rs
//! Deployment configuration: a `config.yaml` with `local` and `production`
//! sections, selected by environment variable, with secret overrides from the
//! environment. Secrets are required — there is no default credential.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
}

fn default_ttl_hours() -> i64 {
    24
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub upstream: UpstreamConfig,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: AppConfig,
    production: AppConfig,
}

impl AppConfig {
    /// Load configuration for the current environment.
    pub fn load() -> Result<Self> {
        let environment = Self::environment();
        info!("Loading configuration for environment: {}", environment);

        let mut config = Self::load_from_file(&environment)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn environment() -> String {
        std::env::var("HIREFLOW_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_from_file(environment: &str) -> Result<Self> {
        let config_path = PathBuf::from("config.yaml");
        if !config_path.exists() {
            anyhow::bail!(
                "config.yaml not found in current directory. Server cannot start without configuration."
            );
        }

        let config_content =
            std::fs::read_to_string(&config_path).context("Failed to read config.yaml")?;

        let config_file: ConfigFile =
            serde_yaml::from_str(&config_content).context("Failed to parse config.yaml")?;

        let env_config = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(Self {
            database_path: Self::resolve_path(&env_config.database_path)?,
            upstream: env_config.upstream,
            session: env_config.session,
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("HIREFLOW_UPSTREAM_TOKEN") {
            self.upstream.token = token;
        }
        if let Ok(secret) = std::env::var("HIREFLOW_SESSION_SECRET") {
            self.session.secret = secret;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.upstream.token.trim().is_empty() {
            anyhow::bail!(
                "Upstream bearer token is not configured. Set upstream.token in config.yaml \
                 or the HIREFLOW_UPSTREAM_TOKEN environment variable."
            );
        }
        if self.session.secret.trim().is_empty() {
            anyhow::bail!(
                "Session signing secret is not configured. Set session.secret in config.yaml \
                 or the HIREFLOW_SESSION_SECRET environment variable."
            );
        }
        Ok(())
    }

    fn resolve_path(path: &PathBuf) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.clone())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    /// Ensure the database parent directory exists.
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(db_parent) = self.database_path.parent() {
            tokio::fs::create_dir_all(db_parent).await.with_context(|| {
                format!(
                    "Failed to create database directory: {}",
                    db_parent.display()
                )
            })?;
        }
        Ok(())
    }
}
