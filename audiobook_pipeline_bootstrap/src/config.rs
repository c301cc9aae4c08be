// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Configuration
//!
//! Bootstrap-phase configuration structure.
//!
//! ## Design Philosophy
//!
//! `AppConfig` holds **validated** configuration after:
//! 1. Command-line argument parsing
//! 2. Security validation
//! 3. Environment variable resolution (via the `config` crate, layered
//!    over an optional TOML file)
//! 4. Default value application
//!
//! ## Immutability
//!
//! All configuration is immutable after creation, so it can be shared
//! across async tasks (HTTP handlers, stage workers) without
//! synchronization.

use std::path::PathBuf;

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to tracing Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Application configuration
///
/// Immutable configuration structure holding all bootstrap-phase settings
/// for the audiobook pipeline service: where the metadata database and
/// blob root live, what address the HTTP gateway binds, and the secret
/// used to sign streaming URLs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    app_name: String,
    log_level: LogLevel,

    /// `sqlite://...` connection string for the Metadata Store and Queue
    /// Broker (spec §4.1/§4.3 share one database).
    database_url: String,

    /// Root directory the Blob Store resolves relative paths against
    /// (spec §4.2).
    blob_root: PathBuf,

    /// Address the HTTP gateway listens on, e.g. `0.0.0.0:8080`.
    bind_addr: String,

    /// HMAC-SHA256 key material for signed streaming URLs (spec §4.7).
    /// Never logged or displayed.
    signing_secret: String,

    /// How long a signed streaming URL remains valid.
    signed_url_ttl_secs: u64,

    /// How long a stage worker's lease on a reserved job lasts before
    /// another consumer may reclaim it (spec §4.3).
    lease_duration_secs: u64,

    /// Grace period for in-flight requests/leases to finish during
    /// shutdown before the process exits anyway.
    shutdown_grace_period_secs: u64,

    /// Maximum accepted upload size in bytes (spec §6.4, default 50 MiB).
    max_upload_bytes: u64,

    /// Retry budget before a stage worker gives up and fails the book
    /// (spec §4.4, default 3).
    worker_max_attempts: u32,

    /// `<token>=<user_ulid>,...` pairs consumed by `StaticTokenResolver`
    /// (spec §4.8). Empty by default; a deployment with no configured
    /// tokens simply rejects every bearer token.
    auth_tokens: String,

    verbose: bool,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn blob_root(&self) -> &PathBuf {
        &self.blob_root
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    pub fn signing_secret(&self) -> &str {
        &self.signing_secret
    }

    pub fn signed_url_ttl_secs(&self) -> u64 {
        self.signed_url_ttl_secs
    }

    pub fn lease_duration_secs(&self) -> u64 {
        self.lease_duration_secs
    }

    pub fn shutdown_grace_period_secs(&self) -> u64 {
        self.shutdown_grace_period_secs
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn worker_max_attempts(&self) -> u32 {
        self.worker_max_attempts
    }

    pub fn auth_tokens(&self) -> &str {
        &self.auth_tokens
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

impl std::fmt::Display for AppConfig {
    /// Deliberately omits `signing_secret`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (db={}, blobs={}, bind={})",
            self.app_name,
            self.database_url,
            self.blob_root.display(),
            self.bind_addr
        )
    }
}

/// Builder for `AppConfig`. Loads layered defaults from `AppConfigBuilder::from_sources`,
/// or can be populated field-by-field (used by tests and by the CLI layer
/// after `config::Config` has been resolved).
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    app_name: Option<String>,
    log_level: Option<LogLevel>,
    database_url: Option<String>,
    blob_root: Option<PathBuf>,
    bind_addr: Option<String>,
    signing_secret: Option<String>,
    signed_url_ttl_secs: Option<u64>,
    lease_duration_secs: Option<u64>,
    shutdown_grace_period_secs: Option<u64>,
    max_upload_bytes: Option<u64>,
    worker_max_attempts: Option<u32>,
    auth_tokens: Option<String>,
    verbose: bool,
}

/// Errors that can occur while assembling or validating `AppConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("failed to read configuration sources: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl AppConfigBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn blob_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.blob_root = Some(path.into());
        self
    }

    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    pub fn signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.signing_secret = Some(secret.into());
        self
    }

    pub fn signed_url_ttl_secs(mut self, secs: u64) -> Self {
        self.signed_url_ttl_secs = Some(secs);
        self
    }

    pub fn lease_duration_secs(mut self, secs: u64) -> Self {
        self.lease_duration_secs = Some(secs);
        self
    }

    pub fn shutdown_grace_period_secs(mut self, secs: u64) -> Self {
        self.shutdown_grace_period_secs = Some(secs);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    pub fn worker_max_attempts(mut self, attempts: u32) -> Self {
        self.worker_max_attempts = Some(attempts);
        self
    }

    pub fn auth_tokens(mut self, tokens: impl Into<String>) -> Self {
        self.auth_tokens = Some(tokens.into());
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Layers defaults, an optional TOML file, and `AUDIOBOOK_*` environment
    /// variables (the `config` crate's standard precedence), then fills in
    /// any still-unset builder fields from the merged result.
    pub fn from_sources(mut self, config_file: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder().add_source(config::Config::try_from(&default_map())?);

        if let Some(path) = config_file {
            settings = settings.add_source(config::File::from(path.to_path_buf()).required(false));
        }

        let settings = settings
            .add_source(config::Environment::with_prefix("AUDIOBOOK").separator("__"))
            .build()?;

        if self.database_url.is_none() {
            self.database_url = settings.get_string("database_url").ok();
        }
        if self.blob_root.is_none() {
            if let Ok(path) = settings.get_string("blob_root") {
                self.blob_root = Some(PathBuf::from(path));
            }
        }
        if self.bind_addr.is_none() {
            self.bind_addr = settings.get_string("bind_addr").ok();
        }
        if self.signing_secret.is_none() {
            self.signing_secret = settings.get_string("signing_secret").ok();
        }
        if self.signed_url_ttl_secs.is_none() {
            self.signed_url_ttl_secs = settings.get_int("signed_url_ttl_secs").ok().map(|v| v as u64);
        }
        if self.lease_duration_secs.is_none() {
            self.lease_duration_secs = settings.get_int("lease_duration_secs").ok().map(|v| v as u64);
        }
        if self.shutdown_grace_period_secs.is_none() {
            self.shutdown_grace_period_secs = settings.get_int("shutdown_grace_period_secs").ok().map(|v| v as u64);
        }
        if self.max_upload_bytes.is_none() {
            self.max_upload_bytes = settings.get_int("max_upload_bytes").ok().map(|v| v as u64);
        }
        if self.worker_max_attempts.is_none() {
            self.worker_max_attempts = settings.get_int("worker_max_attempts").ok().map(|v| v as u32);
        }
        if self.auth_tokens.is_none() {
            self.auth_tokens = settings.get_string("auth_tokens").ok();
        }

        Ok(self)
    }

    /// Build the configuration, applying defaults for anything still unset
    /// and validating the signing secret's strength.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let signing_secret = self
            .signing_secret
            .ok_or(ConfigError::Missing("signing_secret"))?;
        if signing_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                field: "signing_secret",
                reason: "must be at least 32 bytes".to_string(),
            });
        }

        let database_url = self.database_url.unwrap_or_else(|| "sqlite://audiobook.db".to_string());
        let blob_root = self.blob_root.unwrap_or_else(|| PathBuf::from("./blobs"));
        let bind_addr = self.bind_addr.unwrap_or_else(|| "0.0.0.0:8080".to_string());

        Ok(AppConfig {
            app_name: self.app_name.unwrap_or_else(|| "audiobook-pipeline".to_string()),
            log_level: self.log_level.unwrap_or_default(),
            database_url,
            blob_root,
            bind_addr,
            signing_secret,
            signed_url_ttl_secs: self.signed_url_ttl_secs.unwrap_or(900),
            lease_duration_secs: self.lease_duration_secs.unwrap_or(300),
            shutdown_grace_period_secs: self.shutdown_grace_period_secs.unwrap_or(30),
            max_upload_bytes: self.max_upload_bytes.unwrap_or(52_428_800),
            worker_max_attempts: self.worker_max_attempts.unwrap_or(3),
            auth_tokens: self.auth_tokens.unwrap_or_default(),
            verbose: self.verbose,
        })
    }
}

fn default_map() -> std::collections::HashMap<String, String> {
    let mut defaults = std::collections::HashMap::new();
    defaults.insert("database_url".to_string(), "sqlite://audiobook.db".to_string());
    defaults.insert("blob_root".to_string(), "./blobs".to_string());
    defaults.insert("bind_addr".to_string(), "0.0.0.0:8080".to_string());
    defaults.insert("signed_url_ttl_secs".to_string(), "900".to_string());
    defaults.insert("lease_duration_secs".to_string(), "300".to_string());
    defaults.insert("shutdown_grace_period_secs".to_string(), "30".to_string());
    defaults.insert("max_upload_bytes".to_string(), "52428800".to_string());
    defaults.insert("worker_max_attempts".to_string(), "3".to_string());
    defaults
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_a_long_enough_signing_secret() {
        let config = AppConfig::builder()
            .signing_secret("x".repeat(32))
            .build()
            .unwrap();
        assert_eq!(config.database_url(), "sqlite://audiobook.db");
        assert_eq!(config.lease_duration_secs(), 300);
        assert_eq!(config.max_upload_bytes(), 52_428_800);
        assert_eq!(config.worker_max_attempts(), 3);
    }

    #[test]
    fn rejects_a_short_signing_secret() {
        let result = AppConfig::builder().signing_secret("too-short").build();
        assert!(matches!(result, Err(ConfigError::Invalid { field: "signing_secret", .. })));
    }

    #[test]
    fn rejects_a_missing_signing_secret() {
        let result = AppConfig::builder().build();
        assert!(matches!(result, Err(ConfigError::Missing("signing_secret"))));
    }

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("nonsense"), None);
    }

    #[test]
    fn display_omits_the_signing_secret() {
        let config = AppConfig::builder().signing_secret("x".repeat(32)).build().unwrap();
        let rendered = config.to_string();
        assert!(!rendered.contains(&"x".repeat(32)));
    }
}
