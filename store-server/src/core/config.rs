//! Server configuration
//!
//! All knobs load from environment variables with sensible defaults.
//! Collaborator configuration (media host, JWT) is materialized here
//! once and injected into the services at construction time; business
//! logic never reads the ambient environment.

use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::services::MediaConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/reef/store | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_LEVEL | info | tracing filter level |
/// | MEDIA_BASE_URL | (empty) | Media host endpoint |
/// | MEDIA_API_KEY | (empty) | Media host API key |
/// | ADMIN_USERNAME | admin | First-run admin account name |
/// | ADMIN_PASSWORD | changeme8 | First-run admin password |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Media host configuration (injected into MediaService)
    pub media: MediaConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Log level for the tracing subscriber
    pub log_level: String,
    /// Admin account seeded while the user table is empty
    pub admin_username: String,
    /// Password for the seeded admin account
    pub admin_password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/reef/store".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::from_env(),
            media: MediaConfig::from_env(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "changeme8".into()),
        }
    }

    /// Override work dir and port, for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Database directory under the work dir
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Log directory under the work dir
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work directory structure if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_overrides() {
        let config = Config::with_overrides("/tmp/reef-test", 18080);
        assert_eq!(config.work_dir, "/tmp/reef-test");
        assert_eq!(config.http_port, 18080);
    }

    #[test]
    fn test_derived_dirs() {
        let config = Config::with_overrides("/tmp/reef-test", 18080);
        assert_eq!(config.database_dir(), PathBuf::from("/tmp/reef-test/database"));
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/reef-test/logs"));
    }
}
