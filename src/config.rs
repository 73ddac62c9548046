//! Controller configuration
//!
//! `DirectoryConfig` is built by the hosting harness and handed to the
//! directory client; nothing below the harness reads the environment or the
//! filesystem. The loaders here are for the harness only.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Default verification timeout
pub const DEFAULT_DIRECTORY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default secret mount used by the controller deployment
pub const DEFAULT_SECRET_DIR: &str = "/etc/config";

const ENV_API: &str = "LIFECYCLE_DIRECTORY_API";
const ENV_APP_ID: &str = "LIFECYCLE_APP_ID";
const ENV_APP_SECRET: &str = "LIFECYCLE_APP_SECRET";
const ENV_TIMEOUT_SECS: &str = "LIFECYCLE_DIRECTORY_TIMEOUT_SECS";

/// Credentials and endpoint for the external identity directory
#[derive(Clone)]
pub struct DirectoryConfig {
    pub app_id: String,
    pub app_secret: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"***")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DirectoryConfig {
    pub fn new(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            api_url: api_url.into(),
            timeout: DEFAULT_DIRECTORY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from a mounted secret directory holding `api`, `id` and `secret`
    pub fn from_secret_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let api_url = read_secret_file(dir, "api")?;
        let app_id = read_secret_file(dir, "id")?;
        let app_secret = read_secret_file(dir, "secret")?;
        Ok(Self::new(app_id, app_secret, api_url))
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(
            require_env(ENV_APP_ID)?,
            require_env(ENV_APP_SECRET)?,
            require_env(ENV_API)?,
        );
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_TIMEOUT_SECS.to_string(),
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn read_secret_file(dir: &Path, name: &str) -> Result<String, ConfigError> {
    let path = dir.join(name);
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let value = raw.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty {
            key: name.to_string(),
        });
    }
    Ok(value.to_string())
}

fn require_env(var: &str) -> Result<String, ConfigError> {
    let value = std::env::var(var).map_err(|_| ConfigError::MissingEnv {
        var: var.to_string(),
    })?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty {
            key: var.to_string(),
        });
    }
    Ok(value.trim().to_string())
}

/// Which reconciliation steps run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Directory veto, lock, then deletion
    #[default]
    Full,
    /// Lock only; no directory lookups and no deletions
    LockOnly,
}

impl FromStr for ReconcileMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ReconcileMode::Full),
            "lock-only" | "lock_only" => Ok(ReconcileMode::LockOnly),
            other => Err(ConfigError::Invalid {
                key: "mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileMode::Full => write!(f, "full"),
            ReconcileMode::LockOnly => write!(f, "lock-only"),
        }
    }
}
