//! Client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};
use crate::remote::HttpBackend;
use crate::time_base::{DEFAULT_TIMEZONE, TimeBase};

static DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Configuration at ~/.config/weektable/config.toml
///
/// Every key can be overridden from the environment, e.g.
/// `WEEKTABLE_SERVER_URL`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimetableConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// IANA zone every date and "today" is resolved in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        TimetableConfig {
            server_url: default_server_url(),
            timezone: default_timezone(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl TimetableConfig {
    pub fn config_path() -> TimetableResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TimetableError::Config("Could not determine config directory".into()))?
            .join("weektable");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented default file the
    /// first time.
    pub fn load() -> TimetableResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TimetableResult<Self> {
        let config: TimetableConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("WEEKTABLE").try_parsing(true))
            .build()
            .map_err(|e| TimetableError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TimetableError::Config(e.to_string()))?;

        tracing::debug!(path = %path.display(), server = %config.server_url, "loaded config");
        Ok(config)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TimetableResult<()> {
        let contents = format!(
            "\
# weektable configuration

# Where the timetable service is running:
# server_url = \"{DEFAULT_SERVER_URL}\"

# Timezone used to decide what \"today\" is:
# timezone = \"{DEFAULT_TIMEZONE}\"

# Seconds before a request to the service is abandoned:
# request_timeout_secs = {DEFAULT_TIMEOUT_SECS}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TimetableError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TimetableError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The configured timezone. An unknown zone is a startup error.
    pub fn time_base(&self) -> TimetableResult<TimeBase> {
        TimeBase::from_name(&self.timezone)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backend(&self) -> TimetableResult<HttpBackend> {
        HttpBackend::with_timeout(&self.server_url, self.request_timeout())
    }
}
