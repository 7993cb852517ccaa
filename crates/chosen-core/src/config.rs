//! Application settings
//!
//! Settings are resolved from, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. A TOML file: the explicit path if given, else `./chosen.toml`, else
//!    `<config_dir>/chosen/config.toml`
//! 3. `CHOSEN_*` environment variables

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "chosen.toml";

pub const ENV_DATA_DIR: &str = "CHOSEN_DATA_DIR";
pub const ENV_LOCK_TIMEOUT_MS: &str = "CHOSEN_LOCK_TIMEOUT_MS";
pub const ENV_LOCK_POLL_INTERVAL_MS: &str = "CHOSEN_LOCK_POLL_INTERVAL_MS";
pub const ENV_LOG_LEVEL: &str = "CHOSEN_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Root of every stored file.
    pub data_dir: PathBuf,

    /// How long a writer waits for another holder's lock.
    pub lock_timeout_ms: u64,

    /// Delay between lock acquisition attempts.
    pub lock_poll_interval_ms: u64,

    /// Filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            lock_timeout_ms: 10_000,
            lock_poll_interval_ms: 10,
            log_level: default_log_level(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Resolve settings from the usual sources and the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        SettingsLoader::new().load(explicit, std::env::vars())
    }

    /// Parse a TOML settings file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::parse(&content).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.message().to_string())
    }

    /// Apply `CHOSEN_*` overrides from `vars`. Unrelated variables are ignored.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            match key {
                ENV_DATA_DIR => self.data_dir = PathBuf::from(value.into()),
                ENV_LOCK_TIMEOUT_MS => self.lock_timeout_ms = parse_millis(key, value.into())?,
                ENV_LOCK_POLL_INTERVAL_MS => {
                    let millis = parse_millis(key, value.into())?;
                    self.lock_poll_interval_ms = nonzero_poll_interval(key, millis)?;
                }
                ENV_LOG_LEVEL => self.log_level = value.into(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        nonzero_poll_interval("lock_poll_interval_ms", self.lock_poll_interval_ms).map(drop)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }

    /// `<data_dir>/conversations`
    pub fn conversations_dir(&self) -> PathBuf {
        self.data_dir.join("conversations")
    }

    /// `<data_dir>/settings`
    pub fn settings_dir(&self) -> PathBuf {
        self.data_dir.join("settings")
    }
}

fn parse_millis(key: &str, value: String) -> Result<u64> {
    value.trim().parse().map_err(|e| Error::InvalidSetting {
        key: key.to_string(),
        message: format!("'{value}' is not a number of milliseconds: {e}"),
    })
}

fn nonzero_poll_interval(key: &str, millis: u64) -> Result<u64> {
    if millis == 0 {
        return Err(Error::InvalidSetting {
            key: key.to_string(),
            message: "lock poll interval must be at least 1 ms".to_string(),
        });
    }
    Ok(millis)
}

/// Locates the settings file.
///
/// Both directories can be overridden so tests never read the real user
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    working_dir: Option<PathBuf>,
    global_config_dir_override: Option<PathBuf>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for `chosen.toml` in `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Use `dir` in place of `<config_dir>/chosen`.
    pub fn with_global_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_config_dir_override = Some(dir.into());
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.global_config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join("chosen"))
    }

    /// The settings file that would be read, if any.
    pub fn locate(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = match self.working_dir {
            Some(ref dir) => dir.join(LOCAL_CONFIG_FILE),
            None => PathBuf::from(LOCAL_CONFIG_FILE),
        };
        if local.is_file() {
            return Some(local);
        }

        self.global_config_dir()
            .map(|dir| dir.join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Resolve settings, applying overrides from `vars` last.
    ///
    /// An explicit path that does not exist is an error; the fallback
    /// locations are skipped when absent.
    pub fn load<I, K, V>(&self, explicit: Option<&Path>, vars: I) -> Result<Settings>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = match self.locate(explicit) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading settings file");
                Settings::from_file(&path)?
            }
            None => {
                tracing::debug!("No settings file found, using defaults");
                Settings::default()
            }
        };
        settings.apply_env(vars)?;
        settings.validate()?;
        Ok(settings)
    }
}
