use std::time::Duration;
use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::DEFAULT_HISTORY_LIMIT;
use crate::monitoring::{DEFAULT_PROBE_TIMEOUT, DEFAULT_SWEEP_CONCURRENCY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: Storage,
    pub probe: Probe,
    pub sweep: Sweep,
    pub history: History,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Storage {
    /// Directory holding the resource document
    pub data_dir: path::PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Probe {
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sweep {
    pub interval_seconds: u64,
    pub concurrency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
    pub limit: usize,
}

impl Default for Storage {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64 }
    }
}

impl Default for Sweep {
    fn default() -> Self {
        Self { interval_seconds: 300, concurrency: DEFAULT_SWEEP_CONCURRENCY }
    }
}

impl Default for History {
    fn default() -> Self {
        Self { limit: DEFAULT_HISTORY_LIMIT }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: Storage::default(),
            probe: Probe::default(),
            sweep: Sweep::default(),
            history: History::default(),
        }
    }
}

/// Forces a `.toml` extension onto user supplied paths
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// $XDG_CONFIG_HOME/portwatch/config.toml or $HOME/.config/...
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("portwatch/config.toml"))
}

/// $XDG_DATA_HOME/portwatch or $HOME/.local/share/..., relative as a last resort
fn default_data_dir() -> path::PathBuf {
    if let Ok(data_home) = env::var("XDG_DATA_HOME") {
        path::PathBuf::from(data_home).join("portwatch")
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".local/share/portwatch")
    } else {
        path::PathBuf::from(".portwatch")
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Configuration:")?;
        write_title_1(f, "Storage")?;
        write_1(f, "Data Directory", &self.storage.data_dir.display())?;
        write_title_1(f, "Probe")?;
        write_1(f, "Timeout (ms)", &self.probe.timeout_ms)?;
        write_title_1(f, "Sweep")?;
        write_1(f, "Interval (s)", &self.sweep.interval_seconds)?;
        write_1(f, "Concurrency", &self.sweep.concurrency)?;
        write_title_1(f, "History")?;
        write_1(f, "Limit", &self.history.limit)?;

        Ok(())
    }
}

impl Config {
    /// Load the config file, writing the defaults first when it is missing
    ///
    /// Creates a default config in ~/.config/portwatch/config.toml
    ///  or the specified path if one does not exist
    ///
    /// ```no_run
    /// let cfg = portwatch::Config::from_config(None::<&std::path::Path>)?;
    /// println!("{}", cfg);
    /// # Ok::<(), portwatch::error::ConfigError>(())
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let config = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::ReadFailed)?;
            toml::from_str(raw_string.as_str()).map_err(|err| ConfigError::ParseFailed(err.to_string()))?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Write this config as TOML, creating parent directories
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|err| ConfigError::ParseFailed(err.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(ConfigError::WriteFailed)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.timeout_ms == 0 {
            return Err(ConfigError::Invalid("probe.timeout_ms must be greater than 0".into()));
        }
        if self.sweep.interval_seconds == 0 {
            return Err(ConfigError::Invalid("sweep.interval_seconds must be greater than 0".into()));
        }
        if self.sweep.concurrency == 0 {
            return Err(ConfigError::Invalid("sweep.concurrency must be greater than 0".into()));
        }
        if self.history.limit == 0 {
            return Err(ConfigError::Invalid("history.limit must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe.timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep.interval_seconds)
    }
}
