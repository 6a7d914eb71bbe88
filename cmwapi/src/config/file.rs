//! Locating, reading and writing the widget configuration file.
//!
//! The directory is `$CMWAPI_CONFIG_DIR` when set, otherwise `~/.cmwapi`.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::settings::ConfigFile;

/// Environment variable that relocates the configuration directory.
pub const CONFIG_DIR_ENV: &str = "CMWAPI_CONFIG_DIR";

const CONFIG_FILE_NAME: &str = "config.ini";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: malformed INI: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },

    /// A key parsed but its value is out of range for the widget.
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFileError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ConfigFile {
    /// Load from [`config_file_path`].
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigFileError::io(path, e)),
        };

        let ini = Ini::load_from_str(&text).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let config = super::parser::parse_ini(&ini)?;
        debug!(path = %path.display(), widget = %config.widget.name, "Loaded config");
        Ok(config)
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`.
    ///
    /// The text goes to a sibling `.tmp` file first and is renamed into
    /// place, so a widget reading concurrently never sees half a file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::io(parent, e))?;
        }

        let staging = path.with_extension("ini.tmp");
        std::fs::write(&staging, super::writer::to_config_string(self))
            .map_err(|e| ConfigFileError::io(&staging, e))?;
        std::fs::rename(&staging, path).map_err(|e| ConfigFileError::io(path, e))
    }
}

/// Directory holding the config file and, by default, the logs.
pub fn config_directory() -> PathBuf {
    directory_from(std::env::var_os(CONFIG_DIR_ENV))
}

pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

fn directory_from(overridden: Option<OsString>) -> PathBuf {
    match overridden {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cmwapi"),
    }
}
