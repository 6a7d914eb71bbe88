//! Configuration for a map widget.
//!
//! Settings are read from an INI file, `config.ini` in [`config_directory`]
//! (`$CMWAPI_CONFIG_DIR`, falling back to `~/.cmwapi`):
//!
//! ```ini
//! [widget]
//! name = ops-map
//! version = 1.3.0
//! type = 2-D
//!
//! [logging]
//! directory = ~/.cmwapi/logs
//! file = cmwapi.log
//! level = info
//!
//! [registry]
//! event_capacity = 64
//! ```
//!
//! Missing keys keep their defaults; invalid values are rejected with
//! [`ConfigFileError::InvalidValue`].

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{DEFAULT_LOG_LEVEL, DEFAULT_WIDGET_NAME, DEFAULT_WIDGET_TYPE};
pub use file::{config_directory, config_file_path, ConfigFileError, CONFIG_DIR_ENV};
pub use settings::{ConfigFile, LoggingSettings, RegistrySettings, WidgetSettings};
