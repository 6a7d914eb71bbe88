//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// How this widget describes itself on `map.status.about`
    pub widget: WidgetSettings,
    /// Logging settings
    pub logging: LoggingSettings,
    /// Registry settings
    pub registry: RegistrySettings,
}

/// Widget identity.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSettings {
    /// Widget name reported as `widgetName`
    pub name: String,
    /// Protocol version reported as `version`
    pub version: String,
    /// Widget type: "2-D", "3-D" or "other"
    pub widget_type: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory holding the log file
    pub directory: PathBuf,
    /// Log file name
    pub file: String,
    /// Default filter directive, overridden by RUST_LOG
    pub level: String,
}

/// Registry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrySettings {
    /// Buffered tree-changed notifications per subscriber
    pub event_capacity: usize,
}
