//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::validator::WIDGET_TYPES;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [widget] section
    if let Some(section) = ini.section(Some("widget")) {
        if let Some(v) = section.get("name") {
            config.widget.name = non_empty("widget", "name", v)?;
        }
        if let Some(v) = section.get("version") {
            config.widget.version = non_empty("widget", "version", v)?;
        }
        if let Some(v) = section.get("type") {
            let v = v.trim().to_uppercase();
            let v = if v == "OTHER" { v.to_lowercase() } else { v };
            if !WIDGET_TYPES.contains(&v.as_str()) {
                return Err(ConfigFileError::InvalidValue {
                    section: "widget".to_string(),
                    key: "type".to_string(),
                    value: v,
                    reason: format!("must be one of: {}", WIDGET_TYPES.join(", ")),
                });
            }
            config.widget.widget_type = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            config.logging.file = non_empty("logging", "file", v)?;
        }
        if let Some(v) = section.get("level") {
            let v = v.trim();
            EnvFilter::try_new(v).map_err(|e| ConfigFileError::InvalidValue {
                section: "logging".to_string(),
                key: "level".to_string(),
                value: v.to_string(),
                reason: e.to_string(),
            })?;
            config.logging.level = v.to_string();
        }
    }

    // [registry] section
    if let Some(section) = ini.section(Some("registry")) {
        if let Some(v) = section.get("event_capacity") {
            let capacity: usize = v.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "registry".to_string(),
                key: "event_capacity".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
            if capacity == 0 {
                return Err(ConfigFileError::InvalidValue {
                    section: "registry".to_string(),
                    key: "event_capacity".to_string(),
                    value: v.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            config.registry.event_capacity = capacity;
        }
    }

    Ok(config)
}

fn non_empty(section: &str, key: &str, value: &str) -> Result<String, ConfigFileError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
