//! Default values for every configuration section.

use super::file::config_directory;
use super::settings::*;
use crate::registry::DEFAULT_EVENT_CAPACITY;

/// Default widget name.
pub const DEFAULT_WIDGET_NAME: &str = "cmwapi-map";

/// Default widget type.
pub const DEFAULT_WIDGET_TYPE: &str = "2-D";

/// Default log level directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_WIDGET_NAME.to_string(),
            version: crate::VERSION.to_string(),
            widget_type: DEFAULT_WIDGET_TYPE.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: config_directory().join("logs"),
            file: crate::logging::default_log_file().to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
