//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[widget]
; Name reported to other widgets on map.status.about
name = {}
; Protocol version reported on map.status.about
version = {}
; Widget type: 2-D, 3-D or other
type = {}

[logging]
; Directory for the log file
directory = {}
; Log file name (cleared on start)
file = {}
; Default level or filter directive (e.g. info, debug, cmwapi=trace)
; RUST_LOG overrides this when set
level = {}

[registry]
; Tree-changed notifications buffered per subscriber
event_capacity = {}
"#,
        config.widget.name,
        config.widget.version,
        config.widget.widget_type,
        path_to_string(&config.logging.directory),
        config.logging.file,
        config.logging.level,
        config.registry.event_capacity,
    )
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
