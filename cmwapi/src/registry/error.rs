//! Registry error types.

use thiserror::Error;

use crate::render::RenderError;

/// Errors from registry operations.
///
/// Each variant maps to a protocol error kind reported on `map.error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Overlay does not exist
    #[error("Overlay '{0}' not found")]
    UnknownOverlay(String),

    /// Feature does not exist in the overlay
    #[error("Feature '{feature_id}' not found in overlay '{overlay_id}'")]
    UnknownFeature {
        overlay_id: String,
        feature_id: String,
    },

    /// Format is unrecognized or unusable for this kind of plot
    #[error("Unsupported data format '{0}'")]
    InvalidDataFormat(String),

    /// Parent link would make the overlay its own ancestor
    #[error("Overlay '{overlay_id}' cannot be placed under '{parent_id}'")]
    InvalidParent {
        overlay_id: String,
        parent_id: String,
    },

    /// Recognized by the protocol but not supported here
    #[error("{0} is not yet implemented")]
    NotYetImplemented(String),

    /// The render engine failed
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl RegistryError {
    /// Error kind as reported on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::UnknownOverlay(_) | RegistryError::UnknownFeature { .. } => "invalid_id",
            RegistryError::InvalidDataFormat(_) => "invalid_data_format",
            RegistryError::InvalidParent { .. } => "invalid_parent",
            RegistryError::NotYetImplemented(_) => "not_yet_implemented",
            RegistryError::Render(_) => "render_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(RegistryError::UnknownOverlay("x".into()).kind(), "invalid_id");
        assert_eq!(
            RegistryError::UnknownFeature {
                overlay_id: "o".into(),
                feature_id: "f".into()
            }
            .kind(),
            "invalid_id"
        );
        assert_eq!(
            RegistryError::InvalidDataFormat("svg".into()).kind(),
            "invalid_data_format"
        );
        assert_eq!(
            RegistryError::from(RenderError::UnsupportedSource("kml".into())).kind(),
            "render_failure"
        );
    }

    #[test]
    fn test_display() {
        let err = RegistryError::UnknownFeature {
            overlay_id: "o".into(),
            feature_id: "f".into(),
        };
        assert_eq!(err.to_string(), "Feature 'f' not found in overlay 'o'");
    }
}
