use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for scan operations.
pub type ClickerResult<T> = Result<T, ClickerError>;

/// The error type for configuration, capture, matching and input dispatch.
#[derive(Debug, Error)]
pub enum ClickerError {
    #[error("Reference image for '{name}' not found or unreadable at {path:?}: {source}")]
    TemplateImage {
        name: String,
        path: PathBuf,
        source: image::ImageError,
    },

    #[error(
        "Zone for '{name}' is malformed: {zone:?}. Expected 0 <= x1 < x2 <= 1 and 0 <= y1 < y2 <= 1"
    )]
    InvalidZone { name: String, zone: [f64; 4] },

    #[error("Zone for '{name}' maps to an empty region on a {screen_width}x{screen_height} screen")]
    DegenerateRegion {
        name: String,
        screen_width: u32,
        screen_height: u32,
    },

    #[error("Threshold for '{name}' must be within 0.0..=1.0, got {threshold}")]
    InvalidThreshold { name: String, threshold: f32 },

    #[error("Template name '{name}' is declared more than once")]
    DuplicateTemplate { name: String },

    #[error("Invalid configuration: {description}")]
    Configuration { description: String },

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Screen capture unavailable: {description}")]
    CaptureUnavailable { description: String },

    #[error(
        "Template {template_width}x{template_height} is larger than the captured region {region_width}x{region_height}"
    )]
    DimensionMismatch {
        template_width: u32,
        template_height: u32,
        region_width: u32,
        region_height: u32,
    },

    #[error("Synthetic input could not be delivered: {description}")]
    ActionDispatch { description: String },

    #[error("No configuration has been started yet, nothing to restart")]
    NotConfigured,

    #[error("Failed to spawn the scan worker thread: {source}")]
    WorkerSpawn { source: std::io::Error },

    #[error("Scan worker thread panicked")]
    WorkerPanicked,
}

impl ClickerError {
    /// Configuration errors prevent a session from starting; everything
    /// else is reported per tick and scanning carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClickerError::TemplateImage { .. }
                | ClickerError::InvalidZone { .. }
                | ClickerError::DegenerateRegion { .. }
                | ClickerError::InvalidThreshold { .. }
                | ClickerError::DuplicateTemplate { .. }
                | ClickerError::Configuration { .. }
                | ClickerError::ConfigFile { .. }
                | ClickerError::ConfigParse { .. }
                | ClickerError::NotConfigured
        )
    }

    pub fn capture(description: impl Into<String>) -> Self {
        ClickerError::CaptureUnavailable {
            description: description.into(),
        }
    }

    pub fn dispatch(description: impl Into<String>) -> Self {
        ClickerError::ActionDispatch {
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_fatal() {
        let err = ClickerError::InvalidZone {
            name: "confirm".to_string(),
            zone: [0.5, 0.1, 0.4, 0.2],
        };
        assert!(err.is_fatal());
        assert!(ClickerError::DuplicateTemplate { name: "a".into() }.is_fatal());
    }

    #[test]
    fn test_tick_errors_are_recoverable() {
        assert!(!ClickerError::capture("no display").is_fatal());
        assert!(!ClickerError::dispatch("denied").is_fatal());
        let err = ClickerError::DimensionMismatch {
            template_width: 60,
            template_height: 60,
            region_width: 50,
            region_height: 50,
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("60x60"));
    }
}
