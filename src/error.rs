//! Error types for the skin_tone_scan library

use thiserror::Error;

/// Result type alias for skin_tone_scan operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Boxed error used as the carried cause of wrapped failures
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error kinds surfaced by detection, clustering, analysis and modification
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Color space transform failed on malformed input
    #[error("Color conversion error: {message}")]
    ConversionError { message: String },

    /// The skin mask is entirely zero
    #[error("No skin regions detected in the image")]
    NoSkinDetected,

    /// Pixel set is degenerate for the requested cluster count
    #[error("Clustering failed: {reason}")]
    ClusteringError { reason: String },

    /// Composite tone name is not one of the known presets
    #[error("Unknown target tone: {name}")]
    UnknownTone { name: String },

    /// Internal failure while composing a skin tone analysis
    #[error("Skin tone analysis failed: {source}")]
    AnalysisFailed {
        #[source]
        source: BoxedSource,
    },

    /// Image file could not be loaded, decoded or written
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl AnalysisError {
    /// Create a conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::ConversionError {
            message: message.into(),
        }
    }

    /// Create a clustering error
    pub fn clustering(reason: impl Into<String>) -> Self {
        Self::ClusteringError {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap an internal failure as an analysis failure.
    ///
    /// `NoSkinDetected` passes through untouched and an already wrapped
    /// failure is not wrapped twice.
    pub fn into_analysis_failure(self) -> Self {
        match self {
            AnalysisError::NoSkinDetected | AnalysisError::AnalysisFailed { .. } => self,
            other => AnalysisError::AnalysisFailed {
                source: Box::new(other),
            },
        }
    }

    /// Check if this error indicates a recoverable condition
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::NoSkinDetected | AnalysisError::ImageLoadError { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::NoSkinDetected => {
                "No skin was detected. Please try a well-lit photo where skin is clearly visible.".to_string()
            }
            AnalysisError::ImageLoadError { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            AnalysisError::UnknownTone { name } => {
                format!(
                    "'{}' is not a supported tone. Choose lighter, darker, warmer or cooler.",
                    name
                )
            }
            AnalysisError::InvalidParameter { parameter, .. } => {
                format!("The value given for '{}' is out of range.", parameter)
            }
            _ => "Skin tone analysis failed. Please try with a different image.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_no_skin_is_recoverable() {
        assert!(AnalysisError::NoSkinDetected.is_recoverable());
        assert!(!AnalysisError::clustering("empty").is_recoverable());
        assert!(!AnalysisError::conversion("bad").is_recoverable());
    }

    #[test]
    fn test_analysis_failure_carries_cause() {
        let err = AnalysisError::clustering("empty pixel set").into_analysis_failure();
        match &err {
            AnalysisError::AnalysisFailed { source } => {
                assert!(source.to_string().contains("empty pixel set"));
            }
            other => panic!("Expected AnalysisFailed, got: {:?}", other),
        }
        assert!(err.source().is_some());
    }

    #[test]
    fn test_no_skin_is_not_wrapped() {
        let err = AnalysisError::NoSkinDetected.into_analysis_failure();
        assert!(matches!(err, AnalysisError::NoSkinDetected));
    }

    #[test]
    fn test_wrapping_is_idempotent() {
        let once = AnalysisError::conversion("bad").into_analysis_failure();
        let twice = once.into_analysis_failure();
        match twice {
            AnalysisError::AnalysisFailed { source } => {
                assert!(source.to_string().starts_with("Color conversion error"));
            }
            other => panic!("Expected AnalysisFailed, got: {:?}", other),
        }
    }

    #[test]
    fn test_user_message_for_unknown_tone() {
        let err = AnalysisError::UnknownTone {
            name: "pinkish".to_string(),
        };
        assert!(err.user_message().contains("pinkish"));
        assert_eq!(err.to_string(), "Unknown target tone: pinkish");
    }
}
