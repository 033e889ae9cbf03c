//! Error types for the floorplan extractor.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, FloorplanError>;

/// Errors that can occur while loading, parsing, scoring or extracting floorplans.
#[derive(Error, Debug)]
pub enum FloorplanError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Split name outside of train/val/test.
    #[error("split must be 'train', 'val', or 'test', got '{0}'")]
    InvalidSplit(String),

    /// The manifest file for a split does not exist.
    #[error("Split file not found: '{0}'")]
    ManifestNotFound(PathBuf),

    /// A split produced no usable samples.
    #[error("No examples found for split '{0}'")]
    EmptySplit(String),

    /// The annotation document is not well-formed XML.
    #[error("Failed to parse annotation '{path}': {message}")]
    AnnotationParse { path: PathBuf, message: String },

    /// The image to extract from does not exist.
    #[error("Image not found at '{0}'")]
    ImageNotFound(PathBuf),

    /// The prompt artifact file does not exist.
    #[error("Prompt artifact not found at '{0}'")]
    ArtifactNotFound(PathBuf),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The predictor failed on one sample of an evaluation run.
    #[error("Prediction failed for '{dir}': {source}")]
    Prediction {
        dir: PathBuf,
        #[source]
        source: Box<FloorplanError>,
    },
}

impl FloorplanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an annotation parse error with path context.
    pub fn annotation(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::AnnotationParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error is fatal configuration rather than bad data.
    ///
    /// Configuration errors stop a run immediately and are never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidSplit(_)
                | Self::ManifestNotFound(_)
                | Self::EmptySplit(_)
                | Self::InvalidConfig(_)
                | Self::Config(_)
        )
    }
}

impl From<reqwest::Error> for FloorplanError {
    fn from(err: reqwest::Error) -> Self {
        FloorplanError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for FloorplanError {
    fn from(err: serde_json::Error) -> Self {
        FloorplanError::LlmParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(FloorplanError::InvalidSplit("dev".to_string()).is_configuration());
        assert!(FloorplanError::EmptySplit("test".to_string()).is_configuration());
        assert!(FloorplanError::ManifestNotFound(PathBuf::from("x/train.txt")).is_configuration());
        assert!(!FloorplanError::annotation("model.svg", "unexpected end").is_configuration());
        assert!(!FloorplanError::LlmApi("boom".to_string()).is_configuration());
    }

    #[test]
    fn test_invalid_split_message() {
        let err = FloorplanError::InvalidSplit("dev".to_string());
        assert_eq!(
            err.to_string(),
            "split must be 'train', 'val', or 'test', got 'dev'"
        );
    }
}
