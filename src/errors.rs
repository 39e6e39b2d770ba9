/*!
 * Error types for the storyreel application.
 *
 * This module contains custom error types for the segmentation engine and the
 * application layer, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by the segmentation and timeline engine.
///
/// Every variant is a deterministic function of the input: the same script and
/// configuration always fail the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentationError {
    /// No lines reached a stage that needs at least one
    #[error("No caption lines to process")]
    EmptyInput,

    /// A line has no image governing it
    #[error("Line {index} has no preceding image marker")]
    MissingImageMarker {
        /// Index of the offending line
        index: usize,
    },

    /// A bracketed tag looked numeric but is not a usable duration
    #[error("Invalid duration tag: [{tag}]")]
    InvalidDurationTag {
        /// Tag contents without brackets
        tag: String,
    },

    /// The sentence tokenizer could not split a paragraph
    #[error("Failed to tokenize paragraph {paragraph}: {reason}")]
    TokenizationFailure {
        /// Zero-based paragraph index
        paragraph: usize,
        /// Tokenizer diagnostic
        reason: String,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from an audio clip
    #[error("Audio error: {0}")]
    Audio(String),

    /// Error from the segmentation engine
    #[error("Segmentation error: {0}")]
    Segmentation(#[from] SegmentationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
