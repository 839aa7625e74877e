//! Error types for robinson-map.
//!
//! A single error enum covers every failure the pipeline can surface, from
//! bad input rows through projection failures to output writing.

use thiserror::Error;

/// The main error type for robinson-map operations.
#[derive(Error, Debug)]
pub enum MapError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raster encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A coordinate is outside the geographic domain
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The projection could not be resolved or produced no usable result
    #[error("Projection error: {message}")]
    Projection { message: String },

    /// A graticule value has no entry in the longitude shift table
    #[error("Alignment error: {message}")]
    Alignment { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Data not found errors
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// Rendering errors
    #[error("Render error: {message}")]
    Render { message: String },
}

impl MapError {
    /// Shorthand for a projection failure.
    pub fn projection(message: impl Into<String>) -> Self {
        MapError::Projection {
            message: message.into(),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        MapError::Validation {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with MapError
pub type Result<T> = std::result::Result<T, MapError>;
