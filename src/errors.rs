//! Error types for kerasport
//!
//! Two tiers of failure: directory-level errors abort the whole run with a
//! non-zero exit, file-level errors are reported per file and the batch
//! continues.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for model migration operations
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The CLI argument does not point at a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The directory contains no architecture files to migrate
    #[error("No *.model_arch.json files found in: {}", .0.display())]
    NoModelFiles(PathBuf),

    /// Top-level JSON is not a model descriptor
    #[error("Malformed model JSON: {0}")]
    MalformedModel(String),

    /// A layer record inside the descriptor is unusable
    #[error("Malformed layer record: {0}")]
    MalformedLayer(String),

    /// A Dense layer has no usable output width
    #[error("Dense layer {index} is missing output_dim")]
    MissingOutputDim { index: usize },

    /// First Dense layer has neither input_dim nor input_shape
    #[error("Cannot determine input_dim for first Dense layer (no input_dim or input_shape)")]
    MissingInputWidth,

    /// The paired weight file for a rebuild is absent
    #[error("Weights file not found: {}", .0.display())]
    MissingWeights(PathBuf),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrateError>;
