//! kerasport - Keras model architecture migration
//!
//! Patches or rebuilds serialized model architecture files to move them
//! from the legacy flat Keras 0.x serialization to the wrapped 1.x one.
//!
//! # Architecture
//!
//! - **schema**: the two on-disk descriptor shapes and raw-layer extraction
//! - **migrate**: the per-layer field rules (`convert`) and the Dense
//!   input-width chain threading (`patch`)
//! - **rebuild**: typed `Sequential` reconstruction and native re-serialization
//! - **backup**: once-only copy-before-overwrite bookkeeping
//! - **driver**: directory enumeration with per-file failure isolation

pub mod backup;
pub mod cli;
pub mod driver;
pub mod errors;
pub mod migrate;
pub mod rebuild;
pub mod schema;

// Re-export commonly used types
pub use errors::{MigrateError, Result};
