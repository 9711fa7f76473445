//! Pipeline error types.

use thiserror::Error;

/// Errors that can occur during configuration validation.
///
/// The index itself has no recoverable failures (degenerate inputs are
/// silent no-ops), so bad tuning values are the one thing worth rejecting
/// up front.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("node capacity must be at least 1")]
    ZeroNodeCapacity,

    #[error("max depth must be at least 1")]
    ZeroMaxDepth,

    #[error("border must have positive area, got {width}x{height}")]
    EmptyBorder { width: f32, height: f32 },
}
