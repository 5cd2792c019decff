// Habitat - Error types
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the habitat toolkit
//!
//! Every analysis entry point validates its input and fails fast with one of
//! these variants.

use thiserror::Error;

/// Result type alias for habitat operations
pub type Result<T> = std::result::Result<T, HabitatError>;

/// Main error type for habitat operations
#[derive(Error, Debug)]
pub enum HabitatError {
    /// Bad argument or table shape at a function boundary
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Regression fitting or prediction failed
    #[error("Model error: {0}")]
    Model(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HabitatError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
