//! Custom error types for litgap.
//!
//! This module defines all error types used throughout the application.
//! All functions return `Result<T, LitgapError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for litgap operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum LitgapError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// XML/HTML/response parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from API
        code: i32,
        /// Error message from API
        message: String,
    },

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `LitgapError`
pub type Result<T> = std::result::Result<T, LitgapError>;
