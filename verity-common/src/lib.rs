//! Common types and utilities shared across Verity crates.
//!
//! This crate holds the shared error type and the logging bootstrap. It stays
//! dependency-light so every other crate in the workspace can pull it in.
//!
//! # Overview
//!
//! - [`VerityError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use verity_common::{Result, VerityError};
//!
//! fn needs_key(key: &str) -> Result<()> {
//!     if key.is_empty() {
//!         return Err(VerityError::Config("missing api key".into()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(needs_key("").is_err());
//! ```

pub mod observability;

/// Application name used for log files and default directories.
pub const APP_NAME: &str = "verity";

/// Error types used across the Verity workspace.
#[derive(thiserror::Error, Debug)]
pub enum VerityError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An outbound HTTP call failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The search provider reported an error.
    #[error("Search error: {0}")]
    Search(String),

    /// The completion provider reported an error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The user's input was rejected before any work started.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,

    /// Operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Convenient alias for results that use [`VerityError`].
pub type Result<T> = std::result::Result<T, VerityError>;
