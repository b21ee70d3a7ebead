//! services/cli/src/error.rs
//!
//! Defines the primary error type for the terminal client.

use crate::config::ConfigError;
use jobprep_core::credentials::LoginFormErrors;
use jobprep_core::ports::PortError;
use jobprep_core::search::SearchFormErrors;

/// The primary error type for the `jobprep` client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("{0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Represents a failure to build or use the HTTP client.
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (terminal, local files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The command needs a logged-in user.
    #[error("Please log in to continue")]
    Unauthorized,

    /// Login attempts never reveal which part was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    SearchForm(#[from] SearchFormErrors),

    #[error("{0}")]
    LoginForm(#[from] LoginFormErrors),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
