//! Unified error types and result handling for the ledger service.
//!
//! Every failure surfaced by the core carries enough detail for the caller to
//! render a specific message. Business-rule failures (`InvalidState`,
//! `BudgetExceeded`, `Conflict`) are terminal and must never be retried
//! automatically; only `Unavailable` is safe for automatic retry.

use thiserror::Error;

/// All errors produced by the ledger core.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing required input. The caller must correct and resubmit.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of what was invalid
        message: String,
    },

    /// Operation not legal in the entity's current lifecycle state,
    /// e.g. deciding a claim twice or editing a frozen budget plan.
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the state conflict
        message: String,
    },

    /// Approving the claim would overspend its budget category.
    #[error("Budget exceeded: requested {requested:.0} but only {remaining:.0} remaining")]
    BudgetExceeded {
        /// Claim amount that was requested
        requested: f64,
        /// Remaining budget in the category at decision time
        remaining: f64,
    },

    /// A referenced entity does not exist (or is soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up (e.g. "program", "expense claim")
        entity: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// The operation conflicts with existing records,
    /// e.g. deleting a category still referenced by approved claims.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting record
        message: String,
    },

    /// Transient infrastructure failure. Safe to retry.
    #[error("Service unavailable: {message}")]
    Unavailable {
        /// Description of the transient fault
        message: String,
    },

    /// Configuration loading or parsing failure.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Database error from the underlying store.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error, typically from receipt file storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Integer conversion failure (e.g. limits that exceed usize).
    #[error("Conversion error: {0}")]
    Conversion(#[from] std::num::TryFromIntError),
}

impl Error {
    /// Builds a [`Error::Validation`] from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Builds a [`Error::InvalidState`] from any displayable message.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
