//! Core error types for ovation-core.
//!
//! Every user-visible failure is a named variant -- callers match on the
//! variant, not on message text.

use thiserror::Error;

/// Core error type for campaign and countdown operations.
#[derive(Error, Debug)]
pub enum CampaignError {
    /// Category already exists under that key
    #[error("category '{0}' already exists")]
    CategoryExists(String),

    /// Category is not registered
    #[error("category '{0}' not found")]
    CategoryNotFound(String),

    /// Countdown event already exists under that name
    #[error("countdown event '{0}' already exists")]
    EventExists(String),

    /// Countdown event is not registered
    #[error("countdown event '{0}' not found")]
    EventNotFound(String),

    /// The deadline for this phase has passed
    #[error("the {0} phase is closed")]
    PhaseClosed(&'static str),

    /// Nominating yourself in a category that forbids it
    #[error("self-nomination is not allowed in category '{0}'")]
    SelfNominationDisallowed(String),

    /// A vote for this (category, voter) pair already exists
    #[error("you have already voted in category '{0}'")]
    DuplicateVote(String),

    /// Nominee is not part of the category's nomination pool
    #[error("nominee {nominee} has not been nominated in category '{category}'")]
    UnknownNominee { category: String, nominee: u64 },

    /// Deadline rejected (e.g. not in the future)
    #[error("invalid deadline: {0}")]
    InvalidDeadline(String),

    /// Category name failed validation
    #[error("invalid category name: {0}")]
    InvalidCategoryName(String),

    /// Ledger read/write failed
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Errors from the flat-file ledger storage layer.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to read/write ledger file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode ledger: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode ledger: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to access data directory: {0}")]
    DataDir(String),

    /// Injected by the in-memory store in tests
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Result type alias for CampaignError
pub type Result<T, E = CampaignError> = std::result::Result<T, E>;
