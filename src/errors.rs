//! Unified error types for the splitter.
//!
//! Validation variants carry the human-readable message shown to the person
//! editing a split. Arithmetic never produces an error; degenerate inputs
//! resolve to zero-valued results instead.

use thiserror::Error;

/// All errors the crate can return.
#[derive(Debug, Error)]
pub enum Error {
    /// A split was created with a name that is blank after trimming.
    #[error("Split name cannot be empty")]
    BlankSplitName,

    /// The friend list of a new split contains the same name twice (case-insensitive).
    #[error("Duplicate friend names are not allowed")]
    DuplicateFriendNames,

    /// A person with this name already belongs to the split.
    #[error("This name already exists in this split: {name}")]
    DuplicatePersonName {
        /// The conflicting name, as entered
        name: String,
    },

    /// No split with this id exists in the collection.
    #[error("Split not found: {id}")]
    SplitNotFound {
        /// Requested split id
        id: i64,
    },

    /// No person with this id exists in the split.
    #[error("Person not found: {id}")]
    PersonNotFound {
        /// Requested person id
        id: i64,
    },

    /// Every id up to `i64::MAX` is already taken; nothing new can be created.
    #[error("No more ids available")]
    IdsExhausted,

    /// The command line could not be understood.
    #[error("{message}")]
    Usage {
        /// Usage hint
        message: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored or imported document was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
