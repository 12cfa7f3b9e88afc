//! Error taxonomy for the mutation engine.
//!
//! Every operation returns [`LedgerResult`]. Any error aborts the enclosing
//! transaction; callers classify failures through [`LedgerError::kind`].

use thiserror::Error;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Coarse classification used by callers (and the HTTP layer) to map failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Internal,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    /// A referenced entity or relation pair does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input was rejected before any row was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The store failed for a reason the engine does not classify.
    #[error("store error: {0}")]
    Store(#[source] sqlx::Error),

    /// A snapshot could not be turned into an audit payload.
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn not_found(what: &str, id: i32) -> Self {
        LedgerError::NotFound(format!("{} {} does not exist", what, id))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::Conflict(_) => ErrorKind::Conflict,
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::Store(_) | LedgerError::Snapshot(_) | LedgerError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}

// SQLSTATE codes the engine classifies; see PostgreSQL "Errors and Messages".
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// A 23503 raised by deleting a parent that still has children, as opposed
/// to inserting a child whose parent is missing.
fn is_parent_side(message: &str) -> bool {
    message.starts_with("update or delete on table")
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or("unnamed constraint").to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return LedgerError::Conflict(format!("{} already taken", constraint));
                }
                Some(FOREIGN_KEY_VIOLATION) if is_parent_side(db.message()) => {
                    return LedgerError::Conflict(format!(
                        "row is still referenced ({})",
                        constraint
                    ));
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return LedgerError::NotFound(format!(
                        "referenced row missing ({})",
                        constraint
                    ));
                }
                Some(NUMERIC_VALUE_OUT_OF_RANGE) | Some(INVALID_TEXT_REPRESENTATION) => {
                    return LedgerError::Validation(db.message().to_string());
                }
                _ => {}
            }
        }
        if let sqlx::Error::RowNotFound = err {
            return LedgerError::NotFound("row".to_string());
        }
        LedgerError::Store(err)
    }
}
