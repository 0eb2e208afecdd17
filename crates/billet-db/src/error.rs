use thiserror::Error;

/// Failure taxonomy for store operations.
///
/// Not-found conditions are always surfaced to the caller; `LoginExpired` is
/// distinct from `LoginNotFound` so the caller can answer "request a new
/// link" instead of "invalid link". Everything else is an unavailable-store
/// condition and is never retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no such user: {0}")]
    UserNotFound(String),

    #[error("no such message: {0}")]
    MessageNotFound(String),

    #[error("login token not found")]
    LoginNotFound,

    #[error("login token expired")]
    LoginExpired,

    #[error("unknown response key: {0}")]
    ResponseNotFound(String),

    #[error(transparent)]
    Database(#[from] redb::DatabaseError),

    #[error(transparent)]
    Transaction(#[from] redb::TransactionError),

    #[error(transparent)]
    Table(#[from] redb::TableError),

    #[error(transparent)]
    Storage(#[from] redb::StorageError),

    #[error(transparent)]
    Commit(#[from] redb::CommitError),

    #[error("record serialization failed: {0}")]
    Codec(#[from] serde_json::Error),
}
