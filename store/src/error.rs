use thiserror::Error;

/// A type alias for a `Result` that returns a `StoreError` on failure.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Row absent, or present but owned by another account. Callers cannot
    /// tell the two apart.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Duplicate(&'static str),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// Maps a constraint violation onto `Duplicate(message)`, passing every
    /// other engine error through.
    pub(crate) fn on_unique(err: rusqlite::Error, message: &'static str) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Duplicate(message)
            }
            other => StoreError::Sqlite(other),
        }
    }
}
