use thiserror::Error;

/// Broken referential integrity in the relational store: a row references a
/// missing node, a node has more than one successor, or an attack's recorded
/// front doesn't belong to its chain. Aborts the current ingest transaction
/// (spec §7).
#[derive(Debug, Error)]
#[error("invalid database state: {0}")]
pub struct InvalidDatabaseStateError(pub String);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidState(#[from] InvalidDatabaseStateError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl StoreError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        StoreError::InvalidState(InvalidDatabaseStateError(msg.into()))
    }
}
