use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Failed to (de)serialize event log: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Event log store operation failed for conference {conference_id}: {source}")]
    StoreOperation {
        conference_id: Uuid,
        #[source]
        source: anyhow::Error,
    },

    #[error("Concurrency conflict for conference {conference_id}: expected version {expected}, found {actual}")]
    Concurrency {
        conference_id: Uuid,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Generic registration error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl RegistrationError {
    /// Whether the whole load/decide/save cycle may be run again.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RegistrationError::Concurrency { .. })
    }
}

// Result alias within the library
pub type Result<T, E = RegistrationError> = std::result::Result<T, E>;
