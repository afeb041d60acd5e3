use thiserror::Error;

/// Failures surfaced by the in-memory stores.
///
/// Unknown task ids on patch and delete are not errors; those calls are
/// silent no-ops so a double delete from a racing client stays quiet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("chat not found: {0}")]
    ChatNotFound(u64),

    #[error("internal store fault: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
