use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Malformed save data: {0}")]
    Malformed(String),

    #[error("Save validation failed: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Remote save service is unavailable")]
    RemoteUnavailable,

    #[error("Remote save error: {0}")]
    Remote(String),

    #[error("Save already in progress")]
    SaveInProgress,

    #[error("Sync already in progress")]
    SyncInProgress,
}

impl SaveError {
    /// Concurrency rejections are expected outcomes of overlapping timer
    /// ticks and are handled by deferring to the next tick, never reported.
    pub fn is_concurrency_rejection(&self) -> bool {
        matches!(self, Self::SaveInProgress | Self::SyncInProgress)
    }
}

pub type Result<T> = std::result::Result<T, SaveError>;
