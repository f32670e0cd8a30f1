use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuattError {
    #[error("Snapshot could not be parsed as JSON: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),
    #[error("Snapshot root was expected to be a mapping but was {0}")]
    SnapshotNotAMapping(&'static str),
    #[error("Authentication with the CIC controller failed: {0}")]
    AuthenticationFailed(String),
    #[error("Error fetching a snapshot from the CIC controller: {0}")]
    UpdateFailed(#[source] anyhow::Error),
}

/// What a snapshot source reports when a fetch does not produce a snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Authentication(String),
    #[error(transparent)]
    Communication(#[from] anyhow::Error),
}

impl From<FetchError> for QuattError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Authentication(message) => QuattError::AuthenticationFailed(message),
            FetchError::Communication(error) => QuattError::UpdateFailed(error),
        }
    }
}

impl QuattError {
    /// Whether polling can simply be retried on the next tick.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QuattError::UpdateFailed(_))
    }
}
