use super::store::StoreError;

/// Failure modes of a dashboard request.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Caller supplied parameters that cannot be resolved into a window.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// An aggregation job panicked or was cancelled before joining.
    #[error("aggregation '{metric}' failed: {detail}")]
    Aggregation { metric: &'static str, detail: String },
}

impl AnalyticsError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
