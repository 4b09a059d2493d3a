/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// The two failure modes the core distinguishes. Every public operation
/// either returns a complete result or fails with one of these; there
/// are no partial results and no retries here.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// The store could not be reached or the query could not execute.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store answered, but rows did not decode into the expected
    /// shapes. An internal defect, not a recoverable condition.
    #[error("could not decode row: {0}")]
    ReadFailure(String),
}

impl From<sqlx::Error> for AnalyticsError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => Self::ReadFailure(e.to_string()),
            _ => Self::StoreUnavailable(e.to_string()),
        }
    }
}
