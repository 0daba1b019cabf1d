//! Remote video rendering job error types.

/// Failure modes of the create → poll → retrieve → download sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RenderErrorKind {
    /// Job creation was rejected or returned no task id
    #[display("Video task creation failed (status {}): {}", status, message)]
    CreateFailed {
        /// HTTP status code, 0 when the request never completed
        status: u16,
        /// Response body or transport error
        message: String,
    },
    /// A status query failed
    #[display("Video task query failed (status {}): {}", status, message)]
    QueryFailed {
        /// HTTP status code, 0 when the request never completed
        status: u16,
        /// Response body or transport error
        message: String,
    },
    /// Polling exhausted its attempt budget without a file id
    #[display("Task {} produced no file id after {} polls", task_id, attempts)]
    PollTimeout {
        /// Remote task identifier
        task_id: String,
        /// Number of queries issued
        attempts: u32,
    },
    /// File metadata retrieval failed
    #[display("File retrieval failed (status {}): {}", status, message)]
    RetrieveFailed {
        /// HTTP status code, 0 when the request never completed
        status: u16,
        /// Response body or transport error
        message: String,
    },
    /// Retrieval response carried no download locator
    #[display("No download locator in retrieval response: {}", _0)]
    LocatorNotFound(String),
    /// Both the primary and the secondary download failed
    #[display("Video download failed: {}", _0)]
    DownloadFailed(String),
}

/// Error type for the external video job client.
///
/// # Examples
///
/// ```
/// use sjt_error::{RenderError, RenderErrorKind};
///
/// let err = RenderError::new(RenderErrorKind::PollTimeout {
///     task_id: "t-1".to_string(),
///     attempts: 3,
/// });
/// assert!(format!("{}", err).contains("after 3 polls"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The specific error condition
    pub kind: RenderErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl RenderError {
    /// Create a new RenderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error is the polling timeout outcome.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, RenderErrorKind::PollTimeout { .. })
    }
}
