//! Speech synthesis error types.

/// Kinds of narration failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NarrationErrorKind {
    /// Nothing to synthesize
    #[display("Narration text is empty")]
    EmptyText,
    /// Request could not be sent or the service returned an error status
    #[display("Speech request failed: {}", _0)]
    Request(String),
    /// The service answered without an audio content type
    #[display("Unexpected response content type '{}': {}", content_type, body)]
    NotAudio {
        /// Content-Type header received
        content_type: String,
        /// Response body (truncated)
        body: String,
    },
    /// Audio could not be written to disk
    #[display("Failed to write audio file: {}", _0)]
    Write(String),
}

/// Error type for narration synthesis.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Narration Error: {} at line {} in {}", kind, line, file)]
pub struct NarrationError {
    /// The kind of error that occurred
    pub kind: NarrationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl NarrationError {
    /// Create a new narration error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NarrationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
