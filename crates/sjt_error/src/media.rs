//! Local media and filesystem error types.

/// Kinds of media errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MediaErrorKind {
    /// Failed to create a directory
    #[display("Failed to create directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to list or read a file or directory
    #[display("Failed to read: {}", _0)]
    FileRead(String),
    /// Failed to write a file
    #[display("Failed to write: {}", _0)]
    FileWrite(String),
    /// Failed to move or rename a file
    #[display("Failed to move file: {}", _0)]
    FileMove(String),
    /// The muxer reported a failure for one pair
    #[display("Merge failed: {}", _0)]
    MergeFailed(String),
    /// The muxer binary could not be started
    #[display("Muxer unavailable: {}", _0)]
    MuxerUnavailable(String),
    /// Rendering succeeded but no output file was located after merge
    #[display("Render succeeded but no output file located in {}", _0)]
    OutputNotFound(String),
}

/// Media error with location tracking.
///
/// # Examples
///
/// ```
/// use sjt_error::{MediaError, MediaErrorKind};
///
/// let err = MediaError::new(MediaErrorKind::OutputNotFound("/tmp/env1".to_string()));
/// assert!(format!("{}", err).contains("no output file located"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Media Error: {} at line {} in {}", kind, line, file)]
pub struct MediaError {
    /// The kind of error that occurred
    pub kind: MediaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MediaError {
    /// Create a new media error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MediaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
