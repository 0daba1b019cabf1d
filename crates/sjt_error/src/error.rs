//! Top-level error wrapper types.

use crate::{
    AgentError, ConfigError, HttpError, JsonError, MediaError, NarrationError, RenderError,
    ValidationError,
};

/// Every fatal condition the pipeline can report.
///
/// # Examples
///
/// ```
/// use sjt_error::{SjtError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: SjtError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum SjtErrorKind {
    /// HTTP transport error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// No usable situation text
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Agent orchestration error
    #[from(AgentError)]
    Agent(AgentError),
    /// Remote video job error
    #[from(RenderError)]
    Render(RenderError),
    /// Speech synthesis error
    #[from(NarrationError)]
    Narration(NarrationError),
    /// Local media and filesystem error
    #[from(MediaError)]
    Media(MediaError),
}

/// SJT error with kind discrimination.
///
/// # Examples
///
/// ```
/// use sjt_error::{SjtError, SjtResult, ConfigError};
///
/// fn might_fail() -> SjtResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("SJT Error: {}", _0)]
pub struct SjtError(Box<SjtErrorKind>);

impl SjtError {
    /// Create a new error from a kind.
    pub fn new(kind: SjtErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SjtErrorKind {
        &self.0
    }
}

impl<T> From<T> for SjtError
where
    T: Into<SjtErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for SJT operations.
pub type SjtResult<T> = std::result::Result<T, SjtError>;
