//! Agent orchestration error types.

/// Specific error conditions raised by the role state machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AgentErrorKind {
    /// Neither the Video role nor the handoff fallback produced a prompt
    #[display("No video prompt produced by the Video role or the handoff fallback")]
    NoVideoPrompt,
    /// A role invoked a tool outside its capability set
    #[display("Role '{}' has no tool named '{}'", role, tool)]
    UnknownTool {
        /// Role that issued the call
        role: String,
        /// Tool name requested
        tool: String,
    },
    /// Tool arguments were missing or not the expected shape
    #[display("Invalid arguments for tool '{}': {}", tool, message)]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// What was wrong
        message: String,
    },
    /// The director kept the run going past the configured turn budget
    #[display("Turn limit of {} reached", _0)]
    TurnLimitExceeded(u32),
    /// The text model returned no content
    #[display("Empty response from text model in tool '{}'", _0)]
    EmptyResponse(String),
}

/// Error type for agent orchestration.
///
/// # Examples
///
/// ```
/// use sjt_error::{AgentError, AgentErrorKind};
///
/// let err = AgentError::new(AgentErrorKind::NoVideoPrompt);
/// assert!(format!("{}", err).contains("No video prompt"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Agent Error: {} at line {} in {}", kind, line, file)]
pub struct AgentError {
    /// The specific error condition
    pub kind: AgentErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl AgentError {
    /// Create a new AgentError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AgentErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
