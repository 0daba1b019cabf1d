//! Error types for the SJT video generation pipeline.
//!
//! Every concern in the workspace owns one error type here.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Fatal pipeline conditions surface as [`SjtError`]. Recoverable conditions
//! (unparseable tool output, failed narration, cleanup failures) are never
//! raised; their owning crates turn them into values instead.
//!
//! # Examples
//!
//! ```
//! use sjt_error::{SjtResult, ValidationError};
//!
//! fn situation_text() -> SjtResult<String> {
//!     Err(ValidationError::new("no situation text"))?
//! }
//!
//! assert!(situation_text().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod agent;
mod config;
mod error;
mod http;
mod json;
mod media;
mod narration;
mod render;
mod validation;

pub use agent::{AgentError, AgentErrorKind};
pub use config::ConfigError;
pub use error::{SjtError, SjtErrorKind, SjtResult};
pub use http::HttpError;
pub use json::JsonError;
pub use media::{MediaError, MediaErrorKind};
pub use narration::{NarrationError, NarrationErrorKind};
pub use render::{RenderError, RenderErrorKind};
pub use validation::ValidationError;
