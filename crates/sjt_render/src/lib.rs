//! Remote rendering services used by the SJT video pipeline.
//!
//! [`HailuoClient`] drives the asynchronous text-to-video job
//! (create → poll → retrieve → download) and [`NarrationSynthesizer`]
//! turns narration text into an MP3 via a text-to-speech endpoint.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod hailuo;
mod narration;

pub use artifact::{RetrievedArtifact, TaskStatus};
pub use hailuo::HailuoClient;
pub use narration::{NarrationSynthesizer, narration_speed};

/// `YYYYmmdd_HHMMSS` in local time, used in downloaded file names.
pub(crate) fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
