//! Append-only audit log of one swarm run.

use crate::roles::RoleName;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sjt_error::{JsonError, MediaError, MediaErrorKind, SjtResult};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// One event in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// Opening user message
    UserInput {
        /// Message text
        content: String,
    },
    /// Plain-text answer from a role
    RoleMessage {
        /// Speaking role
        role: RoleName,
        /// Message text
        content: String,
    },
    /// Tool call issued by a role
    ToolCall {
        /// Calling role
        role: RoleName,
        /// Call identifier
        call_id: String,
        /// Requested tool name, as sent by the director
        tool: String,
        /// Raw arguments
        arguments: Value,
    },
    /// Answer to a tool call
    ToolResult {
        /// Calling role
        role: RoleName,
        /// Call identifier
        call_id: String,
        /// Tool name
        tool: String,
        /// Text returned to the role
        content: String,
        /// False when the tool failed or was rejected
        ok: bool,
    },
    /// Control transfer between roles
    Handoff {
        /// Role giving up control
        from: RoleName,
        /// Role receiving control
        to: RoleName,
        /// Payload argument of the handoff call
        payload: String,
    },
}

/// Ordered record of everything that happened in a run.
///
/// Entries can only be appended. Control flow never reads the transcript
/// except for fallback prompt recovery.
///
/// # Examples
///
/// ```
/// use sjt_agents::{RoleName, Transcript, TranscriptEntry};
///
/// let mut transcript = Transcript::default();
/// transcript.push(TranscriptEntry::Handoff {
///     from: RoleName::Storyboard,
///     to: RoleName::Video,
///     payload: "{\"storyboard\": {}}".to_string(),
/// });
/// assert_eq!(transcript.last_handoff_to(RoleName::Video), Some("{\"storyboard\": {}}"));
/// assert_eq!(transcript.last_handoff_to(RoleName::Storyboard), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Append an entry.
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// All entries in order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payload of the most recent handoff targeting `role`.
    pub fn last_handoff_to(&self, role: RoleName) -> Option<&str> {
        self.entries.iter().rev().find_map(|entry| match entry {
            TranscriptEntry::Handoff { to, payload, .. } if *to == role => Some(payload.as_str()),
            _ => None,
        })
    }

    /// Role messages and tool results, in order.
    pub fn output_content(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::RoleMessage { content, .. }
                | TranscriptEntry::ToolResult { content, .. }
                    if !content.trim().is_empty() =>
                {
                    Some(content.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Write `output_content_<timestamp>.json` under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    #[instrument(skip(self), fields(entries = self.entries.len()))]
    pub fn save(&self, dir: &Path) -> SjtResult<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| {
            MediaError::new(MediaErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let now = chrono::Local::now();
        let path = dir.join(format!(
            "output_content_{}.json",
            now.format("%Y%m%d_%H%M%S")
        ));
        let document = json!({
            "timestamp": now.to_rfc3339(),
            "output_content": self.output_content(),
        });
        let text = serde_json::to_string_pretty(&document)
            .map_err(|e| JsonError::new(format!("Failed to serialize transcript: {}", e)))?;
        std::fs::write(&path, text).map_err(|e| {
            MediaError::new(MediaErrorKind::FileWrite(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        debug!(path = %path.display(), "Transcript saved");
        Ok(path)
    }
}
