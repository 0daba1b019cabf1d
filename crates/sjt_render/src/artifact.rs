//! Tolerant views over the rendering service's JSON responses.

use serde_json::Value;

/// Read a string at `path`, accepting numbers as well.
fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let leaf = path.iter().try_fold(value, |node, key| node.get(key))?;
    match leaf {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One status query result.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStatus {
    /// Lower-cased status, empty if the response carried none
    pub status: String,
    /// File id, present once rendering finished
    pub file_id: Option<String>,
    /// Full response
    pub raw: Value,
}

impl TaskStatus {
    /// Parse a query response.
    ///
    /// The file id may sit at the top level or under `data`; the status under
    /// `status` or `base_resp.status_msg`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sjt_render::TaskStatus;
    /// use serde_json::json;
    ///
    /// let status = TaskStatus::from_value(json!({
    ///     "base_resp": {"status_msg": "Success"},
    ///     "data": {"file_id": 12345}
    /// }));
    /// assert_eq!(status.status, "success");
    /// assert_eq!(status.file_id.as_deref(), Some("12345"));
    /// ```
    pub fn from_value(raw: Value) -> Self {
        let file_id =
            string_at(&raw, &["file_id"]).or_else(|| string_at(&raw, &["data", "file_id"]));
        let status = string_at(&raw, &["status"])
            .or_else(|| string_at(&raw, &["base_resp", "status_msg"]))
            .unwrap_or_default()
            .to_lowercase();
        Self {
            status,
            file_id,
            raw,
        }
    }
}

/// File metadata returned by the retrieve endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedArtifact {
    /// Full response
    pub raw: Value,
}

impl RetrievedArtifact {
    /// Field paths that may carry the download URL, in order of preference.
    const LOCATOR_PATHS: [&'static [&'static str]; 5] = [
        &["download_url"],
        &["file", "download_url"],
        &["data", "download_url"],
        &["url"],
        &["data", "url"],
    ];

    /// Wrap a retrieve response.
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The first download URL found among the known response shapes.
    ///
    /// # Examples
    ///
    /// ```
    /// use sjt_render::RetrievedArtifact;
    /// use serde_json::json;
    ///
    /// let nested = RetrievedArtifact::new(json!({"file": {"download_url": "https://x/v.mp4"}}));
    /// assert_eq!(nested.download_locator().as_deref(), Some("https://x/v.mp4"));
    ///
    /// let empty = RetrievedArtifact::new(json!({"file": {}}));
    /// assert!(empty.download_locator().is_none());
    /// ```
    pub fn download_locator(&self) -> Option<String> {
        Self::LOCATOR_PATHS
            .iter()
            .find_map(|path| string_at(&self.raw, path))
    }
}
