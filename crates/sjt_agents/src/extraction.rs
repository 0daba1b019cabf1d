//! Utilities for recovering JSON from text model responses.
//!
//! Models often wrap JSON in markdown code fences or surround it with
//! explanatory prose. Everything here is best effort: callers receive
//! `None` when no JSON value can be recovered and keep the raw text.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FENCED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").ok());

/// Remove a surrounding markdown code fence, if the text starts with one.
///
/// # Examples
///
/// ```
/// use sjt_agents::strip_fences;
///
/// assert_eq!(strip_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_fences("  plain  "), "plain");
/// ```
pub fn strip_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let inner = FENCED
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());

    match inner {
        Some(inner) => inner,
        // Unterminated fence, keep everything after the opening line
        None => extract_from_code_block(trimmed).unwrap_or_else(|| trimmed.to_string()),
    }
}

/// Parse a JSON value out of a model response.
///
/// Strategies, in order:
/// 1. The whole response after fence stripping
/// 2. The first markdown code block anywhere in the response
/// 3. The first balanced `{...}` or `[...]`, whichever appears first
///
/// # Examples
///
/// ```
/// use sjt_agents::parse_json;
///
/// let wrapped = parse_json("Here you go:\n```json\n{\"cues\": []}\n```").unwrap();
/// let bare = parse_json("{\"cues\": []}").unwrap();
/// assert_eq!(wrapped, bare);
///
/// assert!(parse_json("no structure here").is_none());
/// ```
pub fn parse_json(response: &str) -> Option<Value> {
    let stripped = strip_fences(response);
    if let Ok(value) = serde_json::from_str(&stripped) {
        return Some(value);
    }

    if let Some(value) = extract_from_code_block(response)
        .and_then(|block| serde_json::from_str(&block).ok())
    {
        return Some(value);
    }

    let candidates = match (response.find('['), response.find('{')) {
        (Some(bracket), Some(brace)) if bracket < brace => [('[', ']'), ('{', '}')],
        _ => [('{', '}'), ('[', ']')],
    };
    let value = candidates
        .into_iter()
        .filter_map(|(open, close)| extract_balanced(response, open, close))
        .find_map(|candidate| serde_json::from_str(&candidate).ok());

    if value.is_none() {
        tracing::debug!(
            response_length = response.len(),
            "No JSON found in model response"
        );
    }
    value
}

/// Content of the first markdown code block, tolerating a missing closing fence.
fn extract_from_code_block(response: &str) -> Option<String> {
    let start = response.find("```")?;
    let content_start = start + 3;
    // Skip the language tag line
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);

    let content = match response[skip_to..].find("```") {
        Some(end) => &response[skip_to..skip_to + end],
        None => &response[skip_to..],
    };
    Some(content.trim().to_string())
}

/// Text between the first `open` and its matching `close`, respecting
/// string literals and escapes.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_and_bare_agree() {
        let bare = r#"{"core_video_prompt": "她站在门口"}"#;
        let fenced = format!("```json\n{}\n```", bare);
        assert_eq!(parse_json(&fenced), parse_json(bare));
    }

    #[test]
    fn test_unlabelled_fence() {
        let value = parse_json("```\n[1, 2]\n```").unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn test_truncated_fence() {
        let value = parse_json("```json\n{\"pass\": true}").unwrap();
        assert_eq!(value, json!({"pass": true}));
    }

    #[test]
    fn test_prose_around_object() {
        let value = parse_json("Verdict follows. {\"pass\": false, \"correct\": \"fix {it}\"} Done.")
            .unwrap();
        assert_eq!(value["correct"], "fix {it}");
    }

    #[test]
    fn test_array_before_object() {
        let value = parse_json("cues: [{\"id\": \"cue1\"}] trailing {junk").unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_nothing_recoverable() {
        assert!(parse_json("").is_none());
        assert!(parse_json("{ unterminated").is_none());
    }
}
