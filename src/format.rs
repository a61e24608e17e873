//! Rendering of request, response and startup log lines.
//!
//! Every function here is pure and returns the lines to print; callers emit a
//! whole block as one log event so concurrent requests never split a box.

use std::{fmt, str::FromStr, time::Duration};

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use chrono::{DateTime, Local};
use serde_json::Value;

use crate::colors::{LogField, paint};

/// Longest non-JSON body preview, in characters.
pub const BODY_PREVIEW_LIMIT: usize = 500;

const BOX_WIDTH: usize = 64;

/// Which part of a JSON request body compact mode treats as the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptField {
    /// `prompt` if present, otherwise the first entry of `messages`
    #[default]
    Auto,
    /// Top-level `prompt` string (completion-style APIs)
    Prompt,
    /// `content` of the first `messages` entry (chat-style APIs)
    Messages,
}

impl FromStr for PromptField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "prompt" => Ok(Self::Prompt),
            "messages" => Ok(Self::Messages),
            other => Err(format!(
                "unknown prompt field '{other}' (expected auto, prompt or messages)"
            )),
        }
    }
}

impl fmt::Display for PromptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Prompt => "prompt",
            Self::Messages => "messages",
        })
    }
}

/// Wall-clock time as `HH:MM:SS.mmm`.
pub fn clock(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S%.3f").to_string()
}

/// Pulls the human-meaningful text out of a JSON request body.
///
/// Returns `None` for empty or unparsable bodies and for bodies without the
/// selected field; compact mode is lossy on purpose.
pub fn extract_prompt(body: &[u8], field: PromptField) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let json: Value = serde_json::from_slice(body).ok()?;

    let top_level = || json.get("prompt")?.as_str().map(str::to_owned);
    let first_message = || {
        json.get("messages")?
            .as_array()?
            .first()?
            .get("content")?
            .as_str()
            .map(str::to_owned)
    };

    match field {
        PromptField::Prompt => top_level(),
        PromptField::Messages => first_message(),
        PromptField::Auto => top_level().or_else(first_message),
    }
}

/// Compact mode: the timestamp, then the prompt if one can be found.
pub fn compact_lines(body: &[u8], timestamp: &str, field: PromptField) -> Vec<String> {
    let mut lines = vec![paint(LogField::Timestamp, timestamp)];
    if let Some(prompt) = extract_prompt(body, field) {
        lines.push(paint(LogField::Prompt, prompt));
    }
    lines
}

/// Verbose mode: a framed block with the whole request.
pub fn verbose_lines(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
    timestamp: &str,
) -> Vec<String> {
    let bar = |s: &str| paint(LogField::Frame, s);
    let label = |s: &str| paint(LogField::Label, format!("{s:<8}"));

    let mut lines = Vec::new();
    lines.push(format!(
        "{} {} {}",
        bar("┌─"),
        paint(LogField::Timestamp, timestamp),
        bar(&"─".repeat(BOX_WIDTH.saturating_sub(timestamp.len() + 4)))
    ));
    lines.push(format!(
        "{} {}{}",
        bar("│"),
        label("Method"),
        paint(LogField::Method, method)
    ));
    lines.push(format!(
        "{} {}{}",
        bar("│"),
        label("Path"),
        paint(LogField::Path, uri.path())
    ));
    lines.push(format!(
        "{} {}{}",
        bar("│"),
        label("Query"),
        paint(LogField::Query, uri.query().unwrap_or("-"))
    ));

    lines.push(format!("{} {}", bar("│"), label("Headers")));
    for (name, value) in headers {
        lines.push(format!(
            "{}   {}: {}",
            bar("│"),
            paint(LogField::HeaderName, name.as_str()),
            paint(LogField::HeaderValue, String::from_utf8_lossy(value.as_bytes()))
        ));
    }

    lines.push(format!("{} {}", bar("│"), label("Body")));
    for line in body_lines(body) {
        lines.push(format!("{}   {}", bar("│"), paint(LogField::Body, line)));
    }

    lines.push(bar(&format!("└{}", "─".repeat(BOX_WIDTH))));
    lines
}

/// Body as display lines: indented JSON, a bounded text preview, or `(empty)`.
pub fn body_lines(body: &[u8]) -> Vec<String> {
    if body.is_empty() {
        return vec!["(empty)".to_string()];
    }

    if let Ok(json) = serde_json::from_slice::<Value>(body) {
        if let Ok(pretty) = serde_json::to_string_pretty(&json) {
            return pretty.lines().map(str::to_owned).collect();
        }
    }

    let text = String::from_utf8_lossy(body);
    if text.chars().count() <= BODY_PREVIEW_LIMIT {
        return text.lines().map(str::to_owned).collect();
    }

    let preview: String = text.chars().take(BODY_PREVIEW_LIMIT).collect();
    let mut lines: Vec<String> = preview.lines().map(str::to_owned).collect();
    lines.push(format!("… [truncated, {} bytes total]", body.len()));
    lines
}

/// Duration in whole milliseconds, rounded half up.
pub fn round_millis(elapsed: Duration) -> u128 {
    (elapsed.as_micros() + 500) / 1000
}

/// Status line printed once the backend has answered.
pub fn response_line(status: StatusCode, elapsed: Option<Duration>) -> String {
    let head = format!(
        "{} {}",
        paint(LogField::Label, "Response:"),
        paint(LogField::Status, status)
    );
    match elapsed {
        Some(elapsed) => format!(
            "{} {}",
            head,
            paint(LogField::Latency, format!("({}ms)", round_millis(elapsed)))
        ),
        None => head,
    }
}

/// Startup box listing where the proxy listens and where it forwards to.
pub fn banner_lines(listen_urls: &[String], backend: &str) -> Vec<String> {
    let frame = |s: String| paint(LogField::Frame, s);
    let row = |plain_len: usize, content: String| {
        let pad = " ".repeat(BOX_WIDTH.saturating_sub(plain_len));
        format!("{}{}{}{}", frame("║".into()), content, pad, frame("║".into()))
    };

    let title = " Prompt Tap";
    let mut lines = vec![
        frame(format!("╔{}╗", "═".repeat(BOX_WIDTH))),
        row(title.chars().count(), paint(LogField::Path, title)),
        frame(format!("╠{}╣", "═".repeat(BOX_WIDTH))),
    ];

    for (i, url) in listen_urls.iter().enumerate() {
        let lead = if i == 0 { " Listening on: " } else { "               " };
        lines.push(row(
            lead.chars().count() + url.chars().count(),
            format!("{}{}", lead, paint(LogField::Address, url)),
        ));
    }

    let lead = " Proxying to:  ";
    lines.push(row(
        lead.chars().count() + backend.chars().count(),
        format!("{}{}", lead, paint(LogField::Status, backend)),
    ));
    lines.push(frame(format!("╚{}╝", "═".repeat(BOX_WIDTH))));
    lines
}
