//! Display styles for log output.

use owo_colors::{AnsiColors, DynColors, OwoColorize, Stream, Style};

/// Semantic kinds of text that appear in the proxy's log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogField {
    Timestamp,
    Prompt,
    Method,
    Path,
    Query,
    HeaderName,
    HeaderValue,
    Body,
    Status,
    Latency,
    Label,
    Frame,
    Address,
}

/// Maps each log field kind to its display style.
pub fn style_for(field: LogField) -> Style {
    match field {
        LogField::Timestamp | LogField::Frame | LogField::Label => Style::new().bright_black().bold(),
        LogField::Prompt | LogField::Address => Style::new().blue().bold(),
        LogField::Method => Style::new().yellow().bold(),
        LogField::Path => Style::new().cyan(),
        LogField::Query => Style::new().magenta(),
        LogField::HeaderName => Style::new().cyan().bold(),
        LogField::HeaderValue | LogField::Body => Style::new(),
        LogField::Status => Style::new().green().bold(),
        LogField::Latency => Style::new().bright_black(),
    }
}

/// Forces styling on or off for every later `paint` and `colored_id`.
///
/// Must agree with the log subscriber's ANSI setting, otherwise escape codes
/// show up as literal text.
pub fn set_enabled(enabled: bool) {
    owo_colors::set_override(enabled);
}

/// Whether stdout should get colors: a terminal, and `NO_COLOR` unset.
pub fn enabled_for_stdout() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Renders `text` in the style registered for `field`.
pub fn paint(field: LogField, text: impl std::fmt::Display) -> String {
    let style = style_for(field);
    text.if_supports_color(Stream::Stdout, |t| t.style(style))
        .to_string()
}

/// Palette for request id tinting; repeats to fill 32 slots
const ID_COLORS: [AnsiColors; 32] = [
    AnsiColors::Red,
    AnsiColors::Green,
    AnsiColors::Yellow,
    AnsiColors::Blue,
    AnsiColors::Magenta,
    AnsiColors::Cyan,
    AnsiColors::BrightRed,
    AnsiColors::BrightGreen,
    AnsiColors::BrightYellow,
    AnsiColors::BrightBlue,
    AnsiColors::BrightMagenta,
    AnsiColors::BrightCyan,
    AnsiColors::Red,
    AnsiColors::Green,
    AnsiColors::Yellow,
    AnsiColors::Blue,
    AnsiColors::Magenta,
    AnsiColors::Cyan,
    AnsiColors::BrightRed,
    AnsiColors::BrightGreen,
    AnsiColors::BrightYellow,
    AnsiColors::BrightBlue,
    AnsiColors::BrightMagenta,
    AnsiColors::BrightCyan,
    AnsiColors::Red,
    AnsiColors::Green,
    AnsiColors::Yellow,
    AnsiColors::Blue,
    AnsiColors::Magenta,
    AnsiColors::Cyan,
    AnsiColors::BrightRed,
    AnsiColors::BrightGreen,
];

/// Deterministically maps a request id to a palette color, so a request and
/// its response line share a tint when concurrent requests interleave.
pub fn get_color_for_id(id: &str) -> AnsiColors {
    let hash = id
        .chars()
        .fold(0u32, |acc, c| acc.wrapping_mul(31).wrapping_add(c as u32));
    ID_COLORS[(hash % 32) as usize]
}

/// Formats a request id as `[id]` in its palette color.
pub fn colored_id(id: &str) -> String {
    let style = Style::new().color(DynColors::Ansi(get_color_for_id(id)));
    format!("[{}]", id)
        .if_supports_color(Stream::Stdout, |t| t.style(style))
        .to_string()
}
