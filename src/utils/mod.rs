//! Utility functions and helpers.

pub mod http;
pub mod log;

/// Collapse runs of whitespace (including `&nbsp;`) into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
