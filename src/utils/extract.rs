use std::fmt;

/// Characters stripped from both ends of extracted values.
pub const TRIM_CHARS: [char; 4] = [' ', '\t', '\r', '\n'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotFound;

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("marker not found")
    }
}

impl std::error::Error for NotFound {}

pub fn trim_value(s: &str) -> &str {
    s.trim_matches(&TRIM_CHARS[..])
}

/// Byte offset just past the first `marker` at or after `from`.
pub fn find_after(text: &str, from: usize, marker: &str) -> Option<usize> {
    let start = text.get(from..)?.find(marker)? + from;
    Some(start + marker.len())
}

// Returns the trimmed text between the first `start` marker and the first `end` marker after it.
pub fn extract_between(text: &str, start: &str, end: &str) -> Result<String, NotFound> {
    let open = find_after(text, 0, start).ok_or(NotFound)?;
    let close = text[open..].find(end).ok_or(NotFound)? + open;
    Ok(trim_value(&text[open..close]).to_string())
}
