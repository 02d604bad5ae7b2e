//! Splits article text into provider-sized segments.
//!
//! Segments are counted in `char`s, never bytes, so a multi-byte character is
//! never cut in half. Concatenating the segments in order yields the input
//! exactly. Empty input yields no segments.

/// Default per-request character budget for speech providers
pub const DEFAULT_MAX_SEGMENT_CHARS: usize = 4096;

/// Split `text` into segments of at most `max_segment_chars` characters.
///
/// A segment is closed exactly when adding the next character would exceed the
/// budget, so every segment but the last is full.
///
/// # Panics
/// Panics if `max_segment_chars` is zero.
pub fn chunk(text: &str, max_segment_chars: usize) -> Vec<&str> {
    assert!(max_segment_chars > 0, "segment budget must be positive");

    let mut segments = Vec::with_capacity(text.len() / max_segment_chars + 1);
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == max_segment_chars {
            segments.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        segments.push(&text[start..]);
    }

    segments
}
