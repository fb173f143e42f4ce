//! Splits payslip text into per-employee windows.
//!
//! An employee's window starts at the first occurrence of their name and
//! runs up to the first occurrence of the next employee's name, searched
//! from the start of the window, or to the end of the text.

/// Byte offsets of every occurrence of `name` in `text`, matched literally.
///
/// An empty `name` has no occurrences.
#[must_use]
pub fn occurrences(text: &str, name: &str) -> Vec<usize> {
    if name.is_empty() {
        return Vec::new();
    }
    text.match_indices(name).map(|(offset, _)| offset).collect()
}

/// Byte offset where the window starting at `anchor` ends.
///
/// The search for `next_name` starts at `anchor` itself, so a next name
/// found at the anchor yields an empty window.
#[must_use]
pub fn window_end(text: &str, anchor: usize, next_name: Option<&str>) -> usize {
    next_name
        .and_then(|next| text.get(anchor..).and_then(|rest| rest.find(next)))
        .map_or(text.len(), |relative| anchor + relative)
}

/// The slice of `text` attributed to the employee whose name occurs at
/// `anchor`.
#[must_use]
pub fn window<'a>(text: &'a str, anchor: usize, next_name: Option<&str>) -> &'a str {
    let end = window_end(text, anchor, next_name);
    text.get(anchor..end).unwrap_or_default()
}
