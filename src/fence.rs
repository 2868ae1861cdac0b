//!
//! Regex-based extraction of fenced code blocks from Markdown text.
//!
//! This is deliberately not a CommonMark parser: the tools in this crate only
//! need ordered fence regions with their language tag, raw body, and byte span,
//! and a single non-greedy regex pass provides exactly that.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Opening fence: line start, three backticks, optional bare language tag,
    // optional trailing horizontal whitespace. Body is matched non-greedily so
    // the nearest closing fence terminates the block. Closing fence: a line
    // consisting solely of three backticks. The `R` flag makes the line
    // anchors CRLF-aware without consuming the `\r`.
    static ref FENCE_RE: Regex =
        Regex::new(r"(?mR)^```([A-Za-z0-9_-]*)[ \t]*\r?\n(?s:(.*?))\r?\n```$").unwrap();
}

/// A fenced code block located in a Markdown document.
///
/// `start..end` is the byte span of the whole fence (opening marker through
/// closing marker) in the original text, so the non-fence remainder of the
/// document is recoverable as the complement of the spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence<'a> {
    /// Language tag from the opening fence line, possibly empty.
    pub language: &'a str,
    /// Raw body between the fence markers, without the delimiting newlines.
    pub body: &'a str,
    /// Byte offset of the opening marker.
    pub start: usize,
    /// Byte offset one past the closing marker.
    pub end: usize,
}

/// Scan `text` for fenced code blocks in source order.
///
/// The returned iterator is lazy and finite; every call rescans from the
/// start of the text. Fences without a paired closing marker are never
/// yielded and stay part of the surrounding text.
pub fn fences(text: &str) -> impl Iterator<Item = Fence<'_>> {
    FENCE_RE.captures_iter(text).map(|caps| {
        let whole = caps.get(0).unwrap();
        Fence {
            language: caps.get(1).map_or("", |m| m.as_str()),
            body: caps.get(2).map_or("", |m| m.as_str()),
            start: whole.start(),
            end: whole.end(),
        }
    })
}
