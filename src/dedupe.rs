//!
//! Removal of duplicate fenced code blocks from Markdown text.
//!
//! A single left-to-right pass over the fences of one document. Text outside
//! the fences is copied through byte-for-byte; kept fences are re-emitted
//! with their trailing whitespace stripped; duplicate fences are omitted.

use crate::canon::Canonicalizer;
use crate::fence::fences;
use std::collections::HashSet;

/// Scope of duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeMode {
    /// Drop a fence only when it repeats the immediately preceding fence and
    /// the two are separated by whitespace alone.
    Adjacent,
    /// Drop a fence whose key occurred anywhere earlier in the file.
    Aggressive,
}

/// Result of deduplicating one document.
#[derive(Debug)]
pub struct DedupeOutcome {
    /// The rebuilt document text.
    pub text: String,
    /// True when at least one fence was dropped.
    pub changed: bool,
    /// Number of fences dropped.
    pub dropped: usize,
}

/// Remove duplicate fenced code blocks from `content`.
///
/// Duplicate detection compares canonical keys (lowercased tag plus
/// canonicalized body). In adjacent mode the previous-key tracker is updated
/// after every fence, kept or dropped, so a whitespace-separated run of
/// identical fences collapses to its first instance in one pass.
pub fn dedupe_content(content: &str, mode: DedupeMode, canon: &Canonicalizer) -> DedupeOutcome {
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;

    // Adjacent mode tracks only the previous fence's key; aggressive mode
    // tracks every key seen so far in the file.
    let mut prev_key: Option<String> = None;
    let mut seen: HashSet<String> = HashSet::new();
    let mut dropped = 0;

    for fence in fences(content) {
        let before = &content[cursor..fence.start];
        out.push_str(before);

        let key = canon.key(fence.language, fence.body);

        let is_duplicate = match mode {
            DedupeMode::Aggressive => seen.contains(&key),
            DedupeMode::Adjacent => {
                // Adjacent means nothing but whitespace separates the fences.
                before.trim().is_empty() && prev_key.as_deref() == Some(key.as_str())
            }
        };

        if is_duplicate {
            dropped += 1;
        } else {
            out.push_str("```");
            out.push_str(fence.language);
            out.push('\n');
            out.push_str(fence.body.trim_end());
            out.push_str("\n```");
            seen.insert(key.clone());
        }

        prev_key = Some(key);
        cursor = fence.end;
    }

    out.push_str(&content[cursor..]);

    DedupeOutcome {
        text: out,
        changed: dropped > 0,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsConfig;
    use pretty_assertions::assert_eq;

    fn tools() -> ToolsConfig {
        ToolsConfig {
            javascript: vec!["mdfence-no-such-formatter".to_string()],
            timeout: 1_000,
        }
    }

    fn dedupe(content: &str, mode: DedupeMode) -> DedupeOutcome {
        let tools = tools();
        let canon = Canonicalizer::new(&tools);
        dedupe_content(content, mode, &canon)
    }

    #[test]
    fn test_no_fences_round_trips_byte_identical() {
        let content = "# Title\n\nProse only.\r\nMixed line endings stay.\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert_eq!(outcome.text, content);
        assert!(!outcome.changed);
        assert_eq!(outcome.dropped, 0);
    }

    #[test]
    fn test_adjacent_duplicate_is_dropped() {
        let content = "```rust\nlet x = 1;\n```\n\n```rust\nlet x = 1;\n```\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert!(outcome.changed);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.text, "```rust\nlet x = 1;\n```\n\n\n");
    }

    #[test]
    fn test_prose_between_identical_fences_keeps_both() {
        let content = "```rust\nlet x = 1;\n```\n\nIn between.\n\n```rust\nlet x = 1;\n```\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert!(!outcome.changed);
        assert_eq!(outcome.text, content);
    }

    #[test]
    fn test_aggressive_drops_distant_duplicates() {
        let content = "```rust\na\n```\n\nprose\n\n```rust\nb\n```\n\nprose\n\n```rust\na\n```\n";
        let adjacent = dedupe(content, DedupeMode::Adjacent);
        assert!(!adjacent.changed);

        let aggressive = dedupe(content, DedupeMode::Aggressive);
        assert!(aggressive.changed);
        assert_eq!(aggressive.dropped, 1);
        assert_eq!(
            aggressive.text,
            "```rust\na\n```\n\nprose\n\n```rust\nb\n```\n\nprose\n\n\n"
        );
    }

    #[test]
    fn test_run_of_identical_fences_collapses_to_one() {
        let content = "```rust\na\n```\n\n```rust\na\n```\n\n```rust\na\n```\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.text, "```rust\na\n```\n\n\n\n\n");
    }

    #[test]
    fn test_adjacent_mode_is_idempotent() {
        let content = "```rust\na\n```\n\n```rust\na\n```\n\nprose\n\n```rust\na\n```\n";
        let first = dedupe(content, DedupeMode::Adjacent);
        assert!(first.changed);

        let second = dedupe(&first.text, DedupeMode::Adjacent);
        assert!(!second.changed);
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn test_duplicate_detection_ignores_tag_case_and_trailing_whitespace() {
        let content = "```Rust\nlet x = 1;\n```\n\n```rust\nlet x = 1;   \n```\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert_eq!(outcome.dropped, 1);
        // The kept fence preserves the tag as written.
        assert!(outcome.text.starts_with("```Rust\n"));
    }

    #[test]
    fn test_different_tags_are_not_duplicates() {
        let content = "```rust\nsame body\n```\n\n```python\nsame body\n```\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert!(!outcome.changed);
    }

    #[test]
    fn test_untagged_fences_can_be_duplicates() {
        let content = "```\nsame\n```\n\n```\nsame\n```\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_sql_fences_compare_by_formatted_body() {
        // Internal whitespace differs; the SQL canonical forms match.
        let content = "```sql\nselect 1;\n```\n\n```sql\nselect     1;\n```\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_js_fences_with_identical_bodies_are_duplicates() {
        // Identical raw bodies dedupe whether or not a JS formatter exists.
        let content = "```js\nconst x=1;\n```\n\n```js\nconst x=1;\n```\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_kept_fence_body_trailing_whitespace_is_stripped() {
        let content = "```rust\nlet x = 1;  \n```\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        // Normalization alone does not flag the file as changed.
        assert!(!outcome.changed);
        assert_eq!(outcome.text, "```rust\nlet x = 1;\n```\n");
    }

    #[test]
    fn test_prose_around_fences_is_preserved_exactly() {
        let content = "intro\n\n```rust\na\n```\n\n```rust\na\n```\n\noutro text\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert!(outcome.text.starts_with("intro\n\n"));
        assert!(outcome.text.ends_with("\noutro text\n"));
    }

    #[test]
    fn test_aggressive_mode_keeps_first_of_each_key() {
        let content = "```a\n1\n```\nx\n```b\n2\n```\nx\n```a\n1\n```\nx\n```b\n2\n```\n";
        let outcome = dedupe(content, DedupeMode::Aggressive);
        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.text.matches("```a").count(), 1);
        assert_eq!(outcome.text.matches("```b").count(), 1);
    }

    #[test]
    fn test_unclosed_trailing_fence_is_untouched() {
        let content = "```rust\na\n```\n\n```rust\na\n```\n\n```rust\nunclosed\n";
        let outcome = dedupe(content, DedupeMode::Adjacent);
        assert_eq!(outcome.dropped, 1);
        assert!(outcome.text.ends_with("```rust\nunclosed\n"));
    }
}
