//!
//! Reformatting of SQL fenced code blocks in Markdown text.
//!
//! Every fence tagged with a SQL-family language gets its body replaced by
//! the formatter's output; everything else in the document is copied through
//! byte-for-byte. A fence whose body the formatter cannot handle is kept
//! verbatim.

use crate::canon::{format_sql, is_sql_tag};
use crate::fence::fences;

/// Result of formatting the SQL fences of one document.
#[derive(Debug)]
pub struct SqlFormatOutcome {
    /// The rebuilt document text.
    pub text: String,
    /// True when at least one fence body actually changed.
    pub changed: bool,
    /// Number of fences whose body changed.
    pub reformatted: usize,
}

/// Format all SQL-family fences in `content`.
///
/// A fence counts as changed when its formatted body differs from the
/// original after stripping trailing whitespace from both, so re-running on
/// already formatted input reports no change.
pub fn format_sql_content(content: &str) -> SqlFormatOutcome {
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut reformatted = 0;

    for fence in fences(content) {
        out.push_str(&content[cursor..fence.start]);

        let formatted = if is_sql_tag(fence.language) {
            format_sql(fence.body)
        } else {
            None
        };

        match formatted {
            Some(formatted) => {
                let formatted = formatted.trim_end();
                if formatted != fence.body.trim_end() {
                    reformatted += 1;
                }
                out.push_str("```");
                out.push_str(fence.language);
                out.push('\n');
                out.push_str(formatted);
                out.push_str("\n```");
            }
            // Non-SQL fence, or the formatter gave up: keep the original
            // fence byte-identical.
            None => out.push_str(&content[fence.start..fence.end]),
        }

        cursor = fence.end;
    }

    out.push_str(&content[cursor..]);

    SqlFormatOutcome {
        text: out,
        changed: reformatted > 0,
        reformatted,
    }
}
