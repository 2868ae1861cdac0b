//!
//! Canonicalization of fence bodies for duplicate comparison.
//!
//! Two fences count as duplicates when their canonical keys match. The
//! canonical form of a body is its formatted form for languages we know how
//! to format, and the trimmed raw text otherwise. Formatting failures of any
//! kind degrade to the trimmed raw text, so canonicalization itself never
//! fails.

use crate::config::ToolsConfig;
use crate::executor::ToolExecutor;
use sqlformat::{FormatOptions, QueryParams};

/// Language tags formatted with the SQL formatter.
pub const SQL_TAGS: &[&str] = &["sql", "postgres", "postgresql", "psql"];

/// Language tags formatted with the external JavaScript formatter.
pub const JS_TAGS: &[&str] = &["js", "javascript"];

/// True if `tag` names a SQL-family fence (case-insensitive).
pub fn is_sql_tag(tag: &str) -> bool {
    SQL_TAGS.contains(&tag.to_ascii_lowercase().as_str())
}

/// True if `tag` names a JavaScript-family fence (case-insensitive).
pub fn is_js_tag(tag: &str) -> bool {
    JS_TAGS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Format a SQL string.
///
/// The formatter itself is infallible, but it runs behind `catch_unwind` so
/// a formatter bug inside a fence body can never take the whole run down.
pub fn format_sql(body: &str) -> Option<String> {
    std::panic::catch_unwind(|| sqlformat::format(body, &QueryParams::None, FormatOptions::default())).ok()
}

/// Produces canonical forms and comparison keys for fences.
pub struct Canonicalizer<'a> {
    tools: &'a ToolsConfig,
    executor: ToolExecutor,
}

impl<'a> Canonicalizer<'a> {
    pub fn new(tools: &'a ToolsConfig) -> Self {
        Self {
            tools,
            executor: ToolExecutor::new(),
        }
    }

    /// Canonicalize a fence body for comparison.
    ///
    /// Never fails: formatter errors fall back to the trimmed raw body. For
    /// a fixed configuration and environment the result is deterministic,
    /// which is what makes key comparison sound.
    pub fn canon(&self, tag: &str, body: &str) -> String {
        let trimmed = body.trim();

        if is_js_tag(tag) {
            match self.executor.format(&self.tools.javascript, trimmed, self.tools.timeout) {
                Ok(formatted) => return formatted.trim().to_string(),
                Err(e) => log::debug!("javascript canonicalization fell back to raw text: {e}"),
            }
        } else if is_sql_tag(tag) {
            if let Some(formatted) = format_sql(trimmed) {
                return formatted.trim().to_string();
            }
        }

        trimmed.to_string()
    }

    /// Comparison key for a fence: lowercased tag, separator, canonical body.
    pub fn key(&self, tag: &str, body: &str) -> String {
        format!("{}::{}", tag.to_ascii_lowercase(), self.canon(tag, body))
    }
}
