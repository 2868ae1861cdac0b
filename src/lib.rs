pub mod canon;
pub mod config;
pub mod dedupe;
pub mod executor;
pub mod exit_codes;
pub mod fence;
pub mod files;
pub mod sqlfmt;

pub use canon::Canonicalizer;
pub use dedupe::{DedupeMode, DedupeOutcome, dedupe_content};
pub use fence::{Fence, fences};
pub use sqlfmt::{SqlFormatOutcome, format_sql_content};
