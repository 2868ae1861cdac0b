/// Exit codes for mdfence, following Ruff's convention
///
/// These exit codes allow users and CI/CD systems to distinguish between
/// different types of failures.
/// Success - Nothing to change, or all changes were written
pub const SUCCESS: i32 = 0;

/// Check mode detected files that would change
pub const CHANGES_NEEDED: i32 = 1;

/// Tool error - Configuration error, file access error, or internal error
pub const TOOL_ERROR: i32 = 2;

/// Helper functions for consistent exit behavior
pub mod exit {
    use super::{CHANGES_NEEDED, SUCCESS, TOOL_ERROR};

    /// Exit with success code (0)
    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    /// Exit with changes needed code (1)
    pub fn changes_needed() -> ! {
        std::process::exit(CHANGES_NEEDED);
    }

    /// Exit with tool error code (2)
    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }
}
