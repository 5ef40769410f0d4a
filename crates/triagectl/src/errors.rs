//! Exit codes for triagectl.

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors (unreadable log, bad config)
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when a rule file fails validation
pub const EXIT_VALIDATION_FAILED: i32 = 65;
