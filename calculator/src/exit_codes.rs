//! Stable exit codes for calculator CLI commands.

/// Command succeeded and every answer carried a result.
pub const OK: i32 = 0;
/// Invalid configuration, fatal catalog build, or unreadable input.
pub const INVALID: i32 = 1;
/// The catalog was built but the request was answered with `errors`.
pub const ANSWERED_WITH_ERRORS: i32 = 2;
