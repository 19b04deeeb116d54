//! Stable error codes for the component compiler.
//!
//! All codes are SCREAMING_SNAKE_CASE and stable across versions.

/// The bundler reported at least one error for an entry point.
pub const COMPILE_BUILD_FAILED: &str = "COMPILE_BUILD_FAILED";

/// The bundler succeeded but produced no output text.
pub const COMPILE_MISSING_OUTPUT: &str = "COMPILE_MISSING_OUTPUT";

/// The build task panicked or was cancelled before finishing.
pub const COMPILE_JOB_FAILED: &str = "COMPILE_JOB_FAILED";

/// A downstream server, session runtime, or static host failed.
pub const COMPILE_SERVER_ERROR: &str = "COMPILE_SERVER_ERROR";

/// The bundler binary could not be spawned.
pub const BUNDLER_SPAWN_FAILED: &str = "BUNDLER_SPAWN_FAILED";

/// The bundler exited non-zero without a parseable diagnostic.
pub const BUNDLER_EXIT_FAILURE: &str = "BUNDLER_EXIT_FAILURE";
