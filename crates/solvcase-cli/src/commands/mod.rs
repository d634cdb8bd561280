//! Subcommands.

pub mod check;
pub mod diff;
pub mod rewrite;

pub use check::CheckArgs;
pub use diff::DiffArgs;
pub use rewrite::RewriteArgs;

/// Exit code for a testcase that needs features this build lacks
pub const EXIT_SKIPPED: i32 = 77;
