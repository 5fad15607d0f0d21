//! EAM Regex - pattern compilation, budgeted matching, and caching.
//!
//! Patterns are translated from the host dialect, parsed with
//! `regex-syntax`, and lowered to a small backtracking program.
//! Backtracking keeps the host's semantics, including look-around,
//! atomic groups, and backreferences. Every match runs under a time budget
//! so a catastrophic pattern reports a timeout instead of hanging the
//! build.
//!
//! # Key Types
//!
//! - [`PatternOptions`]: option flags with the host's bit values
//! - [`CompiledPattern`]: immutable compiled form with group count and
//!   full-string matching
//! - [`PatternCache`]: bounded concurrent cache keyed by (text, options)

mod cache;
mod compile;
mod dialect;
mod error;
mod exec;
mod options;
mod pattern;
mod program;

pub use cache::{CacheConfig, CacheStats, PatternCache, PatternKey};
pub use error::{MatchError, PatternError};
pub use options::PatternOptions;
pub use pattern::CompiledPattern;
