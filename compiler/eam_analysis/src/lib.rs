//! EAM Analysis - compile-time verification of pattern-constrained arguments.
//!
//! The host calls [`Analyzer::analyze_node`] once per syntax node (or
//! [`Analyzer::analyze`] for a whole compilation). For each node:
//!
//! 1. the call-site mapper pairs arguments with parameters ([`map_node`])
//! 2. the constraint resolver finds each parameter's pattern, following
//!    conversion operators and interpolated-string handlers
//! 3. the constant resolver reduces the argument to a value
//! 4. the validator matches it under a time budget ([`validate`]) and maps
//!    the [`MatchOutcome`] to a diagnostic
//!
//! Invocations of destructuring accessors are additionally checked for
//! capture arity ([`check_arity`]).
//!
//! # Concurrency
//!
//! Analysis of a node is a pure function of the node, the compilation, and
//! the shared [`PatternCache`](eam_regex::PatternCache). Nodes are analyzed
//! in parallel with rayon.

mod analyzer;
mod arity;
mod config;
mod constant;
mod constraint;
mod handler;
mod mapper;
mod validate;

use std::sync::Once;

pub use analyzer::Analyzer;
pub use arity::{
    arity_diagnostic, check_arity, destructure_arity, ArityCheck, DESTRUCTURE_METHOD,
    MAX_DESTRUCTURE_ARITY,
};
pub use config::AnalyzerConfig;
pub use constant::resolve_constant;
pub use constraint::{capability, parameter_at, parameter_constraint, Capability, Constraint};
pub use handler::{
    discover_handler_methods, select_formatted, FormattedSlots, HandlerMethods, HoleTypes,
    Strictness,
};
pub use mapper::{map_node, Check, Subject};
pub use validate::{outcome_diagnostic, validate, InvalidReason, MatchOutcome};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for the analyzer.
///
/// Call once at startup. Uses `RUST_LOG` for filtering
/// (e.g., `RUST_LOG=eam_analysis=debug,eam_regex=trace`). Setting
/// `EAM_LOG_TREE` switches to indented, span-nested output.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let tree = std::env::var_os("EAM_LOG_TREE").is_some();
            tracing_subscriber::registry()
                .with((!tree).then(|| fmt::layer().with_target(true).with_level(true)))
                .with(tree.then(|| tracing_tree::HierarchicalLayer::new(2).with_targets(true)))
                .with(filter)
                .init();
        }
    });
}
