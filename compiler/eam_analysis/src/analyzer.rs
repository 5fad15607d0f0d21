//! The analysis session.

use std::sync::Arc;

use eam_diagnostic::Diagnostic;
use eam_ir::{Compilation, SyntaxNode};
use eam_regex::PatternCache;
use rayon::prelude::*;

use crate::arity::{arity_diagnostic, check_arity};
use crate::config::AnalyzerConfig;
use crate::mapper::map_node;
use crate::validate::{outcome_diagnostic, validate};

/// One analysis session.
///
/// Owns the compiled-pattern cache every check shares. Cloning is cheap and
/// shares the cache.
#[derive(Clone)]
pub struct Analyzer {
    cache: Arc<PatternCache>,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Analyzer {
            cache: Arc::new(PatternCache::new(config.cache)),
            config,
        }
    }

    /// Share an existing cache, e.g. across several compilations.
    pub fn with_cache(cache: Arc<PatternCache>, config: AnalyzerConfig) -> Self {
        Analyzer { cache, config }
    }

    pub fn cache(&self) -> &Arc<PatternCache> {
        &self.cache
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Diagnostics for one syntax node.
    ///
    /// A pure function of the node and the compilation; only the cache is
    /// touched.
    #[tracing::instrument(level = "debug", skip(self, compilation))]
    pub fn analyze_node(&self, compilation: &Compilation, node: SyntaxNode) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for check in map_node(compilation, node) {
            let outcome = validate(&self.cache, compilation, &check.subject, &check.constraint);
            tracing::trace!(%outcome, pattern = %check.constraint.pattern, "argument validated");
            diagnostics.extend(outcome_diagnostic(
                outcome,
                &check.constraint,
                check.subject.span(compilation),
            ));
        }

        if self.config.check_arity {
            if let SyntaxNode::Expr(id) = node {
                let arity = check_arity(
                    compilation,
                    &self.cache,
                    id,
                    self.config.max_destructure_arity,
                );
                if let (Some(arity), Some(expr)) = (arity, compilation.exprs.get(id)) {
                    diagnostics.extend(arity_diagnostic(arity, expr.span));
                }
            }
        }

        diagnostics
    }

    /// Diagnostics for every node of `compilation`, analyzed in parallel.
    ///
    /// Sorted by primary span, then code, so the result does not depend on
    /// scheduling.
    #[tracing::instrument(level = "debug", skip_all, fields(exprs = compilation.exprs.len()))]
    pub fn analyze(&self, compilation: &Compilation) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = compilation
            .nodes()
            .par_iter()
            .flat_map_iter(|node| self.analyze_node(compilation, *node))
            .collect();
        diagnostics.sort_by_key(|d| (d.primary_span(), d.code));
        tracing::debug!(
            count = diagnostics.len(),
            cache = ?self.cache.stats(),
            "analysis finished"
        );
        diagnostics
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::new(AnalyzerConfig::default())
    }
}
