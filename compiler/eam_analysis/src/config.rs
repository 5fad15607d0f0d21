//! Analyzer configuration.

use eam_regex::CacheConfig;

use crate::arity::MAX_DESTRUCTURE_ARITY;

/// Settings for an [`Analyzer`](crate::Analyzer) session.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct AnalyzerConfig {
    pub cache: CacheConfig,
    /// Run the capture-arity validator on invocations.
    pub check_arity: bool,
    /// Largest output count destructuring accessors exist for.
    pub max_destructure_arity: usize,
}

impl AnalyzerConfig {
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn without_arity_checks(mut self) -> Self {
        self.check_arity = false;
        self
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            cache: CacheConfig::default(),
            check_arity: true,
            max_destructure_arity: MAX_DESTRUCTURE_ARITY,
        }
    }
}
