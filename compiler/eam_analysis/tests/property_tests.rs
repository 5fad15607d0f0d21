//! Property-based tests for the analyzer.
//!
//! Generated call sites check that:
//! 1. A diagnostic is reported exactly when the constant fails its pattern
//! 2. Analysis is deterministic: repeated and concurrent runs agree
//! 3. The shared pattern cache never grows past its capacity

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use std::sync::Arc;

use eam_analysis::{Analyzer, AnalyzerConfig};
use eam_diagnostic::{Diagnostic, ErrorCode};
use eam_ir::{
    Argument, Attribute, Compilation, CompilationBuilder, Constant, Parameter, TypeId,
    MATCH_ATTRIBUTE,
};
use eam_regex::{CacheConfig, PatternCache};
use proptest::prelude::*;
use rayon::prelude::*;

fn digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

fn lowercase_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase())
}

fn starts_with_a(s: &str) -> bool {
    s.starts_with('a') && !s.contains('\n')
}

fn pairs(s: &str) -> bool {
    s.len() % 2 == 0 && s.as_bytes().chunks(2).all(|p| p == b"ab" || p == b"cd")
}

/// Patterns with an independent oracle for what they accept.
const PATTERNS: [(&str, fn(&str) -> bool); 4] = [
    (r"^\d*$", digits),
    ("[a-z]+", lowercase_word),
    ("a.*", starts_with_a),
    ("(ab|cd)*", pairs),
];

// -- Code Generation Strategies --

fn argument_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[0-9]{0,8}").expect("valid regex"),
        prop::string::string_regex("[a-z]{0,8}").expect("valid regex"),
        prop::string::string_regex("(ab|cd){0,4}").expect("valid regex"),
        prop::string::string_regex("[a-d0-9 ]{0,8}").expect("valid regex"),
    ]
}

fn call_strategy() -> impl Strategy<Value = (usize, String)> {
    (0..PATTERNS.len(), argument_strategy())
}

/// One method per pattern, and one call per generated `(pattern, argument)`.
fn compilation(calls: &[(usize, String)]) -> Compilation {
    let mut b = CompilationBuilder::new();
    let methods: Vec<_> = PATTERNS
        .iter()
        .enumerate()
        .map(|(i, (pattern, _))| {
            let param = Parameter::new("a", TypeId::STRING).with_attribute(Attribute::new(
                MATCH_ATTRIBUTE,
                vec![Constant::str(*pattern)],
            ));
            b.method(None, &format!("M{i}"), vec![param], TypeId::STRING)
        })
        .collect();
    for (pattern, text) in calls {
        let arg = b.str(text);
        b.invoke(None, methods[*pattern], [Argument::positional(arg)]);
    }
    b.finish()
}

fn failures(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.code == ErrorCode::EAM001)
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reports_exactly_the_failing_arguments(calls in prop::collection::vec(call_strategy(), 0..16)) {
        let c = compilation(&calls);
        let diagnostics = Analyzer::default().analyze(&c);

        let expected = calls
            .iter()
            .filter(|(pattern, text)| !(PATTERNS[*pattern].1)(text))
            .count();
        prop_assert_eq!(diagnostics.len(), expected);
        prop_assert_eq!(failures(&diagnostics), expected);
    }

    #[test]
    fn analysis_is_deterministic(calls in prop::collection::vec(call_strategy(), 0..16)) {
        let c = compilation(&calls);
        let analyzer = Analyzer::default();

        let first = analyzer.analyze(&c);
        let second = analyzer.analyze(&c);
        let fresh = Analyzer::default().analyze(&c);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &fresh);
    }

    #[test]
    fn node_order_does_not_matter(calls in prop::collection::vec(call_strategy(), 0..16)) {
        let c = compilation(&calls);
        let analyzer = Analyzer::default();

        let mut one_by_one: Vec<Diagnostic> = c
            .nodes()
            .into_iter()
            .rev()
            .flat_map(|node| analyzer.analyze_node(&c, node))
            .collect();
        one_by_one.sort_by_key(|d| (d.primary_span(), d.code));
        prop_assert_eq!(one_by_one, analyzer.analyze(&c));
    }

    #[test]
    fn shared_cache_stays_bounded(
        capacity in 1usize..4,
        calls in prop::collection::vec(call_strategy(), 0..16),
    ) {
        let cache = Arc::new(PatternCache::new(CacheConfig::default().with_capacity(capacity)));
        let analyzer = Analyzer::with_cache(Arc::clone(&cache), AnalyzerConfig::default());
        let expected = Analyzer::default().analyze(&compilation(&calls));

        prop_assert_eq!(analyzer.analyze(&compilation(&calls)), expected);
        prop_assert!(cache.len() <= capacity);
    }
}

// -- Concurrency --

#[test]
fn concurrent_sessions_share_one_cache() {
    let calls: Vec<(usize, String)> = (0..64)
        .map(|i| (i % PATTERNS.len(), format!("{i}")))
        .collect();
    let c = compilation(&calls);
    let expected = Analyzer::default().analyze(&c);

    let shared = Analyzer::default();
    let results: Vec<Vec<Diagnostic>> = (0..16)
        .into_par_iter()
        .map(|_| shared.clone().analyze(&c))
        .collect();

    assert!(results.iter().all(|r| *r == expected));
    assert_eq!(shared.cache().len(), PATTERNS.len());
    // One lookup per call per session, whoever compiled first.
    let stats = shared.cache().stats();
    assert_eq!(stats.hits + stats.misses, 16 * 64);
}
