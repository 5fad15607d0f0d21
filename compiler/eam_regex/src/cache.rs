//! Bounded, thread-safe cache of compiled patterns.
//!
//! Lookups are lock-free reads against a sharded `DashMap`. Misses compile
//! outside any lock, then take a single insert lock to re-check, evict, and
//! insert, so the size bound holds under concurrent misses.
//!
//! Eviction runs only when an insert would exceed capacity. It first drops
//! every entry idle longer than the TTL; if none qualify it drops the single
//! least-recently-used entry. Recency is a logical tick, so ties cannot occur.

use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHasher;

use crate::options::PatternOptions;
use crate::pattern::CompiledPattern;

type FxDashMap<K, V> = DashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Cache tuning.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CacheConfig {
    /// Maximum number of compiled patterns held at once.
    pub capacity: usize,
    /// Entries idle longer than this are evicted first.
    pub entry_ttl: Duration,
    /// Time budget for each match against a cached pattern.
    pub match_timeout: Duration,
}

impl CacheConfig {
    pub const DEFAULT_CAPACITY: usize = 256;
    pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(5 * 60);
    pub const DEFAULT_MATCH_TIMEOUT: Duration = Duration::from_millis(200);

    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_entry_ttl(mut self, entry_ttl: Duration) -> Self {
        self.entry_ttl = entry_ttl;
        self
    }

    #[must_use]
    pub fn with_match_timeout(mut self, match_timeout: Duration) -> Self {
        self.match_timeout = match_timeout;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: Self::DEFAULT_CAPACITY,
            entry_ttl: Self::DEFAULT_ENTRY_TTL,
            match_timeout: Self::DEFAULT_MATCH_TIMEOUT,
        }
    }
}

/// Cache key: pattern text plus options.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PatternKey {
    pub text: Box<str>,
    pub options: PatternOptions,
}

impl PatternKey {
    pub fn new(text: &str, options: PatternOptions) -> Self {
        PatternKey {
            text: text.into(),
            options,
        }
    }
}

/// Counters for cache behavior.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Misses whose pattern failed to compile.
    pub failures: u64,
}

struct CacheEntry {
    pattern: Arc<CompiledPattern>,
    /// Nanoseconds since the cache epoch.
    last_used: AtomicU64,
    last_tick: AtomicU64,
}

impl CacheEntry {
    fn touch(&self, now: u64, tick: u64) {
        self.last_used.store(now, Ordering::Relaxed);
        self.last_tick.store(tick, Ordering::Relaxed);
    }
}

/// A compiled-pattern cache shared by every analysis of a session.
pub struct PatternCache {
    entries: FxDashMap<PatternKey, CacheEntry>,
    insert_lock: Mutex<()>,
    epoch: Instant,
    tick: AtomicU64,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    failures: AtomicU64,
}

impl PatternCache {
    pub fn new(config: CacheConfig) -> Self {
        PatternCache {
            entries: FxDashMap::default(),
            insert_lock: Mutex::new(()),
            epoch: Instant::now(),
            tick: AtomicU64::new(0),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the compiled form of `text` under `options`, compiling on a miss.
    ///
    /// Returns `None` when the pattern does not compile. Failures are never
    /// cached, so a later request retries compilation.
    pub fn get(&self, text: &str, options: PatternOptions) -> Option<Arc<CompiledPattern>> {
        let key = PatternKey::new(text, options);
        if let Some(found) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(found);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let compiled = match CompiledPattern::new(text, options, self.config.match_timeout) {
            Ok(pattern) => Arc::new(pattern),
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(pattern = text, %err, "pattern failed to compile");
                return None;
            }
        };

        if self.config.capacity == 0 {
            return Some(compiled);
        }

        let _guard = self.insert_lock.lock();
        // Another thread may have inserted while we compiled.
        if let Some(found) = self.lookup(&key) {
            return Some(found);
        }
        if self.entries.len() >= self.config.capacity {
            self.evict();
        }
        let entry = CacheEntry {
            pattern: Arc::clone(&compiled),
            last_used: AtomicU64::new(self.now()),
            last_tick: AtomicU64::new(self.next_tick()),
        };
        self.entries.insert(key, entry);
        Some(compiled)
    }

    /// Whether a compiled form is cached, without touching recency.
    pub fn contains(&self, text: &str, options: PatternOptions) -> bool {
        self.entries.contains_key(&PatternKey::new(text, options))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, key: &PatternKey) -> Option<Arc<CompiledPattern>> {
        let entry = self.entries.get(key)?;
        entry.touch(self.now(), self.next_tick());
        Some(Arc::clone(&entry.pattern))
    }

    /// Called with the insert lock held.
    fn evict(&self) {
        let now = self.now();
        let ttl = u64::try_from(self.config.entry_ttl.as_nanos()).unwrap_or(u64::MAX);

        let mut victims: Vec<PatternKey> = self
            .entries
            .iter()
            .filter(|entry| now.saturating_sub(entry.last_used.load(Ordering::Relaxed)) > ttl)
            .map(|entry| entry.key().clone())
            .collect();

        if victims.is_empty() {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.last_tick.load(Ordering::Relaxed))
                .map(|entry| entry.key().clone());
            victims.extend(oldest);
        }

        for key in &victims {
            self.entries.remove(key);
        }
        self.evictions.fetch_add(victims.len() as u64, Ordering::Relaxed);
        tracing::debug!(
            evicted = victims.len(),
            remaining = self.entries.len(),
            "pattern cache evicted"
        );
    }

    fn now(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn next_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        PatternCache::new(CacheConfig::default())
    }
}
