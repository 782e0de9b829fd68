//! Log sampling for high-volume scenarios
//!
//! Entries are grouped by level and message. Within each tick the first
//! `first` entries of a group are logged, after which only every
//! `thereafter`-th entry is. Counters start over at the next tick, so a burst
//! of identical messages is capped without hiding a message that only shows
//! up now and then.
//!
//! Counters live in a fixed table of [`COUNTER_SLOTS`] slots per level,
//! indexed by the message hash. Messages whose hashes share a slot share a
//! counter, so memory stays constant however many distinct messages are
//! logged.
//!
//! # Example
//!
//! ```
//! use rust_logsink::core::sampling::Sampler;
//! use rust_logsink::LogLevel;
//! use std::time::Duration;
//!
//! let sampler = Sampler::new(Duration::from_secs(60), 2, 3);
//! let kept: Vec<bool> = (0..8).map(|_| sampler.check(LogLevel::Info, "retry")).collect();
//! assert_eq!(kept, vec![true, true, false, false, true, false, false, true]);
//! ```

use super::log_level::LogLevel;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counter slots per level
pub const COUNTER_SLOTS: usize = 4096;

/// Entry count for one slot within the tick it was last reset in
#[derive(Debug, Default)]
struct Counter {
    tick: AtomicU64,
    count: AtomicU64,
}

impl Counter {
    /// Count one entry in `tick`, starting over if the slot saw an older tick
    fn inc_check_reset(&self, tick: u64) -> u64 {
        let seen = self.tick.load(Ordering::Acquire);
        if seen == tick {
            return self.count.fetch_add(1, Ordering::AcqRel) + 1;
        }
        match self
            .tick
            .compare_exchange(seen, tick, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.count.store(1, Ordering::Release);
                1
            }
            // another thread reset the slot first
            Err(_) => self.count.fetch_add(1, Ordering::AcqRel) + 1,
        }
    }
}

/// Per-tick sampler keyed by level and message
pub struct Sampler {
    tick: Duration,
    first: u64,
    thereafter: u64,
    started: Instant,
    counters: Box<[Counter]>,
    metrics: SamplerMetrics,
}

impl Sampler {
    pub fn new(tick: Duration, first: u64, thereafter: u64) -> Self {
        Self {
            tick,
            first,
            thereafter,
            started: Instant::now(),
            counters: (0..LogLevel::ALL.len() * COUNTER_SLOTS)
                .map(|_| Counter::default())
                .collect(),
            metrics: SamplerMetrics::new(),
        }
    }

    /// A sampler for the given settings, or `None` when they disable sampling
    pub fn from_settings(tick: Duration, first: u64, thereafter: u64) -> Option<Self> {
        if tick.is_zero() || (first == 0 && thereafter == 0) {
            return None;
        }
        Some(Self::new(tick, first, thereafter))
    }

    /// Decide whether an entry should be written
    pub fn check(&self, level: LogLevel, message: &str) -> bool {
        let n = self.counter(level, message).inc_check_reset(self.current_tick());

        let keep = n <= self.first
            || (self.thereafter > 0 && (n - self.first) % self.thereafter == 0);
        if keep {
            self.metrics.record_sampled();
        } else {
            self.metrics.record_dropped();
        }
        keep
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    fn counter(&self, level: LogLevel, message: &str) -> &Counter {
        let slot = (message_hash(message) % COUNTER_SLOTS as u64) as usize;
        &self.counters[level as usize * COUNTER_SLOTS + slot]
    }

    fn current_tick(&self) -> u64 {
        let elapsed = self.started.elapsed().as_nanos();
        u64::try_from(elapsed / self.tick.as_nanos().max(1)).unwrap_or(u64::MAX)
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler")
            .field("tick", &self.tick)
            .field("first", &self.first)
            .field("thereafter", &self.thereafter)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

fn message_hash(message: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    message.hash(&mut hasher);
    hasher.finish()
}

/// Counts of entries kept and dropped by a [`Sampler`]
#[derive(Debug)]
pub struct SamplerMetrics {
    sampled_count: AtomicU64,
    dropped_count: AtomicU64,
}

impl SamplerMetrics {
    pub const fn new() -> Self {
        Self {
            sampled_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn sampled_count(&self) -> u64 {
        self.sampled_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    fn record_sampled(&self) {
        self.sampled_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for SamplerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
