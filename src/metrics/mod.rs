//! Metrics collection module
//!
//! Tracks repository query performance, error rates, and cache usage.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Number of response times kept per source
const RESPONSE_WINDOW: usize = 100;

/// Process-wide metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Total search count
    total_searches: AtomicU64,
    /// Searches rejected by validation
    rejected_searches: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    /// Queries per source
    source_queries: RwLock<HashMap<String, u64>>,
    /// Recent response times per source in ms
    source_response_times: RwLock<HashMap<String, Vec<u64>>>,
    /// Failures per source
    source_errors: RwLock<HashMap<String, u64>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_searches: AtomicU64::new(0),
            rejected_searches: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            source_queries: RwLock::new(HashMap::new()),
            source_response_times: RwLock::new(HashMap::new()),
            source_errors: RwLock::new(HashMap::new()),
        }
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.rejected_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache(&self, hit: bool) {
        let counter = if hit {
            &self.cache_hits
        } else {
            &self.cache_misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful source query and its response time
    pub fn record_source_query(&self, source: &str, time_ms: u64) {
        {
            let mut queries = self
                .source_queries
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *queries.entry(source.to_string()).or_insert(0) += 1;
        }

        let mut times = self
            .source_response_times
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = times.entry(source.to_string()).or_default();
        if entry.len() >= RESPONSE_WINDOW {
            entry.remove(0);
        }
        entry.push(time_ms);
    }

    /// Record a failed source query
    pub fn record_error(&self, source: &str) {
        let mut errors = self
            .source_errors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *errors.entry(source.to_string()).or_insert(0) += 1;
    }

    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Get average response time for a source
    pub fn get_avg_response_time(&self, source: &str) -> Option<u64> {
        let times = self
            .source_response_times
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        times.get(source).and_then(|t| {
            if t.is_empty() {
                None
            } else {
                Some(t.iter().sum::<u64>() / t.len() as u64)
            }
        })
    }

    /// Get reliability percentage for a source
    pub fn get_reliability(&self, source: &str) -> f64 {
        let errors = self.source_errors.read().unwrap_or_else(PoisonError::into_inner);
        let queries = self.source_queries.read().unwrap_or_else(PoisonError::into_inner);

        let error_count = *errors.get(source).unwrap_or(&0);
        let success_count = *queries.get(source).unwrap_or(&0);

        let total = error_count + success_count;
        if total == 0 {
            100.0
        } else {
            (success_count as f64 / total as f64) * 100.0
        }
    }

    /// Snapshot of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut names: Vec<String> = {
            let queries = self.source_queries.read().unwrap_or_else(PoisonError::into_inner);
            let errors = self.source_errors.read().unwrap_or_else(PoisonError::into_inner);
            queries.keys().chain(errors.keys()).cloned().collect()
        };
        names.sort();
        names.dedup();

        let sources = names
            .into_iter()
            .map(|name| {
                let queries = *self
                    .source_queries
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&name)
                    .unwrap_or(&0);
                let errors = *self
                    .source_errors
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&name)
                    .unwrap_or(&0);
                let stats = SourceStats {
                    queries,
                    errors,
                    avg_response_time_ms: self.get_avg_response_time(&name),
                    reliability: self.get_reliability(&name),
                };
                (name, stats)
            })
            .collect();

        MetricsSnapshot {
            total_searches: self.get_total_searches(),
            rejected_searches: self.rejected_searches.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            sources,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a single source
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStats {
    pub queries: u64,
    pub errors: u64,
    pub avg_response_time_ms: Option<u64>,
    pub reliability: f64,
}

/// Point-in-time copy of all metrics, served by /stats
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_searches: u64,
    pub rejected_searches: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub sources: HashMap<String, SourceStats>,
}
