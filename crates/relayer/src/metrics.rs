//! # Relayer Metrics
//!
//! Lock-free counters and a latency histogram, rendered in Prometheus
//! exposition format by `GET /metrics`.
//!
//! ## Metrics
//!
//! - `relayer_requests_total`: store-hash requests received
//! - `relayer_requests_by_status`: responses per HTTP status
//! - `relayer_store_outcomes_total`: registered / already registered / failed
//! - `relayer_store_latency_ms`: end-to-end store-hash latency

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

// ════════════════════════════════════════════════════════════════════════════
// COUNTER
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HISTOGRAM
// ════════════════════════════════════════════════════════════════════════════

/// Bucketed latency histogram in milliseconds.
///
/// Registration waits for a receipt, so the buckets reach well past the
/// usual HTTP range.
pub struct Histogram {
    buckets: [AtomicU64; 10],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub const BUCKET_BOUNDS: [u64; 9] = [10, 50, 100, 250, 500, 1000, 2500, 5000, 15000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, value_ms: u64) {
        self.sum.fetch_add(value_ms, Ordering::SeqCst);
        self.count.fetch_add(1, Ordering::SeqCst);
        self.buckets[Self::find_bucket(value_ms)].fetch_add(1, Ordering::SeqCst);
    }

    fn find_bucket(value_ms: u64) -> usize {
        Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| value_ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len())
    }

    /// Observations up to and including bucket `idx` (9 is `+Inf`).
    pub fn get_cumulative(&self, idx: usize) -> u64 {
        self.buckets[..=idx.min(9)]
            .iter()
            .map(|b| b.load(Ordering::SeqCst))
            .sum()
    }

    pub fn get_sum(&self) -> u64 {
        self.sum.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("count", &self.get_count())
            .field("sum", &self.get_sum())
            .finish()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// STATUS CODE COUNTERS
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct StatusCodeCounters {
    counters: RwLock<HashMap<u16, Counter>>,
}

impl StatusCodeCounters {
    pub fn inc(&self, status: u16) {
        {
            let counters = self.counters.read();
            if let Some(counter) = counters.get(&status) {
                counter.inc();
                return;
            }
        }
        self.counters.write().entry(status).or_default().inc();
    }

    pub fn get(&self, status: u16) -> u64 {
        self.counters.read().get(&status).map(Counter::get).unwrap_or(0)
    }

    /// Sorted by status code.
    pub fn get_all(&self) -> Vec<(u16, u64)> {
        let mut all: Vec<_> = self
            .counters
            .read()
            .iter()
            .map(|(&k, v)| (k, v.get()))
            .collect();
        all.sort_by_key(|(k, _)| *k);
        all
    }
}

impl std::fmt::Debug for StatusCodeCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusCodeCounters")
            .field("counters", &self.get_all())
            .finish()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RELAYER METRICS
// ════════════════════════════════════════════════════════════════════════════

/// Result of one store-hash request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Registered,
    AlreadyRegistered,
    Rejected,
    Failed,
}

#[derive(Debug, Default)]
pub struct RelayerMetrics {
    pub requests_total: Counter,
    pub requests_by_status: StatusCodeCounters,
    pub registered: Counter,
    pub already_registered: Counter,
    pub rejected: Counter,
    pub failed: Counter,
    pub store_latency: Histogram,
}

impl RelayerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_total.inc();
    }

    pub fn record_response(&self, status: u16, outcome: StoreOutcome, latency_ms: u64) {
        self.requests_by_status.inc(status);
        match outcome {
            StoreOutcome::Registered => self.registered.inc(),
            StoreOutcome::AlreadyRegistered => self.already_registered.inc(),
            StoreOutcome::Rejected => self.rejected.inc(),
            StoreOutcome::Failed => self.failed.inc(),
        }
        self.store_latency.observe(latency_ms);
    }

    pub fn to_prometheus(&self) -> String {
        let mut out = String::with_capacity(2048);

        let _ = writeln!(out, "# HELP relayer_requests_total Store-hash requests received");
        let _ = writeln!(out, "# TYPE relayer_requests_total counter");
        let _ = writeln!(out, "relayer_requests_total {}", self.requests_total.get());
        let _ = writeln!(out);

        let _ = writeln!(out, "# HELP relayer_requests_by_status Responses by HTTP status code");
        let _ = writeln!(out, "# TYPE relayer_requests_by_status counter");
        for (status, count) in self.requests_by_status.get_all() {
            let _ = writeln!(out, "relayer_requests_by_status{{status=\"{}\"}} {}", status, count);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "# HELP relayer_store_outcomes_total Store-hash outcomes");
        let _ = writeln!(out, "# TYPE relayer_store_outcomes_total counter");
        for (label, counter) in [
            ("registered", &self.registered),
            ("already_registered", &self.already_registered),
            ("rejected", &self.rejected),
            ("failed", &self.failed),
        ] {
            let _ = writeln!(
                out,
                "relayer_store_outcomes_total{{outcome=\"{}\"}} {}",
                label,
                counter.get()
            );
        }
        let _ = writeln!(out);

        let h = &self.store_latency;
        let _ = writeln!(out, "# HELP relayer_store_latency_ms Store-hash latency in milliseconds");
        let _ = writeln!(out, "# TYPE relayer_store_latency_ms histogram");
        for (i, bound) in Histogram::BUCKET_BOUNDS.iter().enumerate() {
            let _ = writeln!(
                out,
                "relayer_store_latency_ms_bucket{{le=\"{}\"}} {}",
                bound,
                h.get_cumulative(i)
            );
        }
        let _ = writeln!(out, "relayer_store_latency_ms_bucket{{le=\"+Inf\"}} {}", h.get_cumulative(9));
        let _ = writeln!(out, "relayer_store_latency_ms_sum {}", h.get_sum());
        let _ = writeln!(out, "relayer_store_latency_ms_count {}", h.get_count());

        out
    }
}
