//! Metrics module - Drop counters and timing histograms for the pipeline

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Tick;

// ============================================================================
// PIPELINE METRICS - Thread-safe counters shared by every task
// ============================================================================

#[derive(Default)]
struct Counters {
    readings_acquired: AtomicU64,
    readings_dropped: AtomicU64,
    log_lines_dropped: AtomicU64,
    records_dropped: AtomicU64,
    stream_shortfalls: AtomicU64,
    records_forwarded: AtomicU64,
    publish_failures: AtomicU64,
    offline_drops: AtomicU64,
    sink_errors: AtomicU64,
}

#[derive(Clone)]
pub struct PipelineMetrics {
    counters: Arc<Counters>,
    lock_wait_hist: Arc<Mutex<Histogram<u64>>>,
    transit_hist: Arc<Mutex<Histogram<u64>>>,
}

fn histogram() -> Histogram<u64> {
    // Three significant figures is always inside hdrhistogram's 0..=5 range.
    Histogram::new(3).expect("valid histogram precision")
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            lock_wait_hist: Arc::new(Mutex::new(histogram())),
            transit_hist: Arc::new(Mutex::new(histogram())),
        }
    }

    pub fn reading_acquired(&self) {
        self.counters.readings_acquired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reading_dropped(&self) {
        self.counters.readings_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn log_line_dropped(&self) {
        self.counters.log_lines_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.counters.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stream_shortfall(&self) {
        self.counters.stream_shortfalls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forwarded(&self) {
        self.counters.records_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn publish_failed(&self) {
        self.counters.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn offline_drop(&self) {
        self.counters.offline_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sink_error(&self) {
        self.counters.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Time spent waiting for the shared room guard.
    pub fn record_lock_wait(&self, duration: Duration) {
        self.lock_wait_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    /// Ticks between the control stamp and the transmit hand-off.
    pub fn record_transit(&self, ticks: Tick) {
        self.transit_hist.lock().record(u64::from(ticks)).ok();
    }

    pub fn report(&self) -> MetricsReport {
        let c = &self.counters;
        let lock_wait = self.lock_wait_hist.lock();
        let transit = self.transit_hist.lock();

        MetricsReport {
            readings_acquired: c.readings_acquired.load(Ordering::Relaxed),
            readings_dropped: c.readings_dropped.load(Ordering::Relaxed),
            log_lines_dropped: c.log_lines_dropped.load(Ordering::Relaxed),
            records_dropped: c.records_dropped.load(Ordering::Relaxed),
            stream_shortfalls: c.stream_shortfalls.load(Ordering::Relaxed),
            records_forwarded: c.records_forwarded.load(Ordering::Relaxed),
            publish_failures: c.publish_failures.load(Ordering::Relaxed),
            offline_drops: c.offline_drops.load(Ordering::Relaxed),
            sink_errors: c.sink_errors.load(Ordering::Relaxed),
            lock_acquisitions: lock_wait.len(),
            lock_wait_p50: Duration::from_nanos(lock_wait.value_at_quantile(0.5)),
            lock_wait_p99: Duration::from_nanos(lock_wait.value_at_quantile(0.99)),
            transit_p50_ticks: transit.value_at_quantile(0.5),
            transit_max_ticks: transit.max(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// METRICS REPORT - Summary statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsReport {
    pub readings_acquired: u64,
    pub readings_dropped: u64,
    pub log_lines_dropped: u64,
    pub records_dropped: u64,
    pub stream_shortfalls: u64,
    pub records_forwarded: u64,
    pub publish_failures: u64,
    pub offline_drops: u64,
    pub sink_errors: u64,
    pub lock_acquisitions: u64,
    pub lock_wait_p50: Duration,
    pub lock_wait_p99: Duration,
    pub transit_p50_ticks: u64,
    pub transit_max_ticks: u64,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Readings acquired:   {} ({} dropped)", self.readings_acquired, self.readings_dropped)?;
        writeln!(f, "Records forwarded:   {} ({} dropped, {} shortfalls, {} offline)",
            self.records_forwarded, self.records_dropped, self.stream_shortfalls, self.offline_drops)?;
        writeln!(f, "Publish failures:    {}", self.publish_failures)?;
        writeln!(f, "Log lines dropped:   {} ({} sink errors)", self.log_lines_dropped, self.sink_errors)?;
        writeln!(f, "Guard acquisitions:  {} (wait P50: {:?}, P99: {:?})",
            self.lock_acquisitions, self.lock_wait_p50, self.lock_wait_p99)?;
        write!(f, "Transit ticks:       P50 {}, max {}", self.transit_p50_ticks, self.transit_max_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_shared_between_clones() {
        let metrics = PipelineMetrics::new();
        let other = metrics.clone();
        other.reading_dropped();
        other.reading_dropped();
        metrics.publish_failed();

        let report = metrics.report();
        assert_eq!(report.readings_dropped, 2);
        assert_eq!(report.publish_failures, 1);
        assert_eq!(report.records_forwarded, 0);
    }

    #[test]
    fn histograms_track_lock_waits_and_transit() {
        let metrics = PipelineMetrics::new();
        metrics.record_lock_wait(Duration::from_micros(5));
        metrics.record_lock_wait(Duration::from_micros(5));
        metrics.record_transit(3);
        metrics.record_transit(12);

        let report = metrics.report();
        assert_eq!(report.lock_acquisitions, 2);
        assert!(report.lock_wait_p99 >= Duration::from_micros(4));
        assert_eq!(report.transit_max_ticks, 12);
    }
}
