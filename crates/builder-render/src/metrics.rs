//! Render metrics.
//!
//! Counters are atomics; the recent-duration window sits behind a mutex.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::ProcessOutcome;

/// Maximum number of duration samples kept for percentiles.
const MAX_DURATION_SAMPLES: usize = 1000;

/// Render metrics collector, shared by every request task.
#[derive(Debug)]
pub struct RenderMetrics {
    renders_started: AtomicU64,
    renders_succeeded: AtomicU64,
    tool_failures: AtomicU64,
    launch_failures: AtomicU64,
    timeouts: AtomicU64,
    rejected_requests: AtomicU64,
    in_flight: AtomicU64,
    waiting: AtomicU64,
    duration_samples: Mutex<VecDeque<Duration>>,
}

impl RenderMetrics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self {
            renders_started: AtomicU64::new(0),
            renders_succeeded: AtomicU64::new(0),
            tool_failures: AtomicU64::new(0),
            launch_failures: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            waiting: AtomicU64::new(0),
            duration_samples: Mutex::new(VecDeque::with_capacity(MAX_DURATION_SAMPLES)),
        }
    }

    /// A request failed validation.
    pub fn record_rejected(&self) {
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// A request is waiting on the admission gate.
    pub fn record_waiting(&self) {
        self.waiting.fetch_add(1, Ordering::Relaxed);
    }

    /// A request left the admission gate and its process is starting.
    pub fn record_started(&self, was_waiting: bool) {
        if was_waiting {
            self.waiting.fetch_sub(1, Ordering::Relaxed);
        }
        self.renders_started.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// A render process reached `outcome` after `duration`.
    pub fn record_finished(&self, outcome: &ProcessOutcome, duration: Duration) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        let counter = match outcome {
            ProcessOutcome::Success => {
                self.add_duration_sample(duration);
                &self.renders_succeeded
            }
            ProcessOutcome::ToolFailure { .. } => &self.tool_failures,
            ProcessOutcome::LaunchFailure { .. } => &self.launch_failures,
            ProcessOutcome::Timeout { .. } => &self.timeouts,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// A started render ended without an outcome (supervisor error).
    pub fn record_aborted(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    fn add_duration_sample(&self, duration: Duration) {
        if let Ok(mut samples) = self.duration_samples.lock() {
            if samples.len() >= MAX_DURATION_SAMPLES {
                samples.pop_front();
            }
            samples.push_back(duration);
        }
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut durations: Vec<Duration> = self
            .duration_samples
            .lock()
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        durations.sort();

        let percentile = |p: usize| {
            if durations.is_empty() {
                return None;
            }
            let idx = (durations.len() - 1) * p / 100;
            durations.get(idx).map(|d| d.as_millis() as u64)
        };

        MetricsSnapshot {
            renders_started: self.renders_started.load(Ordering::Relaxed),
            renders_succeeded: self.renders_succeeded.load(Ordering::Relaxed),
            tool_failures: self.tool_failures.load(Ordering::Relaxed),
            launch_failures: self.launch_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
            waiting: self.waiting.load(Ordering::Relaxed),
            duration_p50_ms: percentile(50),
            duration_p95_ms: percentile(95),
            duration_p99_ms: percentile(99),
            sample_count: durations.len() as u64,
        }
    }
}

impl Default for RenderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of render metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Processes started.
    pub renders_started: u64,
    /// Renders that exited zero.
    pub renders_succeeded: u64,
    /// Renders that exited non-zero.
    pub tool_failures: u64,
    /// Renders whose process could not start.
    pub launch_failures: u64,
    /// Renders killed at their deadline.
    pub timeouts: u64,
    /// Requests rejected by validation.
    pub rejected_requests: u64,
    /// Processes currently running.
    pub in_flight: u64,
    /// Requests queued on the admission gate.
    pub waiting: u64,
    /// Median successful render time.
    pub duration_p50_ms: Option<u64>,
    /// 95th percentile successful render time.
    pub duration_p95_ms: Option<u64>,
    /// 99th percentile successful render time.
    pub duration_p99_ms: Option<u64>,
    /// Number of duration samples behind the percentiles.
    pub sample_count: u64,
}
