//! Rolling window of SQL generation outcomes.
//!
//! One [`QueryOutcome`] is recorded per completed generation attempt. The
//! window keeps the most recent records in insertion order and evicts the
//! oldest once the capacity is exceeded. Aggregates are computed on demand.
//! State is process-local and never persisted.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::prompt::SchemaStats;

/// Records kept in the window unless configured otherwise.
pub const DEFAULT_METRICS_WINDOW: usize = 100;

/// Records returned in [`AggregatedMetrics::recent_metrics`].
pub const RECENT_METRICS_LIMIT: usize = 50;

/// Immutable record of one generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub timestamp: DateTime<Utc>,
    /// Wall time in milliseconds.
    pub duration: u64,
    pub prompt_size: usize,
    pub schema_tables: usize,
    pub schema_columns: usize,
    pub schema_relationships: usize,
    /// Model confidence in `[0, 1]`; zero for failures.
    pub confidence: f64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryOutcome {
    /// Successful attempt.
    pub fn success(
        timestamp: DateTime<Utc>,
        duration: u64,
        stats: SchemaStats,
        confidence: f64,
    ) -> Self {
        Self::from_parts(timestamp, duration, stats, confidence, None)
    }

    /// Failed attempt carrying the error message.
    pub fn failure(
        timestamp: DateTime<Utc>,
        duration: u64,
        stats: SchemaStats,
        error: impl Into<String>,
    ) -> Self {
        Self::from_parts(timestamp, duration, stats, 0.0, Some(error.into()))
    }

    fn from_parts(
        timestamp: DateTime<Utc>,
        duration: u64,
        stats: SchemaStats,
        confidence: f64,
        error: Option<String>,
    ) -> Self {
        Self {
            timestamp,
            duration,
            prompt_size: stats.prompt_size,
            schema_tables: stats.tables,
            schema_columns: stats.columns,
            schema_relationships: stats.relationships,
            confidence,
            success: error.is_none(),
            error,
        }
    }
}

/// Aggregate view over the current window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMetrics {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    /// Mean duration over all records.
    pub average_latency: f64,
    /// Mean confidence over successful records only.
    pub average_confidence: f64,
    pub average_prompt_size: f64,
    pub average_schema_tables: f64,
    pub average_schema_columns: f64,
    pub average_schema_relationships: f64,
    pub min_latency: u64,
    pub max_latency: u64,
    pub min_confidence: f64,
    pub max_confidence: f64,
    /// Percentage of failed records, `0..=100`.
    pub error_rate: f64,
    /// Most recent records, newest first.
    pub recent_metrics: Vec<QueryOutcome>,
}

/// Bounded FIFO of outcomes shared across request handlers.
#[derive(Debug)]
pub struct MetricsAggregator {
    capacity: usize,
    window: Mutex<VecDeque<QueryOutcome>>,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS_WINDOW)
    }
}

impl MetricsAggregator {
    /// Window holding at most `capacity` records (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            window: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Maximum number of retained records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an outcome, evicting the oldest when over capacity.
    pub fn record(&self, outcome: QueryOutcome) {
        let mut window = self.lock();
        window.push_back(outcome);
        while window.len() > self.capacity {
            window.pop_front();
        }
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Compute aggregates over the current window.
    pub fn aggregate(&self) -> AggregatedMetrics {
        aggregate_window(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<QueryOutcome>> {
        // Records are plain data; a panic mid-push cannot leave them torn.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn aggregate_window(window: &VecDeque<QueryOutcome>) -> AggregatedMetrics {
    if window.is_empty() {
        return AggregatedMetrics::default();
    }

    let total = window.len();
    let confidences: Vec<f64> = window
        .iter()
        .filter(|m| m.success)
        .map(|m| m.confidence)
        .collect();
    let successful = confidences.len();
    let failed = total - successful;

    AggregatedMetrics {
        total_requests: total,
        successful_requests: successful,
        failed_requests: failed,
        average_latency: mean(window.iter().map(|m| m.duration as f64)),
        average_confidence: mean(confidences.iter().copied()),
        average_prompt_size: mean(window.iter().map(|m| m.prompt_size as f64)),
        average_schema_tables: mean(window.iter().map(|m| m.schema_tables as f64)),
        average_schema_columns: mean(window.iter().map(|m| m.schema_columns as f64)),
        average_schema_relationships: mean(
            window.iter().map(|m| m.schema_relationships as f64),
        ),
        min_latency: window.iter().map(|m| m.duration).min().unwrap_or(0),
        max_latency: window.iter().map(|m| m.duration).max().unwrap_or(0),
        min_confidence: confidences.iter().copied().reduce(f64::min).unwrap_or(0.0),
        max_confidence: confidences.iter().copied().reduce(f64::max).unwrap_or(0.0),
        error_rate: failed as f64 / total as f64 * 100.0,
        recent_metrics: window.iter().rev().take(RECENT_METRICS_LIMIT).cloned().collect(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
