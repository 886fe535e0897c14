//! Running performance statistics for one agent.
//!
//! Counts and total time are kept as exact sums and divided on read, so the
//! success rate and average never accumulate rounding drift.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningStats {
    requests_processed: u64,
    completed: u64,
    successes: u64,
    total_response_time: Duration,
    last_executed: Option<DateTime<Utc>>,
}

/// Point-in-time view of [`RunningStats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub requests_processed: u64,
    /// Percentage of completed requests that succeeded, 0 to 100.
    pub success_rate: f64,
    /// Mean wall-clock milliseconds per completed request.
    pub average_response_time: f64,
    pub last_executed: Option<DateTime<Utc>>,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request as it starts.
    pub fn begin(&mut self) {
        self.requests_processed += 1;
        self.last_executed = Some(Utc::now());
    }

    /// Record how a counted request ended.
    pub fn finish(&mut self, success: bool, elapsed: Duration) {
        self.completed += 1;
        if success {
            self.successes += 1;
        }
        self.total_response_time += elapsed;
    }

    pub fn requests_processed(&self) -> u64 {
        self.requests_processed
    }

    pub fn success_rate(&self) -> f64 {
        if self.completed == 0 {
            return 0.0;
        }
        self.successes as f64 * 100.0 / self.completed as f64
    }

    pub fn average_response_time(&self) -> f64 {
        if self.completed == 0 {
            return 0.0;
        }
        self.total_response_time.as_secs_f64() * 1000.0 / self.completed as f64
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_processed: self.requests_processed,
            success_rate: self.success_rate(),
            average_response_time: self.average_response_time(),
            last_executed: self.last_executed,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(stats: &mut RunningStats, success: bool, millis: u64) {
        stats.begin();
        stats.finish(success, Duration::from_millis(millis));
    }

    #[test]
    fn test_empty_stats() {
        let snapshot = RunningStats::new().snapshot();
        assert_eq!(snapshot.requests_processed, 0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.average_response_time, 0.0);
        assert!(snapshot.last_executed.is_none());
    }

    #[test]
    fn test_one_success_one_failure() {
        let mut stats = RunningStats::new();
        run(&mut stats, true, 10);
        run(&mut stats, false, 30);

        assert_eq!(stats.requests_processed(), 2);
        assert_eq!(stats.success_rate(), 50.0);
        assert!((stats.average_response_time() - 20.0).abs() < 1e-9);
        assert!(stats.snapshot().last_executed.is_some());
    }

    #[test]
    fn test_no_drift_over_many_requests() {
        let mut stats = RunningStats::new();
        for i in 0..3000 {
            run(&mut stats, i % 3 != 0, 1);
        }
        assert!((stats.success_rate() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_in_flight_request_does_not_skew_rate() {
        let mut stats = RunningStats::new();
        run(&mut stats, true, 5);
        stats.begin();
        assert_eq!(stats.requests_processed(), 2);
        assert_eq!(stats.success_rate(), 100.0);
    }

    #[test]
    fn test_reset() {
        let mut stats = RunningStats::new();
        run(&mut stats, true, 5);
        stats.reset();
        assert_eq!(stats, RunningStats::default());
    }
}
