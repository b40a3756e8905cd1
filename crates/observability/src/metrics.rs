//! Timing metrics
//!
//! Facade calls for the per-tick events plus an in-memory aggregator that
//! feeds the session summary logged at shutdown.

use std::collections::{BTreeMap, HashMap};

use contracts::{ResetCause, SectorCrossing};
use metrics::{counter, gauge, histogram};

/// Record a closed sector
pub fn record_sector_crossing(crossing: &SectorCrossing) {
    counter!(
        "track_sectors_sectors_cleared_total",
        "outcome" => crossing.outcome.as_str()
    )
    .increment(1);

    histogram!(
        "track_sectors_split_seconds",
        "sector" => (crossing.index + 1).to_string()
    )
    .record(crossing.split);

    if let Some(delta) = crossing.delta {
        gauge!(
            "track_sectors_last_delta_seconds",
            "sector" => (crossing.index + 1).to_string()
        )
        .set(delta);
    }
}

/// Record a committed lap
pub fn record_lap_committed(lap: u32) {
    counter!("track_sectors_laps_committed_total").increment(1);
    gauge!("track_sectors_current_lap").set(lap as f64);
}

/// Record a session progress reset
pub fn record_session_reset(cause: ResetCause) {
    counter!("track_sectors_session_resets_total", "cause" => cause.as_str()).increment(1);
}

/// Record a progress sample that did not advance timing
pub fn record_motion_rejected(kind: &'static str) {
    counter!("track_sectors_samples_rejected_total", "kind" => kind).increment(1);
}

/// Record a feedback cue hand-off
pub fn record_cue(kind: &'static str, delivered: bool) {
    let status = if delivered { "queued" } else { "dropped" };
    counter!(
        "track_sectors_cues_total",
        "kind" => kind,
        "status" => status
    )
    .increment(1);
}

/// Session statistics aggregator
///
/// Aggregates timing events in memory for the shutdown summary.
#[derive(Debug, Clone, Default)]
pub struct SessionStatsAggregator {
    /// Sectors closed
    pub total_crossings: u64,

    /// Sectors that improved the best
    pub new_bests: u64,

    /// Laps committed
    pub laps_committed: u64,

    /// Resets by cause label
    pub resets: HashMap<&'static str, u64>,

    /// Split statistics per zero-based sector
    pub split_stats: BTreeMap<usize, RunningStats>,
}

impl SessionStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_crossing(&mut self, crossing: &SectorCrossing) {
        self.total_crossings += 1;
        if crossing.outcome.is_new_best() {
            self.new_bests += 1;
        }
        self.split_stats
            .entry(crossing.index)
            .or_default()
            .push(crossing.split);
    }

    pub fn record_lap(&mut self) {
        self.laps_committed += 1;
    }

    pub fn record_reset(&mut self, cause: ResetCause) {
        *self.resets.entry(cause.as_str()).or_insert(0) += 1;
    }

    /// Build the summary report
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            total_crossings: self.total_crossings,
            new_bests: self.new_bests,
            laps_committed: self.laps_committed,
            resets: self.resets.values().sum(),
            sectors: self
                .split_stats
                .iter()
                .map(|(index, stats)| (*index, StatsSummary::from(stats)))
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Session summary
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub total_crossings: u64,
    pub new_bests: u64,
    pub laps_committed: u64,
    pub resets: u64,
    pub sectors: BTreeMap<usize, StatsSummary>,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Session Summary ===")?;
        writeln!(f, "Laps committed: {}", self.laps_committed)?;
        writeln!(
            f,
            "Sectors cleared: {} ({} new best)",
            self.total_crossings, self.new_bests
        )?;
        writeln!(f, "Session resets: {}", self.resets)?;
        for (index, stats) in &self.sectors {
            writeln!(f, "Sector {} (s): {}", index + 1, stats)?;
        }
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
