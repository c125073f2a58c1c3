use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::exchange::ExchangeAttempt;

/// Sparse fixed-width energy histogram for one rung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    bin_width: f64,
    counts: BTreeMap<i64, u64>,
    total: u64,
}

impl Histogram {
    /// Creates an empty histogram with the given bin width.
    pub fn new(bin_width: f64) -> Self {
        Self {
            bin_width,
            counts: BTreeMap::new(),
            total: 0,
        }
    }

    /// Records one energy sample.
    pub fn record(&mut self, energy: f64) {
        if !energy.is_finite() {
            return;
        }
        let bin = (energy / self.bin_width).floor() as i64;
        *self.counts.entry(bin).or_insert(0) += 1;
        self.total += 1;
    }

    /// Total number of recorded samples.
    pub fn samples(&self) -> u64 {
        self.total
    }

    /// Overlap coefficient with another histogram, in [0, 1].
    ///
    /// Sum over bins of min(p_self, p_other) with both distributions
    /// normalized; 1 for identical distributions, 0 for disjoint support or
    /// when either histogram is empty.
    pub fn overlap(&self, other: &Histogram) -> f64 {
        if self.total == 0 || other.total == 0 {
            return 0.0;
        }
        let mut shared = 0.0;
        for (bin, &count) in &self.counts {
            if let Some(&other_count) = other.counts.get(bin) {
                let p_self = count as f64 / self.total as f64;
                let p_other = other_count as f64 / other.total as f64;
                shared += p_self.min(p_other);
            }
        }
        shared.clamp(0.0, 1.0)
    }

    /// Compact summary used in snapshots.
    pub fn summary(&self) -> HistogramSummary {
        let mut weighted = 0.0;
        for (&bin, &count) in &self.counts {
            let center = (bin as f64 + 0.5) * self.bin_width;
            weighted += center * count as f64;
        }
        let mean = if self.total > 0 {
            weighted / self.total as f64
        } else {
            0.0
        };
        HistogramSummary {
            samples: self.total,
            mean,
            min_bin_edge: self
                .counts
                .keys()
                .next()
                .map(|&bin| bin as f64 * self.bin_width),
            max_bin_edge: self
                .counts
                .keys()
                .next_back()
                .map(|&bin| (bin + 1) as f64 * self.bin_width),
            occupied_bins: self.counts.len(),
        }
    }
}

/// Serializable summary of one rung's energy histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Number of recorded samples.
    pub samples: u64,
    /// Mean energy estimated from bin centers.
    pub mean: f64,
    /// Lower edge of the lowest occupied bin.
    pub min_bin_edge: Option<f64>,
    /// Upper edge of the highest occupied bin.
    pub max_bin_edge: Option<f64>,
    /// Number of occupied bins.
    pub occupied_bins: usize,
}

/// Per-round metrics row stored for CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Round when the sample was recorded.
    pub round: usize,
    /// Replica identity.
    pub replica: usize,
    /// Rung the replica occupied when sampling.
    pub rung: usize,
    /// Tempered value at that rung.
    pub parameter: f64,
    /// Energy fed to the exchange test.
    pub energy: f64,
    /// Epoch-averaged potential energy.
    pub epoch_mean: f64,
}

/// Accumulates per-rung energy histograms and per-pair acceptance counters.
///
/// Read-only query surface for operators and ladder-tuning tools; the
/// collector never mutates the ladder or the assignment.
#[derive(Debug, Clone)]
pub struct DiagnosticsCollector {
    histograms: Vec<Histogram>,
    attempts: Vec<u64>,
    accepted: Vec<u64>,
    samples: Vec<MetricSample>,
}

impl DiagnosticsCollector {
    /// Creates a collector for `rungs` rungs with the given bin width.
    pub fn new(rungs: usize, bin_width: f64) -> Self {
        let pairs = rungs.saturating_sub(1);
        Self {
            histograms: (0..rungs).map(|_| Histogram::new(bin_width)).collect(),
            attempts: vec![0; pairs],
            accepted: vec![0; pairs],
            samples: Vec::new(),
        }
    }

    /// Records an energy sample against the rung that produced it.
    pub fn record_energy(&mut self, rung: usize, energy: f64) {
        self.histograms[rung].record(energy);
    }

    /// Records the outcome of an exchange attempt.
    pub fn record_attempt(&mut self, attempt: &ExchangeAttempt) {
        let pair = attempt.rung_low;
        if pair < self.attempts.len() {
            self.attempts[pair] += 1;
            if attempt.accepted {
                self.accepted[pair] += 1;
            }
        }
    }

    /// Appends one metrics row.
    pub fn push_sample(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }

    /// Immutable view over the recorded metrics rows.
    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    /// Histogram overlap coefficient between two rungs, in [0, 1].
    pub fn overlap(&self, rung_i: usize, rung_j: usize) -> f64 {
        self.histograms[rung_i].overlap(&self.histograms[rung_j])
    }

    /// Acceptance rate for the adjacent pair (rung_i, rung_j), in [0, 1].
    ///
    /// Zero when the pair has seen no attempts, including for non-adjacent
    /// arguments (no attempts can ever exist for those).
    pub fn acceptance_rate(&self, rung_i: usize, rung_j: usize) -> f64 {
        if rung_i.abs_diff(rung_j) != 1 {
            return 0.0;
        }
        let pair = rung_i.min(rung_j);
        if pair >= self.attempts.len() || self.attempts[pair] == 0 {
            return 0.0;
        }
        self.accepted[pair] as f64 / self.attempts[pair] as f64
    }

    /// Acceptance rates for every adjacent pair, indexed by lower rung.
    pub fn acceptance_rates(&self) -> Vec<f64> {
        (0..self.attempts.len())
            .map(|pair| self.acceptance_rate(pair, pair + 1))
            .collect()
    }

    /// Overlap coefficients for every adjacent pair, indexed by lower rung.
    pub fn neighbor_overlaps(&self) -> Vec<f64> {
        (0..self.histograms.len().saturating_sub(1))
            .map(|pair| self.overlap(pair, pair + 1))
            .collect()
    }

    /// Snapshot summaries for every rung's histogram.
    pub fn histogram_summaries(&self) -> Vec<HistogramSummary> {
        self.histograms.iter().map(Histogram::summary).collect()
    }

    /// Writes the recorded metrics to a CSV file.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "round,replica,rung,parameter,energy,epoch_mean")?;
        for sample in &self.samples {
            writeln!(
                file,
                "{},{},{},{:.6},{:.6},{:.6}",
                sample.round,
                sample.replica,
                sample.rung,
                sample.parameter,
                sample.energy,
                sample.epoch_mean
            )?;
        }
        Ok(())
    }
}
