use crate::{
    Result,
    error::{ensure_interval, ensure_positive, ensure_range},
};
use nalgebra::DVector;
use std::fmt::Display;

/// Tolerance used when counting grid steps, absorbs floating point accumulation.
pub(crate) const GRID_EPS: f64 = 1e-9;

/// Number of samples of the inclusive regular grid `start, start + step, ..., end`.
pub(crate) fn grid_len(start: f64, end: f64, step: f64) -> usize {
    ((end - start) / step + GRID_EPS).floor() as usize + 1
}

/// Discretized, weighted distribution of arterial transit times (ATT, also BAT).
///
/// The samples lie on the regular grid `[start, end]` with distance `step`. Each sample is
/// weighted with 1 in the interior while the weight tapers linearly down to 0.5 within `taper`
/// seconds of either edge. The weights are not normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct AttDistribution {
    start: f64,
    end: f64,
    step: f64,
    taper: f64,
    /// ATT samples.
    pub dist: DVector<f64>,
    /// Weight of each ATT sample.
    pub weight: DVector<f64>,
}

impl Display for AttDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ATT distribution: {} values between {:.2}s and {:.2}s (weight taper={:.2}s)",
            self.len(),
            self.start,
            self.end,
            self.taper
        )
    }
}

impl AttDistribution {
    /// Creates the distribution on the grid `[start, end]` with given step and edge taper.
    pub fn new(start: f64, end: f64, step: f64, taper: f64) -> Result<Self> {
        ensure_range("start", start, 0., f64::MAX)?;
        ensure_interval("start", "end", start, end)?;
        ensure_positive("step", step)?;
        ensure_range("taper", taper, 0., f64::MAX)?;

        let len = grid_len(start, end, step);
        let dist = DVector::from_fn(len, |i, _| start + i as f64 * step);
        let weight = dist.map(|att| {
            let edge = (att - start).min(end - att).max(0.);
            if edge < taper {
                0.5 + 0.5 * edge / taper
            } else {
                1.
            }
        });
        Ok(Self {
            start,
            end,
            step,
            taper,
            dist,
            weight,
        })
    }

    /// Creates the distribution with uniform weights.
    pub fn uniform(start: f64, end: f64, step: f64) -> Result<Self> {
        Self::new(start, end, step, 0.)
    }

    /// Number of ATT samples.
    pub fn len(&self) -> usize {
        self.dist.len()
    }

    /// Returns true if there is no sample, which never happens for a validated distribution.
    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.weight.sum()
    }

    /// Iterates over (ATT, weight) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.dist.iter().copied().zip(self.weight.iter().copied())
    }

    /// Returns the ATT samples outside of the taper margins.
    pub fn interior(&self) -> Vec<f64> {
        self.dist
            .iter()
            .copied()
            .filter(|att| {
                att - self.start >= self.taper - GRID_EPS && self.end - att >= self.taper - GRID_EPS
            })
            .collect()
    }

    /// Lower end of the distribution.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Upper end of the distribution.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Distance between two samples.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Width of the weight taper at each edge.
    pub fn taper(&self) -> f64 {
        self.taper
    }
}
