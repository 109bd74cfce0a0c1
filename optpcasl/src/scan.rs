use crate::{
    AslParams, Error, N_PARAMS, Result,
    att_dist::grid_len,
    error::{ensure_interval, ensure_positive, ensure_range},
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Acquisition envelope of the scan to optimize for.
///
/// One repeat of the protocol acquires a label and a control image for every PLD. Each of those
/// images takes the label duration, the PLD and the readout. Repeats are averaged, so a shorter
/// protocol fits more repeats into the scan duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scan {
    /// Total scan duration in seconds.
    pub duration: f64,
    /// Number of PLDs to place.
    pub npld: usize,
    /// Number of slices, 1 denotes a 3D acquisition.
    pub slices: usize,
    /// Additional delay per slice of a 2D multi-slice acquisition.
    pub slicedt: f64,
    /// Readout time.
    pub readout: f64,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            duration: 300.,
            npld: 6,
            slices: 1,
            slicedt: 0.,
            readout: 0.5,
        }
    }
}

impl Display for Scan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.slices > 1 {
            write!(
                f,
                "{}s 2D scan with {} slices (time per slice={:.5}s) and readout time {:.2}s",
                self.duration, self.slices, self.slicedt, self.readout
            )
        } else {
            write!(
                f,
                "{}s 3D scan with readout time {}s",
                self.duration, self.readout
            )
        }
    }
}

impl Scan {
    /// Creates a 3D scan with given duration and number of PLDs.
    pub fn new(duration: f64, npld: usize) -> Result<Self> {
        let scan = Self {
            duration,
            npld,
            ..Self::default()
        };
        scan.validate()?;
        Ok(scan)
    }

    /// Returns scan with given number of slices and time per slice.
    pub fn with_slices(mut self, slices: usize, slicedt: f64) -> Self {
        self.slices = slices;
        self.slicedt = slicedt;
        self
    }

    /// Returns scan with given readout time.
    pub fn with_readout(mut self, readout: f64) -> Self {
        self.readout = readout;
        self
    }

    /// Checks the scan envelope itself, independent of PLD limits.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("duration", self.duration)?;
        if self.npld < N_PARAMS {
            return Err(Error::TooFewPlds {
                npld: self.npld,
                min: N_PARAMS,
            });
        }
        if self.slices < 1 {
            return Err(Error::OutOfRange {
                field: "slices",
                value: self.slices as f64,
                min: 1.,
                max: f64::MAX,
            });
        }
        ensure_range("slicedt", self.slicedt, 0., f64::MAX)?;
        ensure_range("readout", self.readout, 0., f64::MAX)
    }

    /// Returns the PLD offset of each slice.
    pub fn slice_offsets(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.slices).map(|s| s as f64 * self.slicedt)
    }

    /// Time for one repeat of the protocol: a label and a control image per PLD. Each image is
    /// followed by the readout of the whole slice stack.
    pub fn repeat_time(&self, params: &AslParams, plds: &[f64]) -> f64 {
        let readout = self.readout + self.slice_overhead();
        2. * plds
            .iter()
            .map(|pld| params.tau + pld + readout)
            .sum::<f64>()
    }

    /// Additional readout time of the later slices of a 2D acquisition.
    pub fn slice_overhead(&self) -> f64 {
        self.slices.saturating_sub(1) as f64 * self.slicedt
    }

    /// Number of complete repeats of the protocol that fit into the scan duration.
    pub fn repeats(&self, params: &AslParams, plds: &[f64]) -> usize {
        let repeat_time = self.repeat_time(params, plds);
        if repeat_time <= 0. {
            return 0;
        }
        (self.duration / repeat_time + 1e-12).floor() as usize
    }
}

/// PLD limits and step size to search over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Lower bound.
    pub lb: f64,
    /// Upper bound.
    pub ub: f64,
    /// Step size.
    pub step: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            lb: 0.1,
            ub: 3.0,
            step: 0.025,
        }
    }
}

impl Display for Limits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PLDs between {:.2}s and {:.2}s in steps of {:.5}s",
            self.lb, self.ub, self.step
        )
    }
}

impl Limits {
    /// Creates the PLD limits.
    pub fn new(lb: f64, ub: f64, step: f64) -> Result<Self> {
        let limits = Self { lb, ub, step };
        limits.validate()?;
        Ok(limits)
    }

    /// Checks bounds and step size.
    pub fn validate(&self) -> Result<()> {
        ensure_range("lb", self.lb, 0., f64::MAX)?;
        ensure_interval("lb", "ub", self.lb, self.ub)?;
        ensure_positive("step", self.step)?;
        ensure_range("ub", self.ub, 0., f64::MAX)
    }

    /// Returns the candidate alphabet `lb, lb + step, ..., ub` of a single PLD.
    pub fn grid(&self) -> PldGrid {
        let len = grid_len(self.lb, self.ub, self.step);
        let values = (0..len).map(|i| self.lb + i as f64 * self.step).collect();
        PldGrid { values }
    }
}

/// Strictly increasing candidate values of a single PLD.
#[derive(Debug, Clone, PartialEq)]
pub struct PldGrid {
    values: Vec<f64>,
}

impl PldGrid {
    /// Number of grid values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the grid has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Grid values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Maps sorted grid indices to their PLD values.
    pub fn plds(&self, ids: &[usize]) -> Vec<f64> {
        ids.iter().map(|&i| self.values[i]).collect()
    }
}
