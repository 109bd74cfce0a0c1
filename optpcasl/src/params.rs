use crate::{
    Result,
    error::{ensure_positive, ensure_range},
};
use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Number of physiological parameters estimated from the acquisition (CBF and ATT).
pub const N_PARAMS: usize = 2;

/// Biophysical constants of the single-compartment pCASL model (Buxton et al. MRM 1998).
///
/// The record is immutable once validated and shared read-only by every design evaluation.
/// Times are given in seconds, flow in ml/g/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AslParams {
    /// Cerebral blood flow.
    pub f: f64,
    /// Mean arterial transit (bolus arrival) time.
    pub bat: f64,
    /// Equilibrium magnetization of arterial blood.
    pub m0b: f64,
    /// T1 of arterial blood.
    pub t1b: f64,
    /// T1 of tissue.
    pub t1t: f64,
    /// Blood-brain partition coefficient.
    pub lam: f64,
    /// Labelling efficiency.
    pub alpha: f64,
    /// Label duration.
    pub tau: f64,
    /// Standard deviation of the noise of one label-control difference.
    pub noise: f64,
}

impl Default for AslParams {
    fn default() -> Self {
        Self {
            f: 0.01,
            bat: 1.0,
            m0b: 1.0,
            t1b: 1.65,
            t1t: 1.445,
            lam: 0.9,
            alpha: 0.85,
            tau: 1.4,
            noise: 0.002,
        }
    }
}

impl Display for AslParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ASL parameters: f={:.4} bat={:.2}s tau={:.2}s t1b={:.3}s t1t={:.3}s lam={:.2} alpha={:.2} noise={}",
            self.f, self.bat, self.tau, self.t1b, self.t1t, self.lam, self.alpha, self.noise
        )
    }
}

impl AslParams {
    /// Creates default parameters with the given CBF.
    pub fn new(f: f64) -> Result<Self> {
        let params = Self {
            f,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Returns parameters with given mean arterial transit time.
    pub fn with_bat(mut self, bat: f64) -> Self {
        self.bat = bat;
        self
    }

    /// Returns parameters with given equilibrium blood magnetization.
    pub fn with_m0b(mut self, m0b: f64) -> Self {
        self.m0b = m0b;
        self
    }

    /// Returns parameters with given blood and tissue T1.
    pub fn with_t1(mut self, t1b: f64, t1t: f64) -> Self {
        self.t1b = t1b;
        self.t1t = t1t;
        self
    }

    /// Returns parameters with given partition coefficient.
    pub fn with_lam(mut self, lam: f64) -> Self {
        self.lam = lam;
        self
    }

    /// Returns parameters with given labelling efficiency.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Returns parameters with given label duration.
    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    /// Returns parameters with given noise standard deviation.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Checks that every constant is physically meaningful.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("f", self.f)?;
        ensure_range("bat", self.bat, 0., f64::MAX)?;
        ensure_positive("m0b", self.m0b)?;
        ensure_positive("t1b", self.t1b)?;
        ensure_positive("t1t", self.t1t)?;
        ensure_positive("lam", self.lam)?;
        ensure_positive("alpha", self.alpha)?;
        ensure_range("alpha", self.alpha, 0., 1.)?;
        ensure_positive("tau", self.tau)?;
        ensure_positive("noise", self.noise)
    }

    #[cfg_attr(doc, katexit::katexit)]
    /// Returns the apparent tissue relaxation time $T_1' = (1/T_{1t} + f/\lambda)^{-1}$ at the
    /// nominal flow.
    pub fn t1_app(&self) -> f64 {
        1. / (1. / self.t1t + self.f / self.lam)
    }

    /// Returns the parameter vector (CBF, ATT) at the nominal flow.
    pub fn theta(&self, att: f64) -> SVector<f64, N_PARAMS> {
        SVector::<f64, N_PARAMS>::new(self.f, att)
    }
}
