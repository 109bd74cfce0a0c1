use crate::{AslParams, N_PARAMS};
use nalgebra::SVector;
use num_dual::DualNum;

/// Required signal function for the [KineticModel] derive.
///
/// `theta` holds the parameters (CBF, ATT). Implementations written generically over
/// [DualNum] are differentiated exactly by forward-mode dual numbers.
pub trait SignalFunction {
    /// Defines the expected label-control difference signal at a given PLD.
    fn f<D: DualNum<f64>>(&self, pld: f64, theta: &SVector<D, N_PARAMS>) -> D;
}

/// Expected ASL difference signal and its sensitivity to the parameters (CBF, ATT).
pub trait KineticModel {
    /// Signal value at `pld` for parameters `theta`.
    fn val(&self, pld: f64, theta: &SVector<f64, N_PARAMS>) -> f64;
    /// Signal value and its gradient with respect to `theta`.
    fn val_grad(
        &self,
        pld: f64,
        theta: &SVector<f64, N_PARAMS>,
    ) -> (f64, SVector<f64, N_PARAMS>);
}

#[cfg_attr(doc, katexit::katexit)]
/// Single-compartment, single-bolus pCASL model (Buxton et al. MRM 1998) with analytic
/// derivatives.
///
/// With the time since the start of labelling $t = \text{PLD} + \tau$, apparent relaxation
/// $T_1'$ and $k = 2 \alpha M_{0b} T_1' e^{-\Delta t / T_{1b}}$ the signal reads
///
/// $$
/// \Delta M(t) = \begin{cases}
/// 0 & t \le \Delta t \\\\
/// f k \left(1 - e^{-(t - \Delta t) / T_1'}\right) & \Delta t < t < \Delta t + \tau \\\\
/// f k \, e^{-(t - \tau - \Delta t) / T_1'} \left(1 - e^{-\tau / T_1'}\right) & t \ge \Delta t + \tau
/// \end{cases}
/// $$
///
/// with arterial transit time $\Delta t$. $T_1'$ is evaluated at the nominal flow of the
/// [AslParams], so the signal is linear in CBF. The signal vanishes for $\text{PLD} \le 0$.
///
/// The PLD is counted from the end of labelling, so in terms of the PLD the label arrives for
/// $\Delta t - \tau < \text{PLD} < \Delta t$ and decays for $\text{PLD} \ge \Delta t$.
/// Earlier PLDs see no label yet.
#[derive(Debug, Clone, PartialEq)]
pub struct BuxtonModel {
    params: AslParams,
    t1_app: f64,
}

impl BuxtonModel {
    /// Instantizes [BuxtonModel]
    pub fn new(params: &AslParams) -> Self {
        Self {
            params: params.clone(),
            t1_app: params.t1_app(),
        }
    }

    /// Returns the parameters the model was built from.
    pub fn params(&self) -> &AslParams {
        &self.params
    }

    #[inline(always)]
    fn arrived(&self, pld: f64, att: f64) -> Option<f64> {
        let t = pld + self.params.tau;
        (pld > 0. && t > att).then_some(t)
    }
}

impl SignalFunction for BuxtonModel {
    fn f<D: DualNum<f64>>(&self, pld: f64, theta: &SVector<D, N_PARAMS>) -> D {
        let p = &self.params;
        let att = theta[1].clone();
        let Some(t) = self.arrived(pld, att.re()) else {
            return D::from(0.);
        };
        let unit = (-att.clone() / p.t1b).exp() * (2. * p.alpha * p.m0b * self.t1_app);
        let scale = theta[0].clone() * unit;
        if t < att.re() + p.tau {
            let decay = ((att - D::from(t)) / self.t1_app).exp();
            scale * (D::from(1.) - decay)
        } else {
            let decay = ((att + D::from(p.tau - t)) / self.t1_app).exp();
            scale * decay * (1. - (-p.tau / self.t1_app).exp())
        }
    }
}

impl KineticModel for BuxtonModel {
    fn val(&self, pld: f64, theta: &SVector<f64, N_PARAMS>) -> f64 {
        self.val_grad(pld, theta).0
    }

    fn val_grad(
        &self,
        pld: f64,
        theta: &SVector<f64, N_PARAMS>,
    ) -> (f64, SVector<f64, N_PARAMS>) {
        let p = &self.params;
        let (cbf, att) = (theta[0], theta[1]);
        let Some(t) = self.arrived(pld, att) else {
            return (0., SVector::zeros());
        };
        let unit = 2. * p.alpha * p.m0b * self.t1_app * (-att / p.t1b).exp();
        let (unit_val, d_att) = if t < att + p.tau {
            // bolus still arriving
            let decay = ((att - t) / self.t1_app).exp();
            let unit_val = unit * (1. - decay);
            let d_att = cbf * unit * (-(1. - decay) / p.t1b - decay / self.t1_app);
            (unit_val, d_att)
        } else {
            let unit_val = unit
                * ((att + p.tau - t) / self.t1_app).exp()
                * (1. - (-p.tau / self.t1_app).exp());
            let d_att = cbf * unit_val * (1. / self.t1_app - 1. / p.t1b);
            (unit_val, d_att)
        };
        (cbf * unit_val, SVector::<f64, N_PARAMS>::new(unit_val, d_att))
    }
}
