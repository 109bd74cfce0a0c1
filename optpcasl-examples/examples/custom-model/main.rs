use nalgebra::SVector;
use num_dual::DualNum;
use optpcasl::{
    AslParams, AttDistribution, KineticModel, Limits, N_PARAMS, PldOptimizer, Result, Scan,
    SignalFunction,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// with help of the KineticModel derive and the required implementation
// of the SignalFunction the derivatives are automatically generated
#[derive(KineticModel)]
struct PlugFlow {
    tau: f64,
    t1b: f64,
    alpha: f64,
    m0b: f64,
}

// label that stays in the vessels and relaxes with the blood T1 only
impl SignalFunction for PlugFlow {
    fn f<D: DualNum<f64>>(&self, pld: f64, theta: &SVector<D, N_PARAMS>) -> D {
        let att = theta[1].clone();
        let t = pld + self.tau;
        if pld <= 0. || t <= att.re() {
            return D::from(0.);
        }
        let scale =
            theta[0].clone() * (-att.clone() / self.t1b).exp() * (2. * self.alpha * self.m0b);
        if t < att.re() + self.tau {
            scale * (D::from(t) - att)
        } else {
            scale * self.tau
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let params = AslParams::default();
    let model = PlugFlow {
        tau: params.tau,
        t1b: params.t1b,
        alpha: params.alpha,
        m0b: params.m0b,
    };
    let scan = Scan::new(300., 5)?;
    let att = AttDistribution::uniform(0.2, 2.0, 0.1)?;
    let limits = Limits::new(0.1, 3.0, 0.05)?;

    let mut optimizer = PldOptimizer::new(params, scan, att, limits)?.with_model(Arc::new(model));
    optimizer.solve();

    println!("{optimizer}");

    Ok(())
}
