use optpcasl::{AslParams, AttDistribution, Criterion, Limits, PldOptimizer, Result, Scan};
use tracing_subscriber::EnvFilter;

// PLDs minimizing the ATT variance only, the L-optimality with weights diag(0, 1)
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let params = AslParams::new(0.00833)?.with_noise(0.001);
    let scan = Scan::new(300., 5)?;
    // ATT weights decrease linearly within 0.3s of both ends
    let att = AttDistribution::new(0.5, 2.0, 0.05, 0.3)?;
    let limits = Limits::new(0.1, 3.0, 0.05)?;

    let mut optimizer =
        PldOptimizer::new(params, scan, att, limits)?.with_criterion(&Criterion::l_optimal())?;
    let schedule = optimizer.solve();

    println!("{schedule}");
    println!(
        "std(ATT): {:.4}s, std(CBF): {:.6}",
        schedule.var_att.sqrt(),
        schedule.var_cbf.sqrt()
    );

    Ok(())
}
