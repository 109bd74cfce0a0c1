use optpcasl::{AslParams, AttDistribution, Limits, PldOptimizer, Result, Scan};
use tracing::info;
use tracing_subscriber::EnvFilter;

// D-optimal 6 PLD schedule for a 5 minute 3D scan
fn main() -> Result<()> {
    // set RUST_LOG=debug to follow the search
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // tissue and acquisition parameters
    let params = AslParams::default();
    // 300s 3D scan with 6 PLDs
    let scan = Scan::new(300., 6)?;
    // plausible ATTs between 0.2s and 2.0s, equally weighted
    let att = AttDistribution::uniform(0.2, 2.0, 0.1)?;
    // admissible PLDs
    let limits = Limits::new(0.1, 3.0, 0.025)?;

    let mut optimizer = PldOptimizer::new(params, scan, att, limits)?;

    // find optimal schedule
    // get schedule by: let schedule = optimizer.solve();
    // or: let schedule = optimizer.schedule();
    optimizer.solve();

    // display configuration and optimal schedule
    println!("{optimizer}");
    if let Some(schedule) = optimizer.schedule() {
        info!(plds = ?schedule.plds, repeats = schedule.repeats, "optimal PLDs");
    }

    Ok(())
}
