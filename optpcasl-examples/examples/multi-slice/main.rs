use optpcasl::{AslParams, AttDistribution, Limits, PldOptimizer, Result, Scan, SearchCriteria};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// 2D multi-slice acquisition: later slices are read out with longer effective PLDs
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let params = AslParams::default();
    let scan = Scan::new(300., 6)?.with_slices(20, 0.0452).with_readout(0.3);
    let att = AttDistribution::uniform(0.2, 2.0, 0.1)?;
    let limits = Limits::new(0.1, 2.5, 0.025)?;

    // stop refining after 10 seconds with the best schedule so far
    let criteria = SearchCriteria {
        max_duration: Some(Duration::from_secs(10)),
        ..SearchCriteria::default()
    };
    let mut optimizer = PldOptimizer::new(params, scan, att, limits)?.with_criteria(criteria)?;
    optimizer.solve();

    println!("{optimizer}");

    Ok(())
}
