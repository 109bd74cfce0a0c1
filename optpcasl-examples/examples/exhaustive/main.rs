use optpcasl::{
    AslParams, AttDistribution, Limits, PldOptimizer, Result, Scan, SearchCriteria, SearchStrategy,
};
use tracing_subscriber::EnvFilter;

// compares the greedy search with scoring every PLD combination
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let params = AslParams::default();
    let scan = Scan::new(300., 4)?;
    let att = AttDistribution::uniform(0.2, 2.0, 0.1)?;
    let limits = Limits::new(0.1, 3.0, 0.1)?;

    let mut greedy = PldOptimizer::new(params.clone(), scan.clone(), att.clone(), limits.clone())?;
    let criteria = SearchCriteria {
        strategy: SearchStrategy::Exhaustive,
        ..SearchCriteria::default()
    };
    let mut exhaustive = PldOptimizer::new(params, scan, att, limits)?.with_criteria(criteria)?;

    println!("Greedy\n{}", greedy.solve());
    println!("Exhaustive\n{}", exhaustive.solve());

    Ok(())
}
