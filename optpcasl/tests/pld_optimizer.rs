use optpcasl::{
    AslParams, AttDistribution, Combinations, Criterion, DOptimality, Error, LOptimality, Limits,
    PldOptimizer, Result, Scan, SearchCriteria, SearchState, SearchStrategy, binomial,
};
use serde::Deserialize;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

fn scenario(npld: usize, limits: Limits) -> Result<PldOptimizer> {
    let params = AslParams::default();
    let scan = Scan::new(300., npld)?;
    let att = AttDistribution::uniform(0.2, 2.0, 0.1)?;
    PldOptimizer::new(params, scan, att, limits)
}

fn assert_valid_schedule(plds: &[f64], npld: usize, limits: &Limits) {
    assert_eq!(plds.len(), npld);
    assert!(plds.windows(2).all(|w| w[0] < w[1]));
    assert!(
        plds.iter()
            .all(|&p| p >= limits.lb - 1e-9 && p <= limits.ub + 1e-9)
    );
}

#[test]
fn test_d_opt_six_plds() -> Result<()> {
    let limits = Limits::new(0.1, 3.0, 0.1)?;
    let mut optimizer = scenario(6, limits.clone())?;
    let schedule = optimizer.solve();

    assert_valid_schedule(&schedule.plds, 6, &limits);
    assert!(schedule.cost.is_finite());
    assert!(schedule.cost > 0.);
    assert!(schedule.repeats > 0);
    assert!(schedule.converged());
    // every PLD lies on the grid
    for pld in &schedule.plds {
        let steps = (pld - limits.lb) / limits.step;
        assert!((steps - steps.round()).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn test_single_grid_point() -> Result<()> {
    let params = AslParams::default();
    let scan = Scan::new(300., 2)?;
    let att = AttDistribution::uniform(0.2, 2.0, 0.1)?;
    let limits = Limits::new(1.0, 1.0, 0.1)?;
    let optimizer = PldOptimizer::new(params, scan, att, limits);
    let err = optimizer.err();
    assert_eq!(
        err,
        Some(Error::TooFewGridPoints {
            npld: 2,
            available: 1
        })
    );
    assert!(err.is_some_and(|e| e.is_configuration()));
    Ok(())
}

#[test]
fn test_deterministic() -> Result<()> {
    let limits = Limits::new(0.1, 3.0, 0.1)?;
    let mut optimizer =
        scenario(5, limits.clone())?.with_optimality(Arc::new(DOptimality::new()));
    let first = optimizer.solve().clone();
    let second = optimizer.solve().clone();
    assert_eq!(first, second);

    let mut other = scenario(5, limits)?;
    assert_eq!(other.solve(), &first);
    Ok(())
}

#[test]
fn test_greedy_matches_exhaustive() -> Result<()> {
    // PLD 0.1s is still within the inflow of the earliest ATTs
    let limits = Limits::new(0.1, 1.7, 0.2)?;
    let mut greedy = scenario(3, limits.clone())?;
    let greedy = greedy.solve().clone();

    let criteria = SearchCriteria {
        strategy: SearchStrategy::Exhaustive,
        ..SearchCriteria::default()
    };
    let mut exhaustive = scenario(3, limits.clone())?.with_criteria(criteria)?;
    let exhaustive = exhaustive.solve().clone();

    assert_valid_schedule(&exhaustive.plds, 3, &limits);
    assert_eq!(exhaustive.status, SearchState::Converged);
    // 9 choose 3 candidates
    assert_eq!(exhaustive.evaluations, 84);
    assert!(exhaustive.cost.is_finite());
    assert!(exhaustive.cost <= greedy.cost * (1. + 1e-6));
    Ok(())
}

#[test]
fn test_l_opt_att() -> Result<()> {
    let limits = Limits::new(0.1, 3.0, 0.1)?;
    let mut l_opt = scenario(4, limits.clone())?.with_optimality(Arc::new(LOptimality::att()));
    let l_schedule = l_opt.solve().clone();

    assert_valid_schedule(&l_schedule.plds, 4, &limits);
    assert!(l_schedule.converged());
    // ATT weighting reduces the cost to the mean ATT variance
    assert!((l_schedule.cost - l_schedule.var_att).abs() <= 1e-12 * l_schedule.cost);
    assert_eq!(l_opt.evaluator().cost(&l_schedule.plds), l_schedule.cost);
    Ok(())
}

#[test]
fn test_multi_slice() -> Result<()> {
    let params = AslParams::default();
    let scan = Scan::new(300., 4)?.with_slices(3, 0.0452);
    let att = AttDistribution::new(0.2, 2.0, 0.1, 0.3)?;
    let limits = Limits::new(0.1, 2.5, 0.1)?;
    let mut optimizer = PldOptimizer::new(params, scan, att, limits.clone())?;
    let schedule = optimizer.solve();
    assert_valid_schedule(&schedule.plds, 4, &limits);
    assert!(schedule.cost.is_finite());
    Ok(())
}

#[derive(Deserialize)]
struct Config {
    params: AslParams,
    scan: Scan,
    limits: Limits,
    criterion: Criterion,
    criteria: SearchCriteria,
}

#[test]
fn test_config_from_json() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let json = r#"{
        "params": { "f": 0.00833, "noise": 0.002 },
        "scan": { "duration": 300.0, "npld": 3 },
        "limits": { "lb": 0.2, "ub": 2.0, "step": 0.2 },
        "criterion": { "LOptimal": { "weights": [[0.0, 0.0], [0.0, 1.0]] } },
        "criteria": { "strategy": "Exhaustive", "max_iter": 10 }
    }"#;
    let config: Config = serde_json::from_str(json)?;
    assert_eq!(config.scan.readout, 0.5);
    assert_eq!(config.params.tau, AslParams::default().tau);
    assert_eq!(config.criterion, Criterion::l_optimal());
    assert_eq!(config.criteria.tolerance, SearchCriteria::default().tolerance);

    let att = AttDistribution::uniform(0.5, 1.5, 0.1)?;
    let mut optimizer = PldOptimizer::new(config.params, config.scan, att, config.limits)?
        .with_criterion(&config.criterion)?
        .with_criteria(config.criteria)?;
    let schedule = optimizer.solve();
    assert_eq!(schedule.plds.len(), 3);
    assert!(schedule.converged());
    Ok(())
}

#[test]
fn test_cancel() -> Result<()> {
    let limits = Limits::new(0.1, 3.0, 0.1)?;
    let cancel = Arc::new(AtomicBool::new(false));
    let mut optimizer = scenario(6, limits)?.with_cancel_flag(cancel.clone());
    cancel.store(true, Ordering::Release);
    let schedule = optimizer.solve();
    assert_eq!(schedule.status, SearchState::Cancelled);
    assert!(!schedule.plds.is_empty());
    assert!(schedule.plds.windows(2).all(|w| w[0] < w[1]));

    // a cleared flag allows the next search to finish
    optimizer.cancel_flag().store(false, Ordering::Release);
    assert!(optimizer.solve().converged());
    Ok(())
}

#[test]
fn test_unidentifiable_search_space() -> Result<()> {
    // for ATT 0.2s every PLD >= 0.2s samples the decay only
    let limits = Limits::new(0.2, 1.8, 0.2)?;
    let criteria = SearchCriteria {
        strategy: SearchStrategy::Exhaustive,
        ..SearchCriteria::default()
    };
    let mut optimizer = scenario(3, limits.clone())?.with_criteria(criteria)?;
    let schedule = optimizer.solve().clone();
    assert_eq!(schedule.cost, f64::INFINITY);
    assert_eq!(schedule.status, SearchState::Converged);
    assert_valid_schedule(&schedule.plds, 3, &limits);

    // no other candidate leaves less ATT weight unidentified
    let evaluator = optimizer.evaluator();
    let best = evaluator.evaluate(&schedule.plds);
    assert!(best.singular_weight > 0.);
    assert!(best.partial_cost.is_finite());
    let grid = optimizer.grid();
    for ids in Combinations::new(grid.len(), 3) {
        let evaluation = evaluator.evaluate(&grid.plds(&ids));
        assert_eq!(evaluation.cost, f64::INFINITY);
        assert!(evaluation.singular_weight >= best.singular_weight - 1e-12);
    }
    Ok(())
}

#[test]
fn test_time_cap_bounds_search() -> Result<()> {
    let limits = Limits::new(0.1, 3.0, 0.005)?;
    let criteria = SearchCriteria {
        max_duration: Some(Duration::from_millis(10)),
        ..SearchCriteria::default()
    };
    let mut optimizer = scenario(6, limits)?.with_criteria(criteria)?;
    let seed_pairs = binomial(optimizer.grid().len(), 2) as usize;
    let started = Instant::now();
    let schedule = optimizer.solve();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(schedule.status, SearchState::Exhausted);
    // stopped before all seed pairs were scored
    assert!(schedule.evaluations < seed_pairs);
    assert!(schedule.plds.windows(2).all(|w| w[0] < w[1]));
    Ok(())
}
