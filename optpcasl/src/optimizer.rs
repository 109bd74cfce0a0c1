use crate::{
    AslParams, AttDistribution, Criterion, DOptimality, DesignEvaluator, Error, Evaluation,
    KineticModel, Limits, N_PARAMS, Optimality, PldGrid, Result, Scan,
    error::ensure_range,
    utils::{Combinations, binomial},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::Display,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering as AtomicOrdering},
    },
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// Number of candidates scored in parallel before they are merged into the running best.
const CHUNK_SIZE: usize = 4096;

/// How the PLD combinations are searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Best pair of PLDs, greedy growth to the requested number of PLDs and exchange refinement.
    #[default]
    Greedy,
    /// Scores every strictly increasing combination of grid PLDs.
    Exhaustive,
}

/// Stop criteria and strategy of the PLD search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    /// Maximal number of exchange refinement passes.
    pub max_iter: usize,
    /// Costs with a relative difference below the tolerance are considered equal, ties are won
    /// by the shorter PLDs.
    pub tolerance: f64,
    /// Optional wall-clock limit of the refinement.
    pub max_duration: Option<Duration>,
    /// Search strategy.
    pub strategy: SearchStrategy,
    /// Maximal number of candidates of an exhaustive search.
    pub max_candidates: u128,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tolerance: 1e-9,
            max_duration: None,
            strategy: SearchStrategy::Greedy,
            max_candidates: 5_000_000,
        }
    }
}

/// State of the [PldOptimizer].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    /// Configuration validated, nothing searched yet.
    Initialized,
    /// Search in progress.
    Searching,
    /// No move improves the cost any more.
    Converged,
    /// Iteration or time limit reached, the best schedule found so far is returned.
    Exhausted,
    /// Search stopped by the cancel flag, the best schedule found so far is returned.
    Cancelled,
}

impl Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            Self::Initialized => "initialized",
            Self::Searching => "searching",
            Self::Converged => "converged",
            Self::Exhausted => "exhausted",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{state}")
    }
}

/// Optimized PLD schedule together with the statistics it was selected by.
#[derive(Debug, Clone, PartialEq)]
pub struct PldSchedule {
    /// Strictly increasing PLDs.
    pub plds: Vec<f64>,
    /// Achieved optimality cost.
    pub cost: f64,
    /// Weighted mean variance of the CBF estimate.
    pub var_cbf: f64,
    /// Weighted mean variance of the ATT estimate.
    pub var_att: f64,
    /// Number of protocol repeats that fit into the scan duration.
    pub repeats: usize,
    /// Final state of the search.
    pub status: SearchState,
    /// Number of exchange refinement passes.
    pub iterations: usize,
    /// Number of scored candidates.
    pub evaluations: usize,
}

impl PldSchedule {
    /// Returns true if the search terminated without any improving move left.
    pub fn converged(&self) -> bool {
        self.status == SearchState::Converged
    }
}

impl Display for PldSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: String = self
            .plds
            .iter()
            .enumerate()
            .map(|(i, pld)| format!("{:>3}\t{:.4}s", i + 1, pld))
            .collect::<Vec<String>>()
            .join("\n");
        let header = "No.\tPLD".to_string();
        let stats = [
            format!("Optimality measure: {:.6e}", self.cost),
            format!("var(CBF): {:.6e}", self.var_cbf),
            format!("var(ATT): {:.6e}", self.var_att),
            format!("Repeats: {}", self.repeats),
            format!("Iterations: {}", self.iterations),
            format!("Evaluations: {}", self.evaluations),
            format!("Status: {}", self.status),
        ]
        .join("\n");
        write!(
            f,
            "{:-^28}\n{header}\n{rows}\n{:-^28}\n{stats}\n{:-^28}",
            " PLD Schedule ", " Statistics ", ""
        )
    }
}

#[derive(Clone)]
struct Candidate {
    ids: Vec<usize>,
    evaluation: Evaluation,
}

/// Optimizer of multi-PLD pCASL schedules.
///
/// Searches the strictly increasing sets of `npld` PLDs on the grid of the [Limits] that minimize
/// the weighted mean optimality cost over the ATT distribution. Candidates of one round are
/// scored in parallel, the selection waits for all of them.
///
/// ```
/// use optpcasl::{AslParams, AttDistribution, Limits, PldOptimizer, Result, Scan};
///
/// fn main() -> Result<()> {
///     let params = AslParams::new(0.01)?;
///     let scan = Scan::new(300., 4)?;
///     let att = AttDistribution::new(0.5, 1.5, 0.1, 0.2)?;
///     let limits = Limits::new(0.2, 2.0, 0.1)?;
///     let mut optimizer = PldOptimizer::new(params, scan, att, limits)?;
///     let schedule = optimizer.solve();
///     assert_eq!(schedule.plds.len(), 4);
///     Ok(())
/// }
/// ```
pub struct PldOptimizer {
    params: AslParams,
    scan: Scan,
    att: Arc<AttDistribution>,
    limits: Limits,
    grid: PldGrid,
    optimality: Arc<dyn Optimality + Send + Sync>,
    model: Option<Arc<dyn KineticModel + Send + Sync>>,
    criteria: SearchCriteria,
    cancel: Arc<AtomicBool>,
    state: SearchState,
    schedule: Option<PldSchedule>,
}

impl Display for PldOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.params)?;
        writeln!(f, "{}", self.scan)?;
        writeln!(f, "{}", self.att)?;
        writeln!(f, "{}", self.limits)?;
        write!(f, "Optimality: {}", self.optimality.name())?;
        match &self.schedule {
            Some(schedule) => write!(f, "\n{schedule}"),
            None => write!(f, "\nState: {}", self.state),
        }
    }
}

impl PldOptimizer {
    /// Returns the D-optimal optimizer after validating the configuration.
    pub fn new(
        params: AslParams,
        scan: Scan,
        att: AttDistribution,
        limits: Limits,
    ) -> Result<Self> {
        params.validate()?;
        scan.validate()?;
        limits.validate()?;
        let grid = limits.grid();
        if grid.len() < scan.npld {
            return Err(Error::TooFewGridPoints {
                npld: scan.npld,
                available: grid.len(),
            });
        }
        let shortest = &grid.values()[..scan.npld];
        let required = scan.repeat_time(&params, shortest);
        if required > scan.duration {
            return Err(Error::ScanTooShort {
                duration: scan.duration,
                required,
            });
        }
        Ok(Self {
            params,
            scan,
            att: Arc::new(att),
            limits,
            grid,
            optimality: Arc::new(DOptimality::new()),
            model: None,
            criteria: SearchCriteria::default(),
            cancel: Arc::new(AtomicBool::new(false)),
            state: SearchState::Initialized,
            schedule: None,
        })
    }

    /// Returns the optimizer with given optimality.
    pub fn with_optimality(mut self, optimality: Arc<dyn Optimality + Send + Sync>) -> Self {
        self.optimality = optimality;
        self
    }

    /// Returns the optimizer with the optimality selected by the criterion.
    pub fn with_criterion(mut self, criterion: &Criterion) -> Result<Self> {
        self.optimality = criterion.optimality()?;
        Ok(self)
    }

    /// Returns the optimizer with given kinetic model instead of the Buxton model.
    pub fn with_model(mut self, model: Arc<dyn KineticModel + Send + Sync>) -> Self {
        self.model = Some(model);
        self
    }

    /// Returns the optimizer with given [SearchCriteria].
    pub fn with_criteria(mut self, criteria: SearchCriteria) -> Result<Self> {
        ensure_range("tolerance", criteria.tolerance, 0., 1.)?;
        if criteria.strategy == SearchStrategy::Exhaustive {
            let candidates = binomial(self.grid.len(), self.scan.npld);
            if candidates > criteria.max_candidates {
                return Err(Error::SearchSpaceTooLarge {
                    candidates,
                    max: criteria.max_candidates,
                });
            }
        }
        self.criteria = criteria;
        Ok(self)
    }

    /// Returns the optimizer observing the given flag, setting it stops the search after the
    /// current round.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the flag that cancels the search.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Returns the state of the search.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Returns the schedule of the last search.
    pub fn schedule(&self) -> Option<&PldSchedule> {
        self.schedule.as_ref()
    }

    /// Returns the PLD grid searched over.
    pub fn grid(&self) -> &PldGrid {
        &self.grid
    }

    /// Returns the evaluator scoring the candidates of this optimizer.
    pub fn evaluator(&self) -> DesignEvaluator {
        let evaluator = DesignEvaluator::new(
            &self.params,
            &self.scan,
            self.att.clone(),
            self.optimality.clone(),
        );
        match &self.model {
            Some(model) => evaluator.with_model(model.clone()),
            None => evaluator,
        }
    }

    /// Searches the PLD schedule with the lowest cost. Every call restarts the search from
    /// scratch, so identical configurations yield identical schedules.
    pub fn solve(&mut self) -> &PldSchedule {
        self.state = SearchState::Searching;
        let evaluator = self.evaluator();
        let mut search = Search {
            evaluator: &evaluator,
            grid: &self.grid,
            criteria: &self.criteria,
            cancel: &self.cancel,
            start: Instant::now(),
            stopped: None,
            evaluations: 0,
            iterations: 0,
        };
        info!(
            optimality = self.optimality.name(),
            npld = self.scan.npld,
            grid = self.grid.len(),
            att_samples = self.att.len(),
            "searching PLD schedule"
        );
        let (best, status) = match self.criteria.strategy {
            SearchStrategy::Greedy => search.greedy(self.scan.npld),
            SearchStrategy::Exhaustive => search.exhaustive(self.scan.npld),
        };
        match status {
            SearchState::Converged => info!(
                cost = best.evaluation.cost,
                iterations = search.iterations,
                "PLD search converged"
            ),
            _ => warn!(
                cost = best.evaluation.cost,
                iterations = search.iterations,
                %status,
                "PLD search stopped before convergence, returning best schedule so far"
            ),
        }
        self.state = status;
        let schedule = PldSchedule {
            plds: self.grid.plds(&best.ids),
            cost: best.evaluation.cost,
            var_cbf: best.evaluation.var_cbf,
            var_att: best.evaluation.var_att,
            repeats: best.evaluation.repeats,
            status,
            iterations: search.iterations,
            evaluations: search.evaluations,
        };
        self.schedule.insert(schedule)
    }
}

struct Search<'a> {
    evaluator: &'a DesignEvaluator,
    grid: &'a PldGrid,
    criteria: &'a SearchCriteria,
    cancel: &'a AtomicBool,
    start: Instant,
    stopped: Option<SearchState>,
    evaluations: usize,
    iterations: usize,
}

impl Search<'_> {
    /// Returns the state the search has to stop in, if cancelled or out of time.
    fn interrupted(&self) -> Option<SearchState> {
        if self.cancel.load(AtomicOrdering::Acquire) {
            return Some(SearchState::Cancelled);
        }
        let timed_out = self
            .criteria
            .max_duration
            .is_some_and(|max| self.start.elapsed() >= max);
        timed_out.then_some(SearchState::Exhausted)
    }

    fn greedy(&mut self, npld: usize) -> (Candidate, SearchState) {
        let seed_size = npld.min(N_PARAMS);
        let first = self.score((0..seed_size).collect());
        let seeds = Combinations::new(self.grid.len(), seed_size).skip(1);
        let mut best = self.select(seeds, first);
        if let Some(state) = self.stopped {
            return (best, state);
        }
        debug!(plds = ?best.ids, cost = best.evaluation.cost, "seed selected");

        while best.ids.len() < npld {
            if let Some(state) = self.interrupted() {
                return (best, state);
            }
            let candidates: Vec<Vec<usize>> = (0..self.grid.len())
                .filter(|id| !best.ids.contains(id))
                .map(|id| {
                    let mut ids = best.ids.clone();
                    let pos = ids.partition_point(|&i| i < id);
                    ids.insert(pos, id);
                    ids
                })
                .collect();
            let mut candidates = candidates.into_iter();
            let Some(first) = candidates.next() else {
                break;
            };
            let first = self.score(first);
            best = self.select(candidates, first);
            if let Some(state) = self.stopped {
                // best extension among the candidates scored before the interruption
                return (best, state);
            }
            debug!(
                plds = best.ids.len(),
                cost = best.evaluation.cost,
                "greedy round finished"
            );
        }

        loop {
            if let Some(state) = self.interrupted() {
                return (best, state);
            }
            if self.iterations >= self.criteria.max_iter {
                return (best, SearchState::Exhausted);
            }
            self.iterations += 1;
            let mut candidates = exchanges(&best.ids, self.grid.len())
                .collect::<Vec<Vec<usize>>>()
                .into_iter();
            let Some(first) = candidates.next() else {
                return (best, SearchState::Converged);
            };
            let first = self.score(first);
            let candidate = self.select(candidates, first);
            if rank(&candidate.evaluation, &best.evaluation, self.criteria.tolerance)
                == Ordering::Less
            {
                debug!(
                    iteration = self.iterations,
                    cost = candidate.evaluation.cost,
                    "exchange accepted"
                );
                best = candidate;
            } else if self.stopped.is_none() {
                return (best, SearchState::Converged);
            }
            if let Some(state) = self.stopped {
                return (best, state);
            }
        }
    }

    fn exhaustive(&mut self, npld: usize) -> (Candidate, SearchState) {
        self.iterations = 1;
        let first = self.score((0..npld).collect());
        let combinations = Combinations::new(self.grid.len(), npld).skip(1);
        let best = self.select(combinations, first);
        let state = self.stopped.unwrap_or(SearchState::Converged);
        (best, state)
    }

    fn score(&mut self, ids: Vec<usize>) -> Candidate {
        self.evaluations += 1;
        let evaluation = self.evaluator.evaluate(&self.grid.plds(&ids));
        Candidate { ids, evaluation }
    }

    /// Scores the candidates chunk by chunk in parallel and folds them in candidate order into
    /// the best one. Stops between chunks when interrupted and records why.
    fn select(
        &mut self,
        candidates: impl Iterator<Item = Vec<usize>>,
        mut best: Candidate,
    ) -> Candidate {
        let (evaluator, grid) = (self.evaluator, self.grid);
        let tolerance = self.criteria.tolerance;
        let mut candidates = candidates.peekable();
        while candidates.peek().is_some() {
            if let Some(state) = self.interrupted() {
                self.stopped = Some(state);
                break;
            }
            let chunk: Vec<Vec<usize>> = candidates.by_ref().take(CHUNK_SIZE).collect();
            self.evaluations += chunk.len();
            let scored: Vec<Candidate> = chunk
                .into_par_iter()
                .map(|ids| {
                    let evaluation = evaluator.evaluate(&grid.plds(&ids));
                    Candidate { ids, evaluation }
                })
                .collect();
            for candidate in scored {
                if prefer(&candidate, &best, tolerance) {
                    best = candidate;
                }
            }
        }
        best
    }
}

/// Candidates that replace one chosen PLD by an unused grid value, kept strictly increasing.
fn exchanges(ids: &[usize], grid_len: usize) -> impl Iterator<Item = Vec<usize>> + '_ {
    (0..ids.len()).flat_map(move |pos| {
        (0..grid_len)
            .filter(move |id| !ids.contains(id))
            .map(move |id| {
                let mut next: Vec<usize> = ids.to_vec();
                next.remove(pos);
                let insert = next.partition_point(|&i| i < id);
                next.insert(insert, id);
                next
            })
    })
}

/// Orders evaluations, less is better. Designs identifying the parameters for more ATT weight
/// come first, then lower costs. Costs within the relative tolerance are equal.
fn rank(a: &Evaluation, b: &Evaluation, tolerance: f64) -> Ordering {
    if (a.singular_weight - b.singular_weight).abs() > 1e-12 {
        return a.singular_weight.total_cmp(&b.singular_weight);
    }
    let (ca, cb) = (a.partial_cost, b.partial_cost);
    match (ca.is_finite(), cb.is_finite()) {
        (false, false) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => {
            if (ca - cb).abs() <= tolerance * ca.abs().max(cb.abs()) {
                Ordering::Equal
            } else {
                ca.total_cmp(&cb)
            }
        }
    }
}

/// True if `candidate` should replace `current`: better rank, or equal rank with shorter PLDs.
fn prefer(candidate: &Candidate, current: &Candidate, tolerance: f64) -> bool {
    match rank(&candidate.evaluation, &current.evaluation, tolerance) {
        Ordering::Less => true,
        Ordering::Greater => false,
        // grid indices are proportional to the PLDs
        Ordering::Equal => {
            candidate.ids.iter().sum::<usize>() < current.ids.iter().sum::<usize>()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LOptimality;

    fn evaluation(cost: f64, singular_weight: f64) -> Evaluation {
        Evaluation {
            cost: if singular_weight > 0. { f64::INFINITY } else { cost },
            var_cbf: 0.,
            var_att: 0.,
            repeats: 1,
            singular_weight,
            partial_cost: cost,
        }
    }

    fn optimizer(npld: usize, limits: Limits) -> Result<PldOptimizer> {
        let params = AslParams::default();
        let scan = Scan::new(300., npld)?;
        let att = AttDistribution::new(0.5, 1.5, 0.1, 0.2)?;
        PldOptimizer::new(params, scan, att, limits)
    }

    #[test]
    fn ranking() -> Result<()> {
        let tol = 1e-6;
        assert_eq!(rank(&evaluation(1., 0.), &evaluation(2., 0.), tol), Ordering::Less);
        assert_eq!(rank(&evaluation(2., 0.), &evaluation(1., 0.), tol), Ordering::Greater);
        assert_eq!(
            rank(&evaluation(1., 0.), &evaluation(1. + 1e-9, 0.), tol),
            Ordering::Equal
        );
        // identifying more samples beats a lower partial cost
        assert_eq!(rank(&evaluation(5., 0.), &evaluation(1., 1.), tol), Ordering::Less);
        assert_eq!(
            rank(&evaluation(f64::INFINITY, 2.), &evaluation(f64::INFINITY, 2.), tol),
            Ordering::Equal
        );
        assert_eq!(
            rank(&evaluation(1., 2.), &evaluation(f64::INFINITY, 2.), tol),
            Ordering::Less
        );
        Ok(())
    }

    #[test]
    fn tie_break_prefers_shorter_plds() -> Result<()> {
        let long = Candidate {
            ids: vec![3, 7],
            evaluation: evaluation(1., 0.),
        };
        let short = Candidate {
            ids: vec![1, 7],
            evaluation: evaluation(1. + 1e-12, 0.),
        };
        assert!(prefer(&short, &long, 1e-9));
        assert!(!prefer(&long, &short, 1e-9));
        let better = Candidate {
            ids: vec![5, 9],
            evaluation: evaluation(0.5, 0.),
        };
        assert!(prefer(&better, &short, 1e-9));
        Ok(())
    }

    #[test]
    fn exchange_candidates() -> Result<()> {
        let ids = vec![0, 2];
        let candidates: Vec<Vec<usize>> = exchanges(&ids, 4).collect();
        assert_eq!(
            candidates,
            vec![vec![1, 2], vec![2, 3], vec![0, 1], vec![0, 3]]
        );
        assert!(candidates.iter().all(|c| c.windows(2).all(|w| w[0] < w[1])));
        assert_eq!(exchanges(&[0, 1, 2], 3).count(), 0);
        Ok(())
    }

    #[test]
    fn initialization_errors() -> Result<()> {
        let opt = optimizer(2, Limits::new(1.0, 1.0, 0.1)?);
        assert_eq!(
            opt.err(),
            Some(Error::TooFewGridPoints {
                npld: 2,
                available: 1
            })
        );

        let params = AslParams::default();
        let scan = Scan::new(20., 6)?;
        let att = AttDistribution::uniform(0.5, 1.5, 0.1)?;
        let opt = PldOptimizer::new(params, scan, att, Limits::new(0.1, 3.0, 0.1)?);
        assert!(matches!(opt.err(), Some(Error::ScanTooShort { .. })));

        let params = AslParams::default();
        let scan = Scan {
            npld: 1,
            ..Scan::default()
        };
        let att = AttDistribution::uniform(0.5, 1.5, 0.1)?;
        let opt = PldOptimizer::new(params, scan, att, Limits::default());
        assert_eq!(opt.err(), Some(Error::TooFewPlds { npld: 1, min: 2 }));
        Ok(())
    }

    #[test]
    fn criteria_errors() -> Result<()> {
        let criteria = SearchCriteria {
            strategy: SearchStrategy::Exhaustive,
            ..SearchCriteria::default()
        };
        let opt = optimizer(6, Limits::new(0.1, 3.0, 0.025)?)?.with_criteria(criteria);
        assert!(matches!(opt.err(), Some(Error::SearchSpaceTooLarge { .. })));

        let criteria = SearchCriteria {
            tolerance: -1.,
            ..SearchCriteria::default()
        };
        let opt = optimizer(3, Limits::default())?.with_criteria(criteria);
        assert!(opt.is_err());
        Ok(())
    }

    #[test]
    fn state_machine() -> Result<()> {
        let mut opt = optimizer(3, Limits::new(0.2, 2.0, 0.1)?)?;
        assert_eq!(opt.state(), SearchState::Initialized);
        assert!(opt.schedule().is_none());
        let schedule = opt.solve().clone();
        assert_eq!(schedule.status, SearchState::Converged);
        assert_eq!(opt.state(), SearchState::Converged);
        assert_eq!(opt.schedule(), Some(&schedule));
        Ok(())
    }

    #[test]
    fn iteration_cap_exhausts() -> Result<()> {
        let criteria = SearchCriteria {
            max_iter: 0,
            ..SearchCriteria::default()
        };
        let mut opt = optimizer(4, Limits::new(0.2, 2.0, 0.1)?)?.with_criteria(criteria)?;
        let schedule = opt.solve();
        assert_eq!(schedule.status, SearchState::Exhausted);
        assert!(!schedule.converged());
        assert_eq!(schedule.plds.len(), 4);
        assert!(schedule.cost.is_finite());
        Ok(())
    }

    #[test]
    fn cancelled_search() -> Result<()> {
        let cancel = Arc::new(AtomicBool::new(true));
        let mut opt = optimizer(4, Limits::new(0.2, 2.0, 0.1)?)?.with_cancel_flag(cancel);
        let schedule = opt.solve();
        assert_eq!(schedule.status, SearchState::Cancelled);
        // only the first seed pair was scored
        assert_eq!(schedule.plds.len(), N_PARAMS);
        assert_eq!(schedule.evaluations, 1);
        assert_eq!(opt.state(), SearchState::Cancelled);
        Ok(())
    }

    #[test]
    fn time_cap_covers_seed_round() -> Result<()> {
        let criteria = SearchCriteria {
            max_duration: Some(Duration::ZERO),
            ..SearchCriteria::default()
        };
        let mut opt = optimizer(4, Limits::new(0.2, 2.0, 0.1)?)?.with_criteria(criteria.clone())?;
        let schedule = opt.solve();
        assert_eq!(schedule.status, SearchState::Exhausted);
        assert_eq!(schedule.evaluations, 1);
        assert_eq!(schedule.plds.len(), N_PARAMS);

        let criteria = SearchCriteria {
            strategy: SearchStrategy::Exhaustive,
            ..criteria
        };
        let mut opt = optimizer(3, Limits::new(0.2, 2.0, 0.1)?)?.with_criteria(criteria)?;
        let schedule = opt.solve();
        assert_eq!(schedule.status, SearchState::Exhausted);
        assert_eq!(schedule.evaluations, 1);
        assert_eq!(schedule.plds.len(), 3);
        Ok(())
    }

    #[test]
    fn l_optimal_search() -> Result<()> {
        let mut opt = optimizer(3, Limits::new(0.2, 2.0, 0.1)?)?
            .with_optimality(Arc::new(LOptimality::att()));
        let schedule = opt.solve().clone();
        assert!(schedule.converged());
        assert!(schedule.cost.is_finite());
        assert!((schedule.cost - schedule.var_att).abs() <= 1e-12 * schedule.cost);
        let evaluator = opt.evaluator();
        assert_eq!(evaluator.cost(&schedule.plds), schedule.cost);
        Ok(())
    }

    #[test]
    fn display() -> Result<()> {
        let schedule = PldSchedule {
            plds: vec![0.5, 1.25],
            cost: 1.5e-4,
            var_cbf: 2e-7,
            var_att: 3e-3,
            repeats: 25,
            status: SearchState::Converged,
            iterations: 2,
            evaluations: 120,
        };
        assert_eq!(
            format!("{schedule}"),
            "------- PLD Schedule -------\n\
            No.\tPLD\n  \
            1\t0.5000s\n  \
            2\t1.2500s\n\
            -------- Statistics --------\n\
            Optimality measure: 1.500000e-4\n\
            var(CBF): 2.000000e-7\n\
            var(ATT): 3.000000e-3\n\
            Repeats: 25\n\
            Iterations: 2\n\
            Evaluations: 120\n\
            Status: converged\n\
            ----------------------------"
                .to_string()
        );
        Ok(())
    }
}
