#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![doc = include_str!("../../README.md")]
mod att_dist;
mod error;
mod evaluator;
mod kinetic;
mod optimality;
mod optimizer;
mod params;
mod scan;
mod utils;

pub use att_dist::AttDistribution;
pub use error::{Error, Result};
pub use evaluator::{DesignEvaluator, Evaluation};
pub use kinetic::{BuxtonModel, KineticModel, SignalFunction};
pub use optimality::{Criterion, DOptimality, LOptimality, Optimality};
pub use optimizer::{PldOptimizer, PldSchedule, SearchCriteria, SearchState, SearchStrategy};
pub use optpcasl_derive::KineticModel;
pub use params::{AslParams, N_PARAMS};
pub use scan::{Limits, PldGrid, Scan};
pub use utils::{Combinations, binomial};
