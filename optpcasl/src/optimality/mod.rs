mod d_opt;
mod l_opt;
use crate::{N_PARAMS, Result};
pub use d_opt::DOptimality;
use faer::Mat;
pub use l_opt::LOptimality;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reduces the parameter covariance of a design to a scalar cost. Lower costs are better.
pub trait Optimality {
    /// Returns the cost of the covariance matrix `cov` of the (CBF, ATT) estimates.
    fn cost(&self, cov: &Mat<f64>) -> f64;
    /// Short name of the optimality.
    fn name(&self) -> &'static str;
}

/// Selects the optimality criterion, e.g. from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    /// Minimize the generalized variance.
    #[default]
    DOptimal,
    /// Minimize a weighted combination of the parameter variances.
    LOptimal {
        /// Row-major weighting matrix over (CBF, ATT).
        weights: [[f64; N_PARAMS]; N_PARAMS],
    },
}

impl Criterion {
    /// Returns the L-optimal criterion with the default weighting matrix.
    pub fn l_optimal() -> Self {
        Self::LOptimal {
            weights: LOptimality::ATT_WEIGHTS,
        }
    }

    /// Builds the optimality selected by the criterion.
    pub fn optimality(&self) -> Result<Arc<dyn Optimality + Send + Sync>> {
        match self {
            Self::DOptimal => Ok(Arc::new(DOptimality::new())),
            Self::LOptimal { weights } => {
                let a = DMatrix::from_fn(N_PARAMS, N_PARAMS, |i, j| weights[i][j]);
                Ok(Arc::new(LOptimality::new(a)?))
            }
        }
    }
}
