use crate::{Error, N_PARAMS, Optimality, Result};
use faer::Mat;
use faer_ext::IntoFaer;
use nalgebra::DMatrix;

#[cfg_attr(doc, katexit::katexit)]
/// L-Optimality
///
/// L-Optimal Design is defined as a weighted linear combination of the parameter variances
///
/// $$ L_{opt} := \text{tr}(A \mathcal{M}^{-1}) $$
///
/// with weighting matrix $A$ over (CBF, ATT). The default $A = \text{diag}(0, 1)$ minimizes the
/// variance of the ATT estimate, which is the harder target of a multi-PLD acquisition.
#[derive(Debug, Clone)]
pub struct LOptimality {
    a: Mat<f64>,
}

impl Default for LOptimality {
    fn default() -> Self {
        Self::att()
    }
}

impl LOptimality {
    /// Weighting matrix of [LOptimality::att].
    pub const ATT_WEIGHTS: [[f64; N_PARAMS]; N_PARAMS] = [[0., 0.], [0., 1.]];
    /// Weighting matrix of [LOptimality::cbf].
    pub const CBF_WEIGHTS: [[f64; N_PARAMS]; N_PARAMS] = [[1., 0.], [0., 0.]];

    /// Instantizes [LOptimality] with a 2x2 weighting matrix over (CBF, ATT).
    pub fn new(a: DMatrix<f64>) -> Result<Self> {
        if a.shape() != (N_PARAMS, N_PARAMS) {
            return Err(Error::ShapeMismatch {
                mat1: "a",
                mat2: "cov",
                shape1: a.shape(),
                shape2: (N_PARAMS, N_PARAMS),
            });
        }
        if let Some(&value) = a.iter().find(|v| !v.is_finite()) {
            return Err(Error::OutOfRange {
                field: "a",
                value,
                min: f64::MIN,
                max: f64::MAX,
            });
        }
        let a = a.view_range(.., ..).into_faer().to_owned();
        Ok(Self { a })
    }

    /// Minimizes the ATT variance only.
    pub fn att() -> Self {
        Self::from_weights(Self::ATT_WEIGHTS)
    }

    /// Minimizes the CBF variance only.
    pub fn cbf() -> Self {
        Self::from_weights(Self::CBF_WEIGHTS)
    }

    fn from_weights(weights: [[f64; N_PARAMS]; N_PARAMS]) -> Self {
        Self {
            a: Mat::from_fn(N_PARAMS, N_PARAMS, |i, j| weights[i][j]),
        }
    }
}

impl Optimality for LOptimality {
    fn cost(&self, cov: &Mat<f64>) -> f64 {
        (&self.a * cov).diagonal().column_vector().sum()
    }

    fn name(&self) -> &'static str {
        "L-optimal"
    }
}
