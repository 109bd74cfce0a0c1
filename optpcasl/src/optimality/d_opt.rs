use crate::Optimality;
use faer::Mat;

#[cfg_attr(doc, katexit::katexit)]
/// D-Optimality is defined as the determinant of the parameter covariance, i.e. the generalized
/// variance.
///
/// $$ D_{opt} := \det \mathcal{M}^{-1} $$
///
/// with fisher-information matrix $\mathcal{M}$. Minimizing it minimizes the volume of the
/// confidence ellipsoid of (CBF, ATT).
#[derive(Debug, Clone, Default)]
pub struct DOptimality {}

impl DOptimality {
    /// Instantizes [DOptimality]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Optimality for DOptimality {
    fn cost(&self, cov: &Mat<f64>) -> f64 {
        cov.determinant()
    }

    fn name(&self) -> &'static str {
        "D-optimal"
    }
}
