use crate::{AslParams, AttDistribution, BuxtonModel, KineticModel, N_PARAMS, Optimality, Scan};
use faer::{Mat, Side, linalg::solvers::DenseSolveCore};
use std::{fmt::Display, sync::Arc};

/// Relative determinant threshold below which a fisher-information matrix counts as singular.
const SINGULAR_TOL: f64 = 1e-12;

/// Outcome of scoring one candidate PLD set over the ATT distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Weighted mean optimality cost, infinite if any ATT sample yields a singular design.
    pub cost: f64,
    /// Weighted mean variance of the CBF estimate.
    pub var_cbf: f64,
    /// Weighted mean variance of the ATT estimate.
    pub var_att: f64,
    /// Number of protocol repeats that fit into the scan duration.
    pub repeats: usize,
    /// Summed weight of ATT samples for which the design is singular.
    pub singular_weight: f64,
    /// Weighted mean cost over the non-singular ATT samples only.
    pub partial_cost: f64,
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cost={:.6e} var(CBF)={:.6e} var(ATT)={:.6e} repeats={}",
            self.cost, self.var_cbf, self.var_att, self.repeats
        )
    }
}

impl Evaluation {
    fn infeasible(repeats: usize, total_weight: f64) -> Self {
        Self {
            cost: f64::INFINITY,
            var_cbf: f64::INFINITY,
            var_att: f64::INFINITY,
            repeats,
            singular_weight: total_weight,
            partial_cost: f64::INFINITY,
        }
    }

    /// Returns true if the design identifies CBF and ATT for every ATT sample.
    pub fn is_finite(&self) -> bool {
        self.cost.is_finite()
    }
}

#[cfg_attr(doc, katexit::katexit)]
/// Scores candidate PLD sets by the expected precision of the (CBF, ATT) estimates.
///
/// For every ATT sample the jacobian $J$ of the signals at all PLDs with respect to (CBF, ATT)
/// builds the fisher-information matrix $\mathcal{M} = n J^T J / \sigma^2$ with $n$ protocol
/// repeats and noise $\sigma$. The optimality reduces the covariance $\mathcal{M}^{-1}$ to a cost
/// which is averaged with the ATT weights. Evaluation is pure and deterministic.
pub struct DesignEvaluator {
    params: AslParams,
    scan: Scan,
    att: Arc<AttDistribution>,
    model: Arc<dyn KineticModel + Send + Sync>,
    optimality: Arc<dyn Optimality + Send + Sync>,
}

impl DesignEvaluator {
    /// Creates the evaluator with the [BuxtonModel] built from the parameters.
    pub fn new(
        params: &AslParams,
        scan: &Scan,
        att: Arc<AttDistribution>,
        optimality: Arc<dyn Optimality + Send + Sync>,
    ) -> Self {
        Self {
            params: params.clone(),
            scan: scan.clone(),
            att,
            model: Arc::new(BuxtonModel::new(params)),
            optimality,
        }
    }

    /// Returns the evaluator with given kinetic model.
    pub fn with_model(mut self, model: Arc<dyn KineticModel + Send + Sync>) -> Self {
        self.model = model;
        self
    }

    /// Returns the optimality the costs are computed with.
    pub fn optimality(&self) -> &Arc<dyn Optimality + Send + Sync> {
        &self.optimality
    }

    /// Returns the transposed jacobian $J^T \in \mathbb R^{2 \times |PLD|}$, where column $i$
    /// holds the gradient of the signal at the i-th PLD with respect to (CBF, ATT).
    pub fn jac_t(&self, plds: &[f64], att: f64) -> Mat<f64> {
        let theta = self.params.theta(att);
        let mut jac_t = Mat::<f64>::zeros(N_PARAMS, plds.len());
        jac_t
            .col_iter_mut()
            .zip(plds)
            .for_each(|(mut col, &pld)| {
                let (_, grad) = self.model.val_grad(pld, &theta);
                for i in 0..N_PARAMS {
                    col[i] = grad[i];
                }
            });
        jac_t
    }

    /// Returns the fisher-information matrix of `repeats` averaged acquisitions at given ATT.
    pub fn fim(&self, plds: &[f64], att: f64, repeats: usize) -> Mat<f64> {
        let jac_t = self.jac_t(plds, att);
        let scale = repeats as f64 / self.params.noise.powi(2);
        scale * (&jac_t * jac_t.transpose())
    }

    /// Returns the parameter covariance, or none if the fisher-information matrix is singular.
    pub fn covariance(&self, plds: &[f64], att: f64, repeats: usize) -> Option<Mat<f64>> {
        let fim = self.fim(plds, att, repeats);
        if is_singular(&fim) {
            return None;
        }
        let cov = fim.lblt(Side::Lower).inverse();
        let finite = (0..N_PARAMS).all(|i| (0..N_PARAMS).all(|j| cov[(i, j)].is_finite()));
        finite.then_some(cov)
    }

    /// Returns the weighted mean cost of the PLD set.
    pub fn cost(&self, plds: &[f64]) -> f64 {
        self.evaluate(plds).cost
    }

    /// Scores the PLD set over the whole ATT distribution.
    ///
    /// Duplicate PLDs, protocols exceeding the scan duration and designs that cannot identify
    /// both parameters are scored with an infinite cost instead of failing.
    pub fn evaluate(&self, plds: &[f64]) -> Evaluation {
        let total_weight = self.att.total_weight();
        let repeats = self.scan.repeats(&self.params, plds);
        if repeats == 0 || has_duplicates(plds) || plds.iter().any(|p| !p.is_finite()) {
            return Evaluation::infeasible(repeats, total_weight);
        }

        let slice_plds: Vec<Vec<f64>> = self
            .scan
            .slice_offsets()
            .map(|offset| plds.iter().map(|pld| pld + offset).collect())
            .collect();
        let no_slices = slice_plds.len() as f64;

        let mut singular_weight = 0.;
        let mut weight_sum = 0.;
        let mut cost_sum = 0.;
        let mut var_sum = [0.; N_PARAMS];
        for (att, weight) in self.att.iter() {
            let mut cost = 0.;
            let mut var = [0.; N_PARAMS];
            let mut singular = false;
            for plds in &slice_plds {
                match self.covariance(plds, att, repeats) {
                    Some(cov) => {
                        cost += self.optimality.cost(&cov) / no_slices;
                        for (i, v) in var.iter_mut().enumerate() {
                            *v += cov[(i, i)] / no_slices;
                        }
                    }
                    None => {
                        singular = true;
                        break;
                    }
                }
            }
            if singular {
                singular_weight += weight;
            } else {
                weight_sum += weight;
                cost_sum += weight * cost;
                for (s, v) in var_sum.iter_mut().zip(var) {
                    *s += weight * v;
                }
            }
        }

        let partial_cost = if weight_sum > 0. {
            cost_sum / weight_sum
        } else {
            f64::INFINITY
        };
        if singular_weight > 0. {
            return Evaluation {
                singular_weight,
                partial_cost,
                ..Evaluation::infeasible(repeats, total_weight)
            };
        }
        Evaluation {
            cost: partial_cost,
            var_cbf: var_sum[0] / weight_sum,
            var_att: var_sum[1] / weight_sum,
            repeats,
            singular_weight,
            partial_cost,
        }
    }
}

fn has_duplicates(plds: &[f64]) -> bool {
    let mut sorted = plds.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.windows(2).any(|w| w[0] == w[1])
}

/// Singular if the determinant is not positive relative to the product of the diagonal, which
/// bounds the determinant of a positive semi-definite matrix from above.
fn is_singular(fim: &Mat<f64>) -> bool {
    let det = fim.determinant();
    let diag: f64 = (0..fim.nrows()).map(|i| fim[(i, i)]).product();
    !(det.is_finite() && diag > 0. && det > SINGULAR_TOL * diag)
}
