// Single-factor maximum-likelihood factor analysis.
//
// EM-style fit with a randomized SVD per iteration: each step rescales the
// centered data by the current noise variances, takes the leading singular
// pair, and derives the loading vector and the log-likelihood from it. The
// noise variances are then updated from the per-column variance left
// unexplained by the loadings. Scores are the posterior mean of the latent
// factor given each row.

use crossover_core::config::FactorConfig;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Floor for noise variances and the offset added to their square roots.
const SMALL: f64 = 1e-12;

/// Extra random directions sampled beyond the one component we keep.
const OVERSAMPLES: usize = 10;

/// Power iterations applied to the random range before projecting.
const POWER_ITERATIONS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum FactorError {
    #[error("factor analysis needs at least one row and one column")]
    EmptyInput,

    #[error("non-finite value at row {row}, column {column}")]
    NonFinite { row: usize, column: usize },

    #[error("singular value decomposition did not produce singular vectors")]
    Decomposition,
}

/// Fit parameters for a one-component factor analysis.
#[derive(Debug, Clone, Copy)]
pub struct FactorAnalysis {
    pub seed: u64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for FactorAnalysis {
    fn default() -> Self {
        FactorAnalysis::from(&FactorConfig::default())
    }
}

impl From<&FactorConfig> for FactorAnalysis {
    fn from(config: &FactorConfig) -> Self {
        FactorAnalysis {
            seed: config.seed,
            max_iter: config.max_iter,
            tol: config.tol,
        }
    }
}

/// A fitted one-factor model.
#[derive(Debug, Clone)]
pub struct FactorModel {
    /// Per-column mean of the fitting data.
    pub mean: DVector<f64>,
    /// Factor loadings, one per column.
    pub loadings: DVector<f64>,
    /// Per-column noise variance.
    pub noise_variance: DVector<f64>,
    /// Log-likelihood after each iteration.
    pub loglike: Vec<f64>,
    pub n_iter: usize,
    pub converged: bool,
}

impl FactorAnalysis {
    pub fn fit(&self, x: &DMatrix<f64>) -> Result<FactorModel, FactorError> {
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 || n_features == 0 {
            return Err(FactorError::EmptyInput);
        }
        if let Some((row, column)) = first_non_finite(x) {
            return Err(FactorError::NonFinite { row, column });
        }

        let mean = column_means(x);
        let centered = center(x, &mean);
        let n = n_samples as f64;
        let nsqrt = n.sqrt();
        let llconst = n_features as f64 * (2.0 * std::f64::consts::PI).ln() + 1.0;

        let var = DVector::from_fn(n_features, |j, _| {
            centered.column(j).iter().map(|v| v * v).sum::<f64>() / n
        });

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut psi = DVector::from_element(n_features, 1.0);
        let mut loadings = DVector::zeros(n_features);
        let mut loglike = Vec::new();
        let mut old_ll = f64::NEG_INFINITY;
        let mut converged = false;

        for _ in 0..self.max_iter {
            let sqrt_psi = psi.map(|v: f64| v.sqrt() + SMALL);
            let scaled = DMatrix::from_fn(n_samples, n_features, |i, j| {
                centered[(i, j)] / (sqrt_psi[j] * nsqrt)
            });

            let (s, v) = leading_singular_pair(&scaled, &mut rng)?;
            let s2 = s * s;
            let unexplained = scaled.norm_squared() - s2;

            loadings = v.component_mul(&sqrt_psi) * (s2 - 1.0).max(0.0).sqrt();

            if s2 <= SMALL {
                // Nothing left to explain: every column is constant.
                converged = true;
                break;
            }

            let ll = -n / 2.0 * (llconst + s2.ln() + unexplained + psi.map(f64::ln).sum());
            loglike.push(ll);
            if ll - old_ll < self.tol {
                converged = true;
                break;
            }
            old_ll = ll;

            psi = DVector::from_fn(n_features, |j, _| {
                (var[j] - loadings[j] * loadings[j]).max(SMALL)
            });
        }

        if !converged {
            warn!(
                "factor analysis did not converge within {} iterations",
                self.max_iter
            );
        }
        debug!(
            "factor analysis finished after {} iterations (converged: {converged})",
            loglike.len()
        );

        Ok(FactorModel {
            mean,
            loadings,
            noise_variance: psi,
            n_iter: loglike.len(),
            loglike,
            converged,
        })
    }

    /// Fit on `rows` and return one factor score per row.
    pub fn fit_transform<const N: usize>(&self, rows: &[[f64; N]]) -> Result<Vec<f64>, FactorError> {
        let x = rows_to_matrix(rows);
        let model = self.fit(&x)?;
        Ok(model.transform(&x).iter().copied().collect())
    }
}

impl FactorModel {
    /// Posterior mean of the latent factor for each row of `x`.
    pub fn transform(&self, x: &DMatrix<f64>) -> DVector<f64> {
        let centered = center(x, &self.mean);
        let weighted = self.loadings.component_div(&self.noise_variance);
        let cov = 1.0 / (1.0 + weighted.dot(&self.loadings));
        (centered * weighted) * cov
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn rows_to_matrix<const N: usize>(rows: &[[f64; N]]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), N, |i, j| rows[i][j])
}

fn first_non_finite(x: &DMatrix<f64>) -> Option<(usize, usize)> {
    (0..x.nrows())
        .flat_map(|i| (0..x.ncols()).map(move |j| (i, j)))
        .find(|&(i, j)| !x[(i, j)].is_finite())
}

fn column_means(x: &DMatrix<f64>) -> DVector<f64> {
    let n = x.nrows() as f64;
    DVector::from_fn(x.ncols(), |j, _| x.column(j).sum() / n)
}

fn center(x: &DMatrix<f64>, mean: &DVector<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| x[(i, j)] - mean[j])
}

/// Largest singular value of `m` and its right singular vector, found through
/// a seeded randomized range finder.
///
/// The vector's sign is fixed so that the largest-magnitude entry of the
/// matching left singular vector is positive.
fn leading_singular_pair(
    m: &DMatrix<f64>,
    rng: &mut StdRng,
) -> Result<(f64, DVector<f64>), FactorError> {
    let (_, p) = m.shape();
    let k = (1 + OVERSAMPLES).min(p);

    let omega = DMatrix::from_fn(p, k, |_, _| rng.gen_range(-1.0_f64..1.0));
    let mut range = m * omega;
    for _ in 0..POWER_ITERATIONS {
        let q = range.qr().q();
        let back = (m.transpose() * q).qr().q();
        range = m * back;
    }
    let q = range.qr().q();

    let projected = q.transpose() * m;
    let svd = projected.svd(true, true);
    let (u_small, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(FactorError::Decomposition),
    };

    let (idx, s) = svd
        .singular_values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, s)| if s > best.1 { (i, s) } else { best });
    if !s.is_finite() {
        return Err(FactorError::Decomposition);
    }

    let u = q * u_small.column(idx);
    let mut v: DVector<f64> = v_t.row(idx).transpose();

    let pivot = u
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v = -v;
    }

    Ok((s, v))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
