// Ordinary least squares with an intercept, solved through SVD.

use nalgebra::{DMatrix, DVector};

/// Singular values below this are treated as zero when solving.
const SVD_TOLERANCE: f64 = 1e-12;

#[derive(Debug, thiserror::Error)]
pub enum RegressionError {
    #[error("predictor rows ({rows}) and targets ({targets}) differ in length")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("need at least 2 observations to fit, got {0}")]
    TooFewObservations(usize),

    #[error("least squares solve failed: {0}")]
    Solve(String),

    #[error("fitted coefficients are not finite")]
    NonFinite,
}

/// A fitted linear model `y = intercept + coefficients · x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel<const N: usize> {
    pub intercept: f64,
    pub coefficients: [f64; N],
    /// Coefficient of determination on the fitting data.
    pub r_squared: f64,
}

impl<const N: usize> LinearModel<N> {
    pub fn fit(x: &[[f64; N]], y: &[f64]) -> Result<Self, RegressionError> {
        if x.len() != y.len() {
            return Err(RegressionError::LengthMismatch {
                rows: x.len(),
                targets: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(RegressionError::TooFewObservations(x.len()));
        }

        // Design matrix with a leading column of ones for the intercept.
        let design = DMatrix::from_fn(x.len(), N + 1, |i, j| if j == 0 { 1.0 } else { x[i][j - 1] });
        let target = DVector::from_column_slice(y);

        let beta = design
            .svd(true, true)
            .solve(&target, SVD_TOLERANCE)
            .map_err(|e| RegressionError::Solve(e.to_string()))?;
        if !beta.iter().all(|v| v.is_finite()) {
            return Err(RegressionError::NonFinite);
        }

        let mut model = LinearModel {
            intercept: beta[0],
            coefficients: std::array::from_fn(|j| beta[j + 1]),
            r_squared: 0.0,
        };
        model.r_squared = model.score(x, y);
        Ok(model)
    }

    pub fn predict(&self, x: &[f64; N]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(b, v)| b * v)
                .sum::<f64>()
    }

    /// R² of the model on `(x, y)`. A constant target scores 1 when fit
    /// exactly and 0 otherwise.
    pub fn score(&self, x: &[[f64; N]], y: &[f64]) -> f64 {
        let n = y.len() as f64;
        let mean = y.iter().sum::<f64>() / n;
        let ss_res: f64 = x
            .iter()
            .zip(y)
            .map(|(row, target)| (target - self.predict(row)).powi(2))
            .sum();
        let ss_tot: f64 = y.iter().map(|target| (target - mean).powi(2)).sum();
        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
