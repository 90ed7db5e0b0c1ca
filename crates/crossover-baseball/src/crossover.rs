// Crossover solver: the fatigue level at which one appearance's predicted
// WHIP meets another's.
//
// The WHIP model is fit once over every observation on jointly standardized
// predictors (skill, physical, environment, fatigue). Solving for A's unknown
// fatigue against B's prediction at B's actual fatigue gives
//
//   z* = fatigue_b_z - [b1·Δskill + b2·Δphysical + b3·Δenvironment] / b4
//
// which is then mapped back onto the fatigue-indicator scale.

use crate::indices::{DerivedIndices, Observation};
use crate::regression::{LinearModel, RegressionError};
use crate::standardize::{ColumnStats, StandardScaler};
use crossover_core::config::SolverConfig;
use tracing::{debug, warn};

/// Predictor order: skill, physical, environment, fatigue.
pub const PREDICTORS: usize = 4;

const FATIGUE: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum CrossoverError {
    #[error("crossover undefined: fatigue coefficient {coefficient:e} is within {epsilon:e} of zero")]
    Undefined { coefficient: f64, epsilon: f64 },

    #[error("crossover computation produced a non-finite value")]
    NonFinite,

    #[error("failed to fit WHIP model: {0}")]
    Regression(#[from] RegressionError),
}

/// Which of the two compared appearances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Outcome of a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// A never degrades to B's level, whatever its fatigue.
    Unreachable,
    /// A crossover exists on the fatigue-indicator scale.
    Crossover {
        fatigue: f64,
        /// The appearance that is more efficient to use now.
        preferred: Side,
    },
}

/// Full result of solving one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Standardized crossover fatigue.
    pub z_star: f64,
    /// Crossover on the fatigue-indicator scale; negative when unreachable.
    pub crossover: f64,
    /// A's standardized predictors (fatigue slot fixed at the unknown's 0 input).
    pub a_z: [f64; PREDICTORS],
    pub b_z: [f64; PREDICTORS],
    pub fatigue_a: f64,
    pub fatigue_b: f64,
    pub verdict: Verdict,
}

/// The fitted WHIP model and its predictor scaler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossoverModel {
    pub scaler: StandardScaler<PREDICTORS>,
    pub regression: LinearModel<PREDICTORS>,
    pub epsilon: f64,
}

fn predictor_row(indices: &DerivedIndices, fatigue: f64) -> [f64; PREDICTORS] {
    [
        indices.skill_score,
        indices.physical_score,
        indices.environment_score,
        fatigue,
    ]
}

impl CrossoverModel {
    /// Fit the scaler and regression over every observation.
    pub fn fit(observations: &[Observation], solver: &SolverConfig) -> Result<Self, CrossoverError> {
        let rows: Vec<[f64; PREDICTORS]> = observations
            .iter()
            .map(|o| predictor_row(&o.indices, o.indices.fatigue_indicator))
            .collect();
        let whip: Vec<f64> = observations.iter().map(|o| o.record.whip).collect();

        let (scaler, z) = StandardScaler::fit_transform(&rows);
        let regression = LinearModel::fit(&z, &whip)?;

        debug!(
            "WHIP model: b0={:.4} b={:?} r2={:.4}",
            regression.intercept, regression.coefficients, regression.r_squared
        );
        if regression.coefficients[FATIGUE].abs() < solver.fatigue_coef_epsilon {
            warn!(
                "fatigue coefficient {:e} is near zero; every crossover will be undefined",
                regression.coefficients[FATIGUE]
            );
        }

        Ok(CrossoverModel {
            scaler,
            regression,
            epsilon: solver.fatigue_coef_epsilon,
        })
    }

    /// Model with known parameters.
    pub fn from_parts(
        scaler: StandardScaler<PREDICTORS>,
        regression: LinearModel<PREDICTORS>,
        epsilon: f64,
    ) -> Self {
        CrossoverModel {
            scaler,
            regression,
            epsilon,
        }
    }

    /// Dataset-wide statistics of the fatigue indicator.
    pub fn fatigue_stats(&self) -> ColumnStats {
        self.scaler.column(FATIGUE)
    }

    pub fn fatigue_coefficient(&self) -> f64 {
        self.regression.coefficients[FATIGUE]
    }

    /// Solve for the fatigue at which A's predicted WHIP equals B's.
    pub fn solve(&self, a: &DerivedIndices, b: &DerivedIndices) -> Result<Comparison, CrossoverError> {
        let b4 = self.fatigue_coefficient();
        // A zero slope is undefined whatever the configured epsilon.
        if b4 == 0.0 || !(b4.abs() >= self.epsilon) {
            return Err(CrossoverError::Undefined {
                coefficient: b4,
                epsilon: self.epsilon,
            });
        }

        let a_z = self.scaler.transform_row(&predictor_row(a, 0.0));
        let b_z = self.scaler.transform_row(&predictor_row(b, b.fatigue_indicator));

        let [b1, b2, b3, _] = self.regression.coefficients;
        let numerator = b1 * (a_z[0] - b_z[0]) + b2 * (a_z[1] - b_z[1]) + b3 * (a_z[2] - b_z[2]);
        let z_star = b_z[FATIGUE] - numerator / b4;
        let crossover = self.fatigue_stats().invert(z_star);

        if !z_star.is_finite() || !crossover.is_finite() {
            return Err(CrossoverError::NonFinite);
        }

        let fatigue_a = a.fatigue_indicator;
        let fatigue_b = b.fatigue_indicator;
        let verdict = if crossover < 0.0 {
            Verdict::Unreachable
        } else {
            Verdict::Crossover {
                fatigue: crossover,
                preferred: preferred_side(fatigue_a, crossover, b4),
            }
        };

        Ok(Comparison {
            z_star,
            crossover,
            a_z,
            b_z,
            fatigue_a,
            fatigue_b,
            verdict,
        })
    }
}

/// A is preferred while it sits on the low-WHIP side of the crossover.
/// With a positive fatigue coefficient that is below it, otherwise above it.
/// Sitting exactly on the crossover goes to B.
fn preferred_side(fatigue_a: f64, crossover: f64, b4: f64) -> Side {
    let a_better = if b4 > 0.0 {
        fatigue_a < crossover
    } else {
        fatigue_a > crossover
    };
    if a_better {
        Side::A
    } else {
        Side::B
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn indices(skill: f64, physical: f64, environment: f64, fatigue: f64) -> DerivedIndices {
        DerivedIndices {
            skill_score: skill,
            physical_score: physical,
            environment_score: environment,
            environment_mean_z: 0.0,
            fatigue_indicator: fatigue,
        }
    }

    fn stats(mean: f64, stdev: f64) -> ColumnStats {
        ColumnStats { mean, stdev }
    }

    fn model(coefficients: [f64; 4]) -> CrossoverModel {
        CrossoverModel::from_parts(
            StandardScaler::from_stats([
                stats(0.1, 0.4),
                stats(0.05, 0.5),
                stats(-0.05, 0.15),
                stats(40.0, 10.0),
            ]),
            LinearModel {
                intercept: 1.25,
                coefficients,
                r_squared: 0.6,
            },
            1e-9,
        )
    }

    #[test]
    fn closed_form_matches_solver() {
        let m = model([0.12, 0.03, 0.02, 0.08]);
        let x = indices(0.5, 0.1, -0.2, 30.0);
        let y = indices(-0.3, 0.0, 0.1, 50.0);

        let result = m.solve(&x, &y).unwrap();

        let xs = [(0.5 - 0.1) / 0.4, (0.1 - 0.05) / 0.5, (-0.2 + 0.05) / 0.15];
        let ys = [(-0.3 - 0.1) / 0.4, (0.0 - 0.05) / 0.5, (0.1 + 0.05) / 0.15];
        let fatigue_y_z = (50.0 - 40.0) / 10.0;
        let numerator =
            0.12 * (xs[0] - ys[0]) + 0.03 * (xs[1] - ys[1]) + 0.02 * (xs[2] - ys[2]);
        let z_star = fatigue_y_z - numerator / 0.08;
        let expected = z_star * 10.0 + 40.0;

        assert!(approx_eq(result.z_star, z_star, 1e-12));
        assert!(approx_eq(result.crossover, expected, 1e-10));
        assert!(approx_eq(result.fatigue_a, 30.0, 1e-12));
        assert!(approx_eq(result.fatigue_b, 50.0, 1e-12));
    }

    #[test]
    fn predicted_whip_is_equal_at_crossover() {
        let m = model([0.12, 0.03, 0.02, 0.08]);
        let a = indices(0.2, -0.1, 0.05, 35.0);
        let b = indices(0.3, 0.2, -0.1, 45.0);
        let result = m.solve(&a, &b).unwrap();

        let a_at = m.scaler.transform_row(&[0.2, -0.1, 0.05, result.crossover]);
        let b_at = m.scaler.transform_row(&[0.3, 0.2, -0.1, 45.0]);
        assert!(approx_eq(
            m.regression.predict(&a_at),
            m.regression.predict(&b_at),
            1e-10
        ));
    }

    #[test]
    fn self_comparison_returns_own_fatigue() {
        let m = model([0.12, 0.03, 0.02, 0.08]);
        let row = indices(0.4, -0.2, 0.3, 47.5);
        let result = m.solve(&row, &row).unwrap();

        assert!(approx_eq(result.z_star, result.b_z[3], 1e-12));
        assert!(approx_eq(result.crossover, 47.5, 1e-10));
    }

    #[test]
    fn zero_fatigue_coefficient_is_undefined() {
        let m = model([0.12, 0.03, 0.02, 0.0]);
        let err = m.solve(&indices(0.5, 0.1, -0.2, 30.0), &indices(-0.3, 0.0, 0.1, 50.0));
        match err {
            Err(CrossoverError::Undefined { coefficient, .. }) => assert_eq!(coefficient, 0.0),
            other => panic!("expected Undefined, got: {other:?}"),
        }
    }

    #[test]
    fn zero_fatigue_coefficient_is_undefined_without_epsilon() {
        let m = CrossoverModel {
            epsilon: 0.0,
            ..model([0.12, 0.03, 0.02, 0.0])
        };
        let err = m
            .solve(&indices(0.5, 0.1, -0.2, 30.0), &indices(-0.3, 0.0, 0.1, 50.0))
            .unwrap_err();
        assert!(matches!(err, CrossoverError::Undefined { .. }));
        assert!(err.to_string().starts_with("crossover undefined"));
    }

    #[test]
    fn tiny_fatigue_coefficient_is_undefined() {
        let m = model([0.12, 0.03, 0.02, 1e-12]);
        let err = m
            .solve(&indices(0.5, 0.1, -0.2, 30.0), &indices(-0.3, 0.0, 0.1, 50.0))
            .unwrap_err();
        assert!(matches!(err, CrossoverError::Undefined { .. }));
    }

    #[test]
    fn nan_fatigue_coefficient_is_undefined() {
        let m = model([0.12, 0.03, 0.02, f64::NAN]);
        let err = m
            .solve(&indices(0.5, 0.1, -0.2, 30.0), &indices(-0.3, 0.0, 0.1, 50.0))
            .unwrap_err();
        assert!(matches!(err, CrossoverError::Undefined { .. }));
    }

    #[test]
    fn non_finite_input_is_an_error() {
        let m = model([0.12, 0.03, 0.02, 0.08]);
        let err = m
            .solve(&indices(f64::INFINITY, 0.1, -0.2, 30.0), &indices(-0.3, 0.0, 0.1, 50.0))
            .unwrap_err();
        assert!(matches!(err, CrossoverError::NonFinite));
    }

    #[test]
    fn negative_crossover_is_unreachable() {
        // A is far worse on skill; with a positive fatigue slope A would need
        // negative fatigue to match B.
        let m = model([0.5, 0.0, 0.0, 0.08]);
        let a = indices(1.5, 0.0, 0.0, 20.0);
        let b = indices(-0.5, 0.0, 0.0, 30.0);
        let result = m.solve(&a, &b).unwrap();
        assert!(result.crossover < 0.0);
        assert_eq!(result.verdict, Verdict::Unreachable);
    }

    #[test]
    fn positive_slope_prefers_a_below_crossover() {
        let m = model([0.12, 0.0, 0.0, 0.08]);
        let a = indices(-0.2, 0.0, 0.0, 30.0);
        let b = indices(0.1, 0.0, 0.0, 40.0);
        let result = m.solve(&a, &b).unwrap();
        match result.verdict {
            Verdict::Crossover { fatigue, preferred } => {
                assert!(fatigue > 30.0);
                assert_eq!(preferred, Side::A);
            }
            other => panic!("expected crossover, got {other:?}"),
        }
    }

    #[test]
    fn positive_slope_prefers_b_above_crossover() {
        let m = model([0.12, 0.0, 0.0, 0.08]);
        let a = indices(0.4, 0.0, 0.0, 70.0);
        let b = indices(0.1, 0.0, 0.0, 40.0);
        let result = m.solve(&a, &b).unwrap();
        match result.verdict {
            Verdict::Crossover { fatigue, preferred } => {
                assert!(fatigue < 70.0);
                assert_eq!(preferred, Side::B);
            }
            other => panic!("expected crossover, got {other:?}"),
        }
    }

    #[test]
    fn negative_slope_flips_preference() {
        assert_eq!(preferred_side(30.0, 40.0, 0.08), Side::A);
        assert_eq!(preferred_side(30.0, 40.0, -0.08), Side::B);
        assert_eq!(preferred_side(50.0, 40.0, -0.08), Side::A);
    }

    #[test]
    fn tie_goes_to_b() {
        assert_eq!(preferred_side(40.0, 40.0, 0.08), Side::B);
        assert_eq!(preferred_side(40.0, 40.0, -0.08), Side::B);
    }
}
