// Human-readable comparison report.

use crate::crossover::{Comparison, CrossoverModel, Side, Verdict};
use crate::indices::Observation;

/// Everything needed to present one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub a: Observation,
    pub b: Observation,
    pub comparison: Comparison,
    pub model: CrossoverModel,
}

fn label(o: &Observation) -> String {
    format!("{} ({})", o.record.pitcher, o.record.date)
}

impl ComparisonReport {
    pub fn label(&self, side: Side) -> String {
        match side {
            Side::A => label(&self.a),
            Side::B => label(&self.b),
        }
    }

    /// Crossover sentence, or the unreachable notice.
    pub fn headline(&self) -> String {
        let a = self.label(Side::A);
        let b = self.label(Side::B);
        match self.comparison.verdict {
            Verdict::Unreachable => {
                format!("{a} never degrades to {b}'s level, however fatigued.")
            }
            Verdict::Crossover { fatigue, .. } => {
                let bound = if self.model.fatigue_coefficient() > 0.0 {
                    "or above"
                } else {
                    "or below"
                };
                format!("Crossover at fatigue {fatigue:.1}: {a} performs worse than {b} at {fatigue:.1} {bound}.")
            }
        }
    }

    pub fn fatigue_line(&self) -> String {
        format!(
            "Current fatigue: {} {:.1}, {} {:.1}",
            self.a.record.pitcher,
            self.comparison.fatigue_a,
            self.b.record.pitcher,
            self.comparison.fatigue_b
        )
    }

    /// Which appearance to use now. `None` when the crossover is unreachable.
    pub fn recommendation(&self) -> Option<String> {
        match self.comparison.verdict {
            Verdict::Unreachable => None,
            Verdict::Crossover { preferred, .. } => Some(format!(
                "{} is more efficient to use now.",
                self.label(preferred)
            )),
        }
    }

    /// Headline, fatigue line and recommendation.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![self.headline()];
        if let Verdict::Crossover { .. } = self.comparison.verdict {
            lines.push(self.fatigue_line());
        }
        lines.extend(self.recommendation());
        lines
    }

    /// Derived indices of both sides.
    pub fn index_lines(&self) -> Vec<String> {
        [&self.a, &self.b]
            .iter()
            .map(|o| {
                let i = &o.indices;
                format!(
                    "{}: skill {:+.3}  physical {:+.3}  environment {:+.3} (mean z {:+.3})  fatigue {:.1}",
                    label(o),
                    i.skill_score,
                    i.physical_score,
                    i.environment_score,
                    i.environment_mean_z,
                    i.fatigue_indicator
                )
            })
            .collect()
    }
}

/// Fitted WHIP model coefficients on standardized predictors.
pub fn model_lines(model: &CrossoverModel) -> Vec<String> {
    let r = &model.regression;
    let [skill, physical, environment, fatigue] = r.coefficients;
    let stats = model.fatigue_stats();
    vec![
        format!("WHIP = {:.4} {:+.4}·skill {:+.4}·physical", r.intercept, skill, physical),
        format!("       {:+.4}·environment {:+.4}·fatigue", environment, fatigue),
        format!("R² {:.3}", r.r_squared),
        format!("Fatigue mean {:.1}, std {:.1}", stats.mean, stats.stdev),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indices::DerivedIndices;
    use crate::observation::{PitchingRecord, Venue};
    use crate::regression::LinearModel;
    use crate::standardize::{ColumnStats, StandardScaler};
    use chrono::NaiveDate;

    fn observation(pitcher: &str, day: u32, fatigue: f64) -> Observation {
        Observation {
            record: PitchingRecord {
                pitcher: pitcher.into(),
                date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
                era: 3.5,
                whip: 1.2,
                fastball_avg_against: 0.25,
                age: 28.0,
                height: 185.0,
                weight: 90.0,
                injury_risk: 0.0,
                travel_distance: 1000.0,
                temperature: 20.0,
                venue: Venue::Home,
                fatigue_fraction: fatigue / 100.0,
            },
            indices: DerivedIndices {
                skill_score: 0.1,
                physical_score: -0.2,
                environment_score: 0.3,
                environment_mean_z: 0.05,
                fatigue_indicator: fatigue,
            },
        }
    }

    fn model(b4: f64) -> CrossoverModel {
        let s = ColumnStats { mean: 0.0, stdev: 1.0 };
        CrossoverModel::from_parts(
            StandardScaler::from_stats([s, s, s, ColumnStats { mean: 40.0, stdev: 12.5 }]),
            LinearModel {
                intercept: 1.234,
                coefficients: [0.1, 0.02, -0.03, b4],
                r_squared: 0.4567,
            },
            1e-9,
        )
    }

    fn report(verdict: Verdict, b4: f64) -> ComparisonReport {
        ComparisonReport {
            a: observation("Kim", 3, 31.0),
            b: observation("Lee", 4, 47.3),
            comparison: Comparison {
                z_star: 0.5,
                crossover: 46.4,
                a_z: [0.0; 4],
                b_z: [0.0; 4],
                fatigue_a: 31.0,
                fatigue_b: 47.3,
                verdict,
            },
            model: model(b4),
        }
    }

    #[test]
    fn crossover_report_uses_one_decimal() {
        let r = report(
            Verdict::Crossover {
                fatigue: 46.4,
                preferred: Side::A,
            },
            0.08,
        );
        let lines = r.summary_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Crossover at fatigue 46.4:"));
        assert!(lines[0].contains("or above"));
        assert_eq!(lines[1], "Current fatigue: Kim 31.0, Lee 47.3");
        assert_eq!(lines[2], "Kim (2024-06-03) is more efficient to use now.");
    }

    #[test]
    fn negative_slope_reads_or_below() {
        let r = report(
            Verdict::Crossover {
                fatigue: 46.4,
                preferred: Side::B,
            },
            -0.08,
        );
        assert!(r.headline().contains("or below"));
        assert_eq!(
            r.recommendation().as_deref(),
            Some("Lee (2024-06-04) is more efficient to use now.")
        );
    }

    #[test]
    fn unreachable_report_has_notice_only() {
        let r = report(Verdict::Unreachable, 0.08);
        let lines = r.summary_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            "Kim (2024-06-03) never degrades to Lee (2024-06-04)'s level, however fatigued."
        );
        assert!(r.recommendation().is_none());
    }

    #[test]
    fn index_lines_cover_both_sides() {
        let r = report(Verdict::Unreachable, 0.08);
        let lines = r.index_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Kim (2024-06-03): skill +0.100"));
        assert!(lines[1].contains("fatigue 47.3"));
    }

    #[test]
    fn model_lines_show_coefficients() {
        let lines = model_lines(&model(0.08));
        assert_eq!(lines[0], "WHIP = 1.2340 +0.1000·skill +0.0200·physical");
        assert_eq!(lines[1], "       -0.0300·environment +0.0800·fatigue");
        assert_eq!(lines[2], "R² 0.457");
        assert_eq!(lines[3], "Fatigue mean 40.0, std 12.5");
    }
}
