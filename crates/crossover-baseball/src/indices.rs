// Composite index construction over the full appearance set.
//
// Three independent joint scalers feed the environment, skill and physical
// composites; each is fit once over every row and kept for inspection.

use crate::factor::{FactorAnalysis, FactorError};
use crate::observation::PitchingRecord;
use crate::standardize::StandardScaler;
use crossover_core::config::{EnvironmentWeights, FactorConfig, IndexWeights, SkillWeights};
use tracing::info;

/// Scale factor from the stored fatigue fraction to the fatigue indicator.
pub const FATIGUE_SCALE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Indices derived for a single appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedIndices {
    pub skill_score: f64,
    pub physical_score: f64,
    pub environment_score: f64,
    /// Plain mean of the three environment z-values.
    pub environment_mean_z: f64,
    pub fatigue_indicator: f64,
}

/// One appearance with its raw attributes and derived indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub record: PitchingRecord,
    pub indices: DerivedIndices,
}

/// Dataset-wide scalers used while deriving the indices.
#[derive(Debug, Clone, Copy)]
pub struct IndexScalers {
    /// travel distance, temperature, venue.
    pub environment: StandardScaler<3>,
    /// ERA, WHIP, fastball average against.
    pub skill: StandardScaler<3>,
    /// age, height, weight, injury risk.
    pub physical: StandardScaler<4>,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("no appearances to index")]
    Empty,

    #[error("physical factor extraction failed: {0}")]
    Factor(#[from] FactorError),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct IndexBuilder {
    pub environment: EnvironmentWeights,
    pub skill: SkillWeights,
    pub factor: FactorAnalysis,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        IndexBuilder::new(&IndexWeights::default(), &FactorConfig::default())
    }
}

impl IndexBuilder {
    pub fn new(weights: &IndexWeights, factor: &FactorConfig) -> Self {
        IndexBuilder {
            environment: weights.environment,
            skill: weights.skill,
            factor: FactorAnalysis::from(factor),
        }
    }

    /// Derive indices for every record. Output order matches input order.
    pub fn build(
        &self,
        records: Vec<PitchingRecord>,
    ) -> Result<(Vec<Observation>, IndexScalers), IndexError> {
        if records.is_empty() {
            return Err(IndexError::Empty);
        }

        let env_rows: Vec<[f64; 3]> = records
            .iter()
            .map(|r| [r.travel_distance, r.temperature, r.venue.indicator()])
            .collect();
        let (env_scaler, env_z) = StandardScaler::fit_transform(&env_rows);

        let skill_rows: Vec<[f64; 3]> = records
            .iter()
            .map(|r| [r.era, r.whip, r.fastball_avg_against])
            .collect();
        let (skill_scaler, skill_z) = StandardScaler::fit_transform(&skill_rows);

        let phys_rows: Vec<[f64; 4]> = records
            .iter()
            .map(|r| [r.age, r.height, r.weight, r.injury_risk])
            .collect();
        let (phys_scaler, phys_z) = StandardScaler::fit_transform(&phys_rows);
        let physical = self.factor.fit_transform(&phys_z)?;

        let observations: Vec<Observation> = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let [travel_z, temperature_z, venue_z] = env_z[i];
                let [era_z, whip_z, fastball_z] = skill_z[i];
                let indices = DerivedIndices {
                    skill_score: self.skill.era * era_z
                        + self.skill.whip * whip_z
                        + self.skill.fastball_avg * fastball_z,
                    physical_score: physical[i],
                    environment_score: self.environment.temperature * temperature_z
                        + self.environment.travel * travel_z
                        + self.environment.venue * venue_z,
                    environment_mean_z: (travel_z + temperature_z + venue_z) / 3.0,
                    fatigue_indicator: record.fatigue_fraction * FATIGUE_SCALE,
                };
                Observation { record, indices }
            })
            .collect();

        info!("derived indices for {} appearances", observations.len());

        Ok((
            observations,
            IndexScalers {
                environment: env_scaler,
                skill: skill_scaler,
                physical: phys_scaler,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Venue;
    use crate::standardize::column_stats;
    use chrono::NaiveDate;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn record(i: usize) -> PitchingRecord {
        let t = i as f64;
        PitchingRecord {
            pitcher: format!("P{}", i % 3),
            date: NaiveDate::from_ymd_opt(2024, 4, 1 + i as u32).unwrap(),
            era: 3.0 + (t * 0.9).sin(),
            whip: 1.2 + 0.15 * (t * 1.1).cos(),
            fastball_avg_against: 0.25 + 0.02 * (t * 0.3).sin(),
            age: 25.0 + (i % 7) as f64,
            height: 180.0 + (t * 0.5).cos() * 4.0,
            weight: 85.0 + (t * 0.5).cos() * 6.0 + (t * 2.3).sin(),
            injury_risk: if i % 4 == 0 { 0.0 } else { 0.1 * (i % 5) as f64 },
            travel_distance: 500.0 + 120.0 * t,
            temperature: 15.0 + (t * 0.8).sin() * 6.0,
            venue: if i % 2 == 0 { Venue::Home } else { Venue::Away },
            fatigue_fraction: 0.2 + 0.03 * (i % 9) as f64,
        }
    }

    fn records(n: usize) -> Vec<PitchingRecord> {
        (0..n).map(record).collect()
    }

    #[test]
    fn build_is_deterministic() {
        let builder = IndexBuilder::default();
        let (first, _) = builder.build(records(20)).unwrap();
        let (second, _) = builder.build(records(20)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fatigue_indicator_is_percentage() {
        let (obs, _) = IndexBuilder::default().build(records(5)).unwrap();
        for o in &obs {
            assert!(approx_eq(
                o.indices.fatigue_indicator,
                o.record.fatigue_fraction * 100.0,
                1e-12
            ));
        }
    }

    #[test]
    fn weighted_composites_use_configured_weights() {
        let recs = records(12);
        let (obs, scalers) = IndexBuilder::default().build(recs.clone()).unwrap();

        let r = &recs[4];
        let env = scalers
            .environment
            .transform_row(&[r.travel_distance, r.temperature, r.venue.indicator()]);
        let skill = scalers.skill.transform_row(&[r.era, r.whip, r.fastball_avg_against]);

        let expected_env = 0.433381 * env[1] + 0.437590 * env[0] + 0.129029 * env[2];
        let expected_skill = 0.402767 * skill[0] + 0.503297 * skill[1] + 0.093936 * skill[2];
        assert!(approx_eq(obs[4].indices.environment_score, expected_env, 1e-12));
        assert!(approx_eq(obs[4].indices.skill_score, expected_skill, 1e-12));
        assert!(approx_eq(
            obs[4].indices.environment_mean_z,
            (env[0] + env[1] + env[2]) / 3.0,
            1e-12
        ));
    }

    #[test]
    fn composites_are_centered() {
        let (obs, _) = IndexBuilder::default().build(records(30)).unwrap();
        let skill: Vec<f64> = obs.iter().map(|o| o.indices.skill_score).collect();
        let env: Vec<f64> = obs.iter().map(|o| o.indices.environment_score).collect();
        let phys: Vec<f64> = obs.iter().map(|o| o.indices.physical_score).collect();
        assert!(column_stats(&skill).mean.abs() < 1e-12);
        assert!(column_stats(&env).mean.abs() < 1e-12);
        assert!(column_stats(&phys).mean.abs() < 1e-9);
    }

    #[test]
    fn venue_is_encoded_before_scaling() {
        let (_, scalers) = IndexBuilder::default().build(records(10)).unwrap();
        // Five Home and five Away rows.
        assert!(approx_eq(scalers.environment.column(2).mean, 0.5, 1e-12));
        assert!(approx_eq(scalers.environment.column(2).stdev, 0.5, 1e-12));
    }

    #[test]
    fn order_is_preserved() {
        let recs = records(8);
        let (obs, _) = IndexBuilder::default().build(recs.clone()).unwrap();
        for (o, r) in obs.iter().zip(&recs) {
            assert_eq!(&o.record, r);
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = IndexBuilder::default().build(Vec::new()).unwrap_err();
        assert!(matches!(err, IndexError::Empty));
    }
}
