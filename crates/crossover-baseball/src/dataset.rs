// The loaded, indexed and fitted dataset, plus its process-wide cache.

use crate::crossover::{CrossoverError, CrossoverModel};
use crate::indices::{IndexBuilder, IndexError, IndexScalers, Observation};
use crate::observation::{load_records, ObservationError, PitchingRecord};
use crate::report::ComparisonReport;
use chrono::NaiveDate;
use crossover_core::config::Config;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error(transparent)]
    Observation(#[from] ObservationError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Crossover(#[from] CrossoverError),

    #[error("no appearance for {pitcher} on {date}")]
    NotFound { pitcher: String, date: NaiveDate },
}

/// A pitcher and one of their appearance dates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    pub pitcher: String,
    pub date: NaiveDate,
}

impl Selection {
    pub fn new(pitcher: impl Into<String>, date: NaiveDate) -> Self {
        Selection {
            pitcher: pitcher.into(),
            date,
        }
    }
}

/// Observations with derived indices and the WHIP model fit over all of them.
#[derive(Debug, Clone)]
pub struct Dataset {
    observations: Vec<Observation>,
    scalers: IndexScalers,
    model: CrossoverModel,
}

impl Dataset {
    /// Index and fit already-loaded records.
    pub fn from_records(records: Vec<PitchingRecord>, config: &Config) -> Result<Self, DatasetError> {
        let builder = IndexBuilder::new(&config.weights, &config.factor);
        let (observations, scalers) = builder.build(records)?;
        let model = CrossoverModel::fit(&observations, &config.solver)?;

        info!(
            "WHIP model fit over {} appearances (R² {:.3}, fatigue coefficient {:.4})",
            observations.len(),
            model.regression.r_squared,
            model.fatigue_coefficient()
        );

        let mut seen = std::collections::HashSet::new();
        for o in &observations {
            if !seen.insert((o.record.pitcher.as_str(), o.record.date)) {
                warn!(
                    "duplicate appearance for {} on {}; the first row is used",
                    o.record.pitcher, o.record.date
                );
            }
        }

        Ok(Dataset {
            observations,
            scalers,
            model,
        })
    }

    /// Load the observation file named by the config and fit it.
    pub fn load(config: &Config) -> Result<Self, DatasetError> {
        let records = load_records(Path::new(&config.data.observations))?;
        Self::from_records(records, config)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn scalers(&self) -> &IndexScalers {
        &self.scalers
    }

    pub fn model(&self) -> &CrossoverModel {
        &self.model
    }

    /// Distinct pitchers in first-appearance order.
    pub fn pitchers(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for o in &self.observations {
            if !names.iter().any(|n| *n == o.record.pitcher) {
                names.push(o.record.pitcher.clone());
            }
        }
        names
    }

    /// A pitcher's appearance dates in file order, without repeats.
    /// Empty for an unknown pitcher.
    pub fn dates_for(&self, pitcher: &str) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = Vec::new();
        for o in self.observations.iter().filter(|o| o.record.pitcher == pitcher) {
            if !dates.contains(&o.record.date) {
                dates.push(o.record.date);
            }
        }
        dates
    }

    /// First observation matching the selection.
    pub fn find(&self, selection: &Selection) -> Option<&Observation> {
        self.observations
            .iter()
            .find(|o| o.record.pitcher == selection.pitcher && o.record.date == selection.date)
    }

    fn lookup(&self, selection: &Selection) -> Result<&Observation, DatasetError> {
        self.find(selection).ok_or_else(|| DatasetError::NotFound {
            pitcher: selection.pitcher.clone(),
            date: selection.date,
        })
    }

    /// Solve the crossover between two selected appearances.
    pub fn compare(&self, a: &Selection, b: &Selection) -> Result<ComparisonReport, DatasetError> {
        let obs_a = self.lookup(a)?;
        let obs_b = self.lookup(b)?;
        let comparison = self.model.solve(&obs_a.indices, &obs_b.indices)?;
        info!(
            "compared {} {} vs {} {}: crossover {:.1}",
            a.pitcher, a.date, b.pitcher, b.date, comparison.crossover
        );
        Ok(ComparisonReport {
            a: obs_a.clone(),
            b: obs_b.clone(),
            comparison,
            model: self.model,
        })
    }
}

// ---------------------------------------------------------------------------
// Process-wide cache
// ---------------------------------------------------------------------------

static DATASET: OnceLock<Dataset> = OnceLock::new();

/// The shared dataset, loading and fitting it on first use.
///
/// Later calls return the first successfully built dataset and ignore
/// `config`.
pub fn global(config: &Config) -> Result<&'static Dataset, DatasetError> {
    if let Some(dataset) = DATASET.get() {
        return Ok(dataset);
    }
    let dataset = Dataset::load(config)?;
    Ok(DATASET.get_or_init(|| dataset))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
