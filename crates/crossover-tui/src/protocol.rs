// Messages exchanged between the app orchestrator and the TUI.

use chrono::NaiveDate;
use crossover_baseball::crossover::CrossoverModel;
use crossover_baseball::dataset::Selection;
use crossover_baseball::report::ComparisonReport;

/// A pitcher and the appearance dates available for selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PitcherEntry {
    pub name: String,
    pub dates: Vec<NaiveDate>,
}

/// Everything the selectors and the model panel need from the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Pitchers in first-appearance order.
    pub pitchers: Vec<PitcherEntry>,
    pub model: CrossoverModel,
    pub observation_count: usize,
    pub source: String,
}

/// App orchestrator -> TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Catalog(Box<Catalog>),
    ComparisonReady(Box<ComparisonReport>),
    ComparisonFailed {
        a: Selection,
        b: Selection,
        message: String,
    },
}

/// TUI -> app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Compare { a: Selection, b: Selection },
    Quit,
}
