// Pitcher appearance CSV loading.
//
// One row per (pitcher, appearance date). Accepts English or Korean headers;
// unknown columns (for example `구속_변화량`) are ignored. Every malformed cell
// is fatal.

use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Where the appearance took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    /// Binary encoding used before standardization (Home=1, Away=0).
    pub fn indicator(self) -> f64 {
        match self {
            Venue::Home => 1.0,
            Venue::Away => 0.0,
        }
    }

    pub fn parse(label: &str) -> Option<Venue> {
        match label.trim().to_ascii_lowercase().as_str() {
            "home" | "홈" => Some(Venue::Home),
            "away" | "원정" => Some(Venue::Away),
            _ => None,
        }
    }
}

/// Raw measured attributes of one appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchingRecord {
    pub pitcher: String,
    pub date: NaiveDate,
    pub era: f64,
    pub whip: f64,
    /// Batting average against on fastballs.
    pub fastball_avg_against: f64,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    /// Missing values are stored as 0.
    pub injury_risk: f64,
    /// Cumulative travel distance.
    pub travel_distance: f64,
    pub temperature: f64,
    pub venue: Venue,
    /// Precomputed fatigue index as a fraction (0.3 = 30 on the indicator scale).
    pub fatigue_fraction: f64,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ObservationError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {source_name}: {source}")]
    Csv {
        source_name: String,
        source: csv::Error,
    },

    #[error("{source_name}: missing required column `{column}`")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name}: line {line}, column `{column}`: {message}")]
    InvalidCell {
        source_name: String,
        line: u64,
        column: String,
        message: String,
    },

    #[error("{source_name}: need at least 2 rows, found {found}")]
    TooFewRows { source_name: String, found: usize },
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Header names per field: canonical English first, then aliases.
const REQUIRED_COLUMNS: &[&[&str]] = &[
    &["pitcher", "선수"],
    &["date", "날짜"],
    &["ERA"],
    &["WHIP"],
    &["fastball_avg_against", "직구_피안타율"],
    &["age", "나이"],
    &["height", "키"],
    &["weight", "몸무게"],
    &["injury_risk", "부상위험도"],
    &["travel_distance", "누적이동거리"],
    &["temperature", "온도"],
    &["venue", "구장"],
    &["fatigue_index", "피로도지수"],
];

/// Date layouts seen in fatigue exports.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%Y%m%d"];

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(alias = "선수")]
    pitcher: String,
    #[serde(alias = "날짜")]
    date: String,
    #[serde(rename = "ERA")]
    era: f64,
    #[serde(rename = "WHIP")]
    whip: f64,
    #[serde(alias = "직구_피안타율")]
    fastball_avg_against: f64,
    #[serde(alias = "나이")]
    age: f64,
    #[serde(alias = "키")]
    height: f64,
    #[serde(alias = "몸무게")]
    weight: f64,
    #[serde(alias = "부상위험도", default)]
    injury_risk: Option<f64>,
    #[serde(alias = "누적이동거리")]
    travel_distance: f64,
    #[serde(alias = "온도")]
    temperature: f64,
    #[serde(alias = "구장")]
    venue: String,
    #[serde(alias = "피로도지수")]
    fatigue_index: f64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn check_headers(headers: &csv::StringRecord, source_name: &str) -> Result<(), ObservationError> {
    for names in REQUIRED_COLUMNS {
        if !names.iter().any(|name| headers.iter().any(|h| h == *name)) {
            return Err(ObservationError::MissingColumn {
                source_name: source_name.to_string(),
                column: names[0].to_string(),
            });
        }
    }
    Ok(())
}

/// Turn a csv deserialize failure into a cell error naming line and column.
fn cell_error(
    err: csv::Error,
    headers: &csv::StringRecord,
    line: u64,
    source_name: &str,
) -> ObservationError {
    if let csv::ErrorKind::Deserialize { err: de, .. } = err.kind() {
        let column = de
            .field()
            .and_then(|i| headers.get(i as usize))
            .unwrap_or("?")
            .to_string();
        return ObservationError::InvalidCell {
            source_name: source_name.to_string(),
            line,
            column,
            message: de.to_string(),
        };
    }
    ObservationError::Csv {
        source_name: source_name.to_string(),
        source: err,
    }
}

fn invalid(source_name: &str, line: u64, column: &str, message: String) -> ObservationError {
    ObservationError::InvalidCell {
        source_name: source_name.to_string(),
        line,
        column: column.to_string(),
        message,
    }
}

fn convert(raw: RawRow, line: u64, source_name: &str) -> Result<PitchingRecord, ObservationError> {
    let pitcher = raw.pitcher.trim().to_string();
    if pitcher.is_empty() {
        return Err(invalid(source_name, line, "pitcher", "empty pitcher name".into()));
    }
    let date = parse_date(&raw.date).ok_or_else(|| {
        invalid(source_name, line, "date", format!("unrecognized date '{}'", raw.date))
    })?;
    let venue = Venue::parse(&raw.venue).ok_or_else(|| {
        invalid(
            source_name,
            line,
            "venue",
            format!("unknown venue '{}' (expected Home or Away)", raw.venue),
        )
    })?;

    let numeric = [
        ("ERA", raw.era),
        ("WHIP", raw.whip),
        ("fastball_avg_against", raw.fastball_avg_against),
        ("age", raw.age),
        ("height", raw.height),
        ("weight", raw.weight),
        ("travel_distance", raw.travel_distance),
        ("temperature", raw.temperature),
        ("fatigue_index", raw.fatigue_index),
    ];
    if let Some((column, value)) = numeric.iter().find(|(_, v)| !v.is_finite()) {
        return Err(invalid(source_name, line, column, format!("non-finite value {value}")));
    }

    let injury_risk = match raw.injury_risk {
        Some(v) if v.is_finite() => v,
        Some(_) | None => 0.0,
    };

    Ok(PitchingRecord {
        pitcher,
        date,
        era: raw.era,
        whip: raw.whip,
        fastball_avg_against: raw.fastball_avg_against,
        age: raw.age,
        height: raw.height,
        weight: raw.weight,
        injury_risk,
        travel_distance: raw.travel_distance,
        temperature: raw.temperature,
        venue,
        fatigue_fraction: raw.fatigue_index,
    })
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Parse appearance rows from any reader. `source_name` labels errors.
pub fn load_records_from_reader<R: Read>(
    rdr: R,
    source_name: &str,
) -> Result<Vec<PitchingRecord>, ObservationError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| ObservationError::Csv {
            source_name: source_name.to_string(),
            source: e,
        })?
        .clone();
    check_headers(&headers, source_name)?;

    let mut records = Vec::new();
    let mut record = csv::StringRecord::new();
    loop {
        let more = reader.read_record(&mut record).map_err(|e| ObservationError::Csv {
            source_name: source_name.to_string(),
            source: e,
        })?;
        if !more {
            break;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawRow = record
            .deserialize(Some(&headers))
            .map_err(|e| cell_error(e, &headers, line, source_name))?;
        records.push(convert(raw, line, source_name)?);
    }

    if records.len() < 2 {
        return Err(ObservationError::TooFewRows {
            source_name: source_name.to_string(),
            found: records.len(),
        });
    }

    let missing_injury = records.iter().filter(|r| r.injury_risk == 0.0).count();
    if missing_injury == records.len() {
        warn!("{source_name}: injury risk is zero or missing on every row");
    }

    Ok(records)
}

/// Load appearance rows from a CSV file.
pub fn load_records(path: &Path) -> Result<Vec<PitchingRecord>, ObservationError> {
    let file = std::fs::File::open(path).map_err(|e| ObservationError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let records = load_records_from_reader(file, &path.display().to_string())?;
    info!("loaded {} appearances from {}", records.len(), path.display());
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
