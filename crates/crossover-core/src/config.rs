// Configuration loading and validation (config/crossover.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the single settings file under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "crossover.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// crossover.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataPaths,
    #[serde(default)]
    pub weights: IndexWeights,
    #[serde(default)]
    pub factor: FactorConfig,
    #[serde(default)]
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// CSV file with one row per (pitcher, appearance date).
    pub observations: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexWeights {
    #[serde(default)]
    pub environment: EnvironmentWeights,
    #[serde(default)]
    pub skill: SkillWeights,
}

/// Weights of the environment composite over z-scored inputs.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnvironmentWeights {
    pub temperature: f64,
    pub travel: f64,
    pub venue: f64,
}

impl Default for EnvironmentWeights {
    fn default() -> Self {
        EnvironmentWeights {
            temperature: 0.433381,
            travel: 0.437590,
            venue: 0.129029,
        }
    }
}

/// Weights of the skill composite over z-scored inputs.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SkillWeights {
    pub era: f64,
    pub whip: f64,
    pub fastball_avg: f64,
}

impl Default for SkillWeights {
    fn default() -> Self {
        SkillWeights {
            era: 0.402767,
            whip: 0.503297,
            fastball_avg: 0.093936,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FactorConfig {
    pub seed: u64,
    pub max_iter: usize,
    /// Stop once the log-likelihood gains less than this per iteration.
    pub tol: f64,
}

impl Default for FactorConfig {
    fn default() -> Self {
        FactorConfig {
            seed: 42,
            max_iter: 1000,
            tol: 1e-2,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SolverConfig {
    pub fatigue_coef_epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            fatigue_coef_epsilon: 1e-9,
        }
    }
}

impl Config {
    /// Config pointing at `observations` with every tunable at its default.
    pub fn with_observations(observations: impl Into<String>) -> Self {
        Config {
            data: DataPaths {
                observations: observations.into(),
            },
            weights: IndexWeights::default(),
            factor: FactorConfig::default(),
            solver: SolverConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/crossover.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for the startup path.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Copy every `defaults/*.toml` missing from `config/`. Existing files are
/// never overwritten. Returns the paths that were created.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(copy_error(format!(
            "neither defaults/ nor config/ directory found in {}; \
             run from the project root",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create {}: {e}", config_dir.display())))?;

    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("failed to read {}: {e}", defaults_dir.display())))?;

    let mut copied = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("failed to read defaults entry: {e}")))?
            .path();
        let is_toml = source.extension().and_then(|ext| ext.to_str()) == Some("toml");
        if !source.is_file() || !is_toml {
            continue;
        }
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);
        if copy_default(&source, &target)? {
            info!("copied default config {}", target.display());
            copied.push(target);
        }
    }

    Ok(copied)
}

/// Create `target` with the contents of `source`. `false` if it already exists.
fn copy_default(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("failed to create {}: {e}", target.display()))),
    };
    let content = std::fs::read(source)
        .map_err(|e| copy_error(format!("failed to read {}: {e}", source.display())))?;
    std::io::Write::write_all(&mut dest, &content)
        .map_err(|e| copy_error(format!("failed to write {}: {e}", target.display())))?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.observations.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.observations".into(),
            message: "must not be empty".into(),
        });
    }

    let env = &config.weights.environment;
    let skill = &config.weights.skill;
    let weight_fields: &[(&str, f64)] = &[
        ("weights.environment.temperature", env.temperature),
        ("weights.environment.travel", env.travel),
        ("weights.environment.venue", env.venue),
        ("weights.skill.era", skill.era),
        ("weights.skill.whip", skill.whip),
        ("weights.skill.fastball_avg", skill.fastball_avg),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be finite and >= 0, got {val}"),
            });
        }
    }

    let group_sums: &[(&str, f64)] = &[
        (
            "weights.environment",
            env.temperature + env.travel + env.venue,
        ),
        ("weights.skill", skill.era + skill.whip + skill.fastball_avg),
    ];
    for (name, sum) in group_sums {
        if *sum <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "at least one weight must be > 0".into(),
            });
        }
    }

    if config.factor.max_iter == 0 {
        return Err(ConfigError::ValidationError {
            field: "factor.max_iter".into(),
            message: "must be > 0".into(),
        });
    }

    let tol = config.factor.tol;
    if !tol.is_finite() || tol <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "factor.tol".into(),
            message: format!("must be finite and > 0, got {tol}"),
        });
    }

    let eps = config.solver.fatigue_coef_epsilon;
    if !eps.is_finite() || eps <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "solver.fatigue_coef_epsilon".into(),
            message: format!("must be finite and > 0, got {eps}"),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
