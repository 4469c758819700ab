use std::env;
use std::fmt;

mod provinces;

pub use provinces::{ProvinceCoordinates, ProvinceCentroid};

/// Distinguishes runtime behavior for different stages of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for a command-line run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub engine: EngineConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = EngineConfig::default();
        let forest = ForestConfig {
            seed: parse_var("ENGINE_SEED", defaults.forest.seed)?,
            n_trees: parse_var("ENGINE_TREES", defaults.forest.n_trees)?,
            test_fraction: parse_var("ENGINE_TEST_FRACTION", defaults.forest.test_fraction)?,
            ..defaults.forest
        };
        if forest.n_trees == 0 {
            return Err(ConfigError::InvalidValue {
                variable: "ENGINE_TREES",
                value: "0".to_string(),
            });
        }
        if !(forest.test_fraction > 0.0 && forest.test_fraction < 1.0) {
            return Err(ConfigError::InvalidValue {
                variable: "ENGINE_TEST_FRACTION",
                value: forest.test_fraction.to_string(),
            });
        }

        let identifier_policy = if parse_flag("ENGINE_ALLOW_MISSING_IDENTIFIER", false)? {
            IdentifierPolicy::AllowEmptyKey
        } else {
            IdentifierPolicy::Require
        };

        let engine = EngineConfig {
            forest,
            train_model: parse_flag("ENGINE_TRAIN_MODEL", defaults.train_model)?,
            identifier_policy,
            top_predictions: parse_var("ENGINE_TOP_PREDICTIONS", defaults.top_predictions)?,
            ..defaults
        };

        Ok(Self {
            environment,
            engine,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { variable, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(variable: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(variable) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { variable, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

/// Immutable settings threaded into every pipeline component.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub risk_bins: RiskBins,
    pub forest: ForestConfig,
    pub train_model: bool,
    pub identifier_policy: IdentifierPolicy,
    pub provinces: ProvinceCoordinates,
    pub top_predictions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_bins: RiskBins::default(),
            forest: ForestConfig::default(),
            train_model: true,
            identifier_policy: IdentifierPolicy::Require,
            provinces: ProvinceCoordinates::south_africa(),
            top_predictions: 20,
        }
    }
}

/// How to treat a snapshot that has no `Registration Number` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Refuse the snapshot.
    Require,
    /// Give every record the empty key; all such records match each other.
    AllowEmptyKey,
}

/// Right-closed bucket edges `(e0, e1]`, `(e1, e2]`, `(e2, e3]` for LOW, MEDIUM and HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskBins {
    edges: [i32; 4],
}

impl RiskBins {
    pub fn new(edges: [i32; 4]) -> Result<Self, ConfigError> {
        let increasing = edges.windows(2).all(|pair| pair[0] < pair[1]);
        if !increasing || edges[0] >= 0 || edges[3] < 100 {
            return Err(ConfigError::InvalidRiskBins { edges });
        }
        Ok(Self { edges })
    }

    pub fn edges(&self) -> [i32; 4] {
        self.edges
    }

    pub fn low_ceiling(&self) -> i32 {
        self.edges[1]
    }

    pub fn medium_ceiling(&self) -> i32 {
        self.edges[2]
    }
}

impl Default for RiskBins {
    fn default() -> Self {
        Self {
            edges: [-1, 30, 60, 100],
        }
    }
}

/// Class weighting applied while growing trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassWeighting {
    /// Weight each class by `n_samples / (n_classes * class_count)`.
    Balanced,
    Uniform,
}

/// Hyperparameters for the HIGH-risk random forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub class_weighting: ClassWeighting,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            seed: 42,
            test_fraction: 0.2,
            class_weighting: ClassWeighting::Balanced,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue {
        variable: &'static str,
        value: String,
    },
    InvalidRiskBins {
        edges: [i32; 4],
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { variable, value } => {
                write!(f, "{variable} has an invalid value '{value}'")
            }
            ConfigError::InvalidRiskBins { edges } => write!(
                f,
                "risk bins {edges:?} must be strictly increasing, start below 0 and end at or above 100"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for variable in [
            "APP_ENV",
            "APP_LOG_LEVEL",
            "ENGINE_SEED",
            "ENGINE_TREES",
            "ENGINE_TEST_FRACTION",
            "ENGINE_TRAIN_MODEL",
            "ENGINE_ALLOW_MISSING_IDENTIFIER",
            "ENGINE_TOP_PREDICTIONS",
        ] {
            env::remove_var(variable);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.engine.forest.n_trees, 200);
        assert_eq!(config.engine.forest.seed, 42);
    }

    #[test]
    fn load_reads_engine_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ENGINE_SEED", "7");
        env::set_var("ENGINE_TREES", "25");
        env::set_var("ENGINE_TRAIN_MODEL", "no");
        env::set_var("ENGINE_ALLOW_MISSING_IDENTIFIER", "true");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.engine.forest.seed, 7);
        assert_eq!(config.engine.forest.n_trees, 25);
        assert!(!config.engine.train_model);
        assert_eq!(
            config.engine.identifier_policy,
            IdentifierPolicy::AllowEmptyKey
        );
    }

    #[test]
    fn load_rejects_out_of_range_test_fraction() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ENGINE_TEST_FRACTION", "1.5");
        let error = AppConfig::load().expect_err("fraction rejected");
        reset_env();

        match error {
            ConfigError::InvalidValue { variable, .. } => {
                assert_eq!(variable, "ENGINE_TEST_FRACTION")
            }
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn risk_bins_require_full_score_coverage() {
        assert!(RiskBins::new([-1, 30, 60, 100]).is_ok());
        assert!(RiskBins::new([0, 30, 60, 100]).is_err());
        assert!(RiskBins::new([-1, 60, 30, 100]).is_err());
        assert!(RiskBins::new([-1, 30, 60, 99]).is_err());
    }
}
