use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::metrics::{IIWeights, SIWeights};
use crate::scenarios::{default_scenarios, OptimalityMode, OptimalityWeights, ScenarioDefinition, ScenarioParameters};

/// Allowed drift of a weight group's sum from 1.0 before it is reported.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessSettings {
    pub ii_weights: IIWeights,
    pub si_weights: SIWeights,
    pub optimality_weights: OptimalityWeights,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorSettings {
    pub optimality_mode: OptimalityMode,
    pub ii_weights: IIWeights,
    pub si_weights: SIWeights,
    pub scenario_parameters: ScenarioParameters,
    pub optimality_weights: OptimalityWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Business,
    Creator,
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "business" => Ok(AnalysisMode::Business),
            "creator" | "blogger" => Ok(AnalysisMode::Creator),
            _ => Err(format!("unknown analysis mode: {}", value)),
        }
    }
}

impl AnalysisMode {

    pub fn label(self) -> &'static str {
        match self {
            AnalysisMode::Business => "business",
            AnalysisMode::Creator => "creator",
        }
    }
}

/// Mode-specific settings, discriminated by the `mode` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Settings {
    Business(BusinessSettings),
    Creator(CreatorSettings),
}

/// A weight group whose sum is not 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightIssue {
    pub group: &'static str,
    pub sum: f64,
}

impl std::fmt::Display for WeightIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} weights must sum to 1.0, current sum: {:.2}", self.group, self.sum)
    }
}

impl Settings {
    pub fn mode(&self) -> AnalysisMode {
        match self {
            Settings::Business(_) => AnalysisMode::Business,
            Settings::Creator(_) => AnalysisMode::Creator,
        }
    }

    /// Weight groups that drift from 1.0. The formulas use weights as given;
    /// whether to normalize is left to the caller.
    pub fn weight_issues(&self) -> Vec<WeightIssue> {
        let (ii_weights, si_weights) = match self {
            Settings::Business(settings) => (&settings.ii_weights, &settings.si_weights),
            Settings::Creator(settings) => (&settings.ii_weights, &settings.si_weights),
        };

        let mut sums = vec![("II", ii_weights.sum()), ("SI", si_weights.sum())];
        match self {
            Settings::Business(settings) => sums.push(("optimality", settings.optimality_weights.sum())),
            Settings::Creator(settings) => {
                sums.push(("scenario cost", settings.scenario_parameters.built_in_cost_sum()))
            }
        }

        sums.into_iter()
            .filter(|(_, sum)| (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE)
            .map(|(group, sum)| WeightIssue { group, sum })
            .collect()
    }

    /// A copy with every positive-sum weight group rescaled to sum to 1.0.
    pub fn normalized(&self) -> Self {
        match self {
            Settings::Business(settings) => {
                let mut settings = settings.clone();
                settings.ii_weights = settings.ii_weights.scaled(rescale_factor(settings.ii_weights.sum()));
                settings.si_weights = settings.si_weights.scaled(rescale_factor(settings.si_weights.sum()));
                settings.optimality_weights = settings
                    .optimality_weights
                    .scaled(rescale_factor(settings.optimality_weights.sum()));
                Settings::Business(settings)
            }
            Settings::Creator(settings) => {
                let mut settings = settings.clone();
                settings.ii_weights = settings.ii_weights.scaled(rescale_factor(settings.ii_weights.sum()));
                settings.si_weights = settings.si_weights.scaled(rescale_factor(settings.si_weights.sum()));
                let cost_sum = settings.scenario_parameters.built_in_cost_sum();
                settings
                    .scenario_parameters
                    .scale_built_in_costs(rescale_factor(cost_sum));
                Settings::Creator(settings)
            }
        }
    }
}

fn rescale_factor(sum: f64) -> f64 {
    if sum > 0.0 {
        1.0 / sum
    } else {
        1.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub business: BusinessSettings,
    pub creator: CreatorSettings,
    pub scenarios: Vec<ScenarioDefinition>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            business: BusinessSettings::default(),
            creator: CreatorSettings::default(),
            scenarios: default_scenarios(),
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
                toml::from_str(&contents)?
            }
            _ => AnalysisConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }
        let payload = toml::to_string_pretty(self)?;
        std::fs::write(path, payload).map_err(ConfigError::Write)?;
        Ok(())
    }

    pub fn settings(&self, mode: AnalysisMode) -> Settings {
        match mode {
            AnalysisMode::Business => Settings::Business(self.business.clone()),
            AnalysisMode::Creator => Settings::Creator(self.creator.clone()),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(mode) = env::var("INFLUENCE_OPTIMALITY_MODE") {
            if let Ok(mode) = mode.parse::<OptimalityMode>() {
                self.creator.optimality_mode = mode;
            }
        }
        let parameters = &mut self.creator.scenario_parameters;
        if let Some(value) = env_f64("INFLUENCE_POST_FREQUENCY_DELTA") {
            parameters.post_frequency_delta = value;
        }
        if let Some(value) = env_f64("INFLUENCE_ENGAGEMENT_TARGET") {
            parameters.engagement_target = value;
        }
        if let Some(value) = env_f64("INFLUENCE_MENTIONS_DELTA") {
            parameters.mentions_delta = value;
        }
    }
}

fn env_f64(name: &str) -> Option<f64> {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

fn default_config_path() -> Option<PathBuf> {
    env::var("INFLUENCE_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/influence.toml")))
}
