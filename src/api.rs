use serde::{Deserialize, Serialize};

use influence_index::account::AccountRecord;
use influence_index::config::{BusinessSettings, CreatorSettings, Settings};
use influence_index::scenarios::{OptimalityMode, ScenarioDefinition};

#[derive(Debug, Deserialize)]
pub struct ApiAccountRequest {
    pub request_id: Option<String>,
    pub record: AccountRecord,
    pub settings: Option<CreatorSettings>,
    pub scenarios: Option<Vec<ScenarioDefinition>>,
    pub optimality_mode: Option<String>,
}

impl ApiAccountRequest {
    /// Settings with the optional mode override applied.
    pub fn resolve_settings(&self, fallback: CreatorSettings) -> Result<CreatorSettings, String> {
        let mut settings = self.settings.clone().unwrap_or(fallback);
        if let Some(mode) = self.optimality_mode.as_deref() {
            settings.optimality_mode = mode.parse::<OptimalityMode>()?;
        }
        Ok(settings)
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiBatchRequest {
    pub request_id: Option<String>,
    pub records: Vec<AccountRecord>,
    pub settings: Option<BusinessSettings>,
}

/// Mode-tagged request: `settings.mode` decides between batch and single-account analysis.
#[derive(Debug, Deserialize)]
pub struct ApiAnalyzeRequest {
    pub request_id: Option<String>,
    pub settings: Settings,
    pub records: Vec<AccountRecord>,
    pub scenarios: Option<Vec<ScenarioDefinition>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiProbabilityQuery {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct ApiProbabilityResponse {
    pub key: String,
    pub probability: f64,
}

#[derive(Debug, Deserialize)]
pub struct ApiNewScenario {
    pub name: String,
    pub description: Option<String>,
    pub cost: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub request_id: String,
    pub result: T,
    pub warnings: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn new(request_id: String, result: T, warnings: Vec<String>) -> Self {
        Self {
            request_id,
            result,
            warnings,
        }
    }
}

/// Weight-sum drift is reported back to the caller, never corrected silently.
pub fn weight_warnings(settings: &Settings) -> Vec<String> {
    settings
        .weight_issues()
        .iter()
        .map(|issue| issue.to_string())
        .collect()
}
