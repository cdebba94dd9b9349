//! On-disk persistence for expert settings and the scenario catalog.
//!
//! Scoring never reads from here. Callers load what they need and pass it
//! into the analysis entry points explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{AnalysisMode, BusinessSettings, CreatorSettings, Settings};
use crate::error::StoreError;
use crate::scenarios::{self, ScenarioDefinition};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<Vec<ScenarioDefinition>>,
}

pub struct SettingsStore {
    path: PathBuf,
    state: Mutex<StoredState>,
}

impl SettingsStore {
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let state = if path.exists() {
            let data = tokio::fs::read_to_string(&path).await?;
            if data.trim().is_empty() {
                StoredState::default()
            } else {
                serde_json::from_str(&data)?
            }
        } else {
            StoredState::default()
        };
        debug!(path = %path.display(), "settings store loaded");

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn settings(&self, mode: AnalysisMode) -> Option<Settings> {
        let guard = self.state.lock().await;
        match mode {
            AnalysisMode::Business => guard.business.clone().map(Settings::Business),
            AnalysisMode::Creator => guard.creator.clone().map(Settings::Creator),
        }
    }

    pub async fn save_settings(&self, settings: Settings) -> Result<Settings, StoreError> {
        let mut guard = self.state.lock().await;
        match &settings {
            Settings::Business(business) => guard.business = Some(business.clone()),
            Settings::Creator(creator) => guard.creator = Some(creator.clone()),
        }
        self.persist(&guard).await?;
        info!(mode = settings.mode().label(), "settings saved");
        Ok(settings)
    }

    pub async fn scenarios(&self) -> Option<Vec<ScenarioDefinition>> {
        let guard = self.state.lock().await;
        guard.scenarios.clone()
    }

    pub async fn save_scenarios(
        &self,
        catalog: Vec<ScenarioDefinition>,
    ) -> Result<Vec<ScenarioDefinition>, StoreError> {
        let mut guard = self.state.lock().await;
        guard.scenarios = Some(catalog.clone());
        self.persist(&guard).await?;
        Ok(catalog)
    }

    /// Adds a scenario to the stored catalog, seeding it from `fallback` when
    /// nothing was stored yet. Returns the updated catalog.
    pub async fn add_scenario(
        &self,
        fallback: &[ScenarioDefinition],
        name: String,
        description: Option<String>,
        cost: Option<f64>,
    ) -> Result<Vec<ScenarioDefinition>, StoreError> {
        self.edit_catalog(fallback, |catalog| {
            scenarios::add_scenario(catalog, name, description, cost);
            true
        })
        .await
        .map(|(catalog, _)| catalog)
    }

    pub async fn toggle_scenario(
        &self,
        fallback: &[ScenarioDefinition],
        id: u32,
    ) -> Result<(Vec<ScenarioDefinition>, bool), StoreError> {
        self.edit_catalog(fallback, |catalog| scenarios::toggle_scenario(catalog, id))
            .await
    }

    pub async fn remove_scenario(
        &self,
        fallback: &[ScenarioDefinition],
        id: u32,
    ) -> Result<(Vec<ScenarioDefinition>, bool), StoreError> {
        self.edit_catalog(fallback, |catalog| scenarios::remove_scenario(catalog, id))
            .await
    }

    /// Drops stored settings but keeps the scenario catalog.
    pub async fn reset_settings(&self) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        guard.business = None;
        guard.creator = None;
        self.persist(&guard).await?;
        info!("stored settings cleared");
        Ok(())
    }

    async fn edit_catalog<F>(
        &self,
        fallback: &[ScenarioDefinition],
        edit: F,
    ) -> Result<(Vec<ScenarioDefinition>, bool), StoreError>
    where
        F: FnOnce(&mut Vec<ScenarioDefinition>) -> bool,
    {
        let mut guard = self.state.lock().await;
        let mut catalog = guard
            .scenarios
            .clone()
            .unwrap_or_else(|| fallback.to_vec());
        let changed = edit(&mut catalog);
        if changed {
            guard.scenarios = Some(catalog.clone());
            self.persist(&guard).await?;
        }
        Ok((catalog, changed))
    }

    async fn persist(&self, state: &StoredState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(state)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
