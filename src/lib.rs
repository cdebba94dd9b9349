pub mod account;
pub mod business;
pub mod config;
pub mod error;
pub mod metrics;
pub mod scenarios;
pub mod store;
pub mod synthetic;

use serde::Serialize;
use tracing::{debug, info};

use crate::account::{validate_records, AccountRecord};
use crate::business::BatchAnalysis;
use crate::config::{BusinessSettings, CreatorSettings, Settings};
use crate::error::ValidationError;
use crate::metrics::MetricSet;
use crate::scenarios::{
    ProbabilityContext, ScenarioDefinition, ScenarioRanker, ScenarioResultSet, ScenarioSimulator,
};

pub use crate::scenarios::probability_for_key as scenario_probability_for_key;

/// Single-account result: the account's metrics and its projected scenarios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountAnalysis {
    pub account_id: String,
    pub record: AccountRecord,
    pub metrics: MetricSet,
    pub optimality_mode: scenarios::OptimalityMode,
    pub scenarios: ScenarioResultSet,
}

/// Scores one account and simulates every catalog scenario on it.
///
/// No validation happens here; pathological inputs degrade to 0, the 0.5
/// sentinel, or non-finite values. Use [`analyze`] to validate first.
pub fn analyze_single_account(
    record: &AccountRecord,
    settings: &CreatorSettings,
    catalog: &[ScenarioDefinition],
) -> AccountAnalysis {
    let account_id = record.account_id();
    let metrics = MetricSet::from_record(record, &settings.ii_weights, &settings.si_weights);
    let context = ProbabilityContext::new(metrics.base(), record);

    let simulator = ScenarioSimulator::new(
        &settings.scenario_parameters,
        &settings.ii_weights,
        &settings.si_weights,
    );
    let outcomes = simulator.simulate(&metrics, Some(&context), catalog);
    let ranker = ScenarioRanker::new(settings.optimality_weights, settings.optimality_mode);
    let scenarios = ScenarioResultSet::new(outcomes, &ranker);

    info!(
        account_id = %account_id,
        scenarios = scenarios.outcomes.len(),
        mode = settings.optimality_mode.label(),
        recommended = scenarios.rankings.recommended_scenario.as_deref().unwrap_or(""),
        "account analyzed"
    );

    AccountAnalysis {
        account_id,
        record: record.clone(),
        metrics,
        optimality_mode: settings.optimality_mode,
        scenarios,
    }
}

/// Scores a batch of accounts relative to each other and ranks them.
pub fn analyze_batch(records: &[AccountRecord], settings: &BusinessSettings) -> BatchAnalysis {
    let analysis = business::aggregate(records, &settings.ii_weights, &settings.si_weights);
    info!(
        accounts = analysis.accounts.len(),
        top_ii = analysis.ranking_by_ii.first().map(String::as_str).unwrap_or(""),
        top_si = analysis.ranking_by_si.first().map(String::as_str).unwrap_or(""),
        "batch analyzed"
    );
    analysis
}

/// An analysis call with its mode resolved up front.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Business {
        records: Vec<AccountRecord>,
        settings: BusinessSettings,
    },
    Creator {
        record: AccountRecord,
        settings: CreatorSettings,
        scenarios: Vec<ScenarioDefinition>,
    },
}

impl AnalysisRequest {
    pub fn new(
        settings: Settings,
        mut records: Vec<AccountRecord>,
        scenarios: Vec<ScenarioDefinition>,
    ) -> Result<Self, ValidationError> {
        match settings {
            Settings::Business(settings) => Ok(AnalysisRequest::Business { records, settings }),
            Settings::Creator(settings) => {
                if records.len() != 1 {
                    return Err(ValidationError::SingleAccountExpected(records.len()));
                }
                let record = records.remove(0);
                Ok(AnalysisRequest::Creator {
                    record,
                    settings,
                    scenarios,
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Analysis {
    Business(BatchAnalysis),
    Creator(AccountAnalysis),
}

/// Validates the input records, then dispatches to the matching analysis.
pub fn analyze(request: &AnalysisRequest) -> Result<Analysis, ValidationError> {
    match request {
        AnalysisRequest::Business { records, settings } => {
            validate_records(records)?;
            debug!(accounts = records.len(), "business request validated");
            Ok(Analysis::Business(analyze_batch(records, settings)))
        }
        AnalysisRequest::Creator {
            record,
            settings,
            scenarios,
        } => {
            record.validate()?;
            Ok(Analysis::Creator(analyze_single_account(record, settings, scenarios)))
        }
    }
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}
