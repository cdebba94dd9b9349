//! Heuristic odds, in percent, that a scenario works out for an account.
//!
//! The estimate reads the account as it is today, before any perturbation, so
//! it is independent of the projected index deltas.

use crate::account::AccountRecord;
use crate::metrics::BaseMetrics;
use crate::scenarios::ScenarioKind;

/// Inputs the probability heuristics read: base metrics plus the raw
/// interaction counters the education estimate needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityContext {
    pub metrics: BaseMetrics,
    pub likes: f64,
    pub comments: f64,
}

impl ProbabilityContext {
    pub fn new(metrics: &BaseMetrics, record: &AccountRecord) -> Self {
        Self {
            metrics: *metrics,
            likes: record.likes,
            comments: record.comments,
        }
    }
}

const UNKNOWN_SCENARIO_PROBABILITY: f64 = 60.0;

pub fn scenario_probability(kind: ScenarioKind, context: Option<&ProbabilityContext>) -> f64 {
    let Some(context) = context else {
        return default_probability(kind);
    };
    let metrics = &context.metrics;

    let estimate = match kind {
        ScenarioKind::Activity => {
            let post_frequency_factor = (1.0 - metrics.post_frequency / 10.0).max(0.0);
            let stability_factor = (1.0 - metrics.activity_stability).max(0.0);
            70.0 * post_frequency_factor + 30.0 * stability_factor
        }
        ScenarioKind::Engagement => {
            let engagement_factor = (1.0 - metrics.engagement_rate / 15.0).max(0.0);
            60.0 + 40.0 * engagement_factor
        }
        ScenarioKind::Collaboration => {
            let mentions_factor = (metrics.mentions / 20.0).min(1.0);
            let reach_factor = (metrics.avg_reach / 10_000.0).min(1.0);
            60.0 * mentions_factor + 40.0 * reach_factor
        }
        ScenarioKind::Education => {
            let comment_share = context.comments / context.likes.max(1.0);
            let comment_factor = (1.0 - comment_share / 0.2).max(0.0);
            let growth_factor = (metrics.growth_rate / 10.0).min(1.0);
            50.0 + 30.0 * comment_factor + 20.0 * growth_factor
        }
        ScenarioKind::Custom(_) => UNKNOWN_SCENARIO_PROBABILITY,
    };

    clamp_percent(estimate)
}

/// Probability by scenario key; keys that name no known scenario get the
/// generic default.
pub fn probability_for_key(key: &str, context: Option<&ProbabilityContext>) -> f64 {
    match ScenarioKind::from_key(key) {
        Some(kind) => scenario_probability(kind, context),
        None => UNKNOWN_SCENARIO_PROBABILITY,
    }
}

fn default_probability(kind: ScenarioKind) -> f64 {
    match kind {
        ScenarioKind::Activity => 70.0,
        ScenarioKind::Engagement => 85.0,
        ScenarioKind::Collaboration => 50.0,
        ScenarioKind::Education => 65.0,
        ScenarioKind::Custom(_) => UNKNOWN_SCENARIO_PROBABILITY,
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(100.0)
}
