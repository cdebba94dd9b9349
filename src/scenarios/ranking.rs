use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::scenarios::ScenarioOutcome;

/// Weights of the optimality score: alpha on delta II, beta on delta SI,
/// gamma on (inverted) cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalityWeights {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for OptimalityWeights {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.3,
            gamma: 0.2,
        }
    }
}

impl OptimalityWeights {
    pub fn sum(&self) -> f64 {
        self.alpha + self.beta + self.gamma
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            alpha: self.alpha * factor,
            beta: self.beta * factor,
            gamma: self.gamma * factor,
        }
    }
}

/// The two optimality formulas. They can disagree on the recommended scenario
/// for the same data, so the caller picks one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimalityMode {
    /// Deltas and cost divided by their maxima over the candidate scenarios.
    #[default]
    Normalized,
    /// `alpha * delta_ii + beta * delta_si - gamma * cost` on raw values.
    Raw,
}

impl FromStr for OptimalityMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "normalized" | "normalised" => Ok(OptimalityMode::Normalized),
            "raw" | "linear" => Ok(OptimalityMode::Raw),
            _ => Err(format!("invalid optimality mode: {}", value)),
        }
    }
}

impl OptimalityMode {

    pub fn label(self) -> &'static str {
        match self {
            OptimalityMode::Normalized => "normalized",
            OptimalityMode::Raw => "raw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScenarioRankings {
    pub suitability_ranking: Vec<String>,
    pub superiority_ranking: Vec<String>,
    pub optimality_ranking: Vec<String>,
    pub recommended_scenario: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScenarioRanker {
    weights: OptimalityWeights,
    mode: OptimalityMode,
}

impl ScenarioRanker {
    pub fn new(weights: OptimalityWeights, mode: OptimalityMode) -> Self {
        Self { weights, mode }
    }

    /// Ranks the active scenarios. All sorts are stable, so ties keep catalog order.
    pub fn rank(&self, outcomes: &[ScenarioOutcome]) -> ScenarioRankings {
        let candidates: Vec<&ScenarioOutcome> = outcomes
            .iter()
            .filter(|outcome| outcome.descriptor.active)
            .collect();

        let mut by_cost = candidates.clone();
        by_cost.sort_by(|a, b| compare(a.descriptor.cost, b.descriptor.cost));

        let mut by_delta_ii = candidates.clone();
        by_delta_ii.sort_by(|a, b| compare(b.descriptor.delta_ii, a.descriptor.delta_ii));

        let mut by_optimality: Vec<(&ScenarioOutcome, f64)> = candidates
            .iter()
            .copied()
            .zip(self.optimality_scores(&candidates))
            .collect();
        by_optimality.sort_by(|a, b| compare(b.1, a.1));

        let optimality_ranking: Vec<String> = by_optimality
            .iter()
            .map(|(outcome, _)| outcome.key.clone())
            .collect();
        let recommended_scenario = optimality_ranking.first().cloned();

        ScenarioRankings {
            suitability_ranking: keys(&by_cost),
            superiority_ranking: keys(&by_delta_ii),
            optimality_ranking,
            recommended_scenario,
        }
    }

    /// Optimality score of each candidate, in input order.
    pub fn optimality_scores(&self, candidates: &[&ScenarioOutcome]) -> Vec<f64> {
        let weights = &self.weights;
        match self.mode {
            OptimalityMode::Raw => candidates
                .iter()
                .map(|outcome| {
                    let scenario = &outcome.descriptor;
                    weights.alpha * scenario.delta_ii + weights.beta * scenario.delta_si
                        - weights.gamma * scenario.cost
                })
                .collect(),
            OptimalityMode::Normalized => {
                let max_delta_ii = max_of(candidates.iter().map(|o| o.descriptor.delta_ii));
                let max_delta_si = max_of(candidates.iter().map(|o| o.descriptor.delta_si));
                let max_cost = max_of(candidates.iter().map(|o| o.descriptor.cost));

                candidates
                    .iter()
                    .map(|outcome| {
                        let scenario = &outcome.descriptor;
                        let norm_delta_ii = if max_delta_ii > 0.0 {
                            scenario.delta_ii / max_delta_ii
                        } else {
                            0.0
                        };
                        let norm_delta_si = if max_delta_si > 0.0 {
                            scenario.delta_si / max_delta_si
                        } else {
                            0.0
                        };
                        // A non-positive maximum cost drops the cost term entirely.
                        let cost_score = if max_cost > 0.0 {
                            1.0 - scenario.cost / max_cost
                        } else {
                            0.0
                        };
                        weights.alpha * norm_delta_ii
                            + weights.beta * norm_delta_si
                            + weights.gamma * cost_score
                    })
                    .collect()
            }
        }
    }
}

fn compare(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

fn keys(outcomes: &[&ScenarioOutcome]) -> Vec<String> {
    outcomes.iter().map(|outcome| outcome.key.clone()).collect()
}
