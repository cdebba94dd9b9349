pub mod probability;
pub mod ranking;
pub mod simulator;

use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use probability::{probability_for_key, scenario_probability, ProbabilityContext};
pub use ranking::{OptimalityMode, OptimalityWeights, ScenarioRanker, ScenarioRankings};
pub use simulator::ScenarioSimulator;

/// Highest id reserved for the built-in scenarios.
pub const RESERVED_SCENARIO_IDS: u32 = 4;

const CUSTOM_KEY_PREFIX: &str = "custom_scenario_";

/// Which perturbation rule a scenario runs. Every id outside the reserved
/// range falls into `Custom`, which applies the generic rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    Activity,
    Engagement,
    Collaboration,
    Education,
    Custom(u32),
}

impl ScenarioKind {
    pub const BUILT_IN: [ScenarioKind; 4] = [
        ScenarioKind::Activity,
        ScenarioKind::Engagement,
        ScenarioKind::Collaboration,
        ScenarioKind::Education,
    ];

    pub fn from_id(id: u32) -> Self {
        match id {
            1 => ScenarioKind::Activity,
            2 => ScenarioKind::Engagement,
            3 => ScenarioKind::Collaboration,
            4 => ScenarioKind::Education,
            other => ScenarioKind::Custom(other),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "activity_scenario" => Some(ScenarioKind::Activity),
            "engagement_scenario" => Some(ScenarioKind::Engagement),
            "collaboration_scenario" => Some(ScenarioKind::Collaboration),
            "education_scenario" => Some(ScenarioKind::Education),
            other => other
                .strip_prefix(CUSTOM_KEY_PREFIX)
                .and_then(|id| id.parse::<u32>().ok())
                .map(ScenarioKind::Custom),
        }
    }

    pub fn id(self) -> u32 {
        match self {
            ScenarioKind::Activity => 1,
            ScenarioKind::Engagement => 2,
            ScenarioKind::Collaboration => 3,
            ScenarioKind::Education => 4,
            ScenarioKind::Custom(id) => id,
        }
    }

    pub fn key(self) -> String {
        match self {
            ScenarioKind::Activity => "activity_scenario".to_string(),
            ScenarioKind::Engagement => "engagement_scenario".to_string(),
            ScenarioKind::Collaboration => "collaboration_scenario".to_string(),
            ScenarioKind::Education => "education_scenario".to_string(),
            ScenarioKind::Custom(id) => format!("{}{}", CUSTOM_KEY_PREFIX, id),
        }
    }

    pub fn is_built_in(self) -> bool {
        !matches!(self, ScenarioKind::Custom(_))
    }

    pub fn default_name(self) -> &'static str {
        match self {
            ScenarioKind::Activity => "Increase activity",
            ScenarioKind::Engagement => "Boost engagement",
            ScenarioKind::Collaboration => "Collaborations",
            ScenarioKind::Education => "Educational content",
            ScenarioKind::Custom(_) => "Custom scenario",
        }
    }

    pub fn default_description(self) -> &'static str {
        match self {
            ScenarioKind::Activity => "Post more often and keep a steadier publishing schedule",
            ScenarioKind::Engagement => "Improve content quality to lift engagement",
            ScenarioKind::Collaboration => "Collaborate with other creators to reach new audiences",
            ScenarioKind::Education => "Publish educational content that invites discussion",
            ScenarioKind::Custom(_) => "",
        }
    }
}

/// One entry of the caller's scenario catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub id: u32,
    pub name: String,
    #[serde(rename = "isActive", alias = "is_active", default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

fn default_active() -> bool {
    true
}

impl ScenarioDefinition {
    pub fn kind(&self) -> ScenarioKind {
        ScenarioKind::from_id(self.id)
    }

    pub fn key(&self) -> String {
        self.kind().key()
    }
}

/// The four reserved scenarios, all active.
pub fn default_scenarios() -> Vec<ScenarioDefinition> {
    ScenarioKind::BUILT_IN
        .iter()
        .map(|kind| ScenarioDefinition {
            id: kind.id(),
            name: kind.default_name().to_string(),
            is_active: true,
            description: None,
            cost: None,
        })
        .collect()
}

/// Appends a new active scenario with the next free id and returns that id.
pub fn add_scenario(
    catalog: &mut Vec<ScenarioDefinition>,
    name: String,
    description: Option<String>,
    cost: Option<f64>,
) -> u32 {
    let id = catalog
        .iter()
        .map(|scenario| scenario.id)
        .max()
        .unwrap_or(0)
        .max(RESERVED_SCENARIO_IDS)
        + 1;
    catalog.push(ScenarioDefinition {
        id,
        name,
        is_active: true,
        description,
        cost,
    });
    id
}

pub fn toggle_scenario(catalog: &mut [ScenarioDefinition], id: u32) -> bool {
    match catalog.iter_mut().find(|scenario| scenario.id == id) {
        Some(scenario) => {
            scenario.is_active = !scenario.is_active;
            true
        }
        None => false,
    }
}

/// Removes a caller-defined scenario. Reserved ids are never removed.
pub fn remove_scenario(catalog: &mut Vec<ScenarioDefinition>, id: u32) -> bool {
    if id <= RESERVED_SCENARIO_IDS {
        return false;
    }
    let before = catalog.len();
    catalog.retain(|scenario| scenario.id != id);
    catalog.len() != before
}

/// Magnitude knobs of the built-in rules and the cost of every scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParameters {
    pub post_frequency_delta: f64,
    pub engagement_target: f64,
    pub mentions_delta: f64,
    pub cost_activity: f64,
    pub cost_engagement: f64,
    pub cost_collaboration: f64,
    pub cost_education: f64,
    /// Costs of caller-defined scenarios, keyed by scenario key.
    pub custom_costs: BTreeMap<String, f64>,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            post_frequency_delta: 2.0,
            engagement_target: 1.5,
            mentions_delta: 3.0,
            cost_activity: 0.2,
            cost_engagement: 0.2,
            cost_collaboration: 0.4,
            cost_education: 0.2,
            custom_costs: BTreeMap::new(),
        }
    }
}

impl ScenarioParameters {
    /// Cost of a built-in comes from the parameters; a custom scenario uses its
    /// own cost, then `custom_costs`, then 0.
    pub fn cost_for(&self, definition: &ScenarioDefinition) -> f64 {
        match definition.kind() {
            ScenarioKind::Activity => self.cost_activity,
            ScenarioKind::Engagement => self.cost_engagement,
            ScenarioKind::Collaboration => self.cost_collaboration,
            ScenarioKind::Education => self.cost_education,
            ScenarioKind::Custom(_) => definition
                .cost
                .or_else(|| self.custom_costs.get(&definition.key()).copied())
                .unwrap_or(0.0),
        }
    }

    pub fn built_in_cost_sum(&self) -> f64 {
        self.cost_activity + self.cost_engagement + self.cost_collaboration + self.cost_education
    }

    pub fn scale_built_in_costs(&mut self, factor: f64) {
        self.cost_activity *= factor;
        self.cost_engagement *= factor;
        self.cost_collaboration *= factor;
        self.cost_education *= factor;
    }
}

/// Projected effect of one scenario on one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDescriptor {
    pub name: String,
    pub delta_ii: f64,
    pub delta_si: f64,
    pub cost: f64,
    pub description: String,
    pub probability: f64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub key: String,
    pub kind: ScenarioKind,
    pub descriptor: ScenarioDescriptor,
}

/// Every simulated scenario in catalog order plus the three rankings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResultSet {
    pub outcomes: Vec<ScenarioOutcome>,
    pub rankings: ScenarioRankings,
}

impl ScenarioResultSet {
    pub fn new(outcomes: Vec<ScenarioOutcome>, ranker: &ScenarioRanker) -> Self {
        let rankings = ranker.rank(&outcomes);
        Self { outcomes, rankings }
    }

    pub fn get(&self, key: &str) -> Option<&ScenarioDescriptor> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.key == key)
            .map(|outcome| &outcome.descriptor)
    }

    pub fn recommended(&self) -> Option<&ScenarioDescriptor> {
        self.rankings
            .recommended_scenario
            .as_deref()
            .and_then(|key| self.get(key))
    }
}

struct OrderedScenarios<'a>(&'a [ScenarioOutcome]);

impl Serialize for OrderedScenarios<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.0
                .iter()
                .map(|outcome| (outcome.key.as_str(), &outcome.descriptor)),
        )
    }
}

impl Serialize for ScenarioResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScenarioResultSet", 5)?;
        state.serialize_field("scenarios", &OrderedScenarios(&self.outcomes))?;
        state.serialize_field("suitability_ranking", &self.rankings.suitability_ranking)?;
        state.serialize_field("superiority_ranking", &self.rankings.superiority_ranking)?;
        state.serialize_field("optimality_ranking", &self.rankings.optimality_ranking)?;
        state.serialize_field("recommended_scenario", &self.rankings.recommended_scenario)?;
        state.end()
    }
}
