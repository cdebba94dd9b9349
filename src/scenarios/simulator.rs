use crate::metrics::{normalize, BaseMetrics, IIWeights, MetricSet, SIWeights};
use crate::scenarios::{
    scenario_probability, ProbabilityContext, ScenarioDefinition, ScenarioDescriptor, ScenarioKind,
    ScenarioOutcome, ScenarioParameters,
};

/// Projects each catalog scenario onto a computed metric set.
#[derive(Debug, Clone)]
pub struct ScenarioSimulator<'a> {
    parameters: &'a ScenarioParameters,
    ii_weights: &'a IIWeights,
    si_weights: &'a SIWeights,
}

impl<'a> ScenarioSimulator<'a> {
    pub fn new(
        parameters: &'a ScenarioParameters,
        ii_weights: &'a IIWeights,
        si_weights: &'a SIWeights,
    ) -> Self {
        Self {
            parameters,
            ii_weights,
            si_weights,
        }
    }

    /// The metric set as it would look after the scenario, indices recomputed.
    /// `metrics` itself is left untouched.
    pub fn apply(&self, kind: ScenarioKind, metrics: &MetricSet) -> MetricSet {
        let parameters = self.parameters;
        metrics.perturbed(self.ii_weights, self.si_weights, |base| match kind {
            ScenarioKind::Activity => {
                base.post_frequency += parameters.post_frequency_delta;
                base.activity_stability = (base.activity_stability * 1.2).min(1.0);
            }
            ScenarioKind::Engagement => {
                base.engagement_rate *= parameters.engagement_target;
                base.avg_reach *= 1.15;
            }
            ScenarioKind::Collaboration => {
                base.mentions += parameters.mentions_delta;
                base.avg_reach *= 1.3;
                base.engagement_rate *= 1.1;
            }
            ScenarioKind::Education => {
                base.engagement_rate *= 1.3;
                base.avg_reach *= 1.25;
            }
            ScenarioKind::Custom(_) => {
                base.engagement_rate *= 1.3;
                rescale_to_reference_ranges(base);
            }
        })
    }

    pub fn outcome(
        &self,
        definition: &ScenarioDefinition,
        metrics: &MetricSet,
        context: Option<&ProbabilityContext>,
    ) -> ScenarioOutcome {
        let kind = definition.kind();
        let projected = self.apply(kind, metrics);

        let probability = if definition.is_active {
            scenario_probability(kind, context)
        } else {
            0.0
        };

        let name = if definition.name.trim().is_empty() {
            kind.default_name().to_string()
        } else {
            definition.name.clone()
        };
        let description = definition
            .description
            .clone()
            .filter(|description| !description.trim().is_empty())
            .unwrap_or_else(|| kind.default_description().to_string());

        ScenarioOutcome {
            key: kind.key(),
            kind,
            descriptor: ScenarioDescriptor {
                name,
                delta_ii: projected.influence_index() - metrics.influence_index(),
                delta_si: projected.sustainability_index() - metrics.sustainability_index(),
                cost: self.parameters.cost_for(definition),
                description,
                probability,
                active: definition.is_active,
            },
        }
    }

    /// One outcome per catalog entry, in catalog order.
    pub fn simulate(
        &self,
        metrics: &MetricSet,
        context: Option<&ProbabilityContext>,
        catalog: &[ScenarioDefinition],
    ) -> Vec<ScenarioOutcome> {
        catalog
            .iter()
            .map(|definition| self.outcome(definition, metrics, context))
            .collect()
    }
}

/// Generic rule's rescale of selected metrics into [0, 1] against fixed reference ranges.
fn rescale_to_reference_ranges(base: &mut BaseMetrics) {
    base.followers_ratio = normalize(base.followers_ratio, 0.0, 10.0);
    base.growth_rate = normalize(base.growth_rate, 0.0, 0.5);
    base.engagement_rate = normalize(base.engagement_rate, 0.0, 0.3);
    base.post_frequency = normalize(base.post_frequency, 0.0, 14.0);
    base.mentions = normalize(base.mentions, 0.0, 100.0);
}
