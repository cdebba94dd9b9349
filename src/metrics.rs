use serde::{Deserialize, Serialize};

use crate::account::AccountRecord;

/// Weights of the five Influence Index terms. Expected to sum to 1.0, not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IIWeights {
    pub followers_ratio: f64,
    pub engagement_rate: f64,
    pub post_frequency: f64,
    pub reach: f64,
    pub mentions: f64,
}

impl Default for IIWeights {
    fn default() -> Self {
        Self {
            followers_ratio: 0.2,
            engagement_rate: 0.3,
            post_frequency: 0.2,
            reach: 0.2,
            mentions: 0.1,
        }
    }
}

impl IIWeights {
    pub fn sum(&self) -> f64 {
        self.followers_ratio + self.engagement_rate + self.post_frequency + self.reach + self.mentions
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            followers_ratio: self.followers_ratio * factor,
            engagement_rate: self.engagement_rate * factor,
            post_frequency: self.post_frequency * factor,
            reach: self.reach * factor,
            mentions: self.mentions * factor,
        }
    }
}

/// Weights of the three Sustainability Index consistency terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SIWeights {
    pub engagement_consistency: f64,
    pub posting_consistency: f64,
    pub reach_consistency: f64,
}

impl Default for SIWeights {
    fn default() -> Self {
        Self {
            engagement_consistency: 0.4,
            posting_consistency: 0.3,
            reach_consistency: 0.3,
        }
    }
}

impl SIWeights {
    pub fn sum(&self) -> f64 {
        self.engagement_consistency + self.posting_consistency + self.reach_consistency
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            engagement_consistency: self.engagement_consistency * factor,
            posting_consistency: self.posting_consistency * factor,
            reach_consistency: self.reach_consistency * factor,
        }
    }
}

/// Stability score used when a standard deviation was never measured.
pub const UNKNOWN_STABILITY: f64 = 0.5;

/// The seven base metrics plus the passthrough deviations.
///
/// `engagement_rate_std` and `reach_std` stay `None` when the input did not
/// carry them, so an unknown stability is never mistaken for a measured one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseMetrics {
    pub followers_ratio: f64,
    pub growth_rate: f64,
    pub engagement_rate: f64,
    pub activity_stability: f64,
    pub post_frequency: f64,
    pub avg_reach: f64,
    pub mentions: f64,
    pub engagement_rate_std: Option<f64>,
    pub post_frequency_std: f64,
    pub reach_std: Option<f64>,
}

impl BaseMetrics {
    pub fn from_record(record: &AccountRecord) -> Self {
        Self {
            followers_ratio: followers_ratio(record.subscribers, record.subscriptions),
            growth_rate: growth_rate(record.subscribers, record.followers_growth),
            engagement_rate: engagement_rate(
                record.likes,
                record.comments,
                record.shares,
                record.posts,
                record.subscribers,
            ),
            activity_stability: activity_stability(record.post_frequency_std, record.post_frequency),
            post_frequency: record.post_frequency,
            avg_reach: record.avg_reach,
            mentions: record.mentions,
            engagement_rate_std: record.engagement_rate_std,
            post_frequency_std: record.post_frequency_std,
            reach_std: record.reach_std,
        }
    }

    pub fn engagement_stability(&self) -> f64 {
        match self.engagement_rate_std {
            Some(std) => 1.0 - (std / self.engagement_rate.max(1.0)).min(1.0),
            None => UNKNOWN_STABILITY,
        }
    }

    pub fn reach_stability(&self) -> f64 {
        match self.reach_std {
            Some(std) => 1.0 - (std / self.avg_reach.max(1.0)).min(1.0),
            None => UNKNOWN_STABILITY,
        }
    }
}

/// Base metrics together with the two composite indices derived from them.
///
/// The indices are only ever produced by [`MetricSet::compute`], so they always
/// reflect the base metrics they are stored with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSet {
    #[serde(flatten)]
    base: BaseMetrics,
    influence_index: f64,
    sustainability_index: f64,
}

impl MetricSet {
    pub fn compute(base: BaseMetrics, ii_weights: &IIWeights, si_weights: &SIWeights) -> Self {
        Self {
            influence_index: influence_index(&base, ii_weights),
            sustainability_index: sustainability_index(&base, si_weights),
            base,
        }
    }

    pub fn from_record(record: &AccountRecord, ii_weights: &IIWeights, si_weights: &SIWeights) -> Self {
        Self::compute(BaseMetrics::from_record(record), ii_weights, si_weights)
    }

    pub fn base(&self) -> &BaseMetrics {
        &self.base
    }

    pub fn influence_index(&self) -> f64 {
        self.influence_index
    }

    pub fn sustainability_index(&self) -> f64 {
        self.sustainability_index
    }

    /// Applies `edit` to a copy of the base metrics and reindexes the copy.
    pub fn perturbed<F>(&self, ii_weights: &IIWeights, si_weights: &SIWeights, edit: F) -> Self
    where
        F: FnOnce(&mut BaseMetrics),
    {
        let mut base = self.base;
        edit(&mut base);
        Self::compute(base, ii_weights, si_weights)
    }
}

/// FR: subscribers per subscription, 0 when the account follows nobody.
pub fn followers_ratio(subscribers: f64, subscriptions: f64) -> f64 {
    if subscriptions == 0.0 {
        return 0.0;
    }
    subscribers / subscriptions
}

/// GR in percent. Unguarded: zero subscribers yields a non-finite value.
pub fn growth_rate(subscribers: f64, followers_growth: f64) -> f64 {
    (followers_growth / subscribers) * 100.0
}

/// ER in percent, weighting comments 2x and shares 3x.
pub fn engagement_rate(likes: f64, comments: f64, shares: f64, posts: f64, subscribers: f64) -> f64 {
    if posts == 0.0 || subscribers == 0.0 {
        return 0.0;
    }
    ((likes + comments * 2.0 + shares * 3.0) / (posts * subscribers)) * 100.0
}

/// SA: one minus the coefficient of variation of posting frequency, floored at 0.
pub fn activity_stability(post_frequency_std: f64, post_frequency: f64) -> f64 {
    if post_frequency == 0.0 {
        return 0.0;
    }
    1.0 - (post_frequency_std / post_frequency).min(1.0)
}

/// Linear map of `value` from `[min, max]` into `[0, 1]`, clamped. A degenerate range gives 0.5.
/// NaN passes through instead of clamping to a bound.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.5;
    }
    if value.is_nan() {
        return f64::NAN;
    }
    ((value - min) / (max - min)).min(1.0).max(0.0)
}

// The divisors are fixed scale normalizers; changing them breaks parity with
// previously published scores.
pub fn influence_index(metrics: &BaseMetrics, weights: &IIWeights) -> f64 {
    weights.followers_ratio * metrics.followers_ratio
        + weights.engagement_rate * metrics.engagement_rate / 100.0
        + weights.post_frequency * metrics.post_frequency / 10.0
        + weights.reach * metrics.avg_reach / 10_000.0
        + weights.mentions * metrics.mentions / 50.0
}

pub fn sustainability_index(metrics: &BaseMetrics, weights: &SIWeights) -> f64 {
    weights.engagement_consistency * metrics.engagement_stability()
        + weights.posting_consistency * metrics.activity_stability
        + weights.reach_consistency * metrics.reach_stability()
}
