//! Batch scoring of several accounts against each other.
//!
//! Each account is first scored on its own, then five metrics are rescaled
//! against twice the batch mean and the indices recomputed, so the ranked
//! indices express standing within the batch rather than absolute output.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::account::AccountRecord;
use crate::metrics::{normalize, IIWeights, MetricSet, SIWeights};

/// Arithmetic means over the batch. All zero for an empty batch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PopulationAverages {
    pub followers_ratio: f64,
    pub growth_rate: f64,
    pub engagement_rate: f64,
    pub activity_stability: f64,
    pub post_frequency: f64,
    pub avg_reach: f64,
    pub mentions: f64,
    pub influence_index: f64,
    pub sustainability_index: f64,
}

impl PopulationAverages {
    pub fn from_metrics(metrics: &[MetricSet]) -> Self {
        let mean_of = |field: fn(&MetricSet) -> f64| mean(metrics.iter().map(field));
        Self {
            followers_ratio: mean_of(|m| m.base().followers_ratio),
            growth_rate: mean_of(|m| m.base().growth_rate),
            engagement_rate: mean_of(|m| m.base().engagement_rate),
            activity_stability: mean_of(|m| m.base().activity_stability),
            post_frequency: mean_of(|m| m.base().post_frequency),
            avg_reach: mean_of(|m| m.base().avg_reach),
            mentions: mean_of(|m| m.base().mentions),
            influence_index: mean_of(|m| m.influence_index()),
            sustainability_index: mean_of(|m| m.sustainability_index()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountScore {
    pub account_id: String,
    pub record: AccountRecord,
    /// Batch-relative metrics; these are what the rankings use.
    pub metrics: MetricSet,
    /// The account scored on its own, before batch rescaling.
    pub absolute_metrics: MetricSet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchAnalysis {
    pub accounts: Vec<AccountScore>,
    pub averages: PopulationAverages,
    pub ranking_by_ii: Vec<String>,
    pub ranking_by_si: Vec<String>,
}

impl BatchAnalysis {
    pub fn account(&self, account_id: &str) -> Option<&AccountScore> {
        self.accounts
            .iter()
            .find(|account| account.account_id == account_id)
    }
}

pub fn aggregate(records: &[AccountRecord], ii_weights: &IIWeights, si_weights: &SIWeights) -> BatchAnalysis {
    let absolute: Vec<MetricSet> = records
        .iter()
        .map(|record| MetricSet::from_record(record, ii_weights, si_weights))
        .collect();

    let averages = PopulationAverages::from_metrics(&absolute);

    let accounts: Vec<AccountScore> = records
        .iter()
        .zip(batch_ids(records))
        .zip(absolute)
        .map(|((record, account_id), absolute_metrics)| AccountScore {
            account_id,
            record: record.clone(),
            metrics: relative_to(&absolute_metrics, &averages, ii_weights, si_weights),
            absolute_metrics,
        })
        .collect();

    let ranking_by_ii = rank_by(&accounts, |metrics| metrics.influence_index());
    let ranking_by_si = rank_by(&accounts, |metrics| metrics.sustainability_index());

    BatchAnalysis {
        accounts,
        averages,
        ranking_by_ii,
        ranking_by_si,
    }
}

/// Rescales FR, ER, PA, RA and M against `[0, 2 * mean]` and reindexes.
/// Growth rate and activity stability are carried over unchanged.
pub fn relative_to(
    metrics: &MetricSet,
    averages: &PopulationAverages,
    ii_weights: &IIWeights,
    si_weights: &SIWeights,
) -> MetricSet {
    metrics.perturbed(ii_weights, si_weights, |base| {
        base.followers_ratio = normalize(base.followers_ratio, 0.0, averages.followers_ratio * 2.0);
        base.engagement_rate = normalize(base.engagement_rate, 0.0, averages.engagement_rate * 2.0);
        base.post_frequency = normalize(base.post_frequency, 0.0, averages.post_frequency * 2.0);
        base.avg_reach = normalize(base.avg_reach, 0.0, averages.avg_reach * 2.0);
        base.mentions = normalize(base.mentions, 0.0, averages.mentions * 2.0);
    })
}

/// One id per record, unique within the batch. A repeated id (two id-less
/// records with the same name, platform and category) gets a `_<n>` suffix,
/// counting from 2 in input order.
pub fn batch_ids(records: &[AccountRecord]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .map(|record| {
            let base = record.account_id();
            let mut id = base.clone();
            let mut occurrence = 1;
            while !seen.insert(id.clone()) {
                occurrence += 1;
                id = format!("{}_{}", base, occurrence);
            }
            id
        })
        .collect()
}

fn rank_by(accounts: &[AccountScore], score: fn(&MetricSet) -> f64) -> Vec<String> {
    let mut ordered: Vec<&AccountScore> = accounts.iter().collect();
    ordered.sort_by(|a, b| {
        score(&b.metrics)
            .partial_cmp(&score(&a.metrics))
            .unwrap_or(Ordering::Equal)
    });
    ordered
        .into_iter()
        .map(|account| account.account_id.clone())
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
