use influence_index::account::AccountRecord;
use influence_index::metrics::{
    activity_stability, engagement_rate, followers_ratio, growth_rate, normalize, BaseMetrics,
    IIWeights, MetricSet, SIWeights, UNKNOWN_STABILITY,
};

fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn sample_metrics() -> MetricSet {
    MetricSet::from_record(
        &AccountRecord::default(),
        &IIWeights::default(),
        &SIWeights::default(),
    )
}

#[test]
fn sample_account_base_metrics() {
    let metrics = sample_metrics();
    let base = metrics.base();

    approx(base.followers_ratio, 20.0);
    approx(base.growth_rate, 5.0);
    approx(base.engagement_rate, 3.3);
    approx(base.activity_stability, 1.0 - 0.8 / 3.0);
    approx(base.post_frequency, 3.0);
    approx(base.avg_reach, 15_000.0);
    approx(base.mentions, 15.0);
}

#[test]
fn sample_account_indices() {
    let metrics = sample_metrics();

    let expected_ii = 0.2 * 20.0 + 0.3 * 3.3 / 100.0 + 0.2 * 3.0 / 10.0 + 0.2 * 1.5 + 0.1 * 15.0 / 50.0;
    approx(metrics.influence_index(), expected_ii);

    let engagement_stability = 1.0 - 0.5 / 3.3;
    let reach_stability = 1.0 - 0.3 / 15_000.0;
    let expected_si =
        0.4 * engagement_stability + 0.3 * (1.0 - 0.8 / 3.0) + 0.3 * reach_stability;
    approx(metrics.sustainability_index(), expected_si);
}

#[test]
fn zero_denominators_yield_zero() {
    approx(followers_ratio(1_000.0, 0.0), 0.0);
    approx(engagement_rate(10.0, 5.0, 1.0, 0.0, 100.0), 0.0);
    approx(engagement_rate(10.0, 5.0, 1.0, 4.0, 0.0), 0.0);
    approx(activity_stability(0.5, 0.0), 0.0);
}

#[test]
fn growth_rate_is_signed_and_unguarded() {
    approx(growth_rate(1_000.0, -50.0), -5.0);
    assert!(!growth_rate(0.0, 10.0).is_finite());
}

#[test]
fn activity_stability_floors_at_zero() {
    approx(activity_stability(9.0, 3.0), 0.0);
    approx(activity_stability(0.0, 3.0), 1.0);
}

#[test]
fn normalize_clamps_and_handles_degenerate_range() {
    approx(normalize(5.0, 0.0, 10.0), 0.5);
    approx(normalize(-1.0, 0.0, 10.0), 0.0);
    approx(normalize(25.0, 0.0, 10.0), 1.0);
    approx(normalize(7.0, 3.0, 3.0), 0.5);
}

#[test]
fn normalize_passes_nan_through() {
    assert!(normalize(f64::NAN, 0.0, 10.0).is_nan());
    approx(normalize(f64::NAN, 4.0, 4.0), 0.5);
}

#[test]
fn missing_deviation_uses_unknown_stability() {
    let record = AccountRecord {
        engagement_rate_std: None,
        reach_std: None,
        ..AccountRecord::default()
    };
    let base = BaseMetrics::from_record(&record);

    approx(base.engagement_stability(), UNKNOWN_STABILITY);
    approx(base.reach_stability(), UNKNOWN_STABILITY);
}

#[test]
fn measured_zero_deviation_is_perfectly_stable() {
    let record = AccountRecord {
        engagement_rate_std: Some(0.0),
        reach_std: Some(0.0),
        ..AccountRecord::default()
    };
    let base = BaseMetrics::from_record(&record);

    approx(base.engagement_stability(), 1.0);
    approx(base.reach_stability(), 1.0);
}

#[test]
fn stability_divides_by_at_least_one() {
    let record = AccountRecord {
        likes: 1.0,
        comments: 1.0,
        shares: 1.0,
        engagement_rate_std: Some(0.5),
        ..AccountRecord::default()
    };
    let base = BaseMetrics::from_record(&record);

    assert!(base.engagement_rate < 1.0);
    approx(base.engagement_stability(), 0.5);
}

#[test]
fn computation_is_deterministic() {
    assert_eq!(sample_metrics(), sample_metrics());
}

#[test]
fn custom_weights_change_only_the_indices() {
    let ii = IIWeights {
        followers_ratio: 0.0,
        engagement_rate: 1.0,
        post_frequency: 0.0,
        reach: 0.0,
        mentions: 0.0,
    };
    let metrics = MetricSet::from_record(&AccountRecord::default(), &ii, &SIWeights::default());

    assert_eq!(metrics.base(), sample_metrics().base());
    approx(metrics.influence_index(), 3.3 / 100.0);
}
