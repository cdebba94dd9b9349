use influence_index::account::AccountRecord;
use influence_index::config::CreatorSettings;
use influence_index::metrics::{IIWeights, MetricSet, SIWeights};
use influence_index::scenarios::{
    add_scenario, default_scenarios, probability_for_key, remove_scenario, scenario_probability,
    toggle_scenario, OptimalityMode, OptimalityWeights, ProbabilityContext, ScenarioDefinition,
    ScenarioKind, ScenarioParameters, ScenarioRanker, ScenarioSimulator,
};
use influence_index::{analyze_single_account, AccountAnalysis};

fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn analyze_sample(mode: OptimalityMode, catalog: &[ScenarioDefinition]) -> AccountAnalysis {
    let settings = CreatorSettings {
        optimality_mode: mode,
        ..CreatorSettings::default()
    };
    analyze_single_account(&AccountRecord::default(), &settings, catalog)
}

#[test]
fn built_in_deltas_for_sample_account() {
    let analysis = analyze_sample(OptimalityMode::Normalized, &default_scenarios());
    let scenarios = &analysis.scenarios;

    let activity = scenarios.get("activity_scenario").expect("activity");
    approx(activity.delta_ii, 0.04);
    approx(activity.delta_si, 0.3 * (0.88 - (1.0 - 0.8 / 3.0)));

    let engagement = scenarios.get("engagement_scenario").expect("engagement");
    approx(engagement.delta_ii, 0.3 * 1.65 / 100.0 + 0.2 * 0.225);

    let collaboration = scenarios.get("collaboration_scenario").expect("collaboration");
    approx(collaboration.delta_ii, 0.1 * 3.0 / 50.0 + 0.2 * 0.45 + 0.3 * 0.33 / 100.0);

    let education = scenarios.get("education_scenario").expect("education");
    approx(education.delta_ii, 0.3 * 0.99 / 100.0 + 0.2 * 0.375);
    let engagement_gain = (1.0 - 0.5 / 4.29) - (1.0 - 0.5 / 3.3);
    let reach_gain = (1.0 - 0.3 / 18_750.0) - (1.0 - 0.3 / 15_000.0);
    approx(education.delta_si, 0.4 * engagement_gain + 0.3 * reach_gain);
}

#[test]
fn simulation_leaves_metrics_untouched() {
    let ii = IIWeights::default();
    let si = SIWeights::default();
    let parameters = ScenarioParameters::default();
    let metrics = MetricSet::from_record(&AccountRecord::default(), &ii, &si);
    let before = metrics;

    let simulator = ScenarioSimulator::new(&parameters, &ii, &si);
    let outcomes = simulator.simulate(&metrics, None, &default_scenarios());

    assert_eq!(outcomes.len(), 4);
    assert_eq!(metrics, before);
}

#[test]
fn rankings_for_sample_account() {
    let analysis = analyze_sample(OptimalityMode::Normalized, &default_scenarios());
    let rankings = &analysis.scenarios.rankings;

    assert_eq!(
        rankings.suitability_ranking,
        vec![
            "activity_scenario",
            "engagement_scenario",
            "education_scenario",
            "collaboration_scenario"
        ]
    );
    assert_eq!(
        rankings.superiority_ranking,
        vec![
            "collaboration_scenario",
            "education_scenario",
            "engagement_scenario",
            "activity_scenario"
        ]
    );
    assert_eq!(rankings.optimality_ranking[0], "activity_scenario");
    assert_eq!(
        rankings.recommended_scenario.as_deref(),
        Some("activity_scenario")
    );
}

#[test]
fn optimality_modes_can_disagree() {
    let normalized = analyze_sample(OptimalityMode::Normalized, &default_scenarios());
    let raw = analyze_sample(OptimalityMode::Raw, &default_scenarios());

    assert_eq!(
        normalized.scenarios.rankings.recommended_scenario.as_deref(),
        Some("activity_scenario")
    );
    assert_eq!(
        raw.scenarios.rankings.recommended_scenario.as_deref(),
        Some("education_scenario")
    );
}

#[test]
fn recommended_is_head_of_optimality_ranking() {
    for mode in [OptimalityMode::Normalized, OptimalityMode::Raw] {
        let analysis = analyze_sample(mode, &default_scenarios());
        let rankings = &analysis.scenarios.rankings;
        assert_eq!(
            rankings.recommended_scenario.as_ref(),
            rankings.optimality_ranking.first()
        );
        assert_eq!(rankings.optimality_ranking.len(), 4);
    }
}

#[test]
fn inactive_scenarios_are_reported_but_not_ranked() {
    let mut catalog = default_scenarios();
    assert!(toggle_scenario(&mut catalog, 1));

    let analysis = analyze_sample(OptimalityMode::Normalized, &catalog);
    let scenarios = &analysis.scenarios;

    let activity = scenarios.get("activity_scenario").expect("activity");
    assert!(!activity.active);
    approx(activity.probability, 0.0);
    assert_eq!(scenarios.outcomes.len(), 4);
    assert!(!scenarios
        .rankings
        .optimality_ranking
        .contains(&"activity_scenario".to_string()));
    assert_eq!(scenarios.rankings.suitability_ranking.len(), 3);
}

#[test]
fn all_inactive_has_no_recommendation() {
    let mut catalog = default_scenarios();
    for id in 1..=4 {
        toggle_scenario(&mut catalog, id);
    }

    let analysis = analyze_sample(OptimalityMode::Normalized, &catalog);

    assert!(analysis.scenarios.rankings.recommended_scenario.is_none());
    assert!(analysis.scenarios.recommended().is_none());
    assert!(analysis.scenarios.rankings.optimality_ranking.is_empty());
}

#[test]
fn custom_scenario_key_and_cost() {
    let mut catalog = default_scenarios();
    let id = add_scenario(&mut catalog, "Giveaway".to_string(), None, Some(0.1));
    assert_eq!(id, 5);

    let analysis = analyze_sample(OptimalityMode::Normalized, &catalog);
    let custom = analysis
        .scenarios
        .get("custom_scenario_5")
        .expect("custom scenario");

    assert_eq!(custom.name, "Giveaway");
    approx(custom.cost, 0.1);
    approx(custom.probability, 60.0);
    assert_eq!(
        analysis.scenarios.rankings.suitability_ranking[0],
        "custom_scenario_5"
    );
}

#[test]
fn custom_rule_rescales_against_reference_ranges() {
    let mut catalog = default_scenarios();
    add_scenario(&mut catalog, "Giveaway".to_string(), None, Some(0.1));
    let analysis = analyze_sample(OptimalityMode::Normalized, &catalog);
    let custom = analysis
        .scenarios
        .get("custom_scenario_5")
        .expect("custom scenario");

    // FR 20 -> 1.0, ER 4.29 -> 1.0, PA 3 -> 3/14, M 15 -> 0.15; reach untouched.
    let projected_ii =
        0.2 * 1.0 + 0.3 * 1.0 / 100.0 + 0.2 * (3.0 / 14.0) / 10.0 + 0.2 * 1.5 + 0.1 * 0.15 / 50.0;
    approx(
        custom.delta_ii,
        projected_ii - analysis.metrics.influence_index(),
    );

    // ER of 1.0 puts engagement stability at 1 - 0.5 / 1.
    approx(custom.delta_si, 0.4 * (0.5 - (1.0 - 0.5 / 3.3)));
}

#[test]
fn custom_cost_falls_back_to_parameters_then_zero() {
    let mut parameters = ScenarioParameters::default();
    let definition = ScenarioDefinition {
        id: 7,
        name: "Podcast".to_string(),
        is_active: true,
        description: None,
        cost: None,
    };

    approx(parameters.cost_for(&definition), 0.0);
    parameters
        .custom_costs
        .insert("custom_scenario_7".to_string(), 0.35);
    approx(parameters.cost_for(&definition), 0.35);
}

#[test]
fn catalog_ids_and_reserved_removal() {
    let mut catalog = default_scenarios();
    assert_eq!(add_scenario(&mut catalog, "A".to_string(), None, None), 5);
    assert_eq!(add_scenario(&mut catalog, "B".to_string(), None, None), 6);

    assert!(!remove_scenario(&mut catalog, 2));
    assert!(remove_scenario(&mut catalog, 5));
    assert!(!remove_scenario(&mut catalog, 5));
    assert_eq!(add_scenario(&mut catalog, "C".to_string(), None, None), 7);

    let mut empty = Vec::new();
    assert_eq!(add_scenario(&mut empty, "D".to_string(), None, None), 5);
}

#[test]
fn scenario_keys_round_trip_through_kind() {
    assert_eq!(ScenarioKind::from_id(3), ScenarioKind::Collaboration);
    assert_eq!(
        ScenarioKind::from_key("custom_scenario_12"),
        Some(ScenarioKind::Custom(12))
    );
    assert_eq!(ScenarioKind::from_key("unknown"), None);
    assert!(!ScenarioKind::Custom(9).is_built_in());
}

#[test]
fn default_probabilities_without_context() {
    approx(scenario_probability(ScenarioKind::Activity, None), 70.0);
    approx(scenario_probability(ScenarioKind::Engagement, None), 85.0);
    approx(scenario_probability(ScenarioKind::Collaboration, None), 50.0);
    approx(scenario_probability(ScenarioKind::Education, None), 65.0);
    approx(probability_for_key("mystery", None), 60.0);
}

#[test]
fn heuristic_probabilities_for_sample_account() {
    let record = AccountRecord::default();
    let metrics = MetricSet::from_record(&record, &IIWeights::default(), &SIWeights::default());
    let context = ProbabilityContext::new(metrics.base(), &record);

    approx(scenario_probability(ScenarioKind::Activity, Some(&context)), 57.0);
    approx(scenario_probability(ScenarioKind::Engagement, Some(&context)), 91.2);
    approx(scenario_probability(ScenarioKind::Collaboration, Some(&context)), 85.0);
    approx(scenario_probability(ScenarioKind::Education, Some(&context)), 75.0);
}

#[test]
fn probabilities_stay_within_percent_range() {
    let record = AccountRecord {
        followers_growth: 50_000.0,
        mentions: 500.0,
        ..AccountRecord::default()
    };
    let metrics = MetricSet::from_record(&record, &IIWeights::default(), &SIWeights::default());
    let context = ProbabilityContext::new(metrics.base(), &record);

    for kind in ScenarioKind::BUILT_IN {
        let probability = scenario_probability(kind, Some(&context));
        assert!((0.0..=100.0).contains(&probability));
    }
}

#[test]
fn zero_max_cost_drops_cost_term() {
    let mut settings = CreatorSettings::default();
    settings.scenario_parameters.scale_built_in_costs(0.0);
    let analysis = analyze_single_account(&AccountRecord::default(), &settings, &default_scenarios());

    let ranker = ScenarioRanker::new(OptimalityWeights::default(), OptimalityMode::Normalized);
    let candidates: Vec<_> = analysis.scenarios.outcomes.iter().collect();
    let scores = ranker.optimality_scores(&candidates);

    assert!(scores.iter().all(|score| *score <= 0.8 + 1e-9));
}

#[test]
fn result_set_serializes_scenarios_in_catalog_order() {
    let analysis = analyze_sample(OptimalityMode::Normalized, &default_scenarios());
    let json = serde_json::to_string(&analysis.scenarios).expect("serialize");

    let activity = json.find("\"activity_scenario\":").expect("activity");
    let education = json.find("\"education_scenario\":").expect("education");
    assert!(activity < education);
    assert!(json.contains("\"recommended_scenario\":\"activity_scenario\""));
}
