use influence_index::account::{parse_records, validate_records, AccountRecord};
use influence_index::config::{CreatorSettings, Settings};
use influence_index::error::ValidationError;
use influence_index::scenarios::default_scenarios;
use influence_index::synthetic::generate_synthetic_accounts;
use influence_index::{analyze, format_number, format_percent, Analysis, AnalysisRequest};

#[test]
fn sample_account_is_valid() {
    assert_eq!(AccountRecord::default().validate(), Ok(()));
}

#[test]
fn name_is_required() {
    let record = AccountRecord {
        name: "   ".to_string(),
        ..AccountRecord::default()
    };
    assert_eq!(record.validate(), Err(ValidationError::MissingName));
}

#[test]
fn counters_must_be_positive() {
    for field in ["subscribers", "posts", "post_frequency", "likes", "comments", "shares", "avg_reach"] {
        let mut record = AccountRecord::default();
        match field {
            "subscribers" => record.subscribers = 0.0,
            "posts" => record.posts = 0.0,
            "post_frequency" => record.post_frequency = 0.0,
            "likes" => record.likes = 0.0,
            "comments" => record.comments = 0.0,
            "shares" => record.shares = 0.0,
            _ => record.avg_reach = 0.0,
        }
        match record.validate() {
            Err(ValidationError::NotPositive { field: rejected, .. }) => assert_eq!(rejected, field),
            other => panic!("{field}: unexpected {other:?}"),
        }
    }
}

#[test]
fn zero_subscriptions_and_mentions_are_allowed() {
    let record = AccountRecord {
        subscriptions: 0.0,
        mentions: 0.0,
        ..AccountRecord::default()
    };
    assert_eq!(record.validate(), Ok(()));
}

#[test]
fn negative_growth_is_allowed_but_negative_counters_are_not() {
    let shrinking = AccountRecord {
        followers_growth: -300.0,
        ..AccountRecord::default()
    };
    assert_eq!(shrinking.validate(), Ok(()));

    let negative = AccountRecord {
        mentions: -1.0,
        ..AccountRecord::default()
    };
    assert!(matches!(
        negative.validate(),
        Err(ValidationError::Negative { field: "mentions", .. })
    ));
}

#[test]
fn non_finite_values_are_rejected() {
    let record = AccountRecord {
        reach_std: Some(f64::NAN),
        ..AccountRecord::default()
    };
    assert!(matches!(
        record.validate(),
        Err(ValidationError::NotFinite { field: "reach_std", .. })
    ));
}

#[test]
fn account_id_prefers_explicit_id() {
    let explicit = AccountRecord {
        id: Some("acc-1".to_string()),
        ..AccountRecord::default()
    };
    assert_eq!(explicit.account_id(), "acc-1");

    let derived = AccountRecord::default().account_id();
    assert!(derived.starts_with("account_"));
    assert_eq!(derived, AccountRecord::default().account_id());

    let other = AccountRecord {
        platform: "YouTube".to_string(),
        ..AccountRecord::default()
    };
    assert_ne!(other.account_id(), derived);
}

#[test]
fn parse_records_accepts_object_or_array() {
    let single = r#"{
        "name": "Travel Diaries",
        "subscribers": 10000, "subscriptions": 500, "followers_growth": 500,
        "posts": 20, "post_frequency": 3, "likes": 5000, "comments": 500,
        "shares": 200, "avg_reach": 15000, "mentions": 15,
        "post_frequency_std": 0.8
    }"#;
    let records = parse_records(single).expect("single record");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Travel Diaries");
    assert!(records[0].engagement_rate_std.is_none());

    let many = format!("[{single}, {single}]");
    assert_eq!(parse_records(&many).expect("array").len(), 2);

    assert!(parse_records(r#"{"name": "missing counters"}"#).is_err());
}

#[test]
fn batch_validation_reports_first_failure() {
    let mut records = generate_synthetic_accounts(3, 11);
    records[1].shares = 0.0;
    let err = validate_records(&records).expect_err("invalid batch");
    assert!(err.to_string().starts_with("Creator 2:"));
}

#[test]
fn duplicate_explicit_ids_are_rejected() {
    let mut records = generate_synthetic_accounts(3, 5);
    records[2].id = records[0].id.clone();

    assert_eq!(
        validate_records(&records),
        Err(ValidationError::DuplicateId("synthetic_0".to_string()))
    );
}

#[test]
fn id_less_namesakes_pass_validation() {
    let records = vec![AccountRecord::default(), AccountRecord::default()];
    assert_eq!(validate_records(&records), Ok(()));
}

#[test]
fn creator_mode_takes_exactly_one_account() {
    let err = AnalysisRequest::new(
        Settings::Creator(CreatorSettings::default()),
        generate_synthetic_accounts(2, 3),
        default_scenarios(),
    )
    .expect_err("two accounts");
    assert_eq!(err, ValidationError::SingleAccountExpected(2));
}

#[test]
fn creator_mode_validates_before_scoring() {
    let request = AnalysisRequest::new(
        Settings::Creator(CreatorSettings::default()),
        vec![AccountRecord {
            subscribers: 0.0,
            ..AccountRecord::default()
        }],
        default_scenarios(),
    )
    .expect("one account");
    assert!(analyze(&request).is_err());
}

#[test]
fn creator_mode_analysis_serializes_with_mode_tag() {
    let request = AnalysisRequest::new(
        Settings::Creator(CreatorSettings::default()),
        vec![AccountRecord::default()],
        default_scenarios(),
    )
    .expect("one account");
    let analysis = analyze(&request).expect("valid account");
    assert!(matches!(analysis, Analysis::Creator(_)));

    let json = serde_json::to_value(&analysis).expect("json");
    assert_eq!(json["mode"], "creator");
    assert_eq!(json["scenarios"]["recommended_scenario"], "activity_scenario");
    assert!(json["metrics"]["influence_index"].is_number());
}

#[test]
fn synthetic_accounts_are_valid_and_deterministic() {
    let first = generate_synthetic_accounts(25, 99);
    let second = generate_synthetic_accounts(25, 99);

    assert_eq!(first, second);
    assert_eq!(first.len(), 25);
    assert!(validate_records(&first).is_ok());
    assert_ne!(first, generate_synthetic_accounts(25, 100));
}

#[test]
fn number_formatting() {
    assert_eq!(format_number(1_234_567.4), "1,234,567");
    assert_eq!(format_number(999.0), "999");
    assert_eq!(format_percent(3.3), "3.3%");
}
