use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ValidationError;

/// Raw per-period counters for one account, in the JSON import shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub category: String,
    pub subscribers: f64,
    pub subscriptions: f64,
    /// Signed: an account may lose followers over the period.
    pub followers_growth: f64,
    pub posts: f64,
    /// Posts per week.
    pub post_frequency: f64,
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
    pub avg_reach: f64,
    pub mentions: f64,
    #[serde(default)]
    pub engagement_rate_std: Option<f64>,
    pub post_frequency_std: f64,
    #[serde(default)]
    pub reach_std: Option<f64>,
}

impl Default for AccountRecord {
    fn default() -> Self {
        Self {
            id: None,
            name: "account".to_string(),
            platform: String::new(),
            category: String::new(),
            subscribers: 10_000.0,
            subscriptions: 500.0,
            followers_growth: 500.0,
            posts: 20.0,
            post_frequency: 3.0,
            likes: 5_000.0,
            comments: 500.0,
            shares: 200.0,
            avg_reach: 15_000.0,
            mentions: 15.0,
            engagement_rate_std: Some(0.5),
            post_frequency_std: 0.8,
            reach_std: Some(0.3),
        }
    }
}

impl AccountRecord {
    /// The caller-supplied id, or a stable id derived from the account identity.
    pub fn account_id(&self) -> String {
        if let Some(id) = explicit_id(self) {
            return id.to_string();
        }
        let payload = format!("{}:{}:{}", self.name, self.platform, self.category);
        format!("account_{:x}", stable_hash64(&payload))
    }

    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            self.account_id()
        } else {
            self.name.clone()
        }
    }

    /// Boundary check run before any scoring. The calculator itself never validates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }

        let account = self.label();
        for (field, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite {
                    account,
                    field,
                });
            }
            if field != "followers_growth" && value < 0.0 {
                return Err(ValidationError::Negative {
                    account,
                    field,
                    value,
                });
            }
        }

        let positive = [
            ("subscribers", self.subscribers),
            ("posts", self.posts),
            ("post_frequency", self.post_frequency),
            ("likes", self.likes),
            ("comments", self.comments),
            ("shares", self.shares),
            ("avg_reach", self.avg_reach),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ValidationError::NotPositive {
                    account,
                    field,
                    value,
                });
            }
        }

        Ok(())
    }

    fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        let mut fields = vec![
            ("subscribers", self.subscribers),
            ("subscriptions", self.subscriptions),
            ("followers_growth", self.followers_growth),
            ("posts", self.posts),
            ("post_frequency", self.post_frequency),
            ("likes", self.likes),
            ("comments", self.comments),
            ("shares", self.shares),
            ("avg_reach", self.avg_reach),
            ("mentions", self.mentions),
            ("post_frequency_std", self.post_frequency_std),
        ];
        if let Some(value) = self.engagement_rate_std {
            fields.push(("engagement_rate_std", value));
        }
        if let Some(value) = self.reach_std {
            fields.push(("reach_std", value));
        }
        fields
    }
}

/// Validates every record, reporting the first failure. Caller-supplied ids
/// must be unique; derived ids are disambiguated by the batch aggregator.
pub fn validate_records(records: &[AccountRecord]) -> Result<(), ValidationError> {
    records.iter().try_for_each(AccountRecord::validate)?;

    let mut seen = HashSet::new();
    for id in records.iter().filter_map(explicit_id) {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

fn explicit_id(record: &AccountRecord) -> Option<&str> {
    record.id.as_deref().filter(|id| !id.trim().is_empty())
}

fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<AccountRecord>),
    One(Box<AccountRecord>),
}

/// Parses an import document holding either one account object or an array of them.
pub fn parse_records(json: &str) -> Result<Vec<AccountRecord>, serde_json::Error> {
    let parsed: OneOrMany = serde_json::from_str(json)?;
    Ok(match parsed {
        OneOrMany::Many(records) => records,
        OneOrMany::One(record) => vec![*record],
    })
}
