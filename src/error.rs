use thiserror::Error;

/// Rejection of an account record before it reaches the metric calculator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("account name is required")]
    MissingName,

    #[error("{account}: {field} must be greater than 0 (got {value})")]
    NotPositive {
        account: String,
        field: &'static str,
        value: f64,
    },

    #[error("{account}: {field} must not be negative (got {value})")]
    Negative {
        account: String,
        field: &'static str,
        value: f64,
    },

    #[error("{account}: {field} is not a finite number")]
    NotFinite { account: String, field: &'static str },

    #[error("account id {0} appears more than once in the batch")]
    DuplicateId(String),

    #[error("creator analysis takes exactly one account, got {0}")]
    SingleAccountExpected(usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
