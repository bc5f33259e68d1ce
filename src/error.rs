use thiserror::Error;

/// Hard parse failures. Best-effort text parsing never produces these; only
/// declared-schema input (CSV, JSON) and undecodable uploads do.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("upload is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("csv header is missing the `{0}` column")]
    MissingColumn(&'static str),

    #[error("csv row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("invalid runner json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Caller contract violation: a box generator got the wrong number of runners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{bet} box requires {requirement} runners, got {got}")]
pub struct ComboError {
    pub bet: &'static str,
    pub requirement: &'static str,
    pub got: usize,
}

/// Recoverable stake-plan problems caused by user data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("Must select A, B, and C horses")]
    MissingSelections,

    #[error("A, B, and C must be different horses")]
    DuplicateSelections,

    #[error("Unknown strategy type: {0}")]
    UnknownStrategy(String),

    #[error("Custom strategy requires a valid budget")]
    InvalidBudget,

    #[error(
        "Custom split shares must be between 0 and 1 and total at most 1 (trifecta {tri_percent}, quinella {quin_percent})"
    )]
    InvalidSplit { tri_percent: f64, quin_percent: f64 },

    #[error(transparent)]
    Combo(#[from] ComboError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DividendError {
    #[error("Missing odds")]
    MissingOdds,
}
