use thiserror::Error;

use crate::calendar::YearMonth;

/// Errors that abort a run. Recoverable conditions (rating lookup misses,
/// unparseable series results, empty windows) never reach this type.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed table {path}: {message}")]
    Schema { path: String, message: String },

    #[error("Invalid date '{value}': {message}")]
    Date { value: String, message: String },

    #[error("Block {new} is not after the latest block {latest}")]
    OutOfOrder { latest: YearMonth, new: YearMonth },

    #[error("Team {team} appears twice in block {period}")]
    DuplicateTeam { team: String, period: YearMonth },

    #[error("Series result '{result}' does not match teams '{teams}'")]
    MalformedSeriesResult { teams: String, result: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl RankingError {
    pub fn schema(path: &str, message: impl Into<String>) -> Self {
        RankingError::Schema {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;
