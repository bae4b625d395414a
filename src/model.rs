// Core structs: SearchApi, ListingRecord, ListingStatus and the error types
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One marketplace query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchApi {
    pub search_string: String,
    /// Empty for a national search.
    pub region_value: String,
    pub category_value: String,
    pub sub_category_value: String,
}

/// Price as delivered by a marketplace: a number or display text like "1'200.-".
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

/// A listing as returned by a marketplace client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListingRecord {
    pub id: String,
    pub href: String,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub title: String,
    pub description: String,
    pub price: Option<RawPrice>,
    pub start_date: String,
    pub visits: Option<u32>,
    pub bookmarks: Option<u32>,
}

/// Result of re-reading a single listing at its source.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingStatus {
    Available(ListingRecord),
    Sold,
    Withdrawn,
    OnHold,
    NotFound,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("listing not found")]
    NotFound,
    #[error("transient HTTP status {0}")]
    Transient(u16),
}

impl ScraperError {
    /// Worth retrying on the next attempt or run.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_) | ScraperError::Timeout | ScraperError::Transient(_)
        )
    }
}

impl From<reqwest::Error> for ScraperError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScraperError::Timeout
        } else if e.is_decode() {
            ScraperError::InvalidResponse(e.to_string())
        } else {
            ScraperError::Http(e.to_string())
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParserError {
    #[error("line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("bad number: {0:?}")]
    BadNumber(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("json column error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt row for {sale_id}: {reason}")]
    CorruptRow { sale_id: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("internal error: {0}")]
    Programmer(String),
    #[error("run cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Process exit code for a run aborted by this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 2,
            PipelineError::Storage(_) => 4,
            PipelineError::Programmer(_) | PipelineError::Cancelled => 1,
        }
    }
}

impl From<regex::Error> for PipelineError {
    fn from(e: regex::Error) -> Self {
        PipelineError::Programmer(format!("pattern failed to compile: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_price_accepts_number_or_text() {
        let record: ListingRecord =
            serde_json::from_str(r#"{"id":"1","title":"Tisch","price":"1'200.-"}"#).unwrap();
        assert_eq!(record.price, Some(RawPrice::Text("1'200.-".into())));
        let record: ListingRecord = serde_json::from_str(r#"{"id":"2","price":45}"#).unwrap();
        assert_eq!(record.price, Some(RawPrice::Number(45.0)));
        assert_eq!(record.visits, None);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(PipelineError::Config(ConfigError::Invalid("x".into())).exit_code(), 2);
        assert_eq!(
            PipelineError::Storage(StorageError::CorruptRow {
                sale_id: "1".into(),
                reason: "x".into()
            })
            .exit_code(),
            4
        );
        assert!(ScraperError::Timeout.is_transient());
        assert!(!ScraperError::NotFound.is_transient());
    }
}
