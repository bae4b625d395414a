use crate::model::ConfigError;
use crate::registry::Label;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub weights: BTreeMap<Label, f64>,
    pub threshold: f64,
    /// Labels that must share an entity when either sale carries them.
    pub required_labels: Vec<Label>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            weights: BTreeMap::from([
                (Label::Product, 5.0),
                (Label::Company, 3.0),
                (Label::Object, 3.0),
                (Label::Material, 1.0),
                (Label::TargetGroup, 1.0),
            ]),
            threshold: 5.0,
            required_labels: vec![Label::Object],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub percentile: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self { percentile: 15.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub base_url: String,
    pub user_agent: String,
    pub per_call_timeout_s: u64,
    pub per_query_timeout_s: u64,
    pub retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tutti.ch/v10".into(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) SalesmanBot/0.1".into(),
            per_call_timeout_s: 20,
            per_query_timeout_s: 60,
            retries: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub result_cap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { result_cap: 200 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub similarity_relevant: Vec<Label>,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            similarity_relevant: Label::SIMILARITY_RELEVANT.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_s: u64,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_s: 3600,
            capacity: 1024,
        }
    }
}

/// Frozen after startup and shared as `Arc<AppConfig>`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub similarity: SimilarityConfig,
    pub outlier: OutlierConfig,
    pub http: HttpConfig,
    pub search: SearchConfig,
    pub labels: LabelsConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.outlier.percentile;
        if !(p > 0.0 && p < 50.0) {
            return Err(ConfigError::Invalid(format!(
                "outlier.percentile must lie in (0, 50), got {}",
                p
            )));
        }
        if self.similarity.threshold < 0.0 {
            return Err(ConfigError::Invalid("similarity.threshold must be >= 0".into()));
        }
        if let Some((label, w)) = self.similarity.weights.iter().find(|(_, w)| **w < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "similarity.weights.{} must be >= 0, got {}",
                label, w
            )));
        }
        if self.labels.similarity_relevant.is_empty() {
            return Err(ConfigError::Invalid("labels.similarity_relevant is empty".into()));
        }
        if self.http.per_call_timeout_s == 0 || self.http.per_query_timeout_s == 0 {
            return Err(ConfigError::Invalid("http timeouts must be > 0".into()));
        }
        if self.search.result_cap == 0 {
            return Err(ConfigError::Invalid("search.result_cap must be > 0".into()));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Reads the JSON config; a missing file yields the defaults.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No config at {}, using defaults", path);
            let config = AppConfig::default();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(config: &AppConfig, label: Label) -> f64 {
        config.similarity.weights.get(&label).copied().unwrap_or(0.0)
    }

    #[test]
    fn defaults_match_reference_values() {
        let config = parse_config("{}").unwrap();
        assert_eq!(weight(&config, Label::Product), 5.0);
        assert_eq!(weight(&config, Label::Company), 3.0);
        assert_eq!(weight(&config, Label::Loc), 0.0);
        assert_eq!(config.similarity.threshold, 5.0);
        assert_eq!(config.outlier.percentile, 15.0);
        assert_eq!(config.http.per_call_timeout_s, 20);
        assert_eq!(config.http.per_query_timeout_s, 60);
        assert_eq!(config.search.result_cap, 200);
        assert_eq!(config.labels.similarity_relevant.len(), 5);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"{"similarity": {"weights": {"PRODUCT": 8}}, "http": {"retries": 1}}"#,
        )
        .unwrap();
        assert_eq!(weight(&config, Label::Product), 8.0);
        assert_eq!(weight(&config, Label::Company), 0.0);
        assert_eq!(config.similarity.threshold, 5.0);
        assert_eq!(config.http.retries, 1);
        assert_eq!(config.http.per_call_timeout_s, 20);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            parse_config(r#"{"outlier": {"percentile": 60}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse_config(r#"{"labels": {"similarity_relevant": ["COLOUR"]}}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(parse_config("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config("/nonexistent/salesman-config.json").unwrap();
        assert_eq!(config.search.result_cap, 200);
    }
}
