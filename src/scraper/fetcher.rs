use super::traits::Marketplace;
use crate::config::HttpConfig;
use crate::model::{ListingRecord, ListingStatus, ScraperError, SearchApi};
use crate::sale::SaleSource;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Base delay for exponential backoff (ms)
const RETRY_BASE_DELAY_MS: u64 = 500;

const PAGE_SIZE: usize = 30;

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<ListingRecord>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct ListingEnvelope {
    #[serde(default)]
    state: String,
    listing: Option<ListingRecord>,
}

/// JSON client for a tutti.ch-style listing API.
pub struct HttpMarketplace {
    client: Client,
    base_url: String,
    retries: u32,
    result_cap: usize,
}

impl HttpMarketplace {
    pub fn new(config: &HttpConfig, result_cap: usize) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.per_call_timeout_s))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retries: config.retries,
            result_cap,
        })
    }

    fn search_url(&self, api: &SearchApi, page: usize) -> Result<Url, ScraperError> {
        let page = page.to_string();
        let limit = PAGE_SIZE.to_string();
        let mut params = vec![("query", api.search_string.as_str())];
        for (key, value) in [
            ("region", api.region_value.as_str()),
            ("category", api.category_value.as_str()),
            ("subcategory", api.sub_category_value.as_str()),
        ] {
            if !value.is_empty() {
                params.push((key, value));
            }
        }
        params.push(("page", page.as_str()));
        params.push(("limit", limit.as_str()));
        Url::parse_with_params(&format!("{}/search", self.base_url), &params)
            .map_err(|e| ScraperError::InvalidResponse(e.to_string()))
    }

    fn listing_url(&self, sale_id: &str, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}/listings/{}", self.base_url, sale_id)
        }
    }

    /// Execute request with retry logic
    async fn request_with_retry<T, F, Fut>(&self, what: &str, operation: F) -> Result<T, ScraperError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    let delay = backoff_delay(attempt, rand::random::<u64>());
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "{} failed, retrying",
                        what
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, ScraperError> {
        let response = self.client.get(url).send().await?;
        check_status(response.status())?;
        Ok(response.json::<T>().await?)
    }
}

/// Exponential backoff plus up to half the delay again as jitter.
fn backoff_delay(attempt: u32, random: u64) -> Duration {
    let delay = RETRY_BASE_DELAY_MS * 2u64.pow(attempt.min(6));
    Duration::from_millis(delay + random % (delay / 2 + 1))
}

fn check_status(status: StatusCode) -> Result<(), ScraperError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        Err(ScraperError::NotFound)
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Err(ScraperError::Transient(status.as_u16()))
    } else {
        Err(ScraperError::InvalidResponse(format!("unexpected status {}", status)))
    }
}

fn listing_status(envelope: ListingEnvelope) -> Result<ListingStatus, ScraperError> {
    match envelope.state.to_lowercase().as_str() {
        "sold" => Ok(ListingStatus::Sold),
        "withdrawn" | "deleted" | "deactivated" => Ok(ListingStatus::Withdrawn),
        "on_hold" | "reserved" => Ok(ListingStatus::OnHold),
        "not_found" => Ok(ListingStatus::NotFound),
        "" | "active" | "open" => envelope
            .listing
            .map(ListingStatus::Available)
            .ok_or_else(|| ScraperError::InvalidResponse("listing body missing".into())),
        other => Err(ScraperError::InvalidResponse(format!("unknown listing state '{}'", other))),
    }
}

#[async_trait::async_trait]
impl Marketplace for HttpMarketplace {
    fn source(&self) -> SaleSource {
        SaleSource::TuttiCh
    }

    async fn search(&self, api: &SearchApi) -> Result<Vec<ListingRecord>, ScraperError> {
        let mut records: Vec<ListingRecord> = Vec::new();
        let mut page = 1;
        while records.len() < self.result_cap {
            let url = self.search_url(api, page)?;
            let result: SearchPage = self
                .request_with_retry("search", || self.get_json(url.as_str()))
                .await?;
            let fetched = result.items.len();
            records.extend(result.items);
            debug!("'{}' page {}: {} listings", api.search_string, page, fetched);
            if !result.has_more || fetched == 0 {
                break;
            }
            page += 1;
        }
        records.truncate(self.result_cap);
        Ok(records)
    }

    async fn fetch_listing(&self, sale_id: &str, href: &str) -> Result<ListingStatus, ScraperError> {
        let url = self.listing_url(sale_id, href);
        match self
            .request_with_retry("listing", || self.get_json::<ListingEnvelope>(&url))
            .await
        {
            Ok(envelope) => listing_status(envelope),
            Err(ScraperError::NotFound) => Ok(ListingStatus::NotFound),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marketplace() -> HttpMarketplace {
        HttpMarketplace::new(&HttpConfig::default(), 200).unwrap()
    }

    #[test]
    fn search_url_skips_empty_filters() {
        let api = SearchApi {
            search_string: "Hape Kugelbahn".into(),
            region_value: String::new(),
            category_value: "kinder-baby".into(),
            sub_category_value: String::new(),
        };
        let url = marketplace().search_url(&api, 2).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.tutti.ch/v10/search?query=Hape+Kugelbahn&category=kinder-baby&page=2&limit=30"
        );
    }

    #[test]
    fn listing_url_prefers_absolute_href() {
        let m = marketplace();
        assert_eq!(m.listing_url("42", ""), "https://api.tutti.ch/v10/listings/42");
        assert_eq!(m.listing_url("42", "https://x.ch/42"), "https://x.ch/42");
    }

    #[test]
    fn status_codes_map_to_errors() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(check_status(StatusCode::NOT_FOUND), Err(ScraperError::NotFound)));
        assert!(matches!(check_status(StatusCode::GONE), Err(ScraperError::NotFound)));
        assert!(matches!(
            check_status(StatusCode::SERVICE_UNAVAILABLE),
            Err(ScraperError::Transient(503))
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN),
            Err(ScraperError::InvalidResponse(_))
        ));
    }

    #[test]
    fn listing_states() {
        let parse = |json: &str| listing_status(serde_json::from_str(json).unwrap());
        assert_eq!(parse(r#"{"state":"sold"}"#).unwrap(), ListingStatus::Sold);
        assert_eq!(parse(r#"{"state":"reserved"}"#).unwrap(), ListingStatus::OnHold);
        assert_eq!(parse(r#"{"state":"deleted"}"#).unwrap(), ListingStatus::Withdrawn);
        match parse(r#"{"state":"active","listing":{"id":"7","title":"Tisch"}}"#).unwrap() {
            ListingStatus::Available(record) => assert_eq!(record.id, "7"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse(r#"{"state":"active"}"#).is_err());
        assert!(parse(r#"{"state":"archived"}"#).is_err());
    }

    #[test]
    fn backoff_grows_and_jitter_is_bounded() {
        assert_eq!(backoff_delay(0, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(1, 0), Duration::from_millis(1000));
        assert!(backoff_delay(1, u64::MAX) <= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn retries_only_transient_failures() {
        use std::sync::atomic::{AtomicU32, Ordering};
        let mut config = HttpConfig::default();
        config.retries = 0;
        let m = HttpMarketplace::new(&config, 10).unwrap();
        let calls = AtomicU32::new(0);
        let result: Result<(), ScraperError> = m
            .request_with_retry("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ScraperError::Transient(503)) }
            })
            .await;
        assert!(matches!(result, Err(ScraperError::Transient(503))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let calls = AtomicU32::new(0);
        let result: Result<(), ScraperError> = marketplace()
            .request_with_retry("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ScraperError::NotFound) }
            })
            .await;
        assert!(matches!(result, Err(ScraperError::NotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
