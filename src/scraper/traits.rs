use crate::model::{ListingRecord, ListingStatus, ScraperError, SearchApi};
use crate::sale::SaleSource;

/// Marketplace client. Paging and the result cap stay behind this trait.
#[async_trait::async_trait]
pub trait Marketplace: Send + Sync {
    /// Source stamped on every sale built from this marketplace.
    fn source(&self) -> SaleSource;

    async fn search(&self, api: &SearchApi) -> Result<Vec<ListingRecord>, ScraperError>;

    /// Re-reads one listing. A missing listing may surface as
    /// `Ok(ListingStatus::NotFound)` or `Err(ScraperError::NotFound)`.
    async fn fetch_listing(&self, sale_id: &str, href: &str) -> Result<ListingStatus, ScraperError>;
}
