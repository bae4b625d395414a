pub mod fetcher;
pub mod traits;

pub use fetcher::HttpMarketplace;
pub use traits::Marketplace;
