// Analyzer module: similarity, pricing, sale groups and lifecycle indicators.

pub mod lifecycle;
pub mod price_analysis;
pub mod sale_list;
pub mod similarity;

pub use price_analysis::{AnalyzerImpl, PriceStats};
pub use sale_list::SaleList;
pub use similarity::SimilarityChecker;
