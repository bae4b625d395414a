pub mod analyzer;
pub mod cache;
pub mod pattern;
pub mod phrase;
pub mod rules;
pub mod tagger;
pub mod tokenizer;

pub use analyzer::{DocumentAnnotation, TextAnalyzer};
pub use cache::EntityCache;
