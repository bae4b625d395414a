// Normalisation of marketplace listing records
use crate::model::{ListingRecord, ParserError, RawPrice};
use crate::nlp::tokenizer::parse_number;
use crate::registry::{ProductCategory, ProductSubCategory, Region};
use crate::sale::SaleMeta;
use crate::utils::parse_date;
use chrono::NaiveDate;
use tracing::debug;

/// Price words that mean "no fixed price".
const NO_PRICE: &[&str] = &["gratis", "zu verschenken", "auf anfrage", "verhandelbar", "vb"];

/// Parses a listing price. `Ok(None)` when the listing carries no usable amount.
pub fn parse_price(raw: &RawPrice) -> Result<Option<f64>, ParserError> {
    match raw {
        RawPrice::Number(v) if *v >= 0.0 => Ok(Some(*v)),
        RawPrice::Number(v) => Err(ParserError::BadNumber(v.to_string())),
        RawPrice::Text(text) => {
            let cleaned = text
                .trim()
                .trim_start_matches(|c: char| !c.is_ascii_digit())
                .trim();
            if cleaned.is_empty() {
                let lower = text.trim().to_lowercase();
                if lower.is_empty() || NO_PRICE.iter().any(|w| lower.contains(w)) {
                    return Ok(None);
                }
                return Err(ParserError::BadNumber(text.clone()));
            }
            let amount = cleaned.split_whitespace().next().unwrap_or(cleaned);
            parse_number(amount)
                .map(Some)
                .ok_or_else(|| ParserError::BadNumber(text.clone()))
        }
    }
}

/// Translates a listing record into sale metadata. Unknown region or category
/// names are kept as unknown rather than failing the record.
pub fn listing_meta(record: &ListingRecord, today: NaiveDate) -> Result<SaleMeta, ParserError> {
    let id = record.id.trim();
    if id.is_empty() {
        return Err(ParserError::MissingField("id".into()));
    }
    if record.title.trim().is_empty() {
        return Err(ParserError::MissingField("title".into()));
    }
    let price = match &record.price {
        Some(raw) => parse_price(raw)?,
        None => None,
    };
    let region = Region::lookup(&record.region);
    if region.is_none() && !record.region.is_empty() {
        debug!("Listing {}: unknown region '{}'", id, record.region);
    }
    let product_sub_category = ProductSubCategory::lookup(&record.sub_category);
    let product_category = ProductCategory::lookup(&record.category)
        .or(product_sub_category.map(|s| s.category()));

    Ok(SaleMeta {
        sale_id: Some(id.to_string()),
        title: record.title.trim().to_string(),
        description: record.description.trim().to_string(),
        price,
        price_original: None,
        is_my_sale: false,
        region,
        product_category,
        product_sub_category,
        href: record.href.clone(),
        start_date: parse_date(&record.start_date, today),
    })
}
