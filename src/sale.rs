// Sale model: a listing normalized into a typed record with derived fields
use crate::model::{ListingRecord, ParserError};
use crate::nlp::{DocumentAnnotation, TextAnalyzer};
use crate::parser::listing::listing_meta;
use crate::registry::{Label, ProductCategory, ProductSubCategory, Region};
use crate::utils::hash_text;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Joins title and description into the analyzed text.
pub const TEXT_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaleSource {
    Db,
    File,
    Online,
    TuttiCh,
    RicardoCh,
    EbayCh,
}

impl SaleSource {
    const ALL: [SaleSource; 6] = [
        SaleSource::Db,
        SaleSource::File,
        SaleSource::Online,
        SaleSource::TuttiCh,
        SaleSource::RicardoCh,
        SaleSource::EbayCh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleSource::Db => "DB",
            SaleSource::File => "FILE",
            SaleSource::Online => "ONLINE",
            SaleSource::TuttiCh => "TUTTI_CH",
            SaleSource::RicardoCh => "RICARDO_CH",
            SaleSource::EbayCh => "EBAY_CH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str().eq_ignore_ascii_case(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaleState {
    Open,
    Sold,
    Vanished,
    Withdrawn,
    OnHold,
}

impl SaleState {
    const ALL: [SaleState; 5] = [
        SaleState::Open,
        SaleState::Sold,
        SaleState::Vanished,
        SaleState::Withdrawn,
        SaleState::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleState::Open => "open",
            SaleState::Sold => "sold",
            SaleState::Vanished => "vanished",
            SaleState::Withdrawn => "withdrawn",
            SaleState::OnHold => "on_hold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str().eq_ignore_ascii_case(s))
    }

    /// No further transitions are expected once a sale is in one of these states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SaleState::Sold | SaleState::Vanished | SaleState::Withdrawn)
    }
}

impl fmt::Display for SaleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectState {
    New,
    LikeNew,
    Used,
    NotQualified,
}

impl ObjectState {
    const ALL: [ObjectState; 4] = [
        ObjectState::New,
        ObjectState::LikeNew,
        ObjectState::Used,
        ObjectState::NotQualified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectState::New => "NEW",
            ObjectState::LikeNew => "LIKE_NEW",
            ObjectState::Used => "USED",
            ObjectState::NotQualified => "NOT_QUALIFIED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str().eq_ignore_ascii_case(s))
    }

    fn derive(doc: &DocumentAnnotation) -> Self {
        if doc.is_like_new {
            ObjectState::LikeNew
        } else if doc.is_used {
            ObjectState::Used
        } else if doc.is_new {
            ObjectState::New
        } else {
            ObjectState::NotQualified
        }
    }
}

/// What a source knows about a sale before text analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleMeta {
    pub sale_id: Option<String>,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub price_original: Option<f64>,
    pub is_my_sale: bool,
    pub region: Option<Region>,
    pub product_category: Option<ProductCategory>,
    pub product_sub_category: Option<ProductSubCategory>,
    pub href: String,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub sale_id: String,
    pub version: u32,
    pub is_my_sale: bool,
    pub source: SaleSource,
    pub region: Region,
    pub product_category: Option<ProductCategory>,
    pub product_sub_category: Option<ProductSubCategory>,
    pub sale_state: SaleState,
    pub href: String,
    pub start_date: NaiveDate,
    pub last_check_date: NaiveDate,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub price_single: f64,
    pub price_original: f64,
    pub is_total_price: bool,
    pub is_single_price: bool,
    pub is_new: bool,
    pub is_like_new: bool,
    pub is_used: bool,
    pub is_cover_available: bool,
    pub number: u32,
    pub size: String,
    pub age: String,
    pub usage: String,
    pub warranty: String,
    pub object_state: ObjectState,
    /// Canonical entity names in document order.
    pub entity_names: Vec<String>,
    pub entity_label_dict: BTreeMap<String, Label>,
    pub is_outlier: bool,
    pub comment: String,
}

/// Unit price of a listing; never above `price`.
pub fn derive_price_single(
    price: f64,
    is_total_price: bool,
    is_single_price: bool,
    number: u32,
    extracted_single: Option<f64>,
) -> f64 {
    if !is_total_price {
        return price;
    }
    if is_single_price {
        if let Some(single) = extracted_single {
            return single.min(price);
        }
    }
    if number > 1 {
        return (price / number as f64).round();
    }
    price
}

impl Sale {
    /// Runs the analyzer over `text` and fills everything a source did not provide.
    /// Title and description default to the two halves of `text`.
    pub fn from_raw_text(
        analyzer: &TextAnalyzer,
        source: SaleSource,
        text: &str,
        meta: SaleMeta,
        today: NaiveDate,
    ) -> Sale {
        let (title, description) = if meta.title.is_empty() {
            match text.split_once(TEXT_SEPARATOR) {
                Some((t, d)) => (t.trim().to_string(), d.trim().to_string()),
                None => (text.trim().to_string(), String::new()),
            }
        } else {
            (meta.title.clone(), meta.description.clone())
        };

        let doc = analyzer.analyze(text);
        let mut entity_names: Vec<String> = Vec::new();
        for (name, _) in &doc.entities {
            if !entity_names.contains(name) {
                entity_names.push(name.clone());
            }
        }

        let price = meta.price.or(doc.price).unwrap_or(0.0).max(0.0);
        let number = doc.number.max(1);
        let product_category = meta
            .product_category
            .or(meta.product_sub_category.map(|s| s.category()));

        Sale {
            sale_id: meta.sale_id.unwrap_or_else(|| hash_text(text)),
            version: 1,
            is_my_sale: meta.is_my_sale,
            source,
            region: meta.region.unwrap_or(Region::None),
            product_category,
            product_sub_category: meta.product_sub_category,
            sale_state: SaleState::Open,
            href: meta.href,
            start_date: meta.start_date.unwrap_or(today),
            last_check_date: today,
            title,
            description,
            price,
            price_single: derive_price_single(
                price,
                doc.is_total_price,
                doc.is_single_price,
                number,
                doc.price_single,
            ),
            price_original: meta.price_original.or(doc.price_original).unwrap_or(0.0).max(0.0),
            is_total_price: doc.is_total_price,
            is_single_price: doc.is_single_price,
            is_new: doc.is_new,
            is_like_new: doc.is_like_new,
            is_used: doc.is_used,
            is_cover_available: doc.is_cover_available,
            number,
            object_state: ObjectState::derive(&doc),
            entity_label_dict: doc.entity_label_dict(),
            size: doc.size,
            age: doc.age,
            usage: doc.usage,
            warranty: doc.warranty,
            entity_names,
            is_outlier: false,
            comment: String::new(),
        }
    }

    pub fn from_marketplace_record(
        analyzer: &TextAnalyzer,
        source: SaleSource,
        record: &ListingRecord,
        today: NaiveDate,
    ) -> Result<Sale, ParserError> {
        let meta = listing_meta(record, today)?;
        let text = join_text(&meta.title, &meta.description);
        Ok(Sale::from_raw_text(analyzer, source, &text, meta, today))
    }

    /// Title and description as one analyzable text.
    pub fn text(&self) -> String {
        join_text(&self.title, &self.description)
    }

    pub fn entities_for_label(&self, label: Label) -> BTreeSet<String> {
        self.entity_label_dict
            .iter()
            .filter(|(_, l)| **l == label)
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Entities of the given labels in document order.
    pub fn entities_in_order(&self, labels: &[Label]) -> Vec<(String, Label)> {
        self.entity_names
            .iter()
            .filter_map(|n| {
                self.entity_label_dict
                    .get(n)
                    .filter(|l| labels.contains(l))
                    .map(|l| (n.clone(), *l))
            })
            .collect()
    }

    /// True when both sales share at least one entity of any of `labels`.
    pub fn is_any_entity_identical(&self, other: &Sale, labels: &[Label]) -> bool {
        labels.iter().any(|l| {
            let mine = self.entities_for_label(*l);
            !mine.is_empty() && !mine.is_disjoint(&other.entities_for_label(*l))
        })
    }

    /// Key of the entity-category cache: sorted `LABEL:name` pairs joined by `|`.
    pub fn entity_list_key(&self, labels: &[Label]) -> String {
        let mut pairs: Vec<String> = self
            .entity_label_dict
            .iter()
            .filter(|(_, l)| labels.contains(l))
            .map(|(n, l)| format!("{}:{}", l, n))
            .collect();
        pairs.sort();
        pairs.join("|")
    }

    pub fn has_identical_title(&self, other: &Sale) -> bool {
        let (a, b) = (self.title.trim(), other.title.trim());
        !a.is_empty() && a == b
    }

    pub fn properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        for (key, value) in [
            ("SIZE", &self.size),
            ("AGE", &self.age),
            ("USAGE", &self.usage),
            ("WARRANTY", &self.warranty),
        ] {
            if !value.is_empty() {
                props.insert(key.to_string(), value.clone());
            }
        }
        if self.is_cover_available {
            props.insert("ORIGINAL_COVER".to_string(), "Yes".to_string());
        }
        props
    }

    /// Persisted fields that differ from `stored`. Bookkeeping fields
    /// (version, dates, outlier flag, comment) and immutable ones are not compared.
    pub fn changed_fields(&self, stored: &Sale) -> Vec<&'static str> {
        fn price_eq(a: f64, b: f64) -> bool {
            (a - b).abs() < 1e-6
        }
        let checks = [
            ("source", self.source == stored.source),
            ("region", self.region == stored.region),
            ("product_category", self.product_category == stored.product_category),
            ("product_sub_category", self.product_sub_category == stored.product_sub_category),
            ("sale_state", self.sale_state == stored.sale_state),
            ("href", self.href == stored.href),
            ("title", self.title == stored.title),
            ("description", self.description == stored.description),
            ("price", price_eq(self.price, stored.price)),
            ("price_single", price_eq(self.price_single, stored.price_single)),
            ("price_original", price_eq(self.price_original, stored.price_original)),
            ("is_total_price", self.is_total_price == stored.is_total_price),
            ("is_single_price", self.is_single_price == stored.is_single_price),
            ("is_new", self.is_new == stored.is_new),
            ("is_like_new", self.is_like_new == stored.is_like_new),
            ("is_used", self.is_used == stored.is_used),
            ("is_cover_available", self.is_cover_available == stored.is_cover_available),
            ("number", self.number == stored.number),
            ("size", self.size == stored.size),
            ("age", self.age == stored.age),
            ("usage", self.usage == stored.usage),
            ("warranty", self.warranty == stored.warranty),
            ("object_state", self.object_state == stored.object_state),
            ("entity_labels", self.entity_names == stored.entity_names),
            ("entity_labels_dict", self.entity_label_dict == stored.entity_label_dict),
        ];
        checks
            .into_iter()
            .filter(|(_, same)| !same)
            .map(|(name, _)| name)
            .collect()
    }
}

pub fn join_text(title: &str, description: &str) -> String {
    if description.trim().is_empty() {
        title.trim().to_string()
    } else {
        format!("{}{}{}", title.trim(), TEXT_SEPARATOR, description.trim())
    }
}
