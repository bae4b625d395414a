// Text analyzer: preprocessing, tagging, entity and attribute extraction
use super::cache::EntityCache;
use super::phrase::PhraseMatcher;
use super::rules::{builtin_rules, Attribute, AttributeRule, AttributeValue};
use super::tagger::Tagger;
use super::tokenizer::{Token, Tokenizer};
use crate::normalizer::Normalizer;
use crate::registry::{Label, Registry};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Words that put a nearby amount into "new price" context.
const ORIGINAL_PRICE_WORDS: &[&str] = &["neupreis", "np", "np.", "gekauft", "kaufpreis", "ladenpreis"];

/// Everything extracted from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentAnnotation {
    /// Preprocessed text the token offsets refer to.
    pub text: String,
    pub tokens: Vec<Token>,
    /// Canonical entities in document order, one per (name, label).
    pub entities: Vec<(String, Label)>,
    pub is_new: bool,
    pub is_like_new: bool,
    pub is_used: bool,
    pub is_cover_available: bool,
    pub is_total_price: bool,
    pub is_single_price: bool,
    pub size: String,
    pub age: String,
    pub usage: String,
    pub warranty: String,
    /// Units on offer, at least 1.
    pub number: u32,
    pub price: Option<f64>,
    pub price_original: Option<f64>,
    pub price_single: Option<f64>,
}

impl DocumentAnnotation {
    pub fn entity_label_dict(&self) -> BTreeMap<String, Label> {
        let mut dict = BTreeMap::new();
        for (name, label) in &self.entities {
            dict.entry(name.clone()).or_insert(*label);
        }
        dict
    }

    fn has_word(&self, words: &[&str]) -> bool {
        self.tokens.iter().any(|t| words.contains(&t.lower.as_str()))
    }
}

/// Holds the compiled pipeline; build once and reuse across documents.
pub struct TextAnalyzer {
    registry: Arc<Registry>,
    normalizer: Normalizer,
    tokenizer: Tokenizer,
    tagger: Tagger,
    phrases: PhraseMatcher,
    rules: Vec<AttributeRule>,
    cache: Option<Arc<EntityCache>>,
}

impl TextAnalyzer {
    pub fn new(registry: Arc<Registry>, cache: Option<Arc<EntityCache>>) -> Result<Self, regex::Error> {
        let normalizer = Normalizer::new(&registry)?;
        let tokenizer = Tokenizer::new()?;
        let phrases = PhraseMatcher::new(&registry, &tokenizer);
        Ok(Self {
            registry,
            normalizer,
            tokenizer,
            tagger: Tagger::new(),
            phrases,
            rules: builtin_rules(),
            cache,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn analyze(&self, raw: &str) -> DocumentAnnotation {
        let text = self.normalizer.normalize(raw);
        let mut tokens = self.tokenizer.tokenize(&text);
        self.tagger.tag(&mut tokens, &self.registry);

        let entities = match self.cache.as_ref().and_then(|c| c.get(raw)) {
            Some(cached) => cached,
            None => {
                let found: Vec<(String, Label)> = self
                    .phrases
                    .find(&tokens)
                    .into_iter()
                    .map(|hit| (hit.name, hit.label))
                    .collect();
                if let Some(cache) = &self.cache {
                    cache.put(raw, found.clone());
                }
                found
            }
        };

        let mut doc = DocumentAnnotation {
            entities,
            number: 1,
            ..Default::default()
        };

        for rule in &self.rules {
            let Some(value) = rule.apply(&text, &tokens) else {
                continue;
            };
            match (rule.attribute, value) {
                (Attribute::IsNew, AttributeValue::Flag(f)) => doc.is_new = f,
                (Attribute::IsLikeNew, AttributeValue::Flag(f)) => doc.is_like_new = f,
                (Attribute::IsUsed, AttributeValue::Flag(f)) => doc.is_used = f,
                (Attribute::IsCoverAvailable, AttributeValue::Flag(f)) => doc.is_cover_available = f,
                (Attribute::IsTotalPrice, AttributeValue::Flag(f)) => doc.is_total_price = f,
                (Attribute::Size, AttributeValue::Text(s)) => doc.size = s,
                (Attribute::Age, AttributeValue::Text(s)) => doc.age = s,
                (Attribute::Usage, AttributeValue::Text(s)) => doc.usage = s,
                (Attribute::Warranty, AttributeValue::Text(s)) => doc.warranty = s,
                (Attribute::Number, AttributeValue::Count(n)) => doc.number = n.max(1),
                (Attribute::Price, AttributeValue::Decimal(v)) => doc.price = Some(v),
                (Attribute::PriceOriginal, AttributeValue::Decimal(v)) => doc.price_original = Some(v),
                (Attribute::PriceSingle, AttributeValue::Decimal(v)) => {
                    doc.price_single = Some(v);
                    doc.is_single_price = true;
                }
                (attribute, value) => {
                    debug!("Ignoring {:?} value {:?} for {:?}", attribute, value, rule.extractor)
                }
            }
        }
        doc.text = text;
        doc.tokens = tokens;

        // An amount in new-price context is not the asking price; a bare "CHF N"
        // without such context is.
        if doc.has_word(ORIGINAL_PRICE_WORDS) {
            if doc.price.is_some() && doc.price == doc.price_original {
                doc.price = None;
            }
        } else if doc.price.is_none() {
            doc.price = doc.price_original;
        }
        doc
    }
}
