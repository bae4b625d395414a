// Attribute matcher library: each rule is (attribute, token patterns, extractor)
use super::pattern::{TokenPattern as P, TokenSpec, int, num, one_of, word, Predicate};
use super::tagger::{Dep, Pos, Tag};
use super::tokenizer::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    IsNew,
    IsLikeNew,
    IsUsed,
    IsCoverAvailable,
    Size,
    Number,
    Price,
    PriceOriginal,
    PriceSingle,
    IsTotalPrice,
    Age,
    Usage,
    Warranty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// The rule fired.
    Flag,
    /// Exact text of the matched span.
    Span,
    /// First number token of the span, as a decimal.
    Decimal,
    /// First integer token of the span, at least 1.
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Flag(bool),
    Text(String),
    Decimal(f64),
    Count(u32),
}

#[derive(Debug, Clone)]
pub struct AttributeRule {
    pub attribute: Attribute,
    pub patterns: Vec<P>,
    pub extractor: Extractor,
}

impl AttributeRule {
    fn new(attribute: Attribute, extractor: Extractor, patterns: Vec<P>) -> Self {
        Self {
            attribute,
            patterns,
            extractor,
        }
    }

    /// Applies the rule to a document; the earliest match whose value can be
    /// extracted wins. Never fails: no match is `None`.
    pub fn apply(&self, text: &str, tokens: &[Token]) -> Option<AttributeValue> {
        for start in 0..tokens.len() {
            for pattern in &self.patterns {
                let Some(end) = pattern.match_at(tokens, start) else {
                    continue;
                };
                if let Some(value) = self.extract(text, &tokens[start..end]) {
                    return Some(value);
                }
            }
        }
        None
    }

    fn extract(&self, text: &str, span: &[Token]) -> Option<AttributeValue> {
        match self.extractor {
            Extractor::Flag => Some(AttributeValue::Flag(true)),
            Extractor::Span => {
                let (first, last) = (span.first()?, span.last()?);
                text.get(first.start..last.end)
                    .map(|s| AttributeValue::Text(s.to_string()))
            }
            Extractor::Decimal => span
                .iter()
                .find(|t| t.like_num)
                .and_then(Token::number_value)
                .filter(|v| *v >= 0.0)
                .map(AttributeValue::Decimal),
            Extractor::Count => span
                .iter()
                .find(|t| t.is_integer())
                .and_then(Token::number_value)
                .filter(|v| *v >= 1.0 && *v <= u32::MAX as f64)
                .map(|v| AttributeValue::Count(v as u32)),
        }
    }
}

const SIZE_WORDS: &[&str] = &["grösse", "gr.", "gr"];
const LETTER_SIZES: &[&str] = &["X", "XX", "XXX", "XXXX"];
const CURRENCY: &[&str] = &["chf", "fr.", "fr"];
const LENGTH_UNITS: &[&str] = &["cm", "mm", "m"];
const TIME_UNITS: &[&str] = &["jahr", "monat", "woche"];
const PRICE_CONTEXT: &[&str] = &["neupreis", "np", "np.", "gekauft", "preis", "kaufpreis", "für"];

fn currency() -> TokenSpec {
    one_of(CURRENCY).opt()
}

fn colon() -> TokenSpec {
    word(":").opt()
}

fn time_unit() -> TokenSpec {
    TokenSpec::any().with(Predicate::LemmaIn(TIME_UNITS))
}

/// The built-in German rule library.
pub fn builtin_rules() -> Vec<AttributeRule> {
    use Attribute::*;
    use Extractor::*;

    vec![
        AttributeRule::new(IsNew, Flag, vec![
            P(vec![TokenSpec::any().with(Predicate::LowerPrefix("neuwertig"))]),
            P(vec![word("originalverpackt")]),
            P(vec![word("wie"), word("neu")]),
            P(vec![word("zustand"), colon(), word("sehr"), word("gut")]),
            P(vec![word("neu").with(Predicate::Pos(Pos::Adj))]),
        ]),
        AttributeRule::new(IsLikeNew, Flag, vec![
            P(vec![one_of(&["neuwertig", "neuwertige", "neuwertigen", "neuwertigem", "neuwertiger", "neuwertiges"])]),
            P(vec![word("wie"), word("neu")]),
            P(vec![word("in"), word("sehr"), one_of(&["gutem", "guten"]), word("zustand")]),
        ]),
        AttributeRule::new(IsUsed, Flag, vec![
            P(vec![word("gebraucht").with(Predicate::Pos(Pos::Verb))]),
            P(vec![one_of(&["gebrauchsspuren", "gebrauchspuren", "gebrauchsspur"])]),
            P(vec![TokenSpec::any().with(Predicate::Lemma("kratzer"))]),
            P(vec![TokenSpec::any().with(Predicate::Lemma("schaden"))]),
            P(vec![word("fast"), TokenSpec::any().opt(), word("neu")]),
            P(vec![word("nicht"), word("mehr"), TokenSpec::any().opt(), word("neu")]),
            P(vec![one_of(&["neupreis", "np", "np."])]),
        ]),
        AttributeRule::new(IsCoverAvailable, Flag, vec![
            P(vec![word("originalverpackt")]),
            P(vec![word("ovp")]),
            P(vec![word("in"), word("der").opt(), word("originalverpackung")]),
            P(vec![word("originalverpackung"), word("ist").opt(), word("vorhanden")]),
        ]),
        AttributeRule::new(Size, Span, vec![
            P(vec![one_of(SIZE_WORDS), colon(), num()]),
            P(vec![one_of(SIZE_WORDS), colon(), TokenSpec::any().with(Predicate::ShapeIn(LETTER_SIZES))]),
            P(vec![TokenSpec::any().with(Predicate::PosIn(&[Pos::Noun, Pos::Propn])), num(), one_of(LENGTH_UNITS)]),
            P(vec![num(), word("x"), num(), word("x"), num(), one_of(LENGTH_UNITS).opt()]),
        ]),
        AttributeRule::new(Number, Count, vec![
            P(vec![int(), word("mal")]),
            P(vec![int(), word("er").opt(), word("-").opt(), word("set")]),
            P(vec![word("preis"), word("für"), word("alle"), int().with(Predicate::NotPriceLike)]),
            P(vec![int().with(Predicate::NotPriceLike), word("stück")]),
        ]),
        AttributeRule::new(Price, Decimal, vec![
            P(vec![one_of(&["preis", "verkaufspreis", "vp"]), colon(), currency(), num()]),
            P(vec![num().with(Predicate::PriceLike)]),
        ]),
        AttributeRule::new(PriceOriginal, Decimal, vec![
            P(vec![one_of(&["np", "np.", "neupreis"]), colon(), currency(), num()]),
            P(vec![word("chf"), num()]),
            P(vec![word("gekauft"), word("für"), currency(), num()]),
            P(vec![one_of(PRICE_CONTEXT), colon(), word("ca."), currency(), num()]),
        ]),
        AttributeRule::new(PriceSingle, Decimal, vec![
            P(vec![word("verkaufspreis"), colon(), currency(), num()]),
            P(vec![num(), currency(), one_of(&["pro", "je", "/"]), word("stück")]),
            P(vec![word("preis"), one_of(&["pro", "/"]), word("stück"), colon(), currency(), num()]),
        ]),
        AttributeRule::new(IsTotalPrice, Flag, vec![
            P(vec![word("preis"), word("für"), word("alle")]),
            P(vec![word("zusammen")]),
            P(vec![int(), word("er").with(Predicate::Dep(Dep::Subtok)), word("-").opt(), word("set")]),
            P(vec![word("gesamtpreis")]),
        ]),
        AttributeRule::new(Age, Span, vec![
            P(vec![word("ca.").opt(), int(), time_unit(), word("alt")]),
            P(vec![word("ca.").opt(), int(), time_unit(), word("gebraucht").with(Predicate::Tag(Tag::Vvpp))]),
            P(vec![word("vor"), word("ca.").opt(), int(), time_unit(), word("gekauft")]),
        ]),
        AttributeRule::new(Usage, Span, vec![
            P(vec![num(), word("km"), word("laufleistung").opt()]),
            P(vec![int(), time_unit(), word("gebraucht")]),
        ]),
        AttributeRule::new(Warranty, Span, vec![
            P(vec![word("garantie"), word("bis"), TokenSpec::any().with(Predicate::Date)]),
            P(vec![word("garantie"), word("bis"), TokenSpec::any().with(Predicate::Year)]),
        ]),
    ]
}
