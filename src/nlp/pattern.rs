// Token patterns: sequences of token predicates with optional quantifiers
use super::tagger::{Dep, Pos, Tag};
use super::tokenizer::Token;

#[derive(Debug, Clone)]
pub enum Predicate {
    Lower(&'static str),
    LowerIn(&'static [&'static str]),
    LowerPrefix(&'static str),
    Lemma(&'static str),
    LemmaIn(&'static [&'static str]),
    Pos(Pos),
    PosIn(&'static [Pos]),
    Tag(Tag),
    Dep(Dep),
    ShapeIn(&'static [&'static str]),
    LikeNum,
    Integer,
    PriceLike,
    NotPriceLike,
    Date,
    Year,
}

impl Predicate {
    fn test(&self, token: &Token) -> bool {
        match self {
            Predicate::Lower(s) => token.lower == *s,
            Predicate::LowerIn(list) => list.contains(&token.lower.as_str()),
            Predicate::LowerPrefix(p) => token.lower.starts_with(p),
            Predicate::Lemma(s) => token.lemma == *s,
            Predicate::LemmaIn(list) => list.contains(&token.lemma.as_str()),
            Predicate::Pos(p) => token.pos == *p,
            Predicate::PosIn(list) => list.contains(&token.pos),
            Predicate::Tag(t) => token.tag == *t,
            Predicate::Dep(d) => token.dep == *d,
            Predicate::ShapeIn(list) => list.contains(&token.shape.as_str()),
            Predicate::LikeNum => token.like_num,
            Predicate::Integer => token.is_integer(),
            Predicate::PriceLike => token.is_price_like(),
            Predicate::NotPriceLike => !token.is_price_like(),
            Predicate::Date => token.is_date,
            Predicate::Year => {
                token.is_integer()
                    && token.text.len() == 4
                    && token.number_value().is_some_and(|y| (1900.0..=2100.0).contains(&y))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    One,
    /// `?`: zero or one.
    Optional,
}

/// One position of a pattern. No predicates means "any token".
#[derive(Debug, Clone)]
pub struct TokenSpec {
    pub predicates: Vec<Predicate>,
    pub quantifier: Quantifier,
}

impl TokenSpec {
    pub fn any() -> Self {
        Self {
            predicates: Vec::new(),
            quantifier: Quantifier::One,
        }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn opt(mut self) -> Self {
        self.quantifier = Quantifier::Optional;
        self
    }

    pub fn lower(self, s: &'static str) -> Self {
        self.with(Predicate::Lower(s))
    }

    pub fn lower_in(self, list: &'static [&'static str]) -> Self {
        self.with(Predicate::LowerIn(list))
    }

    pub fn matches(&self, token: &Token) -> bool {
        self.predicates.iter().all(|p| p.test(token))
    }
}

/// Shorthand for a spec matching one exact lowercase word.
pub fn word(s: &'static str) -> TokenSpec {
    TokenSpec::any().lower(s)
}

/// Shorthand for a spec matching any of the given lowercase words.
pub fn one_of(list: &'static [&'static str]) -> TokenSpec {
    TokenSpec::any().lower_in(list)
}

pub fn num() -> TokenSpec {
    TokenSpec::any().with(Predicate::LikeNum)
}

pub fn int() -> TokenSpec {
    TokenSpec::any().with(Predicate::Integer)
}

#[derive(Debug, Clone)]
pub struct TokenPattern(pub Vec<TokenSpec>);

impl TokenPattern {
    /// End index of the match starting at `start`, preferring to consume optional tokens.
    /// Empty matches are rejected.
    pub fn match_at(&self, tokens: &[Token], start: usize) -> Option<usize> {
        let end = Self::step(&self.0, tokens, start)?;
        (end > start).then_some(end)
    }

    fn step(specs: &[TokenSpec], tokens: &[Token], pos: usize) -> Option<usize> {
        let Some((spec, rest)) = specs.split_first() else {
            return Some(pos);
        };
        let consumed = tokens
            .get(pos)
            .filter(|t| spec.matches(t))
            .and_then(|_| Self::step(rest, tokens, pos + 1));
        match spec.quantifier {
            Quantifier::One => consumed,
            Quantifier::Optional => consumed.or_else(|| Self::step(rest, tokens, pos)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::tagger::Tagger;
    use crate::nlp::tokenizer::Tokenizer;
    use crate::registry::Registry;

    impl TokenPattern {
        /// First match in document order as a half-open token range.
        fn find(&self, tokens: &[Token]) -> Option<(usize, usize)> {
            (0..tokens.len()).find_map(|start| self.match_at(tokens, start).map(|end| (start, end)))
        }
    }

    fn tokens(text: &str) -> Vec<Token> {
        let mut t = Tokenizer::new().unwrap().tokenize(text);
        Tagger::new().tag(&mut t, &Registry::builtin());
        t
    }

    #[test]
    fn optional_token_may_be_skipped() {
        let p = TokenPattern(vec![word("in"), word("der").opt(), word("originalverpackung")]);
        assert_eq!(p.find(&tokens("noch in Originalverpackung")), Some((1, 3)));
        assert_eq!(p.find(&tokens("in der Originalverpackung")), Some((0, 3)));
        assert_eq!(p.find(&tokens("in einer Originalverpackung")), None);
    }

    #[test]
    fn any_token_wildcard() {
        let p = TokenPattern(vec![word("fast"), TokenSpec::any().opt(), word("neu")]);
        assert_eq!(p.find(&tokens("fast wie neu")), Some((0, 3)));
        assert_eq!(p.find(&tokens("fast neu")), Some((0, 2)));
    }

    #[test]
    fn returns_first_match_in_document_order() {
        let p = TokenPattern(vec![num(), word("cm")]);
        assert_eq!(p.find(&tokens("Breite 40 cm, Höhe 80 cm")), Some((1, 3)));
    }

    #[test]
    fn rejects_empty_match() {
        let p = TokenPattern(vec![word("zusammen").opt()]);
        assert_eq!(p.find(&tokens("Tisch")), None);
    }

    #[test]
    fn predicates_on_tags() {
        let p = TokenPattern(vec![TokenSpec::any().with(Predicate::Pos(Pos::Verb)).lower("gebraucht")]);
        assert!(p.find(&tokens("kaum gebraucht")).is_some());
        let year = TokenPattern(vec![TokenSpec::any().with(Predicate::Year)]);
        assert!(year.find(&tokens("bis 2026")).is_some());
        assert!(year.find(&tokens("bis 500")).is_none());
    }
}
