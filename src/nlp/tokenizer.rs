// Tokenization of normalized German listing text
use super::tagger::{Dep, Pos, Tag};
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub lower: String,
    pub lemma: String,
    /// Byte offsets into the document text.
    pub start: usize,
    pub end: usize,
    pub pos: Pos,
    pub tag: Tag,
    pub dep: Dep,
    pub shape: String,
    pub like_num: bool,
    pub is_date: bool,
    pub is_punct: bool,
    /// No whitespace between this token and the previous one.
    pub glued: bool,
}

impl Token {
    /// Numeric value of a number token: apostrophe separators and a trailing ".-" are stripped.
    pub fn number_value(&self) -> Option<f64> {
        if !self.like_num {
            return None;
        }
        parse_number(&self.text)
    }

    pub fn is_integer(&self) -> bool {
        self.like_num && !self.text.contains(['.', ','])
    }

    /// Price notation such as "30.-".
    pub fn is_price_like(&self) -> bool {
        self.like_num && self.text.ends_with(".-")
    }
}

/// Parses "2'900.-", "1'200.50", "12,5" and "30" into a float.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_end_matches(".-")
        .trim_end_matches('-')
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// spaCy-style word shape: "Kitos" -> "Xxxxx", "2'900.-" -> "d'ddd.-".
pub fn word_shape(text: &str) -> String {
    let mut shape = String::new();
    let mut last: Option<char> = None;
    let mut run = 0;
    for c in text.chars() {
        let s = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() {
            'x'
        } else if c.is_ascii_digit() {
            'd'
        } else {
            c
        };
        if Some(s) == last {
            run += 1;
        } else {
            run = 1;
            last = Some(s);
        }
        if run <= 4 {
            shape.push(s);
        }
    }
    shape
}

pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    pub fn new() -> Result<Self, regex::Error> {
        let pattern = Regex::new(concat!(
            r"(?P<date>\d{1,2}\.\d{1,2}\.\d{2,4})",
            r"|(?P<num>\d+(?:'\d{3})*(?:[.,]\d+)?(?:\.-)?)",
            r"|(?P<abbr>(?i:ca|gr|inkl|evtl|bzw|np|max|min|zb|usw|st|nr)\.)",
            r"|(?P<word>\p{L}+)",
            r"|(?P<punct>[^\s\p{L}\d])",
        ))?;
        Ok(Self { pattern })
    }

    /// Splits text into untagged tokens; tagging fills `pos`, `tag`, `dep` and `lemma`.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        for caps in self.pattern.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let glued = tokens.last().is_some_and(|t| t.end == m.start());
            let is_date = caps.name("date").is_some();
            let like_num = caps.name("num").is_some();
            let is_punct = caps.name("punct").is_some();
            let word = m.as_str();
            tokens.push(Token {
                text: word.to_string(),
                lower: word.to_lowercase(),
                lemma: word.to_lowercase(),
                start: m.start(),
                end: m.end(),
                pos: Pos::X,
                tag: Tag::Xy,
                dep: Dep::Dep,
                shape: word_shape(word),
                like_num,
                is_date,
                is_punct,
                glued,
            });
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        Tokenizer::new()
            .unwrap()
            .tokenize(text)
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn splits_prices_and_counts() {
        assert_eq!(texts("4er Set, 500.-"), vec!["4", "er", "Set", ",", "500.-"]);
        assert_eq!(texts("CHF 2'900.- Topstühle"), vec!["CHF", "2'900.-", "Topstühle"]);
        assert_eq!(texts("91-teilig"), vec!["91", "-", "teilig"]);
    }

    #[test]
    fn keeps_dates_and_abbreviations() {
        assert_eq!(texts("Garantie bis 31.12.2025"), vec!["Garantie", "bis", "31.12.2025"]);
        assert_eq!(texts("Gr. 38, ca. 20"), vec!["Gr.", "38", ",", "ca.", "20"]);
        assert_eq!(texts("40x60x80cm"), vec!["40", "x", "60", "x", "80", "cm"]);
    }

    #[test]
    fn glued_marks_split_words() {
        let tokens = Tokenizer::new().unwrap().tokenize("4er Set");
        assert!(tokens[1].glued);
        assert!(!tokens[2].glued);
    }

    #[test]
    fn parses_swiss_numbers() {
        assert_eq!(parse_number("2'900.-"), Some(2900.0));
        assert_eq!(parse_number("1'200.50"), Some(1200.5));
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(".-"), None);
    }

    #[test]
    fn shapes_truncate_runs() {
        assert_eq!(word_shape("Kitos"), "Xxxxx");
        assert_eq!(word_shape("Kugelbahn"), "Xxxxx");
        assert_eq!(word_shape("2'900.-"), "d'ddd.-");
        assert_eq!(word_shape("31.12.2025"), "dd.dd.dddd");
    }
}
