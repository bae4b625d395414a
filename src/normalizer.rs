// Text preprocessing before tokenization
use crate::registry::Registry;
use regex::{Regex, RegexBuilder};
use tracing::warn;

pub struct Normalizer {
    whitespace: Regex,
    currency: Regex,
    thousands: Regex,
    variants: Vec<(Regex, String)>,
}

impl Normalizer {
    pub fn new(registry: &Registry) -> Result<Self, regex::Error> {
        let mut variants = Vec::new();
        for (variant, replacement) in registry.spelling_variants() {
            let escaped = regex::escape(variant);
            let starts_word = variant.chars().next().is_some_and(char::is_alphanumeric);
            let ends_word = variant.chars().last().is_some_and(char::is_alphanumeric);
            let pattern = format!(
                "{}{}{}",
                if starts_word { r"\b" } else { "" },
                escaped,
                if ends_word { r"\b" } else { "" }
            );
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(re) => variants.push((re, replacement.clone())),
                Err(e) => warn!("Skipping spelling variant '{}': {}", variant, e),
            }
        }

        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            // "Fr. 30", "SFr 30", "sFr. 30", "CHF. 30" -> "CHF 30"
            currency: Regex::new(r"(?i)\b(?:s?fr|chf)\.?(\s*)(\d)")?,
            // typographic apostrophes used as thousands separators: 1’200 -> 1'200
            thousands: Regex::new(r"(\d)[’`´](\d)")?,
            variants,
        })
    }

    /// Collapses whitespace, standardizes currency tokens and rewrites spelling variants.
    /// Price tokens keep their original form ("1'200.-").
    pub fn normalize(&self, text: &str) -> String {
        let text = text
            .replace(['\u{2013}', '\u{2014}'], "-")
            .replace(['\u{201C}', '\u{201D}', '\u{201E}', '\u{00AB}', '\u{00BB}'], "\"")
            .replace(['\u{2018}', '\u{201A}'], "'")
            .replace(".--", ".-");
        let text = self.thousands.replace_all(&text, "$1'$2");
        let text = self.currency.replace_all(&text, "CHF $2");
        let mut text = self.whitespace.replace_all(&text, " ").trim().to_string();
        for (re, replacement) in &self.variants {
            text = re.replace_all(&text, replacement.as_str()).into_owned();
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(&Registry::builtin()).unwrap()
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalizer().normalize("  Tisch \n\t aus   Holz "), "Tisch aus Holz");
    }

    #[test]
    fn standardizes_currency_but_keeps_price_form() {
        let n = normalizer();
        assert_eq!(n.normalize("Fr. 1'200.-"), "CHF 1'200.-");
        assert_eq!(n.normalize("SFr 30.--"), "CHF 30.-");
        assert_eq!(n.normalize("CHF 2’900.–"), "CHF 2'900.-");
    }

    #[test]
    fn rewrites_spelling_variants() {
        let n = normalizer();
        assert_eq!(n.normalize("Jacke aus Gore-Tex"), "Jacke aus Goretex");
        assert_eq!(n.normalize("GoreTex und goretex"), "Goretex und Goretex");
        assert_eq!(n.normalize("Größe 38"), "Grösse 38");
        assert_eq!(n.normalize("3 Stk. vorhanden"), "3 Stück vorhanden");
    }

    #[test]
    fn leaves_words_containing_variants_alone() {
        assert_eq!(normalizer().normalize("Stkx"), "Stkx");
    }
}
