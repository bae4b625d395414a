// Gazetteer phrase matcher producing labeled entities
use super::tokenizer::{Token, Tokenizer};
use crate::registry::{Label, Registry};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityHit {
    /// Canonical name.
    pub name: String,
    pub label: Label,
    /// Token range of the first occurrence.
    pub start: usize,
    pub end: usize,
}

struct Phrase {
    tokens: Vec<String>,
    canonical: String,
}

pub struct PhraseMatcher {
    /// label -> first token text -> phrases, longest first
    phrases: HashMap<Label, HashMap<String, Vec<Phrase>>>,
}

impl PhraseMatcher {
    pub fn new(registry: &Registry, tokenizer: &Tokenizer) -> Self {
        let mut phrases: HashMap<Label, HashMap<String, Vec<Phrase>>> = HashMap::new();
        for label in Label::ALL {
            for surface in registry.names_for_label(label) {
                let Some(canonical) = registry.main_name(label, &surface) else {
                    continue;
                };
                let tokens: Vec<String> = tokenizer
                    .tokenize(&surface)
                    .into_iter()
                    .map(|t| t.text)
                    .collect();
                let Some(first) = tokens.first().cloned() else {
                    continue;
                };
                phrases
                    .entry(label)
                    .or_default()
                    .entry(first)
                    .or_default()
                    .push(Phrase { tokens, canonical });
            }
        }
        for by_first in phrases.values_mut() {
            for list in by_first.values_mut() {
                list.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));
            }
        }
        Self { phrases }
    }

    /// Scans the document once per label. Hits are returned in document order,
    /// one per (canonical name, label).
    pub fn find(&self, tokens: &[Token]) -> Vec<EntityHit> {
        let mut hits: Vec<EntityHit> = Vec::new();
        for label in Label::ALL {
            let Some(by_first) = self.phrases.get(&label) else {
                continue;
            };
            let mut i = 0;
            while i < tokens.len() {
                let longest = by_first.get(&tokens[i].text).and_then(|list| {
                    list.iter().find(|p| {
                        p.tokens.len() <= tokens.len() - i
                            && p.tokens.iter().zip(&tokens[i..]).all(|(a, b)| *a == b.text)
                    })
                });
                match longest {
                    Some(phrase) => {
                        let end = i + phrase.tokens.len();
                        if !hits.iter().any(|h| h.label == label && h.name == phrase.canonical) {
                            hits.push(EntityHit {
                                name: phrase.canonical.clone(),
                                label,
                                start: i,
                                end,
                            });
                        }
                        i = end;
                    }
                    None => i += 1,
                }
            }
        }

        for (i, token) in tokens.iter().enumerate() {
            if token.is_date && !hits.iter().any(|h| h.label == Label::Date && h.name == token.text) {
                hits.push(EntityHit {
                    name: token.text.clone(),
                    label: Label::Date,
                    start: i,
                    end: i + 1,
                });
            }
        }

        hits.sort_by_key(|h| (h.start, h.end));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(text: &str) -> Vec<(String, Label)> {
        let registry = Registry::builtin();
        let tokenizer = Tokenizer::new().unwrap();
        let matcher = PhraseMatcher::new(&registry, &tokenizer);
        matcher
            .find(&tokenizer.tokenize(text))
            .into_iter()
            .map(|h| (h.name, h.label))
            .collect()
    }

    #[test]
    fn finds_entities_in_document_order() {
        let hits = find("Hape, Kugelbahn 'The Roundabout' 91-teilig");
        assert_eq!(
            hits,
            vec![
                ("Hape".to_string(), Label::Company),
                ("Kugelbahn".to_string(), Label::Object),
                ("Roundabout".to_string(), Label::Product),
            ]
        );
    }

    #[test]
    fn maps_synonyms_and_case_variants_to_canonical() {
        let hits = find("4 STÜHLE aus holz, dazu ein Fahrrad");
        assert!(hits.contains(&("Stuhl".to_string(), Label::Object)));
        assert!(hits.contains(&("Holz".to_string(), Label::Material)));
        assert!(hits.contains(&("Velo".to_string(), Label::Object)));
    }

    #[test]
    fn duplicates_collapse() {
        let hits = find("Tisch und Tische und Esstisch");
        assert_eq!(hits, vec![("Tisch".to_string(), Label::Object)]);
    }

    #[test]
    fn prefers_longest_phrase() {
        let hits = find("Tripp Trapp von Stokke");
        assert!(hits.contains(&("Tripp Trapp".to_string(), Label::Product)));
        let hits = find("Wohnort St. Gallen");
        assert_eq!(hits, vec![("St. Gallen".to_string(), Label::Loc)]);
    }

    #[test]
    fn tags_dates() {
        let hits = find("Garantie bis 31.12.2025");
        assert_eq!(hits, vec![("31.12.2025".to_string(), Label::Date)]);
    }
}
