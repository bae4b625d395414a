// Rule-based part-of-speech tagging and shallow dependency labels for German
use super::tokenizer::Token;
use crate::registry::Registry;
use std::collections::HashMap;

/// Coarse universal part of speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pos {
    Noun,
    Propn,
    Verb,
    Aux,
    Adj,
    Adv,
    Num,
    Punct,
    Adp,
    Det,
    Pron,
    Cconj,
    Sconj,
    Part,
    Sym,
    X,
}

/// Fine STTS tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Card,
    Ne,
    Nn,
    Adja,
    Adjd,
    Vvfin,
    Vvpp,
    Vvinf,
    Vvizu,
    Vafin,
    Appr,
    Apprart,
    Art,
    Kon,
    Kokom,
    Adv,
    Ptkneg,
    Pper,
    Pposat,
    Piat,
    Punct,
    Xy,
}

/// TIGER dependency label, approximated by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dep {
    Nk,
    Root,
    Pnc,
    Subtok,
    Punct,
    Cj,
    Dep,
}

type Entry = (Pos, Tag, &'static str);

const LEXICON: &[(&[&str], Entry)] = &[
    (&["der", "die", "das", "den", "dem", "des"], (Pos::Det, Tag::Art, "der")),
    (&["ein", "eine", "einen", "einem", "einer", "eines"], (Pos::Det, Tag::Art, "ein")),
    (
        &["für", "mit", "in", "bis", "von", "auf", "aus", "nach", "ohne", "pro", "vor", "bei", "seit", "zu", "je", "um", "über", "unter", "an", "ab"],
        (Pos::Adp, Tag::Appr, ""),
    ),
    (&["im", "vom", "zum", "zur", "beim", "ins", "am"], (Pos::Adp, Tag::Apprart, "")),
    (&["und", "oder", "sowie", "aber", "sondern", "&"], (Pos::Cconj, Tag::Kon, "")),
    (&["wie", "als"], (Pos::Sconj, Tag::Kokom, "")),
    (
        &["sehr", "fast", "nur", "noch", "mehr", "zusammen", "ca.", "bereits", "kaum", "etwa", "auch", "leider", "selten", "nie", "immer", "sofort", "insgesamt", "total", "wenig", "kaum", "zirka"],
        (Pos::Adv, Tag::Adv, ""),
    ),
    (&["nicht"], (Pos::Part, Tag::Ptkneg, "nicht")),
    (&["ich", "wir", "er", "sie", "es"], (Pos::Pron, Tag::Pper, "")),
    (&["mein", "meine", "meinem", "meinen", "unser", "unsere"], (Pos::Det, Tag::Pposat, "mein")),
    (&["alle", "alles", "allen"], (Pos::Det, Tag::Piat, "alle")),
    (&["ist", "sind", "war", "waren"], (Pos::Aux, Tag::Vafin, "sein")),
    (&["hat", "haben", "habe", "hatte"], (Pos::Aux, Tag::Vafin, "haben")),
    (&["wird", "werden", "wurde", "wurden"], (Pos::Aux, Tag::Vafin, "werden")),
    (&["kann", "können"], (Pos::Aux, Tag::Vafin, "können")),
    (&["verkaufe", "verkaufen", "verkauft"], (Pos::Verb, Tag::Vvfin, "verkaufen")),
    (&["gekauft"], (Pos::Verb, Tag::Vvpp, "kaufen")),
    (&["gebraucht"], (Pos::Verb, Tag::Vvpp, "gebrauchen")),
    (&["benutzt"], (Pos::Verb, Tag::Vvpp, "benutzen")),
    (&["genutzt"], (Pos::Verb, Tag::Vvpp, "nutzen")),
    (&["abzugeben"], (Pos::Verb, Tag::Vvizu, "abgeben")),
    (&["abholen", "abzuholen"], (Pos::Verb, Tag::Vvinf, "abholen")),
    (&["neu"], (Pos::Adj, Tag::Adjd, "neu")),
    (&["neue", "neuen", "neuem", "neuer", "neues"], (Pos::Adj, Tag::Adja, "neu")),
    (&["neuwertig"], (Pos::Adj, Tag::Adjd, "neuwertig")),
    (&["neuwertige", "neuwertigen", "neuwertigem", "neuwertiger", "neuwertiges"], (Pos::Adj, Tag::Adja, "neuwertig")),
    (&["gut"], (Pos::Adj, Tag::Adjd, "gut")),
    (&["gute", "guten", "gutem", "guter", "gutes"], (Pos::Adj, Tag::Adja, "gut")),
    (&["alt"], (Pos::Adj, Tag::Adjd, "alt")),
    (&["alte", "alten", "altem", "alter", "altes"], (Pos::Adj, Tag::Adja, "alt")),
    (&["originalverpackt", "vorhanden", "defekt", "neuwertig"], (Pos::Adj, Tag::Adjd, "")),
    (&["jahr", "jahre", "jahren", "jahres"], (Pos::Noun, Tag::Nn, "jahr")),
    (&["monat", "monate", "monaten"], (Pos::Noun, Tag::Nn, "monat")),
    (&["woche", "wochen"], (Pos::Noun, Tag::Nn, "woche")),
    (&["kratzer"], (Pos::Noun, Tag::Nn, "kratzer")),
    (&["schaden", "schäden"], (Pos::Noun, Tag::Nn, "schaden")),
    (&["stück"], (Pos::Noun, Tag::Nn, "stück")),
    (&["gebrauchsspuren", "gebrauchspuren", "gebrauchsspur"], (Pos::Noun, Tag::Nn, "gebrauchsspur")),
    (&["np", "np.", "neupreis"], (Pos::Noun, Tag::Nn, "neupreis")),
    (&["gr.", "grösse", "grössen"], (Pos::Noun, Tag::Nn, "grösse")),
    (&["cm", "mm", "m", "km", "kg", "chf"], (Pos::Noun, Tag::Nn, "")),
    (&["x"], (Pos::Sym, Tag::Xy, "x")),
];

const ADJ_SUFFIXES: &[&str] = &["ig", "lich", "isch", "bar", "los", "haft", "wertig"];
const ADJ_INFLECTIONS: &[&str] = &["em", "en", "er", "es", "e"];

pub struct Tagger {
    lexicon: HashMap<&'static str, Entry>,
}

impl Tagger {
    pub fn new() -> Self {
        let mut lexicon = HashMap::new();
        for (forms, entry) in LEXICON {
            for form in *forms {
                lexicon.entry(*form).or_insert(*entry);
            }
        }
        Self { lexicon }
    }

    /// Assigns POS, fine tag, lemma and dependency label to every token.
    pub fn tag(&self, tokens: &mut [Token], registry: &Registry) {
        for token in tokens.iter_mut() {
            let (pos, tag, lemma) = self.classify(token, registry);
            token.pos = pos;
            token.tag = tag;
            if let Some(lemma) = lemma {
                token.lemma = lemma;
            }
        }
        assign_dependencies(tokens);
    }

    fn classify(&self, token: &Token, registry: &Registry) -> (Pos, Tag, Option<String>) {
        if token.is_punct {
            return (Pos::Punct, Tag::Punct, None);
        }
        if token.like_num || token.is_date {
            return (Pos::Num, Tag::Card, None);
        }
        if let Some((pos, tag, lemma)) = self.lexicon.get(token.lower.as_str()) {
            let lemma = (!lemma.is_empty()).then(|| lemma.to_string());
            return (*pos, *tag, lemma);
        }

        let first_upper = token.text.chars().next().is_some_and(char::is_uppercase);
        if first_upper {
            let acronym = token.text.chars().count() > 1 && token.text.chars().all(|c| !c.is_lowercase());
            if acronym || registry.is_proper_name(&token.text) {
                return (Pos::Propn, Tag::Ne, None);
            }
            return (Pos::Noun, Tag::Nn, None);
        }

        let lower = token.lower.as_str();
        if lower.starts_with("ge") && lower.ends_with('t') && lower.chars().count() > 5 {
            return (Pos::Verb, Tag::Vvpp, None);
        }
        if ADJ_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return (Pos::Adj, Tag::Adjd, None);
        }
        for inflection in ADJ_INFLECTIONS {
            if let Some(stem) = lower.strip_suffix(inflection) {
                if ADJ_SUFFIXES.iter().any(|s| stem.ends_with(s)) {
                    return (Pos::Adj, Tag::Adja, Some(stem.to_string()));
                }
            }
        }
        if lower.ends_with("en") && lower.chars().count() > 4 {
            return (Pos::Verb, Tag::Vvinf, None);
        }
        (Pos::Adv, Tag::Adv, None)
    }
}

fn is_sentence_end(token: &Token) -> bool {
    token.is_punct && matches!(token.text.as_str(), "." | "!" | "?" | "|")
}

fn assign_dependencies(tokens: &mut [Token]) {
    let n = tokens.len();
    for i in 0..n {
        let next = tokens.get(i + 1).map(|t| t.pos);
        let prev = if i > 0 { Some(&tokens[i - 1]) } else { None };
        let dep = if tokens[i].is_punct {
            Dep::Punct
        } else if tokens[i].glued && prev.is_some_and(|p| p.like_num) && !tokens[i].like_num {
            Dep::Subtok
        } else if prev.is_some_and(|p| p.pos == Pos::Cconj) {
            Dep::Cj
        } else if tokens[i].pos == Pos::Propn && matches!(next, Some(Pos::Propn | Pos::Noun)) {
            Dep::Pnc
        } else if matches!(tokens[i].pos, Pos::Det | Pos::Num)
            || (tokens[i].tag == Tag::Adja)
        {
            if matches!(next, Some(Pos::Noun | Pos::Propn | Pos::Adj)) {
                Dep::Nk
            } else {
                Dep::Dep
            }
        } else {
            Dep::Dep
        };
        tokens[i].dep = dep;
    }

    // one ROOT per sentence: first verb, otherwise first noun
    let mut start = 0;
    while start < n {
        let end = (start..n).find(|&i| is_sentence_end(&tokens[i])).map_or(n, |i| i + 1);
        let root = (start..end)
            .find(|&i| matches!(tokens[i].pos, Pos::Verb | Pos::Aux) && tokens[i].dep == Dep::Dep)
            .or_else(|| {
                (start..end).find(|&i| {
                    matches!(tokens[i].pos, Pos::Noun | Pos::Propn) && tokens[i].dep == Dep::Dep
                })
            });
        if let Some(i) = root {
            tokens[i].dep = Dep::Root;
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::tokenizer::Tokenizer;

    fn tagged(text: &str) -> Vec<Token> {
        let registry = Registry::builtin();
        let mut tokens = Tokenizer::new().unwrap().tokenize(text);
        Tagger::new().tag(&mut tokens, &registry);
        tokens
    }

    #[test]
    fn tags_nouns_brands_and_numbers() {
        let tokens = tagged("USM Kitos Tisch, Durchmesser 90 cm");
        assert_eq!(tokens[0].pos, Pos::Propn);
        assert_eq!(tokens[1].pos, Pos::Propn);
        assert_eq!(tokens[2].pos, Pos::Noun);
        assert_eq!(tokens[4].pos, Pos::Noun);
        assert_eq!(tokens[5].tag, Tag::Card);
        assert_eq!(tokens[3].dep, Dep::Punct);
        assert_eq!(tokens[0].dep, Dep::Pnc);
    }

    #[test]
    fn tags_participles_and_adjectives() {
        let tokens = tagged("wenig gebraucht, neuwertigen Zustand");
        assert_eq!(tokens[1].pos, Pos::Verb);
        assert_eq!(tokens[1].tag, Tag::Vvpp);
        assert_eq!(tokens[3].tag, Tag::Adja);
        assert_eq!(tokens[3].lemma, "neuwertig");
    }

    #[test]
    fn lemmatizes_time_units() {
        let tokens = tagged("2 Jahren und 3 Monate");
        assert_eq!(tokens[1].lemma, "jahr");
        assert_eq!(tokens[4].lemma, "monat");
        assert_eq!(tokens[3].dep, Dep::Cj);
    }

    #[test]
    fn glued_suffix_is_subtok() {
        let tokens = tagged("4er Set");
        assert_eq!(tokens[1].dep, Dep::Subtok);
    }

    #[test]
    fn each_sentence_has_a_root() {
        let tokens = tagged("Verkaufe Velo. Tisch aus Holz.");
        let roots: Vec<_> = tokens.iter().filter(|t| t.dep == Dep::Root).map(|t| t.text.as_str()).collect();
        assert_eq!(roots, vec!["Verkaufe", "Tisch"]);
    }
}
