// Entity labels assigned by the phrase matcher
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Company,
    Product,
    Object,
    TargetGroup,
    Material,
    Shop,
    Technology,
    Loc,
    Cardinal,
    Ordinal,
    Date,
}

impl Label {
    pub const ALL: [Label; 11] = [
        Label::Company,
        Label::Product,
        Label::Object,
        Label::TargetGroup,
        Label::Material,
        Label::Shop,
        Label::Technology,
        Label::Loc,
        Label::Cardinal,
        Label::Ordinal,
        Label::Date,
    ];

    /// Labels taken into account when two sales are compared.
    pub const SIMILARITY_RELEVANT: [Label; 5] = [
        Label::Company,
        Label::Product,
        Label::Object,
        Label::Material,
        Label::TargetGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Company => "COMPANY",
            Label::Product => "PRODUCT",
            Label::Object => "OBJECT",
            Label::TargetGroup => "TARGET_GROUP",
            Label::Material => "MATERIAL",
            Label::Shop => "SHOP",
            Label::Technology => "TECHNOLOGY",
            Label::Loc => "LOC",
            Label::Cardinal => "CARDINAL",
            Label::Ordinal => "ORDINAL",
            Label::Date => "DATE",
        }
    }

    pub fn is_similarity_relevant(&self) -> bool {
        Self::SIMILARITY_RELEVANT.contains(self)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown label '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("target_group".parse::<Label>(), Ok(Label::TargetGroup));
        assert_eq!("COMPANY".parse::<Label>(), Ok(Label::Company));
        assert!("BRAND".parse::<Label>().is_err());
    }

    #[test]
    fn only_five_labels_are_relevant() {
        let relevant: Vec<_> = Label::ALL.iter().filter(|l| l.is_similarity_relevant()).collect();
        assert_eq!(relevant.len(), 5);
        assert!(!Label::Loc.is_similarity_relevant());
    }

    #[test]
    fn serde_uses_screaming_case() {
        let json = serde_json::to_string(&Label::TargetGroup).unwrap();
        assert_eq!(json, "\"TARGET_GROUP\"");
    }
}
