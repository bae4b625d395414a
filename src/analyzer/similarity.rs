// Pairwise similarity decision over label-weighted entity overlap
use crate::config::AppConfig;
use crate::registry::Label;
use crate::sale::{Sale, SaleState};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityVerdict {
    pub similar: bool,
    pub score: f64,
    /// Labels with at least one common entity, heaviest first.
    pub labels: Vec<Label>,
}

impl SimilarityVerdict {
    pub fn label_key(&self) -> String {
        self.labels
            .iter()
            .map(Label::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub struct SimilarityChecker {
    weights: BTreeMap<Label, f64>,
    threshold: f64,
    required: Vec<Label>,
    relevant: Vec<Label>,
}

impl SimilarityChecker {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            weights: config.similarity.weights.clone(),
            threshold: config.similarity.threshold,
            required: config.similarity.required_labels.clone(),
            relevant: config.labels.similarity_relevant.clone(),
        }
    }

    fn weight(&self, label: Label) -> f64 {
        self.weights.get(&label).copied().unwrap_or(0.0)
    }

    /// Symmetric in its arguments.
    pub fn check(&self, a: &Sale, b: &Sale) -> SimilarityVerdict {
        let mut score = 0.0;
        let mut labels: Vec<Label> = Vec::new();
        let mut covered = true;
        for label in &self.relevant {
            let (ea, eb) = (a.entities_for_label(*label), b.entities_for_label(*label));
            let common = ea.intersection(&eb).count();
            if common > 0 {
                score += self.weight(*label) * common as f64;
                labels.push(*label);
            }
            let required = self.required.contains(label) && (!ea.is_empty() || !eb.is_empty());
            if required && common == 0 {
                covered = false;
            }
        }
        labels.sort_by(|x, y| {
            self.weight(*y)
                .total_cmp(&self.weight(*x))
                .then_with(|| x.cmp(y))
        });

        let similar = score >= self.threshold
            || (!labels.is_empty() && covered)
            || a.has_identical_title(b);
        SimilarityVerdict {
            similar,
            score,
            labels,
        }
    }

    /// Candidates that are never counted: unpriced, withdrawn, or the
    /// master's own posting under another id.
    pub fn is_eligible(&self, master: &Sale, candidate: &Sale) -> bool {
        candidate.price_single > 0.0
            && candidate.sale_state != SaleState::Withdrawn
            && !master.has_identical_title(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::tests::sale_from;

    fn checker() -> SimilarityChecker {
        SimilarityChecker::new(&AppConfig::default())
    }

    #[test]
    fn shared_product_is_enough() {
        let a = sale_from("Hape Kugelbahn Roundabout", Some(30.0));
        let b = sale_from("Roundabout von Hape", Some(25.0));
        let verdict = checker().check(&a, &b);
        assert!(verdict.similar);
        assert_eq!(verdict.score, 8.0);
        assert_eq!(verdict.label_key(), "PRODUCT,COMPANY");
    }

    #[test]
    fn shared_object_covers_required_label() {
        let a = sale_from("Kugelbahn aus Holz", Some(30.0));
        let b = sale_from("Murmelbahn gross", Some(20.0));
        let verdict = checker().check(&a, &b);
        assert!(verdict.similar);
        assert_eq!(verdict.score, 3.0);
    }

    #[test]
    fn brand_only_overlap_with_different_objects_is_not_similar() {
        let a = sale_from("IKEA Tisch", Some(30.0));
        let b = sale_from("IKEA Stuhl", Some(20.0));
        let verdict = checker().check(&a, &b);
        assert_eq!(verdict.score, 3.0);
        assert!(!verdict.similar);
    }

    #[test]
    fn symmetric() {
        let pairs = [
            ("IKEA Tisch", "Tisch aus Holz"),
            ("USM Kitos Tisch", "Tisch"),
            ("Hape Kugelbahn", "IKEA Stuhl"),
        ];
        let checker = checker();
        for (x, y) in pairs {
            let (a, b) = (sale_from(x, Some(1.0)), sale_from(y, Some(1.0)));
            assert_eq!(checker.check(&a, &b).similar, checker.check(&b, &a).similar);
            assert_eq!(checker.check(&a, &b).score, checker.check(&b, &a).score);
        }
    }

    #[test]
    fn equal_entities_are_similar() {
        let a = sale_from("Lampe aus Glas", Some(10.0));
        let b = sale_from("Glas Lampe", Some(15.0));
        assert_eq!(a.entity_label_dict, b.entity_label_dict);
        assert!(checker().check(&a, &b).similar);
    }

    #[test]
    fn no_entities_only_matches_identical_titles() {
        let a = sale_from("zu verschenken", Some(1.0));
        let b = sale_from("Hape Kugelbahn", Some(1.0));
        assert!(!checker().check(&a, &b).similar);
        let mut c = b.clone();
        c.title = a.title.clone();
        c.entity_label_dict.clear();
        assert!(checker().check(&a, &c).similar);
    }

    #[test]
    fn eligibility_filter() {
        let checker = checker();
        let master = sale_from("Hape Kugelbahn", Some(30.0));
        let free = sale_from("Kugelbahn", Some(0.0));
        let mut withdrawn = sale_from("Kugelbahn Holz", Some(10.0));
        withdrawn.sale_state = SaleState::Withdrawn;
        let mut duplicate = sale_from("Kugelbahn gross", Some(10.0));
        duplicate.title = master.title.clone();
        let fine = sale_from("Kugelbahn klein", Some(10.0));
        assert!(!checker.is_eligible(&master, &free));
        assert!(!checker.is_eligible(&master, &withdrawn));
        assert!(!checker.is_eligible(&master, &duplicate));
        assert!(checker.is_eligible(&master, &fine));
    }
}
