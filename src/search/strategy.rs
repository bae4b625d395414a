// Query generation for a master sale and post-filtering of the results
use crate::model::SearchApi;
use crate::registry::{Label, ProductCategory, ProductSubCategory, Registry};
use crate::sale::Sale;
use std::collections::HashSet;
use tracing::{debug, warn};

pub struct SearchStrategy<'a> {
    registry: &'a Registry,
    relevant: &'a [Label],
}

impl<'a> SearchStrategy<'a> {
    pub fn new(registry: &'a Registry, relevant: &'a [Label]) -> Self {
        Self { registry, relevant }
    }

    /// Category × search-string combinations for `master`, primary category first.
    pub fn queries(&self, master: &Sale) -> Vec<SearchApi> {
        let region_value = master.region.value().to_string();
        let strings = self.search_strings(master);

        let mut result: Vec<SearchApi> = Vec::new();
        for (category, sub) in self.category_targets(master) {
            for search_string in &strings {
                let api = SearchApi {
                    search_string: search_string.clone(),
                    region_value: region_value.clone(),
                    category_value: category.map(|c| c.value()).unwrap_or("").to_string(),
                    sub_category_value: sub.map(|s| s.value()).unwrap_or("").to_string(),
                };
                if !result.contains(&api) {
                    result.push(api);
                }
            }
        }
        debug!("{}: {} queries", master.sale_id, result.len());
        result
    }

    fn category_targets(
        &self,
        master: &Sale,
    ) -> Vec<(Option<ProductCategory>, Option<ProductSubCategory>)> {
        let sub = master.product_sub_category;
        let category = master
            .product_category
            .filter(|c| *c != ProductCategory::All)
            .or(sub.map(|s| s.category()));
        let Some(category) = category else {
            return ProductCategory::top_level().map(|c| (Some(c), None)).collect();
        };
        let mut targets = vec![(Some(category), sub)];
        if let Some((fb_category, fb_sub)) = self.registry.fallback_category(category, sub) {
            targets.push((Some(fb_category), fb_sub));
        }
        targets
    }

    /// Canonical names joined in document order, plus one variant per synonym
    /// replacing only that name. Falls back to the title without entities.
    pub fn search_strings(&self, master: &Sale) -> Vec<String> {
        let entities = master.entities_in_order(self.relevant);
        if entities.is_empty() {
            warn!("{}: no entities found, searching by title", master.sale_id);
            return vec![master.title.trim().to_string()];
        }
        let names: Vec<&str> = entities.iter().map(|(n, _)| n.as_str()).collect();
        let mut strings = vec![names.join(" ")];
        for (i, (name, label)) in entities.iter().enumerate() {
            for synonym in self.registry.synonyms(*label, name) {
                let mut variant = names.clone();
                variant[i] = synonym.as_str();
                let joined = variant.join(" ");
                if !strings.contains(&joined) {
                    strings.push(joined);
                }
            }
        }
        strings
    }

    /// Drops candidates from incompatible categories and repeated sale ids.
    pub fn post_filter(&self, api: &SearchApi, candidates: Vec<Sale>) -> Vec<Sale> {
        let query_category = ProductCategory::lookup(&api.category_value);
        let mut seen: HashSet<String> = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| match (query_category, c.product_category) {
                (Some(q), Some(found)) => {
                    let ok = self.registry.categories_compatible(q, found);
                    if !ok {
                        debug!("Dropping {}: category {} does not fit {}", c.sale_id, found, q);
                    }
                    ok
                }
                _ => true,
            })
            .filter(|c| seen.insert(c.sale_id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Region;
    use crate::sale::tests::sale_from;

    fn strategy_queries(master: &Sale) -> Vec<SearchApi> {
        let registry = Registry::builtin();
        SearchStrategy::new(&registry, &Label::SIMILARITY_RELEVANT).queries(master)
    }

    #[test]
    fn hape_search_string_and_synonym_variants() {
        let master = sale_from("Hape, Kugelbahn 'The Roundabout' 91-teilig, wie neu, 30.-", None);
        let queries = strategy_queries(&master);
        assert!(queries.iter().any(|q| q.search_string.contains("Hape Kugelbahn Roundabout")));
        assert!(queries.iter().any(|q| q.search_string == "Hape Murmelbahn Roundabout"));
        assert!(queries.iter().any(|q| q.search_string == "Hape Kugelbahn The Roundabout"));
    }

    #[test]
    fn unknown_category_searches_every_top_level_category() {
        let master = sale_from("Hape Kugelbahn", Some(30.0));
        let queries = strategy_queries(&master);
        let categories: HashSet<&str> = queries.iter().map(|q| q.category_value.as_str()).collect();
        assert_eq!(categories.len(), ProductCategory::top_level().count());
        assert!(!categories.contains(""));
        assert!(queries.iter().all(|q| q.region_value.is_empty()));
    }

    #[test]
    fn known_category_adds_fallback() {
        let mut master = sale_from("Jacke Gr. 128", Some(20.0));
        master.product_category = Some(ProductCategory::Child);
        master.product_sub_category = Some(ProductSubCategory::ChildClothes);
        master.region = Region::Zh;
        let queries = strategy_queries(&master);
        let mut targets: Vec<(&str, &str)> = Vec::new();
        for q in &queries {
            let target = (q.category_value.as_str(), q.sub_category_value.as_str());
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        assert_eq!(targets, vec![("kinder-baby", "kinderkleider"), ("kleider-accessoires", "")]);
        assert!(queries.iter().all(|q| q.region_value == "zuerich"));
    }

    #[test]
    fn no_entities_falls_back_to_title() {
        let master = sale_from("zu verschenken", Some(0.0));
        let registry = Registry::builtin();
        let strings = SearchStrategy::new(&registry, &Label::SIMILARITY_RELEVANT).search_strings(&master);
        assert_eq!(strings, vec!["zu verschenken".to_string()]);
    }

    #[test]
    fn post_filter_drops_incompatible_and_duplicates() {
        let registry = Registry::builtin();
        let strategy = SearchStrategy::new(&registry, &Label::SIMILARITY_RELEVANT);
        let api = SearchApi {
            search_string: "Tisch".into(),
            region_value: String::new(),
            category_value: "moebel".into(),
            sub_category_value: String::new(),
        };
        let mut table = sale_from("Tisch", Some(50.0));
        table.product_category = Some(ProductCategory::Furniture);
        let mut bike = sale_from("Velo", Some(50.0));
        bike.product_category = Some(ProductCategory::Sports);
        let unknown = sale_from("Tisch rund", Some(40.0));
        let kept = strategy.post_filter(&api, vec![table.clone(), bike, table, unknown]);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|s| s.product_category != Some(ProductCategory::Sports)));
    }
}
