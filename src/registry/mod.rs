// Entity & category registry: labels, gazetteer, synonyms, taxonomies.

pub mod gazetteer;
pub mod labels;
pub mod taxonomy;

pub use labels::Label;
pub use taxonomy::{ProductCategory, ProductSubCategory, Region};

use gazetteer::{ENTRIES, OBJECT_CATEGORIES, SPELLING_VARIANTS};
use std::collections::HashMap;

/// A canonical name and its synonyms within one label.
#[derive(Debug, Clone)]
pub struct NameGroup {
    pub canonical: String,
    pub synonyms: Vec<String>,
}

/// Lookup tables over the gazetteer. Built once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    groups: HashMap<Label, Vec<NameGroup>>,
    /// (label, lowercase surface) -> canonical
    index: HashMap<(Label, String), String>,
    object_categories: HashMap<String, (ProductCategory, Option<ProductSubCategory>)>,
    spelling_variants: Vec<(String, String)>,
}

impl Registry {
    /// Registry loaded with the built-in gazetteer.
    pub fn builtin() -> Self {
        let mut registry = Registry::default();
        for e in ENTRIES {
            let synonyms: Vec<&str> = e.synonyms.to_vec();
            registry.add_entry(e.label, e.name, &synonyms);
        }
        for (object, category, sub) in OBJECT_CATEGORIES {
            registry
                .object_categories
                .insert(object.to_lowercase(), (*category, *sub));
        }
        registry.spelling_variants = SPELLING_VARIANTS
            .iter()
            .map(|(v, r)| (v.to_string(), r.to_string()))
            .collect();
        registry
    }

    /// Adds a canonical name (or extends an existing one) with synonyms.
    pub fn add_entry(&mut self, label: Label, canonical: &str, synonyms: &[&str]) {
        let groups = self.groups.entry(label).or_default();
        let idx = match groups
            .iter()
            .position(|g| g.canonical.eq_ignore_ascii_case(canonical))
        {
            Some(i) => i,
            None => {
                groups.push(NameGroup {
                    canonical: canonical.to_string(),
                    synonyms: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        for s in synonyms {
            if !group.synonyms.iter().any(|x| x == s) {
                group.synonyms.push(s.to_string());
            }
        }
        let main = group.canonical.clone();
        self.index.insert((label, main.to_lowercase()), main.clone());
        for s in synonyms {
            self.index.insert((label, s.to_lowercase()), main.clone());
        }
    }

    pub fn groups(&self, label: Label) -> &[NameGroup] {
        self.groups.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every surface form of a label in original, lower, upper and title case.
    /// Order follows the gazetteer; duplicates are dropped.
    pub fn names_for_label(&self, label: Label) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for group in self.groups(label) {
            for surface in std::iter::once(&group.canonical).chain(group.synonyms.iter()) {
                for variant in [
                    surface.clone(),
                    surface.to_lowercase(),
                    surface.to_uppercase(),
                    title_case(surface),
                ] {
                    if !out.contains(&variant) {
                        out.push(variant);
                    }
                }
            }
        }
        out
    }

    /// Maps any surface form back to its canonical name, ignoring case.
    pub fn main_name(&self, label: Label, surface: &str) -> Option<String> {
        self.index
            .get(&(label, surface.trim().to_lowercase()))
            .cloned()
    }

    pub fn synonyms(&self, label: Label, canonical: &str) -> Vec<String> {
        self.groups(label)
            .iter()
            .find(|g| g.canonical.eq_ignore_ascii_case(canonical))
            .map(|g| g.synonyms.clone())
            .unwrap_or_default()
    }

    /// True when the surface is a known brand, product or shop name.
    pub fn is_proper_name(&self, surface: &str) -> bool {
        [Label::Company, Label::Product, Label::Shop]
            .iter()
            .any(|l| self.main_name(*l, surface).is_some())
    }

    pub fn sub_categories(&self, category: ProductCategory) -> Vec<ProductSubCategory> {
        ProductSubCategory::of_category(category)
    }

    /// Second place to look for a master's goods, if any.
    pub fn fallback_category(
        &self,
        category: ProductCategory,
        sub: Option<ProductSubCategory>,
    ) -> Option<(ProductCategory, Option<ProductSubCategory>)> {
        let sub = sub?;
        taxonomy::CATEGORY_FALLBACKS
            .iter()
            .find(|((c, s), _)| *c == category && *s == sub)
            .map(|(_, target)| *target)
    }

    pub fn category_for_object(
        &self,
        object: &str,
    ) -> Option<(ProductCategory, Option<ProductSubCategory>)> {
        self.object_categories.get(&object.to_lowercase()).copied()
    }

    /// True when `a` and `b` may hold the same goods: equal, or linked by a fallback.
    pub fn categories_compatible(&self, a: ProductCategory, b: ProductCategory) -> bool {
        if a == b || a == ProductCategory::All || b == ProductCategory::All {
            return true;
        }
        taxonomy::CATEGORY_FALLBACKS.iter().any(|((c, _), (t, _))| {
            (*c == a && *t == b) || (*c == b && *t == a)
        })
    }

    pub fn spelling_variants(&self) -> &[(String, String)] {
        &self.spelling_variants
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
