// Closed marketplace taxonomies: regions, categories, sub-categories
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    All,
    None,
    Ag,
    Ai,
    Ar,
    Be,
    Bl,
    Bs,
    Fr,
    Ge,
    Gl,
    Gr,
    Ju,
    Lu,
    Ne,
    Nw,
    Ow,
    Sg,
    Sh,
    So,
    Sz,
    Tg,
    Ti,
    Ur,
    Vd,
    Vs,
    Zg,
    Zh,
}

/// (region, code, display name, marketplace value), in variant order.
const REGIONS: &[(Region, &str, &str, &str)] = &[
    (Region::All, "ALL", "Ganze Schweiz", ""),
    (Region::None, "NONE", "", ""),
    (Region::Ag, "AG", "Aargau", "aargau"),
    (Region::Ai, "AI", "Appenzell Innerrhoden", "appenzell-innerrhoden"),
    (Region::Ar, "AR", "Appenzell Ausserrhoden", "appenzell-ausserrhoden"),
    (Region::Be, "BE", "Bern", "bern"),
    (Region::Bl, "BL", "Basel-Landschaft", "basel-landschaft"),
    (Region::Bs, "BS", "Basel-Stadt", "basel-stadt"),
    (Region::Fr, "FR", "Freiburg", "freiburg"),
    (Region::Ge, "GE", "Genf", "genf"),
    (Region::Gl, "GL", "Glarus", "glarus"),
    (Region::Gr, "GR", "Graubünden", "graubuenden"),
    (Region::Ju, "JU", "Jura", "jura"),
    (Region::Lu, "LU", "Luzern", "luzern"),
    (Region::Ne, "NE", "Neuenburg", "neuenburg"),
    (Region::Nw, "NW", "Nidwalden", "nidwalden"),
    (Region::Ow, "OW", "Obwalden", "obwalden"),
    (Region::Sg, "SG", "St. Gallen", "st-gallen"),
    (Region::Sh, "SH", "Schaffhausen", "schaffhausen"),
    (Region::So, "SO", "Solothurn", "solothurn"),
    (Region::Sz, "SZ", "Schwyz", "schwyz"),
    (Region::Tg, "TG", "Thurgau", "thurgau"),
    (Region::Ti, "TI", "Tessin", "tessin"),
    (Region::Ur, "UR", "Uri", "uri"),
    (Region::Vd, "VD", "Waadt", "waadt"),
    (Region::Vs, "VS", "Wallis", "wallis"),
    (Region::Zg, "ZG", "Zug", "zug"),
    (Region::Zh, "ZH", "Zürich", "zuerich"),
];

impl Region {
    fn row(&self) -> &'static (Region, &'static str, &'static str, &'static str) {
        &REGIONS[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        self.row().1
    }

    pub fn name(&self) -> &'static str {
        self.row().2
    }

    /// Value used in marketplace queries; empty for a national search.
    pub fn value(&self) -> &'static str {
        self.row().3
    }

    /// Resolves a code, display name or marketplace value.
    pub fn lookup(text: &str) -> Option<Region> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        REGIONS
            .iter()
            .find(|(_, code, name, value)| {
                code.eq_ignore_ascii_case(text)
                    || name.to_lowercase() == text.to_lowercase()
                    || (!value.is_empty() && value.eq_ignore_ascii_case(text))
            })
            .map(|(r, ..)| *r)
    }

    /// Swiss cantons only, without `ALL` and `NONE`.
    pub fn cantons() -> impl Iterator<Item = Region> {
        REGIONS.iter().skip(2).map(|(r, ..)| *r)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    All,
    Child,
    ClothesOthers,
    Computer,
    Furniture,
    Household,
    Garden,
    Hobby,
    Office,
    Sports,
    Multimedia,
    Vehicles,
}

/// (category, code, display name, marketplace value), in variant order.
const CATEGORIES: &[(ProductCategory, &str, &str, &str)] = &[
    (ProductCategory::All, "ALL", "Alle Kategorien", ""),
    (ProductCategory::Child, "CHILD", "Kinder & Baby", "kinder-baby"),
    (ProductCategory::ClothesOthers, "CLOTHES_OTHERS", "Kleider & Accessoires", "kleider-accessoires"),
    (ProductCategory::Computer, "COMPUTER", "Computer & Zubehör", "computer-zubehoer"),
    (ProductCategory::Furniture, "FURNITURE", "Möbel", "moebel"),
    (ProductCategory::Household, "HOUSEHOLD", "Haushalt", "haushalt"),
    (ProductCategory::Garden, "GARDEN", "Haus & Garten", "haus-garten"),
    (ProductCategory::Hobby, "HOBBY", "Hobby & Freizeit", "hobby-freizeit"),
    (ProductCategory::Office, "OFFICE", "Büro & Gewerbe", "buero-gewerbe"),
    (ProductCategory::Sports, "SPORTS", "Sport & Outdoor", "sport-outdoor"),
    (ProductCategory::Multimedia, "MULTIMEDIA", "Handy & Multimedia", "handy-multimedia"),
    (ProductCategory::Vehicles, "VEHICLES", "Fahrzeuge", "fahrzeuge"),
];

impl ProductCategory {
    fn row(&self) -> &'static (ProductCategory, &'static str, &'static str, &'static str) {
        &CATEGORIES[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        self.row().1
    }

    pub fn name(&self) -> &'static str {
        self.row().2
    }

    pub fn value(&self) -> &'static str {
        self.row().3
    }

    pub fn lookup(text: &str) -> Option<ProductCategory> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        CATEGORIES
            .iter()
            .find(|(_, code, name, value)| {
                code.eq_ignore_ascii_case(text)
                    || name.to_lowercase() == text.to_lowercase()
                    || (!value.is_empty() && value.eq_ignore_ascii_case(text))
            })
            .map(|(c, ..)| *c)
    }

    /// Top-level categories a national search iterates, `ALL` excluded.
    pub fn top_level() -> impl Iterator<Item = ProductCategory> {
        CATEGORIES.iter().skip(1).map(|(c, ..)| *c)
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSubCategory {
    ChildClothes,
    ChildToys,
    ChildFurniture,
    ChildStrollers,
    ChildCarSeats,
    ChildOthers,
    ClothesWomen,
    ClothesMen,
    ClothesShoes,
    ClothesAccessories,
    FurnitureTables,
    FurnitureChairs,
    FurnitureShelves,
    FurnitureSofas,
    FurnitureBeds,
    FurnitureLamps,
    OfficeFurniture,
    OfficeMachines,
    SportsBikes,
    SportsWinter,
    SportsOutdoor,
    HouseholdKitchen,
    MultimediaPhones,
    ComputerNotebooks,
}

/// (sub-category, code, parent, display name, marketplace value), in variant order.
const SUB_CATEGORIES: &[(ProductSubCategory, &str, ProductCategory, &str, &str)] = &[
    (ProductSubCategory::ChildClothes, "CHILD_CLOTHES", ProductCategory::Child, "Kinderkleider", "kinderkleider"),
    (ProductSubCategory::ChildToys, "CHILD_TOYS", ProductCategory::Child, "Spielzeug", "spielzeug"),
    (ProductSubCategory::ChildFurniture, "CHILD_FURNITURE", ProductCategory::Child, "Kindermöbel", "kindermoebel"),
    (ProductSubCategory::ChildStrollers, "CHILD_STROLLERS", ProductCategory::Child, "Kinderwagen", "kinderwagen"),
    (ProductSubCategory::ChildCarSeats, "CHILD_CAR_SEATS", ProductCategory::Child, "Autositze", "autositze"),
    (ProductSubCategory::ChildOthers, "CHILD_OTHERS", ProductCategory::Child, "Diverses", "kinder-diverses"),
    (ProductSubCategory::ClothesWomen, "CLOTHES_WOMEN", ProductCategory::ClothesOthers, "Damenmode", "damenmode"),
    (ProductSubCategory::ClothesMen, "CLOTHES_MEN", ProductCategory::ClothesOthers, "Herrenmode", "herrenmode"),
    (ProductSubCategory::ClothesShoes, "CLOTHES_SHOES", ProductCategory::ClothesOthers, "Schuhe", "schuhe"),
    (ProductSubCategory::ClothesAccessories, "CLOTHES_ACCESSORIES", ProductCategory::ClothesOthers, "Accessoires", "accessoires"),
    (ProductSubCategory::FurnitureTables, "FURNITURE_TABLES", ProductCategory::Furniture, "Tische", "tische"),
    (ProductSubCategory::FurnitureChairs, "FURNITURE_CHAIRS", ProductCategory::Furniture, "Stühle", "stuehle"),
    (ProductSubCategory::FurnitureShelves, "FURNITURE_SHELVES", ProductCategory::Furniture, "Regale & Schränke", "regale-schraenke"),
    (ProductSubCategory::FurnitureSofas, "FURNITURE_SOFAS", ProductCategory::Furniture, "Sofas & Sessel", "sofas-sessel"),
    (ProductSubCategory::FurnitureBeds, "FURNITURE_BEDS", ProductCategory::Furniture, "Betten", "betten"),
    (ProductSubCategory::FurnitureLamps, "FURNITURE_LAMPS", ProductCategory::Furniture, "Lampen", "lampen"),
    (ProductSubCategory::OfficeFurniture, "OFFICE_FURNITURE", ProductCategory::Office, "Büromöbel", "bueromoebel"),
    (ProductSubCategory::OfficeMachines, "OFFICE_MACHINES", ProductCategory::Office, "Bürogeräte", "buerogeraete"),
    (ProductSubCategory::SportsBikes, "SPORTS_BIKES", ProductCategory::Sports, "Velos", "velos"),
    (ProductSubCategory::SportsWinter, "SPORTS_WINTER", ProductCategory::Sports, "Wintersport", "wintersport"),
    (ProductSubCategory::SportsOutdoor, "SPORTS_OUTDOOR", ProductCategory::Sports, "Outdoor", "outdoor"),
    (ProductSubCategory::HouseholdKitchen, "HOUSEHOLD_KITCHEN", ProductCategory::Household, "Küchengeräte", "kuechengeraete"),
    (ProductSubCategory::MultimediaPhones, "MULTIMEDIA_PHONES", ProductCategory::Multimedia, "Handys", "handys"),
    (ProductSubCategory::ComputerNotebooks, "COMPUTER_NOTEBOOKS", ProductCategory::Computer, "Notebooks", "notebooks"),
];

impl ProductSubCategory {
    fn row(
        &self,
    ) -> &'static (ProductSubCategory, &'static str, ProductCategory, &'static str, &'static str) {
        &SUB_CATEGORIES[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        self.row().1
    }

    pub fn category(&self) -> ProductCategory {
        self.row().2
    }

    pub fn name(&self) -> &'static str {
        self.row().3
    }

    pub fn value(&self) -> &'static str {
        self.row().4
    }

    pub fn lookup(text: &str) -> Option<ProductSubCategory> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        SUB_CATEGORIES
            .iter()
            .find(|(_, code, _, name, value)| {
                code.eq_ignore_ascii_case(text)
                    || name.to_lowercase() == text.to_lowercase()
                    || value.eq_ignore_ascii_case(text)
            })
            .map(|(s, ..)| *s)
    }

    pub fn of_category(category: ProductCategory) -> Vec<ProductSubCategory> {
        SUB_CATEGORIES
            .iter()
            .filter(|(_, _, parent, ..)| *parent == category)
            .map(|(s, ..)| *s)
            .collect()
    }
}

impl fmt::Display for ProductSubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-category probes: `(category, sub)` of a master → the second place to look.
pub const CATEGORY_FALLBACKS: &[((ProductCategory, ProductSubCategory), (ProductCategory, Option<ProductSubCategory>))] = &[
    (
        (ProductCategory::Child, ProductSubCategory::ChildClothes),
        (ProductCategory::ClothesOthers, None),
    ),
    (
        (ProductCategory::Child, ProductSubCategory::ChildFurniture),
        (ProductCategory::Furniture, None),
    ),
    (
        (ProductCategory::Office, ProductSubCategory::OfficeFurniture),
        (ProductCategory::Furniture, None),
    ),
    (
        (ProductCategory::Furniture, ProductSubCategory::FurnitureChairs),
        (ProductCategory::Office, Some(ProductSubCategory::OfficeFurniture)),
    ),
    (
        (ProductCategory::Furniture, ProductSubCategory::FurnitureTables),
        (ProductCategory::Office, Some(ProductSubCategory::OfficeFurniture)),
    ),
    (
        (ProductCategory::Sports, ProductSubCategory::SportsOutdoor),
        (ProductCategory::ClothesOthers, None),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_lookup_accepts_code_name_and_value() {
        assert_eq!(Region::lookup("ZH"), Some(Region::Zh));
        assert_eq!(Region::lookup("zürich"), Some(Region::Zh));
        assert_eq!(Region::lookup("st-gallen"), Some(Region::Sg));
        assert_eq!(Region::lookup(""), None);
        assert_eq!(Region::lookup("Atlantis"), None);
    }

    #[test]
    fn there_are_26_cantons() {
        assert_eq!(Region::cantons().count(), 26);
        assert!(Region::cantons().all(|r| !r.value().is_empty()));
    }

    #[test]
    fn category_lookup_by_display_name() {
        assert_eq!(ProductCategory::lookup("Möbel"), Some(ProductCategory::Furniture));
        assert_eq!(ProductCategory::lookup("Büro & Gewerbe"), Some(ProductCategory::Office));
        assert!(ProductCategory::top_level().all(|c| c != ProductCategory::All));
    }

    #[test]
    fn sub_categories_know_their_parent() {
        assert_eq!(ProductSubCategory::ChildClothes.category(), ProductCategory::Child);
        let furniture = ProductSubCategory::of_category(ProductCategory::Furniture);
        assert!(furniture.contains(&ProductSubCategory::FurnitureTables));
        assert!(!furniture.contains(&ProductSubCategory::ChildToys));
    }

    #[test]
    fn tables_hold_one_row_per_variant() {
        assert_eq!(REGIONS.len(), Region::Zh as usize + 1);
        for (i, (region, code, ..)) in REGIONS.iter().enumerate() {
            assert_eq!(*region as usize, i, "{} out of order", code);
            assert_eq!(region.as_str(), *code);
        }
        assert_eq!(CATEGORIES.len(), ProductCategory::Vehicles as usize + 1);
        for (i, (category, code, ..)) in CATEGORIES.iter().enumerate() {
            assert_eq!(*category as usize, i, "{} out of order", code);
            assert_eq!(ProductCategory::lookup(code), Some(*category));
        }
        assert_eq!(SUB_CATEGORIES.len(), ProductSubCategory::ComputerNotebooks as usize + 1);
        for (i, (sub, code, ..)) in SUB_CATEGORIES.iter().enumerate() {
            assert_eq!(*sub as usize, i, "{} out of order", code);
        }
        assert_eq!(Region::None.as_str(), "NONE");
    }

    #[test]
    fn every_sub_category_has_a_row() {
        for (sub, code, ..) in SUB_CATEGORIES {
            assert_eq!(sub.as_str(), *code);
            assert_eq!(ProductSubCategory::lookup(code), Some(*sub));
        }
    }
}
