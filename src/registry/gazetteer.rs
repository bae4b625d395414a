// Built-in gazetteer: canonical entity names, their synonyms and spelling variants
use super::labels::Label;
use super::taxonomy::{ProductCategory, ProductSubCategory};

/// One canonical name with the surface forms that map back to it.
pub struct GazetteerEntry {
    pub label: Label,
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
}

const fn entry(label: Label, name: &'static str, synonyms: &'static [&'static str]) -> GazetteerEntry {
    GazetteerEntry { label, name, synonyms }
}

pub const ENTRIES: &[GazetteerEntry] = &[
    // COMPANY
    entry(Label::Company, "Hape", &[]),
    entry(Label::Company, "USM", &["USM Haller AG"]),
    entry(Label::Company, "IKEA", &[]),
    entry(Label::Company, "Vitra", &[]),
    entry(Label::Company, "Stokke", &[]),
    entry(Label::Company, "Bugaboo", &[]),
    entry(Label::Company, "Lego", &[]),
    entry(Label::Company, "Playmobil", &[]),
    entry(Label::Company, "Ravensburger", &[]),
    entry(Label::Company, "Haba", &[]),
    entry(Label::Company, "Brio", &[]),
    entry(Label::Company, "Puky", &[]),
    entry(Label::Company, "Cybex", &[]),
    entry(Label::Company, "Maxi-Cosi", &["Maxicosi", "Maxi Cosi"]),
    entry(Label::Company, "Thonet", &[]),
    entry(Label::Company, "Apple", &[]),
    entry(Label::Company, "Samsung", &[]),
    entry(Label::Company, "Sony", &[]),
    entry(Label::Company, "Bosch", &[]),
    entry(Label::Company, "Miele", &[]),
    entry(Label::Company, "Jura", &[]),
    entry(Label::Company, "Nespresso", &[]),
    entry(Label::Company, "Victorinox", &[]),
    entry(Label::Company, "Mammut", &[]),
    entry(Label::Company, "Adidas", &[]),
    entry(Label::Company, "Nike", &[]),
    entry(Label::Company, "Kettler", &[]),
    // PRODUCT
    entry(Label::Product, "Roundabout", &["The Roundabout"]),
    entry(Label::Product, "Kitos", &["Kitos M", "Kitos E"]),
    entry(Label::Product, "Haller", &["USM Haller"]),
    entry(Label::Product, "Tripp Trapp", &["TrippTrapp", "Tripp-Trapp"]),
    entry(Label::Product, "Cameleon", &["Cameleon3", "Cameleon 3"]),
    entry(Label::Product, "Duplo", &[]),
    entry(Label::Product, "iPhone", &[]),
    entry(Label::Product, "MacBook", &["Macbook Pro", "Macbook Air"]),
    entry(Label::Product, "Panton Chair", &["Panton"]),
    entry(Label::Product, "Billy", &[]),
    entry(Label::Product, "Kallax", &["Expedit"]),
    entry(Label::Product, "Malm", &[]),
    entry(Label::Product, "Cloud", &["Cloud Z", "Cloud Q"]),
    // OBJECT
    entry(Label::Object, "Kugelbahn", &["Murmelbahn"]),
    entry(Label::Object, "Tisch", &["Tische", "Esstisch"]),
    entry(Label::Object, "Stuhl", &["Stühle", "Topstühle"]),
    entry(Label::Object, "Hochstuhl", &["Kinderhochstuhl", "Treppenhochstuhl"]),
    entry(Label::Object, "Sofa", &["Couch"]),
    entry(Label::Object, "Schrank", &["Kleiderschrank", "Schränke"]),
    entry(Label::Object, "Regal", &["Regale", "Gestell"]),
    entry(Label::Object, "Sideboard", &["Anrichte"]),
    entry(Label::Object, "Kommode", &[]),
    entry(Label::Object, "Bett", &["Betten"]),
    entry(Label::Object, "Kinderwagen", &["Buggy"]),
    entry(Label::Object, "Autositz", &["Kindersitz", "Babyschale"]),
    entry(Label::Object, "Velo", &["Fahrrad", "Bike"]),
    entry(Label::Object, "Laufrad", &[]),
    entry(Label::Object, "Jacke", &["Regenjacke", "Winterjacke"]),
    entry(Label::Object, "Schuhe", &["Schuh", "Wanderschuhe"]),
    entry(Label::Object, "Hose", &["Hosen"]),
    entry(Label::Object, "Lampe", &["Leuchte", "Stehlampe"]),
    entry(Label::Object, "Kaffeemaschine", &["Kaffeevollautomat"]),
    entry(Label::Object, "Spielküche", &["Kinderküche"]),
    entry(Label::Object, "Puppenhaus", &[]),
    entry(Label::Object, "Bausteine", &["Steine"]),
    entry(Label::Object, "Schreibtisch", &["Pult"]),
    entry(Label::Object, "Bürostuhl", &["Drehstuhl"]),
    entry(Label::Object, "Handy", &["Smartphone"]),
    entry(Label::Object, "Notebook", &["Laptop"]),
    // MATERIAL
    entry(Label::Material, "Holz", &["hölzern"]),
    entry(Label::Material, "Eiche", &["Eichenholz"]),
    entry(Label::Material, "Buche", &["Buchenholz"]),
    entry(Label::Material, "Metall", &[]),
    entry(Label::Material, "Stahl", &["Edelstahl"]),
    entry(Label::Material, "Chrom", &["verchromt"]),
    entry(Label::Material, "Glas", &[]),
    entry(Label::Material, "Leder", &["Echtleder"]),
    entry(Label::Material, "Kunststoff", &["Plastik"]),
    entry(Label::Material, "Goretex", &[]),
    entry(Label::Material, "Wolle", &["Merinowolle"]),
    entry(Label::Material, "Baumwolle", &[]),
    // TARGET_GROUP
    entry(Label::TargetGroup, "Kinder", &["Kind", "Kids"]),
    entry(Label::TargetGroup, "Baby", &["Babys"]),
    entry(Label::TargetGroup, "Damen", &["Frauen", "Lady"]),
    entry(Label::TargetGroup, "Herren", &["Männer"]),
    entry(Label::TargetGroup, "Mädchen", &[]),
    entry(Label::TargetGroup, "Knaben", &["Jungen", "Buben"]),
    // SHOP
    entry(Label::Shop, "Manor", &[]),
    entry(Label::Shop, "Migros", &[]),
    entry(Label::Shop, "Coop", &[]),
    entry(Label::Shop, "Globus", &[]),
    entry(Label::Shop, "Pfister", &[]),
    entry(Label::Shop, "Interio", &[]),
    entry(Label::Shop, "Galaxus", &["Digitec"]),
    // TECHNOLOGY
    entry(Label::Technology, "Bluetooth", &[]),
    entry(Label::Technology, "WLAN", &["WiFi", "Wi-Fi"]),
    entry(Label::Technology, "USB", &[]),
    entry(Label::Technology, "LED", &[]),
    entry(Label::Technology, "Akku", &["Batterie"]),
    // LOC
    entry(Label::Loc, "Zürich", &["Zuerich", "Zurich"]),
    entry(Label::Loc, "Bern", &[]),
    entry(Label::Loc, "Basel", &[]),
    entry(Label::Loc, "Luzern", &[]),
    entry(Label::Loc, "St. Gallen", &["St.Gallen"]),
    entry(Label::Loc, "Winterthur", &[]),
    entry(Label::Loc, "Zug", &[]),
];

/// Default placement of objects in the marketplace taxonomy.
pub const OBJECT_CATEGORIES: &[(&str, ProductCategory, Option<ProductSubCategory>)] = &[
    ("Kugelbahn", ProductCategory::Child, Some(ProductSubCategory::ChildToys)),
    ("Spielküche", ProductCategory::Child, Some(ProductSubCategory::ChildToys)),
    ("Puppenhaus", ProductCategory::Child, Some(ProductSubCategory::ChildToys)),
    ("Bausteine", ProductCategory::Child, Some(ProductSubCategory::ChildToys)),
    ("Hochstuhl", ProductCategory::Child, Some(ProductSubCategory::ChildFurniture)),
    ("Kinderwagen", ProductCategory::Child, Some(ProductSubCategory::ChildStrollers)),
    ("Autositz", ProductCategory::Child, Some(ProductSubCategory::ChildCarSeats)),
    ("Laufrad", ProductCategory::Child, Some(ProductSubCategory::ChildToys)),
    ("Tisch", ProductCategory::Furniture, Some(ProductSubCategory::FurnitureTables)),
    ("Stuhl", ProductCategory::Furniture, Some(ProductSubCategory::FurnitureChairs)),
    ("Sofa", ProductCategory::Furniture, Some(ProductSubCategory::FurnitureSofas)),
    ("Schrank", ProductCategory::Furniture, Some(ProductSubCategory::FurnitureShelves)),
    ("Regal", ProductCategory::Furniture, Some(ProductSubCategory::FurnitureShelves)),
    ("Sideboard", ProductCategory::Furniture, Some(ProductSubCategory::FurnitureShelves)),
    ("Kommode", ProductCategory::Furniture, Some(ProductSubCategory::FurnitureShelves)),
    ("Bett", ProductCategory::Furniture, Some(ProductSubCategory::FurnitureBeds)),
    ("Lampe", ProductCategory::Furniture, Some(ProductSubCategory::FurnitureLamps)),
    ("Schreibtisch", ProductCategory::Office, Some(ProductSubCategory::OfficeFurniture)),
    ("Bürostuhl", ProductCategory::Office, Some(ProductSubCategory::OfficeFurniture)),
    ("Velo", ProductCategory::Sports, Some(ProductSubCategory::SportsBikes)),
    ("Jacke", ProductCategory::ClothesOthers, None),
    ("Hose", ProductCategory::ClothesOthers, None),
    ("Schuhe", ProductCategory::ClothesOthers, Some(ProductSubCategory::ClothesShoes)),
    ("Kaffeemaschine", ProductCategory::Household, Some(ProductSubCategory::HouseholdKitchen)),
    ("Handy", ProductCategory::Multimedia, Some(ProductSubCategory::MultimediaPhones)),
    ("Notebook", ProductCategory::Computer, Some(ProductSubCategory::ComputerNotebooks)),
];

/// Spelling variants rewritten during preprocessing: (variant, replacement).
/// Matched case-insensitively on word boundaries.
pub const SPELLING_VARIANTS: &[(&str, &str)] = &[
    ("Gore-Tex", "Goretex"),
    ("Gore Tex", "Goretex"),
    ("GoreTex", "Goretex"),
    ("Größe", "Grösse"),
    ("Neu-Preis", "Neupreis"),
    ("Neu Preis", "Neupreis"),
    ("Gebrauchs-Spuren", "Gebrauchsspuren"),
    ("Original-Verpackung", "Originalverpackung"),
    ("original verpackt", "originalverpackt"),
    ("Stk.", "Stück"),
    ("Stk", "Stück"),
];
