use super::schema::SCHEMA;
use crate::model::StorageError;
use crate::registry::{Label, ProductCategory, ProductSubCategory, Region};
use crate::sale::{ObjectState, Sale, SaleSource, SaleState};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

const SALE_COLUMNS: [&str; 32] = [
    "sale_id",
    "version",
    "is_my_sale",
    "source",
    "region",
    "product_category",
    "product_sub_category",
    "sale_state",
    "href",
    "start_date",
    "last_check_date",
    "title",
    "description",
    "price",
    "price_single",
    "price_original",
    "is_total_price",
    "is_single_price",
    "is_new",
    "is_like_new",
    "is_used",
    "is_cover_available",
    "number",
    "size",
    "age",
    "usage",
    "warranty",
    "object_state",
    "entity_labels",
    "entity_labels_dict",
    "is_outlier",
    "comment",
];

const TERMINAL_STATES_SQL: &str = "('sold', 'vanished', 'withdrawn')";

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Inserted,
    /// Semantically identical; only `last_check_date` moved.
    Touched,
    NewVersion {
        version: u32,
        changed: Vec<&'static str>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOutcome {
    Created,
    Reopened,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleRelation {
    pub master_id: String,
    pub child_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub comment: String,
}

/// One reconciliation result, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    /// The listing is still online; upsert what was read.
    Refresh(Sale),
    /// The listing changed state at its source.
    State { sale_id: String, state: SaleState },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileSummary {
    pub touched: usize,
    pub new_versions: usize,
    pub state_changes: usize,
    pub relations_closed: usize,
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database file and brings the schema up to date.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        // Columns added after the first schema version.
        Self::migrate_add_column_if_missing(&conn, "sale", "comment", "TEXT NOT NULL DEFAULT ''")?;
        Self::migrate_add_column_if_missing(
            &conn,
            "sale_relation",
            "comment",
            "TEXT NOT NULL DEFAULT ''",
        )?;
        Ok(Self { conn })
    }

    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
            info!("Added column {}.{}", table, column);
        }

        Ok(())
    }

    /// Current version of a sale.
    pub fn current(&self, sale_id: &str) -> Result<Option<Sale>, StorageError> {
        current_in(&self.conn, sale_id)
    }

    /// Upserts a sale in its own transaction.
    pub fn upsert_sale(&mut self, sale: &Sale, today: NaiveDate) -> Result<UpsertOutcome, StorageError> {
        let tx = self.conn.transaction()?;
        let outcome = upsert_in(&tx, sale, today)?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Upserts a similar candidate and links it to its master, in one transaction.
    /// The master row must already exist.
    pub fn upsert_child(
        &mut self,
        master_id: &str,
        child: &Sale,
        today: NaiveDate,
    ) -> Result<(UpsertOutcome, RelationOutcome), StorageError> {
        let tx = self.conn.transaction()?;
        let outcome = upsert_in(&tx, child, today)?;
        let relation = ensure_relation_in(&tx, master_id, &child.sale_id, today)?;
        tx.commit()?;
        Ok((outcome, relation))
    }

    pub fn relation(&self, master_id: &str, child_id: &str) -> Result<Option<SaleRelation>, StorageError> {
        let relation = self
            .conn
            .query_row(
                "SELECT master_id, child_id, start_date, end_date, comment
                 FROM sale_relation WHERE master_id = ?1 AND child_id = ?2",
                params![master_id, child_id],
                map_relation,
            )
            .optional()?;
        Ok(relation)
    }

    pub fn relations_of_master(&self, master_id: &str) -> Result<Vec<SaleRelation>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT master_id, child_id, start_date, end_date, comment
             FROM sale_relation WHERE master_id = ?1 ORDER BY child_id",
        )?;
        let rows = stmt.query_map(params![master_id], map_relation)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Closes the master's open relations to children outside `seen`.
    pub fn close_relations_not_in(
        &self,
        master_id: &str,
        seen: &HashSet<String>,
        today: NaiveDate,
    ) -> Result<usize, StorageError> {
        let mut closed = 0;
        for relation in self.relations_of_master(master_id)? {
            if relation.end_date.is_none() && !seen.contains(&relation.child_id) {
                closed += self.conn.execute(
                    "UPDATE sale_relation SET end_date = ?1, comment = 'not returned'
                     WHERE master_id = ?2 AND child_id = ?3",
                    params![today, master_id, relation.child_id],
                )?;
                debug!("Closed relation {} -> {}", master_id, relation.child_id);
            }
        }
        Ok(closed)
    }

    /// Current rows of every child ever linked to the master.
    pub fn children_of(&self, master_id: &str) -> Result<Vec<Sale>, StorageError> {
        self.query_sales(
            "SELECT v.* FROM v_sale v JOIN sale_relation r ON r.child_id = v.sale_id
             WHERE r.master_id = ?1 ORDER BY v.sale_id",
            params![master_id],
        )
    }

    /// Open children with an open relation to the master.
    pub fn open_children(&self, master_id: &str) -> Result<Vec<Sale>, StorageError> {
        self.query_sales(
            "SELECT v.* FROM v_sale v JOIN sale_relation r ON r.child_id = v.sale_id
             WHERE r.master_id = ?1 AND r.end_date IS NULL AND v.sale_state = 'open'
             ORDER BY v.sale_id",
            params![master_id],
        )
    }

    pub fn master_ids(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT master_id FROM sale_relation WHERE end_date IS NULL ORDER BY master_id",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn open_sales(&self) -> Result<Vec<Sale>, StorageError> {
        self.query_sales(
            "SELECT * FROM v_sale WHERE sale_state = 'open' ORDER BY sale_id",
            [],
        )
    }

    /// The operator's own sales that are still on the market.
    pub fn my_sales(&self) -> Result<Vec<Sale>, StorageError> {
        self.query_sales(
            &format!(
                "SELECT * FROM v_sale WHERE is_my_sale = 1 AND sale_state NOT IN {}
                 ORDER BY sale_id",
                TERMINAL_STATES_SQL
            ),
            [],
        )
    }

    /// Sales still of interest: not terminal, or with an open relation either way.
    pub fn current_sales(&self) -> Result<Vec<Sale>, StorageError> {
        self.query_sales(
            &format!(
                "SELECT v.* FROM v_sale v
                 WHERE v.sale_state NOT IN {}
                    OR EXISTS (SELECT 1 FROM sale_relation r WHERE r.end_date IS NULL
                               AND (r.child_id = v.sale_id OR r.master_id = v.sale_id))
                 ORDER BY v.sale_id",
                TERMINAL_STATES_SQL
            ),
            [],
        )
    }

    pub fn all_current(&self) -> Result<Vec<Sale>, StorageError> {
        self.query_sales("SELECT * FROM v_sale ORDER BY sale_id", [])
    }

    pub fn versions(&self, sale_id: &str) -> Result<Vec<u32>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT version FROM sale WHERE sale_id = ?1 ORDER BY version")?;
        let rows = stmt.query_map(params![sale_id], |row| row.get::<_, u32>(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Writes one master's reconciliation results in a single transaction.
    pub fn apply_status_changes(
        &mut self,
        changes: &[StatusChange],
        today: NaiveDate,
    ) -> Result<ReconcileSummary, StorageError> {
        let tx = self.conn.transaction()?;
        let mut summary = ReconcileSummary::default();
        for change in changes {
            match change {
                StatusChange::Refresh(sale) => match upsert_in(&tx, sale, today)? {
                    UpsertOutcome::NewVersion { .. } | UpsertOutcome::Inserted => {
                        summary.new_versions += 1
                    }
                    UpsertOutcome::Touched => summary.touched += 1,
                },
                StatusChange::State { sale_id, state } => {
                    let Some(mut sale) = current_in(&tx, sale_id)? else {
                        debug!("Status for unknown sale {} ignored", sale_id);
                        continue;
                    };
                    if sale.sale_state != *state {
                        sale.sale_state = *state;
                        upsert_in(&tx, &sale, today)?;
                        summary.state_changes += 1;
                        info!("{}: state -> {}", sale_id, state);
                    }
                    if state.is_terminal() {
                        summary.relations_closed += close_relations_in(&tx, sale_id, state, today)?;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(summary)
    }

    /// Removes duplicate `(sale_id, version)` rows, keeping the first inserted.
    pub fn dedupe(&self) -> Result<usize, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM sale WHERE rowid NOT IN
                (SELECT MIN(rowid) FROM sale GROUP BY sale_id, version)",
            [],
        )?;
        if removed > 0 {
            info!("Removed {} duplicate sale rows", removed);
        }
        Ok(removed)
    }

    pub fn entity_category(
        &self,
        entity_list_key: &str,
    ) -> Result<Option<(ProductCategory, Option<ProductSubCategory>)>, StorageError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT category_list FROM entity_category WHERE entity_list_key = ?1",
                params![entity_list_key],
                |row| row.get(0),
            )
            .optional()?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let list: Vec<String> = serde_json::from_str(&raw)?;
        let corrupt = || StorageError::CorruptRow {
            sale_id: entity_list_key.to_string(),
            reason: format!("bad category list {}", raw),
        };
        let category = list
            .first()
            .and_then(|c| ProductCategory::lookup(c))
            .ok_or_else(corrupt)?;
        let sub = match list.get(1) {
            Some(s) => Some(ProductSubCategory::lookup(s).ok_or_else(corrupt)?),
            None => None,
        };
        Ok(Some((category, sub)))
    }

    pub fn save_entity_category(
        &self,
        entity_list_key: &str,
        category: ProductCategory,
        sub: Option<ProductSubCategory>,
        today: NaiveDate,
        comment: &str,
    ) -> Result<(), StorageError> {
        let mut list = vec![category.as_str()];
        list.extend(sub.map(|s| s.as_str()));
        self.conn.execute(
            "INSERT OR REPLACE INTO entity_category (entity_list_key, category_list, start_date, comment)
             VALUES (?1, ?2, ?3, ?4)",
            params![entity_list_key, serde_json::to_string(&list)?, today, comment],
        )?;
        Ok(())
    }

    fn query_sales<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Sale>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, Sale::from_storage_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}

fn current_in(conn: &Connection, sale_id: &str) -> Result<Option<Sale>, StorageError> {
    let sale = conn
        .query_row(
            "SELECT * FROM v_sale WHERE sale_id = ?1 LIMIT 1",
            params![sale_id],
            Sale::from_storage_row,
        )
        .optional()?;
    Ok(sale)
}

fn insert_row(conn: &Connection, sale: &Sale) -> Result<(), StorageError> {
    let placeholders: Vec<String> = (1..=SALE_COLUMNS.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO sale ({}) VALUES ({})",
        SALE_COLUMNS.join(", "),
        placeholders.join(", ")
    );
    conn.execute(
        &sql,
        params![
            sale.sale_id,
            sale.version,
            sale.is_my_sale,
            sale.source.as_str(),
            sale.region.as_str(),
            sale.product_category.map(|c| c.as_str()),
            sale.product_sub_category.map(|c| c.as_str()),
            sale.sale_state.as_str(),
            sale.href,
            sale.start_date,
            sale.last_check_date,
            sale.title,
            sale.description,
            sale.price,
            sale.price_single,
            sale.price_original,
            sale.is_total_price,
            sale.is_single_price,
            sale.is_new,
            sale.is_like_new,
            sale.is_used,
            sale.is_cover_available,
            sale.number,
            sale.size,
            sale.age,
            sale.usage,
            sale.warranty,
            sale.object_state.as_str(),
            serde_json::to_string(&sale.entity_names)?,
            serde_json::to_string(&sale.entity_label_dict)?,
            sale.is_outlier,
            sale.comment,
        ],
    )?;
    Ok(())
}

fn upsert_in(conn: &Connection, sale: &Sale, today: NaiveDate) -> Result<UpsertOutcome, StorageError> {
    let Some(stored) = current_in(conn, &sale.sale_id)? else {
        let mut row = sale.clone();
        row.version = 1;
        row.last_check_date = today;
        insert_row(conn, &row)?;
        debug!("{}: inserted", sale.sale_id);
        return Ok(UpsertOutcome::Inserted);
    };

    let changed = sale.changed_fields(&stored);
    if changed.is_empty() {
        conn.execute(
            "UPDATE sale SET last_check_date = ?1, is_outlier = ?2 WHERE sale_id = ?3 AND version = ?4",
            params![today, sale.is_outlier, stored.sale_id, stored.version],
        )?;
        return Ok(UpsertOutcome::Touched);
    }

    let mut row = sale.clone();
    row.version = stored.version + 1;
    row.is_my_sale = stored.is_my_sale || sale.is_my_sale;
    row.start_date = stored.start_date;
    row.last_check_date = today;
    row.comment = format!("changed: {}", changed.join(", "));
    insert_row(conn, &row)?;
    info!("{}: version {} ({})", sale.sale_id, row.version, row.comment);
    Ok(UpsertOutcome::NewVersion {
        version: row.version,
        changed,
    })
}

fn ensure_relation_in(
    conn: &Connection,
    master_id: &str,
    child_id: &str,
    today: NaiveDate,
) -> Result<RelationOutcome, StorageError> {
    let end_date: Option<Option<NaiveDate>> = conn
        .query_row(
            "SELECT end_date FROM sale_relation WHERE master_id = ?1 AND child_id = ?2",
            params![master_id, child_id],
            |row| row.get(0),
        )
        .optional()?;
    match end_date {
        None => {
            conn.execute(
                "INSERT INTO sale_relation (master_id, child_id, start_date, end_date, comment)
                 VALUES (?1, ?2, ?3, NULL, '')",
                params![master_id, child_id, today],
            )?;
            Ok(RelationOutcome::Created)
        }
        Some(Some(_)) => {
            conn.execute(
                "UPDATE sale_relation SET end_date = NULL, comment = 'reopened'
                 WHERE master_id = ?1 AND child_id = ?2",
                params![master_id, child_id],
            )?;
            Ok(RelationOutcome::Reopened)
        }
        Some(None) => Ok(RelationOutcome::Unchanged),
    }
}

/// Closes every open relation the sale takes part in, as child or as master.
fn close_relations_in(
    conn: &Connection,
    sale_id: &str,
    state: &SaleState,
    today: NaiveDate,
) -> Result<usize, StorageError> {
    let closed = conn.execute(
        "UPDATE sale_relation SET end_date = ?1, comment = ?2
         WHERE end_date IS NULL AND (child_id = ?3 OR master_id = ?3)",
        params![today, state.as_str(), sale_id],
    )?;
    Ok(closed)
}

fn map_relation(row: &Row<'_>) -> rusqlite::Result<SaleRelation> {
    Ok(SaleRelation {
        master_id: row.get(0)?,
        child_id: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        comment: row.get(4)?,
    })
}

fn conversion_error(column: &str, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        format!("{}: unexpected value '{}'", column, raw).into(),
    )
}

fn decode<T>(value: Option<T>, column: &str, raw: &str) -> rusqlite::Result<T> {
    value.ok_or_else(|| conversion_error(column, raw))
}

impl Sale {
    /// Rebuilds a sale from a `sale` / `v_sale` row. No text analysis happens here.
    pub fn from_storage_row(row: &Row<'_>) -> rusqlite::Result<Sale> {
        let source: String = row.get("source")?;
        let region: String = row.get("region")?;
        let category: Option<String> = row.get("product_category")?;
        let sub_category: Option<String> = row.get("product_sub_category")?;
        let state: String = row.get("sale_state")?;
        let object_state: String = row.get("object_state")?;
        let names_json: String = row.get("entity_labels")?;
        let dict_json: String = row.get("entity_labels_dict")?;

        let entity_names: Vec<String> = serde_json::from_str(&names_json)
            .map_err(|_| conversion_error("entity_labels", &names_json))?;
        let entity_label_dict: BTreeMap<String, Label> = serde_json::from_str(&dict_json)
            .map_err(|_| conversion_error("entity_labels_dict", &dict_json))?;

        let product_category = match category.as_deref() {
            None | Some("") => None,
            Some(c) => Some(decode(ProductCategory::lookup(c), "product_category", c)?),
        };
        let product_sub_category = match sub_category.as_deref() {
            None | Some("") => None,
            Some(c) => Some(decode(ProductSubCategory::lookup(c), "product_sub_category", c)?),
        };
        let region = if region.is_empty() {
            Region::None
        } else {
            decode(Region::lookup(&region), "region", &region)?
        };

        Ok(Sale {
            sale_id: row.get("sale_id")?,
            version: row.get("version")?,
            is_my_sale: row.get("is_my_sale")?,
            source: decode(SaleSource::parse(&source), "source", &source)?,
            region,
            product_category,
            product_sub_category,
            sale_state: decode(SaleState::parse(&state), "sale_state", &state)?,
            href: row.get("href")?,
            start_date: row.get("start_date")?,
            last_check_date: row.get("last_check_date")?,
            title: row.get("title")?,
            description: row.get("description")?,
            price: row.get("price")?,
            price_single: row.get("price_single")?,
            price_original: row.get("price_original")?,
            is_total_price: row.get("is_total_price")?,
            is_single_price: row.get("is_single_price")?,
            is_new: row.get("is_new")?,
            is_like_new: row.get("is_like_new")?,
            is_used: row.get("is_used")?,
            is_cover_available: row.get("is_cover_available")?,
            number: row.get("number")?,
            size: row.get("size")?,
            age: row.get("age")?,
            usage: row.get("usage")?,
            warranty: row.get("warranty")?,
            object_state: decode(ObjectState::parse(&object_state), "object_state", &object_state)?,
            entity_names,
            entity_label_dict,
            is_outlier: row.get("is_outlier")?,
            comment: row.get("comment")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::tests::{day, sale_from};

    fn storage() -> SqliteStorage {
        SqliteStorage::open_in_memory().unwrap()
    }

    #[test]
    fn first_ingestion_inserts_version_one() {
        let mut storage = storage();
        let sale = sale_from("Hape Kugelbahn, wie neu, 30.-", None);
        assert_eq!(storage.upsert_sale(&sale, day(18)).unwrap(), UpsertOutcome::Inserted);
        let stored = storage.current(&sale.sale_id).unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.sale_state, SaleState::Open);
        assert_eq!(stored.last_check_date, day(18));
        assert_eq!(stored.entity_label_dict, sale.entity_label_dict);
        assert_eq!(stored.entity_names, sale.entity_names);
        assert_eq!(stored.price_single, 30.0);
    }

    #[test]
    fn identical_ingestion_only_touches_check_date() {
        let mut storage = storage();
        let sale = sale_from("USM Kitos Tisch, Durchmesser 90 cm", Some(390.0));
        storage.upsert_sale(&sale, day(18)).unwrap();
        assert_eq!(storage.upsert_sale(&sale, day(19)).unwrap(), UpsertOutcome::Touched);
        assert_eq!(storage.versions(&sale.sale_id).unwrap(), vec![1]);
        assert_eq!(storage.current(&sale.sale_id).unwrap().unwrap().last_check_date, day(19));
    }

    #[test]
    fn touch_refreshes_outlier_flag() {
        let mut storage = storage();
        let sale = sale_from("Hape Kugelbahn, wie neu", Some(300.0));
        storage.upsert_sale(&sale, day(18)).unwrap();
        let mut flagged = sale.clone();
        flagged.is_outlier = true;
        assert_eq!(storage.upsert_sale(&flagged, day(19)).unwrap(), UpsertOutcome::Touched);
        assert_eq!(storage.versions(&sale.sale_id).unwrap(), vec![1]);
        let current = storage.current(&sale.sale_id).unwrap().unwrap();
        assert!(current.is_outlier);
        assert_eq!(current.last_check_date, day(19));

        storage.upsert_sale(&sale, day(20)).unwrap();
        assert!(!storage.current(&sale.sale_id).unwrap().unwrap().is_outlier);
    }

    #[test]
    fn changed_description_bumps_version() {
        let mut storage = storage();
        let mut sale = sale_from("USM Kitos Tisch | Durchmesser 90 cm", Some(390.0));
        sale.sale_id = "c1".into();
        storage.upsert_sale(&sale, day(17)).unwrap();
        let mut changed = sale.clone();
        changed.description = "Durchmesser 110 cm".into();
        changed.start_date = day(18);
        let outcome = storage.upsert_sale(&changed, day(18)).unwrap();
        assert_eq!(
            outcome,
            UpsertOutcome::NewVersion {
                version: 2,
                changed: vec!["description"]
            }
        );
        let current = storage.current("c1").unwrap().unwrap();
        assert_eq!(current.version, 2);
        assert!(current.comment.contains("description"));
        assert_eq!(current.start_date, sale.start_date);
        assert_eq!(storage.all_current().unwrap().len(), 1);
        assert_eq!(storage.versions("c1").unwrap(), vec![1, 2]);
    }

    #[test]
    fn reinserting_current_view_changes_nothing() {
        let mut storage = storage();
        for text in ["Hape Kugelbahn", "IKEA Stuhl", "Velo Damen"] {
            storage.upsert_sale(&sale_from(text, Some(10.0)), day(18)).unwrap();
        }
        for sale in storage.all_current().unwrap() {
            assert_eq!(storage.upsert_sale(&sale, day(18)).unwrap(), UpsertOutcome::Touched);
        }
        assert_eq!(storage.all_current().unwrap().len(), 3);
    }

    #[test]
    fn relation_protocol() {
        let mut storage = storage();
        let master = sale_from("Hape Kugelbahn", Some(30.0));
        let child = sale_from("Kugelbahn Holz", Some(20.0));
        storage.upsert_sale(&master, day(17)).unwrap();
        let (_, created) = storage.upsert_child(&master.sale_id, &child, day(17)).unwrap();
        assert_eq!(created, RelationOutcome::Created);
        let (_, again) = storage.upsert_child(&master.sale_id, &child, day(18)).unwrap();
        assert_eq!(again, RelationOutcome::Unchanged);

        let closed = storage
            .close_relations_not_in(&master.sale_id, &HashSet::new(), day(19))
            .unwrap();
        assert_eq!(closed, 1);
        let relation = storage.relation(&master.sale_id, &child.sale_id).unwrap().unwrap();
        assert_eq!(relation.end_date, Some(day(19)));

        let (_, reopened) = storage.upsert_child(&master.sale_id, &child, day(20)).unwrap();
        assert_eq!(reopened, RelationOutcome::Reopened);
        let relations = storage.relations_of_master(&master.sale_id).unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].end_date, None);
        assert_eq!(relations[0].start_date, day(17));
    }

    #[test]
    fn terminal_state_closes_relations_and_leaves_current_view() {
        let mut storage = storage();
        let master = sale_from("Hape Kugelbahn", Some(30.0));
        let child = sale_from("Kugelbahn Holz", Some(20.0));
        storage.upsert_sale(&master, day(17)).unwrap();
        storage.upsert_child(&master.sale_id, &child, day(17)).unwrap();

        let summary = storage
            .apply_status_changes(
                &[StatusChange::State {
                    sale_id: child.sale_id.clone(),
                    state: SaleState::Vanished,
                }],
                day(18),
            )
            .unwrap();
        assert_eq!(summary.state_changes, 1);
        assert_eq!(summary.relations_closed, 1);

        let stored = storage.current(&child.sale_id).unwrap().unwrap();
        assert_eq!(stored.sale_state, SaleState::Vanished);
        assert_eq!(stored.version, 2);
        let current: Vec<String> = storage
            .current_sales()
            .unwrap()
            .into_iter()
            .map(|s| s.sale_id)
            .collect();
        assert_eq!(current, vec![master.sale_id.clone()]);
        assert!(storage.open_children(&master.sale_id).unwrap().is_empty());
        assert_eq!(storage.children_of(&master.sale_id).unwrap().len(), 1);
    }

    #[test]
    fn sold_master_closes_its_relations() {
        let mut storage = storage();
        let master = sale_from("Hape Kugelbahn", Some(30.0));
        let child = sale_from("Kugelbahn Holz", Some(20.0));
        storage.upsert_sale(&master, day(17)).unwrap();
        storage.upsert_child(&master.sale_id, &child, day(17)).unwrap();
        storage
            .apply_status_changes(
                &[StatusChange::State {
                    sale_id: master.sale_id.clone(),
                    state: SaleState::Sold,
                }],
                day(18),
            )
            .unwrap();
        let relation = storage.relation(&master.sale_id, &child.sale_id).unwrap().unwrap();
        assert_eq!(relation.end_date, Some(day(18)));
        assert!(storage.master_ids().unwrap().is_empty());
    }

    #[test]
    fn my_sales_and_open_sales() {
        let mut storage = storage();
        let mut mine = sale_from("Hape Kugelbahn", Some(30.0));
        mine.is_my_sale = true;
        storage.upsert_sale(&mine, day(18)).unwrap();
        storage.upsert_sale(&sale_from("IKEA Stuhl", Some(5.0)), day(18)).unwrap();
        assert_eq!(storage.my_sales().unwrap().len(), 1);
        assert_eq!(storage.open_sales().unwrap().len(), 2);
    }

    #[test]
    fn dedupe_keeps_first_row() {
        let storage = storage();
        storage
            .conn
            .execute_batch(
                "DROP VIEW v_sale;
                 CREATE TABLE sale_legacy AS SELECT * FROM sale WHERE 0;
                 DROP TABLE sale;
                 ALTER TABLE sale_legacy RENAME TO sale;",
            )
            .unwrap();
        storage.conn.execute_batch(SCHEMA).unwrap();

        let sale = sale_from("Hape Kugelbahn", Some(30.0));
        let mut later = sale.clone();
        later.comment = "second".into();
        insert_row(&storage.conn, &sale).unwrap();
        insert_row(&storage.conn, &later).unwrap();
        assert_eq!(storage.dedupe().unwrap(), 1);
        let kept = storage.current(&sale.sale_id).unwrap().unwrap();
        assert_eq!(kept.comment, "");
        assert_eq!(storage.dedupe().unwrap(), 0);
    }

    #[test]
    fn entity_category_cache() {
        let storage = storage();
        let key = "COMPANY:Hape|OBJECT:Kugelbahn";
        assert_eq!(storage.entity_category(key).unwrap(), None);
        storage
            .save_entity_category(
                key,
                ProductCategory::Child,
                Some(ProductSubCategory::ChildToys),
                day(18),
                "manual",
            )
            .unwrap();
        assert_eq!(
            storage.entity_category(key).unwrap(),
            Some((ProductCategory::Child, Some(ProductSubCategory::ChildToys)))
        );
    }
}
