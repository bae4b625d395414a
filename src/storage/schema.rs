//! SQL schema for the sale store.
//!
//! Executed at connection startup; every statement is idempotent.

/// Full schema DDL.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sale (
    sale_id              TEXT NOT NULL,
    version              INTEGER NOT NULL,
    is_my_sale           INTEGER NOT NULL DEFAULT 0,
    source               TEXT NOT NULL,
    region               TEXT NOT NULL DEFAULT 'NONE',
    product_category     TEXT,
    product_sub_category TEXT,
    sale_state           TEXT NOT NULL DEFAULT 'open',
    href                 TEXT NOT NULL DEFAULT '',
    start_date           TEXT NOT NULL,
    last_check_date      TEXT NOT NULL,
    title                TEXT NOT NULL,
    description          TEXT NOT NULL DEFAULT '',
    price                REAL NOT NULL DEFAULT 0,
    price_single         REAL NOT NULL DEFAULT 0,
    price_original       REAL NOT NULL DEFAULT 0,
    is_total_price       INTEGER NOT NULL DEFAULT 0,
    is_single_price      INTEGER NOT NULL DEFAULT 0,
    is_new               INTEGER NOT NULL DEFAULT 0,
    is_like_new          INTEGER NOT NULL DEFAULT 0,
    is_used              INTEGER NOT NULL DEFAULT 0,
    is_cover_available   INTEGER NOT NULL DEFAULT 0,
    number               INTEGER NOT NULL DEFAULT 1,
    size                 TEXT NOT NULL DEFAULT '',
    age                  TEXT NOT NULL DEFAULT '',
    usage                TEXT NOT NULL DEFAULT '',
    warranty             TEXT NOT NULL DEFAULT '',
    object_state         TEXT NOT NULL DEFAULT 'NOT_QUALIFIED',
    entity_labels        TEXT NOT NULL DEFAULT '[]',   -- JSON list of canonical names, document order
    entity_labels_dict   TEXT NOT NULL DEFAULT '{}',   -- JSON object name -> label
    is_outlier           INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (sale_id, version)
);

-- Current version of every sale.
CREATE VIEW IF NOT EXISTS v_sale AS
    SELECT s.* FROM sale s
    WHERE s.version = (SELECT MAX(m.version) FROM sale m WHERE m.sale_id = s.sale_id);

CREATE TABLE IF NOT EXISTS sale_relation (
    master_id  TEXT NOT NULL,
    child_id   TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date   TEXT,
    PRIMARY KEY (master_id, child_id)
);

-- Operator-curated categories for a set of entities.
CREATE TABLE IF NOT EXISTS entity_category (
    entity_list_key TEXT PRIMARY KEY,   -- sorted 'LABEL:name' joined by '|'
    category_list   TEXT NOT NULL,      -- JSON [category, sub_category?]
    start_date      TEXT NOT NULL,
    comment         TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS sale_state_idx ON sale(sale_state);
CREATE INDEX IF NOT EXISTS relation_child_idx ON sale_relation(child_id);
";
