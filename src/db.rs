use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result, Row};

use crate::dates::now_utc_rfc3339;
use crate::domain::lookup::Lookup;
use crate::domain::record::Record;
use crate::lookup_cache::{LookupError, LookupSource};

mod attendance;
mod dispatch;
mod people;

pub use attendance::*;
pub use dispatch::*;
pub use people::*;

pub const CURRENT_SCHEMA_VERSION: i64 = 3;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 3] = [
    Migration {
        version: 1,
        name: "baseline_membership_schema_v1",
        sql: r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lookups (
    id INTEGER PRIMARY KEY,
    category TEXT NOT NULL,
    key TEXT,
    text_en TEXT NOT NULL,
    text_es TEXT NOT NULL DEFAULT '',
    speciality INTEGER NOT NULL DEFAULT 0,
    type_of_work_id INTEGER,
    ltr_code TEXT,
    level INTEGER,
    sort_order INTEGER NOT NULL DEFAULT 0,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS workers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    dwccardnum INTEGER NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    member_status INTEGER NOT NULL REFERENCES lookups(id),
    date_of_membership TEXT NOT NULL,
    member_expiration_date TEXT NOT NULL,
    date_of_birth TEXT,
    type_of_work_id INTEGER NOT NULL REFERENCES lookups(id),
    marital_status INTEGER REFERENCES lookups(id),
    live_with_children INTEGER NOT NULL DEFAULT 0,
    homeless INTEGER NOT NULL DEFAULT 0,
    immigrant_refugee INTEGER NOT NULL DEFAULT 0,
    disabled INTEGER NOT NULL DEFAULT 0,
    race_id INTEGER REFERENCES lookups(id),
    income_id INTEGER REFERENCES lookups(id),
    gender_id INTEGER REFERENCES lookups(id),
    english_level INTEGER NOT NULL DEFAULT 0,
    zipcode TEXT,
    skill1 INTEGER REFERENCES lookups(id),
    skill2 INTEGER REFERENCES lookups(id),
    skill3 INTEGER REFERENCES lookups(id)
);

CREATE TABLE IF NOT EXISTS employers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    name TEXT NOT NULL,
    phone TEXT,
    zipcode TEXT
);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    person_id INTEGER NOT NULL REFERENCES workers(id) ON DELETE CASCADE,
    event_type INTEGER NOT NULL REFERENCES lookups(id),
    date_from TEXT NOT NULL,
    date_to TEXT,
    notes TEXT
);

CREATE INDEX IF NOT EXISTS idx_lookups_category ON lookups(category, sort_order);
CREATE INDEX IF NOT EXISTS idx_workers_membership ON workers(date_of_membership);
CREATE INDEX IF NOT EXISTS idx_events_person ON events(person_id, date_from);
"#,
    },
    Migration {
        version: 2,
        name: "dispatch_attendance_schema_v1",
        sql: r#"
CREATE TABLE IF NOT EXISTS work_orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    employer_id INTEGER NOT NULL REFERENCES employers(id),
    paper_order_num INTEGER,
    contact_name TEXT NOT NULL,
    status INTEGER NOT NULL REFERENCES lookups(id),
    work_site_address1 TEXT NOT NULL,
    work_site_address2 TEXT,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    phone TEXT NOT NULL,
    zipcode TEXT NOT NULL,
    type_of_work_id INTEGER NOT NULL REFERENCES lookups(id),
    english_required INTEGER NOT NULL DEFAULT 0,
    english_required_note TEXT,
    lunch_supplied INTEGER NOT NULL DEFAULT 0,
    permanent_placement INTEGER NOT NULL DEFAULT 0,
    transport_method_id INTEGER NOT NULL REFERENCES lookups(id),
    transport_fee REAL NOT NULL DEFAULT 0,
    transport_fee_extra REAL NOT NULL DEFAULT 0,
    description TEXT,
    date_time_of_work TEXT NOT NULL,
    time_flexible INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS worker_signins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    dwccardnum INTEGER NOT NULL,
    date_for_signin TEXT NOT NULL,
    lottery_timestamp TEXT,
    work_assignment_id INTEGER
);

CREATE TABLE IF NOT EXISTS work_assignments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    work_order_id INTEGER NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
    worker_assigned_id INTEGER REFERENCES workers(id),
    worker_signin_id INTEGER,
    skill_id INTEGER NOT NULL REFERENCES lookups(id),
    hours INTEGER NOT NULL DEFAULT 0,
    hourly_wage REAL NOT NULL DEFAULT 0,
    description TEXT
);

CREATE TABLE IF NOT EXISTS worker_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    work_order_id INTEGER NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
    worker_id INTEGER NOT NULL REFERENCES workers(id),
    UNIQUE (work_order_id, worker_id)
);

CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    name_id INTEGER NOT NULL REFERENCES lookups(id),
    date_start TEXT NOT NULL,
    date_end TEXT NOT NULL,
    teacher TEXT,
    notes TEXT
);

CREATE TABLE IF NOT EXISTS activity_signins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    activity_id INTEGER NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
    dwccardnum INTEGER NOT NULL,
    person_id INTEGER REFERENCES workers(id),
    date_for_signin TEXT NOT NULL,
    UNIQUE (activity_id, dwccardnum)
);

CREATE INDEX IF NOT EXISTS idx_work_orders_date ON work_orders(date_time_of_work);
CREATE INDEX IF NOT EXISTS idx_work_orders_status ON work_orders(status);
CREATE INDEX IF NOT EXISTS idx_work_assignments_order ON work_assignments(work_order_id);
CREATE INDEX IF NOT EXISTS idx_work_assignments_worker ON work_assignments(worker_assigned_id);
CREATE INDEX IF NOT EXISTS idx_worker_signins_card_date ON worker_signins(dwccardnum, date_for_signin);
CREATE INDEX IF NOT EXISTS idx_activity_signins_date ON activity_signins(date_for_signin);
"#,
    },
    Migration {
        version: 3,
        name: "one_signin_per_card_per_day",
        sql: r#"
ALTER TABLE worker_signins
    ADD COLUMN sign_in_day TEXT GENERATED ALWAYS AS (date(date_for_signin)) VIRTUAL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_worker_signins_card_day
    ON worker_signins(dwccardnum, sign_in_day);
"#,
    },
];

pub fn open_connection(path: &str) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    configure_for_speed(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn configure_for_speed(conn: &Connection) -> Result<()> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "foreign_keys", "ON")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.pragma_update(None::<DatabaseName>, "busy_timeout", 5000i64)?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
"#,
    )?;

    for migration in MIGRATIONS {
        let already_applied: Option<i64> = tx
            .query_row(
                "SELECT version FROM schema_migrations WHERE version = ?1",
                params![migration.version],
                |row| row.get(0),
            )
            .optional()?;

        if already_applied.is_some() {
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "applying migration"
        );
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![migration.version, migration.name, now_utc_rfc3339()],
        )?;
    }

    tx.execute(
        r#"
INSERT INTO meta (key, value)
VALUES ('schema_version', ?1)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;

    tx.commit()
}

pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
INSERT INTO meta (key, value)
VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![key, value],
    )?;
    Ok(())
}

pub fn upsert_lookup(conn: &Connection, lookup: &Lookup) -> Result<()> {
    conn.execute(
        r#"
INSERT INTO lookups (
    id, category, key, text_en, text_es, speciality, type_of_work_id,
    ltr_code, level, sort_order, active
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
ON CONFLICT(id) DO UPDATE SET
    category = excluded.category,
    key = excluded.key,
    text_en = excluded.text_en,
    text_es = excluded.text_es,
    speciality = excluded.speciality,
    type_of_work_id = excluded.type_of_work_id,
    ltr_code = excluded.ltr_code,
    level = excluded.level,
    sort_order = excluded.sort_order,
    active = excluded.active
"#,
        params![
            lookup.id,
            lookup.category,
            lookup.key,
            lookup.text_en,
            lookup.text_es,
            lookup.speciality,
            lookup.type_of_work_id,
            lookup.ltr_code,
            lookup.level,
            lookup.sort_order,
            lookup.active
        ],
    )?;
    Ok(())
}

pub fn list_lookups(conn: &Connection) -> Result<Vec<Lookup>> {
    let mut stmt = conn.prepare(
        r#"
SELECT id, category, key, text_en, text_es, speciality, type_of_work_id,
       ltr_code, level, sort_order, active
FROM lookups
ORDER BY category, sort_order, id
"#,
    )?;

    let mut rows = stmt.query([])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(Lookup {
            id: row.get(0)?,
            category: row.get(1)?,
            key: row.get(2)?,
            text_en: row.get(3)?,
            text_es: row.get(4)?,
            speciality: row.get(5)?,
            type_of_work_id: row.get(6)?,
            ltr_code: row.get(7)?,
            level: row.get(8)?,
            sort_order: row.get(9)?,
            active: row.get(10)?,
        });
    }
    Ok(result)
}

impl LookupSource for Connection {
    fn load_lookups(&self) -> std::result::Result<Vec<Lookup>, LookupError> {
        Ok(list_lookups(self)?)
    }
}

/// Audit columns, always selected first as `id, created_at, updated_at,
/// created_by, updated_by`.
const RECORD_COLUMNS: &str = "id, created_at, updated_at, created_by, updated_by";

fn record_from_row(row: &Row<'_>) -> Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        created_at: row.get(1)?,
        updated_at: row.get(2)?,
        created_by: row.get(3)?,
        updated_by: row.get(4)?,
    })
}

fn collect_rows<T>(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
    map: impl Fn(&Row<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(map(row)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests;
