use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, open_connection};
use crate::domain::record::Record;
use crate::init::seed_lookups;

pub(crate) struct TempDb {
    pub path: String,
    pub conn: Connection,
}

impl TempDb {
    /// Fresh migrated database with the reference lookups loaded.
    pub fn seeded(label: &str) -> Self {
        let path = unique_db_path(label);
        let conn = open_connection(&path).expect("connection should open");
        for lookup in seed_lookups().expect("embedded seed parses") {
            db::upsert_lookup(&conn, &lookup).expect("lookup seed should insert");
        }
        Self { path, conn }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        cleanup_db_files(&self.path);
    }
}

pub(crate) fn unique_db_path(label: &str) -> String {
    std::env::temp_dir()
        .join(format!("machete-{label}-{}.sqlite", Uuid::now_v7()))
        .display()
        .to_string()
}

pub(crate) fn cleanup_db_files(path: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let candidate = format!("{path}{suffix}");
        let _ = std::fs::remove_file(candidate);
    }
}

pub(crate) fn record(user: &str) -> Record {
    Record::created_by(user).expect("test user is valid")
}
