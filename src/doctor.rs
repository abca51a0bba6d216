use std::error::Error;
use std::fmt;

use rusqlite::Connection;
use serde::Serialize;

use crate::config::Config;
use crate::db;
use crate::lookup_cache::LookupCache;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoctorStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub status: DoctorStatus,
    pub detail: String,
}

impl DoctorCheck {
    fn new(name: &str, status: DoctorStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn failure_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|check| check.status == DoctorStatus::Fail)
            .count()
    }
}

#[derive(Debug)]
pub enum DoctorError {
    Db(rusqlite::Error),
}

impl fmt::Display for DoctorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoctorError::Db(err) => write!(f, "database error: {}", err),
        }
    }
}

impl Error for DoctorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DoctorError::Db(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DoctorError {
    fn from(value: rusqlite::Error) -> Self {
        DoctorError::Db(value)
    }
}

pub fn run_doctor(conn: &Connection, config: &Config) -> Result<DoctorReport, DoctorError> {
    let checks = vec![
        check_schema_version(conn)?,
        check_lookups(conn, config),
        check_orphaned_assignments(conn)?,
        check_cache_ttl(config),
    ];
    for check in &checks {
        tracing::debug!(name = %check.name, status = ?check.status, "doctor check");
    }
    Ok(DoctorReport { checks })
}

fn check_schema_version(conn: &Connection) -> Result<DoctorCheck, DoctorError> {
    let stored = db::get_meta(conn, "schema_version")?;
    let expected = db::CURRENT_SCHEMA_VERSION.to_string();
    Ok(match stored {
        Some(version) if version == expected => DoctorCheck::new(
            "schema_version",
            DoctorStatus::Pass,
            format!("schema version {version}"),
        ),
        Some(version) => DoctorCheck::new(
            "schema_version",
            DoctorStatus::Fail,
            format!("schema version {version}, expected {expected}"),
        ),
        None => DoctorCheck::new(
            "schema_version",
            DoctorStatus::Fail,
            "schema version is not recorded",
        ),
    })
}

/// Builds a fresh snapshot so the check sees the table as it is now.
fn check_lookups(conn: &Connection, config: &Config) -> DoctorCheck {
    let cache = LookupCache::new(config.lookup_ttl(), config.work_type_keys());
    match cache.refresh(conn) {
        Ok(snapshot) if snapshot.lookups().is_empty() => DoctorCheck::new(
            "lookups",
            DoctorStatus::Fail,
            "lookup table is empty; run `machete init`",
        ),
        Ok(snapshot) => DoctorCheck::new(
            "lookups",
            DoctorStatus::Pass,
            format!("{} lookups, well-known ids resolved", snapshot.lookups().len()),
        ),
        Err(err) => DoctorCheck::new("lookups", DoctorStatus::Fail, err.to_string()),
    }
}

fn check_orphaned_assignments(conn: &Connection) -> Result<DoctorCheck, DoctorError> {
    let orphaned = db::count_orphaned_assignments(conn)?;
    Ok(if orphaned == 0 {
        DoctorCheck::new(
            "orphaned_assignments",
            DoctorStatus::Pass,
            "every dispatched worker exists",
        )
    } else {
        DoctorCheck::new(
            "orphaned_assignments",
            DoctorStatus::Fail,
            format!("{orphaned} assignment(s) point at a missing worker"),
        )
    })
}

fn check_cache_ttl(config: &Config) -> DoctorCheck {
    let ttl = config.lookup_cache.ttl_secs;
    match ttl {
        0 => DoctorCheck::new(
            "lookup_cache_ttl",
            DoctorStatus::Warn,
            "ttl is 0; every lookup reads the database",
        ),
        ttl if ttl > 86_400 => DoctorCheck::new(
            "lookup_cache_ttl",
            DoctorStatus::Warn,
            format!("ttl of {ttl}s hides lookup edits for more than a day"),
        ),
        ttl => DoctorCheck::new(
            "lookup_cache_ttl",
            DoctorStatus::Pass,
            format!("ttl {ttl}s"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use rusqlite::params;

    use super::{run_doctor, DoctorError, DoctorStatus};
    use crate::config::Config;
    use crate::db;
    use crate::domain::work_order::{sample_order, Employer};
    use crate::test_support::{record, TempDb};

    fn status_of(report: &super::DoctorReport, name: &str) -> DoctorStatus {
        report
            .checks
            .iter()
            .find(|check| check.name == name)
            .map(|check| check.status)
            .expect("check should be present")
    }

    #[test]
    fn seeded_store_passes_every_check() {
        let db = TempDb::seeded("doctor-pass");
        let report = run_doctor(&db.conn, &Config::default()).expect("doctor runs");
        assert_eq!(report.checks.len(), 4);
        assert_eq!(report.failure_count(), 0);
        assert!(report
            .checks
            .iter()
            .all(|check| check.status == DoctorStatus::Pass));
    }

    #[test]
    fn empty_lookup_table_fails() {
        let db = TempDb::seeded("doctor-empty");
        db.conn.execute("DELETE FROM lookups", []).expect("clear lookups");
        let report = run_doctor(&db.conn, &Config::default()).expect("doctor runs");
        assert_eq!(status_of(&report, "lookups"), DoctorStatus::Fail);
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn schema_version_mismatch_fails() {
        let db = TempDb::seeded("doctor-schema");
        db::set_meta(&db.conn, "schema_version", "1").expect("meta writable");
        let report = run_doctor(&db.conn, &Config::default()).expect("doctor runs");
        assert_eq!(status_of(&report, "schema_version"), DoctorStatus::Fail);
    }

    #[test]
    fn assignment_pointing_at_missing_worker_fails() {
        let db = TempDb::seeded("doctor-orphan");
        db.conn
            .execute_batch("PRAGMA foreign_keys = OFF;")
            .expect("pragma");
        let employer = Employer {
            record: record("t"),
            name: "Acme".to_string(),
            phone: None,
            zipcode: None,
        };
        let employer_id = db::insert_employer(&db.conn, &employer).expect("employer insert");
        let mut order = sample_order(employer_id, 12, "2024-03-10 08:00:00");
        order.record = record("t");
        let order_id = db::insert_work_order(&db.conn, &order).expect("order insert");
        db.conn
            .execute(
                r#"
INSERT INTO work_assignments
    (work_order_id, worker_assigned_id, skill_id, hours, hourly_wage,
     created_at, updated_at, created_by, updated_by)
VALUES (?1, 9999, 60, 4, 15.0, '2024-01-01 00:00:00', '2024-01-01 00:00:00', 't', 't')
"#,
                params![order_id],
            )
            .expect("assignment insert");

        let report = run_doctor(&db.conn, &Config::default()).expect("doctor runs");
        assert_eq!(status_of(&report, "orphaned_assignments"), DoctorStatus::Fail);
    }

    #[test]
    fn zero_ttl_only_warns() {
        let db = TempDb::seeded("doctor-ttl");
        let mut config = Config::default();
        config.lookup_cache.ttl_secs = 0;
        let report = run_doctor(&db.conn, &config).expect("doctor runs");
        assert_eq!(status_of(&report, "lookup_cache_ttl"), DoctorStatus::Warn);
        assert_eq!(report.failure_count(), 0);
    }

    #[test]
    fn error_wraps_database_source() {
        let err: DoctorError = rusqlite::Error::InvalidQuery.into();
        assert!(err.to_string().contains("database error"));
        assert!(err.source().is_some());
    }
}
