use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;

use crate::config::{Config, ConfigError};
use crate::dates::{parse_date, today, DateParseError};
use crate::db;
use crate::doctor::{run_doctor, DoctorError, DoctorReport};
use crate::domain::lookup::{category, Locale, Lookup};
use crate::domain::record::{validate_user, Record};
use crate::domain::validation::ValidationError;
use crate::domain::work_order::Employer;
use crate::domain::worker::Worker;
use crate::init::seed_lookups;
use crate::lookup_cache::{LookupCache, LookupError, LookupSnapshot};
use crate::reports::{ReportError, ReportService};

mod attendance;
mod dispatch;

pub use attendance::{EventPatch, EventView, SigninOutcome, SigninView};
pub use dispatch::{NewAssignment, WorkOrderView};

pub struct App {
    conn: Connection,
    cache: LookupCache,
    config: Config,
    user: String,
}

/// How a worker is addressed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerKey {
    Id(i64),
    Card(i64),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkerView {
    #[serde(flatten)]
    pub worker: Worker,
    pub member_status_text: String,
    pub skills: String,
}

impl App {
    pub fn open(db_path: &str, config: Config, user: &str) -> Result<Self, AppError> {
        validate_user(user)?;
        ensure_parent_dir(db_path)?;
        let conn = db::open_connection(db_path)?;
        let cache = config.lookup_cache();
        Ok(Self {
            conn,
            cache,
            config,
            user: user.trim().to_string(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn lookups(&self) -> Result<Arc<LookupSnapshot>, AppError> {
        Ok(self.cache.snapshot(&self.conn)?)
    }

    pub fn refresh_lookups(&self) -> Result<Arc<LookupSnapshot>, AppError> {
        Ok(self.cache.refresh(&self.conn)?)
    }

    pub fn lookup_cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Loads the embedded reference codes, overwriting rows with the same id.
    pub fn seed_lookups(&self) -> Result<usize, AppError> {
        let lookups = seed_lookups().map_err(|err| {
            AppError::InvalidArgument(format!("embedded lookup seed is invalid: {err}"))
        })?;
        let tx = self.conn.unchecked_transaction()?;
        for lookup in &lookups {
            db::upsert_lookup(&tx, lookup)?;
        }
        tx.commit()?;
        self.cache.invalidate();
        tracing::info!(count = lookups.len(), "seeded lookups");
        Ok(lookups.len())
    }

    pub fn reports(&self) -> Result<ReportService<'_>, AppError> {
        Ok(ReportService::new(
            &self.conn,
            self.lookups()?,
            self.config.reports.rockstar_minutes,
        ))
    }

    pub fn doctor(&self) -> Result<DoctorReport, AppError> {
        Ok(run_doctor(&self.conn, &self.config)?)
    }

    pub fn list_lookups(&self, category: Option<&str>) -> Result<Vec<Lookup>, AppError> {
        let snapshot = self.lookups()?;
        let rows = match category {
            Some(category) => snapshot.by_category(category).into_iter().cloned().collect(),
            None => snapshot.lookups().to_vec(),
        };
        Ok(rows)
    }

    pub fn show_lookup(&self, id: i64) -> Result<Lookup, AppError> {
        Ok(self.lookups()?.get(id)?.clone())
    }

    pub fn resolve_lookup(&self, category: &str, raw: &str) -> Result<i64, AppError> {
        Ok(self.lookups()?.resolve(category, raw)?)
    }

    pub fn create_worker(&self, mut worker: Worker) -> Result<WorkerView, AppError> {
        worker.record = self.new_record()?;
        worker.validate()?;
        let snapshot = self.lookups()?;
        expect_category(&snapshot, worker.member_status, category::MEMBER_STATUS)?;
        expect_category(&snapshot, worker.type_of_work_id, category::WORK_TYPE)?;
        for (id, lookup_category) in [
            (worker.marital_status, category::MARITAL_STATUS),
            (worker.race_id, category::RACE),
            (worker.income_id, category::INCOME),
            (worker.gender_id, category::GENDER),
        ] {
            if let Some(id) = id {
                expect_category(&snapshot, id, lookup_category)?;
            }
        }
        for skill in worker.skills() {
            snapshot.get_by_skill_id(skill)?;
        }
        if db::get_worker_by_card(&self.conn, worker.dwccardnum)?.is_some() {
            return Err(AppError::Conflict(format!(
                "card {} is already registered",
                worker.dwccardnum
            )));
        }

        worker.record.id = db::insert_worker(&self.conn, &worker)?;
        tracing::info!(
            id = worker.record.id,
            dwccardnum = worker.dwccardnum,
            "registered worker"
        );
        self.worker_view(worker, &snapshot)
    }

    pub fn show_worker(&self, key: WorkerKey) -> Result<WorkerView, AppError> {
        let worker = self.require_worker(key)?;
        let snapshot = self.lookups()?;
        self.worker_view(worker, &snapshot)
    }

    pub fn list_workers(&self, member_status: Option<i64>) -> Result<Vec<WorkerView>, AppError> {
        let snapshot = self.lookups()?;
        db::list_workers(&self.conn, member_status)?
            .into_iter()
            .map(|worker| self.worker_view(worker, &snapshot))
            .collect()
    }

    pub fn set_member_status(&self, key: WorkerKey, status: i64) -> Result<WorkerView, AppError> {
        let snapshot = self.lookups()?;
        expect_category(&snapshot, status, category::MEMBER_STATUS)?;
        let mut worker = self.require_worker(key)?;
        worker.record.stamp_updated(&self.user)?;
        db::update_worker_status(&self.conn, worker.record.id, status, &worker.record)?;
        worker.member_status = status;
        tracing::info!(dwccardnum = worker.dwccardnum, status, "member status changed");
        self.worker_view(worker, &snapshot)
    }

    /// Moves the expiration date. An expired member whose new expiration
    /// lies in the future becomes active again.
    pub fn renew_membership(&self, key: WorkerKey, expiration: &str) -> Result<WorkerView, AppError> {
        let expires = parse_date(expiration)?;
        let snapshot = self.lookups()?;
        let ids = snapshot.well_known().member_status;
        let mut worker = self.require_worker(key)?;
        let joined = parse_date(&worker.date_of_membership)?;
        if expires < joined {
            return Err(ValidationError::OutOfRange {
                field: "member_expiration_date",
                detail: "must not precede the membership date".to_string(),
            }
            .into());
        }
        if worker.member_status == ids.expired && expires >= today() {
            worker.member_status = ids.active;
        }
        worker.member_expiration_date = crate::dates::format_date(expires);
        worker.record.stamp_updated(&self.user)?;
        db::update_worker_expiration(
            &self.conn,
            worker.record.id,
            &worker.member_expiration_date,
            worker.member_status,
            &worker.record,
        )?;
        self.worker_view(worker, &snapshot)
    }

    pub fn create_employer(
        &self,
        name: &str,
        phone: Option<&str>,
        zipcode: Option<&str>,
    ) -> Result<Employer, AppError> {
        let mut employer = Employer {
            record: self.new_record()?,
            name: name.trim().to_string(),
            phone: phone.map(|value| value.trim().to_string()),
            zipcode: zipcode.map(|value| value.trim().to_string()),
        };
        employer.validate()?;
        employer.record.id = db::insert_employer(&self.conn, &employer)?;
        Ok(employer)
    }

    pub fn list_employers(&self) -> Result<Vec<Employer>, AppError> {
        Ok(db::list_employers(&self.conn)?)
    }

    pub(crate) fn require_worker(&self, key: WorkerKey) -> Result<Worker, AppError> {
        let found = match key {
            WorkerKey::Id(id) => db::get_worker(&self.conn, id)?,
            WorkerKey::Card(card) => db::get_worker_by_card(&self.conn, card)?,
        };
        found.ok_or_else(|| match key {
            WorkerKey::Id(id) => AppError::NotFound(format!("worker {id}")),
            WorkerKey::Card(card) => AppError::NotFound(format!("worker with card {card}")),
        })
    }

    fn worker_view(&self, worker: Worker, snapshot: &LookupSnapshot) -> Result<WorkerView, AppError> {
        let member_status_text = snapshot.by_id(worker.member_status, self.locale())?.to_string();
        let skills = skill_codes(snapshot, worker.english_level, worker.skills())?;
        Ok(WorkerView {
            worker,
            member_status_text,
            skills,
        })
    }

    pub(crate) fn new_record(&self) -> Result<Record, AppError> {
        Ok(Record::created_by(&self.user)?)
    }

    pub(crate) fn touched(&self, record: &Record) -> Result<Record, AppError> {
        let mut record = record.clone();
        record.stamp_updated(&self.user)?;
        Ok(record)
    }
}

/// Dispatch board summary of a worker: `E{english}` followed by the letter
/// code and level of each skill, e.g. `E2 G1 C3`.
pub fn skill_codes(
    snapshot: &LookupSnapshot,
    english_level: i64,
    skills: impl Iterator<Item = i64>,
) -> Result<String, LookupError> {
    let mut parts = vec![format!("E{english_level}")];
    for skill in skills {
        parts.push(snapshot.get_by_skill_id(skill)?.skill_code());
    }
    Ok(parts.join(" "))
}

pub(crate) fn expect_category(
    snapshot: &LookupSnapshot,
    id: i64,
    expected: &str,
) -> Result<(), AppError> {
    let lookup = snapshot.get(id)?;
    if lookup.category != expected {
        return Err(AppError::InvalidArgument(format!(
            "lookup {id} ('{}') is not a {expected} code",
            lookup.text_en
        )));
    }
    Ok(())
}

fn ensure_parent_dir(db_path: &str) -> Result<(), AppError> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    Lookup(LookupError),
    Validation(ValidationError),
    Date(DateParseError),
    Report(ReportError),
    Config(ConfigError),
    InvalidArgument(String),
    NotFound(String),
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Db(err) => write!(f, "database error: {}", err),
            AppError::Lookup(err) => write!(f, "{}", err),
            AppError::Validation(err) => write!(f, "validation error: {}", err),
            AppError::Date(err) => write!(f, "{}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
            AppError::Config(err) => write!(f, "{}", err),
            AppError::InvalidArgument(message) => write!(f, "{}", message),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Conflict(message) => write!(f, "{}", message),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Db(err) => Some(err),
            AppError::Lookup(err) => Some(err),
            AppError::Validation(err) => Some(err),
            AppError::Date(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::Config(err) => Some(err),
            AppError::InvalidArgument(_) | AppError::NotFound(_) | AppError::Conflict(_) => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<LookupError> for AppError {
    fn from(value: LookupError) -> Self {
        AppError::Lookup(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        AppError::Validation(value)
    }
}

impl From<DateParseError> for AppError {
    fn from(value: DateParseError) -> Self {
        AppError::Date(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        AppError::Report(value)
    }
}

impl From<DoctorError> for AppError {
    fn from(value: DoctorError) -> Self {
        match value {
            DoctorError::Db(err) => AppError::Db(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}
