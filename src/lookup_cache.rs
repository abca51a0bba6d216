use std::error::Error;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::lookup::{category, member_status, order_status, Locale, Lookup};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Where the cache reads the reference table from on a (re)fill.
pub trait LookupSource {
    fn load_lookups(&self) -> Result<Vec<Lookup>, LookupError>;
}

#[derive(Debug)]
pub enum LookupError {
    Db(rusqlite::Error),
    Integrity(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Db(err) => write!(f, "database error: {}", err),
            LookupError::Integrity(message) => write!(f, "lookup integrity error: {}", message),
        }
    }
}

impl Error for LookupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LookupError::Db(err) => Some(err),
            LookupError::Integrity(_) => None,
        }
    }
}

impl From<rusqlite::Error> for LookupError {
    fn from(value: rusqlite::Error) -> Self {
        LookupError::Db(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MemberStatusIds {
    pub active: i64,
    pub inactive: i64,
    pub sanctioned: i64,
    pub expelled: i64,
    pub expired: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct OrderStatusIds {
    pub active: i64,
    pub pending: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub expired: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WorkTypeIds {
    pub dwc: i64,
    pub hhh: i64,
}

/// IDs the dispatch and report code compares against on every row.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WellKnownIds {
    pub member_status: MemberStatusIds,
    pub order_status: OrderStatusIds,
    pub work_type: WorkTypeIds,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkTypeKeys {
    pub dwc: String,
    pub hhh: String,
}

impl Default for WorkTypeKeys {
    fn default() -> Self {
        Self {
            dwc: "DWC".to_string(),
            hhh: "HHH".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupSnapshot {
    lookups: Vec<Lookup>,
    well_known: WellKnownIds,
    loaded_at: Instant,
}

impl LookupSnapshot {
    pub fn build(
        lookups: Vec<Lookup>,
        work_types: &WorkTypeKeys,
        loaded_at: Instant,
    ) -> Result<Self, LookupError> {
        let well_known = resolve_well_known(&lookups, work_types)?;
        Ok(Self {
            lookups,
            well_known,
            loaded_at,
        })
    }

    pub fn lookups(&self) -> &[Lookup] {
        &self.lookups
    }

    pub fn well_known(&self) -> &WellKnownIds {
        &self.well_known
    }

    pub fn age(&self) -> Duration {
        self.loaded_at.elapsed()
    }

    pub fn get(&self, id: i64) -> Result<&Lookup, LookupError> {
        self.lookups
            .iter()
            .find(|lookup| lookup.id == id)
            .ok_or_else(|| LookupError::Integrity(format!("Unable to find Lookup record {id}")))
    }

    pub fn get_by_skill_id(&self, skill_id: i64) -> Result<&Lookup, LookupError> {
        let lookup = self.get(skill_id)?;
        if lookup.category != category::SKILL {
            return Err(LookupError::Integrity(format!(
                "Lookup record {skill_id} is a '{}', not a skill",
                lookup.category
            )));
        }
        Ok(lookup)
    }

    pub fn is_specialized(&self, skill_id: i64) -> Result<bool, LookupError> {
        Ok(self.get_by_skill_id(skill_id)?.speciality)
    }

    pub fn by_id(&self, id: i64, locale: Locale) -> Result<&str, LookupError> {
        Ok(self.get(id)?.text(locale))
    }

    /// English text for an id, or the id itself when the row is gone.
    pub fn text_en_or_id(&self, id: i64) -> String {
        self.get(id)
            .map(|lookup| lookup.text_en.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    pub fn get_single_en(&self, category: &str, text: &str) -> Result<i64, LookupError> {
        single(
            self.lookups
                .iter()
                .filter(|lookup| lookup.category == category && lookup.text_en == text),
        )
        .ok_or_else(|| {
            LookupError::Integrity(format!(
                "Unable to Lookup Category: {category}, text: {text}"
            ))
        })
    }

    pub fn get_by_keys(&self, category: &str, key: &str) -> Result<i64, LookupError> {
        single(self.lookups.iter().filter(|lookup| {
            lookup.category == category && lookup.key.as_deref() == Some(key)
        }))
        .ok_or_else(|| {
            LookupError::Integrity(format!(
                "Unable to Lookup Category: {category}, key: {key}"
            ))
        })
    }

    pub fn skills_by_work_type(&self, work_type_id: i64) -> Vec<i64> {
        self.lookups
            .iter()
            .filter(|lookup| lookup.type_of_work_id == Some(work_type_id))
            .map(|lookup| lookup.id)
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Lookup> {
        let mut rows = self
            .lookups
            .iter()
            .filter(|lookup| lookup.category == category)
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        rows
    }

    /// Resolves user input against a category: a numeric id, a key, or the
    /// English/Spanish text, compared case-insensitively.
    pub fn resolve(&self, category: &str, raw: &str) -> Result<i64, LookupError> {
        let needle = raw.trim();
        if let Ok(id) = needle.parse::<i64>() {
            let lookup = self.get(id)?;
            if lookup.category == category {
                return Ok(id);
            }
            return Err(LookupError::Integrity(format!(
                "Lookup record {id} is not in category {category}"
            )));
        }
        let matches = |candidate: &str| candidate.eq_ignore_ascii_case(needle);
        self.lookups
            .iter()
            .filter(|lookup| lookup.category == category)
            .find(|lookup| {
                lookup.key.as_deref().is_some_and(matches)
                    || matches(&lookup.text_en)
                    || matches(&lookup.text_es)
            })
            .map(|lookup| lookup.id)
            .ok_or_else(|| {
                LookupError::Integrity(format!(
                    "Unable to Lookup Category: {category}, value: {needle}"
                ))
            })
    }
}

fn single<'a>(mut matches: impl Iterator<Item = &'a Lookup>) -> Option<i64> {
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.id)
}

fn resolve_well_known(
    lookups: &[Lookup],
    work_types: &WorkTypeKeys,
) -> Result<WellKnownIds, LookupError> {
    let by_key = |category: &str, key: &str| {
        single(
            lookups
                .iter()
                .filter(|lookup| lookup.category == category && lookup.key.as_deref() == Some(key)),
        )
        .ok_or_else(|| {
            LookupError::Integrity(format!(
                "Unable to Lookup Category: {category}, key: {key}"
            ))
        })
    };

    Ok(WellKnownIds {
        member_status: MemberStatusIds {
            active: by_key(category::MEMBER_STATUS, member_status::ACTIVE)?,
            inactive: by_key(category::MEMBER_STATUS, member_status::INACTIVE)?,
            sanctioned: by_key(category::MEMBER_STATUS, member_status::SANCTIONED)?,
            expelled: by_key(category::MEMBER_STATUS, member_status::EXPELLED)?,
            expired: by_key(category::MEMBER_STATUS, member_status::EXPIRED)?,
        },
        order_status: OrderStatusIds {
            active: by_key(category::ORDER_STATUS, order_status::ACTIVE)?,
            pending: by_key(category::ORDER_STATUS, order_status::PENDING)?,
            completed: by_key(category::ORDER_STATUS, order_status::COMPLETED)?,
            cancelled: by_key(category::ORDER_STATUS, order_status::CANCELLED)?,
            expired: by_key(category::ORDER_STATUS, order_status::EXPIRED)?,
        },
        work_type: WorkTypeIds {
            dwc: by_key(category::WORK_TYPE, &work_types.dwc)?,
            hhh: by_key(category::WORK_TYPE, &work_types.hhh)?,
        },
    })
}

/// Time-expiring read-through cache of the whole lookup table. The table is
/// small and changes rarely, so it is replaced wholesale on expiry.
#[derive(Debug)]
pub struct LookupCache {
    ttl: Duration,
    work_types: WorkTypeKeys,
    current: RwLock<Option<Arc<LookupSnapshot>>>,
}

impl LookupCache {
    pub fn new(ttl: Duration, work_types: WorkTypeKeys) -> Self {
        Self {
            ttl,
            work_types,
            current: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn snapshot(&self, source: &dyn LookupSource) -> Result<Arc<LookupSnapshot>, LookupError> {
        self.snapshot_at(source, Instant::now())
    }

    pub(crate) fn snapshot_at(
        &self,
        source: &dyn LookupSource,
        now: Instant,
    ) -> Result<Arc<LookupSnapshot>, LookupError> {
        {
            let guard = self
                .current
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(snapshot) = guard.as_ref() {
                if now.saturating_duration_since(snapshot.loaded_at) < self.ttl {
                    return Ok(Arc::clone(snapshot));
                }
                tracing::debug!(ttl_secs = self.ttl.as_secs(), "lookup cache expired");
            }
        }
        self.fill(source, now)
    }

    pub fn refresh(&self, source: &dyn LookupSource) -> Result<Arc<LookupSnapshot>, LookupError> {
        self.fill(source, Instant::now())
    }

    pub fn invalidate(&self) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }

    fn fill(
        &self,
        source: &dyn LookupSource,
        now: Instant,
    ) -> Result<Arc<LookupSnapshot>, LookupError> {
        let lookups = source.load_lookups()?;
        let count = lookups.len();
        let snapshot = Arc::new(LookupSnapshot::build(lookups, &self.work_types, now)?);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Arc::clone(&snapshot));
        tracing::info!(lookups = count, "lookup cache filled");
        Ok(snapshot)
    }
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, WorkTypeKeys::default())
    }
}

#[cfg(test)]
#[path = "lookup_cache_tests.rs"]
mod tests;
