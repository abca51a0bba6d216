use serde::Serialize;

use crate::dates::now_utc_rfc3339;
use crate::domain::validation::{max_len, required, ValidationError};

pub const MAX_USER_LEN: usize = 30;

/// Audit bookkeeping shared by every persisted entity.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: String,
    pub updated_by: String,
}

impl Record {
    pub fn created_by(user: &str) -> Result<Self, ValidationError> {
        let mut record = Record::default();
        record.stamp_created(user)?;
        Ok(record)
    }

    pub fn stamp_created(&mut self, user: &str) -> Result<(), ValidationError> {
        validate_user(user)?;
        self.created_at = now_utc_rfc3339();
        self.created_by = user.trim().to_string();
        self.stamp_updated(user)
    }

    pub fn stamp_updated(&mut self, user: &str) -> Result<(), ValidationError> {
        validate_user(user)?;
        self.updated_at = now_utc_rfc3339();
        self.updated_by = user.trim().to_string();
        Ok(())
    }

    pub fn id_prefix(&self, prefix: &str) -> String {
        format!("{}{}-", prefix, self.id)
    }
}

pub fn validate_user(user: &str) -> Result<(), ValidationError> {
    required("user", user)?;
    max_len("user", user.trim(), MAX_USER_LEN)
}
