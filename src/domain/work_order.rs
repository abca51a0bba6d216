use serde::Serialize;

use crate::dates::parse_datetime;
use crate::domain::record::Record;
use crate::domain::validation::{max_len, optional_max_len, required_max_len, ValidationError};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Employer {
    #[serde(flatten)]
    pub record: Record,
    pub name: String,
    pub phone: Option<String>,
    pub zipcode: Option<String>,
}

impl Employer {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required_max_len("name", &self.name, 50)?;
        optional_max_len("phone", self.phone.as_deref(), 12)?;
        optional_max_len("zipcode", self.zipcode.as_deref(), 10)
    }
}

/// A job request from an employer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkOrder {
    #[serde(flatten)]
    pub record: Record,
    pub employer_id: i64,
    pub paper_order_num: Option<i64>,
    pub contact_name: String,
    pub status: i64,
    pub work_site_address1: String,
    pub work_site_address2: Option<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub zipcode: String,
    pub type_of_work_id: i64,
    pub english_required: bool,
    pub english_required_note: Option<String>,
    pub lunch_supplied: bool,
    pub permanent_placement: bool,
    pub transport_method_id: i64,
    pub transport_fee: f64,
    pub transport_fee_extra: f64,
    pub description: Option<String>,
    pub date_time_of_work: String,
    pub time_flexible: bool,
}

impl WorkOrder {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required_max_len("contact_name", &self.contact_name, 50)?;
        required_max_len("work_site_address1", &self.work_site_address1, 50)?;
        optional_max_len(
            "work_site_address2",
            self.work_site_address2.as_deref(),
            50,
        )?;
        required_max_len("city", &self.city, 50)?;
        required_max_len("state", &self.state, 2)?;
        required_max_len("phone", &self.phone, 12)?;
        required_max_len("zipcode", &self.zipcode, 10)?;
        optional_max_len(
            "english_required_note",
            self.english_required_note.as_deref(),
            100,
        )?;
        if let Some(description) = self.description.as_deref() {
            max_len("description", description, 4000)?;
        }
        if self.transport_fee < 0.0 || self.transport_fee_extra < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "transport_fee",
                detail: "must not be negative".to_string(),
            });
        }
        parse_datetime(&self.date_time_of_work).map_err(|err| ValidationError::OutOfRange {
            field: "date_time_of_work",
            detail: err.to_string(),
        })?;
        Ok(())
    }

    /// The day portion of the scheduled work time.
    pub fn work_date(&self) -> &str {
        self.date_time_of_work
            .get(..10)
            .unwrap_or(&self.date_time_of_work)
    }
}

/// One worker slot on a work order; `worker_assigned_id` is set on dispatch.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkAssignment {
    #[serde(flatten)]
    pub record: Record,
    pub work_order_id: i64,
    pub worker_assigned_id: Option<i64>,
    pub worker_signin_id: Option<i64>,
    pub skill_id: i64,
    pub hours: i64,
    pub hourly_wage: f64,
    pub description: Option<String>,
}

impl WorkAssignment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hours < 0 {
            return Err(ValidationError::OutOfRange {
                field: "hours",
                detail: "must not be negative".to_string(),
            });
        }
        if self.hourly_wage < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "hourly_wage",
                detail: "must not be negative".to_string(),
            });
        }
        optional_max_len("description", self.description.as_deref(), 1000)
    }

    pub fn is_assigned(&self) -> bool {
        self.worker_assigned_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkerRequest {
    #[serde(flatten)]
    pub record: Record,
    pub work_order_id: i64,
    pub worker_id: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkOrderSummary {
    pub date: String,
    pub status: i64,
    pub count: i64,
}

#[cfg(test)]
pub(crate) fn sample_order(employer_id: i64, status: i64, when: &str) -> WorkOrder {
    WorkOrder {
        record: Record::default(),
        employer_id,
        paper_order_num: None,
        contact_name: "Ann Smith".to_string(),
        status,
        work_site_address1: "1 Main St".to_string(),
        work_site_address2: None,
        city: "Seattle".to_string(),
        state: "WA".to_string(),
        phone: "206-555-0100".to_string(),
        zipcode: "98122".to_string(),
        type_of_work_id: 20,
        english_required: false,
        english_required_note: None,
        lunch_supplied: false,
        permanent_placement: false,
        transport_method_id: 30,
        transport_fee: 0.0,
        transport_fee_extra: 0.0,
        description: None,
        date_time_of_work: when.to_string(),
        time_flexible: false,
    }
}
