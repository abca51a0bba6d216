use serde::Serialize;

use crate::dates::parse_datetime;
use crate::domain::record::Record;
use crate::domain::validation::{optional_max_len, ValidationError};

/// A worker's daily check-in at the center, keyed by membership card.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkerSignin {
    #[serde(flatten)]
    pub record: Record,
    pub dwccardnum: i64,
    pub date_for_signin: String,
    pub lottery_timestamp: Option<String>,
    pub work_assignment_id: Option<i64>,
}

impl WorkerSignin {
    pub fn signin_date(&self) -> &str {
        self.date_for_signin
            .get(..10)
            .unwrap_or(&self.date_for_signin)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Activity {
    #[serde(flatten)]
    pub record: Record,
    pub name_id: i64,
    pub date_start: String,
    pub date_end: String,
    pub teacher: Option<String>,
    pub notes: Option<String>,
}

impl Activity {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let start = parse_datetime(&self.date_start).map_err(|err| ValidationError::OutOfRange {
            field: "date_start",
            detail: err.to_string(),
        })?;
        let end = parse_datetime(&self.date_end).map_err(|err| ValidationError::OutOfRange {
            field: "date_end",
            detail: err.to_string(),
        })?;
        if end < start {
            return Err(ValidationError::OutOfRange {
                field: "date_end",
                detail: "must not precede date_start".to_string(),
            });
        }
        optional_max_len("teacher", self.teacher.as_deref(), 50)?;
        optional_max_len("notes", self.notes.as_deref(), 4000)
    }

    pub fn duration_minutes(&self) -> i64 {
        match (
            parse_datetime(&self.date_start),
            parse_datetime(&self.date_end),
        ) {
            (Ok(start), Ok(end)) => (end - start).whole_minutes(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivitySignin {
    #[serde(flatten)]
    pub record: Record,
    pub activity_id: i64,
    pub dwccardnum: i64,
    pub person_id: Option<i64>,
    pub date_for_signin: String,
}

/// Something that happened to a member: a sanction, a certification, a
/// status change, recorded with its event type lookup.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Event {
    #[serde(flatten)]
    pub record: Record,
    pub person_id: i64,
    pub event_type: i64,
    pub date_from: String,
    pub date_to: Option<String>,
    pub notes: Option<String>,
}

impl Event {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let from = parse_datetime(&self.date_from).map_err(|err| ValidationError::OutOfRange {
            field: "date_from",
            detail: err.to_string(),
        })?;
        if let Some(raw) = self.date_to.as_deref() {
            let to = parse_datetime(raw).map_err(|err| ValidationError::OutOfRange {
                field: "date_to",
                detail: err.to_string(),
            })?;
            if to < from {
                return Err(ValidationError::OutOfRange {
                    field: "date_to",
                    detail: "must not precede date_from".to_string(),
                });
            }
        }
        optional_max_len("notes", self.notes.as_deref(), 4000)
    }
}

#[cfg(test)]
mod tests {
    use super::{Activity, Event, WorkerSignin};
    use crate::domain::record::Record;

    fn activity(start: &str, end: &str) -> Activity {
        Activity {
            record: Record::default(),
            name_id: 90,
            date_start: start.to_string(),
            date_end: end.to_string(),
            teacher: Some("Maria".to_string()),
            notes: None,
        }
    }

    #[test]
    fn activity_duration_spans_hours_and_minutes() {
        let class = activity("2014-03-03 09:00", "2014-03-03 11:30");
        assert!(class.validate().is_ok());
        assert_eq!(class.duration_minutes(), 150);
    }

    #[test]
    fn activity_end_must_follow_start() {
        let class = activity("2014-03-03 11:00", "2014-03-03 09:00");
        assert_eq!(class.validate().expect_err("reversed").field(), "date_end");
    }

    #[test]
    fn event_without_end_is_open_ended() {
        let event = Event {
            record: Record::default(),
            person_id: 1,
            event_type: 70,
            date_from: "2014-03-03".to_string(),
            date_to: None,
            notes: Some("warning issued".to_string()),
        };
        assert!(event.validate().is_ok());

        let reversed = Event {
            date_to: Some("2014-03-01".to_string()),
            ..event
        };
        assert_eq!(reversed.validate().expect_err("reversed").field(), "date_to");
    }

    #[test]
    fn signin_date_truncates_time() {
        let signin = WorkerSignin {
            record: Record::default(),
            dwccardnum: 30001,
            date_for_signin: "2014-03-03 07:15:00".to_string(),
            lottery_timestamp: None,
            work_assignment_id: None,
        };
        assert_eq!(signin.signin_date(), "2014-03-03");
    }
}
