use serde::Serialize;

use crate::dates::parse_date;
use crate::domain::record::Record;
use crate::domain::validation::{optional_max_len, required_max_len, ValidationError};

pub const MAX_ENGLISH_LEVEL: i64 = 5;

/// A registered member of the worker center, keyed by membership card.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Worker {
    #[serde(flatten)]
    pub record: Record,
    pub dwccardnum: i64,
    pub first_name: String,
    pub last_name: String,
    pub member_status: i64,
    pub date_of_membership: String,
    pub member_expiration_date: String,
    pub date_of_birth: Option<String>,
    pub type_of_work_id: i64,
    pub marital_status: Option<i64>,
    pub live_with_children: bool,
    pub homeless: bool,
    pub immigrant_refugee: bool,
    pub disabled: bool,
    pub race_id: Option<i64>,
    pub income_id: Option<i64>,
    pub gender_id: Option<i64>,
    pub english_level: i64,
    pub zipcode: Option<String>,
    pub skill1: Option<i64>,
    pub skill2: Option<i64>,
    pub skill3: Option<i64>,
}

impl Worker {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn skills(&self) -> impl Iterator<Item = i64> + '_ {
        [self.skill1, self.skill2, self.skill3].into_iter().flatten()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dwccardnum <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "dwccardnum",
                detail: "must be a positive card number".to_string(),
            });
        }
        required_max_len("first_name", &self.first_name, 50)?;
        required_max_len("last_name", &self.last_name, 50)?;
        optional_max_len("zipcode", self.zipcode.as_deref(), 10)?;
        if !(0..=MAX_ENGLISH_LEVEL).contains(&self.english_level) {
            return Err(ValidationError::OutOfRange {
                field: "english_level",
                detail: format!("must be between 0 and {MAX_ENGLISH_LEVEL}"),
            });
        }

        let joined = parse_date(&self.date_of_membership).map_err(|err| {
            ValidationError::OutOfRange {
                field: "date_of_membership",
                detail: err.to_string(),
            }
        })?;
        let expires = parse_date(&self.member_expiration_date).map_err(|err| {
            ValidationError::OutOfRange {
                field: "member_expiration_date",
                detail: err.to_string(),
            }
        })?;
        if expires < joined {
            return Err(ValidationError::OutOfRange {
                field: "member_expiration_date",
                detail: "must not precede the membership date".to_string(),
            });
        }
        if let Some(raw) = self.date_of_birth.as_deref() {
            parse_date(raw).map_err(|err| ValidationError::OutOfRange {
                field: "date_of_birth",
                detail: err.to_string(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_worker(dwccardnum: i64) -> Worker {
    Worker {
        record: Record::default(),
        dwccardnum,
        first_name: "Jose".to_string(),
        last_name: "Ramirez".to_string(),
        member_status: 1,
        date_of_membership: "2014-01-01".to_string(),
        member_expiration_date: "2015-01-01".to_string(),
        date_of_birth: Some("1980-06-15".to_string()),
        type_of_work_id: 20,
        marital_status: None,
        live_with_children: false,
        homeless: false,
        immigrant_refugee: false,
        disabled: false,
        race_id: None,
        income_id: None,
        gender_id: None,
        english_level: 2,
        zipcode: Some("98122".to_string()),
        skill1: Some(60),
        skill2: None,
        skill3: Some(61),
    }
}

#[cfg(test)]
mod tests {
    use super::sample_worker;
    use crate::domain::validation::ValidationError;

    #[test]
    fn sample_worker_is_valid() {
        assert!(sample_worker(30001).validate().is_ok());
    }

    #[test]
    fn rejects_expiration_before_membership() {
        let mut worker = sample_worker(30001);
        worker.member_expiration_date = "2013-12-31".to_string();
        let err = worker.validate().expect_err("expiration precedes membership");
        assert_eq!(err.field(), "member_expiration_date");
    }

    #[test]
    fn rejects_out_of_range_english_level_and_card() {
        let mut worker = sample_worker(30001);
        worker.english_level = 6;
        assert!(matches!(
            worker.validate(),
            Err(ValidationError::OutOfRange {
                field: "english_level",
                ..
            })
        ));

        let worker = sample_worker(0);
        assert_eq!(
            worker.validate().expect_err("zero card").field(),
            "dwccardnum"
        );
    }

    #[test]
    fn skills_skip_empty_slots() {
        let worker = sample_worker(30001);
        assert_eq!(worker.skills().collect::<Vec<_>>(), vec![60, 61]);
        assert_eq!(worker.full_name(), "Jose Ramirez");
    }
}
