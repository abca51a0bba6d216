use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::ReportError;

/// The basic row every report query produces: a day, a count and an
/// optional label (skill, activity, zip, band...).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportUnit {
    pub date: Option<String>,
    pub count: i64,
    pub info: Option<String>,
}

impl ReportUnit {
    pub fn dated(date: impl Into<String>, count: i64) -> Self {
        Self {
            date: Some(date.into()),
            count,
            info: None,
        }
    }

    pub fn labeled(info: impl Into<String>, count: i64) -> Self {
        Self {
            date: None,
            count,
            info: Some(info.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ZipUnit {
    pub date: String,
    pub zip: String,
    pub count: i64,
    pub info: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TypeOfDispatch {
    pub date: String,
    pub dwc_count: i64,
    pub dwc_requested: i64,
    pub hhh_count: i64,
    pub hhh_requested: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AverageWage {
    pub date: String,
    pub hours: i64,
    pub wages: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusUnit {
    pub date: String,
    pub active: i64,
    pub enrolled_on_date: i64,
    pub expired_on_date: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MemberDateModel {
    pub dwccardnum: i64,
    pub zip: Option<String>,
    pub membership_date: String,
    pub expiration_date: String,
}

impl MemberDateModel {
    /// Member at any point during `[start, end)`.
    pub fn active_during(&self, start: &str, end: &str) -> bool {
        self.expiration_date.as_str() >= start && self.membership_date.as_str() < end
    }

    pub fn joined_during(&self, start: &str, end: &str) -> bool {
        self.membership_date.as_str() >= start && self.membership_date.as_str() < end
    }

    pub fn has_zip(&self) -> bool {
        self.zip.as_deref().is_some_and(|zip| !zip.trim().is_empty())
    }
}

/// Active members per race on one day, keyed by the race's English text.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RaceUnit {
    pub date: String,
    pub counts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentFilter {
    All,
    Permanent,
    Temporary,
}

impl AssignmentFilter {
    pub(crate) fn permanent_flag(self) -> Option<bool> {
        match self {
            AssignmentFilter::All => None,
            AssignmentFilter::Permanent => Some(true),
            AssignmentFilter::Temporary => Some(false),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DailySumData {
    pub date: String,
    pub dwc_count: i64,
    pub dwc_requested: i64,
    pub hhh_count: i64,
    pub hhh_requested: i64,
    pub total_signins: i64,
    pub unique_signins: i64,
    pub cancelled_jobs: i64,
    pub total_assignments: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeeklySumData {
    pub day_of_week: String,
    pub date: String,
    pub total_signins: i64,
    pub num_jobs: i64,
    pub est_daily_hours: i64,
    pub est_payment: f64,
    pub hourly_wage: f64,
    pub top_jobs: Vec<ReportUnit>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DispatchData {
    pub date_start: String,
    pub date_end: String,
    pub total_signins: i64,
    pub unique_signins: i64,
    pub dispatched: i64,
    pub temp_dispatched: i64,
    pub permanent_placements: i64,
    pub undup_dispatched: i64,
    pub cancelled_assignments: i64,
    pub count_not_assigned: i64,
    pub total_hours: i64,
    pub total_income: f64,
    pub avg_income_per_hour: f64,
    pub skills: Vec<ReportUnit>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivityData {
    pub date: String,
    pub activity_name: String,
    pub attendance: i64,
    pub more_than_x_hours: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct WorkerData {
    pub date_start: String,
    pub date_end: String,
    pub active: i64,
    pub newly_enrolled: i64,
    pub people_who_left: i64,
    pub single_adults: i64,
    pub family_households: i64,
    pub new_single_adults: i64,
    pub new_family_households: i64,
    pub zip_completeness: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmployerModel {
    pub zip: String,
    pub jobs: i64,
    pub employers: i64,
    pub skills: Vec<ReportUnit>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClientProfile {
    pub begin: String,
    pub end: String,
    pub homeless: Vec<ReportUnit>,
    pub household_composition: Vec<ReportUnit>,
    pub income: Vec<ReportUnit>,
    pub age: Vec<ReportUnit>,
    pub gender: Vec<ReportUnit>,
    pub disability: Vec<ReportUnit>,
    pub race: Vec<RaceUnit>,
    pub refugee_immigrant: Vec<ReportUnit>,
    pub english_level: Vec<ReportUnit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Week,
    Month,
    Quarter,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Week, Period::Month, Period::Quarter, Period::Year];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            "quarter" | "quarterly" => Ok(Period::Quarter),
            "year" | "yearly" => Ok(Period::Year),
            _ => Err(ReportError::InvalidPeriod(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerReportType {
    Weekly,
    Monthly,
    Yearly,
}

impl FromStr for WorkerReportType {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "weekly" => Ok(WorkerReportType::Weekly),
            "monthly" => Ok(WorkerReportType::Monthly),
            "yearly" => Ok(WorkerReportType::Yearly),
            _ => Err(ReportError::InvalidReportType(value.to_string())),
        }
    }
}
