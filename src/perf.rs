use std::error::Error;
use std::fmt;
use std::time::Instant;

use serde::Serialize;
use time::macros::date;
use time::Date;
use uuid::Uuid;

use crate::app::{App, AppError, NewAssignment};
use crate::config::Config;
use crate::dates::{add_days, format_date};
use crate::domain::attendance::Activity;
use crate::domain::lookup::category;
use crate::domain::record::Record;
use crate::domain::work_order::WorkOrder;
use crate::domain::worker::Worker;
use crate::reports::ReportError;

const PERF_WORKERS: i64 = 60;
const PERF_DAYS: i64 = 14;
const ORDERS_PER_DAY: i64 = 4;
const SLOTS_PER_ORDER: i64 = 3;
const FIRST_DAY: Date = date!(2024 - 03 - 01);
const FIRST_CARD: i64 = 40_000;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PerfMeasurement {
    pub name: String,
    pub elapsed_ms: f64,
    pub budget_ms: f64,
    pub within_budget: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PerfReport {
    pub iterations: u32,
    pub measurements: Vec<PerfMeasurement>,
}

impl PerfReport {
    pub fn over_budget_count(&self) -> usize {
        self.measurements
            .iter()
            .filter(|m| !m.within_budget)
            .count()
    }
}

#[derive(Debug)]
pub enum PerfError {
    App(AppError),
    Report(ReportError),
}

impl fmt::Display for PerfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerfError::App(err) => write!(f, "perf seeding failed: {}", err),
            PerfError::Report(err) => write!(f, "perf report failed: {}", err),
        }
    }
}

impl Error for PerfError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PerfError::App(err) => Some(err),
            PerfError::Report(err) => Some(err),
        }
    }
}

impl From<AppError> for PerfError {
    fn from(value: AppError) -> Self {
        PerfError::App(value)
    }
}

impl From<ReportError> for PerfError {
    fn from(value: ReportError) -> Self {
        PerfError::Report(value)
    }
}

/// Seeds a throwaway database and times the heavier report composers
/// against it.
pub fn run_perf_harness(iterations: u32) -> Result<PerfReport, PerfError> {
    let iterations = iterations.max(1);
    let db_path = std::env::temp_dir()
        .join(format!("machete-perf-{}.sqlite", Uuid::now_v7()))
        .display()
        .to_string();
    let result = measure(&db_path, iterations);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{db_path}{suffix}"));
    }
    result
}

fn measure(db_path: &str, iterations: u32) -> Result<PerfReport, PerfError> {
    let app = App::open(db_path, Config::default(), "perf")?;
    app.seed_lookups()?;
    let seed_start = Instant::now();
    seed_synthetic_data(&app)?;
    tracing::info!(
        workers = PERF_WORKERS,
        days = PERF_DAYS,
        elapsed_ms = seed_start.elapsed().as_secs_f64() * 1000.0,
        "seeded perf database"
    );

    let reports = app.reports()?;
    let last_day = add_days(FIRST_DAY, PERF_DAYS - 1);
    let daily = time_avg(iterations, || reports.daily_summary(last_day).map(drop))?;
    let dispatch = time_avg(iterations, || {
        reports.dispatch_summary(FIRST_DAY, last_day).map(drop)
    })?;
    let workers = time_avg(iterations, || {
        reports.worker_report(FIRST_DAY, last_day, "monthly").map(drop)
    })?;

    Ok(PerfReport {
        iterations,
        measurements: vec![
            measurement("daily_summary_avg", daily, 50.0),
            measurement("dispatch_summary_avg", dispatch, 400.0),
            measurement("worker_report_avg", workers, 400.0),
        ],
    })
}

fn time_avg(
    iterations: u32,
    mut run: impl FnMut() -> Result<(), ReportError>,
) -> Result<f64, PerfError> {
    let start = Instant::now();
    for _ in 0..iterations {
        run()?;
    }
    Ok((start.elapsed().as_secs_f64() * 1000.0) / iterations as f64)
}

fn seed_synthetic_data(app: &App) -> Result<(), PerfError> {
    let snapshot = app.lookups()?;
    let ids = *snapshot.well_known();
    let skills = snapshot.skills_by_work_type(ids.work_type.dwc);
    let transport = snapshot
        .by_category(category::TRANSPORT_METHOD)
        .first()
        .map(|lookup| lookup.id)
        .ok_or_else(|| AppError::NotFound("transport method lookup".to_string()))?;
    let activity_name = snapshot
        .by_category(category::ACTIVITY_NAME)
        .first()
        .map(|lookup| lookup.id)
        .ok_or_else(|| AppError::NotFound("activity name lookup".to_string()))?;
    let completed = ids.order_status.completed;

    for offset in 0..PERF_WORKERS {
        app.create_worker(synthetic_worker(
            FIRST_CARD + offset,
            ids.member_status.active,
            ids.work_type.dwc,
            skills.get(offset as usize % skills.len().max(1)).copied(),
        ))?;
    }
    let employer = app.create_employer("Perf Landscaping", None, Some("98122"))?;

    for day_offset in 0..PERF_DAYS {
        let day = format_date(add_days(FIRST_DAY, day_offset));
        for card in FIRST_CARD..FIRST_CARD + PERF_WORKERS {
            if (card + day_offset) % 3 != 0 {
                app.sign_in(card, Some(&format!("{day} 07:{:02}:00", card % 60)))?;
            }
        }

        let mut next_card = FIRST_CARD;
        for order_index in 0..ORDERS_PER_DAY {
            let order = app.create_work_order(synthetic_order(
                employer.record.id,
                completed,
                ids.work_type.dwc,
                transport,
                &format!("{day} 09:00:00"),
                order_index == 0,
            ))?;
            for slot in 0..SLOTS_PER_ORDER {
                let assignment = app.create_assignment(NewAssignment {
                    work_order_id: order.record.id,
                    skill_id: skills.get(slot as usize % skills.len().max(1)).copied().unwrap_or(0),
                    hours: 4 + slot,
                    hourly_wage: 15.0 + slot as f64,
                    description: None,
                })?;
                while (next_card + day_offset) % 3 == 0 {
                    next_card += 1;
                }
                app.dispatch(assignment.record.id, next_card, false)?;
                next_card += 1;
            }
        }

        let activity = app.create_activity(Activity {
            record: Record::default(),
            name_id: activity_name,
            date_start: format!("{day} 18:00:00"),
            date_end: format!("{day} 20:00:00"),
            teacher: None,
            notes: None,
        })?;
        for card in (FIRST_CARD..FIRST_CARD + PERF_WORKERS).step_by(4) {
            app.activity_signin(activity.record.id, card, None)?;
        }
    }
    Ok(())
}

fn synthetic_worker(dwccardnum: i64, status: i64, work_type: i64, skill: Option<i64>) -> Worker {
    Worker {
        record: Record::default(),
        dwccardnum,
        first_name: "Perf".to_string(),
        last_name: format!("Worker {dwccardnum}"),
        member_status: status,
        date_of_membership: "2023-06-01".to_string(),
        member_expiration_date: "2025-06-01".to_string(),
        date_of_birth: Some("1985-01-01".to_string()),
        type_of_work_id: work_type,
        marital_status: None,
        live_with_children: dwccardnum % 2 == 0,
        homeless: dwccardnum % 5 == 0,
        immigrant_refugee: dwccardnum % 7 == 0,
        disabled: false,
        race_id: None,
        income_id: None,
        gender_id: None,
        english_level: dwccardnum % 6,
        zipcode: Some(format!("981{:02}", dwccardnum % 50)),
        skill1: skill,
        skill2: None,
        skill3: None,
    }
}

fn synthetic_order(
    employer_id: i64,
    status: i64,
    work_type: i64,
    transport: i64,
    when: &str,
    permanent: bool,
) -> WorkOrder {
    WorkOrder {
        record: Record::default(),
        employer_id,
        paper_order_num: None,
        contact_name: "Perf Contact".to_string(),
        status,
        work_site_address1: "100 Perf Way".to_string(),
        work_site_address2: None,
        city: "Seattle".to_string(),
        state: "WA".to_string(),
        phone: "206-555-0199".to_string(),
        zipcode: "98144".to_string(),
        type_of_work_id: work_type,
        english_required: false,
        english_required_note: None,
        lunch_supplied: false,
        permanent_placement: permanent,
        transport_method_id: transport,
        transport_fee: 0.0,
        transport_fee_extra: 0.0,
        description: None,
        date_time_of_work: when.to_string(),
        time_flexible: false,
    }
}

fn measurement(name: &str, elapsed_ms: f64, budget_ms: f64) -> PerfMeasurement {
    PerfMeasurement {
        name: name.to_string(),
        elapsed_ms,
        budget_ms,
        within_budget: elapsed_ms <= budget_ms,
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::{run_perf_harness, PerfError, PerfMeasurement, PerfReport};
    use crate::app::AppError;
    use crate::reports::ReportError;

    #[test]
    fn produces_measurements() {
        let report = run_perf_harness(1).expect("perf harness should run");
        assert_eq!(report.iterations, 1);
        assert_eq!(report.measurements.len(), 3);
        assert!(report
            .measurements
            .iter()
            .all(|measurement| measurement.elapsed_ms >= 0.0));
    }

    #[test]
    fn over_budget_and_error_helpers_cover_edge_paths() {
        let report = PerfReport {
            iterations: 1,
            measurements: vec![
                PerfMeasurement {
                    name: "ok".to_string(),
                    elapsed_ms: 1.0,
                    budget_ms: 2.0,
                    within_budget: true,
                },
                PerfMeasurement {
                    name: "slow".to_string(),
                    elapsed_ms: 3.0,
                    budget_ms: 2.0,
                    within_budget: false,
                },
            ],
        };
        assert_eq!(report.over_budget_count(), 1);

        let app_err: PerfError = AppError::NotFound("employer 1".to_string()).into();
        assert_eq!(app_err.to_string(), "perf seeding failed: employer 1 not found");
        assert!(app_err.source().is_some());

        let report_err: PerfError = ReportError::InvalidPeriod("fortnight".to_string()).into();
        assert!(report_err.to_string().starts_with("perf report failed"));
        assert!(report_err.source().is_some());
    }
}
