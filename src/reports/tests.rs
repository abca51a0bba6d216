use std::sync::Arc;

use time::macros::date;

use super::units::AssignmentFilter;
use super::{date_range, parse_range, round2, Period, ReportError, ReportService, ReportUnit};
use crate::db;
use crate::domain::attendance::{Activity, ActivitySignin, WorkerSignin};
use crate::domain::work_order::{sample_order, Employer, WorkAssignment, WorkerRequest};
use crate::domain::worker::{sample_worker, Worker};
use crate::lookup_cache::{LookupCache, LookupSnapshot};
use crate::test_support::{record, TempDb};

const COMPLETED: i64 = 12;
const CANCELLED: i64 = 13;

struct Fixture {
    db: TempDb,
    lookups: Arc<LookupSnapshot>,
}

impl Fixture {
    fn new(label: &str) -> Self {
        let db = TempDb::seeded(label);
        let lookups = LookupCache::default()
            .snapshot(&db.conn)
            .expect("seeded lookups load");
        Self { db, lookups }
    }

    fn reports(&self, rockstar_minutes: i64) -> ReportService<'_> {
        ReportService::new(&self.db.conn, Arc::clone(&self.lookups), rockstar_minutes)
    }

    fn worker(&self, card: i64, joined: &str, expires: &str, edit: impl FnOnce(&mut Worker)) -> i64 {
        let mut worker = sample_worker(card);
        worker.record = record("tester");
        worker.date_of_membership = joined.to_string();
        worker.member_expiration_date = expires.to_string();
        edit(&mut worker);
        db::insert_worker(&self.db.conn, &worker).expect("worker insert")
    }

    fn employer(&self, name: &str) -> i64 {
        db::insert_employer(
            &self.db.conn,
            &Employer {
                record: record("tester"),
                name: name.to_string(),
                phone: None,
                zipcode: Some("98101".to_string()),
            },
        )
        .expect("employer insert")
    }

    fn order(&self, employer_id: i64, status: i64, when: &str, zip: &str, permanent: bool) -> i64 {
        let mut order = sample_order(employer_id, status, when);
        order.record = record("tester");
        order.zipcode = zip.to_string();
        order.permanent_placement = permanent;
        db::insert_work_order(&self.db.conn, &order).expect("order insert")
    }

    fn assignment(&self, order_id: i64, worker_id: Option<i64>, skill_id: i64, hours: i64, wage: f64) {
        db::insert_assignment(
            &self.db.conn,
            &WorkAssignment {
                record: record("tester"),
                work_order_id: order_id,
                worker_assigned_id: worker_id,
                worker_signin_id: None,
                skill_id,
                hours,
                hourly_wage: wage,
                description: None,
            },
        )
        .expect("assignment insert");
    }

    fn signin(&self, card: i64, when: &str) {
        db::insert_worker_signin(
            &self.db.conn,
            &WorkerSignin {
                record: record("tester"),
                dwccardnum: card,
                date_for_signin: when.to_string(),
                lottery_timestamp: None,
                work_assignment_id: None,
            },
        )
        .expect("signin insert");
    }

    fn activity(&self, name_id: i64, start: &str, end: &str) -> i64 {
        db::insert_activity(
            &self.db.conn,
            &Activity {
                record: record("tester"),
                name_id,
                date_start: start.to_string(),
                date_end: end.to_string(),
                teacher: None,
                notes: None,
            },
        )
        .expect("activity insert")
    }

    fn attend(&self, activity_id: i64, card: i64, person_id: Option<i64>, when: &str) {
        db::insert_activity_signin(
            &self.db.conn,
            &ActivitySignin {
                record: record("tester"),
                activity_id,
                dwccardnum: card,
                person_id,
                date_for_signin: when.to_string(),
            },
        )
        .expect("activity signin insert");
    }
}

/// Three members, two days of dispatch and a few classes around
/// 2024-03-10 and 2024-03-11.
fn seeded(label: &str) -> Fixture {
    let fixture = Fixture::new(label);

    let w1 = fixture.worker(101, "2024-01-01", "2025-01-01", |w| {
        w.marital_status = Some(40);
        w.zipcode = Some("98122".to_string());
        w.homeless = true;
        w.gender_id = Some(80);
        w.income_id = Some(70);
        w.english_level = 2;
        w.race_id = Some(54);
    });
    let w2 = fixture.worker(102, "2024-03-10", "2025-03-10", |w| {
        w.type_of_work_id = 21;
        w.marital_status = Some(41);
        w.live_with_children = true;
        w.immigrant_refugee = true;
        w.disabled = true;
        w.gender_id = Some(81);
        w.income_id = Some(71);
        w.english_level = 3;
        w.race_id = Some(54);
        w.date_of_birth = None;
        w.zipcode = None;
    });
    fixture.worker(103, "2023-01-01", "2024-03-10", |w| {
        w.zipcode = Some("98144".to_string());
        w.income_id = Some(73);
        w.english_level = 2;
        w.race_id = Some(50);
        w.date_of_birth = Some("1900-01-01".to_string());
    });

    fixture.signin(101, "2024-03-10 08:00:00");
    fixture.signin(102, "2024-03-10 09:00:00");
    fixture.signin(101, "2024-03-11 08:00:00");
    fixture.signin(103, "2024-03-11 07:30:00");

    let acme = fixture.employer("Acme");
    let bolt = fixture.employer("Bolt");

    let o1 = fixture.order(acme, COMPLETED, "2024-03-10 09:00:00", "98122", false);
    fixture.assignment(o1, Some(w1), 60, 4, 20.0);
    fixture.assignment(o1, Some(w2), 61, 3, 25.5);
    fixture.assignment(o1, None, 60, 2, 18.0);
    db::insert_worker_request(
        &fixture.db.conn,
        &WorkerRequest {
            record: record("tester"),
            work_order_id: o1,
            worker_id: w2,
        },
    )
    .expect("request insert");

    let o2 = fixture.order(bolt, COMPLETED, "2024-03-11 10:00:00", "98144", true);
    fixture.assignment(o2, Some(w1), 63, 8, 30.0);

    let o3 = fixture.order(acme, CANCELLED, "2024-03-11 12:00:00", "98122", false);
    fixture.assignment(o3, None, 60, 5, 20.0);

    let english_mon = fixture.activity(90, "2024-03-10 18:00:00", "2024-03-10 20:00:00");
    fixture.attend(english_mon, 101, Some(w1), "2024-03-10 18:00:00");
    fixture.attend(english_mon, 102, Some(w2), "2024-03-10 18:00:00");
    fixture.attend(english_mon, 999, None, "2024-03-10 18:00:00");
    let english_tue = fixture.activity(90, "2024-03-11 18:00:00", "2024-03-11 23:00:00");
    fixture.attend(english_tue, 101, Some(w1), "2024-03-11 18:00:00");
    let computers = fixture.activity(91, "2024-03-11 09:00:00", "2024-03-11 10:00:00");
    fixture.attend(computers, 102, Some(w2), "2024-03-11 09:00:00");

    fixture
}

fn dated(units: &[ReportUnit]) -> Vec<(&str, i64)> {
    units
        .iter()
        .map(|unit| (unit.date.as_deref().unwrap_or(""), unit.count))
        .collect()
}

fn labeled(units: &[ReportUnit]) -> Vec<(&str, i64)> {
    units
        .iter()
        .map(|unit| (unit.info.as_deref().unwrap_or(""), unit.count))
        .collect()
}

#[test]
fn date_range_is_inclusive_and_rejects_reversed_bounds() {
    let days = date_range(date!(2024 - 02 - 28), date!(2024 - 03 - 01)).expect("range");
    assert_eq!(days.len(), 3);
    assert_eq!(days[1], date!(2024 - 02 - 29));

    let err = date_range(date!(2024 - 03 - 02), date!(2024 - 03 - 01)).expect_err("reversed");
    assert!(matches!(err, ReportError::InvalidRange { .. }));
    assert_eq!(err.to_string(), "begin date 2024-03-02 is after end date 2024-03-01");

    assert!(parse_range("2024-03-01", "2024-03-05").is_ok());
    assert!(matches!(
        parse_range("2024-03-01", "not-a-date"),
        Err(ReportError::Date(_))
    ));
}

#[test]
fn rounding_goes_half_away_from_zero() {
    assert_eq!(round2(0.125), 0.13);
    assert_eq!(round2(-0.125), -0.13);
    assert_eq!(round2(21.388_888), 21.39);
}

#[test]
fn signin_counts_and_first_ever_signins() {
    let seeded = seeded("report-signins");
    let reports = seeded.reports(720);

    let signins = reports.count_signins().expect("signins");
    assert_eq!(dated(&signins), vec![("2024-03-10", 2), ("2024-03-11", 2)]);

    let range = date_range(date!(2024 - 03 - 10), date!(2024 - 03 - 12)).expect("range");
    let unique = reports.count_unique_signins(&range).expect("unique");
    assert_eq!(
        dated(&unique),
        vec![("2024-03-10", 2), ("2024-03-11", 1), ("2024-03-12", 0)]
    );
}

#[test]
fn assignment_counts_respect_placement_filter() {
    let seeded = seeded("report-assignments");
    let reports = seeded.reports(720);

    let all = reports.count_assignments(AssignmentFilter::All).expect("all");
    assert_eq!(dated(&all), vec![("2024-03-10", 2), ("2024-03-11", 1)]);
    let permanent = reports
        .count_assignments(AssignmentFilter::Permanent)
        .expect("permanent");
    assert_eq!(dated(&permanent), vec![("2024-03-11", 1)]);
    let temporary = reports
        .count_assignments(AssignmentFilter::Temporary)
        .expect("temporary");
    assert_eq!(dated(&temporary), vec![("2024-03-10", 2)]);

    let range = date_range(date!(2024 - 03 - 10), date!(2024 - 03 - 11)).expect("range");
    let undup = reports.count_unduplicated_assignments(&range).expect("undup");
    assert_eq!(dated(&undup), vec![("2024-03-10", 2), ("2024-03-11", 0)]);

    let later = date_range(date!(2024 - 03 - 11), date!(2024 - 03 - 11)).expect("range");
    let undup_later = reports.count_unduplicated_assignments(&later).expect("undup");
    assert_eq!(dated(&undup_later), vec![("2024-03-11", 1)]);
}

#[test]
fn open_slots_and_cancellations_by_order_status() {
    let seeded = seeded("report-open-slots");
    let reports = seeded.reports(720);

    let completed = reports.count_not_assigned("Completed").expect("completed");
    assert_eq!(dated(&completed), vec![("2024-03-10", 1)]);
    let cancelled = reports.count_not_assigned("Cancelled").expect("cancelled");
    assert_eq!(dated(&cancelled), vec![("2024-03-11", 1)]);
    assert_eq!(
        dated(&reports.count_cancelled().expect("cancelled orders")),
        vec![("2024-03-11", 1)]
    );

    let err = reports.count_not_assigned("Archived").expect_err("unknown key");
    assert_eq!(
        err.to_string(),
        "lookup integrity error: Unable to Lookup Category: orderstatus, key: Archived"
    );
}

#[test]
fn type_of_dispatch_splits_programs_and_requests() {
    let seeded = seeded("report-type-of-dispatch");
    let reports = seeded.reports(720);

    let rows = reports.count_type_of_dispatch().expect("dispatch types");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2024-03-10");
    assert_eq!(
        (rows[0].dwc_count, rows[0].dwc_requested, rows[0].hhh_count, rows[0].hhh_requested),
        (1, 0, 1, 1)
    );
    assert_eq!(
        (rows[1].dwc_count, rows[1].dwc_requested, rows[1].hhh_count, rows[1].hhh_requested),
        (1, 0, 0, 0)
    );
}

#[test]
fn wage_average_rounds_to_cents() {
    let seeded = seeded("report-wages");
    let reports = seeded.reports(720);

    let rows = reports.hourly_wage_average().expect("wages");
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].hours, rows[0].wages, rows[0].avg), (9, 192.5, 21.39));
    assert_eq!((rows[1].hours, rows[1].wages, rows[1].avg), (13, 340.0, 26.15));
}

#[test]
fn job_listings_label_skills_and_zips() {
    let seeded = seeded("report-jobs");
    let reports = seeded.reports(720);

    let jobs = reports.list_jobs().expect("jobs");
    let first_day: Vec<_> = jobs
        .iter()
        .filter(|unit| unit.date.as_deref() == Some("2024-03-10"))
        .collect();
    assert_eq!(first_day[0].info.as_deref(), Some("General labor"));
    assert_eq!(first_day[0].count, 2);
    assert_eq!(first_day[1].info.as_deref(), Some("Carpentry"));

    let by_zip = reports.list_jobs_by_zip().expect("jobs by zip");
    assert_eq!(by_zip.len(), 3);
    assert!(by_zip.iter().all(|unit| unit.count == 1));
    assert!(by_zip
        .iter()
        .any(|unit| unit.zip == "98144" && unit.info == "Landscaping"));

    let orders = reports.list_orders_by_zip().expect("orders by zip");
    assert_eq!(labeled(&orders), vec![("98122", 1), ("98144", 1)]);
}

#[test]
fn activity_attendance_skips_unregistered_cards() {
    let seeded = seeded("report-activities");
    let reports = seeded.reports(720);

    let rows = reports.activity_signins().expect("activity signins");
    let summary: Vec<_> = rows
        .iter()
        .map(|unit| (unit.date.as_deref().unwrap_or(""), unit.info.as_deref().unwrap_or(""), unit.count))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2024-03-10", "English class", 2),
            ("2024-03-11", "English class", 1),
            ("2024-03-11", "Computer class", 1),
        ]
    );

    let range = date_range(date!(2024 - 03 - 10), date!(2024 - 03 - 11)).expect("range");
    let unique = reports.unique_activity_signins(&range, None).expect("unique");
    assert_eq!(dated(&unique), vec![("2024-03-10", 2), ("2024-03-11", 0)]);
    let computers = reports
        .unique_activity_signins(&range, Some(91))
        .expect("unique computers");
    assert_eq!(dated(&computers), vec![("2024-03-10", 0), ("2024-03-11", 1)]);
}

#[test]
fn rockstars_are_dated_at_their_last_class() {
    let seeded = seeded("report-rockstars");
    let reports = seeded.reports(720);

    let range = date_range(date!(2024 - 03 - 10), date!(2024 - 03 - 11)).expect("range");
    let stars = reports.activity_rockstars(&range, &[90], 400).expect("rockstars");
    assert_eq!(dated(&stars), vec![("2024-03-10", 0), ("2024-03-11", 1)]);
    assert!(stars
        .iter()
        .all(|unit| unit.info.as_deref() == Some("English class")));

    let both = reports
        .activity_rockstars(&range, &[90, 91], 480)
        .expect("rockstars across classes");
    assert_eq!(dated(&both), vec![("2024-03-10", 0), ("2024-03-11", 0)]);
    assert_eq!(both[0].info.as_deref(), Some("English class, Computer class"));
}

#[test]
fn member_status_counts_active_enrolled_and_expired() {
    let seeded = seeded("report-member-status");
    let reports = seeded.reports(720);

    let range = date_range(date!(2024 - 03 - 09), date!(2024 - 03 - 11)).expect("range");
    let rows = reports.member_status_by_date(&range).expect("status");
    let summary: Vec<_> = rows
        .iter()
        .map(|row| (row.date.as_str(), row.active, row.enrolled_on_date, row.expired_on_date))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2024-03-09", 2, 0, 0),
            ("2024-03-10", 1, 1, 1),
            ("2024-03-11", 2, 0, 0),
        ]
    );
}

#[test]
fn household_models_split_singles_and_families() {
    let seeded = seeded("report-households");
    let reports = seeded.reports(720);

    let singles: Vec<i64> = reports
        .single_adults()
        .expect("singles")
        .iter()
        .map(|member| member.dwccardnum)
        .collect();
    assert_eq!(singles, vec![101, 103]);

    let families = reports.family_households().expect("families");
    assert_eq!(families.len(), 1);
    assert_eq!(families[0].dwccardnum, 102);
    assert!(!families[0].has_zip());
}

#[test]
fn client_profile_breaks_down_demographics() {
    let seeded = seeded("report-profile");
    let reports = seeded.reports(720);

    let profile = reports
        .client_profile(date!(2024 - 03 - 09), date!(2024 - 03 - 11))
        .expect("profile");
    assert_eq!(profile.begin, "2024-03-09");
    assert_eq!(
        labeled(&profile.household_composition),
        vec![("Married, With Children", 1), ("Single, Without Children", 1)]
    );
    assert_eq!(
        labeled(&profile.income),
        vec![
            ("Moderate (> 50% median)", 1),
            ("Unknown", 1),
            ("Very low (< 30% median)", 1),
        ]
    );
    assert_eq!(
        labeled(&profile.age),
        vec![("30 to 45 years", 1), ("Unknown", 2)]
    );
    assert_eq!(labeled(&profile.gender), vec![("Male", 1), ("Female", 1)]);
    assert_eq!(labeled(&profile.disability), vec![("No", 2), ("Yes", 1)]);
    assert_eq!(
        labeled(&profile.english_level),
        vec![("English 2", 2), ("English 3", 1)]
    );
    assert_eq!(
        dated(&profile.homeless),
        vec![("2024-03-09", 1), ("2024-03-10", 1), ("2024-03-11", 1)]
    );
    assert_eq!(
        dated(&profile.refugee_immigrant),
        vec![("2024-03-09", 0), ("2024-03-10", 1), ("2024-03-11", 1)]
    );

    assert_eq!(profile.race.len(), 3);
    assert_eq!(profile.race[0].counts.len(), 7);
    assert_eq!(profile.race[0].counts.get("Latino"), Some(&1));
    assert_eq!(profile.race[0].counts.get("Afroamerican"), Some(&1));
    assert_eq!(profile.race[1].counts.get("Latino"), Some(&2));
    assert_eq!(profile.race[1].counts.get("Afroamerican"), Some(&0));
}

#[test]
fn daily_summary_fills_missing_days_with_zero() {
    let seeded = seeded("report-daily");
    let reports = seeded.reports(720);

    let day = reports.daily_summary(date!(2024 - 03 - 10)).expect("daily");
    assert_eq!(day.date, "2024-03-10");
    assert_eq!(
        (day.dwc_count, day.dwc_requested, day.hhh_count, day.hhh_requested),
        (1, 0, 1, 1)
    );
    assert_eq!(
        (day.total_signins, day.unique_signins, day.cancelled_jobs, day.total_assignments),
        (2, 2, 0, 2)
    );

    let quiet = reports.daily_summary(date!(2024 - 04 - 01)).expect("quiet day");
    assert_eq!(quiet.total_signins, 0);
    assert_eq!(quiet.dwc_count, 0);
    assert_eq!(quiet.date, "2024-04-01");
}

#[test]
fn weekly_summary_has_one_row_per_day() {
    let seeded = seeded("report-weekly");
    let reports = seeded.reports(720);

    let rows = reports
        .weekly_summary(date!(2024 - 03 - 10), date!(2024 - 03 - 12))
        .expect("weekly");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].day_of_week, "Sunday");
    assert_eq!((rows[0].total_signins, rows[0].num_jobs), (2, 2));
    assert_eq!((rows[0].est_daily_hours, rows[0].est_payment, rows[0].hourly_wage), (9, 192.5, 21.39));
    assert_eq!(rows[0].top_jobs.len(), 2);
    assert_eq!(rows[2].day_of_week, "Tuesday");
    assert_eq!(rows[2].est_payment, 0.0);
    assert!(rows[2].top_jobs.is_empty());
}

#[test]
fn dispatch_summary_and_period_fold() {
    let seeded = seeded("report-dispatch");
    let reports = seeded.reports(720);

    let days = reports
        .dispatch_summary(date!(2024 - 03 - 10), date!(2024 - 03 - 11))
        .expect("dispatch");
    assert_eq!(days.len(), 2);
    let first = &days[0];
    assert_eq!((first.date_start.as_str(), first.date_end.as_str()), ("2024-03-10", "2024-03-11"));
    assert_eq!(
        (first.total_signins, first.unique_signins, first.dispatched, first.temp_dispatched),
        (2, 2, 2, 2)
    );
    assert_eq!(
        (first.permanent_placements, first.undup_dispatched, first.count_not_assigned, first.cancelled_assignments),
        (0, 2, 1, 0)
    );
    let second = &days[1];
    assert_eq!(
        (second.dispatched, second.permanent_placements, second.undup_dispatched, second.cancelled_assignments),
        (1, 1, 0, 1)
    );
    assert_eq!((second.total_hours, second.total_income, second.avg_income_per_hour), (13, 340.0, 26.15));

    let month = reports
        .period_summary(date!(2024 - 03 - 10), date!(2024 - 03 - 11), Period::Month)
        .expect("monthly");
    assert_eq!(month.len(), 1);
    let bucket = &month[0];
    assert_eq!((bucket.date_start.as_str(), bucket.date_end.as_str()), ("2024-03-10", "2024-03-12"));
    assert_eq!((bucket.total_signins, bucket.dispatched, bucket.total_hours), (4, 3, 22));
    assert_eq!((bucket.total_income, bucket.avg_income_per_hour), (532.5, 24.2));
    assert_eq!(
        labeled(&bucket.skills),
        vec![("General labor", 3), ("Carpentry", 1), ("Landscaping", 1)]
    );

    // 2024-03-10 is a Sunday, so a weekly fold splits the two days
    let weeks = reports
        .period_summary(date!(2024 - 03 - 10), date!(2024 - 03 - 11), Period::Week)
        .expect("weekly");
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0].date_end, "2024-03-11");
    assert_eq!(weeks[1].date_start, "2024-03-11");
}

#[test]
fn reports_at_the_calendar_edge_do_not_overflow() {
    let fixture = Fixture::new("report-calendar-edge");
    let reports = fixture.reports(720);

    let buckets = reports
        .period_summary(date!(9999 - 12 - 01), date!(9999 - 12 - 31), Period::Year)
        .expect("last year of the calendar folds");
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].date_start, "9999-12-01");
    assert_eq!(buckets[0].date_end, "9999-12-31");

    let yearly = reports
        .worker_report(date!(9999 - 01 - 01), date!(9999 - 12 - 31), "yearly")
        .expect("quarters inside the calendar");
    assert_eq!(yearly.len(), 4);

    let begin = time::Date::from_calendar_date(-9999, time::Month::January, 1).expect("valid date");
    let end = time::Date::from_calendar_date(-9999, time::Month::February, 1).expect("valid date");
    let err = reports
        .worker_report(begin, end, "yearly")
        .expect_err("quarters before the calendar start");
    assert!(matches!(err, ReportError::OutOfCalendar(_)));
}

#[test]
fn activity_report_counts_rockstars_per_class() {
    let seeded = seeded("report-activity-summary");
    let reports = seeded.reports(400);

    let rows = reports
        .activity_report(date!(2024 - 03 - 10), date!(2024 - 03 - 11))
        .expect("activity report");
    let summary: Vec<_> = rows
        .iter()
        .map(|row| (row.date.as_str(), row.activity_name.as_str(), row.attendance, row.more_than_x_hours))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2024-03-10", "English class", 2, 0),
            ("2024-03-11", "English class", 1, 1),
            ("2024-03-11", "Computer class", 1, 0),
        ]
    );

    let outside = reports
        .activity_report(date!(2024 - 04 - 01), date!(2024 - 04 - 02))
        .expect("empty window");
    assert!(outside.is_empty());
}

#[test]
fn worker_report_tracks_membership_movement() {
    let seeded = seeded("report-workers");
    let reports = seeded.reports(720);

    let rows = reports
        .worker_report(date!(2024 - 03 - 10), date!(2024 - 03 - 11), "weekly")
        .expect("worker report");
    assert_eq!(rows.len(), 2);
    let first = &rows[0];
    assert_eq!((first.date_start.as_str(), first.date_end.as_str()), ("2024-03-10", "2024-03-11"));
    assert_eq!(
        (first.active, first.newly_enrolled, first.people_who_left),
        (3, 1, 1)
    );
    assert_eq!(
        (first.single_adults, first.family_households, first.new_single_adults, first.new_family_households),
        (2, 1, 0, 1)
    );
    assert_eq!(first.zip_completeness, 2);

    let second = &rows[1];
    assert_eq!((second.active, second.newly_enrolled, second.people_who_left), (2, 0, 0));
    assert_eq!((second.single_adults, second.family_households, second.zip_completeness), (1, 1, 1));

    let yearly = reports
        .worker_report(date!(2024 - 01 - 01), date!(2024 - 12 - 31), "yearly")
        .expect("yearly");
    assert_eq!(yearly.len(), 4);
    assert_eq!(yearly[0].date_start, "2023-12-31");
    assert_eq!(yearly[3].date_end, "2024-12-31");

    let err = reports
        .worker_report(date!(2024 - 03 - 10), date!(2024 - 03 - 11), "daily")
        .expect_err("unknown report type");
    assert_eq!(err.to_string(), "Report type must be \"weekly\", \"monthly\" or \"yearly\".");
}

#[test]
fn employer_report_groups_completed_orders_by_zip() {
    let seeded = seeded("report-employers");
    let reports = seeded.reports(720);

    let rows = reports
        .employer_report(date!(2024 - 03 - 01), date!(2024 - 03 - 31))
        .expect("employer report");
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].zip.as_str(), rows[0].jobs, rows[0].employers), ("98122", 1, 1));
    assert_eq!(
        labeled(&rows[0].skills),
        vec![("General labor", 2), ("Carpentry", 1)]
    );
    assert_eq!((rows[1].zip.as_str(), rows[1].jobs), ("98144", 1));

    let empty = reports
        .employer_report(date!(2024 - 04 - 01), date!(2024 - 04 - 30))
        .expect("no orders");
    assert!(empty.is_empty());
}

#[test]
fn period_names_parse_loosely() {
    assert_eq!("Monthly".parse::<Period>().expect("month"), Period::Month);
    assert_eq!("quarter".parse::<Period>().expect("quarter"), Period::Quarter);
    let err = "fortnight".parse::<Period>().expect_err("unknown");
    assert_eq!(
        err.to_string(),
        "unknown period 'fortnight': expected one of week, month, quarter, year"
    );
}
