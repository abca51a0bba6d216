use std::collections::{BTreeMap, HashMap};

use rusqlite::params;
use time::{Date, Month};

use super::units::{
    ActivityData, AssignmentFilter, AverageWage, DailySumData, DispatchData, EmployerModel,
    MemberDateModel, Period, ReportUnit, WeeklySumData, WorkerData, WorkerReportType,
};
use super::{average, counts_by_date, date_range, round2, ReportError, ReportService};
use crate::dates::{add_days, add_months, first_day_of_month, format_date};
use crate::domain::lookup::{category, order_status};

fn count_on(index: &HashMap<&str, i64>, day: &str) -> i64 {
    index.get(day).copied().unwrap_or(0)
}

fn units_on(units: &[ReportUnit], day: &str) -> Vec<ReportUnit> {
    units
        .iter()
        .filter(|unit| unit.date.as_deref() == Some(day))
        .cloned()
        .collect()
}

/// First day of the bucket containing `day`.
fn bucket_start(day: Date, period: Period) -> Date {
    match period {
        Period::Week => add_days(day, -i64::from(day.weekday().number_days_from_monday())),
        Period::Month => first_day_of_month(day),
        Period::Quarter => {
            let month = (day.month() as u8 - 1) / 3 * 3 + 1;
            // month is one of 1, 4, 7, 10
            let month = Month::try_from(month).unwrap_or(Month::January);
            Date::from_calendar_date(day.year(), month, 1).unwrap_or(day)
        }
        Period::Year => Date::from_calendar_date(day.year(), Month::January, 1).unwrap_or(day),
    }
}

/// Exclusive end of the bucket; `None` past the last representable month.
fn bucket_end(start: Date, period: Period) -> Option<Date> {
    match period {
        Period::Week => Some(add_days(start, 7)),
        Period::Month => add_months(start, 1),
        Period::Quarter => add_months(start, 3),
        Period::Year => add_months(start, 12),
    }
}

fn active_in<'m>(members: &'m [MemberDateModel], start: &str, stop: &str) -> Vec<&'m MemberDateModel> {
    members
        .iter()
        .filter(|member| member.active_during(start, stop))
        .collect()
}

/// Adds `other`'s skill counts into `skills`, keyed by label, busiest first.
fn merge_skills(skills: &mut Vec<ReportUnit>, other: &[ReportUnit]) {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for unit in skills.iter().chain(other) {
        let label = unit.info.clone().unwrap_or_default();
        *totals.entry(label).or_insert(0) += unit.count;
    }
    let mut merged: Vec<ReportUnit> = totals
        .into_iter()
        .map(|(label, count)| ReportUnit::labeled(label, count))
        .collect();
    merged.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.info.cmp(&b.info)));
    *skills = merged;
}

/// `[start, end)` windows a worker report row covers.
fn worker_windows(begin: Date, end: Date, report_type: WorkerReportType) -> Result<Vec<(Date, Date)>, ReportError> {
    Ok(match report_type {
        WorkerReportType::Weekly | WorkerReportType::Monthly => date_range(begin, end)?
            .into_iter()
            .map(|day| (day, add_days(day, 1)))
            .collect(),
        WorkerReportType::Yearly => (1..=4)
            .rev()
            .map(|quarter| {
                let start = add_months(end, -3 * quarter);
                let stop = add_months(end, -3 * (quarter - 1));
                start
                    .zip(stop)
                    .ok_or_else(|| ReportError::OutOfCalendar(format_date(end)))
            })
            .collect::<Result<Vec<_>, ReportError>>()?,
    })
}

impl ReportService<'_> {
    pub fn daily_summary(&self, date: Date) -> Result<DailySumData, ReportError> {
        let day = format_date(date);
        let dispatch = self
            .count_type_of_dispatch()?
            .into_iter()
            .find(|row| row.date == day)
            .unwrap_or_default();
        let signins = self.count_signins()?;
        let unique = self.count_unique_signins(&[date])?;
        let assignments = self.count_assignments(AssignmentFilter::All)?;
        let cancelled = self.count_cancelled()?;

        Ok(DailySumData {
            dwc_count: dispatch.dwc_count,
            dwc_requested: dispatch.dwc_requested,
            hhh_count: dispatch.hhh_count,
            hhh_requested: dispatch.hhh_requested,
            total_signins: count_on(&counts_by_date(&signins), &day),
            unique_signins: count_on(&counts_by_date(&unique), &day),
            cancelled_jobs: count_on(&counts_by_date(&cancelled), &day),
            total_assignments: count_on(&counts_by_date(&assignments), &day),
            date: day,
        })
    }

    pub fn weekly_summary(&self, begin: Date, end: Date) -> Result<Vec<WeeklySumData>, ReportError> {
        let range = date_range(begin, end)?;
        let wages = self.hourly_wage_average()?;
        let signins = self.count_signins()?;
        let assignments = self.count_assignments(AssignmentFilter::All)?;
        let jobs = self.list_jobs()?;

        let signins = counts_by_date(&signins);
        let assignments = counts_by_date(&assignments);
        let wages: HashMap<&str, &AverageWage> =
            wages.iter().map(|row| (row.date.as_str(), row)).collect();

        Ok(range
            .into_iter()
            .map(|day| {
                let date = format_date(day);
                let wage = wages.get(date.as_str());
                WeeklySumData {
                    day_of_week: day.weekday().to_string(),
                    total_signins: count_on(&signins, &date),
                    num_jobs: count_on(&assignments, &date),
                    est_daily_hours: wage.map_or(0, |row| row.hours),
                    est_payment: wage.map_or(0.0, |row| row.wages),
                    hourly_wage: wage.map_or(0.0, |row| row.avg),
                    top_jobs: units_on(&jobs, &date),
                    date,
                }
            })
            .collect())
    }

    /// One row per day. Open slots on completed orders count as not
    /// assigned; open slots on cancelled orders as cancelled assignments.
    pub fn dispatch_summary(&self, begin: Date, end: Date) -> Result<Vec<DispatchData>, ReportError> {
        let range = date_range(begin, end)?;
        tracing::debug!(begin = %format_date(begin), end = %format_date(end), "building dispatch summary");

        let signins = self.count_signins()?;
        let unique = self.count_unique_signins(&range)?;
        let not_assigned = self.count_not_assigned(order_status::COMPLETED)?;
        let dispatched = self.count_assignments(AssignmentFilter::All)?;
        let temporary = self.count_assignments(AssignmentFilter::Temporary)?;
        let permanent = self.count_assignments(AssignmentFilter::Permanent)?;
        let unduplicated = self.count_unduplicated_assignments(&range)?;
        let wages = self.hourly_wage_average()?;
        let cancelled = self.count_not_assigned(order_status::CANCELLED)?;
        let skills = self.list_jobs()?;

        let signins = counts_by_date(&signins);
        let unique = counts_by_date(&unique);
        let not_assigned = counts_by_date(&not_assigned);
        let dispatched = counts_by_date(&dispatched);
        let temporary = counts_by_date(&temporary);
        let permanent = counts_by_date(&permanent);
        let unduplicated = counts_by_date(&unduplicated);
        let cancelled = counts_by_date(&cancelled);
        let wages: HashMap<&str, &AverageWage> =
            wages.iter().map(|row| (row.date.as_str(), row)).collect();

        Ok(range
            .into_iter()
            .map(|day| {
                let date = format_date(day);
                let wage = wages.get(date.as_str());
                DispatchData {
                    date_end: format_date(add_days(day, 1)),
                    total_signins: count_on(&signins, &date),
                    unique_signins: count_on(&unique, &date),
                    dispatched: count_on(&dispatched, &date),
                    temp_dispatched: count_on(&temporary, &date),
                    permanent_placements: count_on(&permanent, &date),
                    undup_dispatched: count_on(&unduplicated, &date),
                    cancelled_assignments: count_on(&cancelled, &date),
                    count_not_assigned: count_on(&not_assigned, &date),
                    total_hours: wage.map_or(0, |row| row.hours),
                    total_income: wage.map_or(0.0, |row| row.wages),
                    avg_income_per_hour: wage.map_or(0.0, |row| row.avg),
                    skills: units_on(&skills, &date),
                    date_start: date,
                }
            })
            .collect())
    }

    /// Dispatch summary folded into calendar weeks (Monday start), months,
    /// quarters or years, clipped to `[begin, end]`.
    pub fn period_summary(
        &self,
        begin: Date,
        end: Date,
        period: Period,
    ) -> Result<Vec<DispatchData>, ReportError> {
        let days = self.dispatch_summary(begin, end)?;
        let last = format_date(add_days(end, 1));
        let mut buckets: Vec<DispatchData> = Vec::new();

        for (day, row) in date_range(begin, end)?.into_iter().zip(days) {
            let start = bucket_start(day, period).max(begin);
            let start = format_date(start);
            match buckets.last_mut() {
                Some(bucket) if bucket.date_start == start => {
                    bucket.total_signins += row.total_signins;
                    bucket.unique_signins += row.unique_signins;
                    bucket.dispatched += row.dispatched;
                    bucket.temp_dispatched += row.temp_dispatched;
                    bucket.permanent_placements += row.permanent_placements;
                    bucket.undup_dispatched += row.undup_dispatched;
                    bucket.cancelled_assignments += row.cancelled_assignments;
                    bucket.count_not_assigned += row.count_not_assigned;
                    bucket.total_hours += row.total_hours;
                    bucket.total_income += row.total_income;
                    merge_skills(&mut bucket.skills, &row.skills);
                }
                _ => {
                    let stop = bucket_end(bucket_start(day, period), period)
                        .map(format_date)
                        .map_or_else(|| last.clone(), |stop| stop.min(last.clone()));
                    let mut bucket = row;
                    bucket.date_end = stop;
                    bucket.date_start = start;
                    merge_skills(&mut bucket.skills, &[]);
                    buckets.push(bucket);
                }
            }
        }

        for bucket in &mut buckets {
            bucket.total_income = round2(bucket.total_income);
            bucket.avg_income_per_hour = average(bucket.total_income, bucket.total_hours);
        }
        Ok(buckets)
    }

    /// Per class day and activity: members attending and members who have
    /// reached the configured number of class minutes in that activity.
    pub fn activity_report(&self, begin: Date, end: Date) -> Result<Vec<ActivityData>, ReportError> {
        let range = date_range(begin, end)?;
        let first = format_date(begin);
        let last = format_date(end);
        let mut rockstars: HashMap<i64, HashMap<String, i64>> = HashMap::new();
        let mut result = Vec::new();

        for (date, name_id, attendance) in self.activity_signins_by_name()? {
            if date < first || date > last {
                continue;
            }
            if !rockstars.contains_key(&name_id) {
                let units = self.activity_rockstars(&range, &[name_id], self.rockstar_minutes)?;
                let counts = units
                    .into_iter()
                    .filter_map(|unit| unit.date.map(|date| (date, unit.count)))
                    .collect();
                rockstars.insert(name_id, counts);
            }
            let more_than_x_hours = rockstars
                .get(&name_id)
                .and_then(|counts| counts.get(&date))
                .copied()
                .unwrap_or(0);
            result.push(ActivityData {
                activity_name: self.lookups.get(name_id)?.text_en.clone(),
                attendance,
                more_than_x_hours,
                date,
            });
        }
        Ok(result)
    }

    /// Membership movement per window. `weekly` and `monthly` produce one
    /// row per day; `yearly` produces four quarters ending at `end`.
    pub fn worker_report(
        &self,
        begin: Date,
        end: Date,
        report_type: &str,
    ) -> Result<Vec<WorkerData>, ReportError> {
        let report_type: WorkerReportType = report_type.parse()?;
        let windows = worker_windows(begin, end, report_type)?;
        let singles = self.single_adults()?;
        let families = self.family_households()?;

        let mut stmt = self.conn.prepare(
            r#"
SELECT
    (SELECT COUNT(*) FROM workers
      WHERE date_of_membership < ?2 AND member_expiration_date >= ?1),
    (SELECT COUNT(*) FROM workers
      WHERE date_of_membership >= ?1 AND date_of_membership < ?2),
    (SELECT COUNT(*) FROM workers
      WHERE member_expiration_date >= ?1 AND member_expiration_date < ?2)
"#,
        )?;

        let mut result = Vec::with_capacity(windows.len());
        for (start, stop) in windows {
            let start = format_date(start);
            let stop = format_date(stop);
            let (active, newly_enrolled, people_who_left) =
                stmt.query_row(params![start, stop], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })?;

            let joined_in = |members: &[MemberDateModel]| -> i64 {
                members
                    .iter()
                    .filter(|member| member.joined_during(&start, &stop))
                    .count() as i64
            };
            let active_singles = active_in(&singles, &start, &stop);
            let active_families = active_in(&families, &start, &stop);
            let zip_completeness = active_singles
                .iter()
                .chain(active_families.iter())
                .filter(|member| member.has_zip())
                .count() as i64;

            result.push(WorkerData {
                active,
                newly_enrolled,
                people_who_left,
                single_adults: active_singles.len() as i64,
                family_households: active_families.len() as i64,
                new_single_adults: joined_in(&singles),
                new_family_households: joined_in(&families),
                zip_completeness,
                date_start: start,
                date_end: stop,
            });
        }
        Ok(result)
    }

    /// Completed orders in `[begin, end]` grouped by work-site zip code,
    /// most jobs first.
    pub fn employer_report(&self, begin: Date, end: Date) -> Result<Vec<EmployerModel>, ReportError> {
        date_range(begin, end)?;
        let first = format_date(begin);
        let last = format_date(end);
        let completed = self
            .lookups
            .get_by_keys(category::ORDER_STATUS, order_status::COMPLETED)?;

        let mut zips: BTreeMap<String, EmployerModel> = BTreeMap::new();
        for unit in self.list_orders_by_zip()? {
            let (Some(date), Some(zip)) = (unit.date, unit.info) else {
                continue;
            };
            if date < first || date > last {
                continue;
            }
            zips.entry(zip.clone())
                .or_insert_with(|| EmployerModel {
                    zip,
                    jobs: 0,
                    employers: 0,
                    skills: Vec::new(),
                })
                .jobs += unit.count;
        }

        let mut stmt = self.conn.prepare(
            r#"
SELECT zipcode, COUNT(DISTINCT employer_id)
FROM work_orders
WHERE status = ?1 AND date(date_time_of_work) BETWEEN ?2 AND ?3
GROUP BY zipcode
"#,
        )?;
        let mut rows = stmt.query(params![completed, first, last])?;
        while let Some(row) = rows.next()? {
            let zip: String = row.get(0)?;
            if let Some(model) = zips.get_mut(&zip) {
                model.employers = row.get(1)?;
            }
        }

        let mut stmt = self.conn.prepare(
            r#"
SELECT wo.zipcode, wa.skill_id, COUNT(*) AS jobs
FROM work_assignments wa
JOIN work_orders wo ON wo.id = wa.work_order_id
WHERE wo.status = ?1 AND date(wo.date_time_of_work) BETWEEN ?2 AND ?3
GROUP BY wo.zipcode, wa.skill_id
ORDER BY wo.zipcode, jobs DESC, wa.skill_id
"#,
        )?;
        let mut rows = stmt.query(params![completed, first, last])?;
        while let Some(row) = rows.next()? {
            let zip: String = row.get(0)?;
            let skill: i64 = row.get(1)?;
            if let Some(model) = zips.get_mut(&zip) {
                model.skills.push(ReportUnit::labeled(
                    self.lookups.get(skill)?.text_en.clone(),
                    row.get(2)?,
                ));
            }
        }

        let mut result: Vec<EmployerModel> = zips.into_values().collect();
        result.sort_by(|a, b| b.jobs.cmp(&a.jobs).then_with(|| a.zip.cmp(&b.zip)));
        Ok(result)
    }
}
