use rusqlite::{params, Params};
use time::Date;

use super::units::{
    AssignmentFilter, AverageWage, MemberDateModel, ReportUnit, StatusUnit, TypeOfDispatch,
    ZipUnit,
};
use super::{counts_by_date, round2, average, ReportError, ReportService};
use crate::dates::format_date;
use crate::domain::lookup::{category, marital_status, order_status};

/// Recursive CTE naming every day from `?1` through `?2` as `days(d)`.
pub(crate) const DAYS_CTE: &str = r#"
WITH RECURSIVE days(d) AS (
    SELECT ?1
    UNION ALL
    SELECT date(d, '+1 day') FROM days WHERE d < ?2
)"#;

impl ReportService<'_> {
    fn dated_counts<P: Params>(&self, sql: &str, params: P) -> Result<Vec<ReportUnit>, ReportError> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(ReportUnit::dated(row.get::<_, String>(0)?, row.get(1)?));
        }
        Ok(result)
    }

    /// Sign-ins per day.
    pub fn count_signins(&self) -> Result<Vec<ReportUnit>, ReportError> {
        self.dated_counts(
            r#"
SELECT date(date_for_signin) AS day, COUNT(*)
FROM worker_signins
GROUP BY day
ORDER BY day
"#,
            [],
        )
    }

    /// For each day of `range`, the number of cards whose first sign-in
    /// ever fell on that day.
    pub fn count_unique_signins(&self, range: &[Date]) -> Result<Vec<ReportUnit>, ReportError> {
        let firsts = self.dated_counts(
            r#"
SELECT first_day, COUNT(*)
FROM (
    SELECT dwccardnum, date(MIN(date_for_signin)) AS first_day
    FROM worker_signins
    GROUP BY dwccardnum
)
GROUP BY first_day
ORDER BY first_day
"#,
            [],
        )?;
        Ok(fill_range(range, &firsts))
    }

    /// Dispatched assignments per day of work.
    pub fn count_assignments(&self, filter: AssignmentFilter) -> Result<Vec<ReportUnit>, ReportError> {
        self.dated_counts(
            r#"
SELECT date(wo.date_time_of_work) AS day, COUNT(*)
FROM work_assignments wa
JOIN work_orders wo ON wo.id = wa.work_order_id
WHERE wa.worker_assigned_id IS NOT NULL
  AND (?1 IS NULL OR wo.permanent_placement = ?1)
GROUP BY day
ORDER BY day
"#,
            params![filter.permanent_flag()],
        )
    }

    /// For each day of `range`, the workers whose first assignment on or
    /// after the start of the range fell on that day.
    pub fn count_unduplicated_assignments(
        &self,
        range: &[Date],
    ) -> Result<Vec<ReportUnit>, ReportError> {
        let Some(first) = range.first() else {
            return Ok(Vec::new());
        };
        let firsts = self.dated_counts(
            r#"
SELECT first_day, COUNT(*)
FROM (
    SELECT wa.worker_assigned_id, date(MIN(wo.date_time_of_work)) AS first_day
    FROM work_assignments wa
    JOIN work_orders wo ON wo.id = wa.work_order_id
    WHERE wa.worker_assigned_id IS NOT NULL
      AND date(wo.date_time_of_work) >= ?1
    GROUP BY wa.worker_assigned_id
)
GROUP BY first_day
ORDER BY first_day
"#,
            params![format_date(*first)],
        )?;
        Ok(fill_range(range, &firsts))
    }

    /// Open (unassigned) slots per day on orders in the given status.
    pub fn count_not_assigned(&self, order_status_key: &str) -> Result<Vec<ReportUnit>, ReportError> {
        let status = self
            .lookups
            .get_by_keys(category::ORDER_STATUS, order_status_key)?;
        self.dated_counts(
            r#"
SELECT date(wo.date_time_of_work) AS day, COUNT(*)
FROM work_assignments wa
JOIN work_orders wo ON wo.id = wa.work_order_id
WHERE wa.worker_assigned_id IS NULL AND wo.status = ?1
GROUP BY day
ORDER BY day
"#,
            params![status],
        )
    }

    /// Cancelled orders per day.
    pub fn count_cancelled(&self) -> Result<Vec<ReportUnit>, ReportError> {
        self.dated_counts(
            r#"
SELECT date(date_time_of_work) AS day, COUNT(*)
FROM work_orders
WHERE status = ?1
GROUP BY day
ORDER BY day
"#,
            params![self.lookups.well_known().order_status.cancelled],
        )
    }

    /// Dispatches per day split by the dispatched worker's program, with
    /// the subset where the employer asked for that worker by name.
    pub fn count_type_of_dispatch(&self) -> Result<Vec<TypeOfDispatch>, ReportError> {
        let work_type = self.lookups.well_known().work_type;
        let mut stmt = self.conn.prepare(
            r#"
SELECT date(wo.date_time_of_work) AS day,
       SUM(CASE WHEN w.type_of_work_id = ?1 THEN 1 ELSE 0 END),
       SUM(CASE WHEN w.type_of_work_id = ?1 AND wr.id IS NOT NULL THEN 1 ELSE 0 END),
       SUM(CASE WHEN w.type_of_work_id = ?2 THEN 1 ELSE 0 END),
       SUM(CASE WHEN w.type_of_work_id = ?2 AND wr.id IS NOT NULL THEN 1 ELSE 0 END)
FROM work_assignments wa
JOIN work_orders wo ON wo.id = wa.work_order_id
LEFT JOIN workers w ON w.id = wa.worker_assigned_id
LEFT JOIN worker_requests wr
       ON wr.work_order_id = wa.work_order_id AND wr.worker_id = w.id
GROUP BY day
ORDER BY day
"#,
        )?;
        let mut rows = stmt.query(params![work_type.dwc, work_type.hhh])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(TypeOfDispatch {
                date: row.get(0)?,
                dwc_count: row.get(1)?,
                dwc_requested: row.get(2)?,
                hhh_count: row.get(3)?,
                hhh_requested: row.get(4)?,
            });
        }
        Ok(result)
    }

    /// Hours, wages and average hourly wage per day over every assignment.
    pub fn hourly_wage_average(&self) -> Result<Vec<AverageWage>, ReportError> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT date(wo.date_time_of_work) AS day,
       SUM(wa.hours),
       SUM(wa.hourly_wage * wa.hours)
FROM work_assignments wa
JOIN work_orders wo ON wo.id = wa.work_order_id
GROUP BY day
ORDER BY day
"#,
        )?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let hours: i64 = row.get(1)?;
            let total: f64 = row.get(2)?;
            result.push(AverageWage {
                date: row.get(0)?,
                hours,
                wages: round2(total),
                avg: average(total, hours),
            });
        }
        Ok(result)
    }

    /// Assignments per day and skill, busiest skill first within a day.
    pub fn list_jobs(&self) -> Result<Vec<ReportUnit>, ReportError> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT date(wo.date_time_of_work) AS day, wa.skill_id, COUNT(*) AS jobs
FROM work_assignments wa
JOIN work_orders wo ON wo.id = wa.work_order_id
GROUP BY day, wa.skill_id
ORDER BY day, jobs DESC, wa.skill_id
"#,
        )?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let skill: i64 = row.get(1)?;
            result.push(ReportUnit {
                date: Some(row.get(0)?),
                count: row.get(2)?,
                info: Some(self.lookups.get(skill)?.text_en.clone()),
            });
        }
        Ok(result)
    }

    /// Dispatched assignments per day, work-site zip and skill.
    pub fn list_jobs_by_zip(&self) -> Result<Vec<ZipUnit>, ReportError> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT date(wo.date_time_of_work) AS day, wo.zipcode, wa.skill_id, COUNT(*) AS jobs
FROM work_assignments wa
JOIN work_orders wo ON wo.id = wa.work_order_id
WHERE wa.worker_assigned_id IS NOT NULL
GROUP BY day, wo.zipcode, wa.skill_id
ORDER BY day, jobs DESC, wo.zipcode, wa.skill_id
"#,
        )?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let skill: i64 = row.get(2)?;
            result.push(ZipUnit {
                date: row.get(0)?,
                zip: row.get(1)?,
                count: row.get(3)?,
                info: self.lookups.get(skill)?.text_en.clone(),
            });
        }
        Ok(result)
    }

    /// Completed orders per day and work-site zip; the zip is the label.
    pub fn list_orders_by_zip(&self) -> Result<Vec<ReportUnit>, ReportError> {
        let completed = self
            .lookups
            .get_by_keys(category::ORDER_STATUS, order_status::COMPLETED)?;
        let mut stmt = self.conn.prepare(
            r#"
SELECT date(date_time_of_work) AS day, zipcode, COUNT(*) AS orders
FROM work_orders
WHERE status = ?1
GROUP BY day, zipcode
ORDER BY day, orders DESC, zipcode
"#,
        )?;
        let mut rows = stmt.query(params![completed])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(ReportUnit {
                date: Some(row.get(0)?),
                info: Some(row.get(1)?),
                count: row.get(2)?,
            });
        }
        Ok(result)
    }

    pub(crate) fn activity_signins_by_name(&self) -> Result<Vec<(String, i64, i64)>, ReportError> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT date(a.date_start) AS day, a.name_id, COUNT(*) AS attendance
FROM activity_signins s
JOIN activities a ON a.id = s.activity_id
WHERE s.person_id IS NOT NULL
GROUP BY day, a.name_id
ORDER BY day, attendance DESC, a.name_id
"#,
        )?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push((row.get(0)?, row.get(1)?, row.get(2)?));
        }
        Ok(result)
    }

    /// Attendance of registered members per class day and activity name.
    pub fn activity_signins(&self) -> Result<Vec<ReportUnit>, ReportError> {
        self.activity_signins_by_name()?
            .into_iter()
            .map(|(date, name_id, count)| {
                Ok(ReportUnit {
                    date: Some(date),
                    count,
                    info: Some(self.lookups.get(name_id)?.text_en.clone()),
                })
            })
            .collect()
    }

    /// For each day of `range`, members whose first class on or after the
    /// start of the range was that day. `name_id` limits it to one activity.
    pub fn unique_activity_signins(
        &self,
        range: &[Date],
        name_id: Option<i64>,
    ) -> Result<Vec<ReportUnit>, ReportError> {
        let Some(first) = range.first() else {
            return Ok(Vec::new());
        };
        let firsts = self.dated_counts(
            r#"
SELECT first_day, COUNT(*)
FROM (
    SELECT s.person_id, date(MIN(a.date_start)) AS first_day
    FROM activity_signins s
    JOIN activities a ON a.id = s.activity_id
    WHERE s.person_id IS NOT NULL
      AND date(a.date_start) >= ?1
      AND (?2 IS NULL OR a.name_id = ?2)
    GROUP BY s.person_id
)
GROUP BY first_day
ORDER BY first_day
"#,
            params![format_date(*first), name_id],
        )?;
        Ok(fill_range(range, &firsts))
    }

    /// For each day of `range`, card holders whose total class time in the
    /// named activities reaches `minutes`, dated at their last sign-in. The
    /// label lists the activity names.
    pub fn activity_rockstars(
        &self,
        range: &[Date],
        name_ids: &[i64],
        minutes: i64,
    ) -> Result<Vec<ReportUnit>, ReportError> {
        let names = name_ids
            .iter()
            .map(|id| Ok(self.lookups.get(*id)?.text_en.clone()))
            .collect::<Result<Vec<_>, ReportError>>()?
            .join(", ");
        let ids_json = serde_json::to_string(name_ids).unwrap_or_else(|_| "[]".to_string());
        let finished = self.dated_counts(
            r#"
SELECT last_day, COUNT(*)
FROM (
    SELECT s.dwccardnum,
           date(MAX(s.date_for_signin)) AS last_day,
           SUM(CAST(ROUND((julianday(a.date_end) - julianday(a.date_start)) * 1440) AS INTEGER))
               AS minutes
    FROM activity_signins s
    JOIN activities a ON a.id = s.activity_id
    WHERE a.name_id IN (SELECT value FROM json_each(?1))
    GROUP BY s.dwccardnum
)
WHERE minutes >= ?2
GROUP BY last_day
ORDER BY last_day
"#,
            params![ids_json, minutes],
        )?;
        Ok(fill_range(range, &finished)
            .into_iter()
            .map(|mut unit| {
                unit.info = Some(names.clone());
                unit
            })
            .collect())
    }

    /// Per day: members active that day (joined before, expiring after),
    /// members who joined that day and members whose membership ended that day.
    pub fn member_status_by_date(&self, range: &[Date]) -> Result<Vec<StatusUnit>, ReportError> {
        let (Some(first), Some(last)) = (range.first(), range.last()) else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(&format!(
            r#"{DAYS_CTE}
SELECT d,
       (SELECT COUNT(*) FROM workers
         WHERE date_of_membership < d AND member_expiration_date > d),
       (SELECT COUNT(*) FROM workers WHERE date_of_membership = d),
       (SELECT COUNT(*) FROM workers WHERE member_expiration_date = d)
FROM days
ORDER BY d
"#
        ))?;
        let mut rows = stmt.query(params![format_date(*first), format_date(*last)])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(StatusUnit {
                date: row.get(0)?,
                active: row.get(1)?,
                enrolled_on_date: row.get(2)?,
                expired_on_date: row.get(3)?,
            });
        }
        Ok(result)
    }

    fn member_dates(&self, household_sql: &str) -> Result<Vec<MemberDateModel>, ReportError> {
        let married = self
            .lookups
            .get_by_keys(category::MARITAL_STATUS, marital_status::MARRIED)?;
        let mut stmt = self.conn.prepare(&format!(
            r#"
SELECT dwccardnum, zipcode, date_of_membership, member_expiration_date
FROM workers
WHERE {household_sql}
ORDER BY dwccardnum
"#
        ))?;
        let mut rows = stmt.query(params![married])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(MemberDateModel {
                dwccardnum: row.get(0)?,
                zip: row.get(1)?,
                membership_date: row.get(2)?,
                expiration_date: row.get(3)?,
            });
        }
        Ok(result)
    }

    /// Members living without children who are not married. A missing
    /// marital status counts as not married.
    pub fn single_adults(&self) -> Result<Vec<MemberDateModel>, ReportError> {
        self.member_dates(
            "live_with_children = 0 AND (marital_status IS NULL OR marital_status != ?1)",
        )
    }

    /// Married members living with children.
    pub fn family_households(&self) -> Result<Vec<MemberDateModel>, ReportError> {
        self.member_dates("live_with_children = 1 AND marital_status = ?1")
    }
}

/// One unit per day of `range`, taking counts from `units` and zero elsewhere.
pub(crate) fn fill_range(range: &[Date], units: &[ReportUnit]) -> Vec<ReportUnit> {
    let index = counts_by_date(units);
    range
        .iter()
        .map(|day| {
            let key = format_date(*day);
            let count = index.get(key.as_str()).copied().unwrap_or(0);
            ReportUnit::dated(key, count)
        })
        .collect()
}
