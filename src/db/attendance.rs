use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use super::{collect_rows, record_from_row, RECORD_COLUMNS};
use crate::domain::attendance::{Activity, ActivitySignin, WorkerSignin};
use crate::domain::record::Record;

const SIGNIN_COLUMNS: &str = "dwccardnum, date_for_signin, lottery_timestamp, work_assignment_id";

fn signin_from_row(row: &Row<'_>) -> Result<WorkerSignin> {
    Ok(WorkerSignin {
        record: record_from_row(row)?,
        dwccardnum: row.get(5)?,
        date_for_signin: row.get(6)?,
        lottery_timestamp: row.get(7)?,
        work_assignment_id: row.get(8)?,
    })
}

pub fn insert_worker_signin(conn: &Connection, signin: &WorkerSignin) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO worker_signins (created_at, updated_at, created_by, updated_by, {SIGNIN_COLUMNS})
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        params![
            signin.record.created_at,
            signin.record.updated_at,
            signin.record.created_by,
            signin.record.updated_by,
            signin.dwccardnum,
            signin.date_for_signin,
            signin.lottery_timestamp,
            signin.work_assignment_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_worker_signin(conn: &Connection, id: i64) -> Result<Option<WorkerSignin>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS}, {SIGNIN_COLUMNS} FROM worker_signins WHERE id = ?1"),
        params![id],
        signin_from_row,
    )
    .optional()
}

pub fn find_signin_for_day(
    conn: &Connection,
    dwccardnum: i64,
    day: &str,
) -> Result<Option<WorkerSignin>> {
    conn.query_row(
        &format!(
            "SELECT {RECORD_COLUMNS}, {SIGNIN_COLUMNS} FROM worker_signins
WHERE dwccardnum = ?1 AND date(date_for_signin) = ?2
ORDER BY date_for_signin
LIMIT 1"
        ),
        params![dwccardnum, day],
        signin_from_row,
    )
    .optional()
}

pub fn list_signins_for_day(conn: &Connection, day: &str) -> Result<Vec<WorkerSignin>> {
    collect_rows(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS}, {SIGNIN_COLUMNS} FROM worker_signins
WHERE date(date_for_signin) = ?1
ORDER BY lottery_timestamp IS NULL, lottery_timestamp, date_for_signin, id"
        ),
        params![day],
        signin_from_row,
    )
}

pub fn set_lottery_timestamp(
    conn: &Connection,
    id: i64,
    lottery_timestamp: &str,
    record: &Record,
) -> Result<usize> {
    conn.execute(
        r#"
UPDATE worker_signins
SET lottery_timestamp = ?2, updated_at = ?3, updated_by = ?4
WHERE id = ?1 AND lottery_timestamp IS NULL
"#,
        params![id, lottery_timestamp, record.updated_at, record.updated_by],
    )
}

pub fn set_signin_assignment(
    conn: &Connection,
    id: i64,
    work_assignment_id: Option<i64>,
    record: &Record,
) -> Result<usize> {
    conn.execute(
        r#"
UPDATE worker_signins
SET work_assignment_id = ?2, updated_at = ?3, updated_by = ?4
WHERE id = ?1
"#,
        params![id, work_assignment_id, record.updated_at, record.updated_by],
    )
}

pub fn delete_worker_signin(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM worker_signins WHERE id = ?1", params![id])
}

const ACTIVITY_COLUMNS: &str = "name_id, date_start, date_end, teacher, notes";

fn activity_from_row(row: &Row<'_>) -> Result<Activity> {
    Ok(Activity {
        record: record_from_row(row)?,
        name_id: row.get(5)?,
        date_start: row.get(6)?,
        date_end: row.get(7)?,
        teacher: row.get(8)?,
        notes: row.get(9)?,
    })
}

pub fn insert_activity(conn: &Connection, activity: &Activity) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO activities (created_at, updated_at, created_by, updated_by, {ACTIVITY_COLUMNS})
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            activity.record.created_at,
            activity.record.updated_at,
            activity.record.created_by,
            activity.record.updated_by,
            activity.name_id,
            activity.date_start,
            activity.date_end,
            activity.teacher,
            activity.notes
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_activity(conn: &Connection, id: i64) -> Result<Option<Activity>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS}, {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"),
        params![id],
        activity_from_row,
    )
    .optional()
}

pub fn list_activities(conn: &Connection, day: Option<&str>) -> Result<Vec<Activity>> {
    collect_rows(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS}, {ACTIVITY_COLUMNS} FROM activities
WHERE ?1 IS NULL OR date(date_start) = ?1
ORDER BY date_start, id"
        ),
        params![day],
        activity_from_row,
    )
}

pub fn insert_activity_signin(conn: &Connection, signin: &ActivitySignin) -> Result<i64> {
    conn.execute(
        r#"
INSERT INTO activity_signins (
    created_at, updated_at, created_by, updated_by,
    activity_id, dwccardnum, person_id, date_for_signin
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#,
        params![
            signin.record.created_at,
            signin.record.updated_at,
            signin.record.created_by,
            signin.record.updated_by,
            signin.activity_id,
            signin.dwccardnum,
            signin.person_id,
            signin.date_for_signin
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn activity_signin_exists(conn: &Connection, activity_id: i64, dwccardnum: i64) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM activity_signins WHERE activity_id = ?1 AND dwccardnum = ?2)",
        params![activity_id, dwccardnum],
        |row| row.get(0),
    )
}

pub fn list_activity_signins(conn: &Connection, activity_id: i64) -> Result<Vec<ActivitySignin>> {
    collect_rows(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS}, activity_id, dwccardnum, person_id, date_for_signin
FROM activity_signins
WHERE activity_id = ?1
ORDER BY date_for_signin, id"
        ),
        params![activity_id],
        |row| {
            Ok(ActivitySignin {
                record: record_from_row(row)?,
                activity_id: row.get(5)?,
                dwccardnum: row.get(6)?,
                person_id: row.get(7)?,
                date_for_signin: row.get(8)?,
            })
        },
    )
}
