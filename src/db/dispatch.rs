use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use super::{collect_rows, record_from_row, RECORD_COLUMNS};
use crate::domain::record::Record;
use crate::domain::work_order::{WorkAssignment, WorkOrder, WorkOrderSummary, WorkerRequest};

const ORDER_COLUMNS: &str = r#"
    employer_id, paper_order_num, contact_name, status, work_site_address1,
    work_site_address2, city, state, phone, zipcode, type_of_work_id,
    english_required, english_required_note, lunch_supplied,
    permanent_placement, transport_method_id, transport_fee,
    transport_fee_extra, description, date_time_of_work, time_flexible"#;

fn order_from_row(row: &Row<'_>) -> Result<WorkOrder> {
    Ok(WorkOrder {
        record: record_from_row(row)?,
        employer_id: row.get(5)?,
        paper_order_num: row.get(6)?,
        contact_name: row.get(7)?,
        status: row.get(8)?,
        work_site_address1: row.get(9)?,
        work_site_address2: row.get(10)?,
        city: row.get(11)?,
        state: row.get(12)?,
        phone: row.get(13)?,
        zipcode: row.get(14)?,
        type_of_work_id: row.get(15)?,
        english_required: row.get(16)?,
        english_required_note: row.get(17)?,
        lunch_supplied: row.get(18)?,
        permanent_placement: row.get(19)?,
        transport_method_id: row.get(20)?,
        transport_fee: row.get(21)?,
        transport_fee_extra: row.get(22)?,
        description: row.get(23)?,
        date_time_of_work: row.get(24)?,
        time_flexible: row.get(25)?,
    })
}

pub fn insert_work_order(conn: &Connection, order: &WorkOrder) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO work_orders (created_at, updated_at, created_by, updated_by, {ORDER_COLUMNS})
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
        ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)"
        ),
        params![
            order.record.created_at,
            order.record.updated_at,
            order.record.created_by,
            order.record.updated_by,
            order.employer_id,
            order.paper_order_num,
            order.contact_name,
            order.status,
            order.work_site_address1,
            order.work_site_address2,
            order.city,
            order.state,
            order.phone,
            order.zipcode,
            order.type_of_work_id,
            order.english_required,
            order.english_required_note,
            order.lunch_supplied,
            order.permanent_placement,
            order.transport_method_id,
            order.transport_fee,
            order.transport_fee_extra,
            order.description,
            order.date_time_of_work,
            order.time_flexible
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_work_order(conn: &Connection, id: i64) -> Result<Option<WorkOrder>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS}, {ORDER_COLUMNS} FROM work_orders WHERE id = ?1"),
        params![id],
        order_from_row,
    )
    .optional()
}

/// Orders scheduled on `date` (`YYYY-MM-DD`), or all orders when `None`.
pub fn list_work_orders(conn: &Connection, date: Option<&str>) -> Result<Vec<WorkOrder>> {
    collect_rows(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS}, {ORDER_COLUMNS} FROM work_orders
WHERE ?1 IS NULL OR date(date_time_of_work) = ?1
ORDER BY date_time_of_work, id"
        ),
        params![date],
        order_from_row,
    )
}

pub fn update_work_order_status(
    conn: &Connection,
    id: i64,
    status: i64,
    record: &Record,
) -> Result<usize> {
    conn.execute(
        "UPDATE work_orders SET status = ?2, updated_at = ?3, updated_by = ?4 WHERE id = ?1",
        params![id, status, record.updated_at, record.updated_by],
    )
}

pub fn work_order_summary(conn: &Connection) -> Result<Vec<WorkOrderSummary>> {
    collect_rows(
        conn,
        r#"
SELECT date(date_time_of_work) AS day, status, COUNT(*)
FROM work_orders
GROUP BY day, status
ORDER BY day DESC, status
"#,
        [],
        |row| {
            Ok(WorkOrderSummary {
                date: row.get(0)?,
                status: row.get(1)?,
                count: row.get(2)?,
            })
        },
    )
}

const ASSIGNMENT_COLUMNS: &str =
    "work_order_id, worker_assigned_id, worker_signin_id, skill_id, hours, hourly_wage, description";

fn assignment_from_row(row: &Row<'_>) -> Result<WorkAssignment> {
    Ok(WorkAssignment {
        record: record_from_row(row)?,
        work_order_id: row.get(5)?,
        worker_assigned_id: row.get(6)?,
        worker_signin_id: row.get(7)?,
        skill_id: row.get(8)?,
        hours: row.get(9)?,
        hourly_wage: row.get(10)?,
        description: row.get(11)?,
    })
}

pub fn insert_assignment(conn: &Connection, assignment: &WorkAssignment) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO work_assignments (created_at, updated_at, created_by, updated_by, {ASSIGNMENT_COLUMNS})
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            assignment.record.created_at,
            assignment.record.updated_at,
            assignment.record.created_by,
            assignment.record.updated_by,
            assignment.work_order_id,
            assignment.worker_assigned_id,
            assignment.worker_signin_id,
            assignment.skill_id,
            assignment.hours,
            assignment.hourly_wage,
            assignment.description
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_assignment(conn: &Connection, id: i64) -> Result<Option<WorkAssignment>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS}, {ASSIGNMENT_COLUMNS} FROM work_assignments WHERE id = ?1"),
        params![id],
        assignment_from_row,
    )
    .optional()
}

pub fn list_assignments_for_order(
    conn: &Connection,
    work_order_id: i64,
) -> Result<Vec<WorkAssignment>> {
    collect_rows(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS}, {ASSIGNMENT_COLUMNS} FROM work_assignments
WHERE work_order_id = ?1
ORDER BY id"
        ),
        params![work_order_id],
        assignment_from_row,
    )
}

/// Sets (or clears) the worker and sign-in linked to an assignment.
pub fn set_assignment_worker(
    conn: &Connection,
    id: i64,
    worker_id: Option<i64>,
    signin_id: Option<i64>,
    record: &Record,
) -> Result<usize> {
    conn.execute(
        r#"
UPDATE work_assignments
SET worker_assigned_id = ?2, worker_signin_id = ?3, updated_at = ?4, updated_by = ?5
WHERE id = ?1
"#,
        params![id, worker_id, signin_id, record.updated_at, record.updated_by],
    )
}

pub fn worker_assignment_on_day(
    conn: &Connection,
    worker_id: i64,
    day: &str,
) -> Result<Option<i64>> {
    conn.query_row(
        r#"
SELECT wa.id
FROM work_assignments wa
JOIN work_orders wo ON wo.id = wa.work_order_id
WHERE wa.worker_assigned_id = ?1 AND date(wo.date_time_of_work) = ?2
LIMIT 1
"#,
        params![worker_id, day],
        |row| row.get(0),
    )
    .optional()
}

pub fn count_orphaned_assignments(conn: &Connection) -> Result<i64> {
    conn.query_row(
        r#"
SELECT COUNT(*)
FROM work_assignments wa
LEFT JOIN workers w ON w.id = wa.worker_assigned_id
WHERE wa.worker_assigned_id IS NOT NULL AND w.id IS NULL
"#,
        [],
        |row| row.get(0),
    )
}

pub fn insert_worker_request(conn: &Connection, request: &WorkerRequest) -> Result<i64> {
    conn.execute(
        r#"
INSERT INTO worker_requests (created_at, updated_at, created_by, updated_by, work_order_id, worker_id)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#,
        params![
            request.record.created_at,
            request.record.updated_at,
            request.record.created_by,
            request.record.updated_by,
            request.work_order_id,
            request.worker_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_worker_requests(conn: &Connection, work_order_id: i64) -> Result<Vec<WorkerRequest>> {
    collect_rows(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS}, work_order_id, worker_id FROM worker_requests
WHERE work_order_id = ?1
ORDER BY id"
        ),
        params![work_order_id],
        |row| {
            Ok(WorkerRequest {
                record: record_from_row(row)?,
                work_order_id: row.get(5)?,
                worker_id: row.get(6)?,
            })
        },
    )
}
