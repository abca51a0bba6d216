use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use super::{collect_rows, record_from_row, RECORD_COLUMNS};
use crate::domain::attendance::Event;
use crate::domain::record::Record;
use crate::domain::work_order::Employer;
use crate::domain::worker::Worker;

const WORKER_COLUMNS: &str = r#"
    dwccardnum, first_name, last_name, member_status, date_of_membership,
    member_expiration_date, date_of_birth, type_of_work_id, marital_status,
    live_with_children, homeless, immigrant_refugee, disabled, race_id,
    income_id, gender_id, english_level, zipcode, skill1, skill2, skill3"#;

fn worker_from_row(row: &Row<'_>) -> Result<Worker> {
    Ok(Worker {
        record: record_from_row(row)?,
        dwccardnum: row.get(5)?,
        first_name: row.get(6)?,
        last_name: row.get(7)?,
        member_status: row.get(8)?,
        date_of_membership: row.get(9)?,
        member_expiration_date: row.get(10)?,
        date_of_birth: row.get(11)?,
        type_of_work_id: row.get(12)?,
        marital_status: row.get(13)?,
        live_with_children: row.get(14)?,
        homeless: row.get(15)?,
        immigrant_refugee: row.get(16)?,
        disabled: row.get(17)?,
        race_id: row.get(18)?,
        income_id: row.get(19)?,
        gender_id: row.get(20)?,
        english_level: row.get(21)?,
        zipcode: row.get(22)?,
        skill1: row.get(23)?,
        skill2: row.get(24)?,
        skill3: row.get(25)?,
    })
}

pub fn insert_worker(conn: &Connection, worker: &Worker) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO workers (created_at, updated_at, created_by, updated_by, {WORKER_COLUMNS})
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
        ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)"
        ),
        params![
            worker.record.created_at,
            worker.record.updated_at,
            worker.record.created_by,
            worker.record.updated_by,
            worker.dwccardnum,
            worker.first_name,
            worker.last_name,
            worker.member_status,
            worker.date_of_membership,
            worker.member_expiration_date,
            worker.date_of_birth,
            worker.type_of_work_id,
            worker.marital_status,
            worker.live_with_children,
            worker.homeless,
            worker.immigrant_refugee,
            worker.disabled,
            worker.race_id,
            worker.income_id,
            worker.gender_id,
            worker.english_level,
            worker.zipcode,
            worker.skill1,
            worker.skill2,
            worker.skill3
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_worker(conn: &Connection, id: i64) -> Result<Option<Worker>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS}, {WORKER_COLUMNS} FROM workers WHERE id = ?1"),
        params![id],
        worker_from_row,
    )
    .optional()
}

pub fn get_worker_by_card(conn: &Connection, dwccardnum: i64) -> Result<Option<Worker>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS}, {WORKER_COLUMNS} FROM workers WHERE dwccardnum = ?1"),
        params![dwccardnum],
        worker_from_row,
    )
    .optional()
}

pub fn list_workers(conn: &Connection, member_status: Option<i64>) -> Result<Vec<Worker>> {
    collect_rows(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS}, {WORKER_COLUMNS} FROM workers
WHERE ?1 IS NULL OR member_status = ?1
ORDER BY dwccardnum"
        ),
        params![member_status],
        worker_from_row,
    )
}

pub fn update_worker_status(
    conn: &Connection,
    id: i64,
    member_status: i64,
    record: &Record,
) -> Result<usize> {
    conn.execute(
        "UPDATE workers SET member_status = ?2, updated_at = ?3, updated_by = ?4 WHERE id = ?1",
        params![id, member_status, record.updated_at, record.updated_by],
    )
}

pub fn update_worker_expiration(
    conn: &Connection,
    id: i64,
    member_expiration_date: &str,
    member_status: i64,
    record: &Record,
) -> Result<usize> {
    conn.execute(
        r#"
UPDATE workers
SET member_expiration_date = ?2, member_status = ?3, updated_at = ?4, updated_by = ?5
WHERE id = ?1
"#,
        params![
            id,
            member_expiration_date,
            member_status,
            record.updated_at,
            record.updated_by
        ],
    )
}

pub fn insert_employer(conn: &Connection, employer: &Employer) -> Result<i64> {
    conn.execute(
        r#"
INSERT INTO employers (created_at, updated_at, created_by, updated_by, name, phone, zipcode)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#,
        params![
            employer.record.created_at,
            employer.record.updated_at,
            employer.record.created_by,
            employer.record.updated_by,
            employer.name,
            employer.phone,
            employer.zipcode
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn employer_from_row(row: &Row<'_>) -> Result<Employer> {
    Ok(Employer {
        record: record_from_row(row)?,
        name: row.get(5)?,
        phone: row.get(6)?,
        zipcode: row.get(7)?,
    })
}

pub fn get_employer(conn: &Connection, id: i64) -> Result<Option<Employer>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS}, name, phone, zipcode FROM employers WHERE id = ?1"),
        params![id],
        employer_from_row,
    )
    .optional()
}

pub fn list_employers(conn: &Connection) -> Result<Vec<Employer>> {
    collect_rows(
        conn,
        &format!("SELECT {RECORD_COLUMNS}, name, phone, zipcode FROM employers ORDER BY name, id"),
        [],
        employer_from_row,
    )
}

const EVENT_COLUMNS: &str = "person_id, event_type, date_from, date_to, notes";

fn event_from_row(row: &Row<'_>) -> Result<Event> {
    Ok(Event {
        record: record_from_row(row)?,
        person_id: row.get(5)?,
        event_type: row.get(6)?,
        date_from: row.get(7)?,
        date_to: row.get(8)?,
        notes: row.get(9)?,
    })
}

pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO events (created_at, updated_at, created_by, updated_by, {EVENT_COLUMNS})
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            event.record.created_at,
            event.record.updated_at,
            event.record.created_by,
            event.record.updated_by,
            event.person_id,
            event.event_type,
            event.date_from,
            event.date_to,
            event.notes
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_event(conn: &Connection, id: i64) -> Result<Option<Event>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS}, {EVENT_COLUMNS} FROM events WHERE id = ?1"),
        params![id],
        event_from_row,
    )
    .optional()
}

pub fn update_event(conn: &Connection, event: &Event) -> Result<usize> {
    conn.execute(
        r#"
UPDATE events
SET event_type = ?2, date_from = ?3, date_to = ?4, notes = ?5,
    updated_at = ?6, updated_by = ?7
WHERE id = ?1
"#,
        params![
            event.record.id,
            event.event_type,
            event.date_from,
            event.date_to,
            event.notes,
            event.record.updated_at,
            event.record.updated_by
        ],
    )
}

pub fn delete_event(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM events WHERE id = ?1", params![id])
}

pub fn list_events_for_person(conn: &Connection, person_id: i64) -> Result<Vec<Event>> {
    collect_rows(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS}, {EVENT_COLUMNS} FROM events
WHERE person_id = ?1
ORDER BY date_from DESC, id DESC"
        ),
        params![person_id],
        event_from_row,
    )
}
