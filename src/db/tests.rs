use super::{
    find_signin_for_day, get_meta, get_worker_by_card, insert_assignment, insert_employer,
    insert_work_order, insert_worker, insert_worker_signin, list_lookups, list_signins_for_day,
    list_work_orders, open_connection, set_lottery_timestamp, work_order_summary,
    count_orphaned_assignments, CURRENT_SCHEMA_VERSION,
};
use crate::domain::attendance::WorkerSignin;
use crate::domain::work_order::{sample_order, Employer, WorkAssignment};
use crate::domain::worker::sample_worker;
use crate::test_support::{cleanup_db_files, record, unique_db_path, TempDb};
use rusqlite::params;

fn table_exists(conn: &rusqlite::Connection, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
            params![table_name],
            |row| row.get(0),
        )
        .expect("table existence query should be readable");
    exists == 1
}

#[test]
fn configures_connection_pragmas() {
    let path = unique_db_path("pragmas");
    let conn = open_connection(&path).expect("connection should open");

    let journal_mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .expect("journal_mode pragma should be readable");
    assert_eq!(journal_mode.to_uppercase(), "WAL");

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .expect("foreign_keys pragma should be readable");
    assert_eq!(foreign_keys, 1);

    let busy_timeout: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .expect("busy_timeout pragma should be readable");
    assert_eq!(busy_timeout, 5000);

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn initializes_required_tables_and_schema_version() {
    let path = unique_db_path("schema");
    let conn = open_connection(&path).expect("connection should open");

    let tables = [
        "schema_migrations",
        "meta",
        "lookups",
        "workers",
        "employers",
        "events",
        "work_orders",
        "work_assignments",
        "worker_requests",
        "worker_signins",
        "activities",
        "activity_signins",
    ];
    for table in tables {
        assert!(table_exists(&conn, table), "missing table {table}");
    }

    let version = get_meta(&conn, "schema_version")
        .expect("meta should be readable")
        .expect("schema_version should be set");
    assert_eq!(version, CURRENT_SCHEMA_VERSION.to_string());

    drop(conn);
    let reopened = open_connection(&path).expect("reopen should be idempotent");
    let applied: i64 = reopened
        .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
        .expect("migration count should be readable");
    assert_eq!(applied, CURRENT_SCHEMA_VERSION);

    drop(reopened);
    cleanup_db_files(&path);
}

#[test]
fn lookups_load_in_category_order() {
    let db = TempDb::seeded("lookups");
    let lookups = list_lookups(&db.conn).expect("lookups should load");
    let skills = lookups
        .iter()
        .filter(|lookup| lookup.category == "skill")
        .map(|lookup| lookup.id)
        .collect::<Vec<_>>();
    assert_eq!(skills, vec![60, 61, 62, 63, 64, 65, 66]);
    let carpentry = lookups.iter().find(|lookup| lookup.id == 61).expect("carpentry");
    assert!(carpentry.speciality);
    assert_eq!(carpentry.skill_code(), "C3");
}

#[test]
fn worker_card_is_unique() {
    let db = TempDb::seeded("worker-unique");
    let mut worker = sample_worker(30001);
    worker.record = record("tester");
    insert_worker(&db.conn, &worker).expect("first insert");
    assert!(insert_worker(&db.conn, &worker).is_err());

    let stored = get_worker_by_card(&db.conn, 30001)
        .expect("query")
        .expect("worker exists");
    assert_eq!(stored.first_name, "Jose");
    assert_eq!(stored.skill3, Some(61));
    assert_eq!(stored.record.created_by, "tester");
}

#[test]
fn signins_are_found_by_card_and_day() {
    let db = TempDb::seeded("signins");
    for when in ["2014-03-03 07:00:00", "2014-03-04 07:30:00"] {
        insert_worker_signin(
            &db.conn,
            &WorkerSignin {
                record: record("tester"),
                dwccardnum: 30001,
                date_for_signin: when.to_string(),
                lottery_timestamp: None,
                work_assignment_id: None,
            },
        )
        .expect("signin insert");
    }

    let found = find_signin_for_day(&db.conn, 30001, "2014-03-04")
        .expect("query")
        .expect("signin exists");
    assert_eq!(found.date_for_signin, "2014-03-04 07:30:00");
    assert!(find_signin_for_day(&db.conn, 30001, "2014-03-05")
        .expect("query")
        .is_none());

    let stamped = set_lottery_timestamp(&db.conn, found.record.id, "2014-03-04 08:00:00", &record("tester"))
        .expect("stamp");
    assert_eq!(stamped, 1);
    let again = set_lottery_timestamp(&db.conn, found.record.id, "2014-03-04 09:00:00", &record("tester"))
        .expect("second stamp");
    assert_eq!(again, 0);

    let day = list_signins_for_day(&db.conn, "2014-03-04").expect("list");
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].lottery_timestamp.as_deref(), Some("2014-03-04 08:00:00"));
}

#[test]
fn store_rejects_second_signin_on_same_day() {
    let db = TempDb::seeded("signin-unique");
    let signin = |when: &str| WorkerSignin {
        record: record("tester"),
        dwccardnum: 30001,
        date_for_signin: when.to_string(),
        lottery_timestamp: None,
        work_assignment_id: None,
    };
    insert_worker_signin(&db.conn, &signin("2014-03-04 07:30:00")).expect("first signin");
    let err = insert_worker_signin(&db.conn, &signin("2014-03-04 11:15:00"))
        .expect_err("same card, same day");
    assert!(err.to_string().contains("UNIQUE"));
    insert_worker_signin(&db.conn, &signin("2014-03-05 07:30:00")).expect("next day is fine");
    insert_worker_signin(
        &db.conn,
        &WorkerSignin {
            dwccardnum: 30002,
            ..signin("2014-03-04 07:45:00")
        },
    )
    .expect("other card, same day");
}

#[test]
fn order_summary_groups_by_day_and_status() {
    let db = TempDb::seeded("order-summary");
    let employer_id = insert_employer(
        &db.conn,
        &Employer {
            record: record("tester"),
            name: "Acme".to_string(),
            phone: None,
            zipcode: Some("98101".to_string()),
        },
    )
    .expect("employer");

    for (status, when) in [
        (10, "2014-03-03 08:00:00"),
        (10, "2014-03-03 13:00:00"),
        (12, "2014-03-03 09:00:00"),
        (12, "2014-03-04 09:00:00"),
    ] {
        let mut order = sample_order(employer_id, status, when);
        order.record = record("tester");
        insert_work_order(&db.conn, &order).expect("order");
    }

    let summary = work_order_summary(&db.conn).expect("summary");
    let rows = summary
        .iter()
        .map(|row| (row.date.as_str(), row.status, row.count))
        .collect::<Vec<_>>();
    assert_eq!(
        rows,
        vec![
            ("2014-03-04", 12, 1),
            ("2014-03-03", 10, 2),
            ("2014-03-03", 12, 1)
        ]
    );

    assert_eq!(list_work_orders(&db.conn, Some("2014-03-03")).expect("list").len(), 3);
    assert_eq!(list_work_orders(&db.conn, None).expect("list").len(), 4);
}

#[test]
fn foreign_keys_prevent_orphaned_assignments() {
    let db = TempDb::seeded("orphans");
    let assignment = WorkAssignment {
        record: record("tester"),
        work_order_id: 999,
        worker_assigned_id: None,
        worker_signin_id: None,
        skill_id: 60,
        hours: 4,
        hourly_wage: 15.0,
        description: None,
    };
    assert!(insert_assignment(&db.conn, &assignment).is_err());
    assert_eq!(count_orphaned_assignments(&db.conn).expect("count"), 0);
}
