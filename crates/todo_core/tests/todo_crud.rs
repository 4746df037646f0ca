use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::Arc;
use todo_core::db::migrations::latest_version;
use todo_core::db::open_db_in_memory;
use todo_core::model::timestamp::TIMESTAMP_FORMAT;
use todo_core::{
    FixedClock, NewTodo, RepoError, SqliteTodoRepository, TodoPatch, TodoRepository, TodoService,
    TodoValidationError,
};

fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).unwrap()
}

fn repo_at<'conn>(conn: &'conn Connection, now: &str) -> SqliteTodoRepository<'conn> {
    SqliteTodoRepository::try_new(conn)
        .unwrap()
        .with_clock(Arc::new(FixedClock(at(now))))
}

#[test]
fn create_assigns_id_and_equal_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo_at(&conn, "2026-03-01 09:00:00.250");

    let todo = repo.create_todo(&NewTodo::new("Buy milk")).unwrap();

    assert_eq!(todo.id, 1);
    assert_eq!(todo.text, "Buy milk");
    assert!(!todo.is_completed);
    assert_eq!(todo.created_at, at("2026-03-01 09:00:00.250"));
    assert_eq!(todo.created_at, todo.updated_at);

    let loaded = repo.get_todo(todo.id).unwrap().unwrap();
    assert_eq!(loaded, todo);
}

#[test]
fn create_persists_timestamps_as_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo_at(&conn, "2026-03-01 09:00:00.007");
    repo.create_todo(&NewTodo::new("stamped")).unwrap();

    let (created_at, updated_at): (String, String) = conn
        .query_row("SELECT created_at, updated_at FROM todos;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(created_at, "2026-03-01 09:00:00.007");
    assert_eq!(updated_at, created_at);
}

#[test]
fn create_ids_are_unique_and_never_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let first = repo.create_todo(&NewTodo::new("first")).unwrap();
    let second = repo.create_todo(&NewTodo::new("second")).unwrap();
    assert!(repo.delete_todo(second.id).unwrap());
    let third = repo.create_todo(&NewTodo::new("third")).unwrap();

    let ids: HashSet<_> = [first.id, second.id, third.id].into_iter().collect();
    assert_eq!(ids.len(), 3);
    assert!(third.id > second.id);
}

#[test]
fn create_rejects_blank_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    for text in ["", "   ", "\t\n"] {
        let err = repo.create_todo(&NewTodo::new(text)).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(TodoValidationError::BlankText)
        ));
    }
    assert!(repo.list_todos().unwrap().is_empty());
}

#[test]
fn list_orders_by_created_at_desc_then_id_desc() {
    let conn = open_db_in_memory().unwrap();
    let early = repo_at(&conn, "2026-03-01 09:00:00.000");
    let late = repo_at(&conn, "2026-03-01 10:00:00.000");

    let a = early.create_todo(&NewTodo::new("a")).unwrap();
    let b = late.create_todo(&NewTodo::new("b")).unwrap();
    let c = early.create_todo(&NewTodo::new("c")).unwrap();

    let ids: Vec<_> = late.list_todos().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![b.id, c.id, a.id]);
}

#[test]
fn toggle_flips_flag_and_strictly_advances_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo_at(&conn, "2026-03-01 09:00:00.000");
    let created = repo.create_todo(&NewTodo::new("Walk the dog")).unwrap();

    let toggled = repo.toggle_todo(created.id).unwrap();
    assert!(toggled.is_completed);
    assert_eq!(toggled.id, created.id);
    assert_eq!(toggled.text, created.text);
    assert_eq!(toggled.created_at, created.created_at);
    assert_eq!(toggled.updated_at, at("2026-03-01 09:00:00.001"));

    let back = repo.toggle_todo(created.id).unwrap();
    assert!(!back.is_completed);
    assert!(back.updated_at > toggled.updated_at);

    assert_eq!(repo.get_todo(created.id).unwrap().unwrap(), back);
}

#[test]
fn toggle_uses_clock_when_it_has_advanced() {
    let conn = open_db_in_memory().unwrap();
    let created = repo_at(&conn, "2026-03-01 09:00:00.000")
        .create_todo(&NewTodo::new("later"))
        .unwrap();

    let toggled = repo_at(&conn, "2026-03-02 12:30:00.000")
        .toggle_todo(created.id)
        .unwrap();
    assert_eq!(toggled.updated_at, at("2026-03-02 12:30:00.000"));
    assert_eq!(toggled.created_at, created.created_at);
}

#[test]
fn toggle_missing_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let err = repo.toggle_todo(42).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn update_applies_patch_and_stamps_even_when_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo_at(&conn, "2026-03-01 09:00:00.000");
    let created = repo.create_todo(&NewTodo::new("draft")).unwrap();

    let renamed = repo
        .update_todo(
            created.id,
            &TodoPatch {
                text: Some("final".to_string()),
                is_completed: None,
            },
        )
        .unwrap();
    assert_eq!(renamed.text, "final");
    assert!(!renamed.is_completed);
    assert!(renamed.updated_at > created.updated_at);

    let touched = repo.update_todo(created.id, &TodoPatch::default()).unwrap();
    assert_eq!(touched.text, "final");
    assert!(touched.updated_at > renamed.updated_at);
}

#[test]
fn update_rejects_blank_text_and_missing_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    let created = repo.create_todo(&NewTodo::new("keep me")).unwrap();

    let blank = TodoPatch {
        text: Some("  ".to_string()),
        is_completed: None,
    };
    assert!(matches!(
        repo.update_todo(created.id, &blank).unwrap_err(),
        RepoError::Validation(TodoValidationError::BlankText)
    ));
    assert_eq!(repo.get_todo(created.id).unwrap().unwrap(), created);

    assert!(matches!(
        repo.update_todo(999, &TodoPatch::default()).unwrap_err(),
        RepoError::NotFound(999)
    ));
}

#[test]
fn delete_removes_row_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    let todo = repo.create_todo(&NewTodo::new("gone soon")).unwrap();

    assert!(repo.delete_todo(todo.id).unwrap());
    assert!(!repo.delete_todo(todo.id).unwrap());
    assert!(!repo.delete_todo(12345).unwrap());

    assert!(repo.get_todo(todo.id).unwrap().is_none());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM todos;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn wipe_all_clears_rows_and_resets_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    repo.create_todo(&NewTodo::new("one")).unwrap();
    repo.create_todo(&NewTodo::new("two")).unwrap();

    repo.wipe_all().unwrap();
    assert!(repo.list_todos().unwrap().is_empty());

    let fresh = repo.create_todo(&NewTodo::new("fresh")).unwrap();
    assert_eq!(fresh.id, 1);
}

#[test]
fn read_rejects_corrupt_completion_flag() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO todos (text, is_completed, created_at, updated_at)
         VALUES ('bad', 7, '2026-03-01 09:00:00.000', '2026-03-01 09:00:00.000');",
        [],
    )
    .unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.list_todos().unwrap_err(),
        RepoError::InvalidData(message) if message.contains("is_completed")
    ));
}

#[test]
fn read_rejects_unparsable_timestamp() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO todos (text, created_at, updated_at)
         VALUES ('bad', 'yesterday', '2026-03-01 09:00:00.000');",
        [],
    )
    .unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.get_todo(1).unwrap_err(),
        RepoError::InvalidData(message) if message.contains("created_at")
    ));
}

#[test]
fn read_returns_blank_text_row_written_by_another_writer() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo_at(&conn, "2026-03-01 09:00:00.000");
    let valid = repo.create_todo(&NewTodo::new("valid")).unwrap();
    conn.execute("INSERT INTO todos (text) VALUES ('');", []).unwrap();

    let listed = repo.list_todos().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|todo| todo.text.is_empty()));
    assert!(listed.contains(&valid));

    let blank_id = listed.iter().find(|todo| todo.text.is_empty()).unwrap().id;
    let toggled = repo.toggle_todo(blank_id).unwrap();
    assert!(toggled.is_completed);
    assert_eq!(toggled.text, "");
}

#[test]
fn second_precision_updated_at_is_readable_and_repaired_on_toggle() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo_at(&conn, "2026-03-01 09:00:00.765");
    let created = repo.create_todo(&NewTodo::new("stamped elsewhere")).unwrap();
    conn.execute(
        "UPDATE todos SET updated_at = substr(created_at, 1, 19) WHERE id = ?1;",
        [created.id],
    )
    .unwrap();

    let listed = repo.list_todos().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].updated_at, at("2026-03-01 09:00:00.000"));
    assert!(listed[0].updated_at < listed[0].created_at);

    let toggled = repo.toggle_todo(created.id).unwrap();
    assert_eq!(toggled.updated_at, at("2026-03-01 09:00:00.766"));
    assert!(toggled.created_at <= toggled.updated_at);
    assert_eq!(repo.get_todo(created.id).unwrap().unwrap(), toggled);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTodoRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_todos_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteTodoRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("todos"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteTodoRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "todos",
            column: "updated_at"
        })
    ));
}

#[test]
fn service_scenario_create_toggle_delete() {
    let conn = open_db_in_memory().unwrap();
    let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());

    let created = service.create("Buy milk").unwrap();
    let listed = service.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].text, "Buy milk");
    assert!(!listed[0].is_completed);

    let toggled = service.toggle(created.id).unwrap();
    let listed = service.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_completed);
    assert!(listed[0].updated_at > created.updated_at);
    assert_eq!(listed[0], toggled);

    assert!(service.delete(created.id).unwrap());
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn service_create_rejects_blank_text() {
    let conn = open_db_in_memory().unwrap();
    let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.create("   ").unwrap_err(),
        RepoError::Validation(_)
    ));
}
