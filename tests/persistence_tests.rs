//! Integration tests for on-disk tables: file layout, reopening, external
//! edits and debug tracing

use rustjsondb::{DbConfig, JsonDB, JsonDbError, Operator, Record, Routed};
use serde_json::{Value, json};
use std::fs;
use std::io;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory sink for formatted tracing output.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn run_with_logs<F: FnOnce()>(f: F) -> String {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("rustjsondb=debug")
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    logs.contents()
}

fn read_blob(dir: &TempDir, file: &str) -> Value {
    let bytes = fs::read(dir.path().join(file)).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_table_is_one_json_array_file() {
    let temp_dir = TempDir::new().unwrap();
    let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();

    let mut users = db.table("users").unwrap();
    assert_eq!(read_blob(&temp_dir, "users.json"), json!([]));

    let alice = users
        .insert(Record::new().with("name", "Alice").with("age", 30))
        .unwrap();
    let blob = read_blob(&temp_dir, "users.json");
    assert_eq!(
        blob,
        json!([{"name": "Alice", "age": 30, "id": alice.id().unwrap()}])
    );
}

#[test]
fn test_table_names_are_sanitized() {
    let temp_dir = TempDir::new().unwrap();
    let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();

    let session = db.table("../Order Items").unwrap();
    assert_eq!(session.table_name(), Some("___order_items"));
    assert!(temp_dir.path().join("___order_items.json").is_file());

    assert!(matches!(db.table(""), Err(JsonDbError::InvalidQuery(_))));
}

#[test]
fn test_custom_extension() {
    let temp_dir = TempDir::new().unwrap();
    let db = JsonDB::open(temp_dir.path(), DbConfig::new().extension(".db")).unwrap();
    db.table("logs").unwrap();
    assert!(temp_dir.path().join("logs.db").is_file());
    assert_eq!(db.list_tables().unwrap(), vec!["logs"]);
}

#[test]
fn test_reopen_sees_previous_writes() {
    let temp_dir = TempDir::new().unwrap();
    let id = {
        let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();
        let mut notes = db.table("notes").unwrap();
        notes
            .insert_many(vec![
                Record::new().with("text", "first").with("pinned", true),
                Record::new().with("text", "second").with("pinned", false),
            ])
            .unwrap();
        notes.last_insert_id().unwrap().unwrap()
    };

    let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();
    assert_eq!(db.list_tables().unwrap(), vec!["notes"]);

    let mut pinned = db
        .table("notes")
        .unwrap()
        .filter("pinned", Operator::Eq, true)
        .unwrap();
    let result = pinned.get().unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].get("text"), Some(&json!("first")));

    let second = db.table("notes").unwrap().get_by_id(&id).unwrap().unwrap();
    assert_eq!(second.get("text"), Some(&json!("second")));
}

#[test]
fn test_update_merges_into_current_file_content() {
    let temp_dir = TempDir::new().unwrap();
    let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();
    db.table("stock")
        .unwrap()
        .populate(vec![Record::new().with("id", "a").with("qty", 1)])
        .unwrap();

    let mut session = db
        .table("stock")
        .unwrap()
        .filter("qty", Operator::Eq, 1)
        .unwrap();
    session.get().unwrap();

    // Another writer appends while this session holds its entries
    let mut blob = read_blob(&temp_dir, "stock.json");
    blob.as_array_mut().unwrap().push(json!({"id": "b", "qty": 5}));
    fs::write(temp_dir.path().join("stock.json"), blob.to_string()).unwrap();

    assert_eq!(session.update(json!({"qty": 2})).unwrap(), 1);
    assert_eq!(
        read_blob(&temp_dir, "stock.json"),
        json!([{"id": "a", "qty": 2}, {"id": "b", "qty": 5}])
    );
}

#[test]
fn test_destroy_removes_file() {
    let temp_dir = TempDir::new().unwrap();
    let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();
    let mut tmp = db.table("tmp").unwrap();
    tmp.insert(Record::new().with("k", 1)).unwrap();

    tmp.destroy().unwrap();
    assert!(!temp_dir.path().join("tmp.json").exists());
    assert!(db.list_tables().unwrap().is_empty());
}

#[test]
fn test_corrupt_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("bad.json"), "[{\"id\": \"a\"").unwrap();
    let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();

    let result = db.table("bad").unwrap().get();
    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, JsonDbError::CorruptTable { ref table, .. } if table == "bad"));
}

#[test]
fn test_empty_file_reads_as_empty_table() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("blank.json"), "").unwrap();
    let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();
    assert_eq!(db.table("blank").unwrap().count().unwrap(), 0);
}

#[test]
fn test_missing_directory_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("file");
    fs::write(&blocker, "x").unwrap();

    let result = JsonDB::open(blocker.join("nested"), DbConfig::default());
    let mut reported = false;
    let routed = result.route(|_| {}, |_| reported = true);
    assert!(matches!(routed, Err(JsonDbError::DirectoryInitFailure { .. })));
    assert!(!reported);
}

#[test]
fn test_update_without_ids_is_persisted() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("tasks.json"),
        r#"[{"status":"new","n":1},{"status":"new","n":2}]"#,
    )
    .unwrap();
    let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();

    let updated = db
        .table("tasks")
        .unwrap()
        .filter("n", Operator::Eq, 1)
        .unwrap()
        .update(json!({"status": "done"}))
        .unwrap();
    assert_eq!(updated, 1);
    assert_eq!(
        read_blob(&temp_dir, "tasks.json"),
        json!([{"status": "done", "n": 1}, {"status": "new", "n": 2}])
    );

    let done = db
        .table("tasks")
        .unwrap()
        .filter("status", Operator::Eq, "done")
        .unwrap()
        .get()
        .unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].get("n"), Some(&json!(1)));
}

#[test]
fn test_debug_mode_emits_timed_events() {
    let config = DbConfig::from_json(r#"{"debug": true, "caseSensitive": true}"#).unwrap();
    assert!(config.debug && config.case_sensitive);

    let temp_dir = TempDir::new().unwrap();
    let output = run_with_logs(|| {
        let db = JsonDB::open(temp_dir.path(), config).unwrap();
        let mut events = db.table("events").unwrap();
        events.insert(Record::new().with("kind", "Login")).unwrap();
        let found = events
            .filter("kind", Operator::Eq, "login")
            .unwrap()
            .count()
            .unwrap();
        assert_eq!(found, 0);
    });

    assert!(output.contains("DEBUG"), "{}", output);
    assert!(output.contains("elapsed_ms="), "{}", output);
    assert!(output.contains("insert finished"), "{}", output);
    assert!(output.contains("entries fetched"), "{}", output);
}

#[test]
fn test_quiet_mode_emits_no_debug_events() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_with_logs(|| {
        let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();
        let mut events = db.table("events").unwrap();
        events.insert(Record::new().with("kind", "Login")).unwrap();
        events.get().unwrap();
    });

    assert!(!output.contains("DEBUG"), "{}", output);
    assert!(!output.contains("elapsed_ms="), "{}", output);
}
