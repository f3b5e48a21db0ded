mod common;

use common::{CallKind, MockConnection, access, row};
use recordkit::{AccessErrorKind, Error, Identity, Record, Value};

fn post_payload() -> Record {
    Record::from_pairs([
        ("language_id", Value::BigInt(1)),
        ("user_id", Value::BigInt(999)),
        ("name", Value::from("x")),
        ("title", Value::from("y")),
    ])
}

#[test]
fn create_translatable_merges_rows_and_overwrites_owner() {
    let access = access();
    let conn = MockConnection::new();

    let record = access
        .create(&conn, "post", &Identity::user(7), &post_payload())
        .unwrap();

    assert_eq!(record.id(), Some(101));
    assert_eq!(record.get("title"), Some(&Value::from("y")));
    assert_eq!(record.get("name"), Some(&Value::from("x")));
    assert_eq!(record.get("user_id"), Some(&Value::BigInt(7)));

    let state = conn.lock();
    let writes = state.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(
        writes[0].sql,
        "INSERT INTO \"posts\" (\"name\", \"user_id\") VALUES ($1, $2) RETURNING \"id\""
    );
    assert_eq!(writes[0].params, vec![Value::from("x"), Value::BigInt(7)]);
    assert_eq!(
        writes[1].sql,
        "INSERT INTO \"post_translations\" (\"language_id\", \"post_id\", \"title\") \
         VALUES ($1, $2, $3) RETURNING \"id\""
    );
    assert_eq!(
        writes[1].params,
        vec![Value::BigInt(1), Value::BigInt(101), Value::from("y")]
    );
    assert!(writes.iter().all(|c| c.in_tx));
    assert_eq!(state.commits, 1);
}

#[test]
fn create_without_language_skips_translation_row() {
    let access = access();
    let conn = MockConnection::new();
    let mut payload = post_payload();
    payload.remove("language_id");

    let record = access
        .create(&conn, "post", &Identity::user(7), &payload)
        .unwrap();
    assert!(!record.contains("title"));
    assert_eq!(conn.lock().writes().len(), 1);
}

#[test]
fn create_takes_language_from_identity() {
    let access = access();
    let conn = MockConnection::new();
    let mut payload = post_payload();
    payload.remove("language_id");

    access
        .create(&conn, "post", &Identity::user(7).with_language(4), &payload)
        .unwrap();
    let state = conn.lock();
    assert_eq!(state.writes()[1].params[0], Value::BigInt(4));
}

#[test]
fn create_failure_is_a_save_conflict() {
    let access = access();
    let conn = MockConnection::new();
    conn.fail_on("INSERT INTO \"invoices\"");

    let payload = Record::from_pairs([("total", Value::BigInt(10))]);
    let err = access
        .create(&conn, "invoice", &Identity::user(7), &payload)
        .unwrap_err();
    assert_eq!(err.access_kind(), Some(AccessErrorKind::SaveConflict));
    assert_eq!(err.access_kind().map(AccessErrorKind::status_code), Some(409));
    // The low-level cause is not exposed.
    assert!(!err.to_string().contains("scripted failure"));

    let state = conn.lock();
    assert_eq!(state.rollbacks, 1);
    assert_eq!(state.commits, 0);
}

#[test]
fn translation_failure_rolls_back_primary_insert() {
    let access = access();
    let conn = MockConnection::new();
    conn.fail_on("INSERT INTO \"post_translations\"");

    let err = access
        .create(&conn, "post", &Identity::user(7), &post_payload())
        .unwrap_err();
    assert_eq!(err.access_kind(), Some(AccessErrorKind::SaveConflict));

    let state = conn.lock();
    assert_eq!(state.writes().len(), 2);
    assert_eq!(state.rollbacks, 1);
    assert_eq!(state.commits, 0);
}

#[test]
fn update_missing_record_is_not_found_before_any_write() {
    let access = access();
    let conn = MockConnection::new();
    let payload = Record::from_pairs([("total", Value::BigInt(10))]);

    let err = access
        .update(&conn, "invoice", &Identity::user(7), 42, &payload)
        .unwrap_err();
    assert!(err.is_not_found());

    let state = conn.lock();
    assert!(state.writes().is_empty());
    assert_eq!(state.queries().len(), 1);
    assert_eq!(
        state.calls[0].sql,
        "SELECT \"invoices\".* FROM \"invoices\" WHERE \"invoices\".\"id\" = $1 LIMIT 1"
    );
}

#[test]
fn update_of_foreign_record_is_denied_without_mutation() {
    let access = access();
    let conn = MockConnection::new();
    conn.on_query(
        "FROM \"invoices\"",
        vec![row(&[("id", Value::BigInt(3)), ("user_id", Value::BigInt(8))])],
    );
    let payload = Record::from_pairs([("total", Value::BigInt(10))]);

    let err = access
        .update(&conn, "invoice", &Identity::user(7), 3, &payload)
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert_eq!(err.access_kind().map(AccessErrorKind::status_code), Some(403));

    let state = conn.lock();
    assert!(state.writes().is_empty());
    assert_eq!(state.commits, 0);
}

#[test]
fn elevated_caller_may_update_foreign_record() {
    let access = access();
    let conn = MockConnection::new();
    conn.on_query(
        "FROM \"invoices\"",
        vec![row(&[
            ("id", Value::BigInt(3)),
            ("user_id", Value::BigInt(8)),
            ("total", Value::BigInt(5)),
        ])],
    );
    let payload = Record::from_pairs([("total", Value::BigInt(10)), ("user_id", Value::BigInt(9))]);

    let record = access
        .update(&conn, "invoice", &Identity::user(1).elevated(), 3, &payload)
        .unwrap();
    assert_eq!(record.get("total"), Some(&Value::BigInt(10)));
    assert_eq!(record.get("user_id"), Some(&Value::BigInt(9)));
}

#[test]
fn update_syncs_existing_translation_row() {
    let access = access();
    let conn = MockConnection::new();
    conn.on_query(
        "FROM \"posts\"",
        vec![row(&[
            ("id", Value::BigInt(3)),
            ("user_id", Value::BigInt(7)),
            ("name", Value::from("old")),
        ])],
    )
    .on_query(
        "FROM \"post_translations\"",
        vec![row(&[
            ("id", Value::BigInt(11)),
            ("post_id", Value::BigInt(3)),
            ("language_id", Value::BigInt(2)),
            ("title", Value::from("Alt")),
        ])],
    );
    let payload = Record::from_pairs([
        ("language_id", Value::BigInt(2)),
        ("name", Value::from("new")),
        ("title", Value::from("Neu")),
        ("user_id", Value::BigInt(99)),
    ]);

    let record = access
        .update(&conn, "post", &Identity::user(7), 3, &payload)
        .unwrap();
    assert_eq!(record.id(), Some(3));
    assert_eq!(record.get("name"), Some(&Value::from("new")));
    assert_eq!(record.get("title"), Some(&Value::from("Neu")));
    // Owner changes need elevated permission.
    assert_eq!(record.get("user_id"), Some(&Value::BigInt(7)));

    let state = conn.lock();
    let writes = state.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(
        writes[0].sql,
        "UPDATE \"posts\" SET \"name\" = $1 WHERE \"posts\".\"id\" = $2"
    );
    assert_eq!(
        writes[1].sql,
        "UPDATE \"post_translations\" SET \"title\" = $1 WHERE \"post_translations\".\"id\" = $2"
    );
    assert_eq!(writes[1].params, vec![Value::from("Neu"), Value::BigInt(11)]);
    assert_eq!(state.commits, 1);
}

#[test]
fn update_creates_missing_translation_row() {
    let access = access();
    let conn = MockConnection::new();
    conn.on_query(
        "FROM \"posts\"",
        vec![row(&[("id", Value::BigInt(3)), ("user_id", Value::BigInt(7))])],
    );
    let payload = Record::from_pairs([
        ("language_id", Value::BigInt(2)),
        ("title", Value::from("Neu")),
    ]);

    let record = access
        .update(&conn, "post", &Identity::user(7), 3, &payload)
        .unwrap();
    assert_eq!(record.id(), Some(3));
    assert_eq!(record.get("title"), Some(&Value::from("Neu")));

    let state = conn.lock();
    let writes = state.writes();
    // No primary columns changed, so only the translation insert runs.
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].kind, CallKind::Insert);
    assert!(writes[0].sql.starts_with("INSERT INTO \"post_translations\""));
}

#[test]
fn update_write_failure_is_returned_unmapped() {
    let access = access();
    let conn = MockConnection::new();
    conn.on_query(
        "FROM \"invoices\"",
        vec![row(&[("id", Value::BigInt(3)), ("user_id", Value::BigInt(7))])],
    )
    .fail_on("UPDATE \"invoices\"");
    let payload = Record::from_pairs([("total", Value::BigInt(10))]);

    let err = access
        .update(&conn, "invoice", &Identity::user(7), 3, &payload)
        .unwrap_err();
    assert!(matches!(err, Error::Query(_)));
    assert_eq!(err.access_kind(), None);
    assert_eq!(conn.lock().rollbacks, 1);
}

#[test]
fn non_owner_managed_entity_needs_elevation() {
    let access = access();
    let conn = MockConnection::new();
    conn.on_query(
        "FROM \"countries\"",
        vec![row(&[("id", Value::BigInt(1)), ("code", Value::from("ES"))])],
    );
    let payload = Record::from_pairs([("code", Value::from("PT"))]);

    let err = access
        .update(&conn, "country", &Identity::user(7), 1, &payload)
        .unwrap_err();
    assert!(err.is_permission_denied());

    let record = access
        .update(&conn, "country", &Identity::user(7).elevated(), 1, &payload)
        .unwrap();
    assert_eq!(record.get("code"), Some(&Value::from("PT")));
    // No language anywhere, so the translation row is left alone.
    assert_eq!(conn.lock().writes().len(), 1);
}

#[test]
fn delete_owned_record() {
    let access = access();
    let conn = MockConnection::new();
    conn.on_query(
        "FROM \"invoices\"",
        vec![row(&[("id", Value::BigInt(3)), ("user_id", Value::BigInt(7))])],
    );

    access
        .delete(&conn, "invoice", &Identity::user(7), 3)
        .unwrap();

    let state = conn.lock();
    let writes = state.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0].sql,
        "DELETE FROM \"invoices\" WHERE \"invoices\".\"id\" = $1"
    );
    assert_eq!(state.commits, 1);
}

#[test]
fn delete_checks_existence_and_ownership() {
    let access = access();
    let conn = MockConnection::new();
    let err = access
        .delete(&conn, "invoice", &Identity::user(7), 3)
        .unwrap_err();
    assert!(err.is_not_found());

    conn.on_query(
        "FROM \"invoices\"",
        vec![row(&[("id", Value::BigInt(3)), ("user_id", Value::BigInt(8))])],
    );
    let err = access
        .delete(&conn, "invoice", &Identity::user(7), 3)
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert!(conn.lock().writes().is_empty());
}

#[test]
fn delete_failure_is_a_destroy_conflict() {
    let access = access();
    let conn = MockConnection::new();
    conn.on_query(
        "FROM \"invoices\"",
        vec![row(&[("id", Value::BigInt(3)), ("user_id", Value::BigInt(7))])],
    )
    .fail_on("DELETE FROM");

    let err = access
        .delete(&conn, "invoice", &Identity::user(7), 3)
        .unwrap_err();
    match err {
        Error::Access(e) => {
            assert_eq!(e.kind, AccessErrorKind::DestroyConflict);
            assert_eq!(e.id, Some(3));
            assert_eq!(e.entity, "invoice");
        }
        other => panic!("expected destroy conflict, got {other}"),
    }
    assert_eq!(conn.lock().rollbacks, 1);
}

struct Spanish;

impl recordkit::MessageCatalog for Spanish {
    fn message(&self, key: &str, entity: &str) -> String {
        match key {
            "record.not_found" => format!("No existe el registro {entity}"),
            other => other.to_string(),
        }
    }
}

#[test]
fn custom_catalog_supplies_client_text() {
    let access = access().with_messages(Spanish);
    let conn = MockConnection::new();
    let err = access
        .delete(&conn, "invoice", &Identity::user(7), 5)
        .unwrap_err();
    match err {
        Error::Access(e) => {
            assert_eq!(e.kind, AccessErrorKind::NotFound);
            assert_eq!(e.message, "No existe el registro invoice");
        }
        other => panic!("expected not found, got {other}"),
    }
}
