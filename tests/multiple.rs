use common::{
    Document, RecordingConnection, User, documents_set, recording_db, seed_users, setup_db, users_set,
};
use crudite::prelude::*;
use crudite::CruditeError;
use uuid::Uuid;

mod common;

fn query() -> MultiQuery {
    MultiQuery::new()
        .add::<User>(Some(Predicate::field("Age", Operator::Ge, 18).into()), &[Sort::asc("Name")])
        .add::<Document>(None, &[])
        .add::<User>(Some(Predicate::eq("Name", "Bob").into()), &[])
}

#[test]
fn sequential_reads_against_sqlite() {
    let mut db = setup_db();
    seed_users(&mut db);
    db.insert(&mut Document::new("Guide", 3)).unwrap();

    let mut reader = db.get_multiple(&query()).unwrap();
    assert!(!reader.is_batched());
    assert_eq!(reader.remaining(), 3);

    let adults = reader.read::<User>().unwrap();
    let docs = reader.read::<Document>().unwrap();
    let bob = reader.read::<User>().unwrap();

    assert_eq!(adults.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(), ["Alice", "Carol"]);
    assert_eq!(docs[0].title, "Guide");
    assert_eq!(bob[0].age, 17);
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn one_round_trip_when_batching_is_supported() {
    let doc_id = Uuid::new_v4();
    let conn = RecordingConnection::new()
        .respond(users_set(&[(1, "Alice", 30), (3, "Carol", 42)]))
        .respond(documents_set(&[(doc_id, "Guide", 3)]))
        .respond(users_set(&[(2, "Bob", 17)]));
    let mut db = recording_db(Dialect::SqlServer, conn);

    {
        let mut reader = db.get_multiple(&query()).unwrap();
        assert!(reader.is_batched());
        assert_eq!(reader.read::<User>().unwrap().len(), 2);
        assert_eq!(reader.read::<Document>().unwrap()[0].id, doc_id);
        assert_eq!(reader.read::<User>().unwrap()[0].name, "Bob");
    }

    let trips = &db.connection().round_trips;
    assert_eq!(trips.len(), 1);
    assert_eq!(
        trips[0],
        "SELECT [Id], [Name], [Email], [Age] FROM [users] WHERE ([Age] >= @p0) ORDER BY [Name] ASC;\n\
         SELECT [Id], [Title], [page_count] FROM [documents];\n\
         SELECT [Id], [Name], [Email], [Age] FROM [users] WHERE ([Name] = @p1)"
    );
}

#[test]
fn one_round_trip_per_query_without_batching() {
    let conn = RecordingConnection::new()
        .respond(users_set(&[]))
        .respond(documents_set(&[]))
        .respond(users_set(&[]));
    let mut db = recording_db(Dialect::SQLite, conn);

    {
        let mut reader = db.get_multiple(&query()).unwrap();
        assert!(!reader.is_batched());
        reader.read::<User>().unwrap();
        reader.read::<Document>().unwrap();
        reader.read::<User>().unwrap();
    }

    let trips = &db.connection().round_trips;
    assert_eq!(trips.len(), 3);
    assert!(trips[1].starts_with(r#"SELECT "Id", "Title", "page_count" FROM "documents""#));
    assert!(trips[2].ends_with(r#"WHERE ("Name" = @p0)"#));
}

#[test]
fn reading_out_of_order_is_misuse() {
    let mut db = setup_db();
    let mut reader = db.get_multiple(&query()).unwrap();

    let result = reader.read::<Document>();
    assert!(matches!(result, Err(CruditeError::ReaderMisuse(_))));

    // The failed read leaves the position unchanged.
    assert_eq!(reader.remaining(), 3);
    reader.read::<User>().unwrap();
}

#[test]
fn reading_past_the_end_is_misuse() {
    let mut db = setup_db();
    let mut reader = db
        .get_multiple(&MultiQuery::new().add::<User>(None, &[]))
        .unwrap();

    reader.read::<User>().unwrap();
    let result = reader.read::<User>();
    assert!(matches!(result, Err(CruditeError::ReaderMisuse(_))));
}
