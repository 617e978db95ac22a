use common::{Document, Membership, User, seed_users, setup_db};
use crudite::prelude::*;
use crudite::CruditeError;

mod common;

#[test]
fn update_writes_every_updatable_column() {
    let mut db = setup_db();
    let mut users = seed_users(&mut db);

    users[0].name = "Alicia".into();
    users[0].email = None;
    assert!(db.update(&users[0]).unwrap());

    let stored: User = db.get(users[0].id).unwrap().unwrap();
    assert_eq!(stored, users[0]);
}

#[test]
fn update_of_missing_row_reports_false() {
    let mut db = setup_db();
    seed_users(&mut db);

    let ghost = User {
        id: 99,
        ..User::new("Ghost", 1)
    };
    assert!(!db.update(&ghost).unwrap());
}

#[test]
fn update_by_composite_key() {
    let mut db = setup_db();
    let mut first = Membership::new("admins", 1, "member");
    let mut second = Membership::new("admins", 2, "member");
    db.insert(&mut first).unwrap();
    db.insert(&mut second).unwrap();

    first.role = "owner".into();
    assert!(db.update(&first).unwrap());

    let roles: Vec<String> = db
        .get_list::<Membership>(None, &[Sort::asc("UserId")])
        .unwrap()
        .into_iter()
        .map(|m| m.role)
        .collect();
    assert_eq!(roles, vec!["owner".to_string(), "member".to_string()]);
}

#[test]
fn update_uses_mapped_column_names() {
    let mut db = setup_db();
    let mut doc = Document::new("Draft", 1);
    db.insert(&mut doc).unwrap();

    doc.pages = 40;
    assert!(db.update(&doc).unwrap());
    assert_eq!(db.get::<Document>(doc.id).unwrap().unwrap().pages, 40);
}

#[test]
fn update_fields_assigns_matching_rows() {
    let mut db = setup_db();
    seed_users(&mut db);

    let changed = db
        .update_fields::<User>(
            &FieldSet::new().with("Age", 31),
            &FieldSet::new().with("Name", "Alice"),
        )
        .unwrap();
    assert_eq!(changed, 1);

    let alice: Vec<User> = db.where_sql("Name = 'Alice'", None).unwrap();
    assert_eq!(alice[0].age, 31);
}

#[test]
fn update_fields_matches_on_every_pair() {
    let mut db = setup_db();
    seed_users(&mut db);

    let changed = db
        .update_fields::<User>(
            &FieldSet::new().with("Email", "kid@example.com"),
            &FieldSet::new().with("Name", "Bob").with("Age", 99),
        )
        .unwrap();
    assert_eq!(changed, 0);
}

#[test]
fn update_fields_maps_property_names_to_columns() {
    let mut db = setup_db();
    let mut doc = Document::new("Handbook", 5);
    db.insert(&mut doc).unwrap();

    let changed = db
        .update_fields::<Document>(
            &FieldSet::new().with("Pages", 6),
            &FieldSet::new().with("Title", "Handbook"),
        )
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(db.get::<Document>(doc.id).unwrap().unwrap().pages, 6);
}

#[test]
fn update_fields_skips_names_that_are_also_matched() {
    let mut db = setup_db();
    seed_users(&mut db);

    let result = db.update_fields::<User>(
        &FieldSet::new().with("Name", "Zed"),
        &FieldSet::new().with("Name", "Alice"),
    );
    assert!(matches!(result, Err(CruditeError::Configuration(_))));

    let result = db.update_fields::<User>(&FieldSet::new().with("Age", 1), &FieldSet::new());
    assert!(matches!(result, Err(CruditeError::Configuration(_))));
}

#[test]
fn update_sql_runs_verbatim() {
    let mut db = setup_db();
    seed_users(&mut db);

    let changed = db.update_sql("UPDATE users SET Age = Age + 1 WHERE Age >= 18").unwrap();
    assert_eq!(changed, 2);
    assert_eq!(db.count_where::<User>(Some(&col("Age").eq(43))).unwrap(), 1);
}
