use common::{Document, Membership, User, seed_users, setup_db};
use crudite::prelude::*;
use crudite::CruditeError;

mod common;

#[test]
fn delete_entity_by_its_key() {
    let mut db = setup_db();
    let users = seed_users(&mut db);

    assert!(db.delete(&users[1]).unwrap());
    assert!(!db.delete(&users[1]).unwrap());
    assert_eq!(db.count::<User>(None).unwrap(), 2);
    assert!(db.get::<User>(users[1].id).unwrap().is_none());
}

#[test]
fn delete_by_scalar_id() {
    let mut db = setup_db();
    let mut doc = Document::new("Old", 1);
    db.insert(&mut doc).unwrap();

    assert!(db.delete_by_id::<Document>(doc.id).unwrap());
    assert_eq!(db.count::<Document>(None).unwrap(), 0);
}

#[test]
fn delete_by_composite_id() {
    let mut db = setup_db();
    db.insert(&mut Membership::new("ops", 1, "member")).unwrap();
    db.insert(&mut Membership::new("ops", 2, "member")).unwrap();

    let id = Id::composite([("GroupCode", Value::from("ops")), ("UserId", Value::from(2))]);
    assert!(db.delete_by_id::<Membership>(id).unwrap());

    let left: Vec<Membership> = db.get_list(None, &[]).unwrap();
    assert_eq!(left, vec![Membership::new("ops", 1, "member")]);
}

#[test]
fn scalar_id_needs_exactly_one_key() {
    let mut db = setup_db();
    let result = db.delete_by_id::<Membership>(1);
    assert!(matches!(result, Err(CruditeError::Configuration(_))));
}

#[test]
fn delete_where_predicate() {
    let mut db = setup_db();
    seed_users(&mut db);

    assert!(db.delete_where::<User>(Predicate::field("Age", Operator::Lt, 18)).unwrap());
    let names: Vec<String> = db
        .get_list::<User>(None, &[Sort::asc("Name")])
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Alice".to_string(), "Carol".to_string()]);
}

#[test]
fn delete_where_example() {
    let mut db = setup_db();
    seed_users(&mut db);

    assert!(db.delete_where::<User>(Example::new().with("Name", "Carol").with("Age", 42)).unwrap());
    assert!(!db.delete_where::<User>(Example::new().with("Name", "Carol")).unwrap());
    assert_eq!(db.count::<User>(None).unwrap(), 2);
}

#[test]
fn delete_where_empty_example_removes_everything() {
    let mut db = setup_db();
    seed_users(&mut db);

    assert!(db.delete_where::<User>(Example::new()).unwrap());
    assert_eq!(db.count::<User>(None).unwrap(), 0);
}
