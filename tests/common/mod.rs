#![allow(dead_code)]

use crudite::prelude::*;
use crudite::sqlite::SqliteConnection;
use crudite::{BufferedResultSets, CruditeError, Parameters, ResultSet, ResultSets};
use std::collections::VecDeque;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub age: i32,
}

impl User {
    pub fn new(name: &str, age: i32) -> Self {
        Self {
            name: name.to_string(),
            age,
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }
}

impl Entity for User {
    fn class_map(builder: ClassMapBuilder<Self>) -> Result<ClassMap<Self>> {
        builder
            .table("users")
            .identity("Id", |u: &User| u.id.into(), |u, v| { u.id = v.convert()?; Ok(()) })
            .column("Name", |u: &User| u.name.as_str().into(), |u, v| { u.name = v.convert()?; Ok(()) })
            .column("Email", |u: &User| u.email.clone().into(), |u, v| { u.email = v.convert()?; Ok(()) })
            .column("Age", |u: &User| u.age.into(), |u, v| { u.age = v.convert()?; Ok(()) })
            .build()
    }
}

/// Keyed by a generated uuid; `Pages` maps to the `page_count` column.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub pages: i32,
    pub scratch: String,
}

impl Document {
    pub fn new(title: &str, pages: i32) -> Self {
        Self {
            title: title.to_string(),
            pages,
            ..Default::default()
        }
    }
}

impl Entity for Document {
    fn class_map(builder: ClassMapBuilder<Self>) -> Result<ClassMap<Self>> {
        builder
            .table("documents")
            .surrogate("Id", |d: &Document| d.id.into(), |d, v| { d.id = v.convert()?; Ok(()) })
            .column("Title", |d: &Document| d.title.as_str().into(), |d, v| {
                d.title = v.convert()?;
                Ok(())
            })
            .column("Pages", |d: &Document| d.pages.into(), |d, v| { d.pages = v.convert()?; Ok(()) })
            .column_name("page_count")
            .column("Scratch", |d: &Document| d.scratch.as_str().into(), |d, v| {
                d.scratch = v.convert()?;
                Ok(())
            })
            .ignored()
            .build()
    }
}

/// Two caller-assigned key columns.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Membership {
    pub group_code: String,
    pub user_id: i64,
    pub role: String,
}

impl Membership {
    pub fn new(group_code: &str, user_id: i64, role: &str) -> Self {
        Self {
            group_code: group_code.to_string(),
            user_id,
            role: role.to_string(),
        }
    }
}

impl Entity for Membership {
    fn class_map(builder: ClassMapBuilder<Self>) -> Result<ClassMap<Self>> {
        builder
            .table("memberships")
            .assigned("GroupCode", |m: &Membership| m.group_code.as_str().into(), |m, v| {
                m.group_code = v.convert()?;
                Ok(())
            })
            .assigned("UserId", |m: &Membership| m.user_id.into(), |m, v| {
                m.user_id = v.convert()?;
                Ok(())
            })
            .column("Role", |m: &Membership| m.role.as_str().into(), |m, v| {
                m.role = v.convert()?;
                Ok(())
            })
            .build()
    }
}

const SCHEMA: &str = "
    CREATE TABLE users (
        Id INTEGER PRIMARY KEY AUTOINCREMENT,
        Name TEXT NOT NULL,
        Email TEXT,
        Age INTEGER NOT NULL
    );
    CREATE TABLE documents (
        Id TEXT PRIMARY KEY,
        Title TEXT NOT NULL,
        page_count INTEGER NOT NULL
    );
    CREATE TABLE memberships (
        GroupCode TEXT NOT NULL,
        UserId INTEGER NOT NULL,
        Role TEXT NOT NULL,
        PRIMARY KEY (GroupCode, UserId)
    );
";

pub fn setup_db() -> Database<SqliteConnection> {
    let conn = SqliteConnection::open_in_memory().expect("open in-memory database");
    conn.inner().execute_batch(SCHEMA).expect("create tables");
    Database::new(conn, Configuration::new(Dialect::SQLite))
}

/// Alice (30), Bob (17, no email) and Carol (42), inserted in that order.
pub fn seed_users(db: &mut Database<SqliteConnection>) -> Vec<User> {
    let mut users = vec![
        User::new("Alice", 30).with_email("alice@example.com"),
        User::new("Bob", 17),
        User::new("Carol", 42).with_email("carol@example.com"),
    ];
    for user in users.iter_mut() {
        db.insert(user).expect("insert seed user");
    }
    users
}

/// Records every round trip and answers queries from a queue of canned sets.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    pub round_trips: Vec<String>,
    pub responses: VecDeque<ResultSet>,
    pub active: bool,
    pub fail_commit: bool,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, set: ResultSet) -> Self {
        self.responses.push_back(set);
        self
    }

    /// COMMIT errors and leaves the transaction open.
    pub fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }
}

pub fn users_set(rows: &[(i64, &str, i32)]) -> ResultSet {
    ResultSet::from_rows(
        vec!["Id".into(), "Name".into(), "Email".into(), "Age".into()],
        rows.iter()
            .map(|(id, name, age)| {
                vec![Value::Integer(*id), Value::from(*name), Value::Null, Value::from(*age)]
            })
            .collect(),
    )
}

pub fn documents_set(rows: &[(Uuid, &str, i32)]) -> ResultSet {
    ResultSet::from_rows(
        vec!["Id".into(), "Title".into(), "page_count".into()],
        rows.iter()
            .map(|(id, title, pages)| vec![Value::Uuid(*id), Value::from(*title), Value::from(*pages)])
            .collect(),
    )
}

pub fn scalar_set(column: &str, value: i64) -> ResultSet {
    ResultSet::from_rows(vec![column.to_string()], vec![vec![Value::Integer(value)]])
}

impl Connection for RecordingConnection {
    fn execute(&mut self, sql: &str, _params: &Parameters, _timeout: Option<Duration>) -> Result<u64> {
        self.round_trips.push(sql.to_string());
        Ok(1)
    }

    fn query(&mut self, sql: &str, _params: &Parameters, _timeout: Option<Duration>) -> Result<ResultSet> {
        self.round_trips.push(sql.to_string());
        Ok(self.responses.pop_front().unwrap_or_default())
    }

    fn query_multiple(
        &mut self,
        sql: &str,
        _params: &Parameters,
        _timeout: Option<Duration>,
    ) -> Result<Box<dyn ResultSets + '_>> {
        self.round_trips.push(sql.to_string());
        Ok(Box::new(BufferedResultSets::new(self.responses.drain(..))))
    }

    fn begin(&mut self, _isolation: IsolationLevel) -> Result<()> {
        self.round_trips.push("BEGIN".into());
        self.active = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.round_trips.push("COMMIT".into());
        if self.fail_commit {
            return Err(CruditeError::Execution("commit rejected".into()));
        }
        self.active = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.round_trips.push("ROLLBACK".into());
        self.active = false;
        Ok(())
    }

    fn has_active_transaction(&self) -> bool {
        self.active
    }
}

pub fn recording_db(dialect: Dialect, conn: RecordingConnection) -> Database<RecordingConnection> {
    Database::new(conn, Configuration::new(dialect))
}
