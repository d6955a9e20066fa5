#![allow(dead_code)]

use joinery::test_helpers::MockExecutor;
use joinery::{EntityMapper, FromRecord, Orm, OrmError, Record, Relation, Row, Value};
use std::sync::Arc;

pub const USER_COLUMNS: &[&str] = &["id", "name", "email"];
pub const POST_COLUMNS: &[&str] = &["id", "title", "content", "userId"];
pub const ROLE_COLUMNS: &[&str] = &["id", "name"];

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub posts: Option<Vec<Post>>,
    pub roles: Option<Vec<Role>>,
}

impl FromRecord for Post {
    fn from_record(record: Record) -> Result<Self, OrmError> {
        Ok(Post {
            id: record.get("id")?,
            title: record.get("title")?,
            user_id: record.get("userId")?,
        })
    }
}

impl FromRecord for Role {
    fn from_record(record: Record) -> Result<Self, OrmError> {
        Ok(Role {
            id: record.get("id")?,
            name: record.get("name")?,
        })
    }
}

impl FromRecord for User {
    fn from_record(mut record: Record) -> Result<Self, OrmError> {
        Ok(User {
            id: record.get("id")?,
            name: record.get("name")?,
            email: record.get("email")?,
            posts: record.take_related("posts")?,
            roles: record.take_related("roles")?,
        })
    }
}

/// Executor knowing the users / posts / roles tables across two schemas.
pub fn executor() -> Arc<MockExecutor> {
    Arc::new(
        MockExecutor::new()
            .with_table("test_main", "users", USER_COLUMNS)
            .with_table("test_secondary", "posts", POST_COLUMNS)
            .with_table("test_main", "roles", ROLE_COLUMNS),
    )
}

/// A users mapper with `posts` (one-to-many) and `roles` (many-to-many).
pub fn users<E: FromRecord>(orm: &Orm) -> EntityMapper<E> {
    let posts = orm.mapper::<Post>("test_secondary", "posts");
    let roles = orm.mapper::<Role>("test_main", "roles");

    let mut mapper = orm.mapper("test_main", "users");
    mapper
        .add_relation("posts", Relation::one_to_many(posts.table().clone(), "userId"))
        .expect("posts relation is valid")
        .add_relation(
            "roles",
            Relation::many_to_many(roles.table().clone(), "user_roles", "user_id", "role_id"),
        )
        .expect("roles relation is valid");
    mapper
}

pub fn user_row(id: i64, name: &str, email: &str) -> Row {
    Row::new().with("id", id).with("name", name).with("email", email)
}

/// `user_row` extended with the aliased columns of one post (or a LEFT JOIN miss).
pub fn with_post(row: Row, post: Option<(i64, &str, i64)>) -> Row {
    match post {
        Some((id, title, user_id)) => row
            .with("posts_id", id)
            .with("posts_title", title)
            .with("posts_content", Value::Null)
            .with("posts_userId", user_id),
        None => POST_COLUMNS
            .iter()
            .fold(row, |row, col| row.with(format!("posts_{col}"), Value::Null)),
    }
}

pub fn with_role(row: Row, role: Option<(i64, &str)>) -> Row {
    match role {
        Some((id, name)) => row.with("roles_id", id).with("roles_name", name),
        None => row.with("roles_id", Value::Null).with("roles_name", Value::Null),
    }
}
