mod common;

use common::{executor, user_row, users, with_post, with_role, Post, Role, User};
use joinery::{Criteria, FindOptions, Orm, OrmError, Record, Relation, TableRef, Value};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

#[test]
fn user_with_one_post_and_user_with_none() {
    let db = executor();
    db.push_rows(vec![
        with_post(user_row(1, "John Doe", "john@example.com"), Some((1, "First Post", 1))),
        with_post(user_row(2, "Jane Doe", "jane@example.com"), None),
    ]);
    let orm = Orm::new(db.clone());

    let found: Vec<User> = users(&orm).find_all(&FindOptions::new().with("posts")).unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(
        found[0].posts,
        Some(vec![Post {
            id: 1,
            title: "First Post".into(),
            user_id: 1
        }])
    );
    assert_eq!(found[1].posts, Some(vec![]));
    assert_eq!(found[0].roles, None);
}

#[test]
fn find_all_without_options_has_no_relation_keys() {
    let db = executor();
    db.push_rows(vec![user_row(1, "John Doe", "john@example.com")]);
    let orm = Orm::new(db.clone());

    let found: Vec<Record> = users(&orm).find_all(&FindOptions::new()).unwrap();

    assert_eq!(
        serde_json::to_value(&found).unwrap(),
        json!([{ "id": 1, "name": "John Doe", "email": "john@example.com" }])
    );
    assert!(!db.captured_sql()[0].contains("JOIN"));
}

#[test]
fn requested_relation_is_always_an_array() {
    let db = executor();
    db.push_rows(vec![
        with_role(user_row(1, "John Doe", "john@example.com"), None),
        with_role(user_row(2, "Jane Doe", "jane@example.com"), None),
    ]);
    let orm = Orm::new(db.clone());

    let found: Vec<Record> = users(&orm).find_all(&FindOptions::new().with("roles")).unwrap();

    for record in &found {
        assert_eq!(record.related("roles"), Some(&[][..]));
    }
}

#[test]
fn duplicate_user_role_rows_yield_one_role() {
    let db = executor();
    let admin = || with_role(user_row(1, "John Doe", "john@example.com"), Some((1, "Admin")));
    db.push_rows(vec![admin(), admin()]);
    let orm = Orm::new(db.clone());

    let found: Vec<User> = users(&orm).find_all(&FindOptions::new().with("roles")).unwrap();

    assert_eq!(
        found[0].roles,
        Some(vec![Role {
            id: 1,
            name: "Admin".into()
        }])
    );
    let sql = &db.captured_sql()[0];
    assert!(sql.contains(
        r#"LEFT JOIN "test_main"."user_roles" ON "test_main"."users"."id" = "test_main"."user_roles"."user_id""#
    ));
    assert!(sql.contains(
        r#"LEFT JOIN "test_main"."roles" ON "test_main"."user_roles"."role_id" = "test_main"."roles"."id""#
    ));
}

#[test]
fn many_to_many_arrays_never_repeat_an_id() {
    let db = executor();
    let row = |user: i64, role: i64| {
        with_role(user_row(user, "u", "u@example.com"), Some((role, "r")))
    };
    db.push_rows(vec![row(1, 1), row(1, 2), row(2, 2), row(1, 1), row(2, 2), row(1, 2)]);
    let orm = Orm::new(db.clone());

    let found: Vec<User> = users(&orm).find_all(&FindOptions::new().with("roles")).unwrap();

    for user in &found {
        let mut ids: Vec<i64> = user.roles.iter().flatten().map(|r| r.id).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before, "duplicate role for user {}", user.id);
    }
    assert_eq!(found[0].roles.as_ref().map(Vec::len), Some(2));
    assert_eq!(found[1].roles.as_ref().map(Vec::len), Some(1));
}

#[test]
fn find_by_name_binds_the_value() {
    let db = executor();
    db.push_rows(vec![user_row(1, "John Doe", "john@example.com")]);
    let orm = Orm::new(db.clone());

    let mut criteria = Criteria::new("users");
    criteria.where_("name", "=", "John Doe");
    assert!(criteria.build().contains("name = ?"));
    assert_eq!(criteria.values(), vec![Value::from("John Doe")]);

    let found: Vec<User> = users(&orm).find(criteria, &FindOptions::new()).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "John Doe");
    assert_eq!(db.captured_sql(), [r#"SELECT * FROM "test_main"."users" WHERE name = ?"#]);
    assert_eq!(db.captured_params(), [vec![Value::from("John Doe")]]);
}

#[test]
fn find_by_id_on_missing_id_is_none() {
    let db = executor();
    let orm = Orm::new(db.clone());

    let found: Option<User> = users(&orm)
        .find_by_id(42, &FindOptions::new().with("posts"))
        .unwrap();

    assert!(found.is_none());
    let sql = &db.captured_sql()[0];
    assert!(sql.starts_with(r#"SELECT "test_main"."users"."id" AS "id""#));
    assert!(sql.contains(r#""test_main"."users"."email" AS "email", "test_secondary"."posts"."id" AS "posts_id""#));
    assert!(sql.ends_with(r#"WHERE "test_main"."users"."id" = ?"#));
    assert_eq!(db.captured_params(), [vec![Value::Int(42)]]);
}

#[test]
fn options_from_map_ignore_false_and_unknown_entries() {
    let db = executor();
    db.push_rows(vec![user_row(1, "John Doe", "john@example.com")]);
    let orm = Orm::new(db.clone());

    let options = FindOptions::from_map(HashMap::from([
        ("posts".to_string(), false),
        ("comments".to_string(), true),
    ]));
    let found: Vec<Record> = users(&orm).find_all(&options).unwrap();

    assert_eq!(found[0].relation_names().count(), 0);
    assert!(!db.captured_sql()[0].contains("JOIN"));
}

#[test]
fn posts_and_roles_load_together_in_registration_order() {
    let db = executor();
    let row = |post: i64, role: i64| {
        with_role(
            with_post(user_row(1, "John Doe", "john@example.com"), Some((post, "p", 1))),
            Some((role, "r")),
        )
    };
    db.push_rows(vec![row(1, 1), row(1, 2)]);
    let orm = Orm::new(db.clone());

    let options = FindOptions::new().with("roles").with("posts");
    let found: Vec<User> = users(&orm).find_all(&options).unwrap();

    let sql = &db.captured_sql()[0];
    let posts_join = sql.find(r#"LEFT JOIN "test_secondary"."posts""#).unwrap();
    let roles_join = sql.find(r#"LEFT JOIN "test_main"."user_roles""#).unwrap();
    assert!(posts_join < roles_join);
    assert_eq!(found[0].posts.as_ref().map(Vec::len), Some(1));
    assert_eq!(found[0].roles.as_ref().map(Vec::len), Some(2));
}

#[test]
fn overlapping_relation_names_are_rejected() {
    let orm = Orm::new(executor());
    let posts = TableRef::new("test_secondary", "posts");

    let mut mapper = orm.mapper::<Record>("test_main", "users");
    mapper
        .add_relation("post", Relation::one_to_many(posts.clone(), "userId"))
        .unwrap();
    let err = mapper
        .add_relation("post_tags", Relation::one_to_many(posts, "userId"))
        .unwrap_err();
    assert!(matches!(err, OrmError::RelationConflict(_)));
    assert_eq!(mapper.relations().len(), 1);
    assert!(mapper.relations().contains("post"));
}

#[test]
fn concurrent_finds_from_coroutines_share_one_mapper() {
    let db = executor();
    for i in 0..16 {
        db.push_rows(vec![user_row(i, "u", "u@example.com")]);
    }
    let orm = Orm::new(db.clone());
    let mapper = Arc::new(users::<User>(&orm));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let mapper = Arc::clone(&mapper);
            may::go!(move || mapper.find_all(&FindOptions::new()))
        })
        .collect();

    let mut total = 0;
    for handle in handles {
        total += handle.join().unwrap().unwrap().len();
    }
    assert_eq!(total, 16);
    assert_eq!(db.captured_sql().len(), 16);
    assert!(db.introspection_count("test_main", "users") >= 1);
}
