//! Generated SQL executed against an in-memory SQLite database.

use sqlweave_core::ast::OrderDirection;
use sqlweave_core::{
    adapt, infer_columns, parse_condition, parse_conditions, render_create_table, AdaptedSql,
    BoundParams, CanonicalStatement, ColumnOverride, Row as SampleRow, SqlValue, StatementBuilder,
};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

async fn create_test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool")
}

fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q BoundParams,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    let values = params.as_ordered().expect("sqlite binds positionally");
    for value in values {
        query = match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Blob(b) => query.bind(b.as_slice()),
            SqlValue::List(_) => panic!("lists are expanded before binding"),
        };
    }
    query
}

fn sqlite(stmt: &CanonicalStatement) -> AdaptedSql {
    adapt(stmt, "sqlite").unwrap_or_else(|e| panic!("Failed to adapt {stmt}: {e}"))
}

async fn execute(pool: &SqlitePool, stmt: &CanonicalStatement) -> u64 {
    let adapted = sqlite(stmt);
    bind_values(sqlx::query(&adapted.sql), &adapted.params)
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to execute {}: {e}", adapted.sql))
        .rows_affected()
}

async fn names(pool: &SqlitePool, stmt: &CanonicalStatement) -> Vec<String> {
    let adapted = sqlite(stmt);
    bind_values(sqlx::query(&adapted.sql), &adapted.params)
        .fetch_all(pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to query {}: {e}", adapted.sql))
        .iter()
        .map(|row| row.get::<String, _>("name"))
        .collect()
}

fn sample(id: i64, name: &str, age: Option<i64>) -> SampleRow {
    vec![
        (String::from("id"), SqlValue::Int(id)),
        (String::from("name"), SqlValue::Text(name.to_string())),
        (String::from("age"), age.map_or(SqlValue::Null, SqlValue::Int)),
    ]
}

async fn users_table(pool: &SqlitePool) {
    let columns = infer_columns(
        &[sample(1, "Ada", Some(36)), sample(2, "Bob", None)],
        &[ColumnOverride::new("id").primary_key().auto_increment()],
    )
    .unwrap();
    let ddl = render_create_table(&columns, "users", true, "sqlite").unwrap();
    sqlx::query(&ddl).execute(pool).await.unwrap();
    // Second run is a no-op.
    sqlx::query(&ddl).execute(pool).await.unwrap();

    for (name, age) in [("Ada", Some(36_i64)), ("Bob", None), ("Cy", Some(17))] {
        let insert = StatementBuilder::insert("users")
            .value("name", name)
            .value("age", age)
            .build()
            .unwrap();
        assert_eq!(execute(pool, &insert).await, 1);
    }
}

#[tokio::test]
async fn test_create_insert_and_select() {
    let pool = create_test_pool().await;
    users_table(&pool).await;

    let adults = StatementBuilder::select("users")
        .fields(["name"])
        .filter(parse_condition("age >= :min").unwrap())
        .bind("min", 18_i64)
        .build()
        .unwrap();
    assert_eq!(names(&pool, &adults).await, ["Ada"]);

    let unknown_age = StatementBuilder::select("users")
        .fields(["name"])
        .filter(parse_condition("age = :age").unwrap())
        .bind("age", SqlValue::Null)
        .build()
        .unwrap();
    assert_eq!(names(&pool, &unknown_age).await, ["Bob"]);
}

#[tokio::test]
async fn test_multi_row_insert() {
    let pool = create_test_pool().await;
    users_table(&pool).await;

    let batch = StatementBuilder::insert("users")
        .rows([
            sample(10, "Dee", Some(52)),
            sample(11, "Eve", None),
            sample(12, "Fay", Some(29)),
        ])
        .build()
        .unwrap();
    assert_eq!(execute(&pool, &batch).await, 3);

    let everyone = StatementBuilder::select("users")
        .fields(["name"])
        .order_by("id", OrderDirection::Asc)
        .build()
        .unwrap();
    assert_eq!(
        names(&pool, &everyone).await,
        ["Ada", "Bob", "Cy", "Dee", "Eve", "Fay"]
    );
}

#[tokio::test]
async fn test_in_lists_and_pagination() {
    let pool = create_test_pool().await;
    users_table(&pool).await;

    let picked = StatementBuilder::select("users")
        .fields(["name"])
        .filter(parse_condition("name IN :names").unwrap())
        .bind("names", SqlValue::list(["Cy", "Ada", "Zed"]))
        .order_by("name", OrderDirection::Asc)
        .build()
        .unwrap();
    assert_eq!(names(&pool, &picked).await, ["Ada", "Cy"]);

    let none = StatementBuilder::select("users")
        .fields(["name"])
        .filter(parse_condition("name IN :names").unwrap())
        .bind("names", SqlValue::List(vec![]))
        .build()
        .unwrap();
    assert!(names(&pool, &none).await.is_empty());

    let page = StatementBuilder::select("users")
        .fields(["name"])
        .order_by("id", OrderDirection::Asc)
        .offset(1)
        .build()
        .unwrap();
    assert_eq!(names(&pool, &page).await, ["Bob", "Cy"]);
}

#[tokio::test]
async fn test_upsert_update_and_delete() {
    let pool = create_test_pool().await;
    users_table(&pool).await;

    let upsert = StatementBuilder::upsert("users")
        .value("id", 1_i64)
        .value("name", "Ada Lovelace")
        .value("age", 37_i64)
        .conflict_keys(["id"])
        .build()
        .unwrap();
    execute(&pool, &upsert).await;

    let birthday = StatementBuilder::update("users")
        .value("age", 18_i64)
        .filter(
            parse_conditions(&["name = :name".into(), "age < :age".into()]).unwrap(),
        )
        .bind("name", "Cy")
        .bind("age", 30_i64)
        .build();
    // `age` is both a written column and a condition parameter with another value.
    assert!(birthday.is_err());

    let birthday = StatementBuilder::update("users")
        .value("age", 18_i64)
        .filter(parse_condition("name = :who").unwrap())
        .bind("who", "Cy")
        .build()
        .unwrap();
    assert_eq!(execute(&pool, &birthday).await, 1);

    let everyone = StatementBuilder::select("users")
        .fields(["name"])
        .filter(parse_condition("age BETWEEN :lo AND :hi").unwrap())
        .bind("lo", 18_i64)
        .bind("hi", 40_i64)
        .order_by("age", OrderDirection::Desc)
        .build()
        .unwrap();
    assert_eq!(names(&pool, &everyone).await, ["Ada Lovelace", "Cy"]);

    let purge = StatementBuilder::delete("users")
        .filter(parse_condition("age IS NULL").unwrap())
        .build()
        .unwrap();
    assert_eq!(execute(&pool, &purge).await, 1);
}

#[tokio::test]
async fn test_hostile_values_stay_data() {
    let pool = create_test_pool().await;
    users_table(&pool).await;

    let hostile = "'; DROP TABLE users; --";
    let insert = StatementBuilder::insert("users")
        .value("name", hostile)
        .build()
        .unwrap();
    execute(&pool, &insert).await;

    let lookup = StatementBuilder::select("users")
        .fields(["name"])
        .filter(parse_condition("name = :name").unwrap())
        .bind("name", hostile)
        .build()
        .unwrap();
    assert_eq!(names(&pool, &lookup).await, [hostile]);

    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM users")
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("n");
    assert_eq!(count, 4);
}
