//! Statement assembly and rendering of each statement kind.

mod common;
use common::*;

use sqlweave_core::ast::{OrderDirection, StatementKind};
use sqlweave_core::condition::StructuredCondition;
use sqlweave_core::{
    build_statement, parse_condition, parse_conditions, parse_conditions_with, BoundParams, Error,
    SqlValue, StatementBuilder,
};

#[test]
fn test_update_without_condition_needs_opt_in() {
    let err = build_statement(
        StatementKind::Update,
        "users",
        &[],
        &[("name", text("Bob"))],
        None,
        &[],
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, Error::Build(_)));

    let stmt = StatementBuilder::update("users")
        .value("name", "Bob")
        .allow_unconditional()
        .build()
        .unwrap();
    assert_eq!(sql(&stmt, "postgresql"), "UPDATE users SET name = $1");
}

#[test]
fn test_delete_without_condition_needs_opt_in() {
    let err = build_err(StatementBuilder::delete("users"));
    assert!(err.to_string().contains("without a condition"));
}

#[test]
fn test_insert_per_dialect() {
    let stmt = build_statement(
        StatementKind::Insert,
        "users",
        &[],
        &[("name", text("Ada")), ("age", SqlValue::Int(36))],
        None,
        &[],
        &[],
    )
    .unwrap();

    assert_eq!(
        sql(&stmt, "sqlite"),
        "INSERT INTO users (name, age) VALUES (?, ?)"
    );
    assert_eq!(
        sql(&stmt, "postgresql"),
        "INSERT INTO users (name, age) VALUES ($1, $2)"
    );
    assert_eq!(
        sql(&stmt, "oracle"),
        "INSERT INTO users (name, age) VALUES (:name, :age)"
    );
    assert_eq!(
        adapted(&stmt, "mysql").params,
        BoundParams::Ordered(vec![text("Ada"), SqlValue::Int(36)])
    );
}

#[test]
fn test_update_with_condition() {
    let stmt = build_statement(
        StatementKind::Update,
        "users",
        &[],
        &[("name", text("Bob"))],
        Some(parse_condition("id = :id").unwrap()),
        &[("id", SqlValue::Int(7))],
        &[],
    )
    .unwrap();
    assert_eq!(stmt.to_string(), "UPDATE users SET name = :name WHERE id = :id");

    let mssql = adapted(&stmt, "mssql");
    assert_eq!(mssql.sql, "UPDATE users SET name = @name WHERE id = @id");
    let named = mssql.params.as_named().unwrap();
    assert_eq!(named["name"], text("Bob"));
    assert_eq!(named["id"], SqlValue::Int(7));
}

#[test]
fn test_condition_may_reuse_a_value_parameter() {
    let stmt = StatementBuilder::update("users")
        .value("status", "active")
        .filter(parse_condition("status != :status").unwrap())
        .bind("status", "active")
        .build()
        .unwrap();
    assert_eq!(
        sql(&stmt, "postgresql"),
        "UPDATE users SET status = $1 WHERE status != $1"
    );

    let clash = StatementBuilder::update("users")
        .value("status", "active")
        .filter(parse_condition("status != :status").unwrap())
        .bind("status", "banned");
    assert!(matches!(build_err(clash), Error::Build(_)));
}

#[test]
fn test_delete_with_nested_groups() {
    let tree = parse_conditions_with(
        &["age < :min".into(), "age > :max".into(), "banned = :yes".into()],
        Some("(1 OR 2) AND 3"),
    )
    .unwrap();
    let stmt = StatementBuilder::delete("members")
        .filter(tree)
        .bind("min", 18_i64)
        .bind("max", 99_i64)
        .bind("yes", true)
        .build()
        .unwrap();
    let adapted = adapted(&stmt, "sqlite");
    assert_eq!(
        adapted.sql,
        "DELETE FROM members WHERE (age < ? OR age > ?) AND banned = ?"
    );
    assert_eq!(
        adapted.params,
        BoundParams::Ordered(vec![
            SqlValue::Int(18),
            SqlValue::Int(99),
            SqlValue::Bool(true)
        ])
    );
}

#[test]
fn test_select_with_grouping_and_ordering() {
    let stmt = StatementBuilder::select("orders")
        .fields(["customer_id"])
        .filter(parse_condition("status = :status").unwrap())
        .bind("status", "paid")
        .group_by(["customer_id"])
        .having(
            parse_conditions(&[
                StructuredCondition {
                    column: String::from("id"),
                    op: String::from(">="),
                    param: Some(String::from("n")),
                    ..StructuredCondition::default()
                }
                .with_aggregate("count")
                .into(),
            ])
            .unwrap(),
        )
        .bind("n", 3_i64)
        .order_by("customer_id", OrderDirection::Desc)
        .limit(10)
        .build()
        .unwrap();

    assert_eq!(
        sql(&stmt, "postgresql"),
        "SELECT customer_id FROM orders WHERE status = $1 GROUP BY customer_id \
         HAVING COUNT(id) >= $2 ORDER BY customer_id DESC LIMIT 10"
    );
    assert_eq!(
        sql(&stmt, "mssql"),
        "SELECT customer_id FROM orders WHERE status = @status GROUP BY customer_id \
         HAVING COUNT(id) >= @n ORDER BY customer_id DESC OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
    );
}

#[test]
fn test_select_clauses_rejected_elsewhere() {
    let err = build_err(
        StatementBuilder::delete("t")
            .allow_unconditional()
            .order_by("id", OrderDirection::Asc),
    );
    assert!(matches!(err, Error::Build(_)));

    let err = build_err(
        StatementBuilder::select("t").having(parse_condition("id > :id").unwrap()),
    );
    assert_eq!(err, Error::Build(String::from("HAVING requires GROUP BY")));
}

#[test]
fn test_unsafe_names_are_rejected_everywhere() {
    let attempts = [
        StatementBuilder::select("users; DROP TABLE users"),
        StatementBuilder::select("users").fields(["id", "name--"]),
        StatementBuilder::insert("users").value("na me", 1_i64),
        StatementBuilder::select("users").order_by("id DESC, 1", OrderDirection::Asc),
        StatementBuilder::select("users").group_by(["a)"]),
    ];
    for builder in attempts {
        assert!(matches!(build_err(builder), Error::Validation(_)));
    }
}

#[test]
fn test_reserved_words_are_quoted() {
    let stmt = StatementBuilder::select("order")
        .fields(["select", "id"])
        .build()
        .unwrap();
    assert_eq!(sql(&stmt, "sqlite"), "SELECT \"select\", id FROM \"order\"");
    assert_eq!(sql(&stmt, "mysql"), "SELECT `select`, id FROM `order`");
    assert_eq!(sql(&stmt, "mssql"), "SELECT [select], id FROM [order]");
}
