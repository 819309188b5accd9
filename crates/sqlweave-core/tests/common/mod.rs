#![allow(dead_code)]

use sqlweave_core::{
    adapt, parse_condition, AdaptedSql, CanonicalStatement, Error, SqlValue, StatementBuilder,
};

pub const DIALECTS: [&str; 5] = ["sqlite", "postgresql", "mysql", "mssql", "oracle"];

pub fn adapted(stmt: &CanonicalStatement, dialect: &str) -> AdaptedSql {
    adapt(stmt, dialect).unwrap_or_else(|e| panic!("Failed to adapt for {dialect}: {e}"))
}

pub fn sql(stmt: &CanonicalStatement, dialect: &str) -> String {
    adapted(stmt, dialect).sql
}

/// `SELECT * FROM <table> WHERE <expression>` with one binding.
pub fn select_where(table: &str, expression: &str, name: &str, value: SqlValue) -> CanonicalStatement {
    StatementBuilder::select(table)
        .filter(
            parse_condition(expression)
                .unwrap_or_else(|e| panic!("Failed to parse: {expression}\nError: {e}")),
        )
        .bind(name, value)
        .build()
        .unwrap_or_else(|e| panic!("Failed to build: {e}"))
}

pub fn build_err(builder: StatementBuilder) -> Error {
    builder.build().expect_err("Expected a build error")
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}
