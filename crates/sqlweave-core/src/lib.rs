//! # sqlweave-core
//!
//! Injection-safe SQL generation from structured inputs, adapted to several
//! database dialects.
//!
//! The pipeline has four stages:
//! - [`condition`] parses condition expressions (`age > :age`) and structured
//!   conditions into a [`PredicateNode`] tree, rejecting unsafe identifiers.
//! - [`builder`] assembles a dialect-neutral [`CanonicalStatement`].
//! - [`dialect`] renders that statement for `sqlite`, `postgresql`, `mysql`,
//!   `mssql` or `oracle`, with the driver's placeholder style.
//! - [`schema`] infers column types from sample rows; [`render_create_table`]
//!   turns them into `CREATE TABLE`.
//!
//! User values never reach the SQL text. They travel as bound parameters,
//! and every table and column name must match `^[A-Za-z0-9_]+$`.
//!
//! ```rust
//! use sqlweave_core::{adapt, parse_condition, BoundParams, SqlValue, StatementBuilder};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let stmt = StatementBuilder::select("users")
//!     .fields(["id"])
//!     .filter(parse_condition("name = :name").unwrap())
//!     .bind("name", user_input)
//!     .build()
//!     .unwrap();
//!
//! let adapted = adapt(&stmt, "sqlite").unwrap();
//! assert_eq!(adapted.sql, "SELECT id FROM users WHERE name = ?");
//! assert_eq!(
//!     adapted.params,
//!     BoundParams::Ordered(vec![SqlValue::Text(user_input.to_string())])
//! );
//! ```
//!
//! Executing statements and recording audit trails belong to the caller;
//! [`Executor`] and [`AuditSink`] describe those collaborators.

pub mod ast;
pub mod builder;
pub mod condition;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod lexer;
pub mod schema;
pub mod value;

pub use ast::{CanonicalStatement, PredicateNode, StatementKind};
pub use builder::{build_statement, StatementBuilder};
pub use condition::{parse_condition, parse_conditions, parse_conditions_with, ConditionInput};
pub use dialect::{adapt, adapt_with, render_create_table, AdaptedSql, BoundParams, Dialect};
pub use error::{Error, Result};
pub use ident::Identifier;
pub use schema::{infer_columns, ColumnOverride, ColumnSpec, LogicalType, Row};
pub use value::{SqlValue, ToSqlValue};

/// What a statement produced when it ran.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    /// Rows written by INSERT, UPDATE, DELETE or UPSERT.
    RowsAffected(u64),
    /// Rows returned by SELECT.
    Rows(Vec<Row>),
}

/// Runs adapted statements against a live database.
///
/// Implementations own connections, pooling, transactions and retries.
/// Errors are returned to the caller unchanged.
pub trait Executor {
    type Error;

    /// Executes `sql` with `params` bound in the shape `dialect` expects.
    ///
    /// # Errors
    ///
    /// Whatever the driver reports.
    fn execute(
        &self,
        sql: &str,
        params: &BoundParams,
        dialect: Dialect,
    ) -> std::result::Result<ExecOutcome, Self::Error>;
}

/// How an executed statement ended, as seen by an [`AuditSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    Succeeded(ExecOutcome),
    Failed(String),
}

/// Receives executed statements for audit logging.
pub trait AuditSink {
    fn record(&self, sql: &str, params: &BoundParams, outcome: &AuditOutcome);
}
