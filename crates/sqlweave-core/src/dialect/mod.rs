//! Dialect adaptation: canonical statements rendered for a target database.
//!
//! Every difference between databases lives in a [`DialectProfile`]. Adding
//! a dialect means adding a profile, not touching the renderers.
//!
//! ```
//! use sqlweave_core::builder::StatementBuilder;
//! use sqlweave_core::condition::parse_condition;
//! use sqlweave_core::dialect::adapt;
//!
//! let stmt = StatementBuilder::select("users")
//!     .fields(["id", "name"])
//!     .filter(parse_condition("age > :age").unwrap())
//!     .bind("age", 21_i64)
//!     .build()
//!     .unwrap();
//!
//! let adapted = adapt(&stmt, "postgresql").unwrap();
//! assert_eq!(adapted.sql, "SELECT id, name FROM users WHERE age > $1");
//! assert_eq!(adapted.params.len(), 1);
//! ```

mod binder;
mod ddl;
mod profile;
mod profiles;
mod render;

pub use binder::BoundParams;
pub use ddl::{render_create_table, render_create_table_with};
pub use profile::{
    AutoIncrementPlacement, DateTimeBinding, DialectProfile, ExistenceCheck, MergeSource,
    MultiRowInsert, Pagination, PlaceholderStyle, PrimaryKeyStyle, UpsertSyntax,
};
pub use profiles::{profile, Dialect, MSSQL, MYSQL, ORACLE, POSTGRESQL, SQLITE};

use serde::Serialize;
use tracing::{debug, trace};

use crate::ast::CanonicalStatement;
use crate::error::Result;
use render::Renderer;

/// A statement ready for a driver: SQL text and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdaptedSql {
    pub sql: String,
    pub params: BoundParams,
}

/// Renders `stmt` for the named dialect.
///
/// # Errors
///
/// - [`crate::Error::UnsupportedDialect`] for an unknown dialect name.
/// - [`crate::Error::MissingParameter`] if a referenced parameter is unbound.
/// - [`crate::Error::TypeMismatch`] if an `IN` parameter is not a list, or a
///   list is bound where a single value is expected.
pub fn adapt(stmt: &CanonicalStatement, dialect_name: &str) -> Result<AdaptedSql> {
    adapt_with(stmt, profile(dialect_name)?)
}

/// Renders `stmt` for a dialect profile. Output is deterministic for a given
/// statement and profile.
///
/// # Errors
///
/// See [`adapt`].
pub fn adapt_with(stmt: &CanonicalStatement, profile: &DialectProfile) -> Result<AdaptedSql> {
    let (sql, binder) = Renderer::new(profile, stmt).render()?;
    let params = binder.finish();

    debug!(
        dialect = profile.name,
        kind = stmt.kind().as_str(),
        style = profile.placeholder.as_str(),
        params = params.len(),
        "adapted statement"
    );
    trace!(sql = %sql, "rendered sql");

    Ok(AdaptedSql { sql, params })
}
