//! # sqlweave-cli
//!
//! JSON front end for `sqlweave-core`: reads a query or CREATE TABLE payload
//! and returns `{"sql": ..., "params": ...}` for the chosen dialect.

pub mod error;
pub mod payload;

use std::io::Read;
use std::path::Path;

use sqlweave_core::{adapt, render_create_table, AdaptedSql, BoundParams};
use tracing::{debug, info};

pub use error::{CliError, Result};
pub use payload::{CreateTablePayload, QueryPayload};

/// Reads a payload from `path`, or from stdin when `path` is `-`.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the payload cannot be read.
pub fn read_payload(path: &Path) -> Result<String> {
    let mut text = String::new();
    if path == Path::new("-") {
        std::io::stdin().read_to_string(&mut text)?;
    } else {
        text = std::fs::read_to_string(path)?;
    }
    debug!(path = %path.display(), bytes = text.len(), "read payload");
    Ok(text)
}

/// Turns a query payload into SQL for `dialect`.
///
/// # Errors
///
/// Returns [`CliError::Json`] for malformed payloads and [`CliError::Sql`]
/// when the request is rejected.
pub fn query(payload: &str, dialect: &str) -> Result<AdaptedSql> {
    let payload: QueryPayload = serde_json::from_str(payload)?;
    let table = payload.table.clone();
    let stmt = payload.into_statement()?;
    let adapted = adapt(&stmt, dialect)?;
    info!(kind = stmt.kind().as_str(), table = %table, dialect, "generated statement");
    Ok(adapted)
}

/// Turns a CREATE TABLE payload into DDL for `dialect`.
///
/// # Errors
///
/// Returns [`CliError::Json`] for malformed payloads and [`CliError::Sql`]
/// when the table cannot be rendered.
pub fn create_table(payload: &str, dialect: &str) -> Result<AdaptedSql> {
    let payload: CreateTablePayload = serde_json::from_str(payload)?;
    let columns = payload.columns()?;
    let sql = render_create_table(&columns, &payload.table, payload.if_not_exists, dialect)?;
    info!(table = %payload.table, columns = columns.len(), dialect, "generated create table");
    Ok(AdaptedSql {
        sql,
        params: BoundParams::Ordered(Vec::new()),
    })
}

/// Serializes the output object.
///
/// # Errors
///
/// Returns [`CliError::Json`] if serialization fails.
pub fn render_output(output: &AdaptedSql, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(text)
}
