//! JSON payload shapes accepted by the command-line front end.

use serde::Deserialize;
use serde_json::{Map, Value};
use sqlweave_core::ast::{OrderDirection, StatementKind};
use sqlweave_core::schema::{columns_from_hints, ForeignKeyAction, ForeignKeyRef};
use sqlweave_core::{
    infer_columns, parse_conditions_with, CanonicalStatement, ColumnOverride, ColumnSpec,
    ConditionInput, Identifier, LogicalType, Row, SqlValue, StatementBuilder,
};

use crate::error::{CliError, Result};

const fn default_op() -> StatementKind {
    StatementKind::Select
}

const fn default_true() -> bool {
    true
}

fn default_ref_column() -> String {
    String::from("id")
}

/// A SELECT, INSERT, UPDATE, DELETE or UPSERT request.
///
/// ```json
/// {
///   "op": "select",
///   "table": "users",
///   "fields": ["id", "name"],
///   "condition": ["age > :age", {"column": "status", "op": "in", "param": "statuses"}],
///   "expression": "1 OR 2",
///   "params": {"age": 30, "statuses": ["active", "new"]},
///   "orderby": [{"field": "name", "direction": "DESC"}],
///   "limit": 10,
///   "start": 20
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryPayload {
    #[serde(default = "default_op")]
    pub op: StatementKind,
    pub table: String,
    #[serde(default)]
    pub fields: Vec<String>,
    /// Written columns and their values.
    #[serde(default, alias = "insertValues", alias = "updateValues")]
    pub values: Map<String, Value>,
    /// Value rows of a multi-row INSERT; every row writes the same columns.
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
    #[serde(default)]
    pub condition: Vec<ConditionInput>,
    /// Combinator over `condition`, e.g. `"1 AND (2 OR 3)"`.
    #[serde(default)]
    pub expression: Option<String>,
    /// Values of the parameters the conditions reference.
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub orderby: Vec<OrderTerm>,
    #[serde(default)]
    pub groupby: Vec<String>,
    #[serde(default)]
    pub having: Vec<ConditionInput>,
    #[serde(default)]
    pub having_expression: Option<String>,
    #[serde(default)]
    pub limit: Option<u64>,
    /// Row offset.
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub conflict_keys: Vec<String>,
    #[serde(default)]
    pub update_columns: Option<Vec<String>>,
    #[serde(default)]
    pub do_nothing: bool,
    /// Allows UPDATE and DELETE without a condition.
    #[serde(default)]
    pub allow_full: bool,
}

/// One ORDER BY entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderTerm {
    pub field: String,
    #[serde(default)]
    pub direction: OrderDirection,
}

impl QueryPayload {
    /// Validates the payload and assembles the canonical statement.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Payload`] for a combinator without conditions and
    /// [`CliError::Sql`] for anything the statement builder rejects.
    pub fn into_statement(self) -> Result<CanonicalStatement> {
        let values = json_values(self.values)?;
        let rows = self
            .rows
            .into_iter()
            .map(json_values)
            .collect::<Result<Vec<_>>>()?;
        let params = json_values(self.params)?;

        let mut builder = StatementBuilder::new(self.op, &self.table)
            .fields(self.fields)
            .values(values)
            .rows(rows)
            .bind_all(params)
            .conflict_keys(self.conflict_keys)
            .group_by(self.groupby);

        if let Some(predicate) = predicate(&self.condition, self.expression.as_deref(), "condition")? {
            builder = builder.filter(predicate);
        }
        if let Some(having) = predicate(&self.having, self.having_expression.as_deref(), "having")? {
            builder = builder.having(having);
        }
        for term in &self.orderby {
            builder = builder.order_by(&term.field, term.direction);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        if let Some(start) = self.start {
            builder = builder.offset(start);
        }
        if let Some(columns) = self.update_columns {
            builder = builder.update_columns(columns);
        }
        if self.do_nothing {
            builder = builder.do_nothing();
        }
        if self.allow_full {
            builder = builder.allow_unconditional();
        }

        Ok(builder.build()?)
    }
}

fn predicate(
    conditions: &[ConditionInput],
    expression: Option<&str>,
    field: &str,
) -> Result<Option<sqlweave_core::PredicateNode>> {
    if conditions.is_empty() {
        return match expression {
            Some(_) => Err(CliError::Payload(format!(
                "an expression needs a non-empty '{field}' list"
            ))),
            None => Ok(None),
        };
    }
    Ok(Some(parse_conditions_with(conditions, expression)?))
}

fn json_values(map: Map<String, Value>) -> Result<Vec<(String, SqlValue)>> {
    map.into_iter()
        .map(|(name, value)| {
            let value = SqlValue::from_json(&name, value)?;
            Ok((name, value))
        })
        .collect()
}

/// A CREATE TABLE request.
///
/// `source` is either sample rows, from which column types are inferred, or
/// a `{column: type}` map.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTablePayload {
    pub table: String,
    pub source: TableSource,
    #[serde(default)]
    pub pk: Vec<String>,
    #[serde(default)]
    pub fk: Vec<ForeignKeyEntry>,
    #[serde(default = "default_true")]
    pub if_not_exists: bool,
    /// Makes the single primary key column auto-increment.
    #[serde(default)]
    pub auto_increment: bool,
}

/// Where column definitions come from.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TableSource {
    Rows(Vec<Map<String, Value>>),
    Hints(Map<String, Value>),
}

/// One foreign key of a CREATE TABLE request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKeyEntry {
    pub column: String,
    pub ref_table: String,
    #[serde(default = "default_ref_column")]
    pub ref_column: String,
    #[serde(default)]
    pub on_delete: Option<ForeignKeyAction>,
    #[serde(default)]
    pub on_update: Option<ForeignKeyAction>,
}

impl CreateTablePayload {
    /// Resolves the column list, applying key annotations.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Payload`] if `auto_increment` is set without
    /// exactly one primary key column, [`CliError::Json`] for an unknown
    /// type name, and [`CliError::Sql`] for invalid names or samples.
    pub fn columns(&self) -> Result<Vec<ColumnSpec>> {
        if self.auto_increment && self.pk.len() != 1 {
            return Err(CliError::Payload(String::from(
                "auto_increment needs exactly one 'pk' column",
            )));
        }

        let mut overrides: Vec<ColumnOverride> = self
            .pk
            .iter()
            .map(|name| {
                let key = ColumnOverride::new(name).primary_key();
                if self.auto_increment {
                    key.auto_increment()
                } else {
                    key
                }
            })
            .collect();
        for entry in &self.fk {
            let mut reference = ForeignKeyRef::new(
                Identifier::new(entry.ref_table.as_str())?,
                Identifier::new(entry.ref_column.as_str())?,
            );
            reference.on_delete = entry.on_delete;
            reference.on_update = entry.on_update;
            overrides.push(ColumnOverride::new(&entry.column).references(reference));
        }

        let columns = match &self.source {
            TableSource::Rows(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| json_values(row.clone()))
                    .collect::<Result<Vec<Row>>>()?;
                infer_columns(&rows, &overrides)?
            }
            TableSource::Hints(hints) => {
                let hints = hints
                    .iter()
                    .map(|(name, type_name)| {
                        let logical_type: LogicalType = serde_json::from_value(type_name.clone())?;
                        Ok((name.clone(), logical_type))
                    })
                    .collect::<Result<Vec<_>>>()?;
                columns_from_hints(&hints, &overrides)?
            }
        };
        Ok(columns)
    }
}
