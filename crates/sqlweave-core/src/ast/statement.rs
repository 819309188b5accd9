//! The canonical, dialect-neutral statement.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::PredicateNode;
use crate::ident::Identifier;
use crate::value::SqlValue;

/// The operation a statement performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Upsert,
}

impl StatementKind {
    /// Returns the SQL keyword (UPSERT has none; its name is returned).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Upsert => "UPSERT",
        }
    }

    /// Returns true for kinds that write a value set.
    #[must_use]
    pub const fn writes_values(self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Upsert)
    }
}

/// Sort direction in ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    #[serde(alias = "asc")]
    Asc,
    #[serde(alias = "desc")]
    Desc,
}

impl OrderDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A single ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The sort column.
    pub column: Identifier,
    /// The direction.
    pub direction: OrderDirection,
}

/// A column written by INSERT/UPDATE/UPSERT, and the parameter holding its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// The written column.
    pub column: Identifier,
    /// The parameter bound to it.
    pub param: Identifier,
}

/// What an UPSERT does when the conflict key already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictAction {
    /// Overwrite these columns with the incoming values.
    Update(Vec<Identifier>),
    /// Keep the existing row.
    Nothing,
}

/// A dialect-neutral statement, produced by the statement builder.
///
/// Once built the statement is immutable. Its invariants hold by construction:
/// conflict keys are present only for UPSERT, values only for writing kinds,
/// and every parameter it references is either bound in [`Self::params`] or
/// reported as missing when the statement is adapted. Only INSERT may carry
/// more than one value row, and every row writes the same columns in the
/// same order.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalStatement {
    pub(crate) kind: StatementKind,
    pub(crate) table: Identifier,
    pub(crate) fields: Vec<Identifier>,
    pub(crate) rows: Vec<Vec<Assignment>>,
    pub(crate) predicate: Option<PredicateNode>,
    pub(crate) conflict_keys: Vec<Identifier>,
    pub(crate) conflict_action: Option<ConflictAction>,
    pub(crate) group_by: Vec<Identifier>,
    pub(crate) having: Option<PredicateNode>,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) params: BTreeMap<String, SqlValue>,
}

impl CanonicalStatement {
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    #[must_use]
    pub const fn table(&self) -> &Identifier {
        &self.table
    }

    /// Selected columns for SELECT (empty means `*`), written columns otherwise.
    #[must_use]
    pub fn fields(&self) -> &[Identifier] {
        &self.fields
    }

    /// The written columns of the first (usually only) row.
    #[must_use]
    pub fn values(&self) -> &[Assignment] {
        self.rows.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// Every value row; empty for SELECT and DELETE.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Assignment>] {
        &self.rows
    }

    #[must_use]
    pub const fn predicate(&self) -> Option<&PredicateNode> {
        self.predicate.as_ref()
    }

    #[must_use]
    pub fn conflict_keys(&self) -> &[Identifier] {
        &self.conflict_keys
    }

    /// The UPSERT conflict behavior; `None` for other kinds.
    #[must_use]
    pub const fn conflict_action(&self) -> Option<&ConflictAction> {
        self.conflict_action.as_ref()
    }

    #[must_use]
    pub fn group_by(&self) -> &[Identifier] {
        &self.group_by
    }

    #[must_use]
    pub const fn having(&self) -> Option<&PredicateNode> {
        self.having.as_ref()
    }

    #[must_use]
    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// The merged parameter set, keyed by parameter name.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, SqlValue> {
        &self.params
    }

    /// Looks up the value bound to `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&SqlValue> {
        self.params.get(name)
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for CanonicalStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StatementKind::Select => {
                let fields = if self.fields.is_empty() {
                    String::from("*")
                } else {
                    join(&self.fields)
                };
                write!(f, "SELECT {fields} FROM {}", self.table)?;
            }
            StatementKind::Insert | StatementKind::Upsert => {
                let columns: Vec<&Identifier> = self.values().iter().map(|a| &a.column).collect();
                let rows: Vec<String> = self
                    .rows
                    .iter()
                    .map(|row| {
                        let params: Vec<String> =
                            row.iter().map(|a| format!(":{}", a.param)).collect();
                        format!("({})", params.join(", "))
                    })
                    .collect();
                write!(
                    f,
                    "INSERT INTO {} ({}) VALUES {}",
                    self.table,
                    join(&columns),
                    rows.join(", ")
                )?;
            }
            StatementKind::Update => {
                let sets: Vec<String> = self
                    .values()
                    .iter()
                    .map(|a| format!("{} = :{}", a.column, a.param))
                    .collect();
                write!(f, "UPDATE {} SET {}", self.table, sets.join(", "))?;
            }
            StatementKind::Delete => write!(f, "DELETE FROM {}", self.table)?,
        }

        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {predicate}")?;
        }

        if let Some(action) = &self.conflict_action {
            write!(f, " ON CONFLICT ({})", join(&self.conflict_keys))?;
            match action {
                ConflictAction::Nothing => f.write_str(" DO NOTHING")?,
                ConflictAction::Update(columns) => {
                    let sets: Vec<String> = columns
                        .iter()
                        .map(|c| format!("{c} = excluded.{c}"))
                        .collect();
                    write!(f, " DO UPDATE SET {}", sets.join(", "))?;
                }
            }
        }

        if !self.group_by.is_empty() {
            write!(f, " GROUP BY {}", join(&self.group_by))?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|o| format!("{} {}", o.column, o.direction.as_str()))
                .collect();
            write!(f, " ORDER BY {}", terms.join(", "))?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}
