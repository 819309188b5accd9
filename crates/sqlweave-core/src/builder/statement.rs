//! Runtime-validated statement builder.

use std::collections::BTreeMap;

use tracing::debug;

use crate::ast::{
    Assignment, CanonicalStatement, ConflictAction, OrderBy, OrderDirection, PredicateNode,
    StatementKind,
};
use crate::error::{Error, Result};
use crate::ident::{identifiers, Identifier};
use crate::value::{SqlValue, ToSqlValue};

/// Builder for a [`CanonicalStatement`].
///
/// Setters only record input; every check runs in [`StatementBuilder::build`],
/// which either returns a complete statement or an error.
///
/// ```rust
/// use sqlweave_core::builder::StatementBuilder;
/// use sqlweave_core::condition::parse_condition;
///
/// let stmt = StatementBuilder::update("users")
///     .value("name", "Bob")
///     .filter(parse_condition("id = :id").unwrap())
///     .bind("id", 7)
///     .build()
///     .unwrap();
/// assert_eq!(stmt.to_string(), "UPDATE users SET name = :name WHERE id = :id");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct StatementBuilder {
    kind: StatementKind,
    table: String,
    fields: Vec<String>,
    values: Vec<(String, SqlValue)>,
    rows: Vec<Vec<(String, SqlValue)>>,
    predicate: Option<PredicateNode>,
    bindings: Vec<(String, SqlValue)>,
    conflict_keys: Vec<String>,
    update_columns: Option<Vec<String>>,
    do_nothing: bool,
    allow_unconditional: bool,
    group_by: Vec<String>,
    having: Option<PredicateNode>,
    order_by: Vec<(String, OrderDirection)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl StatementBuilder {
    /// Starts a statement of `kind` on `table`.
    pub fn new(kind: StatementKind, table: &str) -> Self {
        Self {
            kind,
            table: table.to_string(),
            fields: Vec::new(),
            values: Vec::new(),
            rows: Vec::new(),
            predicate: None,
            bindings: Vec::new(),
            conflict_keys: Vec::new(),
            update_columns: None,
            do_nothing: false,
            allow_unconditional: false,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn select(table: &str) -> Self {
        Self::new(StatementKind::Select, table)
    }

    pub fn insert(table: &str) -> Self {
        Self::new(StatementKind::Insert, table)
    }

    pub fn update(table: &str) -> Self {
        Self::new(StatementKind::Update, table)
    }

    pub fn delete(table: &str) -> Self {
        Self::new(StatementKind::Delete, table)
    }

    pub fn upsert(table: &str) -> Self {
        Self::new(StatementKind::Upsert, table)
    }

    /// Sets the selected columns (SELECT only; empty selects `*`).
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Writes `value` into `column`. The value is bound to a parameter named
    /// after the column.
    pub fn value<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        self.values.push((column.to_string(), value.to_sql_value()));
        self
    }

    /// Writes every `(column, value)` pair, in order.
    pub fn values<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (String, SqlValue)>,
    {
        self.values.extend(values);
        self
    }

    /// Adds one row to a multi-row INSERT.
    ///
    /// Every row must write the same columns. With two or more rows each value
    /// is bound to a parameter named `<column>_<row index>`.
    pub fn row<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (String, SqlValue)>,
    {
        self.rows.push(values.into_iter().collect());
        self
    }

    /// Adds every row in `rows`; see [`StatementBuilder::row`].
    pub fn rows<I, R>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (String, SqlValue)>,
    {
        self.rows
            .extend(rows.into_iter().map(|row| row.into_iter().collect()));
        self
    }

    /// Sets the WHERE predicate.
    pub fn filter(mut self, predicate: PredicateNode) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Binds a value to a parameter referenced by the predicate or HAVING.
    pub fn bind<T: ToSqlValue>(mut self, name: &str, value: T) -> Self {
        self.bindings.push((name.to_string(), value.to_sql_value()));
        self
    }

    /// Binds every `(name, value)` pair.
    pub fn bind_all<I>(mut self, bindings: I) -> Self
    where
        I: IntoIterator<Item = (String, SqlValue)>,
    {
        self.bindings.extend(bindings);
        self
    }

    /// Sets the UPSERT conflict key columns.
    pub fn conflict_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflict_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Limits which columns an UPSERT overwrites on conflict. By default every
    /// written column except the conflict keys is overwritten.
    pub fn update_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Makes an UPSERT keep the existing row on conflict.
    pub const fn do_nothing(mut self) -> Self {
        self.do_nothing = true;
        self
    }

    /// Allows UPDATE or DELETE without a predicate.
    pub const fn allow_unconditional(mut self) -> Self {
        self.allow_unconditional = true;
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the HAVING predicate (requires GROUP BY).
    pub fn having(mut self, predicate: PredicateNode) -> Self {
        self.having = Some(predicate);
        self
    }

    pub fn order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.order_by.push((column.to_string(), direction));
        self
    }

    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Validates the request and produces the canonical statement.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if any table or column name is not a valid
    ///   identifier.
    /// - [`Error::Build`] if the request is inconsistent: missing values for a
    ///   writing statement, UPDATE/DELETE without a predicate, UPSERT
    ///   without conflict keys or overwriting a conflict key, clauses that do
    ///   not apply to the statement kind, INSERT rows that write different
    ///   columns, or one parameter name bound to two different values.
    pub fn build(self) -> Result<CanonicalStatement> {
        let kind = self.kind;
        let table = Identifier::new(self.table)?;

        let requested_fields = identifiers(self.fields)?;

        let mut params = BTreeMap::new();
        let rows = build_rows(kind, self.values, self.rows, &mut params)?;
        let values: &[Assignment] = rows.first().map(Vec::as_slice).unwrap_or_default();

        let fields = if kind == StatementKind::Select {
            requested_fields
        } else {
            let written: Vec<Identifier> = values.iter().map(|a| a.column.clone()).collect();
            if !requested_fields.is_empty() && requested_fields != written {
                return Err(Error::build(format!(
                    "fields of {} must match the written columns",
                    kind.as_str()
                )));
            }
            written
        };

        if self.predicate.is_none()
            && matches!(kind, StatementKind::Update | StatementKind::Delete)
            && !self.allow_unconditional
        {
            return Err(Error::build(format!(
                "{} on '{table}' without a condition; opt in to an unconditional {}",
                kind.as_str(),
                kind.as_str()
            )));
        }
        if self.predicate.is_some() && matches!(kind, StatementKind::Insert | StatementKind::Upsert)
        {
            return Err(Error::build(format!("{} takes no condition", kind.as_str())));
        }
        check_predicate(self.predicate.as_ref(), "WHERE")?;
        check_predicate(self.having.as_ref(), "HAVING")?;

        let (conflict_keys, conflict_action) = build_conflict(
            kind,
            values,
            self.conflict_keys,
            self.update_columns,
            self.do_nothing,
        )?;

        let has_select_clauses = !self.group_by.is_empty()
            || self.having.is_some()
            || !self.order_by.is_empty()
            || self.limit.is_some()
            || self.offset.is_some();
        if has_select_clauses && kind != StatementKind::Select {
            return Err(Error::build(
                "GROUP BY, HAVING, ORDER BY, LIMIT and OFFSET apply to SELECT only",
            ));
        }
        if self.having.is_some() && self.group_by.is_empty() {
            return Err(Error::build("HAVING requires GROUP BY"));
        }
        let group_by = identifiers(self.group_by)?;
        let order_by = self
            .order_by
            .into_iter()
            .map(|(column, direction)| {
                Ok(OrderBy {
                    column: Identifier::new(column)?,
                    direction,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        merge_bindings(&mut params, self.bindings, self.predicate.as_ref(), self.having.as_ref())?;

        debug!(
            kind = kind.as_str(),
            table = %table,
            params = params.len(),
            "assembled statement"
        );

        Ok(CanonicalStatement {
            kind,
            table,
            fields,
            rows,
            predicate: self.predicate,
            conflict_keys,
            conflict_action,
            group_by,
            having: self.having,
            order_by,
            limit: self.limit,
            offset: self.offset,
            params,
        })
    }
}

fn build_rows(
    kind: StatementKind,
    values: Vec<(String, SqlValue)>,
    mut rows: Vec<Vec<(String, SqlValue)>>,
    params: &mut BTreeMap<String, SqlValue>,
) -> Result<Vec<Vec<Assignment>>> {
    if rows.is_empty() {
        let row = build_values(kind, values, params)?;
        return Ok(if row.is_empty() { Vec::new() } else { vec![row] });
    }
    if kind != StatementKind::Insert {
        return Err(Error::build("value rows apply to INSERT only"));
    }
    if !values.is_empty() {
        return Err(Error::build("INSERT takes either values or rows, not both"));
    }
    if rows.len() == 1 {
        let row = rows.pop().unwrap_or_default();
        return Ok(vec![build_values(kind, row, params)?]);
    }

    let columns = identifiers(rows[0].iter().map(|(column, _)| column.clone()))?;
    if columns.is_empty() {
        return Err(Error::build("INSERT requires values"));
    }
    let mismatch = |index: usize| {
        Error::build(format!(
            "row {index} does not write the same columns as row 0"
        ))
    };

    let mut built = Vec::with_capacity(rows.len());
    for (index, raw) in rows.into_iter().enumerate() {
        let mut by_column = BTreeMap::new();
        for (column, value) in raw {
            let column = Identifier::new(column)?;
            if by_column.insert(column.to_string(), value).is_some() {
                return Err(Error::build(format!(
                    "column '{column}' is written twice in row {index}"
                )));
            }
        }
        if by_column.len() != columns.len() {
            return Err(mismatch(index));
        }

        let mut row = Vec::with_capacity(columns.len());
        for column in &columns {
            let value = by_column
                .remove(column.as_str())
                .ok_or_else(|| mismatch(index))?;
            let param = Identifier::new(format!("{column}_{index}"))?;
            if params.insert(param.to_string(), value).is_some() {
                return Err(Error::build(format!("parameter ':{param}' is bound twice")));
            }
            row.push(Assignment {
                column: column.clone(),
                param,
            });
        }
        built.push(row);
    }
    Ok(built)
}

fn build_values(
    kind: StatementKind,
    raw: Vec<(String, SqlValue)>,
    params: &mut BTreeMap<String, SqlValue>,
) -> Result<Vec<Assignment>> {
    if kind.writes_values() && raw.is_empty() {
        return Err(Error::build(format!("{} requires values", kind.as_str())));
    }
    if !kind.writes_values() && !raw.is_empty() {
        return Err(Error::build(format!("{} takes no values", kind.as_str())));
    }

    let mut values = Vec::with_capacity(raw.len());
    for (column, value) in raw {
        let column = Identifier::new(column)?;
        if params.insert(column.to_string(), value).is_some() {
            return Err(Error::build(format!("column '{column}' is written twice")));
        }
        values.push(Assignment {
            param: column.clone(),
            column,
        });
    }
    Ok(values)
}

/// Rejects AND/OR groups without children anywhere in `predicate`.
fn check_predicate(predicate: Option<&PredicateNode>, clause: &str) -> Result<()> {
    let mut pending: Vec<&PredicateNode> = predicate.into_iter().collect();
    while let Some(node) = pending.pop() {
        if let PredicateNode::Logical { op, children } = node {
            if children.is_empty() {
                return Err(Error::build(format!(
                    "{clause} contains an empty {} group",
                    op.as_sql()
                )));
            }
            pending.extend(children);
        }
    }
    Ok(())
}

fn build_conflict(
    kind: StatementKind,
    values: &[Assignment],
    keys: Vec<String>,
    update_columns: Option<Vec<String>>,
    do_nothing: bool,
) -> Result<(Vec<Identifier>, Option<ConflictAction>)> {
    if kind != StatementKind::Upsert {
        if !keys.is_empty() || update_columns.is_some() || do_nothing {
            return Err(Error::build("conflict handling applies to UPSERT only"));
        }
        return Ok((Vec::new(), None));
    }

    let keys = identifiers(keys)?;
    if keys.is_empty() {
        return Err(Error::build("UPSERT requires at least one conflict key"));
    }
    let written = |column: &Identifier| values.iter().any(|a| &a.column == column);
    if let Some(missing) = keys.iter().find(|k| !written(*k)) {
        return Err(Error::build(format!(
            "conflict key '{missing}' is not among the written columns"
        )));
    }

    if do_nothing {
        if update_columns.is_some() {
            return Err(Error::build("do-nothing UPSERT cannot list update columns"));
        }
        return Ok((keys, Some(ConflictAction::Nothing)));
    }

    let columns = match update_columns {
        Some(columns) => {
            let columns = identifiers(columns)?;
            if let Some(key) = columns.iter().find(|c| keys.contains(c)) {
                return Err(Error::build(format!(
                    "conflict key '{key}' cannot be updated on conflict"
                )));
            }
            if let Some(unknown) = columns.iter().find(|c| !written(*c)) {
                return Err(Error::build(format!(
                    "update column '{unknown}' is not among the written columns"
                )));
            }
            columns
        }
        None => values
            .iter()
            .map(|a| a.column.clone())
            .filter(|c| !keys.contains(c))
            .collect(),
    };

    let action = if columns.is_empty() {
        ConflictAction::Nothing
    } else {
        ConflictAction::Update(columns)
    };
    Ok((keys, Some(action)))
}

/// Adds the bindings the predicates reference. A name already bound must be
/// bound to the same value.
fn merge_bindings(
    params: &mut BTreeMap<String, SqlValue>,
    bindings: Vec<(String, SqlValue)>,
    predicate: Option<&PredicateNode>,
    having: Option<&PredicateNode>,
) -> Result<()> {
    let referenced: Vec<&Identifier> = predicate
        .into_iter()
        .chain(having)
        .flat_map(PredicateNode::param_refs)
        .collect();

    let mut bound: BTreeMap<String, SqlValue> = BTreeMap::new();
    for (name, value) in bindings {
        if let Some(previous) = bound.get(&name) {
            if *previous != value {
                return Err(collision(&name));
            }
            continue;
        }
        bound.insert(name, value);
    }

    for (name, value) in bound {
        if !referenced.iter().any(|r| r.as_str() == name) {
            continue;
        }
        match params.get(&name) {
            Some(existing) if *existing != value => return Err(collision(&name)),
            Some(_) => {}
            None => {
                params.insert(name, value);
            }
        }
    }
    Ok(())
}

fn collision(name: &str) -> Error {
    Error::build(format!("parameter ':{name}' is bound to different values"))
}

/// Assembles a statement in one call.
///
/// `values` are the written columns; `params` bind the parameters the
/// predicate references. Use [`StatementBuilder`] for SELECT clauses,
/// update-column lists and the unconditional opt-in.
///
/// # Errors
///
/// See [`StatementBuilder::build`].
pub fn build_statement(
    kind: StatementKind,
    table: &str,
    fields: &[&str],
    values: &[(&str, SqlValue)],
    predicate: Option<PredicateNode>,
    params: &[(&str, SqlValue)],
    conflict_keys: &[&str],
) -> Result<CanonicalStatement> {
    let mut builder = StatementBuilder::new(kind, table)
        .fields(fields.iter().copied())
        .values(values.iter().map(|(c, v)| ((*c).to_string(), v.clone())))
        .bind_all(params.iter().map(|(n, v)| ((*n).to_string(), v.clone())))
        .conflict_keys(conflict_keys.iter().copied());
    if let Some(predicate) = predicate {
        builder = builder.filter(predicate);
    }
    builder.build()
}
