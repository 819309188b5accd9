//! Column inference from sample rows.

use std::collections::BTreeMap;

use tracing::debug;

use super::{ColumnOverride, ColumnSpec, LogicalType};
use crate::error::{Error, Result};
use crate::ident::Identifier;
use crate::value::SqlValue;

/// One sample row: `(column, value)` pairs in column order.
pub type Row = Vec<(String, SqlValue)>;

/// Logical type suggested by a single sample value; `None` for NULL.
fn classify(column: &str, value: &SqlValue) -> Result<Option<LogicalType>> {
    Ok(match value {
        SqlValue::Null => None,
        SqlValue::Bool(_) => Some(LogicalType::Boolean),
        SqlValue::Int(_) => Some(LogicalType::Integer),
        SqlValue::Float(_) => Some(LogicalType::Float),
        SqlValue::Text(_) if value.temporal().is_some() => Some(LogicalType::DateTime),
        SqlValue::Text(_) => Some(LogicalType::Text),
        SqlValue::Blob(_) => Some(LogicalType::Blob),
        SqlValue::List(_) => {
            return Err(Error::TypeMismatch {
                parameter: column.to_string(),
                expected: String::from("a scalar sample value"),
                found: String::from("list"),
            });
        }
    })
}

/// Picks one type for a column from the per-type sample counts.
fn resolve(counts: &BTreeMap<LogicalType, usize>) -> LogicalType {
    let mut kinds = counts.keys().copied();
    match (kinds.next(), kinds.next()) {
        (None, _) => return LogicalType::Text,
        (Some(only), None) => return only,
        _ => {}
    }

    let numeric = |t: &LogicalType| matches!(t, LogicalType::Integer | LogicalType::Float);
    if counts.keys().all(numeric) {
        return LogicalType::Float;
    }
    if counts.contains_key(&LogicalType::Text) {
        return LogicalType::Text;
    }

    let top = counts.values().copied().max().unwrap_or(0);
    let mut leaders = counts.iter().filter(|(_, n)| **n == top).map(|(t, _)| *t);
    match (leaders.next(), leaders.next()) {
        (Some(winner), None) => winner,
        _ => LogicalType::Text,
    }
}

#[derive(Default)]
struct ColumnStats {
    counts: BTreeMap<LogicalType, usize>,
    nulls: usize,
    seen: usize,
}

/// Infers column specifications from sample rows, then applies `overrides`.
///
/// Columns keep the order in which they first appear. A column is nullable
/// when any sample holds NULL or omits it. Overrides naming a column absent
/// from the samples append that column.
///
/// # Errors
///
/// Returns [`Error::Validation`] for column names that are not valid
/// identifiers and [`Error::TypeMismatch`] for list-valued samples.
pub fn infer_columns(rows: &[Row], overrides: &[ColumnOverride]) -> Result<Vec<ColumnSpec>> {
    let mut order: Vec<Identifier> = Vec::new();
    let mut stats: BTreeMap<Identifier, ColumnStats> = BTreeMap::new();

    for row in rows {
        for (column, value) in row {
            let name = Identifier::new(column.as_str())?;
            let kind = classify(column, value)?;
            let entry = stats.entry(name.clone()).or_insert_with(|| {
                order.push(name);
                ColumnStats::default()
            });
            entry.seen += 1;
            match kind {
                Some(kind) => *entry.counts.entry(kind).or_insert(0) += 1,
                None => entry.nulls += 1,
            }
        }
    }

    let columns = order
        .into_iter()
        .map(|name| {
            let column = &stats[&name];
            let mut spec = ColumnSpec::new(name.clone(), resolve(&column.counts));
            spec.nullable = column.nulls > 0 || column.seen < rows.len();
            spec
        })
        .collect();

    let columns = apply_overrides(columns, overrides)?;
    debug!(
        rows = rows.len(),
        columns = columns.len(),
        "inferred columns"
    );
    Ok(columns)
}

/// Builds column specifications from explicit `(column, type)` hints.
///
/// Hinted columns are nullable unless an override says otherwise.
///
/// # Errors
///
/// Returns [`Error::Validation`] for invalid column names.
pub fn columns_from_hints(
    hints: &[(String, LogicalType)],
    overrides: &[ColumnOverride],
) -> Result<Vec<ColumnSpec>> {
    let columns = hints
        .iter()
        .map(|(name, logical_type)| Ok(ColumnSpec::new(Identifier::new(name.as_str())?, *logical_type)))
        .collect::<Result<Vec<_>>>()?;
    apply_overrides(columns, overrides)
}

fn apply_overrides(
    mut columns: Vec<ColumnSpec>,
    overrides: &[ColumnOverride],
) -> Result<Vec<ColumnSpec>> {
    for annotation in overrides {
        let name = Identifier::new(annotation.name.as_str())?;
        let index = match columns.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                columns.push(ColumnSpec::new(name, LogicalType::Text));
                columns.len() - 1
            }
        };
        let column = &mut columns[index];
        if let Some(logical_type) = annotation.logical_type {
            column.logical_type = logical_type;
        }
        if let Some(nullable) = annotation.nullable {
            column.nullable = nullable;
        }
        if annotation.primary_key {
            column.primary_key = true;
            column.nullable = false;
        }
        if annotation.auto_increment {
            column.auto_increment = true;
        }
        if let Some(fk) = &annotation.foreign_key {
            column.foreign_key = Some(fk.clone());
        }
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ForeignKeyRef;

    fn row(pairs: &[(&str, SqlValue)]) -> Row {
        pairs
            .iter()
            .map(|(c, v)| ((*c).to_string(), v.clone()))
            .collect()
    }

    fn infer(values: &[SqlValue]) -> LogicalType {
        let rows: Vec<Row> = values.iter().map(|v| row(&[("c", v.clone())])).collect();
        infer_columns(&rows, &[]).unwrap()[0].logical_type
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn test_nullability_from_samples() {
        let rows = vec![
            row(&[("id", SqlValue::Int(1)), ("age", SqlValue::Int(25))]),
            row(&[("id", SqlValue::Int(2)), ("age", SqlValue::Null)]),
        ];
        let columns = infer_columns(&rows, &[]).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name.as_str(), "id");
        assert_eq!(columns[0].logical_type, LogicalType::Integer);
        assert!(!columns[0].nullable);
        assert_eq!(columns[1].name.as_str(), "age");
        assert_eq!(columns[1].logical_type, LogicalType::Integer);
        assert!(columns[1].nullable);
        assert!(!columns[0].primary_key);
    }

    #[test]
    fn test_missing_key_makes_column_nullable() {
        let rows = vec![
            row(&[("id", SqlValue::Int(1)), ("note", text("x"))]),
            row(&[("id", SqlValue::Int(2))]),
        ];
        let columns = infer_columns(&rows, &[]).unwrap();
        assert!(columns[1].nullable);
    }

    #[test]
    fn test_type_rules() {
        assert_eq!(infer(&[SqlValue::Null, SqlValue::Null]), LogicalType::Text);
        assert_eq!(
            infer(&[SqlValue::Int(1), SqlValue::Float(2.5)]),
            LogicalType::Float
        );
        assert_eq!(infer(&[SqlValue::Int(1), text("a")]), LogicalType::Text);
        assert_eq!(
            infer(&[text("2024-01-01"), text("2024-01-02 10:00:00")]),
            LogicalType::DateTime
        );
        assert_eq!(
            infer(&[text("2024-01-01"), text("soon")]),
            LogicalType::Text
        );
        assert_eq!(
            infer(&[SqlValue::Bool(true), SqlValue::Bool(false)]),
            LogicalType::Boolean
        );
    }

    #[test]
    fn test_majority_vote_and_tie() {
        assert_eq!(
            infer(&[
                SqlValue::Bool(true),
                SqlValue::Bool(false),
                SqlValue::Int(1)
            ]),
            LogicalType::Boolean
        );
        assert_eq!(
            infer(&[SqlValue::Bool(true), SqlValue::Int(1)]),
            LogicalType::Text
        );
    }

    #[test]
    fn test_overrides() {
        let rows = vec![row(&[("id", SqlValue::Int(1)), ("owner", SqlValue::Null)])];
        let fk = ForeignKeyRef::new(
            Identifier::new("users").unwrap(),
            Identifier::new("id").unwrap(),
        );
        let columns = infer_columns(
            &rows,
            &[
                ColumnOverride::new("id").primary_key().auto_increment(),
                ColumnOverride::new("owner")
                    .logical_type(LogicalType::Integer)
                    .references(fk.clone()),
                ColumnOverride::new("created_at").logical_type(LogicalType::DateTime),
            ],
        )
        .unwrap();

        assert!(columns[0].primary_key && columns[0].auto_increment);
        assert_eq!(columns[1].logical_type, LogicalType::Integer);
        assert_eq!(columns[1].foreign_key, Some(fk));
        assert_eq!(columns[2].name.as_str(), "created_at");
        assert_eq!(columns[2].logical_type, LogicalType::DateTime);
        assert!(columns[2].nullable);
    }

    #[test]
    fn test_invalid_names_and_lists() {
        let rows = vec![row(&[("bad name", SqlValue::Int(1))])];
        assert!(matches!(
            infer_columns(&rows, &[]),
            Err(Error::Validation(_))
        ));
        let rows = vec![row(&[("tags", SqlValue::list(["a"]))])];
        assert!(matches!(
            infer_columns(&rows, &[]),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_columns_from_hints() {
        let columns = columns_from_hints(
            &[
                (String::from("id"), LogicalType::Integer),
                (String::from("name"), LogicalType::Text),
            ],
            &[ColumnOverride::new("id").primary_key()],
        )
        .unwrap();
        assert!(columns[0].primary_key);
        assert!(!columns[0].nullable);
        assert!(columns[1].nullable);
    }
}
