//! Rendering of canonical statements for a dialect profile.

use super::binder::Binder;
use super::profile::{
    DateTimeBinding, DialectProfile, MergeSource, MultiRowInsert, Pagination, UpsertSyntax,
};
use crate::ast::{
    CanonicalStatement, CompareOp, Comparison, ConflictAction, PredicateNode, StatementKind,
};
use crate::error::{Error, Result};
use crate::ident::Identifier;
use crate::value::Temporal;

/// Walks one statement, writing SQL text and collecting parameters.
pub(crate) struct Renderer<'a> {
    profile: &'a DialectProfile,
    stmt: &'a CanonicalStatement,
    binder: Binder<'a>,
    sql: String,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(profile: &'a DialectProfile, stmt: &'a CanonicalStatement) -> Self {
        Self {
            profile,
            stmt,
            binder: Binder::new(profile, stmt.params()),
            sql: String::new(),
        }
    }

    pub(crate) fn render(mut self) -> Result<(String, Binder<'a>)> {
        match self.stmt.kind() {
            StatementKind::Select => self.select()?,
            StatementKind::Insert => self.insert()?,
            StatementKind::Update => self.update()?,
            StatementKind::Delete => self.delete()?,
            StatementKind::Upsert => self.upsert()?,
        }
        Ok((self.sql, self.binder))
    }

    fn quote(&self, ident: &Identifier) -> String {
        self.profile.quote_identifier(ident)
    }

    fn quote_list<'i, I>(&self, idents: I) -> String
    where
        I: IntoIterator<Item = &'i Identifier>,
    {
        idents
            .into_iter()
            .map(|i| self.quote(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn select(&mut self) -> Result<()> {
        let stmt = self.stmt;
        let fields = if stmt.fields().is_empty() {
            String::from("*")
        } else {
            self.quote_list(stmt.fields())
        };
        self.sql = format!("SELECT {fields} FROM {}", self.quote(stmt.table()));
        self.where_clause()?;

        if !stmt.group_by().is_empty() {
            let columns = self.quote_list(stmt.group_by());
            self.sql.push_str(" GROUP BY ");
            self.sql.push_str(&columns);
        }
        if let Some(having) = stmt.having() {
            self.sql.push_str(" HAVING ");
            self.predicate(having, true)?;
        }

        let needs_order = matches!(
            self.profile.pagination,
            Pagination::OffsetFetch {
                requires_order: true
            }
        ) && (stmt.limit().is_some() || stmt.offset().is_some());
        if !stmt.order_by().is_empty() {
            let terms = stmt
                .order_by()
                .iter()
                .map(|o| format!("{} {}", self.quote(&o.column), o.direction.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            self.sql.push_str(" ORDER BY ");
            self.sql.push_str(&terms);
        } else if needs_order {
            self.sql.push_str(" ORDER BY (SELECT NULL)");
        }

        self.pagination();
        Ok(())
    }

    fn pagination(&mut self) {
        let (limit, offset) = (self.stmt.limit(), self.stmt.offset());
        if limit.is_none() && offset.is_none() {
            return;
        }
        match self.profile.pagination {
            Pagination::LimitOffset { no_limit } => {
                match (limit, no_limit) {
                    (Some(n), _) => self.sql.push_str(&format!(" LIMIT {n}")),
                    (None, Some(all)) => self.sql.push_str(&format!(" LIMIT {all}")),
                    (None, None) => {}
                }
                if let Some(m) = offset {
                    self.sql.push_str(&format!(" OFFSET {m}"));
                }
            }
            Pagination::OffsetFetch { .. } => {
                self.sql
                    .push_str(&format!(" OFFSET {} ROWS", offset.unwrap_or(0)));
                if let Some(n) = limit {
                    self.sql.push_str(&format!(" FETCH NEXT {n} ROWS ONLY"));
                }
            }
        }
    }

    fn where_clause(&mut self) -> Result<()> {
        let stmt = self.stmt;
        if let Some(predicate) = stmt.predicate() {
            self.sql.push_str(" WHERE ");
            self.predicate(predicate, true)?;
        }
        Ok(())
    }

    /// Column list and placeholder list of the written values.
    fn insert_parts(&mut self) -> Result<(String, Vec<String>)> {
        let stmt = self.stmt;
        let columns = self.quote_list(stmt.values().iter().map(|a| &a.column));
        let placeholders = stmt
            .values()
            .iter()
            .map(|a| self.binder.scalar(&a.param))
            .collect::<Result<Vec<_>>>()?;
        Ok((columns, placeholders))
    }

    fn insert(&mut self) -> Result<()> {
        let stmt = self.stmt;
        let table = self.quote(stmt.table());
        let columns = self.quote_list(stmt.values().iter().map(|a| &a.column));
        let tuples = stmt
            .rows()
            .iter()
            .map(|row| {
                let placeholders = row
                    .iter()
                    .map(|a| self.binder.scalar(&a.param))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("({})", placeholders.join(", ")))
            })
            .collect::<Result<Vec<_>>>()?;

        self.sql = match self.profile.multi_row_insert {
            MultiRowInsert::InsertAll if tuples.len() > 1 => {
                let targets = tuples
                    .iter()
                    .map(|tuple| format!("INTO {table} ({columns}) VALUES {tuple}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("INSERT ALL {targets} SELECT * FROM DUAL")
            }
            _ => format!("INSERT INTO {table} ({columns}) VALUES {}", tuples.join(", ")),
        };
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        let stmt = self.stmt;
        let sets = stmt
            .values()
            .iter()
            .map(|a| {
                let column = self.profile.quote_identifier(&a.column);
                Ok(format!("{column} = {}", self.binder.scalar(&a.param)?))
            })
            .collect::<Result<Vec<_>>>()?;
        self.sql = format!("UPDATE {} SET {}", self.quote(stmt.table()), sets.join(", "));
        self.where_clause()
    }

    fn delete(&mut self) -> Result<()> {
        self.sql = format!("DELETE FROM {}", self.quote(self.stmt.table()));
        self.where_clause()
    }

    fn upsert(&mut self) -> Result<()> {
        let stmt = self.stmt;
        let keys = stmt.conflict_keys();
        let action = stmt.conflict_action().unwrap_or(&ConflictAction::Nothing);

        match self.profile.upsert {
            UpsertSyntax::OnConflict { excluded } => {
                self.insert()?;
                self.sql
                    .push_str(&format!(" ON CONFLICT ({})", self.quote_list(keys)));
                match action {
                    ConflictAction::Nothing => self.sql.push_str(" DO NOTHING"),
                    ConflictAction::Update(columns) => {
                        let sets = columns
                            .iter()
                            .map(|c| {
                                let c = self.quote(c);
                                format!("{c} = {excluded}.{c}")
                            })
                            .collect::<Vec<_>>()
                            .join(", ");
                        self.sql.push_str(" DO UPDATE SET ");
                        self.sql.push_str(&sets);
                    }
                }
            }
            UpsertSyntax::OnDuplicateKey => {
                self.insert()?;
                let sets = match action {
                    ConflictAction::Nothing => {
                        let key = self.quote(&keys[0]);
                        format!("{key} = {key}")
                    }
                    ConflictAction::Update(columns) => columns
                        .iter()
                        .map(|c| {
                            let c = self.quote(c);
                            format!("{c} = VALUES({c})")
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                };
                self.sql.push_str(" ON DUPLICATE KEY UPDATE ");
                self.sql.push_str(&sets);
            }
            UpsertSyntax::Merge { source, terminated } => {
                self.merge(source, action)?;
                if terminated {
                    self.sql.push(';');
                }
            }
        }
        Ok(())
    }

    fn merge(&mut self, source: MergeSource, action: &ConflictAction) -> Result<()> {
        let stmt = self.stmt;
        let (columns, placeholders) = self.insert_parts()?;
        let table = self.quote(stmt.table());

        let using = match source {
            MergeSource::Values => {
                format!("USING (VALUES ({})) AS S ({columns})", placeholders.join(", "))
            }
            MergeSource::SelectFromDual => {
                let selected = stmt
                    .values()
                    .iter()
                    .zip(&placeholders)
                    .map(|(a, ph)| format!("{ph} AS {}", self.quote(&a.column)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("USING (SELECT {selected} FROM dual) S")
            }
        };
        let on = stmt
            .conflict_keys()
            .iter()
            .map(|k| {
                let k = self.quote(k);
                format!("T.{k} = S.{k}")
            })
            .collect::<Vec<_>>()
            .join(" AND ");
        let target = match source {
            MergeSource::Values => format!("{table} AS T"),
            MergeSource::SelectFromDual => format!("{table} T"),
        };

        self.sql = format!("MERGE INTO {target} {using} ON ({on})");
        if let ConflictAction::Update(update) = action {
            let sets = update
                .iter()
                .map(|c| {
                    let c = self.quote(c);
                    format!("T.{c} = S.{c}")
                })
                .collect::<Vec<_>>()
                .join(", ");
            self.sql.push_str(" WHEN MATCHED THEN UPDATE SET ");
            self.sql.push_str(&sets);
        }
        let source_values = stmt
            .values()
            .iter()
            .map(|a| format!("S.{}", self.quote(&a.column)))
            .collect::<Vec<_>>()
            .join(", ");
        self.sql.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({columns}) VALUES ({source_values})"
        ));
        Ok(())
    }

    /// Writes a predicate depth-first. Groups with more than one child are
    /// parenthesized, except at the root.
    fn predicate(&mut self, node: &PredicateNode, root: bool) -> Result<()> {
        match node {
            PredicateNode::Comparison(cmp) => self.comparison(cmp),
            PredicateNode::Logical { op, children } => {
                let wrap = !root && children.len() > 1;
                if wrap {
                    self.sql.push('(');
                }
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        self.sql.push(' ');
                        self.sql.push_str(op.as_sql());
                        self.sql.push(' ');
                    }
                    self.predicate(child, false)?;
                }
                if wrap {
                    self.sql.push(')');
                }
                Ok(())
            }
        }
    }

    fn comparison(&mut self, cmp: &Comparison) -> Result<()> {
        let column = match cmp.aggregate() {
            Some(agg) => format!("{}({})", agg.as_str(), self.quote(cmp.column())),
            None => self.quote(cmp.column()),
        };
        let params = cmp.params();

        let text = match cmp.op() {
            CompareOp::IsNull | CompareOp::IsNotNull => {
                format!("{column} {}", cmp.op().as_sql())
            }
            CompareOp::Between => {
                let low = self.datetime_placeholder(&params[0])?;
                let high = self.datetime_placeholder(&params[1])?;
                format!("{column} BETWEEN {low} AND {high}")
            }
            op @ (CompareOp::In | CompareOp::NotIn) => self.membership(&column, op, &params[0])?,
            op @ (CompareOp::Eq | CompareOp::NotEq)
                if self.binder.value(&params[0])?.is_null() =>
            {
                let test = if op == CompareOp::Eq {
                    "IS NULL"
                } else {
                    "IS NOT NULL"
                };
                format!("{column} {test}")
            }
            op @ (CompareOp::Like | CompareOp::NotLike) => {
                let ph = self.binder.scalar(&params[0])?;
                format!("{column} {} {ph}", op.as_sql())
            }
            op => {
                let ph = self.datetime_placeholder(&params[0])?;
                format!("{column} {} {ph}", op.as_sql())
            }
        };
        self.sql.push_str(&text);
        Ok(())
    }

    fn membership(&mut self, column: &str, op: CompareOp, param: &Identifier) -> Result<String> {
        let value = self.binder.value(param)?;
        let Some(items) = value.as_list() else {
            return Err(Error::TypeMismatch {
                parameter: param.to_string(),
                expected: String::from("a list"),
                found: value.type_name().to_string(),
            });
        };
        if items.iter().any(|item| item.as_list().is_some()) {
            return Err(Error::TypeMismatch {
                parameter: param.to_string(),
                expected: String::from("a scalar list element"),
                found: String::from("list"),
            });
        }
        let negated = op == CompareOp::NotIn;

        if items.is_empty() {
            return Ok(String::from(if negated { "1 = 1" } else { "1 = 0" }));
        }
        if self.profile.supports_array_binding {
            let ph = self.binder.whole(param)?;
            return Ok(if negated {
                format!("{column} <> ALL({ph})")
            } else {
                format!("{column} = ANY({ph})")
            });
        }
        let placeholders = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.binder.element(param, i, item))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("{column} {} ({placeholders})", op.as_sql()))
    }

    /// Emits a placeholder, wrapped when the dialect needs date and timestamp
    /// text converted explicitly.
    fn datetime_placeholder(&mut self, param: &Identifier) -> Result<String> {
        let temporal = self.binder.value(param)?.temporal();
        let ph = self.binder.scalar(param)?;
        Ok(match (self.profile.datetime, temporal) {
            (DateTimeBinding::ToDate, Some(Temporal::Date)) => {
                format!("TO_DATE({ph}, 'YYYY-MM-DD')")
            }
            (DateTimeBinding::ToDate, Some(Temporal::Timestamp)) => {
                format!("TO_DATE({ph}, 'YYYY-MM-DD HH24:MI:SS')")
            }
            (DateTimeBinding::CastDateTime2, Some(_)) => format!("CAST({ph} AS DATETIME2)"),
            _ => ph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StatementBuilder;
    use crate::condition::parse_condition;
    use crate::dialect::{MSSQL, ORACLE, POSTGRESQL, SQLITE};
    use crate::value::SqlValue;

    fn render(profile: &DialectProfile, stmt: &CanonicalStatement) -> String {
        Renderer::new(profile, stmt).render().unwrap().0
    }

    fn select_where(expression: &str, name: &str, value: SqlValue) -> CanonicalStatement {
        StatementBuilder::select("events")
            .filter(parse_condition(expression).unwrap())
            .bind(name, value)
            .build()
            .unwrap()
    }

    #[test]
    fn test_null_equality_becomes_is_null() {
        let stmt = select_where("deleted_at = :d", "d", SqlValue::Null);
        assert_eq!(
            render(&SQLITE, &stmt),
            "SELECT * FROM events WHERE deleted_at IS NULL"
        );
        let stmt = select_where("deleted_at != :d", "d", SqlValue::Null);
        assert_eq!(
            render(&POSTGRESQL, &stmt),
            "SELECT * FROM events WHERE deleted_at IS NOT NULL"
        );
    }

    #[test]
    fn test_datetime_wrapping() {
        let stmt = select_where("at >= :since", "since", SqlValue::Text("2024-05-01".into()));
        assert_eq!(
            render(&ORACLE, &stmt),
            "SELECT * FROM events WHERE at >= TO_DATE(:since, 'YYYY-MM-DD')"
        );
        assert_eq!(
            render(&MSSQL, &stmt),
            "SELECT * FROM events WHERE at >= CAST(@since AS DATETIME2)"
        );
        assert_eq!(render(&SQLITE, &stmt), "SELECT * FROM events WHERE at >= ?");

        let stmt = select_where(
            "at < :until",
            "until",
            SqlValue::Text("2024-05-01 12:30:00".into()),
        );
        assert_eq!(
            render(&ORACLE, &stmt),
            "SELECT * FROM events WHERE at < TO_DATE(:until, 'YYYY-MM-DD HH24:MI:SS')"
        );
    }

    #[test]
    fn test_like_is_never_wrapped() {
        let stmt = select_where("day LIKE :d", "d", SqlValue::Text("2024-05-01".into()));
        assert_eq!(render(&ORACLE, &stmt), "SELECT * FROM events WHERE day LIKE :d");
    }

    #[test]
    fn test_empty_in_lists() {
        let stmt = select_where("id IN :ids", "ids", SqlValue::List(vec![]));
        assert_eq!(render(&SQLITE, &stmt), "SELECT * FROM events WHERE 1 = 0");
        let stmt = select_where("id NOT IN :ids", "ids", SqlValue::List(vec![]));
        assert_eq!(render(&SQLITE, &stmt), "SELECT * FROM events WHERE 1 = 1");
    }

    #[test]
    fn test_array_binding_profile() {
        let profile = POSTGRESQL.with_array_binding(true);
        let stmt = select_where("id IN :ids", "ids", SqlValue::list([1_i64, 2, 3]));
        let (sql, binder) = Renderer::new(&profile, &stmt).render().unwrap();
        assert_eq!(sql, "SELECT * FROM events WHERE id = ANY($1)");
        assert_eq!(binder.finish().len(), 1);

        let stmt = select_where("id NOT IN :ids", "ids", SqlValue::list([1_i64]));
        assert_eq!(
            render(&profile, &stmt),
            "SELECT * FROM events WHERE id <> ALL($1)"
        );
    }

    #[test]
    fn test_in_requires_list() {
        let stmt = select_where("id IN :ids", "ids", SqlValue::Int(3));
        let err = Renderer::new(&SQLITE, &stmt).render().unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref found, .. } if found == "integer"));
    }

    #[test]
    fn test_nested_list_elements_rejected() {
        let ids = SqlValue::List(vec![SqlValue::list([1_i64]), SqlValue::Int(2)]);
        let stmt = select_where("id IN :ids", "ids", ids);
        let err = Renderer::new(&SQLITE, &stmt).render().unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                parameter: String::from("ids"),
                expected: String::from("a scalar list element"),
                found: String::from("list"),
            }
        );
    }

    #[test]
    fn test_list_in_scalar_position() {
        let stmt = select_where("id = :ids", "ids", SqlValue::list([1_i64]));
        assert!(Renderer::new(&SQLITE, &stmt).render().is_err());
    }

    fn two_rows() -> CanonicalStatement {
        StatementBuilder::insert("items")
            .row([
                (String::from("sku"), SqlValue::Text("a-1".into())),
                (String::from("qty"), SqlValue::Int(2)),
            ])
            .row([
                (String::from("sku"), SqlValue::Text("b-7".into())),
                (String::from("qty"), SqlValue::Int(5)),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn test_multi_row_insert_values_list() {
        let stmt = two_rows();
        assert_eq!(
            render(&POSTGRESQL, &stmt),
            "INSERT INTO items (sku, qty) VALUES ($1, $2), ($3, $4)"
        );
        assert_eq!(
            render(&MSSQL, &stmt),
            "INSERT INTO items (sku, qty) VALUES (@sku_0, @qty_0), (@sku_1, @qty_1)"
        );
    }

    #[test]
    fn test_multi_row_insert_all() {
        let stmt = two_rows();
        assert_eq!(
            render(&ORACLE, &stmt),
            "INSERT ALL INTO items (sku, qty) VALUES (:sku_0, :qty_0) \
             INTO items (sku, qty) VALUES (:sku_1, :qty_1) SELECT * FROM DUAL"
        );

        let single = StatementBuilder::insert("items").value("qty", 1_i64).build().unwrap();
        assert_eq!(render(&ORACLE, &single), "INSERT INTO items (qty) VALUES (:qty)");
    }
}
