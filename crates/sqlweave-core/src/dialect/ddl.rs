//! CREATE TABLE generation.

use std::collections::BTreeSet;

use tracing::debug;

use super::profile::{AutoIncrementPlacement, DialectProfile, ExistenceCheck, PrimaryKeyStyle};
use super::profiles::profile;
use crate::error::{Error, Result};
use crate::ident::Identifier;
use crate::schema::{ColumnSpec, ForeignKeyAction, LogicalType};

/// Renders `CREATE TABLE` for the named dialect.
///
/// # Errors
///
/// - [`Error::UnsupportedDialect`] for an unknown dialect name.
/// - [`Error::Validation`] if `table` is not a valid identifier.
/// - [`Error::Build`] for an unrenderable column list; see
///   [`render_create_table_with`].
pub fn render_create_table(
    columns: &[ColumnSpec],
    table: &str,
    if_not_exists: bool,
    dialect_name: &str,
) -> Result<String> {
    render_create_table_with(columns, table, if_not_exists, profile(dialect_name)?)
}

/// Renders `CREATE TABLE` for a dialect profile.
///
/// A single primary key column is declared inline when the profile allows
/// it; composite keys always become a trailing constraint.
///
/// # Errors
///
/// - [`Error::Validation`] if `table` is not a valid identifier.
/// - [`Error::Build`] if `columns` is empty or repeats a name, if
///   auto-increment is requested on anything but one integer primary key
///   column, or if a foreign key action is not accepted by the dialect.
pub fn render_create_table_with(
    columns: &[ColumnSpec],
    table: &str,
    if_not_exists: bool,
    profile: &DialectProfile,
) -> Result<String> {
    let table = Identifier::new(table)?;
    validate_columns(columns, profile)?;

    let keys: Vec<&ColumnSpec> = columns.iter().filter(|c| c.primary_key).collect();
    let inline_key = keys.len() == 1 && profile.primary_key == PrimaryKeyStyle::Inline;

    let mut lines: Vec<String> = columns
        .iter()
        .map(|c| column_definition(c, inline_key, profile))
        .collect();

    if !keys.is_empty() && !inline_key {
        let names: Vec<String> = keys
            .iter()
            .map(|c| profile.quote_identifier(&c.name))
            .collect();
        lines.push(format!("PRIMARY KEY ({})", names.join(", ")));
    }

    for column in columns {
        let Some(fk) = &column.foreign_key else {
            continue;
        };
        let mut line = format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            profile.quote_identifier(&column.name),
            profile.quote_identifier(&fk.ref_table),
            profile.quote_identifier(&fk.ref_column)
        );
        if let Some(action) = fk.on_delete {
            line.push_str(" ON DELETE ");
            line.push_str(action.as_sql());
        }
        if let Some(action) = fk.on_update {
            line.push_str(" ON UPDATE ");
            line.push_str(action.as_sql());
        }
        lines.push(line);
    }

    let name = profile.quote_identifier(&table);
    let body = format!("(\n    {}\n)", lines.join(",\n    "));
    let sql = match (if_not_exists, profile.existence_check) {
        (false, _) => format!("CREATE TABLE {name} {body}"),
        (true, ExistenceCheck::Clause) => format!("CREATE TABLE IF NOT EXISTS {name} {body}"),
        (true, ExistenceCheck::ObjectIdGuard) => {
            format!("IF OBJECT_ID(N'{name}', N'U') IS NULL\nCREATE TABLE {name} {body}")
        }
        (true, ExistenceCheck::PlsqlBlock) => {
            let ddl = format!("CREATE TABLE {name} {body}").replace('\'', "''");
            format!(
                "BEGIN\n    EXECUTE IMMEDIATE '{ddl}';\nEXCEPTION\n    WHEN OTHERS THEN\n        \
                 IF SQLCODE != -955 THEN\n            RAISE;\n        END IF;\nEND;"
            )
        }
    };

    debug!(
        dialect = profile.name,
        table = %table,
        columns = columns.len(),
        if_not_exists,
        "rendered create table"
    );
    Ok(sql)
}

fn validate_columns(columns: &[ColumnSpec], profile: &DialectProfile) -> Result<()> {
    if columns.is_empty() {
        return Err(Error::build("CREATE TABLE requires at least one column"));
    }

    let mut seen = BTreeSet::new();
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(Error::build(format!(
                "column '{}' is declared twice",
                column.name
            )));
        }
    }

    let keys = columns.iter().filter(|c| c.primary_key).count();
    let auto: Vec<&ColumnSpec> = columns.iter().filter(|c| c.auto_increment).collect();
    if auto.len() > 1 {
        return Err(Error::build("only one column may auto-increment"));
    }
    if let Some(column) = auto.first() {
        if column.logical_type != LogicalType::Integer || !column.primary_key {
            return Err(Error::build(format!(
                "auto-increment column '{}' must be an INTEGER primary key",
                column.name
            )));
        }
        let inline = keys == 1 && profile.primary_key == PrimaryKeyStyle::Inline;
        if profile.auto_increment_placement == AutoIncrementPlacement::AfterPrimaryKey && !inline
        {
            return Err(Error::build(format!(
                "{} auto-increment requires '{}' to be the only primary key column",
                profile.name, column.name
            )));
        }
    }

    for column in columns {
        let Some(fk) = &column.foreign_key else {
            continue;
        };
        check_action(fk.on_delete, profile.fk_on_delete, "ON DELETE", profile)?;
        check_action(fk.on_update, profile.fk_on_update, "ON UPDATE", profile)?;
    }
    Ok(())
}

fn check_action(
    action: Option<ForeignKeyAction>,
    accepted: &[ForeignKeyAction],
    clause: &str,
    profile: &DialectProfile,
) -> Result<()> {
    match action {
        Some(action) if !accepted.contains(&action) => Err(Error::build(format!(
            "{} does not support {clause} {}",
            profile.name,
            action.as_sql()
        ))),
        _ => Ok(()),
    }
}

fn column_definition(column: &ColumnSpec, inline_key: bool, profile: &DialectProfile) -> String {
    let auto = column.auto_increment.then_some(profile.auto_increment);
    let at = |placement: AutoIncrementPlacement| {
        auto.filter(|_| profile.auto_increment_placement == placement)
    };

    let mut parts = vec![
        profile.quote_identifier(&column.name),
        profile.type_name(column.logical_type).to_string(),
    ];
    parts.extend(at(AutoIncrementPlacement::AfterType).map(String::from));
    if !column.nullable {
        parts.push("NOT NULL".to_string());
    }
    parts.extend(at(AutoIncrementPlacement::AfterNotNull).map(String::from));
    if inline_key && column.primary_key {
        parts.push("PRIMARY KEY".to_string());
    }
    parts.extend(at(AutoIncrementPlacement::AfterPrimaryKey).map(String::from));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MSSQL, MYSQL, ORACLE, POSTGRESQL, SQLITE};
    use crate::schema::ForeignKeyRef;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name).unwrap()
    }

    fn id_column() -> ColumnSpec {
        ColumnSpec {
            nullable: false,
            primary_key: true,
            auto_increment: true,
            ..ColumnSpec::new(ident("id"), LogicalType::Integer)
        }
    }

    fn users() -> Vec<ColumnSpec> {
        vec![
            id_column(),
            ColumnSpec {
                nullable: false,
                ..ColumnSpec::new(ident("name"), LogicalType::Text)
            },
            ColumnSpec::new(ident("active"), LogicalType::Boolean),
        ]
    }

    #[test]
    fn test_sqlite_inline_key_with_autoincrement() {
        let sql = render_create_table_with(&users(), "users", true, &SQLITE).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS users (\n    \
             id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,\n    \
             name TEXT NOT NULL,\n    \
             active INTEGER\n)"
        );
    }

    #[test]
    fn test_mysql_trailing_key() {
        let sql = render_create_table_with(&users(), "users", false, &MYSQL).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE users (\n    \
             id BIGINT NOT NULL AUTO_INCREMENT,\n    \
             name VARCHAR(255) NOT NULL,\n    \
             active TINYINT(1),\n    \
             PRIMARY KEY (id)\n)"
        );
    }

    #[test]
    fn test_postgres_identity() {
        let sql = render_create_table_with(&users(), "users", false, &POSTGRESQL).unwrap();
        assert!(sql.contains("id BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL PRIMARY KEY"));
        assert!(sql.contains("active BOOLEAN"));
    }

    #[test]
    fn test_mssql_object_id_guard() {
        let sql = render_create_table_with(&users(), "users", true, &MSSQL).unwrap();
        assert!(sql.starts_with("IF OBJECT_ID(N'users', N'U') IS NULL\nCREATE TABLE users (\n"));
        assert!(sql.contains("id BIGINT IDENTITY(1,1) NOT NULL PRIMARY KEY"));
        assert!(sql.contains("active BIT"));
    }

    #[test]
    fn test_oracle_plsql_block() {
        let columns = vec![ColumnSpec {
            nullable: false,
            primary_key: true,
            ..ColumnSpec::new(ident("code"), LogicalType::Text)
        }];
        let sql = render_create_table_with(&columns, "lookup", true, &ORACLE).unwrap();
        assert_eq!(
            sql,
            "BEGIN\n    EXECUTE IMMEDIATE 'CREATE TABLE lookup (\n    \
             code VARCHAR2(255) NOT NULL,\n    \
             PRIMARY KEY (code)\n)';\n\
             EXCEPTION\n    WHEN OTHERS THEN\n        IF SQLCODE != -955 THEN\n            \
             RAISE;\n        END IF;\nEND;"
        );
    }

    #[test]
    fn test_composite_key_is_trailing() {
        let columns = vec![
            ColumnSpec {
                primary_key: true,
                nullable: false,
                ..ColumnSpec::new(ident("user_id"), LogicalType::Integer)
            },
            ColumnSpec {
                primary_key: true,
                nullable: false,
                ..ColumnSpec::new(ident("group_id"), LogicalType::Integer)
            },
        ];
        let sql = render_create_table_with(&columns, "memberships", false, &SQLITE).unwrap();
        assert!(sql.ends_with("    PRIMARY KEY (user_id, group_id)\n)"));
        assert!(!sql.contains("NOT NULL PRIMARY KEY"));
    }

    #[test]
    fn test_foreign_key_actions() {
        let mut columns = users();
        columns.push(ColumnSpec {
            foreign_key: Some(
                ForeignKeyRef::new(ident("teams"), ident("id"))
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::Restrict),
            ),
            ..ColumnSpec::new(ident("team_id"), LogicalType::Integer)
        });
        let sql = render_create_table_with(&columns, "users", false, &SQLITE).unwrap();
        assert!(sql.contains(
            "FOREIGN KEY (team_id) REFERENCES teams (id) ON DELETE CASCADE ON UPDATE RESTRICT"
        ));

        let err = render_create_table_with(&columns, "users", false, &MSSQL).unwrap_err();
        assert_eq!(
            err,
            Error::Build(String::from("mssql does not support ON UPDATE RESTRICT"))
        );
        assert!(render_create_table_with(&columns, "users", false, &ORACLE).is_err());
    }

    #[test]
    fn test_reserved_names_are_quoted() {
        let columns = vec![ColumnSpec::new(ident("order"), LogicalType::Integer)];
        let sql = render_create_table_with(&columns, "group", false, &MYSQL).unwrap();
        assert_eq!(sql, "CREATE TABLE `group` (\n    `order` BIGINT\n)");
    }

    #[test]
    fn test_rejects_bad_column_lists() {
        assert!(matches!(
            render_create_table_with(&[], "t", false, &SQLITE),
            Err(Error::Build(_))
        ));

        let twice = vec![
            ColumnSpec::new(ident("a"), LogicalType::Text),
            ColumnSpec::new(ident("a"), LogicalType::Integer),
        ];
        assert!(render_create_table_with(&twice, "t", false, &SQLITE).is_err());

        let text_auto = vec![ColumnSpec {
            auto_increment: true,
            primary_key: true,
            ..ColumnSpec::new(ident("a"), LogicalType::Text)
        }];
        assert!(render_create_table_with(&text_auto, "t", false, &SQLITE).is_err());

        assert!(matches!(
            render_create_table_with(&users(), "bad name", false, &SQLITE),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_sqlite_autoincrement_needs_sole_key() {
        let mut columns = users();
        columns[1].primary_key = true;
        assert!(render_create_table_with(&columns, "t", false, &SQLITE).is_err());
        assert!(render_create_table_with(&columns, "t", false, &MYSQL).is_ok());
    }

    #[test]
    fn test_unknown_dialect() {
        assert_eq!(
            render_create_table(&users(), "users", false, "db2"),
            Err(Error::UnsupportedDialect(String::from("db2")))
        );
    }
}
