//! The built-in dialect profiles.

use std::fmt;
use std::str::FromStr;

use super::profile::{
    AutoIncrementPlacement, DateTimeBinding, DialectProfile, ExistenceCheck, MergeSource,
    MultiRowInsert, Pagination, PlaceholderStyle, PrimaryKeyStyle, UpsertSyntax,
};
use crate::error::{Error, Result};
use crate::schema::{ForeignKeyAction, LogicalType};

const ALL_FK_ACTIONS: &[ForeignKeyAction] = &[
    ForeignKeyAction::NoAction,
    ForeignKeyAction::Restrict,
    ForeignKeyAction::Cascade,
    ForeignKeyAction::SetNull,
    ForeignKeyAction::SetDefault,
];

/// SQLite.
pub const SQLITE: DialectProfile = DialectProfile {
    name: "sqlite",
    placeholder: PlaceholderStyle::Positional,
    quote: ('"', '"'),
    reserved: &[
        "ABORT", "AUTOINCREMENT", "LIMIT", "OFFSET", "PRAGMA", "REPLACE", "ROWID", "TRANSACTION",
    ],
    type_map: &[
        (LogicalType::Integer, "INTEGER"),
        (LogicalType::Float, "REAL"),
        (LogicalType::Text, "TEXT"),
        (LogicalType::Boolean, "INTEGER"),
        (LogicalType::Blob, "BLOB"),
    ],
    text_type: "TEXT",
    upsert: UpsertSyntax::OnConflict {
        excluded: "excluded",
    },
    multi_row_insert: MultiRowInsert::ValuesList,
    pagination: Pagination::LimitOffset {
        no_limit: Some("-1"),
    },
    existence_check: ExistenceCheck::Clause,
    primary_key: PrimaryKeyStyle::Inline,
    auto_increment: "AUTOINCREMENT",
    auto_increment_placement: AutoIncrementPlacement::AfterPrimaryKey,
    fk_on_delete: ALL_FK_ACTIONS,
    fk_on_update: ALL_FK_ACTIONS,
    datetime: DateTimeBinding::Plain,
    supports_array_binding: false,
};

/// PostgreSQL.
pub const POSTGRESQL: DialectProfile = DialectProfile {
    name: "postgresql",
    placeholder: PlaceholderStyle::Numbered,
    quote: ('"', '"'),
    reserved: &[
        "ANALYSE", "ANALYZE", "ARRAY", "CURRENT_USER", "FETCH", "LIMIT", "OFFSET", "USER",
    ],
    type_map: &[
        (LogicalType::Integer, "BIGINT"),
        (LogicalType::Float, "DOUBLE PRECISION"),
        (LogicalType::Text, "VARCHAR(255)"),
        (LogicalType::Boolean, "BOOLEAN"),
        (LogicalType::DateTime, "TIMESTAMP"),
        (LogicalType::Blob, "BYTEA"),
    ],
    text_type: "TEXT",
    upsert: UpsertSyntax::OnConflict {
        excluded: "EXCLUDED",
    },
    multi_row_insert: MultiRowInsert::ValuesList,
    pagination: Pagination::LimitOffset { no_limit: None },
    existence_check: ExistenceCheck::Clause,
    primary_key: PrimaryKeyStyle::Inline,
    auto_increment: "GENERATED BY DEFAULT AS IDENTITY",
    auto_increment_placement: AutoIncrementPlacement::AfterType,
    fk_on_delete: ALL_FK_ACTIONS,
    fk_on_update: ALL_FK_ACTIONS,
    datetime: DateTimeBinding::Plain,
    supports_array_binding: false,
};

/// MySQL.
pub const MYSQL: DialectProfile = DialectProfile {
    name: "mysql",
    placeholder: PlaceholderStyle::Positional,
    quote: ('`', '`'),
    reserved: &[
        "DATABASE", "DIV", "INTERVAL", "LIMIT", "MOD", "RANGE", "READ", "REPLACE", "SCHEMA",
        "SIGNAL", "USAGE",
    ],
    type_map: &[
        (LogicalType::Integer, "BIGINT"),
        (LogicalType::Float, "DOUBLE"),
        (LogicalType::Text, "VARCHAR(255)"),
        (LogicalType::Boolean, "TINYINT(1)"),
        (LogicalType::DateTime, "DATETIME"),
        (LogicalType::Blob, "BLOB"),
    ],
    text_type: "TEXT",
    upsert: UpsertSyntax::OnDuplicateKey,
    multi_row_insert: MultiRowInsert::ValuesList,
    pagination: Pagination::LimitOffset {
        no_limit: Some("18446744073709551615"),
    },
    existence_check: ExistenceCheck::Clause,
    primary_key: PrimaryKeyStyle::Trailing,
    auto_increment: "AUTO_INCREMENT",
    auto_increment_placement: AutoIncrementPlacement::AfterNotNull,
    fk_on_delete: ALL_FK_ACTIONS,
    fk_on_update: ALL_FK_ACTIONS,
    datetime: DateTimeBinding::Plain,
    supports_array_binding: false,
};

/// Microsoft SQL Server.
pub const MSSQL: DialectProfile = DialectProfile {
    name: "mssql",
    placeholder: PlaceholderStyle::Named { sigil: '@' },
    quote: ('[', ']'),
    reserved: &[
        "FILE", "IDENTITY", "MERGE", "OFFSETS", "PERCENT", "PLAN", "PUBLIC", "TOP", "TRAN",
        "USER",
    ],
    type_map: &[
        (LogicalType::Integer, "BIGINT"),
        (LogicalType::Float, "FLOAT"),
        (LogicalType::Text, "VARCHAR(255)"),
        (LogicalType::Boolean, "BIT"),
        (LogicalType::DateTime, "DATETIME"),
        (LogicalType::Blob, "VARBINARY(MAX)"),
    ],
    text_type: "NVARCHAR(MAX)",
    upsert: UpsertSyntax::Merge {
        source: MergeSource::Values,
        terminated: true,
    },
    multi_row_insert: MultiRowInsert::ValuesList,
    pagination: Pagination::OffsetFetch {
        requires_order: true,
    },
    existence_check: ExistenceCheck::ObjectIdGuard,
    primary_key: PrimaryKeyStyle::Inline,
    auto_increment: "IDENTITY(1,1)",
    auto_increment_placement: AutoIncrementPlacement::AfterType,
    fk_on_delete: &[
        ForeignKeyAction::NoAction,
        ForeignKeyAction::Cascade,
        ForeignKeyAction::SetNull,
        ForeignKeyAction::SetDefault,
    ],
    fk_on_update: &[
        ForeignKeyAction::NoAction,
        ForeignKeyAction::Cascade,
        ForeignKeyAction::SetNull,
        ForeignKeyAction::SetDefault,
    ],
    datetime: DateTimeBinding::CastDateTime2,
    supports_array_binding: false,
};

/// Oracle.
pub const ORACLE: DialectProfile = DialectProfile {
    name: "oracle",
    placeholder: PlaceholderStyle::Named { sigil: ':' },
    quote: ('"', '"'),
    reserved: &[
        "ACCESS", "COMMENT", "DATE", "FILE", "LEVEL", "MODE", "NUMBER", "RESOURCE", "ROWID",
        "ROWNUM", "SIZE", "UID", "USER",
    ],
    type_map: &[
        (LogicalType::Integer, "NUMBER"),
        (LogicalType::Float, "BINARY_DOUBLE"),
        (LogicalType::Text, "VARCHAR2(255)"),
        (LogicalType::Boolean, "NUMBER(1,0)"),
        (LogicalType::DateTime, "DATE"),
        (LogicalType::Blob, "BLOB"),
    ],
    text_type: "CLOB",
    upsert: UpsertSyntax::Merge {
        source: MergeSource::SelectFromDual,
        terminated: false,
    },
    multi_row_insert: MultiRowInsert::InsertAll,
    pagination: Pagination::OffsetFetch {
        requires_order: false,
    },
    existence_check: ExistenceCheck::PlsqlBlock,
    primary_key: PrimaryKeyStyle::Trailing,
    auto_increment: "GENERATED BY DEFAULT AS IDENTITY",
    auto_increment_placement: AutoIncrementPlacement::AfterType,
    fk_on_delete: &[ForeignKeyAction::Cascade, ForeignKeyAction::SetNull],
    fk_on_update: &[],
    datetime: DateTimeBinding::ToDate,
    supports_array_binding: false,
};

/// The supported dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Sqlite,
    Postgresql,
    Mysql,
    Mssql,
    Oracle,
}

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Self; 5] = [
        Self::Sqlite,
        Self::Postgresql,
        Self::Mysql,
        Self::Mssql,
        Self::Oracle,
    ];

    /// Returns the dialect's profile.
    #[must_use]
    pub const fn profile(self) -> &'static DialectProfile {
        match self {
            Self::Sqlite => &SQLITE,
            Self::Postgresql => &POSTGRESQL,
            Self::Mysql => &MYSQL,
            Self::Mssql => &MSSQL,
            Self::Oracle => &ORACLE,
        }
    }

    /// Returns the canonical dialect name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.profile().name
    }
}

impl FromStr for Dialect {
    type Err = Error;

    /// Parses a dialect name, ignoring ASCII case. `postgres` and `sqlserver`
    /// are accepted as aliases.
    fn from_str(name: &str) -> Result<Self> {
        let found = match name.to_ascii_lowercase().as_str() {
            "sqlite" => Self::Sqlite,
            "postgresql" | "postgres" => Self::Postgresql,
            "mysql" => Self::Mysql,
            "mssql" | "sqlserver" => Self::Mssql,
            "oracle" => Self::Oracle,
            _ => return Err(Error::UnsupportedDialect(name.to_string())),
        };
        Ok(found)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks up a built-in profile by dialect name.
///
/// # Errors
///
/// Returns [`Error::UnsupportedDialect`] for unknown names.
pub fn profile(name: &str) -> Result<&'static DialectProfile> {
    name.parse::<Dialect>().map(Dialect::profile)
}
