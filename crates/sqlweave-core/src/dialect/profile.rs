//! Dialect profiles: everything that differs between target databases, as data.

use crate::ident::Identifier;
use crate::schema::{ForeignKeyAction, LogicalType};

/// How bound parameters are written into SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` per occurrence; parameters form an ordered list.
    Positional,
    /// `$1`, `$2`, ...; a name reused keeps its number.
    Numbered,
    /// `<sigil>name`; parameters form a name-to-value map.
    Named {
        /// `@` or `:`.
        sigil: char,
    },
}

impl PlaceholderStyle {
    /// Short description used in log events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positional => "positional",
            Self::Numbered => "numbered",
            Self::Named { .. } => "named",
        }
    }
}

/// Where the MERGE form takes its single source row from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSource {
    /// `USING (VALUES (...)) AS S (cols)`
    Values,
    /// `USING (SELECT ... AS col FROM dual) S`
    SelectFromDual,
}

/// The UPSERT grammar a dialect understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertSyntax {
    /// `ON CONFLICT (keys) DO UPDATE SET c = <excluded>.c`
    OnConflict {
        /// Name of the pseudo-table holding the rejected row.
        excluded: &'static str,
    },
    /// `ON DUPLICATE KEY UPDATE c = VALUES(c)`
    OnDuplicateKey,
    /// `MERGE INTO ... USING ... WHEN MATCHED ... WHEN NOT MATCHED ...`
    Merge {
        /// Row source form.
        source: MergeSource,
        /// Whether the statement must end with `;`.
        terminated: bool,
    },
}

/// How an INSERT with several value rows is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiRowInsert {
    /// `INSERT INTO t (cols) VALUES (...), (...)`
    ValuesList,
    /// `INSERT ALL INTO t (cols) VALUES (...) ... SELECT * FROM DUAL`
    InsertAll,
}

/// How LIMIT and OFFSET are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `LIMIT n OFFSET m`.
    LimitOffset {
        /// LIMIT operand meaning "no limit" when only OFFSET is given; `None`
        /// when OFFSET may appear alone.
        no_limit: Option<&'static str>,
    },
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`.
    OffsetFetch {
        /// Whether an ORDER BY must precede OFFSET.
        requires_order: bool,
    },
}

/// How `CREATE TABLE` is made conditional on the table not existing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceCheck {
    /// `CREATE TABLE IF NOT EXISTS`
    Clause,
    /// `IF OBJECT_ID(N'<t>', N'U') IS NULL CREATE TABLE ...`
    ObjectIdGuard,
    /// A PL/SQL block ignoring ORA-00955 (name already used).
    PlsqlBlock,
}

/// Where a single-column primary key is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeyStyle {
    /// On the column definition.
    Inline,
    /// As a trailing `PRIMARY KEY (...)` constraint.
    Trailing,
}

/// Where the auto-increment keyword goes in a column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrementPlacement {
    /// Right after the type.
    AfterType,
    /// After `NOT NULL`.
    AfterNotNull,
    /// After an inline `PRIMARY KEY`; the column must carry the key inline.
    AfterPrimaryKey,
}

/// How date and timestamp text parameters are bound in comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeBinding {
    /// Bound unchanged.
    Plain,
    /// `TO_DATE(<ph>, '<format>')`
    ToDate,
    /// `CAST(<ph> AS DATETIME2)`
    CastDateTime2,
}

/// Constant description of one target dialect.
///
/// Rendering code never branches on a dialect name, only on these fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectProfile {
    pub name: &'static str,
    pub placeholder: PlaceholderStyle,
    /// Opening and closing identifier quote.
    pub quote: (char, char),
    /// Words that must be quoted when used as identifiers, in addition to
    /// the words every dialect reserves.
    pub reserved: &'static [&'static str],
    pub type_map: &'static [(LogicalType, &'static str)],
    /// Type used for logical types missing from `type_map`.
    pub text_type: &'static str,
    pub upsert: UpsertSyntax,
    pub multi_row_insert: MultiRowInsert,
    pub pagination: Pagination,
    pub existence_check: ExistenceCheck,
    pub primary_key: PrimaryKeyStyle,
    pub auto_increment: &'static str,
    pub auto_increment_placement: AutoIncrementPlacement,
    /// Accepted ON DELETE actions.
    pub fk_on_delete: &'static [ForeignKeyAction],
    /// Accepted ON UPDATE actions.
    pub fk_on_update: &'static [ForeignKeyAction],
    pub datetime: DateTimeBinding,
    /// Whether a whole sequence may be bound to one placeholder.
    pub supports_array_binding: bool,
}

/// Words reserved by every supported dialect.
const COMMON_RESERVED: &[&str] = &[
    "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "END", "EXISTS", "FOREIGN", "FROM", "GRANT", "GROUP", "HAVING", "IN", "INDEX", "INNER",
    "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "NOT", "NULL", "ON", "OR", "ORDER",
    "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO", "UNION",
    "UNIQUE", "UPDATE", "VALUES", "WHEN", "WHERE", "WITH",
];

impl DialectProfile {
    /// Returns a copy with native array binding switched on or off.
    #[must_use]
    pub const fn with_array_binding(mut self, enabled: bool) -> Self {
        self.supports_array_binding = enabled;
        self
    }

    /// Returns true if `name` collides with a reserved word of this dialect.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        COMMON_RESERVED
            .iter()
            .chain(self.reserved)
            .any(|word| word.eq_ignore_ascii_case(name))
    }

    /// Writes an identifier, quoting it only when it is reserved or starts
    /// with a digit.
    #[must_use]
    pub fn quote_identifier(&self, ident: &Identifier) -> String {
        let name = ident.as_str();
        let leading_digit = name.starts_with(|c: char| c.is_ascii_digit());
        if leading_digit || self.is_reserved(name) {
            let (open, close) = self.quote;
            format!("{open}{name}{close}")
        } else {
            name.to_string()
        }
    }

    /// Returns the dialect type for `logical_type`.
    #[must_use]
    pub fn type_name(&self, logical_type: LogicalType) -> &'static str {
        self.type_map
            .iter()
            .find(|(t, _)| *t == logical_type)
            .map_or(self.text_type, |(_, name)| name)
    }
}
