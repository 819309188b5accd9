//! Column specifications for CREATE TABLE.

use serde::{Deserialize, Serialize};

use crate::ident::Identifier;

/// Dialect-neutral column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalType {
    #[serde(alias = "integer", alias = "int")]
    Integer,
    #[serde(alias = "float", alias = "real")]
    Float,
    #[serde(alias = "text", alias = "string", alias = "str")]
    Text,
    #[serde(alias = "boolean", alias = "bool")]
    Boolean,
    #[serde(alias = "datetime", alias = "timestamp")]
    DateTime,
    #[serde(alias = "blob", alias = "bytes")]
    Blob,
}

impl LogicalType {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::DateTime => "DATETIME",
            Self::Blob => "BLOB",
        }
    }
}

/// Foreign key action (ON DELETE / ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    /// No action (default).
    #[default]
    #[serde(rename = "NO ACTION", alias = "no_action", alias = "no action")]
    NoAction,
    /// Restrict deletion/update.
    #[serde(rename = "RESTRICT", alias = "restrict")]
    Restrict,
    /// Cascade deletion/update.
    #[serde(rename = "CASCADE", alias = "cascade")]
    Cascade,
    /// Set to NULL.
    #[serde(rename = "SET NULL", alias = "set_null", alias = "set null")]
    SetNull,
    /// Set to default value.
    #[serde(rename = "SET DEFAULT", alias = "set_default", alias = "set default")]
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// The column a foreign key points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub ref_table: Identifier,
    pub ref_column: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ForeignKeyAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ForeignKeyAction>,
}

impl ForeignKeyRef {
    /// A reference to `ref_table(ref_column)` without actions.
    #[must_use]
    pub const fn new(ref_table: Identifier, ref_column: Identifier) -> Self {
        Self {
            ref_table,
            ref_column,
            on_delete: None,
            on_update: None,
        }
    }

    #[must_use]
    pub const fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    #[must_use]
    pub const fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// One column of a table to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: Identifier,
    pub logical_type: LogicalType,
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyRef>,
}

impl ColumnSpec {
    /// A nullable, unkeyed column.
    #[must_use]
    pub const fn new(name: Identifier, logical_type: LogicalType) -> Self {
        Self {
            name,
            logical_type,
            nullable: true,
            primary_key: false,
            auto_increment: false,
            foreign_key: None,
        }
    }
}

/// Caller annotations applied on top of inferred columns.
///
/// Key roles are never inferred from data; they come only from here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ColumnOverride {
    /// The column the annotation applies to.
    pub name: String,
    /// Replaces the inferred type.
    #[serde(default)]
    pub logical_type: Option<LogicalType>,
    /// Replaces the inferred nullability.
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub foreign_key: Option<ForeignKeyRef>,
}

impl ColumnOverride {
    /// An empty annotation for `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub const fn logical_type(mut self, logical_type: LogicalType) -> Self {
        self.logical_type = Some(logical_type);
        self
    }

    #[must_use]
    pub const fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    #[must_use]
    pub fn references(mut self, foreign_key: ForeignKeyRef) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_type_serde() {
        let parsed: Vec<LogicalType> =
            serde_json::from_str(r#"["INTEGER", "text", "bool", "DATETIME"]"#).unwrap();
        assert_eq!(
            parsed,
            [
                LogicalType::Integer,
                LogicalType::Text,
                LogicalType::Boolean,
                LogicalType::DateTime
            ]
        );
        assert_eq!(
            serde_json::to_string(&LogicalType::Float).unwrap(),
            "\"FLOAT\""
        );
    }

    #[test]
    fn test_foreign_key_action_serde() {
        let parsed: Vec<ForeignKeyAction> =
            serde_json::from_str(r#"["CASCADE", "set null", "NO ACTION"]"#).unwrap();
        assert_eq!(
            parsed,
            [
                ForeignKeyAction::Cascade,
                ForeignKeyAction::SetNull,
                ForeignKeyAction::NoAction
            ]
        );
        assert_eq!(ForeignKeyAction::SetDefault.as_sql(), "SET DEFAULT");
    }

    #[test]
    fn test_foreign_key_ref_rejects_bad_names() {
        let parsed = serde_json::from_str::<ForeignKeyRef>(
            r#"{"ref_table": "users; --", "ref_column": "id"}"#,
        );
        assert!(parsed.is_err());
    }
}
