//! Caller-facing condition shapes.

use serde::Deserialize;

/// One entry of a condition list.
///
/// In JSON a string is an expression, an object with a `column` key is a
/// structured condition, an array is an OR group and `{"all": [...]}` is an
/// AND group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConditionInput {
    /// A condition expression such as `age > :age`.
    Expr(String),
    /// A condition given field by field.
    Structured(StructuredCondition),
    /// Conditions of which at least one must hold.
    Any(Vec<ConditionInput>),
    /// Conditions that must all hold.
    All {
        /// The grouped conditions.
        all: Vec<ConditionInput>,
    },
}

impl ConditionInput {
    /// Creates a structured condition with a single parameter.
    #[must_use]
    pub fn structured(column: &str, op: &str, param: &str) -> Self {
        Self::Structured(StructuredCondition {
            column: column.to_string(),
            op: op.to_string(),
            param: Some(param.to_string()),
            ..StructuredCondition::default()
        })
    }
}

impl From<&str> for ConditionInput {
    fn from(expr: &str) -> Self {
        Self::Expr(expr.to_string())
    }
}

impl From<String> for ConditionInput {
    fn from(expr: String) -> Self {
        Self::Expr(expr)
    }
}

impl From<StructuredCondition> for ConditionInput {
    fn from(cond: StructuredCondition) -> Self {
        Self::Structured(cond)
    }
}

/// A condition supplied as separate column, operator and parameter fields.
///
/// The operator text goes through the same grammar as expressions, so it is
/// held to the same closed operator set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredCondition {
    /// The column.
    pub column: String,
    /// The operator, e.g. `>=`, `not in`, `is null`.
    pub op: String,
    /// The parameter name for single-parameter operators.
    #[serde(default)]
    pub param: Option<String>,
    /// Parameter names for `BETWEEN` (low, high).
    #[serde(default)]
    pub params: Vec<String>,
    /// Optional aggregate applied to the column (`COUNT`, `SUM`, ...).
    #[serde(default)]
    pub aggregate: Option<String>,
}

impl StructuredCondition {
    /// Wraps the column in `aggregate`.
    #[must_use]
    pub fn with_aggregate(mut self, aggregate: &str) -> Self {
        self.aggregate = Some(aggregate.to_string());
        self
    }

    /// Parameter names in order, whichever field supplied them.
    pub(crate) fn param_names(&self) -> Vec<&str> {
        self.param
            .iter()
            .chain(self.params.iter())
            .map(String::as_str)
            .collect()
    }
}
