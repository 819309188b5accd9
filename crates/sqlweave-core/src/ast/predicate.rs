//! The predicate tree produced by the condition parser.

use std::fmt;

use crate::ident::Identifier;

/// Comparison operators accepted in a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=` (also written `<>`)
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `BETWEEN ... AND ...`
    Between,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
}

impl CompareOp {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Between => "BETWEEN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Number of parameter references the operator takes.
    ///
    /// `IN` takes one reference whose value is a sequence.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::IsNull | Self::IsNotNull => 0,
            Self::Between => 2,
            _ => 1,
        }
    }
}

/// Aggregate functions that may wrap a column in a HAVING condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl Aggregate {
    /// Looks up an aggregate by name, ignoring ASCII case.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        [Self::Count, Self::Sum, Self::Avg, Self::Min, Self::Max]
            .into_iter()
            .find(|agg| agg.as_str().eq_ignore_ascii_case(s))
    }

    /// Returns the SQL function name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A single `column operator parameter(s)` test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    column: Identifier,
    op: CompareOp,
    params: Vec<Identifier>,
    aggregate: Option<Aggregate>,
}

impl Comparison {
    /// Creates a comparison. The parameter count must match `op.arity()`.
    pub(crate) fn new(
        column: Identifier,
        op: CompareOp,
        params: Vec<Identifier>,
        aggregate: Option<Aggregate>,
    ) -> Self {
        debug_assert_eq!(params.len(), op.arity());
        Self {
            column,
            op,
            params,
            aggregate,
        }
    }

    /// The tested column.
    #[must_use]
    pub const fn column(&self) -> &Identifier {
        &self.column
    }

    /// The operator.
    #[must_use]
    pub const fn op(&self) -> CompareOp {
        self.op
    }

    /// Parameter names in source order.
    #[must_use]
    pub fn params(&self) -> &[Identifier] {
        &self.params
    }

    /// The aggregate wrapping the column, if any.
    #[must_use]
    pub const fn aggregate(&self) -> Option<Aggregate> {
        self.aggregate
    }
}

/// A node of the predicate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateNode {
    /// A leaf test.
    Comparison(Comparison),
    /// An AND/OR group with at least one child.
    Logical {
        /// The connective.
        op: LogicalOp,
        /// The operands, in source order.
        children: Vec<PredicateNode>,
    },
}

impl PredicateNode {
    /// Groups `children` under `op`. A single child is returned unwrapped.
    ///
    /// Returns `None` when `children` is empty.
    #[must_use]
    pub fn group(op: LogicalOp, mut children: Vec<Self>) -> Option<Self> {
        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(Self::Logical { op, children }),
        }
    }

    /// Parameter names referenced by the tree, depth-first, with repeats.
    #[must_use]
    pub fn param_refs(&self) -> Vec<&Identifier> {
        let mut refs = Vec::new();
        self.collect_params(&mut refs);
        refs
    }

    fn collect_params<'a>(&'a self, refs: &mut Vec<&'a Identifier>) {
        match self {
            Self::Comparison(cmp) => refs.extend(cmp.params()),
            Self::Logical { children, .. } => {
                for child in children {
                    child.collect_params(refs);
                }
            }
        }
    }

    /// Iterates over the leaf comparisons, depth-first.
    pub fn comparisons(&self) -> Box<dyn Iterator<Item = &Comparison> + '_> {
        match self {
            Self::Comparison(cmp) => Box::new(std::iter::once(cmp)),
            Self::Logical { children, .. } => {
                Box::new(children.iter().flat_map(Self::comparisons))
            }
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, root: bool) -> fmt::Result {
        match self {
            Self::Comparison(cmp) => write!(f, "{cmp}"),
            Self::Logical { op, children } => {
                let wrap = !root && children.len() > 1;
                if wrap {
                    f.write_str("(")?;
                }
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op.as_sql())?;
                    }
                    child.fmt_nested(f, false)?;
                }
                if wrap {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.aggregate {
            Some(agg) => write!(f, "{}({})", agg.as_str(), self.column)?,
            None => write!(f, "{}", self.column)?,
        }
        match self.op {
            CompareOp::IsNull | CompareOp::IsNotNull => write!(f, " {}", self.op.as_sql()),
            CompareOp::Between => write!(
                f,
                " BETWEEN :{} AND :{}",
                self.params[0], self.params[1]
            ),
            op => write!(f, " {} :{}", op.as_sql(), self.params[0]),
        }
    }
}

/// Canonical rendering with `:name` placeholders. The outermost group is not
/// parenthesized.
impl fmt::Display for PredicateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, true)
    }
}
