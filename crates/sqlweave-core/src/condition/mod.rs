//! Condition parsing.
//!
//! This is the only place where caller-supplied text is interpreted. Every
//! expression is parsed by an explicit grammar into a [`PredicateNode`];
//! nothing outside the grammar reaches the generated SQL.
//!
//! ```rust
//! use sqlweave_core::condition::{parse_conditions, ConditionInput};
//!
//! let predicate = parse_conditions(&[
//!     ConditionInput::from("age >= :min_age"),
//!     ConditionInput::from("status IN :statuses"),
//! ])
//! .unwrap();
//! assert_eq!(
//!     predicate.to_string(),
//!     "age >= :min_age AND status IN :statuses"
//! );
//! ```

mod combinator;
mod input;
mod parser;

pub use input::{ConditionInput, StructuredCondition};

use crate::ast::{LogicalOp, PredicateNode};
use crate::error::{Error, Result};
use crate::lexer::Span;

use parser::{parse_structured, ConditionParser};

/// Parses one condition expression such as `age BETWEEN :lo AND :hi`.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed expressions and unknown operators,
/// and [`Error::Validation`] when the column is not a valid identifier.
pub fn parse_condition(expression: &str) -> Result<PredicateNode> {
    ConditionParser::new(expression)
        .parse_comparison()
        .map(PredicateNode::Comparison)
}

/// Parses a condition list, joining the entries with AND.
///
/// # Errors
///
/// Fails on the first entry that does not parse, and with [`Error::Parse`]
/// when the list or any group in it is empty.
pub fn parse_conditions(conditions: &[ConditionInput]) -> Result<PredicateNode> {
    parse_conditions_with(conditions, None)
}

/// Parses a condition list and joins the entries as `combinator` describes,
/// e.g. `"1 AND (2 OR 3)"`. Without a combinator the entries are joined with
/// AND.
///
/// # Errors
///
/// Same as [`parse_conditions`], plus [`Error::Parse`] for a malformed
/// combinator or an index outside the list.
pub fn parse_conditions_with(
    conditions: &[ConditionInput],
    combinator: Option<&str>,
) -> Result<PredicateNode> {
    let nodes = conditions
        .iter()
        .map(|input| parse_input(input, 0))
        .collect::<Result<Vec<_>>>()?;

    match combinator {
        Some(expression) => combinator::combine(expression, &nodes),
        None => PredicateNode::group(LogicalOp::And, nodes)
            .ok_or_else(|| empty_error("no conditions given")),
    }
}

fn parse_input(input: &ConditionInput, depth: usize) -> Result<PredicateNode> {
    match input {
        ConditionInput::Expr(expression) => parse_condition(expression),
        ConditionInput::Structured(cond) => parse_structured(cond).map(PredicateNode::Comparison),
        ConditionInput::Any(items) => parse_group(LogicalOp::Or, items, depth),
        ConditionInput::All { all } => parse_group(LogicalOp::And, all, depth),
    }
}

fn parse_group(op: LogicalOp, items: &[ConditionInput], depth: usize) -> Result<PredicateNode> {
    if depth == combinator::MAX_NESTING {
        return Err(empty_error(&format!(
            "condition groups nest deeper than {} levels",
            combinator::MAX_NESTING
        )));
    }
    let children = items
        .iter()
        .map(|item| parse_input(item, depth + 1))
        .collect::<Result<Vec<_>>>()?;
    PredicateNode::group(op, children)
        .ok_or_else(|| empty_error(&format!("empty {} group", op.as_sql())))
}

fn empty_error(message: &str) -> Error {
    Error::parse("", message, Span::default())
}
