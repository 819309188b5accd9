//! Predicate tree and canonical statement representation.

mod predicate;
mod statement;

pub use predicate::{Aggregate, CompareOp, Comparison, LogicalOp, PredicateNode};
pub use statement::{
    Assignment, CanonicalStatement, ConflictAction, OrderBy, OrderDirection, StatementKind,
};
