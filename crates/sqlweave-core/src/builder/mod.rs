//! Statement assembly.
//!
//! Turns caller input and a parsed predicate into a validated
//! [`CanonicalStatement`](crate::ast::CanonicalStatement).

mod statement;

pub use statement::{build_statement, StatementBuilder};
