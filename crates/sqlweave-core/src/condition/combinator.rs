//! Combinator expressions such as `1 AND (2 OR 3)`.
//!
//! Integers are 1-based indices into the condition list. AND binds tighter
//! than OR.

use crate::ast::{LogicalOp, PredicateNode};
use crate::error::{Error, Result};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// Deepest parenthesis nesting accepted in an expression.
pub(crate) const MAX_NESTING: usize = 64;

struct Combinator<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    conditions: &'a [PredicateNode],
    depth: usize,
}

impl<'a> Combinator<'a> {
    fn new(source: &'a str, conditions: &'a [PredicateNode]) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            source,
            lexer,
            current,
            conditions,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<PredicateNode> {
        let node = self.parse_chain(LogicalOp::Or)?;
        if self.current.is_eof() {
            Ok(node)
        } else {
            Err(self.unexpected("AND, OR or end of expression"))
        }
    }

    /// Parses operands joined by `op`; OR chains are made of AND chains.
    fn parse_chain(&mut self, op: LogicalOp) -> Result<PredicateNode> {
        let keyword = match op {
            LogicalOp::Or => Keyword::Or,
            LogicalOp::And => Keyword::And,
        };
        let mut children = vec![self.parse_operand(op)?];
        while self.current.as_keyword() == Some(keyword) {
            self.advance();
            children.push(self.parse_operand(op)?);
        }
        PredicateNode::group(op, children).ok_or_else(|| self.error("empty expression"))
    }

    fn parse_operand(&mut self, op: LogicalOp) -> Result<PredicateNode> {
        match op {
            LogicalOp::Or => self.parse_chain(LogicalOp::And),
            LogicalOp::And => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<PredicateNode> {
        match &self.current.kind {
            TokenKind::LeftParen => {
                if self.depth == MAX_NESTING {
                    return Err(self.error(format!(
                        "parentheses nest deeper than {MAX_NESTING} levels"
                    )));
                }
                self.depth += 1;
                self.advance();
                let inner = self.parse_chain(LogicalOp::Or)?;
                if !matches!(self.current.kind, TokenKind::RightParen) {
                    return Err(self.unexpected("')'"));
                }
                self.advance();
                self.depth -= 1;
                Ok(inner)
            }
            TokenKind::Word(word) if word.bytes().all(|b| b.is_ascii_digit()) => {
                let node = word
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| index.checked_sub(1))
                    .and_then(|index| self.conditions.get(index))
                    .cloned()
                    .ok_or_else(|| {
                        self.error(format!(
                            "condition index {word} is out of range 1..={}",
                            self.conditions.len()
                        ))
                    })?;
                self.advance();
                Ok(node)
            }
            _ => Err(self.unexpected("a condition index or '('")),
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(self.source, message, self.current.span)
    }

    fn unexpected(&self, expected: &str) -> Error {
        self.error(format!(
            "expected {expected}, found {}",
            self.current.kind.describe()
        ))
    }
}

/// Combines parsed conditions according to `expression`.
///
/// Conditions that `expression` never mentions are left out; an index may be
/// mentioned more than once.
pub(crate) fn combine(expression: &str, conditions: &[PredicateNode]) -> Result<PredicateNode> {
    Combinator::new(expression, conditions).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::parse_condition;

    fn conditions() -> Vec<PredicateNode> {
        ["a = :a", "b = :b", "c = :c"]
            .into_iter()
            .map(|s| parse_condition(s).unwrap())
            .collect()
    }

    fn render(expression: &str) -> String {
        combine(expression, &conditions()).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(render("1 AND 2 OR 3"), "(a = :a AND b = :b) OR c = :c");
        assert_eq!(render("1 OR 2 AND 3"), "a = :a OR (b = :b AND c = :c)");
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(render("1 AND (2 OR 3)"), "a = :a AND (b = :b OR c = :c)");
        assert_eq!(render("((2))"), "b = :b");
    }

    #[test]
    fn test_subset_and_repeat() {
        assert_eq!(render("3"), "c = :c");
        assert_eq!(render("1 or 1"), "a = :a OR a = :a");
    }

    #[test]
    fn test_rejects_out_of_range() {
        for expression in ["0", "4", "1 AND 99999999999999999999999"] {
            assert!(
                matches!(combine(expression, &conditions()), Err(Error::Parse { .. })),
                "{expression}"
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |levels: usize| format!("{}2{}", "(".repeat(levels), ")".repeat(levels));
        assert_eq!(render(&nested(MAX_NESTING)), "b = :b");

        let err = combine(&nested(MAX_NESTING + 1), &conditions()).unwrap_err();
        assert!(matches!(err, Error::Parse { ref message, .. } if message.contains("nest")));

        let deep = nested(10_000);
        assert!(matches!(
            combine(&deep, &conditions()),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_rejects_foreign_tokens() {
        for expression in [
            "",
            "1 AND",
            "1 2",
            "(1 OR 2",
            "1 OR 2)",
            "NOT 1",
            "1; DROP TABLE users",
            "1 AND x",
            "1 = 1",
        ] {
            assert!(
                matches!(combine(expression, &conditions()), Err(Error::Parse { .. })),
                "{expression:?} should be rejected"
            );
        }
    }
}
