//! Recursive-descent parser for a single condition.
//!
//! Grammar:
//!
//! ```text
//! condition := column operator operands EOF
//! operator  := '=' | '!=' | '<>' | '<' | '<=' | '>' | '>='
//!            | [NOT] LIKE | [NOT] IN | BETWEEN | IS [NOT] NULL
//! operands  := param                    (comparison, LIKE)
//!            | param | '(' param ')'    (IN)
//!            | param AND param          (BETWEEN)
//!            | <nothing>                (IS [NOT] NULL)
//! ```

use crate::ast::{Aggregate, CompareOp, Comparison};
use crate::error::{Error, Result};
use crate::ident::Identifier;
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

use super::StructuredCondition;

/// Parser over one condition expression.
pub(crate) struct ConditionParser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> ConditionParser<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            source,
            lexer,
            current,
        }
    }

    /// Parses the whole input as `column operator operands`.
    pub(crate) fn parse_comparison(&mut self) -> Result<Comparison> {
        let column = self.parse_column()?;
        let op = self.parse_operator()?;
        let params = self.parse_operands(op)?;
        self.expect_eof()?;
        Ok(Comparison::new(column, op, params, None))
    }

    /// Parses the whole input as a bare operator, e.g. `not in`.
    pub(crate) fn parse_operator_only(&mut self) -> Result<CompareOp> {
        let op = self.parse_operator()?;
        self.expect_eof()?;
        Ok(op)
    }

    fn parse_column(&mut self) -> Result<Identifier> {
        match &self.current.kind {
            TokenKind::Word(word) => {
                let column = Identifier::new(word.as_str())?;
                self.advance();
                Ok(column)
            }
            _ => Err(self.unexpected("column name")),
        }
    }

    fn parse_operator(&mut self) -> Result<CompareOp> {
        let op = match &self.current.kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::LtEq => CompareOp::LtEq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::GtEq => CompareOp::GtEq,
            TokenKind::Keyword(Keyword::Like) => CompareOp::Like,
            TokenKind::Keyword(Keyword::In) => CompareOp::In,
            TokenKind::Keyword(Keyword::Between) => CompareOp::Between,
            TokenKind::Keyword(Keyword::Not) => {
                self.advance();
                return match self.current.as_keyword() {
                    Some(Keyword::Like) => {
                        self.advance();
                        Ok(CompareOp::NotLike)
                    }
                    Some(Keyword::In) => {
                        self.advance();
                        Ok(CompareOp::NotIn)
                    }
                    _ => Err(self.unexpected("LIKE or IN after NOT")),
                };
            }
            TokenKind::Keyword(Keyword::Is) => {
                self.advance();
                let negated = self.check_keyword(Keyword::Not);
                if negated {
                    self.advance();
                }
                self.expect_keyword(Keyword::Null)?;
                return Ok(if negated {
                    CompareOp::IsNotNull
                } else {
                    CompareOp::IsNull
                });
            }
            TokenKind::Word(word) => {
                return Err(self.error(format!("unknown operator '{word}'")));
            }
            _ => return Err(self.unexpected("operator")),
        };
        self.advance();
        Ok(op)
    }

    fn parse_operands(&mut self, op: CompareOp) -> Result<Vec<Identifier>> {
        match op {
            CompareOp::IsNull | CompareOp::IsNotNull => Ok(Vec::new()),
            CompareOp::Between => {
                let low = self.parse_param()?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_param()?;
                Ok(vec![low, high])
            }
            CompareOp::In | CompareOp::NotIn if self.check(&TokenKind::LeftParen) => {
                self.advance();
                let param = self.parse_param()?;
                self.expect(&TokenKind::RightParen, "')'")?;
                Ok(vec![param])
            }
            _ => Ok(vec![self.parse_param()?]),
        }
    }

    fn parse_param(&mut self) -> Result<Identifier> {
        match &self.current.kind {
            TokenKind::Param(name) => {
                let param = Identifier::new(name.as_str())
                    .map_err(|_| self.error(format!("invalid parameter name ':{name}'")))?;
                self.advance();
                Ok(param)
            }
            _ => Err(self.unexpected("a ':name' parameter")),
        }
    }

    fn expect_eof(&self) -> Result<()> {
        if self.current.is_eof() {
            Ok(())
        } else {
            Err(self.unexpected("end of condition"))
        }
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current.as_keyword() == Some(keyword)
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(self.source, message, self.current.span)
    }

    fn unexpected(&self, expected: &str) -> Error {
        match &self.current.kind {
            TokenKind::Error(message) => self.error(message.clone()),
            found => self.error(format!("expected {expected}, found {}", found.describe())),
        }
    }
}

/// Parses a condition given as separate fields.
pub(crate) fn parse_structured(cond: &StructuredCondition) -> Result<Comparison> {
    let rendered = format!("{} {}", cond.column, cond.op);
    let whole = Span::new(0, rendered.len());

    let column = Identifier::new(cond.column.as_str())?;
    let op = ConditionParser::new(&cond.op)
        .parse_operator_only()
        .map_err(|err| match err {
            Error::Parse { message, .. } => Error::parse(&rendered, message, whole),
            other => other,
        })?;

    let aggregate = cond
        .aggregate
        .as_deref()
        .map(|name| {
            Aggregate::from_str(name)
                .ok_or_else(|| Error::parse(&rendered, format!("unknown aggregate '{name}'"), whole))
        })
        .transpose()?;

    let names = cond.param_names();
    if names.len() != op.arity() {
        return Err(Error::parse(
            &rendered,
            format!(
                "operator {} takes {} parameter(s), got {}",
                op.as_sql(),
                op.arity(),
                names.len()
            ),
            whole,
        ));
    }
    let params = names
        .into_iter()
        .map(|name| {
            Identifier::new(name).map_err(|_| {
                Error::parse(&rendered, format!("invalid parameter name ':{name}'"), whole)
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Comparison::new(column, op, params, aggregate))
}
