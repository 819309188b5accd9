//! Token types for the condition lexer.

use super::Span;

/// Keywords recognised inside a condition expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Or,
    Not,
    In,
    Is,
    Null,
    Like,
    Between,
}

impl Keyword {
    /// Looks up a keyword, ignoring ASCII case.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        const KEYWORDS: [(&str, Keyword); 8] = [
            ("AND", Keyword::And),
            ("OR", Keyword::Or),
            ("NOT", Keyword::Not),
            ("IN", Keyword::In),
            ("IS", Keyword::Is),
            ("NULL", Keyword::Null),
            ("LIKE", Keyword::Like),
            ("BETWEEN", Keyword::Between),
        ];
        KEYWORDS
            .iter()
            .find(|(text, _)| text.eq_ignore_ascii_case(s))
            .map(|(_, kw)| *kw)
    }

    /// Returns the canonical (upper-case) spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Is => "IS",
            Self::Null => "NULL",
            Self::Like => "LIKE",
            Self::Between => "BETWEEN",
        }
    }
}

/// The kind of a condition token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare word: a column name, or a condition index in a combinator.
    Word(String),
    /// A reserved keyword.
    Keyword(Keyword),
    /// A `:name` parameter reference (the name, without the colon).
    Param(String),

    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,

    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,

    /// End of input
    Eof,
    /// Invalid input
    Error(String),
}

impl TokenKind {
    /// Short human-readable description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Word(w) => format!("'{w}'"),
            Self::Keyword(kw) => kw.as_str().to_string(),
            Self::Param(name) => format!(":{name}"),
            Self::Eq => "'='".to_string(),
            Self::NotEq => "'!='".to_string(),
            Self::Lt => "'<'".to_string(),
            Self::LtEq => "'<='".to_string(),
            Self::Gt => "'>'".to_string(),
            Self::GtEq => "'>='".to_string(),
            Self::LeftParen => "'('".to_string(),
            Self::RightParen => "')'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Eof => "end of input".to_string(),
            Self::Error(msg) => msg.clone(),
        }
    }
}

/// A token with its span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}
