//! Condition lexer.
//!
//! A hand-written lexer for the small condition grammar (`age > :age`,
//! `status IN :statuses`, ...) and for combinator expressions (`1 AND (2 OR 3)`).

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
