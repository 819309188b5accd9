//! Condition tokenizer.

use super::{Keyword, Span, Token, TokenKind};

/// Characters that terminate a word because they start another token.
const fn is_delimiter(c: char) -> bool {
    matches!(c, '=' | '!' | '<' | '>' | '(' | ')' | ',' | ':')
}

/// A lexer over a single condition expression.
///
/// Words are maximal runs of characters that are neither whitespace nor
/// delimiters. Nothing is validated here: a word such as `na;me` reaches the
/// parser intact so that identifier validation rejects it as a whole.
pub struct Lexer<'a> {
    /// The input text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    /// Consumes word characters and returns the consumed text.
    fn eat_word(&mut self) -> &'a str {
        let from = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && !is_delimiter(c))
        {
            self.advance();
        }
        &self.input[from..self.pos]
    }

    /// Scans a bare word or keyword.
    fn scan_word(&mut self) -> Token {
        let text = self.eat_word();
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Word(text.to_string())),
        }
    }

    /// Scans a `:name` parameter reference. The colon is already consumed.
    fn scan_param(&mut self) -> Token {
        let name = self.eat_word();
        if name.is_empty() {
            self.make_token(TokenKind::Error(String::from(
                "Expected parameter name after ':'",
            )))
        } else {
            self.make_token(TokenKind::Param(name.to_string()))
        }
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            ':' => self.scan_param(),
            '=' => self.make_token(TokenKind::Eq),
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                _ => self.make_token(TokenKind::Lt),
            },
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Error(String::from("Unexpected character: !")))
                }
            }
            _ => {
                self.pos = self.start;
                self.scan_word()
            }
        }
    }
}
