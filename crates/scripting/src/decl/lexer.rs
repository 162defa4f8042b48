//! Declaration lexer

use crate::error::{RegistrationError, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Declaration token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Identifier(String),
    /// Number or string literal, only seen in default values
    Literal(String),

    Less,        // <
    Greater,     // >
    At,          // @
    Amp,         // &
    LParen,      // (
    RParen,      // )
    Comma,       // ,
    Assign,      // =
    Question,    // ?
    DoubleColon, // ::
    Minus,       // -
    Dot,         // .

    EOF,
}

/// Declaration lexer
pub struct Lexer<'a> {
    source: &'a str,
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.chars().peekable(),
        }
    }

    /// Tokenize the whole declaration, ending with `Token::EOF`
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::EOF;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        while self.input.next_if(|c| c.is_whitespace()).is_some() {}

        let Some(ch) = self.input.next() else {
            return Ok(Token::EOF);
        };

        let token = match ch {
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut ident = String::from(ch);
                while let Some(c) = self.input.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
                    ident.push(c);
                }
                Token::Identifier(ident)
            }
            '0'..='9' => {
                let mut number = String::from(ch);
                while let Some(c) = self.input.next_if(|c| c.is_ascii_alphanumeric() || *c == '.') {
                    number.push(c);
                }
                Token::Literal(number)
            }
            '"' => {
                let mut literal = String::new();
                loop {
                    match self.input.next() {
                        Some('"') => break,
                        Some('\\') => {
                            if let Some(escaped) = self.input.next() {
                                literal.push(escaped);
                            }
                        }
                        Some(c) => literal.push(c),
                        None => return Err(self.error("unterminated string literal")),
                    }
                }
                Token::Literal(literal)
            }
            ':' => {
                if self.input.next_if_eq(&':').is_none() {
                    return Err(self.error("expected '::'"));
                }
                Token::DoubleColon
            }
            '<' => Token::Less,
            '>' => Token::Greater,
            '@' => Token::At,
            '&' => Token::Amp,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '=' => Token::Assign,
            '?' => Token::Question,
            '-' => Token::Minus,
            '.' => Token::Dot,
            other => return Err(self.error(format!("unexpected character '{}'", other))),
        };

        Ok(token)
    }

    fn error(&self, message: impl Into<String>) -> RegistrationError {
        RegistrationError::malformed(self.source, message)
    }
}
