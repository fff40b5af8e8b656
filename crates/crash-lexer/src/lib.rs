//! Lexical analysis for CRASH
//!
//! The line grammar only cares about three metacharacters (`=`, `&`, `;`) and
//! runs of blanks. Everything else is opaque text handed to expansion.

use logos::Logos;
use std::ops::Range;

/// Line tokens
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Token {
    /// Assignment separator
    #[token("=")]
    Equals,

    /// Background marker
    #[token("&")]
    Ampersand,

    /// Command separator
    #[token(";")]
    Semicolon,

    /// One or more spaces. Only the space character is a blank here;
    /// tabs stay part of the surrounding text.
    #[regex(" +")]
    Blank,

    /// Any run of characters that is not a metacharacter or a space
    #[regex(r"[^=&; ]+")]
    Text,

    /// End of input
    Eof,

    /// Lexer error
    Error,
}

/// Token with location information
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Range<usize>,
    pub text: String,
}

/// Lexer that produces tokens with spans
pub struct Lexer<'input> {
    lexer: logos::Lexer<'input, Token>,
    input: &'input str,
}

impl<'input> Lexer<'input> {
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self {
            lexer: Token::lexer(input),
            input,
        }
    }

    /// Get the next token with span information
    pub fn next_token(&mut self) -> SpannedToken {
        match self.lexer.next() {
            Some(Ok(token)) => {
                let span = self.lexer.span();
                SpannedToken {
                    token,
                    text: self.input[span.clone()].to_string(),
                    span,
                }
            }
            Some(Err(())) => {
                let span = self.lexer.span();
                SpannedToken {
                    token: Token::Error,
                    text: self.input[span.clone()].to_string(),
                    span,
                }
            }
            None => SpannedToken {
                token: Token::Eof,
                span: self.input.len()..self.input.len(),
                text: String::new(),
            },
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.token == Token::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Which metacharacters a line contains.
///
/// The dispatcher looks for these anywhere in the line, not only in
/// syntactically meaningful positions: `a=b c` is an assignment and
/// `echo a&b` is a background command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineShape {
    pub assignment: bool,
    pub background: bool,
    pub chained: bool,
}

impl LineShape {
    #[must_use]
    pub fn scan(line: &str) -> Self {
        let mut shape = Self::default();
        let mut lexer = Lexer::new(line);
        for spanned in lexer.tokenize() {
            match spanned.token {
                Token::Equals => shape.assignment = true,
                Token::Ampersand => shape.background = true,
                Token::Semicolon => shape.chained = true,
                Token::Blank | Token::Text | Token::Error => {}
                Token::Eof => break,
            }
        }
        shape
    }
}
