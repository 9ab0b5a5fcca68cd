pub mod token;


use lazy_static::lazy_static;
use std::collections::HashMap;
use std::str::Chars;
use thiserror::Error;
use token::{Token, TokenType};

macro_rules! hash_map {
    ( $( $key: expr => $value: expr ),* $(,)? ) => {{
        let mut m = HashMap::new();
        $(
            m.insert($key, $value);
        )*
        m
    }}
}

// Maximal munch: each arm consumes one more character iff it completes a
// longer operator, so `<<` wins over `<` and `->` over `-`.
macro_rules! multi_char_tok {
    ( $self: ident, $orig: expr; $( $c: literal => $tt: expr ),+ $(,)? ) => {
        match $self.peek() {
            $(
                Some($c) => {
                    $self.advance();
                    Ok($self.make_token($tt))
                }
            )+
            _ => Ok($self.make_token($orig))
        }
    };
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenType> = hash_map! {
        "else"    => TokenType::KElse,
        "for"     => TokenType::KFor,
        "if"      => TokenType::KIf,
        "include" => TokenType::KInclude,
        "int"     => TokenType::KInt,
        "return"  => TokenType::KReturn,
        "void"    => TokenType::KVoid,
        "while"   => TokenType::KWhile,
    };
}

/// Number of characters of surrounding source reported with an error.
const CONTEXT_WINDOW: usize = 10;

#[derive(Error, Debug)]
pub enum LexerErrorKind {
    #[error("unexpected character {c:?} (context: ...{context}...)")]
    UnexpectedChar { c: char, context: String },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedComment,
}

#[derive(Error, Debug)]
#[error("lex error at {}:{}: {kind}", .token.line, .token.column)]
pub struct LexerError {
    pub token: Token,
    #[source]
    pub kind: LexerErrorKind,
}

pub type LexerResult = Result<Token, LexerError>;

pub struct Lexer<'a> {
    input_str: &'a str,
    input: Chars<'a>,
    line: usize,
    column: usize,
    start: usize,
    start_line: usize,
    start_column: usize,
    current: usize,
    eof: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input_str: &'a str) -> Self {
        Self {
            input_str,
            input: input_str.chars(),
            line: 1,
            column: 1,
            start: 0,
            start_line: 1,
            start_column: 1,
            current: 0,
            eof: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.clone().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.input.clone();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.input.next()?;
        self.current += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn make_token(&self, tok_type: TokenType) -> Token {
        Token {
            tok_type,
            lexeme: self.input_str[self.start..self.current].to_string(),
            line: self.start_line,
            column: self.start_column,
        }
    }

    fn make_error(&self, kind: LexerErrorKind) -> LexerError {
        LexerError {
            token: self.make_token(TokenType::Error),
            kind,
        }
    }

    fn context_window(&self) -> String {
        let mut lo = self.start.saturating_sub(CONTEXT_WINDOW);
        while lo > 0 && !self.input_str.is_char_boundary(lo) {
            lo -= 1;
        }
        let mut hi = (self.start + CONTEXT_WINDOW).min(self.input_str.len());
        while hi < self.input_str.len() && !self.input_str.is_char_boundary(hi) {
            hi += 1;
        }
        self.input_str[lo..hi].to_string()
    }

    fn mark_start(&mut self) {
        self.start = self.current;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn skip_whitespace(&mut self) -> Result<(), LexerError> {
        loop {
            match self.peek() {
                Some(' ' | '\r' | '\t' | '\n') => {
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        self.advance();
                        self.advance();
                        while let Some(c) = self.advance() {
                            if c == '\n' {
                                break;
                            }
                        }
                    }
                    Some('*') => {
                        // Position errors at the opening `/*`.
                        self.mark_start();
                        self.advance();
                        self.advance();
                        loop {
                            match self.advance() {
                                None => {
                                    return Err(
                                        self.make_error(LexerErrorKind::UnterminatedComment)
                                    );
                                }
                                Some('*') if self.peek() == Some('/') => {
                                    self.advance();
                                    break;
                                }
                                Some(_) => {}
                            }
                        }
                    }
                    _ => break,
                },
                _ => break,
            };
        }
        Ok(())
    }

    fn number(&mut self) -> LexerResult {
        while let Some('0'..='9') = self.peek() {
            self.advance();
        }
        Ok(self.make_token(TokenType::Number))
    }

    fn string(&mut self) -> LexerResult {
        loop {
            match self.advance() {
                None => return Err(self.make_error(LexerErrorKind::UnterminatedString)),
                Some('"') => break,
                Some('\\') => {
                    if self.advance().is_none() {
                        return Err(self.make_error(LexerErrorKind::UnterminatedString));
                    }
                }
                Some(_) => {}
            };
        }
        Ok(self.make_token(TokenType::StringLit))
    }

    fn identifier(&mut self) -> LexerResult {
        loop {
            match self.peek() {
                Some(c) if c == '_' || c.is_ascii_alphanumeric() => self.advance(),
                _ => break,
            };
        }
        let lexeme = &self.input_str[self.start..self.current];

        // A lexeme that exactly matches a keyword is reclassified.
        if let Some(tok_type) = KEYWORDS.get(lexeme) {
            Ok(self.make_token(*tok_type))
        } else {
            Ok(self.make_token(TokenType::Identifier))
        }
    }

    fn hash(&mut self) -> LexerResult {
        // `#include` is a single token; any other `#` stands alone.
        if self.input.as_str().starts_with("include") {
            for _ in 0.."include".len() {
                self.advance();
            }
        }
        Ok(self.make_token(TokenType::Hash))
    }
}

impl<'a> Lexer<'a> {
    /// Lexes the whole input. The returned stream always ends with the EOF
    /// sentinel, positioned at the final line/column reached.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        while !self.eof {
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> LexerResult {
        self.skip_whitespace()?;

        self.mark_start();
        let Some(c) = self.advance() else {
            self.eof = true;
            return Ok(self.make_token(TokenType::EOF));
        };

        match c {
            '(' => Ok(self.make_token(TokenType::LParen)),
            ')' => Ok(self.make_token(TokenType::RParen)),
            '{' => Ok(self.make_token(TokenType::LBrace)),
            '}' => Ok(self.make_token(TokenType::RBrace)),
            '[' => Ok(self.make_token(TokenType::LBracket)),
            ']' => Ok(self.make_token(TokenType::RBracket)),
            ';' => Ok(self.make_token(TokenType::Semicolon)),
            ',' => Ok(self.make_token(TokenType::Comma)),
            '.' => Ok(self.make_token(TokenType::Dot)),
            '~' => Ok(self.make_token(TokenType::Tilde)),
            '?' => Ok(self.make_token(TokenType::QMark)),
            '*' => Ok(self.make_token(TokenType::Star)),
            '/' => Ok(self.make_token(TokenType::Slash)),
            '%' => Ok(self.make_token(TokenType::Percent)),
            '^' => Ok(self.make_token(TokenType::BitwiseXOR)),
            '#' => self.hash(),

            ':' => multi_char_tok!(self, TokenType::Colon; ':' => TokenType::Scope),
            '!' => multi_char_tok!(self, TokenType::Bang; '=' => TokenType::BangEq),
            '=' => multi_char_tok!(self, TokenType::Equal; '=' => TokenType::EqEqual),
            '&' => multi_char_tok!(self, TokenType::BitwiseAND; '&' => TokenType::And),
            '|' => multi_char_tok!(self, TokenType::BitwiseOR; '|' => TokenType::Or),
            '+' => multi_char_tok!(self, TokenType::Plus; '+' => TokenType::Increment),
            '-' => multi_char_tok!(self, TokenType::Minus;
                                         '-' => TokenType::Decrement,
                                         '>' => TokenType::Arrow),
            '<' => multi_char_tok!(self, TokenType::Lesser;
                                         '<' => TokenType::LShift,
                                         '=' => TokenType::LesserEq),
            '>' => multi_char_tok!(self, TokenType::Greater;
                                         '>' => TokenType::RShift,
                                         '=' => TokenType::GreaterEq),

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),
            c if c == '_' || c.is_ascii_alphabetic() => self.identifier(),
            c => Err(self.make_error(LexerErrorKind::UnexpectedChar {
                c,
                context: self.context_window(),
            })),
        }
    }
}
