use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Keywords
    KElse,
    KFor,
    KIf,
    KInclude,
    KInt,
    KReturn,
    KVoid,
    KWhile,

    // Identifiers and literals
    Identifier,
    Number,
    StringLit,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    EqEqual,
    BangEq,
    Lesser,
    LesserEq,
    Greater,
    GreaterEq,
    LShift,
    RShift,
    And,
    Or,
    BitwiseAND,
    BitwiseOR,
    BitwiseXOR,
    Tilde,
    Bang,
    Increment,
    Decrement,
    QMark,
    Arrow,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Scope,
    Colon,
    Hash,
    Dot,

    Error,
    EOF,
}

/// A classified lexical unit. `line`/`column` are 1-based and point at the
/// first character of `lexeme` in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok_type: TokenType,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tok_type {
            TokenType::EOF => write!(f, "<eof>"),
            _ => write!(f, "`{}`", self.lexeme),
        }
    }
}
