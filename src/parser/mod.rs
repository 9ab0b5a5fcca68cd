pub mod ast;
pub mod expr;


use crate::lexer::token::{Token, TokenType};
use crate::type_checker::r#type::Type;
use ast::*;
use multipeek::{multipeek, MultiPeek};
use thiserror::Error;

// <translation-unit> ::= <declaration>* <eof>
// <declaration>      ::= ("int" | "void") <identifier> ( <function-rest> | <var-rest> )
// <function-rest>    ::= "(" <param-list>? ")" <block>
// <param-list>       ::= <param> ( "," <param> )*
// <param>            ::= ("int" | "void") <identifier>
// <var-rest>         ::= ( "=" <expression> )? ";"
// <block>            ::= "{" <statement>* "}"
// <statement>        ::= "return" <expression>? ";"
//                      | <expression> ";"
//                      | <declaration>
// <expression>       ::= <assignment>
// <assignment>       ::= <equality> ( "=" <assignment> )?
// <equality>         ::= <relational> ( ("==" | "!=") <relational> )*
// <relational>       ::= <additive> ( ("<" | "<=" | ">" | ">=") <additive> )*
// <additive>         ::= <multiplicative> ( ("+" | "-") <multiplicative> )*
// <multiplicative>   ::= <unary> ( ("*" | "/" | "%") <unary> )*
// <unary>            ::= ("+" | "-" | "!") <unary> | <primary>
// <primary>          ::= <number> | <identifier> | "(" <expression> ")"

macro_rules! parse_binary_expr {
    ( $self: ident, $ops: pat, $nextp: ident ) => {{
        let mut lhs = $self.$nextp()?;
        while let Some($ops) = $self.peek_token_type() {
            let op_token = $self.advance().unwrap();
            let op = binary_tt_to_op(op_token.tok_type);
            let rhs = Box::new($self.$nextp()?);
            lhs = Expr::Binary(Binary {
                op: WithToken(op, op_token),
                lhs: Box::new(lhs),
                rhs,
            })
        }
        Ok(lhs)
    }};
}

#[derive(Error, Debug)]
#[error("parse error at {}:{}: {kind}", .token.line, .token.column)]
pub struct ParseError {
    pub token: Token,
    #[source]
    pub kind: ParseErrorKind,
}

#[derive(Error, Debug)]
pub enum ParseErrorKind {
    #[error("expected `{exp}`, got `{got}`")]
    Expected { exp: &'static str, got: String },

    #[error("number literal `{0}` does not fit in 64 bits")]
    NumberOutOfRange(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: MultiPeek<<Vec<Token> as IntoIterator>::IntoIter>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: multipeek(tokens),
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek()
    }

    fn peek_token_type(&mut self) -> Option<TokenType> {
        self.peek().map(|t| t.tok_type)
    }

    fn advance(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn match_(&mut self, tok_type: TokenType) -> bool {
        match self.peek() {
            Some(token) if token.tok_type == tok_type => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn consume(&mut self, tok_type: TokenType, exp: &'static str) -> ParseResult<Token> {
        self.consume_if(|tt| tt == tok_type, exp)
    }

    fn consume_if<F>(&mut self, pred: F, exp: &'static str) -> ParseResult<Token>
    where
        F: FnOnce(TokenType) -> bool,
    {
        match self.peek() {
            Some(Token {
                tok_type: TokenType::EOF,
                ..
            })
            | None => Err(self.error_at_current(ParseErrorKind::Expected {
                exp,
                got: String::from("<eof>"),
            })),
            Some(token) => {
                if pred(token.tok_type) {
                    Ok(self.advance().unwrap())
                } else {
                    let got = token.lexeme.clone();
                    Err(self.error_at_current(ParseErrorKind::Expected { exp, got }))
                }
            }
        }
    }

    fn consume_identifier(&mut self) -> ParseResult<WithToken<String>> {
        let token = self.consume(TokenType::Identifier, "<identifier>")?;
        let name = token.lexeme.clone();
        Ok(WithToken(name, token))
    }

    fn consume_type(&mut self, exp: &'static str) -> ParseResult<(Type, Token)> {
        let token = self.consume_if(
            |tt| matches!(tt, TokenType::KInt | TokenType::KVoid),
            exp,
        )?;
        let ty = match token.tok_type {
            TokenType::KInt => Type::Int,
            TokenType::KVoid => Type::Void,
            _ => unreachable!(),
        };
        Ok((ty, token))
    }

    fn error_at_current(&mut self, kind: ParseErrorKind) -> ParseError {
        let token = self.advance().unwrap_or(Token {
            tok_type: TokenType::EOF,
            lexeme: String::new(),
            line: 0,
            column: 0,
        });
        ParseError { token, kind }
    }

    fn check_declaration(&mut self) -> bool {
        matches!(
            self.peek_token_type(),
            Some(TokenType::KInt | TokenType::KVoid)
        )
    }
}

impl Parser {
    pub fn program(&mut self) -> ParseResult<Program> {
        let mut decls = Vec::new();
        while !self.match_(TokenType::EOF) {
            decls.push(self.declaration()?);
        }
        Ok(Program(decls))
    }

    fn declaration(&mut self) -> ParseResult<Decl> {
        let (ty, _) = self.consume_type("int or void")?;
        let name = self.consume_identifier()?;

        if self.match_(TokenType::LParen) {
            self.function_rest(name, ty).map(Decl::Function)
        } else {
            self.var_rest(name, ty).map(Decl::Var)
        }
    }

    fn function_rest(&mut self, name: WithToken<String>, ret_type: Type) -> ParseResult<FunctionDecl> {
        let mut params = Vec::new();
        if !matches!(self.peek_token_type(), Some(TokenType::RParen)) {
            loop {
                params.push(self.param()?);
                if !self.match_(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::RParen, ")")?;

        let body = self.block()?;

        Ok(FunctionDecl {
            name,
            ret_type,
            params,
            body,
        })
    }

    fn param(&mut self) -> ParseResult<Param> {
        let (ty, _) = self.consume_type("parameter type")?;
        let name = self.consume_identifier()?;
        Ok(Param { name, ty })
    }

    fn var_rest(&mut self, name: WithToken<String>, ty: Type) -> ParseResult<VarDecl> {
        let init = if self.match_(TokenType::Equal) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, ";")?;

        Ok(VarDecl { name, ty, init })
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.consume(TokenType::LBrace, "{")?;

        let mut body = Vec::new();
        loop {
            match self.peek_token_type() {
                Some(TokenType::RBrace) => break,
                Some(TokenType::EOF) | None => {
                    return Err(self.error_at_current(ParseErrorKind::Expected {
                        exp: "}",
                        got: String::from("<eof>"),
                    }));
                }
                _ => body.push(self.statement()?),
            };
        }

        self.consume(TokenType::RBrace, "}")?;
        Ok(body)
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek_token_type() {
            Some(TokenType::KReturn) => self.return_statement(),
            _ if self.check_declaration() => self.declaration().map(Stmt::Decl),
            _ => self.expression_statement(),
        }
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.consume(TokenType::KReturn, "return")?;

        let value = if matches!(self.peek_token_type(), Some(TokenType::Semicolon)) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Semicolon, ";")?;

        Ok(Stmt::Return(ReturnStmt { keyword, value }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, ";")?;
        Ok(Stmt::Expression(expr))
    }
}

impl Parser {
    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let lhs = self.equality()?;
        if let Some(TokenType::Equal) = self.peek_token_type() {
            let eq_sign = self.advance().unwrap();
            // Right-associative: `x = y = 3` nests as `x = (y = 3)`.
            let rhs = self.assignment()?;
            return Ok(Expr::Assign(Assign {
                eq_sign,
                target: Box::new(lhs),
                value: Box::new(rhs),
            }));
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        parse_binary_expr!(self, TokenType::EqEqual | TokenType::BangEq, relational)
    }

    fn relational(&mut self) -> ParseResult<Expr> {
        parse_binary_expr!(
            self,
            TokenType::Lesser | TokenType::LesserEq | TokenType::Greater | TokenType::GreaterEq,
            additive
        )
    }

    fn additive(&mut self) -> ParseResult<Expr> {
        parse_binary_expr!(self, TokenType::Plus | TokenType::Minus, multiplicative)
    }

    fn multiplicative(&mut self) -> ParseResult<Expr> {
        parse_binary_expr!(
            self,
            TokenType::Star | TokenType::Slash | TokenType::Percent,
            unary
        )
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        match self.peek_token_type() {
            Some(TokenType::Plus | TokenType::Minus | TokenType::Bang) => {
                let op_token = self.advance().unwrap();
                let op = unary_tt_to_op(op_token.tok_type);
                let expr = self.unary()?;
                Ok(Expr::Unary(Unary {
                    op: WithToken(op, op_token),
                    expr: Box::new(expr),
                }))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        match self.peek_token_type() {
            Some(TokenType::Number) => {
                let token = self.advance().unwrap();
                let value = match token.lexeme.parse::<i64>() {
                    Ok(value) => value,
                    Err(_) => {
                        let lexeme = token.lexeme.clone();
                        return Err(ParseError {
                            token,
                            kind: ParseErrorKind::NumberOutOfRange(lexeme),
                        });
                    }
                };
                Ok(Expr::Literal(WithToken(Literal::Integer(value), token)))
            }
            Some(TokenType::Identifier) => {
                let token = self.advance().unwrap();
                let name = token.lexeme.clone();
                Ok(Expr::Var(WithToken(name, token)))
            }
            Some(TokenType::LParen) => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenType::RParen, ")")?;
                Ok(expr)
            }
            Some(TokenType::EOF) | None => {
                Err(self.error_at_current(ParseErrorKind::Expected {
                    exp: "<expression>",
                    got: String::from("<eof>"),
                }))
            }
            Some(_) => {
                let got = self.peek().unwrap().lexeme.clone();
                Err(self.error_at_current(ParseErrorKind::Expected {
                    exp: "<expression>",
                    got,
                }))
            }
        }
    }
}

fn unary_tt_to_op(tt: TokenType) -> UnaryOp {
    match tt {
        TokenType::Plus => UnaryOp::Plus,
        TokenType::Minus => UnaryOp::Minus,
        TokenType::Bang => UnaryOp::Not,
        _ => unreachable!(),
    }
}

fn binary_tt_to_op(tt: TokenType) -> BinaryOp {
    match tt {
        TokenType::Plus => BinaryOp::Plus,
        TokenType::Minus => BinaryOp::Minus,
        TokenType::Star => BinaryOp::Mul,
        TokenType::Slash => BinaryOp::Div,
        TokenType::Percent => BinaryOp::Mod,
        TokenType::EqEqual => BinaryOp::Eq,
        TokenType::BangEq => BinaryOp::NotEq,
        TokenType::Greater => BinaryOp::Greater,
        TokenType::GreaterEq => BinaryOp::GreaterEq,
        TokenType::Lesser => BinaryOp::Lesser,
        TokenType::LesserEq => BinaryOp::LesserEq,
        TokenType::And => BinaryOp::And,
        TokenType::Or => BinaryOp::Or,
        _ => unreachable!(),
    }
}
