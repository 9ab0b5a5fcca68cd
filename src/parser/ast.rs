use std::ops::Deref;

use crate::lexer::token::Token;
use crate::type_checker::r#type::Type;

pub use super::expr::*;

/// A value paired with the token it came from, for error positions.
#[derive(Debug, Clone)]
pub struct WithToken<T>(pub T, pub Token);

impl<T> Deref for WithToken<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// One translation unit: the ordered top-level declarations.
#[derive(Debug)]
pub struct Program(pub Vec<Decl>);

#[derive(Debug)]
pub enum Decl {
    Function(FunctionDecl),
    Var(VarDecl),
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub name: WithToken<String>,
    pub ret_type: Type,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug)]
pub struct Param {
    pub name: WithToken<String>,
    pub ty: Type,
}

#[derive(Debug)]
pub struct VarDecl {
    pub name: WithToken<String>,
    pub ty: Type,
    pub init: Option<Expr>,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub keyword: Token,
    pub value: Option<Expr>,
}

#[derive(Debug)]
pub enum Stmt {
    Return(ReturnStmt),
    Expression(Expr),
    // Declarations are statements too; nested functions included.
    Decl(Decl),
}
