pub mod symbol_table;
pub mod r#type;

#[cfg(test)]
mod test;

use std::collections::HashMap;

use thiserror::Error;

use crate::lexer::token::Token;
use crate::parser::ast::*;

use r#type::Type;
use symbol_table::SymbolTable;

#[derive(Debug, Error)]
#[error("type error at {}:{}: {kind}", .token.line, .token.column)]
pub struct TypeCheckerError {
    pub token: Token,
    #[source]
    pub kind: TypeCheckerErrorKind,
}

#[derive(Debug, Error)]
pub enum TypeCheckerErrorKind {
    #[error("`{name}` is already declared in this scope (previous declaration at {}:{})", .prev.line, .prev.column)]
    Redeclaration { name: String, prev: Token },

    #[error("undeclared name `{0}`")]
    Undeclared(String),

    #[error("variable `{name}` declared as `{declared}` but initialized with `{got}`")]
    DeclInitMismatch {
        name: String,
        declared: Type,
        got: Type,
    },

    #[error("cannot assign `{got}` to `{name}` of type `{expected}`")]
    AssignMismatch {
        name: String,
        expected: Type,
        got: Type,
    },

    #[error("assignment target is not an assignable name")]
    InvalidAssignTarget,

    #[error("invalid operand types for `{op}`: `{lhs}`, `{rhs}`")]
    InvalidOperands { op: BinaryOp, lhs: Type, rhs: Type },

    #[error("cannot compare `{lhs}` with `{rhs}`")]
    CompareMismatch { lhs: Type, rhs: Type },

    #[error("logical operators require bool operands, got `{lhs}` and `{rhs}`")]
    LogicalOperands { lhs: Type, rhs: Type },

    #[error("unknown operator `{0}`")]
    UnknownOperator(BinaryOp),

    #[error("function `{name}` is already declared (previous declaration at {}:{})", .prev.line, .prev.column)]
    FunctionRedeclared { name: String, prev: Token },

    #[error("return statement outside of function")]
    ReturnOutsideFunction,

    #[error("return type mismatch: expected `{expected}`, got `{got}`")]
    ReturnMismatch { expected: Type, got: Type },

    #[error("non-void function must return a value (declared `{expected}`)")]
    MissingReturnValue { expected: Type },

    #[error("unknown node kind in type check: {0}")]
    UnknownNode(&'static str),
}

pub type TypeCheckerResult<T> = Result<T, TypeCheckerError>;

#[derive(Debug)]
struct FunctionEntry {
    ret_type: Type,
    token: Token,
}

/// One check pass over a translation unit. The symbol table lives exactly as
/// long as the pass; nothing persists across calls to `check_program`.
pub struct TypeChecker {
    symbols: SymbolTable,
    functions: HashMap<String, FunctionEntry>,
    current_function: Option<Type>,
}

fn err(token: Token, kind: TypeCheckerErrorKind) -> TypeCheckerError {
    TypeCheckerError { token, kind }
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            functions: HashMap::new(),
            current_function: None,
        }
    }

    /// Checks every top-level declaration in order. Declaration-before-use
    /// falls out of the ordering; an empty program is valid.
    pub fn check_program(&mut self, program: &Program) -> TypeCheckerResult<()> {
        for decl in &program.0 {
            self.check_decl(decl)?;
        }
        Ok(())
    }

    fn check_decl(&mut self, decl: &Decl) -> TypeCheckerResult<()> {
        match decl {
            Decl::Function(func) => self.check_function(func),
            Decl::Var(var) => self.check_var_decl(var),
        }
    }

    fn check_function(&mut self, func: &FunctionDecl) -> TypeCheckerResult<()> {
        if let Some(prev) = self.functions.get(&func.name.0) {
            return Err(err(
                func.name.1.clone(),
                TypeCheckerErrorKind::FunctionRedeclared {
                    name: func.name.0.clone(),
                    prev: prev.token.clone(),
                },
            ));
        }
        self.functions.insert(
            func.name.0.clone(),
            FunctionEntry {
                ret_type: func.ret_type,
                token: func.name.1.clone(),
            },
        );

        // Scope and return-type context are restored on every exit path,
        // including the error one.
        self.symbols.enter_scope();
        let enclosing = self.current_function.replace(func.ret_type);
        let result = self.check_function_body(func);
        self.current_function = enclosing;
        self.symbols.exit_scope();
        result
    }

    fn check_function_body(&mut self, func: &FunctionDecl) -> TypeCheckerResult<()> {
        // Parameters share the body's scope: a local reusing a parameter
        // name is a redeclaration.
        for param in &func.params {
            self.symbols.declare(&param.name, param.ty)?;
        }
        for stmt in &func.body {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_var_decl(&mut self, var: &VarDecl) -> TypeCheckerResult<()> {
        if let Some(init) = &var.init {
            let got = self.check_expr(init)?;
            // No promotion on declaration, unlike assignment.
            if got != var.ty {
                return Err(err(
                    var.name.1.clone(),
                    TypeCheckerErrorKind::DeclInitMismatch {
                        name: var.name.0.clone(),
                        declared: var.ty,
                        got,
                    },
                ));
            }
        }
        self.symbols.declare(&var.name, var.ty)
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> TypeCheckerResult<()> {
        match stmt {
            Stmt::Return(ret) => self.check_return(ret),
            Stmt::Expression(expr) => {
                self.check_expr(expr)?;
                Ok(())
            }
            Stmt::Decl(decl) => self.check_decl(decl),
        }
    }

    fn check_return(&mut self, ret: &ReturnStmt) -> TypeCheckerResult<()> {
        let Some(expected) = self.current_function else {
            return Err(err(
                ret.keyword.clone(),
                TypeCheckerErrorKind::ReturnOutsideFunction,
            ));
        };

        match &ret.value {
            Some(value) => {
                let got = self.check_expr(value)?;
                // Exact match: no int/float promotion on return values.
                if got != expected {
                    return Err(err(
                        ret.keyword.clone(),
                        TypeCheckerErrorKind::ReturnMismatch { expected, got },
                    ));
                }
                Ok(())
            }
            None if expected != Type::Void => Err(err(
                ret.keyword.clone(),
                TypeCheckerErrorKind::MissingReturnValue { expected },
            )),
            None => Ok(()),
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> TypeCheckerResult<Type> {
        match expr {
            Expr::Assign(assign) => self.check_assign(assign),
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::Unary(unary) => Err(err(
                unary.op.1.clone(),
                TypeCheckerErrorKind::UnknownNode("unary expression"),
            )),
            Expr::Literal(literal) => Ok(literal_type(literal)),
            Expr::Var(name) => self.lookup_var(name),
        }
    }

    fn lookup_var(&self, name: &WithToken<String>) -> TypeCheckerResult<Type> {
        match self.symbols.lookup(&name.0) {
            Some(entry) => Ok(entry.ty),
            None => Err(err(
                name.1.clone(),
                TypeCheckerErrorKind::Undeclared(name.0.clone()),
            )),
        }
    }

    fn check_assign(&mut self, assign: &Assign) -> TypeCheckerResult<Type> {
        let Expr::Var(name) = &*assign.target else {
            return Err(err(
                assign.eq_sign.clone(),
                TypeCheckerErrorKind::InvalidAssignTarget,
            ));
        };

        let target_ty = self.lookup_var(name)?;
        let value_ty = self.check_expr(&assign.value)?;

        // int and float are mutually assignable; the assignment takes the
        // target's declared type.
        match (target_ty, value_ty) {
            (Type::Int, Type::Float) | (Type::Float, Type::Int) => Ok(target_ty),
            _ if target_ty == value_ty => Ok(target_ty),
            _ => Err(err(
                name.1.clone(),
                TypeCheckerErrorKind::AssignMismatch {
                    name: name.0.clone(),
                    expected: target_ty,
                    got: value_ty,
                },
            )),
        }
    }

    fn check_binary(&mut self, binary: &Binary) -> TypeCheckerResult<Type> {
        let lhs = self.check_expr(&binary.lhs)?;
        let rhs = self.check_expr(&binary.rhs)?;
        let op = binary.op.0;

        match op {
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Mul | BinaryOp::Div => {
                if !lhs.is_numeric() || !rhs.is_numeric() {
                    return Err(err(
                        binary.op.1.clone(),
                        TypeCheckerErrorKind::InvalidOperands { op, lhs, rhs },
                    ));
                }
                if lhs == Type::Float || rhs == Type::Float {
                    Ok(Type::Float)
                } else {
                    Ok(Type::Int)
                }
            }

            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lesser
            | BinaryOp::LesserEq
            | BinaryOp::Greater
            | BinaryOp::GreaterEq => {
                if lhs != rhs {
                    return Err(err(
                        binary.op.1.clone(),
                        TypeCheckerErrorKind::CompareMismatch { lhs, rhs },
                    ));
                }
                Ok(Type::Bool)
            }

            BinaryOp::And | BinaryOp::Or => {
                if lhs != Type::Bool || rhs != Type::Bool {
                    return Err(err(
                        binary.op.1.clone(),
                        TypeCheckerErrorKind::LogicalOperands { lhs, rhs },
                    ));
                }
                Ok(Type::Bool)
            }

            // `%` parses at multiplicative precedence but has no typing
            // rule; it fails here rather than being quietly treated as
            // arithmetic.
            BinaryOp::Mod => Err(err(
                binary.op.1.clone(),
                TypeCheckerErrorKind::UnknownOperator(op),
            )),
        }
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Literal types are inferred structurally; a one-character string is a
/// char, anything longer is a string.
fn literal_type(literal: &WithToken<Literal>) -> Type {
    match &literal.0 {
        Literal::Bool(_) => Type::Bool,
        Literal::Integer(_) => Type::Int,
        Literal::Float(_) => Type::Float,
        Literal::Str(s) => {
            if s.chars().count() == 1 {
                Type::Char
            } else {
                Type::String
            }
        }
    }
}
