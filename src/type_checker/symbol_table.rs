use std::collections::HashMap;

use crate::lexer::token::Token;
use crate::parser::ast::WithToken;

use super::r#type::Type;
use super::{TypeCheckerError, TypeCheckerErrorKind};

#[derive(Debug)]
pub struct SymbolTableEntry {
    pub ty: Type,
    pub token: Token,
}

pub type Scope = HashMap<String, SymbolTableEntry>;

/// Stack of lexical scopes. The outermost (global) scope exists for the
/// lifetime of the table; function and block scopes are pushed and popped
/// around the region they cover.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declares `name` in the current scope. Shadowing an outer scope is
    /// fine; redeclaring within the same scope is not.
    pub fn declare(&mut self, name: &WithToken<String>, ty: Type) -> Result<(), TypeCheckerError> {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");

        if let Some(prev) = scope.get(&name.0) {
            return Err(TypeCheckerError {
                token: name.1.clone(),
                kind: TypeCheckerErrorKind::Redeclaration {
                    name: name.0.clone(),
                    prev: prev.token.clone(),
                },
            });
        }

        scope.insert(
            name.0.clone(),
            SymbolTableEntry {
                ty,
                token: name.1.clone(),
            },
        );
        Ok(())
    }

    /// Innermost-to-outermost lookup.
    pub fn lookup(&self, name: &str) -> Option<&SymbolTableEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}
