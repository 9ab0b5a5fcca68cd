pub mod lexer;
pub mod parser;
pub mod type_checker;

use lexer::Lexer;
use parser::{ast::Program, Parser};
use type_checker::TypeChecker;

/// Runs the full front end over one translation unit: lex, parse, type
/// check. On success the validated AST is returned for a backend to
/// consume; the first error from any stage aborts the pipeline.
pub fn analyze(input: &str) -> anyhow::Result<Program> {
    let tokens = Lexer::new(input).tokenize()?;

    let mut parser = Parser::new(tokens);
    let program = parser.program()?;

    TypeChecker::new().check_program(&program)?;

    Ok(program)
}
