use super::*;
use crate::lexer::token::TokenType;
use crate::lexer::Lexer;
use crate::parser::Parser;

fn check(input: &str) -> TypeCheckerResult<()> {
    let tokens = Lexer::new(input).tokenize().unwrap();
    let program = Parser::new(tokens).program().unwrap();
    TypeChecker::new().check_program(&program)
}

fn check_err(input: &str) -> TypeCheckerErrorKind {
    check(input).unwrap_err().kind
}

// Helpers for trees the grammar cannot produce (float/bool/char/string only
// exist as inferred types, so their rules are exercised on hand-built ASTs).

fn tok(lexeme: &str) -> Token {
    Token {
        tok_type: TokenType::Identifier,
        lexeme: lexeme.to_string(),
        line: 1,
        column: 1,
    }
}

fn name(s: &str) -> WithToken<String> {
    WithToken(s.to_string(), tok(s))
}

fn lit(value: Literal) -> Expr {
    Expr::Literal(WithToken(value, tok("")))
}

fn var(s: &str) -> Expr {
    Expr::Var(name(s))
}

fn assign(target: Expr, value: Expr) -> Expr {
    Expr::Assign(Assign {
        eq_sign: tok("="),
        target: Box::new(target),
        value: Box::new(value),
    })
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(Binary {
        op: WithToken(op, tok("")),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

#[test]
fn test_end_to_end() {
    check("int main() { int x = 5; x = x + 2; return x; }").unwrap();
}

#[test]
fn test_empty_program_is_valid() {
    check("").unwrap();
}

#[test]
fn test_redeclaration_in_same_scope() {
    let kind = check_err("int f() { int x = 1; int x = 2; return x; }");
    assert!(matches!(kind, TypeCheckerErrorKind::Redeclaration { name, .. } if name == "x"));
}

#[test]
fn test_param_redeclared_as_local() {
    let kind = check_err("int f(int a) { int a = 1; return a; }");
    assert!(matches!(kind, TypeCheckerErrorKind::Redeclaration { name, .. } if name == "a"));
}

#[test]
fn test_duplicate_param_names() {
    let kind = check_err("int f(int a, int a) { return a; }");
    assert!(matches!(kind, TypeCheckerErrorKind::Redeclaration { .. }));
}

#[test]
fn test_undeclared_name() {
    let err = check("int f() { return y; }").unwrap_err();
    assert!(matches!(err.kind, TypeCheckerErrorKind::Undeclared(name) if name == "y"));
    assert_eq!(err.token.column, 18);
}

#[test]
fn test_use_before_declaration() {
    // Top-level order matters; the later global is not visible earlier.
    let kind = check_err("int f() { return g; } int g = 1;");
    assert!(matches!(kind, TypeCheckerErrorKind::Undeclared(_)));

    check("int g = 1; int f() { return g; }").unwrap();
}

#[test]
fn test_outer_binding_resolves_in_nested_scope() {
    check("int f() { int x = 1; int g() { return x; } return x; }").unwrap();
}

#[test]
fn test_shadowing_across_scopes() {
    check("int x = 1; int f() { int x = 2; return x; }").unwrap();
}

#[test]
fn test_function_redeclared() {
    let kind = check_err("int f() { return 1; } int f() { return 2; }");
    assert!(matches!(kind, TypeCheckerErrorKind::FunctionRedeclared { name, .. } if name == "f"));
}

#[test]
fn test_return_consistency() {
    check("int f() { return 5; }").unwrap();
    check("void f() { return; }").unwrap();

    let kind = check_err("void f() { return 5; }");
    assert!(matches!(
        kind,
        TypeCheckerErrorKind::ReturnMismatch {
            expected: Type::Void,
            got: Type::Int,
        }
    ));

    let kind = check_err("int f() { return; }");
    assert!(matches!(
        kind,
        TypeCheckerErrorKind::MissingReturnValue { expected: Type::Int }
    ));
}

#[test]
fn test_arithmetic_types() {
    check("int f() { return 1 + 2 * 3 - (4 / 2); }").unwrap();

    let mut checker = TypeChecker::new();
    let ty = checker
        .check_expr(&binary(
            BinaryOp::Plus,
            lit(Literal::Integer(1)),
            lit(Literal::Float(2.0)),
        ))
        .unwrap();
    assert_eq!(ty, Type::Float);

    let ty = checker
        .check_expr(&binary(
            BinaryOp::Mul,
            lit(Literal::Integer(2)),
            lit(Literal::Integer(3)),
        ))
        .unwrap();
    assert_eq!(ty, Type::Int);

    let kind = checker
        .check_expr(&binary(
            BinaryOp::Plus,
            lit(Literal::Integer(1)),
            lit(Literal::Str("abc".to_string())),
        ))
        .unwrap_err()
        .kind;
    assert!(matches!(
        kind,
        TypeCheckerErrorKind::InvalidOperands {
            op: BinaryOp::Plus,
            ..
        }
    ));
}

#[test]
fn test_comparison_yields_bool() {
    let mut checker = TypeChecker::new();
    let ty = checker
        .check_expr(&binary(
            BinaryOp::Lesser,
            lit(Literal::Integer(1)),
            lit(Literal::Integer(2)),
        ))
        .unwrap();
    assert_eq!(ty, Type::Bool);

    // Operand types must be identical, even int vs float.
    let kind = checker
        .check_expr(&binary(
            BinaryOp::Eq,
            lit(Literal::Integer(1)),
            lit(Literal::Float(1.0)),
        ))
        .unwrap_err()
        .kind;
    assert!(matches!(kind, TypeCheckerErrorKind::CompareMismatch { .. }));
}

#[test]
fn test_logical_requires_bool() {
    let mut checker = TypeChecker::new();
    let comparison = binary(
        BinaryOp::Lesser,
        lit(Literal::Integer(1)),
        lit(Literal::Integer(2)),
    );
    let ty = checker
        .check_expr(&binary(BinaryOp::And, comparison.clone(), comparison))
        .unwrap();
    assert_eq!(ty, Type::Bool);

    let kind = checker
        .check_expr(&binary(
            BinaryOp::Or,
            lit(Literal::Integer(1)),
            lit(Literal::Integer(2)),
        ))
        .unwrap_err()
        .kind;
    assert!(matches!(kind, TypeCheckerErrorKind::LogicalOperands { .. }));
}

#[test]
fn test_mod_has_no_typing_rule() {
    let kind = check_err("int f() { return 5 % 2; }");
    assert!(matches!(
        kind,
        TypeCheckerErrorKind::UnknownOperator(BinaryOp::Mod)
    ));
}

#[test]
fn test_unary_has_no_typing_rule() {
    let kind = check_err("int f() { return -5; }");
    assert!(matches!(kind, TypeCheckerErrorKind::UnknownNode(_)));
}

#[test]
fn test_literal_inference() {
    let mut checker = TypeChecker::new();
    let cases = [
        (Literal::Bool(true), Type::Bool),
        (Literal::Integer(5), Type::Int),
        (Literal::Float(1.5), Type::Float),
        (Literal::Str("a".to_string()), Type::Char),
        (Literal::Str("ab".to_string()), Type::String),
        (Literal::Str(String::new()), Type::String),
    ];
    for (literal, expected) in cases {
        assert_eq!(checker.check_expr(&lit(literal)).unwrap(), expected);
    }
}

#[test]
fn test_assignment_promotion() {
    // int and float are mutually assignable; the result is the target's
    // declared type.
    let mut checker = TypeChecker::new();
    checker.symbols.declare(&name("x"), Type::Int).unwrap();
    checker.symbols.declare(&name("y"), Type::Float).unwrap();

    let ty = checker
        .check_expr(&assign(var("x"), var("y")))
        .unwrap();
    assert_eq!(ty, Type::Int);

    let ty = checker
        .check_expr(&assign(var("y"), var("x")))
        .unwrap();
    assert_eq!(ty, Type::Float);

    // Anything else must match exactly.
    let kind = checker
        .check_expr(&assign(var("x"), lit(Literal::Str("s".to_string()))))
        .unwrap_err()
        .kind;
    assert!(matches!(
        kind,
        TypeCheckerErrorKind::AssignMismatch {
            expected: Type::Int,
            got: Type::Char,
            ..
        }
    ));
}

#[test]
fn test_no_promotion_on_declaration() {
    // The int/float leniency applies to assignment only.
    let mut checker = TypeChecker::new();
    let var_decl = VarDecl {
        name: name("x"),
        ty: Type::Float,
        init: Some(lit(Literal::Integer(1))),
    };
    let kind = checker.check_var_decl(&var_decl).unwrap_err().kind;
    assert!(matches!(
        kind,
        TypeCheckerErrorKind::DeclInitMismatch {
            declared: Type::Float,
            got: Type::Int,
            ..
        }
    ));
}

#[test]
fn test_invalid_assignment_target() {
    let kind = check_err("int f() { int x = 1; (x + 1) = 2; return x; }");
    assert!(matches!(kind, TypeCheckerErrorKind::InvalidAssignTarget));
}

#[test]
fn test_assignment_chain() {
    check("int f() { int x = 1; int y = 2; x = y = 3; return x; }").unwrap();
}

#[test]
fn test_scope_discarded_between_functions() {
    // f's local is gone once its scope is popped.
    let kind = check_err("int f() { int x = 1; return x; } int g() { return x; }");
    assert!(matches!(kind, TypeCheckerErrorKind::Undeclared(name) if name == "x"));
}
