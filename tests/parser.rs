use std::collections::HashSet;

use luca::ast::{Expr, ExprKind, Stmt};
use luca::ast_printer::AstPrinter;
use luca::parser::{parse, Parser};
use luca::scanner::scan;
use luca::LucaError;

fn parse_source(source: &str) -> (Vec<Stmt>, Vec<LucaError>) {
    let (tokens, lex_errors) = scan(source);
    assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);

    parse(&tokens)
}

fn printed(source: &str) -> Vec<String> {
    let (program, errors) = parse_source(source);
    assert!(errors.is_empty(), "parse errors: {:?}", errors);

    program.iter().map(AstPrinter::print_stmt).collect()
}

fn error_lines(source: &str) -> Vec<String> {
    let (_, errors) = parse_source(source);

    errors.iter().map(|e| e.to_string()).collect()
}

#[test]
fn parses_operator_precedence() {
    assert_eq!(
        printed("print -1 + 2 * 3 - 4 / 2 == 3 and !false or nil;"),
        ["(print (or (and (== (- (+ (- 1.0) (* 2.0 3.0)) (/ 4.0 2.0)) 3.0) (! false)) nil))"]
    );
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(printed("a = b = 1;"), ["(; (= a (= b 1.0)))"]);
}

#[test]
fn calls_and_property_access_chain() {
    assert_eq!(
        printed("f(1)(2).x.y(3);"),
        ["(; (call (. (. (call (call f 1.0) 2.0) x) y) 3.0))"]
    );
}

#[test]
fn parses_declarations() {
    assert_eq!(
        printed("var a; var b = \"s\"; func add(x, y) { return x + y; } class C { m() { return this; } }"),
        [
            "(var a)",
            "(var b s)",
            "(func add (x y) (return (+ x y)))",
            "(class C (func m () (return this)))",
        ]
    );
}

#[test]
fn for_without_clauses_loops_on_true() {
    assert_eq!(printed("for (;;) print 1;"), ["(while true (print 1.0))"]);
}

#[test]
fn if_else_binds_to_nearest_if() {
    assert_eq!(
        printed("if (a) if (b) print 1; else print 2;"),
        ["(if a (if b (print 1.0) (print 2.0)))"]
    );
}

#[test]
fn invalid_assignment_target() {
    assert_eq!(
        error_lines("1 + 2 = 3;"),
        ["[line 1] Error at '=': Invalid assignment target."]
    );
}

#[test]
fn reports_independent_errors_on_different_lines() {
    let errors = error_lines("var = 1;\nprint 2;\nprint (3;\nprint 4;");

    assert_eq!(
        errors,
        [
            "[line 1] Error at '=': Expect variable name.",
            "[line 3] Error at ';': Expect ')' after expression.",
        ]
    );
}

#[test]
fn recovery_keeps_good_statements() {
    let (program, errors) = parse_source("print ;\nvar ok = 1;\nprint ok;");

    assert_eq!(errors.len(), 1);
    assert_eq!(program.len(), 2);
}

#[test]
fn missing_semicolon_at_end() {
    assert_eq!(
        error_lines("print 1"),
        ["[line 1] Error at end: Expect ';' after value."]
    );
}

#[test]
fn too_many_arguments_is_reported_but_not_fatal() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});\nprint 1;", args.join(", "));
    let (program, errors) = parse_source(&source);

    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .to_string()
        .ends_with("Can't have more than 255 arguments."));
    assert_eq!(program.len(), 2);
}

#[test]
fn too_many_parameters_is_reported() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let source = format!("func f({}) {{}}", params.join(", "));

    let errors = error_lines(&source);

    assert_eq!(errors.len(), 1);
    assert!(errors[0].ends_with("Can't have more than 255 parameters."));
}

fn collect_ids(expr: &Expr, ids: &mut Vec<usize>) {
    ids.push(expr.id.0);

    match &expr.kind {
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            collect_ids(left, ids);
            collect_ids(right, ids);
        }
        ExprKind::Unary { right, .. } => collect_ids(right, ids),
        ExprKind::Grouping(inner) => collect_ids(inner, ids),
        ExprKind::Assign { value, .. } => collect_ids(value, ids),
        _ => {}
    }
}

#[test]
fn expression_ids_are_unique() {
    let (program, _) = parse_source("print a + a; print a;");
    let mut ids = Vec::new();

    for stmt in &program {
        if let Stmt::Print(expr) = stmt {
            collect_ids(expr, &mut ids);
        }
    }

    let unique: HashSet<usize> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 4);
    assert_eq!(unique.len(), 4);
}

#[test]
fn first_id_offsets_numbering() {
    let (tokens, _) = scan("print a;");
    let mut parser = Parser::with_first_id(&tokens, 100);
    let (program, _) = parser.parse();

    let Stmt::Print(expr) = &program[0] else {
        panic!("expected print statement");
    };

    assert_eq!(expr.id.0, 100);
    assert_eq!(parser.next_id(), 101);
}
