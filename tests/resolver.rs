use luca::ast::{Expr, ExprKind, Stmt};
use luca::parser::parse;
use luca::resolver::{resolve, Distances};
use luca::scanner::scan;

fn resolve_source(source: &str) -> (Vec<Stmt>, Distances, Vec<String>) {
    let (tokens, lex_errors) = scan(source);
    assert!(lex_errors.is_empty());
    let (program, parse_errors) = parse(&tokens);
    assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

    let (distances, errors) = resolve(&program);
    let errors = errors.iter().map(|e| e.to_string()).collect();

    (program, distances, errors)
}

/// Distance recorded for every `print <variable>;` in source order
/// (descending into blocks and function bodies).
fn printed_distances(program: &[Stmt], distances: &Distances) -> Vec<Option<usize>> {
    fn walk(stmts: &[Stmt], distances: &Distances, out: &mut Vec<Option<usize>>) {
        for stmt in stmts {
            match stmt {
                Stmt::Print(Expr {
                    id,
                    kind: ExprKind::Variable(_),
                }) => out.push(distances.get(id).copied()),
                Stmt::Block(inner) => walk(inner, distances, out),
                Stmt::Function(decl) => walk(&decl.body, distances, out),
                _ => {}
            }
        }
    }

    let mut out = Vec::new();
    walk(program, distances, &mut out);
    out
}

#[test]
fn globals_get_no_distance() {
    let (program, distances, errors) = resolve_source("var a = 1; print a;");

    assert!(errors.is_empty());
    assert_eq!(printed_distances(&program, &distances), [None]);
}

#[test]
fn nested_block_distances() {
    let (program, distances, errors) =
        resolve_source("{ var a = 1; { var b = 2; print a; print b; { print a; } } }");

    assert!(errors.is_empty());
    assert_eq!(
        printed_distances(&program, &distances),
        [Some(1), Some(0), Some(2)]
    );
}

#[test]
fn shadowing_resolves_each_occurrence_independently() {
    let (program, distances, errors) =
        resolve_source("{ var a = 1; { print a; var a = 2; print a; } }");

    assert!(errors.is_empty());
    assert_eq!(printed_distances(&program, &distances), [Some(1), Some(0)]);
}

#[test]
fn function_parameters_share_scope_with_body() {
    let (program, distances, errors) =
        resolve_source("func f(x) { print x; var y = x; print y; { print x; } }");

    assert!(errors.is_empty());
    assert_eq!(
        printed_distances(&program, &distances),
        [Some(0), Some(0), Some(1)]
    );
}

#[test]
fn own_initializer_is_an_error() {
    let (_, _, errors) = resolve_source("{ var a = a; }");

    assert_eq!(
        errors,
        ["[line 1] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn global_self_reference_is_allowed() {
    let (_, _, errors) = resolve_source("var a = 1; var a = a;");

    assert!(errors.is_empty());
}

#[test]
fn duplicate_local_is_an_error() {
    let (_, _, errors) = resolve_source("func f() { var a; var a; }");

    assert_eq!(
        errors,
        ["[line 1] Error at 'a': Already a variable with this name in this scope."]
    );
}

#[test]
fn top_level_return_is_an_error() {
    let (_, _, errors) = resolve_source("return 1;");

    assert_eq!(
        errors,
        ["[line 1] Error at 'return': Can't return from top-level code."]
    );
}

#[test]
fn this_outside_class_is_an_error() {
    let (_, _, errors) = resolve_source("print this;\nfunc f() { return this; }");

    assert_eq!(
        errors,
        [
            "[line 1] Error at 'this': Can't use 'this' outside of a class.",
            "[line 2] Error at 'this': Can't use 'this' outside of a class.",
        ]
    );
}

#[test]
fn errors_are_collected_not_fatal() {
    let (_, _, errors) = resolve_source("return;\n{ var b = b; }\nreturn;");

    assert_eq!(errors.len(), 3);
}
