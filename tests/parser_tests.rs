use ugo_rust::lexer::{lex, LexerError, Pos, Position, TokenKind};
use ugo_rust::parser::{
    parse_expr, parse_file, AssignOp, BinaryOp, ElseBranch, Expr, File, Node, NumberValue,
    ParserError, Stmt, TokenStream, UnaryOp, MAX_NESTING,
};

/// Evaluate a constant integer expression tree.
fn eval(expr: &Expr) -> i64 {
    match expr {
        Expr::Number(n) => match n.value {
            NumberValue::Int(v) => v,
            NumberValue::Float(v) => panic!("unexpected float {v}"),
        },
        Expr::Paren(p) => eval(&p.x),
        Expr::Unary(u) => match u.op {
            UnaryOp::Plus => eval(&u.x),
            UnaryOp::Neg => -eval(&u.x),
        },
        Expr::Binary(b) => {
            let (x, y) = (eval(&b.x), eval(&b.y));
            match b.op {
                BinaryOp::Add => x + y,
                BinaryOp::Sub => x - y,
                BinaryOp::Mul => x * y,
                BinaryOp::Div => x / y,
                BinaryOp::Mod => x % y,
                BinaryOp::Eql => i64::from(x == y),
                BinaryOp::Neq => i64::from(x != y),
                BinaryOp::Lss => i64::from(x < y),
                BinaryOp::Leq => i64::from(x <= y),
                BinaryOp::Gtr => i64::from(x > y),
                BinaryOp::Geq => i64::from(x >= y),
                BinaryOp::LogicalAnd => i64::from(x != 0 && y != 0),
                BinaryOp::LogicalOr => i64::from(x != 0 || y != 0),
            }
        }
        other => panic!("cannot evaluate {other:?}"),
    }
}

fn eval_src(src: &str) -> i64 {
    eval(&parse_expr("expr", src).unwrap())
}

fn main_body(file: &File) -> &[Stmt] {
    &file.func("main").unwrap().body.as_ref().unwrap().stmts
}

fn parse_main(body: &str) -> File {
    let src = format!("package main\n\nfunc main() {{\n{body}\n}}\n");
    parse_file("test.ugo", &src).unwrap()
}

#[test]
fn test_precedence() {
    assert_eq!(eval_src("1+2*3"), 7);
    assert_eq!(eval_src("(1+2)*3"), 9);
    assert_eq!(eval_src("2*3+4*5"), 26);
    assert_eq!(eval_src("1 + 2 < 4 && 3 > 2 || 0"), 1);
    assert_eq!(eval_src("7 % 4 == 3"), 1);
}

#[test]
fn test_left_associative() {
    assert_eq!(eval_src("8-3-2"), 3);
    assert_eq!(eval_src("64/4/2"), 8);
}

#[test]
fn test_unary() {
    assert_eq!(eval_src("-2*3"), -6);
    assert_eq!(eval_src("-(1+2)"), -3);
    assert_eq!(eval_src("+5 - -5"), 10);
}

#[test]
fn test_expression_span() {
    let expr = parse_expr("expr", "  1 + 23").unwrap();
    assert_eq!(expr.pos(), Pos(2));
    assert_eq!(expr.end(), Pos(8));
}

#[test]
fn test_trailing_input_is_rejected() {
    let err = parse_expr("expr", "1 2").unwrap_err();
    assert!(matches!(err, ParserError::UnexpectedToken(..)), "{err:?}");
}

#[test]
fn test_float_literal_parses() {
    let expr = parse_expr("expr", "1.5").unwrap();
    let Expr::Number(n) = expr else {
        panic!("expected number");
    };
    assert_eq!(n.value, NumberValue::Float(1.5));
}

#[test]
fn test_file_sections() {
    let src = r#"package demo

import "fmt"
import f "strings"

const limit = 10
type Count int
type Alias = int
var total int = 1 + limit

func add(a int, b int) int {
	return a + b
}

func (p *Point) Get() int {
	return 1
}

func external(x int)
"#;
    let file = parse_file("demo.ugo", src).unwrap();
    assert_eq!(file.package.name, "demo");

    assert_eq!(file.imports.len(), 2);
    assert_eq!(file.imports[0].path, "fmt");
    assert!(file.imports[0].name.is_none());
    assert_eq!(file.imports[1].name.as_ref().unwrap().name, "f");

    assert_eq!(file.consts[0].name.name, "limit");
    assert_eq!(file.types.len(), 2);
    assert!(file.types[0].assign.is_none());
    assert!(file.types[1].assign.is_some());
    assert_eq!(file.globals[0].ty.as_ref().unwrap().name, "int");

    assert_eq!(file.funcs.len(), 3);
    let add = &file.funcs[0];
    assert_eq!(add.params.len(), 2);
    assert_eq!(add.results.len(), 1);
    assert!(add.results[0].name.is_none());
    assert_eq!(add.results[0].ty.as_ref().unwrap().name, "int");

    let get = &file.funcs[1];
    let recv = get.recv.as_ref().unwrap();
    assert_eq!(recv.name.as_ref().unwrap().name, "p");
    assert_eq!(recv.ty.as_ref().unwrap().name, "Point");
    assert_eq!(get.arity(), 1);

    assert!(file.funcs[2].body.is_none());
}

#[test]
fn test_for_forms() {
    let file = parse_main(
        "for {\n}\nfor x < 3 {\n}\nfor i := 0; i < 3; i := i + 1 {\n}\nfor ; ; {\n}\nfor j := 0; j < 2; {\n}",
    );
    let stmts = main_body(&file);
    assert_eq!(stmts.len(), 5);

    let fors: Vec<_> = stmts
        .iter()
        .map(|s| match s {
            Stmt::For(f) => (f.init.is_some(), f.cond.is_some(), f.post.is_some()),
            other => panic!("expected for, got {other:?}"),
        })
        .collect();
    assert_eq!(fors, vec![
        (false, false, false),
        (false, true, false),
        (true, true, true),
        (false, false, false),
        (true, true, false),
    ]);
}

#[test]
fn test_if_else_chain() {
    let file = parse_main(
        "if x := 1; x > 0 {\n\tprintln(x)\n} else if x < 0 {\n} else {\n\tprintln(0)\n}",
    );
    let Stmt::If(stmt) = &main_body(&file)[0] else {
        panic!("expected if");
    };
    assert!(matches!(stmt.init.as_deref(), Some(Stmt::Assign(_))));
    assert_eq!(stmt.body.stmts.len(), 1);

    let Some(ElseBranch::If(nested)) = &stmt.else_branch else {
        panic!("expected else if");
    };
    assert!(nested.init.is_none());
    assert!(matches!(&nested.else_branch, Some(ElseBranch::Block(b)) if b.stmts.len() == 1));
}

#[test]
fn test_if_condition_must_be_expression() {
    let src = "package main\nfunc main() {\n\tif x := 1 {\n\t}\n}\n";
    let err = parse_file("test.ugo", src).unwrap_err();
    assert!(matches!(err, ParserError::NotAnExpression(..)), "{err:?}");
}

#[test]
fn test_assignments() {
    let file = parse_main("a, b := 1, 2\na = b\nb += 3");
    let stmts = main_body(&file);

    let Stmt::Assign(define) = &stmts[0] else {
        panic!("expected assign");
    };
    assert_eq!(define.op, AssignOp::Define);
    assert_eq!(define.targets.len(), 2);

    let Stmt::Assign(plain) = &stmts[1] else {
        panic!("expected assign");
    };
    assert_eq!(plain.op, AssignOp::Assign);

    let Stmt::Assign(compound) = &stmts[2] else {
        panic!("expected assign");
    };
    assert_eq!(compound.op, AssignOp::Assign);
    assert_eq!(compound.targets[0].name, "b");
    assert!(matches!(&compound.values[0], Expr::Binary(b) if b.op == BinaryOp::Add));
}

#[test]
fn test_assignment_count_mismatch() {
    let src = "package main\nfunc main() {\n\ta, b := 1\n}\n";
    let err = parse_file("test.ugo", src).unwrap_err();
    assert_eq!(
        err,
        ParserError::AssignmentMismatch(2, 1, Position::new("test.ugo", 3, 7))
    );
}

#[test]
fn test_invalid_assign_target() {
    let src = "package main\nfunc main() {\n\t1 = 2\n}\n";
    let err = parse_file("test.ugo", src).unwrap_err();
    assert!(matches!(err, ParserError::InvalidAssignTarget(ref t, _) if t == "1"), "{err:?}");
}

#[test]
fn test_defer_and_return() {
    let file = parse_main("defer println(1)\nreturn\n");
    let stmts = main_body(&file);
    assert!(matches!(&stmts[0], Stmt::Defer(d) if d.call.func.name == "println"));
    assert!(matches!(&stmts[1], Stmt::Return(r) if r.results.is_empty()));

    let src = "package main\nfunc main() {\n\tdefer x\n}\n";
    let err = parse_file("test.ugo", src).unwrap_err();
    assert!(matches!(err, ParserError::DeferRequiresCall(..)), "{err:?}");
}

#[test]
fn test_missing_package_name() {
    let err = parse_file("test.ugo", "package 42").unwrap_err();
    assert_eq!(
        err,
        ParserError::UnexpectedToken(
            "identifier".to_string(),
            "42".to_string(),
            Position::new("test.ugo", 1, 9)
        )
    );
}

#[test]
fn test_statements_need_terminators() {
    let src = "package main\nfunc main() {\n\tx := 1 y := 2\n}\n";
    let err = parse_file("test.ugo", src).unwrap_err();
    assert!(err.to_string().contains("expected ';' or newline"), "{err}");
}

#[test]
fn test_lexer_error_surfaces_through_parser() {
    let err = parse_file("t.ugo", "package main\nvar x = 1 @ 2").unwrap_err();
    assert!(matches!(err, ParserError::Lexer(LexerError::Illegal(..))));
    assert!(err.to_string().starts_with("t.ugo:2:11:"), "{err}");
}

fn check_spans(stmts: &[Stmt]) {
    for stmt in stmts {
        assert!(stmt.end() >= stmt.pos(), "{stmt:?}");
        match stmt {
            Stmt::Block(b) => check_spans(&b.stmts),
            Stmt::If(s) => check_spans(&s.body.stmts),
            Stmt::For(s) => check_spans(&s.body.stmts),
            _ => {}
        }
    }
}

#[test]
fn test_node_spans_are_ordered() {
    let file = parse_main(
        "x := 1\nif x > 0 {\n\tx = x - 1\n}\nfor x < 3 {\n\tx += 1\n}\n{\n\tvar y = x\n\tprintln(y)\n}",
    );
    check_spans(main_body(&file));
    for func in &file.funcs {
        assert!(func.end() >= func.pos());
    }
}

#[test]
fn test_token_stream_pushback() {
    let (tokens, _) = lex("s.ugo", "a + b");
    let mut stream = TokenStream::new(tokens);

    assert_eq!(stream.peek().kind, TokenKind::Ident);
    let a = stream.read();
    assert_eq!(a.lexeme, "a");

    stream.unread();
    stream.unread();
    assert_eq!(stream.read().lexeme, "a");

    assert!(stream.accept(&[TokenKind::Sub]).is_none());
    assert_eq!(stream.accept(&[TokenKind::Sub, TokenKind::Add]).unwrap().kind, TokenKind::Add);

    let found = stream.must_accept(&[TokenKind::Number]).unwrap_err();
    assert_eq!(found.lexeme, "b");
    assert_eq!(stream.must_accept(&[TokenKind::Ident]).unwrap().lexeme, "b");

    assert_eq!(stream.read().kind, TokenKind::Eof);
    assert_eq!(stream.read().kind, TokenKind::Eof);
    assert!(stream.is_eof());
}

#[test]
fn test_nesting_limit() {
    let deep = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
    let err = parse_expr("e", &deep).unwrap_err();
    assert!(matches!(err, ParserError::TooDeep(MAX_NESTING, _)), "{err:?}");

    let negated = format!("{}1", "-".repeat(20_000));
    assert!(matches!(parse_expr("e", &negated), Err(ParserError::TooDeep(..))));

    let blocks = format!(
        "package main\nfunc main() {{\n{}\n{}\n}}\n",
        "{".repeat(20_000),
        "}".repeat(20_000)
    );
    assert!(matches!(parse_file("b.ugo", &blocks), Err(ParserError::TooDeep(..))));

    let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(eval_src(&shallow), 1);
}
