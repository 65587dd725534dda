use helio_parser::parser::ast::{BinaryOp, ExprKind, Literal, Program, StmtKind};
use helio_parser::{Lexer, Parser};

fn parse(source: &str) -> (Option<Program>, Vec<String>) {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    let mut parser = Parser::new(tokens);
    let program = parser.parse();
    let errors = parser.errors().iter().map(ToString::to_string).collect();
    (program, errors)
}

fn parse_ok(source: &str) -> Program {
    let (program, errors) = parse(source);
    program.unwrap_or_else(|| panic!("expected clean parse, got: {errors:?}"))
}

fn parse_errors(source: &str) -> Vec<String> {
    let (program, errors) = parse(source);
    assert!(program.is_none(), "expected a parse failure");
    assert!(!errors.is_empty());
    errors
}

#[test]
fn parses_variable_declarations() {
    let program = parse_ok("const int x = 1; float y;");
    assert_eq!(program.statements.len(), 2);

    match &program.statements[0].kind {
        StmtKind::VarDecl {
            is_const,
            name,
            initializer,
            ..
        } => {
            assert!(*is_const);
            assert_eq!(name, "x");
            assert!(initializer.is_some());
        }
        other => panic!("expected a variable declaration, got {other:?}"),
    }

    match &program.statements[1].kind {
        StmtKind::VarDecl {
            is_const,
            initializer,
            ..
        } => {
            assert!(!*is_const);
            assert!(initializer.is_none());
        }
        other => panic!("expected a variable declaration, got {other:?}"),
    }
}

#[test]
fn parses_function_declaration() {
    let program = parse_ok(
        "fx power(int a, int b) { int result = 1; for (i, 0, b) { result = result * a; } return result; }",
    );

    match &program.statements[0].kind {
        StmtKind::Function(function) => {
            assert_eq!(function.name, "power");
            assert_eq!(function.params.len(), 2);
            assert_eq!(function.body.len(), 3);
            assert!(function.return_type.is_none(), "parser leaves inference to the analyzer");
        }
        other => panic!("expected a function, got {other:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let program = parse_ok("int x = 1 + 2 * 3;");

    let StmtKind::VarDecl {
        initializer: Some(init),
        ..
    } = &program.statements[0].kind
    else {
        panic!("expected an initialized declaration");
    };

    let ExprKind::Binary { op, right, .. } = &init.kind else {
        panic!("expected a binary initializer");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        right.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn assignment_is_right_associative() {
    let program = parse_ok("a = b = 1;");

    let StmtKind::Expression(expr) = &program.statements[0].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Assign { target, value } = &expr.kind else {
        panic!("expected an assignment");
    };
    assert!(matches!(target.kind, ExprKind::Identifier(_)));
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
}

#[test]
fn rejects_invalid_assignment_targets() {
    let errors = parse_errors("1 = 2;");
    assert!(errors[0].contains("Invalid assignment target."), "{errors:?}");

    let errors = parse_errors("a + b = 3;");
    assert!(errors[0].contains("Invalid assignment target."), "{errors:?}");
}

#[test]
fn error_is_positioned_at_the_assign_token() {
    let errors = parse_errors("a + b = 3;");
    assert!(errors[0].starts_with("Parse error at line 1, column 7:"), "{errors:?}");
}

#[test]
fn recovers_at_statement_boundaries() {
    let (program, errors) = parse("int x = ; print(1);");
    assert!(program.is_none());
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("Expect expression."));
}

#[test]
fn reports_missing_semicolon() {
    let errors = parse_errors("print(1)");
    assert!(
        errors[0].contains("Expect ';' after print statement."),
        "{errors:?}"
    );
}

#[test]
fn parses_for_with_and_without_step() {
    let program = parse_ok("for (i, 0, 10, 2) { print(i); } for (i, 5, 1) { print(i); }");

    match &program.statements[0].kind {
        StmtKind::For { iterator, step, .. } => {
            assert_eq!(iterator, "i");
            assert!(step.is_some());
        }
        other => panic!("expected a for loop, got {other:?}"),
    }
    match &program.statements[1].kind {
        StmtKind::For { step, .. } => assert!(step.is_none()),
        other => panic!("expected a for loop, got {other:?}"),
    }
}

#[test]
fn parses_try_catch() {
    let program = parse_ok("try { print(1); } catch (e) { print(2); }");

    match &program.statements[0].kind {
        StmtKind::TryCatch {
            try_block,
            exception,
            catch_block,
        } => {
            assert_eq!(try_block.len(), 1);
            assert_eq!(exception, "e");
            assert_eq!(catch_block.len(), 1);
        }
        other => panic!("expected try/catch, got {other:?}"),
    }
}

#[test]
fn parses_if_elif_else_chain() {
    let program = parse_ok("if (true) { } elif (false) { } elif (true) { } else { print(1); }");

    match &program.statements[0].kind {
        StmtKind::If {
            elif_blocks,
            else_block,
            ..
        } => {
            assert_eq!(elif_blocks.len(), 2);
            assert_eq!(else_block.len(), 1);
        }
        other => panic!("expected an if statement, got {other:?}"),
    }
}

#[test]
fn parses_nested_list_types() {
    let program = parse_ok("list<list<int>> grid = [];");
    match &program.statements[0].kind {
        StmtKind::VarDecl { declared, .. } => {
            assert_eq!(declared.to_string(), "list<list<int>>");
        }
        other => panic!("expected a declaration, got {other:?}"),
    }
}

#[test]
fn postfix_operators_chain() {
    let program = parse_ok("xs[0].length();");

    let StmtKind::Expression(expr) = &program.statements[0].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Call { callee, args } = &expr.kind else {
        panic!("expected a call");
    };
    assert!(args.is_empty());
    let ExprKind::Member { object, member } = &callee.kind else {
        panic!("expected a member callee");
    };
    assert_eq!(member, "length");
    assert!(matches!(object.kind, ExprKind::Index { .. }));
}

#[test]
fn input_is_also_an_expression() {
    let program = parse_ok("string name = input(\"? \");");

    let StmtKind::VarDecl {
        initializer: Some(init),
        ..
    } = &program.statements[0].kind
    else {
        panic!("expected an initialized declaration");
    };
    let ExprKind::Call { callee, args } = &init.kind else {
        panic!("expected a call initializer");
    };
    assert!(matches!(&callee.kind, ExprKind::Identifier(name) if name == "input"));
    assert_eq!(args.len(), 1);
}

#[test]
fn string_literal_loses_quotes_in_the_tree() {
    let program = parse_ok("print(\"hi\");");
    let StmtKind::Print(value) = &program.statements[0].kind else {
        panic!("expected print");
    };
    assert!(matches!(&value.kind, ExprKind::Literal(Literal::Str(s)) if s == "hi"));
}

#[test]
fn errors_accumulate_across_statements() {
    let (program, errors) = parse("int = 1; float = 2; print(3);");
    assert!(program.is_none());
    assert_eq!(errors.len(), 2, "{errors:?}");
}

#[test]
fn grouping_parenthesis_preserves_inner_expression() {
    let program = parse_ok("int x = (1 + 2) * 3;");
    let StmtKind::VarDecl {
        initializer: Some(init),
        ..
    } = &program.statements[0].kind
    else {
        panic!("expected an initialized declaration");
    };
    assert!(matches!(
        init.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}
