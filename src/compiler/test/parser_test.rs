use crate::compiler::ast::{ASTNode, BinaryOperation, Literal, NodeKind, TypeAnnotation};
use crate::compiler::parser::{AstParser, PestMinnowParser};

fn parse(source: &str) -> ASTNode {
    PestMinnowParser::default()
        .parse(source)
        .expect("source should parse")
}

/// The single class of a parsed one-class program.
fn only_class(root: &ASTNode) -> &ASTNode {
    match &root.kind {
        NodeKind::PROGRAM(classes) => {
            assert_eq!(classes.len(), 1);
            &classes[0]
        }
        _ => panic!("root is not a program"),
    }
}

/// The statements of the method at `index` in a one-class program.
fn method_statements(root: &ASTNode, index: usize) -> &Vec<ASTNode> {
    match &only_class(root).kind {
        NodeKind::CLASS { methods, .. } => match &methods[index].kind {
            NodeKind::METHOD { body, .. } => match &body.kind {
                NodeKind::METHOD_BODY { statements, .. } => statements,
                _ => panic!("expected a method body"),
            },
            _ => panic!("expected a method"),
        },
        _ => panic!("expected a class"),
    }
}

#[test]
fn test_parse_minimal_program_shape() {
    let root = parse(
        r#"class Program {
    start() -> Nothing {
        Print(1);
        return;
    }
}"#,
    );

    let class = only_class(&root);
    let (class_id, super_class_id, declarations, methods) = match &class.kind {
        NodeKind::CLASS {
            class_id,
            super_class_id,
            declarations,
            methods,
        } => (class_id, super_class_id, declarations, methods),
        _ => panic!("expected a class node"),
    };

    assert_eq!(class_id.identifier_name(), Some("Program"));
    assert!(super_class_id.is_none());
    assert!(declarations.is_empty());
    assert_eq!(methods.len(), 1);

    let (method_id, parameters, return_type, body) = match &methods[0].kind {
        NodeKind::METHOD {
            method_id,
            parameters,
            return_type,
            body,
        } => (method_id, parameters, return_type, body),
        _ => panic!("expected a method node"),
    };
    assert_eq!(method_id.identifier_name(), Some("start"));
    assert!(parameters.is_empty());
    assert!(matches!(
        return_type.kind,
        NodeKind::DATATYPE(TypeAnnotation::T_NOTHING)
    ));

    let (statements, ret) = match &body.kind {
        NodeKind::METHOD_BODY {
            statements, ret, ..
        } => (statements, ret),
        _ => panic!("expected a method body node"),
    };
    assert_eq!(statements.len(), 1);
    assert!(matches!(statements[0].kind, NodeKind::PRINT { .. }));
    assert!(matches!(ret.kind, NodeKind::RETURN { expression: None }));
}

#[test]
fn test_parse_superclass_and_declarations() {
    let root = parse(
        r#"class B : A {
    var x, y : Integer;
    var other : A;
}"#,
    );

    let class = only_class(&root);
    match &class.kind {
        NodeKind::CLASS {
            super_class_id,
            declarations,
            ..
        } => {
            assert_eq!(
                super_class_id.as_ref().and_then(|id| id.identifier_name()),
                Some("A")
            );
            assert_eq!(declarations.len(), 2);
            match &declarations[0].kind {
                NodeKind::DECLARATION {
                    datatype,
                    variable_ids,
                } => {
                    assert_eq!(variable_ids.len(), 2);
                    assert!(matches!(
                        datatype.kind,
                        NodeKind::DATATYPE(TypeAnnotation::T_INTEGER)
                    ));
                }
                _ => panic!("expected a declaration node"),
            }
            match &declarations[1].kind {
                NodeKind::DECLARATION { datatype, .. } => match &datatype.kind {
                    NodeKind::DATATYPE(TypeAnnotation::T_OBJECT(name)) => assert_eq!(name, "A"),
                    _ => panic!("expected an object annotation"),
                },
                _ => panic!("expected a declaration node"),
            }
        }
        _ => panic!("expected a class node"),
    }
}

#[test]
fn test_parse_operator_precedence() {
    // 1 + 2 * 3 must parse as 1 + (2 * 3)
    let root = parse(
        r#"class Program {
    start() -> Nothing {
        Print(1 + 2 * 3);
        return;
    }
}"#,
    );

    let statements = method_statements(&root, 0);
    let expression = match &statements[0].kind {
        NodeKind::PRINT { expression } => expression,
        _ => panic!("expected a print statement"),
    };

    match &expression.kind {
        NodeKind::BINARY_OP { op, lhs, rhs } => {
            assert_eq!(*op, BinaryOperation::ADD);
            assert!(matches!(lhs.kind, NodeKind::LITERAL(Literal::INTEGER(1))));
            match &rhs.kind {
                NodeKind::BINARY_OP { op, .. } => assert_eq!(*op, BinaryOperation::MUL),
                _ => panic!("rhs should be the multiplication"),
            }
        }
        _ => panic!("expected a binary op"),
    }
}

#[test]
fn test_parse_call_forms() {
    let root = parse(
        r#"class Program {
    f() -> Integer {
        return 1;
    }
    start() -> Nothing {
        var a : Program;
        Print(a.f());
        Print(f());
        return;
    }
}"#,
    );

    let statements = method_statements(&root, 1);
    match &statements[0].kind {
        NodeKind::PRINT { expression } => match &expression.kind {
            NodeKind::METHOD_CALL {
                variable_id,
                method_id,
                arguments,
            } => {
                assert_eq!(variable_id.identifier_name(), Some("a"));
                assert_eq!(method_id.identifier_name(), Some("f"));
                assert!(arguments.is_empty());
            }
            _ => panic!("expected a method call"),
        },
        _ => panic!("expected a print statement"),
    }
    match &statements[1].kind {
        NodeKind::PRINT { expression } => {
            assert!(matches!(expression.kind, NodeKind::SELF_CALL { .. }));
        }
        _ => panic!("expected a print statement"),
    }
}

#[test]
fn test_parse_records_line_numbers() {
    let root = parse(
        r#"class Program {
    start() -> Nothing {
        Print(1);
        return;
    }
}"#,
    );

    let class = only_class(&root);
    assert_eq!(class.attribute.lineno, 1);
    match &class.kind {
        NodeKind::CLASS { methods, .. } => {
            assert_eq!(methods[0].attribute.lineno, 2);
            match &methods[0].kind {
                NodeKind::METHOD { body, .. } => match &body.kind {
                    NodeKind::METHOD_BODY { statements, .. } => {
                        assert_eq!(statements[0].attribute.lineno, 3);
                    }
                    _ => panic!("expected a method body"),
                },
                _ => panic!("expected a method"),
            }
        }
        _ => panic!("expected a class"),
    }
}

#[test]
fn test_parse_unary_chain() {
    let root = parse(
        r#"class Program {
    start() -> Nothing {
        Print(-5);
        return;
    }
}"#,
    );

    let statements = method_statements(&root, 0);
    match &statements[0].kind {
        NodeKind::PRINT { expression } => match &expression.kind {
            NodeKind::UNARY_OP { expression, .. } => {
                assert!(matches!(
                    expression.kind,
                    NodeKind::LITERAL(Literal::INTEGER(5))
                ));
            }
            _ => panic!("expected a unary op"),
        },
        _ => panic!("expected a print statement"),
    }
}

#[test]
fn test_parse_rejects_invalid_syntax() {
    let result = PestMinnowParser::default().parse("class Program { start() -> {} }");
    assert!(result.is_err());
}

#[test]
fn test_parse_rejects_trailing_garbage() {
    let result = PestMinnowParser::default().parse(
        r#"class Program {
    start() -> Nothing { return; }
}
garbage"#,
    );
    assert!(result.is_err());
}
