use jmodel_syntax::{
    parse, parse_expression, BinaryOp, Expr, LiteralKind, MemberDecl, TypeRefKind, UnaryOp,
};
use pretty_assertions::assert_eq;

fn expr(text: &str) -> Expr {
    let (expr, errors) = parse_expression(text);
    assert!(errors.is_empty(), "errors for {text}: {errors:?}");
    expr
}

#[test]
fn binary_precedence_and_associativity() {
    let Expr::Binary(add) = expr("1 + 2 * 3 - 4") else {
        panic!("expected binary");
    };
    assert_eq!(add.op, BinaryOp::Sub);
    let Expr::Binary(lhs) = add.lhs.as_ref() else {
        panic!("expected binary lhs");
    };
    assert_eq!(lhs.op, BinaryOp::Add);
    assert!(matches!(lhs.rhs.as_ref(), Expr::Binary(mul) if mul.op == BinaryOp::Mul));
}

#[test]
fn shift_operators_are_joined_from_angle_tokens() {
    let ops: Vec<BinaryOp> = ["1 >> 2", "1 >>> 2", "1 << 2", "1 >= 2", "1 > 2"]
        .into_iter()
        .map(|text| match expr(text) {
            Expr::Binary(binary) => binary.op,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        ops,
        vec![
            BinaryOp::Shr,
            BinaryOp::UShr,
            BinaryOp::Shl,
            BinaryOp::Ge,
            BinaryOp::Gt
        ]
    );
}

#[test]
fn conditional_unary_and_casts() {
    assert!(matches!(expr("a ? 1 : b ? 2 : 3"), Expr::Conditional(c) if matches!(*c.else_expr, Expr::Conditional(_))));
    assert!(matches!(expr("-~1"), Expr::Unary(u) if u.op == UnaryOp::Minus));
    assert!(matches!(expr("(int) 3.5"), Expr::Cast(_)));
    assert!(matches!(expr("(String) name"), Expr::Cast(_)));
    assert!(matches!(expr("(a) - 1"), Expr::Binary(b) if matches!(*b.lhs, Expr::Paren(_))));
}

#[test]
fn names_class_literals_and_calls() {
    assert_eq!(
        expr("java.lang.Integer.MAX_VALUE").qualified_name().as_deref(),
        Some("java.lang.Integer.MAX_VALUE")
    );

    let Expr::ClassLiteral(lit) = expr("String[][].class") else {
        panic!("expected class literal");
    };
    assert_eq!(lit.ty.erased_text(), "String[][]");

    let Expr::ClassLiteral(lit) = expr("int.class") else {
        panic!("expected class literal");
    };
    assert_eq!(lit.ty.kind, TypeRefKind::Primitive("int".to_string()));

    assert!(matches!(expr("void.class"), Expr::ClassLiteral(lit) if lit.ty.kind == TypeRefKind::Void));
    assert!(matches!(expr("List.of(1, 2)"), Expr::Call(call) if call.args.len() == 2));
    assert!(matches!(expr("new Object()"), Expr::New(_)));
    assert!(matches!(expr("true"), Expr::Literal(lit) if lit.kind == LiteralKind::True));
}

#[test]
fn unsupported_expressions_become_opaque() {
    let text = "class A { Runnable r = () -> { int x = 1; }, s = x -> x; java.util.Map<String, Integer> m = new java.util.HashMap<String, Integer>() {}; int[] a = {1, 2}; }";
    let parse = parse(text);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let decl = &parse.compilation_unit().types[0];
    let initializers: Vec<_> = decl
        .members
        .iter()
        .filter_map(|m| match m {
            MemberDecl::Field(field) => Some(field),
            _ => None,
        })
        .flat_map(|field| field.declarators.iter())
        .map(|d| d.initializer.clone().expect("initializer"))
        .collect();
    assert_eq!(initializers.len(), 4);
    assert!(matches!(initializers[0], Expr::Opaque(_)));
    assert!(matches!(initializers[1], Expr::Opaque(_)));
    assert!(matches!(initializers[2], Expr::Opaque(_)));
    assert!(matches!(&initializers[3], Expr::ArrayInit(array) if array.elements.len() == 2));

    let range = initializers[1].range();
    assert_eq!(&text[range.start..range.end], "x -> x");
}
