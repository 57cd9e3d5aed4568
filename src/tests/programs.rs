use super::support::*;
use crate::config::EvalConfig;
use crate::language::{
    ast::{BinaryOp, Statement, TypePath, UnaryOp},
    span::Span,
    types::TypeExpr,
};
use crate::runtime::{error::RuntimeError, value::Value};
use pretty_assertions::assert_eq;

fn four_of_cards() -> Vec<Statement> {
    vec![
        card_group(),
        konst(
            "four",
            call(variant("Card", "Number"), vec![("value", num(4.0))]),
        ),
    ]
}

#[test]
fn group_match_binds_variant_fields() {
    let mut program = four_of_cards();
    program.push(ret(match_expr(
        ident("four"),
        vec![
            arm(call(variant("Card", "King"), vec![]), yields(text("king"))),
            arm(
                call(variant("Card", "Number"), vec![("value", ident("value"))]),
                block(vec![ret(ident("value"))]),
            ),
        ],
    )));
    let run = run(program);
    assert_eq!(run.number(), 4.0);
    let ctx = run.interpreter.context();
    assert!(ctx.scope.lookup("value").is_none());
    assert_eq!(ctx.scope.depth(), 1);
}

#[test]
fn return_inside_a_statement_match_ends_the_program() {
    let mut program = four_of_cards();
    program.push(expr_stmt(match_expr(
        ident("four"),
        vec![
            arm(
                call(variant("Card", "King"), vec![]),
                block(vec![ret(text("king"))]),
            ),
            arm(
                call(variant("Card", "Number"), vec![("value", ident("value"))]),
                block(vec![ret(ident("value"))]),
            ),
        ],
    )));
    program.push(log(text("unreachable")));
    let run = run(program);
    assert_eq!(run.number(), 4.0);
    assert!(run.console.lines().is_empty());
    assert_eq!(run.interpreter.context().scope.depth(), 1);
}

#[test]
fn arm_bindings_are_gone_after_the_match() {
    let mut program = four_of_cards();
    program.push(expr_stmt(match_expr(
        ident("four"),
        vec![arm(
            call(variant("Card", "Number"), vec![("value", ident("value"))]),
            block(vec![log(ident("value"))]),
        )],
    )));
    program.push(log(ident("value")));
    let run = run(program);
    assert_eq!(run.console.lines()[0], "4");
    assert!(matches!(
        run.error(),
        RuntimeError::UnresolvedIdentifier { name, .. } if name == "value"
    ));
}

#[test]
fn boolean_literal_patterns() {
    let run = run(vec![ret(match_expr(
        boolean(true),
        vec![
            arm(boolean(false), yields(text("false"))),
            arm(boolean(true), yields(text("true"))),
        ],
    ))]);
    assert_eq!(run.string(), "true");
}

#[test]
fn first_matching_arm_wins() {
    let run = run(vec![ret(match_expr(
        num(5.0),
        vec![
            arm(num(5.0), yields(text("five"))),
            arm(ident("n"), yields(text("catch-all"))),
        ],
    ))]);
    assert_eq!(run.string(), "five");
}

#[test]
fn record_patterns_accept_extra_fields() {
    let point = record(vec![("x", num(1.0)), ("y", num(2.0))]);
    let run = run(vec![ret(match_expr(
        point,
        vec![
            arm(
                record(vec![("x", ident("x")), ("z", ident("z"))]),
                yields(text("xz")),
            ),
            arm(record(vec![("x", ident("x"))]), yields(ident("x"))),
        ],
    ))]);
    assert_eq!(run.number(), 1.0);
}

#[test]
fn unmatched_value_is_non_exhaustive() {
    let run = run(vec![expr_stmt(match_expr(
        num(3.0),
        vec![arm(num(1.0), yields(text("one")))],
    ))]);
    assert!(matches!(
        run.error(),
        RuntimeError::NonExhaustiveMatch { value, .. } if value == "3"
    ));
    assert_eq!(run.console.lines(), ["error: No match arm matched value 3"]);
    assert_eq!(run.console.failure().as_ref(), Some(run.error()));
}

#[test]
fn malformed_pattern_raises_even_when_a_later_arm_would_match() {
    let run = run(vec![expr_stmt(match_expr(
        num(1.0),
        vec![
            arm(bin(BinaryOp::Add, num(1.0), num(2.0)), yields(text("sum"))),
            arm(ident("_"), yields(text("any"))),
        ],
    ))]);
    assert!(matches!(
        run.error(),
        RuntimeError::MalformedPattern { kind: "binary operation", .. }
    ));
}

#[test]
fn duplicate_pattern_bindings_are_rejected() {
    let run = run(vec![expr_stmt(match_expr(
        record(vec![("a", num(1.0)), ("b", num(2.0))]),
        vec![arm(
            record(vec![("a", ident("v")), ("b", ident("v"))]),
            yields(ident("v")),
        )],
    ))]);
    assert!(matches!(
        run.error(),
        RuntimeError::DuplicateBinding { name, .. } if name == "v"
    ));
}

#[test]
fn permissive_redefinition_warns_and_rebinds() {
    let run = run(vec![
        konst("x", num(1.0)),
        konst("x", num(2.0)),
        ret(ident("x")),
    ]);
    assert_eq!(run.number(), 2.0);
    assert_eq!(run.console.lines(), ["warning: `x` is redefined"]);
}

#[test]
fn strict_redefinition_is_an_error() {
    let run = run_with(
        EvalConfig::strict(),
        vec![konst("x", num(1.0)), konst("x", num(2.0))],
    );
    assert!(matches!(
        run.error(),
        RuntimeError::Redefinition { name, .. } if name == "x"
    ));
    let x = run.interpreter.context().scope.lookup("x");
    assert!(matches!(x, Some(Value::Number(n)) if n == 1.0));
}

#[test]
fn shadowing_in_a_nested_block_is_not_a_redefinition() {
    let run = run_with(
        EvalConfig::strict(),
        vec![
            konst("x", num(1.0)),
            if_stmt(boolean(true), block(vec![konst("x", num(2.0))]), None),
            ret(ident("x")),
        ],
    );
    assert_eq!(run.number(), 1.0);
}

#[test]
fn assignment_writes_the_innermost_frame() {
    let run = run(vec![
        konst("x", num(1.0)),
        if_stmt(
            boolean(true),
            block(vec![assign("x", num(5.0)), log(ident("x"))]),
            None,
        ),
        ret(ident("x")),
    ]);
    assert_eq!(run.console.lines(), ["5"]);
    assert_eq!(run.number(), 1.0);
}

#[test]
fn assignment_to_an_unbound_name_fails() {
    let run = run(vec![assign("ghost", num(1.0))]);
    assert!(matches!(
        run.error(),
        RuntimeError::UnresolvedIdentifier { name, .. } if name == "ghost"
    ));
}

#[test]
fn if_else_takes_the_matching_branch() {
    let run = run(vec![if_stmt(
        bin(BinaryOp::Lt, num(2.0), num(1.0)),
        block(vec![ret(text("then"))]),
        Some(block(vec![ret(text("else"))])),
    )]);
    assert_eq!(run.string(), "else");
}

#[test]
fn non_boolean_condition_is_rejected() {
    let run = run(vec![if_stmt(num(1.0), block(vec![]), None)]);
    assert!(matches!(
        run.error(),
        RuntimeError::ExpectedValue { expected: "boolean", found: "number", .. }
    ));
}

#[test]
fn top_level_return_stops_the_program() {
    let run = run(vec![ret(num(1.0)), log(text("unreachable"))]);
    assert_eq!(run.number(), 1.0);
    assert!(run.console.lines().is_empty());
}

#[test]
fn program_without_return_completes_with_no_value() {
    let run = run(vec![konst("x", num(1.0))]);
    assert!(run.report.is_ok());
    assert!(run.report.value.is_none());
}

#[test]
fn class_construction_checks_fields() {
    let point = || class("Point", vec![("x", TypeExpr::Number), ("y", TypeExpr::Number)]);

    let ok = run(vec![
        point(),
        konst("p", call(ty("Point"), vec![("x", num(3.0)), ("y", num(4.0))])),
        log(ident("p")),
        ret(field(ident("p"), "y")),
    ]);
    assert_eq!(ok.number(), 4.0);
    assert_eq!(ok.console.lines(), ["Point(x: 3, y: 4)"]);

    let missing = run(vec![point(), expr_stmt(call(ty("Point"), vec![("x", num(3.0))]))]);
    assert!(matches!(
        missing.error(),
        RuntimeError::MissingField { owner, field, .. } if owner == "Point" && field == "y"
    ));

    let extra = run(vec![
        point(),
        expr_stmt(call(
            ty("Point"),
            vec![("x", num(3.0)), ("y", num(4.0)), ("z", num(5.0))],
        )),
    ]);
    assert!(matches!(
        extra.error(),
        RuntimeError::UnexpectedField { field, .. } if field == "z"
    ));

    let wrong = run(vec![
        point(),
        expr_stmt(call(ty("Point"), vec![("x", num(3.0)), ("y", text("4"))])),
    ]);
    assert!(matches!(
        wrong.error(),
        RuntimeError::TypeMismatch { found, .. } if found == "string"
    ));
}

#[test]
fn class_fields_may_reference_a_group() {
    let run = run(vec![
        card_group(),
        class("Hand", vec![("top", TypeExpr::named("Card"))]),
        konst(
            "hand",
            call(ty("Hand"), vec![("top", call(variant("Card", "King"), vec![]))]),
        ),
        log(ident("hand")),
        expr_stmt(call(ty("Hand"), vec![("top", num(1.0))])),
    ]);
    assert_eq!(run.console.lines()[0], "Hand(top: Card.King())");
    assert!(matches!(
        run.error(),
        RuntimeError::TypeMismatch { expected, .. } if expected == "Card"
    ));
}

#[test]
fn group_field_access_yields_the_variant_class() {
    let run = run(vec![
        card_group(),
        konst("king", call(field(ident("Card"), "King"), vec![])),
        ret(match_expr(
            ident("king"),
            vec![arm(call(variant("Card", "King"), vec![]), yields(text("king")))],
        )),
    ]);
    assert_eq!(run.string(), "king");
}

#[test]
fn logging_types_and_values() {
    let run = run(vec![
        card_group(),
        log_type(TypePath::single("Card", sp())),
        log_type(TypePath::nested("Card", "Number", sp())),
        log(record(vec![("x", num(3.0)), ("y", text("a"))])),
        log(list(vec![num(1.5), text("b")])),
    ]);
    assert_eq!(
        run.console.lines(),
        [
            "Card { King(), Number(value: number) }",
            "Card.Number(value: number)",
            "(x: 3, y: \"a\")",
            "[1.5, \"b\"]",
        ]
    );
}

#[test]
fn string_concatenation_requires_a_string_on_the_right() {
    let ok = run(vec![ret(bin(BinaryOp::Add, text("a"), text("b")))]);
    assert_eq!(ok.string(), "ab");

    let err = run(vec![expr_stmt(bin(BinaryOp::Add, text("a"), num(1.0)))]);
    assert!(matches!(
        err.error(),
        RuntimeError::ExpectedValue { expected: "string", found: "number", .. }
    ));
}

#[test]
fn factorial_and_negation() {
    let negated = run(vec![ret(unary(
        UnaryOp::Neg,
        unary(UnaryOp::Factorial, num(5.0)),
    ))]);
    assert_eq!(negated.number(), -120.0);

    let err = run(vec![expr_stmt(unary(UnaryOp::Factorial, num(-1.0)))]);
    assert!(matches!(err.error(), RuntimeError::InvalidFactorial { .. }));
}

#[test]
fn lists_index_and_alias() {
    let run = run(vec![
        konst("xs", list(vec![num(1.0)])),
        konst("ys", ident("xs")),
        expr_stmt(call(ident("push"), vec![("list", ident("ys")), ("item", num(2.0))])),
        log(index(ident("xs"), num(1.0))),
        ret(call_with(ident("length"), ident("xs"))),
    ]);
    assert_eq!(run.console.lines(), ["2"]);
    assert_eq!(run.number(), 2.0);
}

#[test]
fn index_out_of_bounds() {
    let run = run(vec![expr_stmt(index(list(vec![num(1.0)]), num(3.0)))]);
    assert!(matches!(
        run.error(),
        RuntimeError::IndexOutOfBounds { len: 1, .. }
    ));
}

#[test]
fn calling_a_number_is_rejected() {
    let run = run(vec![konst("n", num(3.0)), expr_stmt(call(ident("n"), vec![]))]);
    assert!(matches!(
        run.error(),
        RuntimeError::NotCallable { found: "number", .. }
    ));
}

#[test]
fn context_stays_inspectable_after_a_failure() {
    let run = run(vec![
        konst("a", num(1.0)),
        expr_stmt(ident("missing")),
        konst("b", num(2.0)),
    ]);
    let scope = &run.interpreter.context().scope;
    assert!(scope.lookup("a").is_some());
    assert!(scope.lookup("b").is_none());
    assert_eq!(scope.depth(), 1);
    assert_eq!(
        run.error().span(),
        Some(Span::default()),
        "identifier errors carry the reference's span"
    );
}

#[test]
fn natives_and_definitions_share_the_global_frame() {
    let run = run(vec![konst("answer", num(42.0)), card_group()]);
    let names = run.interpreter.context().scope.global().names();
    assert_eq!(
        names,
        ["Card", "answer", "floor", "length", "push", "toString"]
    );
}
