//! Error taxonomy coverage: each error kind surfaces and checking
//! continues past it.

mod common;

use common::*;
use mtx_hir::{BinaryOperator, FunctionAttributes};
use mtx_typechecker::TypeError;

#[test]
fn test_mismatched_operands_fail_simplification() {
    //  x = 1 + 'c'
    let mut builder = ProgramBuilder::new();
    builder.assign("x", binop(BinaryOperator::Plus, number("1"), char_lit("c")));

    let (checker, _hir) = check(builder);
    assert!(
        checker
            .errors()
            .iter()
            .any(|e| matches!(e, TypeError::SimplificationFailure { .. })),
        "{:?}",
        checker.errors()
    );
}

#[test]
fn test_unknown_function_is_unresolved() {
    //  q = nosuch(1)
    let mut builder = ProgramBuilder::new();
    let call = builder.call("nosuch", vec![number("1")]);
    builder.assign("q", call);

    let (checker, _hir) = check(builder);
    assert!(
        checker
            .errors()
            .iter()
            .any(|e| matches!(e, TypeError::UnresolvedFunction { .. })),
        "{:?}",
        checker.errors()
    );
}

#[test]
fn test_non_constant_field_reference() {
    //  s = struct('a', 1); s.(1)
    let mut builder = ProgramBuilder::new();
    let ctor = builder.call("struct", vec![char_lit("a"), number("1")]);
    let s = builder.assign("s", ctor);
    builder.expr_stmt(var_sub(
        s,
        "s",
        vec![mtx_hir::SubscriptArg::new(
            mtx_hir::SubscriptMethod::Period,
            vec![number("1")],
        )],
    ));

    let (checker, _hir) = check(builder);
    assert!(
        checker
            .errors()
            .iter()
            .any(|e| matches!(e, TypeError::NonConstantFieldReferenceExpr { .. })),
        "{:?}",
        checker.errors()
    );
}

#[test]
fn test_errors_are_collected_not_fatal() {
    //  Both errors in one run: an unresolved call and a bad field access.
    let mut builder = ProgramBuilder::new();
    let call = builder.call("nosuch", vec![number("1")]);
    builder.assign("q", call);
    let ctor = builder.call("struct", vec![char_lit("a"), number("1")]);
    let s = builder.assign("s", ctor);
    builder.expr_stmt(var_sub(s, "s", vec![period_sub("missing")]));

    let (checker, _hir) = check(builder);
    let unresolved = checker
        .errors()
        .iter()
        .filter(|e| matches!(e, TypeError::UnresolvedFunction { .. }))
        .count();
    let nonexistent = checker
        .errors()
        .iter()
        .filter(|e| matches!(e, TypeError::NonexistentFieldReference { .. }))
        .count();
    assert_eq!(unresolved, 1, "{:?}", checker.errors());
    assert_eq!(nonexistent, 1, "{:?}", checker.errors());
}

#[test]
fn test_struct_outside_assignment_falls_back_to_call() {
    //  A bare struct('a', 1) statement is not constructor context; the
    //  call shape finds no struct function and reports it unresolved.
    let mut builder = ProgramBuilder::new();
    let call = builder.call("struct", vec![char_lit("a"), number("1")]);
    builder.expr_stmt(call);

    let (checker, _hir) = check(builder);
    assert!(
        checker
            .errors()
            .iter()
            .any(|e| matches!(e, TypeError::UnresolvedFunction { .. })),
        "{:?}",
        checker.errors()
    );
}

#[test]
fn test_malformed_struct_arguments_fall_back_to_call() {
    //  s = struct(1, 2) has no char keys; the constructor shape is
    //  abandoned for the generic call, which is unresolved.
    let mut builder = ProgramBuilder::new();
    let call = builder.call("struct", vec![number("1"), number("2")]);
    builder.assign("s", call);

    let (checker, _hir) = check(builder);
    assert!(
        checker
            .errors()
            .iter()
            .any(|e| matches!(e, TypeError::UnresolvedFunction { .. })),
        "{:?}",
        checker.errors()
    );
}

#[test]
fn test_custom_subsref_is_unhandled() {
    //  classdef Wrapped with a subsref method; w = Wrapped(); w(1)
    let mut builder = ProgramBuilder::new();

    let ctor = builder.make_function_node(
        "Wrapped",
        &[],
        &["obj"],
        FunctionAttributes::constructor(),
        |_b, _parts| Vec::new(),
    );
    let ctor_def = ctor.def;
    let subsref = builder.make_function_node(
        "subsref",
        &["obj", "idx"],
        &["out"],
        FunctionAttributes::method(),
        |_b, _parts| Vec::new(),
    );
    builder.class_def("Wrapped", &["p"], vec![ctor, subsref]);

    let call = builder.call_local(ctor_def, "Wrapped", vec![]);
    let w = builder.assign("w", call);
    builder.expr_stmt(var_sub(w, "w", vec![parens_sub(vec![number("1")])]));

    let (checker, _hir) = check(builder);
    assert!(
        checker
            .errors()
            .iter()
            .any(|e| matches!(e, TypeError::UnhandledCustomSubscripts { .. })),
        "{:?}",
        checker.errors()
    );
}

#[test]
fn test_operator_method_dispatch_on_class() {
    //  classdef Vec with a plus method; u = Vec(); v = Vec(); u + v
    let mut builder = ProgramBuilder::new();

    let ctor = builder.make_function_node(
        "Vec",
        &[],
        &["obj"],
        FunctionAttributes::constructor(),
        |_b, _parts| Vec::new(),
    );
    let ctor_def = ctor.def;
    let plus = builder.make_function_node(
        "plus",
        &["a", "b"],
        &["r"],
        FunctionAttributes::method(),
        |_b, _parts| Vec::new(),
    );
    builder.class_def("Vec", &["p"], vec![ctor, plus]);

    let call_u = builder.call_local(ctor_def, "Vec", vec![]);
    let u = builder.assign("u", call_u);
    let call_v = builder.call_local(ctor_def, "Vec", vec![]);
    let v = builder.assign("v", call_v);
    builder.assign(
        "z",
        binop(BinaryOperator::Plus, var_ref(u, "u"), var_ref(v, "v")),
    );

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());

    let u_ty = checker.variable_type_string(u).unwrap();
    assert_eq!(u_ty, "Vec");
}
