//! End-to-end inference over hand-built resolved programs.

mod common;

use common::*;
use mtx_hir::BinaryOperator;
use mtx_typechecker::TypeError;

#[test]
fn test_binary_arithmetic_on_literals() {
    //  x = 1 + 2
    let mut builder = ProgramBuilder::new();
    let x = builder.assign("x", binop(BinaryOperator::Plus, number("1"), number("2")));

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(checker.variable_type_string(x).as_deref(), Some("double"));
}

#[test]
fn test_function_definition_and_call() {
    //  function y = f(a, b); y = a + b; end
    //  z = f(1, 2)
    let mut builder = ProgramBuilder::new();
    let f = builder.function_def("f", &["a", "b"], &["y"], |b, parts| {
        let of = binop(
            BinaryOperator::Plus,
            var_ref(parts.inputs[0], "a"),
            var_ref(parts.inputs[1], "b"),
        );
        vec![mtx_hir::Stmt::Assignment {
            token: tok("="),
            to: var_ref(parts.outputs[0], "y"),
            of,
        }]
    });
    let call = builder.call_local(f, "f", vec![number("1"), number("2")]);
    let z = builder.assign("z", call);

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(
        checker.function_type_string(f).as_deref(),
        Some("(double, double) -> double")
    );
    assert_eq!(checker.variable_type_string(z).as_deref(), Some("double"));
}

#[test]
fn test_anonymous_function_scheme() {
    //  g = @(x) x(1)
    //  r = g(@sum)
    let mut builder = ProgramBuilder::new();
    let lambda = builder.lambda(&["x"], |_b, defs| {
        var_sub(defs[0], "x", vec![parens_sub(vec![number("1")])])
    });
    let g = builder.assign("g", lambda);

    let handle = builder.func_handle("sum");
    let apply = var_sub(g, "g", vec![parens_sub(vec![handle])]);
    let r = builder.assign("r", apply);

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());

    let g_ty = checker.variable_type_string(g).unwrap();
    assert!(g_ty.starts_with("forall"), "g: {}", g_ty);
    assert!(g_ty.contains("->"), "g: {}", g_ty);
    assert_eq!(checker.variable_type_string(r).as_deref(), Some("double"));
}

#[test]
fn test_struct_constructor_and_field_access() {
    //  s = struct('a', 1, 'b', 'hi')
    //  y = s.a
    let mut builder = ProgramBuilder::new();
    let ctor = builder.call("struct", vec![char_lit("a"), number("1"), char_lit("b"), char_lit("hi")]);
    let s = builder.assign("s", ctor);
    let y = builder.assign("y", var_sub(s, "s", vec![period_sub("a")]));

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());

    let s_ty = checker.variable_type_string(s).unwrap();
    assert_eq!(s_ty, "{a: double, b: char}");
    assert_eq!(checker.variable_type_string(y).as_deref(), Some("double"));
}

#[test]
fn test_struct_nonexistent_field() {
    //  s = struct('a', 1, 'b', 'hi'); s.c
    let mut builder = ProgramBuilder::new();
    let ctor = builder.call("struct", vec![char_lit("a"), number("1"), char_lit("b"), char_lit("hi")]);
    let s = builder.assign("s", ctor);
    builder.expr_stmt(var_sub(s, "s", vec![period_sub("c")]));

    let (checker, _hir) = check(builder);
    assert!(
        checker
            .errors()
            .iter()
            .any(|e| matches!(e, TypeError::NonexistentFieldReference { field, .. } if field == "c")),
        "{:?}",
        checker.errors()
    );
}

#[test]
fn test_nested_struct_field_chain() {
    //  s = struct('a', struct('b', 2)); w = s.a.b
    let mut builder = ProgramBuilder::new();
    let inner = builder.call("struct", vec![char_lit("b"), number("2")]);
    let ctor = builder.call("struct", vec![char_lit("a"), inner]);
    let s = builder.assign("s", ctor);
    let w = builder.assign("w", var_sub(s, "s", vec![period_sub("a"), period_sub("b")]));

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(checker.variable_type_string(w).as_deref(), Some("double"));
}

#[test]
fn test_deal_parameter_pack() {
    //  [a, b] = deal(1, 'x')
    let mut builder = ProgramBuilder::new();
    let a = builder.var("a");
    let b = builder.var("b");
    let call = builder.call("deal", vec![number("1"), char_lit("x")]);
    builder.assign_to(
        bracket_group(vec![var_ref(a, "a"), var_ref(b, "b")]),
        call,
    );

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(checker.variable_type_string(a).as_deref(), Some("double"));
    assert_eq!(checker.variable_type_string(b).as_deref(), Some("char"));
}

#[test]
fn test_tuple_brace_indexing_yields_union() {
    //  t = {1, 'x'}; u = t{1}
    let mut builder = ProgramBuilder::new();
    let t = builder.assign("t", brace_group(vec![number("1"), char_lit("x")]));
    let u = builder.assign("u", var_sub(t, "t", vec![brace_sub(vec![number("1")])]));

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(
        checker.variable_type_string(u).as_deref(),
        Some("double | char")
    );
}

#[test]
fn test_tuple_parens_indexing_is_invalid() {
    //  t = {1, 'x'}; t(1)
    let mut builder = ProgramBuilder::new();
    let t = builder.assign("t", brace_group(vec![number("1"), char_lit("x")]));
    builder.expr_stmt(var_sub(t, "t", vec![parens_sub(vec![number("1")])]));

    let (checker, _hir) = check(builder);
    assert!(
        checker
            .errors()
            .iter()
            .any(|e| matches!(e, TypeError::InvalidFunctionInvocation { .. })),
        "{:?}",
        checker.errors()
    );
}

#[test]
fn test_scalar_parens_indexing_is_identity() {
    //  x = 1; y = x(1)
    let mut builder = ProgramBuilder::new();
    let x = builder.assign("x", number("1"));
    let y = builder.assign("y", var_sub(x, "x", vec![parens_sub(vec![number("1")])]));

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(checker.variable_type_string(y).as_deref(), Some("double"));
}

#[test]
fn test_builtin_free_function_call() {
    //  w = sum(3)
    let mut builder = ProgramBuilder::new();
    let call = builder.call("sum", vec![number("3")]);
    let w = builder.assign("w", call);

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(checker.variable_type_string(w).as_deref(), Some("double"));
}

#[test]
fn test_subtype_in_assignment_direction() {
    //  d = sub_double(); e = double(d)
    let mut builder = ProgramBuilder::new();
    let call = builder.call("sub_double", vec![]);
    let d = builder.assign("d", call);
    let convert = builder.call("double", vec![var_ref(d, "d")]);
    let e = builder.assign("e", convert);

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(
        checker.variable_type_string(d).as_deref(),
        Some("sub-double")
    );
    assert_eq!(checker.variable_type_string(e).as_deref(), Some("double"));
}

#[test]
fn test_concatenation_in_value_position() {
    //  v = [1, 2]
    let mut builder = ProgramBuilder::new();
    let v = builder.assign("v", bracket_group(vec![number("1"), number("2")]));

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(checker.variable_type_string(v).as_deref(), Some("double"));
}

#[test]
fn test_if_condition_must_be_logical() {
    //  if true() ... end
    let mut builder = ProgramBuilder::new();
    let condition = builder.call("true", vec![]);
    builder.push(mtx_hir::Stmt::If {
        branches: vec![mtx_hir::IfBranch {
            token: tok("if"),
            condition,
            block: mtx_hir::Block::default(),
        }],
        else_block: None,
    });

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
}

#[test]
fn test_for_loop_variable_binds_to_iterated_expression() {
    //  for i = 1; end
    let mut builder = ProgramBuilder::new();
    let i = builder.var("i");
    builder.push(mtx_hir::Stmt::For {
        token: tok("for"),
        loop_variable: i,
        expr: number("1"),
        body: mtx_hir::Block::default(),
    });

    let (checker, _hir) = check(builder);
    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(checker.variable_type_string(i).as_deref(), Some("double"));
}

#[test]
fn test_switch_cases_equate_with_condition() {
    //  x = 1; switch x; case 2 ...; case 'c' ...; end
    let mut builder = ProgramBuilder::new();
    let x = builder.assign("x", number("1"));
    builder.push(mtx_hir::Stmt::Switch {
        token: tok("switch"),
        condition: var_ref(x, "x"),
        cases: vec![
            mtx_hir::SwitchCase {
                token: tok("case"),
                expr: number("2"),
                block: mtx_hir::Block::default(),
            },
            mtx_hir::SwitchCase {
                token: tok("case"),
                expr: char_lit("c"),
                block: mtx_hir::Block::default(),
            },
        ],
        otherwise: None,
    });

    let (checker, _hir) = check(builder);
    //  The char case cannot match the double condition.
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
fn test_polymorphic_local_function() {
    //  function y = id(a); y = a; end -- registered polymorphic
    //  p = id(1); q = id('c')
    let mut builder = ProgramBuilder::new();
    let id = builder.function_def("id", &["a"], &["y"], |_b, parts| {
        vec![mtx_hir::Stmt::Assignment {
            token: tok("="),
            to: var_ref(parts.outputs[0], "y"),
            of: var_ref(parts.inputs[0], "a"),
        }]
    });
    let call_p = builder.call_local(id, "id", vec![number("1")]);
    let p = builder.assign("p", call_p);
    let call_q = builder.call_local(id, "id", vec![char_lit("c")]);
    let q = builder.assign("q", call_q);

    let (hir, root) = builder.finish();
    let search_path = mtx_hir::SearchPath::new();
    let mut checker = mtx_typechecker::TypeChecker::new();
    {
        let mut generator = checker.generator(&hir);
        generator.push_polymorphic_functions();
        generator.root_block(&root);
        generator.pop_polymorphic_functions();
    }
    checker.solve(&hir, &search_path);

    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(checker.variable_type_string(p).as_deref(), Some("double"));
    assert_eq!(checker.variable_type_string(q).as_deref(), Some("char"));

    let id_ty = checker.function_type_string(id).unwrap();
    assert!(id_ty.starts_with("forall"), "id: {}", id_ty);
}
