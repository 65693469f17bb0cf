//! Properties of the equivalence and subtype relations.

use mtx_typechecker::TypeChecker;
use mtx_typechecker::relate::{EquivalenceRelation, SubtypeRelation, TypeRelation};
use mtx_typechecker::types::{TypeEquation, TypeEquationTerm, TypeId, Usage};

use mtx_hir::SearchPath;

fn session() -> TypeChecker {
    TypeChecker::new()
}

#[test]
fn test_equivalence_is_reflexive_symmetric_transitive() {
    let mut checker = session();
    let double = checker.library.double_type;
    let char_t = checker.library.char_type;

    let a = checker.store.make_rvalue_destructured_tuple(vec![double, char_t]);
    let b = checker.store.make_rvalue_destructured_tuple(vec![double, char_t]);
    let c = checker.store.make_rvalue_destructured_tuple(vec![double, char_t]);

    let other = checker.store.make_rvalue_destructured_tuple(vec![char_t, double]);

    let relation = TypeRelation::new(EquivalenceRelation, &checker.store);
    //  Reflexive.
    assert!(relation.related_entry(a, a));
    //  Symmetric.
    assert!(relation.related_entry(a, b));
    assert!(relation.related_entry(b, a));
    //  Transitive.
    assert!(relation.related_entry(b, c));
    assert!(relation.related_entry(a, c));

    assert!(!relation.related_entry(a, other));
}

#[rstest::rstest]
#[case("double", "double", true)]
#[case("sub-double", "double", true)]
#[case("sub-sub-double", "sub-double", true)]
#[case("sub-sub-double", "double", true)]
#[case("double", "sub-double", false)]
#[case("double", "sub-sub-double", false)]
#[case("char", "double", false)]
fn test_subtype_lattice(#[case] lhs: &str, #[case] rhs: &str, #[case] expected: bool) {
    let checker = session();
    let scalar = |name: &str| match name {
        "double" => checker.library.double_type,
        "sub-double" => checker.library.sub_double_type,
        "sub-sub-double" => checker.library.sub_sub_double_type,
        "char" => checker.library.char_type,
        _ => unreachable!(),
    };

    let relation = TypeRelation::new(
        SubtypeRelation::new(&checker.library),
        &checker.store,
    );
    assert_eq!(relation.related_entry(scalar(lhs), scalar(rhs)), expected);
}

#[test]
fn test_destructured_tuple_expansion_is_associative() {
    //  DT(r, [DT(r, [x, y]), z]) == DT(r, [x, y, z])
    let mut checker = session();
    let x = checker.library.double_type;
    let y = checker.library.char_type;
    let z = checker.library.string_type;

    let inner = checker.store.make_rvalue_destructured_tuple(vec![x, y]);
    let nested = checker.store.make_rvalue_destructured_tuple(vec![inner, z]);
    let flat = checker.store.make_rvalue_destructured_tuple(vec![x, y, z]);

    let relation = TypeRelation::new(EquivalenceRelation, &checker.store);
    assert!(relation.related_entry(nested, flat));
    assert!(relation.related_entry(flat, nested));
}

#[test]
fn test_outputs_collapse_in_value_position() {
    //  DT(outputs, [x, y]) matched against a single-slot value peer takes
    //  only its first member.
    let mut checker = session();
    let x = checker.library.double_type;
    let y = checker.library.char_type;

    let outputs = checker
        .store
        .make_destructured_tuple(Usage::DefinitionOutputs, vec![x, y]);
    let value = checker.store.make_rvalue_destructured_tuple(vec![x]);

    let wrong_value = checker.store.make_rvalue_destructured_tuple(vec![y]);

    let relation = TypeRelation::new(EquivalenceRelation, &checker.store);
    assert!(relation.related_entry(outputs, value));
    assert!(relation.related_entry(value, outputs));

    assert!(!relation.related_entry(outputs, wrong_value));
}

#[test]
fn test_list_absorbs_trailing_members() {
    //  DT(r, [a, b, list<c>]) matches DT(r, [a, b, c, c, c]) for any
    //  non-negative count of trailing members.
    let mut checker = session();
    let a = checker.library.double_type;
    let b = checker.library.char_type;
    let c = checker.library.string_type;

    let tail = checker.store.make_list(vec![c]);
    let pattern = checker
        .store
        .make_rvalue_destructured_tuple(vec![a, b, tail]);

    let relation_peer = |checker: &mut TypeChecker, count: usize| {
        let mut members = vec![a, b];
        members.extend(std::iter::repeat_n(c, count));
        checker.store.make_rvalue_destructured_tuple(members)
    };

    for count in [0usize, 1, 3] {
        let peer = relation_peer(&mut checker, count);
        let relation = TypeRelation::new(EquivalenceRelation, &checker.store);
        assert!(
            relation.related_entry(pattern, peer),
            "count {count} should absorb"
        );
    }

    let bad_peer = {
        let mut members = vec![a, b];
        members.push(checker.library.double_type);
        checker.store.make_rvalue_destructured_tuple(members)
    };
    let relation = TypeRelation::new(EquivalenceRelation, &checker.store);
    assert!(!relation.related_entry(pattern, bad_peer));
}

#[test]
fn test_union_subsumption() {
    let mut checker = session();
    let double = checker.library.double_type;
    let char_t = checker.library.char_type;
    let string = checker.library.string_type;

    let smaller = checker.store.make_union(vec![double, char_t]);
    let larger = checker.store.make_union(vec![char_t, string, double]);

    let relation = TypeRelation::new(EquivalenceRelation, &checker.store);
    assert!(relation.related_entry(smaller, larger));
    assert!(!relation.related_entry(larger, smaller));

    //  Duplicate members coalesce before comparison.
    let duplicated = checker.store.make_union(vec![double, double, char_t]);
    let plain = checker.store.make_union(vec![char_t, double]);
    let relation = TypeRelation::new(EquivalenceRelation, &checker.store);
    assert!(relation.related_entry(duplicated, plain));
    assert!(relation.related_entry(plain, duplicated));
}

#[test]
fn test_variables_relate_to_anything() {
    let mut checker = session();
    let var = checker.store.make_fresh_variable();
    let double = checker.library.double_type;
    let tuple = checker.store.make_tuple(vec![double]);

    let relation = TypeRelation::new(EquivalenceRelation, &checker.store);
    assert!(relation.related_entry(var, double));
    assert!(relation.related_entry(tuple, var));
}

#[test]
fn test_occurs_check_rejects_infinite_types() {
    //  X = {X} is rejected.
    let mut checker = session();
    let var = checker.store.make_fresh_variable();
    let tuple = checker.store.make_tuple(vec![var]);

    checker.substitution.push_type_equation(TypeEquation::new(
        TypeEquationTerm::new(None, var),
        TypeEquationTerm::new(None, tuple),
    ));

    let hir = mtx_hir::Hir::new();
    let search_path = SearchPath::new();
    checker.solve(&hir, &search_path);

    assert!(
        checker
            .errors()
            .iter()
            .any(|e| matches!(e, mtx_typechecker::TypeError::OccursCheckFailure { .. })),
        "{:?}",
        checker.errors()
    );
}

#[test]
fn test_trivial_self_equation_is_fine() {
    let mut checker = session();
    let var: TypeId = checker.store.make_fresh_variable();

    checker.substitution.push_type_equation(TypeEquation::new(
        TypeEquationTerm::new(None, var),
        TypeEquationTerm::new(None, var),
    ));

    let hir = mtx_hir::Hir::new();
    let search_path = SearchPath::new();
    checker.solve(&hir, &search_path);
    assert!(checker.errors().is_empty());
}
