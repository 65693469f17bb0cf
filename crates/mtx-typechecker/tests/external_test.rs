//! External-function discovery driven to a fixed point through a loader.

mod common;

use std::path::PathBuf;

use common::*;
use mtx_hir::{
    BinaryOperator, Block, Candidate, FunctionAttributes, FunctionDef, FunctionReference, Hir,
    Ident, Node, Param, RootBlock, SearchPath, Stmt,
};
use mtx_typechecker::{FileLoader, TypeChecker};

/// Serves `function y = twice(a); y = a + a; end` for the `twice`
/// candidate and nothing else.
struct TwiceLoader {
    loads: usize,
}

impl FileLoader for TwiceLoader {
    fn load(&mut self, hir: &mut Hir, candidate: &Candidate) -> Option<RootBlock> {
        if candidate.name != Ident::new("twice") {
            return None;
        }
        self.loads += 1;

        let root_scope = hir.add_scope(None);
        let fn_scope = hir.add_scope(Some(root_scope));
        let a = hir.declare_variable(fn_scope, Ident::new("a"));
        let y = hir.declare_variable(fn_scope, Ident::new("y"));

        let def = hir.add_function(FunctionDef {
            name: Ident::new("twice"),
            inputs: vec![Param::named(Ident::new("a"))],
            outputs: vec![Param::named(Ident::new("y"))],
            attributes: FunctionAttributes::default(),
            name_token: tok("twice"),
        });
        let reference = hir.add_reference(FunctionReference::local(Ident::new("twice"), def));

        let body = Block::new(vec![Node::Stmt(Stmt::Assignment {
            token: tok("="),
            to: var_ref(y, "y"),
            of: binop(BinaryOperator::Plus, var_ref(a, "a"), var_ref(a, "a")),
        })]);

        Some(RootBlock {
            scope: root_scope,
            source: None,
            block: Block::new(vec![Node::FunctionDef(mtx_hir::FunctionDefNode {
                def,
                reference,
                scope: fn_scope,
                body: Some(body),
                source_token: tok("twice"),
            })]),
        })
    }
}

#[test]
fn test_external_function_fixpoint() {
    //  w = twice(3), with twice living on the search path.
    let mut search_path = SearchPath::new();
    search_path.add_candidate(Ident::new("twice"), PathBuf::from("lib/twice.m"));

    let mut builder = ProgramBuilder::new();
    let call = builder.call("twice", vec![number("3")]);
    let w = builder.assign("w", call);
    let (mut hir, root) = builder.finish();

    let mut checker = TypeChecker::new();
    let mut loader = TwiceLoader { loads: 0 };
    checker.check_with_loader(&mut hir, &search_path, &[root], &mut loader);

    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(loader.loads, 1, "each candidate file is checked once");
    assert_eq!(checker.pending.len(), 1);
    assert_eq!(checker.variable_type_string(w).as_deref(), Some("double"));
}

#[test]
fn test_failed_load_does_not_abort_checking() {
    //  v = other(1): the candidate exists but the loader cannot produce a
    //  tree for it; checking terminates with the stand-in unresolved.
    let mut search_path = SearchPath::new();
    search_path.add_candidate(Ident::new("other"), PathBuf::from("lib/other.m"));

    let mut builder = ProgramBuilder::new();
    let call = builder.call("other", vec![number("1")]);
    let x = builder.assign("x", call);
    let (mut hir, root) = builder.finish();

    let mut checker = TypeChecker::new();
    let mut loader = TwiceLoader { loads: 0 };
    checker.check_with_loader(&mut hir, &search_path, &[root], &mut loader);

    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(loader.loads, 0);
    //  The call result stays unsolved rather than erroring.
    assert!(checker.variable_type_string(x).is_some());
}

#[test]
fn test_locate_entry_creates_stand_in() {
    let mut search_path = SearchPath::new();
    let candidate = search_path.add_candidate(Ident::new("twice"), PathBuf::from("lib/twice.m"));

    let mut checker = TypeChecker::new();
    let located = checker.locate_entry(&search_path, Ident::new("twice"));
    assert_eq!(located, Some(candidate));
    assert!(checker.pending.has_candidate(candidate));

    assert_eq!(checker.locate_entry(&search_path, Ident::new("missing")), None);
}

#[test]
fn test_entry_checked_through_loader() {
    //  No root program at all: the entry identifier alone pulls the file
    //  in and checks it.
    let mut search_path = SearchPath::new();
    search_path.add_candidate(Ident::new("twice"), PathBuf::from("lib/twice.m"));

    let mut hir = Hir::new();
    let mut checker = TypeChecker::new();
    checker.locate_entry(&search_path, Ident::new("twice"));

    let mut loader = TwiceLoader { loads: 0 };
    checker.check_with_loader(&mut hir, &search_path, &[], &mut loader);

    assert!(checker.errors().is_empty(), "{:?}", checker.errors());
    assert_eq!(loader.loads, 1);
}
