//! Shared helpers for building resolved programs by hand.

#![allow(dead_code)]

use mtx_hir::{
    BinaryOperator, Block, Expr, FunctionAttributes, FunctionDef, FunctionDefId, FunctionRefId,
    FunctionReference, GroupingMethod, Hir, Ident, Node, Param, RootBlock, ScopeId, SearchPath,
    Stmt, SubscriptArg, SubscriptMethod, Token, UnaryOperator, VariableDefId,
};
use mtx_typechecker::TypeChecker;

pub fn tok(text: &str) -> Token {
    Token::synthetic(text)
}

pub fn number(text: &str) -> Expr {
    Expr::Number { token: tok(text) }
}

pub fn char_lit(text: &str) -> Expr {
    Expr::Char { token: tok(text) }
}

pub fn string_lit(text: &str) -> Expr {
    Expr::String { token: tok(text) }
}

pub fn var_ref(def: VariableDefId, name: &str) -> Expr {
    Expr::VariableReference {
        token: tok(name),
        def,
        subscripts: Vec::new(),
    }
}

pub fn var_sub(def: VariableDefId, name: &str, subscripts: Vec<SubscriptArg>) -> Expr {
    Expr::VariableReference {
        token: tok(name),
        def,
        subscripts,
    }
}

pub fn parens_sub(arguments: Vec<Expr>) -> SubscriptArg {
    SubscriptArg::new(SubscriptMethod::Parens, arguments)
}

pub fn brace_sub(arguments: Vec<Expr>) -> SubscriptArg {
    SubscriptArg::new(SubscriptMethod::Brace, arguments)
}

pub fn period_sub(field: &str) -> SubscriptArg {
    SubscriptArg::new(
        SubscriptMethod::Period,
        vec![Expr::LiteralFieldReference {
            token: tok(field),
            field: Ident::new(field),
        }],
    )
}

pub fn binop(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        token: tok(op.symbol()),
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn unop(op: UnaryOperator, expr: Expr) -> Expr {
    Expr::UnaryOp {
        token: tok(op.symbol()),
        op,
        expr: Box::new(expr),
    }
}

pub fn brace_group(components: Vec<Expr>) -> Expr {
    Expr::Grouping {
        token: tok("{"),
        method: GroupingMethod::Brace,
        components,
    }
}

pub fn bracket_group(components: Vec<Expr>) -> Expr {
    Expr::Grouping {
        token: tok("["),
        method: GroupingMethod::Bracket,
        components,
    }
}

pub fn parens_group(components: Vec<Expr>) -> Expr {
    Expr::Grouping {
        token: tok("("),
        method: GroupingMethod::Parens,
        components,
    }
}

/// The scope and parameter bindings of a function definition under
/// construction.
pub struct FnParts {
    pub scope: ScopeId,
    pub inputs: Vec<VariableDefId>,
    pub outputs: Vec<VariableDefId>,
}

/// Builds one resolved file: a flat root scope plus its statement list.
pub struct ProgramBuilder {
    pub hir: Hir,
    pub scope: ScopeId,
    nodes: Vec<Node>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        let mut hir = Hir::new();
        let scope = hir.add_scope(None);
        Self {
            hir,
            scope,
            nodes: Vec::new(),
        }
    }

    pub fn var(&mut self, name: &str) -> VariableDefId {
        self.hir.declare_variable(self.scope, Ident::new(name))
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.nodes.push(Node::Stmt(stmt));
    }

    pub fn expr_stmt(&mut self, expr: Expr) {
        self.push(Stmt::Expr(expr));
    }

    /// `name = of`, declaring `name` in the root scope.
    pub fn assign(&mut self, name: &str, of: Expr) -> VariableDefId {
        let def = self.var(name);
        self.assign_to(var_ref(def, name), of);
        def
    }

    pub fn assign_to(&mut self, to: Expr, of: Expr) {
        self.push(Stmt::Assignment {
            token: tok("="),
            to,
            of,
        });
    }

    pub fn external_ref(&mut self, name: &str) -> FunctionRefId {
        self.hir
            .add_reference(FunctionReference::external(Ident::new(name), None))
    }

    /// A call through an external (search-path or builtin) reference.
    pub fn call(&mut self, name: &str, args: Vec<Expr>) -> Expr {
        let reference = self.external_ref(name);
        Expr::FunctionCall {
            token: tok(name),
            reference,
            args,
        }
    }

    /// A call bound to a local function definition.
    pub fn call_local(&mut self, def: FunctionDefId, name: &str, args: Vec<Expr>) -> Expr {
        let reference = self
            .hir
            .add_reference(FunctionReference::local(Ident::new(name), def));
        Expr::FunctionCall {
            token: tok(name),
            reference,
            args,
        }
    }

    /// `@name` referencing an external function.
    pub fn func_handle(&mut self, name: &str) -> Expr {
        let reference = self.external_ref(name);
        Expr::FunctionReference {
            token: tok(name),
            reference,
        }
    }

    /// `@(params) body`, with the body built against the lambda's scope.
    pub fn lambda(
        &mut self,
        params: &[&str],
        body: impl FnOnce(&mut Self, &[VariableDefId]) -> Expr,
    ) -> Expr {
        let scope = self.hir.add_scope(Some(self.scope));
        let defs: Vec<VariableDefId> = params
            .iter()
            .map(|param| self.hir.declare_variable(scope, Ident::new(param)))
            .collect();
        let body_expr = body(self, &defs);
        Expr::AnonymousFunction {
            token: tok("@"),
            scope,
            inputs: defs.iter().map(|def| Some(*def)).collect(),
            body: Box::new(body_expr),
        }
    }

    /// Builds a function node without pushing it into the root block.
    pub fn make_function_node(
        &mut self,
        name: &str,
        inputs: &[&str],
        outputs: &[&str],
        attributes: FunctionAttributes,
        body: impl FnOnce(&mut Self, &FnParts) -> Vec<Stmt>,
    ) -> mtx_hir::FunctionDefNode {
        let scope = self.hir.add_scope(Some(self.scope));
        let input_defs: Vec<VariableDefId> = inputs
            .iter()
            .map(|input| self.hir.declare_variable(scope, Ident::new(input)))
            .collect();
        let output_defs: Vec<VariableDefId> = outputs
            .iter()
            .map(|output| self.hir.declare_variable(scope, Ident::new(output)))
            .collect();

        let def = self.hir.add_function(FunctionDef {
            name: Ident::new(name),
            inputs: inputs.iter().map(|i| Param::named(Ident::new(i))).collect(),
            outputs: outputs
                .iter()
                .map(|o| Param::named(Ident::new(o)))
                .collect(),
            attributes,
            name_token: tok(name),
        });
        let reference = self
            .hir
            .add_reference(FunctionReference::local(Ident::new(name), def));

        let parts = FnParts {
            scope,
            inputs: input_defs,
            outputs: output_defs,
        };
        let stmts = body(self, &parts);
        let block = Block::new(stmts.into_iter().map(Node::Stmt).collect());

        mtx_hir::FunctionDefNode {
            def,
            reference,
            scope,
            body: Some(block),
            source_token: tok(name),
        }
    }

    /// `function [outputs] = name(inputs); body; end`
    pub fn function_def(
        &mut self,
        name: &str,
        inputs: &[&str],
        outputs: &[&str],
        body: impl FnOnce(&mut Self, &FnParts) -> Vec<Stmt>,
    ) -> FunctionDefId {
        let node =
            self.make_function_node(name, inputs, outputs, FunctionAttributes::default(), body);
        let def = node.def;
        self.nodes.push(Node::FunctionDef(node));
        def
    }

    /// `classdef name ... end` with the given properties and methods.
    pub fn class_def(
        &mut self,
        name: &str,
        properties: &[&str],
        methods: Vec<mtx_hir::FunctionDefNode>,
    ) -> mtx_hir::ClassDefId {
        let def = self.hir.add_class(mtx_hir::ClassDef {
            name: Ident::new(name),
            superclasses: Vec::new(),
            properties: properties.iter().map(|p| Ident::new(p)).collect(),
        });
        self.nodes.push(Node::ClassDef(mtx_hir::ClassDefNode {
            def,
            properties: properties
                .iter()
                .map(|p| mtx_hir::PropertyNode {
                    name: Ident::new(p),
                    initializer: None,
                    source_token: tok(p),
                })
                .collect(),
            methods,
            source_token: tok(name),
        }));
        def
    }

    pub fn finish(self) -> (Hir, RootBlock) {
        let root = RootBlock {
            scope: self.scope,
            source: None,
            block: Block::new(self.nodes),
        };
        (self.hir, root)
    }
}

/// Checks the built program against an empty search path.
pub fn check(builder: ProgramBuilder) -> (TypeChecker, Hir) {
    let (hir, root) = builder.finish();
    let search_path = SearchPath::new();
    let mut checker = TypeChecker::new();
    checker.check(&hir, &search_path, &root);
    (checker, hir)
}
