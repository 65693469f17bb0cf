//! Resolved program representation for the mtx array language.
//!
//! This crate holds everything the type checker consumes: interned
//! identifiers, source tokens, the definition store (functions, variables,
//! classes, classified references), lexical scopes, the resolved syntax
//! tree, and the function search path. Scanning and parsing live in a
//! separate front end; producers of this representation are expected to
//! have already classified every identifier reference into a variable,
//! local function, or external function with a stable handle.

mod ast;
mod def;
mod error;
mod hir;
mod ident;
mod scope;
mod search_path;
mod source;

pub use ast::{
    BinaryOperator, Block, ClassDefNode, ConcatenationDirection, Expr, FunctionDefNode,
    GroupingMethod, IfBranch, Node, PropertyNode, RootBlock, Stmt, SubscriptArg, SubscriptMethod,
    SwitchCase, UnaryOperator,
};
pub use def::{
    ClassDef, ClassDefId, FunctionAttributes, FunctionDef, FunctionDefId, FunctionReference,
    FunctionRefId, Param, VariableDef, VariableDefId,
};
pub use error::HirError;
pub use hir::Hir;
pub use ident::Ident;
pub use scope::{Scope, ScopeId};
pub use search_path::{Candidate, CandidateId, SearchPath};
pub use source::{SourceFile, SourceId, SourceMap, Token};
