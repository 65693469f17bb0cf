//! Constraint-based type inference for the mtx array language.
//!
//! The checker consumes a resolved program (`mtx_hir::Hir` plus one
//! `RootBlock` per file) and infers types by generating type equations
//! and solving them with a unifier extended with subtyping, row-typed
//! records, destructured tuples, variadic list patterns, and subscript
//! overloading. Functions that resolve to files on the search path are
//! checked on demand: the unifier records a pending candidate and binds
//! a stand-in variable, and the driver re-runs generation and
//! unification until no new candidates appear.

use std::path::PathBuf;

use miette::Diagnostic;
use rustc_hash::FxHashSet;
use thiserror::Error;

use mtx_hir::{Candidate, CandidateId, Hir, Ident, RootBlock, SearchPath, Token, VariableDefId};

pub mod builtin;
pub mod constraint;
pub mod display;
pub mod library;
pub mod pending;
pub mod properties;
pub mod relate;
pub mod store;
pub mod substitution;
pub mod types;

mod instantiate;
mod member_visitor;
mod simplify;
mod subscript;
mod unify;

use constraint::ConstraintGenerator;
use display::TypeWriter;
use library::Library;
use pending::PendingExternalFunctions;
use store::TypeStore;
use substitution::Substitution;
use types::{TypeEquation, TypeEquationTerm, TypeId};
use unify::{Unifier, UnifierState};

/// Type checking errors. Every variant carries the source token(s) of the
/// equation it arose from, so a renderer can point at the cause.
#[derive(Debug, Error, Diagnostic)]
pub enum TypeError {
    #[error("Cannot unify {lhs} with {rhs}")]
    #[diagnostic(code(typechecker::simplification_failure))]
    SimplificationFailure {
        lhs: String,
        rhs: String,
        lhs_token: Option<Token>,
        rhs_token: Option<Token>,
    },

    #[error("Occurs check failed: {variable} occurs in {ty}")]
    #[diagnostic(code(typechecker::occurs_check))]
    OccursCheckFailure {
        variable: String,
        ty: String,
        lhs_token: Option<Token>,
        rhs_token: Option<Token>,
    },

    #[error("Unresolved function: {function}")]
    #[diagnostic(code(typechecker::unresolved_function))]
    UnresolvedFunction {
        function: String,
        token: Option<Token>,
    },

    #[error("Invalid function invocation: {function}")]
    #[diagnostic(code(typechecker::invalid_function_invocation))]
    InvalidFunctionInvocation {
        function: String,
        token: Option<Token>,
    },

    #[error("Field reference is not a compile-time constant: {argument}")]
    #[diagnostic(code(typechecker::non_constant_field_reference))]
    NonConstantFieldReferenceExpr {
        argument: String,
        token: Option<Token>,
    },

    #[error("No field `{field}` in {argument}")]
    #[diagnostic(code(typechecker::nonexistent_field_reference))]
    NonexistentFieldReference {
        argument: String,
        field: String,
        token: Option<Token>,
    },

    #[error("Custom subscripts are not handled for {argument}")]
    #[diagnostic(code(typechecker::unhandled_custom_subscripts))]
    UnhandledCustomSubscripts {
        argument: String,
        token: Option<Token>,
    },
}

impl TypeError {
    /// The token this error should be reported at.
    pub fn source_token(&self) -> Option<&Token> {
        match self {
            TypeError::SimplificationFailure {
                lhs_token,
                rhs_token,
                ..
            }
            | TypeError::OccursCheckFailure {
                lhs_token,
                rhs_token,
                ..
            } => lhs_token.as_ref().or(rhs_token.as_ref()),
            TypeError::UnresolvedFunction { token, .. }
            | TypeError::InvalidFunctionInvocation { token, .. }
            | TypeError::NonConstantFieldReferenceExpr { token, .. }
            | TypeError::NonexistentFieldReference { token, .. }
            | TypeError::UnhandledCustomSubscripts { token, .. } => token.as_ref(),
        }
    }

    pub fn location(&self) -> Option<(u32, u32)> {
        self.source_token().map(|token| (token.line, token.column))
    }
}

/// Supplies resolved trees for files discovered on the search path. The
/// front end (scanner + parser + identifier classification) sits behind
/// this trait; a loader that returns `None` marks the file as failed and
/// checking proceeds with the remaining entry points.
pub trait FileLoader {
    fn load(&mut self, hir: &mut Hir, candidate: &Candidate) -> Option<RootBlock>;
}

/// Type checker for mtx programs.
///
/// Owns the type store, the library, the substitution, and the pending
/// external function set for one checking session.
pub struct TypeChecker {
    pub store: TypeStore,
    pub library: Library,
    pub substitution: Substitution,
    pub pending: PendingExternalFunctions,
    unifier_state: UnifierState,
    errors: Vec<TypeError>,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// `capacity` reserves space in the type store up front.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut store = if capacity > 0 {
            TypeStore::with_capacity(capacity)
        } else {
            TypeStore::new()
        };
        let mut library = Library::new(&mut store);
        builtin::install(&mut library, &mut store);

        Self {
            store,
            library,
            substitution: Substitution::new(),
            pending: PendingExternalFunctions::new(),
            unifier_state: UnifierState::default(),
            errors: Vec::new(),
        }
    }

    /// A constraint generator over this session's store and library. Use
    /// this directly to toggle generation state (e.g. polymorphic
    /// function definitions) before walking a root block.
    pub fn generator<'s>(&'s mut self, hir: &'s Hir) -> ConstraintGenerator<'s> {
        ConstraintGenerator::new(
            &mut self.substitution,
            &mut self.store,
            &mut self.library,
            hir,
        )
    }

    pub fn generate(&mut self, hir: &Hir, root: &RootBlock) {
        self.generator(hir).root_block(root);
    }

    /// Runs the unifier over all queued equations, accumulating errors.
    pub fn solve(&mut self, hir: &Hir, search_path: &SearchPath) {
        let unifier = Unifier::new(
            &mut self.store,
            &self.library,
            hir,
            search_path,
            &mut self.substitution,
            &mut self.pending,
            &mut self.unifier_state,
        );
        let errors = unifier.run();
        self.errors.extend(errors);
    }

    /// Generates constraints for `root` and solves them.
    pub fn check(&mut self, hir: &Hir, search_path: &SearchPath, root: &RootBlock) -> &[TypeError] {
        self.generate(hir, root);
        self.solve(hir, search_path);
        self.errors()
    }

    /// Registers an entry identifier by locating it on the search path
    /// and creating its pending stand-in.
    pub fn locate_entry(&mut self, search_path: &SearchPath, name: Ident) -> Option<CandidateId> {
        let candidate = search_path.search_for(name, None)?;
        let stand_in = self.pending.require_candidate_type(candidate, &mut self.store);
        self.pending.add_candidate(candidate, stand_in);
        Some(candidate)
    }

    /// Checks the given roots and then drives external-function discovery
    /// to a fixed point: each unvisited candidate file is loaded, its
    /// constraints generated, its top-level function linked to the
    /// candidate's stand-in variable, and the unifier re-run. Terminates
    /// when a pass produces no new candidates.
    pub fn check_with_loader(
        &mut self,
        hir: &mut Hir,
        search_path: &SearchPath,
        roots: &[RootBlock],
        loader: &mut dyn FileLoader,
    ) -> &[TypeError] {
        for root in roots {
            self.generate(hir, root);
        }

        let mut visited: FxHashSet<PathBuf> = FxHashSet::default();

        loop {
            self.solve(hir, search_path);

            let unvisited: Vec<CandidateId> = self
                .pending
                .candidates
                .keys()
                .copied()
                .filter(|&id| !visited.contains(&search_path.candidate(id).defining_file))
                .collect();

            if unvisited.is_empty() {
                break;
            }

            for candidate_id in unvisited {
                let candidate = search_path.candidate(candidate_id).clone();
                visited.insert(candidate.defining_file.clone());

                let Some(root) = loader.load(hir, &candidate) else {
                    continue;
                };
                self.generate(hir, &root);
                self.link_top_level_function(hir, search_path, &candidate, &root);
            }
        }

        self.errors()
    }

    /// Links the checked file's top-level function type to the stand-in
    /// variable of its own candidate.
    fn link_top_level_function(
        &mut self,
        hir: &Hir,
        search_path: &SearchPath,
        candidate: &Candidate,
        root: &RootBlock,
    ) {
        let Some(top) = root.top_level_function_def() else {
            return;
        };
        let Some(func_ty) = self.library.lookup_local_function(top.def) else {
            return;
        };

        let def = hir.function(top.def);
        let from_directory = candidate.defining_file.parent();
        if let Some(found) = search_path.search_for(def.name, from_directory)
            && self.pending.has_candidate(found)
        {
            let stand_in = self.pending.candidates[&found];
            let token = def.name_token.clone();
            self.substitution.push_type_equation(TypeEquation::new(
                TypeEquationTerm::new(Some(&token), func_ty),
                TypeEquationTerm::new(Some(&token), stand_in),
            ));
        }
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<TypeError> {
        std::mem::take(&mut self.errors)
    }

    /// The (possibly solved) type bound to a variable definition.
    pub fn variable_type(&self, def: VariableDefId) -> Option<TypeId> {
        let ty = *self.library.local_variable_types.get(&def)?;
        Some(self.substitution.bound_type(ty).unwrap_or(ty))
    }

    pub fn variable_type_string(&self, def: VariableDefId) -> Option<String> {
        Some(self.type_string(self.variable_type(def)?))
    }

    pub fn function_type_string(&self, def: mtx_hir::FunctionDefId) -> Option<String> {
        let ty = self.library.lookup_local_function(def)?;
        Some(self.type_string(ty))
    }

    pub fn type_string(&self, id: TypeId) -> String {
        TypeWriter::new(&self.store, &self.library).write(id)
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_construction_installs_builtins() {
        let checker = TypeChecker::new();
        assert!(!checker.store.is_empty());
        assert!(
            checker
                .library
                .lookup_function(&types::Header::Function(Ident::new("sum")))
                .is_some()
        );
        assert!(checker.errors().is_empty());
    }
}
