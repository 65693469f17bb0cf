//! The main unification loop.
//!
//! Equations are drained in order from the substitution's queue. Applying
//! a side folds away solved variables and expanded parameter packs in
//! place; binding a variable rewrites every previously bound right-hand
//! term, which is also the moment pending abstractions, applications,
//! assignments, and subscripts are re-examined for resolution.

use rustc_hash::{FxHashMap, FxHashSet};

use mtx_hir::{Hir, SearchPath, Token};

use crate::TypeError;
use crate::display::TypeWriter;
use crate::instantiate::{self, InstanceVars};
use crate::library::Library;
use crate::pending::PendingExternalFunctions;
use crate::properties::{are_concrete_arguments, is_concrete_argument};
use crate::relate::{EquivalenceRelation, TypeRelation};
use crate::store::TypeStore;
use crate::substitution::Substitution;
use crate::types::{Term, TypeEquation, TypeEquationTerm, TypeId};

/// Unifier bookkeeping that must survive across unify passes of one
/// checking session.
#[derive(Debug, Default)]
pub(crate) struct UnifierState {
    pub registered_funcs: FxHashSet<TypeId>,
    pub registered_assignments: FxHashSet<TypeId>,
    pub expanded_parameters: FxHashMap<TypeId, TypeId>,
}

pub(crate) struct Unifier<'a> {
    pub store: &'a mut TypeStore,
    pub library: &'a Library,
    pub hir: &'a Hir,
    pub search_path: &'a SearchPath,
    pub substitution: &'a mut Substitution,
    pub pending: &'a mut PendingExternalFunctions,
    pub state: &'a mut UnifierState,
    pub errors: Vec<TypeError>,
    pub any_failures: bool,
    pub(crate) lhs_source_token: Option<Token>,
    pub(crate) rhs_source_token: Option<Token>,
}

impl<'a> Unifier<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: &'a mut TypeStore,
        library: &'a Library,
        hir: &'a Hir,
        search_path: &'a SearchPath,
        substitution: &'a mut Substitution,
        pending: &'a mut PendingExternalFunctions,
        state: &'a mut UnifierState,
    ) -> Self {
        Self {
            store,
            library,
            hir,
            search_path,
            substitution,
            pending,
            state,
            errors: Vec::new(),
            any_failures: false,
            lhs_source_token: None,
            rhs_source_token: None,
        }
    }

    /// Drains the equation queue, returning the errors of this pass.
    pub fn run(mut self) -> Vec<TypeError> {
        while self.substitution.equation_index < self.substitution.num_type_equations() {
            let eq = self.substitution.type_equations[self.substitution.equation_index].clone();
            self.substitution.equation_index += 1;
            self.unify_one(eq);
        }
        self.errors
    }

    fn unify_one(&mut self, eq: TypeEquation) {
        let mut lhs = eq.lhs;
        let mut rhs = eq.rhs;

        lhs.term = self.apply_to(lhs.term, &lhs.clone());
        rhs.term = self.apply_to(rhs.term, &rhs.clone());

        if lhs.term == rhs.term {
            return;
        }

        let lhs_is_variable = self.store.get(lhs.term).is_variable();
        let rhs_is_variable = self.store.get(rhs.term).is_variable();

        if !lhs_is_variable && !rhs_is_variable {
            if !self.simplify_entry(&lhs, &rhs) {
                self.any_failures = true;
            }
            return;
        } else if !lhs_is_variable {
            std::mem::swap(&mut lhs, &mut rhs);
        }

        if self.occurs(rhs.term, lhs.term) {
            let variable = self.describe(lhs.term);
            let ty = self.describe(rhs.term);
            self.errors.push(TypeError::OccursCheckFailure {
                variable,
                ty,
                lhs_token: lhs.source_token.clone(),
                rhs_token: rhs.source_token.clone(),
            });
            return;
        }

        //  Rewrite every bound right-hand term with the new binding.
        let bound: Vec<TypeId> = self.substitution.bound_terms.keys().copied().collect();
        for key in bound {
            let mut entry = self.substitution.bound_terms[&key].clone();
            let entry_ref = entry.clone();
            entry.term = self.substitute_one(entry.term, &entry_ref, lhs.term, rhs.term);
            self.substitution.bound_terms.insert(key, entry);
        }

        self.substitution.bound_terms.insert(lhs.term, rhs);
    }

    /*
     * apply
     */

    pub(crate) fn apply_to(&mut self, source: TypeId, term: &TypeEquationTerm) -> TypeId {
        match self.store.get(source).clone() {
            Term::Variable(_) => self
                .substitution
                .bound_terms
                .get(&source)
                .map(|bound| bound.term)
                .unwrap_or(source),
            Term::Parameters(_) => self
                .state
                .expanded_parameters
                .get(&source)
                .copied()
                .unwrap_or(source),
            Term::Scalar(_) | Term::ConstantValue(_) => source,
            Term::Tuple(mut members) => {
                self.apply_to_many(&mut members, term);
                if let Term::Tuple(stored) = self.store.get_mut(source) {
                    *stored = members;
                }
                source
            }
            Term::DestructuredTuple(_, mut members) => {
                self.apply_to_many(&mut members, term);
                if let Term::DestructuredTuple(_, stored) = self.store.get_mut(source) {
                    *stored = members;
                }
                source
            }
            Term::List(mut pattern) => {
                self.apply_to_many(&mut pattern, term);
                if let Term::List(stored) = self.store.get_mut(source) {
                    *stored = pattern;
                }
                source
            }
            Term::Union(mut members) => {
                self.apply_to_many(&mut members, term);
                if let Term::Union(stored) = self.store.get_mut(source) {
                    *stored = members;
                }
                source
            }
            Term::Abstraction(mut abstraction) => {
                abstraction.inputs = self.apply_to(abstraction.inputs, term);
                abstraction.outputs = self.apply_to(abstraction.outputs, term);
                if let Term::Abstraction(stored) = self.store.get_mut(source) {
                    stored.inputs = abstraction.inputs;
                    stored.outputs = abstraction.outputs;
                }
                self.check_push_function(source, term);
                source
            }
            Term::Application(mut app) => {
                app.abstraction = self.apply_to(app.abstraction, term);
                app.inputs = self.apply_to(app.inputs, term);
                app.outputs = self.apply_to(app.outputs, term);
                if let Term::Application(stored) = self.store.get_mut(source) {
                    *stored = app;
                }
                self.check_application(source, term);
                source
            }
            Term::Subscript(mut subscript) => {
                subscript.principal = self.apply_to(subscript.principal, term);
                for sub in &mut subscript.subscripts {
                    self.apply_to_many(&mut sub.arguments, term);
                }
                subscript.outputs = self.apply_to(subscript.outputs, term);
                if let Term::Subscript(stored) = self.store.get_mut(source) {
                    *stored = subscript;
                }
                self.maybe_unify_subscript(source, term);
                source
            }
            Term::Assignment { mut lhs, mut rhs } => {
                lhs = self.apply_to(lhs, term);
                rhs = self.apply_to(rhs, term);
                if let Term::Assignment {
                    lhs: stored_lhs,
                    rhs: stored_rhs,
                } = self.store.get_mut(source)
                {
                    *stored_lhs = lhs;
                    *stored_rhs = rhs;
                }
                self.check_assignment(source, term);
                source
            }
            Term::Scheme(scheme) => {
                let ty = self.apply_to(scheme.ty, term);
                if let Term::Scheme(stored) = self.store.get_mut(source) {
                    stored.ty = ty;
                }
                source
            }
            Term::Class(class) => {
                let class_source = self.apply_to(class.source, term);
                if let Term::Class(stored) = self.store.get_mut(source) {
                    stored.source = class_source;
                }
                source
            }
            Term::Record(mut record) => {
                for field in &mut record.fields {
                    field.name = self.apply_to(field.name, term);
                    field.ty = self.apply_to(field.ty, term);
                }
                if let Term::Record(stored) = self.store.get_mut(source) {
                    *stored = record;
                }
                source
            }
            Term::Alias(inner) => {
                let inner = self.apply_to(inner, term);
                if let Term::Alias(stored) = self.store.get_mut(source) {
                    *stored = inner;
                }
                source
            }
        }
    }

    fn apply_to_many(&mut self, sources: &mut [TypeId], term: &TypeEquationTerm) {
        for source in sources {
            *source = self.apply_to(*source, term);
        }
    }

    /*
     * substitute
     */

    pub(crate) fn substitute_one(
        &mut self,
        source: TypeId,
        term: &TypeEquationTerm,
        lhs: TypeId,
        rhs: TypeId,
    ) -> TypeId {
        match self.store.get(source).clone() {
            Term::Variable(_) => {
                if source == lhs {
                    rhs
                } else {
                    source
                }
            }
            Term::Parameters(_) => self
                .state
                .expanded_parameters
                .get(&source)
                .copied()
                .unwrap_or(source),
            Term::Scalar(_) | Term::ConstantValue(_) => source,
            Term::Tuple(mut members) => {
                self.substitute_many(&mut members, term, lhs, rhs);
                if let Term::Tuple(stored) = self.store.get_mut(source) {
                    *stored = members;
                }
                source
            }
            Term::DestructuredTuple(_, mut members) => {
                self.substitute_many(&mut members, term, lhs, rhs);
                if let Term::DestructuredTuple(_, stored) = self.store.get_mut(source) {
                    *stored = members;
                }
                source
            }
            Term::List(_) => self.substitute_list(source, term, lhs, rhs),
            Term::Union(mut members) => {
                self.substitute_many(&mut members, term, lhs, rhs);
                if let Term::Union(stored) = self.store.get_mut(source) {
                    *stored = members;
                }
                source
            }
            Term::Abstraction(mut abstraction) => {
                abstraction.inputs = self.substitute_one(abstraction.inputs, term, lhs, rhs);
                abstraction.outputs = self.substitute_one(abstraction.outputs, term, lhs, rhs);
                if let Term::Abstraction(stored) = self.store.get_mut(source) {
                    stored.inputs = abstraction.inputs;
                    stored.outputs = abstraction.outputs;
                }
                self.check_push_function(source, term);
                source
            }
            Term::Application(mut app) => {
                app.abstraction = self.substitute_one(app.abstraction, term, lhs, rhs);
                app.inputs = self.substitute_one(app.inputs, term, lhs, rhs);
                app.outputs = self.substitute_one(app.outputs, term, lhs, rhs);
                if let Term::Application(stored) = self.store.get_mut(source) {
                    *stored = app;
                }
                self.check_application(source, term);
                source
            }
            Term::Subscript(mut subscript) => {
                subscript.principal = self.substitute_one(subscript.principal, term, lhs, rhs);
                for sub in &mut subscript.subscripts {
                    self.substitute_many(&mut sub.arguments, term, lhs, rhs);
                }
                subscript.outputs = self.substitute_one(subscript.outputs, term, lhs, rhs);
                if let Term::Subscript(stored) = self.store.get_mut(source) {
                    *stored = subscript;
                }
                self.maybe_unify_subscript(source, term);
                source
            }
            Term::Assignment {
                lhs: mut a_lhs,
                rhs: mut a_rhs,
            } => {
                a_rhs = self.substitute_one(a_rhs, term, lhs, rhs);
                a_lhs = self.substitute_one(a_lhs, term, lhs, rhs);
                if let Term::Assignment {
                    lhs: stored_lhs,
                    rhs: stored_rhs,
                } = self.store.get_mut(source)
                {
                    *stored_lhs = a_lhs;
                    *stored_rhs = a_rhs;
                }
                self.check_assignment(source, term);
                source
            }
            Term::Scheme(scheme) => {
                let ty = self.substitute_one(scheme.ty, term, lhs, rhs);
                if let Term::Scheme(stored) = self.store.get_mut(source) {
                    stored.ty = ty;
                }
                source
            }
            Term::Class(class) => {
                let class_source = self.substitute_one(class.source, term, lhs, rhs);
                if let Term::Class(stored) = self.store.get_mut(source) {
                    stored.source = class_source;
                }
                source
            }
            Term::Record(mut record) => {
                for field in &mut record.fields {
                    field.name = self.substitute_one(field.name, term, lhs, rhs);
                    field.ty = self.substitute_one(field.ty, term, lhs, rhs);
                }
                if let Term::Record(stored) = self.store.get_mut(source) {
                    *stored = record;
                }
                source
            }
            Term::Alias(inner) => {
                let inner = self.substitute_one(inner, term, lhs, rhs);
                if let Term::Alias(stored) = self.store.get_mut(source) {
                    *stored = inner;
                }
                source
            }
        }
    }

    fn substitute_many(
        &mut self,
        sources: &mut [TypeId],
        term: &TypeEquationTerm,
        lhs: TypeId,
        rhs: TypeId,
    ) {
        for source in sources {
            *source = self.substitute_one(*source, term, lhs, rhs);
        }
    }

    /// Lists flatten as they are substituted: nested lists and tuples
    /// splice in (an outputs tuple contributes only its first member),
    /// then a trailing run of members equivalent to their predecessor is
    /// collapsed back into the pattern.
    fn substitute_list(
        &mut self,
        source: TypeId,
        term: &TypeEquationTerm,
        lhs: TypeId,
        rhs: TypeId,
    ) -> TypeId {
        let Term::List(pattern) = self.store.get(source).clone() else {
            return source;
        };

        let mut flattened = Vec::with_capacity(pattern.len());
        for member in pattern {
            self.flatten_list(member, &mut flattened);
        }

        let mut last: Option<TypeId> = None;
        let mut remove_from = 1usize;
        let mut num_remove = 0usize;

        for i in 0..flattened.len() {
            let element = self.substitute_one(flattened[i], term, lhs, rhs);
            flattened[i] = element;

            let should_remove = i > 0
                && is_concrete_argument(self.store, element)
                && last.is_some_and(|last| {
                    is_concrete_argument(self.store, last) && self.equivalent(element, last)
                });

            if should_remove {
                num_remove += 1;
            } else {
                num_remove = 0;
                remove_from = i + 1;
            }
            last = Some(element);
        }

        if num_remove > 0 {
            flattened.truncate(remove_from);
        }

        if let Term::List(stored) = self.store.get_mut(source) {
            *stored = flattened;
        }
        source
    }

    fn flatten_list(&self, source: TypeId, into: &mut Vec<TypeId>) {
        match self.store.get(source) {
            Term::List(pattern) => {
                for &member in pattern {
                    self.flatten_list(member, into);
                }
            }
            Term::DestructuredTuple(usage, members) => {
                let take = if usage.is_outputs() {
                    members.len().min(1)
                } else {
                    members.len()
                };
                for &member in &members[..take] {
                    self.flatten_list(member, into);
                }
            }
            _ => into.push(source),
        }
    }

    /*
     * occurs
     */

    pub(crate) fn occurs(&self, ty: TypeId, lhs: TypeId) -> bool {
        match self.store.get(ty) {
            Term::Variable(_) | Term::Parameters(_) => ty == lhs,
            Term::Scalar(_) | Term::ConstantValue(_) => false,
            Term::Tuple(members)
            | Term::DestructuredTuple(_, members)
            | Term::List(members)
            | Term::Union(members) => self.occurs_in(members, lhs),
            Term::Abstraction(abstraction) => {
                self.occurs(abstraction.inputs, lhs) || self.occurs(abstraction.outputs, lhs)
            }
            Term::Application(app) => {
                self.occurs(app.abstraction, lhs)
                    || self.occurs(app.inputs, lhs)
                    || self.occurs(app.outputs, lhs)
            }
            Term::Subscript(subscript) => {
                self.occurs(subscript.outputs, lhs)
                    || self.occurs(subscript.principal, lhs)
                    || subscript
                        .subscripts
                        .iter()
                        .any(|sub| self.occurs_in(&sub.arguments, lhs))
            }
            Term::Assignment { lhs: a_lhs, rhs: a_rhs } => {
                self.occurs(*a_lhs, lhs) || self.occurs(*a_rhs, lhs)
            }
            Term::Scheme(scheme) => self.occurs(scheme.ty, lhs),
            Term::Class(class) => self.occurs(class.source, lhs),
            Term::Record(record) => record
                .fields
                .iter()
                .any(|field| self.occurs(field.name, lhs) || self.occurs(field.ty, lhs)),
            Term::Alias(source) => self.occurs(*source, lhs),
        }
    }

    fn occurs_in(&self, ids: &[TypeId], lhs: TypeId) -> bool {
        ids.iter().any(|&id| self.occurs(id, lhs))
    }

    /*
     * resolution checks
     */

    /// Once an abstraction's inputs are concrete, resolve it against the
    /// library: equate with a known type, instantiate a known scheme, or
    /// bind to the stand-in variable of a file candidate.
    pub(crate) fn check_push_function(&mut self, source: TypeId, term: &TypeEquationTerm) {
        if self.state.registered_funcs.contains(&source) {
            return;
        }
        let Term::Abstraction(func) = self.store.get(source).clone() else {
            return;
        };
        if func.is_anonymous() || !is_concrete_argument(self.store, func.inputs) {
            return;
        }

        let result = self
            .library
            .search_function(self.store, self.hir, self.search_path, &func);

        if let Some(resolved) = result.resolved {
            if self.store.get(resolved).is_scheme() {
                let instance = self.instantiate(resolved);
                self.push_type_equation(TypeEquation::new(
                    TypeEquationTerm::new(term.source_token.as_ref(), source),
                    TypeEquationTerm::new(term.source_token.as_ref(), instance),
                ));
                self.state.registered_funcs.insert(instance);
            } else {
                self.push_type_equation(TypeEquation::new(
                    TypeEquationTerm::new(term.source_token.as_ref(), source),
                    TypeEquationTerm::new(term.source_token.as_ref(), resolved),
                ));
            }
        } else if let Some(candidate) = result.candidate {
            let stand_in = self.pending.require_candidate_type(candidate, self.store);
            self.push_type_equation(TypeEquation::new(
                TypeEquationTerm::new(term.source_token.as_ref(), source),
                TypeEquationTerm::new(term.source_token.as_ref(), stand_in),
            ));
        } else {
            let function = self.describe(source);
            self.errors.push(TypeError::UnresolvedFunction {
                function,
                token: term.source_token.clone(),
            });
        }

        self.state.registered_funcs.insert(source);
    }

    /// In `lhs = rhs`, once the right side is concrete, require it to be
    /// a subtype of the left.
    pub(crate) fn check_assignment(&mut self, source: TypeId, term: &TypeEquationTerm) {
        if self.state.registered_assignments.contains(&source) {
            return;
        }
        let Term::Assignment { lhs, rhs } = self.store.get(source).clone() else {
            return;
        };

        if is_concrete_argument(self.store, rhs) {
            self.push_type_equation(TypeEquation::new(
                TypeEquationTerm::new(term.source_token.as_ref(), rhs),
                TypeEquationTerm::new(term.source_token.as_ref(), lhs),
            ));
            self.state.registered_assignments.insert(source);
        }
    }

    /// Once a call's arguments are concrete, clone the callee's header
    /// onto the call signature and resolve it; a scheme callee is
    /// instantiated instead.
    pub(crate) fn check_application(&mut self, source: TypeId, term: &TypeEquationTerm) {
        if self.state.registered_funcs.contains(&source) {
            return;
        }
        let Term::Application(app) = self.store.get(source).clone() else {
            return;
        };
        if !is_concrete_argument(self.store, app.inputs) {
            return;
        }

        match self.store.get(app.abstraction).clone() {
            Term::Abstraction(abstraction) => {
                let lookup =
                    self.store
                        .make_abstraction(abstraction.kind, app.inputs, app.outputs);
                self.push_type_equation(TypeEquation::new(
                    TypeEquationTerm::new(term.source_token.as_ref(), app.abstraction),
                    TypeEquationTerm::new(term.source_token.as_ref(), lookup),
                ));
                //  Resolution flows through the lookup clone; the callee
                //  header itself must not be searched a second time.
                self.state.registered_funcs.insert(app.abstraction);
                self.check_push_function(lookup, term);
                self.state.registered_funcs.insert(source);
            }
            Term::Scheme(scheme) if self.store.get(scheme.ty).is_abstraction() => {
                let instance = self.instantiate(app.abstraction);
                let Term::Abstraction(instance_func) = self.store.get(instance).clone() else {
                    return;
                };
                self.push_type_equation(TypeEquation::new(
                    TypeEquationTerm::new(term.source_token.as_ref(), app.outputs),
                    TypeEquationTerm::new(term.source_token.as_ref(), instance_func.outputs),
                ));
                self.push_type_equation(TypeEquation::new(
                    TypeEquationTerm::new(term.source_token.as_ref(), app.inputs),
                    TypeEquationTerm::new(term.source_token.as_ref(), instance_func.inputs),
                ));
                self.state.registered_funcs.insert(source);
            }
            //  Not resolved far enough yet; try again on a later pass.
            _ => {}
        }
    }

    /*
     * util
     */

    pub(crate) fn push_type_equation(&mut self, eq: TypeEquation) {
        self.substitution.push_type_equation(eq);
    }

    /// Instantiates a scheme with fresh variables and re-enqueues its
    /// constraints under the same mapping.
    pub(crate) fn instantiate(&mut self, scheme_id: TypeId) -> TypeId {
        let Term::Scheme(scheme) = self.store.get(scheme_id).clone() else {
            return scheme_id;
        };

        let mut instance_vars = InstanceVars::default();
        instantiate::make_instance_variables(self.store, &scheme, &mut instance_vars);
        let instance = instantiate::clone_type(self.store, scheme.ty, &mut instance_vars);

        for constraint in &scheme.constraints {
            let lhs = instantiate::clone_type(self.store, constraint.lhs.term, &mut instance_vars);
            let rhs = instantiate::clone_type(self.store, constraint.rhs.term, &mut instance_vars);
            if lhs != rhs {
                self.push_type_equation(TypeEquation::new(
                    TypeEquationTerm::new(constraint.lhs.source_token.as_ref(), lhs),
                    TypeEquationTerm::new(constraint.rhs.source_token.as_ref(), rhs),
                ));
            }
        }

        instance
    }

    pub(crate) fn is_concrete(&self, id: TypeId) -> bool {
        is_concrete_argument(self.store, id)
    }

    pub(crate) fn are_concrete(&self, ids: &[TypeId]) -> bool {
        are_concrete_arguments(self.store, ids)
    }

    pub(crate) fn equivalent(&self, a: TypeId, b: TypeId) -> bool {
        TypeRelation::new(EquivalenceRelation, &*self.store).related_entry(a, b)
    }

    pub(crate) fn register_visited_type(&mut self, ty: TypeId) {
        self.state.registered_funcs.insert(ty);
    }

    pub(crate) fn unregister_visited_type(&mut self, ty: TypeId) {
        self.state.registered_funcs.remove(&ty);
    }

    pub(crate) fn is_visited_type(&self, ty: TypeId) -> bool {
        self.state.registered_funcs.contains(&ty)
    }

    pub(crate) fn describe(&self, id: TypeId) -> String {
        TypeWriter::new(&*self.store, self.library).write(id)
    }
}
