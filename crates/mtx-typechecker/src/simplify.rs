//! Structural simplification of equations whose sides are both
//! non-variables.

use crate::TypeError;
use crate::member_visitor::{self, Dt, DtPredicate};
use crate::relate::{
    EquivalenceRelation, ScalarRelationship, SubtypeRelation, TypeRelation,
    mismatching_definition_usages,
};
use crate::store::TypeStore;
use crate::types::{Term, TypeEquation, TypeEquationTerm, TypeId};
use crate::unify::Unifier;

impl Unifier<'_> {
    pub(crate) fn simplify_entry(
        &mut self,
        lhs: &TypeEquationTerm,
        rhs: &TypeEquationTerm,
    ) -> bool {
        self.lhs_source_token = lhs.source_token.clone();
        self.rhs_source_token = rhs.source_token.clone();
        self.simplify(lhs.term, rhs.term, false)
    }

    pub(crate) fn simplify(&mut self, lhs: TypeId, rhs: TypeId, rev: bool) -> bool {
        if self.store.get(lhs).same_tag(self.store.get(rhs)) {
            self.simplify_same_types(lhs, rhs, rev)
        } else {
            self.simplify_different_types(lhs, rhs, rev)
        }
    }

    fn simplify_same_types(&mut self, lhs: TypeId, rhs: TypeId, rev: bool) -> bool {
        match (self.store.get(lhs).clone(), self.store.get(rhs).clone()) {
            (Term::Abstraction(a), Term::Abstraction(b)) => {
                //  Contravariance for inputs.
                let mut success = self.simplify(a.inputs, b.inputs, !rev);
                success = success && self.simplify(a.outputs, b.outputs, rev);
                self.check_simplification_failure(success, lhs, rhs);
                success
            }
            (Term::Scalar(_), Term::Scalar(_)) => {
                let relation = SubtypeRelation::new(self.library);
                let success = relation.related(&*self.store, lhs, rhs, rev);
                self.check_simplification_failure(success, lhs, rhs);
                success
            }
            (Term::Tuple(a), Term::Tuple(b)) => {
                let success = self.push_pairwise_equations(&a, &b, rev);
                self.check_simplification_failure(success, lhs, rhs);
                success
            }
            (Term::DestructuredTuple(usage_a, a), Term::DestructuredTuple(usage_b, b)) => {
                let success = if mismatching_definition_usages(usage_a, usage_b) {
                    false
                } else if usage_a.is_definition() && usage_a == usage_b {
                    self.push_pairwise_equations(&a, &b, rev)
                } else {
                    member_visitor::expand_members(self, lhs, rhs, rev)
                };
                self.check_simplification_failure(success, lhs, rhs);
                success
            }
            (Term::List(a), Term::List(b)) => self.simplify_lists(&a, &b, rev),
            (Term::Scheme(_), Term::Scheme(_)) => {
                TypeRelation::new(EquivalenceRelation, &*self.store).related(lhs, rhs, rev)
            }
            (Term::Subscript(a), Term::Subscript(b)) => {
                if a.subscripts.len() != b.subscripts.len() {
                    return false;
                }
                for (sub_a, sub_b) in a.subscripts.iter().zip(b.subscripts.iter()) {
                    if sub_a.method != sub_b.method {
                        return false;
                    }
                    if !self.push_pairwise_equations(&sub_a.arguments, &sub_b.arguments, !rev) {
                        return false;
                    }
                }
                self.simplify(a.outputs, b.outputs, rev)
            }
            (Term::Class(a), Term::Class(b)) => self.simplify(a.source, b.source, rev),
            (Term::Variable(_), Term::Variable(_)) => {
                self.push_simplify_equation(lhs, rhs, rev);
                true
            }
            (Term::ConstantValue(a), Term::ConstantValue(b)) => {
                let success = a == b;
                self.check_simplification_failure(success, lhs, rhs);
                success
            }
            (Term::Record(a), Term::Record(b)) => {
                let success = a.fields.len() == b.fields.len() && {
                    for (field_a, field_b) in a.fields.iter().zip(b.fields.iter()) {
                        self.push_simplify_equation(field_a.name, field_b.name, rev);
                        self.push_simplify_equation(field_a.ty, field_b.ty, rev);
                    }
                    true
                };
                self.check_simplification_failure(success, lhs, rhs);
                success
            }
            (Term::Union(_), Term::Union(_)) => {
                TypeRelation::new(EquivalenceRelation, &*self.store).related(lhs, rhs, rev)
            }
            (Term::Alias(a), Term::Alias(b)) => self.simplify(a, b, rev),
            _ => {
                self.check_simplification_failure(false, lhs, rhs);
                false
            }
        }
    }

    fn simplify_different_types(&mut self, lhs: TypeId, rhs: TypeId, rev: bool) -> bool {
        if self.store.get(lhs).is_variable() || self.store.get(rhs).is_variable() {
            self.push_simplify_equation(lhs, rhs, rev);
            return true;
        }

        if self.store.get(lhs).is_destructured_tuple() {
            //  Wrap the other side in a value tuple and try again.
            let wrapped = self.store.make_rvalue_destructured_tuple(vec![rhs]);
            self.push_simplify_equation(lhs, wrapped, rev);
            true
        } else if self.store.get(rhs).is_destructured_tuple() {
            let wrapped = self.store.make_rvalue_destructured_tuple(vec![lhs]);
            self.push_simplify_equation(rhs, wrapped, !rev);
            true
        } else if self.store.get(lhs).is_list() {
            self.simplify_list_with_other(lhs, rhs, rev)
        } else if self.store.get(rhs).is_list() {
            self.simplify_list_with_other(rhs, lhs, !rev)
        } else if self.store.get(lhs).is_scheme() {
            let instance = self.instantiate(lhs);
            self.push_simplify_equation(instance, rhs, rev);
            true
        } else if self.store.get(rhs).is_scheme() {
            let instance = self.instantiate(rhs);
            self.push_simplify_equation(instance, lhs, !rev);
            true
        } else {
            self.check_simplification_failure(false, lhs, rhs);
            false
        }
    }

    fn simplify_list_with_other(&mut self, list: TypeId, other: TypeId, rev: bool) -> bool {
        let other_term = self.store.get(other);
        if other_term.is_scalar() || other_term.is_tuple() || other_term.is_abstraction() {
            let Term::List(pattern) = self.store.get(list).clone() else {
                return false;
            };
            for element in pattern {
                self.push_simplify_equation(element, other, rev);
            }
            true
        } else {
            self.check_simplification_failure(false, list, other);
            false
        }
    }

    fn simplify_lists(&mut self, a: &[TypeId], b: &[TypeId], rev: bool) -> bool {
        let num_a = a.len();
        let num_b = b.len();
        let size = num_a.max(num_b);

        if (num_a == 0 || num_b == 0) && size > 0 {
            //  Empty list with non-empty list.
            return false;
        }

        for i in 0..size {
            self.push_simplify_equation(a[i % num_a], b[i % num_b], rev);
        }
        true
    }

    /// Element-wise pairing by pushing fresh equations; fails on a size
    /// mismatch.
    fn push_pairwise_equations(&mut self, a: &[TypeId], b: &[TypeId], rev: bool) -> bool {
        if a.len() != b.len() {
            return false;
        }
        for (&t0, &t1) in a.iter().zip(b.iter()) {
            self.push_simplify_equation(t0, t1, rev);
        }
        true
    }

    pub(crate) fn push_simplify_equation(&mut self, t0: TypeId, t1: TypeId, rev: bool) {
        let eq = if rev {
            TypeEquation::new(
                TypeEquationTerm::new(self.rhs_source_token.as_ref(), t1),
                TypeEquationTerm::new(self.lhs_source_token.as_ref(), t0),
            )
        } else {
            TypeEquation::new(
                TypeEquationTerm::new(self.lhs_source_token.as_ref(), t0),
                TypeEquationTerm::new(self.rhs_source_token.as_ref(), t1),
            )
        };
        self.push_type_equation(eq);
    }

    fn check_simplification_failure(&mut self, success: bool, lhs: TypeId, rhs: TypeId) {
        if !success {
            let lhs_text = self.describe(lhs);
            let rhs_text = self.describe(rhs);
            self.errors.push(TypeError::SimplificationFailure {
                lhs: lhs_text,
                rhs: rhs_text,
                lhs_token: self.lhs_source_token.clone(),
                rhs_token: self.rhs_source_token.clone(),
            });
        }
    }

    fn expand_parameters(&mut self, pack: TypeId, peer: &Dt, offset: usize) -> bool {
        if self.state.expanded_parameters.contains_key(&pack) {
            return true;
        }
        let members: Vec<TypeId> = peer.members[offset..].to_vec();
        let expansion = self.store.make_rvalue_destructured_tuple(members);
        self.state.expanded_parameters.insert(pack, expansion);
        true
    }
}

impl DtPredicate for Unifier<'_> {
    fn store(&self) -> &TypeStore {
        &*self.store
    }

    fn predicate(&mut self, a: TypeId, b: TypeId, rev: bool) -> bool {
        self.simplify(a, b, rev)
    }

    fn parameters(
        &mut self,
        pack: TypeId,
        _peer_root: TypeId,
        peer: &Dt,
        offset: usize,
        _rev: bool,
    ) -> bool {
        self.expand_parameters(pack, peer, offset)
    }
}
