//! Equivalence and subtype relations over type terms.

use crate::library::Library;
use crate::member_visitor::{self, Dt, DtPredicate};
use crate::store::TypeStore;
use crate::types::{Term, TypeId, Usage};

/// How two scalars relate: the structural walk is shared, only the scalar
/// leaf rule differs between equivalence and subtyping.
pub trait ScalarRelationship {
    fn related(&self, store: &TypeStore, lhs: TypeId, rhs: TypeId, rev: bool) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EquivalenceRelation;

impl ScalarRelationship for EquivalenceRelation {
    fn related(&self, store: &TypeStore, lhs: TypeId, rhs: TypeId, _rev: bool) -> bool {
        match (store.get(lhs), store.get(rhs)) {
            (Term::Scalar(a), Term::Scalar(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Clone, Copy)]
pub struct SubtypeRelation<'a> {
    pub library: &'a Library,
}

impl<'a> SubtypeRelation<'a> {
    pub fn new(library: &'a Library) -> Self {
        Self { library }
    }
}

impl ScalarRelationship for SubtypeRelation<'_> {
    fn related(&self, store: &TypeStore, lhs: TypeId, rhs: TypeId, rev: bool) -> bool {
        if rev {
            self.library.subtype_related(store, rhs, lhs)
        } else {
            self.library.subtype_related(store, lhs, rhs)
        }
    }
}

pub fn mismatching_definition_usages(a: Usage, b: Usage) -> bool {
    a.is_definition() && b.is_definition() && a != b
}

/// Deduplicates union members under equivalence, preserving order.
pub fn unique_union_members(store: &TypeStore, members: &[TypeId]) -> Vec<TypeId> {
    let equiv = TypeRelation::new(EquivalenceRelation, store);
    let mut unique: Vec<TypeId> = Vec::with_capacity(members.len());
    for &member in members {
        if !unique.iter().any(|&kept| equiv.related_entry(kept, member)) {
            unique.push(member);
        }
    }
    unique
}

/// Structural relation between two terms, parameterised on the scalar
/// relationship. Destructured tuples expand through the member visitor;
/// unions compare by subsumption after deduplication.
pub struct TypeRelation<'a, R: ScalarRelationship> {
    relationship: R,
    store: &'a TypeStore,
}

impl<'a, R: ScalarRelationship> TypeRelation<'a, R> {
    pub fn new(relationship: R, store: &'a TypeStore) -> Self {
        Self {
            relationship,
            store,
        }
    }

    pub fn related_entry(&self, a: TypeId, b: TypeId) -> bool {
        self.related(a, b, false)
    }

    pub(crate) fn related(&self, a: TypeId, b: TypeId, rev: bool) -> bool {
        if self.store.get(a).same_tag(self.store.get(b)) {
            self.related_same_types(a, b, rev)
        } else {
            self.related_different_types(a, b, rev)
        }
    }

    fn related_same_types(&self, a: TypeId, b: TypeId, rev: bool) -> bool {
        match (self.store.get(a), self.store.get(b)) {
            (Term::Scalar(_), Term::Scalar(_)) => self.relationship.related(self.store, a, b, rev),
            (Term::Variable(_), Term::Variable(_)) => true,
            (Term::Parameters(pa), Term::Parameters(pb)) => pa == pb,
            (Term::ConstantValue(va), Term::ConstantValue(vb)) => va == vb,
            (Term::Tuple(ma), Term::Tuple(mb)) => self.related_element_wise(ma, mb, rev),
            (Term::DestructuredTuple(ua, ma), Term::DestructuredTuple(ub, mb)) => {
                if mismatching_definition_usages(*ua, *ub) {
                    false
                } else if ua.is_definition() && ua == ub {
                    self.related_element_wise(ma, mb, rev)
                } else {
                    let mut visitor = RelationVisitor { relation: self };
                    member_visitor::expand_members(&mut visitor, a, b, rev)
                }
            }
            (Term::List(pa), Term::List(pb)) => {
                let mut ia = 0;
                let mut ib = 0;
                self.related_list(pa, pb, &mut ia, &mut ib, pa.len(), pb.len(), rev)
            }
            (Term::Union(ma), Term::Union(mb)) => self.related_union(ma, mb, rev),
            (Term::Abstraction(fa), Term::Abstraction(fb)) => {
                fa.header() == fb.header()
                    && self.related(fa.inputs, fb.inputs, !rev)
                    && self.related(fa.outputs, fb.outputs, rev)
            }
            (Term::Scheme(sa), Term::Scheme(sb)) => self.related(sa.ty, sb.ty, rev),
            (Term::Class(_), Term::Class(_)) => self.relationship.related(self.store, a, b, rev),
            (Term::Alias(sa), Term::Alias(sb)) => self.related(*sa, *sb, rev),
            (Term::Record(ra), Term::Record(rb)) => {
                ra.fields.len() == rb.fields.len()
                    && ra.fields.iter().zip(rb.fields.iter()).all(|(fa, fb)| {
                        self.related(fa.name, fb.name, rev) && self.related(fa.ty, fb.ty, rev)
                    })
            }
            _ => false,
        }
    }

    fn related_different_types(&self, a: TypeId, b: TypeId, rev: bool) -> bool {
        let ta = self.store.get(a);
        let tb = self.store.get(b);

        if ta.is_variable() || tb.is_variable() {
            return true;
        }

        if let Term::Alias(source) = ta {
            self.related(*source, b, rev)
        } else if let Term::Alias(source) = tb {
            self.related(a, *source, !rev)
        } else if ta.is_destructured_tuple() {
            self.related_dt_with_other(a, b, rev)
        } else if tb.is_destructured_tuple() {
            self.related_dt_with_other(b, a, !rev)
        } else if let Term::Union(members) = ta {
            members.iter().any(|&m| self.related(m, b, rev))
        } else if let Term::Union(members) = tb {
            members.iter().any(|&m| self.related(a, m, !rev))
        } else if let Term::List(pattern) = ta {
            pattern.len() == 1 && self.related(pattern[0], b, rev)
        } else if let Term::List(pattern) = tb {
            pattern.len() == 1 && self.related(a, pattern[0], !rev)
        } else if let Term::Scheme(scheme) = ta {
            self.related(scheme.ty, b, rev)
        } else if let Term::Scheme(scheme) = tb {
            self.related(a, scheme.ty, !rev)
        } else {
            false
        }
    }

    fn related_dt_with_other(&self, dt: TypeId, other: TypeId, rev: bool) -> bool {
        let Term::DestructuredTuple(_, members) = self.store.get(dt) else {
            return false;
        };
        match members.len() {
            0 => self.store.get(other).is_list(),
            1 => self.related(members[0], other, rev),
            _ => false,
        }
    }

    fn related_element_wise(&self, a: &[TypeId], b: &[TypeId], rev: bool) -> bool {
        a.len() == b.len() && a.iter().zip(b.iter()).all(|(&x, &y)| self.related(x, y, rev))
    }

    fn related_union(&self, a: &[TypeId], b: &[TypeId], rev: bool) -> bool {
        let unique_a = unique_union_members(self.store, a);
        let unique_b = unique_union_members(self.store, b);

        let (expect_smaller, expect_larger, rev) = if rev {
            (unique_b, unique_a, false)
        } else {
            (unique_a, unique_b, rev)
        };

        if expect_smaller.len() > expect_larger.len() {
            return false;
        }

        expect_smaller
            .iter()
            .all(|&m| expect_larger.iter().any(|&n| self.related(m, n, rev)))
    }

    /// Variadic list matching: a pattern of length n matches any whole
    /// number of pattern repetitions on the peer side, with nested lists
    /// and destructured tuples flattened as they are encountered.
    fn related_list(
        &self,
        a: &[TypeId],
        b: &[TypeId],
        ia: &mut usize,
        ib: &mut usize,
        num_a: usize,
        num_b: usize,
        rev: bool,
    ) -> bool {
        if *ia == num_a {
            return *ib == num_b;
        } else if *ib == num_b {
            return *ia == num_a;
        }

        let va = a[*ia];
        let vb = b[*ib];

        if let Term::List(pattern) = self.store.get(va) {
            let mut new_ia = 0;
            let success = self.related_list(pattern, b, &mut new_ia, ib, pattern.len(), num_b, rev);
            *ia += 1;
            success
        } else if let Term::List(pattern) = self.store.get(vb) {
            let mut new_ib = 0;
            let success = self.related_list(a, pattern, ia, &mut new_ib, num_a, pattern.len(), rev);
            *ib += 1;
            success
        } else if let Term::DestructuredTuple(usage, members) = self.store.get(va) {
            let use_num = if usage.is_outputs() {
                members.len().min(1)
            } else {
                members.len()
            };
            let mut new_ia = 0;
            let success = self.related_list(members, b, &mut new_ia, ib, use_num, num_b, rev);
            *ia += 1;
            success
        } else if let Term::DestructuredTuple(usage, members) = self.store.get(vb) {
            let use_num = if usage.is_outputs() {
                members.len().min(1)
            } else {
                members.len()
            };
            let mut new_ib = 0;
            let success = self.related_list(a, members, ia, &mut new_ib, num_a, use_num, rev);
            *ib += 1;
            success
        } else {
            *ia += 1;
            *ib += 1;
            self.related(va, vb, rev)
        }
    }
}

struct RelationVisitor<'r, 'a, R: ScalarRelationship> {
    relation: &'r TypeRelation<'a, R>,
}

impl<R: ScalarRelationship> DtPredicate for RelationVisitor<'_, '_, R> {
    fn store(&self) -> &TypeStore {
        self.relation.store
    }

    fn predicate(&mut self, a: TypeId, b: TypeId, rev: bool) -> bool {
        self.relation.related(a, b, rev)
    }

    fn parameters(
        &mut self,
        pack: TypeId,
        peer_root: TypeId,
        _peer: &Dt,
        _offset: usize,
        rev: bool,
    ) -> bool {
        self.relation.related(pack, peer_root, rev)
    }
}
