//! Destructured-tuple expansion shared by the type relation and the
//! simplifier.
//!
//! Two destructured tuples with different (or value) usages do not pair
//! element-by-element: nested tuples flatten, a definition-outputs tuple
//! matched in value position contributes only its first member, a tail
//! `List` absorbs the remainder of its peer, and a `Parameters` pack
//! consumes everything left on the other side. The walk is shared; what
//! differs is what happens at each leaf pair, supplied by the predicate.

use crate::store::TypeStore;
use crate::types::{Term, TypeId, Usage};

/// A snapshot of a destructured tuple's usage and members.
#[derive(Debug, Clone)]
pub(crate) struct Dt {
    pub usage: Usage,
    pub members: Vec<TypeId>,
}

pub(crate) fn dt(store: &TypeStore, id: TypeId) -> Dt {
    match store.get(id) {
        Term::DestructuredTuple(usage, members) => Dt {
            usage: *usage,
            members: members.clone(),
        },
        _ => panic!("expected a destructured tuple"),
    }
}

fn list_pattern(store: &TypeStore, id: TypeId) -> Vec<TypeId> {
    match store.get(id) {
        Term::List(pattern) => pattern.clone(),
        _ => panic!("expected a list"),
    }
}

pub(crate) trait DtPredicate {
    fn store(&self) -> &TypeStore;

    /// Relates one leaf pair.
    fn predicate(&mut self, a: TypeId, b: TypeId, rev: bool) -> bool;

    /// A `Parameters` pack met the peer tuple; `offset` is the index of
    /// the first unconsumed peer member.
    fn parameters(
        &mut self,
        pack: TypeId,
        peer_root: TypeId,
        peer: &Dt,
        offset: usize,
        rev: bool,
    ) -> bool;
}

/// How many members of `child` the peer is expected to supply.
fn expect_to_match(parent: &Dt, child: &Dt) -> usize {
    if parent.usage.is_value() && child.usage.is_outputs() {
        1
    } else {
        child.members.len()
    }
}

/// Whether `dt-r[]` or `dt-l[]` matches `dt-i[list<T>]`: a function whose
/// inputs are a single list may be called with no arguments at all.
fn empty_value_tuple_matches_list_inputs(store: &TypeStore, a: &Dt, b: &Dt, ia: usize, ib: usize) -> bool {
    a.usage.is_value()
        && b.usage.is_inputs()
        && ia == a.members.len()
        && ib == a.members.len()
        && ib < b.members.len()
        && store.get(b.members[ib]).is_list()
}

pub(crate) fn expand_members<P: DtPredicate>(
    p: &mut P,
    lhs: TypeId,
    rhs: TypeId,
    rev: bool,
) -> bool {
    let a = dt(p.store(), lhs);
    let b = dt(p.store(), rhs);
    let num_a = a.members.len();
    let num_b = b.members.len();

    let mut ia = 0;
    let mut ib = 0;

    while ia < num_a && ib < num_b {
        if !recurse_tuple(p, lhs, rhs, &a, &b, &mut ia, &mut ib, rev) {
            return false;
        }
    }

    if ia == num_a && ib == num_b {
        true
    } else if a.usage.is_outputs() && b.usage.is_value() {
        ib == num_b && ia == num_b
    } else if b.usage.is_outputs() && a.usage.is_value() {
        ia == num_a && ib == num_a
    } else if ib == num_b
        && a.members[ia..].iter().all(|&m| p.store().get(m).is_list())
    {
        //  A variadic pattern absorbs any multiple of its length,
        //  including zero trailing members.
        true
    } else if ia == num_a
        && b.members[ib..].iter().all(|&m| p.store().get(m).is_list())
    {
        true
    } else {
        empty_value_tuple_matches_list_inputs(p.store(), &a, &b, ia, ib)
            || empty_value_tuple_matches_list_inputs(p.store(), &b, &a, ib, ia)
    }
}

fn recurse_tuple<P: DtPredicate>(
    p: &mut P,
    lhs: TypeId,
    rhs: TypeId,
    a: &Dt,
    b: &Dt,
    ia: &mut usize,
    ib: &mut usize,
    rev: bool,
) -> bool {
    debug_assert!(*ia < a.members.len() && *ib < b.members.len());

    let mem_a = a.members[*ia];
    let mem_b = b.members[*ib];

    let a_is_params = p.store().get(mem_a).is_parameters();
    let b_is_params = p.store().get(mem_b).is_parameters();
    let a_is_list = p.store().get(mem_a).is_list();
    let b_is_list = p.store().get(mem_b).is_list();
    let a_is_dt = p.store().get(mem_a).is_destructured_tuple();
    let b_is_dt = p.store().get(mem_b).is_destructured_tuple();

    if a_is_params {
        let success = p.parameters(mem_a, rhs, b, *ib, rev);
        *ia += 1;
        *ib = b.members.len();
        success
    } else if b_is_params {
        let success = p.parameters(mem_b, lhs, a, *ia, !rev);
        *ib += 1;
        *ia = a.members.len();
        success
    } else if a_is_list && !b_is_list {
        if b.usage.is_definition() && !p.store().get(mem_b).is_variable() {
            return false;
        }
        let pattern = list_pattern(p.store(), mem_a);
        let success = match_list(p, &pattern, b, ib, rev);
        *ia += 1;
        success
    } else if b_is_list && !a_is_list {
        if a.usage.is_definition() && !p.store().get(mem_a).is_variable() {
            return false;
        }
        let pattern = list_pattern(p.store(), mem_b);
        let success = match_list(p, &pattern, a, ia, !rev);
        *ib += 1;
        success
    } else if a_is_dt {
        let child = dt(p.store(), mem_a);
        let expect = expect_to_match(a, &child);
        let success = subrecurse_tuple(p, mem_a, rhs, &child, b, ib, expect, rev);
        *ia += 1;
        success
    } else if b_is_dt {
        let child = dt(p.store(), mem_b);
        let expect = expect_to_match(b, &child);
        let success = subrecurse_tuple(p, mem_b, lhs, &child, a, ia, expect, !rev);
        *ib += 1;
        success
    } else if a_is_list
        && b_is_list
        && ((*ia == a.members.len() - 1) ^ (*ib == b.members.len() - 1))
    {
        //  A: [t0, t1, list<t>]
        //  B: [list<t>, t, list<t>]
        //  A list in the last slot of one side must match all remaining
        //  members of the other.
        if *ia == a.members.len() - 1 {
            let pattern = list_pattern(p.store(), mem_a);
            let success = match_list(p, &pattern, b, ib, rev);
            *ia += 1;
            success
        } else {
            let pattern = list_pattern(p.store(), mem_b);
            let success = match_list(p, &pattern, a, ia, !rev);
            *ib += 1;
            success
        }
    } else {
        *ia += 1;
        *ib += 1;
        p.predicate(mem_a, mem_b, rev)
    }
}

fn subrecurse_tuple<P: DtPredicate>(
    p: &mut P,
    child_root: TypeId,
    rhs: TypeId,
    child_a: &Dt,
    b: &Dt,
    ib: &mut usize,
    expect_match: usize,
    rev: bool,
) -> bool {
    let mut ia_child = 0;
    let mut success = true;

    while success && ia_child < expect_match && ia_child < child_a.members.len() && *ib < b.members.len()
    {
        success = recurse_tuple(p, child_root, rhs, child_a, b, &mut ia_child, ib, rev);
    }

    success && ia_child == expect_match
}

fn subrecurse_list<P: DtPredicate>(
    p: &mut P,
    pattern: &[TypeId],
    ia: &mut usize,
    b: &Dt,
    mem_b: TypeId,
    rev: bool,
) -> bool {
    let mem_a = pattern[*ia];

    if p.store().get(mem_b).is_destructured_tuple() {
        let sub_b = dt(p.store(), mem_b);
        let expect_num_b = expect_to_match(b, &sub_b);
        let mut ib = 0;
        let mut success = true;

        while success && ib < expect_num_b && ib < sub_b.members.len() {
            let member = sub_b.members[ib];
            ib += 1;
            success = subrecurse_list(p, pattern, ia, &sub_b, member, rev);
        }

        success && ib == expect_num_b
    } else {
        *ia = (*ia + 1) % pattern.len();
        p.predicate(mem_a, mem_b, rev)
    }
}

fn match_list<P: DtPredicate>(
    p: &mut P,
    pattern: &[TypeId],
    b: &Dt,
    ib: &mut usize,
    rev: bool,
) -> bool {
    let mut ia = 0;
    let mut success = true;

    while success && ia < pattern.len() && *ib < b.members.len() {
        let mem_b = b.members[*ib];
        *ib += 1;
        success = subrecurse_list(p, pattern, &mut ia, b, mem_b, rev);
    }

    success && (pattern.is_empty() || (ia == 0 && *ib == b.members.len()))
}
