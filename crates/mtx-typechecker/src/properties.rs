//! Predicates over type terms.

use crate::store::TypeStore;
use crate::types::{Term, TypeId};

/// Whether a type is usable as a concrete function argument: no free
/// variables, parameter packs, or pending subscripts/applications at any
/// depth that matters for dispatch. Scheme-bound variables inside a
/// scheme's body still count as concrete for function search.
pub fn is_concrete_argument(store: &TypeStore, id: TypeId) -> bool {
    match store.get(id) {
        Term::DestructuredTuple(_, members) => are_concrete_arguments(store, members),
        Term::List(pattern) => are_concrete_arguments(store, pattern),
        Term::Union(members) => are_concrete_arguments(store, members),
        Term::Abstraction(_) => true,
        Term::Scheme(scheme) => is_concrete_argument(store, scheme.ty),
        Term::Class(class) => is_concrete_argument(store, class.source),
        Term::Alias(source) => is_concrete_argument(store, *source),
        Term::Tuple(_) | Term::Scalar(_) | Term::Record(_) | Term::ConstantValue(_) => true,
        Term::Variable(_)
        | Term::Parameters(_)
        | Term::Subscript(_)
        | Term::Application(_)
        | Term::Assignment { .. } => false,
    }
}

pub fn are_concrete_arguments(store: &TypeStore, ids: &[TypeId]) -> bool {
    ids.iter().all(|id| is_concrete_argument(store, *id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_and_tuples_are_concrete() {
        let mut store = TypeStore::new();
        let double = store.make_scalar();
        let tup = store.make_tuple(vec![double]);
        assert!(is_concrete_argument(&store, double));
        assert!(is_concrete_argument(&store, tup));
    }

    #[test]
    fn test_variables_are_not_concrete() {
        let mut store = TypeStore::new();
        let var = store.make_fresh_variable();
        let double = store.make_scalar();
        let dt = store.make_rvalue_destructured_tuple(vec![double, var]);
        assert!(!is_concrete_argument(&store, var));
        assert!(!is_concrete_argument(&store, dt));
    }

    #[test]
    fn test_abstractions_are_concrete() {
        let mut store = TypeStore::new();
        let var = store.make_fresh_variable();
        let out = store.make_fresh_variable();
        let abstr = store.make_abstraction(crate::types::AbstractionKind::Anonymous, var, out);
        assert!(is_concrete_argument(&store, abstr));
    }
}
