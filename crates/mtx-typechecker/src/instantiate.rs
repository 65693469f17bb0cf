//! Scheme instantiation: structural cloning with fresh variables for the
//! scheme's parameters.

use rustc_hash::FxHashMap;

use crate::store::TypeStore;
use crate::types::{
    ClassType, Field, Scheme, Term, TypeEquation, TypeEquationTerm, TypeId,
};

/// Mapping from scheme parameters to their fresh stand-ins. Extending the
/// same map across nested schemes keeps instantiation capture-avoiding.
pub(crate) type InstanceVars = FxHashMap<TypeId, TypeId>;

pub(crate) fn make_instance_variables(
    store: &mut TypeStore,
    scheme: &Scheme,
    into: &mut InstanceVars,
) {
    for &param in &scheme.parameters {
        if !into.contains_key(&param) {
            let fresh = if store.get(param).is_parameters() {
                store.make_fresh_parameters()
            } else {
                store.make_fresh_variable()
            };
            into.insert(param, fresh);
        }
    }
}

fn clone_slice(store: &mut TypeStore, ids: &[TypeId], replacing: &mut InstanceVars) -> Vec<TypeId> {
    ids.iter()
        .map(|&id| clone_type(store, id, replacing))
        .collect()
}

/// Structurally copies `source`, substituting mapped variables and
/// parameter packs with their fresh replacements. Scalars, constant
/// values, and unmapped variables are shared, not copied.
pub(crate) fn clone_type(
    store: &mut TypeStore,
    source: TypeId,
    replacing: &mut InstanceVars,
) -> TypeId {
    match store.get(source).clone() {
        Term::Variable(_) | Term::Parameters(_) => {
            replacing.get(&source).copied().unwrap_or(source)
        }
        Term::Scalar(_) | Term::ConstantValue(_) => source,
        Term::Tuple(members) => {
            let members = clone_slice(store, &members, replacing);
            store.make_tuple(members)
        }
        Term::DestructuredTuple(usage, members) => {
            let members = clone_slice(store, &members, replacing);
            store.make_destructured_tuple(usage, members)
        }
        Term::List(pattern) => {
            let pattern = clone_slice(store, &pattern, replacing);
            store.make_list(pattern)
        }
        Term::Union(members) => {
            let members = clone_slice(store, &members, replacing);
            store.make_union(members)
        }
        Term::Record(record) => {
            let fields = record
                .fields
                .iter()
                .map(|field| Field {
                    name: field.name,
                    ty: clone_type(store, field.ty, replacing),
                })
                .collect();
            store.make_record(fields)
        }
        Term::Class(class) => {
            let source_ty = clone_type(store, class.source, replacing);
            store.make_class(ClassType {
                name: class.name,
                source: source_ty,
                supertypes: class.supertypes,
            })
        }
        Term::Alias(inner) => {
            let inner = clone_type(store, inner, replacing);
            store.make_alias(inner)
        }
        Term::Abstraction(abstr) => {
            let inputs = clone_type(store, abstr.inputs, replacing);
            let outputs = clone_type(store, abstr.outputs, replacing);
            store.make_abstraction(abstr.kind, inputs, outputs)
        }
        Term::Application(app) => {
            let abstraction = clone_type(store, app.abstraction, replacing);
            let inputs = clone_type(store, app.inputs, replacing);
            let outputs = clone_type(store, app.outputs, replacing);
            store.make_application(abstraction, inputs, outputs)
        }
        Term::Subscript(sub) => {
            let principal = clone_type(store, sub.principal, replacing);
            let subscripts = sub
                .subscripts
                .iter()
                .map(|s| crate::types::Sub {
                    method: s.method,
                    arguments: clone_slice(store, &s.arguments, replacing),
                })
                .collect();
            let outputs = clone_type(store, sub.outputs, replacing);
            store.make_subscript(principal, subscripts, outputs)
        }
        Term::Scheme(scheme) => {
            //  Nested schemes extend the mapping before recursing.
            make_instance_variables(store, &scheme, replacing);

            let parameters = clone_slice(store, &scheme.parameters, replacing);
            let ty = clone_type(store, scheme.ty, replacing);
            let constraints = scheme
                .constraints
                .iter()
                .map(|eq| {
                    let lhs = clone_type(store, eq.lhs.term, replacing);
                    let rhs = clone_type(store, eq.rhs.term, replacing);
                    TypeEquation::new(
                        TypeEquationTerm::new(eq.lhs.source_token.as_ref(), lhs),
                        TypeEquationTerm::new(eq.rhs.source_token.as_ref(), rhs),
                    )
                })
                .collect();

            let id = store.make_scheme(ty, parameters);
            if let Term::Scheme(new_scheme) = store.get_mut(id) {
                new_scheme.constraints = constraints;
            }
            id
        }
        Term::Assignment { lhs, rhs } => {
            let lhs = clone_type(store, lhs, replacing);
            let rhs = clone_type(store, rhs, replacing);
            store.make_assignment(lhs, rhs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiation_is_capture_avoiding() {
        let mut store = TypeStore::new();
        let param = store.make_fresh_variable();
        let body_inputs = store.make_input_destructured_tuple(vec![param]);
        let body_outputs = store.make_output_destructured_tuple(vec![param]);
        let func = store.make_abstraction(
            crate::types::AbstractionKind::Anonymous,
            body_inputs,
            body_outputs,
        );
        let scheme_id = store.make_scheme(func, vec![param]);

        let Term::Scheme(scheme) = store.get(scheme_id).clone() else {
            unreachable!();
        };

        let mut first_vars = InstanceVars::default();
        make_instance_variables(&mut store, &scheme, &mut first_vars);
        let first = clone_type(&mut store, scheme.ty, &mut first_vars);

        let mut second_vars = InstanceVars::default();
        make_instance_variables(&mut store, &scheme, &mut second_vars);
        let second = clone_type(&mut store, scheme.ty, &mut second_vars);

        assert_ne!(first, second);
        assert_ne!(first_vars[&param], second_vars[&param]);
    }

    #[test]
    fn test_scalars_are_shared_not_copied() {
        let mut store = TypeStore::new();
        let double = store.make_scalar();
        let tup = store.make_tuple(vec![double]);

        let mut replacing = InstanceVars::default();
        let cloned = clone_type(&mut store, tup, &mut replacing);

        assert_ne!(cloned, tup);
        let Term::Tuple(members) = store.get(cloned) else {
            unreachable!();
        };
        assert_eq!(members[0], double);
    }
}
