//! Resolution of subscript chains `a(x){y}.z` against the principal
//! argument.

use mtx_hir::SubscriptMethod;

use crate::TypeError;
use crate::types::{Sub, Subscript, Term, TypeEquation, TypeEquationTerm, TypeId};
use crate::unify::Unifier;

impl Unifier<'_> {
    /// Tries to discharge one step of a subscript chain. Requires the
    /// principal argument to be concrete; otherwise the term stays
    /// pending and is revisited as substitutions land.
    pub(crate) fn maybe_unify_subscript(&mut self, source: TypeId, term: &TypeEquationTerm) {
        let Term::Subscript(sub) = self.store.get(source).clone() else {
            return;
        };
        if self.is_visited_type(source) || !self.is_concrete(sub.principal) {
            return;
        }

        match self.store.get(sub.principal).clone() {
            Term::Abstraction(_) => self.function_call_subscript(source, term, &sub),
            Term::Scheme(scheme) if self.store.get(scheme.ty).is_abstraction() => {
                self.scheme_function_call_subscript(source, term, sub.principal, &sub)
            }
            _ => self.non_function_subscript(source, term, &sub),
        }
    }

    fn non_function_subscript(&mut self, source: TypeId, term: &TypeEquationTerm, sub: &Subscript) {
        let Some(sub0) = sub.subscripts.first().cloned() else {
            return;
        };
        if !self.are_concrete(&sub0.arguments) {
            return;
        }

        self.register_visited_type(source);

        if self.has_custom_subsref_method(sub.principal) {
            //  Custom subsref implementations are not modelled.
            let argument = self.describe(sub.principal);
            self.errors.push(TypeError::UnhandledCustomSubscripts {
                argument,
                token: term.source_token.clone(),
            });
            return;
        }

        //  A tuple is not callable; `t(1)` on a tuple is an invalid
        //  invocation rather than identity indexing.
        if sub0.method == SubscriptMethod::Parens && self.store.get(sub.principal).is_tuple() {
            let function = self.describe(sub.principal);
            self.errors.push(TypeError::InvalidFunctionInvocation {
                function,
                token: term.source_token.clone(),
            });
            return;
        }

        if !self.are_valid_subscript_arguments(sub.principal, &sub0) {
            let function = self.describe(source);
            self.errors.push(TypeError::UnresolvedFunction {
                function,
                token: term.source_token.clone(),
            });
            return;
        }

        let next = match sub0.method {
            //  Default parens subscripts index into the principal itself.
            SubscriptMethod::Parens => Some(sub.principal),
            SubscriptMethod::Period => {
                let record = match self.store.get(sub.principal) {
                    Term::Class(class) if self.store.get(class.source).is_record() => {
                        Some(class.source)
                    }
                    Term::Record(_) => Some(sub.principal),
                    _ => None,
                };
                record.and_then(|record| {
                    self.record_period_subscript(sub.principal, term, &sub0, record)
                })
            }
            SubscriptMethod::Brace => {
                if self.store.get(sub.principal).is_tuple() {
                    self.tuple_brace_subscript(source, term, sub.principal)
                } else {
                    None
                }
            }
        };

        let Some(next) = next else {
            return;
        };

        if sub.subscripts.len() == 1 {
            self.push_type_equation(TypeEquation::new(
                TypeEquationTerm::new(term.source_token.as_ref(), sub.outputs),
                TypeEquationTerm::new(term.source_token.as_ref(), next),
            ));
        } else {
            //  Re-enqueue the reduced chain as a fresh equation.
            if let Term::Subscript(stored) = self.store.get_mut(source) {
                stored.subscripts.remove(0);
                stored.principal = next;
            }
            self.unregister_visited_type(source);

            let fresh = self.store.make_fresh_variable();
            self.push_type_equation(TypeEquation::new(
                TypeEquationTerm::new(term.source_token.as_ref(), source),
                TypeEquationTerm::new(term.source_token.as_ref(), fresh),
            ));
        }
    }

    fn record_period_subscript(
        &mut self,
        principal: TypeId,
        term: &TypeEquationTerm,
        sub0: &Sub,
        record_id: TypeId,
    ) -> Option<TypeId> {
        debug_assert_eq!(sub0.arguments.len(), 1, "expected one period argument");
        let argument = *sub0.arguments.first()?;

        let Term::ConstantValue(value) = self.store.get(argument).clone() else {
            let text = self.describe(argument);
            self.errors.push(TypeError::NonConstantFieldReferenceExpr {
                argument: text,
                token: term.source_token.clone(),
            });
            return None;
        };

        let Term::Record(record) = self.store.get(record_id).clone() else {
            return None;
        };

        let field = record.fields.iter().find(|field| {
            matches!(self.store.get(field.name), Term::ConstantValue(existing) if *existing == value)
        });

        match field {
            Some(field) => Some(field.ty),
            None => {
                let argument_text = self.describe(principal);
                let field_text = self.describe(argument);
                self.errors.push(TypeError::NonexistentFieldReference {
                    argument: argument_text,
                    field: field_text,
                    token: term.source_token.clone(),
                });
                None
            }
        }
    }

    fn tuple_brace_subscript(
        &mut self,
        source: TypeId,
        term: &TypeEquationTerm,
        principal: TypeId,
    ) -> Option<TypeId> {
        let Term::Tuple(members) = self.store.get(principal).clone() else {
            return None;
        };
        if members.is_empty() {
            let function = self.describe(source);
            self.errors.push(TypeError::UnresolvedFunction {
                function,
                token: term.source_token.clone(),
            });
            return None;
        }

        let first = members[0];
        for &member in &members[1..] {
            self.push_type_equation(TypeEquation::new(
                TypeEquationTerm::new(term.source_token.as_ref(), first),
                TypeEquationTerm::new(term.source_token.as_ref(), member),
            ));
        }

        //  Brace indexing picks one element; a multi-member list pattern
        //  yields the union of its alternatives.
        if let Term::List(pattern) = self.store.get(first).clone() {
            match pattern.len() {
                0 => Some(first),
                1 => Some(pattern[0]),
                _ => Some(self.store.make_union(pattern)),
            }
        } else {
            Some(first)
        }
    }

    fn has_custom_subsref_method(&self, principal: TypeId) -> bool {
        self.library
            .class_for_type(self.store, principal)
            .is_some_and(|class| {
                self.library
                    .method_store
                    .has_named_method(class, self.library.special.subsref)
            })
    }

    fn are_valid_subscript_arguments(&self, principal: TypeId, sub0: &Sub) -> bool {
        let principal_term = self.store.get(principal);
        match sub0.method {
            SubscriptMethod::Brace => {
                principal_term.is_tuple() && self.arguments_have_subsindex_defined(&sub0.arguments)
            }
            SubscriptMethod::Parens => self.arguments_have_subsindex_defined(&sub0.arguments),
            SubscriptMethod::Period => {
                principal_term.is_record() || principal_term.is_class()
            }
        }
    }

    fn arguments_have_subsindex_defined(&self, arguments: &[TypeId]) -> bool {
        let subsindex = self.library.special.subsindex;

        for &argument in arguments {
            let lookup = if self.store.get(argument).is_destructured_tuple() {
                match self.store.first_non_destructured_tuple_member(argument) {
                    Some(member) => member,
                    None => return false,
                }
            } else {
                argument
            };

            let Some(class) = self.library.class_for_type(self.store, lookup) else {
                return false;
            };
            if !self.library.method_store.has_named_method(class, subsindex) {
                return false;
            }
        }

        true
    }

    /// `f(args)` where the principal is a function type: exactly one
    /// parens subscript, whose arguments become the call signature.
    fn function_call_subscript(&mut self, source: TypeId, term: &TypeEquationTerm, sub: &Subscript) {
        if sub.subscripts.len() != 1 || sub.subscripts[0].method != SubscriptMethod::Parens {
            self.register_visited_type(source);
            let function = self.describe(sub.principal);
            self.errors.push(TypeError::InvalidFunctionInvocation {
                function,
                token: term.source_token.clone(),
            });
            return;
        }

        let sub0 = &sub.subscripts[0];
        if !self.are_concrete(&sub0.arguments) {
            return;
        }

        let Term::Abstraction(func) = self.store.get(sub.principal).clone() else {
            return;
        };

        let inputs = self
            .store
            .make_rvalue_destructured_tuple(sub0.arguments.clone());
        let result = self.store.make_fresh_variable();
        let lookup = self.store.make_abstraction(func.kind, inputs, result);

        self.push_type_equation(TypeEquation::new(
            TypeEquationTerm::new(term.source_token.as_ref(), sub.outputs),
            TypeEquationTerm::new(term.source_token.as_ref(), result),
        ));
        self.push_type_equation(TypeEquation::new(
            TypeEquationTerm::new(term.source_token.as_ref(), sub.principal),
            TypeEquationTerm::new(term.source_token.as_ref(), lookup),
        ));

        //  The principal header resolves through the lookup clone.
        self.register_visited_type(sub.principal);
        self.check_push_function(lookup, term);
        self.register_visited_type(source);
    }

    fn scheme_function_call_subscript(
        &mut self,
        source: TypeId,
        term: &TypeEquationTerm,
        scheme_id: TypeId,
        sub: &Subscript,
    ) {
        if sub.subscripts.len() != 1 || sub.subscripts[0].method != SubscriptMethod::Parens {
            self.register_visited_type(source);
            let function = self.describe(sub.principal);
            self.errors.push(TypeError::InvalidFunctionInvocation {
                function,
                token: term.source_token.clone(),
            });
            return;
        }

        let sub0 = &sub.subscripts[0];
        if !self.are_concrete(&sub0.arguments) {
            return;
        }

        let instance = self.instantiate(scheme_id);
        let Term::Abstraction(instance_func) = self.store.get(instance).clone() else {
            return;
        };

        self.push_type_equation(TypeEquation::new(
            TypeEquationTerm::new(term.source_token.as_ref(), sub.outputs),
            TypeEquationTerm::new(term.source_token.as_ref(), instance_func.outputs),
        ));

        let new_inputs = self
            .store
            .make_rvalue_destructured_tuple(sub0.arguments.clone());
        self.push_type_equation(TypeEquation::new(
            TypeEquationTerm::new(term.source_token.as_ref(), new_inputs),
            TypeEquationTerm::new(term.source_token.as_ref(), instance_func.inputs),
        ));

        self.register_visited_type(source);
    }
}
