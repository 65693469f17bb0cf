//! Arena for type terms.

use slotmap::SlotMap;

use mtx_hir::Ident;

use crate::types::{
    Abstraction, AbstractionKind, Application, ClassType, ConstantValue, Field, Record, Scheme,
    Sub, Subscript, Term, TypeId, TypeIdentifier, Usage,
};

/// Owns every type term for the duration of a checking session.
///
/// The store is single-writer: terms are created during constraint
/// generation and unification, and the unifier rewrites their interior
/// fields in place through `get_mut`. A term's `TypeId` never changes and
/// no term is ever freed while the store lives.
#[derive(Debug, Default)]
pub struct TypeStore {
    types: SlotMap<TypeId, Term>,
    next_identifier: u64,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            types: SlotMap::with_capacity_and_key(capacity),
            next_identifier: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, id: TypeId) -> &Term {
        &self.types[id]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut Term {
        &mut self.types[id]
    }

    fn make_identifier(&mut self) -> TypeIdentifier {
        let id = TypeIdentifier(self.next_identifier);
        self.next_identifier += 1;
        id
    }

    pub fn make(&mut self, term: Term) -> TypeId {
        self.types.insert(term)
    }

    pub fn make_fresh_variable(&mut self) -> TypeId {
        let id = self.make_identifier();
        self.types.insert(Term::Variable(id))
    }

    pub fn make_fresh_parameters(&mut self) -> TypeId {
        let id = self.make_identifier();
        self.types.insert(Term::Parameters(id))
    }

    /// A fresh nominal scalar with its own identity.
    pub fn make_scalar(&mut self) -> TypeId {
        let id = self.make_identifier();
        self.types.insert(Term::Scalar(id))
    }

    pub fn make_constant_int(&mut self, value: i64) -> TypeId {
        self.types.insert(Term::ConstantValue(ConstantValue::Int(value)))
    }

    pub fn make_constant_double(&mut self, value: f64) -> TypeId {
        self.types
            .insert(Term::ConstantValue(ConstantValue::Double(value)))
    }

    pub fn make_constant_char(&mut self, value: Ident) -> TypeId {
        self.types
            .insert(Term::ConstantValue(ConstantValue::Char(value)))
    }

    pub fn make_tuple(&mut self, members: Vec<TypeId>) -> TypeId {
        self.types.insert(Term::Tuple(members))
    }

    pub fn make_destructured_tuple(&mut self, usage: Usage, members: Vec<TypeId>) -> TypeId {
        self.types.insert(Term::DestructuredTuple(usage, members))
    }

    pub fn make_input_destructured_tuple(&mut self, members: Vec<TypeId>) -> TypeId {
        self.make_destructured_tuple(Usage::DefinitionInputs, members)
    }

    pub fn make_output_destructured_tuple(&mut self, members: Vec<TypeId>) -> TypeId {
        self.make_destructured_tuple(Usage::DefinitionOutputs, members)
    }

    pub fn make_rvalue_destructured_tuple(&mut self, members: Vec<TypeId>) -> TypeId {
        self.make_destructured_tuple(Usage::Rvalue, members)
    }

    pub fn make_lvalue_destructured_tuple(&mut self, members: Vec<TypeId>) -> TypeId {
        self.make_destructured_tuple(Usage::Lvalue, members)
    }

    pub fn make_list(&mut self, pattern: Vec<TypeId>) -> TypeId {
        self.types.insert(Term::List(pattern))
    }

    pub fn make_union(&mut self, members: Vec<TypeId>) -> TypeId {
        debug_assert!(members.len() >= 2, "a union has at least two members");
        self.types.insert(Term::Union(members))
    }

    pub fn make_record(&mut self, fields: Vec<Field>) -> TypeId {
        self.types.insert(Term::Record(Record { fields }))
    }

    pub fn make_class(&mut self, class: ClassType) -> TypeId {
        self.types.insert(Term::Class(class))
    }

    pub fn make_alias(&mut self, source: TypeId) -> TypeId {
        self.types.insert(Term::Alias(source))
    }

    pub fn make_abstraction(
        &mut self,
        kind: AbstractionKind,
        inputs: TypeId,
        outputs: TypeId,
    ) -> TypeId {
        self.types.insert(Term::Abstraction(Abstraction {
            kind,
            inputs,
            outputs,
        }))
    }

    pub fn make_application(
        &mut self,
        abstraction: TypeId,
        inputs: TypeId,
        outputs: TypeId,
    ) -> TypeId {
        self.types.insert(Term::Application(Application {
            abstraction,
            inputs,
            outputs,
        }))
    }

    pub fn make_subscript(
        &mut self,
        principal: TypeId,
        subscripts: Vec<Sub>,
        outputs: TypeId,
    ) -> TypeId {
        self.types.insert(Term::Subscript(Subscript {
            principal,
            subscripts,
            outputs,
        }))
    }

    pub fn make_scheme(&mut self, ty: TypeId, parameters: Vec<TypeId>) -> TypeId {
        self.types.insert(Term::Scheme(Scheme {
            ty,
            parameters,
            constraints: Vec::new(),
        }))
    }

    pub fn make_assignment(&mut self, lhs: TypeId, rhs: TypeId) -> TypeId {
        self.types.insert(Term::Assignment { lhs, rhs })
    }

    /// Looks through nested destructured tuples for the first leaf member.
    /// Returns `None` when an empty tuple is reached.
    pub fn first_non_destructured_tuple_member(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Term::DestructuredTuple(_, members) => {
                let first = *members.first()?;
                self.first_non_destructured_tuple_member(first)
            }
            _ => Some(id),
        }
    }
}
