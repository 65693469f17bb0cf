//! Type terms for the mtx type system.
//!
//! Every term lives in the session's `TypeStore` and is identified by its
//! `TypeId`; two terms are the same type exactly when their ids are equal,
//! unless an equivalence or subtype relation says otherwise. The unifier
//! rewrites the interior of compound terms in place as substitutions are
//! applied, so ids stay stable for the whole checking session.

use mtx_hir::{
    BinaryOperator, ConcatenationDirection, FunctionRefId, Ident, SubscriptMethod, Token,
    UnaryOperator,
};

slotmap::new_key_type! {
    /// Stable identity of a type term within a `TypeStore`.
    pub struct TypeId;
}

/// Small integer tag identifying type variables, parameter packs, and
/// nominal scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentifier(pub u64);

/// A literal used as a record field key.
#[derive(Debug, Clone, Copy)]
pub enum ConstantValue {
    Int(i64),
    Double(f64),
    Char(Ident),
}

impl PartialEq for ConstantValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstantValue::Int(a), ConstantValue::Int(b)) => a == b,
            (ConstantValue::Double(a), ConstantValue::Double(b)) => a.to_bits() == b.to_bits(),
            (ConstantValue::Char(a), ConstantValue::Char(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ConstantValue {}

impl ConstantValue {
    pub fn is_char(&self) -> bool {
        matches!(self, ConstantValue::Char(_))
    }
}

/// How a destructured tuple flattens in argument or return position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    Rvalue,
    Lvalue,
    DefinitionInputs,
    DefinitionOutputs,
}

impl Usage {
    pub fn is_value(self) -> bool {
        matches!(self, Usage::Rvalue | Usage::Lvalue)
    }

    pub fn is_definition(self) -> bool {
        matches!(self, Usage::DefinitionInputs | Usage::DefinitionOutputs)
    }

    pub fn is_outputs(self) -> bool {
        self == Usage::DefinitionOutputs
    }

    pub fn is_inputs(self) -> bool {
        self == Usage::DefinitionInputs
    }
}

/// What a function type is a type *of*: an operator, a subscript
/// reference, a named function, a concatenation, or an anonymous function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbstractionKind {
    UnaryOperator(UnaryOperator),
    BinaryOperator(BinaryOperator),
    Subscript(SubscriptMethod),
    Function {
        name: Ident,
        reference: Option<FunctionRefId>,
    },
    Concatenation(ConcatenationDirection),
    Anonymous,
}

impl AbstractionKind {
    pub fn function(name: Ident, reference: Option<FunctionRefId>) -> Self {
        AbstractionKind::Function { name, reference }
    }

    pub fn header(&self) -> Header {
        match self {
            AbstractionKind::UnaryOperator(op) => Header::UnaryOperator(*op),
            AbstractionKind::BinaryOperator(op) => Header::BinaryOperator(*op),
            AbstractionKind::Subscript(method) => Header::Subscript(*method),
            AbstractionKind::Function { name, .. } => Header::Function(*name),
            AbstractionKind::Concatenation(dir) => Header::Concatenation(*dir),
            AbstractionKind::Anonymous => Header::Anonymous,
        }
    }
}

/// The hashable identity of an abstraction: kind plus operator, name, or
/// direction. The reference handle is deliberately excluded so that two
/// uses of the same named function share a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Header {
    UnaryOperator(UnaryOperator),
    BinaryOperator(BinaryOperator),
    Subscript(SubscriptMethod),
    Function(Ident),
    Concatenation(ConcatenationDirection),
    Anonymous,
}

/// A function type. `inputs` is a DestructuredTuple with definition-inputs
/// usage once resolved; `outputs` with definition-outputs usage.
#[derive(Debug, Clone)]
pub struct Abstraction {
    pub kind: AbstractionKind,
    pub inputs: TypeId,
    pub outputs: TypeId,
}

impl Abstraction {
    pub fn header(&self) -> Header {
        self.kind.header()
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self.kind, AbstractionKind::Anonymous)
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, AbstractionKind::Function { .. })
    }

    pub fn reference(&self) -> Option<FunctionRefId> {
        match self.kind {
            AbstractionKind::Function { reference, .. } => reference,
            _ => None,
        }
    }

    pub fn name(&self) -> Option<Ident> {
        match self.kind {
            AbstractionKind::Function { name, .. } => Some(name),
            _ => None,
        }
    }

    /// A copy of this abstraction's kind attached to a new signature.
    pub fn with_signature(&self, inputs: TypeId, outputs: TypeId) -> Abstraction {
        Abstraction {
            kind: self.kind.clone(),
            inputs,
            outputs,
        }
    }
}

/// A pending call whose resolution must pick an `Abstraction`.
#[derive(Debug, Clone)]
pub struct Application {
    pub abstraction: TypeId,
    pub inputs: TypeId,
    pub outputs: TypeId,
}

/// One link of a subscript chain.
#[derive(Debug, Clone)]
pub struct Sub {
    pub method: SubscriptMethod,
    pub arguments: Vec<TypeId>,
}

/// A pending chain of subscripts `a(x){y}.z`.
#[derive(Debug, Clone)]
pub struct Subscript {
    pub principal: TypeId,
    pub subscripts: Vec<Sub>,
    pub outputs: TypeId,
}

/// A row-typed record field; `name` is a ConstantValue term.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: TypeId,
    pub ty: TypeId,
}

#[derive(Debug, Clone, Default)]
pub struct Record {
    pub fields: Vec<Field>,
}

/// A nominal wrapper carrying methods and a place in the subtype lattice.
/// `source` is typically a Record; supertypes form a DAG.
#[derive(Debug, Clone)]
pub struct ClassType {
    pub name: Ident,
    pub source: TypeId,
    pub supertypes: Vec<TypeId>,
}

/// A forall-quantified type. `parameters` contains only Variable and
/// Parameters terms; `constraints` must hold at every instantiation site.
#[derive(Debug, Clone)]
pub struct Scheme {
    pub ty: TypeId,
    pub parameters: Vec<TypeId>,
    pub constraints: Vec<TypeEquation>,
}

#[derive(Debug, Clone)]
pub enum Term {
    Variable(TypeIdentifier),
    Parameters(TypeIdentifier),
    Scalar(TypeIdentifier),
    ConstantValue(ConstantValue),
    Tuple(Vec<TypeId>),
    DestructuredTuple(Usage, Vec<TypeId>),
    List(Vec<TypeId>),
    Union(Vec<TypeId>),
    Record(Record),
    Class(ClassType),
    Alias(TypeId),
    Abstraction(Abstraction),
    Application(Application),
    Subscript(Subscript),
    Scheme(Scheme),
    Assignment { lhs: TypeId, rhs: TypeId },
}

impl Term {
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    pub fn is_parameters(&self) -> bool {
        matches!(self, Term::Parameters(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Term::Scalar(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Term::Tuple(_))
    }

    pub fn is_destructured_tuple(&self) -> bool {
        matches!(self, Term::DestructuredTuple(..))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Term::List(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Term::Union(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Term::Record(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Term::Class(_))
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, Term::Alias(_))
    }

    pub fn is_abstraction(&self) -> bool {
        matches!(self, Term::Abstraction(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Term::Application(_))
    }

    pub fn is_scheme(&self) -> bool {
        matches!(self, Term::Scheme(_))
    }

    pub fn is_constant_value(&self) -> bool {
        matches!(self, Term::ConstantValue(_))
    }

    pub fn same_tag(&self, other: &Term) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// One side of a type equation, tagged with the token it arose from so
/// failures surface at their cause.
#[derive(Debug, Clone)]
pub struct TypeEquationTerm {
    pub source_token: Option<Token>,
    pub term: TypeId,
}

impl TypeEquationTerm {
    pub fn new(source_token: Option<&Token>, term: TypeId) -> Self {
        Self {
            source_token: source_token.cloned(),
            term,
        }
    }
}

impl PartialEq for TypeEquationTerm {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term
    }
}

impl Eq for TypeEquationTerm {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEquation {
    pub lhs: TypeEquationTerm,
    pub rhs: TypeEquationTerm,
}

impl TypeEquation {
    pub fn new(lhs: TypeEquationTerm, rhs: TypeEquationTerm) -> Self {
        Self { lhs, rhs }
    }
}
