//! The library of known types: built-in scalars, free functions,
//! per-class methods, and the subtype lattice.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use mtx_hir::{CandidateId, ClassDefId, FunctionDefId, Hir, Ident, SearchPath, VariableDefId};

use crate::relate::{EquivalenceRelation, TypeRelation};
use crate::store::TypeStore;
use crate::types::{Abstraction, ClassType, Header, Term, TypeId, TypeIdentifier};

/// The outcome of resolving an abstraction against the library: a known
/// type, a file located on the search path, or neither.
#[derive(Debug, Default, Clone, Copy)]
pub struct FunctionSearchResult {
    pub resolved: Option<TypeId>,
    pub candidate: Option<CandidateId>,
}

impl FunctionSearchResult {
    pub fn resolved(ty: Option<TypeId>) -> Self {
        Self {
            resolved: ty,
            candidate: None,
        }
    }

    pub fn candidate(candidate: CandidateId) -> Self {
        Self {
            resolved: None,
            candidate: Some(candidate),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.resolved.is_none() && self.candidate.is_none()
    }
}

/// Identifiers with special meaning to the subscript handler and the
/// constraint generator.
#[derive(Debug, Clone, Copy)]
pub struct SpecialIdentifiers {
    pub subsref: Ident,
    pub subsindex: Ident,
    pub struct_constructor: Ident,
}

impl Default for SpecialIdentifiers {
    fn default() -> Self {
        Self {
            subsref: Ident::new("subsref"),
            subsindex: Ident::new("subsindex"),
            struct_constructor: Ident::new("struct"),
        }
    }
}

/// Per-class table from abstraction header to typed method. Insertion
/// order is preserved so dispatch is deterministic.
#[derive(Debug, Default)]
pub struct MethodStore {
    methods: FxHashMap<TypeId, IndexMap<Header, TypeId>>,
}

impl MethodStore {
    pub fn add_method(&mut self, class: TypeId, header: Header, ty: TypeId) {
        self.methods.entry(class).or_default().insert(header, ty);
    }

    pub fn lookup_method(&self, class: TypeId, header: &Header) -> Option<TypeId> {
        self.methods.get(&class)?.get(header).copied()
    }

    pub fn has_method(&self, class: TypeId, header: &Header) -> bool {
        self.lookup_method(class, header).is_some()
    }

    pub fn has_named_method(&self, class: TypeId, name: Ident) -> bool {
        self.has_method(class, &Header::Function(name))
    }
}

pub struct Library {
    /// Declared types of free functions and operator/subscript schemes.
    pub function_types: FxHashMap<Header, TypeId>,
    pub local_function_types: FxHashMap<FunctionDefId, TypeId>,
    pub local_class_types: FxHashMap<ClassDefId, TypeId>,
    pub local_variable_types: FxHashMap<VariableDefId, TypeId>,
    /// Class wrappers for types (e.g. scalars) that carry methods and
    /// participate in the subtype lattice.
    pub class_wrappers: FxHashMap<TypeId, TypeId>,
    /// Types for which a default `()` subscript is the identity scheme.
    pub types_with_known_subscripts: Vec<TypeId>,
    pub method_store: MethodStore,
    pub special: SpecialIdentifiers,
    scalar_names: FxHashMap<TypeIdentifier, Ident>,

    pub double_type: TypeId,
    pub char_type: TypeId,
    pub string_type: TypeId,
    pub logical_type: TypeId,
    pub sub_double_type: TypeId,
    pub sub_sub_double_type: TypeId,
}

impl Library {
    /// Creates the library with its named scalars and the builtin subtype
    /// chain `sub-sub-double <: sub-double <: double` already wired up.
    /// `builtin::install` adds the rest of the known types.
    pub fn new(store: &mut TypeStore) -> Self {
        let mut scalar_names = FxHashMap::default();
        let double_type = Self::named_scalar(store, &mut scalar_names, "double");
        let string_type = Self::named_scalar(store, &mut scalar_names, "string");
        let char_type = Self::named_scalar(store, &mut scalar_names, "char");
        let sub_double_type = Self::named_scalar(store, &mut scalar_names, "sub-double");
        let sub_sub_double_type = Self::named_scalar(store, &mut scalar_names, "sub-sub-double");
        let logical_type = Self::named_scalar(store, &mut scalar_names, "logical");

        let mut class_wrappers = FxHashMap::default();

        let double_class = store.make_class(ClassType {
            name: Ident::new("double"),
            source: double_type,
            supertypes: Vec::new(),
        });
        let sub_double_class = store.make_class(ClassType {
            name: Ident::new("sub-double"),
            source: sub_double_type,
            supertypes: vec![double_type],
        });
        let sub_sub_double_class = store.make_class(ClassType {
            name: Ident::new("sub-sub-double"),
            source: sub_sub_double_type,
            supertypes: vec![sub_double_type],
        });

        class_wrappers.insert(double_type, double_class);
        class_wrappers.insert(sub_double_type, sub_double_class);
        class_wrappers.insert(sub_sub_double_type, sub_sub_double_class);

        Self {
            function_types: FxHashMap::default(),
            local_function_types: FxHashMap::default(),
            local_class_types: FxHashMap::default(),
            local_variable_types: FxHashMap::default(),
            class_wrappers,
            types_with_known_subscripts: Vec::new(),
            method_store: MethodStore::default(),
            special: SpecialIdentifiers::default(),
            scalar_names,
            double_type,
            char_type,
            string_type,
            logical_type,
            sub_double_type,
            sub_sub_double_type,
        }
    }

    fn named_scalar(
        store: &mut TypeStore,
        names: &mut FxHashMap<TypeIdentifier, Ident>,
        name: &str,
    ) -> TypeId {
        let handle = store.make_scalar();
        let Term::Scalar(identifier) = store.get(handle) else {
            unreachable!();
        };
        names.insert(*identifier, Ident::new(name));
        handle
    }

    pub fn scalar_name(&self, identifier: TypeIdentifier) -> Option<Ident> {
        self.scalar_names.get(&identifier).copied()
    }

    pub fn type_name(&self, store: &TypeStore, id: TypeId) -> Option<Ident> {
        match store.get(id) {
            Term::Scalar(identifier) => self.scalar_name(*identifier),
            _ => None,
        }
    }

    pub fn class_wrapper(&self, ty: TypeId) -> Option<TypeId> {
        self.class_wrappers.get(&ty).copied()
    }

    /// The class term for `ty`: itself when it is a class, otherwise its
    /// registered wrapper.
    pub fn class_for_type(&self, store: &TypeStore, ty: TypeId) -> Option<TypeId> {
        if store.get(ty).is_class() {
            Some(ty)
        } else {
            self.class_wrapper(ty)
        }
    }

    /// `true` iff `lhs` and `rhs` are the same scalar, or `lhs`'s class
    /// wrapper reaches `rhs` through its supertypes.
    pub fn subtype_related(&self, store: &TypeStore, lhs: TypeId, rhs: TypeId) -> bool {
        let (Term::Scalar(a), Term::Scalar(b)) = (store.get(lhs), store.get(rhs)) else {
            return false;
        };
        if a == b {
            return true;
        }

        let Some(wrapper) = self.class_wrapper(lhs) else {
            return false;
        };
        let Term::Class(class) = store.get(wrapper) else {
            return false;
        };

        class
            .supertypes
            .iter()
            .any(|&supertype| supertype == rhs || self.subtype_related(store, supertype, rhs))
    }

    pub fn is_known_subscript_type(&self, store: &TypeStore, ty: TypeId) -> bool {
        let relation = TypeRelation::new(EquivalenceRelation, store);
        self.types_with_known_subscripts
            .iter()
            .any(|&known| relation.related_entry(known, ty))
    }

    pub fn add_type_with_known_subscript(&mut self, ty: TypeId) {
        self.types_with_known_subscripts.push(ty);
    }

    pub fn emplace_local_function_type(&mut self, handle: FunctionDefId, ty: TypeId) {
        self.local_function_types.insert(handle, ty);
    }

    pub fn emplace_local_class_type(&mut self, handle: ClassDefId, ty: TypeId) {
        self.local_class_types.insert(handle, ty);
    }

    pub fn lookup_local_function(&self, handle: FunctionDefId) -> Option<TypeId> {
        self.local_function_types.get(&handle).copied()
    }

    pub fn lookup_local_class(&self, handle: ClassDefId) -> Option<TypeId> {
        self.local_class_types.get(&handle).copied()
    }

    pub fn lookup_function(&self, header: &Header) -> Option<TypeId> {
        self.function_types.get(header).copied()
    }

    /// Resolves an abstraction whose arguments are concrete.
    ///
    /// Resolution order: the bound local definition when the reference
    /// carries one; then single dispatch on the first argument whose
    /// class defines a method with this header; then a file candidate on
    /// the search path, preferring the referencing file's own directory;
    /// then the free-function table.
    pub fn search_function(
        &self,
        store: &TypeStore,
        hir: &Hir,
        search_path: &SearchPath,
        func: &Abstraction,
    ) -> FunctionSearchResult {
        if let Some(ref_id) = func.reference()
            && let Some(def) = hir.reference(ref_id).def
        {
            return FunctionSearchResult::resolved(self.lookup_local_function(def));
        }

        debug_assert!(store.get(func.inputs).is_destructured_tuple());
        if let Term::DestructuredTuple(_, members) = store.get(func.inputs)
            && let Some(method) = self.method_dispatch(store, func, members)
        {
            return FunctionSearchResult::resolved(Some(method));
        }

        if func.is_function()
            && let Some(ref_id) = func.reference()
        {
            let reference = hir.reference(ref_id);
            let from_directory = reference
                .source
                .and_then(|source| hir.sources.path(source))
                .and_then(|path| path.parent());

            if let Some(candidate) = search_path.search_for(reference.name, from_directory) {
                return FunctionSearchResult::candidate(candidate);
            }
        }

        FunctionSearchResult::resolved(self.lookup_function(&func.header()))
    }

    /// Single dispatch: the first argument whose class defines a method
    /// with the abstraction's header wins. Classes form a DAG and method
    /// tables are insertion-ordered, so the result is deterministic.
    fn method_dispatch(
        &self,
        store: &TypeStore,
        func: &Abstraction,
        args: &[TypeId],
    ) -> Option<TypeId> {
        let header = func.header();

        for &arg in args {
            let lookup = if store.get(arg).is_destructured_tuple() {
                //  Ill-formed search when the argument is an empty tuple.
                store.first_non_destructured_tuple_member(arg)?
            } else {
                arg
            };

            if let Some(class) = self.class_for_type(store, lookup)
                && let Some(method) = self.method_store.lookup_method(class, &header)
            {
                return Some(method);
            }
        }

        None
    }
}
