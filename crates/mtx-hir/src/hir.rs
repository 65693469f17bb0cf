use slotmap::SlotMap;

use crate::def::{
    ClassDef, ClassDefId, FunctionDef, FunctionDefId, FunctionReference, FunctionRefId,
    VariableDef, VariableDefId,
};
use crate::ident::Ident;
use crate::scope::{Scope, ScopeId};
use crate::source::SourceMap;

/// The resolved program: sources, definitions, references, and scopes.
///
/// A front end (or a test) populates this container, then hands it to the
/// type checker together with one `RootBlock` per file.
#[derive(Debug, Default)]
pub struct Hir {
    pub sources: SourceMap,
    functions: SlotMap<FunctionDefId, FunctionDef>,
    variables: SlotMap<VariableDefId, VariableDef>,
    classes: SlotMap<ClassDefId, ClassDef>,
    references: SlotMap<FunctionRefId, FunctionReference>,
    scopes: SlotMap<ScopeId, Scope>,
}

impl Hir {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.insert(Scope::new(parent))
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn add_function(&mut self, def: FunctionDef) -> FunctionDefId {
        self.functions.insert(def)
    }

    pub fn function(&self, id: FunctionDefId) -> &FunctionDef {
        &self.functions[id]
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassDefId {
        self.classes.insert(def)
    }

    pub fn class(&self, id: ClassDefId) -> &ClassDef {
        &self.classes[id]
    }

    pub fn class_mut(&mut self, id: ClassDefId) -> &mut ClassDef {
        &mut self.classes[id]
    }

    pub fn add_reference(&mut self, reference: FunctionReference) -> FunctionRefId {
        self.references.insert(reference)
    }

    pub fn reference(&self, id: FunctionRefId) -> &FunctionReference {
        &self.references[id]
    }

    pub fn variable(&self, id: VariableDefId) -> &VariableDef {
        &self.variables[id]
    }

    /// Declares `name` in `scope`, returning the existing definition if
    /// the name is already bound there.
    pub fn declare_variable(&mut self, scope: ScopeId, name: Ident) -> VariableDefId {
        if let Some(existing) = self.scopes[scope].variables.get(&name) {
            return *existing;
        }
        let def = self.variables.insert(VariableDef { name });
        self.scopes[scope].variables.insert(name, def);
        def
    }

    /// Resolves `name` by walking the scope chain outward.
    pub fn lookup_variable(&self, scope: ScopeId, name: Ident) -> Option<VariableDefId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id];
            if let Some(def) = scope.variables.get(&name) {
                return Some(*def);
            }
            current = scope.parent;
        }
        None
    }

    pub fn variables(&self) -> impl Iterator<Item = (VariableDefId, &VariableDef)> {
        self.variables.iter()
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionDefId, &FunctionDef)> {
        self.functions.iter()
    }
}
