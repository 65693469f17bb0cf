use crate::ident::Ident;
use crate::source::{SourceId, Token};

slotmap::new_key_type! { pub struct FunctionDefId; }
slotmap::new_key_type! { pub struct VariableDefId; }
slotmap::new_key_type! { pub struct ClassDefId; }
slotmap::new_key_type! { pub struct FunctionRefId; }

/// A function input or output parameter. An ignored parameter (`~` in the
/// surface language) has no name; a vararg parameter stands for the tail
/// of the argument or output list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<Ident>,
    pub is_vararg: bool,
}

impl Param {
    pub fn named(name: Ident) -> Self {
        Self {
            name: Some(name),
            is_vararg: false,
        }
    }

    pub fn vararg(name: Ident) -> Self {
        Self {
            name: Some(name),
            is_vararg: true,
        }
    }

    pub fn ignored() -> Self {
        Self {
            name: None,
            is_vararg: false,
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.name.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionAttributes {
    pub is_method: bool,
    pub is_static: bool,
    pub is_constructor: bool,
}

impl FunctionAttributes {
    pub fn method() -> Self {
        Self {
            is_method: true,
            ..Self::default()
        }
    }

    pub fn static_method() -> Self {
        Self {
            is_method: true,
            is_static: true,
            is_constructor: false,
        }
    }

    pub fn constructor() -> Self {
        Self {
            is_method: true,
            is_static: false,
            is_constructor: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: Ident,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub attributes: FunctionAttributes,
    pub name_token: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDef {
    pub name: Ident,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: Ident,
    pub superclasses: Vec<ClassDefId>,
    pub properties: Vec<Ident>,
}

/// A classified use of a function identifier. `def` is set when the name
/// resolved to a local definition; otherwise the name must be located on
/// the search path, preferring the private directory of `source`.
#[derive(Debug, Clone)]
pub struct FunctionReference {
    pub name: Ident,
    pub def: Option<FunctionDefId>,
    pub source: Option<SourceId>,
}

impl FunctionReference {
    pub fn local(name: Ident, def: FunctionDefId) -> Self {
        Self {
            name,
            def: Some(def),
            source: None,
        }
    }

    pub fn external(name: Ident, source: Option<SourceId>) -> Self {
        Self {
            name,
            def: None,
            source,
        }
    }
}
