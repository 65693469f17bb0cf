use rustc_hash::FxHashMap;

use crate::def::VariableDefId;
use crate::ident::Ident;

slotmap::new_key_type! { pub struct ScopeId; }

#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub variables: FxHashMap<Ident, VariableDefId>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            variables: FxHashMap::default(),
        }
    }
}
