//! Stand-in variables for functions discovered on the search path.

use rustc_hash::FxHashMap;

use mtx_hir::CandidateId;

use crate::store::TypeStore;
use crate::types::TypeId;

/// Maps each file candidate to the fresh variable standing in for its
/// eventual type. The driver fulfils candidates by checking the file and
/// linking its top-level function type to the stand-in.
#[derive(Debug, Default)]
pub struct PendingExternalFunctions {
    pub candidates: FxHashMap<CandidateId, TypeId>,
}

impl PendingExternalFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_candidate(&self, candidate: CandidateId) -> bool {
        self.candidates.contains_key(&candidate)
    }

    pub fn add_candidate(&mut self, candidate: CandidateId, ty: TypeId) {
        self.candidates.insert(candidate, ty);
    }

    /// The stand-in variable for `candidate`, created on first request.
    pub fn require_candidate_type(
        &mut self,
        candidate: CandidateId,
        store: &mut TypeStore,
    ) -> TypeId {
        if let Some(&ty) = self.candidates.get(&candidate) {
            return ty;
        }
        let ty = store.make_fresh_variable();
        self.candidates.insert(candidate, ty);
        ty
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtx_hir::{Ident, SearchPath};
    use std::path::PathBuf;

    #[test]
    fn test_candidate_types_are_stable() {
        let mut store = TypeStore::new();
        let mut pending = PendingExternalFunctions::new();
        let mut search_path = SearchPath::new();
        let candidate = search_path.add_candidate(Ident::new("f"), PathBuf::from("lib/f.m"));

        let first = pending.require_candidate_type(candidate, &mut store);
        let second = pending.require_candidate_type(candidate, &mut store);
        assert_eq!(first, second);
        assert_eq!(pending.len(), 1);
    }
}
