use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::error::HirError;
use crate::ident::Ident;

slotmap::new_key_type! { pub struct CandidateId; }

/// An opaque, stable reference to a resolvable definition file. Two
/// lookups of the same file return the same `CandidateId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: Ident,
    pub defining_file: PathBuf,
}

/// Locates unresolved external functions by name.
///
/// Candidates living in the requesting file's own directory (private
/// functions) take precedence over entries registered from the general
/// path.
#[derive(Debug, Default)]
pub struct SearchPath {
    candidates: SlotMap<CandidateId, Candidate>,
    by_name: FxHashMap<Ident, Vec<CandidateId>>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a search path from a file listing one directory per line.
    /// Every `*.m` file stem in each directory becomes a candidate.
    pub fn from_path_file(path: &Path) -> Result<Self, HirError> {
        let mut search_path = Self::new();
        let contents = std::fs::read_to_string(path).map_err(|source| HirError::SearchPathFile {
            path: path.to_path_buf(),
            source,
        })?;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            search_path.add_directory(Path::new(line))?;
        }
        Ok(search_path)
    }

    pub fn add_directory(&mut self, dir: &Path) -> Result<(), HirError> {
        let entries = std::fs::read_dir(dir).map_err(|source| HirError::SearchPathDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| HirError::SearchPathDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "m")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                self.add_candidate(Ident::new(stem), path.clone());
            }
        }
        Ok(())
    }

    pub fn add_candidate(&mut self, name: Ident, defining_file: PathBuf) -> CandidateId {
        if let Some(existing) = self
            .by_name
            .get(&name)
            .into_iter()
            .flatten()
            .find(|id| self.candidates[**id].defining_file == defining_file)
        {
            return *existing;
        }
        let id = self.candidates.insert(Candidate {
            name,
            defining_file,
        });
        self.by_name.entry(name).or_default().push(id);
        id
    }

    pub fn candidate(&self, id: CandidateId) -> &Candidate {
        &self.candidates[id]
    }

    pub fn search_for(&self, name: Ident, from_directory: Option<&Path>) -> Option<CandidateId> {
        let ids = self.by_name.get(&name)?;
        if let Some(dir) = from_directory
            && let Some(private) = ids
                .iter()
                .find(|id| self.candidates[**id].defining_file.parent() == Some(dir))
        {
            return Some(*private);
        }
        ids.first().copied()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
