use std::path::{Path, PathBuf};

use slotmap::SlotMap;
use smol_str::SmolStr;

slotmap::new_key_type! { pub struct SourceId; }

/// A checked file known to the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// A source token: the lexeme plus enough location information to render
/// `<path> <row>:<col>` diagnostics. Tokens are attached to type
/// equations, never to types, so errors surface at their cause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub lexeme: SmolStr,
    pub source: Option<SourceId>,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(lexeme: &str, source: SourceId, line: u32, column: u32) -> Self {
        Self {
            lexeme: SmolStr::new(lexeme),
            source: Some(source),
            line,
            column,
        }
    }

    /// A token with no backing file, for generated terms and tests.
    pub fn synthetic(lexeme: &str) -> Self {
        Self {
            lexeme: SmolStr::new(lexeme),
            source: None,
            line: 0,
            column: 0,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

/// Registry of source files for location rendering.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: SlotMap<SourceId, SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: PathBuf) -> SourceId {
        self.files.insert(SourceFile::new(path))
    }

    pub fn file(&self, id: SourceId) -> Option<&SourceFile> {
        self.files.get(id)
    }

    pub fn path(&self, id: SourceId) -> Option<&Path> {
        self.files.get(id).map(|f| f.path.as_path())
    }

    pub fn describe(&self, token: &Token) -> String {
        match token.source.and_then(|id| self.files.get(id)) {
            Some(file) => format!("{} {}:{}", file.path.display(), token.line, token.column),
            None => format!("<generated> `{}`", token.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known_file() {
        let mut sources = SourceMap::new();
        let id = sources.add_file(PathBuf::from("lib/f.m"));
        let token = Token::new("x", id, 3, 7);
        assert_eq!(sources.describe(&token), "lib/f.m 3:7");
    }

    #[test]
    fn test_describe_synthetic() {
        let sources = SourceMap::new();
        let token = Token::synthetic("deal");
        assert_eq!(sources.describe(&token), "<generated> `deal`");
    }
}
