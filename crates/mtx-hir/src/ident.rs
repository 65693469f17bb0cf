use std::sync::{LazyLock, Mutex};

use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

static STRING_INTERNER: LazyLock<Mutex<StringInterner<DefaultBackend>>> =
    LazyLock::new(|| Mutex::new(StringInterner::default()));

/// An interned identifier.
///
/// Identifiers are registered in a process-wide interner guarded by a
/// mutex, so a scanner or parser running on another thread may intern
/// concurrently with the checker. Equality and hashing are on the symbol,
/// not the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(DefaultSymbol);

impl Ident {
    pub fn new(s: &str) -> Self {
        Self(STRING_INTERNER.lock().unwrap().get_or_intern(s))
    }

    /// Registers a compound identifier `a.b.c` as a single symbol whose
    /// textual form is the dotted join of the components.
    pub fn compound(components: &[Ident]) -> Self {
        let joined = {
            let interner = STRING_INTERNER.lock().unwrap();
            components
                .iter()
                .map(|c| interner.resolve(c.0).unwrap())
                .collect::<Vec<_>>()
                .join(".")
        };
        Self::new(&joined)
    }

    pub fn as_str(&self) -> String {
        STRING_INTERNER
            .lock()
            .unwrap()
            .resolve(self.0)
            .unwrap()
            .to_string()
    }

    pub fn resolve_with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let interner = STRING_INTERNER.lock().unwrap();
        let resolved = interner.resolve(self.0).unwrap();
        f(resolved)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.resolve_with(|s| write!(f, "{}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_stable() {
        let a = Ident::new("sum");
        let b = Ident::new("sum");
        let c = Ident::new("min");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "sum");
    }

    #[test]
    fn test_compound_ident() {
        let parts = [Ident::new("pkg"), Ident::new("inner"), Ident::new("f")];
        let compound = Ident::compound(&parts);
        assert_eq!(compound.as_str(), "pkg.inner.f");
        assert_eq!(compound, Ident::new("pkg.inner.f"));
    }
}
