//! Regular-expression matching for asset and filter selection.
//!
//! A malformed expression never raises: it simply matches nothing.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// A lazily compiled regular expression.
///
/// The empty pattern matches every string, the empty string included.
#[derive(Clone, Default)]
pub struct Pattern {
    source: String,
    compiled: OnceLock<Option<Regex>>,
}

impl Pattern {
    /// Wrap a raw regular expression.
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            source: regex.into(),
            compiled: OnceLock::new(),
        }
    }

    /// Match any filename ending with one of `extensions` (given without the dot).
    ///
    /// ```ignore
    /// let p = Pattern::extensions(["js", "ts"]);
    /// assert!(p.matches("app.ts"));
    /// ```
    pub fn extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<_> = extensions
            .into_iter()
            .map(|ext| format!(r"(\.{}$)", ext.as_ref()))
            .collect();
        Self::new(alternatives.join("|"))
    }

    /// The raw expression.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Test `s` against the pattern. Compile errors yield `false`.
    pub fn matches(&self, s: &str) -> bool {
        self.compiled
            .get_or_init(|| Regex::new(&self.source).ok())
            .as_ref()
            .is_some_and(|re| re.is_match(s))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl From<&str> for Pattern {
    fn from(regex: &str) -> Self {
        Self::new(regex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern() {
        let p = Pattern::new("");
        assert!(p.matches("XXX"));
        assert!(p.matches(""));
        assert!(Pattern::default().matches("anything"));
    }

    #[test]
    fn test_single_extension() {
        let p = Pattern::extensions(["js"]);
        assert!(!p.matches(".jsXXX"));
        assert!(!p.matches("XXXjs"));
        assert!(p.matches(".js"));
        assert!(p.matches("XXX.js"));
    }

    #[test]
    fn test_multiple_extensions() {
        let p = Pattern::extensions(["js", "ts"]);
        assert!(!p.matches("XXXjs"));
        assert!(!p.matches("XXX.cs"));
        assert!(p.matches(".js"));
        assert!(p.matches("XXX.js"));
        assert!(p.matches("XXX.ts"));
    }

    #[test]
    fn test_malformed_regex_never_matches() {
        let p = Pattern::new("(unclosed");
        assert!(!p.matches("(unclosed"));
        assert!(!p.matches(""));
    }

    #[test]
    fn test_equality_ignores_compilation_state() {
        let a = Pattern::new(r"\.css$");
        let b = Pattern::new(r"\.css$");
        assert!(a.matches("x.css"));
        assert_eq!(a, b);
    }
}
