//! Text patches: literal `from -> to` replacements applied before bagging.
use std::collections::BTreeMap;
use std::path::Path;

use granite_core::GraniteResult;
use tracing::{info, warn};

/// Replacements applied in lexicographic order of their `from` side.
///
/// Patches are stored lowercased and matched against lowercased text, so a
/// patch catches every capitalisation of its `from` side.
///
/// # Example
/// ```
/// use granite_classifier::patches::TextPatches;
///
/// let patches = TextPatches::from_lines("# fixes\ne-mail\temail\nu\tyou\n");
/// assert_eq!(patches.apply("Send U an E-mail"), "send you an email");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPatches {
    patches: BTreeMap<String, String>,
}

impl TextPatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tab-separated `from<TAB>to` file. Lines are trimmed and
    /// lowercased; `#` lines and blank lines are skipped.
    pub fn from_lines(content: &str) -> Self {
        let mut patches = BTreeMap::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim().to_lowercase();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = trimmed.split('\t').collect();
            match fields.as_slice() {
                [from, to] if !from.is_empty() => {
                    patches.insert(from.to_string(), to.to_string());
                }
                _ => warn!(line = index + 1, "skipping malformed text patch"),
            }
        }
        Self { patches }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> GraniteResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let result = Self::from_lines(&content);
        info!(count = result.len(), path = %path.display(), "loaded text patches");
        Ok(result)
    }

    pub fn insert(&mut self, from: &str, to: &str) {
        self.patches.insert(from.to_lowercase(), to.to_lowercase());
    }

    /// Lowercase `text` and apply every patch to it.
    pub fn apply(&self, text: &str) -> String {
        self.patches
            .iter()
            .fold(text.to_lowercase(), |acc, (from, to)| acc.replace(from.as_str(), to))
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_lines_are_skipped() {
        let patches = TextPatches::from_lines("a\tb\tc\nno tab here\n\tempty\nFoo\tBar\n");
        assert_eq!(patches.len(), 1);
        assert_eq!(patches.apply("foo"), "bar");
    }

    #[test]
    fn patches_apply_in_key_order() {
        let mut patches = TextPatches::new();
        patches.insert("b", "c");
        patches.insert("a", "b");
        assert_eq!(patches.apply("a"), "c");
        assert_eq!(patches.apply("b"), "c");
    }

    #[test]
    fn empty_patches_only_lowercase() {
        assert_eq!(TextPatches::new().apply("Hello"), "hello");
    }

    #[test]
    fn patches_match_any_capitalisation() {
        let mut patches = TextPatches::new();
        patches.insert("Colour", "Color");
        assert_eq!(patches.apply("COLOUR colour Colour"), "color color color");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patches.tsv");
        std::fs::write(&path, "colour\tcolor\n").unwrap();
        let patches = TextPatches::load(&path).unwrap();
        assert_eq!(patches.apply("colour"), "color");
    }
}
