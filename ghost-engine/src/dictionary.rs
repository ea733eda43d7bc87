//! Word validity checks.
//!
//! The game never decides on its own whether a word is real; it asks an
//! injected [`Dictionary`]. Dictionaries are built once at startup and shared
//! read-only between games.

use crate::error::DictionaryError;
use std::collections::HashSet;
use std::path::Path;

pub trait Dictionary: Send + Sync {
    /// Whether `word` is a real word. Callers pass lowercase input.
    fn contains(&self, word: &str) -> bool;
}

/// Accepts every word. Useful when no word list is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Dictionary for AcceptAll {
    fn contains(&self, _word: &str) -> bool {
        true
    }
}

/// In-memory word list, case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// One word per line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn from_file(path: &Path) -> Result<Self, DictionaryError> {
        let text = std::fs::read_to_string(path)?;
        let list = Self::parse(&text);
        if list.is_empty() {
            return Err(DictionaryError::Empty);
        }

        tracing::info!("Loaded {} words from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_word_list_is_case_insensitive() {
        let list = WordList::new(["Egg", "pea "]);
        assert!(list.contains("egg"));
        assert!(list.contains("PEA"));
        assert!(!list.contains("ham"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let list = WordList::parse("# fruit\napple\n\n  pear\n#banana\n");
        assert_eq!(list.len(), 2);
        assert!(list.contains("pear"));
        assert!(!list.contains("banana"));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "egg\npea\nham").unwrap();

        let list = WordList::from_file(file.path()).unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.contains("ham"));
    }

    #[test]
    fn test_from_empty_file_fails() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            WordList::from_file(file.path()),
            Err(DictionaryError::Empty)
        ));
    }

    #[test]
    fn test_accept_all() {
        assert!(AcceptAll.contains("anything"));
    }
}
