//! Tutoring Prompts
//!
//! The three fixed instructions that drive the tutor: the in-scope tutoring
//! system turn, the scope classifier instruction and the out-of-scope
//! redirect instruction. Defaults are built in; a prompts directory of
//! `*.md` files can override any of them by file stem.

use crate::error::PromptError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const TUTOR_SYSTEM_KEY: &str = "tutor_system";
pub const SCOPE_CLASSIFIER_KEY: &str = "scope_classifier";
pub const SCOPE_REDIRECT_KEY: &str = "scope_redirect";

const DEFAULT_TUTOR_SYSTEM: &str = "You are a helpful, friendly AI tutor for 3rd year Algerian high school students. \
You only help with topics from the Algerian BAC curriculum for Math, Physics, and Science. \
If a user asks about something else, kindly say so.";

const DEFAULT_SCOPE_CLASSIFIER: &str = "You are a strict classifier. Your job is to say whether a question is about \
3rd year Algerian high school Math, Physics, or Science (BAC curriculum). \
Only respond with 'YES' or 'NO'.";

const DEFAULT_SCOPE_REDIRECT: &str = "You are a tutor assistant that kindly explains you can only help with the 3rd year Algerian high school BAC curriculum \
in Math, Physics, or Science. Be polite and helpful.";

/// The instructions used by the classifier and the responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorPrompts {
    /// System turn every tutoring session starts with.
    pub tutor_system: String,
    pub scope_classifier: String,
    pub scope_redirect: String,
}

impl Default for TutorPrompts {
    fn default() -> Self {
        Self {
            tutor_system: DEFAULT_TUTOR_SYSTEM.to_string(),
            scope_classifier: DEFAULT_SCOPE_CLASSIFIER.to_string(),
            scope_redirect: DEFAULT_SCOPE_REDIRECT.to_string(),
        }
    }
}

impl TutorPrompts {
    /// Builds prompts from a key/template map, falling back to the built-in
    /// text for any key the map lacks.
    pub fn from_map(mut prompts: HashMap<String, String>) -> Self {
        let mut take = |key: &str, default: &str| {
            prompts
                .remove(key)
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| {
                    debug!(prompt = key, "Using built-in prompt");
                    default.to_string()
                })
        };
        Self {
            tutor_system: take(TUTOR_SYSTEM_KEY, DEFAULT_TUTOR_SYSTEM),
            scope_classifier: take(SCOPE_CLASSIFIER_KEY, DEFAULT_SCOPE_CLASSIFIER),
            scope_redirect: take(SCOPE_REDIRECT_KEY, DEFAULT_SCOPE_REDIRECT),
        }
    }

    /// Loads every `*.md` file in `dir`, keyed by file stem.
    pub fn load_dir(dir: &Path) -> Result<Self, PromptError> {
        let io_err = |source| PromptError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut prompts = HashMap::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "Skipping prompt file with a non UTF-8 name");
                continue;
            };
            let content = fs::read_to_string(&path).map_err(io_err)?;
            prompts.insert(key.to_string(), content);
        }
        Ok(Self::from_map(prompts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let mut map = HashMap::new();
        map.insert(SCOPE_REDIRECT_KEY.to_string(), "  Only BAC topics, sorry.\n".to_string());
        map.insert(TUTOR_SYSTEM_KEY.to_string(), "   ".to_string());

        let prompts = TutorPrompts::from_map(map);
        assert_eq!(prompts.scope_redirect, "Only BAC topics, sorry.");
        assert_eq!(prompts.tutor_system, TutorPrompts::default().tutor_system);
        assert!(prompts.scope_classifier.contains("'YES' or 'NO'"));
    }

    #[test]
    fn test_load_dir_reads_markdown_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("scope_classifier.md"), "Answer YES or NO.").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let prompts = TutorPrompts::load_dir(dir.path()).unwrap();
        assert_eq!(prompts.scope_classifier, "Answer YES or NO.");
        assert_eq!(prompts.scope_redirect, TutorPrompts::default().scope_redirect);
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            TutorPrompts::load_dir(&missing),
            Err(PromptError::Io { .. })
        ));
    }
}
