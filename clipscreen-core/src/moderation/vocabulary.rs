// clipscreen-core/src/moderation/vocabulary.rs
//
// Category -> words catalog the moderator compares frames against. Words can
// be appended at runtime but never removed. Every effective insertion bumps a
// version counter; the text-embedding cache watches that counter.
//
// Categories keep their insertion order, which is also the order they are
// evaluated in and the order they serialize in.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

const DEFAULT_CATALOG: &[(&str, &[&str])] = &[
    (
        "violence",
        &[
            "violence", "fight", "fighting", "attack", "assault", "battle", "war", "combat",
            "blood", "bloody", "gore", "injury", "wound", "bruise", "cut", "stab", "shoot",
            "gun", "rifle", "pistol", "weapon", "knife", "sword", "bomb", "explosion", "death",
            "dead", "corpse", "murder", "kill", "killing", "homicide",
        ],
    ),
    (
        "sexual",
        &[
            "nude", "naked", "sexual", "pornographic", "explicit", "adult content", "intimate",
            "provocative", "suggestive",
        ],
    ),
    (
        "drugs",
        &[
            "drugs", "cocaine", "heroin", "marijuana", "weed", "alcohol abuse",
            "substance abuse", "illegal drugs", "drug paraphernalia",
        ],
    ),
    (
        "hate_speech",
        &[
            "hate", "racist", "discrimination", "offensive", "slur", "bigotry", "extremist",
            "terrorist", "hate speech",
        ],
    ),
    (
        "self_harm",
        &["self harm", "suicide", "cutting", "self injury", "self mutilation"],
    ),
];

/// One category and its words, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVocabulary {
    categories: Vec<Category>,
    version: u64,
}

impl ModerationVocabulary {
    /// An empty vocabulary at version 0.
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
            version: 0,
        }
    }

    /// Builds a vocabulary from `(category, words)` pairs. Duplicate words
    /// within a category are dropped; repeated categories are merged.
    pub fn from_pairs<I, C, W, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, W)>,
        C: Into<String>,
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Self::empty();
        for (category, words) in pairs {
            let category = category.into();
            vocabulary.ensure_category(&category);
            for word in words {
                vocabulary.add_word(&category, word.into());
            }
        }
        vocabulary.version = 0;
        vocabulary
    }

    /// Loads a `{"category": ["word", ...]}` JSON file.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("cannot read vocabulary {}: {e}", path.display()))
        })?;
        let vocabulary: Self = serde_json::from_str(&text)?;
        if vocabulary.word_count() == 0 {
            return Err(CoreError::Config(format!(
                "vocabulary {} contains no words",
                path.display()
            )));
        }
        log::info!(
            "Loaded {} words in {} categories from {}",
            vocabulary.word_count(),
            vocabulary.categories.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn word_count(&self) -> usize {
        self.categories.iter().map(|c| c.words.len()).sum()
    }

    pub fn contains(&self, category: &str, word: &str) -> bool {
        self.category(category)
            .is_some_and(|c| c.words.iter().any(|w| w == word))
    }

    /// Appends `word` to `category`, creating the category if needed.
    /// Returns whether anything changed; only a change bumps the version.
    pub fn add_word(&mut self, category: &str, word: impl Into<String>) -> bool {
        let word = word.into();
        let index = self.ensure_category(category);
        let words = &mut self.categories[index].words;
        if words.contains(&word) {
            return false;
        }
        words.push(word);
        self.version += 1;
        true
    }

    fn ensure_category(&mut self, name: &str) -> usize {
        if let Some(index) = self.categories.iter().position(|c| c.name == name) {
            return index;
        }
        self.categories.push(Category {
            name: name.to_string(),
            words: Vec::new(),
        });
        self.categories.len() - 1
    }
}

impl Default for ModerationVocabulary {
    /// The built-in catalog.
    fn default() -> Self {
        Self::from_pairs(
            DEFAULT_CATALOG
                .iter()
                .map(|(category, words)| (*category, words.iter().copied())),
        )
    }
}

impl Serialize for ModerationVocabulary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(&category.name, &category.words)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ModerationVocabulary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VocabularyVisitor;

        impl<'de> Visitor<'de> for VocabularyVisitor {
            type Value = ModerationVocabulary;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category names to word lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs: Vec<(String, Vec<String>)> = Vec::new();
                while let Some((category, words)) = access.next_entry::<String, Vec<String>>()? {
                    pairs.push((category, words));
                }
                Ok(ModerationVocabulary::from_pairs(pairs))
            }
        }

        deserializer.deserialize_map(VocabularyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_five_categories_in_order() {
        let vocabulary = ModerationVocabulary::default();
        let names: Vec<&str> = vocabulary.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["violence", "sexual", "drugs", "hate_speech", "self_harm"]);
        assert!(vocabulary.contains("violence", "gun"));
        assert!(vocabulary.contains("self_harm", "self harm"));
        assert_eq!(vocabulary.version(), 0);
    }

    #[test]
    fn add_word_is_idempotent() {
        let mut vocabulary = ModerationVocabulary::default();
        let before = vocabulary.word_count();

        assert!(vocabulary.add_word("violence", "grenade"));
        let version = vocabulary.version();
        assert!(!vocabulary.add_word("violence", "grenade"));

        assert_eq!(vocabulary.version(), version);
        assert_eq!(vocabulary.word_count(), before + 1);
    }

    #[test]
    fn add_word_creates_category() {
        let mut vocabulary = ModerationVocabulary::empty();
        assert!(vocabulary.add_word("gambling", "casino"));
        assert_eq!(vocabulary.categories().len(), 1);
        assert_eq!(vocabulary.version(), 1);
    }

    #[test]
    fn words_are_case_sensitive() {
        let mut vocabulary = ModerationVocabulary::empty();
        assert!(vocabulary.add_word("c", "Gun"));
        assert!(vocabulary.add_word("c", "gun"));
        assert_eq!(vocabulary.word_count(), 2);
    }

    #[test]
    fn json_preserves_category_order() {
        let json = r#"{"zeta": ["z1", "z2", "z1"], "alpha": ["a1"]}"#;
        let vocabulary: ModerationVocabulary = serde_json::from_str(json).unwrap();
        assert_eq!(vocabulary.categories()[0].name, "zeta");
        assert_eq!(vocabulary.categories()[0].words, ["z1", "z2"]);
        assert_eq!(
            serde_json::to_string(&vocabulary).unwrap(),
            r#"{"zeta":["z1","z2"],"alpha":["a1"]}"#
        );
    }
}
