// ============================================================================
// clipscreen-core/src/moderation/mod.rs
// ============================================================================
//
// CONTENT MODERATION: Embedding-space screening against a word vocabulary
//
// A frame is embedded with an external image-text model and compared, by
// cosine similarity, against the embedding of every word in the moderation
// vocabulary. Each category reports its closest word; a category (and the
// frame as a whole) is flagged when its best similarity strictly exceeds the
// threshold.
//
// KEY COMPONENTS:
// - ContentModerator: owns the model, vocabulary, cache and threshold
// - EmbeddingModel: trait for the external embedding model
// - ModerationVerdict / CategoryVerdict: classification output
// - SimilarityThreshold: validated threshold in [0.0, 1.0]
// - ModerationReport: per-clip JSON report

mod cache;
mod remote;
mod report;
mod similarity;
mod vocabulary;

pub use cache::TextEmbeddingCache;
pub use remote::{RemoteEmbeddingModel, encode_png_base64};
pub use report::{FrameModeration, ModerationReport, report_file_name};
pub use similarity::cosine_similarity;
pub use vocabulary::{Category, ModerationVocabulary};

// ---- Standard library imports ----
use std::collections::BTreeMap;
use std::fmt;

// ---- External crate imports ----
use image::RgbImage;
use serde::{Deserialize, Serialize};

// ---- Internal crate imports ----
use crate::config::DEFAULT_SIMILARITY_THRESHOLD;
use crate::error::{CoreError, CoreResult};
use crate::frames::ExtractedFrame;

/// External joint image-text embedding model.
pub trait EmbeddingModel {
    fn embed_image(&self, image: &RgbImage) -> CoreResult<Vec<f32>>;

    fn embed_text(&self, text: &str) -> CoreResult<Vec<f32>>;
}

/// Cosine similarity above which content is flagged.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SimilarityThreshold(f64);

impl SimilarityThreshold {
    pub fn new(value: f64) -> CoreResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(CoreError::InvalidInput(format!(
                "threshold {value} must be between 0.0 and 1.0"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Strict comparison: a similarity equal to the threshold is not flagged.
    pub fn is_exceeded_by(self, similarity: f64) -> bool {
        similarity > self.0
    }
}

impl Default for SimilarityThreshold {
    fn default() -> Self {
        Self(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl fmt::Display for SimilarityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVerdict {
    pub max_similarity: f64,
    pub most_similar_word: Option<String>,
    pub flagged: bool,
}

/// Result of classifying one image embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub flagged: bool,
    pub max_similarity: f64,
    pub most_similar_content: Option<String>,
    pub categories: BTreeMap<String, CategoryVerdict>,
}

impl ModerationVerdict {
    /// Names of the flagged categories.
    pub fn flagged_categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, verdict)| verdict.flagged)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Classifies image embeddings against a moderation vocabulary.
///
/// Text embeddings are cached per word for the current vocabulary version.
/// Mutating operations take `&mut self`, so a moderator is never written
/// from two places at once.
pub struct ContentModerator<M: EmbeddingModel> {
    model: M,
    vocabulary: ModerationVocabulary,
    cache: TextEmbeddingCache,
    threshold: SimilarityThreshold,
}

impl<M: EmbeddingModel> fmt::Debug for ContentModerator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentModerator")
            .field("categories", &self.vocabulary.categories().len())
            .field("words", &self.vocabulary.word_count())
            .field("cached", &self.cache.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl<M: EmbeddingModel> ContentModerator<M> {
    /// Moderator with the built-in vocabulary and default threshold.
    pub fn new(model: M) -> Self {
        Self::with_vocabulary(model, ModerationVocabulary::default(), SimilarityThreshold::default())
    }

    pub fn with_vocabulary(
        model: M,
        vocabulary: ModerationVocabulary,
        threshold: SimilarityThreshold,
    ) -> Self {
        Self {
            model,
            vocabulary,
            cache: TextEmbeddingCache::new(),
            threshold,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn vocabulary(&self) -> &ModerationVocabulary {
        &self.vocabulary
    }

    pub fn threshold(&self) -> SimilarityThreshold {
        self.threshold
    }

    /// Number of cached text embeddings.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Replaces the threshold for every later check.
    pub fn set_threshold(&mut self, value: f64) -> CoreResult<()> {
        self.threshold = SimilarityThreshold::new(value)?;
        log::debug!("Similarity threshold set to {}", self.threshold);
        Ok(())
    }

    /// Appends a word to a category. Returns whether the vocabulary changed.
    pub fn add_word(&mut self, category: &str, word: &str) -> bool {
        let added = self.vocabulary.add_word(category, word);
        if added {
            log::info!("Added '{word}' to moderation category '{category}'");
        }
        added
    }

    /// Embedding of `word`, from the cache when available.
    pub fn embed_text(&mut self, word: &str) -> CoreResult<Vec<f32>> {
        cached_text_embedding(&self.model, &mut self.cache, self.vocabulary.version(), word)
            .map(<[f32]>::to_vec)
    }

    /// Compares `image_embedding` against every vocabulary word.
    ///
    /// A word whose embedding cannot be produced is logged and skipped.
    pub fn classify(&mut self, image_embedding: &[f32]) -> ModerationVerdict {
        let version = self.vocabulary.version();
        let mut categories = BTreeMap::new();
        let mut max_similarity = 0.0f64;
        let mut most_similar_content: Option<String> = None;

        for category in self.vocabulary.categories() {
            let mut category_max = 0.0f64;
            let mut category_word: Option<&str> = None;

            for word in &category.words {
                let similarity =
                    match cached_text_embedding(&self.model, &mut self.cache, version, word) {
                        Ok(text_embedding) => cosine_similarity(image_embedding, text_embedding),
                        Err(e) => {
                            log::warn!("Skipping moderation word '{word}': {e}");
                            continue;
                        }
                    };

                if similarity > category_max {
                    category_max = similarity;
                    category_word = Some(word.as_str());
                }
                if similarity > max_similarity {
                    max_similarity = similarity;
                    most_similar_content = Some(word.clone());
                }
            }

            categories.insert(
                category.name.clone(),
                CategoryVerdict {
                    max_similarity: category_max,
                    most_similar_word: category_word.map(str::to_string),
                    flagged: self.threshold.is_exceeded_by(category_max),
                },
            );
        }

        ModerationVerdict {
            flagged: self.threshold.is_exceeded_by(max_similarity),
            max_similarity,
            most_similar_content,
            categories,
        }
    }

    /// Embeds a frame and classifies it.
    pub fn moderate_frame(&mut self, frame: &ExtractedFrame) -> CoreResult<ModerationVerdict> {
        let embedding = self.model.embed_image(&frame.image).map_err(|e| match e {
            CoreError::EmbeddingFailed(_) => e,
            other => CoreError::EmbeddingFailed(format!("image embedding: {other}")),
        })?;
        let verdict = self.classify(&embedding);
        if verdict.flagged {
            log::warn!(
                "Frame at {:.1}s flagged: '{}' ({:.3} > {})",
                frame.timestamp_secs,
                verdict.most_similar_content.as_deref().unwrap_or("?"),
                verdict.max_similarity,
                self.threshold
            );
        }
        Ok(verdict)
    }
}

fn cached_text_embedding<'c, M: EmbeddingModel>(
    model: &M,
    cache: &'c mut TextEmbeddingCache,
    version: u64,
    word: &str,
) -> CoreResult<&'c [f32]> {
    cache.sync(version);
    if cache.get(word).is_none() {
        let embedding = model.embed_text(word).map_err(|e| match e {
            CoreError::EmbeddingFailed(_) => e,
            other => CoreError::EmbeddingFailed(format!("text embedding for '{word}': {other}")),
        })?;
        cache.insert(word, embedding);
    }
    cache
        .get(word)
        .ok_or_else(|| CoreError::InvalidState(format!("embedding for '{word}' missing from cache")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    struct TableModel {
        words: HashMap<String, Vec<f32>>,
        image: Vec<f32>,
        text_calls: Cell<usize>,
        seen: RefCell<Vec<String>>,
    }

    impl TableModel {
        fn new(words: &[(&str, Vec<f32>)], image: Vec<f32>) -> Self {
            Self {
                words: words.iter().map(|(w, v)| (w.to_string(), v.clone())).collect(),
                image,
                text_calls: Cell::new(0),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl EmbeddingModel for TableModel {
        fn embed_image(&self, _image: &RgbImage) -> CoreResult<Vec<f32>> {
            Ok(self.image.clone())
        }

        fn embed_text(&self, text: &str) -> CoreResult<Vec<f32>> {
            self.text_calls.set(self.text_calls.get() + 1);
            self.seen.borrow_mut().push(text.to_string());
            self.words
                .get(text)
                .cloned()
                .ok_or_else(|| CoreError::EmbeddingFailed(format!("unknown word {text}")))
        }
    }

    fn moderator(threshold: f64) -> ContentModerator<TableModel> {
        let model = TableModel::new(
            &[
                ("gun", vec![1.0, 0.0, 0.0, 0.0]),
                ("knife", vec![0.0, 1.0, 0.0, 0.0]),
                ("beach", vec![0.0, 0.0, 0.0, 1.0]),
            ],
            vec![3.0, 9.0, 3.0, 1.0],
        );
        let vocabulary = ModerationVocabulary::from_pairs([
            ("violence", vec!["gun", "knife"]),
            ("calm", vec!["beach"]),
        ]);
        ContentModerator::with_vocabulary(model, vocabulary, SimilarityThreshold::new(threshold).unwrap())
    }

    #[test]
    fn classify_tracks_best_word_per_category_and_overall() {
        let mut moderator = moderator(0.5);
        let verdict = moderator.classify(&[3.0, 9.0, 3.0, 1.0]);

        let violence = &verdict.categories["violence"];
        assert_eq!(violence.most_similar_word.as_deref(), Some("knife"));
        assert!((violence.max_similarity - 0.9).abs() < 1e-9);
        assert!(violence.flagged);

        let calm = &verdict.categories["calm"];
        assert!((calm.max_similarity - 0.1).abs() < 1e-9);
        assert!(!calm.flagged);

        assert!(verdict.flagged);
        assert_eq!(verdict.most_similar_content.as_deref(), Some("knife"));
        assert_eq!(verdict.flagged_categories(), vec!["violence"]);
    }

    #[test]
    fn negative_similarities_leave_maxima_at_zero() {
        let mut moderator = moderator(0.0);
        let verdict = moderator.classify(&[-1.0, -1.0, 0.0, -1.0]);
        for category in verdict.categories.values() {
            assert_eq!(category.max_similarity, 0.0);
            assert!(category.most_similar_word.is_none());
            assert!(!category.flagged);
        }
        assert!(!verdict.flagged);
        assert!(verdict.most_similar_content.is_none());
    }

    #[test]
    fn text_embeddings_are_cached_until_vocabulary_changes() {
        let mut moderator = moderator(0.25);
        moderator.classify(&[1.0, 0.0, 0.0, 0.0]);
        moderator.classify(&[0.0, 1.0, 0.0, 0.0]);
        assert_eq!(moderator.model().text_calls.get(), 3);
        assert_eq!(moderator.cache_len(), 3);

        assert!(!moderator.add_word("violence", "gun"));
        moderator.classify(&[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(moderator.model().text_calls.get(), 3);

        assert!(moderator.add_word("calm", "sunset"));
        moderator.classify(&[1.0, 0.0, 0.0, 0.0]);
        // Three words re-embedded plus the new one, which fails and is skipped.
        assert_eq!(moderator.model().text_calls.get(), 7);
        assert_eq!(moderator.cache_len(), 3);
    }

    #[test]
    fn failing_words_are_skipped() {
        let mut moderator = moderator(0.25);
        moderator.add_word("violence", "unknown");
        let verdict = moderator.classify(&[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(verdict.categories["violence"].most_similar_word.as_deref(), Some("gun"));
    }

    #[test]
    fn threshold_rejects_out_of_range_and_keeps_previous() {
        let mut moderator = moderator(0.25);
        assert!(matches!(moderator.set_threshold(1.1), Err(CoreError::InvalidInput(_))));
        assert!(matches!(moderator.set_threshold(-0.01), Err(CoreError::InvalidInput(_))));
        assert_eq!(moderator.threshold().value(), 0.25);
        moderator.set_threshold(1.0).unwrap();
        assert_eq!(moderator.threshold().value(), 1.0);
    }

    #[test]
    fn embed_text_is_case_sensitive() {
        let mut moderator = moderator(0.25);
        assert!(moderator.embed_text("gun").is_ok());
        assert!(matches!(moderator.embed_text("GUN"), Err(CoreError::EmbeddingFailed(_))));
        assert_eq!(*moderator.model().seen.borrow(), vec!["gun", "GUN"]);
    }
}
