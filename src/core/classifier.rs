//! Keyword-overlap subject classifier.
//!
//! A filename stem is tokenized and scored against every subject's keyword
//! set: an exact keyword hit is worth 2, a substring hit in either direction
//! is worth 1, and each distinct token counts at most once per subject.

use crate::core::syllabus::{Syllabus, SyllabusIndex, SyllabusOptions};
use crate::domain::model::{SubjectMatch, TiePolicy};
use crate::domain::ports::Sorter;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

const EXACT_MATCH_SCORE: u32 = 2;
const PARTIAL_MATCH_SCORE: u32 = 1;
const MIN_TOKEN_LEN: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassifierStats {
    pub cache_entries: usize,
    pub cache_hits: u64,
    /// Number of classifications that went through the scoring pass.
    pub scored: u64,
}

pub struct KeywordSubjectClassifier {
    index: Arc<SyllabusIndex>,
    tie_policy: TiePolicy,
    cache: RwLock<HashMap<String, SubjectMatch>>,
    cache_hits: AtomicU64,
    scored: AtomicU64,
}

impl KeywordSubjectClassifier {
    pub fn new(index: Arc<SyllabusIndex>) -> Self {
        if index.is_empty() {
            tracing::warn!("Syllabus index has no subjects; every file will be filed as General");
        }

        Self {
            index,
            tie_policy: TiePolicy::default(),
            cache: RwLock::new(HashMap::new()),
            cache_hits: AtomicU64::new(0),
            scored: AtomicU64::new(0),
        }
    }

    pub fn with_tie_policy(mut self, tie_policy: TiePolicy) -> Self {
        self.tie_policy = tie_policy;
        self
    }

    pub fn from_syllabus(syllabus: &Syllabus) -> Self {
        let index = SyllabusIndex::build(syllabus);
        tracing::info!("📚 Indexed {} subjects from syllabus", index.subject_count());
        Self::new(Arc::new(index))
    }

    pub fn from_value(value: &serde_json::Value, options: &SyllabusOptions) -> Result<Self> {
        Ok(Self::from_syllabus(&Syllabus::from_value(value, options)?))
    }

    pub fn from_file<P: AsRef<Path>>(path: P, options: &SyllabusOptions) -> Result<Self> {
        Ok(Self::from_syllabus(&Syllabus::from_file(path, options)?))
    }

    pub fn index(&self) -> &Arc<SyllabusIndex> {
        &self.index
    }

    pub fn tie_policy(&self) -> TiePolicy {
        self.tie_policy
    }

    pub fn stats(&self) -> ClassifierStats {
        ClassifierStats {
            cache_entries: self.cache.read().map(|c| c.len()).unwrap_or(0),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            scored: self.scored.load(Ordering::Relaxed),
        }
    }

    /// Guesses the subject for `file_name`. Never fails; anything ambiguous
    /// or degenerate resolves to the fallback subject.
    pub fn classify(&self, file_name: &str) -> SubjectMatch {
        let Some(stem) = normalize_stem(file_name) else {
            tracing::debug!("Empty filename, using fallback subject");
            return SubjectMatch::fallback();
        };

        if let Some(hit) = self.cached(&stem) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Cache hit for '{}': {}", stem, hit);
            return hit;
        }

        let tokens = tokenize(&stem);
        if tokens.is_empty() {
            // Not cached: the same stem may tokenize differently once reused.
            tracing::debug!("No usable tokens in '{}', using fallback subject", stem);
            return SubjectMatch::fallback();
        }

        self.scored.fetch_add(1, Ordering::Relaxed);
        let result = self.best_match(&tokens);
        tracing::debug!("Classified '{}' as {}", stem, result);

        self.remember(stem, result.clone());
        result
    }

    fn best_match(&self, tokens: &BTreeSet<String>) -> SubjectMatch {
        let mut max_score = 0;
        let mut leader: Option<&str> = None;
        let mut tied = false;

        for subject in self.index.subjects() {
            if subject.keywords.is_empty() {
                continue;
            }

            let score = score_tokens(tokens, &subject.keywords);
            tracing::trace!("{} scored {}", subject.code, score);

            if score > max_score {
                max_score = score;
                leader = Some(subject.code.as_str());
                tied = false;
            } else if score == max_score && score > 0 {
                tied = true;
            }
        }

        let Some(code) = leader else {
            return SubjectMatch::fallback();
        };

        if tied && self.tie_policy == TiePolicy::Fallback {
            tracing::debug!("Tie at score {}, using fallback subject", max_score);
            return SubjectMatch::fallback();
        }

        match self.index.subject_name(code) {
            Some(name) => SubjectMatch::new(code, name),
            None => {
                tracing::warn!("Subject {} has no name in the index, using fallback", code);
                SubjectMatch::fallback()
            }
        }
    }

    fn cached(&self, stem: &str) -> Option<SubjectMatch> {
        match self.cache.read() {
            Ok(cache) => cache.get(stem).cloned(),
            Err(e) => {
                tracing::warn!("Classification cache unavailable: {}", e);
                None
            }
        }
    }

    fn remember(&self, stem: String, result: SubjectMatch) {
        match self.cache.write() {
            Ok(mut cache) => {
                cache.insert(stem, result);
            }
            Err(e) => tracing::warn!("Skipping cache insert: {}", e),
        }
    }
}

#[async_trait]
impl Sorter for KeywordSubjectClassifier {
    async fn sort_file(&self, file_name: &str) -> SubjectMatch {
        self.classify(file_name)
    }
}

/// Lower-cased basename with the last extension removed, or `None` when
/// nothing usable is left.
pub fn normalize_stem(file_name: &str) -> Option<String> {
    let lowered = file_name.trim().to_lowercase();
    let base = lowered.rsplit(['/', '\\']).next().unwrap_or_default();

    let stem = match base.rfind('.') {
        Some(0) | None => base,
        Some(pos) => &base[..pos],
    };

    let stem = stem.trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Distinct tokens of a stem; `-` and `_` separate words like spaces do.
pub fn tokenize(stem: &str) -> BTreeSet<String> {
    stem.replace(['-', '_'], " ")
        .split_whitespace()
        .filter(|t| t.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

fn score_tokens(tokens: &BTreeSet<String>, keywords: &BTreeSet<String>) -> u32 {
    let mut score = 0;

    for token in tokens {
        if token.chars().count() < MIN_TOKEN_LEN {
            continue;
        }

        if keywords.contains(token) {
            score += EXACT_MATCH_SCORE;
            continue;
        }

        if keywords
            .iter()
            .any(|k| k.contains(token.as_str()) || token.contains(k.as_str()))
        {
            score += PARTIAL_MATCH_SCORE;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_normalize_stem() {
        assert_eq!(normalize_stem("PHYSICS_notes.pdf").as_deref(), Some("physics_notes"));
        assert_eq!(normalize_stem("  uploads/2024/Quantum.Notes.PDF ").as_deref(), Some("quantum.notes"));
        assert_eq!(normalize_stem(r"C:\docs\chem.docx").as_deref(), Some("chem"));
        assert_eq!(normalize_stem(".bashrc").as_deref(), Some(".bashrc"));
        assert_eq!(normalize_stem("   "), None);
        assert_eq!(normalize_stem("dir/"), None);
        assert_eq!(normalize_stem(""), None);
    }

    #[test]
    fn test_tokenize_dedupes_and_drops_short_tokens() {
        let tokens = tokenize("unit-1_physics physics a notes");
        assert_eq!(tokens, keywords(&["notes", "physics", "unit"]));
        assert!(tokenize("a_b-c").is_empty());
    }

    #[test]
    fn test_score_exact_and_partial() {
        let kw = keywords(&["quantum", "mechanics", "physics"]);
        assert_eq!(score_tokens(&keywords(&["quantum"]), &kw), 2);
        assert_eq!(score_tokens(&keywords(&["mech"]), &kw), 1);
        assert_eq!(score_tokens(&keywords(&["quantummechanics"]), &kw), 1);
        assert_eq!(score_tokens(&keywords(&["quantum", "notes"]), &kw), 2);
    }

    #[test]
    fn test_partial_match_counts_once_per_token() {
        let kw = keywords(&["thermo", "thermodynamics", "thermal"]);
        assert_eq!(score_tokens(&keywords(&["therm"]), &kw), 1);
    }
}
