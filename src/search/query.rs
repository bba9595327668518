//! Query-side data contracts exchanged with the retrieval service.
//!
//! The retrieval service answers a query with hits and per-phrase translation
//! metadata. Before highlighting, every translation is stemmed with the same
//! stemmer used at ingestion ([`PhraseTranslations::collect_stems`]).

use crate::text::LanguageStemmer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Stem → languages and query terms that produced it.
pub type StemDescriptor = BTreeMap<String, StemInfo>;

/// Fields of a retrieval hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitFields {
    /// Document the page belongs to
    pub parent_doc: String,
    /// Page number (0-indexed)
    pub page: u32,
    /// Detected language of the page
    #[serde(default)]
    pub language: String,
    /// Page text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// One result record of the retrieval service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Hit identifier
    #[serde(default)]
    pub id: String,
    /// Relevance reported by the retrieval service
    #[serde(default)]
    pub relevance: f64,
    /// Hit fields
    pub fields: HitFields,
}

impl Hit {
    /// Create a hit for a document page.
    pub fn new(parent_doc: impl Into<String>, page: u32, language: impl Into<String>) -> Self {
        let parent_doc = parent_doc.into();
        Self {
            id: format!("{}_{}", parent_doc, page),
            relevance: 0.0,
            fields: HitFields {
                parent_doc,
                page,
                language: language.into(),
                body: None,
            },
        }
    }
}

/// The query phrase translated into one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Two-letter language code
    pub language_code: String,
    /// Content terms of the translation
    #[serde(default)]
    pub content: Vec<String>,
}

/// Languages and source terms behind one stem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StemInfo {
    /// Languages whose translation produced the stem
    #[serde(default)]
    pub languages: BTreeSet<String>,
    /// Lower-cased query terms reducing to the stem
    #[serde(default)]
    pub terms: BTreeSet<String>,
}

impl StemInfo {
    /// Merge another descriptor of the same stem into this one.
    pub fn merge(&mut self, other: &StemInfo) {
        self.languages.extend(other.languages.iter().cloned());
        self.terms.extend(other.terms.iter().cloned());
    }
}

/// Terms treated as equivalent for highlighting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynonymGroup {
    /// Designated main term (empty when removed by a stem-filter)
    #[serde(default)]
    pub main_term: String,
    /// Equivalent terms
    #[serde(default)]
    pub terms: Vec<String>,
    /// Languages the group applies to (empty = any)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub languages: BTreeSet<String>,
}

impl SynonymGroup {
    /// Create a group applying to any language.
    pub fn new<I, S>(main_term: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            main_term: main_term.into(),
            terms: terms.into_iter().map(Into::into).collect(),
            languages: BTreeSet::new(),
        }
    }

    /// Restrict the group to the given languages.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }
}

/// Translations of one query phrase plus the stems derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseTranslations {
    /// Languages the phrase was translated into
    #[serde(default)]
    pub languages: Vec<String>,
    /// Detected language of the phrase
    #[serde(default)]
    pub source_language: String,
    /// One entry per target language
    #[serde(default)]
    pub translations: Vec<Translation>,
    /// Stem descriptor
    #[serde(default)]
    pub stems: StemDescriptor,
    /// Synonym groups
    #[serde(default)]
    pub synonyms: Vec<SynonymGroup>,
    /// Term → stems it contributes
    #[serde(default)]
    pub stem_map: BTreeMap<String, Vec<String>>,
}

impl PhraseTranslations {
    /// Stem every translation with its own language and record the result
    /// in `stems` and `stem_map`.
    ///
    /// Multi-word terms are split on whitespace; empty stems are skipped.
    pub fn collect_stems(&mut self) {
        for translation in &self.translations {
            let stemmer = LanguageStemmer::new(&translation.language_code);
            for term in &translation.content {
                for token in term.split_whitespace() {
                    let stem = stemmer.stem(token);
                    if stem.is_empty() {
                        continue;
                    }
                    let token = token.to_lowercase();

                    let info = self.stems.entry(stem.clone()).or_default();
                    info.languages.insert(translation.language_code.clone());
                    info.terms.insert(token.clone());

                    let stems = self.stem_map.entry(token).or_default();
                    if !stems.contains(&stem) {
                        stems.push(stem);
                    }
                }
            }
        }
    }
}

/// Query metadata returned with a result page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// One entry per query phrase
    #[serde(default)]
    pub translations: Vec<PhraseTranslations>,
}

impl QueryMetadata {
    /// Run [`PhraseTranslations::collect_stems`] on every phrase.
    pub fn collect_stems(&mut self) {
        for phrase in &mut self.translations {
            phrase.collect_stems();
        }
    }

    /// Lower-cased union of all translation terms, sorted.
    pub fn flat_terms(&self) -> Vec<String> {
        self.translations
            .iter()
            .flat_map(|p| p.translations.iter())
            .flat_map(|t| t.content.iter())
            .map(|term| term.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every stem of every phrase.
    pub fn all_stems(&self) -> BTreeSet<String> {
        self.translations
            .iter()
            .flat_map(|p| p.stems.keys().cloned())
            .collect()
    }

    /// Term → stems, merged across phrases.
    pub fn stem_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for phrase in &self.translations {
            for (term, stems) in &phrase.stem_map {
                let entry = merged.entry(term.clone()).or_default();
                for stem in stems {
                    if !entry.contains(stem) {
                        entry.push(stem.clone());
                    }
                }
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(translations: &[(&str, &[&str])]) -> PhraseTranslations {
        PhraseTranslations {
            languages: translations.iter().map(|(l, _)| l.to_string()).collect(),
            source_language: translations[0].0.to_string(),
            translations: translations
                .iter()
                .map(|(l, c)| Translation {
                    language_code: l.to_string(),
                    content: c.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_collect_stems() {
        let mut p = phrase(&[("en", &["Running", "dogs"]), ("de", &["laufen", "Hunde"])]);
        p.collect_stems();

        assert!(p.stems.contains_key("run"));
        assert_eq!(p.stems["run"].languages, BTreeSet::from(["en".to_string()]));
        assert!(p.stems["run"].terms.contains("running"));
        assert_eq!(p.stem_map["running"], vec!["run"]);
        assert!(p.stems.values().any(|info| info.languages.contains("de")));
    }

    #[test]
    fn test_collect_stems_shared_stem_merges_languages() {
        let mut p = phrase(&[("en", &["signal"]), ("fr", &["signal"])]);
        p.collect_stems();
        let info = &p.stems["signal"];
        assert!(info.languages.contains("en"));
        assert!(info.languages.contains("fr"));
    }

    #[test]
    fn test_multi_word_term_split() {
        let mut p = phrase(&[("en", &["signal corps"])]);
        p.collect_stems();
        assert!(p.stem_map.contains_key("signal"));
        assert!(p.stem_map.contains_key("corps"));
    }

    #[test]
    fn test_flat_terms_and_stem_map() {
        let mut meta = QueryMetadata {
            translations: vec![phrase(&[("en", &["Run"])]), phrase(&[("en", &["run", "Jump"])])],
        };
        meta.collect_stems();
        assert_eq!(meta.flat_terms(), vec!["jump", "run"]);
        assert_eq!(meta.stem_map()["run"], vec!["run"]);
        assert!(meta.all_stems().contains("jump"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "translations": [{
                "languages": ["en"],
                "sourceLanguage": "en",
                "translations": [{"languageCode": "en", "content": ["corps"]}],
                "synonyms": [{"mainTerm": "army", "terms": ["army", "troops"]}],
                "stemMap": {}
            }]
        }"#;
        let meta: QueryMetadata = serde_json::from_str(json).unwrap();
        let phrase = &meta.translations[0];
        assert_eq!(phrase.translations[0].language_code, "en");
        assert_eq!(phrase.synonyms[0].main_term, "army");
        assert!(phrase.stems.is_empty());
    }

    #[test]
    fn test_hit_json() {
        let json = r#"{"id": "doc_3", "relevance": 0.5,
                       "fields": {"parent_doc": "doc", "page": 3, "language": "en"}}"#;
        let hit: Hit = serde_json::from_str(json).unwrap();
        assert_eq!(hit, {
            let mut h = Hit::new("doc", 3, "en");
            h.relevance = 0.5;
            h
        });
    }
}
