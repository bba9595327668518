//! Query term resolution against a page's persisted stems.
//!
//! Given the query stems (already language-gated and stem-filtered) and the
//! page's stem index, the resolver decides which on-page words are matches
//! and why: through a shared stem, or through a synonym group.

use crate::search::query::{PhraseTranslations, StemDescriptor, SynonymGroup};
use crate::text::{LanguageStemmer, StemIndex, UNKNOWN_LANGUAGE};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Matched on-page word → stem it matched through.
pub type Relevance = BTreeMap<String, String>;

/// Position in the flattened word sequence → synonym terms covering it.
pub type SynonymPositions = BTreeMap<usize, Vec<String>>;

/// Whether a stem or synonym tagged with `languages` applies to a hit.
///
/// An empty set is unconstrained. A hit whose language is unknown (empty or
/// `un`) admits everything.
pub fn language_admits(languages: &BTreeSet<String>, hit_language: &str) -> bool {
    languages.is_empty()
        || hit_language.is_empty()
        || hit_language == UNKNOWN_LANGUAGE
        || languages.contains(hit_language)
}

/// Query stems that apply to a hit, merged across phrases.
///
/// Drops the empty stem (a translation artifact), stems listed in
/// `stem_filters` and stems whose languages exclude the hit language.
pub fn relevant_stems(
    translations: &[PhraseTranslations],
    hit_language: &str,
    stem_filters: &BTreeSet<String>,
) -> StemDescriptor {
    let mut stems = StemDescriptor::new();
    for phrase in translations {
        gate_stems(&phrase.stems, hit_language, stem_filters, &mut stems);
    }
    stems
}

/// [`relevant_stems`] for an already merged stem descriptor.
pub fn gate_stems(
    stems: &StemDescriptor,
    hit_language: &str,
    stem_filters: &BTreeSet<String>,
    out: &mut StemDescriptor,
) {
    for (stem, info) in stems {
        if stem.is_empty()
            || stem_filters.contains(stem)
            || !language_admits(&info.languages, hit_language)
        {
            continue;
        }
        out.entry(stem.clone()).or_default().merge(info);
    }
}

/// Remove stem-filtered terms from synonym groups.
///
/// A filtered main term becomes empty; the group itself is kept even if no
/// terms remain, it then simply matches nothing.
pub fn filter_synonyms(
    synonyms: &[SynonymGroup],
    stem_filters: &BTreeSet<String>,
) -> Vec<SynonymGroup> {
    synonyms
        .iter()
        .map(|group| SynonymGroup {
            main_term: if stem_filters.contains(&group.main_term) {
                String::new()
            } else {
                group.main_term.clone()
            },
            terms: group
                .terms
                .iter()
                .filter(|term| !stem_filters.contains(*term))
                .cloned()
                .collect(),
            languages: group.languages.clone(),
        })
        .collect()
}

/// Synonym groups of all phrases that apply to a hit, before stem filtering.
pub fn gated_synonyms(
    translations: &[PhraseTranslations],
    hit_language: &str,
) -> Vec<SynonymGroup> {
    translations
        .iter()
        .flat_map(|phrase| phrase.synonyms.iter())
        .filter(|group| language_admits(&group.languages, hit_language))
        .cloned()
        .collect()
}

/// Synonym groups of all phrases that apply to a hit, stem-filtered.
pub fn relevant_synonyms(
    translations: &[PhraseTranslations],
    hit_language: &str,
    stem_filters: &BTreeSet<String>,
) -> Vec<SynonymGroup> {
    filter_synonyms(&gated_synonyms(translations, hit_language), stem_filters)
}

/// Page words sharing a stem with the query.
///
/// # Examples
///
/// ```
/// use page_highlight::search::resolver::relevant_terms;
/// use page_highlight::text::StemIndex;
///
/// let mut page = StemIndex::new();
/// page.insert("run".into(), vec!["run".into(), "running".into()]);
/// page.insert("jump".into(), vec!["jumps".into()]);
///
/// let terms = relevant_terms(["run"], &page);
/// assert_eq!(terms.keys().collect::<Vec<_>>(), vec!["run", "running"]);
/// ```
pub fn relevant_terms<I, S>(query_stems: I, page_stems: &StemIndex) -> Relevance
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut terms = Relevance::new();
    for stem in query_stems {
        let stem = stem.as_ref();
        if let Some(words) = page_stems.get(stem) {
            for word in words {
                terms.insert(word.clone(), stem.to_string());
            }
        }
    }
    terms
}

/// Page word → stem, inverted from the page stem index.
fn word_stems(page_stems: &StemIndex) -> HashMap<&str, &str> {
    page_stems
        .iter()
        .flat_map(|(stem, words)| words.iter().map(move |w| (w.as_str(), stem.as_str())))
        .collect()
}

/// Find the positions of `words` covered by a synonym term.
///
/// Every term of a group, and its main term, is split into tokens; a term
/// covers each run of consecutive positions whose words match its tokens. A
/// token matches a word if both are equal ignoring case, or both reduce to
/// the same stem. Words take their stem from the page stem index; tokens are
/// stemmed in the page `language` unless they appear on the page themselves.
pub fn find_synonym_positions(
    words: &[String],
    synonyms: &[SynonymGroup],
    page_stems: &StemIndex,
    language: &str,
) -> SynonymPositions {
    let stemmer = LanguageStemmer::new(language);
    let stems_of = word_stems(page_stems);
    let stem_of = |word: &str| match stems_of.get(word) {
        Some(stem) => stem.to_string(),
        None => stemmer.stem(word),
    };

    let words: Vec<(String, String)> = words
        .iter()
        .map(|word| {
            let word = word.to_lowercase();
            let stem = stem_of(&word);
            (word, stem)
        })
        .collect();

    let mut positions = SynonymPositions::new();
    for group in synonyms {
        let candidates = group
            .terms
            .iter()
            .chain(std::iter::once(&group.main_term))
            .map(|term| term.to_lowercase())
            .filter(|term| !term.trim().is_empty())
            .collect::<BTreeSet<_>>();

        for term in candidates {
            let tokens: Vec<(&str, String)> = term
                .split_whitespace()
                .map(|token| (token, stem_of(token)))
                .collect();
            if tokens.len() > words.len() {
                continue;
            }
            for start in 0..=(words.len() - tokens.len()) {
                let covered = tokens.iter().enumerate().all(|(i, (token, token_stem))| {
                    let (word, word_stem) = &words[start + i];
                    word == token || (!token_stem.is_empty() && word_stem == token_stem)
                });
                if !covered {
                    continue;
                }
                for pos in start..start + tokens.len() {
                    let entry = positions.entry(pos).or_default();
                    if !entry.contains(&term) {
                        entry.push(term.clone());
                    }
                }
            }
        }
    }
    positions
}

/// Synonym term → main term of its group, lower-cased keys.
///
/// Pass the groups before stem filtering: a term stays described as a
/// synonym of its main term even when that main term was filtered out.
/// Main terms themselves map to nothing.
pub fn mainterm_map(synonyms: &[SynonymGroup]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for group in synonyms {
        if group.main_term.trim().is_empty() {
            continue;
        }
        let main = group.main_term.to_lowercase();
        for term in &group.terms {
            let term = term.to_lowercase();
            if term != main && !term.trim().is_empty() {
                map.entry(term).or_insert_with(|| group.main_term.clone());
            }
        }
    }
    map
}

/// Lower-cased main terms of groups that still have one.
pub fn main_terms(synonyms: &[SynonymGroup]) -> BTreeSet<String> {
    synonyms
        .iter()
        .map(|group| group.main_term.to_lowercase())
        .filter(|main| !main.trim().is_empty())
        .collect()
}
