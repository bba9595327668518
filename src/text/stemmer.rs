//! Multilingual Snowball stemming.
//!
//! Stemming is a pure function of `(word, language code)`. The same function
//! is used when indexing a page and when stemming query translations, so the
//! stems persisted in page metadata always line up with query stems.

use phf::phf_map;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeMap, BTreeSet};

/// Stem → sorted, distinct original words reducing to it.
pub type StemIndex = BTreeMap<String, Vec<String>>;

/// Code used when a language could not be detected.
pub const UNKNOWN_LANGUAGE: &str = "un";

/// Two-letter language code → Snowball algorithm name.
///
/// Codes without a dedicated algorithm map to English.
static LANGUAGES: phf::Map<&'static str, &'static str> = phf_map! {
    "de" => "german",
    "en" => "english",
    "fr" => "french",
    "ca" => "english",
    "it" => "italian",
    "es" => "spanish",
    "ru" => "russian",
    "pl" => "english",
    "bn" => "english",
    "da" => "danish",
    "nl" => "dutch",
    "pt" => "portuguese",
    "sv" => "swedish",
    "no" => "norwegian",
    "fi" => "finnish",
    "hu" => "hungarian",
    "ro" => "romanian",
    "tr" => "turkish",
    "un" => "english",
};

/// Resolve a language code to the name of its stemming algorithm.
///
/// Unrecognized codes fall back to the `un` entry (English).
///
/// # Examples
///
/// ```
/// use page_highlight::text::stemmer::algorithm_name;
///
/// assert_eq!(algorithm_name("de"), "german");
/// assert_eq!(algorithm_name("pl"), "english");
/// assert_eq!(algorithm_name("xx"), "english");
/// ```
pub fn algorithm_name(language_code: &str) -> &'static str {
    LANGUAGES
        .get(language_code)
        .or_else(|| LANGUAGES.get(UNKNOWN_LANGUAGE))
        .copied()
        .unwrap_or("english")
}

/// Whether the code has an entry in the language table.
pub fn is_known_language(language_code: &str) -> bool {
    LANGUAGES.contains_key(language_code)
}

fn algorithm(name: &str) -> Algorithm {
    match name {
        "german" => Algorithm::German,
        "french" => Algorithm::French,
        "italian" => Algorithm::Italian,
        "spanish" => Algorithm::Spanish,
        "russian" => Algorithm::Russian,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "portuguese" => Algorithm::Portuguese,
        "swedish" => Algorithm::Swedish,
        "norwegian" => Algorithm::Norwegian,
        "finnish" => Algorithm::Finnish,
        "hungarian" => Algorithm::Hungarian,
        "romanian" => Algorithm::Romanian,
        "turkish" => Algorithm::Turkish,
        _ => Algorithm::English,
    }
}

/// Stemmer bound to one language.
pub struct LanguageStemmer {
    stemmer: Stemmer,
    name: &'static str,
}

impl LanguageStemmer {
    /// Create the stemmer for a language code (falls back to English).
    pub fn new(language_code: &str) -> Self {
        let name = algorithm_name(language_code);
        Self {
            stemmer: Stemmer::create(algorithm(name)),
            name,
        }
    }

    /// Name of the algorithm in use.
    pub fn algorithm_name(&self) -> &'static str {
        self.name
    }

    /// Stem one word. Input is lower-cased first.
    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(&word.to_lowercase()).into_owned()
    }
}

/// Stem a single word in the given language.
///
/// # Examples
///
/// ```
/// use page_highlight::text::stemmer::stem_word;
///
/// assert_eq!(stem_word("running", "en"), "run");
/// assert_eq!(stem_word("Running", "xx"), "run");
/// ```
pub fn stem_word(word: &str, language_code: &str) -> String {
    LanguageStemmer::new(language_code).stem(word)
}

/// Group words by the stem they reduce to.
///
/// Each group is deduplicated and sorted, so the result is deterministic for
/// a given input regardless of word order.
///
/// # Examples
///
/// ```
/// use page_highlight::text::stemmer::stem_words;
///
/// let stems = stem_words(["running", "runs", "run"], "en");
/// assert_eq!(stems.len(), 1);
/// assert_eq!(stems["run"], vec!["run", "running", "runs"]);
/// ```
pub fn stem_words<I, S>(words: I, language_code: &str) -> StemIndex
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stemmer = LanguageStemmer::new(language_code);
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for word in words {
        let word = word.as_ref();
        groups
            .entry(stemmer.stem(word))
            .or_default()
            .insert(word.to_string());
    }

    groups
        .into_iter()
        .map(|(stem, words)| (stem, words.into_iter().collect()))
        .collect()
}
