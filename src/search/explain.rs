//! Tooltip titles explaining why a word is highlighted.
//!
//! The output format is consumed verbatim by the presentation layer.

use crate::search::query::StemDescriptor;
use crate::search::resolver::Relevance;
use crate::text::stemmer::{algorithm_name, is_known_language};
use crate::text::UNKNOWN_LANGUAGE;
use std::collections::{BTreeMap, BTreeSet};

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Display names of the languages that contributed a stem.
///
/// Skips the unknown-language code and codes outside the language table;
/// codes sharing an algorithm (e.g. `ca` and `en`) are listed once.
pub fn language_names<'a, I>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut names: Vec<String> = Vec::new();
    for code in codes {
        if code == UNKNOWN_LANGUAGE || !is_known_language(code) {
            continue;
        }
        let name = capitalize(algorithm_name(code));
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Build the title for one word.
///
/// - stem match: `"<word> | stemmed and normalized base form: '<stem>' (<Lang> | <Lang>)"`
/// - synonym match: one part per covering synonym, joined by `" | "`:
///   `"'<synonym>' (main synonym term)"` when the synonym is a group's main
///   term, `"'<synonym>' synonym for '<main>'"` otherwise
/// - otherwise the word itself
///
/// `main_terms` and the keys of `mainterm_map` are lower-cased, like the
/// covering synonyms.
///
/// # Examples
///
/// ```
/// use page_highlight::search::explain::word_title;
/// use std::collections::{BTreeMap, BTreeSet};
///
/// let mut mainterms = BTreeMap::new();
/// mainterms.insert("troops".to_string(), "army".to_string());
/// let title = word_title(
///     "troops",
///     &Default::default(),
///     &Default::default(),
///     &["troops".to_string()],
///     &mainterms,
///     &BTreeSet::new(),
/// );
/// assert_eq!(title, "'troops' synonym for 'army'");
/// ```
pub fn word_title(
    word: &str,
    stems: &StemDescriptor,
    terms: &Relevance,
    synonyms: &[String],
    mainterm_map: &BTreeMap<String, String>,
    main_terms: &BTreeSet<String>,
) -> String {
    if let Some(stem) = terms.get(word) {
        let languages = stems
            .get(stem)
            .map(|info| language_names(&info.languages))
            .unwrap_or_default();
        return format!(
            "{} | stemmed and normalized base form: '{}' ({})",
            word,
            stem,
            languages.join(" | ")
        );
    }

    if synonyms.is_empty() {
        return word.to_string();
    }

    synonyms
        .iter()
        .map(|synonym| {
            if main_terms.contains(synonym) {
                format!("'{}' (main synonym term)", synonym)
            } else {
                match mainterm_map.get(synonym) {
                    Some(main) => format!("'{}' synonym for '{}'", synonym, main),
                    None => format!("'{}' synonym", synonym),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
