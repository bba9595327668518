//! Text normalization shared by indexing and querying.

pub mod stemmer;

pub use stemmer::{stem_word, stem_words, LanguageStemmer, StemIndex, UNKNOWN_LANGUAGE};
