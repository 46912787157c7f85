//! Word normalizer: lowercase, trim non-letters, drop stop words, stem

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::io::{BufRead, Cursor};
use stop_words::{get, LANGUAGE};

use crate::tokens::{Token, Tokens};

/// Turns raw words into index tokens.
///
/// The same normalizer must be used for indexing and querying, otherwise
/// query tokens will not line up with stored tokens.
pub struct Normalizer {
    stemmer: Stemmer,
    stop_words: HashSet<String>,
}

impl Normalizer {
    /// English stemmer with the English stop-word list
    pub fn new() -> Self {
        Self::with_stop_words(get(LANGUAGE::English))
    }

    /// English stemmer with a caller-supplied stop-word list
    pub fn with_stop_words<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stop_words: stop_words
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Normalize one raw word.
    ///
    /// Leading and trailing non-letters are stripped; interior characters are
    /// kept and take part in stemming. Returns `None` when nothing is left or
    /// the word is a stop word.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let lowered = raw.to_lowercase();
        let trimmed = lowered.trim_matches(|c: char| !c.is_alphabetic());
        if trimmed.is_empty() || self.stop_words.contains(trimmed) {
            return None;
        }
        Some(self.stemmer.stem(trimmed).into_owned())
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    /// Lazy token stream over `reader`. Consumes the reader.
    pub fn tokens<R: BufRead>(&self, reader: R) -> Tokens<'_, R> {
        Tokens::new(self, reader)
    }

    /// Tokenize an in-memory string
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        // Reading from a byte slice cannot fail
        self.tokens(Cursor::new(text.as_bytes()))
            .filter_map(Result::ok)
            .collect()
    }

    /// Distinct query tokens in first-seen order
    pub fn query_tokens(&self, query: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokenize(query)
            .into_iter()
            .map(|token| token.text)
            .filter(|text| seen.insert(text.clone()))
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
