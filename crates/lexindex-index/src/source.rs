//! Document identity and postings types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A document, identified by its unique name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Positions of one token per document, in arrival order
pub type Occurrences = HashMap<Source, Vec<u32>>;

/// Token -> occurrences, as returned by `StorageEngine::get`
pub type Postings = HashMap<String, Occurrences>;

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: Source,
    pub score: usize,
}
