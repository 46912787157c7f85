//! Text normalization for the inverted index: word scanning, trimming, stop words and stemming

mod normalizer;
mod tokens;

pub use normalizer::Normalizer;
pub use tokens::{Token, Tokens};
