//! Lazy token stream over a buffered reader

use std::collections::VecDeque;
use std::io::{self, BufRead};

use crate::Normalizer;

/// A normalized token and its word offset in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub position: u32,
}

impl Token {
    pub fn new(text: impl Into<String>, position: u32) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// Single-pass iterator of tokens read line by line from `R`.
///
/// The position counter advances once per whitespace-delimited word, whether
/// or not the word survives normalization, so positions are raw word offsets.
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// failing the read. A read error, or a document longer than `u32::MAX`
/// words, is yielded once and ends the stream.
pub struct Tokens<'a, R> {
    normalizer: &'a Normalizer,
    reader: R,
    line: Vec<u8>,
    pending: VecDeque<String>,
    position: u32,
    exhausted: bool,
}

impl<'a, R: BufRead> Tokens<'a, R> {
    pub(crate) fn new(normalizer: &'a Normalizer, reader: R) -> Self {
        Self {
            normalizer,
            reader,
            line: Vec::new(),
            pending: VecDeque::new(),
            position: 0,
            exhausted: false,
        }
    }

    /// Number of words scanned so far, including dropped ones
    pub fn words_scanned(&self) -> u32 {
        self.position
    }
}

impl<R: BufRead> Iterator for Tokens<'_, R> {
    type Item = io::Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(word) = self.pending.pop_front() {
                let position = self.position;
                let Some(next) = position.checked_add(1) else {
                    self.pending.clear();
                    self.exhausted = true;
                    return Some(Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "document has more words than positions can address",
                    )));
                };
                self.position = next;
                if let Some(text) = self.normalizer.normalize(&word) {
                    return Some(Ok(Token { text, position }));
                }
            }

            if self.exhausted {
                return None;
            }

            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.exhausted = true;
                    return None;
                }
                Ok(_) => self.pending.extend(
                    String::from_utf8_lossy(&self.line)
                        .split_whitespace()
                        .map(str::to_owned),
                ),
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("disk went away"));
            }
            self.served = true;
            let chunk = b"apple banana\n";
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_positions_are_raw_word_offsets() {
        let normalizer = Normalizer::new();
        let tokens: Vec<Token> = normalizer
            .tokens(Cursor::new("an apple banana raspberry"))
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::new("appl", 1),
                Token::new("banana", 2),
                Token::new("raspberri", 3),
            ]
        );
    }

    #[test]
    fn test_positions_continue_across_lines() {
        let normalizer = Normalizer::new();
        let mut stream = normalizer.tokens(Cursor::new("apple\n\n  banana\t\torange\n"));
        let tokens: Vec<Token> = stream.by_ref().map(Result::unwrap).collect();

        assert_eq!(
            tokens,
            vec![
                Token::new("appl", 0),
                Token::new("banana", 1),
                Token::new("orang", 2),
            ]
        );
        assert_eq!(stream.words_scanned(), 3);
    }

    #[test]
    fn test_punctuation_only_words_still_count() {
        let normalizer = Normalizer::new();
        let tokens: Vec<Token> = normalizer
            .tokens(Cursor::new("-- 42 apple!"))
            .map(Result::unwrap)
            .collect();

        assert_eq!(tokens, vec![Token::new("appl", 2)]);
    }

    #[test]
    fn test_read_error_is_surfaced_once() {
        let normalizer = Normalizer::new();
        let reader = BufReader::new(FailingReader { served: false });
        let items: Vec<io::Result<Token>> = normalizer.tokens(reader).collect();

        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].is_ok());
        assert!(items[2].is_err());
    }

    #[test]
    fn test_invalid_utf8_does_not_end_stream() {
        let normalizer = Normalizer::new();
        let tokens: Vec<Token> = normalizer
            .tokens(Cursor::new(&b"apple banana\ncaf\xe9 orange\n"[..]))
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::new("appl", 0),
                Token::new("banana", 1),
                Token::new("caf", 2),
                Token::new("orang", 3),
            ]
        );
    }

    #[test]
    fn test_position_overflow_is_an_error() {
        let normalizer = Normalizer::new();
        let mut stream = normalizer.tokens(Cursor::new("apple banana orange"));
        stream.position = u32::MAX - 1;

        let first = stream.next().unwrap().unwrap();
        assert_eq!(first, Token::new("appl", u32::MAX - 1));

        let err = stream.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_empty_input() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.tokens(Cursor::new("")).count(), 0);
    }
}
