//! Per-document tallies and ranking strategies

use std::collections::HashMap;

use crate::error::Result;
use crate::source::{Postings, SearchResult, Source};

/// What a search found in one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hit {
    /// Number of distinct query tokens present
    pub count: usize,
    /// token -> positions in this document
    pub occurrences: HashMap<String, Vec<u32>>,
}

impl Hit {
    pub fn total_occurrences(&self) -> usize {
        self.occurrences.values().map(Vec::len).sum()
    }
}

/// Hits keyed by document
pub type Tally = HashMap<Source, Hit>;

/// Fold per-token postings into per-document hits
pub fn tally(postings: Postings) -> Tally {
    let mut tally = Tally::new();
    for (token, occurrences) in postings {
        for (source, positions) in occurrences {
            let hit = tally.entry(source).or_default();
            hit.count += 1;
            hit.occurrences.insert(token.clone(), positions);
        }
    }
    tally
}

/// Ranking strategy: turns a tally into ordered results.
///
/// `tokens` holds the distinct normalized query tokens. Any closure with the
/// same shape is a scorer.
pub trait Scorer: Send + Sync {
    fn score(&self, tally: &Tally, tokens: &[String]) -> Result<Vec<SearchResult>>;
}

impl<F> Scorer for F
where
    F: Fn(&Tally, &[String]) -> Result<Vec<SearchResult>> + Send + Sync,
{
    fn score(&self, tally: &Tally, tokens: &[String]) -> Result<Vec<SearchResult>> {
        self(tally, tokens)
    }
}

/// Default strategy: documents must contain every query token; score is the
/// total number of occurrences. Highest score first, then document name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreByCount;

impl Scorer for ScoreByCount {
    fn score(&self, tally: &Tally, tokens: &[String]) -> Result<Vec<SearchResult>> {
        let mut results: Vec<SearchResult> = tally
            .iter()
            .filter(|(_, hit)| hit.count == tokens.len())
            .map(|(source, hit)| SearchResult {
                document: source.clone(),
                score: hit.total_occurrences(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.document.name.cmp(&b.document.name))
        });
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Occurrences;

    fn hit(count: usize, occurrences: &[(&str, &[u32])]) -> Hit {
        Hit {
            count,
            occurrences: occurrences
                .iter()
                .map(|(token, positions)| (token.to_string(), positions.to_vec()))
                .collect(),
        }
    }

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_score_by_count_ranks_by_occurrences() {
        let mut input = Tally::new();
        input.insert(Source::new("file1"), hit(2, &[("appl", &[0]), ("banana", &[1])]));
        input.insert(
            Source::new("file2"),
            hit(2, &[("appl", &[0, 2]), ("banana", &[1])]),
        );

        let results = ScoreByCount.score(&input, &tokens(&["appl", "banana"])).unwrap();
        assert_eq!(
            results,
            vec![
                SearchResult {
                    document: Source::new("file2"),
                    score: 3,
                },
                SearchResult {
                    document: Source::new("file1"),
                    score: 2,
                },
            ]
        );
    }

    #[test]
    fn test_score_by_count_requires_all_tokens() {
        let mut input = Tally::new();
        input.insert(Source::new("file1"), hit(1, &[("appl", &[0])]));
        input.insert(
            Source::new("file2"),
            hit(2, &[("appl", &[0, 2]), ("banana", &[1])]),
        );

        let results = ScoreByCount.score(&input, &tokens(&["appl", "banana"])).unwrap();
        assert_eq!(
            results,
            vec![SearchResult {
                document: Source::new("file2"),
                score: 3,
            }]
        );
    }

    #[test]
    fn test_score_by_count_rejects_extra_tokens() {
        // An engine answering with tokens nobody asked for must not widen the match
        let mut input = Tally::new();
        input.insert(
            Source::new("file1"),
            hit(3, &[("appl", &[0]), ("banana", &[1]), ("kiwi", &[2])]),
        );
        input.insert(Source::new("file2"), hit(2, &[("appl", &[0]), ("banana", &[1])]));

        let results = ScoreByCount.score(&input, &tokens(&["appl", "banana"])).unwrap();
        assert_eq!(
            results,
            vec![SearchResult {
                document: Source::new("file2"),
                score: 2,
            }]
        );
    }

    #[test]
    fn test_ties_ordered_by_name() {
        let mut input = Tally::new();
        for name in ["c.txt", "a.txt", "b.txt"] {
            input.insert(Source::new(name), hit(1, &[("appl", &[0])]));
        }

        let results = ScoreByCount.score(&input, &tokens(&["appl"])).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.document.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_tally_counts_tokens_per_document() {
        let s1 = Source::new("file1");
        let s2 = Source::new("file2");
        let mut postings = Postings::new();
        postings.insert(
            "appl".to_string(),
            Occurrences::from([(s1.clone(), vec![0]), (s2.clone(), vec![0, 1])]),
        );
        postings.insert("banana".to_string(), Occurrences::from([(s2.clone(), vec![2])]));

        let tally = tally(postings);
        assert_eq!(tally[&s1], hit(1, &[("appl", &[0])]));
        assert_eq!(tally[&s2], hit(2, &[("appl", &[0, 1]), ("banana", &[2])]));
    }

    #[test]
    fn test_closure_scorer() {
        let reverse_alpha = |tally: &Tally, _tokens: &[String]| -> Result<Vec<SearchResult>> {
            let mut results: Vec<SearchResult> = tally
                .keys()
                .map(|source| SearchResult {
                    document: source.clone(),
                    score: 0,
                })
                .collect();
            results.sort_by(|a, b| b.document.cmp(&a.document));
            Ok(results)
        };

        let mut input = Tally::new();
        input.insert(Source::new("a"), Hit::default());
        input.insert(Source::new("b"), Hit::default());

        let results = reverse_alpha.score(&input, &[]).unwrap();
        assert_eq!(results[0].document.name, "b");
    }
}
