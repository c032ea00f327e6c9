use crate::error::QueryError;
use crate::models::{Corpus, SearchResult};
use serde::Serialize;

/// A validated search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    folded: String,
}

impl SearchQuery {
    /// Trims `raw`; a term that is empty after trimming is rejected.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let term = raw.trim();
        if term.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(SearchQuery {
            term: term.to_string(),
            folded: fold_case(term),
        })
    }

    /// The trimmed term as the user typed it.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The lowercased term used for matching.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn matches(&self, text: &str) -> bool {
        fold_case(text).contains(&self.folded)
    }
}

/// Every verse containing `query`, in `books` order, then chapter, then verse.
///
/// Books in `books` that are absent from `corpus` are skipped.
pub fn search(corpus: &Corpus, books: &[String], query: &SearchQuery) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for book in books {
        let Some(chapters) = corpus.book(book) else {
            continue;
        };
        for (chapter, verses) in chapters {
            for (verse, text) in verses {
                if query.matches(text) {
                    results.push(SearchResult::new(book, *chapter, *verse, text));
                }
            }
        }
    }

    results
}

/// A run of verse text, flagged when it is an occurrence of the search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub is_match: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Segment { text: text.to_string(), is_match: false }
    }

    fn matched(text: &str) -> Self {
        Segment { text: text.to_string(), is_match: true }
    }
}

/// Splits `text` into alternating non-match/match segments for `folded_term`.
///
/// Occurrences are found left to right without overlap. Segment text is always
/// sliced from `text` itself, so joining the segments gives back `text`.
/// Gap segments between adjacent matches are omitted when empty; the trailing
/// segment is always present.
pub fn highlight(text: &str, folded_term: &str) -> Vec<Segment> {
    if folded_term.is_empty() {
        return vec![Segment::plain(text)];
    }

    let folded = FoldedText::new(text);
    let mut segments = Vec::new();
    let mut last_end = 0;
    let mut cursor = 0;

    while let Some(found) = folded.lowered[cursor..].find(folded_term) {
        let start = cursor + found;
        let end = start + folded_term.len();
        let (orig_start, orig_end) = folded.original_span(start, end);

        if orig_start > last_end {
            segments.push(Segment::plain(&text[last_end..orig_start]));
        }
        segments.push(Segment::matched(&text[orig_start..orig_end]));
        last_end = orig_end;
        cursor = folded.next_position_after(end, orig_end);
        if cursor >= folded.lowered.len() {
            break;
        }
    }

    segments.push(Segment::plain(&text[last_end..]));
    segments
}

fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Lowercased text with a map from each lowered byte back to the original
/// character it came from.
struct FoldedText {
    lowered: String,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut lowered = String::with_capacity(text.len());
        let mut starts = Vec::with_capacity(text.len());
        let mut ends = Vec::with_capacity(text.len());

        for (offset, ch) in text.char_indices() {
            let before = lowered.len();
            lowered.extend(ch.to_lowercase());
            let produced = lowered.len() - before;
            starts.extend(std::iter::repeat(offset).take(produced));
            ends.extend(std::iter::repeat(offset + ch.len_utf8()).take(produced));
        }

        FoldedText { lowered, starts, ends }
    }

    /// Original byte span covering lowered bytes `start..end`.
    fn original_span(&self, start: usize, end: usize) -> (usize, usize) {
        (self.starts[start], self.ends[end - 1])
    }

    /// First lowered position at or after `end` that begins at or after the
    /// original offset `orig_end`, so matches never share a source character.
    fn next_position_after(&self, end: usize, orig_end: usize) -> usize {
        let mut pos = end;
        while pos < self.lowered.len() && self.starts[pos] < orig_end {
            pos += 1;
        }
        pos
    }
}
