use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Verse texts of one chapter, keyed by verse number.
pub type ChapterVerses = BTreeMap<u32, String>;

/// Chapters of one book, keyed by chapter number.
pub type BookChapters = BTreeMap<u32, ChapterVerses>;

/// The loaded book -> chapter -> verse text structure.
///
/// Book keys carry no order; callers go through the working book list in
/// `CorpusStore` for anything sequential. Chapter and verse keys are numeric,
/// so iteration over them is already ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    books: HashMap<String, BookChapters>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_book(&mut self, name: impl Into<String>, chapters: BookChapters) {
        self.books.insert(name.into(), chapters);
    }

    #[cfg(test)]
    pub fn insert_verse(&mut self, book: &str, chapter: u32, verse: u32, text: impl Into<String>) {
        self.books
            .entry(book.to_string())
            .or_default()
            .entry(chapter)
            .or_default()
            .insert(verse, text.into());
    }

    pub fn book(&self, name: &str) -> Option<&BookChapters> {
        self.books.get(name)
    }

    pub fn chapter(&self, book: &str, chapter: u32) -> Option<&ChapterVerses> {
        self.books.get(book).and_then(|chapters| chapters.get(&chapter))
    }

    pub fn contains_book(&self, name: &str) -> bool {
        self.books.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Book names in map order, which is unspecified.
    pub fn book_names(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(String::as_str)
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            books: self.books.len(),
            chapters: self.books.values().map(|b| b.len()).sum(),
            verses: self
                .books
                .values()
                .flat_map(|b| b.values())
                .map(|c| c.len())
                .sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
}

/// One verse matching a search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub reference: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl SearchResult {
    pub fn new(book: &str, chapter: u32, verse: u32, text: &str) -> Self {
        SearchResult {
            reference: format!("{} {}:{}", book, chapter, verse),
            book: book.to_string(),
            chapter,
            verse,
            text: text.to_string(),
        }
    }
}

/// Book record of the downloadable dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteBook {
    #[serde(alias = "name")]
    pub book: String,
    pub chapters: Vec<RemoteChapter>,
}

/// A chapter is either a list of verse texts (position = verse number - 1)
/// or an explicit verse number -> text object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RemoteChapter {
    Listed(Vec<String>),
    Keyed(serde_json::Map<String, serde_json::Value>),
}
