use crate::canon;
use crate::error::StoreError;
use crate::models::{BookChapters, ChapterVerses, Corpus, CorpusStats};

/// Read-only view over a loaded corpus plus its working book list.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    corpus: Corpus,
    books: Vec<String>,
}

impl CorpusStore {
    pub fn new(corpus: Corpus) -> Self {
        let books = canon::working_books(&corpus);
        CorpusStore { corpus, books }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// True when no navigable book is loaded.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn stats(&self) -> CorpusStats {
        self.corpus.stats()
    }

    pub fn list_books(&self) -> &[String] {
        &self.books
    }

    pub fn book_index(&self, book: &str) -> Option<usize> {
        self.books.iter().position(|name| name == book)
    }

    pub fn list_chapters(&self, book: &str) -> Result<Vec<u32>, StoreError> {
        Ok(self.book(book)?.keys().copied().collect())
    }

    pub fn list_verses(&self, book: &str, chapter: u32) -> Result<Vec<(u32, &str)>, StoreError> {
        Ok(self
            .chapter(book, chapter)?
            .iter()
            .map(|(number, text)| (*number, text.as_str()))
            .collect())
    }

    pub fn get_verse(&self, book: &str, chapter: u32, verse: u32) -> Result<&str, StoreError> {
        self.chapter(book, chapter)?
            .get(&verse)
            .map(String::as_str)
            .ok_or_else(|| StoreError::VerseNotFound {
                book: book.to_string(),
                chapter,
                verse,
            })
    }

    pub fn first_chapter(&self, book: &str) -> Result<u32, StoreError> {
        self.book(book)?
            .keys()
            .next()
            .copied()
            .ok_or_else(|| StoreError::BookNotFound(book.to_string()))
    }

    pub fn last_chapter(&self, book: &str) -> Result<u32, StoreError> {
        self.book(book)?
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| StoreError::BookNotFound(book.to_string()))
    }

    /// Only books in the working list resolve, matching what navigation shows.
    fn book(&self, book: &str) -> Result<&BookChapters, StoreError> {
        if self.book_index(book).is_none() {
            return Err(StoreError::BookNotFound(book.to_string()));
        }
        self.corpus
            .book(book)
            .ok_or_else(|| StoreError::BookNotFound(book.to_string()))
    }

    fn chapter(&self, book: &str, chapter: u32) -> Result<&ChapterVerses, StoreError> {
        self.book(book)?
            .get(&chapter)
            .ok_or_else(|| StoreError::ChapterNotFound {
                book: book.to_string(),
                chapter,
            })
    }
}
