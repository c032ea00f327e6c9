use crate::error::LoadError;
use crate::models::{BookChapters, ChapterVerses, Corpus};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct NormalizedCorpus {
    pub corpus: Corpus,
    pub warnings: Vec<ValidationWarning>,
    pub statistics: DatasetStatistics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationWarning {
    pub message: String,
    pub context: ValidationContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationContext {
    pub book: Option<String>,
    pub chapter: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatasetStatistics {
    pub total_books: usize,
    pub total_chapters: usize,
    pub total_verses: usize,
    pub dropped_books: usize,
    pub dropped_chapters: usize,
    pub missing_chapters: usize,
    pub missing_verses: usize,
}

/// Checks and converts the nested book -> chapter -> verse snapshot shape.
pub struct SnapshotValidator {
    number_pattern: Regex,
}

impl SnapshotValidator {
    pub fn new() -> Result<Self> {
        Ok(SnapshotValidator {
            number_pattern: Regex::new(r"^[0-9]+$")
                .context("Failed to compile chapter/verse number pattern")?,
        })
    }

    /// Quick structural probe: a non-empty mapping whose first book is a
    /// non-empty mapping whose first chapter is itself a mapping.
    pub fn check_shape(&self, value: &Value) -> Result<(), LoadError> {
        let books = match value.as_object() {
            Some(books) if !books.is_empty() => books,
            _ => return Err(shape("expected a non-empty mapping of books")),
        };

        let first_book = match books.values().next().and_then(Value::as_object) {
            Some(chapters) if !chapters.is_empty() => chapters,
            _ => return Err(shape("first book is not a non-empty mapping of chapters")),
        };

        match first_book.values().next() {
            Some(Value::Object(_)) => Ok(()),
            _ => Err(shape("first chapter is not a mapping of verses")),
        }
    }

    /// Converts a snapshot value into a `Corpus`, parsing numeric keys.
    ///
    /// Empty chapters and books are dropped with a warning; gaps in the
    /// numbering are reported but kept as-is.
    pub fn normalize(&self, value: &Value) -> Result<NormalizedCorpus, LoadError> {
        self.check_shape(value)?;
        let books = value
            .as_object()
            .ok_or_else(|| shape("expected a non-empty mapping of books"))?;

        let mut corpus = Corpus::new();
        let mut warnings = Vec::new();
        let mut statistics = DatasetStatistics::default();

        for (book_name, book_value) in books {
            let chapters_obj = book_value
                .as_object()
                .ok_or_else(|| shape(format!("book '{}' is not a mapping of chapters", book_name)))?;

            let mut chapters = BookChapters::new();
            for (chapter_key, chapter_value) in chapters_obj {
                let chapter_num = self.parse_number(chapter_key, "chapter", book_name)?;
                let verses_obj = chapter_value.as_object().ok_or_else(|| {
                    shape(format!("{} {} is not a mapping of verses", book_name, chapter_key))
                })?;

                let verses = self.convert_verses(book_name, chapter_num, verses_obj)?;
                if verses.is_empty() {
                    statistics.dropped_chapters += 1;
                    warnings.push(warning(
                        format!("Dropped empty chapter {} {}", book_name, chapter_num),
                        book_name,
                        Some(chapter_num),
                    ));
                    continue;
                }

                let missing = count_missing(verses.keys().copied());
                if missing > 0 {
                    statistics.missing_verses += missing;
                    warnings.push(warning(
                        format!("{} verse(s) missing from {} {}", missing, book_name, chapter_num),
                        book_name,
                        Some(chapter_num),
                    ));
                }

                statistics.total_verses += verses.len();
                chapters.insert(chapter_num, verses);
            }

            if chapters.is_empty() {
                statistics.dropped_books += 1;
                warnings.push(warning(format!("Dropped empty book {}", book_name), book_name, None));
                continue;
            }

            let missing = count_missing(chapters.keys().copied());
            if missing > 0 {
                statistics.missing_chapters += missing;
                warnings.push(warning(
                    format!("{} chapter(s) missing from {}", missing, book_name),
                    book_name,
                    None,
                ));
            }

            statistics.total_books += 1;
            statistics.total_chapters += chapters.len();
            corpus.insert_book(book_name.clone(), chapters);
        }

        if corpus.is_empty() {
            return Err(shape("no verses found"));
        }

        Ok(NormalizedCorpus {
            corpus,
            warnings,
            statistics,
        })
    }

    fn convert_verses(
        &self,
        book: &str,
        chapter: u32,
        verses_obj: &Map<String, Value>,
    ) -> Result<ChapterVerses, LoadError> {
        let mut verses = ChapterVerses::new();
        for (verse_key, verse_value) in verses_obj {
            let verse_num = self.parse_number(verse_key, "verse", book)?;
            let text = verse_value.as_str().ok_or_else(|| {
                shape(format!("{} {}:{} is not a text string", book, chapter, verse_key))
            })?;
            verses.insert(verse_num, text.to_string());
        }
        Ok(verses)
    }

    fn parse_number(&self, key: &str, what: &str, book: &str) -> Result<u32, LoadError> {
        if !self.number_pattern.is_match(key) {
            return Err(shape(format!("{} key '{}' in {} is not a number", what, key, book)));
        }
        match key.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(shape(format!("{} key '{}' in {} is not a positive number", what, key, book))),
        }
    }
}

fn shape(reason: impl Into<String>) -> LoadError {
    LoadError::InvalidShape(reason.into())
}

fn warning(message: String, book: &str, chapter: Option<u32>) -> ValidationWarning {
    ValidationWarning {
        message,
        context: ValidationContext {
            book: Some(book.to_string()),
            chapter,
        },
    }
}

/// Numbers absent from 1..=max of a sorted set.
fn count_missing(numbers: impl Iterator<Item = u32>) -> usize {
    let present: BTreeSet<u32> = numbers.collect();
    match present.last() {
        Some(&max) => max as usize - present.len(),
        None => 0,
    }
}
