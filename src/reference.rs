use crate::canon;
use crate::error::ReferenceError;
use anyhow::{Context, Result};
use regex::Regex;

/// A parsed "Book Chapter[:Verse]" reference against the working book list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRef {
    pub book: String,
    pub chapter: u32,
    pub verse: Option<u32>,
}

pub struct ReferenceParser {
    pattern: Regex,
}

impl ReferenceParser {
    pub fn new() -> Result<Self> {
        Ok(ReferenceParser {
            pattern: Regex::new(r"^\s*((?:[1-3]\s*)?[A-Za-z][A-Za-z ]*?)\s*(\d+)(?:\s*:\s*(\d+))?\s*$")
                .context("Failed to compile reference pattern")?,
        })
    }

    pub fn parse(&self, input: &str, books: &[String]) -> Result<VerseRef, ReferenceError> {
        let caps = self
            .pattern
            .captures(input)
            .ok_or_else(|| ReferenceError::Unparseable(input.trim().to_string()))?;

        let raw_book = normalize_book_prefix(&caps[1]);
        let book = canon::resolve_book(&raw_book, books).ok_or_else(|| ReferenceError::UnknownBook {
            suggestion: canon::suggest_book(&raw_book, books).map(str::to_string),
            input: raw_book.clone(),
        })?;

        let chapter = parse_positive(&caps[2]).ok_or_else(|| ReferenceError::Unparseable(input.trim().to_string()))?;
        let verse = match caps.get(3) {
            Some(m) => Some(parse_positive(m.as_str()).ok_or_else(|| ReferenceError::Unparseable(input.trim().to_string()))?),
            None => None,
        };

        Ok(VerseRef {
            book: book.to_string(),
            chapter,
            verse,
        })
    }

    /// Resolves a bare book name, for commands that take the book alone.
    pub fn parse_book<'a>(&self, input: &str, books: &'a [String]) -> Result<&'a str, ReferenceError> {
        let raw_book = normalize_book_prefix(input);
        canon::resolve_book(&raw_book, books).ok_or_else(|| ReferenceError::UnknownBook {
            suggestion: canon::suggest_book(&raw_book, books).map(str::to_string),
            input: raw_book,
        })
    }
}

/// "1john" -> "1 john", so numbered books resolve without the space.
fn normalize_book_prefix(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.as_str()) {
        (Some(d @ '1'..='3'), rest) if rest.starts_with(|c: char| c.is_ascii_alphabetic()) => {
            format!("{} {}", d, rest)
        }
        _ => trimmed.to_string(),
    }
}

fn parse_positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}
