use crate::models::Corpus;
use strsim::normalized_levenshtein;

/// Traditional Protestant ordering of the 66 books.
pub const CANONICAL_BOOKS: [&str; 66] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy",
    "Joshua", "Judges", "Ruth", "1 Samuel", "2 Samuel",
    "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs",
    "Ecclesiastes", "Song of Solomon", "Isaiah", "Jeremiah", "Lamentations",
    "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk",
    "Zephaniah", "Haggai", "Zechariah", "Malachi",
    "Matthew", "Mark", "Luke", "John", "Acts",
    "Romans", "1 Corinthians", "2 Corinthians", "Galatians", "Ephesians",
    "Philippians", "Colossians", "1 Thessalonians", "2 Thessalonians",
    "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews",
    "James", "1 Peter", "2 Peter", "1 John", "2 John",
    "3 John", "Jude", "Revelation",
];

const SUGGESTION_THRESHOLD: f64 = 0.5;

/// Canonical order filtered to the books present in `corpus`.
///
/// Books outside the canonical list are not navigable and never appear here.
pub fn working_books(corpus: &Corpus) -> Vec<String> {
    CANONICAL_BOOKS
        .iter()
        .filter(|name| corpus.contains_book(name))
        .map(|name| name.to_string())
        .collect()
}

pub fn canonical_position(book: &str) -> Option<usize> {
    CANONICAL_BOOKS.iter().position(|name| *name == book)
}

/// Books in `corpus` that have no canonical position, sorted by name.
pub fn unlisted_books(corpus: &Corpus) -> Vec<String> {
    let mut unlisted: Vec<String> = corpus
        .book_names()
        .filter(|name| canonical_position(name).is_none())
        .map(str::to_string)
        .collect();
    unlisted.sort();
    unlisted
}

/// Case-insensitive exact lookup among `books`.
pub fn resolve_book<'a>(input: &str, books: &'a [String]) -> Option<&'a str> {
    let wanted = collapse_whitespace(input);
    books
        .iter()
        .find(|name| name.eq_ignore_ascii_case(&wanted))
        .map(String::as_str)
}

/// Closest book name to a misspelled `input`, if any is reasonably close.
pub fn suggest_book<'a>(input: &str, books: &'a [String]) -> Option<&'a str> {
    let wanted = collapse_whitespace(input).to_lowercase();
    books
        .iter()
        .map(|name| (name, normalized_levenshtein(&wanted, &name.to_lowercase())))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name.as_str())
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_canonical_list_is_complete_and_unique() {
        let unique: std::collections::HashSet<_> = CANONICAL_BOOKS.iter().collect();
        assert_eq!(unique.len(), 66);
        assert_eq!(CANONICAL_BOOKS[0], "Genesis");
        assert_eq!(CANONICAL_BOOKS[38], "Malachi");
        assert_eq!(CANONICAL_BOOKS[39], "Matthew");
        assert_eq!(CANONICAL_BOOKS[65], "Revelation");
    }

    #[test]
    fn test_working_books_follow_canonical_order() {
        let mut corpus = Corpus::new();
        for book in ["Revelation", "John", "Genesis", "Apocrypha"] {
            corpus.insert_verse(book, 1, 1, "text");
        }

        assert_eq!(working_books(&corpus), names(&["Genesis", "John", "Revelation"]));
        assert_eq!(unlisted_books(&corpus), names(&["Apocrypha"]));
    }

    #[test]
    fn test_working_books_of_empty_corpus() {
        assert!(working_books(&Corpus::new()).is_empty());
    }

    #[test]
    fn test_resolve_book_ignores_case_and_spacing() {
        let books = names(&["1 John", "John", "Song of Solomon"]);
        assert_eq!(resolve_book("john", &books), Some("John"));
        assert_eq!(resolve_book("1  JOHN", &books), Some("1 John"));
        assert_eq!(resolve_book("song of  solomon", &books), Some("Song of Solomon"));
        assert_eq!(resolve_book("Jon", &books), None);
    }

    #[test]
    fn test_suggest_book() {
        let books = names(&CANONICAL_BOOKS);
        assert_eq!(suggest_book("Revelations", &books), Some("Revelation"));
        assert_eq!(suggest_book("Psalm", &books), Some("Psalms"));
        assert_eq!(suggest_book("xyzzyplugh", &books), None);
    }

    #[test]
    fn test_canonical_position() {
        assert_eq!(canonical_position("Genesis"), Some(0));
        assert_eq!(canonical_position("Revelation"), Some(65));
        assert_eq!(canonical_position("Tobit"), None);
    }
}
