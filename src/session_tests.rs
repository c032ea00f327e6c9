use crate::error::QueryError;
use crate::logger::DiagnosticLogger;
use crate::models::Corpus;
use crate::search::Segment;
use crate::session::{ChapterView, ReaderSession, Screen, View, WELCOME_MESSAGES, WELCOME_TITLE};
use crate::store::CorpusStore;
use tempfile::TempDir;

pub fn create_reading_corpus() -> Corpus {
    let mut corpus = Corpus::new();
    corpus.insert_verse("Genesis", 1, 1, "In the beginning God created the heaven and the earth.");
    corpus.insert_verse(
        "Genesis",
        1,
        2,
        "And the earth was without form, and void; and darkness was upon the face of the deep.",
    );
    corpus.insert_verse("Genesis", 1, 3, "And God said, Let there be light: and there was light.");
    corpus.insert_verse(
        "Genesis",
        2,
        1,
        "Thus the heavens and the earth were finished, and all the host of them.",
    );
    corpus.insert_verse("Genesis", 2, 2, "And on the seventh day God ended his work which he had made;");
    corpus.insert_verse(
        "Exodus",
        1,
        1,
        "Now these are the names of the children of Israel, which came into Egypt;",
    );
    corpus.insert_verse(
        "John",
        3,
        16,
        "For God so loved the world, that he gave his only begotten Son,",
    );
    corpus.insert_verse(
        "John",
        3,
        17,
        "For God sent not his Son into the world to condemn the world;",
    );
    corpus.insert_verse("Revelation", 22, 21, "The grace of our Lord Jesus Christ be with you all. Amen.");
    corpus
}

fn chapter_of(screen: &Screen) -> &ChapterView {
    match &screen.view {
        View::Chapter(chapter) => chapter,
        other => panic!("expected chapter view, got {:?}", other),
    }
}

fn matched_words(segments: &[Segment]) -> Vec<&str> {
    segments
        .iter()
        .filter(|segment| segment.is_match)
        .map(|segment| segment.text.as_str())
        .collect()
}

fn selected<'s>(session: &'s ReaderSession<'_>) -> (Option<&'s str>, Option<u32>) {
    (session.selection().book.as_deref(), session.selection().chapter)
}

#[test]
fn test_new_session_selects_first_chapter() {
    let store = CorpusStore::new(create_reading_corpus());
    let session = ReaderSession::new(&store);

    assert_eq!(selected(&session), (Some("Genesis"), Some(1)));
    assert!(session.cursor().is_none());

    let screen = session.current_chapter();
    assert_eq!(screen.title, "Genesis - Chapter 1");
    assert_eq!(screen.status, "Genesis 1 (KJV) - 3 verses");
}

#[test]
fn test_welcome_screen() {
    let store = CorpusStore::new(create_reading_corpus());
    let session = ReaderSession::new(&store);

    let screen = session.welcome();
    assert_eq!(screen.title, WELCOME_TITLE);
    assert_eq!(screen.status, "Ready - Select a book and chapter to read");
    match screen.view {
        View::Welcome { message } => assert!(WELCOME_MESSAGES.contains(&message.as_str())),
        other => panic!("expected welcome, got {:?}", other),
    }
}

#[test]
fn test_select_book_opens_first_chapter() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);

    let screen = session.select_book("John");
    assert_eq!(selected(&session), (Some("John"), Some(3)));
    assert_eq!(screen.title, "John - Chapter 3");
    assert_eq!(screen.status, "John 3 (KJV) - 2 verses");

    let chapter = chapter_of(&screen);
    let numbers: Vec<u32> = chapter.verses.iter().map(|v| v.number).collect();
    assert_eq!(numbers, vec![16, 17]);
    assert!(chapter.verses.iter().all(|v| !v.emphasized));
    assert!(chapter.verses.iter().all(|v| matched_words(&v.segments).is_empty()));
}

#[test]
fn test_missing_selection_shows_not_found_and_keeps_selection() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);

    let screen = session.select_book("Tobit");
    assert_eq!(screen.title, "Error");
    assert!(matches!(screen.view, View::NotFound { ref message } if message == "Book Tobit not found."));
    assert_eq!(selected(&session), (Some("Genesis"), Some(1)));

    let screen = session.select_chapter(9);
    assert!(matches!(screen.view, View::NotFound { ref message } if message == "Chapter Genesis 9 not found."));
    assert_eq!(selected(&session), (Some("Genesis"), Some(1)));

    let screen = session.select_chapter(2);
    assert_eq!(chapter_of(&screen).chapter, 2);
    assert_eq!(selected(&session), (Some("Genesis"), Some(2)));
}

#[test]
fn test_search_single_result() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);

    let screen = session.search("loved").unwrap();
    assert_eq!(screen.title, "Search Results: 'loved' (1 found)");
    assert_eq!(screen.status, "Found 1 verses containing 'loved'");

    let nav = screen.navigation.as_ref().unwrap();
    assert_eq!(nav.label, "1/1");
    assert!(!nav.can_next);
    assert!(!nav.can_previous);

    match &screen.view {
        View::Results(results) => {
            assert_eq!(results.total, 1);
            assert_eq!(results.entries[0].reference, "John 3:16");
            assert_eq!(matched_words(&results.entries[0].segments), vec!["loved"]);
        }
        other => panic!("expected results, got {:?}", other),
    }

    // Listing results does not move the reading position.
    assert_eq!(selected(&session), (Some("Genesis"), Some(1)));
    assert!(session.next_result().is_none());
    assert!(session.previous_result().is_none());
}

#[test]
fn test_search_without_hits() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);
    session.search("earth").unwrap();

    let screen = session.search("xyzzy").unwrap();
    assert_eq!(screen.title, "No Results");
    assert_eq!(screen.status, "No results found");
    assert!(matches!(screen.view, View::NoResults { ref term } if term == "xyzzy"));
    assert!(screen.navigation.is_none());
    assert!(session.cursor().is_none());
    assert!(session.next_result().is_none());
}

#[test]
fn test_blank_search_is_rejected_without_losing_results() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);
    session.search("God").unwrap();

    assert_eq!(session.search("   ").unwrap_err(), QueryError::Empty);
    assert_eq!(session.search("").unwrap_err(), QueryError::Empty);
    assert_eq!(session.cursor().map(|c| c.len()), Some(5));
}

#[test]
fn test_stepping_through_results() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);
    session.select_book("Exodus");

    let screen = session.search("EARTH").unwrap();
    assert_eq!(screen.navigation.as_ref().unwrap().label, "1/3");
    assert_eq!(selected(&session), (Some("Exodus"), Some(1)));

    let screen = session.show_current_result().unwrap();
    assert_eq!(screen.status, "Result 1/3: Genesis 1:1");
    assert_eq!(selected(&session), (Some("Genesis"), Some(1)));
    let chapter = chapter_of(&screen);
    assert!(chapter.verses[0].emphasized);
    assert!(!chapter.verses[1].emphasized);
    assert_eq!(matched_words(&chapter.verses[0].segments), vec!["earth"]);
    assert_eq!(matched_words(&chapter.verses[1].segments), vec!["earth"]);
    assert!(matched_words(&chapter.verses[2].segments).is_empty());

    let screen = session.next_result().unwrap();
    assert_eq!(screen.status, "Result 2/3: Genesis 1:2");
    assert!(chapter_of(&screen).verses[1].emphasized);

    let screen = session.next_result().unwrap();
    assert_eq!(screen.status, "Result 3/3: Genesis 2:1");
    assert_eq!(screen.title, "Genesis - Chapter 2");
    assert_eq!(selected(&session), (Some("Genesis"), Some(2)));
    let nav = screen.navigation.as_ref().unwrap();
    assert!(!nav.can_next);
    assert!(nav.can_previous);

    assert!(session.next_result().is_none());
    assert_eq!(session.cursor().and_then(|c| c.position_label()).as_deref(), Some("3/3"));

    let screen = session.previous_result().unwrap();
    assert_eq!(screen.status, "Result 2/3: Genesis 1:2");
    assert_eq!(selected(&session), (Some("Genesis"), Some(1)));

    session.previous_result().unwrap();
    assert!(session.previous_result().is_none());
}

#[test]
fn test_result_jump_highlights_every_occurrence() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);
    session.search("World").unwrap();

    let screen = session.next_result().unwrap();
    assert_eq!(screen.status, "Result 2/2: John 3:17");
    let chapter = chapter_of(&screen);
    assert_eq!(matched_words(&chapter.verses[0].segments), vec!["world"]);
    assert_eq!(matched_words(&chapter.verses[1].segments), vec!["world", "world"]);

    let rebuilt: String = chapter.verses[1].segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(rebuilt, "For God sent not his Son into the world to condemn the world;");
}

#[test]
fn test_committing_selection_drops_highlight_but_keeps_results() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);
    session.search("son").unwrap();
    session.show_current_result().unwrap();

    let screen = session.select_book("Revelation");
    assert!(screen.navigation.is_none());
    assert!(chapter_of(&screen).verses.iter().all(|v| !v.emphasized));

    let screen = session.next_result().unwrap();
    assert_eq!(screen.status, "Result 2/2: John 3:17");
}

#[test]
fn test_clear_search() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);
    session.search("God").unwrap();
    session.next_result().unwrap();

    let screen = session.clear_search();
    assert_eq!(screen.title, WELCOME_TITLE);
    assert_eq!(screen.status, "Search cleared");
    assert!(matches!(screen.view, View::Welcome { .. }));
    assert!(session.cursor().is_none());
    assert!(session.next_result().is_none());
    assert!(session.show_current_result().is_none());
    assert_eq!(selected(&session), (Some("Genesis"), Some(1)));
}

#[test]
fn test_chapter_navigation_crosses_books() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);

    assert!(session.previous_chapter().is_none());

    let screen = session.next_chapter().unwrap();
    assert_eq!(screen.title, "Genesis - Chapter 2");

    let screen = session.next_chapter().unwrap();
    assert_eq!(screen.title, "Exodus - Chapter 1");

    let screen = session.next_chapter().unwrap();
    assert_eq!(screen.title, "John - Chapter 3");

    let screen = session.previous_chapter().unwrap();
    assert_eq!(screen.title, "Exodus - Chapter 1");

    let screen = session.previous_chapter().unwrap();
    assert_eq!(screen.title, "Genesis - Chapter 2");

    session.select_book("Revelation");
    assert!(session.next_chapter().is_none());
    assert_eq!(selected(&session), (Some("Revelation"), Some(22)));
}

#[test]
fn test_open_with_emphasis() {
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store);

    let screen = session.open("John", 3, Some(17));
    let chapter = chapter_of(&screen);
    assert_eq!(chapter.book, "John");
    assert!(!chapter.verses[0].emphasized);
    assert!(chapter.verses[1].emphasized);
}

#[test]
fn test_empty_store_session() {
    let store = CorpusStore::default();
    let mut session = ReaderSession::new(&store);

    assert_eq!(selected(&session), (None, None));
    assert!(matches!(
        session.current_chapter().view,
        View::NotFound { ref message } if message == "No chapter selected."
    ));
    assert!(matches!(session.select_chapter(1).view, View::NotFound { .. }));
    assert!(session.next_chapter().is_none());
    assert!(session.previous_chapter().is_none());
    assert!(matches!(session.search("God").unwrap().view, View::NoResults { .. }));
}

#[test]
fn test_session_logs_searches_and_misses() {
    let temp_dir = TempDir::new().unwrap();
    let logger = DiagnosticLogger::new(temp_dir.path()).unwrap();
    let store = CorpusStore::new(create_reading_corpus());
    let mut session = ReaderSession::new(&store).with_logger(logger.clone());

    session.search("light").unwrap();
    session.select_book("Tobit");

    let report = logger.generate_report(store.stats()).unwrap();
    assert_eq!(report.summary.warnings, 1);
    assert_eq!(report.summary.loaded.books, 4);

    let search_entry = report
        .entries
        .iter()
        .find(|entry| entry.message == "Search executed")
        .unwrap();
    let context = search_entry.context.as_ref().unwrap();
    assert_eq!(context["term"], "light");
    assert_eq!(context["results"], 1);

    assert!(report.entries.iter().any(|entry| entry.message == "Book Tobit not found."));
}
