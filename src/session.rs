use crate::cursor::{CursorState, ResultCursor};
use crate::error::{QueryError, StoreError};
use crate::logger::DiagnosticLogger;
use crate::search::{self, highlight, SearchQuery, Segment};
use crate::store::CorpusStore;
use rand::seq::IndexedRandom;
use serde::Serialize;
use serde_json::json;

pub const WELCOME_TITLE: &str = "Welcome to KJV Bible Reader";

pub const WELCOME_MESSAGES: [&str; 8] = [
    "Today is a great day to open your heart to a new verse. Every word matters!",
    "The journey of faith is read, one chapter at a time. Keep going!",
    "Let the ancient wisdom illuminate your modern path. You've got this!",
    "Don't rush the stillness. Find comfort and challenge in today's reading.",
    "Persistence in reading brings profound peace. Your time in the Word is an investment.",
    "Welcome back! Remember, the Bible is not just a book, it's a living guide for life.",
    "Just one verse can change your perspective for the whole day. Read with intention.",
    "Keep digging! There are treasures waiting for you in every chapter.",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub book: Option<String>,
    pub chapter: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Screen {
    pub title: String,
    pub status: String,
    pub view: View,
    /// Present while a result list is being stepped through.
    pub navigation: Option<ResultNav>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    Welcome { message: String },
    Chapter(ChapterView),
    Results(ResultsView),
    NoResults { term: String },
    NotFound { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterView {
    pub book: String,
    pub chapter: u32,
    pub verses: Vec<VerseLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerseLine {
    pub number: u32,
    pub segments: Vec<Segment>,
    pub emphasized: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsView {
    pub term: String,
    pub total: usize,
    pub entries: Vec<ResultEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    pub ordinal: usize,
    pub reference: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultNav {
    pub label: String,
    pub can_previous: bool,
    pub can_next: bool,
}

impl ResultNav {
    fn from_cursor(cursor: &ResultCursor) -> Option<Self> {
        cursor.position_label().map(|label| ResultNav {
            label,
            can_previous: cursor.can_previous(),
            can_next: cursor.can_next(),
        })
    }
}

pub struct ReaderSession<'a> {
    store: &'a CorpusStore,
    selection: Selection,
    query: Option<SearchQuery>,
    cursor: ResultCursor,
    logger: Option<DiagnosticLogger>,
}

impl<'a> ReaderSession<'a> {
    /// Starts with the first chapter of the first book selected, unrendered.
    pub fn new(store: &'a CorpusStore) -> Self {
        let mut session = ReaderSession {
            store,
            selection: Selection::default(),
            query: None,
            cursor: ResultCursor::default(),
            logger: None,
        };
        if let Some(first) = store.list_books().first() {
            if let Ok(chapter) = store.first_chapter(first) {
                session.set_book_silently(first);
                session.set_chapter_silently(chapter);
            }
        }
        session
    }

    pub fn with_logger(mut self, logger: DiagnosticLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The active result list, if the last search found anything.
    pub fn cursor(&self) -> Option<&ResultCursor> {
        match self.cursor.state() {
            CursorState::Empty => None,
            CursorState::Positioned(_) => Some(&self.cursor),
        }
    }

    pub fn welcome(&self) -> Screen {
        let message = WELCOME_MESSAGES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(WELCOME_MESSAGES[0]);
        Screen {
            title: WELCOME_TITLE.to_string(),
            status: "Ready - Select a book and chapter to read".to_string(),
            view: View::Welcome {
                message: message.to_string(),
            },
            navigation: None,
        }
    }

    /// Selects `book` and shows its first chapter.
    pub fn select_book(&mut self, book: &str) -> Screen {
        match self.store.first_chapter(book) {
            Ok(chapter) => self.open(book, chapter, None),
            Err(err) => self.not_found(err),
        }
    }

    /// Shows `chapter` of the selected book.
    pub fn select_chapter(&mut self, chapter: u32) -> Screen {
        match self.selection.book.clone() {
            Some(book) => self.open(&book, chapter, None),
            None => self.nothing_selected(),
        }
    }

    /// Selects book and chapter together and shows the chapter, with
    /// `emphasize` flagged when given.
    pub fn open(&mut self, book: &str, chapter: u32, emphasize: Option<u32>) -> Screen {
        if let Err(err) = self.store.list_verses(book, chapter) {
            return self.not_found(err);
        }
        self.set_book_silently(book);
        self.set_chapter_silently(chapter);
        self.render_chapter(book, chapter, emphasize, None)
    }

    /// Re-renders the current selection.
    pub fn current_chapter(&self) -> Screen {
        match (&self.selection.book, self.selection.chapter) {
            (Some(book), Some(chapter)) => self.render_chapter(book, chapter, None, None),
            _ => self.nothing_selected(),
        }
    }

    /// Moves to the following chapter, crossing into the next book after
    /// the last chapter. `None` at the end of the corpus.
    pub fn next_chapter(&mut self) -> Option<Screen> {
        let book = self.selection.book.clone()?;
        let chapter = self.selection.chapter?;
        let chapters = self.store.list_chapters(&book).ok()?;
        let position = chapters.iter().position(|c| *c == chapter)?;

        if let Some(next) = chapters.get(position + 1) {
            return Some(self.open(&book, *next, None));
        }

        let book_index = self.store.book_index(&book)?;
        let next_book = self.store.list_books().get(book_index + 1)?.clone();
        let first = self.store.first_chapter(&next_book).ok()?;
        Some(self.open(&next_book, first, None))
    }

    /// Moves to the preceding chapter, crossing into the last chapter of the
    /// previous book. `None` at the start of the corpus.
    pub fn previous_chapter(&mut self) -> Option<Screen> {
        let book = self.selection.book.clone()?;
        let chapter = self.selection.chapter?;
        let chapters = self.store.list_chapters(&book).ok()?;
        let position = chapters.iter().position(|c| *c == chapter)?;

        if position > 0 {
            return Some(self.open(&book, chapters[position - 1], None));
        }

        let book_index = self.store.book_index(&book)?;
        let previous_book = self.store.list_books().get(book_index.checked_sub(1)?)?.clone();
        let last = self.store.last_chapter(&previous_book).ok()?;
        Some(self.open(&previous_book, last, None))
    }

    /// Runs a new search, replacing any previous result list.
    pub fn search(&mut self, raw: &str) -> Result<Screen, QueryError> {
        let query = SearchQuery::parse(raw)?;
        let results = search::search(self.store.corpus(), self.store.list_books(), &query);

        if let Some(logger) = &self.logger {
            logger.info_with(
                "Search executed".to_string(),
                json!({"term": query.term(), "results": results.len()}),
            );
        }

        if results.is_empty() {
            self.query = None;
            self.cursor = ResultCursor::new(results);
            return Ok(Screen {
                title: "No Results".to_string(),
                status: "No results found".to_string(),
                view: View::NoResults {
                    term: query.term().to_string(),
                },
                navigation: None,
            });
        }

        let entries = results
            .iter()
            .enumerate()
            .map(|(i, result)| ResultEntry {
                ordinal: i + 1,
                reference: result.reference.clone(),
                segments: highlight(&result.text, query.folded()),
            })
            .collect();
        let total = results.len();
        self.cursor = ResultCursor::new(results);
        let navigation = ResultNav::from_cursor(&self.cursor);

        let screen = Screen {
            title: format!("Search Results: '{}' ({} found)", query.term(), total),
            status: format!("Found {} verses containing '{}'", total, query.term()),
            view: View::Results(ResultsView {
                term: query.term().to_string(),
                total,
                entries,
            }),
            navigation,
        };
        self.query = Some(query);
        Ok(screen)
    }

    /// Steps to the next result and shows it in its chapter; `None` when
    /// there is no later result.
    pub fn next_result(&mut self) -> Option<Screen> {
        self.cursor.next()?;
        Some(self.jump_to_current())
    }

    pub fn previous_result(&mut self) -> Option<Screen> {
        self.cursor.previous()?;
        Some(self.jump_to_current())
    }

    /// Shows the current result in its chapter without moving the cursor.
    pub fn show_current_result(&mut self) -> Option<Screen> {
        self.cursor.current()?;
        Some(self.jump_to_current())
    }

    pub fn clear_search(&mut self) -> Screen {
        self.query = None;
        self.cursor.clear();
        let mut screen = self.welcome();
        screen.status = "Search cleared".to_string();
        screen
    }

    fn jump_to_current(&mut self) -> Screen {
        let Some(result) = self.cursor.current().cloned() else {
            return self.welcome();
        };
        let navigation = ResultNav::from_cursor(&self.cursor);
        let status = format!(
            "Result {}: {} {}:{}",
            navigation.as_ref().map(|n| n.label.as_str()).unwrap_or_default(),
            result.book,
            result.chapter,
            result.verse
        );
        let folded = self
            .query
            .as_ref()
            .map(|query| query.folded().to_string())
            .unwrap_or_default();

        self.set_book_silently(&result.book);
        self.set_chapter_silently(result.chapter);

        let mut screen = self.render_chapter(&result.book, result.chapter, Some(result.verse), Some(&folded));
        if matches!(screen.view, View::Chapter(_)) {
            screen.status = status;
        }
        screen.navigation = navigation;
        screen
    }

    fn set_book_silently(&mut self, book: &str) {
        self.selection.book = Some(book.to_string());
    }

    fn set_chapter_silently(&mut self, chapter: u32) {
        self.selection.chapter = Some(chapter);
    }

    fn render_chapter(
        &self,
        book: &str,
        chapter: u32,
        emphasize: Option<u32>,
        folded_term: Option<&str>,
    ) -> Screen {
        let verses = match self.store.list_verses(book, chapter) {
            Ok(verses) => verses,
            Err(err) => return self.not_found(err),
        };

        let lines: Vec<VerseLine> = verses
            .iter()
            .map(|(number, text)| VerseLine {
                number: *number,
                segments: match folded_term {
                    Some(term) => highlight(text, term),
                    None => highlight(text, ""),
                },
                emphasized: Some(*number) == emphasize,
            })
            .collect();

        Screen {
            title: format!("{} - Chapter {}", book, chapter),
            status: format!("{} {} (KJV) - {} verses", book, chapter, lines.len()),
            view: View::Chapter(ChapterView {
                book: book.to_string(),
                chapter,
                verses: lines,
            }),
            navigation: None,
        }
    }

    fn not_found(&self, err: StoreError) -> Screen {
        if let Some(logger) = &self.logger {
            logger.warning(err.to_string(), Some(json!({"selection": self.selection})));
        }
        error_screen(err.to_string())
    }

    fn nothing_selected(&self) -> Screen {
        error_screen("No chapter selected.".to_string())
    }
}

fn error_screen(message: String) -> Screen {
    Screen {
        title: "Error".to_string(),
        status: "Chapter not available".to_string(),
        view: View::NotFound { message },
        navigation: None,
    }
}
