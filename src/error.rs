use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Local Bible data not found at {}", .0.display())]
    NotFoundLocal(PathBuf),

    #[error("Could not read local Bible data at {}: {source}", .path.display())]
    LocalUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupted JSON file {}: {source}", .path.display())]
    CorruptLocal {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid Bible data structure: {0}")]
    InvalidShape(String),

    #[error("Download failed: {0}")]
    RemoteFailure(String),

    #[error("Loader stopped before delivering data")]
    WorkerLost,
}

impl LoadError {
    /// Whether this failure sends the loader to the remote dataset.
    pub fn falls_back_to_remote(&self) -> bool {
        matches!(self, LoadError::NotFoundLocal(_) | LoadError::InvalidShape(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::NotFoundLocal(_) => "not_found_local",
            LoadError::LocalUnreadable { .. } => "local_unreadable",
            LoadError::CorruptLocal { .. } => "corrupt_local",
            LoadError::InvalidShape(_) => "invalid_shape",
            LoadError::RemoteFailure(_) => "remote_failure",
            LoadError::WorkerLost => "worker_lost",
        }
    }
}

/// A book, chapter or verse that is absent from the loaded corpus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Book {0} not found.")]
    BookNotFound(String),

    #[error("Chapter {book} {chapter} not found.")]
    ChapterNotFound { book: String, chapter: u32 },

    #[error("Verse {book} {chapter}:{verse} not found.")]
    VerseNotFound { book: String, chapter: u32, verse: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Please enter a search term.")]
    Empty,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Could not understand reference '{0}' (expected e.g. \"John 3:16\")")]
    Unparseable(String),

    #[error("Unknown book '{input}'{}", .suggestion.as_ref().map(|s| format!(", did you mean '{}'?", s)).unwrap_or_default())]
    UnknownBook {
        input: String,
        suggestion: Option<String>,
    },
}
