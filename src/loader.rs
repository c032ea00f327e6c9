use crate::canon;
use crate::config::ReaderConfig;
use crate::error::LoadError;
use crate::logger::DiagnosticLogger;
use crate::models::{Corpus, RemoteBook, RemoteChapter};
use crate::validation::{NormalizedCorpus, SnapshotValidator};
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const STATUS_CHECKING: &str = "Checking local Bible data...";
pub const STATUS_DOWNLOADING: &str = "Downloading Bible data...";
pub const STATUS_CONVERTING: &str = "Converting data format...";
pub const STATUS_SAVING: &str = "Saving data locally...";
pub const STATUS_READY: &str = "Bible data loaded successfully";
pub const STATUS_CORRUPT: &str = "Error: Corrupted JSON file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusSource {
    LocalSnapshot,
    Remote,
    Unavailable,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub corpus: Corpus,
    pub source: CorpusSource,
    /// Final status line, suitable for a status bar.
    pub status: String,
    pub failure: Option<LoadError>,
}

impl LoadOutcome {
    fn loaded(corpus: Corpus, source: CorpusSource) -> Self {
        LoadOutcome {
            corpus,
            source,
            status: STATUS_READY.to_string(),
            failure: None,
        }
    }

    fn failed(failure: LoadError) -> Self {
        let status = match &failure {
            LoadError::CorruptLocal { .. } => STATUS_CORRUPT.to_string(),
            LoadError::LocalUnreadable { .. } | LoadError::WorkerLost => format!("Error: {}", failure),
            other => other.to_string(),
        };
        LoadOutcome {
            corpus: Corpus::new(),
            source: CorpusSource::Unavailable,
            status,
            failure: Some(failure),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

#[derive(Debug)]
pub enum LoadEvent {
    Status(String),
    Loaded(LoadOutcome),
}

/// Where the dataset comes from when no usable snapshot exists.
pub trait RemoteSource: Send {
    fn location(&self) -> &str;

    /// Raw response body of the dataset.
    fn fetch(&self) -> Result<String, LoadError>;
}

/// Plain HTTP GET with a client identifier and a bounded timeout.
pub struct HttpSource {
    url: String,
    user_agent: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: &str, user_agent: &str, timeout: Duration) -> Self {
        HttpSource {
            url: url.to_string(),
            user_agent: user_agent.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(&config.source_url, &config.user_agent, config.timeout())
    }
}

impl RemoteSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<String, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .build()
            .map_err(remote_failure)?;

        let response = client.get(&self.url).send().map_err(remote_failure)?;
        if !response.status().is_success() {
            return Err(LoadError::RemoteFailure(format!("HTTP {}", response.status())));
        }

        response.text().map_err(remote_failure)
    }
}

fn remote_failure(err: impl std::fmt::Display) -> LoadError {
    LoadError::RemoteFailure(err.to_string())
}

pub struct CorpusLoader {
    snapshot_path: PathBuf,
    remote: Box<dyn RemoteSource>,
    validator: SnapshotValidator,
    logger: DiagnosticLogger,
}

impl CorpusLoader {
    pub fn new(config: &ReaderConfig, logger: DiagnosticLogger) -> Result<Self> {
        Self::with_remote(
            &config.snapshot_path,
            Box::new(HttpSource::from_config(config)),
            logger,
        )
    }

    pub fn with_remote(
        snapshot_path: &Path,
        remote: Box<dyn RemoteSource>,
        logger: DiagnosticLogger,
    ) -> Result<Self> {
        Ok(CorpusLoader {
            snapshot_path: snapshot_path.to_path_buf(),
            remote,
            validator: SnapshotValidator::new()
                .context("Failed to create SnapshotValidator for loader")?,
            logger,
        })
    }

    /// Runs the whole acquisition on a worker thread.
    pub fn spawn(self) -> io::Result<LoaderHandle> {
        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("corpus-loader".to_string())
            .spawn(move || {
                let status_tx = tx.clone();
                let outcome = self.load(&mut |status| {
                    let _ = status_tx.send(LoadEvent::Status(status.to_string()));
                });
                let _ = tx.send(LoadEvent::Loaded(outcome));
            })?;

        Ok(LoaderHandle {
            events: rx,
            thread,
        })
    }

    /// Resolves the corpus on the calling thread. Never fails: every error is
    /// folded into an empty outcome with a descriptive status.
    pub fn load(&self, notify: &mut dyn FnMut(&str)) -> LoadOutcome {
        notify(STATUS_CHECKING);
        self.logger.info_with(
            STATUS_CHECKING.to_string(),
            json!({"path": self.snapshot_path.display().to_string()}),
        );

        match self.load_local() {
            Ok(corpus) => {
                return self.finish(LoadOutcome::loaded(corpus, CorpusSource::LocalSnapshot), notify);
            }
            Err(err) if err.falls_back_to_remote() => {
                self.logger.info_with(
                    "Local Bible data unusable, falling back to download".to_string(),
                    json!({"reason": err.to_string(), "kind": err.kind()}),
                );
            }
            Err(err) => return self.finish(LoadOutcome::failed(err), notify),
        }

        let outcome = match self.acquire_remote(notify) {
            Ok(corpus) => LoadOutcome::loaded(corpus, CorpusSource::Remote),
            Err(err) => LoadOutcome::failed(err),
        };
        self.finish(outcome, notify)
    }

    fn finish(&self, outcome: LoadOutcome, notify: &mut dyn FnMut(&str)) -> LoadOutcome {
        notify(&outcome.status);
        match &outcome.failure {
            None => self.logger.info_with(
                outcome.status.clone(),
                json!({"source": format!("{:?}", outcome.source), "stats": outcome.corpus.stats()}),
            ),
            Some(err) => self.logger.error(
                outcome.status.clone(),
                Some(json!({
                    "kind": err.kind(),
                    "cause": err.to_string(),
                    "path": self.snapshot_path.display().to_string(),
                    "url": self.remote.location(),
                })),
            ),
        }
        outcome
    }

    fn load_local(&self) -> Result<Corpus, LoadError> {
        let bytes = match fs::read(&self.snapshot_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::NotFoundLocal(self.snapshot_path.clone()));
            }
            Err(source) => {
                return Err(LoadError::LocalUnreadable {
                    path: self.snapshot_path.clone(),
                    source,
                });
            }
        };

        let value: Value = serde_json::from_slice(&bytes).map_err(|source| LoadError::CorruptLocal {
            path: self.snapshot_path.clone(),
            source,
        })?;

        let normalized = self.validator.normalize(&value)?;
        self.log_normalization(&normalized);
        Ok(normalized.corpus)
    }

    fn acquire_remote(&self, notify: &mut dyn FnMut(&str)) -> Result<Corpus, LoadError> {
        notify(STATUS_DOWNLOADING);
        self.logger.info_with(
            STATUS_DOWNLOADING.to_string(),
            json!({"url": self.remote.location()}),
        );
        let body = self.remote.fetch()?;

        notify(STATUS_CONVERTING);
        let records: Vec<RemoteBook> = serde_json::from_str(body.trim_start_matches('\u{feff}'))
            .map_err(|e| LoadError::RemoteFailure(format!("unexpected dataset format: {}", e)))?;
        let snapshot = transform(records)?;
        let normalized = self
            .validator
            .normalize(&snapshot)
            .map_err(|e| LoadError::RemoteFailure(format!("converted data is unusable: {}", e)))?;
        self.log_normalization(&normalized);

        notify(STATUS_SAVING);
        let checksum = persist(&self.snapshot_path, &snapshot)?;
        self.logger.info_with(
            "Saved Bible data snapshot".to_string(),
            json!({"path": self.snapshot_path.display().to_string(), "sha256": checksum}),
        );

        Ok(normalized.corpus)
    }

    fn log_normalization(&self, normalized: &NormalizedCorpus) {
        self.logger.info_with(
            "Dataset normalized".to_string(),
            json!(normalized.statistics),
        );
        for book in canon::unlisted_books(&normalized.corpus) {
            self.logger.warning(
                format!("Book {} is not in the canonical book list and will be hidden", book),
                None,
            );
        }
        for warning in &normalized.warnings {
            self.logger.warning(
                warning.message.clone(),
                Some(json!({"book": warning.context.book, "chapter": warning.context.chapter})),
            );
        }
    }
}

/// Receiving end of a spawned loader.
pub struct LoaderHandle {
    events: Receiver<LoadEvent>,
    thread: JoinHandle<()>,
}

impl LoaderHandle {
    /// Blocks until the corpus is delivered, forwarding status lines.
    pub fn wait(self, mut on_status: impl FnMut(&str)) -> LoadOutcome {
        let outcome = loop {
            match self.events.recv() {
                Ok(LoadEvent::Status(status)) => on_status(&status),
                Ok(LoadEvent::Loaded(outcome)) => break outcome,
                Err(_) => break LoadOutcome::failed(LoadError::WorkerLost),
            }
        };
        let _ = self.thread.join();
        outcome
    }
}

/// Reshapes the downloaded book list into the snapshot mapping.
///
/// Chapter numbers come from list position (first entry is chapter 1); the
/// dataset carries no explicit chapter keys, so a gap upstream would shift
/// every later chapter.
pub fn transform(records: Vec<RemoteBook>) -> Result<Value, LoadError> {
    let mut books = Map::new();

    for record in records {
        let mut chapters = Map::new();
        for (index, chapter) in record.chapters.into_iter().enumerate() {
            let verses: Map<String, Value> = match chapter {
                RemoteChapter::Listed(texts) => texts
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| ((i + 1).to_string(), Value::String(text)))
                    .collect(),
                RemoteChapter::Keyed(verses) => verses,
            };
            chapters.insert((index + 1).to_string(), Value::Object(verses));
        }
        books.insert(record.book, Value::Object(chapters));
    }

    if books.is_empty() {
        return Err(LoadError::RemoteFailure("dataset contained no books".to_string()));
    }
    Ok(Value::Object(books))
}

/// Writes the snapshot as indented, unescaped UTF-8 JSON and returns its
/// SHA-256.
pub fn persist(path: &Path, snapshot: &Value) -> Result<String, LoadError> {
    let mut content = serde_json::to_string_pretty(snapshot).map_err(remote_failure)?;
    content.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| LoadError::RemoteFailure(format!("could not create {}: {}", parent.display(), e)))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    fs::write(&tmp_path, &content)
        .and_then(|_| fs::rename(&tmp_path, path))
        .map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            LoadError::RemoteFailure(format!("could not save {}: {}", path.display(), e))
        })?;

    Ok(format!("{:x}", Sha256::digest(content.as_bytes())))
}
