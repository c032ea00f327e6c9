use crate::config::ReaderConfig;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kjv-reader")]
#[command(about = "Read and search the King James Bible from the terminal", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to the local kjv.json snapshot")]
    pub data: Option<PathBuf>,

    #[arg(long, global = true, help = "URL to download the dataset from when no usable snapshot exists")]
    pub source_url: Option<String>,

    #[arg(long, global = true, help = "User-Agent sent with the download request")]
    pub user_agent: Option<String>,

    #[arg(long, global = true, help = "Download timeout in seconds")]
    pub timeout_secs: Option<u64>,

    #[arg(long, global = true, help = "Log directory")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Number of session logs to keep")]
    pub keep_logs: Option<usize>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, global = true, help = "Disable ANSI highlighting in text output")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Html,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the books available in canonical order
    Books,
    /// List the chapters of a book
    Chapters { book: String },
    /// Show a chapter
    Read {
        book: String,
        chapter: u32,
        #[arg(long, help = "Verse to emphasize")]
        verse: Option<u32>,
    },
    /// Look up a reference such as "John 3:16" or "Psalms 23"
    Verse { reference: String },
    /// Search every verse for a word or phrase
    Search {
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
        #[arg(long, help = "Open the Nth result in its chapter")]
        goto: Option<usize>,
    },
    /// Start an interactive reading session (default)
    Interactive,
}

impl Cli {
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Defaults overridden by whatever flags were given.
    pub fn to_config(&self) -> ReaderConfig {
        let mut config = ReaderConfig::default();
        if let Some(path) = &self.data {
            config.snapshot_path = path.clone();
        }
        if let Some(url) = &self.source_url {
            config.source_url = url.clone();
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
        if let Some(keep) = self.keep_logs {
            config.keep_logs = keep;
        }
        config
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Interactive)
    }
}

/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Quit,
    Help,
    Current,
    Book(String),
    Chapter(u32),
    Goto(String),
    NextChapter,
    PreviousChapter,
    Search(String),
    NextResult,
    PreviousResult,
    ClearSearch,
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Input {
        let line = line.trim();
        if let Some(term) = line.strip_prefix('/') {
            return Input::Search(term.to_string());
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word.to_lowercase().as_str(), rest) {
            ("", _) => Input::Empty,
            ("q" | "quit" | "exit", "") => Input::Quit,
            ("help" | "?", "") => Input::Help,
            ("r" | ".", "") => Input::Current,
            ("n" | "next", "") => Input::NextChapter,
            ("p" | "prev" | "previous", "") => Input::PreviousChapter,
            ("]", "") => Input::NextResult,
            ("[", "") => Input::PreviousResult,
            ("clear", "") => Input::ClearSearch,
            ("search", term) => Input::Search(term.to_string()),
            ("book", name) if !name.is_empty() => Input::Book(name.to_string()),
            ("go", reference) if !reference.is_empty() => Input::Goto(reference.to_string()),
            ("ch" | "chapter", number) => match number.parse::<u32>() {
                Ok(n) => Input::Chapter(n),
                Err(_) => Input::Unknown(line.to_string()),
            },
            _ => Input::Unknown(line.to_string()),
        }
    }
}
