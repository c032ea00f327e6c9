mod canon;
mod cli;
mod config;
mod cursor;
mod error;
mod loader;
mod logger;
mod models;
mod reference;
mod render;
mod search;
mod session;
#[cfg(test)]
mod session_tests;
mod store;
mod validation;

use crate::cli::{Cli, Command, Input, OutputFormat};
use crate::loader::CorpusLoader;
use crate::logger::DiagnosticLogger;
use crate::reference::ReferenceParser;
use crate::render::{HtmlRenderer, Renderer, TextRenderer};
use crate::session::{ReaderSession, View};
use crate::store::CorpusStore;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{self, BufRead, IsTerminal, Write};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config();

    let logger = DiagnosticLogger::new(&config.log_dir).context("Failed to create logger")?;
    logger
        .rotate_logs(config.keep_logs)
        .context("Failed to rotate session logs")?;
    logger.info_with(
        "Reader starting".to_string(),
        serde_json::to_value(&config).context("Failed to serialize configuration")?,
    );

    let loader = CorpusLoader::new(&config, logger.clone()).context("Failed to create corpus loader")?;
    let outcome = loader
        .spawn()
        .context("Failed to start loader thread")?
        .wait(|status| eprintln!("{}", status));

    let corpus_missing = outcome.is_empty();
    let store = CorpusStore::new(outcome.corpus);
    if corpus_missing || store.is_empty() {
        if !corpus_missing {
            logger.error(
                "Loaded Bible data contains no canonical books".to_string(),
                Some(serde_json::json!({"stats": store.stats()})),
            );
        }
        eprintln!("Could not load Bible data. Please check your internet connection.");
        logger.generate_report(store.stats())?;
        return Err(anyhow!("No Bible data available"));
    }

    let renderer = match cli.format {
        OutputFormat::Text => Renderer::Text(TextRenderer::new(!cli.no_color && io::stdout().is_terminal())),
        OutputFormat::Html => Renderer::Html(HtmlRenderer::new()?),
    };
    let parser = ReferenceParser::new()?;
    let mut session = ReaderSession::new(&store).with_logger(logger.clone());

    let result = run(&cli.command(), &store, &mut session, &parser, &renderer);
    logger.info(format!("Session {} finished", logger.session_id()));

    let report = logger
        .generate_report(store.stats())
        .context("Failed to generate session report")?;
    if report.summary.errors > 0 {
        eprintln!(
            "Session {}: {} errors, {} warnings (see {:?})",
            report.session_id, report.summary.errors, report.summary.warnings, config.log_dir
        );
    }

    result
}

fn run(
    command: &Command,
    store: &CorpusStore,
    session: &mut ReaderSession,
    parser: &ReferenceParser,
    renderer: &Renderer,
) -> Result<()> {
    match command {
        Command::Books => {
            for book in store.list_books() {
                println!("{}", book);
            }
        }
        Command::Chapters { book } => {
            let book = parser.parse_book(book, store.list_books())?;
            let chapters: Vec<String> = store
                .list_chapters(book)?
                .iter()
                .map(|c| c.to_string())
                .collect();
            println!("{}: {}", book, chapters.join(" "));
        }
        Command::Read { book, chapter, verse } => {
            let book = parser.parse_book(book, store.list_books())?;
            let screen = session.open(book, *chapter, *verse);
            if let View::NotFound { message } = &screen.view {
                bail!("{}", message);
            }
            println!("{}", renderer.render(&screen)?);
        }
        Command::Verse { reference } => {
            let reference = parser.parse(reference, store.list_books())?;
            match reference.verse {
                Some(verse) => {
                    let text = store.get_verse(&reference.book, reference.chapter, verse)?;
                    println!("{} {}:{} {}", reference.book, reference.chapter, verse, text);
                }
                None => {
                    let screen = session.open(&reference.book, reference.chapter, None);
                    if let View::NotFound { message } = &screen.view {
                        bail!("{}", message);
                    }
                    println!("{}", renderer.render(&screen)?);
                }
            }
        }
        Command::Search { term, goto } => {
            let screen = session.search(&term.join(" "))?;
            let screen = match goto {
                None => screen,
                Some(n) => {
                    let total = match session.cursor() {
                        Some(cursor) if !cursor.is_empty() => cursor.len(),
                        _ => bail!("No results to open"),
                    };
                    if *n == 0 || *n > total {
                        bail!("Result {} out of range (1-{})", n, total);
                    }
                    let mut screen = session
                        .show_current_result()
                        .ok_or_else(|| anyhow!("No results to open"))?;
                    for _ in 1..*n {
                        screen = session
                            .next_result()
                            .ok_or_else(|| anyhow!("No next result"))?;
                    }
                    screen
                }
            };
            println!("{}", renderer.render(&screen)?);
        }
        Command::Interactive => run_interactive(store, session, parser, renderer)?,
    }
    Ok(())
}

fn run_interactive(
    store: &CorpusStore,
    session: &mut ReaderSession,
    parser: &ReferenceParser,
    renderer: &Renderer,
) -> Result<()> {
    println!("{}", renderer.render(&session.welcome())?);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        match (&session.selection().book, session.selection().chapter) {
            (Some(book), Some(chapter)) => print!("{} {}> ", book, chapter),
            _ => print!("> "),
        }
        io::stdout().flush().context("Failed to flush stdout")?;

        line.clear();
        if stdin.lock().read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }

        let screen = match Input::parse(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Help => session.welcome(),
            Input::Book(name) => match parser.parse_book(&name, store.list_books()) {
                Ok(book) => session.select_book(book),
                Err(err) => {
                    eprintln!("{}", err);
                    continue;
                }
            },
            Input::Current => session.current_chapter(),
            Input::Chapter(chapter) => session.select_chapter(chapter),
            Input::Goto(reference) => match parser.parse(&reference, store.list_books()) {
                Ok(reference) => session.open(&reference.book, reference.chapter, reference.verse),
                Err(err) => {
                    eprintln!("{}", err);
                    continue;
                }
            },
            Input::NextChapter => match session.next_chapter() {
                Some(screen) => screen,
                None => {
                    eprintln!("Already at the last chapter.");
                    continue;
                }
            },
            Input::PreviousChapter => match session.previous_chapter() {
                Some(screen) => screen,
                None => {
                    eprintln!("Already at the first chapter.");
                    continue;
                }
            },
            Input::Search(term) => match session.search(&term) {
                Ok(screen) => screen,
                Err(err) => {
                    eprintln!("{}", err);
                    continue;
                }
            },
            Input::NextResult => match session.next_result() {
                Some(screen) => screen,
                None => {
                    eprintln!("No next result.");
                    continue;
                }
            },
            Input::PreviousResult => match session.previous_result() {
                Some(screen) => screen,
                None => {
                    eprintln!("No previous result.");
                    continue;
                }
            },
            Input::ClearSearch => session.clear_search(),
            Input::Unknown(input) => {
                eprintln!("Unknown command '{}'. Type 'help' for commands.", input);
                continue;
            }
        };

        println!("{}", renderer.render(&screen)?);
    }

    Ok(())
}
