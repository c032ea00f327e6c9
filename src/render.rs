use crate::search::Segment;
use crate::session::{Screen, View};
use anyhow::{Context, Result};
use tera::{Context as TeraContext, Tera};

const ANSI_MATCH: &str = "\x1b[1;33m";
const ANSI_EMPHASIS: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

pub const HELP_LINES: [&str; 10] = [
    "book <name>      select a book and read its first chapter",
    "ch <number>      read a chapter of the selected book",
    "go <reference>   open a reference such as John 3:16",
    "r                show the current chapter again",
    "n / p            next / previous chapter",
    "/<term>          search the whole Bible",
    "] / [            next / previous search result",
    "clear            clear the search",
    "help             show this list",
    "q                quit",
];

const SCREEN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{ title }}</title>
  <style>
    body { font-family: Georgia, serif; line-height: 1.9; color: #1f2937; max-width: 48rem; margin: 2rem auto; }
    h1 { color: #1e40af; border-bottom: 2px solid #3b82f6; padding-bottom: 0.5rem; }
    .num { color: #3b82f6; font-weight: bold; font-size: 0.75rem; margin-right: 0.5rem; }
    .emphasized { background-color: #dbeafe; padding: 0.6rem; border-left: 4px solid #3b82f6; }
    mark { background-color: #fef3c7; font-weight: 600; }
    .reference { color: #059669; font-weight: bold; }
    footer, nav { color: #6b7280; border-top: 1px dashed #d1d5db; margin-top: 1.5rem; padding-top: 0.5rem; }
  </style>
</head>
<body>
  <h1>{{ title }}</h1>
{% if view.kind == "chapter" %}
  <main class="chapter">
{% for verse in view.verses %}
    <p id="v{{ verse.number }}"{% if verse.emphasized %} class="emphasized"{% endif %}><span class="num">{{ verse.number }}</span>{% for seg in verse.segments %}{% if seg.is_match %}<mark>{{ seg.text }}</mark>{% else %}{{ seg.text }}{% endif %}{% endfor %}</p>
{% endfor %}
  </main>
{% elif view.kind == "results" %}
  <main class="results">
{% for entry in view.entries %}
    <div class="result">
      <div class="reference">{{ entry.ordinal }}. {{ entry.reference }}</div>
      <div>{% for seg in entry.segments %}{% if seg.is_match %}<mark>{{ seg.text }}</mark>{% else %}{{ seg.text }}{% endif %}{% endfor %}</div>
    </div>
{% endfor %}
  </main>
{% elif view.kind == "no_results" %}
  <main>
    <p>No verses found containing '{{ view.term }}'.</p>
    <p>Try different keywords or check spelling.</p>
  </main>
{% elif view.kind == "not_found" %}
  <main><p class="error">{{ view.message }}</p></main>
{% else %}
  <main class="welcome">
    <p><strong>{{ view.message }}</strong></p>
    <ul>
{% for line in help %}
      <li>{{ line }}</li>
{% endfor %}
    </ul>
  </main>
{% endif %}
{% if navigation %}
  <nav>Result {{ navigation.label | safe }}{% if navigation.can_previous %} &middot; previous available{% endif %}{% if navigation.can_next %} &middot; next available{% endif %}</nav>
{% endif %}
  <footer>{{ status }}</footer>
</body>
</html>
"#;

/// Terminal rendering. Matches are bracketed unless `color` is set, in which
/// case ANSI styling is used instead.
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        TextRenderer { color }
    }

    pub fn render(&self, screen: &Screen) -> String {
        let mut out = String::new();
        out.push_str(&format!("== {} ==\n\n", screen.title));

        match &screen.view {
            View::Welcome { message } => {
                out.push_str(message);
                out.push_str("\n\n");
                for line in HELP_LINES {
                    out.push_str(&format!("  {}\n", line));
                }
            }
            View::Chapter(chapter) => {
                for verse in &chapter.verses {
                    let marker = if verse.emphasized { ">" } else { " " };
                    let text = self.segments(&verse.segments);
                    if verse.emphasized && self.color {
                        out.push_str(&format!(
                            "{} {}{:>3}{} {}\n",
                            marker, ANSI_EMPHASIS, verse.number, ANSI_RESET, text
                        ));
                    } else {
                        out.push_str(&format!("{} {:>3} {}\n", marker, verse.number, text));
                    }
                }
            }
            View::Results(results) => {
                for entry in &results.entries {
                    out.push_str(&format!(
                        "{}. {}\n    {}\n",
                        entry.ordinal,
                        entry.reference,
                        self.segments(&entry.segments)
                    ));
                }
            }
            View::NoResults { term } => {
                out.push_str(&format!(
                    "No verses found containing '{}'.\n\nTry different keywords or check spelling.\n",
                    term
                ));
            }
            View::NotFound { message } => {
                out.push_str(message);
                out.push('\n');
            }
        }

        if let Some(nav) = &screen.navigation {
            out.push_str(&format!(
                "\n[{}] {} {}\n",
                nav.label,
                if nav.can_previous { "[ prev" } else { "       " },
                if nav.can_next { "] next" } else { "" }
            ));
        }
        out.push_str(&format!("\n-- {}\n", screen.status));
        out
    }

    fn segments(&self, segments: &[Segment]) -> String {
        let mut text = String::new();
        for segment in segments {
            match (segment.is_match, self.color) {
                (false, _) => text.push_str(&segment.text),
                (true, true) => {
                    text.push_str(ANSI_MATCH);
                    text.push_str(&segment.text);
                    text.push_str(ANSI_RESET);
                }
                (true, false) => {
                    text.push('[');
                    text.push_str(&segment.text);
                    text.push(']');
                }
            }
        }
        text
    }
}

/// Standalone HTML page per screen, verse text autoescaped.
pub struct HtmlRenderer {
    tera: Tera,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("screen.html", SCREEN_TEMPLATE)
            .context("Failed to initialize Tera templates")?;
        tera.autoescape_on(vec![".html"]);
        Ok(HtmlRenderer { tera })
    }

    pub fn render(&self, screen: &Screen) -> Result<String> {
        let mut context = TeraContext::from_serialize(screen)
            .context("Failed to build template context")?;
        context.insert("help", &HELP_LINES);
        self.tera
            .render("screen.html", &context)
            .context("Failed to render screen template")
    }
}

/// The renderer picked by `--format`.
pub enum Renderer {
    Text(TextRenderer),
    Html(HtmlRenderer),
}

impl Renderer {
    pub fn render(&self, screen: &Screen) -> Result<String> {
        match self {
            Renderer::Text(text) => Ok(text.render(screen)),
            Renderer::Html(html) => html.render(screen),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Corpus;
    use crate::session::ReaderSession;
    use crate::store::CorpusStore;

    fn store() -> CorpusStore {
        let mut corpus = Corpus::new();
        corpus.insert_verse("John", 3, 16, "For God so loved the world,");
        corpus.insert_verse("John", 3, 17, "For God sent not his Son into the world to condemn the world;");
        corpus.insert_verse("Jude", 1, 1, "Jude, the <servant> of Jesus Christ,");
        CorpusStore::new(corpus)
    }

    #[test]
    fn test_text_chapter_marks_emphasis_and_matches() {
        let store = store();
        let mut session = ReaderSession::new(&store);
        session.search("WORLD").unwrap();
        let screen = session.next_result().unwrap();

        let text = TextRenderer::new(false).render(&screen);

        assert!(text.starts_with("== John - Chapter 3 ==\n"));
        assert!(text.contains("   16 For God so loved the [world],\n"));
        assert!(text.contains(">  17 For God sent not his Son into the [world] to condemn the [world];\n"));
        assert!(text.contains("[2/2] [ prev"));
        assert!(text.ends_with("-- Result 2/2: John 3:17\n"));
    }

    #[test]
    fn test_text_results_list() {
        let store = store();
        let mut session = ReaderSession::new(&store);
        let screen = session.search("god").unwrap();

        let text = TextRenderer::new(false).render(&screen);

        assert!(text.contains("1. John 3:16\n    For [God] so loved the world,\n"));
        assert!(text.contains("2. John 3:17\n"));
        assert!(text.contains("-- Found 2 verses containing 'god'"));
    }

    #[test]
    fn test_text_color_uses_ansi() {
        let store = store();
        let mut session = ReaderSession::new(&store);
        let screen = session.search("loved").unwrap();

        let text = TextRenderer::new(true).render(&screen);
        assert!(text.contains("\x1b[1;33mloved\x1b[0m"));
        assert!(!text.contains("[loved]"));
    }

    #[test]
    fn test_html_escapes_text_and_marks_matches() {
        let store = store();
        let mut session = ReaderSession::new(&store);
        let screen = session.select_book("Jude");

        let html = HtmlRenderer::new().unwrap().render(&screen).unwrap();

        assert!(html.contains("<title>Jude - Chapter 1</title>"));
        assert!(html.contains("&lt;servant&gt;"));
        assert!(!html.contains("<servant>"));

        let screen = session.search("servant").unwrap();
        let html = HtmlRenderer::new().unwrap().render(&screen).unwrap();
        assert!(html.contains("<mark>servant</mark>"));
        assert!(html.contains("1. Jude 1:1"));
        assert!(html.contains("Result 1/1"));
    }

    #[test]
    fn test_html_welcome_and_not_found() {
        let store = store();
        let mut session = ReaderSession::new(&store);
        let renderer = HtmlRenderer::new().unwrap();

        let html = renderer.render(&session.welcome()).unwrap();
        assert!(html.contains("class=\"welcome\""));
        assert!(html.contains("search the whole Bible"));

        let html = renderer.render(&session.open("John", 99, None)).unwrap();
        assert!(html.contains("Chapter John 99 not found."));
    }
}
