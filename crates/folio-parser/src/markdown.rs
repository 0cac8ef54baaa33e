//! Markdown body rendering using pulldown-cmark.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;

use crate::{Result, html_escape, syntax::SyntaxHighlighter};

/// Average reading speed used for estimates.
const WORDS_PER_MINUTE: usize = 200;

/// Table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub text: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// HTML rendering of a record body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedBody {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub word_count: usize,
}

impl RenderedBody {
    /// Estimated reading time, at least one minute.
    pub fn reading_minutes(&self) -> usize {
        (self.word_count / WORDS_PER_MINUTE).max(1)
    }
}

/// Markdown renderer with syntax highlighting and heading anchors.
#[derive(Debug)]
pub struct MarkdownRenderer {
    highlighter: SyntaxHighlighter,
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::with_highlighter(SyntaxHighlighter::default())
    }
}

impl MarkdownRenderer {
    /// Create a renderer using the named syntax theme.
    pub fn with_theme(theme: &str) -> Result<Self> {
        Ok(Self::with_highlighter(SyntaxHighlighter::with_theme(theme)?))
    }

    fn with_highlighter(highlighter: SyntaxHighlighter) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            highlighter,
            options,
        }
    }

    /// Render a markdown body (frontmatter already removed).
    pub fn render(&self, body: &str) -> RenderedBody {
        let mut toc = Vec::new();
        let mut events: Vec<Event<'_>> = Vec::new();

        let mut code: Option<(Option<String>, String)> = None;
        let mut heading: Option<(u8, Option<String>, String, Vec<Event<'_>>)> = None;

        for event in Parser::new_ext(body, self.options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, buf)) = code.as_mut() {
                        buf.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, buf)) = code.take() {
                        let highlighted = self.highlighter.highlight(&buf, lang.as_deref());
                        push(&mut events, &mut heading, Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Start(Tag::Heading { level, id, .. }) => {
                    heading = Some((level as u8, id.map(|i| i.to_string()), String::new(), Vec::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, id, text, inner)) = heading.take() {
                        let id = id.unwrap_or_else(|| slugify(&text));
                        events.push(Event::Html(CowStr::from(format!(
                            "<h{level} id=\"{}\">",
                            html_escape(&id)
                        ))));
                        events.extend(inner);
                        events.push(Event::Html(CowStr::from(format!("</h{level}>\n"))));
                        toc.push(TocEntry { level, text, id });
                    }
                }
                other => {
                    if let (Some((_, _, text, _)), Event::Text(t) | Event::Code(t)) =
                        (heading.as_mut(), &other)
                    {
                        text.push_str(t);
                    }
                    push(&mut events, &mut heading, other);
                }
            }
        }

        let mut html_out = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut html_out, events.into_iter());

        RenderedBody {
            html: html_out,
            toc,
            word_count: body.split_whitespace().count(),
        }
    }
}

/// Route an event into the open heading, if any, or the output stream.
fn push<'a>(
    events: &mut Vec<Event<'a>>,
    heading: &mut Option<(u8, Option<String>, String, Vec<Event<'a>>)>,
    event: Event<'a>,
) {
    match heading {
        Some((_, _, _, inner)) => inner.push(event),
        None => events.push(event),
    }
}

/// Convert heading text to an anchor id.
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_paragraph_and_heading() {
        let rendered = MarkdownRenderer::default().render("# Hello World\n\nThis is a test.");

        assert!(rendered.html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
        assert!(rendered.html.contains("<p>This is a test.</p>"));
        assert_eq!(rendered.word_count, 7);
    }

    #[test]
    fn test_code_block_is_highlighted() {
        let rendered = MarkdownRenderer::default().render("```rust\nfn main() {}\n```\n");

        assert!(rendered.html.contains("<pre"));
        assert!(rendered.html.contains("main"));
        assert!(!rendered.html.contains("```"));
    }

    #[test]
    fn test_toc_extraction() {
        let rendered = MarkdownRenderer::default().render("# One\n## Two `code`\n### Three");

        assert_eq!(rendered.toc.len(), 3);
        assert_eq!(rendered.toc[0].level, 1);
        assert_eq!(rendered.toc[1].text, "Two code");
        assert_eq!(rendered.toc[1].id, "two-code");
        assert_eq!(rendered.toc[2].level, 3);
    }

    #[test]
    fn test_explicit_heading_id() {
        let rendered = MarkdownRenderer::default().render("## Setup {#install}");
        assert_eq!(rendered.toc[0].id, "install");
        assert!(rendered.html.contains("<h2 id=\"install\">"));
    }

    #[test]
    fn test_table_rendering() {
        let rendered = MarkdownRenderer::default()
            .render("| A | B |\n|---|---|\n| 1 | 2 |");

        assert!(rendered.html.contains("<table>"));
        assert!(rendered.html.contains("<thead>"));
        assert!(rendered.html.contains("<td>1</td>"));
    }

    #[test]
    fn test_reading_minutes() {
        let short = RenderedBody::default();
        assert_eq!(short.reading_minutes(), 1);

        let long = RenderedBody {
            word_count: 1000,
            ..Default::default()
        };
        assert_eq!(long.reading_minutes(), 5);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("Special!@#Chars"), "specialchars");
    }
}
