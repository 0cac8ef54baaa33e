//! HTML generation for listing and detail pages.

use chrono::{Datelike, Utc};
use folio_core::{Categorized, Config, ContentKind, ContentRecord};
use folio_parser::{MarkdownRenderer, RenderedBody, TocEntry, html_escape};
use thiserror::Error;
use tracing::debug;

use crate::template::{TemplateContext, TemplateError, TemplateRegistry};

/// HTML generation errors.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Syntax theme could not be loaded.
    #[error("renderer error: {0}")]
    Renderer(#[from] folio_parser::ParserError),
}

/// Result type for HTML generation.
pub type Result<T> = std::result::Result<T, HtmlError>;

/// Renders records into complete HTML documents.
#[derive(Debug)]
pub struct HtmlGenerator {
    templates: TemplateRegistry,
    renderer: MarkdownRenderer,
    config: Config,
}

impl HtmlGenerator {
    /// Create a generator using the configured syntax theme.
    pub fn new(config: Config) -> Result<Self> {
        let renderer = MarkdownRenderer::with_theme(&config.build.syntax_theme)?;
        Ok(Self::with_parts(config, TemplateRegistry::new(), renderer))
    }

    #[must_use]
    pub fn with_parts(
        config: Config,
        templates: TemplateRegistry,
        renderer: MarkdownRenderer,
    ) -> Self {
        Self {
            templates,
            renderer,
            config,
        }
    }

    /// Projects page, one card group per non-empty priority bucket.
    pub fn project_listing(&self, projects: &Categorized) -> Result<String> {
        let mut sections = String::new();

        for (priority, records) in projects.buckets() {
            if records.is_empty() {
                continue;
            }
            sections.push_str(&format!(
                "    <h2 class=\"priority-{p}\">{label}</h2>\n{cards}",
                p = priority.as_str(),
                label = capitalize(priority.as_str()),
                cards = cards(records),
            ));
        }

        if sections.is_empty() {
            sections.push_str("    <p class=\"empty\">No projects yet.</p>\n");
        }

        self.listing("Projects", "/projects/", &sections)
    }

    /// Blog index, records in the order given.
    pub fn blog_listing(&self, posts: &[ContentRecord]) -> Result<String> {
        let sections = if posts.is_empty() {
            "    <p class=\"empty\">No posts yet.</p>\n".to_string()
        } else {
            cards(posts)
        };
        self.listing("Blog", "/blogs/", &sections)
    }

    fn listing(&self, heading: &str, path: &str, sections: &str) -> Result<String> {
        let ctx = TemplateContext::new()
            .with_var("heading", heading)
            .with_var("sections", sections);
        let inner = self.templates.render("listing", &ctx)?;
        self.wrap(heading, None, path, &inner)
    }

    /// Detail page for a single record.
    pub fn detail_page(&self, record: &ContentRecord) -> Result<String> {
        debug!(slug = %record.slug, kind = record.kind.section(), "generating detail page");

        let rendered = self.renderer.render(&record.body);
        let mut ctx = TemplateContext::new()
            .with_var("title", html_escape(&record.title))
            .with_var("body", &rendered.html);

        if rendered.toc.len() > 1 {
            ctx.insert("toc", toc_html(&rendered.toc));
        }

        let template = match record.kind {
            ContentKind::Project => {
                ctx.insert("image", html_escape(&record.image));
                ctx.insert("description", html_escape(&record.description));
                if !record.tech.is_empty() {
                    ctx.insert("tech", tag_list("tech", &record.tech));
                }
                if !record.github.is_empty() {
                    ctx.insert("github_link", github_link(&record.github));
                }
                "project"
            }
            ContentKind::Blog => {
                if let Some(date) = record.date() {
                    ctx.insert(
                        "date",
                        format!(
                            "<time datetime=\"{}\">{}</time>",
                            date.format("%Y-%m-%d"),
                            date.format("%B %-d, %Y")
                        ),
                    );
                }
                ctx.insert("read_time", html_escape(&read_time(record, &rendered)));
                let tags = record.blog.as_ref().map(|b| b.tags.as_slice()).unwrap_or_default();
                if !tags.is_empty() {
                    ctx.insert("tags", tag_list("tags", tags));
                }
                "post"
            }
        };

        let inner = self.templates.render(template, &ctx)?;
        self.wrap(
            &record.title,
            Some(&record.description),
            &format!("{}/", record.url_path()),
            &inner,
        )
    }

    fn wrap(
        &self,
        title: &str,
        description: Option<&str>,
        path: &str,
        content: &str,
    ) -> Result<String> {
        let site = &self.config.site;
        let mut ctx = TemplateContext::new()
            .with_var("title", html_escape(title))
            .with_var("site_title", html_escape(&site.title))
            .with_var("canonical_url", html_escape(&self.config.url_for(path)))
            .with_var("year", Utc::now().year().to_string())
            .with_var("content", content);

        if let Some(description) = description.or(site.description.as_deref()) {
            ctx.insert("description", html_escape(description));
        }
        if let Some(author) = &site.author {
            ctx.insert("author", html_escape(author));
        }

        Ok(self.templates.render("base", &ctx)?)
    }
}

/// Reading time label: the header's value, else an estimate from the body.
fn read_time(record: &ContentRecord, rendered: &RenderedBody) -> String {
    record
        .blog
        .as_ref()
        .and_then(|b| b.read_time.clone())
        .unwrap_or_else(|| format!("{} min read", rendered.reading_minutes()))
}

fn cards(records: &[ContentRecord]) -> String {
    let mut out = String::from("    <ul class=\"cards\">\n");
    for record in records {
        out.push_str(&card(record));
    }
    out.push_str("    </ul>\n");
    out
}

fn card(record: &ContentRecord) -> String {
    let meta = match record.date() {
        Some(date) => format!("<p class=\"meta\">{}</p>", date.format("%B %-d, %Y")),
        None => String::new(),
    };
    let tech = if record.tech.is_empty() {
        String::new()
    } else {
        tag_list("tech", &record.tech)
    };

    format!(
        r#"        <li class="card">
            <a href="{url}/">
                <img src="{image}" alt="{title}" loading="lazy">
                <div class="card-body">
                    <h3>{title}</h3>
                    {meta}
                    <p>{description}</p>
                    {tech}
                </div>
            </a>
        </li>
"#,
        url = html_escape(&record.url_path()),
        image = html_escape(&record.image),
        title = html_escape(&record.title),
        description = html_escape(&record.description),
    )
}

fn tag_list(class: &str, items: &[String]) -> String {
    let items: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", html_escape(item)))
        .collect();
    format!("<ul class=\"{class}\">{items}</ul>")
}

fn toc_html(toc: &[TocEntry]) -> String {
    let items: String = toc
        .iter()
        .map(|entry| {
            format!(
                "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>",
                entry.level,
                html_escape(&entry.id),
                html_escape(&entry.text)
            )
        })
        .collect();
    format!("<ul>{items}</ul>")
}

/// Link to the repository; anything that is not an http(s) URL is shown as text.
fn github_link(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        format!(
            "<a class=\"github\" href=\"{}\">View on GitHub</a>",
            html_escape(url)
        )
    } else {
        format!("<span class=\"github\">{}</span>", html_escape(url))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
