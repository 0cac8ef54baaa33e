//! Placeholder templates for generated pages.
//!
//! `{{ name }}` is replaced by a context value and fails when the value is
//! absent; `{{ name? }}` renders as empty instead. Values are inserted
//! verbatim, callers escape text before putting it in a context.

use std::collections::HashMap;

use thiserror::Error;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Required placeholder had no value.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// No template registered under this name.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Malformed placeholder.
    #[error("invalid template syntax in {template}: {message}")]
    InvalidSyntax { template: String, message: String },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Values available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// A named template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
}

impl Template {
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against `context`.
    ///
    /// Substituted values are never rescanned for placeholders.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or_else(|| TemplateError::InvalidSyntax {
                template: self.name.clone(),
                message: "unclosed {{".to_string(),
            })?;

            let key = after[..close].trim();
            let (key, optional) = match key.strip_suffix('?') {
                Some(key) => (key.trim_end(), true),
                None => (key, false),
            };

            if key.is_empty() {
                return Err(TemplateError::InvalidSyntax {
                    template: self.name.clone(),
                    message: "empty placeholder".to_string(),
                });
            }

            match context.get(key) {
                Some(value) => out.push_str(value),
                None if optional => {}
                None => return Err(TemplateError::MissingVariable(key.to_string())),
            }

            rest = &after[close + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Templates by name, preloaded with the built-in set.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        let mut registry = Self {
            templates: HashMap::new(),
        };
        for (name, source) in [
            ("base", BASE_TEMPLATE),
            ("listing", LISTING_TEMPLATE),
            ("project", PROJECT_TEMPLATE),
            ("post", POST_TEMPLATE),
        ] {
            registry.register(Template::new(name, source));
        }
        registry
    }
}

impl TemplateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        self.get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?
            .render(context)
    }
}

/// Page shell.
pub const BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }} | {{ site_title }}</title>
    <meta name="description" content="{{ description? }}">
    <meta name="author" content="{{ author? }}">
    <link rel="canonical" href="{{ canonical_url }}">
    <style>
        body { font-family: system-ui, sans-serif; margin: 0; background: #1c1c1e; color: #e5e5e7; line-height: 1.6; }
        a { color: #f97316; text-decoration: none; }
        header nav, main, footer { max-width: 960px; margin: 0 auto; padding: 1rem 1.5rem; }
        header nav { display: flex; gap: 1.5rem; align-items: center; }
        .site-title { font-weight: 600; margin-right: auto; }
        .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; list-style: none; padding: 0; }
        .card { background: #2c2c2e; border-radius: 0.75rem; overflow: hidden; }
        .card img { width: 100%; height: 160px; object-fit: cover; }
        .card-body { padding: 1rem; }
        .tech { display: flex; flex-wrap: wrap; gap: 0.4rem; list-style: none; padding: 0; }
        .tech li { font-size: 0.75rem; background: #3a3a3c; border-radius: 999px; padding: 0.1rem 0.6rem; }
        .meta { color: #98989d; font-size: 0.875rem; }
        pre { padding: 1rem; overflow-x: auto; border-radius: 0.5rem; }
    </style>
</head>
<body>
    <header>
        <nav>
            <a class="site-title" href="/">{{ site_title }}</a>
            <a href="/projects/">Projects</a>
            <a href="/blogs/">Blog</a>
        </nav>
    </header>
    <main>
{{ content }}
    </main>
    <footer>
        <p class="meta">&copy; {{ year }} {{ author? }}</p>
    </footer>
</body>
</html>
"#;

/// Listing page body; `sections` is pre-rendered card groups.
pub const LISTING_TEMPLATE: &str = r#"<section class="listing">
    <h1>{{ heading }}</h1>
{{ sections }}
</section>"#;

/// Project detail body.
pub const PROJECT_TEMPLATE: &str = r#"<article class="project">
    <img src="{{ image }}" alt="{{ title }}">
    <h1>{{ title }}</h1>
    <p class="description">{{ description }}</p>
    {{ tech? }}
    {{ github_link? }}
    <nav class="toc">{{ toc? }}</nav>
    <div class="content">
{{ body }}
    </div>
</article>"#;

/// Blog post detail body.
pub const POST_TEMPLATE: &str = r#"<article class="post">
    <h1>{{ title }}</h1>
    <p class="meta">{{ date? }} {{ read_time? }}</p>
    {{ tags? }}
    <nav class="toc">{{ toc? }}</nav>
    <div class="content">
{{ body }}
    </div>
</article>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_values() {
        let template = Template::new("t", "<h1>{{ title }}</h1><p>{{body}}</p>");
        let ctx = TemplateContext::new()
            .with_var("title", "Hi")
            .with_var("body", "text");

        assert_eq!(template.render(&ctx).unwrap(), "<h1>Hi</h1><p>text</p>");
    }

    #[test]
    fn test_optional_placeholder() {
        let template = Template::new("t", "a{{ missing? }}b");
        assert_eq!(template.render(&TemplateContext::new()).unwrap(), "ab");
    }

    #[test]
    fn test_missing_required_placeholder() {
        let template = Template::new("t", "{{ title }}");
        let err = template.render(&TemplateContext::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingVariable(name) if name == "title"));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = Template::new("t", "{{ body }}");
        let ctx = TemplateContext::new().with_var("body", "{{ title }}");
        assert_eq!(template.render(&ctx).unwrap(), "{{ title }}");
    }

    #[test]
    fn test_unclosed_placeholder() {
        let template = Template::new("broken", "{{ title");
        let err = template.render(&TemplateContext::new()).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_registry_defaults() {
        let registry = TemplateRegistry::new();
        for name in ["base", "listing", "project", "post"] {
            assert!(registry.get(name).is_some(), "missing {name}");
        }
        assert!(matches!(
            registry.render("nope", &TemplateContext::new()),
            Err(TemplateError::NotFound(_))
        ));
    }
}
