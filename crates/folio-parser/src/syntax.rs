//! Syntax highlighting for fenced code blocks.

use syntect::{
    highlighting::{Theme, ThemeSet},
    html::highlighted_html_for_string,
    parsing::SyntaxSet,
};

use crate::{ParserError, Result, html_escape};

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Syntax highlighter backed by syntect's bundled grammars and themes.
#[derive(Debug)]
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    theme_name: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes.remove(DEFAULT_THEME).unwrap_or_default();

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            theme_name: DEFAULT_THEME.to_string(),
        }
    }
}

impl SyntaxHighlighter {
    /// Create a highlighter using a bundled theme.
    pub fn with_theme(name: &str) -> Result<Self> {
        let mut themes = ThemeSet::load_defaults().themes;
        let Some(theme) = themes.remove(name) else {
            let mut known: Vec<_> = themes.into_keys().collect();
            known.sort();
            return Err(ParserError::UnknownTheme {
                name: name.to_string(),
                known,
            });
        };

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            theme_name: name.to_string(),
        })
    }

    /// Name of the active theme.
    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    /// Highlight `code` as `lang`, falling back to an escaped plain block.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let Some(syntax) = lang.and_then(|l| self.syntax_set.find_syntax_by_token(l)) else {
            return plain_block(code, lang);
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(lang = ?lang, error = %e, "highlighting failed");
                plain_block(code, lang)
            }
        }
    }
}

fn plain_block(code: &str, lang: Option<&str>) -> String {
    let class = lang
        .map(|l| format!(" class=\"language-{}\"", html_escape(l)))
        .unwrap_or_default();
    format!("<pre><code{class}>{}</code></pre>", html_escape(code))
}
