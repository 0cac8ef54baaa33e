//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for Folio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Content collection locations.
    #[serde(default)]
    pub content: ContentConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// External statistics sources.
    #[serde(default)]
    pub stats: StatsConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com").
    pub base_url: String,

    /// Site description for meta tags.
    #[serde(default)]
    pub description: Option<String>,

    /// Site author name.
    #[serde(default)]
    pub author: Option<String>,
}

/// Where content records and their assets live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory of project records.
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,

    /// Directory of blog records.
    #[serde(default = "default_blogs_dir")]
    pub blogs_dir: PathBuf,

    /// Public asset root that record image paths resolve against.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Image used when a record has none or it cannot be found.
    #[serde(default = "default_fallback_image")]
    pub fallback_image: String,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory for generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Syntax highlighting theme name.
    #[serde(default = "default_syntax_theme")]
    pub syntax_theme: String,
}

/// Statistics source configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsConfig {
    /// GitHub contribution activity.
    #[serde(default)]
    pub github: GithubConfig,

    /// LeetCode profile.
    #[serde(default)]
    pub leetcode: LeetcodeConfig,
}

/// GitHub GraphQL source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Login whose contributions are reported.
    #[serde(default)]
    pub username: String,

    /// GraphQL endpoint.
    #[serde(default = "default_github_endpoint")]
    pub endpoint: String,

    /// Name of the environment variable holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

/// LeetCode GraphQL source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeetcodeConfig {
    /// Profile name.
    #[serde(default)]
    pub username: String,

    /// GraphQL endpoint.
    #[serde(default = "default_leetcode_endpoint")]
    pub endpoint: String,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_projects_dir() -> PathBuf {
    PathBuf::from("data/projects")
}

fn default_blogs_dir() -> PathBuf {
    PathBuf::from("data/blogs")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_fallback_image() -> String {
    crate::validate::FALLBACK_IMAGE.to_string()
}

fn default_output_dir() -> String {
    "dist".to_string()
}

fn default_syntax_theme() -> String {
    "base16-ocean.dark".to_string()
}

fn default_github_endpoint() -> String {
    "https://api.github.com/graphql".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_leetcode_endpoint() -> String {
    "https://leetcode.com/graphql".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            blogs_dir: default_blogs_dir(),
            public_dir: default_public_dir(),
            fallback_image: default_fallback_image(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            syntax_theme: default_syntax_theme(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            endpoint: default_github_endpoint(),
            token_env: default_token_env(),
        }
    }
}

impl GithubConfig {
    /// Read the API token from the configured environment variable.
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

impl Default for LeetcodeConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            endpoint: default_leetcode_endpoint(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `FOLIO_SECTION__KEY` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        Ok(())
    }

    /// Get the full URL for a path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}
