//! Build orchestration.
//!
//! Loads both collections and writes the static output tree:
//!
//! ```text
//! <out>/projects/index.html       <out>/projects.json
//! <out>/projects/<slug>/index.html
//! <out>/blogs/index.html          <out>/blogs.json
//! <out>/blogs/<slug>/index.html
//! ```
//!
//! plus a copy of the public asset directory.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use folio_core::{Config, ContentKind, ContentRecord};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
    html::{HtmlError, HtmlGenerator},
    loader::{ContentLoader, LoaderError, categorize, sort_by_date},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Content could not be loaded.
    #[error("loader error: {0}")]
    Loader(#[from] LoaderError),

    /// HTML generation error.
    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),

    /// Manifest serialization error.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Public directory walk failed.
    #[error("asset error: {0}")]
    Asset(#[from] walkdir::Error),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// HTML pages written, listings included.
    pub pages: usize,

    pub projects: usize,

    pub blogs: usize,

    /// Field warnings raised while loading.
    pub warnings: usize,

    /// Content files that produced no record.
    pub skipped: usize,

    /// Public files copied.
    pub assets: usize,

    pub duration_ms: u64,
}

/// Site builder.
#[derive(Debug)]
pub struct Builder {
    config: Config,
    loader: ContentLoader,
    output_dir: PathBuf,
}

impl Builder {
    /// Create a builder writing to `output_dir`.
    #[must_use]
    pub fn new(config: Config, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader: ContentLoader::from_config(&config),
            config,
            output_dir: output_dir.into(),
        }
    }

    /// Execute the full build.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(output = %self.output_dir.display(), "starting build");

        self.clean_output()?;

        let projects = self.loader.load_all(ContentKind::Project)?;
        let blogs = self.loader.load_all(ContentKind::Blog)?;

        stats.warnings = projects.diagnostics.len() + blogs.diagnostics.len();
        stats.skipped = projects.skipped.len() + blogs.skipped.len();
        stats.projects = projects.records.len();
        stats.blogs = blogs.records.len();

        let generator = HtmlGenerator::new(self.config.clone())?;

        let details: Vec<&ContentRecord> =
            projects.records.iter().chain(blogs.records.iter()).collect();
        stats.pages += self.generate_details(&generator, &details)?;

        let categorized = categorize(projects.records);
        let mut posts = blogs.records;
        sort_by_date(&mut posts);

        self.write(
            Path::new("projects/index.html"),
            &generator.project_listing(&categorized)?,
        )?;
        self.write(Path::new("blogs/index.html"), &generator.blog_listing(&posts)?)?;
        stats.pages += 2;

        self.write(
            Path::new("projects.json"),
            &serde_json::to_string_pretty(&categorized)?,
        )?;
        self.write(Path::new("blogs.json"), &serde_json::to_string_pretty(&posts)?)?;

        stats.assets = self.copy_public()?;
        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            pages = stats.pages,
            projects = stats.projects,
            blogs = stats.blogs,
            warnings = stats.warnings,
            skipped = stats.skipped,
            assets = stats.assets,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Output path of a record's detail page.
    pub fn detail_path(&self, record: &ContentRecord) -> PathBuf {
        self.output_dir
            .join(record.kind.section())
            .join(&record.slug)
            .join("index.html")
    }

    fn clean_output(&self) -> Result<()> {
        if self.output_dir.exists() {
            debug!(dir = %self.output_dir.display(), "cleaning output directory");
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    fn generate_details(
        &self,
        generator: &HtmlGenerator,
        records: &[&ContentRecord],
    ) -> Result<usize> {
        info!(count = records.len(), "generating detail pages");

        records
            .par_iter()
            .map(|record| {
                let html = generator.detail_page(record)?;
                let path = self.detail_path(record);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, html)?;
                debug!(path = %path.display(), "wrote page");
                Ok::<_, BuildError>(())
            })
            .collect::<Result<Vec<()>>>()
            .map(|written| written.len())
    }

    fn write(&self, relative: &Path, contents: &str) -> Result<()> {
        let path = self.output_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        debug!(path = %path.display(), "wrote file");
        Ok(())
    }

    /// Mirror the public directory into the output root.
    fn copy_public(&self) -> Result<usize> {
        let public = &self.config.content.public_dir;
        if !public.is_dir() {
            warn!(dir = %public.display(), "public directory not found, skipping assets");
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(public) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(public) else {
                continue;
            };
            let target = self.output_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }

        debug!(count = copied, "copied public assets");
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn config(root: &Path) -> Config {
        let mut config: Config = toml::from_str(
            r#"
[site]
title = "Test"
base_url = "https://example.com"
"#,
        )
        .unwrap();
        config.content.projects_dir = root.join("projects");
        config.content.blogs_dir = root.join("blogs");
        config.content.public_dir = root.join("public");
        config
    }

    #[test]
    fn test_build_empty_site() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");

        let stats = Builder::new(config(dir.path()), &out).build().unwrap();

        assert_eq!(stats.pages, 2);
        assert_eq!(stats.projects, 0);
        assert!(out.join("projects/index.html").exists());
        assert!(out.join("blogs/index.html").exists());
        assert_eq!(fs::read_to_string(out.join("blogs.json")).unwrap(), "[]");
    }

    #[test]
    fn test_clean_output_removes_stale_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("stale.html"), "old").unwrap();

        Builder::new(config(dir.path()), &out).build().unwrap();

        assert!(!out.join("stale.html").exists());
    }

    #[test]
    fn test_public_files_are_copied() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        fs::create_dir_all(dir.path().join("public/icons")).unwrap();
        fs::write(dir.path().join("public/icons/file.svg"), "<svg/>").unwrap();

        let stats = Builder::new(config(dir.path()), &out).build().unwrap();

        assert_eq!(stats.assets, 1);
        assert_eq!(
            fs::read_to_string(out.join("icons/file.svg")).unwrap(),
            "<svg/>"
        );
    }
}
