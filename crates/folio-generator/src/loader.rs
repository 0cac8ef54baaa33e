//! Content loading and categorization.
//!
//! Reads one directory per content kind, turns each `.md` file into a
//! [`ContentRecord`], and orders the results for listing pages.

use std::{
    cmp::Ordering,
    collections::{HashMap, hash_map::Entry},
    fs, io,
    path::{Path, PathBuf},
};

use folio_core::{
    Categorized, Checked, Config, ContentKind, ContentRecord, CoreError, Diagnostic, Normalizer,
    parse_frontmatter,
};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Suffix of recognized content files.
pub const CONTENT_SUFFIX: &str = ".md";

/// Content loading errors.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Record could not be built.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Another file already produced this slug.
    #[error("duplicate slug \"{slug}\" (first defined in {first})")]
    DuplicateSlug { slug: String, first: PathBuf },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// A field warning attributed to its source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiagnostic {
    pub path: PathBuf,
    pub diagnostic: Diagnostic,
}

/// A file that produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Records from one directory plus everything that went wrong on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loaded {
    pub records: Vec<ContentRecord>,
    pub diagnostics: Vec<FileDiagnostic>,
    pub skipped: Vec<SkippedFile>,
}

/// Loads content records from the configured directories.
#[derive(Debug, Clone)]
pub struct ContentLoader {
    normalizer: Normalizer,
    projects_dir: PathBuf,
    blogs_dir: PathBuf,
}

impl ContentLoader {
    /// Create a new loader.
    #[must_use]
    pub fn new(
        normalizer: Normalizer,
        projects_dir: impl Into<PathBuf>,
        blogs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            normalizer,
            projects_dir: projects_dir.into(),
            blogs_dir: blogs_dir.into(),
        }
    }

    /// Create a loader for the directories named in `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Normalizer::new(&config.content.public_dir, &config.content.fallback_image),
            &config.content.projects_dir,
            &config.content.blogs_dir,
        )
    }

    /// Directory holding records of `kind`.
    pub fn dir(&self, kind: ContentKind) -> &Path {
        match kind {
            ContentKind::Project => &self.projects_dir,
            ContentKind::Blog => &self.blogs_dir,
        }
    }

    /// Load every record of `kind` in directory enumeration order.
    ///
    /// A missing directory means no content yet and yields an empty result.
    /// Files that cannot be turned into a record are logged and skipped.
    pub fn load_all(&self, kind: ContentKind) -> Result<Loaded> {
        let dir = self.dir(kind);
        info!(kind = kind.section(), dir = %dir.display(), "loading content");

        let files = match content_files(dir) {
            Ok(files) => files,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "content directory missing, treating as empty");
                return Ok(Loaded::default());
            }
            Err(e) => return Err(e.into()),
        };

        // Parsing is independent per file; collect keeps enumeration order.
        let parsed: Vec<_> = files
            .par_iter()
            .map(|path| (path, self.load_file(kind, path)))
            .collect();

        let mut loaded = Loaded::default();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for (path, result) in parsed {
            let checked = match result {
                Ok(checked) => checked,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "failed to load content file");
                    loaded.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let record = checked.value;
            match seen.entry(record.slug.clone()) {
                Entry::Occupied(first) => {
                    let e = LoaderError::DuplicateSlug {
                        slug: record.slug,
                        first: first.get().clone(),
                    };
                    error!(path = %path.display(), error = %e, "failed to load content file");
                    loaded.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
                Entry::Vacant(slot) => {
                    slot.insert(path.clone());
                }
            }

            for diagnostic in checked.diagnostics {
                warn!(path = %path.display(), field = diagnostic.field, "{}", diagnostic.message);
                loaded.diagnostics.push(FileDiagnostic {
                    path: path.clone(),
                    diagnostic,
                });
            }

            loaded.records.push(record);
        }

        info!(
            kind = kind.section(),
            records = loaded.records.len(),
            warnings = loaded.diagnostics.len(),
            skipped = loaded.skipped.len(),
            "content loaded"
        );

        Ok(loaded)
    }

    /// Load a single file as a record of `kind`.
    pub fn load_file(&self, kind: ContentKind, path: &Path) -> Result<Checked<ContentRecord>> {
        debug!(path = %path.display(), "parsing content file");

        let text = fs::read_to_string(path)?;
        let (header, body) = parse_frontmatter(&text, path)?;

        let stem = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.strip_suffix(CONTENT_SUFFIX).unwrap_or(n));

        let mut checked = self.normalizer.record(kind, stem, &header, body)?;
        checked.value.source_path = Some(path.to_path_buf());
        Ok(checked)
    }

    /// Projects grouped by priority bucket, each sorted by title.
    pub fn load_categorized(&self) -> Result<Categorized> {
        let loaded = self.load_all(ContentKind::Project)?;
        Ok(categorize(loaded.records))
    }

    /// Blog posts, newest first.
    pub fn load_blogs(&self) -> Result<Vec<ContentRecord>> {
        let mut records = self.load_all(ContentKind::Blog)?.records;
        sort_by_date(&mut records);
        Ok(records)
    }

    /// A single record by its slug.
    pub fn load_one(&self, kind: ContentKind, slug: &str) -> Result<Option<ContentRecord>> {
        Ok(self
            .load_all(kind)?
            .records
            .into_iter()
            .find(|r| r.slug == slug))
    }

    /// Slugs of every record of `kind`.
    pub fn all_slugs(&self, kind: ContentKind) -> Result<Vec<String>> {
        Ok(self
            .load_all(kind)?
            .records
            .into_iter()
            .map(|r| r.slug)
            .collect())
    }
}

/// Files directly inside `dir` whose names end in [`CONTENT_SUFFIX`].
fn content_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_content = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(CONTENT_SUFFIX));

        if is_content && path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}

/// Group records into priority buckets sorted by title.
///
/// Titles compare byte-wise, so uppercase sorts before lowercase.
pub fn categorize(records: Vec<ContentRecord>) -> Categorized {
    let mut categorized = Categorized::default();

    for record in records {
        categorized.bucket_mut(record.priority).push(record);
    }

    for priority in folio_core::Priority::ALL {
        categorized
            .bucket_mut(priority)
            .sort_by(|a, b| a.title.cmp(&b.title));
    }

    categorized
}

/// Sort newest first; undated records follow, alphabetically by title.
pub fn sort_by_date(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| match (b.date(), a.date()) {
        (Some(b_date), Some(a_date)) => b_date.cmp(&a_date),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.title.cmp(&b.title),
    });
}
