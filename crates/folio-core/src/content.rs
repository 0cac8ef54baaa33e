//! Content types and structures.

use std::{fmt, path::PathBuf, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Collection a content record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Portfolio project.
    Project,
    /// Blog post.
    Blog,
}

impl ContentKind {
    /// URL section and output directory for this kind.
    pub fn section(&self) -> &'static str {
        match self {
            Self::Project => "projects",
            Self::Blog => "blogs",
        }
    }

    /// Title used when a record has none.
    pub fn fallback_title(&self) -> &'static str {
        match self {
            Self::Project => "Untitled Project",
            Self::Blog => "Untitled Post",
        }
    }
}

/// Display priority of a record.
///
/// Declaration order is bucket order on listing pages.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Featured,
    Important,
    #[default]
    Standard,
    Archive,
}

impl Priority {
    /// All priorities in bucket order.
    pub const ALL: [Priority; 4] = [
        Priority::Featured,
        Priority::Important,
        Priority::Standard,
        Priority::Archive,
    ];

    /// Lowercase name as written in headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::Important => "important",
            Self::Standard => "standard",
            Self::Archive => "archive",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| format!("unknown priority \"{s}\""))
    }
}

/// A non-fatal problem found while normalizing a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Header key the problem concerns.
    pub field: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A value together with the warnings produced while deriving it.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Checked<T> {
    /// A value with no warnings.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// A value with warnings.
    pub fn with(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Move the warnings into `sink` and return the value.
    pub fn drain_into(self, sink: &mut Vec<Diagnostic>) -> T {
        sink.extend(self.diagnostics);
        self.value
    }
}

/// Blog-only display metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogMeta {
    /// Publication date.
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Free-form reading time label, e.g. "5 min read".
    #[serde(default)]
    pub read_time: Option<String>,

    /// Tags for the post.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A normalized project or blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub kind: ContentKind,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub tech: Vec<String>,
    pub github: String,
    pub priority: Priority,

    /// Present for blog posts only.
    #[serde(default, skip_serializing_if = "Option::is_none", flatten)]
    pub blog: Option<BlogMeta>,

    /// Markdown body following the header.
    #[serde(skip)]
    pub body: String,

    /// File the record was read from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl ContentRecord {
    /// URL path of the record's detail page.
    pub fn url_path(&self) -> String {
        format!("/{}/{}", self.kind.section(), self.slug)
    }

    /// Publication date, if this is a dated blog post.
    pub fn date(&self) -> Option<NaiveDate> {
        self.blog.as_ref().and_then(|b| b.date)
    }
}

/// Records grouped by priority, each bucket sorted by title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Categorized {
    pub featured: Vec<ContentRecord>,
    pub important: Vec<ContentRecord>,
    pub standard: Vec<ContentRecord>,
    pub archive: Vec<ContentRecord>,
}

impl Categorized {
    /// Mutable bucket for a priority.
    pub fn bucket_mut(&mut self, priority: Priority) -> &mut Vec<ContentRecord> {
        match priority {
            Priority::Featured => &mut self.featured,
            Priority::Important => &mut self.important,
            Priority::Standard => &mut self.standard,
            Priority::Archive => &mut self.archive,
        }
    }

    /// Bucket for a priority.
    pub fn bucket(&self, priority: Priority) -> &[ContentRecord] {
        match priority {
            Priority::Featured => &self.featured,
            Priority::Important => &self.important,
            Priority::Standard => &self.standard,
            Priority::Archive => &self.archive,
        }
    }

    /// Buckets in display order.
    pub fn buckets(&self) -> impl Iterator<Item = (Priority, &[ContentRecord])> {
        Priority::ALL.into_iter().map(|p| (p, self.bucket(p)))
    }

    /// All records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentRecord> {
        self.buckets().flat_map(|(_, records)| records.iter())
    }

    /// Total number of records across buckets.
    pub fn len(&self) -> usize {
        self.featured.len() + self.important.len() + self.standard.len() + self.archive.len()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
