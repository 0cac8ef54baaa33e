//! Field validation and normalization for content records.
//!
//! Each header field goes through two steps: a schema check that classifies
//! the raw value as [`FieldCheck::Valid`], [`FieldCheck::Missing`] or
//! [`FieldCheck::Invalid`], then a merge that substitutes the field's default
//! and records a [`Diagnostic`] where one is due. Only the slug can fail.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate};
use serde_yaml::Value;

use crate::{
    content::{BlogMeta, Checked, ContentKind, ContentRecord, Diagnostic, Priority},
    error::{CoreError, Result},
    frontmatter::Header,
};

/// Description used when a record has none.
pub const FALLBACK_DESCRIPTION: &str = "No description available";

/// Image used when a record has none or it cannot be found.
pub const FALLBACK_IMAGE: &str = "/icons/file.svg";

/// Outcome of checking one raw header value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCheck<T> {
    Valid(T),
    Missing,
    Invalid(String),
}

/// Whether falling back for an absent field deserves a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissing {
    Silent,
    Warn,
}

impl<T> FieldCheck<T> {
    /// Apply the field default, recording why it was needed.
    pub fn merge(self, field: &'static str, on_missing: OnMissing, default: T) -> Checked<T> {
        match self {
            Self::Valid(value) => Checked::clean(value),
            Self::Missing if on_missing == OnMissing::Silent => Checked::clean(default),
            Self::Missing => Checked::with(
                default,
                vec![Diagnostic::new(field, "not set, using default")],
            ),
            Self::Invalid(reason) => Checked::with(default, vec![Diagnostic::new(field, reason)]),
        }
    }
}

/// Classify a value that should be a non-blank string.
pub fn check_text(raw: Option<&Value>) -> FieldCheck<String> {
    match raw {
        None | Some(Value::Null) => FieldCheck::Missing,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                FieldCheck::Missing
            } else {
                FieldCheck::Valid(trimmed.to_string())
            }
        }
        Some(other) => FieldCheck::Invalid(format!("expected a string, found {}", describe(other))),
    }
}

/// Normalize a file-derived identifier.
///
/// Lowercases and replaces every character outside `[a-z0-9-]` with `-`.
pub fn resolve_slug(raw: Option<&str>) -> Result<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(CoreError::invalid_slug(
            "slug is required and must be a non-empty string",
        ));
    };

    Ok(raw
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect())
}

pub fn resolve_title(raw: Option<&Value>, kind: ContentKind) -> Checked<String> {
    check_text(raw).merge("title", OnMissing::Silent, kind.fallback_title().to_string())
}

pub fn resolve_description(raw: Option<&Value>) -> Checked<String> {
    check_text(raw).merge(
        "description",
        OnMissing::Silent,
        FALLBACK_DESCRIPTION.to_string(),
    )
}

/// Resolve an image path against the public asset root.
///
/// The file must exist at call time; a leading `/` is relative to `public_dir`.
pub fn resolve_image(raw: Option<&Value>, public_dir: &Path, fallback: &str) -> Checked<String> {
    let check = match check_text(raw) {
        FieldCheck::Valid(path) => {
            if public_dir.join(path.trim_start_matches('/')).is_file() {
                FieldCheck::Valid(path)
            } else {
                FieldCheck::Invalid(format!("image file not found: {path}, using default"))
            }
        }
        other => other,
    };

    check.merge("image", OnMissing::Warn, fallback.to_string())
}

/// Technology tags: trimmed, lowercased, deduplicated, order kept.
pub fn resolve_tech(raw: Option<&Value>) -> Checked<Vec<String>> {
    string_list(raw, "tech", true)
}

pub fn resolve_github(raw: Option<&Value>) -> Checked<String> {
    let mut checked = check_text(raw).merge("github", OnMissing::Silent, String::new());

    if !checked.value.is_empty() && !checked.value.starts_with("http") {
        let message = format!("URL should start with http/https: {}", checked.value);
        checked.diagnostics.push(Diagnostic::new("github", message));
    }

    checked
}

pub fn resolve_priority(raw: Option<&Value>) -> Checked<Priority> {
    let check = match check_text(raw) {
        FieldCheck::Valid(s) => match s.parse::<Priority>() {
            Ok(priority) => FieldCheck::Valid(priority),
            Err(_) => FieldCheck::Invalid(format!("invalid priority \"{s}\", using standard")),
        },
        FieldCheck::Missing => FieldCheck::Missing,
        FieldCheck::Invalid(reason) => FieldCheck::Invalid(reason),
    };

    check.merge("priority", OnMissing::Warn, Priority::Standard)
}

/// Publication date as `YYYY-MM-DD` or RFC 3339.
pub fn resolve_date(raw: Option<&Value>) -> Checked<Option<NaiveDate>> {
    let check = match check_text(raw) {
        FieldCheck::Valid(s) => match parse_date(&s) {
            Some(date) => FieldCheck::Valid(Some(date)),
            None => FieldCheck::Invalid(format!("unrecognized date \"{s}\", treating as undated")),
        },
        FieldCheck::Missing => FieldCheck::Missing,
        FieldCheck::Invalid(reason) => FieldCheck::Invalid(reason),
    };

    check.merge("date", OnMissing::Silent, None)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Reading time label; numbers are accepted as-is.
pub fn resolve_read_time(raw: Option<&Value>) -> Checked<Option<String>> {
    let check = match raw {
        Some(Value::Number(n)) => FieldCheck::Valid(n.to_string()),
        other => check_text(other),
    };

    match check {
        FieldCheck::Valid(s) => Checked::clean(Some(s)),
        FieldCheck::Missing => Checked::clean(None),
        FieldCheck::Invalid(reason) => {
            Checked::with(None, vec![Diagnostic::new("readTime", reason)])
        }
    }
}

pub fn resolve_tags(raw: Option<&Value>) -> Checked<Vec<String>> {
    string_list(raw, "tags", false)
}

fn string_list(raw: Option<&Value>, field: &'static str, lowercase: bool) -> Checked<Vec<String>> {
    let normalize = |s: &str| {
        let trimmed = s.trim();
        if lowercase {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        }
    };

    match raw {
        None | Some(Value::Null) => Checked::clean(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => Checked::with(
            Vec::new(),
            vec![Diagnostic::new(field, "blank string, using empty list")],
        ),
        Some(Value::String(s)) => Checked::clean(vec![normalize(s)]),
        Some(Value::Sequence(items)) => {
            let mut seen = HashSet::new();
            let mut values = Vec::with_capacity(items.len());
            let mut diagnostics = Vec::new();

            for item in items {
                match item {
                    Value::String(s) if !s.trim().is_empty() => {
                        let value = normalize(s);
                        if seen.insert(value.clone()) {
                            values.push(value);
                        } else {
                            diagnostics.push(Diagnostic::new(
                                field,
                                format!("duplicate entry skipped: {}", s.trim()),
                            ));
                        }
                    }
                    other => diagnostics.push(Diagnostic::new(
                        field,
                        format!("invalid entry skipped: {}", describe(other)),
                    )),
                }
            }

            Checked::with(values, diagnostics)
        }
        Some(other) => Checked::with(
            Vec::new(),
            vec![Diagnostic::new(
                field,
                format!("expected a list or string, found {}", describe(other)),
            )],
        ),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) if s.trim().is_empty() => "blank string".to_string(),
        Value::String(s) => format!("string \"{s}\""),
        Value::Sequence(_) => "list".to_string(),
        Value::Mapping(_) => "mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    }
}

/// Builds records from parsed headers.
#[derive(Debug, Clone)]
pub struct Normalizer {
    public_dir: PathBuf,
    fallback_image: String,
}

impl Normalizer {
    #[must_use]
    pub fn new(public_dir: impl Into<PathBuf>, fallback_image: impl Into<String>) -> Self {
        Self {
            public_dir: public_dir.into(),
            fallback_image: fallback_image.into(),
        }
    }

    /// Build a record from its file stem, header and body.
    ///
    /// Fails only when the stem cannot serve as a slug.
    pub fn record(
        &self,
        kind: ContentKind,
        stem: Option<&str>,
        header: &Header,
        body: String,
    ) -> Result<Checked<ContentRecord>> {
        let slug = resolve_slug(stem)?;
        let mut diagnostics = Vec::new();

        let title = resolve_title(header.get("title"), kind).drain_into(&mut diagnostics);
        let description = resolve_description(header.get("description")).drain_into(&mut diagnostics);
        let image = resolve_image(header.get("image"), &self.public_dir, &self.fallback_image)
            .drain_into(&mut diagnostics);
        let tech = resolve_tech(header.get("tech")).drain_into(&mut diagnostics);
        let github = resolve_github(header.get("github")).drain_into(&mut diagnostics);

        let (priority, blog) = match kind {
            ContentKind::Project => {
                let priority = resolve_priority(header.get("priority")).drain_into(&mut diagnostics);
                (priority, None)
            }
            ContentKind::Blog => {
                let meta = BlogMeta {
                    date: resolve_date(header.get("date")).drain_into(&mut diagnostics),
                    read_time: resolve_read_time(header.get_any(&["readTime", "read_time"]))
                        .drain_into(&mut diagnostics),
                    tags: resolve_tags(header.get("tags")).drain_into(&mut diagnostics),
                };
                // Posts are never bucketed, so an absent priority is not worth a warning.
                let priority = match header.get("priority") {
                    None => Priority::Standard,
                    raw => resolve_priority(raw).drain_into(&mut diagnostics),
                };
                (priority, Some(meta))
            }
        };

        let record = ContentRecord {
            kind,
            slug,
            title,
            description,
            image,
            tech,
            github,
            priority,
            blog,
            body,
            source_path: None,
        };

        Ok(Checked::with(record, diagnostics))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new("public", FALLBACK_IMAGE)
    }
}
