//! Folio Generator Library
//!
//! Loads project and blog records from disk and writes the static site.
//!
//! # Modules
//!
//! - [`loader`] - Directory loading, priority buckets and date ordering
//! - [`template`] - Placeholder templates
//! - [`html`] - Listing and detail page generation
//! - [`build`] - Build orchestration

pub mod build;
pub mod html;
pub mod loader;
pub mod template;

pub use build::{BuildError, BuildStats, Builder};
pub use html::HtmlGenerator;
pub use loader::{ContentLoader, FileDiagnostic, Loaded, LoaderError, SkippedFile, categorize, sort_by_date};
pub use template::{Template, TemplateContext, TemplateRegistry};
