//! Folio Core Library
//!
//! Core types, configuration, error handling and field validation for the
//! Folio portfolio site generator.

pub mod config;
pub mod content;
pub mod error;
pub mod frontmatter;
pub mod validate;

pub use config::Config;
pub use content::{BlogMeta, Categorized, Checked, ContentKind, ContentRecord, Diagnostic, Priority};
pub use error::{CoreError, Result};
pub use frontmatter::{Header, parse_frontmatter};
pub use validate::Normalizer;
