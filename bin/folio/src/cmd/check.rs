//! Check command - validate configuration and content

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use folio_core::{Config, ContentKind};
use folio_generator::{ContentLoader, Loaded};
use folio_parser::SyntaxHighlighter;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Loads every record the way a build would and reports what it found.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            println!("  ✗ Configuration invalid: {e}");
            bail!("Configuration error: {e}");
        }
    };
    check_config_values(&config, &mut result);

    let loader = ContentLoader::from_config(&config);
    for kind in [ContentKind::Project, ContentKind::Blog] {
        println!("\nChecking {}...", kind.section());
        check_collection(&loader, kind, &mut result);
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

fn check_collection(loader: &ContentLoader, kind: ContentKind, result: &mut ValidationResult) {
    let dir = loader.dir(kind);
    if !dir.is_dir() {
        result.add_warning(format!("{} directory missing: {}", kind.section(), dir.display()));
        println!("  ⚠ {} missing, no {} will be listed", dir.display(), kind.section());
        return;
    }

    match loader.load_all(kind) {
        Ok(loaded) => report(&loaded, result),
        Err(e) => {
            result.add_error(format!("{}: {e}", dir.display()));
            println!("  ✗ {} could not be read", dir.display());
        }
    }
}

fn report(loaded: &Loaded, result: &mut ValidationResult) {
    for skipped in &loaded.skipped {
        result.add_error(format!("{}: {}", skipped.path.display(), skipped.reason));
    }
    for d in &loaded.diagnostics {
        result.add_warning(format!(
            "{}: {}: {}",
            d.path.display(),
            d.diagnostic.field,
            d.diagnostic.message
        ));
    }

    let total = loaded.records.len() + loaded.skipped.len();
    if loaded.skipped.is_empty() {
        println!("  ✓ All {total} content files valid");
    } else {
        println!("  ✗ {}/{total} content files have errors", loaded.skipped.len());
    }
}

/// Check configuration values for common issues.
fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if !config.site.base_url.starts_with("http") {
        result.add_warning("site.base_url should start with http:// or https://");
    }

    let output = Path::new(&config.build.output_dir);
    if output.exists() && !output.is_dir() {
        result.add_error(format!(
            "Output path exists but is not a directory: {}",
            config.build.output_dir
        ));
    }

    if let Err(e) = SyntaxHighlighter::with_theme(&config.build.syntax_theme) {
        result.add_error(format!("build.syntax_theme: {e}"));
    }

    if !config.content.public_dir.is_dir() {
        result.add_warning(format!(
            "Public directory missing: {}",
            config.content.public_dir.display()
        ));
    }

    if config.stats.github.token().is_none() {
        result.add_warning(format!(
            "{} is not set, GitHub stats will be unavailable",
            config.stats.github.token_env
        ));
    }
    if config.stats.leetcode.username.is_empty() {
        result.add_warning("stats.leetcode.username is empty");
    }

    println!("  ✓ Configuration values checked");
}
