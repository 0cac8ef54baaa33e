//! Build command - generates the static site

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use color_eyre::eyre::{Result, WrapErr};
use folio_core::Config;
use folio_generator::{BuildStats, Builder};

/// Run the build command.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?output, "Starting build");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    let (output, stats) = build_site(&config, output)?;

    print_stats(&stats, &output, start.elapsed().as_secs_f64());
    Ok(())
}

/// Build into `output`, or the configured output directory.
pub fn build_site(config: &Config, output: Option<&Path>) -> Result<(PathBuf, BuildStats)> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.build.output_dir));

    tracing::debug!(?config, "Loaded configuration");

    let stats = Builder::new(config.clone(), &output)
        .build()
        .wrap_err("Build failed")?;

    tracing::info!(?stats, "Build completed successfully");
    Ok((output, stats))
}

pub(crate) fn print_stats(stats: &BuildStats, output: &Path, seconds: f64) {
    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Pages:      {}", stats.pages);
    println!("  Projects:   {}", stats.projects);
    println!("  Posts:      {}", stats.blogs);
    println!("  Assets:     {}", stats.assets);
    if stats.warnings > 0 || stats.skipped > 0 {
        println!("  Warnings:   {}", stats.warnings);
        println!("  Skipped:    {}", stats.skipped);
    }
    println!();
    println!("  Duration:   {seconds:.2}s");
    println!("  Output:     {}", output.display());
    println!();
}
