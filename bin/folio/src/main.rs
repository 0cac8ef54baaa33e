//! Folio CLI
//!
//! Builds the portfolio site and serves it together with the stats API.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Folio.
#[derive(Parser)]
#[command(name = "folio", version, about = "Portfolio site generator and stats server")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "folio.toml")]
    config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        /// Output directory, overriding `build.output_dir`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build, then serve the site and the stats endpoints
    Serve {
        /// Port to listen on, overriding `server.port`
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Validate configuration and content
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    folio::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { output } => folio::cmd::build::run(&cli.config, output.as_deref())?,
        Commands::Serve { port } => folio::cmd::serve::run(&cli.config, port).await?,
        Commands::Check { strict } => folio::cmd::check::run(&cli.config, strict)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let cli = Cli::parse_from(["folio", "build"]);

        assert_eq!(cli.config, PathBuf::from("folio.toml"));
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.command, Commands::Build { output: None }));
    }

    #[test]
    fn test_build_output_override() {
        let cli = Cli::parse_from(["folio", "build", "-o", "site"]);
        match cli.command {
            Commands::Build { output } => assert_eq!(output, Some(PathBuf::from("site"))),
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_serve_port() {
        let cli = Cli::parse_from(["folio", "serve", "--port", "8080"]);
        assert!(matches!(cli.command, Commands::Serve { port: Some(8080) }));
    }

    #[test]
    fn test_check_strict() {
        let cli = Cli::parse_from(["folio", "check", "--strict"]);
        assert!(matches!(cli.command, Commands::Check { strict: true }));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["folio", "-vv", "--config", "site.toml", "check"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["folio"]).is_err());
    }
}
