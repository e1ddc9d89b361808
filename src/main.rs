//! nativepack - native addon builder and packager.
//!
//! Builds better-sqlite3 for several Node ABIs and packages each binary into
//! a versioned tarball under `dist/`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use nativepack::commands::{self, build::BuildOptions, clean::CleanTarget, show::ShowTarget};
use nativepack::config::Config;
use nativepack::process::SystemRunner;

#[derive(Parser)]
#[command(name = "nativepack")]
#[command(about = "Build and package the better-sqlite3 native addon for multiple Node ABIs")]
#[command(
    after_help = "QUICK START:\n  nativepack preflight  Check host tools and project files\n  nativepack build      Build and package every target\n  nativepack show targets  List the build matrix\n  nativepack clean      Remove dist/"
)]
struct Cli {
    /// Project root containing package.json (default: current directory)
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline (default)
    Build {
        /// Don't rewrite package.json or run npm install
        #[arg(long)]
        skip_install: bool,
        /// Don't apply dependency patches
        #[arg(long)]
        skip_patch: bool,
    },

    /// Apply dependency patches only
    Patch,

    /// Copy native sources from node_modules into the project root
    Stage,

    /// Pack a directory into a tarball (.tar.gz unless DEST ends in .tar)
    Pack {
        /// Directory whose entries are archived
        dir: PathBuf,
        /// Output archive
        dest: PathBuf,
    },

    /// Extract a tarball
    Unpack {
        /// Archive to extract
        archive: PathBuf,
        /// Destination directory (created if missing)
        dest: PathBuf,
        /// Leading path components to drop
        #[arg(long, default_value = "0")]
        strip: usize,
    },

    /// Clean build artifacts (default: dist/)
    Clean {
        #[command(subcommand)]
        what: Option<CleanWhat>,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowWhat,
    },

    /// Run preflight checks (verify host tools and project files)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum CleanWhat {
    /// Packaged archives
    Dist,
    /// native/, prebuilds/ and build/
    Native,
    /// Staged src/ and deps/
    Staged,
    /// Everything
    All,
}

#[derive(Subcommand)]
enum ShowWhat {
    /// Show current configuration
    Config,
    /// Show the resolved build matrix
    Targets,
    /// Show the ABI number for a Node version
    Abi {
        /// Node version, e.g. 22 or 22.11.0
        version: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let base_dir = std::env::current_dir()
        .context("Failed to determine current directory")?
        .join(&cli.project_dir);
    let config = Config::load(&base_dir)?;
    let runner = SystemRunner;

    match cli.command.unwrap_or(Commands::Build {
        skip_install: false,
        skip_patch: false,
    }) {
        Commands::Build {
            skip_install,
            skip_patch,
        } => {
            let options = BuildOptions {
                skip_install,
                skip_patch,
            };
            commands::cmd_build(&config, options, &runner)?;
        }

        Commands::Patch => {
            commands::cmd_patch(&config)?;
        }

        Commands::Stage => {
            commands::cmd_stage(&config)?;
        }

        Commands::Pack { dir, dest } => {
            commands::cmd_pack(&dir, &dest)?;
        }

        Commands::Unpack {
            archive,
            dest,
            strip,
        } => {
            commands::cmd_unpack(&archive, &dest, strip)?;
        }

        Commands::Clean { what } => {
            let clean_target = match what {
                None | Some(CleanWhat::Dist) => CleanTarget::Dist,
                Some(CleanWhat::Native) => CleanTarget::Native,
                Some(CleanWhat::Staged) => CleanTarget::Staged,
                Some(CleanWhat::All) => CleanTarget::All,
            };
            commands::cmd_clean(&config, clean_target)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowWhat::Config => ShowTarget::Config,
                ShowWhat::Targets => ShowTarget::Targets,
                ShowWhat::Abi { version } => ShowTarget::Abi { version },
            };
            commands::cmd_show(&config, show_target, &runner)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&config, strict)?;
        }
    }

    Ok(())
}
