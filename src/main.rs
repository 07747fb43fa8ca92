//! unpfs - A tool for reading PFS package installations and their prototype database
//!
//! Usage:
//!   unpfs list <idx_dir> [filter]                 - List files matching filter
//!   unpfs extract <idx_dir> <pkg_dir> [filter]    - Extract files matching filter
//!   unpfs info <idx_file>                         - Show index information
//!   unpfs db-info <idx_dir> <pkg_dir>             - Show prototype database tables
//!   unpfs resolve <idx_dir> <pkg_dir> <path>      - Print the prototype for a resource path

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use unpfs::bwdb::utils::{load_database, show_db_info, show_resource, DEFAULT_ASSETS_PATH};
use unpfs::pfs::utils::{extract_files, list_files, show_info};

#[derive(Parser)]
#[command(name = "unpfs")]
#[command(version = "0.1.0")]
#[command(about = "Read PFS package indexes and the BWDB prototype database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verify header checksums and file CRCs
    #[arg(long, global = true)]
    validate: bool,

    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List files in every index of a directory
    List {
        /// Directory holding the .idx files
        idx_dir: PathBuf,
        /// Filter pattern
        filter: Option<String>,
        /// Directory holding the .pkg files
        #[arg(short, long, default_value = "res_packages")]
        packages: PathBuf,
    },
    /// Extract files from the packages
    Extract {
        /// Directory holding the .idx files
        idx_dir: PathBuf,
        /// Directory holding the .pkg files
        pkg_dir: PathBuf,
        /// Filter pattern or specific file path
        filter: Option<String>,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Show information about one index file
    Info {
        /// Path to the .idx file
        idx_file: PathBuf,
    },
    /// Show the tables of the prototype database
    DbInfo {
        /// Directory holding the .idx files
        idx_dir: PathBuf,
        /// Directory holding the .pkg files
        pkg_dir: PathBuf,
        /// Path of the database inside the packages
        #[arg(long, default_value = DEFAULT_ASSETS_PATH)]
        assets: String,
    },
    /// Print the prototype a resource path resolves to
    Resolve {
        /// Directory holding the .idx files
        idx_dir: PathBuf,
        /// Directory holding the .pkg files
        pkg_dir: PathBuf,
        /// Resource path, e.g. content/ship.model
        path: String,
        /// Path of the database inside the packages
        #[arg(long, default_value = DEFAULT_ASSETS_PATH)]
        assets: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    match cli.command {
        Commands::List { idx_dir, filter, packages } => {
            list_files(&idx_dir, &packages, filter.as_deref())?;
        }
        Commands::Extract { idx_dir, pkg_dir, filter, output } => {
            extract_files(&idx_dir, &pkg_dir, filter.as_deref(), &output, cli.validate)?;
        }
        Commands::Info { idx_file } => {
            show_info(&idx_file, cli.validate)?;
        }
        Commands::DbInfo { idx_dir, pkg_dir, assets } => {
            let db = load_database(&idx_dir, &pkg_dir, &assets, cli.validate)?;
            show_db_info(&db);
        }
        Commands::Resolve { idx_dir, pkg_dir, path, assets } => {
            let db = load_database(&idx_dir, &pkg_dir, &assets, cli.validate)?;
            show_resource(db, &path)?;
        }
    }

    Ok(())
}
