//! FileBox CLI
//!
//! Command-line interface for putting files into and getting files out of
//! a FileBox database.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use filebox::{Config, FileBox, FlatBox, Location};
use tracing_subscriber::{fmt, EnvFilter};

/// FileBox CLI
#[derive(Parser, Debug)]
#[command(name = "filebox")]
#[command(about = "Store and retrieve files in an SQLite database")]
#[command(version)]
struct Args {
    /// Database file (":memory:" for a throwaway container)
    #[arg(short, long, default_value = "filebox.sqlite")]
    db: String,

    /// Use the flat layout (no groups, unique file names)
    #[arg(long)]
    flat: bool,

    /// Busy timeout in milliseconds when the database is locked
    #[arg(long)]
    busy_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage groups (grouped layout only)
    #[command(subcommand)]
    Group(GroupCommands),

    /// Store a file from disk
    Put {
        /// Group to store into (grouped layout)
        #[arg(short, long)]
        group: Option<String>,

        /// Path of the file on disk
        source: PathBuf,

        /// Name to store it under (defaults to the source file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Write a stored file to disk
    Get {
        /// Group to read from (grouped layout)
        #[arg(short, long)]
        group: Option<String>,

        /// Stored file name
        name: String,

        /// Destination path
        dest: PathBuf,
    },

    /// Remove a stored file (from every group in the grouped layout)
    Rm {
        /// Stored file name
        name: String,
    },

    /// List stored file names
    Ls {
        /// Group to list (grouped layout)
        #[arg(short, long)]
        group: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum GroupCommands {
    /// Create a group
    Create {
        /// Group name
        name: String,
    },

    /// List groups
    Ls,

    /// Delete a group and all of its files
    Rm {
        /// Group name
        name: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,filebox=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("FileBox CLI v{}", filebox::VERSION);

    let mut builder = Config::builder().location(Location::parse(&args.db));
    if let Some(ms) = args.busy_timeout_ms {
        builder = builder.busy_timeout(std::time::Duration::from_millis(ms));
    }
    let config = builder.build();

    let result = if args.flat {
        run_flat(config, args.command)
    } else {
        run_grouped(config, args.command)
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run_grouped(config: Config, command: Commands) -> filebox::Result<()> {
    let mut fbox = FileBox::open(config)?;

    match command {
        Commands::Group(GroupCommands::Create { name }) => {
            let group = fbox.create_group(&name)?;
            tracing::info!("Created group '{}' (id {})", group.name, group.id);
        }
        Commands::Group(GroupCommands::Ls) => {
            for name in fbox.list_group_names()? {
                println!("{}", name);
            }
        }
        Commands::Group(GroupCommands::Rm { name }) => {
            let removed = fbox.delete_group(&name)?;
            tracing::info!("Deleted group '{}' ({} files)", name, removed);
        }
        Commands::Put {
            group,
            source,
            name,
        } => {
            let group = require_group(group)?;
            let name = stored_name(name, &source)?;
            fbox.put_file_from_path(&group, &source, &name)?;
            tracing::info!("Stored '{}' in group '{}'", name, group);
        }
        Commands::Get { group, name, dest } => {
            let group = require_group(group)?;
            fbox.get_file_to_path(&group, &name, &dest)?;
            tracing::info!("Wrote '{}' to {}", name, dest.display());
        }
        Commands::Rm { name } => {
            let removed = fbox.remove_file(&name)?;
            tracing::info!("Removed {} file(s) named '{}'", removed, name);
        }
        Commands::Ls { group } => {
            let group = require_group(group)?;
            for name in fbox.list_file_names(&group)? {
                println!("{}", name);
            }
        }
    }

    fbox.close()
}

fn run_flat(config: Config, command: Commands) -> filebox::Result<()> {
    // Rejected before open so a bad invocation never creates the database file
    if let Commands::Group(_) = command {
        return Err(usage(FLAT_GROUPS_UNSUPPORTED));
    }

    let mut fbox = FlatBox::open(config)?;

    match command {
        Commands::Group(_) => return Err(usage(FLAT_GROUPS_UNSUPPORTED)),
        Commands::Put { source, name, .. } => {
            let name = stored_name(name, &source)?;
            fbox.put_path(&source, &name)?;
            tracing::info!("Stored '{}'", name);
        }
        Commands::Get { name, dest, .. } => {
            fbox.get_to_path(&name, &dest)?;
            tracing::info!("Wrote '{}' to {}", name, dest.display());
        }
        Commands::Rm { name } => {
            let removed = fbox.remove(&name)?;
            tracing::info!("Removed {} file(s) named '{}'", removed, name);
        }
        Commands::Ls { .. } => {
            for name in fbox.list_names()? {
                println!("{}", name);
            }
        }
    }

    fbox.close()
}

const FLAT_GROUPS_UNSUPPORTED: &str = "groups are not available with --flat";

fn require_group(group: Option<String>) -> filebox::Result<String> {
    group.ok_or_else(|| usage("--group is required without --flat"))
}

/// Stored name: explicit `--name`, else the source's final path component
fn stored_name(name: Option<String>, source: &Path) -> filebox::Result<String> {
    match name {
        Some(name) => Ok(name),
        None => source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| usage("cannot derive a name from the source path; pass --name")),
    }
}

fn usage(msg: &str) -> filebox::FileboxError {
    filebox::FileboxError::Config(msg.to_string())
}
