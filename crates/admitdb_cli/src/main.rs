//! AdmitDB CLI
//!
//! Command-line tools for an AdmitDB admission store.
//!
//! # Commands
//!
//! - `init` - Create a store and apply the admission schema
//! - `inspect` - Display collections, indexes and journal size
//! - `export` / `import` - Move snapshots in and out as JSON
//! - `backup` / `restore` - Write and replay backup files
//! - `search` - Search applications
//! - `register-student`, `apply`, `notifications`, `streams` - Record operations
//! - `compact` - Rewrite the journal to its live state

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// AdmitDB command-line tools.
#[derive(Parser)]
#[command(name = "admitdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store if missing and apply the admission schema
    Init,

    /// Display collections, indexes and journal size
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Export a snapshot as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON snapshot
    Import {
        /// Snapshot file
        file: PathBuf,
    },

    /// Write a backup file
    Backup {
        /// Directory to write the backup into
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Restore a backup file
    Restore {
        /// Backup file
        file: PathBuf,
    },

    /// Search applications by student, stream or college id
    Search {
        /// Case-insensitive substring
        query: String,
    },

    /// Register a student
    RegisterStudent {
        /// Email address (must be unique)
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Submit an application for a student
    Apply {
        /// Student id
        student: String,

        /// Stream name
        #[arg(short, long)]
        stream: String,
    },

    /// List a student's unread notifications
    Notifications {
        /// Student id
        student: String,

        /// Mark the listed notifications as read
        #[arg(short, long)]
        mark_read: bool,
    },

    /// Manage streams
    Streams {
        #[command(subcommand)]
        action: StreamAction,
    },

    /// Rewrite the journal to its live state
    Compact,

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum StreamAction {
    /// List all streams
    List,
    /// Add a stream
    Add {
        /// Stream name (must be unique)
        name: String,
        /// Short code
        #[arg(short, long)]
        code: Option<String>,
    },
    /// Delete a stream by id
    Delete {
        /// Stream id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Version = cli.command {
        println!("AdmitDB CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("AdmitDB Core v{}", admitdb_core::VERSION);
        println!("Schema version {}", admitdb_admission::SCHEMA_VERSION);
        return Ok(());
    }

    let path = cli.path.ok_or("Database path required (--path)")?;

    match cli.command {
        Commands::Init => commands::init::run(&path)?,
        Commands::Inspect { format } => commands::inspect::run(&path, &format)?,
        Commands::Export { output } => commands::transfer::export(&path, output.as_deref())?,
        Commands::Import { file } => commands::transfer::import(&path, &file).await?,
        Commands::Backup { dir } => {
            commands::transfer::backup(&path, &dir)?;
        }
        Commands::Restore { file } => commands::transfer::restore(&path, &file).await?,
        Commands::Search { query } => commands::records::search(&path, &query)?,
        Commands::RegisterStudent { email, name, phone } => {
            commands::records::register_student(&path, email, name, phone)?;
        }
        Commands::Apply { student, stream } => {
            commands::records::apply(&path, &student, stream)?;
        }
        Commands::Notifications { student, mark_read } => {
            commands::records::notifications(&path, &student, mark_read)?;
        }
        Commands::Streams { action } => match action {
            StreamAction::List => commands::streams::list(&path)?,
            StreamAction::Add { name, code } => commands::streams::add(&path, name, code)?,
            StreamAction::Delete { id } => commands::streams::delete(&path, &id)?,
        },
        Commands::Compact => commands::compact::run(&path)?,
        Commands::Version => {}
    }

    Ok(())
}
