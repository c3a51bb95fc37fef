//! Stockgrid CLI - spreadsheet-style inventory editor

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "stockgrid")]
#[command(version)]
#[command(about = "Spreadsheet-style inventory editor over a single SQLite table")]
#[command(long_about = r#"
Stockgrid keeps an inventory table (name, qty, price, note) in SQLite and
edits it like a spreadsheet, either in the browser or from the shell.

Rows are addressed by their position in the current listing.

Example usage:
  stockgrid list
  stockgrid edit 0 --qty 12
  stockgrid add --name 배 --qty 4 --price 2.0
  stockgrid delete 1
  stockgrid serve --port 8501
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides APP_DB_PATH and the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the table and seed demo rows if it is empty
    Init,

    /// Show all rows with their positions
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Append a new row
    Add {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        qty: Option<String>,

        #[arg(short, long)]
        price: Option<String>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Change cells of the row at a position
    Edit {
        /// Row position as shown by `list`
        row: usize,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        qty: Option<String>,

        #[arg(short, long)]
        price: Option<String>,

        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,

        /// Remove the note
        #[arg(long)]
        clear_note: bool,
    },

    /// Delete the rows at the given positions
    Delete {
        /// Row positions as shown by `list`
        #[arg(required = true)]
        rows: Vec<usize>,
    },

    /// Apply a JSON change batch ({"edited": {...}, "added": [...], "deleted": [...]})
    Apply {
        /// Path to the batch file
        batch: PathBuf,

        /// Print the resolved operations without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show item count, total quantity and stock value
    Summary,

    /// Show database statistics
    Stats,

    /// Serve the editable grid over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a stockgrid.toml with the current settings
    Config {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = stockgrid::config::load_config(cli.config.as_deref())?;
    let database = stockgrid::config::database_path(cli.database.as_deref(), config.as_ref());
    tracing::debug!("Using database {}", database.display());

    match cli.command {
        Commands::Init => commands::run_init(&database),
        Commands::List { format } => commands::run_list(&database, &format),
        Commands::Add { name, qty, price, note } => {
            let row = commands::grid_edit(name, qty, price, note.map(Some));
            commands::run_add(&database, row)
        }
        Commands::Edit { row, name, qty, price, note, clear_note } => {
            let note = if clear_note { Some(None) } else { note.map(Some) };
            let edit = commands::grid_edit(name, qty, price, note);
            commands::run_edit(&database, row, edit)
        }
        Commands::Delete { rows } => commands::run_delete(&database, &rows),
        Commands::Apply { batch, dry_run } => commands::run_apply(&database, &batch, dry_run),
        Commands::Summary => commands::run_summary(&database),
        Commands::Stats => commands::run_stats(&database),
        Commands::Serve { port } => {
            let port = port
                .or_else(|| config.as_ref().and_then(|c| c.port))
                .unwrap_or(stockgrid::config::DEFAULT_PORT);
            commands::run_serve(database, port)
        }
        Commands::Config { force } => {
            let path = cli.config.unwrap_or_else(stockgrid::config::default_config_path);
            commands::run_config(&path, &database, force)
        }
    }
}
