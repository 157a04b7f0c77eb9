//! `copypaste` command line front end
//!
//! Drives the history engine from stdin and inspects a persisted history.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use copypaste_core::config::{self, Config};
use copypaste_core::{
    logging, Board, ClipboardEntry, ClipboardIngestor, EntrySummary, FocusHistoryTracker,
    HistoryStore, Persistence, SqlitePersistence,
};

#[derive(Parser)]
#[command(name = "copypaste")]
#[command(about = "Clipboard history with source-app attribution", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to <config_dir>/copypaste/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History database; implies persistence
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log to stderr only
    #[arg(long, global = true)]
    no_log_file: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest clipboard events from stdin.
    ///
    /// Each line is `APP<TAB>TEXT`, `focus<TAB>APP` (a focus change) or
    /// `clip<TAB>TEXT` (a clipboard change attributed from focus history).
    /// `\n`, `\t` and `\\` escapes in TEXT are decoded. Stored entries are
    /// printed as JSON lines.
    Ingest,
    /// List history entries in store order
    List {
        /// Only entries from this app
        #[arg(long)]
        app: Option<String>,
        /// Only entries on this board
        #[arg(long)]
        board: Option<Board>,
    },
    /// List distinct source apps
    Apps,
    /// Print the active board rules as JSON
    Rules,
    /// Recompute boards for stored entries with the current rules
    MigrateBoards {
        /// Write the new boards instead of only reporting them
        #[arg(long)]
        apply: bool,
    },
    /// Pin an entry to the top of the history
    Pin { id: String },
    /// Return a pinned entry to its recency position
    Unpin { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = if cli.no_log_file {
        logging::init_stderr_only()
    } else {
        logging::init()
    };

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path);
    let store = open_store(&cli, &config)?;

    let result = run(cli.command, &config, &store);
    store.shutdown();
    result
}

fn open_store(cli: &Cli, config: &Config) -> Result<HistoryStore> {
    let db_path = match (&cli.db, config.persistence.enabled) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(
            config
                .persistence
                .path
                .clone()
                .unwrap_or_else(config::default_database_path),
        ),
        (None, false) => None,
    };

    let Some(path) = db_path else {
        debug!("Persistence disabled, using in-memory history");
        return Ok(HistoryStore::new(config));
    };
    let persistence = SqlitePersistence::open(&path)
        .with_context(|| format!("Failed to open history database {}", path.display()))?;
    let persistence: Arc<dyn Persistence> = Arc::new(persistence);
    Ok(HistoryStore::with_persistence(config, persistence))
}

fn run(command: Commands, config: &Config, store: &HistoryStore) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Ingest => ingest(config, store, &mut out)?,
        Commands::List { app, board } => {
            let entries = match (&app, board) {
                (Some(app), _) => store.get_items_by_app(app),
                (None, Some(board)) => store.get_items_by_board(board),
                (None, None) => store.items(),
            };
            for entry in entries
                .iter()
                .filter(|e| board.is_none_or(|b| e.board == b))
            {
                print_entry(&mut out, entry)?;
            }
        }
        Commands::Apps => {
            for app in store.get_apps() {
                writeln!(out, "{}", app)?;
            }
        }
        Commands::Rules => {
            let json = serde_json::to_string_pretty(&store.board_rules())
                .context("Failed to encode board rules")?;
            writeln!(out, "{}", json)?;
        }
        Commands::MigrateBoards { apply } => {
            let changes: Vec<(String, Board, Board)> = store
                .items()
                .into_iter()
                .filter_map(|e| {
                    let board = store.route(&e.source_app, &e.content);
                    (board != e.board).then(|| (e.id.to_string(), e.board, board))
                })
                .collect();
            for (id, from, to) in &changes {
                writeln!(out, "{}\t{} -> {}", id, from, to)?;
            }
            if apply {
                let applied = store.reclassify_all();
                info!(count = applied.len(), "Applied board migration");
                writeln!(out, "updated {} entries", applied.len())?;
            } else {
                writeln!(out, "{} entries would change (use --apply)", changes.len())?;
            }
        }
        Commands::Pin { id } => {
            if !store.pin_item(&id) {
                bail!("No entry with id {}", id);
            }
        }
        Commands::Unpin { id } => {
            if !store.unpin_item(&id) {
                bail!("No entry with id {}", id);
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn ingest(config: &Config, store: &HistoryStore, out: &mut impl Write) -> Result<()> {
    let tracker = Arc::new(FocusHistoryTracker::new(config.focus.clone()));
    let ingestor = ClipboardIngestor::new(store.clone(), tracker.clone(), &config.capture);

    let stdin = io::stdin();
    let mut stored = 0usize;
    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let Some((head, text)) = line.split_once('\t') else {
            warn!(line = index + 1, "Expected a tab-separated line, skipping");
            continue;
        };
        let now = Utc::now();
        let entry = match head {
            "focus" => {
                tracker.record(text, now);
                None
            }
            "clip" => ingestor.on_clipboard_change(&unescape(text), now),
            app => store.add_item_at(&unescape(text), app, now),
        };
        if let Some(entry) = entry {
            stored += 1;
            print_entry(out, &entry)?;
        }
    }
    info!(stored, total = store.len(), "Ingestion finished");
    Ok(())
}

fn print_entry(out: &mut impl Write, entry: &ClipboardEntry) -> Result<()> {
    let json = serde_json::to_string(&EntrySummary::from(entry)).context("Failed to encode entry")?;
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Decode `\n`, `\t` and `\\`; other backslashes are kept
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r"tab\there"), "tab\there");
        assert_eq!(unescape(r"back\\slash"), "back\\slash");
        assert_eq!(unescape(r"C:\path"), r"C:\path");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["copypaste", "--no-log-file", "list", "--board", "links"])
            .unwrap();
        assert!(cli.no_log_file);
        assert!(matches!(
            cli.command,
            Commands::List {
                app: None,
                board: Some(Board::Links)
            }
        ));

        let cli = Cli::try_parse_from(["copypaste", "migrate-boards", "--apply", "--db", "h.sqlite"])
            .unwrap();
        assert!(matches!(cli.command, Commands::MigrateBoards { apply: true }));
        assert_eq!(cli.db, Some(PathBuf::from("h.sqlite")));
    }

    #[test]
    fn test_cli_rejects_unknown_board() {
        assert!(Cli::try_parse_from(["copypaste", "list", "--board", "memes"]).is_err());
    }
}
