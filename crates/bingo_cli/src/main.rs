//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open (or create) a card database and register-or-load one owner.
//! - Print the owner's card as text with its public share link.

use bingo_core::db::open_db;
use bingo_core::{
    share_url, CardService, CellContent, GridLayout, GridViewModel, SqliteAccountRepository,
    SqliteGridRepository,
};
use clap::Parser;
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "bingo_cli", about = "Open a goal bingo card and print it", version)]
struct Cli {
    /// SQLite database file, created when missing
    #[arg(default_value = "bingo.sqlite3")]
    db_path: PathBuf,

    /// Owner name to register or load
    #[arg(default_value = "guest")]
    name: String,

    /// Side length for a newly created card (odd, 3..=9)
    #[arg(long, default_value_t = 3)]
    size: u32,

    /// Origin used to build the public share link
    #[arg(long, env = "BINGO_SHARE_BASE", default_value = "http://localhost:3000")]
    share_base: String,

    /// Absolute directory for rolling log files; logging stays off when unset
    #[arg(long, env = "BINGO_LOG_DIR")]
    log_dir: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        bingo_core::init_logging(bingo_core::default_log_level(), log_dir)?;
    }

    let layout = GridLayout::new(cli.size, cli.size)?;
    let conn = open_db(&cli.db_path)?;
    let service = CardService::new(
        SqliteAccountRepository::try_new(&conn)?,
        SqliteGridRepository::try_new(&conn)?,
    );
    let registration = service.register_or_load(&cli.name, layout)?;
    let view = service.open_private_card(registration.account.id)?;
    info!(
        "event=cli_open module=cli status=ok created={} grid_id={}",
        registration.created, registration.grid_id
    );

    println!(
        "owner={} created={} grid_id={}",
        registration.account.name, registration.created, registration.grid_id
    );
    print_card(&view);
    println!("share={}", share_url(&cli.share_base, registration.grid_id)?);
    Ok(())
}

fn print_card(view: &GridViewModel) {
    let cols = view.layout().cols as usize;
    let labels: Vec<String> = view
        .cell_views(Instant::now())
        .into_iter()
        .map(|cell| {
            let mark = if cell.completed { "x" } else { " " };
            let text = match cell.content {
                CellContent::FreeSpace => "FREE".to_string(),
                CellContent::Goal(text) | CellContent::Editing(text) => text.replace('\n', " "),
                CellContent::Placeholder => "-".to_string(),
            };
            format!("[{mark}] {text}")
        })
        .collect();

    for row in labels.chunks(cols.max(1)) {
        println!("{}", row.join(" | "));
    }
    println!("{}", view.quote_label());
}
