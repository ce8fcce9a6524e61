//! Terminal vocabulary drill.
//!
//! # Responsibility
//! - Wire the word list, SQLite store and logging into a drill session.
//! - Act as input source and presentation sink for `vocab_core`.

mod command;
mod terminal;

use crate::command::{parse_command, Command};
use crate::terminal::{print_help, print_history, TerminalView};
use clap::Parser;
use log::error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use vocab_core::db::open_db;
use vocab_core::{
    default_log_level, init_logging, DrillState, DrillView, EmptyReason, KeyValueRepository,
    SessionEngine, SqliteKeyValueRepository, WordCatalog,
};

#[derive(Parser)]
#[command(name = "vocab-drill", version, about = "Type-the-word vocabulary drill")]
struct Cli {
    /// JSON word list (array of records with word, level, pos, ch, example_en, example_ch).
    #[arg(long = "words", value_name = "PATH")]
    words: PathBuf,

    /// SQLite file holding progress and session snapshots.
    #[arg(long = "db", value_name = "PATH", default_value = "vocab_drill.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long = "log-dir", value_name = "DIR")]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("error: failed to initialize logging: {err}");
            return ExitCode::FAILURE;
        }
    }

    let mut view = TerminalView;
    let catalog = match WordCatalog::load_json_file(&cli.words) {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("event=cli_start module=cli status=error error={err}");
            view.show_empty(EmptyReason::CatalogUnavailable);
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let conn = match open_db(&cli.db) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("error: cannot open `{}`: {err}", cli.db.display());
            return ExitCode::FAILURE;
        }
    };
    let repo = match SqliteKeyValueRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut engine = SessionEngine::open(catalog, repo, rand::rng());
    print_help();
    match run(&mut engine, &mut view) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run<R, G>(engine: &mut SessionEngine<R, G>, view: &mut TerminalView) -> io::Result<()>
where
    R: KeyValueRepository,
    G: rand::Rng,
{
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        engine.render(view);
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            Command::Answer(_) | Command::Next if engine.state() == DrillState::Revealed => {
                engine.advance();
            }
            Command::Answer(answer) => {
                engine.check(&answer);
            }
            Command::Next => {}
            Command::Skip => {
                engine.skip();
            }
            Command::Save => {
                if let Some(saved) = engine.toggle_saved() {
                    println!("{}", if saved { "Saved." } else { "Removed from saved." });
                }
            }
            Command::Mode(mode) => {
                engine.set_mode(mode);
            }
            Command::Level(level) => {
                if !engine.toggle_level(level) {
                    println!("At least one level must stay selected.");
                }
            }
            Command::Reset => engine.reset_progress(),
            Command::Shuffle => engine.reshuffle(),
            Command::History => print_history(engine.history()),
            Command::Help => print_help(),
            Command::Quit => return Ok(()),
        }
    }
}
