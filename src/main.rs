//! fd44 - ASUS FD44 module identity editor
//!
//! Reads and writes the per-board identity fields (hardware address, sensor
//! key, system UUID, serial number) that ASUS 6-series, C602 and 7-series
//! boards keep in the FD44 module of their BIOS image.
//!
//! # Workflow
//!
//! Fields are decoded from one image (typically a backup of the board's own
//! flash), optionally edited, and written into a target image (typically a
//! fresh BIOS update for the same board):
//!
//! ```text
//! fd44 show -i backup.bin
//! fd44 write -i backup.bin -t P8Z77-V-ASUS-2104.CAP -o patched.bin
//! ```

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use fd44_core::board::BoardDatabase;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let boards = match load_board_database(cli.board_db.as_deref()) {
        Ok(boards) => boards,
        Err(e) => {
            eprintln!("Failed to load board database: {}", e);
            std::process::exit(1);
        }
    };

    log::debug!("Loaded {} board profiles", boards.len());

    match cli.command {
        Commands::Show { input } => commands::show::cmd_show(&input, &boards),
        Commands::Export { input, output } => {
            commands::export::cmd_export(&input, output.as_deref(), &boards)
        }
        Commands::Write {
            input,
            target,
            output,
            edits,
            layout,
        } => commands::write::cmd_write(
            &input,
            target.as_deref().unwrap_or(&input),
            &output,
            &edits,
            &layout,
            &boards,
        ),
        Commands::Boards { variant, name } => {
            commands::boards::cmd_boards(&boards, variant.map(Into::into), name.as_deref());
            Ok(())
        }
    }
}

/// Built-in board profiles, extended from a file when one is given
fn load_board_database(path: Option<&Path>) -> Result<BoardDatabase, Box<dyn std::error::Error>> {
    let mut boards = BoardDatabase::new();

    if let Some(path) = path {
        if !path.is_file() {
            return Err(format!("Board database not found: {}", path.display()).into());
        }
        let count = boards.load_file(path)?;
        log::info!("Loaded {} board profiles from {}", count, path.display());
    }

    Ok(boards)
}
