//! Binary entry point that glues the SQLite-backed program store to the TUI
//! or to one of the one-shot subcommands.
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use service_program_manager::cli::{Cli, Command};
use service_program_manager::config::Config;
use service_program_manager::db::export_program;
use service_program_manager::viewer::SystemViewer;
use service_program_manager::{logging, run_app, App, Editor, Store};

/// Resolve configuration, open the store, and run the requested command.
///
/// Returning a `Result` bubbles fatal start-up problems (an unwritable data
/// directory, a corrupt store) to the terminal instead of crashing silently.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(&cli)?;
    logging::init(&config.log_path, config.verbosity)?;
    info!(db = %config.db_path.display(), "starting");

    let store = Store::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    match cli.command.unwrap_or(Command::Tui { export_dir: None }) {
        Command::Tui { export_dir } => {
            let viewer = SystemViewer::new(&config.viewer_dir);
            let editor = Editor::open(store, viewer).context("failed to load the saved program")?;
            let mut app = App::new(editor, export_dir.unwrap_or(config.export_dir));
            run_app(&mut app)
        }
        Command::Show => {
            let editor = headless_editor(store, &config)?;
            print_program(&editor);
            Ok(())
        }
        Command::Export { out, name } => {
            let mut editor = headless_editor(store, &config)?;
            let dir = out.unwrap_or(config.export_dir);
            let path = match name {
                Some(name) => {
                    editor.save().context("failed to save before exporting")?;
                    export_program(editor.program().data(), &dir, &name)?
                }
                None => editor.export_file(&dir)?,
            };
            println!("Program exported to {}", path.display());
            Ok(())
        }
        Command::Import { file } => {
            let mut editor = headless_editor(store, &config)?;
            editor
                .import_file(&file)
                .with_context(|| format!("failed to import {}", file.display()))?;
            println!(
                "Imported \"{}\" ({} songs).",
                editor.program().data().program_name,
                editor.program().songs().len()
            );
            Ok(())
        }
        Command::Reset => {
            let mut editor = headless_editor(store, &config)?;
            editor.reset().context("failed to reset the program")?;
            println!("Program reset to defaults.");
            Ok(())
        }
    }
}

fn headless_editor(store: Store, config: &Config) -> Result<Editor<SystemViewer>> {
    Editor::open(store, SystemViewer::headless(&config.viewer_dir))
        .context("failed to load the saved program")
}

fn print_program(editor: &Editor<SystemViewer>) {
    let header = &editor.view().header;
    println!("{} - {}", header.name, header.long_date);
    println!();
    println!("Order of service:");
    for row in &editor.view().order {
        if row.observation.is_empty() {
            println!("  {:>2}. {}", row.number, row.title);
        } else {
            println!("  {:>2}. {} ({})", row.number, row.title, row.observation);
        }
    }
    println!();
    if editor.program().songs().is_empty() {
        println!("No songs.");
        return;
    }
    println!("Songs:");
    for song in editor.program().songs() {
        if song.notes.is_empty() {
            println!("  - {song}");
        } else {
            println!("  - {song}: {}", song.notes);
        }
    }
}
