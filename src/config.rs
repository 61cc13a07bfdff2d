use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use crate::cli::Cli;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".service-program";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "program.sqlite";
const LOG_FILE_NAME: &str = "service-program.log";
/// Chord sheets handed to the system viewer are written here.
const VIEWER_DIR_NAME: &str = "viewer";

/// Resolved locations for everything the application reads or writes.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub viewer_dir: PathBuf,
    pub export_dir: PathBuf,
    pub verbosity: u8,
}

impl Config {
    /// Apply command-line overrides on top of the per-user defaults.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let data_dir = data_dir()?;
        let export_dir = env::current_dir().context("failed to read the current directory")?;
        Ok(Self {
            db_path: cli
                .db
                .clone()
                .unwrap_or_else(|| data_dir.join(DB_FILE_NAME)),
            log_path: cli
                .log_file
                .clone()
                .unwrap_or_else(|| data_dir.join(LOG_FILE_NAME)),
            viewer_dir: data_dir.join(VIEWER_DIR_NAME),
            export_dir,
            verbosity: cli.verbose,
            data_dir,
        })
    }
}

/// Resolve the per-user data directory inside the home folder.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
