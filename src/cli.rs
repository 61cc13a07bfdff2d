//! Command-line surface. With no subcommand the interactive editor starts.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "service-program",
    version,
    about = "Plan a church service: order of service, songs, and chord sheets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// SQLite file holding the saved program.
    #[arg(long, value_name = "PATH", env = "SERVICE_PROGRAM_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Where to write logs (default: inside the data directory).
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// More log detail (-v debug, -vv trace). `RUST_LOG` overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open the interactive editor (default).
    Tui {
        /// Directory export files are written to.
        #[arg(long = "export-dir", value_name = "DIR")]
        export_dir: Option<PathBuf>,
    },

    /// Print the saved program.
    Show,

    /// Write the saved program to a JSON file.
    Export {
        /// Target directory (default: current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// File name to use instead of the default.
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },

    /// Replace the saved program with a JSON file.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Start over with an empty program.
    Reset,
}
