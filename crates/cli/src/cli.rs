//! Command-line arguments.

use cf_protocol::ProcessId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "clipflow")]
#[command(version, about = "Run ordered clipboard processes from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory containing `.clipflow/` (defaults to current directory)
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a `.clipflow/` directory with sample items and processes
    Init {
        /// Overwrite templates in an existing `.clipflow/`
        #[arg(long)]
        force: bool,

        /// Only write one process and the items it uses
        #[arg(long)]
        minimal: bool,
    },

    /// Store every process definition from `.clipflow/processes/`
    Import,

    /// List stored processes
    List {
        /// Include archived processes
        #[arg(long)]
        archived: bool,

        /// Include inactive processes
        #[arg(long)]
        inactive: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one process and its steps
    Show {
        id: ProcessId,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search processes by name, description or tag
    Search { query: String },

    /// Run one or more processes in order
    Run {
        #[arg(required = true)]
        ids: Vec<ProcessId>,

        /// Print step content to stdout instead of the clipboard
        #[arg(long)]
        stdout: bool,
    },

    /// Usage and reliability statistics for a process
    Stats { id: ProcessId },

    /// Recent runs of a process
    History {
        id: ProcessId,

        /// Number of runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Delete a process with its steps and history
    Delete { id: ProcessId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_globals() {
        let cli = Cli::parse_from(["clipflow", "run", "3", "1", "--stdout", "-C", "/tmp/p", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/p")));
        match cli.command {
            Commands::Run { ids, stdout } => {
                assert_eq!(ids, vec![3, 1]);
                assert!(stdout);
            }
            other => panic!("Expected Run, got {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_ids() {
        assert!(Cli::try_parse_from(["clipflow", "run"]).is_err());
    }
}
