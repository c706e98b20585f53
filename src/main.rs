//! Townhall CLI - hire administrators, found towns and run them.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Townhall - a small turn-based town management game
#[derive(Parser, Debug)]
#[command(name = "townhall")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
struct Args {
    /// Data directory (default: $XDG_DATA_HOME/townhall)
    #[arg(long, global = true, env = "TOWNHALL_HOME", value_name = "DIR")]
    home: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print usage
    #[command(visible_alias = "h")]
    Help,

    /// List the administrators available for hire
    #[command(visible_alias = "la")]
    ListAdmins {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Hire an administrator and found a new town
    #[command(visible_alias = "ha")]
    HireAdmin {
        /// Administrator id (see list-admins)
        admin: u8,

        /// Name of the new town
        town: String,

        /// Terrain seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Replace an existing town of the same name
        #[arg(long)]
        force: bool,
    },

    /// List saved towns
    #[command(visible_alias = "lt")]
    ListTowns {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Open a town and start the command console
    #[command(visible_alias = "c")]
    Connect {
        /// Town to open
        town: String,

        /// Terminal device to draw the map on (e.g. /dev/pts/3)
        #[arg(long, value_name = "TTY")]
        view: Option<PathBuf>,

        /// Enable the debug commands
        #[arg(long)]
        debug: bool,
    },

    /// Delete a town and its backup
    Delete {
        /// Town to delete
        town: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_logging(args.verbose);

    let result = match args.command {
        Commands::Help => Args::command().print_help().map_err(cli::CliError::from),
        Commands::ListAdmins { format } => cli::admins::list(format),
        Commands::HireAdmin {
            admin,
            town,
            seed,
            force,
        } => cli::admins::hire(args.home, admin, &town, seed, force),
        Commands::ListTowns { format } => cli::towns::list(args.home, format),
        Commands::Connect { town, view, debug } => cli::connect::execute(args.home, &town, view, debug),
        Commands::Delete { town } => cli::towns::delete(args.home, &town),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
