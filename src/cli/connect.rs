//! `connect`: load a town and run a session on it.

use super::{data_dir, CliError};
use std::io::stdout;
use std::path::PathBuf;
use townhall::session::{spawn_stdin_reader, HeadlessView, StopReason, TerminalView};
use townhall::{run_session, Config, Interpreter, SessionSummary};

/// Run a console session on `town`.
///
/// Without `view` the map is only shown by the `map` command.
///
/// # Errors
///
/// Fails if the town or config cannot be loaded, or the view cannot be set
/// up.
pub(crate) fn execute(
    home: Option<PathBuf>,
    town: &str,
    view: Option<PathBuf>,
    debug: bool,
) -> Result<(), CliError> {
    let data = data_dir(home)?;
    let config = Config::load(&data.config_path())?;
    let loaded = data.towns().load(town)?;

    let admin = loaded.administrator().map_or("nobody", |a| a.name);
    println!(
        "Connected to {town}: round {}, money {}, administered by {admin}. Type 'help' for commands.",
        loaded.round, loaded.money
    );

    let mut interpreter =
        Interpreter::new(loaded, town, data.towns(), config, data.config_path()).with_debug(debug);
    let lines = spawn_stdin_reader();
    let mut out = stdout().lock();

    let summary = match view {
        Some(device) => {
            let view = TerminalView::new(device, town);
            run_session(&mut interpreter, view, &lines, &mut out)?
        }
        None => run_session(&mut interpreter, HeadlessView::new(), &lines, &mut out)?,
    };
    drop(out);
    report(&summary);
    Ok(())
}

fn report(summary: &SessionSummary) {
    tracing::info!(
        reason = %summary.reason,
        commands = summary.commands_executed,
        frames = summary.frames_drawn,
        "session summary"
    );
    if summary.reason == StopReason::Bankrupt {
        println!("Game over: the town went bankrupt.");
    }
    if let Some(Err(message)) = &summary.final_save {
        eprintln!("Warning: the town was not saved: {message}");
    }
}
