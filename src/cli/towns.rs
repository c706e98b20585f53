//! `list-towns` and `delete`.

use super::output::{format_towns, JsonTown};
use super::{data_dir, CliError, OutputFormat};
use std::path::PathBuf;

/// Print the saved towns.
///
/// # Errors
///
/// Returns an error if the data directory cannot be resolved or read.
pub(crate) fn list(home: Option<PathBuf>, format: OutputFormat) -> Result<(), CliError> {
    let store = data_dir(home)?.towns();
    let towns: Vec<JsonTown> = store
        .list()?
        .into_iter()
        .map(|name| JsonTown {
            path: store.town_path(&name).display().to_string(),
            has_backup: store.backup_path(&name).is_file(),
            name,
        })
        .collect();

    match format {
        OutputFormat::Text => print!("{}", format_towns(&towns)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&towns)?),
    }
    Ok(())
}

/// Remove a town's save and backup.
///
/// # Errors
///
/// Returns an error if the town does not exist or a file cannot be removed.
pub(crate) fn delete(home: Option<PathBuf>, town: &str) -> Result<(), CliError> {
    let store = data_dir(home)?.towns();
    let removed = store.delete(town)?;
    for path in removed {
        println!("removed {}", path.display());
    }
    Ok(())
}
