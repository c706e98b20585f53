//! `list-admins` and `hire-admin`.

use super::output::format_admins;
use super::{data_dir, CliError, OutputFormat};
use std::path::PathBuf;
use townhall::registry::{admin, admins};
use townhall::store::validate_name;
use townhall::TownError;

/// Print the administrator roster.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(crate) fn list(format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => print!("{}", format_admins(admins())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(admins())?),
    }
    Ok(())
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(d.as_secs()))
        .unwrap_or(42)
}

/// Generate a town for `admin_id` and save it as `town`.
///
/// # Errors
///
/// Fails on an unknown administrator, an invalid or taken town name
/// (unless `force`), or when the town cannot be written.
pub(crate) fn hire(
    home: Option<PathBuf>,
    admin_id: u8,
    town: &str,
    seed: Option<u64>,
    force: bool,
) -> Result<(), CliError> {
    let record = admin(admin_id).ok_or(TownError::UnknownAdmin(admin_id))?;
    validate_name(town)?;

    let store = data_dir(home)?.towns();
    let seed = seed.unwrap_or_else(clock_seed);
    let report = store.found(admin_id, town, seed, force)?;
    if let Some(warning) = &report.backup_warning {
        eprintln!("Warning: {warning}");
    }

    println!(
        "{} now administers {town} (seed {seed}), saved to {}",
        record.name,
        report.path.display()
    );
    Ok(())
}
