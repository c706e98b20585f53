//! On-disk layout: the per-user data directory, town files and backups.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecError};
use crate::error::ErrorKind;
use crate::registry::AdminId;
use crate::town::{generate, Town, TownError};

/// Extension of town files.
pub const TOWN_EXTENSION: &str = "twn";

/// Extension of the backup kept from the previous save.
pub const BACKUP_EXTENSION: &str = "bkp";

/// Suffix of the scratch file written during a save.
pub const TEMP_EXTENSION: &str = "tmp";

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "townhall.conf";

/// Longest accepted town name.
pub const MAX_TOWN_NAME: usize = 32;

/// Errors locating or managing the data directory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No home directory could be determined.
    #[error("cannot determine the home directory; pass --home or set TOWNHALL_HOME")]
    NoHomeDirectory,
    /// A directory could not be created.
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The town name is not usable as a file name.
    #[error("invalid town name '{0}': use 1-32 letters, digits, '-' or '_'")]
    InvalidName(String),
    /// No files exist for the town.
    #[error("town '{0}' does not exist")]
    NotFound(String),
    /// Files exist for the town already.
    #[error("town '{0}' already exists")]
    AlreadyExists(String),
    /// Listing or deleting failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NoHomeDirectory | StoreError::CreateDir { .. } => ErrorKind::Environment,
            StoreError::InvalidName(_) | StoreError::NotFound(_) | StoreError::AlreadyExists(_) => {
                ErrorKind::Validation
            }
            StoreError::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Check that a town name is safe to use as a file stem.
///
/// # Errors
///
/// Returns [`StoreError::InvalidName`] for empty, overlong or otherwise
/// unsafe names.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_TOWN_NAME
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// The per-user data directory holding the config file and the towns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use an explicit directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the data directory: the override if given, else
    /// `$XDG_DATA_HOME/townhall`, else `~/.local/share/townhall`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoHomeDirectory`] if nothing can be resolved.
    pub fn locate(override_dir: Option<PathBuf>) -> Result<Self, StoreError> {
        if let Some(dir) = override_dir {
            return Ok(Self::new(dir));
        }
        let base = std::env::var_os("XDG_DATA_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                homedir::get_my_home()
                    .ok()
                    .flatten()
                    .map(|home| home.join(".local").join("share"))
            })
            .ok_or(StoreError::NoHomeDirectory)?;
        Ok(Self::new(base.join("townhall")))
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the config file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Store for the towns directory.
    #[must_use]
    pub fn towns(&self) -> TownStore {
        TownStore::new(self.root.join("towns"))
    }

    /// Create the root directory if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CreateDir`] on failure.
    pub fn ensure(&self) -> Result<(), StoreError> {
        create_dir(&self.root)
    }
}

fn create_dir(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path).map_err(|source| StoreError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// What a save did besides writing the file.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// File written.
    pub path: PathBuf,
    /// Whether the previous file was kept as a backup.
    pub backed_up: bool,
    /// Set when an existing file could not be moved to the backup.
    pub backup_warning: Option<String>,
}

/// Errors from [`TownStore::save`] and [`TownStore::load`].
#[derive(Debug, Error)]
pub enum PersistError {
    /// Directory or name problem.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Reading, writing or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The town could not be generated.
    #[error(transparent)]
    Town(#[from] TownError),
}

impl PersistError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            PersistError::Store(e) => e.kind(),
            PersistError::Codec(e) => e.kind(),
            PersistError::Town(e) => e.kind(),
        }
    }
}

/// Town files inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TownStore {
    dir: PathBuf,
}

impl TownStore {
    /// Store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the town files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a town's save file.
    #[must_use]
    pub fn town_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{TOWN_EXTENSION}"))
    }

    /// Path of a town's backup file.
    #[must_use]
    pub fn backup_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{BACKUP_EXTENSION}"))
    }

    /// Check if a save file exists for the town.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.town_path(name).is_file()
    }

    /// Path of the scratch file a save is written to before it replaces
    /// the town file.
    #[must_use]
    pub fn temp_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{TOWN_EXTENSION}.{TEMP_EXTENSION}"))
    }

    /// Write a town, keeping any previous save as the backup file.
    ///
    /// The town is written to a scratch file first; only once that is on
    /// disk is the old save moved to the backup and the scratch file moved
    /// into place. A failed write leaves the previous save untouched. A
    /// failed backup rename is reported in the [`SaveReport`] and does not
    /// stop the save.
    ///
    /// # Errors
    ///
    /// Fails on an invalid name, when the directory cannot be created, or
    /// when writing the file fails.
    pub fn save(&self, name: &str, town: &Town) -> Result<SaveReport, PersistError> {
        validate_name(name)?;
        create_dir(&self.dir)?;

        let path = self.town_path(name);
        let temp = self.temp_path(name);
        if let Err(e) = write_town(&temp, town) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        let mut report = SaveReport {
            path: path.clone(),
            ..SaveReport::default()
        };
        if path.exists() {
            let backup = self.backup_path(name);
            match fs::rename(&path, &backup) {
                Ok(()) => {
                    debug!(backup = %backup.display(), "kept previous save");
                    report.backed_up = true;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not back up previous save");
                    report.backup_warning = Some(format!(
                        "could not back up {} to {}: {e}",
                        path.display(),
                        backup.display()
                    ));
                }
            }
        }

        fs::rename(&temp, &path).map_err(|source| CodecError::Io {
            path: path.clone(),
            source,
        })?;

        info!(town = name, path = %path.display(), round = town.round, "saved town");
        Ok(report)
    }

    /// Generate a fresh town for `admin` and save it as `name`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown administrator or an invalid name, with
    /// [`StoreError::AlreadyExists`] if the town exists and `force` is not
    /// set, or when the town cannot be written. Nothing is written on
    /// failure.
    pub fn found(
        &self,
        admin: AdminId,
        name: &str,
        seed: u64,
        force: bool,
    ) -> Result<SaveReport, PersistError> {
        validate_name(name)?;
        let town = generate(admin, seed)?;
        if self.exists(name) && !force {
            return Err(StoreError::AlreadyExists(name.to_string()).into());
        }
        info!(town = name, admin, seed, "founding town");
        self.save(name, &town)
    }

    /// Read a town's save file.
    ///
    /// # Errors
    ///
    /// Fails on an invalid name, a missing or unreadable file, or malformed
    /// content.
    pub fn load(&self, name: &str) -> Result<Town, PersistError> {
        validate_name(name)?;
        let path = self.town_path(name);
        let bytes = fs::read(&path).map_err(|source| CodecError::Io {
            path: path.clone(),
            source,
        })?;
        let town = codec::from_bytes(&bytes)?;
        info!(town = name, path = %path.display(), round = town.round, "loaded town");
        Ok(town)
    }

    /// Names of all saved towns, sorted.
    ///
    /// A missing directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be read.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == TOWN_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Delete a town's save and backup files.
    ///
    /// Returns the paths that were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if neither file exists.
    pub fn delete(&self, name: &str) -> Result<Vec<PathBuf>, StoreError> {
        validate_name(name)?;
        let mut removed = Vec::new();
        for path in [self.town_path(name), self.backup_path(name)] {
            match fs::remove_file(&path) {
                Ok(()) => removed.push(path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
        if removed.is_empty() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        info!(town = name, files = removed.len(), "deleted town");
        Ok(removed)
    }
}

fn write_town(path: &Path, town: &Town) -> Result<(), CodecError> {
    let io_error = |source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    codec::encode(town, &mut writer).map_err(io_error)?;
    let file = writer.into_inner().map_err(|e| io_error(e.into_error()))?;
    file.sync_all().map_err(io_error)
}

/// Write `contents` to `path` in one go, replacing the file.
pub(crate) fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}
