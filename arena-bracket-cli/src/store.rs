use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use arena_bracket_core::lifecycle::Tournament;
use arena_bracket_core::scoring::{GameMode, MatchResult};
use arena_bracket_core::{Bracket, BracketKind, Participant};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything the host keeps about a single tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRecord {
    pub id: String,
    pub name: String,
    pub kind: BracketKind,
    pub mode: GameMode,
    pub tournament: Tournament,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub bracket: Option<Bracket>,
    #[serde(default)]
    pub results: Vec<MatchResult>,
    /// Incremented on every successful [`Store::put`].
    #[serde(default)]
    pub version: u64,
}

impl TournamentRecord {
    pub fn new(
        id: String,
        name: String,
        kind: BracketKind,
        mode: GameMode,
        tournament: Tournament,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            mode,
            tournament,
            participants: Vec::new(),
            bracket: None,
            results: Vec::new(),
            version: 0,
        }
    }
}

/// A file store keeping one JSON document per tournament.
///
/// Writes are a compare-and-swap on [`TournamentRecord::version`]: a record read before
/// another writer stored a newer version is rejected with [`StoreError::VersionConflict`].
#[derive(Clone, Debug)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Opens the store at `root`, creating the directory if it doesn't exist.
    pub fn open<P>(root: P) -> Result<Self, StoreError>
    where
        P: AsRef<Path>,
    {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        log::debug!("Opened store at {}", root.display());

        Ok(Self { root })
    }

    /// Stores a new record. Fails if a record with the same id exists.
    pub fn insert(&self, record: &TournamentRecord) -> Result<(), StoreError> {
        validate_id(&record.id)?;

        let _lock = LockGuard::acquire(self.lock_path(&record.id), &record.id)?;

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path(&record.id))
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(record.id.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        let buf = serde_json::to_vec_pretty(record)?;
        file.write_all(&buf)?;

        log::info!("Created tournament {}", record.id);

        Ok(())
    }

    /// Loads the record `id`. A stored bracket is checked with [`Bracket::validate`].
    pub fn get(&self, id: &str) -> Result<TournamentRecord, StoreError> {
        validate_id(id)?;

        let buf = match fs::read(self.path(id)) {
            Ok(buf) => buf,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_owned()));
            }
            Err(err) => return Err(err.into()),
        };

        let record: TournamentRecord = serde_json::from_slice(&buf)?;

        if let Some(bracket) = &record.bracket {
            bracket.validate().map_err(|err| StoreError::InvalidBracket {
                id: id.to_owned(),
                err,
            })?;
        }

        Ok(record)
    }

    /// Writes `record` back if the stored version still equals `record.version`, then bumps
    /// the version of `record`.
    pub fn put(&self, record: &mut TournamentRecord) -> Result<(), StoreError> {
        validate_id(&record.id)?;

        let _lock = LockGuard::acquire(self.lock_path(&record.id), &record.id)?;

        let found = self.get(&record.id)?.version;
        if found != record.version {
            return Err(StoreError::VersionConflict {
                expected: record.version,
                found,
            });
        }

        record.version += 1;

        let tmp = self.root.join(format!("{}.json.tmp", record.id));
        let buf = match serde_json::to_vec_pretty(record) {
            Ok(buf) => buf,
            Err(err) => {
                record.version -= 1;
                return Err(err.into());
            }
        };

        let res = fs::write(&tmp, buf).and_then(|_| fs::rename(&tmp, self.path(&record.id)));
        if let Err(err) = res {
            record.version -= 1;
            return Err(err.into());
        }

        log::debug!("Stored tournament {} at version {}", record.id, record.version);

        Ok(())
    }

    /// Loads the record `id`, applies `f` and writes it back.
    pub fn update<F, T, E>(&self, id: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TournamentRecord) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut record = self.get(id)?;
        let res = f(&mut record)?;
        self.put(&mut record)?;
        Ok(res)
    }

    /// Returns the ids of all stored records, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                if validate_id(id).is_ok() {
                    ids.push(id.to_owned());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    fn lock_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.lock", id))
    }
}

/// Removes the lock file when dropped.
#[derive(Debug)]
struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    fn acquire(path: PathBuf, id: &str) -> Result<Self, StoreError> {
        match File::options().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::Locked(id.to_owned()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            log::error!("Failed to remove lock {}: {}", self.path.display(), err);
        }
    }
}

fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_owned()))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("tournament {0} not found")]
    NotFound(String),
    #[error("tournament {0} already exists")]
    AlreadyExists(String),
    #[error("tournament {0} is locked by another writer")]
    Locked(String),
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },
    #[error("invalid tournament id: {0:?}")]
    InvalidId(String),
    #[error("tournament {id} has an invalid bracket: {err}")]
    InvalidBracket {
        id: String,
        err: arena_bracket_core::Error,
    },
}
