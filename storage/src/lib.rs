//! JIBJIB Storage Layer - File-Based Ledger Snapshots
//!
//! The ledger lives in memory; a host persists it after every operation:
//! - `<name>.bin` (bincode) is the primary copy, loaded first
//! - `<name>.json` is a readable copy and the fallback when the binary one
//!   is missing or unreadable

use jibjib_ledger::LedgerState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Snapshot directory
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Open storage directory, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
        }

        Ok(Self { data_dir })
    }

    fn bin_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.bin", name))
    }

    fn json_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    /// Save a snapshot in both formats.
    ///
    /// Both encodings are produced before any file is touched, and the
    /// bincode copy is committed first. An interrupted save leaves either
    /// the old pair or a new bincode copy, never a new JSON copy behind an
    /// old bincode one.
    pub fn save_snapshot<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let bin = bincode::serialize(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        write_replacing(&self.bin_path(name), &bin)?;
        write_replacing(&self.json_path(name), json.as_bytes())?;

        log::debug!("saved snapshot {} ({} bytes)", name, bin.len());
        Ok(())
    }

    /// Load a snapshot (bincode first, JSON as fallback)
    pub fn load_snapshot<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let bin_path = self.bin_path(name);
        let json_path = self.json_path(name);

        if bin_path.exists() {
            let data = fs::read(&bin_path)?;
            match bincode::deserialize(&data) {
                Ok(value) => return Ok(value),
                Err(e) if json_path.exists() => {
                    log::warn!("{} unreadable ({}), falling back to JSON", bin_path.display(), e);
                }
                Err(e) => return Err(StorageError::SerializationError(e.to_string())),
            }
        }

        if json_path.exists() {
            let data = fs::read_to_string(&json_path)?;
            return serde_json::from_str(&data)
                .map_err(|e| StorageError::SerializationError(e.to_string()));
        }

        Err(StorageError::SnapshotNotFound(name.to_string()))
    }

    pub fn has_snapshot(&self, name: &str) -> bool {
        self.bin_path(name).exists() || self.json_path(name).exists()
    }

    /// Names of all snapshots in the directory
    pub fn list_snapshots(&self) -> Result<Vec<String>> {
        let mut snapshots = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();

            let is_snapshot = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("bin") | Some("json")
            );
            if !is_snapshot {
                continue;
            }

            if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                if !snapshots.iter().any(|s| s == name) {
                    snapshots.push(name.to_string());
                }
            }
        }

        snapshots.sort();
        Ok(snapshots)
    }

    pub fn delete_snapshot(&self, name: &str) -> Result<()> {
        for path in [self.bin_path(name), self.json_path(name)] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ------------------------------------------------------------------
    // Ledger state
    // ------------------------------------------------------------------

    pub fn save_ledger(&self, name: &str, state: &LedgerState) -> Result<()> {
        self.save_snapshot(name, state)?;
        log::info!(
            "ledger saved: {} users, {} events",
            state.sessions.user_count(),
            state.events.len()
        );
        Ok(())
    }

    /// Load the ledger snapshot, or an empty ledger on first run
    pub fn load_ledger(&self, name: &str) -> Result<LedgerState> {
        match self.load_snapshot(name) {
            Ok(state) => Ok(state),
            Err(StorageError::SnapshotNotFound(_)) => {
                log::info!("no snapshot {} in {}, starting fresh", name, self.data_dir.display());
                Ok(LedgerState::default())
            }
            Err(e) => Err(e),
        }
    }
}

/// Write to a sibling temp file, then rename over the target
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
