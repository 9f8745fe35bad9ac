use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// On-disk record: `{"last_activation_timestamp": .., "activations": {address: count}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    #[serde(default)]
    pub last_activation_timestamp: i64,
    #[serde(default)]
    pub activations: BTreeMap<String, u32>,
}

/// Whether setters write the record back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Durable,
    Ephemeral,
}

/// File-backed activation clock and per-voter message ledger.
///
/// Every setter replaces the in-memory value and then rewrites the whole
/// record. In `Ephemeral` mode the write is skipped so a dry run sees the
/// same in-memory state transitions without touching disk. Single writer
/// only; concurrent processes will overwrite each other.
#[derive(Debug)]
pub struct StateStore {
    path: Option<PathBuf>,
    persistence: Persistence,
    record: StateRecord,
}

impl StateStore {
    /// Loads the record at `path`, starting empty if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P, persistence: Persistence) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let record = match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StoreError::InvalidStateFile(path.display().to_string(), e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No state file at {}, starting empty", path.display());
                StateRecord::default()
            }
            Err(e) => return Err(StoreError::IoError(e)),
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            persistence,
            record,
        })
    }

    /// Store with no backing file.
    pub fn in_memory(record: StateRecord) -> Self {
        Self {
            path: None,
            persistence: Persistence::Ephemeral,
            record,
        }
    }

    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    pub fn is_durable(&self) -> bool {
        self.persistence == Persistence::Durable && self.path.is_some()
    }

    pub fn record(&self) -> &StateRecord {
        &self.record
    }

    pub fn last_activation_timestamp(&self) -> i64 {
        self.record.last_activation_timestamp
    }

    pub fn set_last_activation_timestamp(&mut self, timestamp: i64) -> Result<(), StoreError> {
        self.record.last_activation_timestamp = timestamp;
        self.save()
    }

    pub fn activations(&self) -> &BTreeMap<String, u32> {
        &self.record.activations
    }

    pub fn activation_count(&self, address: &str) -> Option<u32> {
        self.record.activations.get(address).copied()
    }

    pub fn set_activations(&mut self, activations: BTreeMap<String, u32>) -> Result<(), StoreError> {
        self.record.activations = activations;
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = self.path.as_ref().filter(|_| self.is_durable()) else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // write-then-rename so a crash never leaves a truncated record
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.record)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
