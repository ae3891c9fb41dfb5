//! Cached player store with dirty-flag sweeps, backups, and crash recovery
//!
//! Records live in a single `players.json` keyed by player id. The in-memory
//! cache is the one authoritative copy of live records; everything else in
//! the core borrows through it. Persistence is best-effort by design: a
//! failed write logs, attempts an emergency snapshot, and never interrupts
//! gameplay.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use elementum_core::PlayerId;

use crate::player::PlayerData;

const STORE_FILE: &str = "players.json";
const EMERGENCY_FILE: &str = "players.emergency.json";
const BACKUP_PREFIX: &str = "players-";

/// Why a disk read failed. Internal to the store; callers never see these
/// because every failure degrades to a default or a log line.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

type DiskMap = BTreeMap<PlayerId, PlayerData>;

/// Durable storage for [`PlayerData`] with a write-through cache
pub struct DataStore {
    file: PathBuf,
    backup_dir: PathBuf,
    max_backups: usize,
    cache: HashMap<PlayerId, PlayerData>,
}

impl DataStore {
    /// Open the store under `data_dir`, recovering from the most recent
    /// backup if the primary file is corrupt
    pub fn open(data_dir: &Path, max_backups: usize) -> Self {
        let backup_dir = data_dir.join("backups");
        if let Err(e) = fs::create_dir_all(&backup_dir) {
            warn!("Could not create data directories: {}", e);
        }

        let store = Self {
            file: data_dir.join(STORE_FILE),
            backup_dir,
            max_backups,
            cache: HashMap::new(),
        };
        store.recover_if_corrupt();
        store
    }

    /// If the primary file exists but fails to parse, restore the newest
    /// backup over it. With no usable backup the store starts empty - an
    /// operator-visible data-loss condition, logged loudly.
    fn recover_if_corrupt(&self) {
        if !self.file.exists() {
            return;
        }
        if self.read_disk().is_ok() {
            return;
        }

        warn!("Player store {:?} is corrupt, attempting backup restore", self.file);
        match self.latest_backup() {
            Some(backup) => match fs::copy(&backup, &self.file) {
                Ok(_) => info!("Restored player store from backup {:?}", backup),
                Err(e) => error!(
                    "Backup restore from {:?} failed: {}. Starting with an EMPTY store; \
                     existing player data is not loadable",
                    backup, e
                ),
            },
            None => error!(
                "No backups available for corrupt store {:?}. Starting with an EMPTY \
                 store; existing player data is not loadable",
                self.file
            ),
        }
    }

    fn read_disk(&self) -> Result<DiskMap, StoreError> {
        let json = fs::read_to_string(&self.file)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Most recent backup file, by name (names embed the timestamp)
    fn latest_backup(&self) -> Option<PathBuf> {
        let entries = fs::read_dir(&self.backup_dir).ok()?;
        let mut backups: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(BACKUP_PREFIX))
            })
            .collect();
        backups.sort();
        backups.pop()
    }

    /// Cached record for `id`, reading from disk on a miss and defaulting a
    /// fresh record when absent or unreadable
    pub fn load(&mut self, id: PlayerId) -> &PlayerData {
        self.load_mut(id)
    }

    /// Mutable access to the cached record (lazy-loads like [`load`])
    pub fn load_mut(&mut self, id: PlayerId) -> &mut PlayerData {
        if !self.cache.contains_key(&id) {
            let record = match self.read_disk() {
                Ok(mut disk) => disk.remove(&id).unwrap_or_else(|| PlayerData::new(id)),
                Err(_) => PlayerData::new(id),
            };
            self.cache.insert(id, record);
        }
        self.cache.get_mut(&id).expect("just inserted")
    }

    /// Synchronously persist one record. Re-reads the backing file first so a
    /// concurrent external edit to another player's record is not clobbered.
    /// Failures are logged and degraded to an emergency snapshot, never
    /// returned to the caller.
    pub fn save(&mut self, id: PlayerId) {
        let Some(record) = self.cache.get(&id).cloned() else {
            return;
        };

        let mut disk = match self.read_disk() {
            Ok(disk) => disk,
            Err(_) => DiskMap::new(),
        };
        disk.insert(id, record);

        match Self::write_map(&self.file, &disk) {
            Ok(()) => {
                if let Some(cached) = self.cache.get_mut(&id) {
                    cached.mark_clean();
                }
            }
            Err(e) => {
                error!("Failed to save player {}: {}", id, e);
                let emergency = self.file.with_file_name(EMERGENCY_FILE);
                match Self::write_map(&emergency, &disk) {
                    Ok(()) => warn!("Emergency snapshot written to {:?}", emergency),
                    Err(e) => error!("Emergency snapshot also failed: {}", e),
                }
            }
        }
    }

    /// Persist every dirty cached record in one pass. Returns how many were
    /// written. The runtime calls this on the autosave cadence so steady-state
    /// I/O is bounded by what actually changed.
    pub fn save_all_dirty(&mut self) -> usize {
        let dirty: Vec<PlayerId> = self
            .cache
            .iter()
            .filter(|(_, d)| d.is_dirty())
            .map(|(id, _)| *id)
            .collect();

        for id in &dirty {
            self.save(*id);
        }
        dirty.len()
    }

    /// Copy the backing file to a timestamped backup and prune to the
    /// configured retention count. Returns the backup path on success.
    pub fn create_backup(&self) -> Option<PathBuf> {
        if !self.file.exists() {
            warn!("Nothing to back up: {:?} does not exist", self.file);
            return None;
        }

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%3f");
        let target = self.backup_dir.join(format!("{}{}.json", BACKUP_PREFIX, stamp));
        if let Err(e) = fs::copy(&self.file, &target) {
            error!("Backup to {:?} failed: {}", target, e);
            return None;
        }
        info!("Created backup {:?}", target);
        self.prune_backups();
        Some(target)
    }

    fn prune_backups(&self) {
        let Ok(entries) = fs::read_dir(&self.backup_dir) else {
            return;
        };
        let mut backups: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(BACKUP_PREFIX))
            })
            .collect();
        backups.sort();

        while backups.len() > self.max_backups {
            let oldest = backups.remove(0);
            if let Err(e) = fs::remove_file(&oldest) {
                warn!("Could not prune old backup {:?}: {}", oldest, e);
            }
        }
    }

    fn write_map(path: &Path, map: &DiskMap) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(map)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Number of records currently cached
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Number of cached records with unsaved changes
    pub fn dirty_count(&self) -> usize {
        self.cache.values().filter(|d| d.is_dirty()).count()
    }
}
