//! Slot - Slot identifiers and the directory layout built from them

use crate::{Error, Result, SAVE_DIRECTORY_REGEX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A host save slot number
///
/// Slot ids are never negative. They render as eight lowercase, zero padded
/// hexadecimal digits in every file and directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(u32);

impl SlotId {
    /// Validate a raw slot number coming from the host
    pub fn new(slot_id: i64) -> Result<Self> {
        if slot_id < 0 {
            return Err(Error::NegativeSlotId(slot_id));
        }

        u32::try_from(slot_id)
            .map(Self)
            .map_err(|_| Error::SlotIdOutOfRange(slot_id))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// The eight character hexadecimal form used in paths
    pub fn to_hex_string(self) -> String {
        format!("{:08x}", self.0)
    }

    /// Parse the eight character hexadecimal form back into a slot id
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != 8 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidSlotIdString(hex.to_string()));
        }

        u32::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|_| Error::InvalidSlotIdString(hex.to_string()))
    }
}

impl From<u32> for SlotId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for SlotId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render a raw slot number, rejecting negative values
pub fn slot_id_string(slot_id: i64) -> Result<String> {
    SlotId::new(slot_id).map(SlotId::to_hex_string)
}

/// Resolves every save path for a slot under one saves directory
#[derive(Debug, Clone)]
pub struct SlotPaths {
    saves_path: PathBuf,
    maximum_backups: usize,
}

impl SlotPaths {
    pub fn new(saves_path: impl Into<PathBuf>, maximum_backups: usize) -> Self {
        Self {
            saves_path: saves_path.into(),
            maximum_backups,
        }
    }

    pub fn saves_path(&self) -> &Path {
        &self.saves_path
    }

    pub fn maximum_backups(&self) -> usize {
        self.maximum_backups
    }

    /// The permanent mod save directory, `Slot_<hex8>_NO`
    pub fn save_directory(&self, slot: SlotId) -> PathBuf {
        self.saves_path.join(save_directory_name(slot))
    }

    /// The staging copy used while the slot is loaded, `Slot_<hex8>_NO_Active`
    pub fn active_directory(&self, slot: SlotId) -> PathBuf {
        self.saves_path
            .join(format!("{}_Active", save_directory_name(slot)))
    }

    /// A backup of the mod save directory, `Slot_<hex8>_NO.ver<N>`
    pub fn backup_directory(&self, slot: SlotId, backup_index: usize) -> Result<PathBuf> {
        self.check_backup_index(backup_index)?;

        Ok(self
            .saves_path
            .join(format!("{}.ver{}", save_directory_name(slot), backup_index)))
    }

    /// The host's own save file for the slot. Only ever checked for existence.
    pub fn game_save_file(&self, slot: SlotId) -> PathBuf {
        self.saves_path
            .join(format!("Slot_{}.save", slot.to_hex_string()))
    }

    /// The host's own backup file for the slot. Only ever checked for existence.
    pub fn game_backup_file(&self, slot: SlotId, backup_index: usize) -> Result<PathBuf> {
        self.check_backup_index(backup_index)?;

        Ok(self.saves_path.join(format!(
            "Slot_{}.save.ver{}",
            slot.to_hex_string(),
            backup_index
        )))
    }

    fn check_backup_index(&self, backup_index: usize) -> Result<()> {
        if backup_index > self.maximum_backups {
            return Err(Error::BackupIndexOutOfRange {
                index: backup_index,
                maximum: self.maximum_backups,
            });
        }

        Ok(())
    }
}

fn save_directory_name(slot: SlotId) -> String {
    format!("Slot_{}_NO", slot.to_hex_string())
}

/// Whether a name or path names a permanent mod save directory
pub fn is_save_directory(save_directory: impl AsRef<Path>) -> bool {
    base_name(save_directory.as_ref())
        .map(|name| SAVE_DIRECTORY_REGEX.is_match(&name))
        .unwrap_or(false)
}

/// The slot a permanent mod save directory belongs to
pub fn save_directory_slot(save_directory: impl AsRef<Path>) -> Option<SlotId> {
    let name = base_name(save_directory.as_ref())?;
    let captures = SAVE_DIRECTORY_REGEX.captures(&name)?;
    let hex = captures.get(1)?.as_str().to_lowercase();

    SlotId::from_hex(&hex).ok()
}

fn base_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
}
