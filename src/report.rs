//! Report - What a load, save or unload sweep over every saving object found

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::slot::SlotId;

/// Something the user should be told about once a sweep is over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "identifiers", rename_all = "snake_case")]
pub enum Notification {
    LoadFailure,
    SaveFailure,
    CommitFailure,
    ModLoadFailure(Vec<String>),
    ModSaveFailure(Vec<String>),
    ModUnloadFailure(Vec<String>),
    MismatchedGuid(Vec<String>),
    MismatchedGameTick(Vec<String>),
}

impl Notification {
    /// Mismatch warnings are informational; the data is still used
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Notification::MismatchedGuid(_) | Notification::MismatchedGameTick(_)
        )
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::LoadFailure => write!(f, "failed to activate the save slot"),
            Notification::SaveFailure => write!(f, "failed to prepare the save slot"),
            Notification::CommitFailure => write!(f, "failed to commit the save slot"),
            Notification::ModLoadFailure(ids) => write!(f, "failed to load: {}", ids.join(", ")),
            Notification::ModSaveFailure(ids) => write!(f, "failed to save: {}", ids.join(", ")),
            Notification::ModUnloadFailure(ids) => {
                write!(f, "failed to unload: {}", ids.join(", "))
            }
            Notification::MismatchedGuid(ids) => {
                write!(f, "data from a different save: {}", ids.join(", "))
            }
            Notification::MismatchedGameTick(ids) => {
                write!(f, "data from an earlier or later save: {}", ids.join(", "))
            }
        }
    }
}

/// Result of loading a slot into every saving object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub slot: Option<SlotId>,
    /// The slot's directory could not be activated
    pub activation_failed: bool,
    pub failed: Vec<String>,
    pub mismatched_guid: Vec<String>,
    pub mismatched_game_tick: Vec<String>,
}

impl LoadReport {
    pub fn is_success(&self) -> bool {
        !self.activation_failed && self.failed.is_empty()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        let mut notifications = Vec::new();

        if self.activation_failed {
            notifications.push(Notification::LoadFailure);
        }
        if !self.failed.is_empty() {
            notifications.push(Notification::ModLoadFailure(self.failed.clone()));
        }
        if !self.mismatched_guid.is_empty() {
            notifications.push(Notification::MismatchedGuid(self.mismatched_guid.clone()));
        }
        if !self.mismatched_game_tick.is_empty() {
            notifications.push(Notification::MismatchedGameTick(
                self.mismatched_game_tick.clone(),
            ));
        }

        notifications
    }
}

/// Result of committing a directory to a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub slot: SlotId,
    pub directory: PathBuf,
    pub success: bool,
    /// Whether there was an active directory to copy, as opposed to only rotating backups
    pub copied: bool,
}

/// Result of saving every saving object into a slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
    pub slot: Option<SlotId>,
    /// The previously active slot could not be deactivated
    pub deactivation_failed: bool,
    pub failed: Vec<String>,
    /// Saving objects skipped because they were never loaded
    pub skipped: Vec<String>,
    pub meta_data_failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitReport>,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        !self.deactivation_failed
            && self.failed.is_empty()
            && !self.meta_data_failed
            && self.commit.as_ref().map_or(true, |commit| commit.success)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        let mut notifications = Vec::new();

        if self.deactivation_failed {
            notifications.push(Notification::SaveFailure);
        }
        if self.commit.as_ref().is_some_and(|commit| !commit.success) {
            notifications.push(Notification::CommitFailure);
        }
        if !self.failed.is_empty() {
            notifications.push(Notification::ModSaveFailure(self.failed.clone()));
        }

        notifications
    }
}

/// Result of unloading saving objects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnloadReport {
    pub unloaded: usize,
    pub failed: Vec<String>,
}

impl UnloadReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        if self.failed.is_empty() {
            return Vec::new();
        }

        vec![Notification::ModUnloadFailure(self.failed.clone())]
    }
}
