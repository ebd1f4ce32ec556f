//! Savekeeper - Slot-indexed save persistence for game mods
//!
//! This library keeps mod data alongside a host game's save slots. Each slot
//! gets its own directory of JSON files, staged in an active copy while the
//! slot is loaded and committed back with backups that follow the host's own
//! backup numbering.

use lazy_static::lazy_static;
use regex::Regex;

pub mod backup;
pub mod callbacks;
pub mod config;
pub mod filesystem;
pub mod game;
pub mod lifecycle;
pub mod manager;
pub mod meta_data;
pub mod report;
pub mod save;
pub mod section;
pub mod section_branched;
pub mod section_standard;
pub mod slot;

pub use callbacks::CallbackResult;
pub use config::SaveConfig;
pub use game::{GameSnapshot, GameState, Host};
pub use lifecycle::Lifecycle;
pub use manager::{SaveDirectoryListing, SaveManager};
pub use meta_data::{ModSaveMetaData, SaveMatch};
pub use report::{CommitReport, LoadReport, Notification, SaveReport, UnloadReport};
pub use save::{Save, SavingObject};
pub use section::{Section, SectionHandle};
pub use section_branched::BranchedSection;
pub use section_standard::StandardSection;
pub use slot::{SlotId, SlotPaths};

/// Default number of backup directories kept per slot, matching the host
pub const MAXIMUM_BACKUPS: usize = 5;

/// File name of the meta data envelope written into every save directory
pub const META_DATA_FILE_NAME: &str = "Meta_Data.json";

lazy_static! {
    /// Matches permanent save directory names such as `Slot_0000001a_NO`
    pub static ref SAVE_DIRECTORY_REGEX: Regex =
        Regex::new(r"(?i)^Slot_([0-9A-F]{8})_NO$").unwrap();
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Slot id cannot be less than zero: {0}")]
    NegativeSlotId(i64),

    #[error("Slot id does not fit in 32 bits: {0}")]
    SlotIdOutOfRange(i64),

    #[error("Not a slot id string: '{0}'")]
    InvalidSlotIdString(String),

    #[error("Backup index {index} must be between 0 and {maximum}")]
    BackupIndexOutOfRange { index: usize, maximum: usize },

    #[error("Incorrect type at {location}, expected {expected}")]
    IncorrectType {
        location: String,
        expected: &'static str,
    },

    #[error("Target value cannot be encoded. {location}")]
    Unencodable {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
