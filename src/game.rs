//! Game - What the host game tells us about the save it has loaded

use crate::slot::SlotId;

/// Read-only view of the host's current save slot
///
/// Implemented by the host integration. Values are read at the moment an
/// operation needs them and are never written back.
pub trait GameState {
    /// The numeric slot the host has loaded or is saving to
    fn slot_id(&self) -> SlotId;

    /// The player-facing name of the save
    fn slot_name(&self) -> String;

    /// The random id the host gives a save lineage when it's first created
    fn save_guid(&self) -> u64;

    /// The in-game time counter stored in the host's save
    fn game_tick(&self) -> u64;

    fn game_version(&self) -> String;
}

/// A fixed copy of the host's save slot values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub slot_id: SlotId,
    pub slot_name: String,
    pub save_guid: u64,
    pub game_tick: u64,
    pub game_version: String,
}

impl GameSnapshot {
    pub fn new(slot_id: SlotId, save_guid: u64, game_tick: u64) -> Self {
        Self {
            slot_id,
            slot_name: String::new(),
            save_guid,
            game_tick,
            game_version: String::new(),
        }
    }

    pub fn with_name(mut self, slot_name: impl Into<String>) -> Self {
        self.slot_name = slot_name.into();
        self
    }

    pub fn with_game_version(mut self, game_version: impl Into<String>) -> Self {
        self.game_version = game_version.into();
        self
    }
}

impl GameState for GameSnapshot {
    fn slot_id(&self) -> SlotId {
        self.slot_id
    }

    fn slot_name(&self) -> String {
        self.slot_name.clone()
    }

    fn save_guid(&self) -> u64 {
        self.save_guid
    }

    fn game_tick(&self) -> u64 {
        self.game_tick
    }

    fn game_version(&self) -> String {
        self.game_version.clone()
    }
}

/// The mod that owns a saving object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    pub namespace: String,
    pub version: String,
}

impl Host {
    pub fn new(namespace: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            version: version.into(),
        }
    }
}
