//! MetaData - The `Meta_Data.json` envelope written into every save directory

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::game::GameState;
use crate::save::encode_pretty;
use crate::{Result, META_DATA_FILE_NAME};

/// How well a mod save directory lines up with the save the host has loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMatch {
    Match,
    /// A different save lineage entirely
    MismatchedGuid,
    /// Same lineage, but an earlier or later save of it
    MismatchedGameTick,
}

#[derive(Debug, Serialize, Deserialize)]
struct MetaDataFile {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "GUID")]
    guid: u64,
    #[serde(rename = "GameTick")]
    game_tick: u64,
}

/// The meta data of one mod save directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModSaveMetaData {
    pub directory: PathBuf,
    pub name: String,
    pub guid: u64,
    pub game_tick: u64,
}

impl ModSaveMetaData {
    pub fn matches_game_save(&self, game: &dyn GameState) -> SaveMatch {
        if self.guid != game.save_guid() {
            return SaveMatch::MismatchedGuid;
        }

        if self.game_tick != game.game_tick() {
            return SaveMatch::MismatchedGameTick;
        }

        SaveMatch::Match
    }
}

/// Read a save directory's meta data, or `None` if it's missing or malformed
pub fn get_save_meta_data(directory: &Path) -> Option<ModSaveMetaData> {
    let path = directory.join(META_DATA_FILE_NAME);

    if !path.exists() {
        return None;
    }

    let parsed = fs::read_to_string(&path)
        .map_err(crate::Error::from)
        .and_then(|text| serde_json::from_str::<MetaDataFile>(&text).map_err(Into::into));

    match parsed {
        Ok(file) => Some(ModSaveMetaData {
            directory: directory.to_path_buf(),
            name: file.name,
            guid: file.guid,
            game_tick: file.game_tick,
        }),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Unreadable save meta data");
            None
        }
    }
}

/// Write the host's current save details into a directory's meta data file
pub fn write_save_meta_data(directory: &Path, game: &dyn GameState) -> Result<()> {
    let file = MetaDataFile {
        name: game.slot_name(),
        guid: game.save_guid(),
        game_tick: game.game_tick(),
    };

    fs::create_dir_all(directory)?;
    fs::write(directory.join(META_DATA_FILE_NAME), encode_pretty(&file)?)?;

    Ok(())
}
