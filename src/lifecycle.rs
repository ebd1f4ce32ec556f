//! Lifecycle - Drives the save manager from the host's zone and menu events

use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::game::{GameState, Host};
use crate::manager::SaveManager;
use crate::report::{LoadReport, SaveReport, UnloadReport};
use crate::{Error, Result};

/// The host integration's entry point into saving
///
/// Each `on_*` method corresponds to one event the host raises. The host
/// calls [`Lifecycle::request_commit`] from its "save to a slot" commands so
/// the following zone save also commits the slot.
pub struct Lifecycle {
    manager: SaveManager,
    commit_next_save: bool,
}

impl Lifecycle {
    pub fn new(manager: SaveManager) -> Self {
        Self {
            manager,
            commit_next_save: false,
        }
    }

    pub fn manager(&self) -> &SaveManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SaveManager {
        &mut self.manager
    }

    pub fn into_manager(self) -> SaveManager {
        self.manager
    }

    /// Commit on the next zone save
    pub fn request_commit(&mut self) {
        self.commit_next_save = true;
    }

    pub fn commit_requested(&self) -> bool {
        self.commit_next_save
    }

    pub fn on_zone_load(&mut self, game: &dyn GameState) -> LoadReport {
        self.manager.load(game.slot_id(), None, false, game)
    }

    /// Save to the slot the host is saving to. `None` means the host isn't
    /// writing a save slot and nothing happens, though a pending commit
    /// request is still used up.
    pub fn on_zone_save(&mut self, game: Option<&dyn GameState>) -> Option<SaveReport> {
        let commit = std::mem::take(&mut self.commit_next_save);
        let game = game?;
        let slot = game.slot_id();

        if commit {
            match self.is_override_save(game) {
                Ok(true) => {
                    if let Err(e) = self.manager.do_override_backup_commit(slot) {
                        warn!(slot = %slot, error = %e, "Override backup commit failed");
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(slot = %slot, error = %e, "Failed to check if an override backup commit occurred");
                }
            }
        }

        Some(self.manager.save(slot, commit, game))
    }

    pub fn on_zone_teardown(&mut self) -> UnloadReport {
        self.manager.unload_all()
    }

    pub fn on_enter_main_menu(&mut self) {
        self.manager.prepare_for_save_change();
    }

    pub fn on_stop(&mut self) {
        self.manager.prepare_for_save_change();
    }

    /// A mod was unloaded. Its saving objects are unloaded with it unless the
    /// whole process is exiting anyway.
    pub fn on_host_unloaded(&mut self, host: &Host, exiting: bool) -> Option<UnloadReport> {
        if exiting {
            return None;
        }

        Some(self.manager.unload_with_host(host))
    }

    /// Whether the host just overwrote a slot that held a different save
    ///
    /// The host rewrites such a slot twice, and there is no direct signal for
    /// it. A save to a slot other than the loaded one, whose save file was
    /// written within the margin, is taken to be one.
    fn is_override_save(&self, game: &dyn GameState) -> Result<bool> {
        let slot = game.slot_id();

        let Some(loaded_slot) = self.manager.loaded_slot_id() else {
            return Ok(false);
        };

        let game_save_file = self.manager.paths().game_save_file(slot);

        if loaded_slot == slot || !game_save_file.exists() {
            return Ok(false);
        }

        let overriding = modified_within(&game_save_file, self.manager.config().override_backup_margin)?;

        if overriding {
            info!(slot = %slot, loaded_slot = %loaded_slot, "Detected a save overriding a different slot");
        } else {
            debug!(slot = %slot, "Game save file is older than the override margin");
        }

        Ok(overriding)
    }
}

fn modified_within(path: &Path, margin: Duration) -> Result<bool> {
    let modified: DateTime<Local> = fs::metadata(path)?.modified()?.into();
    let margin = chrono::Duration::from_std(margin).map_err(|e| Error::Config(e.to_string()))?;

    Ok(Local::now() - margin <= modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SaveConfig;
    use crate::game::GameSnapshot;
    use crate::slot::SlotId;
    use std::fs::{File, FileTimes};
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn lifecycle(temp: &TempDir) -> Lifecycle {
        Lifecycle::new(SaveManager::new(
            SaveConfig::default()
                .with_saves_path(temp.path().join("saves"))
                .with_temporary_path(temp.path().join("temp")),
        ))
    }

    fn game(slot: u32) -> GameSnapshot {
        GameSnapshot::new(SlotId::from(slot), 1, 1)
    }

    #[test]
    fn commit_request_is_used_by_one_save_only() {
        let temp = TempDir::new().unwrap();
        let mut lifecycle = lifecycle(&temp);
        lifecycle.on_zone_load(&game(1));

        lifecycle.request_commit();
        let committed = lifecycle.on_zone_save(Some(&game(1))).unwrap();
        let uncommitted = lifecycle.on_zone_save(Some(&game(1))).unwrap();

        assert!(committed.commit.is_some());
        assert!(uncommitted.commit.is_none());
        assert!(!lifecycle.commit_requested());
    }

    #[test]
    fn zone_save_without_slot_data_does_nothing_but_clears_the_request() {
        let temp = TempDir::new().unwrap();
        let mut lifecycle = lifecycle(&temp);

        lifecycle.request_commit();

        assert!(lifecycle.on_zone_save(None).is_none());
        assert!(!lifecycle.commit_requested());
        assert!(!temp.path().join("saves").exists());
    }

    #[test]
    fn recent_save_file_in_another_slot_is_an_override() {
        let temp = TempDir::new().unwrap();
        let mut lifecycle = lifecycle(&temp);
        lifecycle.on_zone_load(&game(1));

        let game_save_file = lifecycle.manager().paths().game_save_file(SlotId::from(2));
        fs::create_dir_all(game_save_file.parent().unwrap()).unwrap();
        fs::write(&game_save_file, "").unwrap();

        assert!(lifecycle.is_override_save(&game(2)).unwrap());
        assert!(!lifecycle.is_override_save(&game(1)).unwrap());
    }

    #[test]
    fn stale_save_file_is_not_an_override() {
        let temp = TempDir::new().unwrap();
        let mut lifecycle = lifecycle(&temp);
        lifecycle.on_zone_load(&game(1));

        let game_save_file = lifecycle.manager().paths().game_save_file(SlotId::from(2));
        fs::create_dir_all(game_save_file.parent().unwrap()).unwrap();
        fs::write(&game_save_file, "").unwrap();
        let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(&game_save_file)
            .unwrap()
            .set_times(FileTimes::new().set_modified(an_hour_ago))
            .unwrap();

        assert!(!lifecycle.is_override_save(&game(2)).unwrap());
    }

    #[test]
    fn nothing_loaded_is_never_an_override() {
        let temp = TempDir::new().unwrap();
        let lifecycle = lifecycle(&temp);

        assert!(!lifecycle.is_override_save(&game(2)).unwrap());
    }

    #[test]
    fn host_unload_is_skipped_while_exiting() {
        let temp = TempDir::new().unwrap();
        let mut lifecycle = lifecycle(&temp);
        let host = Host::new("Some.Mod", "1.0");

        assert!(lifecycle.on_host_unloaded(&host, true).is_none());
        assert!(lifecycle.on_host_unloaded(&host, false).is_some());
    }
}
