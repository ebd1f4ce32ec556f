//! SaveManager - Moves every registered saving object between slots
//!
//! The manager owns the slot bookkeeping: which slot's directory is staged in
//! its active copy, and which slot the loaded data came from. Saving objects
//! always read and write inside the active directory; a commit copies it back
//! to the permanent directory after rotating backups.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, info_span, warn};

use crate::backup;
use crate::config::SaveConfig;
use crate::filesystem::{copy_directory, remove_directory_tree, touch_directory};
use crate::game::{GameState, Host};
use crate::meta_data::{self, ModSaveMetaData};
use crate::report::{CommitReport, LoadReport, SaveReport, UnloadReport};
use crate::save::SavingObject;
use crate::slot::{save_directory_slot, SlotId, SlotPaths};
use crate::{Result, META_DATA_FILE_NAME};

/// One directory found in the saves path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDirectoryListing {
    pub path: PathBuf,
    /// The slot the directory belongs to, if it's named like a permanent save directory
    pub slot: Option<SlotId>,
    pub meta_data: Option<ModSaveMetaData>,
    /// Whether the loaded data came from this directory
    pub currently_loaded: bool,
}

pub struct SaveManager {
    config: SaveConfig,
    paths: SlotPaths,
    saving_objects: Vec<Box<dyn SavingObject>>,

    loaded_slot: Option<SlotId>,
    loaded_directory: Option<PathBuf>,
    active_slot: Option<SlotId>,
}

impl SaveManager {
    pub fn new(config: SaveConfig) -> Self {
        let paths = SlotPaths::new(&config.saves_path, config.maximum_backups);

        Self {
            config,
            paths,
            saving_objects: Vec::new(),
            loaded_slot: None,
            loaded_directory: None,
            active_slot: None,
        }
    }

    pub fn config(&self) -> &SaveConfig {
        &self.config
    }

    pub fn paths(&self) -> &SlotPaths {
        &self.paths
    }

    /// Register a saving object. Identifiers must be unique; a second object
    /// with a registered identifier is refused.
    pub fn register_saving_object(&mut self, saving_object: Box<dyn SavingObject>) -> bool {
        if self.saving_object(saving_object.identifier()).is_some() {
            warn!(
                identifier = saving_object.identifier(),
                "A saving object with this identifier is already registered"
            );
            return false;
        }

        self.saving_objects.push(saving_object);
        true
    }

    pub fn unregister_saving_object(&mut self, identifier: &str) -> Option<Box<dyn SavingObject>> {
        let index = self
            .saving_objects
            .iter()
            .position(|saving_object| saving_object.identifier() == identifier)?;

        Some(self.saving_objects.remove(index))
    }

    pub fn saving_object(&self, identifier: &str) -> Option<&dyn SavingObject> {
        self.saving_objects
            .iter()
            .find(|saving_object| saving_object.identifier() == identifier)
            .map(|saving_object| saving_object.as_ref())
    }

    pub fn saving_object_mut(&mut self, identifier: &str) -> Option<&mut (dyn SavingObject + 'static)> {
        self.saving_objects
            .iter_mut()
            .find(|saving_object| saving_object.identifier() == identifier)
            .map(|saving_object| saving_object.as_mut())
    }

    pub fn saving_objects(&self) -> impl Iterator<Item = &dyn SavingObject> {
        self.saving_objects.iter().map(|saving_object| saving_object.as_ref())
    }

    /// The slot the loaded data was first read from or last committed to
    pub fn loaded_slot_id(&self) -> Option<SlotId> {
        self.loaded_slot
    }

    pub fn loaded_directory_path(&self) -> Option<&Path> {
        self.loaded_directory.as_deref()
    }

    /// The slot whose active directory currently exists
    pub fn active_slot_id(&self) -> Option<SlotId> {
        self.active_slot
    }

    /// Load every enabled saving object from a slot's active directory
    ///
    /// With `loading_directory` that directory is staged into the slot instead
    /// of the slot's own permanent save. Otherwise the permanent save is only
    /// staged if a different slot is currently active.
    pub fn load(
        &mut self,
        slot: SlotId,
        loading_directory: Option<&Path>,
        mut changing_save: bool,
        game: &dyn GameState,
    ) -> LoadReport {
        let _span = info_span!("load_slot", slot = %slot).entered();
        let started = Instant::now();

        let mut report = LoadReport {
            slot: Some(slot),
            ..LoadReport::default()
        };

        info!(
            saving_objects = self.saving_objects.len(),
            directory = ?loading_directory,
            "Loading save slot"
        );

        if self.loaded_slot.is_none() || self.loaded_directory.is_none() {
            changing_save = true;
        }

        let loaded_directory = match loading_directory {
            Some(directory) => {
                changing_save = true;

                if let Err(e) = self.activate_directory_to_slot(directory, slot) {
                    error!(path = %directory.display(), error = %e, "Failed to activate a directory in the save slot");
                    report.activation_failed = true;
                }

                directory.to_path_buf()
            }
            None => {
                if self.active_slot != Some(slot) {
                    if let Err(e) = self.activate_save_slot(slot) {
                        error!(error = %e, "Failed to activate the save slot");
                        report.activation_failed = true;
                    }
                }

                self.paths.save_directory(slot)
            }
        };

        let active_directory = self.paths.active_directory(slot);

        for saving_object in self.saving_objects.iter_mut() {
            if !saving_object.enabled() {
                continue;
            }

            let file_name = saving_object.save_file_name();
            if file_name == META_DATA_FILE_NAME {
                error!(
                    identifier = saving_object.identifier(),
                    "Skipped a saving object whose file name conflicts with the meta data file"
                );
                continue;
            }

            let successful = saving_object.load(&active_directory.join(file_name), game);

            if !successful {
                report.failed.push(saving_object.identifier().to_string());
                continue;
            }

            if let Some(data_guid) = saving_object.data_guid() {
                if data_guid != game.save_guid() {
                    report.mismatched_guid.push(saving_object.identifier().to_string());
                    continue;
                }
            }

            if let Some(data_game_tick) = saving_object.data_game_tick() {
                if data_game_tick != game.game_tick() {
                    report
                        .mismatched_game_tick
                        .push(saving_object.identifier().to_string());
                }
            }
        }

        if changing_save {
            self.loaded_slot = Some(slot);
            self.loaded_directory = Some(loaded_directory);
        }

        info!(
            failed = report.failed.len(),
            elapsed = ?started.elapsed(),
            "Finished loading save slot"
        );

        report
    }

    /// Save every enabled and loaded saving object into a slot's active directory
    pub fn save(&mut self, slot: SlotId, commit: bool, game: &dyn GameState) -> SaveReport {
        let _span = info_span!("save_slot", slot = %slot, commit).entered();
        let started = Instant::now();

        let mut report = SaveReport {
            slot: Some(slot),
            ..SaveReport::default()
        };

        info!(saving_objects = self.saving_objects.len(), "Saving to save slot");

        if self.active_slot != Some(slot) {
            if let Err(e) = self.deactivate_active_slot() {
                error!(error = %e, "Failed to deactivate the active save directory");
                report.deactivation_failed = true;
            }
        }

        self.active_slot = Some(slot);

        let active_directory = self.paths.active_directory(slot);

        for saving_object in self.saving_objects.iter_mut() {
            if !saving_object.enabled() {
                continue;
            }

            if !saving_object.loaded() {
                warn!(
                    identifier = saving_object.identifier(),
                    "Went to save a saving object that wasn't loaded"
                );
                report.skipped.push(saving_object.identifier().to_string());
                continue;
            }

            let file_name = saving_object.save_file_name();
            if file_name == META_DATA_FILE_NAME {
                error!(
                    identifier = saving_object.identifier(),
                    "Skipped a saving object whose file name conflicts with the meta data file"
                );
                continue;
            }

            match saving_object.save(&active_directory.join(file_name), game) {
                Ok(true) => {}
                Ok(false) => report.failed.push(saving_object.identifier().to_string()),
                Err(e) => {
                    error!(
                        identifier = saving_object.identifier(),
                        error = %e,
                        "Failed to save a saving object"
                    );
                    report.failed.push(saving_object.identifier().to_string());
                }
            }
        }

        if let Err(e) = meta_data::write_save_meta_data(&active_directory, game) {
            error!(error = %e, "Failed to write the save meta data file");
            report.meta_data_failed = true;
        }

        if commit {
            report.commit = Some(self.commit(&active_directory, slot));
        }

        info!(
            failed = report.failed.len(),
            elapsed = ?started.elapsed(),
            "Finished saving to save slot"
        );

        report
    }

    /// Rotate a slot's backups and copy `source` into its permanent directory
    pub fn commit(&mut self, source: &Path, slot: SlotId) -> CommitReport {
        info!(slot = %slot, source = %source.display(), "Committing a directory to a save slot");

        let save_directory = self.paths.save_directory(slot);
        let mut report = CommitReport {
            slot,
            directory: save_directory.clone(),
            success: false,
            copied: false,
        };

        match self.commit_inner(source, slot, &save_directory) {
            Ok(copied) => {
                report.success = true;
                report.copied = copied;
            }
            Err(e) => {
                error!(slot = %slot, error = %e, "Failed to commit to the save slot");
                return report;
            }
        }

        self.loaded_slot = Some(slot);
        self.loaded_directory = Some(save_directory);

        info!(slot = %slot, "Finished committing to the save slot");

        report
    }

    fn commit_inner(&self, source: &Path, slot: SlotId, save_directory: &Path) -> Result<bool> {
        backup::shift_backup_directories(&self.paths, slot)?;

        if !source.exists() {
            warn!(source = %source.display(), "The commit source directory does not exist");
            return Ok(false);
        }

        copy_directory(source, save_directory)?;

        if let Err(e) = touch_directory(save_directory) {
            warn!(path = %save_directory.display(), error = %e, "Failed to stamp the committed directory's times");
        }

        Ok(true)
    }

    /// Absorb the extra backup the host makes when overriding a save with a different GUID
    pub fn do_override_backup_commit(&mut self, slot: SlotId) -> Result<()> {
        backup::do_override_backup_commit(&self.paths, &self.config.temporary_path, slot).map_err(|e| {
            error!(slot = %slot, error = %e, "Failed to do an override backup commit");
            e
        })
    }

    pub fn shift_backup_directories(&self, slot: SlotId) -> Result<()> {
        backup::shift_backup_directories(&self.paths, slot)
    }

    /// Unload every loaded saving object
    pub fn unload_all(&mut self) -> UnloadReport {
        info!(saving_objects = self.saving_objects.len(), "Unloading saving objects");
        let report = self.unload_where(|_| true);
        info!(failed = report.failed.len(), "Finished unloading saving objects");
        report
    }

    /// Unload every loaded saving object that belongs to `host`
    pub fn unload_with_host(&mut self, host: &Host) -> UnloadReport {
        info!(host = %host.namespace, "Unloading all saving objects from a host");
        let report = self.unload_where(|saving_object| saving_object.host() == host);
        info!(host = %host.namespace, failed = report.failed.len(), "Finished unloading saving objects from a host");
        report
    }

    fn unload_where(&mut self, mut select: impl FnMut(&dyn SavingObject) -> bool) -> UnloadReport {
        let mut report = UnloadReport::default();

        for saving_object in self.saving_objects.iter_mut() {
            if !select(saving_object.as_ref()) || !saving_object.loaded() {
                continue;
            }

            match saving_object.unload() {
                Ok(()) => report.unloaded += 1,
                Err(e) => {
                    error!(
                        identifier = saving_object.identifier(),
                        error = %e,
                        "Failed to unload a saving object"
                    );
                    report.failed.push(saving_object.identifier().to_string());
                }
            }
        }

        report
    }

    /// Forget the loaded slot ahead of switching to another save entirely
    pub fn prepare_for_save_change(&mut self) {
        if let Err(e) = self.deactivate_active_slot() {
            error!(error = %e, "Failed to deactivate the active save directory");
        }

        self.loaded_slot = None;
        self.loaded_directory = None;
    }

    /// Stage a slot's permanent save directory in its active directory
    ///
    /// Any other active slot is deactivated first. Nothing is staged if the
    /// slot has never been committed.
    pub fn activate_save_slot(&mut self, slot: SlotId) -> Result<()> {
        let save_directory = self.paths.save_directory(slot);
        self.stage_directory(&save_directory, slot)
    }

    /// Stage an arbitrary directory in a slot's active directory
    pub fn activate_directory_to_slot(&mut self, directory: &Path, slot: SlotId) -> Result<()> {
        self.stage_directory(directory, slot)
    }

    fn stage_directory(&mut self, directory: &Path, slot: SlotId) -> Result<()> {
        self.deactivate_active_slot()?;

        let active_directory = self.paths.active_directory(slot);

        if directory == active_directory || !directory.exists() {
            return Ok(());
        }

        if let Some(parent) = active_directory.parent() {
            fs::create_dir_all(parent)?;
        }

        if active_directory.exists() {
            remove_directory_tree(&active_directory, true, true)?;
        }

        copy_directory(directory, &active_directory)?;

        self.active_slot = Some(slot);

        Ok(())
    }

    /// Delete the active directory, if any slot is active
    pub fn deactivate_active_slot(&mut self) -> Result<()> {
        if let Some(active_slot) = self.active_slot.take() {
            let active_directory = self.paths.active_directory(active_slot);

            if active_directory.exists() {
                remove_directory_tree(&active_directory, true, true)?;
            }
        }

        Ok(())
    }

    pub fn get_save_meta_data(&self, directory: &Path) -> Option<ModSaveMetaData> {
        meta_data::get_save_meta_data(directory)
    }

    /// Every directory in the saves path, sorted by name
    pub fn list_save_directories(&self) -> Result<Vec<SaveDirectoryListing>> {
        let saves_path = self.paths.saves_path();

        if !saves_path.exists() {
            return Ok(Vec::new());
        }

        let mut listings = Vec::new();

        for entry in fs::read_dir(saves_path)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let currently_loaded = self
                .loaded_directory
                .as_deref()
                .is_some_and(|loaded| loaded == path);

            listings.push(SaveDirectoryListing {
                slot: save_directory_slot(&path),
                meta_data: meta_data::get_save_meta_data(&path),
                currently_loaded,
                path,
            });
        }

        listings.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameSnapshot;
    use crate::save::Save;
    use tempfile::TempDir;

    fn manager(temp: &TempDir) -> SaveManager {
        SaveManager::new(
            SaveConfig::default()
                .with_saves_path(temp.path().join("saves"))
                .with_temporary_path(temp.path().join("temp")),
        )
    }

    fn game(slot: u32) -> GameSnapshot {
        GameSnapshot::new(SlotId::from(slot), 42, 100).with_name("Test Save")
    }

    fn host() -> Host {
        Host::new("Test.Host", "1.0.0")
    }

    /// A saving object whose load or unload can be made to fail
    struct Flaky {
        host: Host,
        identifier: &'static str,
        loaded: bool,
        fail_load: bool,
        fail_unload: bool,
    }

    impl Flaky {
        fn new(identifier: &'static str) -> Self {
            Self {
                host: host(),
                identifier,
                loaded: false,
                fail_load: false,
                fail_unload: false,
            }
        }
    }

    impl SavingObject for Flaky {
        fn host(&self) -> &Host {
            &self.host
        }

        fn identifier(&self) -> &str {
            self.identifier
        }

        fn enabled(&self) -> bool {
            true
        }

        fn loaded(&self) -> bool {
            self.loaded
        }

        fn data_guid(&self) -> Option<u64> {
            None
        }

        fn data_game_tick(&self) -> Option<u64> {
            None
        }

        fn load(&mut self, _file_path: &Path, _game: &dyn GameState) -> bool {
            self.loaded = true;
            !self.fail_load
        }

        fn load_default(&mut self) {
            self.loaded = true;
        }

        fn save(&mut self, _file_path: &Path, _game: &dyn GameState) -> Result<bool> {
            Ok(true)
        }

        fn unload(&mut self) -> Result<()> {
            if self.fail_unload {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "stuck").into());
            }
            self.loaded = false;
            Ok(())
        }
    }

    fn write_permanent(manager: &SaveManager, slot: SlotId, marker: &str) {
        let directory = manager.paths().save_directory(slot);
        fs::create_dir_all(&directory).unwrap();
        fs::write(directory.join("marker.txt"), marker).unwrap();
    }

    #[test]
    fn activating_a_slot_removes_the_previous_active_directory() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        let slot_a = SlotId::from(1);
        let slot_b = SlotId::from(2);
        write_permanent(&manager, slot_a, "a");
        write_permanent(&manager, slot_b, "b");

        manager.activate_save_slot(slot_a).unwrap();
        assert!(manager.paths().active_directory(slot_a).exists());
        assert_eq!(manager.active_slot_id(), Some(slot_a));

        manager.activate_save_slot(slot_b).unwrap();

        let active_b = manager.paths().active_directory(slot_b);
        assert!(!manager.paths().active_directory(slot_a).exists());
        assert_eq!(fs::read_to_string(active_b.join("marker.txt")).unwrap(), "b");
        assert_eq!(fs::read_dir(&active_b).unwrap().count(), 1);
        assert_eq!(manager.active_slot_id(), Some(slot_b));
    }

    #[test]
    fn activating_a_slot_without_a_save_leaves_nothing_active() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);

        manager.activate_save_slot(SlotId::from(7)).unwrap();

        assert_eq!(manager.active_slot_id(), None);
        assert!(!manager.paths().active_directory(SlotId::from(7)).exists());
    }

    #[test]
    fn reloading_the_active_slot_does_not_restage_it() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        let slot = SlotId::from(1);
        write_permanent(&manager, slot, "permanent");

        manager.load(slot, None, false, &game(1));
        let active = manager.paths().active_directory(slot);
        fs::write(active.join("marker.txt"), "edited").unwrap();

        manager.load(slot, None, false, &game(1));

        assert_eq!(fs::read_to_string(active.join("marker.txt")).unwrap(), "edited");
    }

    #[test]
    fn first_load_records_the_loaded_slot() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        let slot = SlotId::from(5);

        let report = manager.load(slot, None, false, &game(5));

        assert!(report.is_success());
        assert_eq!(manager.loaded_slot_id(), Some(slot));
        assert_eq!(
            manager.loaded_directory_path(),
            Some(manager.paths().save_directory(slot).as_path())
        );

        manager.load(SlotId::from(6), None, false, &game(6));
        assert_eq!(manager.loaded_slot_id(), Some(slot));
    }

    #[test]
    fn loading_a_directory_forces_a_save_change() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        let other = temp.path().join("elsewhere");
        fs::create_dir_all(&other).unwrap();
        fs::write(other.join("marker.txt"), "elsewhere").unwrap();

        manager.load(SlotId::from(1), None, false, &game(1));
        manager.load(SlotId::from(2), Some(&other), false, &game(2));

        assert_eq!(manager.loaded_slot_id(), Some(SlotId::from(2)));
        assert_eq!(manager.loaded_directory_path(), Some(other.as_path()));
        let staged = manager.paths().active_directory(SlotId::from(2)).join("marker.txt");
        assert_eq!(fs::read_to_string(staged).unwrap(), "elsewhere");
    }

    #[test]
    fn saving_unloaded_objects_skips_them() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        manager.register_saving_object(Box::new(Save::new(host(), "Unloaded")));

        let report = manager.save(SlotId::from(1), false, &game(1));

        assert_eq!(report.skipped, vec!["Unloaded".to_string()]);
        assert!(report.failed.is_empty());
        let active = manager.paths().active_directory(SlotId::from(1));
        assert!(!active.join("Unloaded.json").exists());
        assert!(active.join(META_DATA_FILE_NAME).exists());
    }

    #[test]
    fn saving_to_a_new_slot_deactivates_the_old_one() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        write_permanent(&manager, SlotId::from(1), "one");
        manager.activate_save_slot(SlotId::from(1)).unwrap();

        manager.save(SlotId::from(2), false, &game(2));

        assert!(!manager.paths().active_directory(SlotId::from(1)).exists());
        assert_eq!(manager.active_slot_id(), Some(SlotId::from(2)));
    }

    #[test]
    fn commit_without_a_source_still_rotates() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        let slot = SlotId::from(3);
        write_permanent(&manager, slot, "old");
        fs::write(manager.paths().game_backup_file(slot, 0).unwrap(), "").unwrap();

        let report = manager.commit(&temp.path().join("missing"), slot);

        assert!(report.success);
        assert!(!report.copied);
        assert!(!manager.paths().save_directory(slot).exists());
        assert!(manager.paths().backup_directory(slot, 0).unwrap().exists());
        assert_eq!(manager.loaded_slot_id(), Some(slot));
    }

    #[test]
    fn registering_a_duplicate_identifier_is_refused() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);

        assert!(manager.register_saving_object(Box::new(Save::new(host(), "Same"))));
        assert!(!manager.register_saving_object(Box::new(Save::new(host(), "Same"))));
        assert_eq!(manager.saving_objects().count(), 1);

        assert!(manager.unregister_saving_object("Same").is_some());
        assert!(manager.saving_object("Same").is_none());
    }

    #[test]
    fn a_failed_load_is_reported_and_the_sweep_goes_on() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        let mut middle = Flaky::new("Middle");
        middle.fail_load = true;
        manager.register_saving_object(Box::new(Flaky::new("First")));
        manager.register_saving_object(Box::new(middle));
        manager.register_saving_object(Box::new(Flaky::new("Last")));

        let report = manager.load(SlotId::from(1), None, false, &game(1));

        assert!(!report.is_success());
        assert_eq!(report.failed, vec!["Middle".to_string()]);
        assert!(manager.saving_object("First").unwrap().loaded());
        assert!(manager.saving_object("Last").unwrap().loaded());
        assert_eq!(manager.loaded_slot_id(), Some(SlotId::from(1)));
    }

    #[test]
    fn a_failed_unload_is_reported_and_the_sweep_goes_on() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        let mut middle = Flaky::new("Middle");
        middle.fail_unload = true;
        manager.register_saving_object(Box::new(Flaky::new("First")));
        manager.register_saving_object(Box::new(middle));
        manager.register_saving_object(Box::new(Flaky::new("Last")));
        manager.load(SlotId::from(1), None, false, &game(1));

        let report = manager.unload_all();

        assert!(!report.is_success());
        assert_eq!(report.unloaded, 2);
        assert_eq!(report.failed, vec!["Middle".to_string()]);
        assert!(!manager.saving_object("First").unwrap().loaded());
        assert!(manager.saving_object("Middle").unwrap().loaded());
        assert!(!manager.saving_object("Last").unwrap().loaded());
    }

    #[test]
    fn unload_with_host_only_touches_that_host() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        let mut ours = Save::new(host(), "Ours");
        let mut theirs = Save::new(Host::new("Other.Host", "1.0.0"), "Theirs");
        ours.load_default();
        theirs.load_default();
        manager.register_saving_object(Box::new(ours));
        manager.register_saving_object(Box::new(theirs));

        let report = manager.unload_with_host(&host());

        assert_eq!(report.unloaded, 1);
        assert!(!manager.saving_object("Ours").unwrap().loaded());
        assert!(manager.saving_object("Theirs").unwrap().loaded());
    }

    #[test]
    fn prepare_for_save_change_forgets_everything() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        write_permanent(&manager, SlotId::from(1), "one");
        manager.load(SlotId::from(1), None, false, &game(1));

        manager.prepare_for_save_change();

        assert_eq!(manager.loaded_slot_id(), None);
        assert_eq!(manager.active_slot_id(), None);
        assert!(!manager.paths().active_directory(SlotId::from(1)).exists());
    }

    #[test]
    fn listing_is_sorted_and_marks_the_loaded_directory() {
        let temp = TempDir::new().unwrap();
        let mut manager = manager(&temp);
        write_permanent(&manager, SlotId::from(2), "two");
        write_permanent(&manager, SlotId::from(1), "one");
        meta_data::write_save_meta_data(&manager.paths().save_directory(SlotId::from(1)), &game(1))
            .unwrap();
        manager.commit(&temp.path().join("missing"), SlotId::from(9));
        manager.load(SlotId::from(2), None, true, &game(2));

        let listings = manager.list_save_directories().unwrap();
        let names: Vec<_> = listings
            .iter()
            .map(|listing| listing.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["Slot_00000001_NO", "Slot_00000002_NO", "Slot_00000002_NO_Active"]);
        assert_eq!(listings[0].meta_data.as_ref().map(|m| m.guid), Some(42));
        assert!(!listings[0].currently_loaded);
        assert!(listings[1].currently_loaded);
        assert_eq!(listings[1].slot, Some(SlotId::from(2)));
        assert_eq!(listings[2].slot, None);
    }
}
