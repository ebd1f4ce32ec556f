use serde_json::json;
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

use savekeeper::section::handle;
use savekeeper::{
    GameSnapshot, Host, Lifecycle, Save, SaveConfig, SaveManager, SlotId, StandardSection,
};

fn lifecycle(temp: &TempDir) -> (Lifecycle, Rc<RefCell<StandardSection>>) {
    let mut manager = SaveManager::new(
        SaveConfig::default()
            .with_saves_path(temp.path().join("saves"))
            .with_temporary_path(temp.path().join("temp")),
    );

    let section = Rc::new(RefCell::new(StandardSection::new("Main")));
    let mut save = Save::new(Host::new("Test.Mod", "1.0.0"), "Tracking");
    save.register_section(handle(&section));
    manager.register_saving_object(Box::new(save));

    (Lifecycle::new(manager), section)
}

#[test]
fn a_play_session_round_trips_through_the_permanent_save() {
    let temp = TempDir::new().unwrap();
    let (mut lifecycle, section) = lifecycle(&temp);
    let slot = SlotId::from(1);
    let game = GameSnapshot::new(slot, 99, 10).with_name("Household");

    let report = lifecycle.on_zone_load(&game);
    assert!(report.is_success());
    section.borrow_mut().set_value("visits", &1).unwrap();

    // A plain zone save only touches the active directory
    let report = lifecycle.on_zone_save(Some(&game)).unwrap();
    assert!(report.is_success());
    assert!(report.commit.is_none());
    assert!(!lifecycle.manager().paths().save_directory(slot).exists());

    lifecycle.request_commit();
    let report = lifecycle.on_zone_save(Some(&game)).unwrap();
    assert!(report.is_success());

    let save_directory = lifecycle.manager().paths().save_directory(slot);
    assert!(save_directory.join("Tracking.json").exists());
    let meta = lifecycle.manager().get_save_meta_data(&save_directory).unwrap();
    assert_eq!(meta.name, "Household");
    assert_eq!(meta.guid, 99);

    let unload = lifecycle.on_zone_teardown();
    assert!(unload.is_success());
    assert!(section.borrow().is_empty());

    lifecycle.on_enter_main_menu();
    assert_eq!(lifecycle.manager().loaded_slot_id(), None);
    assert!(!lifecycle.manager().paths().active_directory(slot).exists());

    let report = lifecycle.on_zone_load(&game);
    assert!(report.is_success());
    assert_eq!(section.borrow().get_value("visits"), Some(json!(1)));
}

#[test]
fn overriding_another_slot_absorbs_the_hosts_extra_backup() {
    let temp = TempDir::new().unwrap();
    let (mut lifecycle, section) = lifecycle(&temp);
    let loaded = SlotId::from(1);
    let target = SlotId::from(2);
    let paths = lifecycle.manager().paths().clone();

    // The target slot already holds a committed save from another lineage
    let old_save = paths.save_directory(target);
    fs::create_dir_all(&old_save).unwrap();
    fs::write(old_save.join("marker.txt"), "old").unwrap();
    for index in 0..paths.maximum_backups() {
        fs::write(paths.game_backup_file(target, index).unwrap(), "").unwrap();
    }

    lifecycle.on_zone_load(&GameSnapshot::new(loaded, 1, 1));
    section.borrow_mut().set_value("k", "new").unwrap();

    // The host has just written the target slot's save file
    fs::write(paths.game_save_file(target), "").unwrap();

    lifecycle.request_commit();
    let report = lifecycle
        .on_zone_save(Some(&GameSnapshot::new(target, 2, 2)))
        .unwrap();

    assert!(report.is_success());
    assert!(paths.save_directory(target).join("Tracking.json").exists());
    assert!(!paths.save_directory(target).join("marker.txt").exists());
    for index in 0..2 {
        let backup = paths.backup_directory(target, index).unwrap();
        assert_eq!(fs::read_to_string(backup.join("marker.txt")).unwrap(), "old");
    }
    assert!(!paths.backup_directory(target, 2).unwrap().exists());
    assert_eq!(lifecycle.manager().loaded_slot_id(), Some(target));
    assert!(!temp.path().join("temp").exists());
}
