//! Backup - Rotating mod save directories in step with the host's backups
//!
//! The host keeps `Slot_<hex8>.save.ver0` through `.ver4` and shifts every
//! backup up one number each time a slot is saved to, dropping the oldest.
//! Mod save directories follow the same numbering so that `Slot_<hex8>_NO.verN`
//! always pairs with the host's `.save.verN`.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::filesystem::{close_directory, copy_directory, move_directory, remove_directory_tree};
use crate::slot::{SlotId, SlotPaths};
use crate::Result;

/// Delete mod backups whose paired host backup no longer exists
pub fn verify_backup_directories(paths: &SlotPaths, slot: SlotId) -> Result<()> {
    for backup_index in 0..paths.maximum_backups() {
        let game_backup_file = paths.game_backup_file(slot, backup_index)?;
        let backup_directory = paths.backup_directory(slot, backup_index)?;

        if !game_backup_file.exists() && backup_directory.exists() {
            debug!(
                slot = %slot,
                backup_index,
                "Removing a mod backup without a matching game backup"
            );

            remove_directory_tree(&backup_directory, true, true)?;

            if let Some(parent) = backup_directory.parent() {
                close_directory(parent, true)?;
            }
        }
    }

    Ok(())
}

/// Shift every backup directory for a slot up one index
///
/// Afterwards the permanent save directory has moved to backup 0, each backup
/// `N` holds what was at `N - 1`, and whatever was in the last index is gone.
pub fn shift_backup_directories(paths: &SlotPaths, slot: SlotId) -> Result<()> {
    verify_backup_directories(paths, slot)?;

    let save_directory = paths.save_directory(slot);
    let maximum_backups = paths.maximum_backups();

    if maximum_backups == 0 {
        remove_directory_tree(&save_directory, true, true)?;
        return Ok(());
    }

    for backup_index in (0..maximum_backups).rev() {
        let current = paths.backup_directory(slot, backup_index)?;

        if !current.exists() {
            continue;
        }

        if backup_index == maximum_backups - 1 {
            remove_directory_tree(&current, true, true)?;
            continue;
        }

        let next = paths.backup_directory(slot, backup_index + 1)?;

        if next.exists() {
            remove_directory_tree(&next, true, true)?;
        }

        if let Some(parent) = next.parent() {
            fs::create_dir_all(parent)?;
        }

        move_directory(&current, &next)?;
    }

    if save_directory.exists() {
        let first_backup = paths.backup_directory(slot, 0)?;

        debug_assert!(!first_backup.exists());

        if let Some(parent) = first_backup.parent() {
            fs::create_dir_all(parent)?;
        }

        move_directory(&save_directory, &first_backup)?;
    }

    if let Some(parent) = save_directory.parent() {
        close_directory(parent, true)?;
    }

    Ok(())
}

/// Absorb the extra backup the host makes when overriding a save with a
/// different GUID
///
/// The host writes the overridden slot twice in that case, so its backups
/// shift one extra time. This shifts the mod backups once while keeping the
/// current save directory in place.
pub fn do_override_backup_commit(
    paths: &SlotPaths,
    temporary_path: &Path,
    slot: SlotId,
) -> Result<()> {
    info!(slot = %slot, "Doing an override backup commit");

    let save_directory = paths.save_directory(slot);

    if !save_directory.exists() {
        return shift_backup_directories(paths, slot);
    }

    let staging_root = temporary_path.join("Saves");
    fs::create_dir_all(&staging_root)?;

    let staging = tempfile::Builder::new()
        .prefix("override-")
        .tempdir_in(&staging_root)?;
    let staged_save = match save_directory.file_name() {
        Some(name) => staging.path().join(name),
        None => staging.path().join("save"),
    };

    copy_directory(&save_directory, &staged_save)?;
    shift_backup_directories(paths, slot)?;
    move_directory(&staged_save, &save_directory)?;

    staging.close()?;
    close_directory(&staging_root, true)?;
    close_directory(temporary_path, true)?;

    info!(slot = %slot, "Finished doing an override backup commit");

    Ok(())
}
