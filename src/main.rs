//! Savekeeper CLI - Inspect and maintain mod save directories

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use savekeeper::slot::SlotPaths;
use savekeeper::{SaveConfig, SaveManager, SlotId};

#[derive(Parser)]
#[command(name = "savekeeper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the save slots
    #[arg(long, global = true)]
    saves_path: Option<PathBuf>,

    /// Directory for temporary copies
    #[arg(long, global = true)]
    temp_path: Option<PathBuf>,

    /// Number of backups kept per slot
    #[arg(long, global = true)]
    max_backups: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the directory names used for a slot
    Slot {
        /// Slot id
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },

    /// List every directory in the saves path
    List,

    /// Show the meta data of a save directory
    Meta {
        /// Save directory
        directory: PathBuf,
    },

    /// Show which backups exist for a slot
    Backups {
        /// Slot id
        #[arg(allow_negative_numbers = true)]
        slot: i64,
    },

    /// Shift a slot's backups up by one
    Rotate {
        /// Slot id
        #[arg(allow_negative_numbers = true)]
        slot: i64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> savekeeper::Result<()> {
    let mut config = SaveConfig::from_env()?;

    if let Some(saves_path) = cli.saves_path {
        config = config.with_saves_path(saves_path);
    }
    if let Some(temp_path) = cli.temp_path {
        config = config.with_temporary_path(temp_path);
    }
    if let Some(max_backups) = cli.max_backups {
        config = config.with_maximum_backups(max_backups);
    }

    let manager = SaveManager::new(config);

    match cli.command {
        Commands::Slot { id } => show_slot(manager.paths(), SlotId::new(id)?),
        Commands::List => list(&manager),
        Commands::Meta { directory } => {
            show_meta(&manager, &directory);
            Ok(())
        }
        Commands::Backups { slot } => show_backups(manager.paths(), SlotId::new(slot)?),
        Commands::Rotate { slot } => {
            let slot = SlotId::new(slot)?;
            manager.shift_backup_directories(slot)?;
            println!("Rotated backups for slot {}", slot);
            Ok(())
        }
    }
}

fn show_slot(paths: &SlotPaths, slot: SlotId) -> savekeeper::Result<()> {
    println!("Slot:      {} ({})", slot, slot.to_hex_string());
    println!("Save:      {}", file_name(&paths.save_directory(slot)));
    println!("Active:    {}", file_name(&paths.active_directory(slot)));

    for index in 0..paths.maximum_backups() {
        println!("Backup {}:  {}", index, file_name(&paths.backup_directory(slot, index)?));
    }

    Ok(())
}

fn list(manager: &SaveManager) -> savekeeper::Result<()> {
    let listings = manager.list_save_directories()?;

    if listings.is_empty() {
        println!("No save directories in {}", manager.paths().saves_path().display());
        return Ok(());
    }

    for listing in listings {
        let slot = listing
            .slot
            .map(|slot| slot.to_string())
            .unwrap_or_else(|| "-".to_string());

        match listing.meta_data {
            Some(meta) => println!(
                "{:<28} slot {:<10} {} (guid {}, tick {})",
                file_name(&listing.path),
                slot,
                meta.name,
                meta.guid,
                meta.game_tick
            ),
            None => println!("{:<28} slot {:<10} (no meta data)", file_name(&listing.path), slot),
        }
    }

    Ok(())
}

fn show_meta(manager: &SaveManager, directory: &std::path::Path) {
    match manager.get_save_meta_data(directory) {
        Some(meta) => {
            println!("Name:      {}", meta.name);
            println!("GUID:      {}", meta.guid);
            println!("Game tick: {}", meta.game_tick);
        }
        None => println!("No meta data in {}", directory.display()),
    }
}

fn show_backups(paths: &SlotPaths, slot: SlotId) -> savekeeper::Result<()> {
    println!("Slot {} save directory: {}", slot, exists(&paths.save_directory(slot)));

    for index in 0..paths.maximum_backups() {
        println!(
            "Backup {}: mod {}, game {}",
            index,
            exists(&paths.backup_directory(slot, index)?),
            exists(&paths.game_backup_file(slot, index)?)
        );
    }

    Ok(())
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn exists(path: &std::path::Path) -> &'static str {
    if path.exists() {
        "present"
    } else {
        "missing"
    }
}
