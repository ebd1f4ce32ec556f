//! Save - A saving object: one JSON file per slot made up of sections

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;
use tracing::{info, info_span, warn};

use crate::game::{GameState, Host};
use crate::section::{json_type_name, SectionHandle};
use crate::{Error, Result};

/// Anything the save manager can load, save and unload
///
/// [`Save`] is the standard implementation. The manager only talks to
/// saving objects through this trait.
pub trait SavingObject {
    fn host(&self) -> &Host;

    /// Must be unique among registered saving objects; it names the save file
    fn identifier(&self) -> &str;

    /// Whether this object takes part in load and save sweeps
    fn enabled(&self) -> bool;

    fn loaded(&self) -> bool;

    /// The save GUID stored with the loaded data
    fn data_guid(&self) -> Option<u64>;

    /// The game tick stored with the loaded data
    fn data_game_tick(&self) -> Option<u64>;

    /// Load a save file, falling back to defaults if it doesn't exist or
    /// can't be read. Returns false if anything went wrong.
    fn load(&mut self, file_path: &Path, game: &dyn GameState) -> bool;

    fn load_default(&mut self);

    /// Write the loaded data to `file_path`
    ///
    /// `Ok(false)` means the file was written but some section failed. An
    /// error means nothing usable was written.
    fn save(&mut self, file_path: &Path, game: &dyn GameState) -> Result<bool>;

    fn unload(&mut self) -> Result<()>;

    fn save_file_name(&self) -> String {
        format!("{}.json", self.identifier())
    }
}

/// The standard saving object
pub struct Save {
    host: Host,
    identifier: String,
    enabled: bool,
    sections: Vec<SectionHandle>,

    loaded: bool,
    loaded_default: Option<bool>,
    loaded_file_existed: Option<bool>,
    current_file_path: Option<PathBuf>,

    save_data: Map<String, Value>,
    sections_data: Map<String, Value>,
}

impl Save {
    pub fn new(host: Host, identifier: impl Into<String>) -> Self {
        Self {
            host,
            identifier: identifier.into(),
            enabled: true,
            sections: Vec::new(),
            loaded: false,
            loaded_default: None,
            loaded_file_existed: None,
            current_file_path: None,
            save_data: Map::new(),
            sections_data: Map::new(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn sections(&self) -> &[SectionHandle] {
        &self.sections
    }

    /// Attach a section. Two sections with one identifier are allowed but
    /// only produce a warning, as they will share the same stored data.
    pub fn register_section(&mut self, section: SectionHandle) {
        if let Ok(new_section) = section.try_borrow() {
            let duplicate = self.sections.iter().any(|existing| {
                existing
                    .try_borrow()
                    .map(|existing| existing.identifier() == new_section.identifier())
                    .unwrap_or(false)
            });

            if duplicate {
                warn!(
                    identifier = %self.identifier,
                    section = new_section.identifier(),
                    "Multiple section handlers with the same identifier"
                );
            }
        }

        self.sections.push(section);
    }

    pub fn unregister_section(&mut self, section: &SectionHandle) {
        self.sections
            .retain(|existing| !Rc::ptr_eq(existing, section));
    }

    /// Whether the last load fell back to defaults
    pub fn loaded_default(&self) -> Option<bool> {
        self.loaded_default
    }

    /// Whether the file existed the last time a load was attempted
    pub fn loaded_file_existed(&self) -> Option<bool> {
        self.loaded_file_existed
    }

    /// The file last loaded from or saved to
    pub fn current_file_path(&self) -> Option<&Path> {
        self.current_file_path.as_deref()
    }

    pub fn data_host_namespace(&self) -> Option<String> {
        self.data_string("HostNamespace")
    }

    pub fn data_host_version(&self) -> Option<String> {
        self.data_string("HostVersion")
    }

    pub fn data_game_version(&self) -> Option<String> {
        self.data_string("GameVersion")
    }

    /// A copy of one section's loaded data, as it was in the file
    pub fn section_data(&self, section_identifier: &str) -> Option<Value> {
        if !self.loaded {
            return None;
        }

        self.sections_data.get(section_identifier).cloned()
    }

    fn data_string(&self, key: &str) -> Option<String> {
        if !self.loaded {
            return None;
        }

        self.save_data
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn data_integer(&self, key: &str) -> Option<u64> {
        if !self.loaded {
            return None;
        }

        self.save_data.get(key).and_then(Value::as_u64)
    }

    fn read_file(file_path: &Path) -> Result<Map<String, Value>> {
        let text = fs::read_to_string(file_path)?;

        match serde_json::from_str::<Value>(&text)? {
            Value::Object(root) => Ok(root),
            other => Err(Error::IncorrectType {
                location: format!("Root (found {})", json_type_name(&other)),
                expected: "object",
            }),
        }
    }

    fn apply_loaded(&mut self, mut root: Map<String, Value>, game: &dyn GameState) -> Result<bool> {
        let sections_data = match root.remove("Sections") {
            Some(Value::Object(sections)) => sections,
            other => {
                return Err(Error::IncorrectType {
                    location: format!(
                        "Root[Sections] (found {})",
                        other.as_ref().map(json_type_name).unwrap_or("nothing")
                    ),
                    expected: "object",
                })
            }
        };

        self.save_data = root;
        self.sections_data = sections_data;
        self.loaded = true;

        let mut successful = true;

        for section in &self.sections {
            let Ok(mut section) = section.try_borrow_mut() else {
                warn!(identifier = %self.identifier, "Failed to load data to a section that is already in use");
                successful = false;
                continue;
            };

            let data = match self.sections_data.get(section.identifier()) {
                None | Some(Value::Null) => continue,
                Some(data) => data.clone(),
            };

            if !section.load(data) {
                successful = false;
            }
        }

        let data_guid = self.data_guid();
        if data_guid != Some(game.save_guid()) {
            warn!(
                identifier = %self.identifier,
                data_guid = ?data_guid,
                game_guid = game.save_guid(),
                "The loaded data's GUID does not match the game's saved GUID"
            );
        }

        let data_game_tick = self.data_game_tick();
        if data_game_tick != Some(game.game_tick()) {
            warn!(
                identifier = %self.identifier,
                data_game_tick = ?data_game_tick,
                game_game_tick = game.game_tick(),
                "The loaded data's game tick does not match the game's saved game tick"
            );
        }

        Ok(successful)
    }

    fn collect_save_data(&mut self, game: &dyn GameState) -> (bool, Value) {
        let mut successful = true;
        let mut sections_data = Map::new();

        for section in &self.sections {
            let Ok(mut section) = section.try_borrow_mut() else {
                warn!(identifier = %self.identifier, "Failed to get data from a section that is already in use");
                successful = false;
                continue;
            };

            let (section_successful, data) = section.save();
            if !section_successful {
                successful = false;
            }

            sections_data.insert(section.identifier().to_string(), data);
        }

        let save_data = json!({
            "GUID": game.save_guid(),
            "HostNamespace": self.host.namespace,
            "HostVersion": self.host.version,
            "GameVersion": game.game_version(),
            "GameTick": game.game_tick(),
            "Sections": sections_data,
        });

        (successful, save_data)
    }
}

impl SavingObject for Save {
    fn host(&self) -> &Host {
        &self.host
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn loaded(&self) -> bool {
        self.loaded
    }

    fn data_guid(&self) -> Option<u64> {
        self.data_integer("GUID")
    }

    fn data_game_tick(&self) -> Option<u64> {
        self.data_integer("GameTick")
    }

    fn load(&mut self, file_path: &Path, game: &dyn GameState) -> bool {
        let _span = info_span!("load", identifier = %self.identifier, host = %self.host.namespace).entered();
        let started = Instant::now();

        info!(path = %file_path.display(), "Load operation starting in a saving object");

        if !self.enabled {
            warn!("Triggered load operation in a disabled saving object");
        }

        if self.loaded {
            self.unload_sections();
        }

        if !file_path.exists() {
            self.load_default();
            self.loaded_file_existed = Some(false);
            self.current_file_path = Some(file_path.to_path_buf());

            info!(elapsed = ?started.elapsed(), "No save file exists, loaded the default");
            return true;
        }

        let result = Self::read_file(file_path).and_then(|root| self.apply_loaded(root, game));

        self.loaded_file_existed = Some(true);
        self.current_file_path = Some(file_path.to_path_buf());

        match result {
            Ok(true) => {
                self.loaded_default = Some(false);
                info!(elapsed = ?started.elapsed(), "Load operation in a saving object finished without issue");
                true
            }
            Ok(false) => {
                self.loaded_default = Some(false);
                warn!(elapsed = ?started.elapsed(), "Load operation in a saving object at least partially failed");
                false
            }
            Err(e) => {
                warn!(
                    error = %e,
                    elapsed = ?started.elapsed(),
                    "Load operation in a saving object aborted, falling back to the default"
                );
                self.load_default();
                self.loaded_file_existed = Some(true);
                self.current_file_path = Some(file_path.to_path_buf());
                false
            }
        }
    }

    fn load_default(&mut self) {
        if !self.enabled {
            warn!(identifier = %self.identifier, "Triggered load default operation in a disabled saving object");
        }

        if self.loaded {
            self.unload_sections();
        }

        self.save_data = Map::new();
        self.sections_data = Map::new();
        self.loaded = true;
        self.loaded_default = Some(true);

        info!(identifier = %self.identifier, "Loaded the default in a saving object");
    }

    fn save(&mut self, file_path: &Path, game: &dyn GameState) -> Result<bool> {
        let _span = info_span!("save", identifier = %self.identifier, host = %self.host.namespace).entered();
        let started = Instant::now();

        info!(path = %file_path.display(), "Save operation starting in a saving object");

        if !self.enabled {
            warn!("Triggered save operation in a disabled saving object");
        }

        self.current_file_path = Some(file_path.to_path_buf());

        let (successful, save_data) = self.collect_save_data(game);
        let text = encode_pretty(&save_data)?;

        if let Some(directory) = file_path.parent() {
            fs::create_dir_all(directory)?;
        }

        let staging_path = file_path.with_extension("json.tmp");
        fs::write(&staging_path, text)?;
        fs::rename(&staging_path, file_path)?;

        if successful {
            info!(elapsed = ?started.elapsed(), "Save operation in a saving object finished without issue");
        } else {
            warn!(elapsed = ?started.elapsed(), "Save operation in a saving object at least partially failed");
        }

        Ok(successful)
    }

    fn unload(&mut self) -> Result<()> {
        if !self.loaded {
            return Ok(());
        }

        let _span = info_span!("unload", identifier = %self.identifier, host = %self.host.namespace).entered();

        self.unload_sections();
        info!("Unload operation in a saving object finished");

        Ok(())
    }
}

impl Save {
    fn unload_sections(&mut self) {
        for section in &self.sections {
            match section.try_borrow_mut() {
                Ok(mut section) => section.reset(),
                Err(_) => {
                    warn!(identifier = %self.identifier, "Failed to reset a section that is already in use")
                }
            }
        }

        self.save_data = Map::new();
        self.sections_data = Map::new();
        self.loaded = false;
        self.loaded_default = None;
        self.loaded_file_existed = None;
        self.current_file_path = None;
    }
}

/// Tab-indented JSON with sorted keys
pub(crate) fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    String::from_utf8(buffer).map_err(|e| {
        Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
