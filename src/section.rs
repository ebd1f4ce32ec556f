//! Section - A named slice of a saving object's data

use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

use crate::{Error, Result};

/// Shared handle to a section, held both by its owner and by the saving object
pub type SectionHandle = Rc<RefCell<dyn Section>>;

/// Anything that can receive and hand back one section of a save
pub trait Section {
    /// The key this section's data is stored under in the save envelope
    fn identifier(&self) -> &str;

    /// Take in loaded data, returning false if anything had to be corrected
    /// or a load callback failed
    fn load(&mut self, data: Value) -> bool;

    /// Run save callbacks and hand back the data to write
    fn save(&mut self) -> (bool, Value);

    /// Drop all data and notify reset callbacks
    fn reset(&mut self);
}

/// Wrap a concrete section into a handle a saving object can hold
pub fn handle<S: Section + 'static>(section: &Rc<RefCell<S>>) -> SectionHandle {
    section.clone()
}

/// Take an object out of loaded section data, replacing anything else with an empty map
pub(crate) fn expect_object(data: Value, section: &str, location: &str) -> (Map<String, Value>, bool) {
    match data {
        Value::Object(map) => (map, true),
        other => {
            warn!(
                section,
                found = json_type_name(&other),
                "Incorrect type in section data at {}, expected an object",
                location
            );
            (Map::new(), false)
        }
    }
}

/// Convert a value for storage, failing if it can't be represented as JSON
pub(crate) fn encode_value<T: Serialize + ?Sized>(value: &T, location: String) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| Error::Unencodable { location, source })
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
