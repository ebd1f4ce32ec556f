//! BranchedSection - Section data split into per-entity branches

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::callbacks::{CallbackList, CallbackResult};
use crate::section::{encode_value, expect_object, json_type_name, Section};
use crate::Result;

/// Section data stored as `branch -> (key -> value)`
///
/// Branches are usually entity ids written as strings, so the same key can
/// hold a different value for every character in a save.
pub struct BranchedSection {
    identifier: String,
    data: Map<String, Value>,
    load_callbacks: CallbackList<BranchedSection>,
    save_callbacks: CallbackList<BranchedSection>,
    reset_callbacks: CallbackList<BranchedSection>,
}

impl BranchedSection {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            data: Map::new(),
            load_callbacks: CallbackList::default(),
            save_callbacks: CallbackList::default(),
            reset_callbacks: CallbackList::default(),
        }
    }

    /// A copy of the value stored under `branch` and `key`
    pub fn get_value(&self, branch: &str, key: &str) -> Option<Value> {
        self.data
            .get(branch)
            .and_then(Value::as_object)
            .and_then(|branch| branch.get(key))
            .cloned()
    }

    pub fn get_value_or(&self, branch: &str, key: &str, default: Value) -> Value {
        self.get_value(branch, key).unwrap_or(default)
    }

    /// Copies of `key` from every branch that has it
    pub fn get_all_values(&self, key: &str) -> Map<String, Value> {
        self.data
            .iter()
            .filter_map(|(branch, values)| {
                values
                    .as_object()
                    .and_then(|values| values.get(key))
                    .map(|value| (branch.clone(), value.clone()))
            })
            .collect()
    }

    /// Store a copy of `value` under `branch` and `key`, creating the branch if needed
    pub fn set<T: Serialize + ?Sized>(&mut self, branch: &str, key: &str, value: &T) -> Result<()> {
        let encoded = encode_value(value, format!("Branch: {} Key: {}.", branch, key))?;

        let branch_values = self
            .data
            .entry(branch.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if !branch_values.is_object() {
            *branch_values = Value::Object(Map::new());
        }

        if let Value::Object(values) = branch_values {
            values.insert(key.to_string(), encoded);
        }

        Ok(())
    }

    /// Store a copy of `value` under `key` in every existing branch
    pub fn set_all_branches<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let encoded = encode_value(value, format!("Key: {}.", key))?;

        for values in self.data.values_mut() {
            if let Value::Object(values) = values {
                values.insert(key.to_string(), encoded.clone());
            }
        }

        Ok(())
    }

    pub fn remove_branch(&mut self, branch: &str) -> Option<Value> {
        self.data.remove(branch)
    }

    pub fn branches(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn register_load_callback<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut BranchedSection) -> CallbackResult + 'static,
    {
        self.load_callbacks.register(name, callback);
    }

    pub fn unregister_load_callback(&mut self, name: &str) {
        self.load_callbacks.unregister(name);
    }

    pub fn register_save_callback<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut BranchedSection) -> CallbackResult + 'static,
    {
        self.save_callbacks.register(name, callback);
    }

    pub fn unregister_save_callback(&mut self, name: &str) {
        self.save_callbacks.unregister(name);
    }

    pub fn register_reset_callback<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut BranchedSection) -> CallbackResult + 'static,
    {
        self.reset_callbacks.register(name, callback);
    }

    pub fn unregister_reset_callback(&mut self, name: &str) {
        self.reset_callbacks.unregister(name);
    }

    fn run_callbacks(
        &mut self,
        kind: &str,
        select: fn(&mut Self) -> &mut CallbackList<Self>,
    ) -> bool {
        let section = self.identifier.clone();
        let mut callbacks = std::mem::take(select(self));
        let successful = callbacks.invoke(self, kind, &section);
        select(self).restore(callbacks);
        successful
    }
}

impl Section for BranchedSection {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn load(&mut self, data: Value) -> bool {
        let (mut data, mut valid) = expect_object(data, &self.identifier, "SectionData");

        data.retain(|branch, values| {
            if values.is_object() {
                return true;
            }

            warn!(
                section = %self.identifier,
                found = json_type_name(values),
                "Incorrect type in section data at SectionData[{}], expected an object",
                branch
            );
            valid = false;
            false
        });

        self.data = data;

        let callbacks_successful = self.run_callbacks("load", |s| &mut s.load_callbacks);

        valid && callbacks_successful
    }

    fn save(&mut self) -> (bool, Value) {
        let callbacks_successful = self.run_callbacks("save", |s| &mut s.save_callbacks);
        (callbacks_successful, Value::Object(self.data.clone()))
    }

    fn reset(&mut self) {
        self.data = Map::new();
        self.run_callbacks("reset", |s| &mut s.reset_callbacks);
    }
}
