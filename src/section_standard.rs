//! StandardSection - A flat key to value section

use serde::Serialize;
use serde_json::{Map, Value};

use crate::callbacks::{CallbackList, CallbackResult};
use crate::section::{encode_value, expect_object, Section};
use crate::Result;

/// Section data stored as `key -> value`
///
/// Values are copied on the way in and out, so nothing outside the section
/// can change what's stored without calling [`StandardSection::set_value`].
pub struct StandardSection {
    identifier: String,
    data: Map<String, Value>,
    load_callbacks: CallbackList<StandardSection>,
    save_callbacks: CallbackList<StandardSection>,
    reset_callbacks: CallbackList<StandardSection>,
}

impl StandardSection {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            data: Map::new(),
            load_callbacks: CallbackList::default(),
            save_callbacks: CallbackList::default(),
            reset_callbacks: CallbackList::default(),
        }
    }

    /// A copy of the stored value, or `None` if the key isn't set
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.data.get(key).cloned()
    }

    /// A copy of the stored value, or `default` if the key isn't set
    pub fn get_value_or(&self, key: &str, default: Value) -> Value {
        self.get_value(key).unwrap_or(default)
    }

    /// Store a copy of `value` under `key`
    ///
    /// Fails without changing anything if the value can't be encoded as JSON.
    pub fn set_value<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let encoded = encode_value(value, format!("Key: {}.", key))?;
        self.data.insert(key.to_string(), encoded);
        Ok(())
    }

    pub fn remove_value(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn register_load_callback<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut StandardSection) -> CallbackResult + 'static,
    {
        self.load_callbacks.register(name, callback);
    }

    pub fn unregister_load_callback(&mut self, name: &str) {
        self.load_callbacks.unregister(name);
    }

    pub fn register_save_callback<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut StandardSection) -> CallbackResult + 'static,
    {
        self.save_callbacks.register(name, callback);
    }

    pub fn unregister_save_callback(&mut self, name: &str) {
        self.save_callbacks.unregister(name);
    }

    pub fn register_reset_callback<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut StandardSection) -> CallbackResult + 'static,
    {
        self.reset_callbacks.register(name, callback);
    }

    pub fn unregister_reset_callback(&mut self, name: &str) {
        self.reset_callbacks.unregister(name);
    }

    fn activate_load_callbacks(&mut self) -> bool {
        let section = self.identifier.clone();
        let mut callbacks = std::mem::take(&mut self.load_callbacks);
        let successful = callbacks.invoke(self, "load", &section);
        self.load_callbacks.restore(callbacks);
        successful
    }

    fn activate_save_callbacks(&mut self) -> bool {
        let section = self.identifier.clone();
        let mut callbacks = std::mem::take(&mut self.save_callbacks);
        let successful = callbacks.invoke(self, "save", &section);
        self.save_callbacks.restore(callbacks);
        successful
    }

    fn activate_reset_callbacks(&mut self) -> bool {
        let section = self.identifier.clone();
        let mut callbacks = std::mem::take(&mut self.reset_callbacks);
        let successful = callbacks.invoke(self, "reset", &section);
        self.reset_callbacks.restore(callbacks);
        successful
    }
}

impl Section for StandardSection {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn load(&mut self, data: Value) -> bool {
        let (data, valid) = expect_object(data, &self.identifier, "SectionData");
        self.data = data;

        let callbacks_successful = self.activate_load_callbacks();

        valid && callbacks_successful
    }

    fn save(&mut self) -> (bool, Value) {
        let callbacks_successful = self.activate_save_callbacks();
        (callbacks_successful, Value::Object(self.data.clone()))
    }

    fn reset(&mut self) {
        self.data = Map::new();
        self.activate_reset_callbacks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn load_keeps_data_and_runs_callbacks() {
        let seen = Rc::new(Cell::new(None));
        let mut section = StandardSection::new("Tracking");
        let seen_by_callback = seen.clone();
        section.register_load_callback("remember", move |section: &mut StandardSection| {
            seen_by_callback.set(section.get_value("count").and_then(|v| v.as_u64()));
            Ok(true)
        });

        assert!(section.load(json!({"count": 4, "name": "x"})));
        assert_eq!(seen.get(), Some(4));
        assert_eq!(section.get_value("name"), Some(json!("x")));
    }

    #[test]
    fn load_replaces_a_non_object_payload_and_reports_it() {
        let mut section = StandardSection::new("Tracking");
        section.set_value("old", &1).unwrap();

        assert!(!section.load(json!(["not", "an", "object"])));
        assert!(section.is_empty());
    }

    #[test]
    fn failing_load_callback_makes_load_false_but_keeps_data() {
        let mut section = StandardSection::new("Tracking");
        section.register_load_callback("fails", |_: &mut StandardSection| Err("broken".into()));

        assert!(!section.load(json!({"k": "v"})));
        assert_eq!(section.get_value("k"), Some(json!("v")));
    }

    #[test]
    fn save_callbacks_can_change_the_saved_data() {
        let mut section = StandardSection::new("Tracking");
        section.register_save_callback("stamp", |section: &mut StandardSection| {
            section.set_value("stamped", &true)?;
            Ok(true)
        });

        let (successful, data) = section.save();

        assert!(successful);
        assert_eq!(data, json!({"stamped": true}));
    }

    #[test]
    fn values_are_copied_in_and_out() {
        let mut section = StandardSection::new("Tracking");
        let mut list = vec![1, 2, 3];
        section.set_value("k", &list).unwrap();

        list.push(4);
        assert_eq!(section.get_value("k"), Some(json!([1, 2, 3])));

        let mut fetched = section.get_value("k").unwrap();
        fetched.as_array_mut().unwrap().clear();
        assert_eq!(section.get_value("k"), Some(json!([1, 2, 3])));
    }

    #[test]
    fn unencodable_values_are_rejected_with_the_key() {
        use std::collections::HashMap;

        let mut section = StandardSection::new("Tracking");
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys can't be JSON object keys");

        let err = section.set_value("bad", &bad).unwrap_err();

        assert!(err.to_string().contains("Key: bad."));
        assert_eq!(section.get_value("bad"), None);
    }

    #[test]
    fn reset_clears_data_and_notifies() {
        let resets = Rc::new(Cell::new(0));
        let mut section = StandardSection::new("Tracking");
        let counter = resets.clone();
        section.register_reset_callback("count", move |_: &mut StandardSection| {
            counter.set(counter.get() + 1);
            Ok(true)
        });
        section.load(json!({"k": 1}));

        section.reset();

        assert!(section.is_empty());
        assert_eq!(resets.get(), 1);
        assert_eq!(section.get_value_or("k", json!(0)), json!(0));
    }

    #[test]
    fn a_callback_can_unregister_itself() {
        let loads = Rc::new(Cell::new(0));
        let mut section = StandardSection::new("Tracking");
        let counter = loads.clone();
        section.register_load_callback("once", move |section: &mut StandardSection| {
            counter.set(counter.get() + 1);
            section.unregister_load_callback("once");
            Ok(true)
        });

        section.load(json!({}));
        section.load(json!({}));

        assert_eq!(loads.get(), 1);
    }
}
