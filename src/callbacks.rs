//! Callbacks - Ordered, named callback lists attached to sections

use tracing::{error, warn};

/// What a load, save or reset callback reports
///
/// `Ok(false)` means the callback ran but didn't fully succeed. An `Err` is
/// logged with the callback's name and counted the same way.
pub type CallbackResult = std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>>;

type CallbackFn<S> = Box<dyn FnMut(&mut S) -> CallbackResult>;

struct Callback<S> {
    name: String,
    func: CallbackFn<S>,
}

/// Callbacks run in registration order, each isolated from the others
pub struct CallbackList<S> {
    callbacks: Vec<Callback<S>>,
    /// Names unregistered while the list was taken out for an invoke
    unregistered: Vec<String>,
}

impl<S> Default for CallbackList<S> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
            unregistered: Vec::new(),
        }
    }
}

impl<S> CallbackList<S> {
    /// Add a callback. A second callback with a name already in the list is ignored.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: FnMut(&mut S) -> CallbackResult + 'static,
    {
        let name = name.into();
        self.unregistered.retain(|unregistered| *unregistered != name);

        if self.contains(&name) {
            return;
        }

        self.callbacks.push(Callback {
            name,
            func: Box::new(func),
        });
    }

    pub fn unregister(&mut self, name: &str) {
        let before = self.callbacks.len();
        self.callbacks.retain(|callback| callback.name != name);

        if self.callbacks.len() == before && !self.unregistered.iter().any(|n| n == name) {
            self.unregistered.push(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.iter().any(|callback| callback.name == name)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every callback against `target`, returning whether all of them succeeded
    pub fn invoke(&mut self, target: &mut S, kind: &str, section: &str) -> bool {
        let mut successful = true;

        for callback in self.callbacks.iter_mut() {
            match (callback.func)(target) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(section, callback = %callback.name, "The {} callback reported a failure", kind);
                    successful = false;
                }
                Err(e) => {
                    error!(section, callback = %callback.name, error = %e, "Failed to activate {} callback", kind);
                    successful = false;
                }
            }
        }

        successful
    }

    /// Put a list taken out for an invoke back in place
    ///
    /// `self` is the stand-in that received any register and unregister calls
    /// made while the callbacks ran. Unregisters apply to the taken list and
    /// new registrations are appended to it.
    pub(crate) fn restore(&mut self, mut taken: CallbackList<S>) {
        let unregistered = std::mem::take(&mut self.unregistered);
        taken
            .callbacks
            .retain(|callback| !unregistered.contains(&callback.name));

        for callback in self.callbacks.drain(..) {
            if !taken.contains(&callback.name) {
                taken.callbacks.push(callback);
            }
        }

        taken.unregistered.clear();
        *self = taken;
    }
}
