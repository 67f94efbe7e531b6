//! Application mode and the store that owns it.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// What the application is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Projected output only
    Exhibition,
    /// Pin placement and alignment
    Map,
    /// Surface setup
    #[default]
    Setup,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Exhibition, Mode::Map, Mode::Setup];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Exhibition => "exhibition",
            Mode::Map => "map",
            Mode::Setup => "setup",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

/// Handle returned by [`ModeStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Mode, Mode)>;

/// Holds the current mode. [`ModeStore::set`] is the only way to change it,
/// and every call is reported to subscribers as `(previous, next)`.
pub struct ModeStore {
    mode: Mode,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl ModeStore {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> Mode {
        self.mode
    }

    /// Replace the mode. Any mode may follow any other; subscribers are
    /// notified even if the value did not change.
    pub fn set(&mut self, next: Mode) {
        let previous = std::mem::replace(&mut self.mode, next);
        if previous != next {
            info!("Mode changed: {} -> {}", previous, next);
        }
        for (_, listener) in &mut self.listeners {
            listener(previous, next);
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(Mode, Mode) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }
}

impl Default for ModeStore {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl fmt::Debug for ModeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeStore")
            .field("mode", &self.mode)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_set_then_get() {
        let mut store = ModeStore::default();
        assert_eq!(store.get(), Mode::Setup);
        store.set(Mode::Map);
        assert_eq!(store.get(), Mode::Map);
    }

    #[test]
    fn test_any_transition_is_allowed() {
        let mut store = ModeStore::default();
        for from in Mode::ALL {
            for to in Mode::ALL {
                store.set(from);
                store.set(to);
                assert_eq!(store.get(), to);
            }
        }
    }

    #[test]
    fn test_subscribers_see_every_set() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = ModeStore::new(Mode::Exhibition);
        let sink = seen.clone();
        store.subscribe(move |prev, next| sink.borrow_mut().push((prev, next)));

        store.set(Mode::Map);
        store.set(Mode::Map);
        store.set(Mode::Setup);

        assert_eq!(
            *seen.borrow(),
            vec![
                (Mode::Exhibition, Mode::Map),
                (Mode::Map, Mode::Map),
                (Mode::Map, Mode::Setup),
            ]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut store = ModeStore::default();
        let sink = count.clone();
        let id = store.subscribe(move |_, _| *sink.borrow_mut() += 1);

        store.set(Mode::Map);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set(Mode::Exhibition);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_mode_names() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
        assert!(matches!("projector".parse::<Mode>(), Err(Error::UnknownMode(_))));
    }
}
