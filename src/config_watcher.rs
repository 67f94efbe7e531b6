//! Hot reload of the YAML config file.

use crate::config::Config;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use tracing::{error, info, warn};

/// Watches the config file and hands back the new config after each edit.
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    current: Option<Config>,
}

impl ConfigWatcher {
    /// Start watching `path`. Returns None (after logging) if the watch
    /// cannot be set up; the viewer keeps running without hot reload.
    pub fn new(path: PathBuf, current: Option<Config>) -> Option<Self> {
        let (tx, rx) = channel();

        let mut watcher = match RecommendedWatcher::new(tx, notify::Config::default()) {
            Ok(watcher) => watcher,
            Err(e) => {
                warn!("Failed to create config watcher: {}", e);
                return None;
            }
        };

        if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
            warn!("Failed to watch config file {:?}: {}", path, e);
            return None;
        }
        info!("Watching config file {:?} for changes", path);

        Some(Self {
            path,
            _watcher: watcher,
            rx,
            current,
        })
    }

    /// Drain pending file events. Returns the reloaded config if the file
    /// changed and parses to something different from the last one.
    pub fn check_for_changes(&mut self) -> Option<Config> {
        let mut needs_reload = false;
        while let Ok(res) = self.rx.try_recv() {
            match res {
                Ok(event) => {
                    if matches!(event.kind, notify::EventKind::Modify(_) | notify::EventKind::Create(_)) {
                        needs_reload = true;
                    }
                }
                Err(e) => warn!("Config watch error: {}", e),
            }
        }

        if !needs_reload {
            return None;
        }

        info!("Config file changed, reloading...");
        match Config::load(&self.path) {
            Ok(config) if self.current.as_ref() == Some(&config) => None,
            Ok(config) => {
                self.current = Some(config.clone());
                Some(config)
            }
            Err(e) => {
                error!("Keeping previous config: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_disables_watching() {
        let watcher = ConfigWatcher::new(PathBuf::from("/nonexistent/videomap.yaml"), None);
        assert!(watcher.is_none());
    }
}
