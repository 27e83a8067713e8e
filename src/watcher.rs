//! Config file watcher for live reloading.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::warn;

use crate::constants::CONFIG_DEBOUNCE;

/// Collapses a burst of change notifications into one, fired once the
/// burst has been quiet for `window`.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    last_event: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self { window, last_event: None }
    }

    pub fn record(&mut self, at: Instant) {
        self.last_event = Some(at);
    }

    /// True exactly once per burst.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(at) if now.saturating_duration_since(at) >= self.window => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

/// Watches the parent directory of the config file, since some editors
/// save by writing a temporary file and renaming it over the original.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<Instant>,
    debounce: Debounce,
}

impl ConfigWatcher {
    pub fn new(config_path: &Path) -> notify::Result<Self> {
        let file_name = config_path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        let watch_path = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let affects_config = event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(file_name.as_os_str()));
                if affects_config {
                    let _ = tx.send(Instant::now());
                }
            }
            Err(err) => warn!("Config watch error: {err}"),
        })?;
        watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            events: rx,
            debounce: Debounce::new(CONFIG_DEBOUNCE),
        })
    }

    /// Polled from the event loop; true when the file should be reloaded.
    pub fn poll(&mut self) -> bool {
        for at in self.events.try_iter() {
            self.debounce.record(at);
        }
        self.debounce.ready(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_fires_once_after_quiet_window() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(200));

        debounce.record(start);
        debounce.record(start + Duration::from_millis(50));
        assert!(!debounce.ready(start + Duration::from_millis(100)));
        assert!(debounce.ready(start + Duration::from_millis(250)));
        assert!(!debounce.ready(start + Duration::from_millis(300)));
    }

    #[test]
    fn nothing_recorded_never_fires() {
        let mut debounce = Debounce::new(CONFIG_DEBOUNCE);
        assert!(!debounce.ready(Instant::now() + Duration::from_secs(5)));
    }
}
