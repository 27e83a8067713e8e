//! Background options, their TOML representation, and change notification.
//!
//! The options live under a `[background]` table:
//!
//! ```toml
//! [background]
//! image = "~/Pictures/wallpapers"
//! cycle_timeout = 150
//! fade_duration = 1.0
//! shuffle = false
//! ```
//!
//! A [`ConfigNotifier`] owns the current values. Consumers subscribe to it
//! and receive one [`ConfigEvent`] per changed key whenever new values are
//! pushed with [`ConfigNotifier::update`].

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::constants::*;
use crate::error::{BackgroundError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Directory to cycle through, single image, or `none`.
    pub image: String,
    /// Seconds between two slideshow steps.
    pub cycle_timeout: u64,
    /// Seconds a cross-fade takes.
    pub fade_duration: f32,
    /// Randomize the order of the scanned images.
    pub shuffle: bool,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            image: DISABLED_IMAGE.to_string(),
            cycle_timeout: DEFAULT_CYCLE_TIMEOUT_SECS,
            fade_duration: DEFAULT_FADE_DURATION,
            shuffle: false,
        }
    }
}

impl BackgroundConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout)
    }
}

/// Values given on the command line; they win over the config file,
/// including after a reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub image: Option<String>,
    pub cycle_timeout: Option<u64>,
    pub fade_duration: Option<f32>,
    pub shuffle: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: BackgroundConfig) -> BackgroundConfig {
        if let Some(image) = &self.image {
            config.image = image.clone();
        }
        if let Some(cycle_timeout) = self.cycle_timeout {
            config.cycle_timeout = cycle_timeout;
        }
        if let Some(fade_duration) = self.fade_duration {
            config.fade_duration = fade_duration;
        }
        if let Some(shuffle) = self.shuffle {
            config.shuffle = shuffle;
        }
        config
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    background: BackgroundConfig,
}

pub fn parse_config(content: &str) -> Result<BackgroundConfig, toml::de::Error> {
    toml::from_str::<ConfigFile>(content).map(|file| file.background)
}

/// Reads the config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<BackgroundConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(BackgroundConfig::default());
        }
        Err(e) => {
            return Err(BackgroundError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    parse_config(&content).map_err(|e| BackgroundError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// `$XDG_CONFIG_HOME/backdrop/config.toml`, or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEvent {
    Image(String),
    CycleTimeout(u64),
    FadeDuration(f32),
    Shuffle(bool),
}

fn diff(old: &BackgroundConfig, new: &BackgroundConfig) -> Vec<ConfigEvent> {
    let mut events = Vec::new();
    if old.image != new.image {
        events.push(ConfigEvent::Image(new.image.clone()));
    }
    if old.cycle_timeout != new.cycle_timeout {
        events.push(ConfigEvent::CycleTimeout(new.cycle_timeout));
    }
    if old.fade_duration != new.fade_duration {
        events.push(ConfigEvent::FadeDuration(new.fade_duration));
    }
    if old.shuffle != new.shuffle {
        events.push(ConfigEvent::Shuffle(new.shuffle));
    }
    events
}

type Subscribers = RefCell<Vec<(u64, Sender<ConfigEvent>)>>;

/// Live store of the background options.
pub struct ConfigNotifier {
    current: BackgroundConfig,
    subscribers: Rc<Subscribers>,
    next_id: u64,
}

impl ConfigNotifier {
    pub fn new(config: BackgroundConfig) -> Self {
        Self {
            current: config,
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_id: 0,
        }
    }

    pub fn current(&self) -> &BackgroundConfig {
        &self.current
    }

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.borrow_mut().push((id, tx));

        Subscription {
            id,
            events: rx,
            subscribers: Rc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Replaces the current options and notifies every subscriber of the
    /// keys that changed. Returns the number of changed keys.
    pub fn update(&mut self, config: BackgroundConfig) -> usize {
        let events = diff(&self.current, &config);
        self.current = config;

        for (_, tx) in self.subscribers.borrow().iter() {
            for event in &events {
                // A receiver only goes away together with its Subscription,
                // which removes the sender first.
                let _ = tx.send(event.clone());
            }
        }

        events.len()
    }
}

/// Receiving end of a [`ConfigNotifier`]; unsubscribes when dropped.
pub struct Subscription {
    id: u64,
    events: Receiver<ConfigEvent>,
    subscribers: Weak<Subscribers>,
}

impl Subscription {
    /// Pending events, oldest first.
    pub fn drain(&self) -> Vec<ConfigEvent> {
        self.events.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, BackgroundConfig::default());
        assert_eq!(config.image, "none");
        assert_eq!(config.cycle_timeout, 150);
    }

    #[test]
    fn partial_background_table_keeps_other_defaults() {
        let config = parse_config("[background]\nimage = \"~/walls\"\n").unwrap();
        assert_eq!(config.image, "~/walls");
        assert_eq!(config.cycle_timeout, DEFAULT_CYCLE_TIMEOUT_SECS);
        assert_eq!(config.cycle_interval(), Duration::from_secs(150));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[background]\ncycle_timeout = \"soon\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, BackgroundError::Config { .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BackgroundConfig::default());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let file = parse_config("[background]\nimage = \"/a\"\ncycle_timeout = 30\n").unwrap();
        let overrides = ConfigOverrides {
            image: Some("/b".into()),
            ..Default::default()
        };

        let config = overrides.apply(file);
        assert_eq!(config.image, "/b");
        assert_eq!(config.cycle_timeout, 30);
    }

    #[test]
    fn update_sends_one_event_per_changed_key() {
        let mut notifier = ConfigNotifier::new(BackgroundConfig::default());
        let sub = notifier.subscribe();

        let mut next = notifier.current().clone();
        next.image = "/walls".into();
        next.cycle_timeout = 5;
        assert_eq!(notifier.update(next.clone()), 2);
        assert_eq!(
            sub.drain(),
            vec![ConfigEvent::Image("/walls".into()), ConfigEvent::CycleTimeout(5)]
        );

        assert_eq!(notifier.update(next), 0);
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let mut notifier = ConfigNotifier::new(BackgroundConfig::default());
        let first = notifier.subscribe();
        let second = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 2);

        drop(first);
        assert_eq!(notifier.subscriber_count(), 1);

        let mut next = notifier.current().clone();
        next.shuffle = true;
        notifier.update(next);
        assert_eq!(second.drain(), vec![ConfigEvent::Shuffle(true)]);
    }
}
