//! Hot reload of the configuration file.
//!
//! The watcher only parses. Overrides and validation are applied by the
//! receiver, the same way as at startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::ForwarderConfig;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Sends a freshly parsed [`ForwarderConfig`] whenever the file changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ForwarderConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for parsed configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ForwarderConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Updates stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let ConfigWatcher { path, update_tx } = self;
        let reload_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |event: notify::Result<Event>| on_event(&reload_path, &update_tx, event),
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Watching config file");
        Ok(watcher)
    }
}

fn on_event(
    path: &Path,
    update_tx: &mpsc::UnboundedSender<ForwarderConfig>,
    event: notify::Result<Event>,
) {
    let event = match event {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "Config watch failed");
            return;
        }
    };
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return;
    }

    match read_config(path) {
        Ok(config) => {
            tracing::debug!(path = ?path, "Config file re-read");
            let _ = update_tx.send(config);
        }
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable config change"),
    }
}

fn read_config(path: &Path) -> Result<ForwarderConfig, ConfigError> {
    parse_config(&fs::read_to_string(path)?)
}
