use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rotary::layout::{
    DEFAULT_INDICATOR_ANGLE, DEFAULT_OPTIONS, DEFAULT_RETURN_SPEED, LayoutError,
};
use rotary::{DialLayout, OptionIndex, Rotation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_WINDOW_SIZE: i32 = 360;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DialConfig {
    pub options: usize,
    pub rotation: Rotation,
    pub indicator_angle: f64,
    pub return_speed: f64,
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            options: DEFAULT_OPTIONS,
            rotation: Rotation::default(),
            indicator_angle: DEFAULT_INDICATOR_ANGLE,
            return_speed: DEFAULT_RETURN_SPEED,
        }
    }
}

impl DialConfig {
    pub fn layout(&self) -> Result<DialLayout, LayoutError> {
        DialLayout::builder()
            .options(self.options)
            .rotation(self.rotation)
            .indicator_angle(self.indicator_angle)
            .return_speed(self.return_speed)
            .build()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub size: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_WINDOW_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dial: DialConfig,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub window: WindowConfig,
}

impl Config {
    /// Text for an option; unlabelled options read like phone digits (1..9, then 0).
    pub fn label(&self, index: OptionIndex) -> String {
        self.labels
            .get(*index)
            .cloned()
            .unwrap_or_else(|| match *index {
                i if i < 9 => (i + 1).to_string(),
                9 => "0".to_string(),
                i => (i + 1).to_string(),
            })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid dial layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "rotary", "phonedial").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("PHONEDIAL")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(environment())
        .build()?;

    let config: Config = s.try_deserialize()?;
    config.dial.layout()?;
    Ok(config)
}

pub fn load_or_setup(path: &Path) -> Config {
    if !path.exists() {
        log::info!(
            "No config at {}, using defaults (run with --write-default-config to create one)",
            path.display()
        );
    }

    match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config(path: &Path) -> std::io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(path, DEFAULT_CONFIG)?;
    }
    Ok(path.to_path_buf())
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>, config_path: PathBuf) {
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
