//! Persisted outer-window geometry.
//!
//! The state file is a small JSON object `{x?, y?, width, height}` in logical
//! pixels. Reading never fails: anything missing, unreadable or nonsensical
//! yields the default geometry.

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 658;
pub const DEFAULT_HEIGHT: u32 = 865;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("failed to write window state to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode window state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outer window position and inner size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowState {
    fn default() -> Self {
        Self::sized(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl WindowState {
    /// A state with a size and no remembered position.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            x: None,
            y: None,
            width,
            height,
        }
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Both coordinates, when the position was recorded.
    pub fn position(&self) -> Option<(i32, i32)> {
        self.x.zip(self.y)
    }
}

/// Reads and writes [`WindowState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct WindowStateStore {
    path: PathBuf,
    defaults: WindowState,
}

impl WindowStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            defaults: WindowState::default(),
        }
    }

    /// Geometry returned when nothing usable is stored.
    pub fn with_defaults(mut self, defaults: WindowState) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> WindowState {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(error) => {
                if error.kind() != io::ErrorKind::NotFound {
                    log::warn!(
                        "failed to read window state {}: {error}",
                        self.path.display()
                    );
                }
                return self.defaults;
            }
        };

        match serde_json::from_slice::<WindowState>(&data) {
            Ok(state) if state.is_valid() => state,
            Ok(state) => {
                log::warn!(
                    "ignoring window state with empty size {}x{}",
                    state.width,
                    state.height
                );
                self.defaults
            }
            Err(error) => {
                log::warn!(
                    "failed to parse window state {}: {error}",
                    self.path.display()
                );
                self.defaults
            }
        }
    }

    /// Writes `state`, logging instead of returning failures.
    pub fn save(&self, state: &WindowState) {
        match self.try_save(state) {
            Ok(()) => log::debug!(
                "saved window state {}x{} to {}",
                state.width,
                state.height,
                self.path.display()
            ),
            Err(error) => log::warn!("{error}"),
        }
    }

    pub fn try_save(&self, state: &WindowState) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state)?;
        write_state(&self.path, &json).map_err(|source| StateError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_state(path: &Path, json: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)
}
