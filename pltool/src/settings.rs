// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use plcore::log::{LogLevel, DEFAULT_BUFFER_COUNT};
use serde::{Deserialize, Serialize};

/// The settings file, with the log configuration and the directories to
/// search files from.
///
/// Has enum variants for breaking changes in the format of the settings file,
/// but [`read`] always returns the newest variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "settings_file_version", rename_all = "snake_case")]
pub enum Settings {
    V1 {
        #[serde(default)]
        log: LogSettings,
        /// In priority order.
        #[serde(default)]
        base_dirs: Vec<String>,
        #[serde(default)]
        packages: Vec<PackageDir>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub file: Option<PathBuf>,
    #[serde(with = "level_name")]
    pub level: LogLevel,
    #[serde(with = "level_name")]
    pub flush_level: LogLevel,
    pub buffer_count: usize,
    /// Print log messages to stdout as well.
    pub verbose: bool,
    /// Start the printed lines with `[Level]: `.
    pub show_level_prefix: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            file: None,
            level: LogLevel::INFO,
            flush_level: LogLevel::ERROR,
            buffer_count: DEFAULT_BUFFER_COUNT,
            verbose: false,
            show_level_prefix: true,
        }
    }
}

/// A directory of packages, each added as a base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDir {
    pub path: String,
    /// e.g. "zip".
    pub extension: String,
}

/// Log levels by name, e.g. "warning" or "debug2".
mod level_name {
    use plcore::log::LogLevel;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(level: &LogLevel, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&level.name().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LogLevel, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}

pub fn read(settings: &Path) -> anyhow::Result<Settings> {
    let settings = if settings.exists() {
        let settings = fs::read_to_string(settings).context("Failed to open the settings file")?;
        serde_json::from_str(&settings).context("Failed to parse the settings file")?
    } else {
        Settings::V1 {
            log: LogSettings::default(),
            base_dirs: Vec::new(),
            packages: Vec::new(),
        }
    };

    // NOTE: When there's new versions of Settings, convert to the newest here
    // (main assumes it)

    Ok(settings)
}
