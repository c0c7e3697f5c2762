// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{borrow::Cow, fmt, str::FromStr};

const NAMES: [&str; 8] = [
    "", "Quiet", "Always", "Critical", "Error", "Warning", "Info", "Debug",
];

/// Severity of a log message.
///
/// Smaller values are more important. The named levels are provided as
/// associated constants, and anything above [`LogLevel::DEBUG`] is an
/// increasingly verbose debug level (see [`LogLevel::debug`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogLevel(u8);

impl LogLevel {
    /// Reserved for messages written by the log system itself. Bypasses
    /// filtering and is never a valid log level setting.
    pub const INTERNAL: LogLevel = LogLevel(0);
    /// No output at all. Used as a log level setting, never for messages.
    pub const QUIET: LogLevel = LogLevel(1);
    pub const ALWAYS: LogLevel = LogLevel(2);
    pub const CRITICAL: LogLevel = LogLevel(3);
    pub const ERROR: LogLevel = LogLevel(4);
    pub const WARNING: LogLevel = LogLevel(5);
    pub const INFO: LogLevel = LogLevel(6);
    pub const DEBUG: LogLevel = LogLevel(7);

    pub const fn from_u8(level: u8) -> LogLevel {
        LogLevel(level)
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// A debug level `granularity` steps finer than [`LogLevel::DEBUG`].
    /// Saturates at `u8::MAX`.
    pub const fn debug(granularity: u8) -> LogLevel {
        LogLevel(Self::DEBUG.0.saturating_add(granularity))
    }

    /// Returns the display name of the level: an empty string for
    /// [`LogLevel::INTERNAL`], the table name for the named levels, and
    /// `"Debug<n>"` for levels `n` steps above [`LogLevel::DEBUG`].
    pub fn name(self) -> Cow<'static, str> {
        match NAMES.get(self.0 as usize) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("Debug{}", self.0 - Self::DEBUG.0)),
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::INFO
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> u8 {
        level.0
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Returned by [`LogLevel::from_str`] for unknown level names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level {0:?}")]
pub struct ParseLogLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    /// Parses the level names produced by [`LogLevel::name`], ignoring case.
    /// The internal level has no name and can't be parsed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(i) = NAMES
            .iter()
            .skip(1)
            .position(|name| name.eq_ignore_ascii_case(trimmed))
        {
            return Ok(LogLevel(i as u8 + 1));
        }

        let lowercase = trimmed.to_ascii_lowercase();
        lowercase
            .strip_prefix("debug")
            .and_then(|granularity| granularity.parse::<u8>().ok())
            .and_then(|granularity| LogLevel::DEBUG.0.checked_add(granularity))
            .map(LogLevel)
            .ok_or_else(|| ParseLogLevelError(s.to_owned()))
    }
}

/// Free-function form of [`LogLevel::name`] for raw level values.
pub fn log_level_to_string(level: u8) -> Cow<'static, str> {
    LogLevel(level).name()
}
