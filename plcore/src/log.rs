// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Buffered, leveled logging into a file through a pluggable
//! [`LogFormatter`].
//!
//! The [`Log`] is an ordinary value owned by whoever composes the
//! application. To route [`tracing`] events (including the ones emitted by
//! the rest of this crate) into it, share it as a [`SharedLog`] and install a
//! [`LogLayer`] into the subscriber.

pub mod formatter;
mod layer;
mod level;

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::collections::Queue;

pub use formatter::{LogFormatter, LogFormatterHtml, LogFormatterText, LogFormatterXml};
pub use layer::LogLayer;
pub use level::{log_level_to_string, LogLevel, ParseLogLevelError};

/// A [`Log`] shared between the owner and e.g. a [`LogLayer`].
pub type SharedLog = Arc<Mutex<Log>>;

/// The default amount of recent messages kept in memory.
pub const DEFAULT_BUFFER_COUNT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("no log file is open")]
    NotOpen,
    #[error("the log formatter is already bound to a file")]
    AlreadyOpen,
    #[error("the log formatter has already been used for a file, create a new one")]
    SessionFinished,
    #[error("unsupported log file extension {0:?}")]
    UnsupportedExtension(String),
    /// The new log was opened, but closing the previous one failed.
    #[error("failed to close the previous log file")]
    PreviousClose(#[source] Box<LogError>),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The log.
///
/// Messages pass through if they are more important than [`LogLevel::QUIET`]
/// and at most as verbose as [`Log::log_level`]. Passed messages are echoed to
/// the console if verbose, written to the formatter if a file is open, and
/// kept in a bounded buffer of recent messages.
///
/// Formatter writes are flushed when the message's level is at or above
/// [`Log::flush_log_level`] on the numeric scale (i.e. at most as important),
/// or when [`Log::buffer_count`] messages have been written since the last
/// flush.
pub struct Log {
    log_level: LogLevel,
    flush_log_level: LogLevel,
    verbose: bool,
    verbose_level_prefix: bool,
    /// The most recent messages, formatted as `"(Level) text"`.
    last_messages: Queue<String>,
    messages_since_flush: usize,
    formatter: Option<Box<dyn LogFormatter>>,
    filename: Option<PathBuf>,
    /// Where verbose messages are echoed, stdout unless replaced.
    echo: Box<dyn Write + Send>,
}

impl Log {
    pub fn new() -> Log {
        Log {
            log_level: LogLevel::INFO,
            flush_log_level: LogLevel::ERROR,
            verbose: false,
            verbose_level_prefix: true,
            last_messages: Queue::new(DEFAULT_BUFFER_COUNT),
            messages_since_flush: 0,
            formatter: None,
            filename: None,
            echo: Box::new(io::stdout()),
        }
    }

    pub fn into_shared(self) -> SharedLog {
        Arc::new(Mutex::new(self))
    }

    pub fn is_open(&self) -> bool {
        self.formatter.is_some()
    }

    /// The file of the current session, if open.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Opens a log file, picking the formatter based on the extension:
    /// `txt` and `log` for [`LogFormatterText`], `xml` for
    /// [`LogFormatterXml`], and `html` for [`LogFormatterHtml`].
    ///
    /// Any previously open log is closed first. With an unsupported extension
    /// nothing changes and [`LogError::UnsupportedExtension`] is returned.
    pub fn open(&mut self, filename: impl AsRef<Path>) -> Result<(), LogError> {
        let filename = filename.as_ref();
        let extension = filename
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let formatter: Box<dyn LogFormatter> = match extension.as_str() {
            "txt" | "log" => Box::new(LogFormatterText::new()),
            "xml" => Box::new(LogFormatterXml::new()),
            "html" => Box::new(LogFormatterHtml::new()),
            _ => return Err(LogError::UnsupportedExtension(extension)),
        };
        self.open_with(filename, formatter)
    }

    /// Opens a log file with the given formatter, closing any previously open
    /// log first.
    ///
    /// The log takes ownership of the formatter. If the formatter fails to
    /// open the file, it is dropped and the log stays closed.
    ///
    /// If closing the previous log fails, the new log is still opened, and
    /// the failure is returned as [`LogError::PreviousClose`].
    pub fn open_with(
        &mut self,
        filename: impl AsRef<Path>,
        mut formatter: Box<dyn LogFormatter>,
    ) -> Result<(), LogError> {
        let closed = if self.is_open() { self.close() } else { Ok(()) };

        let filename = filename.as_ref();
        formatter.open(filename)?;
        self.formatter = Some(formatter);
        self.filename = Some(filename.to_path_buf());
        self.messages_since_flush = 0;
        closed.map_err(|err| LogError::PreviousClose(Box::new(err)))
    }

    /// Writes an internal "Close log" record, closes the formatter and ends
    /// the session. Returns [`LogError::NotOpen`] if there was nothing to
    /// close.
    pub fn close(&mut self) -> Result<(), LogError> {
        if !self.is_open() {
            return Err(LogError::NotOpen);
        }

        let written = self.write(LogLevel::INTERNAL, "Close log");
        let closed = match self.formatter.take() {
            Some(mut formatter) => formatter.close(),
            None => Ok(()),
        };
        self.filename = None;
        self.messages_since_flush = 0;
        written.and(closed)
    }

    /// Writes a message if it passes the log level filter. Returns `Ok(false)`
    /// if the message was filtered out.
    pub fn output(&mut self, level: LogLevel, text: &str) -> Result<bool, LogError> {
        if level <= LogLevel::QUIET || level > self.log_level {
            return Ok(false);
        }
        self.write(level, text)?;
        Ok(true)
    }

    fn write(&mut self, level: LogLevel, text: &str) -> Result<(), LogError> {
        if self.verbose {
            let prefix = level.name();
            // The console is best effort, only the formatter's errors count.
            let _ = if self.verbose_level_prefix && !prefix.is_empty() {
                writeln!(self.echo, "[{prefix}]: {text}")
            } else {
                writeln!(self.echo, "{text}")
            };
        }

        let mut result = match &mut self.formatter {
            Some(formatter) => formatter.output(level, text),
            None => Ok(()),
        };

        let entry = format!("({}) {}", level.name(), text);
        if self.last_messages.is_full() {
            result = result.and(self.flush_formatter());
            self.last_messages.pop_front();
        }
        // Only fails with a zero capacity, in which case nothing is kept.
        let _ = self.last_messages.push_back(entry);

        self.messages_since_flush += 1;
        if level >= self.flush_log_level
            || self.messages_since_flush >= self.last_messages.capacity()
        {
            result = result.and(self.flush_formatter());
        }

        result
    }

    /// Flushes the formatter, if there is one.
    fn flush_formatter(&mut self) -> Result<(), LogError> {
        self.messages_since_flush = 0;
        match &mut self.formatter {
            Some(formatter) => formatter.flush(),
            None => Ok(()),
        }
    }

    /// Forces all written messages into the log file.
    pub fn flush(&mut self) -> Result<(), LogError> {
        if !self.is_open() {
            return Err(LogError::NotOpen);
        }
        self.flush_formatter()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Sets the most verbose level which is still written. Does not affect
    /// already buffered messages.
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    pub fn flush_log_level(&self) -> LogLevel {
        self.flush_log_level
    }

    /// Sets the level from which on (numerically) messages are flushed
    /// immediately. Lowering the level flushes right away, so that messages
    /// written under the previous level don't linger in the buffers.
    pub fn set_flush_log_level(&mut self, level: LogLevel) -> Result<(), LogError> {
        let lowered = level < self.flush_log_level;
        self.flush_log_level = level;
        if lowered {
            self.flush_formatter()
        } else {
            Ok(())
        }
    }

    /// The maximum amount of recent messages kept in memory, which is also
    /// the maximum amount of messages written between flushes.
    pub fn buffer_count(&self) -> usize {
        self.last_messages.capacity()
    }

    /// Flushes, and then changes the buffer count, dropping the oldest
    /// messages if there are more than `count` of them.
    pub fn set_buffer_count(&mut self, count: usize) -> Result<(), LogError> {
        let flushed = self.flush_formatter();
        self.last_messages.set_capacity(count);
        flushed
    }

    /// The most recent messages, oldest first.
    pub fn last_messages(&self) -> impl Iterator<Item = &str> {
        self.last_messages.iter().map(String::as_str)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_verbose_level_prefix(&self) -> bool {
        self.verbose_level_prefix
    }

    /// Sets whether messages are also printed to the console, and whether
    /// those lines start with a `[Level]: ` prefix.
    pub fn set_verbose(&mut self, verbose: bool, show_level_prefix: bool) {
        self.verbose = verbose;
        self.verbose_level_prefix = show_level_prefix;
    }

    /// Replaces the stdout echo of verbose mode.
    pub fn set_echo_writer(&mut self, writer: impl Write + Send + 'static) {
        self.echo = Box::new(writer);
    }

    /// The formatter of the current session.
    pub fn formatter_mut(&mut self) -> Option<&mut (dyn LogFormatter + 'static)> {
        self.formatter.as_deref_mut()
    }
}

impl Default for Log {
    fn default() -> Self {
        Log::new()
    }
}

impl Drop for Log {
    fn drop(&mut self) {
        if self.is_open() {
            let _ = self.close();
        }
    }
}
