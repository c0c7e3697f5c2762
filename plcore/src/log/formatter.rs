// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Log formatters, which serialize log records into a file in some specific
//! format. See [`LogFormatter`].

mod html;
mod text;
mod xml;

use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Write},
    mem,
    path::Path,
};

use super::{LogError, LogLevel};

pub use html::LogFormatterHtml;
pub use text::LogFormatterText;
pub use xml::LogFormatterXml;

/// A strategy for writing log records into one file in one format.
///
/// A formatter is bound to a file with [`LogFormatter::open`] and released
/// with [`LogFormatter::close`]. An instance only ever serves one such file
/// session: opening it again after closing fails with
/// [`LogError::SessionFinished`], create a new formatter instead.
///
/// Custom formatters can be passed to [`Log::open_with`](super::Log::open_with).
pub trait LogFormatter: Send {
    /// Creates (or truncates) the file and writes any format-specific header.
    fn open(&mut self, filename: &Path) -> Result<(), LogError>;

    /// Writes any format-specific footer and releases the file. Fails with
    /// [`LogError::NotOpen`] if there's no file open.
    fn close(&mut self) -> Result<(), LogError>;

    /// Writes exactly one record.
    fn output(&mut self, level: LogLevel, text: &str) -> Result<(), LogError>;

    /// Forces the buffered records into stable storage.
    fn flush(&mut self) -> Result<(), LogError>;

    /// Whether records start with a `[Level]: ` prefix.
    fn show_level_prefix(&self) -> bool;

    fn set_show_level_prefix(&mut self, show: bool);
}

#[derive(Debug, Default)]
enum Session {
    #[default]
    Detached,
    Open(BufWriter<File>),
    Finished,
}

/// The file side of a [`LogFormatter`], shared by the built-in formatters.
#[derive(Debug, Default)]
pub(crate) struct FormatterFile {
    session: Session,
}

impl FormatterFile {
    pub fn open(&mut self, filename: &Path) -> Result<&mut BufWriter<File>, LogError> {
        match self.session {
            Session::Detached => {}
            Session::Open(_) => return Err(LogError::AlreadyOpen),
            Session::Finished => return Err(LogError::SessionFinished),
        }
        let file = File::create(filename)?;
        self.session = Session::Open(BufWriter::new(file));
        self.writer()
    }

    pub fn writer(&mut self) -> Result<&mut BufWriter<File>, LogError> {
        match &mut self.session {
            Session::Open(writer) => Ok(writer),
            _ => Err(LogError::NotOpen),
        }
    }

    pub fn flush(&mut self) -> Result<(), LogError> {
        let writer = self.writer()?;
        writer.flush()?;
        writer.get_ref().sync_data()?;
        Ok(())
    }

    /// Flushes and releases the file, ending the session.
    pub fn finish(&mut self) -> Result<(), LogError> {
        match mem::replace(&mut self.session, Session::Finished) {
            Session::Open(mut writer) => {
                writer.flush()?;
                writer.get_ref().sync_all()?;
                Ok(())
            }
            previous => {
                self.session = previous;
                Err(LogError::NotOpen)
            }
        }
    }
}

/// Returns `text` with the `[Level]: ` prefix if `show_prefix` is set and the
/// level has a name.
pub(crate) fn with_level_prefix(level: LogLevel, text: &str, show_prefix: bool) -> Cow<'_, str> {
    let name = level.name();
    if show_prefix && !name.is_empty() {
        Cow::Owned(format!("[{name}]: {text}"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Escapes the characters which would otherwise be interpreted as markup in
/// XML and HTML text content.
pub(crate) fn escape_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use crate::log::{LogError, LogLevel};

    use super::{escape_markup, with_level_prefix, FormatterFile};

    #[test]
    fn prefix_is_skipped_for_internal_level() {
        assert_eq!("[Info]: hi", with_level_prefix(LogLevel::INFO, "hi", true));
        assert_eq!("hi", with_level_prefix(LogLevel::INFO, "hi", false));
        assert_eq!("hi", with_level_prefix(LogLevel::INTERNAL, "hi", true));
        assert_eq!("[Debug2]: hi", with_level_prefix(LogLevel::debug(2), "hi", true));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!("plain", escape_markup("plain"));
        assert_eq!("a &lt;b&gt; &amp; c", escape_markup("a <b> & c"));
    }

    #[test]
    fn file_session_is_single_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        let mut file = FormatterFile::default();

        assert!(matches!(file.writer(), Err(LogError::NotOpen)));
        assert!(matches!(file.finish(), Err(LogError::NotOpen)));
        file.open(&path).unwrap();
        assert!(matches!(file.open(&path), Err(LogError::AlreadyOpen)));
        file.flush().unwrap();
        file.finish().unwrap();
        assert!(matches!(file.finish(), Err(LogError::NotOpen)));
        assert!(matches!(file.open(&path), Err(LogError::SessionFinished)));
    }
}
