// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{io::Write, path::Path};

use crate::log::{LogError, LogLevel};

use super::{escape_markup, with_level_prefix, FormatterFile, LogFormatter};

/// UTF-8 XML log. Each record is an element named after its level, inside a
/// single `<Log>` root element. Records of the internal level use the
/// `Intern` tag.
#[derive(Debug, Default)]
pub struct LogFormatterXml {
    file: FormatterFile,
    show_level_prefix: bool,
}

impl LogFormatterXml {
    /// Creates a formatter without level prefixes, since the tag names already
    /// contain the level.
    pub fn new() -> LogFormatterXml {
        LogFormatterXml::default()
    }
}

impl LogFormatter for LogFormatterXml {
    fn open(&mut self, filename: &Path) -> Result<(), LogError> {
        let writer = self.file.open(filename)?;
        writer.write_all(b"<?xml version=\"1.0\" ?>\n<Log>\n")?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), LogError> {
        self.file.writer()?.write_all(b"</Log>\n")?;
        self.file.finish()
    }

    fn output(&mut self, level: LogLevel, text: &str) -> Result<(), LogError> {
        let name = level.name();
        let tag = if name.is_empty() { "Intern" } else { &*name };
        let text = with_level_prefix(level, text, self.show_level_prefix);
        let text = escape_markup(&text);
        writeln!(self.file.writer()?, "\t<{tag}>{text}</{tag}>")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogError> {
        self.file.flush()
    }

    fn show_level_prefix(&self) -> bool {
        self.show_level_prefix
    }

    fn set_show_level_prefix(&mut self, show: bool) {
        self.show_level_prefix = show;
    }
}
