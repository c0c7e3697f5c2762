// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{io::Write, path::Path};

use crate::log::{LogError, LogLevel};

use super::{with_level_prefix, FormatterFile, LogFormatter};

/// Plain ASCII text log, one line per record. Characters outside of ASCII
/// are written as `?`.
#[derive(Debug)]
pub struct LogFormatterText {
    file: FormatterFile,
    show_level_prefix: bool,
}

impl LogFormatterText {
    pub fn new() -> LogFormatterText {
        LogFormatterText {
            file: FormatterFile::default(),
            show_level_prefix: true,
        }
    }
}

impl Default for LogFormatterText {
    fn default() -> Self {
        LogFormatterText::new()
    }
}

impl LogFormatter for LogFormatterText {
    fn open(&mut self, filename: &Path) -> Result<(), LogError> {
        self.file.open(filename)?;
        self.output(LogLevel::INFO, "Log-system started (ASCII only)")
    }

    fn close(&mut self) -> Result<(), LogError> {
        self.file.finish()
    }

    fn output(&mut self, level: LogLevel, text: &str) -> Result<(), LogError> {
        let line = with_level_prefix(level, text, self.show_level_prefix);
        let ascii: String = line
            .chars()
            .map(|c| if c.is_ascii() { c } else { '?' })
            .collect();
        writeln!(self.file.writer()?, "{ascii}")?;
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

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::log::{formatter::LogFormatter, LogError, LogLevel};

    use super::LogFormatterText;

    #[test]
    fn writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut formatter = LogFormatterText::new();
        formatter.open(&path).unwrap();
        formatter.output(LogLevel::WARNING, "careful").unwrap();
        formatter.set_show_level_prefix(false);
        formatter.output(LogLevel::INFO, "naïve").unwrap();
        formatter.close().unwrap();

        assert_eq!(
            "[Info]: Log-system started (ASCII only)\n[Warning]: careful\nna?ve\n",
            fs::read_to_string(&path).unwrap(),
        );
    }

    #[test]
    fn fails_without_file() {
        let mut formatter = LogFormatterText::new();
        assert!(matches!(
            formatter.output(LogLevel::INFO, "lost"),
            Err(LogError::NotOpen)
        ));
        assert!(formatter.flush().is_err());
        assert!(formatter.close().is_err());
    }

    #[test]
    fn fails_to_open_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut formatter = LogFormatterText::new();
        assert!(matches!(
            formatter.open(&dir.path().join("missing").join("out.txt")),
            Err(LogError::Io(_))
        ));
    }
}
