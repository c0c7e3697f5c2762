// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{collections::HashMap, io::Write, path::Path};

use crate::log::{LogError, LogLevel};

use super::{escape_markup, with_level_prefix, FormatterFile, LogFormatter};

/// UTF-8 HTML log.
///
/// Records are rendered through format templates of the shape
/// `"<prefix>|<suffix>"`, where the `|` is replaced with the record's text.
/// Each level can have its own template (e.g. `"<font color=\"red\">|</font><br>"`
/// for errors), levels without one use the default template, `"|<br>"` unless
/// changed.
///
/// The title, body attributes, header and footer must be set before
/// [`LogFormatter::open`] to have an effect (the footer before
/// [`LogFormatter::close`]). The header and footer are written as-is, so they
/// may contain markup.
#[derive(Debug)]
pub struct LogFormatterHtml {
    file: FormatterFile,
    show_level_prefix: bool,
    title: String,
    body_attributes: String,
    header: String,
    footer: String,
    default_format: String,
    formats: HashMap<LogLevel, String>,
}

impl LogFormatterHtml {
    pub fn new() -> LogFormatterHtml {
        LogFormatterHtml {
            file: FormatterFile::default(),
            show_level_prefix: true,
            title: String::from("Log"),
            body_attributes: String::new(),
            header: String::new(),
            footer: String::new(),
            default_format: String::from("|<br>"),
            formats: HashMap::new(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Attributes for the `<body>` tag, e.g. `bgcolor="#FFFFFF"`.
    pub fn set_body_attributes(&mut self, attributes: impl Into<String>) {
        self.body_attributes = attributes.into();
    }

    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = header.into();
    }

    pub fn set_footer(&mut self, footer: impl Into<String>) {
        self.footer = footer.into();
    }

    pub fn default_format(&self) -> &str {
        &self.default_format
    }

    pub fn set_default_format(&mut self, format: impl Into<String>) {
        self.default_format = format.into();
    }

    /// Returns the template used for `level`.
    pub fn format(&self, level: LogLevel) -> &str {
        self.formats
            .get(&level)
            .map(String::as_str)
            .unwrap_or(&self.default_format)
    }

    pub fn set_format(&mut self, level: LogLevel, format: impl Into<String>) {
        self.formats.insert(level, format.into());
    }

    /// Makes `level` fall back to the default template again.
    pub fn clear_format(&mut self, level: LogLevel) {
        self.formats.remove(&level);
    }
}

impl Default for LogFormatterHtml {
    fn default() -> Self {
        LogFormatterHtml::new()
    }
}

fn render(template: &str, text: &str) -> String {
    match template.split_once('|') {
        Some((prefix, suffix)) => format!("{prefix}{text}{suffix}"),
        None => format!("{template}{text}"),
    }
}

impl LogFormatter for LogFormatterHtml {
    fn open(&mut self, filename: &Path) -> Result<(), LogError> {
        let writer = self.file.open(filename)?;
        let title = escape_markup(&self.title);
        if self.body_attributes.is_empty() {
            writeln!(writer, "<html><head><title>{title}</title></head><body>")?;
        } else {
            let attributes = &self.body_attributes;
            writeln!(
                writer,
                "<html><head><title>{title}</title></head><body {attributes}>"
            )?;
        }
        if !self.header.is_empty() {
            writeln!(writer, "{}", self.header)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), LogError> {
        let writer = self.file.writer()?;
        if !self.footer.is_empty() {
            writeln!(writer, "{}", self.footer)?;
        }
        writeln!(writer, "</body></html>")?;
        self.file.finish()
    }

    fn output(&mut self, level: LogLevel, text: &str) -> Result<(), LogError> {
        let text = with_level_prefix(level, text, self.show_level_prefix);
        let line = render(self.format(level), &escape_markup(&text));
        writeln!(self.file.writer()?, "{line}")?;
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
