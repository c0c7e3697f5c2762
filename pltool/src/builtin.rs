// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use plcore::loadable::{LoadableManager, LoaderDescriptor};

/// Announces the loaders built into pltool: the log formatters, which can
/// only write, and the settings file.
pub fn enqueue_loaders(manager: &mut LoadableManager) {
    manager.enqueue(
        LoaderDescriptor::new("LogFormatterText", "Log", "LogFormatter")
            .with_description("ASCII text log")
            .with_formats(["txt", "log"])
            .with_save(true),
    );
    manager.enqueue(
        LoaderDescriptor::new("LogFormatterXml", "Log", "LogFormatter")
            .with_description("XML log")
            .with_formats(["xml"])
            .with_save(true),
    );
    manager.enqueue(
        LoaderDescriptor::new("LogFormatterHtml", "Log", "LogFormatter")
            .with_description("HTML log")
            .with_formats(["html"])
            .with_save(true),
    );
    manager.enqueue(
        LoaderDescriptor::new("ConfigLoaderJson", "Config", "ConfigLoader")
            .with_description("pltool settings")
            .with_formats(["json"])
            .with_load(true)
            .with_save(true),
    );
}
