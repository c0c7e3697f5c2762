// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

mod builtin;
mod cli;
mod settings;

use std::{fmt::Write, path::Path};

use anyhow::Context;
use cli::{Command, Options};
use plcore::{
    loadable::{LoadableManager, LoadableType},
    log::{Log, LogLayer, SharedLog},
};
use settings::{LogSettings, PackageDir, Settings};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

fn main() -> anyhow::Result<()> {
    let opts = cli::options().run();

    let log = Log::new().into_shared();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(opts.verbosity_level),
        )
        .with(LogLayer::new(log.clone()))
        .init();

    let Settings::V1 {
        log: log_settings,
        base_dirs,
        packages,
    } = settings::read(&opts.settings_path)?;
    configure_log(&log, &log_settings, opts.log_file.as_deref())?;

    run_and_close_log(opts, &base_dirs, &packages, &log)
}

/// Runs the command, then closes the log whether the command succeeded or
/// not. The global subscriber keeps the log alive past main, so it's never
/// dropped (and closed) on its own.
fn run_and_close_log(
    opts: Options,
    base_dirs: &[String],
    packages: &[PackageDir],
    log: &SharedLog,
) -> anyhow::Result<()> {
    let result = run(opts, base_dirs, packages, log);
    let closed = close_log(log);
    result.and(closed)
}

fn run(
    opts: Options,
    base_dirs: &[String],
    packages: &[PackageDir],
    log: &SharedLog,
) -> anyhow::Result<()> {
    let mut manager = LoadableManager::new();
    builtin::enqueue_loaders(&mut manager);
    for dir in base_dirs.iter().chain(&opts.base_dirs) {
        manager
            .add_base_dir(dir)
            .with_context(|| format!("Failed to add the base directory {dir:?}"))?;
    }
    for package_dir in packages {
        let found = manager
            .scan_packages(&package_dir.path, &package_dir.extension)
            .with_context(|| format!("Failed to scan {:?} for packages", package_dir.path))?;
        info!("Found {found} packages in {:?}", package_dir.path);
    }

    match opts.command {
        Command::Find { create, file } => {
            let file = manager
                .open_file(&file, create)
                .with_context(|| format!("Failed to open {file:?}"))?;
            println!("{}", file.url);
        }

        Command::Formats { type_name } => match type_name {
            Some(type_name) => {
                let loadable_type = manager
                    .type_by_name(&type_name)
                    .with_context(|| format!("There is no loadable type called {type_name:?}"))?;
                print!("{}", describe_type(loadable_type));
            }
            None => {
                for loadable_type in manager.types() {
                    print!("{}", describe_type(loadable_type));
                }
            }
        },

        Command::Log { level, message } => {
            let written = log
                .lock()
                .output(level, &message)
                .context("Failed to write into the log")?;
            if !written {
                warn!("The message was filtered out by the log level");
            }
        }
    }

    Ok(())
}

fn close_log(log: &SharedLog) -> anyhow::Result<()> {
    let mut log = log.lock();
    if log.is_open() {
        log.close().context("Failed to close the log")?;
    }
    Ok(())
}

fn configure_log(
    log: &SharedLog,
    settings: &LogSettings,
    log_file: Option<&Path>,
) -> anyhow::Result<()> {
    let mut log = log.lock();
    log.set_log_level(settings.level);
    log.set_flush_log_level(settings.flush_level)?;
    log.set_buffer_count(settings.buffer_count)?;
    log.set_verbose(settings.verbose, settings.show_level_prefix);
    if let Some(file) = log_file.or(settings.file.as_deref()) {
        log.open(file)
            .with_context(|| format!("Failed to open the log file {}", file.display()))?;
    }
    Ok(())
}

fn describe_type(loadable_type: &LoadableType) -> String {
    let mut description = format!("{} ({})\n", loadable_type.name(), loadable_type.class_name());
    for loader in loadable_type.loaders() {
        let load = if loader.can_load() { "load" } else { "-" };
        let save = if loader.can_save() { "save" } else { "-" };
        let _ = writeln!(
            description,
            "  {}: {} [{load}, {save}] {}",
            loader.class_name(),
            loader.formats().join(", "),
            loader.description(),
        );
    }
    description
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use plcore::{loadable::LoadableManager, log::Log};
    use tracing::level_filters::LevelFilter;

    use crate::cli::{Command, Options};

    use super::{describe_type, run_and_close_log};

    #[test]
    fn log_is_closed_when_the_command_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("out.xml");
        let mut log = Log::new();
        log.open(&log_path).unwrap();
        let log = log.into_shared();

        let opts = Options {
            verbosity_level: LevelFilter::OFF,
            settings_path: PathBuf::from("pltool.json"),
            base_dirs: vec![dir.path().to_string_lossy().into_owned()],
            log_file: None,
            command: Command::Find {
                create: false,
                file: "missing.txt".to_owned(),
            },
        };
        assert!(run_and_close_log(opts, &[], &[], &log).is_err());

        assert!(!log.lock().is_open());
        assert!(fs::read_to_string(&log_path).unwrap().ends_with("</Log>\n"));
    }

    #[test]
    fn describes_loaders() {
        let mut manager = LoadableManager::new();
        crate::builtin::enqueue_loaders(&mut manager);
        let log_type = manager.type_by_name("Log").unwrap();
        assert_eq!(
            "Log (LogFormatter)\n  \
             LogFormatterText: txt, log [-, save] ASCII text log\n  \
             LogFormatterXml: xml [-, save] XML log\n  \
             LogFormatterHtml: html [-, save] HTML log\n",
            describe_type(log_type),
        );
    }
}
