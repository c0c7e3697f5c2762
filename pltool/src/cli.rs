// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use bpaf::{batteries::verbose_by_slice, construct, long, positional, OptionParser, Parser};
use plcore::log::LogLevel;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone)]
pub struct Options {
    pub verbosity_level: LevelFilter,
    pub settings_path: PathBuf,
    /// Searched after the base directories of the settings file.
    pub base_dirs: Vec<String>,
    /// Overrides the log file of the settings file.
    pub log_file: Option<PathBuf>,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Find { create: bool, file: String },
    Formats { type_name: Option<String> },
    Log { level: LogLevel, message: String },
}

pub fn options() -> OptionParser<Options> {
    let verbosity_level = verbose_by_slice(
        2,
        [
            LevelFilter::OFF,
            LevelFilter::ERROR,
            LevelFilter::WARN,
            LevelFilter::INFO,
            LevelFilter::DEBUG,
            LevelFilter::TRACE,
        ],
    );

    let settings_path = long("settings")
        .help("Selects the settings file to read, defaults are used if it doesn't exist")
        .argument("FILE")
        .fallback(PathBuf::from("pltool.json"))
        .complete_shell(bpaf::ShellComp::File {
            mask: Some("*.json"),
        });

    let base_dirs = long("base-dir")
        .help("Adds a base directory to search files from, can be repeated")
        .argument("DIR")
        .complete_shell(bpaf::ShellComp::Dir { mask: None })
        .many();

    let log_file = long("log")
        .help("Writes the log into FILE, formatted based on its extension (txt, log, xml, html)")
        .argument("FILE")
        .optional();

    let find = find();
    let formats = formats();
    let log = log();
    let command = construct!([find, formats, log]);

    construct!(Options {
        verbosity_level,
        settings_path,
        base_dirs,
        log_file,
        command,
    })
    .to_options()
    .descr("Inspects the loader registry and the base directories, and writes logs")
}

fn find() -> impl Parser<Command> {
    let create = long("create")
        .help("Creates the file in the first writable base directory if it doesn't exist")
        .switch();
    let file = positional("FILE").help("The file to look for, relative to the base directories");
    construct!(Command::Find { create, file })
        .to_options()
        .descr("Prints the path a file resolves to")
        .command("find")
}

fn formats() -> impl Parser<Command> {
    let type_name = long("type")
        .help("Only lists the loaders of this loadable type")
        .argument("NAME")
        .optional();
    construct!(Command::Formats { type_name })
        .to_options()
        .descr("Lists the loadable types, their loaders and formats")
        .command("formats")
}

fn log() -> impl Parser<Command> {
    let level = positional::<LogLevel>("LEVEL").help("e.g. error, warning, info, debug or debug2");
    let message = positional("MESSAGE");
    construct!(Command::Log { level, message })
        .to_options()
        .descr("Writes a message into the log")
        .command("log")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use plcore::log::LogLevel;
    use tracing::level_filters::LevelFilter;

    use super::{options, Command};

    #[test]
    fn check_bpaf_invariants() {
        options().check_invariants(true);
    }

    #[test]
    fn find_with_base_dirs() {
        let parsed = options()
            .run_inner(&[
                "-v",
                "--base-dir",
                "data",
                "--base-dir",
                "mods",
                "find",
                "--create",
                "a.txt",
            ])
            .unwrap();
        assert_eq!(LevelFilter::INFO, parsed.verbosity_level);
        assert_eq!(PathBuf::from("pltool.json"), parsed.settings_path);
        assert_eq!(vec!["data", "mods"], parsed.base_dirs);
        assert_eq!(
            Command::Find {
                create: true,
                file: "a.txt".to_owned()
            },
            parsed.command
        );
    }

    #[test]
    fn log_parses_the_level() {
        let parsed = options()
            .run_inner(&["--log", "out.xml", "log", "Debug2", "hello"])
            .unwrap();
        assert_eq!(LevelFilter::WARN, parsed.verbosity_level);
        assert_eq!(Some(PathBuf::from("out.xml")), parsed.log_file);
        assert_eq!(
            Command::Log {
                level: LogLevel::debug(2),
                message: "hello".to_owned()
            },
            parsed.command
        );

        assert!(options().run_inner(&["log", "loud", "hello"]).is_err());
    }
}
