// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! The file access used by [`LoadableManager`](crate::loadable::LoadableManager)
//! to resolve files against its base directories.
//!
//! Paths are handled as `/`-separated strings ("urls"), since base
//! directories may also point inside archives, which a [`FileSystem`]
//! implementation can choose to support.

use std::{
    env,
    fs::{self, OpenOptions},
    io::{self, Read, Write},
    path::Path,
};

/// How [`FileSystem::open`] should open a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing file for reading.
    Read,
    /// Create the file if needed, truncate it, and open it for writing.
    Write,
}

/// An open file.
pub trait FileHandle: Read + Write + Send {}

impl<T: Read + Write + Send> FileHandle for T {}

/// A trait for the file system operations needed for resolving files, so
/// that the resolution logic does not depend on [`std::fs`] directly.
///
/// All functions take `&self` and the trait is object safe, so a
/// `Box<dyn FileSystem>` can be stored and shared freely.
pub trait FileSystem: Send + Sync {
    /// Returns true if `path` is an existing file.
    fn is_file(&self, path: &str) -> bool;

    /// Returns true if `path` is an existing directory.
    fn is_dir(&self, path: &str) -> bool;

    /// Creates an empty file at `path` if it does not exist yet. Existing
    /// files are left as they are.
    fn create_file(&self, path: &str) -> io::Result<()>;

    /// Opens the file at `path`.
    fn open(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn FileHandle>>;

    /// Returns the names of the files (not directories) in the directory,
    /// sorted.
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>>;

    /// Returns `path` as an absolute, `/`-separated path. Relative paths are
    /// relative to the current working directory, and an empty path is the
    /// current working directory itself.
    fn absolute(&self, path: &str) -> io::Result<String>;
}

/// [`FileSystem`] implemented with [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn is_file(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn is_dir(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn create_file(&self, path: &str) -> io::Result<()> {
        OpenOptions::new().write(true).create(true).open(path)?;
        Ok(())
    }

    fn open(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn FileHandle>> {
        let file = match mode {
            OpenMode::Read => OpenOptions::new().read(true).open(path)?,
            OpenMode::Write => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
        };
        Ok(Box::new(file))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn absolute(&self, path: &str) -> io::Result<String> {
        let path = Path::new(path);
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir()?.join(path)
        };
        Ok(absolute.to_string_lossy().replace('\\', "/"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::{FileSystem, OpenMode, StdFileSystem};

    #[test]
    fn std_file_system_works_at_all() {
        let dir = tempfile::tempdir().unwrap();
        let root = StdFileSystem.absolute(dir.path().to_str().unwrap()).unwrap();
        let file = format!("{root}/a.txt");

        assert!(StdFileSystem.is_dir(&root));
        assert!(!StdFileSystem.is_file(&file));
        StdFileSystem.create_file(&file).unwrap();
        assert!(StdFileSystem.is_file(&file));

        let mut handle = StdFileSystem.open(&file, OpenMode::Write).unwrap();
        handle.write_all(b"contents").unwrap();
        drop(handle);

        let mut contents = String::new();
        let mut handle = StdFileSystem.open(&file, OpenMode::Read).unwrap();
        handle.read_to_string(&mut contents).unwrap();
        assert_eq!("contents", contents);

        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        assert_eq!(vec!["a.txt"], StdFileSystem.read_dir(&root).unwrap());
    }

    #[test]
    fn relative_paths_are_made_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let cwd = cwd.to_string_lossy().replace('\\', "/");
        let absolute = StdFileSystem.absolute("data").unwrap();
        assert!(absolute.starts_with(&cwd));
        assert!(absolute.ends_with("data"));
        assert!(StdFileSystem.absolute("").unwrap().starts_with(&cwd));
    }
}
