// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    collections::{BTreeMap, BTreeSet},
    io::{self, Cursor, Read, Write},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::file_system::{FileHandle, FileSystem, OpenMode};

type Files = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

/// In-memory [`FileSystem`] for tests. Paths are used as-is, there's no
/// working directory (relative paths get a `/cwd/` prefix), and every
/// [`FileSystem::is_file`] call is recorded into `probes`.
///
/// Clones share the same files, so a test can keep a clone to inspect the
/// one it gave away.
#[derive(Clone, Default)]
pub struct TestFileSystem {
    files: Files,
    dirs: Arc<Mutex<BTreeSet<String>>>,
    read_only_dirs: Arc<Mutex<BTreeSet<String>>>,
    pub probes: Arc<Mutex<Vec<String>>>,
}

impl TestFileSystem {
    pub fn new() -> TestFileSystem {
        TestFileSystem::default()
    }

    /// Adds a file, and its parent directory.
    pub fn with_file(self, path: &str, contents: &str) -> TestFileSystem {
        if let Some((dir, _)) = path.rsplit_once('/') {
            self.dirs.lock().insert(format!("{dir}/"));
        }
        self.files
            .lock()
            .insert(path.to_owned(), contents.as_bytes().to_vec());
        self
    }

    /// Adds a directory (with a trailing slash).
    pub fn with_dir(self, dir: &str) -> TestFileSystem {
        self.dirs.lock().insert(dir.to_owned());
        self
    }

    /// Makes file creation fail in the directory (with a trailing slash).
    pub fn with_read_only_dir(self, dir: &str) -> TestFileSystem {
        self.read_only_dirs.lock().insert(dir.to_owned());
        self.with_dir(dir)
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        let files = self.files.lock();
        files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn parent(path: &str) -> &str {
        path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

struct TestFile {
    path: String,
    files: Files,
    reader: Cursor<Vec<u8>>,
}

impl Read for TestFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Write for TestFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut files = self.files.lock();
        files.entry(self.path.clone()).or_default().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for TestFileSystem {
    fn is_file(&self, path: &str) -> bool {
        self.probes.lock().push(path.to_owned());
        self.files.lock().contains_key(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        let dir = format!("{}/", path.trim_end_matches('/'));
        self.dirs.lock().contains(&dir)
    }

    fn create_file(&self, path: &str) -> io::Result<()> {
        let dir = format!("{}/", Self::parent(path));
        if self.read_only_dirs.lock().contains(&dir) {
            return Err(io::ErrorKind::PermissionDenied.into());
        }
        if !self.dirs.lock().contains(&dir) {
            return Err(io::ErrorKind::NotFound.into());
        }
        self.files.lock().entry(path.to_owned()).or_default();
        Ok(())
    }

    fn open(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn FileHandle>> {
        let contents = match mode {
            OpenMode::Read => self
                .files
                .lock()
                .get(path)
                .cloned()
                .ok_or(io::ErrorKind::NotFound)?,
            OpenMode::Write => {
                self.create_file(path)?;
                self.files.lock().insert(path.to_owned(), Vec::new());
                Vec::new()
            }
        };
        Ok(Box::new(TestFile {
            path: path.to_owned(),
            files: self.files.clone(),
            reader: Cursor::new(contents),
        }))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        if !self.is_dir(path) {
            return Err(io::ErrorKind::NotFound.into());
        }
        let dir = path.trim_end_matches('/');
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|file| Self::parent(file) == dir)
            .map(|file| file[dir.len() + 1..].to_owned())
            .collect())
    }

    fn absolute(&self, path: &str) -> io::Result<String> {
        if path.starts_with('/') {
            Ok(path.to_owned())
        } else {
            Ok(format!("/cwd/{path}"))
        }
    }
}
