// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{collections::HashMap, fmt, io::Read, mem, path::Path, sync::Arc};

use tracing::{debug, error};

use crate::file_system::{FileHandle, FileSystem, OpenMode, StdFileSystem};

use super::{
    extension, loadable_type::LoaderIndex, normalize_format, LoadableType, Loader,
    LoaderDescriptor, ResolveError,
};

/// Why a queued [`LoaderDescriptor`] was not registered.
#[derive(Debug, thiserror::Error)]
enum RegistrationError {
    #[error("Class has no 'Type'-property")]
    MissingType,
    #[error("Unable to find the loader base class")]
    MissingBaseClass,
    #[error("Loader base class has no 'Type'-property")]
    BaseClassWithoutType,
    #[error("Loader base class 'Type'-property and loader class 'Type'-property mismatch")]
    TypeMismatch,
    #[error("Loader base class doesn't match the one specified by the 'Type'-property")]
    WrongBaseClass,
    #[error("A loader with this class name is already registered")]
    AlreadyRegistered,
}

/// A file opened by [`LoadableManager::open_file`].
pub struct ResolvedFile {
    /// The absolute path of the file.
    pub url: String,
    pub handle: Box<dyn FileHandle>,
}

impl fmt::Debug for ResolvedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedFile")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Directory of the [`LoadableType`]s and [`Loader`]s, and the base
/// directories resources are searched from.
///
/// Loaders are announced with [`LoadableManager::enqueue`], e.g. from a
/// plugin system as the plugins get loaded, and only registered when the
/// registry is next queried. All the querying methods take `&mut self` for
/// this reason. [`LoadableManager::register_loader`] registers immediately.
///
/// Base directories are absolute, `/`-terminated paths, searched in order:
/// the first base directory has the highest priority. An empty path stands
/// for the current working directory.
pub struct LoadableManager {
    types: Vec<LoadableType>,
    type_indices: HashMap<String, usize>,
    index: LoaderIndex,
    /// Announced, but not yet registered loaders.
    pending: Vec<LoaderDescriptor>,
    base_dirs: Vec<String>,
    file_system: Box<dyn FileSystem>,
}

impl LoadableManager {
    /// Creates an empty manager using [`StdFileSystem`].
    pub fn new() -> LoadableManager {
        LoadableManager::with_file_system(Box::new(StdFileSystem))
    }

    pub fn with_file_system(file_system: Box<dyn FileSystem>) -> LoadableManager {
        LoadableManager {
            types: Vec::new(),
            type_indices: HashMap::new(),
            index: LoaderIndex::default(),
            pending: Vec::new(),
            base_dirs: Vec::new(),
            file_system,
        }
    }

    pub fn file_system(&self) -> &dyn FileSystem {
        self.file_system.as_ref()
    }

    /// Queues a loader for registration. The descriptor is validated and
    /// registered by [`LoadableManager::register_classes`], which all the
    /// registry queries call first.
    pub fn enqueue(&mut self, descriptor: LoaderDescriptor) {
        self.pending.push(descriptor);
    }

    /// Registers a loader right away. Equivalent to [`LoadableManager::enqueue`]
    /// followed by [`LoadableManager::register_classes`].
    pub fn register_loader(&mut self, descriptor: LoaderDescriptor) {
        self.enqueue(descriptor);
        self.register_classes();
    }

    /// Registers all the queued loaders. Malformed descriptors are logged as
    /// errors and skipped.
    pub fn register_classes(&mut self) {
        for descriptor in mem::take(&mut self.pending) {
            if let Err(err) = self.register(&descriptor) {
                error!(
                    "Failed to register the loader class '{}': {err}",
                    descriptor.class_name
                );
            }
        }
    }

    fn register(&mut self, descriptor: &LoaderDescriptor) -> Result<(), RegistrationError> {
        let type_name = descriptor
            .type_name
            .as_deref()
            .filter(|type_name| !type_name.is_empty())
            .ok_or(RegistrationError::MissingType)?;
        if self
            .index
            .loaders
            .iter()
            .any(|loader| loader.class_name() == descriptor.class_name)
        {
            return Err(RegistrationError::AlreadyRegistered);
        }

        let type_index = match self.type_indices.get(type_name) {
            Some(&type_index) => type_index,
            None => {
                let base = descriptor
                    .base
                    .as_ref()
                    .ok_or(RegistrationError::MissingBaseClass)?;
                let base_type = base
                    .type_name
                    .as_deref()
                    .filter(|base_type| !base_type.is_empty())
                    .ok_or(RegistrationError::BaseClassWithoutType)?;
                if base_type != type_name {
                    return Err(RegistrationError::TypeMismatch);
                }
                debug!("New loadable type {type_name} ({})", base.class_name);
                self.types
                    .push(LoadableType::new(type_name, &base.class_name));
                self.type_indices
                    .insert(type_name.to_owned(), self.types.len() - 1);
                self.types.len() - 1
            }
        };

        let loadable_type = &mut self.types[type_index];
        let base_class = descriptor.base.as_ref().map(|base| base.class_name.as_str());
        if base_class != Some(loadable_type.class_name()) {
            return Err(RegistrationError::WrongBaseClass);
        }
        let loader = Arc::new(Loader::new(descriptor, type_name));
        loadable_type.add_loader(loader, &mut self.index);
        Ok(())
    }

    /// Unregisters the loader with the given class name, returning it.
    pub fn remove_loader(&mut self, class_name: &str) -> Option<Arc<Loader>> {
        self.register_classes();
        let loader = self
            .index
            .loaders
            .iter()
            .find(|loader| loader.class_name() == class_name)?
            .clone();
        let type_index = *self.type_indices.get(loader.type_name())?;
        self.types[type_index].remove_loader(&loader, &mut self.index);
        Some(loader)
    }

    pub fn num_types(&mut self) -> usize {
        self.register_classes();
        self.types.len()
    }

    pub fn types(&mut self) -> &[LoadableType] {
        self.register_classes();
        &self.types
    }

    pub fn type_by_name(&mut self, name: &str) -> Option<&LoadableType> {
        self.register_classes();
        let type_index = *self.type_indices.get(name)?;
        self.types.get(type_index)
    }

    /// The type of the first loader registered for the extension.
    pub fn type_by_extension(&mut self, extension: &str) -> Option<&LoadableType> {
        self.register_classes();
        let name = self
            .index
            .types_by_extension
            .get(&normalize_format(extension))?;
        let type_index = *self.type_indices.get(name)?;
        self.types.get(type_index)
    }

    pub fn num_loaders(&mut self) -> usize {
        self.register_classes();
        self.index.loaders.len()
    }

    pub fn loaders(&mut self) -> &[Arc<Loader>] {
        self.register_classes();
        &self.index.loaders
    }

    /// The first loader registered for the extension, of any type.
    pub fn loader_by_extension(&mut self, extension: &str) -> Option<&Arc<Loader>> {
        self.register_classes();
        self.index
            .loaders_by_extension
            .get(&normalize_format(extension))
    }

    /// All the formats handled by any loader.
    pub fn formats(&mut self) -> &[String] {
        self.register_classes();
        &self.index.formats
    }

    /// Returns whether a loader of `type_name` (or of any type if `None`) can
    /// load files with the extension.
    pub fn is_format_load_supported(&mut self, extension: &str, type_name: Option<&str>) -> bool {
        self.loader_for(extension, type_name)
            .is_some_and(|loader| loader.can_load())
    }

    /// Returns whether a loader of `type_name` (or of any type if `None`) can
    /// save files with the extension.
    pub fn is_format_save_supported(&mut self, extension: &str, type_name: Option<&str>) -> bool {
        self.loader_for(extension, type_name)
            .is_some_and(|loader| loader.can_save())
    }

    fn loader_for(&mut self, extension: &str, type_name: Option<&str>) -> Option<&Arc<Loader>> {
        match type_name {
            Some(type_name) => self.type_by_name(type_name)?.loader_by_extension(extension),
            None => self.loader_by_extension(extension),
        }
    }

    /// Turns `path` into an absolute, `/`-terminated base directory path.
    fn normalize_dir(&self, path: &str) -> Result<String, ResolveError> {
        let mut url = self
            .file_system
            .absolute(&path.replace('\\', "/"))
            .map_err(|source| ResolveError::Io {
                path: path.to_owned(),
                source,
            })?;
        if !url.ends_with('/') {
            url.push('/');
        }
        Ok(url)
    }

    pub fn base_dirs(&self) -> &[String] {
        &self.base_dirs
    }

    pub fn is_base_dir(&self, path: &str) -> bool {
        self.normalize_dir(path)
            .is_ok_and(|url| self.base_dirs.contains(&url))
    }

    /// Appends a base directory, with the lowest priority. Adding an existing
    /// base directory does nothing.
    pub fn add_base_dir(&mut self, path: &str) -> Result<(), ResolveError> {
        let url = self.normalize_dir(path)?;
        if !self.base_dirs.contains(&url) {
            debug!("Added base directory {url}");
            self.base_dirs.push(url);
        }
        Ok(())
    }

    /// Moves `first` directly before `second` in the base directories, if it
    /// isn't already before it. Both must be base directories already.
    pub fn set_base_dir_priority(&mut self, first: &str, second: &str) -> Result<(), ResolveError> {
        if first == second {
            return Ok(());
        }
        let first = self.normalize_dir(first)?;
        let second = self.normalize_dir(second)?;
        let position = |dir: &str| {
            self.base_dirs
                .iter()
                .position(|base_dir| base_dir == dir)
                .ok_or_else(|| ResolveError::NotBaseDir(dir.to_owned()))
        };
        let first_index = position(&first)?;
        let second_index = position(&second)?;

        if first_index > second_index {
            let first = self.base_dirs.remove(first_index);
            self.base_dirs.insert(second_index, first);
        }
        Ok(())
    }

    pub fn remove_base_dir(&mut self, path: &str) -> Result<(), ResolveError> {
        let url = self.normalize_dir(path)?;
        let index = self
            .base_dirs
            .iter()
            .position(|base_dir| *base_dir == url)
            .ok_or(ResolveError::NotBaseDir(url))?;
        self.base_dirs.remove(index);
        Ok(())
    }

    pub fn remove_base_dir_at(&mut self, index: usize) -> Result<String, ResolveError> {
        if index >= self.base_dirs.len() {
            return Err(ResolveError::NoBaseDirAt(index));
        }
        Ok(self.base_dirs.remove(index))
    }

    pub fn clear_base_dirs(&mut self) {
        self.base_dirs.clear();
    }

    /// Returns `filename` relative to the first base directory containing it,
    /// or unchanged if no base directory contains it. Returns `None` for
    /// files which are not of any registered loadable type.
    pub fn relative_filename(&mut self, filename: &str) -> Option<String> {
        let extension = extension(filename)?;
        self.type_by_extension(&extension)?;
        let filename = filename.replace('\\', "/");
        let relative = self
            .base_dirs
            .iter()
            .filter(|base_dir| !base_dir.is_empty())
            .find_map(|base_dir| filename.strip_prefix(base_dir.as_str()))
            .map(str::to_owned);
        Some(relative.unwrap_or(filename))
    }

    /// Adds every file in the directory at `path` with the given extension
    /// (e.g. `"zip"` or `"*.zip"`) as a base directory, in name order. Returns
    /// how many packages were found.
    ///
    /// Whether files inside the packages can be opened depends on the
    /// [`FileSystem`].
    pub fn scan_packages(&mut self, path: &str, extension: &str) -> Result<usize, ResolveError> {
        if path.is_empty() {
            return Err(ResolveError::Empty("package directory"));
        }
        let extension = normalize_format(extension);
        if extension.is_empty() {
            return Err(ResolveError::Empty("package extension"));
        }

        let dir = self.normalize_dir(path)?;
        if !self.file_system.is_dir(&dir) {
            return Err(ResolveError::NotADirectory(path.to_owned()));
        }
        let names = self
            .file_system
            .read_dir(&dir)
            .map_err(|source| ResolveError::Io {
                path: dir.clone(),
                source,
            })?;

        let suffix = format!(".{extension}");
        let mut found = 0;
        for name in names {
            if name.to_ascii_lowercase().ends_with(&suffix) {
                self.add_base_dir(&format!("{dir}{name}/"))?;
                found += 1;
            }
        }
        Ok(found)
    }

    /// Returns the absolute path of the first existing file called
    /// `filename` in the base directories, or `filename` itself if it's
    /// absolute and exists.
    pub fn find_file(&self, filename: &str) -> Option<String> {
        let filename = filename.replace('\\', "/");
        if Path::new(&filename).is_absolute() || self.base_dirs.is_empty() {
            let url = self.file_system.absolute(&filename).ok()?;
            return self.file_system.is_file(&url).then_some(url);
        }
        self.base_dirs
            .iter()
            .map(|base_dir| format!("{base_dir}{filename}"))
            .find(|candidate| self.file_system.is_file(candidate))
    }

    /// Opens a file, searching for it in the base directories unless it's
    /// absolute. Without base directories, relative paths are relative to
    /// the working directory.
    ///
    /// With `create`, the file is opened for writing (and truncated). If the
    /// file does not exist in any base directory, it is created in the
    /// highest priority base directory where creating it succeeds.
    pub fn open_file(&self, filename: &str, create: bool) -> Result<ResolvedFile, ResolveError> {
        let normalized = filename.replace('\\', "/");
        let url = if Path::new(&normalized).is_absolute() || self.base_dirs.is_empty() {
            self.file_system
                .absolute(&normalized)
                .map_err(|source| ResolveError::Io {
                    path: filename.to_owned(),
                    source,
                })?
        } else {
            match self.find_file(&normalized) {
                Some(url) => url,
                None if create => self
                    .base_dirs
                    .iter()
                    .map(|base_dir| format!("{base_dir}{normalized}"))
                    .find(|candidate| self.file_system.create_file(candidate).is_ok())
                    .ok_or_else(|| ResolveError::NotFound(filename.to_owned()))?,
                None => return Err(ResolveError::NotFound(filename.to_owned())),
            }
        };

        let mode = if create {
            OpenMode::Write
        } else {
            OpenMode::Read
        };
        let handle = self
            .file_system
            .open(&url, mode)
            .map_err(|source| ResolveError::Io {
                path: url.clone(),
                source,
            })?;
        Ok(ResolvedFile { url, handle })
    }

    /// Reads a whole file, found like in [`LoadableManager::open_file`], into
    /// a string.
    pub fn load_string_from_file(&self, filename: &str) -> Result<String, ResolveError> {
        let mut file = self.open_file(filename, false)?;
        let mut contents = String::new();
        file.handle
            .read_to_string(&mut contents)
            .map_err(|source| ResolveError::Io {
                path: file.url.clone(),
                source,
            })?;
        Ok(contents)
    }
}

impl Default for LoadableManager {
    fn default() -> Self {
        LoadableManager::new()
    }
}
