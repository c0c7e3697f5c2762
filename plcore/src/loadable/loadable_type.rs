// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use tracing::{info, warn};

use super::{complete_extension, extension, normalize_format, Loader};

/// The manager-wide lookup tables, maintained by [`LoadableType::add_loader`]
/// and [`LoadableType::remove_loader`].
#[derive(Debug, Default)]
pub(super) struct LoaderIndex {
    pub loaders: Vec<Arc<Loader>>,
    /// First registrant wins on collisions between types.
    pub loaders_by_extension: HashMap<String, Arc<Loader>>,
    pub formats: Vec<String>,
    pub types_by_extension: HashMap<String, String>,
}

/// A category of loadable resources, e.g. "Mesh", and the loaders handling
/// its formats.
#[derive(Debug)]
pub struct LoadableType {
    name: String,
    /// The loader base class every loader of this type derives from.
    class_name: String,
    loaders: Vec<Arc<Loader>>,
    /// Within a type, every extension has at most one loader.
    loaders_by_extension: HashMap<String, Arc<Loader>>,
    formats: Vec<String>,
}

impl LoadableType {
    pub(super) fn new(name: &str, class_name: &str) -> LoadableType {
        LoadableType {
            name: name.to_owned(),
            class_name: class_name.to_owned(),
            loaders: Vec::new(),
            loaders_by_extension: HashMap::new(),
            formats: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name of the loader base class of this type.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn loaders(&self) -> &[Arc<Loader>] {
        &self.loaders
    }

    /// The formats handled by the loaders of this type, in registration
    /// order.
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn loader_by_extension(&self, extension: &str) -> Option<&Arc<Loader>> {
        self.loaders_by_extension.get(&normalize_format(extension))
    }

    pub fn loader_for_loading_by_extension(&self, extension: &str) -> Option<&Arc<Loader>> {
        self.loader_by_extension(extension)
            .filter(|loader| loader.can_load())
    }

    pub fn loader_for_saving_by_extension(&self, extension: &str) -> Option<&Arc<Loader>> {
        self.loader_by_extension(extension)
            .filter(|loader| loader.can_save())
    }

    /// Finds a loader which can load `filename`, based on its extension, or
    /// failing that, its complete extension (e.g. `tar.gz`).
    pub fn loader_for_loading_by_file(&self, filename: &str) -> Option<&Arc<Loader>> {
        self.loader_by_file(filename, Loader::can_load)
    }

    /// Finds a loader which can save `filename`, based on its extension, or
    /// failing that, its complete extension (e.g. `tar.gz`).
    pub fn loader_for_saving_by_file(&self, filename: &str) -> Option<&Arc<Loader>> {
        self.loader_by_file(filename, Loader::can_save)
    }

    fn loader_by_file(&self, filename: &str, capable: fn(&Loader) -> bool) -> Option<&Arc<Loader>> {
        [extension(filename), complete_extension(filename)]
            .into_iter()
            .flatten()
            .find_map(|extension| {
                self.loaders_by_extension
                    .get(&extension)
                    .filter(|loader| capable(loader))
            })
    }

    /// Registers the loader for each of its formats not yet claimed within
    /// this type, both here and in the manager-wide `index`.
    pub(super) fn add_loader(&mut self, loader: Arc<Loader>, index: &mut LoaderIndex) {
        for format in loader.formats() {
            if let Some(existing) = self.loaders_by_extension.get(format) {
                warn!(
                    "{} '{}': the format '{}' is already handled by '{}', skipping it",
                    self.name,
                    loader.class_name(),
                    format,
                    existing.class_name(),
                );
                continue;
            }
            self.loaders_by_extension
                .insert(format.clone(), loader.clone());
            self.formats.push(format.clone());

            match index.loaders_by_extension.entry(format.clone()) {
                Entry::Occupied(existing) => {
                    info!(
                        "{} '{}': the format '{}' is already handled by '{}' of type {} (uncritical)",
                        self.name,
                        loader.class_name(),
                        format,
                        existing.get().class_name(),
                        existing.get().type_name(),
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(loader.clone());
                    index.formats.push(format.clone());
                    index
                        .types_by_extension
                        .insert(format.clone(), self.name.clone());
                }
            }
        }

        self.loaders.push(loader.clone());
        index.loaders.push(loader);
    }

    /// Removes the loader from this type, and its formats from the
    /// manager-wide `index` where it is the registered loader.
    pub(super) fn remove_loader(&mut self, loader: &Arc<Loader>, index: &mut LoaderIndex) {
        self.loaders.retain(|other| !Arc::ptr_eq(other, loader));
        index.loaders.retain(|other| !Arc::ptr_eq(other, loader));

        for format in loader.formats() {
            if self
                .loaders_by_extension
                .get(format)
                .is_some_and(|owner| Arc::ptr_eq(owner, loader))
            {
                self.loaders_by_extension.remove(format);
                self.formats.retain(|other| other != format);
            }

            if index
                .loaders_by_extension
                .get(format)
                .is_some_and(|owner| Arc::ptr_eq(owner, loader))
            {
                index.loaders_by_extension.remove(format);
                index.formats.retain(|other| other != format);
                index.types_by_extension.remove(format);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{LoadableType, LoaderIndex};
    use crate::loadable::{Loader, LoaderDescriptor};

    fn loader(class_name: &str, type_name: &str, formats: &[&str]) -> Arc<Loader> {
        let descriptor = LoaderDescriptor::new(class_name, type_name, "Base")
            .with_formats(formats.iter().copied())
            .with_load(true);
        Arc::new(Loader::new(&descriptor, type_name))
    }

    #[test]
    fn first_loader_keeps_a_colliding_extension() {
        let mut index = LoaderIndex::default();
        let mut mesh = LoadableType::new("Mesh", "MeshLoader");
        let first = loader("MeshLoaderObj", "Mesh", &["obj"]);
        let second = loader("MeshLoaderObj2", "Mesh", &["obj", "obj2"]);

        mesh.add_loader(first.clone(), &mut index);
        mesh.add_loader(second.clone(), &mut index);

        assert!(Arc::ptr_eq(&first, mesh.loader_by_extension("obj").unwrap()));
        assert!(Arc::ptr_eq(&second, mesh.loader_by_extension("obj2").unwrap()));
        assert_eq!(["obj", "obj2"], mesh.formats());
        assert_eq!(2, mesh.loaders().len());
        assert_eq!(vec!["obj", "obj2"], index.formats);
    }

    #[test]
    fn removal_does_not_stomp_other_types() {
        let mut index = LoaderIndex::default();
        let mut mesh = LoadableType::new("Mesh", "MeshLoader");
        let mut scene = LoadableType::new("Scene", "SceneLoader");
        let mesh_x = loader("MeshLoaderX", "Mesh", &["x"]);
        let scene_x = loader("SceneLoaderX", "Scene", &["x"]);

        mesh.add_loader(mesh_x.clone(), &mut index);
        scene.add_loader(scene_x.clone(), &mut index);
        assert!(Arc::ptr_eq(&mesh_x, &index.loaders_by_extension["x"]));
        assert!(Arc::ptr_eq(&scene_x, scene.loader_by_extension("x").unwrap()));

        scene.remove_loader(&scene_x, &mut index);
        assert!(scene.loader_by_extension("x").is_none());
        assert!(Arc::ptr_eq(&mesh_x, &index.loaders_by_extension["x"]));
        assert_eq!("Mesh", index.types_by_extension["x"]);

        mesh.remove_loader(&mesh_x, &mut index);
        assert!(index.loaders_by_extension.is_empty());
        assert!(index.types_by_extension.is_empty());
        assert!(index.loaders.is_empty());
        assert!(index.formats.is_empty());
    }

    #[test]
    fn loading_by_file_falls_back_to_complete_extension() {
        let mut index = LoaderIndex::default();
        let mut archive = LoadableType::new("Archive", "ArchiveLoader");
        let tar_gz = loader("ArchiveLoaderTarGz", "Archive", &["tar.gz"]);
        let descriptor = LoaderDescriptor::new("ArchiveLoaderGz", "Archive", "ArchiveLoader")
            .with_formats(["gz"])
            .with_save(true);
        let gz = Arc::new(Loader::new(&descriptor, "Archive"));
        archive.add_loader(tar_gz.clone(), &mut index);
        archive.add_loader(gz.clone(), &mut index);

        let found = archive.loader_for_loading_by_file("data/backup.TAR.GZ").unwrap();
        assert!(Arc::ptr_eq(&tar_gz, found));
        let found = archive.loader_for_saving_by_file("data/backup.gz").unwrap();
        assert!(Arc::ptr_eq(&gz, found));
        assert!(archive.loader_for_loading_by_file("data/backup.gz").is_none());
        assert!(archive.loader_for_saving_by_file("data/backup.zip").is_none());
        assert!(archive.loader_for_loading_by_extension("gz").is_none());
        assert!(archive.loader_for_saving_by_extension("gz").is_some());
    }
}
