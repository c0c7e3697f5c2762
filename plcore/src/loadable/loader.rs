// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use super::normalize_format;

/// The loader base class a loader implementation belongs to. All loaders of
/// one [`LoadableType`](super::LoadableType) share the same base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderBase {
    pub class_name: String,
    /// The loadable type the base class declares. Must match the type of the
    /// loaders deriving from it.
    pub type_name: Option<String>,
}

/// Declared metadata of a loader implementation, as announced to
/// [`LoadableManager::enqueue`](super::LoadableManager::enqueue).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderDescriptor {
    pub class_name: String,
    /// The loadable type, e.g. "Mesh" or "Config".
    pub type_name: Option<String>,
    /// `None` if the loader base class can't be found.
    pub base: Option<LoaderBase>,
    pub description: String,
    /// The formats, i.e. file extensions, the loader handles, e.g. `"obj"` or
    /// `"tar.gz"`.
    pub formats: Vec<String>,
    pub can_load: bool,
    pub can_save: bool,
}

impl LoaderDescriptor {
    /// A well-formed descriptor for a loader of `type_name`, deriving from
    /// the base class `base_class_name`. Handles no formats until
    /// [`LoaderDescriptor::with_formats`].
    pub fn new(
        class_name: impl Into<String>,
        type_name: impl Into<String>,
        base_class_name: impl Into<String>,
    ) -> LoaderDescriptor {
        let type_name = type_name.into();
        LoaderDescriptor {
            class_name: class_name.into(),
            base: Some(LoaderBase {
                class_name: base_class_name.into(),
                type_name: Some(type_name.clone()),
            }),
            type_name: Some(type_name),
            ..Default::default()
        }
    }

    pub fn with_formats<I, S>(mut self, formats: I) -> LoaderDescriptor
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_load(mut self, can_load: bool) -> LoaderDescriptor {
        self.can_load = can_load;
        self
    }

    pub fn with_save(mut self, can_save: bool) -> LoaderDescriptor {
        self.can_save = can_save;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> LoaderDescriptor {
        self.description = description.into();
        self
    }
}

/// A registered loader implementation.
#[derive(Debug, PartialEq, Eq)]
pub struct Loader {
    class_name: String,
    type_name: String,
    description: String,
    /// Normalized (lowercase, no leading dot) and deduplicated.
    formats: Vec<String>,
    can_load: bool,
    can_save: bool,
}

impl Loader {
    pub(crate) fn new(descriptor: &LoaderDescriptor, type_name: &str) -> Loader {
        let mut formats: Vec<String> = Vec::with_capacity(descriptor.formats.len());
        for format in descriptor.formats.iter().map(|format| normalize_format(format)) {
            if !format.is_empty() && !formats.contains(&format) {
                formats.push(format);
            }
        }
        Loader {
            class_name: descriptor.class_name.clone(),
            type_name: type_name.to_owned(),
            description: descriptor.description.clone(),
            formats,
            can_load: descriptor.can_load,
            can_save: descriptor.can_save,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The name of the [`LoadableType`](super::LoadableType) this loader
    /// belongs to.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The formats (file extensions) this loader claims.
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn is_format_supported(&self, format: &str) -> bool {
        let format = normalize_format(format);
        self.formats.iter().any(|supported| *supported == format)
    }

    pub fn can_load(&self) -> bool {
        self.can_load
    }

    pub fn can_save(&self) -> bool {
        self.can_save
    }
}

#[cfg(test)]
mod tests {
    use super::{Loader, LoaderDescriptor};

    #[test]
    fn formats_are_normalized() {
        let descriptor = LoaderDescriptor::new("MeshLoaderObj", "Mesh", "MeshLoader")
            .with_formats(["obj", "OBJ", " .Obj2 ", "", "*.tar.gz"])
            .with_load(true);
        let loader = Loader::new(&descriptor, "Mesh");

        assert_eq!(["obj", "obj2", "tar.gz"], loader.formats());
        assert!(loader.is_format_supported("OBJ"));
        assert!(loader.is_format_supported(".tar.gz"));
        assert!(!loader.is_format_supported("gz"));
        assert!(loader.can_load());
        assert!(!loader.can_save());
        assert_eq!("Mesh", loader.type_name());
        assert_eq!("MeshLoaderObj", loader.class_name());
    }
}
