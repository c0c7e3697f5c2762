// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Registry of loaders for loadable resources, and resolution of resource
//! files against a list of base directories.
//!
//! A loadable is, for example, a mesh, which can be loaded and saved in many
//! formats. Each such category is a [`LoadableType`], and each loader
//! implementation handling some formats of it is a [`Loader`]:
//!
//! - Mesh
//!   - MeshLoaderPL (`mesh`)
//!   - MeshLoader3ds (`3ds`)
//!   - MeshLoaderObj (`obj`)
//!
//! Everything is registered in a [`LoadableManager`].

mod loadable_type;
mod loader;
mod manager;

use std::io;

pub use loadable_type::LoadableType;
pub use loader::{Loader, LoaderBase, LoaderDescriptor};
pub use manager::{LoadableManager, ResolvedFile};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{0:?} was not found in any base directory")]
    NotFound(String),
    #[error("{0:?} is not a base directory")]
    NotBaseDir(String),
    #[error("there is no base directory at index {0}")]
    NoBaseDirAt(usize),
    #[error("{0:?} is not a directory")]
    NotADirectory(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("failed to access {path:?}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// The part of the path after the last `/`.
fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Returns the extension of the file, i.e. the part after the last dot of the
/// file name, lowercased. For `"a/b.tar.gz"`, this is `"gz"`.
pub fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    name.rsplit_once('.')
        .map(|(_, extension)| extension)
        .filter(|extension| !extension.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Returns the complete extension of the file, i.e. the part after the first
/// dot of the file name, lowercased. For `"a/b.tar.gz"`, this is `"tar.gz"`.
pub fn complete_extension(path: &str) -> Option<String> {
    let name = file_name(path);
    name.split_once('.')
        .map(|(_, extension)| extension)
        .filter(|extension| !extension.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Lowercases and trims a format name, and drops a leading `*.` or `.`.
fn normalize_format(format: &str) -> String {
    let format = format.trim();
    let format = format.strip_prefix('*').unwrap_or(format);
    let format = format.strip_prefix('.').unwrap_or(format);
    format.to_ascii_lowercase()
}
