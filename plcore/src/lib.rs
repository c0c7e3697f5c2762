// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core services of the engine: the [`log::Log`] with its formatters, and the
//! [`loadable::LoadableManager`] registry of resource loaders and base
//! directories.
//!
//! Nothing in here is global. The application creates the log and the
//! manager, and passes them to whatever needs them.

pub mod collections;
pub mod file_system;
pub mod loadable;
pub mod log;

#[cfg(test)]
mod test_file_system;
